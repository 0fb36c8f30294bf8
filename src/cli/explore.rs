use std::io::{BufRead, Write};
use tracing::debug;

use crate::cli::render::Renderer;
use crate::dashboard::Dashboard;
use crate::error::{AnalysisError, Result};
use crate::models::{TemperatureCategory, View, ViewSelection};

const HELP: &str = "\
Commands:
  1-4 or a view name      show a view (daily-pattern, weather-effects, further-analysis, conclusion)
  station <name>|all      filter by station
  category <name>         cold, cool, mild or warm (further analysis only)
  help                    show this help
  quit                    leave the session";

#[derive(Debug, Clone, PartialEq)]
pub enum ExploreCommand {
    Show(View),
    Station(Option<String>),
    Category(TemperatureCategory),
    Help,
    Quit,
}

impl ExploreCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "q" | "quit" | "exit" => Ok(ExploreCommand::Quit),
            "h" | "help" | "?" => Ok(ExploreCommand::Help),
            "station" if rest.is_empty() || rest.eq_ignore_ascii_case("all") => {
                Ok(ExploreCommand::Station(None))
            }
            "station" => Ok(ExploreCommand::Station(Some(rest.to_string()))),
            "category" => Ok(ExploreCommand::Category(rest.parse()?)),
            _ => line.parse().map(ExploreCommand::Show),
        }
    }
}

/// Read commands until `quit` or end of input. Errors a user can fix by
/// changing the selection are printed and the session continues.
pub fn explore<R: BufRead, W: Write>(
    dashboard: &mut Dashboard,
    renderer: &Renderer,
    input: R,
    mut out: W,
) -> Result<()> {
    let mut selection = ViewSelection::new(View::DailyPattern);

    writeln!(out, "{}", HELP)?;
    for (i, view) in View::ALL.iter().enumerate() {
        writeln!(out, "  [{}] {}", i + 1, view.title())?;
    }

    let mut lines = input.lines();
    loop {
        write!(out, "\n{}> ", selection)?;
        out.flush()?;

        let Some(line) = lines.next() else { break };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match ExploreCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                writeln!(out, "Error: {}", e)?;
                continue;
            }
        };
        debug!("explore command: {:?}", command);

        match command {
            ExploreCommand::Quit => break,
            ExploreCommand::Help => {
                writeln!(out, "{}", HELP)?;
                continue;
            }
            ExploreCommand::Show(view) => selection.view = view,
            ExploreCommand::Station(station) => selection.station = station,
            ExploreCommand::Category(category) => selection.category = Some(category),
        }

        match dashboard.resolve(selection.clone()) {
            Ok(output) => writeln!(out, "{}", renderer.render(output))?,
            Err(e) if e.is_recoverable() => {
                writeln!(out, "Error: {}", e)?;
                if matches!(e, AnalysisError::UnknownStation { .. }) {
                    selection.station = None;
                }
            }
            Err(e) => return Err(e),
        }
    }

    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::ViewResolver;
    use crate::models::{Dataset, Record};
    use std::io::Cursor;

    fn dashboard() -> Dashboard {
        let record = |station: &str, hour: u32, pm10: f64, temp: f64| {
            let ts = Record::timestamp_from_parts(2014, 2, 1, hour).unwrap();
            Record::new(ts, station, Some(pm10), Some(temp), Some(-12.0), Some(1025.0))
        };
        Dashboard::new(
            Dataset::new(vec![
                record("Dongsi", 21, 180.0, -4.0),
                record("Dongsi", 13, 90.0, 2.0),
                record("Wanliu", 21, 150.0, -3.0),
                record("Wanliu", 13, 80.0, 3.0),
            ]),
            ViewResolver::new(),
        )
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(ExploreCommand::parse("2").unwrap(), ExploreCommand::Show(View::WeatherEffects));
        assert_eq!(
            ExploreCommand::parse("daily-pattern").unwrap(),
            ExploreCommand::Show(View::DailyPattern)
        );
        assert_eq!(
            ExploreCommand::parse("station  Wanliu ").unwrap(),
            ExploreCommand::Station(Some("Wanliu".to_string()))
        );
        assert_eq!(ExploreCommand::parse("station all").unwrap(), ExploreCommand::Station(None));
        assert_eq!(
            ExploreCommand::parse("category Mild").unwrap(),
            ExploreCommand::Category(TemperatureCategory::Mild)
        );
        assert_eq!(ExploreCommand::parse("QUIT").unwrap(), ExploreCommand::Quit);
        assert!(ExploreCommand::parse("category tropical").is_err());
        assert!(ExploreCommand::parse("7").is_err());
    }

    #[test]
    fn test_session_survives_recoverable_errors() {
        let mut dashboard = dashboard();
        let renderer = Renderer::new().with_insights(false);
        let input = Cursor::new("1\nstation Beijing-Central\nstation Wanliu\n3\ncategory warm\nforecast\nquit\n1\n");
        let mut out = Vec::new();

        explore(&mut dashboard, &renderer, input, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Dongsi - mean PM10 by hour"));
        assert!(text.contains("Station 'Beijing-Central' not found"));
        assert!(text.contains("Wanliu - mean PM10 by hour"));
        assert!(text.contains("Wanliu - mean PM10 by hour (Cold (<0°C))"));
        assert!(text.contains("Not enough data"));
        assert!(text.contains("unknown view 'forecast'"));
        // Input after quit is never read
        assert_eq!(dashboard.cached_views(), 3);
    }

    #[test]
    fn test_session_ends_at_end_of_input() {
        let mut dashboard = dashboard();
        let mut out = Vec::new();
        explore(&mut dashboard, &Renderer::new(), Cursor::new("4\n"), &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("=== Conclusion ==="));
        assert!(text.contains("Highest hour: 21:00"));
    }
}
