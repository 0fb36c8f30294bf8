use crate::analyzers::{CorrelationMatrix, Grouping, Histogram, PatternSeries, ScatterSeries, StationFindings};
use crate::dashboard::{insight, ViewOutput};
use crate::error::Result;
use crate::models::Variable;
use crate::utils::constants::DEFAULT_PRECISION;

const BAR_WIDTH: usize = 40;
const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Plain-text presentation of view outputs for the terminal
pub struct Renderer {
    precision: usize,
    show_insights: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            show_insights: true,
        }
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_insights(mut self, show_insights: bool) -> Self {
        self.show_insights = show_insights;
        self
    }

    pub fn render(&self, output: &ViewOutput) -> String {
        let view = output.view();
        let mut sections = vec![format!("=== {} ===", view.title())];

        match output {
            ViewOutput::DailyPattern {
                hourly,
                monthly,
                distribution,
            } => {
                sections.push(self.render_series(hourly));
                sections.push(self.render_series(monthly));
                sections.push(self.render_histogram(distribution));
            }
            ViewOutput::WeatherEffects {
                overall,
                by_station,
                scatter,
            } => {
                sections.push(self.render_matrix("All stations", overall));
                for (station, matrix) in by_station {
                    sections.push(self.render_matrix(station, matrix));
                }
                sections.push(self.render_scatter(scatter));
            }
            ViewOutput::FurtherAnalysis { series, .. } => {
                for s in series {
                    sections.push(self.render_series(s));
                }
            }
            ViewOutput::Conclusion { findings } => {
                for f in findings {
                    sections.push(self.render_findings(f));
                }
            }
        }

        if self.show_insights {
            sections.push(format!("Insights:\n{}", insight(view)));
        }

        sections.join("\n\n")
    }

    pub fn render_json(&self, output: &ViewOutput) -> Result<String> {
        Ok(serde_json::to_string_pretty(output)?)
    }

    /// One row per group with a bar scaled to the largest mean
    pub fn render_series(&self, series: &PatternSeries) -> String {
        let title = match series.category {
            Some(category) => format!(
                "{} - mean PM10 by {} ({})",
                series.station,
                series.grouping.key_label(),
                category.label()
            ),
            None => format!(
                "{} - mean PM10 by {}",
                series.station,
                series.grouping.key_label()
            ),
        };

        let max = series.peak().map(|p| p.mean).unwrap_or(0.0);
        let mut lines = vec![title];
        for point in &series.points {
            lines.push(format!(
                "  {:>5} | {:>8.prec$} | {:<width$} n={}",
                key_label(series.grouping, point.key),
                point.mean,
                bar(point.mean, max),
                point.count,
                prec = self.precision,
                width = BAR_WIDTH
            ));
        }
        lines.join("\n")
    }

    pub fn render_matrix(&self, title: &str, matrix: &CorrelationMatrix) -> String {
        // Correlations need at least two decimals to be readable
        let prec = self.precision.max(2);
        let cell = prec + 4;

        let mut lines = vec![format!("{} - Pearson correlation", title)];
        let header: String = matrix
            .variables
            .iter()
            .map(|v| format!("{:>cell$}", v.column_name(), cell = cell))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(format!("  {:<5} {}", "", header));

        for &row in &matrix.variables {
            let cells: String = matrix
                .variables
                .iter()
                .map(|&col| match matrix.get(row, col) {
                    Some(r) => format!("{:>cell$.prec$}", r, cell = cell, prec = prec),
                    None => format!("{:>cell$}", "n/a", cell = cell),
                })
                .collect::<Vec<_>>()
                .join(" ");
            lines.push(format!("  {:<5} {}", row.column_name(), cells));
        }
        lines.join("\n")
    }

    pub fn render_histogram(&self, histogram: &Histogram) -> String {
        let scope = histogram.station.as_deref().unwrap_or("all stations");
        let mut lines = vec![format!(
            "{} distribution ({}, {} values)",
            histogram.variable.display_name(),
            scope,
            histogram.total()
        )];

        let max = histogram.counts.iter().copied().max().unwrap_or(0) as f64;
        for (i, count) in histogram.counts.iter().enumerate() {
            lines.push(format!(
                "  {:>8.prec$} - {:<8.prec$} | {:<width$} {}",
                histogram.edges[i],
                histogram.edges[i + 1],
                bar(*count as f64, max),
                count,
                prec = self.precision,
                width = BAR_WIDTH
            ));
        }
        lines.join("\n")
    }

    /// Scatter points do not fit a terminal, so only their extent is shown
    pub fn render_scatter(&self, scatter: &[ScatterSeries]) -> String {
        let mut lines = vec!["Scatter series".to_string()];
        for series in scatter {
            let (lo, hi) = series
                .points
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (x, _)| {
                    (lo.min(*x), hi.max(*x))
                });
            let extent = if series.points.is_empty() {
                "no paired values".to_string()
            } else {
                format!(
                    "{} from {:.prec$} to {:.prec$} {}",
                    series.x.column_name(),
                    lo,
                    hi,
                    series.x.units(),
                    prec = self.precision
                )
            };
            lines.push(format!(
                "  {} vs {} at {}: {} points, {}",
                series.x.column_name(),
                series.y.column_name(),
                series.station,
                series.points.len(),
                extent
            ));
        }
        lines.join("\n")
    }

    pub fn render_findings(&self, findings: &StationFindings) -> String {
        let prec = self.precision;
        let mut lines = vec![
            findings.station.clone(),
            format!(
                "  Highest hour: {:02}:00 ({:.prec$})   Lowest hour: {:02}:00 ({:.prec$})",
                findings.peak_hour.key,
                findings.peak_hour.mean,
                findings.trough_hour.key,
                findings.trough_hour.mean,
                prec = prec
            ),
            format!(
                "  Highest month: {} ({:.prec$})   Lowest month: {} ({:.prec$})",
                key_label(Grouping::Month, findings.peak_month.key),
                findings.peak_month.mean,
                key_label(Grouping::Month, findings.trough_month.key),
                findings.trough_month.mean,
                prec = prec
            ),
        ];

        let correlations = findings
            .correlations
            .iter()
            .map(|(v, r)| match r {
                Some(r) => format!("{} {:+.3}", v.column_name(), r),
                None => format!("{} n/a", v.column_name()),
            })
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!(
            "  Correlation with {}: {}",
            Variable::Pm10.column_name(),
            correlations
        ));

        for (category, mean, count) in &findings.category_means {
            lines.push(format!(
                "  {:<14} mean {:.prec$} (n={})",
                category.label(),
                mean,
                count,
                prec = prec
            ));
        }
        lines.join("\n")
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

fn key_label(grouping: Grouping, key: u32) -> String {
    match grouping {
        Grouping::HourOfDay => format!("{:02}h", key),
        Grouping::Month => MONTH_NAMES
            .get(key.wrapping_sub(1) as usize)
            .map(|m| m.to_string())
            .unwrap_or_else(|| key.to_string()),
    }
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || value <= 0.0 {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(len.min(BAR_WIDTH))
}
