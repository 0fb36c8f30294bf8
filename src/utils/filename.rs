use chrono::{Datelike, Local};
use std::path::PathBuf;

/// Generate default export filename with format: airq-{view}-{YYMMDD}.{ext}
pub fn generate_default_export_filename(view_slug: &str, extension: &str) -> PathBuf {
    let now = Local::now();
    let year = now.year() % 100; // Get last 2 digits of year
    let month = now.month();
    let day = now.day();

    let filename = format!(
        "airq-{}-{:02}{:02}{:02}.{}",
        view_slug, year, month, day, extension
    );
    PathBuf::from("output").join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_export_filename() {
        let filename = generate_default_export_filename("daily-pattern", "json");
        let filename_str = filename.to_string_lossy();

        assert!(filename_str.starts_with("output/"));
        assert!(filename_str.ends_with(".json"));

        let parts: Vec<&str> = filename_str.split('/').collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], "output");
        assert!(parts[1].starts_with("airq-daily-pattern-"));
    }

    #[test]
    fn test_csv_extension() {
        let filename = generate_default_export_filename("conclusion", "csv");
        assert_eq!(
            filename.extension().and_then(|e| e.to_str()),
            Some("csv")
        );
    }
}
