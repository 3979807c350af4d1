// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Analytics export files and their delivery.

use crate::error::AppError;
use crate::models::UserAnalytics;
use crate::time_utils::iso_date;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Export file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
    Pdf,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = AppError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(AppError::BadRequest(format!("Unknown export format: {}", s))),
        }
    }
}

/// A finished export, ready to hand to the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    pub filename: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportFile {
    pub fn new(format: ExportFormat, bytes: Vec<u8>, now: DateTime<Utc>) -> Self {
        Self {
            filename: export_filename(format, now),
            format,
            bytes,
        }
    }

    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

/// `satrf-analytics-<YYYY-MM-DD>.<format>`
pub fn export_filename(format: ExportFormat, now: DateTime<Utc>) -> String {
    format!("satrf-analytics-{}.{}", iso_date(now), format)
}

/// Destination of a finished export (the browser download, in the dashboard).
pub trait DownloadSink: Send + Sync {
    fn deliver(&self, file: &ExportFile) -> Result<(), AppError>;
}

/// Render an export locally, for offline mode. PDF needs the backend.
pub fn render_offline(format: ExportFormat, analytics: &UserAnalytics) -> Result<Vec<u8>, AppError> {
    match format {
        ExportFormat::Csv => Ok(score_history_csv(analytics).into_bytes()),
        ExportFormat::Json => serde_json::to_vec_pretty(analytics)
            .map_err(|e| AppError::Export(format!("serialize analytics: {}", e))),
        ExportFormat::Pdf => Err(AppError::Export(
            "PDF export is only available from the backend".to_string(),
        )),
    }
}

const CSV_HEADER: &str = "date,score,xCount,eventName,discipline,position,totalParticipants";

fn score_history_csv(analytics: &UserAnalytics) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for point in &analytics.score_history {
        let row = [
            csv_field(&point.date),
            point.score.to_string(),
            point.x_count.to_string(),
            csv_field(&point.event_name),
            csv_field(&point.discipline),
            point.position.map(|p| p.to_string()).unwrap_or_default(),
            point
                .total_participants
                .map(|p| p.to_string())
                .unwrap_or_default(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::synthetic;
    use chrono::TimeZone;

    #[test]
    fn test_filename_uses_iso_date() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 18, 30, 0).unwrap();
        assert_eq!(
            export_filename(ExportFormat::Csv, now),
            "satrf-analytics-2024-05-01.csv"
        );
        assert_eq!(
            ExportFile::new(ExportFormat::Pdf, vec![], now).filename,
            "satrf-analytics-2024-05-01.pdf"
        );
    }

    #[test]
    fn test_offline_csv_has_one_row_per_score() {
        let bytes = render_offline(ExportFormat::Csv, &synthetic::generate()).unwrap();
        let csv = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[1], "2024-01-15,95,8,SATRF Championship,3P,3,25");
    }

    #[test]
    fn test_offline_pdf_fails() {
        let err = render_offline(ExportFormat::Pdf, &synthetic::generate()).unwrap_err();
        assert_eq!(err.to_string(), "Failed to export analytics data");
    }

    #[test]
    fn test_csv_field_quoting() {
        assert_eq!(csv_field("Club, Open"), "\"Club, Open\"");
        assert_eq!(csv_field("The \"Big\" one"), "\"The \"\"Big\"\" one\"");
        assert_eq!(csv_field("Plain"), "Plain");
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!(matches!(
            "xlsx".parse::<ExportFormat>(),
            Err(AppError::BadRequest(_))
        ));
    }
}
