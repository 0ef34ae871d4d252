//! Export of the raw logs for offline analysis

use crate::store::{PageVisit, PredictionRecord};
use emolens_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// One JSON object per line
    #[default]
    #[serde(rename = "jsonl")]
    JsonLines,
    /// Pretty-printed JSON array
    Json,
    /// Comma-separated values with a header row
    Csv,
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jsonl" | "jsonlines" | "ndjson" => Ok(Self::JsonLines),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(Error::config(format!("unknown export format '{other}'"))),
        }
    }
}

/// Write visits to `out`, returning how many were written
pub fn export_visits<W: Write>(
    visits: &[PageVisit],
    out: &mut W,
    format: ExportFormat,
) -> Result<usize> {
    match format {
        ExportFormat::JsonLines => write_json_lines(visits, out)?,
        ExportFormat::Json => write_json(visits, out)?,
        ExportFormat::Csv => {
            writeln!(out, "page_name,visited_at")?;
            for visit in visits {
                writeln!(
                    out,
                    "{},{}",
                    csv_field(&visit.page_name),
                    visit.visited_at.to_rfc3339()
                )?;
            }
        }
    }
    out.flush()?;
    Ok(visits.len())
}

/// Write predictions to `out`, returning how many were written
pub fn export_predictions<W: Write>(
    predictions: &[PredictionRecord],
    out: &mut W,
    format: ExportFormat,
) -> Result<usize> {
    match format {
        ExportFormat::JsonLines => write_json_lines(predictions, out)?,
        ExportFormat::Json => write_json(predictions, out)?,
        ExportFormat::Csv => {
            writeln!(out, "raw_text,predicted_label,confidence,predicted_at")?;
            for record in predictions {
                writeln!(
                    out,
                    "{},{},{},{}",
                    csv_field(&record.raw_text),
                    record.predicted_label,
                    record.confidence,
                    record.predicted_at.to_rfc3339()
                )?;
            }
        }
    }
    out.flush()?;
    Ok(predictions.len())
}

fn write_json_lines<T: Serialize, W: Write>(items: &[T], out: &mut W) -> Result<()> {
    for item in items {
        serde_json::to_writer(&mut *out, item)?;
        writeln!(out)?;
    }
    Ok(())
}

fn write_json<T: Serialize, W: Write>(items: &[T], out: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, items)?;
    writeln!(out)?;
    Ok(())
}

/// Quote a field when it holds a separator, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use emolens_core::{ist, EmotionCategory};

    fn prediction(text: &str) -> PredictionRecord {
        PredictionRecord {
            raw_text: text.to_string(),
            predicted_label: EmotionCategory::Sadness,
            confidence: 0.5,
            predicted_at: ist().with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn test_export_json_lines() {
        let mut buf = Vec::new();
        let count =
            export_predictions(&[prediction("a"), prediction("b")], &mut buf, ExportFormat::JsonLines)
                .unwrap();
        assert_eq!(count, 2);

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: PredictionRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first, prediction("a"));
    }

    #[test]
    fn test_export_json_array() {
        let visits = vec![PageVisit {
            page_name: "Home".to_string(),
            visited_at: ist().with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
        }];
        let mut buf = Vec::new();
        export_visits(&visits, &mut buf, ExportFormat::Json).unwrap();

        let parsed: Vec<PageVisit> = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed, visits);
    }

    #[test]
    fn test_export_csv_quotes_text() {
        let mut buf = Vec::new();
        export_predictions(
            &[prediction("well, \"fine\"\nthen")],
            &mut buf,
            ExportFormat::Csv,
        )
        .unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("raw_text,predicted_label,confidence,predicted_at\n"));
        assert!(text.contains("\"well, \"\"fine\"\"\nthen\",sadness,0.5,2024-01-02T03:04:05+05:30"));
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("jsonl".parse::<ExportFormat>().unwrap(), ExportFormat::JsonLines);
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
