//! Command execution.

use colored::Colorize;
use recframe_reader::payload::PayloadValue;
use recframe_reader::{
    scan_path, PayloadFormat, ReadError, ReaderConfig, Record, RecordReader, ScanReport,
    Termination,
};
use std::path::Path;

/// Longest raw or text preview printed per record.
const PREVIEW_LEN: usize = 48;

/// Formatted command output and whether the file was read without problems.
#[derive(Debug)]
pub struct Outcome {
    pub output: String,
    pub clean: bool,
}

/// Prints one line per record, then why reading stopped.
pub fn dump(
    path: &Path,
    format: PayloadFormat,
    limit: Option<usize>,
    config: ReaderConfig,
) -> Result<Outcome, Box<dyn std::error::Error>> {
    let mut reader = RecordReader::open(path, format, config)?;
    let mut lines = Vec::new();
    let mut failures = 0u64;
    let limit = limit.unwrap_or(usize::MAX);

    for item in reader.by_ref().take(limit) {
        match item {
            Ok(record) => lines.push(format_record(&record)),
            Err(err) if err.is_terminal() => lines.push(format_error(&err)),
            Err(err) => {
                failures += 1;
                lines.push(format_error(&err));
            }
        }
    }

    let (summary, clean) = match reader.termination() {
        Some(termination) => (format_termination(termination), termination.is_clean()),
        None => (
            format!(
                "{} after {} records (limit reached)",
                "Stopped".yellow(),
                reader.frames_read()
            ),
            true,
        ),
    };
    lines.push(summary);

    Ok(Outcome {
        output: lines.join("\n"),
        clean: clean && failures == 0,
    })
}

/// Scans a file and prints the report.
pub fn scan(path: &Path, config: ReaderConfig) -> Result<Outcome, Box<dyn std::error::Error>> {
    let report = scan_path(path, config)?;
    Ok(Outcome {
        output: format_report(path, &report),
        clean: report.is_clean(),
    })
}

fn format_record(record: &Record<PayloadValue>) -> String {
    let rendered = match &record.value {
        PayloadValue::Raw(bytes) => {
            let shown = &bytes[..bytes.len().min(PREVIEW_LEN)];
            let mut hex = hex::encode(shown);
            if bytes.len() > PREVIEW_LEN {
                hex.push_str("..");
            }
            hex
        }
        PayloadValue::Text(text) => {
            let mut preview: String = text.chars().take(PREVIEW_LEN).collect();
            if text.chars().count() > PREVIEW_LEN {
                preview.push_str("..");
            }
            format!("{:?}", preview)
        }
        PayloadValue::Json(value) => value.to_string(),
    };
    format!(
        "{:>6} @{:<10} {:>10}  {}",
        record.index.to_string().cyan(),
        record.offset,
        format_bytes(record.payload_len),
        rendered
    )
}

fn format_error(err: &ReadError) -> String {
    if err.is_terminal() {
        format!("{}: {}", "Error".red(), err)
    } else {
        format!("{}: {}", "Warning".yellow(), err)
    }
}

fn format_termination(termination: &Termination) -> String {
    if termination.is_clean() {
        format!("{}", termination.to_string().green())
    } else {
        format!("{}: {}", "Stopped".red(), termination)
    }
}

fn format_report(path: &Path, report: &ScanReport) -> String {
    let status = if report.is_clean() {
        "OK".green()
    } else {
        "DAMAGED".red()
    };
    [
        format!("{} {}", path.display().to_string().bold(), status),
        format!("  records:          {}", report.records),
        format!("  payload bytes:    {}", format_bytes(report.payload_bytes)),
        format!("  bytes consumed:   {}", format_bytes(report.bytes_consumed)),
        format!("  largest record:   {}", format_bytes(report.largest_record)),
        format!("  payload failures: {}", report.payload_failures),
        format!("  termination:      {}", report.termination),
    ]
    .join("\n")
}

/// Formats bytes as human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    } else if bytes >= 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}
