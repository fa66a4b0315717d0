//! Output sink for extracted pages.
//!
//! Rows are `(Page URL, Custom Label)` pairs. CSV output starts with a header
//! row; JSON output is an array of records. Writing to a path replaces
//! whatever the file held before.

use crate::error::OutputError;
use crate::results::PageRecord;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Header row of tabular output
pub const HEADER: [&str; 2] = ["Page URL", "Custom Label"];

/// Serialization format of the output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Write records to any writer
pub fn write_records<W: Write>(
    writer: W,
    records: &[PageRecord],
    format: OutputFormat,
) -> Result<(), OutputError> {
    match format {
        OutputFormat::Csv => {
            let mut csv = csv::WriterBuilder::new()
                .terminator(csv::Terminator::Any(b'\n'))
                .from_writer(writer);
            csv.write_record(HEADER)?;
            for record in records {
                csv.write_record([
                    record.page_url.as_str(),
                    record.custom_label.as_deref().unwrap_or(""),
                ])?;
            }
            csv.flush()?;
        }
        OutputFormat::Json => {
            let mut writer = writer;
            serde_json::to_writer_pretty(&mut writer, records)?;
            writeln!(writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}

/// Write records to `path`, truncating prior content. `-` writes to stdout.
pub fn write_to_path(
    path: &Path,
    records: &[PageRecord],
    format: OutputFormat,
) -> Result<(), OutputError> {
    if path.as_os_str() == "-" {
        let stdout = io::stdout();
        return write_records(stdout.lock(), records, format);
    }

    let file = File::create(path)?;
    write_records(BufWriter::new(file), records, format)?;
    ::log::info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}
