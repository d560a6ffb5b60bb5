//! CSV export of the record history.

use crate::{DailyRecord, Result};
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    date: String,
    water_glasses: u32,
    healthy_meals: u32,
    unhealthy_meals: u32,
    exercises_completed: String,
}

impl From<&DailyRecord> for CsvRow {
    fn from(record: &DailyRecord) -> Self {
        CsvRow {
            date: record.date.to_string(),
            water_glasses: record.water_glasses,
            healthy_meals: record.healthy_meals,
            unhealthy_meals: record.unhealthy_meals,
            exercises_completed: record
                .exercises_completed
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(";"),
        }
    }
}

/// Write `records` to a fresh CSV file at `path`
///
/// Replaces any existing file, writes the header even when there are no
/// records, and syncs to disk before returning the number of rows written.
pub fn export_csv(records: &[DailyRecord], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);

    writer.write_record([
        "date",
        "water_glasses",
        "healthy_meals",
        "unhealthy_meals",
        "exercises_completed",
    ])?;
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} records to {:?}", records.len(), path);
    Ok(records.len())
}
