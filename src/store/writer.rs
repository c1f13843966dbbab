use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use super::row::{SizeRow, ThreadRow};
use super::TableFormat;
use crate::bench::model::{SweepKind, SweepResult};

/// Write `result` into `dir` under its conventional file name.
/// Returns the path written.
pub fn save_sweep(result: &SweepResult, dir: &Path, format: TableFormat) -> Result<PathBuf> {
    let path = dir.join(format!("{}.{}", result.file_stem(), format.extension()));
    write_table(result, &path, format)?;
    log::info!("wrote {} rows to {}", result.len(), path.display());
    Ok(path)
}

/// Write `result` to an explicit path.
pub fn write_table(result: &SweepResult, path: &Path, format: TableFormat) -> Result<()> {
    if result.is_empty() {
        bail!("refusing to write empty table {}", path.display());
    }
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let out = BufWriter::new(file);

    let written = match format {
        TableFormat::Csv => write_csv(result, out),
        TableFormat::Json => write_json(result, out),
    };
    written.with_context(|| format!("writing {}", path.display()))
}

// ---------------------------------------------------------------------------
// CSV writer
// ---------------------------------------------------------------------------

/// Header row comes from the first serialized record.
fn write_csv<W: Write>(result: &SweepResult, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    for record in &result.records {
        match result.kind {
            SweepKind::Sizes { .. } => writer.serialize(SizeRow::from(record))?,
            SweepKind::Threads { .. } => writer.serialize(ThreadRow::from(record))?,
        }
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON writer
// ---------------------------------------------------------------------------

/// Records-oriented array, one object per row.
fn write_json<W: Write>(result: &SweepResult, mut out: W) -> Result<()> {
    match result.kind {
        SweepKind::Sizes { .. } => {
            let rows: Vec<SizeRow> = result.records.iter().map(SizeRow::from).collect();
            serde_json::to_writer_pretty(&mut out, &rows)?;
        }
        SweepKind::Threads { .. } => {
            let rows: Vec<ThreadRow> = result.records.iter().map(ThreadRow::from).collect();
            serde_json::to_writer_pretty(&mut out, &rows)?;
        }
    }
    out.flush().context("flushing JSON")?;
    Ok(())
}
