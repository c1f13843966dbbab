use std::path::Path;

use anyhow::{bail, Context, Result};

use super::row::{AnyRow, SizeRow, ThreadRow};
use crate::bench::model::{AggregatedRecord, Layout, SweepKind, SweepResult, THREAD_SWEEP_SIZE};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sweep table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row; a `size` column marks a size sweep
/// * `.json` – `[{ "size": 2, "layout": "right", ... }, ...]`
pub fn load_table(path: &Path) -> Result<SweepResult> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        other => bail!("Unsupported file extension: .{other}"),
    };
    table.with_context(|| format!("loading {}", path.display()))
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<SweepResult> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let is_size_sweep = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .any(|h| h == "size");

    let mut rows = Vec::new();
    if is_size_sweep {
        for (row_no, result) in reader.deserialize::<SizeRow>().enumerate() {
            let row = result.with_context(|| format!("CSV row {row_no}"))?;
            rows.push(AnyRow::Size(row));
        }
    } else {
        for (row_no, result) in reader.deserialize::<ThreadRow>().enumerate() {
            let row = result.with_context(|| format!("CSV row {row_no}"))?;
            rows.push(AnyRow::Thread(row));
        }
    }

    assemble(rows)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<SweepResult> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let rows: Vec<AnyRow> = serde_json::from_str(&text).context("parsing JSON")?;
    assemble(rows)
}

// ---------------------------------------------------------------------------
// Rows → SweepResult
// ---------------------------------------------------------------------------

/// Rebuild a table, checking that every row belongs to the same sweep.
fn assemble(rows: Vec<AnyRow>) -> Result<SweepResult> {
    let Some(first) = rows.first() else {
        bail!("table has no rows");
    };

    let (kind, layout) = match first {
        AnyRow::Size(r) => (SweepKind::Sizes { threads: r.threads }, r.layout),
        AnyRow::Thread(r) => (
            SweepKind::Threads {
                size: THREAD_SWEEP_SIZE,
            },
            r.layout,
        ),
    };

    let mut result = SweepResult::new(kind, layout);
    for (row_no, row) in rows.into_iter().enumerate() {
        let record: AggregatedRecord = match (row, kind) {
            (AnyRow::Size(r), SweepKind::Sizes { threads }) => {
                if r.threads != threads {
                    bail!("Row {row_no}: {} threads in a {threads}-thread size sweep", r.threads);
                }
                r.into()
            }
            (AnyRow::Thread(r), SweepKind::Threads { .. }) => r.into(),
            _ => bail!("Row {row_no}: size-sweep and thread-sweep rows are mixed"),
        };
        check_layout(&record, layout, row_no)?;
        result.records.push(record);
    }
    Ok(result)
}

fn check_layout(record: &AggregatedRecord, layout: Layout, row_no: usize) -> Result<()> {
    if record.configuration.layout != layout {
        bail!(
            "Row {row_no}: layout {} in a {layout} table",
            record.configuration.layout
        );
    }
    Ok(())
}
