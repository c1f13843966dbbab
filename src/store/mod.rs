/// Result store: sweep tables to and from flat files.
///
/// Architecture:
/// ```text
///   SweepResult
///        │
///        ▼
///   ┌──────────┐
///   │  writer   │  one row per record → benchmark_<...>.csv / .json
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SweepResult (order preserved)
///   └──────────┘
/// ```
///
/// File names follow a fixed convention so that comparison runs can find
/// peer tables in other result directories.

pub mod loader;
pub mod row;
pub mod writer;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::bench::model::{size_sweep_stem, thread_sweep_stem, Layout};

const THREAD_TABLE_PREFIX: &str = "benchmark_threads_";

/// On-disk encoding of a sweep table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TableFormat {
    #[default]
    Csv,
    Json,
}

impl TableFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            TableFormat::Csv => "csv",
            TableFormat::Json => "json",
        }
    }
}

/// Find the table with the given stem in `dir`, in any supported format.
pub fn find_table(dir: &Path, stem: &str) -> Result<PathBuf> {
    [TableFormat::Csv, TableFormat::Json]
        .iter()
        .map(|f| dir.join(format!("{stem}.{}", f.extension())))
        .find(|p| p.is_file())
        .with_context(|| format!("no {stem}.csv or {stem}.json in {}", dir.display()))
}

pub fn size_table_path(dir: &Path, layout: Layout, threads: u32) -> Result<PathBuf> {
    find_table(dir, &size_sweep_stem(layout, threads))
}

pub fn thread_table_path(dir: &Path, layout: Layout) -> Result<PathBuf> {
    find_table(dir, &thread_sweep_stem(layout))
}

/// Infer the layout a result directory was produced with from the name
/// of its thread-sweep table.
pub fn detect_layout(dir: &Path) -> Result<Layout> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.starts_with(THREAD_TABLE_PREFIX))
        .collect();
    names.sort();

    let Some(name) = names.first() else {
        bail!("no benchmark_threads_* table in {}", dir.display());
    };
    let token = name[THREAD_TABLE_PREFIX.len()..]
        .split('.')
        .next()
        .unwrap_or("");
    Layout::from_token(token)
        .with_context(|| format!("unknown layout `{token}` in {}", dir.join(name).display()))
}
