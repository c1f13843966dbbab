use serde::{Deserialize, Serialize};

use crate::bench::model::{AggregatedRecord, Configuration, Layout, THREAD_SWEEP_SIZE};

// ---------------------------------------------------------------------------
// Interchange rows – one per AggregatedRecord
// ---------------------------------------------------------------------------

/// Row of a size-sweep table. Field order is the column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeRow {
    pub size: u32,
    pub layout: Layout,
    pub threads: u32,
    pub time_ms_mean: f64,
    pub time_ms_std: f64,
    pub gflops_mean: f64,
    pub gflops_std: f64,
    /// Absent from tables written without sample counts.
    #[serde(default)]
    pub samples: Option<usize>,
}

/// Row of a thread-sweep table; the problem size is implied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadRow {
    pub threads: u32,
    pub layout: Layout,
    pub time_ms_mean: f64,
    pub time_ms_std: f64,
    pub gflops_mean: f64,
    pub gflops_std: f64,
    /// Absent from tables written without sample counts.
    #[serde(default)]
    pub samples: Option<usize>,
}

/// Either row shape, for self-describing formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnyRow {
    Size(SizeRow),
    Thread(ThreadRow),
}

impl From<&AggregatedRecord> for SizeRow {
    fn from(r: &AggregatedRecord) -> Self {
        SizeRow {
            size: r.configuration.problem_size,
            layout: r.configuration.layout,
            threads: r.configuration.thread_count,
            time_ms_mean: r.time_ms_mean,
            time_ms_std: r.time_ms_std,
            gflops_mean: r.gflops_mean,
            gflops_std: r.gflops_std,
            samples: r.samples,
        }
    }
}

impl From<&AggregatedRecord> for ThreadRow {
    fn from(r: &AggregatedRecord) -> Self {
        ThreadRow {
            threads: r.configuration.thread_count,
            layout: r.configuration.layout,
            time_ms_mean: r.time_ms_mean,
            time_ms_std: r.time_ms_std,
            gflops_mean: r.gflops_mean,
            gflops_std: r.gflops_std,
            samples: r.samples,
        }
    }
}

impl From<SizeRow> for AggregatedRecord {
    fn from(row: SizeRow) -> Self {
        AggregatedRecord {
            configuration: Configuration::new(row.size, row.threads, row.layout),
            time_ms_mean: row.time_ms_mean,
            time_ms_std: row.time_ms_std,
            gflops_mean: row.gflops_mean,
            gflops_std: row.gflops_std,
            samples: row.samples,
        }
    }
}

impl From<ThreadRow> for AggregatedRecord {
    fn from(row: ThreadRow) -> Self {
        AggregatedRecord {
            configuration: Configuration::new(THREAD_SWEEP_SIZE, row.threads, row.layout),
            time_ms_mean: row.time_ms_mean,
            time_ms_std: row.time_ms_std,
            gflops_mean: row.gflops_mean,
            gflops_std: row.gflops_std,
            samples: row.samples,
        }
    }
}
