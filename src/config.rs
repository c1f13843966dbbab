use std::path::PathBuf;

use crate::bench::model::Layout;
use crate::bench::sweep::DEFAULT_REPEAT;
use crate::store::TableFormat;

/// Kernel location used when neither `--kernel` nor `MATBENCH_KERNEL` is set.
pub const DEFAULT_KERNEL: &str = "./build/src/top.matrix_product";

// ---------------------------------------------------------------------------
// Benchmark run
// ---------------------------------------------------------------------------

/// Everything a benchmark run needs, fixed once at start-up.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Kernel executable.
    pub kernel: PathBuf,
    pub layout: Layout,
    /// Thread counts: one size sweep each, and the thread-sweep axis in this order.
    pub threads: Vec<u32>,
    /// Samples per sweep point.
    pub repeat: usize,
    /// Where tables and charts are written.
    pub output_dir: PathBuf,
    pub format: TableFormat,
}

impl BenchConfig {
    pub fn new(layout: Layout, threads: Vec<u32>) -> Self {
        Self {
            kernel: PathBuf::from(DEFAULT_KERNEL),
            layout,
            threads,
            repeat: DEFAULT_REPEAT,
            output_dir: PathBuf::from("."),
            format: TableFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Comparison run
// ---------------------------------------------------------------------------

/// Inputs of a comparison between result directories.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareConfig {
    /// Result directories; the first one is the baseline.
    pub dirs: Vec<PathBuf>,
    /// Size-sweep groups to compare; empty means "those in the baseline's
    /// thread-sweep table".
    pub threads: Vec<u32>,
    pub output_dir: PathBuf,
}
