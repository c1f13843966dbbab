use std::fmt;

use serde::{Deserialize, Serialize};

/// Problem size used by the thread sweep.
pub const THREAD_SWEEP_SIZE: u32 = 1024;

/// Problem sizes visited by the size sweep, 2^1 through 2^11.
pub const SWEEP_SIZES: [u32; 11] = [2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048];

// ---------------------------------------------------------------------------
// Layout – memory ordering variant of the kernel
// ---------------------------------------------------------------------------

/// Memory-access ordering of the kernel under test.
///
/// Opaque to the harness: it is only forwarded as a positional token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Right,
    Left,
}

impl Layout {
    /// Token passed on the kernel command line and used in file names.
    pub fn as_token(&self) -> &'static str {
        match self {
            Layout::Right => "right",
            Layout::Left => "left",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "right" => Some(Layout::Right),
            "left" => Some(Layout::Left),
            _ => None,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

// ---------------------------------------------------------------------------
// Configuration – one point of the parameter space
// ---------------------------------------------------------------------------

/// One point of the benchmark parameter space. Matrices are square.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Configuration {
    pub problem_size: u32,
    pub thread_count: u32,
    pub layout: Layout,
}

impl Configuration {
    pub fn new(problem_size: u32, thread_count: u32, layout: Layout) -> Self {
        Self {
            problem_size,
            thread_count,
            layout,
        }
    }

    /// Key used to line up tables that differ only by layout.
    pub fn alignment_key(&self) -> (u32, u32) {
        (self.problem_size, self.thread_count)
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "size {n}x{n}, {t} thread(s), {l} layout",
            n = self.problem_size,
            t = self.thread_count,
            l = self.layout
        )
    }
}

// ---------------------------------------------------------------------------
// Sample / AggregatedRecord
// ---------------------------------------------------------------------------

/// One parsed kernel execution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time_ms: f64,
    pub gflops: f64,
}

/// Mean / standard deviation reduction of the samples of one configuration.
///
/// Both `*_std` fields are exactly zero when `samples == Some(1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregatedRecord {
    pub configuration: Configuration,
    pub time_ms_mean: f64,
    pub time_ms_std: f64,
    pub gflops_mean: f64,
    pub gflops_std: f64,
    /// Number of successfully parsed samples behind the means; `None` for
    /// tables loaded without a sample count.
    pub samples: Option<usize>,
}

// ---------------------------------------------------------------------------
// SweepResult – ordered table of records
// ---------------------------------------------------------------------------

/// Which axis a sweep walks, together with the parameter it holds fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepKind {
    /// Problem size varies; thread count is fixed.
    Sizes { threads: u32 },
    /// Thread count varies; problem size is fixed.
    Threads { size: u32 },
}

/// Ordered records of one sweep. Row order follows the sweep axis.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepResult {
    pub kind: SweepKind,
    pub layout: Layout,
    pub records: Vec<AggregatedRecord>,
}

impl SweepResult {
    pub fn new(kind: SweepKind, layout: Layout) -> Self {
        Self {
            kind,
            layout,
            records: Vec::new(),
        }
    }

    /// File stem following the directory convention peers are located by.
    pub fn file_stem(&self) -> String {
        match self.kind {
            SweepKind::Sizes { threads } => size_sweep_stem(self.layout, threads),
            SweepKind::Threads { .. } => thread_sweep_stem(self.layout),
        }
    }

    pub fn configurations(&self) -> impl Iterator<Item = &Configuration> + '_ {
        self.records.iter().map(|r| &r.configuration)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub fn size_sweep_stem(layout: Layout, threads: u32) -> String {
    format!("benchmark_sizes_{layout}_{threads}threads")
}

pub fn thread_sweep_stem(layout: Layout) -> String {
    format!("benchmark_threads_{layout}")
}
