/// Benchmark engine: sampling, aggregation, sweeps, and comparison.
///
/// Architecture:
/// ```text
///   ┌─────────────────┐
///   │ SweepController  │  enumerate sizes / thread counts, in order
///   └─────────────────┘
///        │ Configuration
///        ▼
///   ┌────────────┐
///   │ Aggregator  │  R samples → mean / sample std
///   └────────────┘
///        │ repeated calls
///        ▼
///   ┌────────┐
///   │ Runner  │  spawn kernel, parse stdout → Sample
///   └────────┘
///
///   SweepResult ──► compare: speedup, cross-table ratios ± error
/// ```

pub mod aggregate;
pub mod compare;
pub mod error;
pub mod model;
pub mod runner;
pub mod stats;
pub mod sweep;

pub use aggregate::Aggregator;
pub use compare::{compare, speedup_series, AlignedTables, ComparisonResult, Ratio, SpeedupSeries};
pub use error::{BenchError, Metric};
pub use model::{AggregatedRecord, Configuration, Layout, Sample, SweepKind, SweepResult};
pub use runner::{ProcessRunner, Runner};
pub use sweep::SweepController;
