//! Cross-configuration metrics with propagated measurement uncertainty.

use std::fmt;

use super::error::BenchError;
use super::model::{SweepKind, SweepResult};

/// Magnitude below which a mean is treated as zero.
pub const EPSILON: f64 = 1e-10;

// ---------------------------------------------------------------------------
// Ratio
// ---------------------------------------------------------------------------

/// Quotient of two noisy means.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ratio {
    Value { value: f64, error: f64 },
    /// One of the means is too close to zero for the quotient to mean anything.
    Undefined,
}

impl Ratio {
    /// `a / b` with relative errors of `a ± da` and `b ± db` added in quadrature.
    pub fn compute(a: f64, b: f64, da: f64, db: f64) -> Ratio {
        if a.abs() < EPSILON || b.abs() < EPSILON {
            return Ratio::Undefined;
        }
        let value = a / b;
        let rel_a = relative_error(da, a);
        let rel_b = relative_error(db, b);
        Ratio::Value {
            value,
            error: value.abs() * rel_a.hypot(rel_b),
        }
    }

    /// Legacy `(ratio, error)` pair; `Undefined` maps to `(0, 0)`.
    pub fn as_pair(&self) -> (f64, f64) {
        match *self {
            Ratio::Value { value, error } => (value, error),
            Ratio::Undefined => (0.0, 0.0),
        }
    }

    pub fn value(&self) -> Option<f64> {
        match *self {
            Ratio::Value { value, .. } => Some(value),
            Ratio::Undefined => None,
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ratio::Value { value, error } => write!(f, "{value:.3} ± {error:.3}"),
            Ratio::Undefined => f.write_str("n/a"),
        }
    }
}

fn relative_error(delta: f64, value: f64) -> f64 {
    if value.abs() < EPSILON {
        0.0
    } else {
        delta / value
    }
}

// ---------------------------------------------------------------------------
// Speedup
// ---------------------------------------------------------------------------

/// Speedup of every row of a table relative to its single-thread row.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedupSeries {
    pub thread_counts: Vec<u32>,
    pub speedups: Vec<Ratio>,
}

/// `T(1) / T(p)` for each row, using the first `thread_count == 1` row as T(1).
pub fn speedup_series(table: &SweepResult) -> Result<SpeedupSeries, BenchError> {
    let baseline = table
        .records
        .iter()
        .find(|r| r.configuration.thread_count == 1)
        .ok_or_else(|| BenchError::MissingBaseline {
            table: table.file_stem(),
        })?;

    let speedups = table
        .records
        .iter()
        .map(|r| {
            Ratio::compute(
                baseline.time_ms_mean,
                r.time_ms_mean,
                baseline.time_ms_std,
                r.time_ms_std,
            )
        })
        .collect();

    Ok(SpeedupSeries {
        thread_counts: table.configurations().map(|c| c.thread_count).collect(),
        speedups,
    })
}

// ---------------------------------------------------------------------------
// Alignment and cross-table ratios
// ---------------------------------------------------------------------------

/// A baseline table and its peers, checked to share one configuration axis.
#[derive(Debug, Clone, Copy)]
pub struct AlignedTables<'a> {
    baseline: &'a SweepResult,
    peers: &'a [SweepResult],
}

impl<'a> AlignedTables<'a> {
    /// Verify that every peer has the baseline's length, kind and
    /// `(size, threads)` sequence. Layout may differ.
    pub fn new(baseline: &'a SweepResult, peers: &'a [SweepResult]) -> Result<Self, BenchError> {
        for peer in peers {
            check_alignment(baseline, peer)?;
        }
        Ok(Self { baseline, peers })
    }

    /// Throughput of each peer over the baseline, element by element.
    pub fn gflops_ratios(&self) -> Vec<Vec<Ratio>> {
        self.peers
            .iter()
            .map(|peer| {
                peer.records
                    .iter()
                    .zip(&self.baseline.records)
                    .map(|(p, b)| Ratio::compute(p.gflops_mean, b.gflops_mean, p.gflops_std, b.gflops_std))
                    .collect()
            })
            .collect()
    }
}

fn check_alignment(baseline: &SweepResult, peer: &SweepResult) -> Result<(), BenchError> {
    let misaligned = |reason: String| BenchError::MisalignedTables {
        reason: format!("{} vs {}: {reason}", baseline.file_stem(), peer.file_stem()),
    };

    if baseline.len() != peer.len() {
        return Err(misaligned(format!(
            "{} rows vs {} rows",
            baseline.len(),
            peer.len()
        )));
    }
    if std::mem::discriminant(&baseline.kind) != std::mem::discriminant(&peer.kind) {
        return Err(misaligned("size sweep compared with thread sweep".to_string()));
    }
    for (row, (b, p)) in baseline.configurations().zip(peer.configurations()).enumerate() {
        if b.alignment_key() != p.alignment_key() {
            return Err(misaligned(format!(
                "row {row} is size {} / {} thread(s) vs size {} / {} thread(s)",
                b.problem_size, b.thread_count, p.problem_size, p.thread_count
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ComparisonResult
// ---------------------------------------------------------------------------

/// Derived view over a baseline table and its peers. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonResult {
    /// One ratio series per peer, in peer order.
    pub ratios: Vec<Vec<Ratio>>,
    /// Speedup series for the baseline followed by each peer; empty for size sweeps.
    pub speedups: Vec<SpeedupSeries>,
}

/// Align the tables, then derive throughput ratios and (for thread sweeps)
/// speedups. Nothing is computed when alignment fails.
pub fn compare(baseline: &SweepResult, peers: &[SweepResult]) -> Result<ComparisonResult, BenchError> {
    let aligned = AlignedTables::new(baseline, peers)?;

    let speedups = match baseline.kind {
        SweepKind::Threads { .. } => std::iter::once(baseline)
            .chain(peers)
            .map(speedup_series)
            .collect::<Result<Vec<_>, _>>()?,
        SweepKind::Sizes { .. } => Vec::new(),
    };

    Ok(ComparisonResult {
        ratios: aligned.gflops_ratios(),
        speedups,
    })
}
