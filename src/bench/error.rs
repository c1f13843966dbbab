use std::fmt;
use std::process::ExitStatus;

use super::model::Configuration;

/// The two measurements the kernel reports on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    ExecutionTime,
    Throughput,
}

impl Metric {
    /// Label preceding the value on the kernel's output line.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::ExecutionTime => "Temps d'exécution",
            Metric::Throughput => "Performance",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::ExecutionTime => f.write_str("execution time"),
            Metric::Throughput => f.write_str("throughput"),
        }
    }
}

/// Failures of the sampling and comparison engine.
#[derive(Debug, thiserror::Error)]
pub enum BenchError {
    #[error("kernel output has no {metric} line")]
    MissingMetric { metric: Metric },

    #[error("kernel reported {metric} as `{token}`, which is not a number")]
    MalformedMetric { metric: Metric, token: String },

    #[error("kernel exited with {status}: {stderr}")]
    KernelFailed { status: ExitStatus, stderr: String },

    #[error("failed to start kernel `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no usable sample for {configuration} after {attempts} attempt(s)")]
    InsufficientSamples {
        configuration: Configuration,
        attempts: usize,
    },

    #[error("table {table} has no single-thread row to use as speedup baseline")]
    MissingBaseline { table: String },

    #[error("tables cannot be aligned: {reason}")]
    MisalignedTables { reason: String },
}

impl BenchError {
    /// Whether the error only invalidates one sample rather than the run.
    pub fn is_sample_failure(&self) -> bool {
        matches!(
            self,
            BenchError::MissingMetric { .. }
                | BenchError::MalformedMetric { .. }
                | BenchError::KernelFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::model::Layout;

    #[test]
    fn sample_failures_are_distinguished_from_fatal_errors() {
        assert!(BenchError::MissingMetric {
            metric: Metric::Throughput
        }
        .is_sample_failure());
        assert!(!BenchError::InsufficientSamples {
            configuration: Configuration::new(8, 1, Layout::Left),
            attempts: 3,
        }
        .is_sample_failure());
        assert!(!BenchError::Spawn {
            program: "missing".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        }
        .is_sample_failure());
    }

    #[test]
    fn messages_locate_the_configuration() {
        let err = BenchError::InsufficientSamples {
            configuration: Configuration::new(256, 4, Layout::Right),
            attempts: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("256x256"));
        assert!(msg.contains("4 thread(s)"));
        assert!(msg.contains("right"));
    }
}
