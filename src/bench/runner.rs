use std::path::PathBuf;
use std::process::Command;

use super::error::{BenchError, Metric};
use super::model::{Configuration, Sample};

/// OpenMP environment pinning the kernel's parallel execution.
const PINNING_ENV: [(&str, &str); 5] = [
    ("OMP_PROC_BIND", "spread"),
    ("OMP_PLACES", "threads"),
    ("OMP_SCHEDULE", "dynamic"),
    ("OMP_DYNAMIC", "false"),
    ("OMP_NESTED", "false"),
];

// ---------------------------------------------------------------------------
// Runner abstraction
// ---------------------------------------------------------------------------

/// Executes the kernel once for a configuration and returns its measurements.
pub trait Runner {
    /// Run one sample. `threads` pins the kernel's thread team when given;
    /// otherwise the kernel inherits the caller's environment.
    fn execute(&mut self, config: &Configuration, threads: Option<u32>) -> Result<Sample, BenchError>;
}

// ---------------------------------------------------------------------------
// ProcessRunner – spawns the external executable
// ---------------------------------------------------------------------------

/// Runner backed by the real kernel executable. Blocks until the child exits.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Build the child command: `<program> m n k layout` plus pinning env.
    pub fn command(&self, config: &Configuration, threads: Option<u32>) -> Command {
        let n = config.problem_size.to_string();
        let mut cmd = Command::new(&self.program);
        cmd.args([n.as_str(), n.as_str(), n.as_str(), config.layout.as_token()]);
        if let Some(threads) = threads {
            cmd.env("OMP_NUM_THREADS", threads.to_string());
            cmd.envs(PINNING_ENV);
        }
        cmd
    }
}

impl Runner for ProcessRunner {
    fn execute(&mut self, config: &Configuration, threads: Option<u32>) -> Result<Sample, BenchError> {
        let mut cmd = self.command(config, threads);
        log::debug!("running {cmd:?}");

        let output = cmd.output().map_err(|source| BenchError::Spawn {
            program: self.program.display().to_string(),
            source,
        })?;

        if !output.status.success() {
            return Err(BenchError::KernelFailed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_output(&String::from_utf8_lossy(&output.stdout))
    }
}

// ---------------------------------------------------------------------------
// Output parsing
// ---------------------------------------------------------------------------

/// Extract both measurements from the kernel's stdout.
///
/// Lines look like `Temps d'exécution: 12.3 ms` and `Performance: 4.5 GFLOP/s`.
/// When a marker appears more than once the last occurrence wins, whether
/// or not earlier ones parsed.
pub fn parse_output(text: &str) -> Result<Sample, BenchError> {
    let mut time_ms = None;
    let mut gflops = None;

    for line in text.lines() {
        if let Some(value) = metric_value(line, Metric::ExecutionTime) {
            time_ms = Some(value);
        } else if let Some(value) = metric_value(line, Metric::Throughput) {
            gflops = Some(value);
        }
    }

    let missing = |metric| Err(BenchError::MissingMetric { metric });
    let time_ms = time_ms.unwrap_or_else(|| missing(Metric::ExecutionTime))?;
    let gflops = gflops.unwrap_or_else(|| missing(Metric::Throughput))?;
    Ok(Sample { time_ms, gflops })
}

/// `None` when the line does not carry `metric`; otherwise the parsed token.
/// Non-finite readings (`nan`, `inf`) are malformed.
fn metric_value(line: &str, metric: Metric) -> Option<Result<f64, BenchError>> {
    let marker_at = line.find(metric.label())?;
    let after_label = &line[marker_at + metric.label().len()..];
    let rest = after_label.trim_start().strip_prefix(':')?;
    let token = rest.split_whitespace().next().unwrap_or("");

    let value = token.parse::<f64>().ok().filter(|v| v.is_finite());
    Some(value.ok_or_else(|| BenchError::MalformedMetric {
        metric,
        token: token.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::model::Layout;

    const KERNEL_OUTPUT: &str = "\
Matrix product 64x64x64 (right)
Temps d'exécution: 12.75 ms
Performance: 3.2e1 GFLOP/s
";

    #[test]
    fn parses_both_markers() {
        let sample = parse_output(KERNEL_OUTPUT).unwrap();
        assert_eq!(sample.time_ms, 12.75);
        assert_eq!(sample.gflops, 32.0);
    }

    #[test]
    fn missing_throughput_is_reported() {
        let err = parse_output("Temps d'exécution: 1.0 ms\n").unwrap_err();
        assert!(matches!(
            err,
            BenchError::MissingMetric {
                metric: Metric::Throughput
            }
        ));
    }

    #[test]
    fn missing_time_is_reported() {
        let err = parse_output("Performance: 1.0 GFLOP/s\n").unwrap_err();
        assert!(matches!(
            err,
            BenchError::MissingMetric {
                metric: Metric::ExecutionTime
            }
        ));
    }

    #[test]
    fn garbage_token_is_malformed_not_zero() {
        let err = parse_output("Temps d'exécution: fast ms\nPerformance: 2 GFLOP/s\n").unwrap_err();
        match err {
            BenchError::MalformedMetric { metric, token } => {
                assert_eq!(metric, Metric::ExecutionTime);
                assert_eq!(token, "fast");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn last_occurrence_wins() {
        let text = "Performance: 1 GFLOP/s\nTemps d'exécution: 5 ms\nPerformance: 7 GFLOP/s\n";
        let sample = parse_output(text).unwrap();
        assert_eq!(sample.gflops, 7.0);
        assert_eq!(sample.time_ms, 5.0);
    }

    #[test]
    fn non_finite_readings_are_malformed() {
        for (text, bad) in [
            ("Temps d'exécution: nan ms\nPerformance: 2 GFLOP/s\n", "nan"),
            ("Temps d'exécution: 1 ms\nPerformance: inf GFLOP/s\n", "inf"),
            ("Temps d'exécution: -inf ms\nPerformance: 2 GFLOP/s\n", "-inf"),
        ] {
            match parse_output(text).unwrap_err() {
                BenchError::MalformedMetric { token, .. } => assert_eq!(token, bad),
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn later_valid_marker_overrides_earlier_malformed_one() {
        let text = "Temps d'exécution: warming ms\nTemps d'exécution: 3.0 ms\nPerformance: 2 GFLOP/s\n";
        assert_eq!(parse_output(text).unwrap().time_ms, 3.0);

        let text = "Temps d'exécution: 3.0 ms\nTemps d'exécution: warming ms\nPerformance: 2 GFLOP/s\n";
        assert!(matches!(
            parse_output(text).unwrap_err(),
            BenchError::MalformedMetric { .. }
        ));
    }

    #[test]
    fn command_carries_positional_args_and_pinning_env() {
        let runner = ProcessRunner::new("/opt/kernel");
        let config = Configuration::new(128, 8, Layout::Left);
        let cmd = runner.command(&config, Some(8));

        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, ["128", "128", "128", "left"]);

        let envs: Vec<(String, String)> = cmd
            .get_envs()
            .filter_map(|(k, v)| Some((k.to_string_lossy().into_owned(), v?.to_string_lossy().into_owned())))
            .collect();
        assert!(envs.contains(&("OMP_NUM_THREADS".into(), "8".into())));
        assert!(envs.contains(&("OMP_PROC_BIND".into(), "spread".into())));
        assert!(envs.contains(&("OMP_PLACES".into(), "threads".into())));
        assert!(envs.contains(&("OMP_SCHEDULE".into(), "dynamic".into())));
        assert!(envs.contains(&("OMP_DYNAMIC".into(), "false".into())));
        assert!(envs.contains(&("OMP_NESTED".into(), "false".into())));
    }

    #[test]
    fn no_thread_override_leaves_environment_alone() {
        let runner = ProcessRunner::new("/opt/kernel");
        let cmd = runner.command(&Configuration::new(2, 1, Layout::Right), None);
        assert_eq!(cmd.get_envs().count(), 0);
    }

    #[test]
    fn unstartable_kernel_is_fatal() {
        let mut runner = ProcessRunner::new("/nonexistent/matbench-kernel");
        let err = runner
            .execute(&Configuration::new(2, 1, Layout::Right), None)
            .unwrap_err();
        assert!(matches!(err, BenchError::Spawn { .. }));
        assert!(!err.is_sample_failure());
    }
}
