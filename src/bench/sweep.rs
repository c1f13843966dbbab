use super::aggregate::Aggregator;
use super::error::BenchError;
use super::model::{Configuration, Layout, SweepKind, SweepResult, SWEEP_SIZES, THREAD_SWEEP_SIZE};
use super::runner::Runner;

/// Samples taken per sweep point unless configured otherwise.
pub const DEFAULT_REPEAT: usize = 3;

/// Walks the parameter space point by point, strictly in order.
///
/// A point that yields no usable sample fails the whole sweep: downstream
/// comparison needs complete, aligned tables.
pub struct SweepController<R> {
    aggregator: Aggregator<R>,
    repeat: usize,
}

impl<R: Runner> SweepController<R> {
    pub fn new(runner: R) -> Self {
        Self::with_repeat(runner, DEFAULT_REPEAT)
    }

    pub fn with_repeat(runner: R, repeat: usize) -> Self {
        Self {
            aggregator: Aggregator::new(runner),
            repeat,
        }
    }

    pub fn into_runner(self) -> R {
        self.aggregator.into_inner()
    }

    /// Sweep problem sizes 2..=2048 (powers of two) at a fixed thread count.
    ///
    /// Without `threads` the kernel keeps its own threading and rows are
    /// recorded as single-threaded.
    pub fn size_sweep(&mut self, layout: Layout, threads: Option<u32>) -> Result<SweepResult, BenchError> {
        let thread_count = threads.unwrap_or(1);
        let mut result = SweepResult::new(
            SweepKind::Sizes {
                threads: thread_count,
            },
            layout,
        );

        for size in SWEEP_SIZES {
            log::info!("benchmarking size {size}x{size} with {layout} layout");
            let config = Configuration::new(size, thread_count, layout);
            let record = self.aggregator.aggregate(config, threads, self.repeat)?;
            result.records.push(record);
        }
        Ok(result)
    }

    /// Sweep the given thread counts, in the given order, at size 1024.
    pub fn thread_sweep(&mut self, layout: Layout, thread_counts: &[u32]) -> Result<SweepResult, BenchError> {
        let mut result = SweepResult::new(
            SweepKind::Threads {
                size: THREAD_SWEEP_SIZE,
            },
            layout,
        );

        for &threads in thread_counts {
            log::info!("benchmarking with {threads} threads and {layout} layout");
            let config = Configuration::new(THREAD_SWEEP_SIZE, threads, layout);
            let record = self.aggregator.aggregate(config, Some(threads), self.repeat)?;
            result.records.push(record);
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::aggregate::tests::ScriptedRunner;
    use crate::bench::error::Metric;
    use crate::bench::model::Sample;

    #[test]
    fn size_sweep_covers_eleven_powers_of_two_in_order() {
        let mut ctl = SweepController::new(ScriptedRunner::samples(&[(1.0, 1.0)]));
        let result = ctl.size_sweep(Layout::Left, Some(2)).unwrap();

        let sizes: Vec<u32> = result.configurations().map(|c| c.problem_size).collect();
        assert_eq!(sizes, [2, 4, 8, 16, 32, 64, 128, 256, 512, 1024, 2048]);
        assert_eq!(result.kind, SweepKind::Sizes { threads: 2 });
        assert!(result
            .configurations()
            .all(|c| c.thread_count == 2 && c.layout == Layout::Left));
    }

    #[test]
    fn size_sweep_end_to_end_with_stub_runner() {
        let runner = ScriptedRunner::samples(&[(10.0, 5.0), (12.0, 5.0), (11.0, 5.0)]);
        let mut ctl = SweepController::with_repeat(runner, 3);
        let result = ctl.size_sweep(Layout::Right, Some(4)).unwrap();

        assert_eq!(result.len(), 11);
        for rec in &result.records {
            assert_eq!(rec.time_ms_mean, 11.0);
            assert_eq!(rec.time_ms_std, 1.0);
            assert_eq!(rec.gflops_mean, 5.0);
            assert_eq!(rec.gflops_std, 0.0);
            assert_eq!(rec.samples, Some(3));
        }

        let calls = ctl.into_runner().calls;
        assert_eq!(calls.len(), 33);
        assert!(calls.iter().all(|&(_, t)| t == Some(4)));
    }

    #[test]
    fn unpinned_size_sweep_records_one_thread() {
        let mut ctl = SweepController::with_repeat(ScriptedRunner::samples(&[(1.0, 1.0)]), 1);
        let result = ctl.size_sweep(Layout::Right, None).unwrap();
        assert_eq!(result.kind, SweepKind::Sizes { threads: 1 });
        assert!(result.configurations().all(|c| c.thread_count == 1));
        assert!(ctl.into_runner().calls.iter().all(|&(_, t)| t.is_none()));
    }

    #[test]
    fn thread_sweep_keeps_caller_order_and_duplicates() {
        let mut ctl = SweepController::new(ScriptedRunner::samples(&[(1.0, 1.0)]));
        let result = ctl.thread_sweep(Layout::Right, &[8, 1, 4, 4]).unwrap();

        let threads: Vec<u32> = result.configurations().map(|c| c.thread_count).collect();
        assert_eq!(threads, [8, 1, 4, 4]);
        assert!(result.configurations().all(|c| c.problem_size == 1024));
        assert_eq!(result.kind, SweepKind::Threads { size: 1024 });
    }

    #[test]
    fn failing_point_aborts_the_sweep() {
        // two good points (3 samples each), then a point where every sample fails
        let mut script: Vec<Result<Sample, Metric>> =
            vec![Ok(Sample { time_ms: 1.0, gflops: 1.0 }); 6];
        script.extend(vec![Err(Metric::Throughput); 3]);
        let mut ctl = SweepController::new(ScriptedRunner::cycling(script));

        let err = ctl.size_sweep(Layout::Right, Some(1)).unwrap_err();
        match err {
            BenchError::InsufficientSamples { configuration, .. } => {
                assert_eq!(configuration.problem_size, 8);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ctl.into_runner().calls.len(), 9, "no point after the failure runs");
    }
}
