use super::error::BenchError;
use super::model::{AggregatedRecord, Configuration};
use super::runner::Runner;
use super::stats::RunningStats;

/// Repeats a [`Runner`] and reduces its samples to mean / standard deviation.
pub struct Aggregator<R> {
    runner: R,
}

impl<R: Runner> Aggregator<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn into_inner(self) -> R {
        self.runner
    }

    /// Run `repeat` samples of `config` and reduce the ones that parsed.
    ///
    /// Unusable samples are dropped (never retried) and the record's
    /// `samples` field reports how many were kept. Errors that can never
    /// yield a sample, such as a missing executable, abort immediately.
    pub fn aggregate(
        &mut self,
        config: Configuration,
        threads: Option<u32>,
        repeat: usize,
    ) -> Result<AggregatedRecord, BenchError> {
        let mut time = RunningStats::new();
        let mut gflops = RunningStats::new();

        for attempt in 1..=repeat {
            match self.runner.execute(&config, threads) {
                Ok(sample) => {
                    time.push(sample.time_ms);
                    gflops.push(sample.gflops);
                }
                Err(e) if e.is_sample_failure() => {
                    log::warn!("discarding sample {attempt}/{repeat} for {config}: {e}");
                }
                Err(e) => return Err(e),
            }
        }

        let (Some(time_ms_mean), Some(gflops_mean)) = (time.mean(), gflops.mean()) else {
            return Err(BenchError::InsufficientSamples {
                configuration: config,
                attempts: repeat,
            });
        };

        if time.count() < repeat {
            log::warn!("{config}: only {} of {repeat} samples usable", time.count());
        }

        Ok(AggregatedRecord {
            configuration: config,
            time_ms_mean,
            time_ms_std: time.sample_std(),
            gflops_mean,
            gflops_std: gflops.sample_std(),
            samples: Some(time.count()),
        })
    }
}
