use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::bench::compare::{compare, ComparisonResult};
use crate::bench::model::{Layout, SweepResult};
use crate::bench::runner::Runner;
use crate::bench::sweep::SweepController;
use crate::chart;
use crate::config::{BenchConfig, CompareConfig};
use crate::store::{self, loader, writer};

// ---------------------------------------------------------------------------
// Benchmark run
// ---------------------------------------------------------------------------

/// One size sweep per requested thread count, then one thread sweep.
/// Every sweep leaves a table and a chart in the output directory.
///
/// Returns the paths written, in order.
pub fn run_benchmarks<R: Runner>(config: &BenchConfig, runner: R) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;

    let mut controller = SweepController::with_repeat(runner, config.repeat);
    let mut written = Vec::new();

    for &threads in &config.threads {
        log::info!("starting size sweep with {threads} thread(s)");
        let result = controller
            .size_sweep(config.layout, Some(threads))
            .with_context(|| format!("size sweep with {threads} thread(s) aborted"))?;
        written.extend(persist(&result, config)?);
    }

    log::info!("starting thread sweep");
    let result = controller
        .thread_sweep(config.layout, &config.threads)
        .context("thread sweep aborted")?;
    written.extend(persist(&result, config)?);

    Ok(written)
}

fn persist(result: &SweepResult, config: &BenchConfig) -> Result<[PathBuf; 2]> {
    let table = writer::save_sweep(result, &config.output_dir, config.format)?;
    let chart = chart::sweep_chart(result).save(&config.output_dir, &result.file_stem())?;
    Ok([table, chart])
}

// ---------------------------------------------------------------------------
// Comparison run
// ---------------------------------------------------------------------------

/// A result directory taking part in a comparison.
struct Source {
    name: String,
    dir: PathBuf,
    layout: Layout,
}

impl Source {
    fn open(dir: &Path) -> Result<Self> {
        let name = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| dir.display().to_string());
        let layout = store::detect_layout(dir)?;
        Ok(Source {
            name,
            dir: dir.to_path_buf(),
            layout,
        })
    }
}

/// Compare the thread sweeps and the selected size sweeps of several result
/// directories against the first one. Returns the chart paths written.
pub fn run_comparison(config: &CompareConfig) -> Result<Vec<PathBuf>> {
    let sources = config
        .dirs
        .iter()
        .map(|d| Source::open(d))
        .collect::<Result<Vec<_>>>()?;
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;

    let mut written = Vec::new();

    // Thread sweeps: throughput, time and speedup.
    let tables = sources
        .iter()
        .map(|s| loader::load_table(&store::thread_table_path(&s.dir, s.layout)?))
        .collect::<Result<Vec<_>>>()?;
    let result = compare(&tables[0], &tables[1..]).context("comparing thread sweeps")?;
    log_comparison("thread sweep", &sources, &result);
    let artifact = chart::thread_comparison_chart(&label_tables(&sources, &tables), &result.speedups);
    written.push(artifact.save(&config.output_dir, &artifact.title)?);

    // Size sweeps: one comparison per thread count.
    let thread_counts = if config.threads.is_empty() {
        let mut seen = Vec::new();
        for c in tables[0].configurations() {
            if !seen.contains(&c.thread_count) {
                seen.push(c.thread_count);
            }
        }
        seen
    } else {
        config.threads.clone()
    };

    for threads in thread_counts {
        let tables = sources
            .iter()
            .map(|s| loader::load_table(&store::size_table_path(&s.dir, s.layout, threads)?))
            .collect::<Result<Vec<_>>>()?;
        let result = compare(&tables[0], &tables[1..])
            .with_context(|| format!("comparing size sweeps with {threads} thread(s)"))?;
        log_comparison(&format!("size sweep, {threads} thread(s)"), &sources, &result);
        let artifact = chart::size_comparison_chart(threads, &label_tables(&sources, &tables), &result.ratios);
        written.push(artifact.save(&config.output_dir, &artifact.title)?);
    }

    Ok(written)
}

fn label_tables<'a>(sources: &'a [Source], tables: &'a [SweepResult]) -> Vec<(&'a str, &'a SweepResult)> {
    sources.iter().map(|s| s.name.as_str()).zip(tables).collect()
}

fn log_comparison(what: &str, sources: &[Source], result: &ComparisonResult) {
    let base = &sources[0].name;
    for (source, ratios) in sources[1..].iter().zip(&result.ratios) {
        let text: Vec<String> = ratios.iter().map(|r| r.to_string()).collect();
        log::info!("{what}: GFLOP/s {}/{base}: [{}]", source.name, text.join(", "));
    }
    for (source, series) in sources.iter().zip(&result.speedups) {
        let text: Vec<String> = series
            .thread_counts
            .iter()
            .zip(&series.speedups)
            .map(|(t, s)| format!("{t}: {s}"))
            .collect();
        log::info!("{what}: speedup {}: [{}]", source.name, text.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::error::BenchError;
    use crate::bench::model::{Configuration, Sample};
    use crate::store::TableFormat;

    /// Time shrinks with threads; throughput depends on layout.
    struct ModelRunner {
        left_penalty: f64,
    }

    impl Runner for ModelRunner {
        fn execute(&mut self, config: &Configuration, threads: Option<u32>) -> Result<Sample, BenchError> {
            let t = threads.unwrap_or(1) as f64;
            let gflops = match config.layout {
                Layout::Right => 8.0 * t,
                Layout::Left => 8.0 * t / self.left_penalty,
            };
            Ok(Sample {
                time_ms: 100.0 / gflops,
                gflops,
            })
        }
    }

    fn bench(dir: &Path, layout: Layout) -> Vec<PathBuf> {
        let mut config = BenchConfig::new(layout, vec![1, 2]);
        config.output_dir = dir.to_path_buf();
        config.repeat = 2;
        config.format = TableFormat::Csv;
        run_benchmarks(&config, ModelRunner { left_penalty: 4.0 }).unwrap()
    }

    #[test]
    fn run_writes_table_and_chart_per_sweep() {
        let dir = tempfile::tempdir().unwrap();
        let written = bench(dir.path(), Layout::Right);
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            [
                "benchmark_sizes_right_1threads.csv",
                "benchmark_sizes_right_1threads.chart.json",
                "benchmark_sizes_right_2threads.csv",
                "benchmark_sizes_right_2threads.chart.json",
                "benchmark_threads_right.csv",
                "benchmark_threads_right.chart.json",
            ]
        );

        let threads = loader::load_table(&written[4]).unwrap();
        assert_eq!(threads.len(), 2);
        assert_eq!(threads.records[1].gflops_mean, 16.0);
    }

    #[test]
    fn compare_directories_of_two_layouts() {
        let root = tempfile::tempdir().unwrap();
        let right = root.path().join("right_run");
        let left = root.path().join("left_run");
        bench(&right, Layout::Right);
        bench(&left, Layout::Left);

        let out = root.path().join("cmp");
        let config = CompareConfig {
            dirs: vec![right, left],
            threads: Vec::new(),
            output_dir: out.clone(),
        };
        let written = run_comparison(&config).unwrap();
        assert_eq!(
            written,
            [
                out.join("comparison_configs_threads.chart.json"),
                out.join("comparison_1threads.chart.json"),
                out.join("comparison_2threads.chart.json"),
            ]
        );

        let chart: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&written[1]).unwrap()).unwrap();
        let ratio = &chart["panels"][2]["series"][0];
        assert_eq!(ratio["label"], "Ratio left_run/right_run");
        assert_eq!(ratio["points"][0]["y"], 0.25);
    }

    #[test]
    fn compare_reports_missing_peer_table() {
        let root = tempfile::tempdir().unwrap();
        let right = root.path().join("right_run");
        let left = root.path().join("left_run");
        bench(&right, Layout::Right);
        bench(&left, Layout::Left);
        std::fs::remove_file(left.join("benchmark_sizes_left_2threads.csv")).unwrap();

        let config = CompareConfig {
            dirs: vec![right, left],
            threads: vec![2],
            output_dir: root.path().join("cmp"),
        };
        let err = run_comparison(&config).unwrap_err();
        assert!(format!("{err:#}").contains("benchmark_sizes_left_2threads"));
    }
}
