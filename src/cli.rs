use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use matbench::bench::Layout;
use matbench::config::{BenchConfig, CompareConfig, DEFAULT_KERNEL};
use matbench::store::TableFormat;

#[derive(Parser, Debug)]
#[command(name = "matbench")]
#[command(about = "Benchmark a matrix-product kernel across sizes, threads and layouts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run size sweeps and a thread sweep against the kernel
    #[command(alias = "bench")]
    Run(RunArgs),
    /// Compare result directories produced by `run`
    #[command(alias = "cmp")]
    Compare(CompareArgs),
}

/// Benchmark run arguments
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Memory layout to test
    #[arg(long, value_enum)]
    pub layout: Layout,

    /// Thread counts to test (e.g. 1 2 4 8)
    #[arg(
        long,
        required = true,
        num_args = 1..,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub threads: Vec<u32>,

    /// Kernel executable
    #[arg(long, env = "MATBENCH_KERNEL", default_value = DEFAULT_KERNEL, value_name = "PATH")]
    pub kernel: PathBuf,

    /// Samples per sweep point
    #[arg(long, default_value = "3", value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub repeat: u64,

    /// Directory receiving tables and charts
    #[arg(short, long, default_value = ".", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Table format
    #[arg(long, value_enum, default_value = "csv")]
    pub format: TableFormat,
}

impl RunArgs {
    pub fn into_config(self) -> BenchConfig {
        BenchConfig {
            kernel: self.kernel,
            layout: self.layout,
            threads: self.threads,
            repeat: self.repeat as usize,
            output_dir: self.output_dir,
            format: self.format,
        }
    }
}

/// Comparison arguments
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Result directories; the first is the baseline
    #[arg(required = true, num_args = 2.., value_name = "DIR")]
    pub dirs: Vec<PathBuf>,

    /// Size-sweep thread counts to compare (default: those of the baseline thread sweep)
    #[arg(long, num_args = 1.., value_parser = clap::value_parser!(u32).range(1..))]
    pub threads: Vec<u32>,

    /// Directory receiving comparison charts
    #[arg(short, long, default_value = "comparison_results", value_name = "DIR")]
    pub output_dir: PathBuf,
}

impl CompareArgs {
    pub fn into_config(self) -> CompareConfig {
        CompareConfig {
            dirs: self.dirs,
            threads: self.threads,
            output_dir: self.output_dir,
        }
    }
}
