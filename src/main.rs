mod cli;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command};
use matbench::app;
use matbench::bench::ProcessRunner;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Cli::parse()) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Run(args) => {
            let config = args.into_config();
            log::info!(
                "benchmarking {} with {} layout, threads {:?}, {} sample(s) per point",
                config.kernel.display(),
                config.layout,
                config.threads,
                config.repeat
            );
            let runner = ProcessRunner::new(&config.kernel);
            app::run_benchmarks(&config, runner)?;
        }
        Command::Compare(args) => {
            app::run_comparison(&args.into_config())?;
        }
    }
    Ok(())
}
