//! Stand-in for the matrix-product kernel.
//!
//! Speaks the same command-line and stdout contract as the real executable
//! (`stub-kernel m n k layout`, threads from `OMP_NUM_THREADS`) but reports
//! timings from a simple throughput model instead of multiplying anything.
//! Set `MATBENCH_STUB_SEED` for reproducible noise.

use std::process::ExitCode;
use std::time::{SystemTime, UNIX_EPOCH};

/// Fraction of the work that does not parallelise.
const SERIAL_FRACTION: f64 = 0.05;
/// Launch and allocation overhead per run.
const OVERHEAD_MS: f64 = 0.02;
/// Relative run-to-run noise.
const NOISE: f64 = 0.02;

/// Run-to-run jitter drawn from a splitmix64 stream.
struct Jitter(u64);

impl Jitter {
    fn next_unit(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Multiplicative factor around 1 with standard deviation `spread`.
    ///
    /// Sum of twelve uniforms minus six is close enough to a unit normal here.
    fn factor(&mut self, spread: f64) -> f64 {
        let z: f64 = (0..12).map(|_| self.next_unit()).sum::<f64>() - 6.0;
        (1.0 + spread * z).max(0.5)
    }
}

/// Per-thread peak in GFLOP/s; the strided layout pays for cache misses.
fn peak_gflops(layout: &str) -> Option<f64> {
    match layout {
        "right" => Some(4.0),
        "left" => Some(1.5),
        _ => None,
    }
}

fn seed() -> u64 {
    if let Some(seed) = std::env::var("MATBENCH_STUB_SEED").ok().and_then(|s| s.parse().ok()) {
        return seed;
    }
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
        ^ u64::from(std::process::id())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let dims: Option<Vec<u64>> = args.iter().take(3).map(|a| a.parse().ok()).collect();

    let (Some(dims), Some(peak)) = (dims, args.get(3).and_then(|l| peak_gflops(l))) else {
        eprintln!("usage: stub-kernel <m> <n> <k> <right|left>");
        return ExitCode::from(2);
    };
    if args.len() != 4 || dims.iter().any(|&d| d == 0) {
        eprintln!("usage: stub-kernel <m> <n> <k> <right|left>");
        return ExitCode::from(2);
    }
    let (m, n, k) = (dims[0], dims[1], dims[2]);

    let threads: u32 = std::env::var("OMP_NUM_THREADS")
        .ok()
        .and_then(|t| t.parse().ok())
        .filter(|&t| t > 0)
        .unwrap_or(1);

    let flops = 2.0 * m as f64 * n as f64 * k as f64;
    let scaling = 1.0 / (SERIAL_FRACTION + (1.0 - SERIAL_FRACTION) / threads as f64);
    let ideal_ms = flops / (peak * scaling * 1e9) * 1e3 + OVERHEAD_MS;

    let time_ms = ideal_ms * Jitter(seed()).factor(NOISE);
    let gflops = flops / (time_ms * 1e6);

    println!("Matrix product {m}x{n}x{k} ({}, {threads} thread(s))", args[3]);
    println!("Temps d'exécution: {time_ms:.6} ms");
    println!("Performance: {gflops:.6} GFLOP/s");
    ExitCode::SUCCESS
}
