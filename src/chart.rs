//! Renderer-neutral chart descriptions written next to each table.
//!
//! Nothing here draws: a chart is a JSON document of panels and series with
//! error bars that an external plotting tool turns into an image.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use palette::{Hsl, IntoColor, Srgb};
use serde::Serialize;

use crate::bench::compare::{Ratio, SpeedupSeries};
use crate::bench::model::{AggregatedRecord, SweepKind, SweepResult};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct `#rrggbb` colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            let rgb: Srgb<u8> = rgb.into_format();
            format!("#{:02x}{:02x}{:02x}", rgb.red, rgb.green, rgb.blue)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Chart model
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Linear,
    Log2,
    Log10,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    /// `None` where the value is undefined (e.g. a degenerate ratio).
    pub y: Option<f64>,
    pub err: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub color: String,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReferenceLine {
    /// `y = value` across the panel.
    Horizontal { y: f64, label: String },
    /// `y = x`, e.g. ideal speedup.
    Identity { label: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_scale: Scale,
    pub y_scale: Scale,
    pub series: Vec<Series>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reference_lines: Vec<ReferenceLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub title: String,
    pub panels: Vec<Panel>,
}

impl Chart {
    /// Write as pretty JSON to `<dir>/<stem>.chart.json`.
    pub fn save(&self, dir: &Path, stem: &str) -> Result<PathBuf> {
        let path = dir.join(format!("{stem}.chart.json"));
        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("wrote chart {}", path.display());
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Axis of a table: problem size for size sweeps, thread count otherwise.
fn axis(kind: SweepKind) -> (&'static str, Scale) {
    match kind {
        SweepKind::Sizes { .. } => ("Matrix size", Scale::Log2),
        SweepKind::Threads { .. } => ("Threads", Scale::Linear),
    }
}

fn x_of(kind: SweepKind, r: &AggregatedRecord) -> f64 {
    match kind {
        SweepKind::Sizes { .. } => r.configuration.problem_size as f64,
        SweepKind::Threads { .. } => r.configuration.thread_count as f64,
    }
}

fn metric_series(
    table: &SweepResult,
    label: &str,
    color: &str,
    metric: fn(&AggregatedRecord) -> (f64, f64),
) -> Series {
    Series {
        label: label.to_string(),
        color: color.to_string(),
        points: table
            .records
            .iter()
            .map(|r| {
                let (y, err) = metric(r);
                Point {
                    x: x_of(table.kind, r),
                    y: Some(y),
                    err: Some(err),
                }
            })
            .collect(),
    }
}

fn gflops(r: &AggregatedRecord) -> (f64, f64) {
    (r.gflops_mean, r.gflops_std)
}

fn time_ms(r: &AggregatedRecord) -> (f64, f64) {
    (r.time_ms_mean, r.time_ms_std)
}

fn ratio_points(xs: impl Iterator<Item = f64>, ratios: &[Ratio]) -> Vec<Point> {
    xs.zip(ratios)
        .map(|(x, r)| match *r {
            Ratio::Value { value, error } => Point {
                x,
                y: Some(value),
                err: Some(error),
            },
            Ratio::Undefined => Point { x, y: None, err: None },
        })
        .collect()
}

/// Throughput and time panels for the given named tables (all aligned on
/// the first table's axis).
fn metric_panels(named: &[(&str, &SweepResult)], subtitle: &str, time_scale: Scale) -> Vec<Panel> {
    let Some((_, first)) = named.first() else {
        return Vec::new();
    };
    let (x_label, x_scale) = axis(first.kind);
    let colors = generate_palette(named.len());

    let panel = |title: &str, y_label: &str, y_scale: Scale, metric: fn(&AggregatedRecord) -> (f64, f64)| Panel {
        title: format!("{title}\n{subtitle}"),
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        x_scale,
        y_scale,
        series: named
            .iter()
            .zip(&colors)
            .map(|((name, table), color)| metric_series(table, name, color, metric))
            .collect(),
        reference_lines: Vec::new(),
    };

    vec![
        panel("Performance", "Performance (GFLOP/s)", Scale::Linear, gflops),
        panel("Execution time", "Execution time (ms)", time_scale, time_ms),
    ]
}

/// Throughput and time against the sweep axis for one table.
pub fn sweep_chart(table: &SweepResult) -> Chart {
    let (label, subtitle) = match table.kind {
        SweepKind::Sizes { threads } => (
            format!("Layout {} ({threads} thread(s))", table.layout),
            format!("Layout: {}, Threads: {threads}", table.layout),
        ),
        SweepKind::Threads { size } => (
            format!("Layout {}", table.layout),
            format!("Layout: {}, Size: {size}", table.layout),
        ),
    };
    Chart {
        title: table.file_stem(),
        panels: metric_panels(&[(label.as_str(), table)], &subtitle, Scale::Linear),
    }
}

/// Size-sweep comparison: throughput, time, and throughput ratios of each
/// peer over the first table.
pub fn size_comparison_chart(
    threads: u32,
    named: &[(&str, &SweepResult)],
    ratios: &[Vec<Ratio>],
) -> Chart {
    let subtitle = format!("{threads} thread(s)");
    let mut panels = metric_panels(named, &subtitle, Scale::Log10);

    if let Some((base_name, base)) = named.first() {
        let colors = generate_palette(named.len());
        let xs = || base.configurations().map(|c| c.problem_size as f64);
        panels.push(Panel {
            title: format!("Performance ratios\n{subtitle}"),
            x_label: "Matrix size".to_string(),
            y_label: "Performance ratio".to_string(),
            x_scale: Scale::Log2,
            y_scale: Scale::Linear,
            series: named[1..]
                .iter()
                .zip(ratios)
                .zip(colors.iter().skip(1))
                .map(|(((name, _), series), color)| Series {
                    label: format!("Ratio {name}/{base_name}"),
                    color: color.clone(),
                    points: ratio_points(xs(), series),
                })
                .collect(),
            reference_lines: vec![ReferenceLine::Horizontal {
                y: 1.0,
                label: "Equal".to_string(),
            }],
        });
    }

    Chart {
        title: format!("comparison_{threads}threads"),
        panels,
    }
}

/// Thread-sweep comparison: throughput, time, and speedup with the ideal line.
pub fn thread_comparison_chart(named: &[(&str, &SweepResult)], speedups: &[SpeedupSeries]) -> Chart {
    let subtitle = "across configurations";
    let mut panels = metric_panels(named, subtitle, Scale::Log10);
    let colors = generate_palette(named.len());

    panels.push(Panel {
        title: "Speedup vs thread count".to_string(),
        x_label: "Threads".to_string(),
        y_label: "Speedup".to_string(),
        x_scale: Scale::Linear,
        y_scale: Scale::Linear,
        series: named
            .iter()
            .zip(speedups)
            .zip(&colors)
            .map(|(((name, _), series), color)| Series {
                label: name.to_string(),
                color: color.clone(),
                points: ratio_points(series.thread_counts.iter().map(|&t| t as f64), &series.speedups),
            })
            .collect(),
        reference_lines: vec![ReferenceLine::Identity {
            label: "Ideal speedup".to_string(),
        }],
    });

    Chart {
        title: "comparison_configs_threads".to_string(),
        panels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::model::{Configuration, Layout};

    fn table(kind: SweepKind, layout: Layout, axis: &[u32]) -> SweepResult {
        SweepResult {
            kind,
            layout,
            records: axis
                .iter()
                .map(|&v| {
                    let (size, threads) = match kind {
                        SweepKind::Sizes { threads } => (v, threads),
                        SweepKind::Threads { size } => (size, v),
                    };
                    AggregatedRecord {
                        configuration: Configuration::new(size, threads, layout),
                        time_ms_mean: v as f64,
                        time_ms_std: 0.5,
                        gflops_mean: 2.0,
                        gflops_std: 0.1,
                        samples: Some(3),
                    }
                })
                .collect(),
        }
    }

    #[test]
    fn palette_colours_are_distinct_hex() {
        let colors = generate_palette(4);
        assert_eq!(colors.len(), 4);
        for c in &colors {
            assert_eq!(c.len(), 7);
            assert!(c.starts_with('#'));
        }
        let unique: std::collections::BTreeSet<_> = colors.iter().collect();
        assert_eq!(unique.len(), 4);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn sweep_chart_uses_size_axis() {
        let t = table(SweepKind::Sizes { threads: 2 }, Layout::Right, &[2, 4, 8]);
        let chart = sweep_chart(&t);
        assert_eq!(chart.title, "benchmark_sizes_right_2threads");
        assert_eq!(chart.panels.len(), 2);
        let xs: Vec<f64> = chart.panels[0].series[0].points.iter().map(|p| p.x).collect();
        assert_eq!(xs, [2.0, 4.0, 8.0]);
        assert_eq!(chart.panels[0].x_scale, Scale::Log2);
    }

    #[test]
    fn undefined_ratios_become_gaps() {
        let base = table(SweepKind::Sizes { threads: 1 }, Layout::Right, &[2, 4]);
        let peer = table(SweepKind::Sizes { threads: 1 }, Layout::Left, &[2, 4]);
        let ratios = vec![vec![Ratio::Undefined, Ratio::Value { value: 1.5, error: 0.1 }]];
        let chart = size_comparison_chart(1, &[("a", &base), ("b", &peer)], &ratios);

        let ratio_panel = chart.panels.last().unwrap();
        let points = &ratio_panel.series[0].points;
        assert_eq!(points[0].y, None);
        assert_eq!(points[1].y, Some(1.5));
        assert_eq!(ratio_panel.series[0].label, "Ratio b/a");

        let json = serde_json::to_value(&chart).unwrap();
        assert!(json["panels"][2]["series"][0]["points"][0]["y"].is_null());
        assert_eq!(json["panels"][2]["reference_lines"][0]["kind"], "horizontal");
    }

    #[test]
    fn thread_comparison_has_ideal_line() {
        let t = table(SweepKind::Threads { size: 1024 }, Layout::Right, &[1, 2]);
        let speedups = vec![SpeedupSeries {
            thread_counts: vec![1, 2],
            speedups: vec![Ratio::Value { value: 1.0, error: 0.0 }, Ratio::Value { value: 1.9, error: 0.2 }],
        }];
        let chart = thread_comparison_chart(&[("cfg", &t)], &speedups);
        assert_eq!(chart.panels.len(), 3);
        assert_eq!(
            chart.panels[2].reference_lines,
            [ReferenceLine::Identity {
                label: "Ideal speedup".to_string()
            }]
        );
    }

    #[test]
    fn save_writes_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let t = table(SweepKind::Threads { size: 1024 }, Layout::Left, &[1, 4]);
        let path = sweep_chart(&t).save(dir.path(), &t.file_stem()).unwrap();
        assert!(path.ends_with("benchmark_threads_left.chart.json"));
        let parsed: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed["title"], "benchmark_threads_left");
    }
}
