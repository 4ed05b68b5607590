//! Scan result files: `scan.csv` and `scan.png`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use optiscan_core::ScanTable;
use plotters::prelude::*;
use thiserror::Error;

pub const CSV_NAME: &str = "scan.csv";
pub const PNG_NAME: &str = "scan.png";

const PLOT_SIZE: (u32, u32) = (640, 480);

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Cannot create output directory '{}': {source}", path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot render plot '{}': {message}", path.display())]
    Plot { path: PathBuf, message: String },
}

/// Paths of the files written for one scan.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub csv: PathBuf,
    pub png: PathBuf,
}

/// Create `dir` and any missing parents.
pub fn ensure_dir(dir: &Path) -> Result<(), OutputError> {
    std::fs::create_dir_all(dir).map_err(|source| OutputError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write the table and its plot under `dir`, replacing earlier results.
pub fn write_outputs(table: &ScanTable, dir: &Path, title: &str) -> Result<OutputPaths, OutputError> {
    ensure_dir(dir)?;
    let paths = OutputPaths {
        csv: dir.join(CSV_NAME),
        png: dir.join(PNG_NAME),
    };
    write_scan_csv(table, &paths.csv)?;
    plot_scan(table, &paths.png, title)?;
    Ok(paths)
}

/// Write the table as comma-separated text with a header row.
pub fn write_scan_csv(table: &ScanTable, path: &Path) -> Result<(), OutputError> {
    let write_err = |source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut file = BufWriter::new(File::create(path).map_err(write_err)?);
    let [x_label, y_label] = table.columns();
    writeln!(file, "{},{}", csv_field(x_label), csv_field(y_label)).map_err(write_err)?;
    for &(x, y) in table.rows() {
        writeln!(file, "{},{}", csv_value(x), csv_value(y)).map_err(write_err)?;
    }
    file.flush().map_err(write_err)?;

    log::info!("{} row(s) written to {}", table.len(), path.display());
    Ok(())
}

fn csv_field(s: &str) -> String {
    if s.contains(|c: char| matches!(c, ',' | '"' | '\n')) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn csv_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else {
        format!("{:e}", v)
    }
}

/// Render a single line plot of the table's second column against its first.
pub fn plot_scan(table: &ScanTable, path: &Path, title: &str) -> Result<(), OutputError> {
    let [x_label, y_label] = table.columns();
    let (x_min, x_max) = axis_range(table.x(), 0.0);
    let (y_min, y_max) = axis_range(table.y(), 0.05);

    let root = BitMapBackend::new(path, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| plot_error(path, e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 20).into_font())
        .margin(12)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| plot_error(path, e))?;

    chart
        .configure_mesh()
        .x_desc(x_label.as_str())
        .y_desc(y_label.as_str())
        .x_label_formatter(&|v| format!("{:.2e}", v))
        .y_label_formatter(&|v| format!("{:.2e}", v))
        .draw()
        .map_err(|e| plot_error(path, e))?;

    for segment in finite_segments(table.rows()) {
        if segment.len() == 1 {
            chart
                .draw_series(segment.iter().map(|&p| Circle::new(p, 3, BLUE.filled())))
                .map_err(|e| plot_error(path, e))?;
        } else {
            chart
                .draw_series(LineSeries::new(segment.iter().copied(), BLUE.stroke_width(2)))
                .map_err(|e| plot_error(path, e))?;
        }
    }

    root.present().map_err(|e| plot_error(path, e))?;
    log::info!("plot written to {}", path.display());
    Ok(())
}

fn plot_error(path: &Path, e: impl std::fmt::Display) -> OutputError {
    OutputError::Plot {
        path: path.to_path_buf(),
        message: e.to_string(),
    }
}

/// Runs of consecutive rows where both values are finite.
fn finite_segments(rows: &[(f64, f64)]) -> Vec<&[(f64, f64)]> {
    rows.split(|(x, y)| !x.is_finite() || !y.is_finite())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Min/max over the finite values, padded by `margin` of the span.
///
/// Empty or constant data gets a non-degenerate range around its value.
fn axis_range(values: impl Iterator<Item = f64>, margin: f64) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    if span == 0.0 {
        let pad = if lo == 0.0 { 1.0 } else { lo.abs() * 0.1 };
        return (lo - pad, hi + pad);
    }
    (lo - span * margin, hi + span * margin)
}
