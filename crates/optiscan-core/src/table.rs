//! Two-column scan results.

/// One `(x, y)` row per sample, in scan order.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanTable {
    columns: [String; 2],
    rows: Vec<(f64, f64)>,
}

impl ScanTable {
    pub fn new(x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        Self {
            columns: [x_label.into(), y_label.into()],
            rows: Vec::new(),
        }
    }

    pub fn with_capacity(x_label: impl Into<String>, y_label: impl Into<String>, n: usize) -> Self {
        Self {
            rows: Vec::with_capacity(n),
            ..Self::new(x_label, y_label)
        }
    }

    pub fn push(&mut self, x: f64, y: f64) {
        self.rows.push((x, y));
    }

    /// Column labels: scanned parameter, then readout.
    pub fn columns(&self) -> &[String; 2] {
        &self.columns
    }

    pub fn rows(&self) -> &[(f64, f64)] {
        &self.rows
    }

    pub fn x(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|r| r.0)
    }

    pub fn y(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().map(|r| r.1)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
