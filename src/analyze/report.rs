//! Printable dataset summary.

use serde::Serialize;
use std::fmt;

use super::{Distribution, ScanReport};

const RULE_WIDTH: usize = 60;

/// One row of the class distribution table.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClassRow {
    pub name: String,
    pub count: usize,
    /// Share of all annotations; absent when there are none.
    pub percentage: Option<f64>,
}

/// Order statistics for one distribution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub count: usize,
    pub min: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub max: Option<f64>,
}

impl SeriesSummary {
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return Self {
                count: values.len(),
                ..Self::default()
            };
        }
        sorted.sort_by(f64::total_cmp);

        let n = sorted.len();
        let median = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };

        Self {
            count: values.len(),
            min: sorted.first().copied(),
            mean: Some(sorted.iter().sum::<f64>() / n as f64),
            median: Some(median),
            max: sorted.last().copied(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeometryRow {
    pub distribution: Distribution,
    #[serde(flatten)]
    pub summary: SeriesSummary,
}

/// Summary printed after an analyzer run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub total_images: usize,
    pub labeled_images: usize,
    pub labeled_percentage: f64,
    pub total_annotations: usize,
    pub classes: Vec<ClassRow>,
    pub geometry: Vec<GeometryRow>,
    pub scan: ScanReport,
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

/// Write a pipe table with padded columns.
fn write_table(
    f: &mut fmt::Formatter<'_>,
    headers: &[(&str, Align)],
    rows: &[Vec<String>],
) -> fmt::Result {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, (header, _))| {
            rows.iter()
                .map(|row| row[i].len())
                .chain(std::iter::once(header.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let cell = |text: &str, width: usize, align: Align| match align {
        Align::Left => format!(" {:<width$} ", text),
        Align::Right => format!(" {:>width$} ", text),
    };

    write!(f, "|")?;
    for ((header, align), width) in headers.iter().zip(&widths) {
        write!(f, "{}|", cell(header, *width, *align))?;
    }
    writeln!(f)?;

    write!(f, "|")?;
    for ((_, align), width) in headers.iter().zip(&widths) {
        let dashes = "-".repeat(*width);
        match align {
            Align::Left => write!(f, ":{}-|", dashes)?,
            Align::Right => write!(f, "-{}:|", dashes)?,
        }
    }
    writeln!(f)?;

    for row in rows {
        write!(f, "|")?;
        for ((value, (_, align)), width) in row.iter().zip(headers).zip(&widths) {
            write!(f, "{}|", cell(value, *width, *align))?;
        }
        writeln!(f)?;
    }
    Ok(())
}

fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => "-".to_string(),
    }
}

impl fmt::Display for DatasetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);
        writeln!(f, "{}", rule)?;
        writeln!(f, "## Training Dataset Summary")?;
        writeln!(f, "{}", rule)?;
        writeln!(f, "Total Images: {}", self.total_images)?;
        writeln!(
            f,
            "Labeled Images: {} ({:.2}%)",
            self.labeled_images, self.labeled_percentage
        )?;
        writeln!(f, "Total Annotations: {}", self.total_annotations)?;

        writeln!(f)?;
        writeln!(f, "### Class Distribution:")?;
        let rows: Vec<Vec<String>> = self
            .classes
            .iter()
            .map(|row| {
                vec![
                    row.name.clone(),
                    row.count.to_string(),
                    fmt_opt(row.percentage, 2),
                ]
            })
            .collect();
        write_table(
            f,
            &[
                ("Class", Align::Left),
                ("Count", Align::Right),
                ("Percentage", Align::Right),
            ],
            &rows,
        )?;

        writeln!(f)?;
        writeln!(f, "### Box Geometry (normalized):")?;
        let rows: Vec<Vec<String>> = self
            .geometry
            .iter()
            .map(|row| {
                vec![
                    row.distribution.label().to_string(),
                    row.summary.count.to_string(),
                    fmt_opt(row.summary.min, 4),
                    fmt_opt(row.summary.mean, 4),
                    fmt_opt(row.summary.median, 4),
                    fmt_opt(row.summary.max, 4),
                ]
            })
            .collect();
        write_table(
            f,
            &[
                ("Metric", Align::Left),
                ("Count", Align::Right),
                ("Min", Align::Right),
                ("Mean", Align::Right),
                ("Median", Align::Right),
                ("Max", Align::Right),
            ],
            &rows,
        )?;

        writeln!(f)?;
        writeln!(
            f,
            "Label files scanned: {} (empty: {}, unreadable: {})",
            self.scan.files_scanned, self.scan.empty_files, self.scan.unreadable_files
        )?;
        if self.scan.malformed_lines + self.scan.out_of_range > 0 {
            writeln!(
                f,
                "Skipped lines: {} malformed, {} with out-of-range class id",
                self.scan.malformed_lines, self.scan.out_of_range
            )?;
        }
        writeln!(f, "{}", rule)?;
        Ok(())
    }
}
