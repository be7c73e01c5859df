//! Annotation analyzer.
//!
//! Scans `labels/<split>/*.txt` for the selected splits, counts images under
//! `images/<split>`, and aggregates per-class counts plus the width, height,
//! area and aspect-ratio distributions of every valid box.

mod report;

pub use report::{ClassRow, DatasetSummary, GeometryRow, SeriesSummary};

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AnalyzeConfig;
use crate::dataset::{
    collect_files, parse_line, AnnotationRecord, ClassSchema, LineOutcome, Split,
    IMAGE_EXTENSIONS, LABEL_EXTENSION,
};
use crate::error::PrepError;
use crate::plot::{self, PlotArtifact, PlotStyle};
use crate::progress::ProgressObserver;

/// One of the four box distributions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Distribution {
    Area,
    AspectRatio,
    Width,
    Height,
}

impl Distribution {
    pub const ALL: [Distribution; 4] = [
        Distribution::Width,
        Distribution::Height,
        Distribution::Area,
        Distribution::AspectRatio,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Distribution::Area => "area",
            Distribution::AspectRatio => "aspect ratio",
            Distribution::Width => "width",
            Distribution::Height => "height",
        }
    }
}

/// Files found for the selected splits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Inventory {
    pub splits: Vec<Split>,
    pub label_files: Vec<PathBuf>,
    /// Images found, whether or not they have a label file.
    pub image_count: usize,
}

/// Enumerate label files and count images for the configured splits.
pub fn collect_inventory(config: &AnalyzeConfig) -> Result<Inventory, PrepError> {
    let mut inventory = Inventory {
        splits: config.splits.clone(),
        ..Default::default()
    };

    for split in &config.splits {
        let labels_dir = config.layout.labels_dir(*split);
        let images_dir = config.layout.images_dir(*split);

        if !labels_dir.is_dir() {
            log::warn!("Label directory missing for split '{}': {}", split, labels_dir.display());
        }
        let labels = collect_files(&labels_dir, &[LABEL_EXTENSION])?;
        let images = collect_files(&images_dir, &IMAGE_EXTENSIONS)?;
        log::info!(
            "[{}] {} label file(s), {} image(s)",
            split,
            labels.len(),
            images.len()
        );

        inventory.label_files.extend(labels);
        inventory.image_count += images.len();
    }

    Ok(inventory)
}

/// Per-file line tallies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FileTally {
    pub lines: usize,
    pub records: usize,
    pub blank: usize,
    pub malformed: usize,
    pub out_of_range: usize,
}

/// What happened to one label file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileOutcome {
    Parsed(FileTally),
    /// Zero lines; not a labeled image.
    Empty,
    /// Could not be read; contributes nothing.
    Unreadable { reason: String },
}

/// Aggregated skip and outcome counts for a scan.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ScanReport {
    pub files_scanned: usize,
    pub parsed_files: usize,
    pub empty_files: usize,
    pub unreadable_files: usize,
    pub blank_lines: usize,
    pub malformed_lines: usize,
    pub out_of_range: usize,
}

impl ScanReport {
    pub fn record(&mut self, outcome: &FileOutcome) {
        self.files_scanned += 1;
        match outcome {
            FileOutcome::Parsed(tally) => {
                self.parsed_files += 1;
                self.blank_lines += tally.blank;
                self.malformed_lines += tally.malformed;
                self.out_of_range += tally.out_of_range;
            }
            FileOutcome::Empty => self.empty_files += 1,
            FileOutcome::Unreadable { .. } => self.unreadable_files += 1,
        }
    }
}

/// Aggregate statistics over every valid record scanned.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnnotationStats {
    pub class_names: Vec<String>,
    pub class_counts: Vec<usize>,
    pub total_images: usize,
    pub labeled_images: usize,
    pub total_annotations: usize,
    pub widths: Vec<f64>,
    pub heights: Vec<f64>,
    pub areas: Vec<f64>,
    pub aspect_ratios: Vec<f64>,
    pub scan: ScanReport,
}

impl AnnotationStats {
    pub fn new(schema: &ClassSchema, total_images: usize) -> Self {
        Self {
            class_names: schema.names().to_vec(),
            class_counts: vec![0; schema.len()],
            total_images,
            labeled_images: 0,
            total_annotations: 0,
            widths: Vec::new(),
            heights: Vec::new(),
            areas: Vec::new(),
            aspect_ratios: Vec::new(),
            scan: ScanReport::default(),
        }
    }

    /// Add a record whose class id is already known to be in range.
    fn push(&mut self, record: &AnnotationRecord) {
        self.class_counts[record.class_id as usize] += 1;
        self.total_annotations += 1;
        self.widths.push(record.width);
        self.heights.push(record.height);
        self.areas.push(record.area());
        self.aspect_ratios.push(record.aspect_ratio());
    }

    pub fn series(&self, distribution: Distribution) -> &[f64] {
        match distribution {
            Distribution::Area => &self.areas,
            Distribution::AspectRatio => &self.aspect_ratios,
            Distribution::Width => &self.widths,
            Distribution::Height => &self.heights,
        }
    }
}

/// Parse one label file into `stats`.
///
/// Unreadable files are reported and leave `stats` untouched.
pub fn analyze_file(path: &Path, schema: &ClassSchema, stats: &mut AnnotationStats) -> FileOutcome {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            return FileOutcome::Unreadable {
                reason: err.to_string(),
            }
        }
    };

    let mut tally = FileTally::default();
    for line in content.lines() {
        tally.lines += 1;
        match parse_line(line) {
            LineOutcome::Record(record) if schema.contains(record.class_id) => {
                tally.records += 1;
                stats.push(&record);
            }
            LineOutcome::Record(_) => tally.out_of_range += 1,
            LineOutcome::Blank => tally.blank += 1,
            LineOutcome::Malformed => tally.malformed += 1,
        }
    }

    if tally.lines == 0 {
        return FileOutcome::Empty;
    }
    stats.labeled_images += 1;
    FileOutcome::Parsed(tally)
}

/// Aggregate every label file in `inventory`.
pub fn analyze_labels(
    inventory: &Inventory,
    schema: &ClassSchema,
    progress: &mut dyn ProgressObserver,
) -> Result<AnnotationStats, PrepError> {
    if inventory.label_files.is_empty() {
        return Err(PrepError::NoLabelFiles {
            splits: Split::join(&inventory.splits),
        });
    }

    let mut stats = AnnotationStats::new(schema, inventory.image_count);
    progress.begin("labels", inventory.label_files.len());

    for path in &inventory.label_files {
        let outcome = analyze_file(path, schema, &mut stats);
        match &outcome {
            FileOutcome::Unreadable { reason } => {
                log::warn!("Skipping unreadable label file {}: {}", path.display(), reason)
            }
            FileOutcome::Empty => log::debug!("Empty label file {}", path.display()),
            FileOutcome::Parsed(tally) if tally.malformed + tally.out_of_range > 0 => log::debug!(
                "{}: {} malformed line(s), {} out-of-range class id(s)",
                path.display(),
                tally.malformed,
                tally.out_of_range
            ),
            FileOutcome::Parsed(_) => {}
        }
        stats.scan.record(&outcome);
        progress.advance();
    }

    progress.finish();
    log::info!(
        "Scanned {} label file(s): {} annotation(s) across {} labeled image(s)",
        stats.scan.files_scanned,
        stats.total_annotations,
        stats.labeled_images
    );

    Ok(stats)
}

/// Build the printable summary.
///
/// Percentages are relative to the total image count, so zero images is a
/// precondition failure.
pub fn summarize(stats: &AnnotationStats) -> Result<DatasetSummary, PrepError> {
    if stats.total_images == 0 {
        return Err(PrepError::NoImages);
    }

    let labeled_percentage = stats.labeled_images as f64 / stats.total_images as f64 * 100.0;

    let classes = stats
        .class_names
        .iter()
        .zip(&stats.class_counts)
        .map(|(name, &count)| ClassRow {
            name: name.clone(),
            count,
            percentage: (stats.total_annotations > 0)
                .then(|| count as f64 / stats.total_annotations as f64 * 100.0),
        })
        .collect();

    let geometry = Distribution::ALL
        .iter()
        .map(|&distribution| GeometryRow {
            distribution,
            summary: SeriesSummary::from_values(stats.series(distribution)),
        })
        .collect();

    Ok(DatasetSummary {
        total_images: stats.total_images,
        labeled_images: stats.labeled_images,
        labeled_percentage,
        total_annotations: stats.total_annotations,
        classes,
        geometry,
        scan: stats.scan.clone(),
    })
}

/// Everything produced by one analyzer run.
#[derive(Clone, Debug, Serialize)]
pub struct AnalysisRun {
    #[serde(skip)]
    pub stats: AnnotationStats,
    pub summary: DatasetSummary,
    pub plots: Vec<PlotArtifact>,
}

/// Inventory, aggregate, summarize and (optionally) plot.
pub fn run_analysis(
    config: &AnalyzeConfig,
    progress: &mut dyn ProgressObserver,
) -> Result<AnalysisRun, PrepError> {
    log::info!("Dataset analysis path: {}", config.layout.root().display());

    let inventory = collect_inventory(config)?;
    let stats = analyze_labels(&inventory, &config.schema, progress)?;
    let summary = summarize(&stats)?;

    let plots = if config.render_plots {
        let style = PlotStyle::load(config.font.as_deref())?;
        plot::render_all(&plot::default_histograms(), &stats, &config.plots_dir, &style)?
    } else {
        Vec::new()
    };

    Ok(AnalysisRun {
        stats,
        summary,
        plots,
    })
}
