use anyhow::{anyhow, Result};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::pipeline::{Pipeline, PipelinePhase, RunSummary};

// @module: Application controller for PDF translation runs

/// Outcome of a folder run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderReport {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller for PDF translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Page pipeline built from the configuration
    pipeline: Pipeline,
    // @field: Draw progress bars
    show_progress: bool,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let pipeline = Pipeline::from_config(&config)?;
        Ok(Self {
            config,
            pipeline,
            show_progress: true,
        })
    }

    // @method: Create a controller around an existing pipeline
    pub fn with_pipeline(config: Config, pipeline: Pipeline) -> Self {
        Self {
            config,
            pipeline,
            show_progress: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Translate one PDF
    ///
    /// # Returns
    /// * `Ok(Some(summary))` - The output was written
    /// * `Ok(None)` - The output already exists and `force_overwrite` is off
    pub async fn run(&self, input_file: PathBuf, output: Option<PathBuf>, force_overwrite: bool) -> Result<Option<RunSummary>> {
        let multi_progress = MultiProgress::new();
        self.run_with_progress(&input_file, output, &multi_progress, force_overwrite).await
    }

    async fn run_with_progress(
        &self,
        input_file: &Path,
        output: Option<PathBuf>,
        multi_progress: &MultiProgress,
        force_overwrite: bool,
    ) -> Result<Option<RunSummary>> {
        let start_time = std::time::Instant::now();

        if !FileManager::file_exists(input_file) {
            return Err(anyhow!("Input file does not exist: {:?}", input_file));
        }

        let output_path = match output {
            Some(path) => path,
            None => {
                let output_dir = input_file.parent().unwrap_or(Path::new("."));
                FileManager::generate_output_path(input_file, output_dir)
            }
        };

        if output_path.exists() && !force_overwrite {
            warn!(
                "Skipping {:?}, {:?} already exists (use -f to force overwrite)",
                input_file, output_path
            );
            return Ok(None);
        }

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                FileManager::ensure_dir(parent)?;
            }
        }

        let target = self.config.target()?;
        info!("📄 {:?} -> {:?}", input_file, output_path);

        let progress_bar = if self.show_progress {
            multi_progress.add(ProgressBar::new(0))
        } else {
            ProgressBar::hidden()
        };
        progress_bar.set_style(Self::progress_style("pages"));

        let observer = |phase: PipelinePhase, done: usize, total: usize| {
            progress_bar.set_length(total as u64);
            progress_bar.set_position(done as u64);
            progress_bar.set_message(phase.to_string());
        };

        let result = self
            .pipeline
            .process_with_progress(input_file, &output_path, target, observer)
            .await;

        match result {
            Ok(summary) => {
                progress_bar.finish_and_clear();
                info!(
                    "Translation complete in {}: {}",
                    Self::format_duration(start_time.elapsed()),
                    summary
                );
                if summary.fallback_pages > 0 {
                    warn!(
                        "{} page(s) were left untranslated because the translation service failed",
                        summary.fallback_pages
                    );
                }
                Ok(Some(summary))
            }
            Err(e) => {
                progress_bar.abandon();
                Err(e)
            }
        }
    }

    /// Translate every PDF under `input_dir`, writing each output next to its input
    pub async fn run_folder(&self, input_dir: PathBuf, force_overwrite: bool) -> Result<FolderReport> {
        let start_time = std::time::Instant::now();

        if !FileManager::dir_exists(&input_dir) {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let pdf_files: Vec<PathBuf> = FileManager::find_files(&input_dir, "pdf")?
            .into_iter()
            .filter(|path| !FileManager::is_generated_output(path))
            .collect();

        if pdf_files.is_empty() {
            warn!("No PDF files found in {:?}", input_dir);
            return Ok(FolderReport::default());
        }
        info!("Found {} PDF file(s) in {:?}", pdf_files.len(), input_dir);

        let multi_progress = MultiProgress::new();
        let folder_pb = if self.show_progress {
            multi_progress.add(ProgressBar::new(pdf_files.len() as u64))
        } else {
            ProgressBar::hidden()
        };
        folder_pb.set_style(Self::progress_style("files"));
        folder_pb.set_message("Processing files");

        let mut report = FolderReport::default();
        for pdf_file in &pdf_files {
            let file_name = pdf_file
                .file_name()
                .map(|f| f.to_string_lossy().to_string())
                .unwrap_or_else(|| "unknown".to_string());
            folder_pb.set_message(format!("Processing: {}", file_name));

            match self.run_with_progress(pdf_file, None, &multi_progress, force_overwrite).await {
                Ok(Some(_)) => report.processed += 1,
                Ok(None) => report.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", file_name, e);
                    report.failed += 1;
                }
            }

            folder_pb.inc(1);
        }

        folder_pb.finish_with_message("Folder processing complete");
        info!(
            "Folder processing completed in {}: {} processed, {} skipped, {} errors",
            Self::format_duration(start_time.elapsed()),
            report.processed,
            report.skipped,
            report.failed
        );

        Ok(report)
    }

    fn progress_style(unit: &str) -> ProgressStyle {
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}}",
                unit
            ))
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░")
    }

    pub fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
