use crate::client::{RemoveBgClient, TransformClient};
use crate::composite::{Compositor, ZipCompositor};
use crate::constants::{
    API_ENDPOINT, CLIENT_VERSION, DEFAULT_OUTPUT_EXTENSION, FORMAT_PNG, MIME_ZIP, REMOVEBG_SUFFIX,
    TEMP_ZIP_SUFFIX, USER_AGENT_PREFIX,
};
use crate::error::Result;
use crate::notifier::{LogNotifier, Notifier};
use crate::prompt::{Prompt, TerminalPrompt};
use crate::settings::{RequestParams, Settings};
use crate::storage::{FileStorage, Storage};
use std::path::{Path, PathBuf};

/// Values that would otherwise be process-wide globals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    pub api_key: String,
    pub endpoint: String,
    pub user_agent: String,
}

impl ProcessorConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: API_ENDPOINT.to_string(),
            user_agent: format!("{}-{}", USER_AGENT_PREFIX, CLIENT_VERSION),
        }
    }
}

/// Counts of what happened during one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Stopped early after a rate limit rejection.
    pub halted: bool,
    /// Large batch confirmation was declined.
    pub cancelled: bool,
}

/// Runs a batch of images through the background removal service.
pub struct Processor {
    config: ProcessorConfig,
    client: Box<dyn TransformClient>,
    storage: Box<dyn Storage>,
    prompt: Box<dyn Prompt>,
    notifier: Box<dyn Notifier>,
    compositor: Box<dyn Compositor>,
}

impl Processor {
    pub fn new(
        config: ProcessorConfig,
        client: Box<dyn TransformClient>,
        storage: Box<dyn Storage>,
        prompt: Box<dyn Prompt>,
        notifier: Box<dyn Notifier>,
        compositor: Box<dyn Compositor>,
    ) -> Self {
        Self {
            config,
            client,
            storage,
            prompt,
            notifier,
            compositor,
        }
    }

    /// Wires up the HTTP client, local filesystem, terminal prompt and log output.
    pub fn with_defaults(config: ProcessorConfig, show_progress: bool) -> Result<Self> {
        let client =
            RemoveBgClient::with_endpoint(config.endpoint.clone(), config.user_agent.clone())?;

        Ok(Self::new(
            config,
            Box::new(client),
            Box::new(FileStorage),
            Box::new(TerminalPrompt),
            Box::new(LogNotifier::new(show_progress)),
            Box::new(ZipCompositor::new(FileStorage)),
        ))
    }

    /// Processes every file matched by `raw_input_paths`, in order.
    ///
    /// Per-file failures are reported to the notifier and do not stop the
    /// batch, except a rate limit rejection which halts it. Only setup
    /// failures (output directory, glob expansion) are returned as `Err`.
    pub fn process(
        &self,
        raw_input_paths: &[String],
        settings: Settings,
    ) -> Result<BatchSummary> {
        if let Some(output_directory) = &settings.output_directory {
            self.storage.mkdir_all(output_directory)?;
        }

        let input_paths = self.storage.expand_paths(raw_input_paths)?;
        let total = input_paths.len();
        let mut summary = BatchSummary {
            total,
            ..Default::default()
        };

        if !self.confirm_large_batch(total, settings.large_batch_confirm_threshold) {
            tracing::info!("Batch of {} images cancelled", total);
            summary.cancelled = true;
            return Ok(summary);
        }

        let params = settings.request_params();

        for (position, input_path) in input_paths.iter().enumerate() {
            let index = position + 1;
            let output_path = determine_output_path(input_path, &settings);

            if self.storage.file_exists(&output_path) && !settings.reprocess_existing {
                self.notifier.skip(input_path, &output_path, index, total);
                summary.skipped += 1;
                continue;
            }

            match self.process_file(input_path, &output_path, &params) {
                Ok(()) => {
                    self.notifier.success(input_path, index, total);
                    summary.succeeded += 1;
                }
                Err(e) => {
                    self.notifier.error(&e, input_path, index, total);
                    summary.failed += 1;

                    // Every further request would be rejected too
                    if e.is_rate_limit() {
                        summary.halted = true;
                        break;
                    }
                }
            }
        }

        self.notifier.finish();
        Ok(summary)
    }

    fn confirm_large_batch(&self, batch_size: usize, threshold: i64) -> bool {
        if threshold < 0 {
            return true;
        }
        let below_threshold = usize::try_from(threshold).map_or(true, |t| batch_size < t);
        below_threshold || self.prompt.confirm_large_batch(batch_size)
    }

    fn process_file(
        &self,
        input_path: &Path,
        output_path: &Path,
        params: &RequestParams,
    ) -> Result<()> {
        let response = self
            .client
            .remove_background(input_path, &self.config.api_key, params)?;

        if response.content_type.contains(MIME_ZIP) {
            self.process_composite_file(output_path, &response.data)
        } else {
            self.storage.write(output_path, &response.data)
        }
    }

    fn process_composite_file(&self, output_path: &Path, zip_bytes: &[u8]) -> Result<()> {
        let temp_zip = self.storage.create_temp_file(zip_bytes, TEMP_ZIP_SUFFIX)?;

        // output/foo.zip -> output/foo.png
        let png_output_path = output_path.with_extension(FORMAT_PNG);
        let result = self.compositor.process(&temp_zip, &png_output_path);

        if let Err(e) = temp_zip.close() {
            tracing::warn!("Failed to remove temporary file: {}", e);
        }
        result
    }
}

/// Where the result for `input_path` is written.
///
/// * with an output directory: `<dir>/<stem>.<ext>`
/// * without: `<input dir>/<stem>-removebg.<ext>`
///
/// `ext` is the requested output format, `png` when none was given.
pub fn determine_output_path(input_path: &Path, settings: &Settings) -> PathBuf {
    let stem = input_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let format = &settings.image_settings.output_format;
    let extension = if format.is_empty() {
        DEFAULT_OUTPUT_EXTENSION
    } else {
        format.as_str()
    };

    let output_directory = settings
        .output_directory
        .as_deref()
        .filter(|dir| !dir.as_os_str().is_empty());

    match output_directory {
        Some(dir) => dir.join(format!("{}.{}", stem, extension)),
        None => {
            let input_directory = input_path.parent().unwrap_or_else(|| Path::new(""));
            input_directory.join(format!("{}{}.{}", stem, REMOVEBG_SUFFIX, extension))
        }
    }
}
