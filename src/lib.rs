pub mod cli;
pub mod client;
pub mod composite;
pub mod constants;
pub mod error;
pub mod logger;
pub mod notifier;
pub mod processor;
pub mod prompt;
pub mod settings;
pub mod storage;

pub use client::{RemoveBgClient, TransformClient, TransformResponse};
pub use composite::{composite, encode_png, Compositor, ZipCompositor};
pub use error::{RemoveBgError, RequestError, Result};
pub use notifier::{LogNotifier, Notifier};
pub use processor::{determine_output_path, BatchSummary, Processor, ProcessorConfig};
pub use prompt::{Prompt, TerminalPrompt};
pub use settings::{parse_extra_options, ImageSettings, RequestParams, Settings};
pub use storage::{FileStorage, Storage};
