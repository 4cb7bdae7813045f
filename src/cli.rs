use crate::constants::{
    API_KEY_ENV, DEFAULT_IMAGE_SIZE, DEFAULT_LARGE_BATCH_SIZE, DEFAULT_OUTPUT_FORMAT,
};
use crate::settings::{ImageSettings, Settings};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "removebg",
    about = "Remove image background - 100% automatically",
    long_about = "removebg uploads images to the remove.bg API and saves the results. \
                  Accepts plain paths and glob patterns (*, **, {jpg,png}). PNG results are \
                  downloaded as a compact ZIP and composited locally.",
    version,
    args_conflicts_with_subcommands = true,
    subcommand_negates_reqs = true,
    after_help = "EXAMPLES:\n  \
    removebg --api-key xyz photo.jpg\n  \
    removebg --output-directory ./out \"./images/**/*.{jpg,png}\"\n  \
    removebg --format jpg --bg-color 81d4fa portrait.jpg\n  \
    removebg zip2png response.zip result.png"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(
        required = true,
        value_name = "FILE",
        help = "Image files or glob patterns to process"
    )]
    pub files: Vec<String>,

    #[arg(
        long,
        env = API_KEY_ENV,
        hide_env_values = true,
        help = "API key (required), or set REMOVE_BG_API_KEY"
    )]
    pub api_key: Option<String>,

    #[arg(
        long,
        help = "Output directory",
        long_help = "Directory for processed images. When omitted, results are saved next to \
                     each input as <name>-removebg.<format>."
    )]
    pub output_directory: Option<PathBuf>,

    #[arg(long, help = "Reprocess and overwrite any already processed images")]
    pub reprocess_existing: bool,

    #[arg(
        long,
        help = "Skip optimizing PNG format as ZIP to save bandwidth"
    )]
    pub skip_png_format_optimization: bool,

    #[arg(
        long,
        default_value_t = DEFAULT_LARGE_BATCH_SIZE,
        allow_negative_numbers = true,
        help = "Confirm any batches over this size (-1 to disable)"
    )]
    pub confirm_batch_over: i64,

    #[arg(long, default_value = DEFAULT_IMAGE_SIZE, help = "Image size")]
    pub size: String,

    #[arg(long = "type", help = "Image type (person, product, car, ...)")]
    pub image_type: Option<String>,

    #[arg(long, default_value = DEFAULT_OUTPUT_FORMAT, help = "Image format (png, jpg, zip)")]
    pub format: String,

    #[arg(long, help = "Image channels (rgba, alpha)")]
    pub channels: Option<String>,

    #[arg(long, help = "Image background color")]
    pub bg_color: Option<String>,

    #[arg(long, help = "Adds a background image from a file")]
    pub bg_image_file: Option<String>,

    #[arg(
        long,
        help = "Extra options to forward to the API (format: 'option1=val1&option2=val2')"
    )]
    pub extra_api_options: Option<String>,

    #[arg(short, long, global = true, help = "Only print warnings and errors")]
    pub quiet: bool,

    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "quiet",
        help = "Print debug output"
    )]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Converts a remove.bg ZIP to a PNG",
        long_about = "Composites the color.jpg and alpha.png entries of a remove.bg ZIP \
                      response into a single transparent PNG."
    )]
    Zip2png {
        #[arg(help = "Input ZIP file path")]
        input: PathBuf,

        #[arg(help = "Output PNG file path")]
        output: PathBuf,
    },
}

impl Args {
    pub fn settings(&self) -> Settings {
        Settings {
            output_directory: self.output_directory.clone(),
            reprocess_existing: self.reprocess_existing,
            skip_png_format_optimization: self.skip_png_format_optimization,
            large_batch_confirm_threshold: self.confirm_batch_over,
            image_settings: ImageSettings {
                size: self.size.clone(),
                image_type: self.image_type.clone().unwrap_or_default(),
                channels: self.channels.clone().unwrap_or_default(),
                bg_color: self.bg_color.clone().unwrap_or_default(),
                bg_image_file: self.bg_image_file.clone().unwrap_or_default(),
                output_format: self.format.to_lowercase(),
                extra_api_options: self.extra_api_options.clone().unwrap_or_default(),
                ..Default::default()
            },
        }
    }
}
