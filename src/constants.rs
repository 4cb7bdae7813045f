pub const API_ENDPOINT: &str = "https://api.remove.bg/v1.0/removebg";
pub const API_KEY_ENV: &str = "REMOVE_BG_API_KEY";
pub const CLIENT_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const USER_AGENT_PREFIX: &str = "remove-bg-rust";

pub const DEFAULT_LARGE_BATCH_SIZE: i64 = 50;
pub const DEFAULT_IMAGE_SIZE: &str = "auto";
pub const DEFAULT_OUTPUT_FORMAT: &str = "png";
pub const DEFAULT_OUTPUT_EXTENSION: &str = "png";
pub const REMOVEBG_SUFFIX: &str = "-removebg";

pub const FORMAT_PNG: &str = "png";
pub const FORMAT_ZIP: &str = "zip";
pub const MIME_ZIP: &str = "application/zip";

pub const HTTP_TOO_MANY_REQUESTS: u16 = 429;

// Multipart field carrying the uploaded image
pub const IMAGE_FILE_FIELD: &str = "image_file";

// ZIP response layout
pub const COLOR_ENTRY: &str = "color.jpg";
pub const ALPHA_ENTRY: &str = "alpha.png";
pub const TEMP_FILE_PREFIX: &str = "removebg.";
pub const TEMP_ZIP_SUFFIX: &str = ".zip";

// Request parameter names
pub const PARAM_SIZE: &str = "size";
pub const PARAM_TYPE: &str = "type";
pub const PARAM_CHANNELS: &str = "channels";
pub const PARAM_BG_COLOR: &str = "bg_color";
pub const PARAM_BG_IMAGE_FILE: &str = "bg_image_file";
pub const PARAM_FORMAT: &str = "format";

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";
