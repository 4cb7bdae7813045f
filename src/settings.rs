use crate::constants::{
    FORMAT_PNG, FORMAT_ZIP, PARAM_BG_COLOR, PARAM_BG_IMAGE_FILE, PARAM_CHANNELS, PARAM_FORMAT,
    PARAM_SIZE, PARAM_TYPE,
};
use crate::error::{RemoveBgError, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;
use url::form_urlencoded;

/// Request parameters sent alongside each uploaded image.
pub type RequestParams = BTreeMap<String, String>;

/// Per-run configuration of a batch.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// `None` writes each result next to its input.
    pub output_directory: Option<PathBuf>,
    pub reprocess_existing: bool,
    pub skip_png_format_optimization: bool,
    /// Batches with at least this many files need confirmation. Negative disables the prompt.
    pub large_batch_confirm_threshold: i64,
    pub image_settings: ImageSettings,
}

impl Settings {
    /// The format actually requested from the API.
    ///
    /// A PNG result is requested as a ZIP holding separate color and alpha
    /// planes, which is a fraction of the download size. The output file is
    /// still a PNG.
    pub fn transfer_format(&self) -> &str {
        let output_format = self.image_settings.output_format.as_str();
        if !self.skip_png_format_optimization && output_format == FORMAT_PNG {
            FORMAT_ZIP
        } else {
            output_format
        }
    }

    /// Request parameters shared by every file of the batch.
    pub fn request_params(&self) -> RequestParams {
        self.image_settings.to_params(self.transfer_format())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSettings {
    pub size: String,
    pub image_type: String,
    pub channels: String,
    pub bg_color: String,
    pub bg_image_file: String,
    pub output_format: String,
    /// Raw query string such as `option1=val1&option2=val2`.
    pub extra_api_options: String,
}

impl ImageSettings {
    /// Builds the parameter map for one request, with `transfer_format` as
    /// the `format` value.
    ///
    /// Standard keys are only present when non-empty. Extra API options are
    /// merged last and overwrite standard keys of the same name. A malformed
    /// extra options string is logged and ignored.
    pub fn to_params(&self, transfer_format: &str) -> RequestParams {
        let mut params = RequestParams::new();

        let standard = [
            (PARAM_SIZE, self.size.as_str()),
            (PARAM_TYPE, self.image_type.as_str()),
            (PARAM_CHANNELS, self.channels.as_str()),
            (PARAM_BG_COLOR, self.bg_color.as_str()),
            (PARAM_BG_IMAGE_FILE, self.bg_image_file.as_str()),
            (PARAM_FORMAT, transfer_format),
        ];
        for (key, value) in standard {
            if !value.is_empty() {
                params.insert(key.to_string(), value.to_string());
            }
        }

        if !self.extra_api_options.is_empty() {
            match parse_extra_options(&self.extra_api_options) {
                Ok(extra) => params.extend(extra),
                Err(e) => tracing::warn!("{}", e),
            }
        }

        params
    }
}

/// Parses a URL-encoded query string into key/value pairs.
///
/// The first value wins when a key repeats. Semicolon separators and broken
/// percent escapes make the whole string invalid.
pub fn parse_extra_options(raw: &str) -> Result<RequestParams> {
    for piece in raw.split('&').filter(|p| !p.is_empty()) {
        if piece.contains(';') {
            return Err(RemoveBgError::InvalidExtraOptions(format!(
                "invalid semicolon separator in {:?}",
                piece
            )));
        }
        if !has_valid_escapes(piece) {
            return Err(RemoveBgError::InvalidExtraOptions(format!(
                "invalid URL escape in {:?}",
                piece
            )));
        }
    }

    let mut values = RequestParams::new();
    for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
        values
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }
    Ok(values)
}

fn has_valid_escapes(piece: &str) -> bool {
    let bytes = piece.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}
