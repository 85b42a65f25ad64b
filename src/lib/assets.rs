//! Logo loading.
//!
//! The logo is decoded once when an exporter is created. Raster output draws the decoded
//! pixels; PDF output re-decodes the original bytes through printpdf so the image is
//! embedded in its own format. A logo that is missing or cannot be decoded is logged and
//! the layout closes the gap it would have occupied.

use image::RgbaImage;
use log::{debug, warn};
use std::fs;
use std::path::Path;

use crate::CertError;

/// A decoded logo image.
#[derive(Debug, Clone)]
pub struct Logo {
    bytes: Vec<u8>,
    image: RgbaImage,
}

impl Logo {
    /// Decodes PNG or JPEG bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CertError> {
        let image = image::load_from_memory(&bytes)
            .map_err(|e| CertError::render_error(format!("invalid logo image: {}", e)))?
            .to_rgba8();
        if image.width() == 0 || image.height() == 0 {
            return Err(CertError::render_error("logo image is empty"));
        }
        Ok(Logo { bytes, image })
    }

    pub fn load(path: &Path) -> Result<Self, CertError> {
        let bytes = fs::read(path).map_err(|e| CertError::IoError {
            message: format!("Could not read logo: {}", e),
            path: path.display().to_string(),
            suggestion: "Set [assets] logo in the configuration, or \"\" to disable it"
                .to_string(),
        })?;
        Self::from_bytes(bytes)
    }

    /// The original encoded file.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// Loads the configured logo, returning `None` (with a warning) when it is unavailable.
pub fn load_logo(path: Option<&Path>) -> Option<Logo> {
    let path = path?;
    match Logo::load(path) {
        Ok(logo) => {
            debug!("Loaded logo {} ({:?})", path.display(), logo.dimensions());
            Some(logo)
        }
        Err(e) => {
            warn!("Logo unavailable, continuing without it: {}", e);
            None
        }
    }
}
