//! The certgen library lays out and exports course, internship and experience
//! certificates as PNG, JPEG or PDF.
//!
//! A certificate starts life as form state ([`form::CertificateForm`]), is frozen into an
//! immutable [`request::CertificateRequest`] and is then laid out once into a
//! [`scene::CertificateLayout`]: a page size plus an ordered list of draw commands. Both
//! exporters consume that same layout, so the raster and vector outputs always carry the
//! same text at the same positions.
//!
//! ```text
//! +-------------+     +----------------+     +-------------------+     +-----------+
//! | Form state  | --> | Certificate    | --> | Layout            | --> | raster:   |
//! | (CLI, TOML  |     | Request        |     | page size +       |     | PNG, JPEG |
//! |  request)   |     | (validated)    |     | draw commands     | --> | pdf:      |
//! +-------------+     +----------------+     +-------------------+     | PDF       |
//!                                                                      +-----------+
//! ```
//!
//! Basic usage:
//! ```rust
//! use certgen::config::ConfigSource;
//! use certgen::export::ExportFormat;
//! use certgen::request::{CertificateDetails, CertificateRequest, CourseEntry};
//! use std::error::Error;
//!
//! fn example() -> Result<(), Box<dyn Error>> {
//!     let request = CertificateRequest::new(
//!         "Bharti Kumari",
//!         CertificateDetails::Course {
//!             courses: vec![CourseEntry::new("ADCA", "12/06/2024", "31/12/2024")],
//!         },
//!     )?;
//!     let pdf = certgen::render_into_bytes(&request, ExportFormat::Pdf, ConfigSource::Default)?;
//!     assert!(pdf.starts_with(b"%PDF"));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```
//!
//! The issuing organisation, logo, signature font and render settings come from a TOML
//! configuration file, see [`config`].

pub mod access;
pub mod assets;
pub mod config;
pub mod export;
pub mod fonts;
pub mod form;
pub mod layout;
pub mod metrics;
pub mod pdf;
pub mod raster;
pub mod request;
pub mod scene;
pub mod theme;
pub mod validation;

use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};

/// Message shown to the user when an export fails for any reason.
pub const GENERIC_FAILURE: &str = "Error generating certificate. Please try again.";

/// Represents errors that can occur while building, laying out or exporting a certificate.
#[derive(Debug)]
pub enum CertError {
    /// A required form field is missing or malformed
    ValidationError { field: String, message: String },
    /// The signed-in user is not on the allow-list
    AccessDenied { username: String },
    /// Drawing the certificate failed
    RenderError {
        message: String,
        suggestion: Option<String>,
    },
    /// Encoding or writing an export failed
    ExportError {
        message: String,
        path: Option<String>,
        suggestion: Option<String>,
    },
    /// Indicates a font loading error
    FontError {
        font_name: String,
        message: String,
        suggestion: String,
    },
    /// Indicates an invalid configuration or request file
    ConfigError { message: String, suggestion: String },
    /// Indicates an I/O error
    IoError {
        message: String,
        path: String,
        suggestion: String,
    },
}

impl Error for CertError {}

impl fmt::Display for CertError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CertError::ValidationError { field, message } => {
                write!(f, "❌ Invalid {}: {}", field, message)
            }
            CertError::AccessDenied { username } => {
                write!(f, "❌ Access Denied: {} is not authorized to use this tool", username)?;
                write!(f, "\n💡 Suggestion: Ask an administrator to add you to ALLOWED_USERS")
            }
            CertError::RenderError {
                message,
                suggestion,
            } => {
                write!(f, "❌ Render Error: {}", message)?;
                if let Some(hint) = suggestion {
                    write!(f, "\n💡 Suggestion: {}", hint)?;
                }
                Ok(())
            }
            CertError::ExportError {
                message,
                path,
                suggestion,
            } => {
                write!(f, "❌ Export Error: {}", message)?;
                if let Some(p) = path {
                    write!(f, "\n📁 Path: {}", p)?;
                }
                if let Some(hint) = suggestion {
                    write!(f, "\n💡 Suggestion: {}", hint)?;
                }
                Ok(())
            }
            CertError::FontError {
                font_name,
                message,
                suggestion,
            } => {
                write!(f, "❌ Font Error: Failed to load font '{}'", font_name)?;
                write!(f, "\n   Reason: {}", message)?;
                write!(f, "\n💡 Suggestion: {}", suggestion)
            }
            CertError::ConfigError {
                message,
                suggestion,
            } => {
                write!(f, "❌ Configuration Error: {}", message)?;
                write!(f, "\n💡 Suggestion: {}", suggestion)
            }
            CertError::IoError {
                message,
                path,
                suggestion,
            } => {
                write!(f, "❌ File Error: {}", message)?;
                write!(f, "\n📁 Path: {}", path)?;
                write!(f, "\n💡 Suggestion: {}", suggestion)
            }
        }
    }
}

impl CertError {
    /// Creates a validation error for a named form field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        CertError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a simple export error with just a message
    pub fn export_error(message: impl Into<String>) -> Self {
        CertError::ExportError {
            message: message.into(),
            path: None,
            suggestion: Some(
                "Check that the output directory exists and you have write permissions".to_string(),
            ),
        }
    }

    /// Creates a simple render error with just a message
    pub fn render_error(message: impl Into<String>) -> Self {
        CertError::RenderError {
            message: message.into(),
            suggestion: None,
        }
    }

    /// The text shown to an end user. Generation failures collapse into one generic
    /// message; the detailed error goes to the log.
    pub fn user_message(&self) -> String {
        match self {
            CertError::ValidationError { .. }
            | CertError::AccessDenied { .. }
            | CertError::ConfigError { .. } => self.to_string(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

/// Lays out `request` and encodes it in `format`, returning the file contents.
///
/// Assets and fonts named in the configuration are loaded for this call only; use
/// [`export::Exporter`] directly to export several certificates with one asset load.
pub fn render_into_bytes(
    request: &request::CertificateRequest,
    format: export::ExportFormat,
    config: config::ConfigSource,
) -> Result<Vec<u8>, CertError> {
    let config = config::load_config_from_source(config);
    let exporter = export::Exporter::new(&config);
    exporter.render(request, format)
}

/// Lays out `request` and writes `certificate-<name>.<ext>` into `dir`.
///
/// # Returns
/// * `Ok(PathBuf)` with the path of the written file
/// * `Err(CertError)` if the directory does not exist or encoding fails
pub fn render_into_dir(
    request: &request::CertificateRequest,
    format: export::ExportFormat,
    config: config::ConfigSource,
    dir: &Path,
) -> Result<PathBuf, CertError> {
    if !dir.is_dir() {
        return Err(CertError::IoError {
            message: "Output directory does not exist".to_string(),
            path: dir.display().to_string(),
            suggestion: format!("Create the directory first: mkdir -p {}", dir.display()),
        });
    }
    let config = config::load_config_from_source(config);
    let exporter = export::Exporter::new(&config);
    exporter.save_to_dir(request, format, dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigSource;
    use crate::export::ExportFormat;
    use crate::request::{CertificateDetails, CertificateRequest, DateRange};

    fn experience() -> CertificateRequest {
        CertificateRequest::new(
            "Ravi Verma",
            CertificateDetails::Experience {
                designation: "Software Engineer".into(),
                department: Some("Engineering".into()),
                period: DateRange::new("01/01/2023", "31/12/2024"),
                responsibilities: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_error_display_has_suggestions() {
        let err = CertError::export_error("disk full");
        let text = err.to_string();
        assert!(text.contains("Export Error: disk full"));
        assert!(text.contains("Suggestion"));

        let denied = CertError::AccessDenied {
            username: "mallory@example.com".into(),
        };
        assert!(denied.to_string().contains("mallory@example.com"));
    }

    #[test]
    fn test_user_message_is_generic_for_failures() {
        assert_eq!(CertError::render_error("boom").user_message(), GENERIC_FAILURE);
        assert_eq!(CertError::export_error("boom").user_message(), GENERIC_FAILURE);
        let validation = CertError::validation("Designation", "required");
        assert!(validation.user_message().contains("Designation"));
    }

    #[test]
    fn test_render_into_bytes_pdf() {
        let config = "[assets]\nlogo = \"\"\nsignature_font = \"\"\n";
        let bytes =
            render_into_bytes(&experience(), ExportFormat::Pdf, ConfigSource::Embedded(config))
                .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_into_missing_dir_fails() {
        let err = render_into_dir(
            &experience(),
            ExportFormat::Png,
            ConfigSource::Default,
            Path::new("/nonexistent/certgen/output"),
        )
        .unwrap_err();
        assert!(matches!(err, CertError::IoError { .. }));
    }
}
