//! Export formats, output file names and the preview/export workflow.

use log::{error, info};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::assets::{load_logo, Logo};
use crate::config::{CertgenConfig, Organization};
use crate::fonts::FontBook;
use crate::layout::{layout, LayoutContext};
use crate::pdf::PdfRenderer;
use crate::raster::{encode_jpeg, encode_png, RasterOptions, RasterRenderer};
use crate::request::CertificateRequest;
use crate::scene::CertificateLayout;
use crate::CertError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Png,
    Jpeg,
    Pdf,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!("unknown format '{}' (expected png, jpg or pdf)", other)),
        }
    }
}

/// `certificate-<name>.<ext>`, with each run of whitespace in the name replaced by one
/// hyphen and leading/trailing whitespace dropped.
///
/// ```
/// use certgen::export::{certificate_file_name, ExportFormat};
///
/// assert_eq!(
///     certificate_file_name("  Bharti   Kumari ", ExportFormat::Jpeg),
///     "certificate-Bharti-Kumari.jpg"
/// );
/// ```
pub fn certificate_file_name(name: &str, format: ExportFormat) -> String {
    let stem = name.split_whitespace().collect::<Vec<_>>().join("-");
    if stem.is_empty() {
        format!("certificate.{}", format.extension())
    } else {
        format!("certificate-{}.{}", stem, format.extension())
    }
}

/// One finished export.
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub file_name: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

/// Holds everything loaded once per session: the organisation profile, the logo and the
/// fonts. Exports borrow it; nothing is mutated while exporting.
pub struct Exporter {
    organization: Organization,
    logo: Option<Logo>,
    fonts: FontBook,
    raster: RasterOptions,
}

impl Exporter {
    /// Loads the logo and fonts named in `config`. Missing assets only produce warnings.
    pub fn new(config: &CertgenConfig) -> Self {
        let logo = load_logo(config.assets.logo.as_deref());
        let fonts = FontBook::load(&config.fonts, config.assets.signature_font.as_deref());
        Self::with_assets(config, logo, fonts)
    }

    /// An exporter with assets supplied by the caller.
    pub fn with_assets(config: &CertgenConfig, logo: Option<Logo>, fonts: FontBook) -> Self {
        Exporter {
            organization: config.organization.clone(),
            logo,
            fonts,
            raster: RasterOptions {
                scale: config.render.scale,
                jpeg_quality: config.render.jpeg_quality,
            },
        }
    }

    pub fn organization(&self) -> &Organization {
        &self.organization
    }

    pub fn has_logo(&self) -> bool {
        self.logo.is_some()
    }

    pub fn has_script_font(&self) -> bool {
        self.fonts.has_script()
    }

    /// Whether raster text falls back to the bundled base-14 faces.
    pub fn uses_bundled_faces(&self) -> bool {
        self.fonts.uses_bundled_faces()
    }

    /// Lays out `request` against the assets this exporter actually has.
    pub fn layout(&self, request: &CertificateRequest) -> CertificateLayout {
        layout(
            request,
            &LayoutContext {
                organization: &self.organization,
                has_logo: self.has_logo(),
                has_script_font: self.has_script_font(),
            },
        )
    }

    /// Lays out and encodes `request`.
    pub fn render(&self, request: &CertificateRequest, format: ExportFormat) -> Result<Vec<u8>, CertError> {
        let layout = self.layout(request);
        self.render_layout(&layout, request.recipient(), format)
    }

    fn render_layout(&self, layout: &CertificateLayout, name: &str, format: ExportFormat) -> Result<Vec<u8>, CertError> {
        match format {
            ExportFormat::Pdf => PdfRenderer::new(&self.fonts, self.logo.as_ref())
                .render(layout, &format!("Certificate - {}", name)),
            ExportFormat::Png | ExportFormat::Jpeg => {
                let renderer = RasterRenderer::new(&self.fonts, self.logo.as_ref(), self.raster);
                let pixmap = renderer.render(layout)?;
                if format == ExportFormat::Png {
                    encode_png(&pixmap)
                } else {
                    encode_jpeg(&pixmap, self.raster.jpeg_quality)
                }
            }
        }
    }

    pub fn export(&self, request: &CertificateRequest, format: ExportFormat) -> Result<ExportedFile, CertError> {
        Ok(ExportedFile {
            file_name: certificate_file_name(request.recipient(), format),
            format,
            bytes: self.render(request, format)?,
        })
    }

    /// Exports `request` and writes it into `dir`, returning the written path.
    pub fn save_to_dir(&self, request: &CertificateRequest, format: ExportFormat, dir: &Path) -> Result<PathBuf, CertError> {
        let file = self.export(request, format)?;
        let path = dir.join(&file.file_name);
        fs::write(&path, &file.bytes).map_err(|e| CertError::ExportError {
            message: e.to_string(),
            path: Some(path.display().to_string()),
            suggestion: Some(if e.kind() == std::io::ErrorKind::PermissionDenied {
                "Check that you have write permissions for this location".to_string()
            } else {
                "Try a different output directory or check available disk space".to_string()
            }),
        })?;
        info!("Saved {} ({} bytes)", path.display(), file.bytes.len());
        Ok(path)
    }
}

/// Where the preview/export workflow is.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowState {
    Idle,
    Previewing {
        request: CertificateRequest,
        layout: CertificateLayout,
    },
    Exporting {
        format: ExportFormat,
    },
}

/// `Idle -> Previewing -> Exporting -> Idle`. An export cannot be cancelled and a failed
/// export is not retried; either way the workflow ends up idle again.
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    state: WorkflowState,
}

impl Default for Workflow {
    fn default() -> Self {
        Workflow {
            state: WorkflowState::Idle,
        }
    }
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, WorkflowState::Idle)
    }

    /// Shows `request`, replacing any earlier preview.
    pub fn preview(&mut self, exporter: &Exporter, request: CertificateRequest) {
        let layout = exporter.layout(&request);
        self.state = WorkflowState::Previewing { request, layout };
    }

    /// The layout being previewed, if any.
    pub fn preview_layout(&self) -> Option<&CertificateLayout> {
        match &self.state {
            WorkflowState::Previewing { layout, .. } => Some(layout),
            _ => None,
        }
    }

    /// Drops the preview without exporting.
    pub fn close(&mut self) {
        self.state = WorkflowState::Idle;
    }

    /// Exports the previewed certificate. Without a preview this is a validation error.
    /// Failures are logged in full and returned with the generic user-facing message in
    /// [`CertError::user_message`].
    pub fn export(&mut self, exporter: &Exporter, format: ExportFormat) -> Result<ExportedFile, CertError> {
        self.export_with(exporter, format, |_| {})
    }

    /// [`Workflow::export`], calling `on_state` after every state change.
    pub fn export_with<F>(
        &mut self,
        exporter: &Exporter,
        format: ExportFormat,
        mut on_state: F,
    ) -> Result<ExportedFile, CertError>
    where
        F: FnMut(&WorkflowState),
    {
        let (request, layout) = match std::mem::replace(&mut self.state, WorkflowState::Idle) {
            WorkflowState::Previewing { request, layout } => (request, layout),
            other => {
                self.state = other;
                return Err(CertError::validation(
                    "Export",
                    "generate a preview before downloading",
                ));
            }
        };
        self.state = WorkflowState::Exporting { format };
        on_state(&self.state);
        let result = exporter
            .render_layout(&layout, request.recipient(), format)
            .map(|bytes| ExportedFile {
                file_name: certificate_file_name(request.recipient(), format),
                format,
                bytes,
            });
        if let Err(e) = &result {
            error!("Error generating certificate: {}", e);
        }
        self.state = WorkflowState::Idle;
        on_state(&self.state);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{CertificateDetails, CourseEntry};

    fn exporter() -> Exporter {
        Exporter::with_assets(&CertgenConfig::default(), None, FontBook::bundled())
    }

    fn request() -> CertificateRequest {
        CertificateRequest::new(
            "Priya  Chauhan",
            CertificateDetails::Course {
                courses: vec![CourseEntry::new("ADCA", "03/04/2024", "31/12/2024")],
            },
        )
        .unwrap()
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            certificate_file_name("Bharti Kumari", ExportFormat::Png),
            "certificate-Bharti-Kumari.png"
        );
        assert_eq!(
            certificate_file_name("Anna\tMaria\n Lopez", ExportFormat::Pdf),
            "certificate-Anna-Maria-Lopez.pdf"
        );
        assert_eq!(certificate_file_name("   ", ExportFormat::Png), "certificate.png");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("JPEG".parse::<ExportFormat>(), Ok(ExportFormat::Jpeg));
        assert_eq!("jpg".parse::<ExportFormat>(), Ok(ExportFormat::Jpeg));
        assert!("gif".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Jpeg.extension(), "jpg");
        assert_eq!(ExportFormat::Pdf.mime_type(), "application/pdf");
    }

    #[test]
    fn test_export_without_preview_is_rejected() {
        let mut workflow = Workflow::new();
        let err = workflow.export(&exporter(), ExportFormat::Pdf).unwrap_err();
        assert!(matches!(err, CertError::ValidationError { .. }));
        assert!(workflow.is_idle());
    }

    #[test]
    fn test_workflow_returns_to_idle() {
        let exporter = exporter();
        let mut workflow = Workflow::new();
        workflow.preview(&exporter, request());
        let height = workflow.preview_layout().unwrap().height;
        assert!(height >= crate::layout::MIN_PAGE_HEIGHT);
        assert!(matches!(workflow.state(), WorkflowState::Previewing { .. }));

        let file = workflow.export(&exporter, ExportFormat::Pdf).unwrap();
        assert_eq!(file.file_name, "certificate-Priya-Chauhan.pdf");
        assert!(file.bytes.starts_with(b"%PDF"));
        assert!(workflow.is_idle());
    }

    #[test]
    fn test_export_reports_each_state() {
        let exporter = exporter();
        let mut workflow = Workflow::new();
        workflow.preview(&exporter, request());

        let mut seen = Vec::new();
        let file = workflow
            .export_with(&exporter, ExportFormat::Png, |state| seen.push(state.clone()))
            .unwrap();
        assert_eq!(file.format, ExportFormat::Png);
        assert_eq!(
            seen,
            vec![
                WorkflowState::Exporting {
                    format: ExportFormat::Png
                },
                WorkflowState::Idle,
            ]
        );

        // A rejected export never leaves the current state.
        seen.clear();
        assert!(workflow
            .export_with(&exporter, ExportFormat::Pdf, |state| seen.push(state.clone()))
            .is_err());
        assert!(seen.is_empty());
    }

    #[test]
    fn test_raster_size_follows_config() {
        let mut config = CertgenConfig::default();
        config.render.scale = 1.0;
        let exporter = Exporter::with_assets(&config, None, FontBook::bundled());
        let png = exporter.render(&request(), ExportFormat::Png).unwrap();
        let image = image::load_from_memory(&png).unwrap();
        assert_eq!(image.width(), 842);
        assert!(image.height() >= 540);
    }

    #[test]
    fn test_save_to_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = exporter()
            .save_to_dir(&request(), ExportFormat::Jpeg, dir.path())
            .unwrap();
        assert_eq!(path.file_name().unwrap(), "certificate-Priya-Chauhan.jpg");
        let bytes = fs::read(path).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }
}
