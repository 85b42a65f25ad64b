//! Editable form state and request files.
//!
//! [`CertificateForm`] holds what a user has typed so far: one recipient name per
//! certificate kind, the course list with its draft row, and the internship and
//! employment fields. Switching kinds keeps every field, so switching back restores it.
//! [`CertificateForm::generate`] freezes the current kind's fields into a
//! [`CertificateRequest`].
//!
//! Forms can also be read from a TOML request file:
//!
//! ```toml
//! kind = "internship"
//! name = "Asha Singh"
//! design = "modern"
//! certificate_id = "TP-INT-014"
//! department = "Web Development"
//! start = "01/02/2025"
//! end = "30/04/2025"
//! project = "Student admissions portal"
//! ```
//!
//! Course certificates list their courses as `[[courses]]` tables with `name`, `start`
//! and `end`; experience certificates use `designation`, `department`, `start`, `end`
//! and `responsibilities`.

use log::debug;
use std::fs;
use std::path::Path;
use toml::Value;

use crate::request::{
    non_empty, CertificateDetails, CertificateKind, CertificateRequest, CourseEntry, DateRange,
};
use crate::theme::DesignStyle;
use crate::CertError;

/// Course names offered as suggestions when adding a course.
pub const AVAILABLE_COURSES: [&str; 3] = ["ADCA", "Digital Marketing", "Data Analysis"];

/// A prefilled course certificate.
#[derive(Debug, Clone, Copy)]
pub struct SampleStudent {
    pub name: &'static str,
    pub courses: &'static [(&'static str, &'static str, &'static str)],
}

pub const SAMPLE_STUDENTS: [SampleStudent; 2] = [
    SampleStudent {
        name: "Bharti Kumari",
        courses: &[
            ("ADCA", "12/06/2024", "31/12/2024"),
            ("Digital Marketing", "01/01/2025", "till now"),
        ],
    },
    SampleStudent {
        name: "Priya Chauhan",
        courses: &[
            ("ADCA", "03/04/2024", "31/12/2024"),
            ("Digital Marketing", "01/01/2025", "till now"),
        ],
    },
];

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InternshipFields {
    pub name: String,
    pub department: String,
    pub start_date: String,
    pub end_date: String,
    pub project: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExperienceFields {
    pub name: String,
    pub designation: String,
    pub department: String,
    pub start_date: String,
    pub end_date: String,
    pub responsibilities: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CertificateForm {
    kind: CertificateKind,
    design: DesignStyle,
    student_name: String,
    courses: Vec<CourseEntry>,
    draft: CourseEntry,
    internship: InternshipFields,
    experience: ExperienceFields,
    certificate_id: String,
    custom_description: String,
    issue_date: Option<String>,
    previewing: bool,
}

impl CertificateForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(&self) -> CertificateKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: CertificateKind) {
        self.kind = kind;
    }

    pub fn design(&self) -> DesignStyle {
        self.design
    }

    pub fn set_design(&mut self, design: DesignStyle) {
        self.design = design;
    }

    /// The name field of the current kind.
    pub fn recipient_name(&self) -> &str {
        match self.kind {
            CertificateKind::Course => &self.student_name,
            CertificateKind::Internship => &self.internship.name,
            CertificateKind::Experience => &self.experience.name,
        }
    }

    /// Sets the name field of the current kind.
    pub fn set_recipient_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        match self.kind {
            CertificateKind::Course => self.student_name = name,
            CertificateKind::Internship => self.internship.name = name,
            CertificateKind::Experience => self.experience.name = name,
        }
    }

    pub fn courses(&self) -> &[CourseEntry] {
        &self.courses
    }

    pub fn draft(&self) -> &CourseEntry {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: CourseEntry) {
        self.draft = draft;
    }

    /// Moves the draft into the course list if all three of its fields are filled in,
    /// then clears it. Returns whether a course was added.
    pub fn add_course(&mut self) -> bool {
        if !self.draft.is_complete() {
            return false;
        }
        let course = std::mem::take(&mut self.draft);
        self.courses.push(course);
        true
    }

    /// Removes the course at `index`; out-of-range indices are ignored.
    pub fn remove_course(&mut self, index: usize) -> Option<CourseEntry> {
        (index < self.courses.len()).then(|| self.courses.remove(index))
    }

    pub fn internship_mut(&mut self) -> &mut InternshipFields {
        &mut self.internship
    }

    pub fn internship(&self) -> &InternshipFields {
        &self.internship
    }

    pub fn experience_mut(&mut self) -> &mut ExperienceFields {
        &mut self.experience
    }

    pub fn experience(&self) -> &ExperienceFields {
        &self.experience
    }

    pub fn set_certificate_id(&mut self, id: impl Into<String>) {
        self.certificate_id = id.into();
    }

    pub fn set_custom_description(&mut self, description: impl Into<String>) {
        self.custom_description = description.into();
    }

    /// Pins the printed issue date instead of using today's date.
    pub fn set_issue_date(&mut self, date: Option<String>) {
        self.issue_date = date;
    }

    /// Whether the preview is showing.
    pub fn is_previewing(&self) -> bool {
        self.previewing
    }

    /// Returns to editing.
    pub fn close_preview(&mut self) {
        self.previewing = false;
    }

    /// Replaces the course form with sample `index` and opens the preview.
    pub fn load_sample(&mut self, index: usize) -> Result<(), CertError> {
        let sample = SAMPLE_STUDENTS.get(index).ok_or_else(|| {
            CertError::validation(
                "Sample",
                format!("there are {} samples (0..{})", SAMPLE_STUDENTS.len(), SAMPLE_STUDENTS.len() - 1),
            )
        })?;
        self.kind = CertificateKind::Course;
        self.student_name = sample.name.to_string();
        self.courses = sample
            .courses
            .iter()
            .map(|(name, start, end)| CourseEntry::new(*name, *start, *end))
            .collect();
        self.previewing = true;
        Ok(())
    }

    /// The required fields of the current kind are filled in.
    pub fn can_generate(&self) -> bool {
        if self.recipient_name().trim().is_empty() {
            return false;
        }
        match self.kind {
            CertificateKind::Course => self.courses.iter().any(CourseEntry::is_complete),
            CertificateKind::Internship => !self.internship.department.trim().is_empty(),
            CertificateKind::Experience => !self.experience.designation.trim().is_empty(),
        }
    }

    fn details(&self) -> CertificateDetails {
        match self.kind {
            CertificateKind::Course => CertificateDetails::Course {
                courses: self.courses.clone(),
            },
            CertificateKind::Internship => CertificateDetails::Internship {
                department: self.internship.department.clone(),
                period: DateRange::new(&self.internship.start_date, &self.internship.end_date),
                project: non_empty(Some(self.internship.project.as_str())),
            },
            CertificateKind::Experience => CertificateDetails::Experience {
                designation: self.experience.designation.clone(),
                department: non_empty(Some(self.experience.department.as_str())),
                period: DateRange::new(&self.experience.start_date, &self.experience.end_date),
                responsibilities: non_empty(Some(self.experience.responsibilities.as_str())),
            },
        }
    }

    /// Freezes the current kind's fields into a request and opens the preview.
    pub fn generate(&mut self) -> Result<CertificateRequest, CertError> {
        let mut request = CertificateRequest::new(self.recipient_name(), self.details())?
            .with_certificate_id(Some(self.certificate_id.as_str()))
            .with_description(Some(self.custom_description.as_str()))
            .with_design(self.design);
        if let Some(date) = non_empty(self.issue_date.as_deref()) {
            request = request.with_issue_date(date);
        }
        self.previewing = true;
        Ok(request)
    }
}

fn config_error(message: impl Into<String>) -> CertError {
    CertError::ConfigError {
        message: message.into(),
        suggestion: "See the request file example in the documentation of certgen::form"
            .to_string(),
    }
}

fn get_str<'a>(table: &'a Value, key: &str) -> Option<&'a str> {
    table.get(key).and_then(|v| v.as_str())
}

fn text(table: &Value, key: &str) -> String {
    get_str(table, key).unwrap_or_default().to_string()
}

/// Parses a TOML request file into a form.
///
/// ```
/// use certgen::form::parse_request_toml;
///
/// let mut form = parse_request_toml(r#"
/// name = "Bharti Kumari"
///
/// [[courses]]
/// name = "ADCA"
/// start = "12/06/2024"
/// end = "31/12/2024"
/// "#).unwrap();
/// assert!(form.can_generate());
/// assert_eq!(form.generate().unwrap().recipient(), "Bharti Kumari");
/// ```
pub fn parse_request_toml(content: &str) -> Result<CertificateForm, CertError> {
    let value: Value =
        toml::from_str(content).map_err(|e| config_error(format!("invalid request file: {}", e)))?;

    let mut form = CertificateForm::new();
    if let Some(kind) = get_str(&value, "kind") {
        form.set_kind(kind.parse().map_err(config_error)?);
    }
    if let Some(design) = get_str(&value, "design") {
        form.set_design(design.parse().map_err(config_error)?);
    }
    form.set_recipient_name(text(&value, "name"));
    form.set_certificate_id(text(&value, "certificate_id"));
    form.set_custom_description(text(&value, "description"));
    form.set_issue_date(get_str(&value, "issue_date").map(str::to_string));

    match form.kind() {
        CertificateKind::Course => {
            let courses = value.get("courses").and_then(|v| v.as_array());
            for course in courses.into_iter().flatten() {
                form.set_draft(CourseEntry::new(
                    text(course, "name"),
                    text(course, "start"),
                    text(course, "end"),
                ));
                if !form.add_course() {
                    debug!("Skipping incomplete course entry {:?}", course);
                }
            }
        }
        CertificateKind::Internship => {
            let fields = form.internship_mut();
            fields.department = text(&value, "department");
            fields.start_date = text(&value, "start");
            fields.end_date = text(&value, "end");
            fields.project = text(&value, "project");
        }
        CertificateKind::Experience => {
            let fields = form.experience_mut();
            fields.designation = text(&value, "designation");
            fields.department = text(&value, "department");
            fields.start_date = text(&value, "start");
            fields.end_date = text(&value, "end");
            fields.responsibilities = text(&value, "responsibilities");
        }
    }
    Ok(form)
}

/// Reads and parses a TOML request file.
pub fn load_request_file(path: &Path) -> Result<CertificateForm, CertError> {
    let content = fs::read_to_string(path).map_err(|e| CertError::IoError {
        message: format!("Could not read request file: {}", e),
        path: path.display().to_string(),
        suggestion: "Check the path passed to --request".to_string(),
    })?;
    parse_request_toml(&content)
}
