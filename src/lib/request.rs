//! The immutable certificate request handed to the layout engine.
//!
//! A [`CertificateRequest`] is created from form state (see [`crate::form`]) once the
//! user asks for a preview. It is never mutated afterwards: both exporters read the
//! same request and it is dropped once the export finishes.

use crate::theme::DesignStyle;
use crate::CertError;
use std::fmt;
use std::str::FromStr;

/// Which of the three certificate designs to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CertificateKind {
    #[default]
    Course,
    Internship,
    Experience,
}

impl CertificateKind {
    pub fn key(self) -> &'static str {
        match self {
            CertificateKind::Course => "course",
            CertificateKind::Internship => "internship",
            CertificateKind::Experience => "experience",
        }
    }

    /// Title printed (upper-cased) at the top of the certificate.
    pub fn title(self) -> &'static str {
        match self {
            CertificateKind::Course => "Certificate of Completion",
            CertificateKind::Internship => "Internship Certificate",
            CertificateKind::Experience => "Experience Certificate",
        }
    }

    /// Heading above the kind-specific details block.
    pub fn section_title(self) -> &'static str {
        match self {
            CertificateKind::Course => "COURSES COMPLETED",
            CertificateKind::Internship => "INTERNSHIP DETAILS",
            CertificateKind::Experience => "EMPLOYMENT DETAILS",
        }
    }

    /// Label of the recipient name field in the form.
    pub fn recipient_label(self) -> &'static str {
        match self {
            CertificateKind::Course => "Student Name",
            CertificateKind::Internship => "Intern Name",
            CertificateKind::Experience => "Employee Name",
        }
    }

    /// Description used when the user leaves the custom description empty.
    pub fn default_description(self, organization: &str) -> String {
        match self {
            CertificateKind::Course => format!(
                "has successfully completed the following course(s) at {} demonstrating \
                 dedication, commitment, and proficiency in the required skills and knowledge.",
                organization
            ),
            CertificateKind::Internship => format!(
                "has successfully completed their internship at {} demonstrating excellent \
                 skills, dedication, and professional conduct throughout the internship period.",
                organization
            ),
            CertificateKind::Experience => format!(
                "was employed with {} and has demonstrated excellent professional skills, \
                 dedication, and commitment during their tenure with us.",
                organization
            ),
        }
    }
}

impl fmt::Display for CertificateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CertificateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "course" | "completion" => Ok(CertificateKind::Course),
            "internship" | "intern" => Ok(CertificateKind::Internship),
            "experience" | "employment" => Ok(CertificateKind::Experience),
            other => Err(format!(
                "unknown certificate kind '{}' (expected one of: course, internship, experience)",
                other
            )),
        }
    }
}

/// One completed course. Dates are free text as typed ("12/06/2024", "till now").
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CourseEntry {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
}

impl CourseEntry {
    pub fn new(
        name: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        CourseEntry {
            name: name.into(),
            start_date: start_date.into(),
            end_date: end_date.into(),
        }
    }

    /// All three fields carry text.
    pub fn is_complete(&self) -> bool {
        !self.name.trim().is_empty()
            && !self.start_date.trim().is_empty()
            && !self.end_date.trim().is_empty()
    }

    pub fn period(&self) -> String {
        format!("{} – {}", self.start_date.trim(), self.end_date.trim())
    }
}

/// A start/end pair for internships and employment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

impl DateRange {
    pub fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        DateRange {
            start: start.into().trim().to_string(),
            end: end.into().trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start.is_empty() && self.end.is_empty()
    }

    pub fn display(&self) -> String {
        format!("{} – {}", self.start, self.end)
    }
}

/// Fields specific to each certificate kind.
#[derive(Debug, Clone, PartialEq)]
pub enum CertificateDetails {
    Course {
        courses: Vec<CourseEntry>,
    },
    Internship {
        department: String,
        period: DateRange,
        project: Option<String>,
    },
    Experience {
        designation: String,
        department: Option<String>,
        period: DateRange,
        responsibilities: Option<String>,
    },
}

impl CertificateDetails {
    pub fn kind(&self) -> CertificateKind {
        match self {
            CertificateDetails::Course { .. } => CertificateKind::Course,
            CertificateDetails::Internship { .. } => CertificateKind::Internship,
            CertificateDetails::Experience { .. } => CertificateKind::Experience,
        }
    }
}

/// Returns `None` for empty or whitespace-only text, the trimmed text otherwise.
pub fn non_empty(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Today's date the way it is printed in the issue-date box, e.g. "October 19, 2026".
pub fn today_long() -> String {
    chrono::Local::now().format("%B %-d, %Y").to_string()
}

/// Everything needed to lay out one certificate.
#[derive(Debug, Clone, PartialEq)]
pub struct CertificateRequest {
    recipient: String,
    details: CertificateDetails,
    certificate_id: Option<String>,
    custom_description: Option<String>,
    design: DesignStyle,
    issue_date: String,
}

impl CertificateRequest {
    /// Builds a request, rejecting the combinations the form refuses to generate.
    ///
    /// ```
    /// use certgen::request::{CertificateDetails, CertificateRequest, CourseEntry};
    ///
    /// let request = CertificateRequest::new(
    ///     "Bharti Kumari",
    ///     CertificateDetails::Course {
    ///         courses: vec![CourseEntry::new("ADCA", "12/06/2024", "31/12/2024")],
    ///     },
    /// )
    /// .unwrap();
    /// assert_eq!(request.recipient(), "Bharti Kumari");
    ///
    /// let empty = CertificateRequest::new("Bharti Kumari", CertificateDetails::Course { courses: vec![] });
    /// assert!(empty.is_err());
    /// ```
    pub fn new(recipient: impl Into<String>, details: CertificateDetails) -> Result<Self, CertError> {
        let recipient = recipient.into().trim().to_string();
        let kind = details.kind();
        if recipient.is_empty() {
            return Err(CertError::validation(
                kind.recipient_label(),
                "a recipient name is required",
            ));
        }

        let details = match details {
            CertificateDetails::Course { courses } => {
                let courses: Vec<CourseEntry> =
                    courses.into_iter().filter(CourseEntry::is_complete).collect();
                if courses.is_empty() {
                    return Err(CertError::validation(
                        "Courses",
                        "add at least one course with a name, start date and end date",
                    ));
                }
                CertificateDetails::Course { courses }
            }
            CertificateDetails::Internship {
                department,
                period,
                project,
            } => {
                let department = department.trim().to_string();
                if department.is_empty() {
                    return Err(CertError::validation(
                        "Department / Domain",
                        "an internship certificate needs a department",
                    ));
                }
                CertificateDetails::Internship {
                    department,
                    period,
                    project: non_empty(project.as_deref()),
                }
            }
            CertificateDetails::Experience {
                designation,
                department,
                period,
                responsibilities,
            } => {
                let designation = designation.trim().to_string();
                if designation.is_empty() {
                    return Err(CertError::validation(
                        "Designation",
                        "an experience certificate needs a designation",
                    ));
                }
                CertificateDetails::Experience {
                    designation,
                    department: non_empty(department.as_deref()),
                    period,
                    responsibilities: responsibilities
                        .map(|r| r.trim_end().to_string())
                        .filter(|r| !r.trim().is_empty()),
                }
            }
        };

        Ok(CertificateRequest {
            recipient,
            details,
            certificate_id: None,
            custom_description: None,
            design: DesignStyle::default(),
            issue_date: today_long(),
        })
    }

    pub fn with_certificate_id(mut self, id: Option<&str>) -> Self {
        self.certificate_id = non_empty(id);
        self
    }

    pub fn with_description(mut self, description: Option<&str>) -> Self {
        self.custom_description = non_empty(description);
        self
    }

    pub fn with_design(mut self, design: DesignStyle) -> Self {
        self.design = design;
        self
    }

    pub fn with_issue_date(mut self, issue_date: impl Into<String>) -> Self {
        self.issue_date = issue_date.into();
        self
    }

    pub fn kind(&self) -> CertificateKind {
        self.details.kind()
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn details(&self) -> &CertificateDetails {
        &self.details
    }

    pub fn certificate_id(&self) -> Option<&str> {
        self.certificate_id.as_deref()
    }

    pub fn custom_description(&self) -> Option<&str> {
        self.custom_description.as_deref()
    }

    pub fn design(&self) -> DesignStyle {
        self.design
    }

    pub fn issue_date(&self) -> &str {
        &self.issue_date
    }

    /// The custom description, or the kind's default for `organization`.
    pub fn description(&self, organization: &str) -> String {
        match &self.custom_description {
            Some(text) => text.clone(),
            None => self.kind().default_description(organization),
        }
    }

    /// Every user-entered date string, in the order they appear on the certificate.
    pub fn dates(&self) -> Vec<&str> {
        let mut dates = Vec::new();
        match &self.details {
            CertificateDetails::Course { courses } => {
                for course in courses {
                    dates.push(course.start_date.trim());
                    dates.push(course.end_date.trim());
                }
            }
            CertificateDetails::Internship { period, .. }
            | CertificateDetails::Experience { period, .. } => {
                dates.push(period.start.as_str());
                dates.push(period.end.as_str());
            }
        }
        dates.retain(|d| !d.is_empty());
        dates
    }
}
