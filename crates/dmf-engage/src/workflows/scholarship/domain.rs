use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use chrono::{NaiveDate, Utc};
use mime::Mime;
use serde::{Deserialize, Serialize};

/// Identifier assigned by the record store when an application is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Prefix carried by every scholarship tracking code.
pub const REFERENCE_PREFIX: &str = "DMF";

static REFERENCE_SEQUENCE: OnceLock<AtomicU64> = OnceLock::new();

/// Human-facing tracking code issued exactly once per submission, e.g. `DMF-83920157`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceId(pub String);

impl ReferenceId {
    /// Issues the next tracking code.
    ///
    /// The sequence is seeded from the millisecond clock once per process and
    /// stepped atomically afterwards, so two submissions from the same process
    /// can never share a code. The rendered form keeps the last eight digits.
    pub fn issue() -> Self {
        let sequence = REFERENCE_SEQUENCE
            .get_or_init(|| AtomicU64::new(Utc::now().timestamp_millis().unsigned_abs()));
        let serial = sequence.fetch_add(1, Ordering::Relaxed) % 100_000_000;
        Self(format!("{REFERENCE_PREFIX}-{serial:08}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Applicant gender as captured on the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    pub const fn label(self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
        }
    }
}

/// Stage of schooling the applicant is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EducationLevel {
    Secondary,
    Undergraduate,
    Postgraduate,
}

impl EducationLevel {
    pub const fn label(self) -> &'static str {
        match self {
            EducationLevel::Secondary => "secondary",
            EducationLevel::Undergraduate => "undergraduate",
            EducationLevel::Postgraduate => "postgraduate",
        }
    }
}

/// Support program the applicant is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScholarshipType {
    Tuition,
    ExamFees,
    LearningMaterials,
}

impl ScholarshipType {
    pub const fn label(self) -> &'static str {
        match self {
            ScholarshipType::Tuition => "tuition support",
            ScholarshipType::ExamFees => "exam fees",
            ScholarshipType::LearningMaterials => "learning materials",
        }
    }
}

/// Monthly family income band, in naira.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomeBracket {
    Below50k,
    From50kTo150k,
    From150kTo400k,
    Above400k,
}

impl IncomeBracket {
    pub const fn label(self) -> &'static str {
        match self {
            IncomeBracket::Below50k => "below ₦50,000",
            IncomeBracket::From50kTo150k => "₦50,000 to ₦150,000",
            IncomeBracket::From150kTo400k => "₦150,000 to ₦400,000",
            IncomeBracket::Above400k => "above ₦400,000",
        }
    }
}

/// Review status tracked on a persisted application. Submissions always start
/// as `Pending`; the later states are flipped by the review desk, never by the
/// intake pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    UnderReview,
    Approved,
    Declined,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Declined => "declined",
        }
    }
}

/// Which slot of the application an attachment fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    IndigeneLetter,
    EducationDocument,
}

impl DocumentKind {
    /// Tag woven into stored object names alongside the tracking code.
    pub const fn tag(self) -> &'static str {
        match self {
            DocumentKind::IndigeneLetter => "indigene-letter",
            DocumentKind::EducationDocument => "education-document",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            DocumentKind::IndigeneLetter => "indigene letter",
            DocumentKind::EducationDocument => "education document",
        }
    }
}

/// Upper bound on a single attachment, in bytes (100 KiB).
pub const MAX_DOCUMENT_BYTES: usize = 100 * 1024;

/// Raised when a selected file cannot be bound to the draft.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentRejection {
    #[error("file is {size} bytes, above the {} byte limit", MAX_DOCUMENT_BYTES)]
    TooLarge { size: usize },
    #[error("file type '{content_type}' is not accepted; use a PDF, JPEG, or PNG")]
    UnsupportedType { content_type: String },
}

/// An attachment that passed the selection-time checks.
///
/// The only way to construct one is [`BoundDocument::try_new`], so a draft can
/// never hold an oversized file or one outside the accepted types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundDocument {
    file_name: String,
    content_type: Mime,
    bytes: Vec<u8>,
}

impl BoundDocument {
    /// Checks the selected file and binds it, or rejects it without touching
    /// the draft. Size and type failures are reported immediately rather than
    /// at the next step gate.
    pub fn try_new(
        file_name: impl Into<String>,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<Self, AttachmentRejection> {
        let parsed: Mime = content_type.trim().parse().map_err(|_| {
            AttachmentRejection::UnsupportedType {
                content_type: content_type.to_string(),
            }
        })?;

        if !accepted_document_type(&parsed) {
            return Err(AttachmentRejection::UnsupportedType {
                content_type: parsed.essence_str().to_string(),
            });
        }

        if bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(AttachmentRejection::TooLarge { size: bytes.len() });
        }

        Ok(Self {
            file_name: file_name.into(),
            content_type: parsed,
            bytes,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn content_type(&self) -> &Mime {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

fn accepted_document_type(candidate: &Mime) -> bool {
    let accepted = [&mime::APPLICATION_PDF, &mime::IMAGE_JPEG, &mime::IMAGE_PNG];
    accepted
        .iter()
        .any(|allowed| candidate.essence_str() == allowed.essence_str())
}

/// Mutable in-progress form state, owned by exactly one wizard.
///
/// Text fields are bound directly as the applicant types; attachments can only
/// arrive through [`BoundDocument::try_new`]. Whitespace-only strings are
/// treated as missing by the step gates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationDraft {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub education_level: Option<EducationLevel>,
    pub institution: Option<String>,
    pub course_of_study: Option<String>,
    pub year_of_study: Option<String>,
    pub scholarship_type: Option<ScholarshipType>,
    pub amount_requested: Option<u32>,
    pub justification: Option<String>,
    pub guardian_name: Option<String>,
    pub income_bracket: Option<IncomeBracket>,
    pub indigene_letter: Option<BoundDocument>,
    pub education_document: Option<BoundDocument>,
}

impl ApplicationDraft {
    pub fn document(&self, kind: DocumentKind) -> Option<&BoundDocument> {
        match kind {
            DocumentKind::IndigeneLetter => self.indigene_letter.as_ref(),
            DocumentKind::EducationDocument => self.education_document.as_ref(),
        }
    }

    pub fn set_document(&mut self, kind: DocumentKind, document: BoundDocument) {
        match kind {
            DocumentKind::IndigeneLetter => self.indigene_letter = Some(document),
            DocumentKind::EducationDocument => self.education_document = Some(document),
        }
    }
}

/// Identity fields gathered on the first step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
}

impl PersonalInfo {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Residence and schooling fields gathered on the second step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundInfo {
    pub address: String,
    pub city: String,
    pub education_level: EducationLevel,
    pub institution: String,
    pub course_of_study: String,
    pub year_of_study: String,
}

/// Scholarship request fields gathered on the third step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundingRequest {
    pub scholarship_type: ScholarshipType,
    pub amount_requested: u32,
    pub justification: String,
    pub guardian_name: String,
    pub income_bracket: IncomeBracket,
}

/// Both required attachments, bound and checked.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSet {
    pub indigene_letter: BoundDocument,
    pub education_document: BoundDocument,
}

impl DocumentSet {
    pub fn slot(&self, kind: DocumentKind) -> &BoundDocument {
        match kind {
            DocumentKind::IndigeneLetter => &self.indigene_letter,
            DocumentKind::EducationDocument => &self.education_document,
        }
    }
}

/// The fully validated snapshot extracted from a draft at submission time.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantProfile {
    pub personal: PersonalInfo,
    pub background: BackgroundInfo,
    pub funding: FundingRequest,
    pub documents: DocumentSet,
}

impl ApplicantProfile {
    /// Form-field summary included with both notification templates.
    pub fn notification_details(&self) -> BTreeMap<String, String> {
        let mut details = BTreeMap::new();
        details.insert(
            "scholarship_type".to_string(),
            self.funding.scholarship_type.label().to_string(),
        );
        details.insert(
            "amount_requested".to_string(),
            format!("₦{}", self.funding.amount_requested),
        );
        details.insert(
            "education_level".to_string(),
            self.background.education_level.label().to_string(),
        );
        details.insert("institution".to_string(), self.background.institution.clone());
        details.insert("city".to_string(), self.background.city.clone());
        details
    }
}
