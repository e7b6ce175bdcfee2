use std::fmt;

use serde::Serialize;

use super::domain::{
    ApplicantProfile, ApplicationDraft, BackgroundInfo, DocumentSet, FundingRequest, PersonalInfo,
};

/// Minimum length of the justification text, counted in characters after trimming.
pub const JUSTIFICATION_MIN_CHARS: usize = 50;

/// The four editable steps of the application form, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStep {
    Personal,
    Background,
    Funding,
    Documents,
}

impl FormStep {
    pub const ALL: [FormStep; 4] = [
        FormStep::Personal,
        FormStep::Background,
        FormStep::Funding,
        FormStep::Documents,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            FormStep::Personal => "personal details",
            FormStep::Background => "address and education",
            FormStep::Funding => "scholarship request",
            FormStep::Documents => "supporting documents",
        }
    }

    /// One-based position shown to the applicant.
    pub const fn number(self) -> u8 {
        match self {
            FormStep::Personal => 1,
            FormStep::Background => 2,
            FormStep::Funding => 3,
            FormStep::Documents => 4,
        }
    }

    pub const fn next(self) -> Option<FormStep> {
        match self {
            FormStep::Personal => Some(FormStep::Background),
            FormStep::Background => Some(FormStep::Funding),
            FormStep::Funding => Some(FormStep::Documents),
            FormStep::Documents => None,
        }
    }

    pub const fn previous(self) -> Option<FormStep> {
        match self {
            FormStep::Personal => None,
            FormStep::Background => Some(FormStep::Personal),
            FormStep::Funding => Some(FormStep::Background),
            FormStep::Documents => Some(FormStep::Funding),
        }
    }
}

/// Field errors for the personal details step. Each slot is either clear or
/// holds the message shown under that field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PersonalErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<&'static str>,
}

impl PersonalErrors {
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    pub fn field_count(&self) -> usize {
        [
            self.first_name,
            self.last_name,
            self.email,
            self.phone,
            self.date_of_birth,
            self.gender,
        ]
        .iter()
        .filter(|slot| slot.is_some())
        .count()
    }

    fn intersect(&self, fresh: &Self) -> Self {
        Self {
            first_name: self.first_name.and(fresh.first_name),
            last_name: self.last_name.and(fresh.last_name),
            email: self.email.and(fresh.email),
            phone: self.phone.and(fresh.phone),
            date_of_birth: self.date_of_birth.and(fresh.date_of_birth),
            gender: self.gender.and(fresh.gender),
        }
    }
}

/// Field errors for the address and education step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackgroundErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education_level: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub course_of_study: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_of_study: Option<&'static str>,
}

impl BackgroundErrors {
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    pub fn field_count(&self) -> usize {
        [
            self.address,
            self.city,
            self.education_level,
            self.institution,
            self.course_of_study,
            self.year_of_study,
        ]
        .iter()
        .filter(|slot| slot.is_some())
        .count()
    }

    fn intersect(&self, fresh: &Self) -> Self {
        Self {
            address: self.address.and(fresh.address),
            city: self.city.and(fresh.city),
            education_level: self.education_level.and(fresh.education_level),
            institution: self.institution.and(fresh.institution),
            course_of_study: self.course_of_study.and(fresh.course_of_study),
            year_of_study: self.year_of_study.and(fresh.year_of_study),
        }
    }
}

/// Field errors for the scholarship request step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FundingErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scholarship_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_requested: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardian_name: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income_bracket: Option<&'static str>,
}

impl FundingErrors {
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    pub fn field_count(&self) -> usize {
        [
            self.scholarship_type,
            self.amount_requested,
            self.justification,
            self.guardian_name,
            self.income_bracket,
        ]
        .iter()
        .filter(|slot| slot.is_some())
        .count()
    }

    fn intersect(&self, fresh: &Self) -> Self {
        Self {
            scholarship_type: self.scholarship_type.and(fresh.scholarship_type),
            amount_requested: self.amount_requested.and(fresh.amount_requested),
            justification: self.justification.and(fresh.justification),
            guardian_name: self.guardian_name.and(fresh.guardian_name),
            income_bracket: self.income_bracket.and(fresh.income_bracket),
        }
    }
}

/// Field errors for the supporting documents step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocumentErrors {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indigene_letter: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education_document: Option<&'static str>,
}

impl DocumentErrors {
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    pub fn field_count(&self) -> usize {
        [self.indigene_letter, self.education_document]
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }

    fn intersect(&self, fresh: &Self) -> Self {
        Self {
            indigene_letter: self.indigene_letter.and(fresh.indigene_letter),
            education_document: self.education_document.and(fresh.education_document),
        }
    }
}

/// Errors raised by one step gate. Serializes as the bare field map; callers
/// add the step name themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StepErrors {
    Personal(PersonalErrors),
    Background(BackgroundErrors),
    Funding(FundingErrors),
    Documents(DocumentErrors),
}

impl StepErrors {
    pub fn step(&self) -> FormStep {
        match self {
            StepErrors::Personal(_) => FormStep::Personal,
            StepErrors::Background(_) => FormStep::Background,
            StepErrors::Funding(_) => FormStep::Funding,
            StepErrors::Documents(_) => FormStep::Documents,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    pub fn field_count(&self) -> usize {
        match self {
            StepErrors::Personal(errors) => errors.field_count(),
            StepErrors::Background(errors) => errors.field_count(),
            StepErrors::Funding(errors) => errors.field_count(),
            StepErrors::Documents(errors) => errors.field_count(),
        }
    }

    /// Keeps only the entries present in both sets. Used to drop stale errors
    /// once the applicant has fixed the underlying field.
    pub(crate) fn intersect(&self, fresh: &StepErrors) -> StepErrors {
        match (self, fresh) {
            (StepErrors::Personal(held), StepErrors::Personal(new)) => {
                StepErrors::Personal(held.intersect(new))
            }
            (StepErrors::Background(held), StepErrors::Background(new)) => {
                StepErrors::Background(held.intersect(new))
            }
            (StepErrors::Funding(held), StepErrors::Funding(new)) => {
                StepErrors::Funding(held.intersect(new))
            }
            (StepErrors::Documents(held), StepErrors::Documents(new)) => {
                StepErrors::Documents(held.intersect(new))
            }
            _ => self.clone(),
        }
    }
}

impl fmt::Display for StepErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} unresolved field error(s) on the {} step",
            self.field_count(),
            self.step().label()
        )
    }
}

/// Runs one step gate. `None` means the step is clean.
pub fn validate_step(draft: &ApplicationDraft, step: FormStep) -> Option<StepErrors> {
    match step {
        FormStep::Personal => personal(draft).err().map(StepErrors::Personal),
        FormStep::Background => background(draft).err().map(StepErrors::Background),
        FormStep::Funding => funding(draft).err().map(StepErrors::Funding),
        FormStep::Documents => documents(draft).err().map(StepErrors::Documents),
    }
}

/// Runs every gate in order and extracts the validated snapshot. The first
/// failing step is reported; later steps are not inspected.
pub fn profile(draft: &ApplicationDraft) -> Result<ApplicantProfile, StepErrors> {
    let personal = personal(draft).map_err(StepErrors::Personal)?;
    let background = background(draft).map_err(StepErrors::Background)?;
    let funding = funding(draft).map_err(StepErrors::Funding)?;
    let documents = documents(draft).map_err(StepErrors::Documents)?;

    Ok(ApplicantProfile {
        personal,
        background,
        funding,
        documents,
    })
}

pub(crate) fn personal(draft: &ApplicationDraft) -> Result<PersonalInfo, PersonalErrors> {
    let mut errors = PersonalErrors::default();

    let first_name = required_text(&draft.first_name, "Enter your first name", &mut errors.first_name);
    let last_name = required_text(&draft.last_name, "Enter your last name", &mut errors.last_name);

    let email = match trimmed(&draft.email) {
        Some(candidate) if valid_email(&candidate) => Some(candidate),
        Some(_) => {
            errors.email = Some("Enter a valid email address");
            None
        }
        None => {
            errors.email = Some("Enter your email address");
            None
        }
    };

    let phone = match trimmed(&draft.phone) {
        Some(candidate) => {
            let digits: String = candidate.chars().filter(|c| !c.is_whitespace()).collect();
            if valid_nigerian_phone(&digits) {
                Some(digits)
            } else {
                errors.phone = Some("Enter a valid Nigerian phone number");
                None
            }
        }
        None => {
            errors.phone = Some("Enter your phone number");
            None
        }
    };

    let date_of_birth =
        required_value(&draft.date_of_birth, "Enter your date of birth", &mut errors.date_of_birth);
    let gender = required_value(&draft.gender, "Select your gender", &mut errors.gender);

    match (first_name, last_name, email, phone, date_of_birth, gender) {
        (Some(first_name), Some(last_name), Some(email), Some(phone), Some(date_of_birth), Some(gender))
            if errors.is_empty() =>
        {
            Ok(PersonalInfo {
                first_name,
                last_name,
                email,
                phone,
                date_of_birth,
                gender,
            })
        }
        _ => Err(errors),
    }
}

pub(crate) fn background(draft: &ApplicationDraft) -> Result<BackgroundInfo, BackgroundErrors> {
    let mut errors = BackgroundErrors::default();

    let address = required_text(&draft.address, "Enter your home address", &mut errors.address);
    let city = required_text(&draft.city, "Enter your city", &mut errors.city);
    let education_level = required_value(
        &draft.education_level,
        "Select your education level",
        &mut errors.education_level,
    );
    let institution = required_text(
        &draft.institution,
        "Enter the name of your institution",
        &mut errors.institution,
    );
    let course_of_study = required_text(
        &draft.course_of_study,
        "Enter your course of study",
        &mut errors.course_of_study,
    );
    let year_of_study = required_text(
        &draft.year_of_study,
        "Enter your year of study",
        &mut errors.year_of_study,
    );

    match (address, city, education_level, institution, course_of_study, year_of_study) {
        (Some(address), Some(city), Some(education_level), Some(institution), Some(course_of_study), Some(year_of_study))
            if errors.is_empty() =>
        {
            Ok(BackgroundInfo {
                address,
                city,
                education_level,
                institution,
                course_of_study,
                year_of_study,
            })
        }
        _ => Err(errors),
    }
}

pub(crate) fn funding(draft: &ApplicationDraft) -> Result<FundingRequest, FundingErrors> {
    let mut errors = FundingErrors::default();

    let scholarship_type = required_value(
        &draft.scholarship_type,
        "Select the support you are applying for",
        &mut errors.scholarship_type,
    );

    let amount_requested = match draft.amount_requested {
        Some(amount) if amount > 0 => Some(amount),
        Some(_) => {
            errors.amount_requested = Some("Requested amount must be greater than zero");
            None
        }
        None => {
            errors.amount_requested = Some("Enter the amount you are requesting");
            None
        }
    };

    let justification = match trimmed(&draft.justification) {
        Some(candidate) if candidate.chars().count() >= JUSTIFICATION_MIN_CHARS => Some(candidate),
        Some(_) => {
            errors.justification = Some("Your justification must be at least 50 characters");
            None
        }
        None => {
            errors.justification = Some("Tell us why you need this scholarship");
            None
        }
    };

    let guardian_name = required_text(
        &draft.guardian_name,
        "Enter your parent or guardian's name",
        &mut errors.guardian_name,
    );
    let income_bracket = required_value(
        &draft.income_bracket,
        "Select your family income range",
        &mut errors.income_bracket,
    );

    match (scholarship_type, amount_requested, justification, guardian_name, income_bracket) {
        (Some(scholarship_type), Some(amount_requested), Some(justification), Some(guardian_name), Some(income_bracket))
            if errors.is_empty() =>
        {
            Ok(FundingRequest {
                scholarship_type,
                amount_requested,
                justification,
                guardian_name,
                income_bracket,
            })
        }
        _ => Err(errors),
    }
}

pub(crate) fn documents(draft: &ApplicationDraft) -> Result<DocumentSet, DocumentErrors> {
    let mut errors = DocumentErrors::default();

    if draft.indigene_letter.is_none() {
        errors.indigene_letter = Some("Attach your letter of indigene");
    }
    if draft.education_document.is_none() {
        errors.education_document = Some("Attach your admission letter or school ID");
    }

    match (draft.indigene_letter.clone(), draft.education_document.clone()) {
        (Some(indigene_letter), Some(education_document)) => Ok(DocumentSet {
            indigene_letter,
            education_document,
        }),
        _ => Err(errors),
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn required_text(
    value: &Option<String>,
    message: &'static str,
    slot: &mut Option<&'static str>,
) -> Option<String> {
    match trimmed(value) {
        Some(candidate) => Some(candidate),
        None => {
            *slot = Some(message);
            None
        }
    }
}

fn required_value<T: Copy>(
    value: &Option<T>,
    message: &'static str,
    slot: &mut Option<&'static str>,
) -> Option<T> {
    match value {
        Some(present) => Some(*present),
        None => {
            *slot = Some(message);
            None
        }
    }
}

/// `local@domain.tld` shape: exactly one `@`, no whitespace, a dotted domain
/// whose final segment is at least two letters.
pub(crate) fn valid_email(candidate: &str) -> bool {
    if candidate.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = candidate.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Nigerian mobile number: `+234` or a leading `0`, then a `7`, `8`, or `9`,
/// then nine more digits. Whitespace is ignored.
pub(crate) fn valid_nigerian_phone(candidate: &str) -> bool {
    let stripped: String = candidate.chars().filter(|c| !c.is_whitespace()).collect();

    let rest = if let Some(rest) = stripped.strip_prefix("+234") {
        rest
    } else if let Some(rest) = stripped.strip_prefix('0') {
        rest
    } else {
        return false;
    };

    rest.len() == 10
        && rest.chars().all(|c| c.is_ascii_digit())
        && matches!(rest.chars().next(), Some('7' | '8' | '9'))
}
