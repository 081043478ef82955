//! Template catalog - the static list of generatable document types.
//!
//! Each document type declares the form fields it needs and the rules those
//! fields must satisfy. The form layer validates records against these
//! descriptors; nothing here has behavior beyond lookup.

pub mod routes;

use serde::Serialize;

/// Validation rule attached to a form field, applied on top of presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "rule", content = "value", rename_all = "camelCase")]
pub enum FieldRule {
    /// `YYYY-MM-DD`, not in the future.
    Date,
    /// Value must be one of the options (case-insensitive).
    OneOf(&'static [&'static str]),
    /// Minimum character count after trimming.
    MinLength(usize),
    /// South African 13-digit identity number with Luhn checksum.
    IdNumber,
    Email,
    Phone,
}

impl FieldRule {
    pub fn describe(&self) -> String {
        match self {
            Self::Date => "date".to_string(),
            Self::OneOf(options) => format!("oneOf:{}", options.join("|")),
            Self::MinLength(n) => format!("minLength:{}", n),
            Self::IdNumber => "idNumber".to_string(),
            Self::Email => "email".to_string(),
            Self::Phone => "phone".to_string(),
        }
    }
}

/// One input on a document form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub rules: &'static [FieldRule],
}

impl FieldSpec {
    const fn required(key: &'static str, label: &'static str, rules: &'static [FieldRule]) -> Self {
        Self {
            key,
            label,
            required: true,
            rules,
        }
    }

    const fn optional(self) -> Self {
        Self {
            required: false,
            ..self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    Identity,
    Travel,
    CivilRegistration,
    Immigration,
}

impl DocumentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Travel => "travel",
            Self::CivilRegistration => "civil_registration",
            Self::Immigration => "immigration",
        }
    }
}

/// Static metadata describing one generatable document form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentTypeDescriptor {
    pub code: &'static str,
    pub display_name: &'static str,
    pub category: DocumentCategory,
    /// Prefix used when minting document numbers for this type.
    pub number_prefix: &'static str,
    pub fields: &'static [FieldSpec],
}

impl DocumentTypeDescriptor {
    pub fn required_fields(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.key)
            .collect()
    }

    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }
}

pub const GENDERS: &[&str] = &["Male", "Female", "Other"];
pub const MARITAL_STATUSES: &[&str] = &["Single", "Married", "Divorced", "Widowed"];

const FULL_NAME: FieldSpec = FieldSpec::required("fullName", "Full name", &[FieldRule::MinLength(2)]);
const DATE_OF_BIRTH: FieldSpec = FieldSpec::required("dateOfBirth", "Date of birth", &[FieldRule::Date]);
const NATIONALITY: FieldSpec =
    FieldSpec::required("nationality", "Nationality", &[FieldRule::MinLength(2)]);
const GENDER: FieldSpec = FieldSpec::required("gender", "Gender", &[FieldRule::OneOf(GENDERS)]);
const PLACE_OF_BIRTH: FieldSpec =
    FieldSpec::required("placeOfBirth", "Place of birth", &[FieldRule::MinLength(2)]);
const ID_NUMBER: FieldSpec = FieldSpec::required("idNumber", "ID number", &[FieldRule::IdNumber]);
const PASSPORT_NUMBER: FieldSpec =
    FieldSpec::required("passportNumber", "Passport number", &[FieldRule::MinLength(6)]);
const ADDRESS: FieldSpec =
    FieldSpec::required("address", "Residential address", &[FieldRule::MinLength(5)]);
const PHONE: FieldSpec = FieldSpec::required("phone", "Phone number", &[FieldRule::Phone]);
const EMAIL: FieldSpec = FieldSpec::required("email", "Email address", &[FieldRule::Email]);
const MOTHER_NAME: FieldSpec =
    FieldSpec::required("motherName", "Mother's full name", &[FieldRule::MinLength(2)]);
const FATHER_NAME: FieldSpec =
    FieldSpec::required("fatherName", "Father's full name", &[FieldRule::MinLength(2)]);
const DATE_OF_DEATH: FieldSpec =
    FieldSpec::required("dateOfDeath", "Date of death", &[FieldRule::Date]);
const PLACE_OF_DEATH: FieldSpec =
    FieldSpec::required("placeOfDeath", "Place of death", &[FieldRule::MinLength(2)]);
const SPOUSE_NAME: FieldSpec =
    FieldSpec::required("spouseName", "Spouse's full name", &[FieldRule::MinLength(2)]);
const DATE_OF_MARRIAGE: FieldSpec =
    FieldSpec::required("dateOfMarriage", "Date of marriage", &[FieldRule::Date]);
const PLACE_OF_MARRIAGE: FieldSpec =
    FieldSpec::required("placeOfMarriage", "Place of marriage", &[FieldRule::MinLength(2)]);
const MARITAL_STATUS: FieldSpec = FieldSpec::required(
    "maritalStatus",
    "Marital status",
    &[FieldRule::OneOf(MARITAL_STATUSES)],
);
const EMPLOYER_NAME: FieldSpec =
    FieldSpec::required("employerName", "Employer name", &[FieldRule::MinLength(2)]);
const QUALIFICATION: FieldSpec =
    FieldSpec::required("qualification", "Qualification", &[FieldRule::MinLength(3)]);
const INSTITUTION_NAME: FieldSpec =
    FieldSpec::required("institutionName", "Institution name", &[FieldRule::MinLength(3)]);

static CATALOG: &[DocumentTypeDescriptor] = &[
    DocumentTypeDescriptor {
        code: "smart_id_card",
        display_name: "Smart ID Card",
        category: DocumentCategory::Identity,
        number_prefix: "ID",
        fields: &[
            FULL_NAME,
            DATE_OF_BIRTH,
            NATIONALITY,
            GENDER.optional(),
            ID_NUMBER.optional(),
            PLACE_OF_BIRTH.optional(),
            ADDRESS.optional(),
        ],
    },
    DocumentTypeDescriptor {
        code: "identity_document_book",
        display_name: "Green ID Book",
        category: DocumentCategory::Identity,
        number_prefix: "IDB",
        fields: &[FULL_NAME, DATE_OF_BIRTH, NATIONALITY, ID_NUMBER, GENDER.optional()],
    },
    DocumentTypeDescriptor {
        code: "temporary_id_certificate",
        display_name: "Temporary ID Certificate",
        category: DocumentCategory::Identity,
        number_prefix: "TID",
        fields: &[FULL_NAME, DATE_OF_BIRTH, ID_NUMBER, ADDRESS.optional()],
    },
    DocumentTypeDescriptor {
        code: "south_african_passport",
        display_name: "South African Passport",
        category: DocumentCategory::Travel,
        number_prefix: "P",
        fields: &[
            FULL_NAME,
            DATE_OF_BIRTH,
            NATIONALITY,
            GENDER,
            PLACE_OF_BIRTH,
            ID_NUMBER,
            PHONE.optional(),
            EMAIL.optional(),
        ],
    },
    DocumentTypeDescriptor {
        code: "emergency_travel_certificate",
        display_name: "Emergency Travel Certificate",
        category: DocumentCategory::Travel,
        number_prefix: "ETC",
        fields: &[
            FULL_NAME,
            DATE_OF_BIRTH,
            NATIONALITY,
            PASSPORT_NUMBER.optional(),
            PHONE.optional(),
        ],
    },
    DocumentTypeDescriptor {
        code: "birth_certificate",
        display_name: "Unabridged Birth Certificate",
        category: DocumentCategory::CivilRegistration,
        number_prefix: "BC",
        fields: &[
            FULL_NAME,
            DATE_OF_BIRTH,
            PLACE_OF_BIRTH,
            GENDER,
            MOTHER_NAME,
            FATHER_NAME.optional(),
        ],
    },
    DocumentTypeDescriptor {
        code: "death_certificate",
        display_name: "Death Certificate",
        category: DocumentCategory::CivilRegistration,
        number_prefix: "DC",
        fields: &[
            FULL_NAME,
            DATE_OF_BIRTH,
            DATE_OF_DEATH,
            PLACE_OF_DEATH,
            ID_NUMBER.optional(),
        ],
    },
    DocumentTypeDescriptor {
        code: "marriage_certificate",
        display_name: "Marriage Certificate",
        category: DocumentCategory::CivilRegistration,
        number_prefix: "MC",
        fields: &[
            FULL_NAME,
            DATE_OF_BIRTH,
            SPOUSE_NAME,
            DATE_OF_MARRIAGE,
            PLACE_OF_MARRIAGE,
            MARITAL_STATUS.optional(),
        ],
    },
    DocumentTypeDescriptor {
        code: "permanent_residence_permit",
        display_name: "Permanent Residence Permit",
        category: DocumentCategory::Immigration,
        number_prefix: "PRP",
        fields: &[
            FULL_NAME,
            DATE_OF_BIRTH,
            NATIONALITY,
            PASSPORT_NUMBER,
            ADDRESS,
            EMAIL.optional(),
        ],
    },
    DocumentTypeDescriptor {
        code: "general_work_visa",
        display_name: "General Work Visa",
        category: DocumentCategory::Immigration,
        number_prefix: "GWV",
        fields: &[
            FULL_NAME,
            DATE_OF_BIRTH,
            NATIONALITY,
            PASSPORT_NUMBER,
            EMPLOYER_NAME,
        ],
    },
    DocumentTypeDescriptor {
        code: "critical_skills_visa",
        display_name: "Critical Skills Work Visa",
        category: DocumentCategory::Immigration,
        number_prefix: "CSV",
        fields: &[
            FULL_NAME,
            DATE_OF_BIRTH,
            NATIONALITY,
            PASSPORT_NUMBER,
            QUALIFICATION,
            EMPLOYER_NAME.optional(),
        ],
    },
    DocumentTypeDescriptor {
        code: "study_visa",
        display_name: "Study Visa",
        category: DocumentCategory::Immigration,
        number_prefix: "SV",
        fields: &[
            FULL_NAME,
            DATE_OF_BIRTH,
            NATIONALITY,
            PASSPORT_NUMBER,
            INSTITUTION_NAME,
        ],
    },
];

/// All document types, in display order.
pub fn all() -> &'static [DocumentTypeDescriptor] {
    CATALOG
}

/// Look up a document type by its code.
pub fn find(code: &str) -> Option<&'static DocumentTypeDescriptor> {
    CATALOG.iter().find(|d| d.code == code)
}
