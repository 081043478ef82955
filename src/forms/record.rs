use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::validation::{validate_field, ValidationErrors};
use crate::catalog::DocumentTypeDescriptor;

/// User-entered personal data destined for document generation.
///
/// Blank strings are treated as missing. Document-specific inputs (spouse
/// name, employer, date of death, ...) live in `extra`, keyed by the field
/// key declared in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalDataRecord {
    pub full_name: String,
    /// `YYYY-MM-DD`
    pub date_of_birth: String,
    pub nationality: String,
    pub gender: String,
    pub place_of_birth: String,
    pub id_number: String,
    pub passport_number: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl PersonalDataRecord {
    /// Value of a catalog field key, `None` when blank.
    pub fn get(&self, key: &str) -> Option<&str> {
        let value = match key {
            "fullName" => self.full_name.as_str(),
            "dateOfBirth" => self.date_of_birth.as_str(),
            "nationality" => self.nationality.as_str(),
            "gender" => self.gender.as_str(),
            "placeOfBirth" => self.place_of_birth.as_str(),
            "idNumber" => self.id_number.as_str(),
            "passportNumber" => self.passport_number.as_str(),
            "address" => self.address.as_str(),
            "phone" => self.phone.as_str(),
            "email" => self.email.as_str(),
            other => self.extra.get(other).map(String::as_str).unwrap_or_default(),
        };
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    }

    /// Set a catalog field by key. Unknown keys go to `extra`.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match key {
            "fullName" => self.full_name = value,
            "dateOfBirth" => self.date_of_birth = value,
            "nationality" => self.nationality = value,
            "gender" => self.gender = value,
            "placeOfBirth" => self.place_of_birth = value,
            "idNumber" => self.id_number = value,
            "passportNumber" => self.passport_number = value,
            "address" => self.address = value,
            "phone" => self.phone = value,
            "email" => self.email = value,
            other => {
                self.extra.insert(other.to_string(), value);
            }
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }
}

/// A record that passed every rule of its document type.
///
/// Only [`validate_for`] constructs one, so holding a `ValidatedRecord` is
/// proof that submission may proceed.
#[derive(Debug, Clone)]
pub struct ValidatedRecord {
    descriptor: &'static DocumentTypeDescriptor,
    record: PersonalDataRecord,
}

impl ValidatedRecord {
    pub fn descriptor(&self) -> &'static DocumentTypeDescriptor {
        self.descriptor
    }

    pub fn record(&self) -> &PersonalDataRecord {
        &self.record
    }

    pub fn into_record(self) -> PersonalDataRecord {
        self.record
    }
}

/// Apply every field rule of `descriptor` to `record`.
pub fn validate_for(
    descriptor: &'static DocumentTypeDescriptor,
    record: PersonalDataRecord,
) -> Result<ValidatedRecord, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for spec in descriptor.fields {
        validate_field(spec, record.get(spec.key), &mut errors);
    }
    errors.into_result()?;
    Ok(ValidatedRecord { descriptor, record })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;

    fn jane() -> PersonalDataRecord {
        PersonalDataRecord {
            full_name: "Jane Doe".to_string(),
            date_of_birth: "1990-01-01".to_string(),
            nationality: "South African".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_smart_id_record() {
        let descriptor = catalog::find("smart_id_card").unwrap();
        let validated = validate_for(descriptor, jane()).unwrap();
        assert_eq!(validated.descriptor().code, "smart_id_card");
        assert_eq!(validated.record().full_name, "Jane Doe");
    }

    #[test]
    fn test_empty_date_of_birth_message() {
        let descriptor = catalog::find("smart_id_card").unwrap();
        let mut record = jane();
        record.date_of_birth = String::new();

        let errors = validate_for(descriptor, record).unwrap_err();
        assert_eq!(errors.len(), 1);
        let error = errors.for_field("dateOfBirth").next().unwrap();
        assert_eq!(error.message, "Date of birth is required");
    }

    #[test]
    fn test_optional_field_checked_when_present() {
        let descriptor = catalog::find("smart_id_card").unwrap();
        let record = jane().with("gender", "Unknown");
        let errors = validate_for(descriptor, record).unwrap_err();
        assert!(errors.has_field("gender"));
    }

    #[test]
    fn test_extra_fields_round_through_get_and_set() {
        let record = PersonalDataRecord::default().with("spouseName", "John Doe");
        assert_eq!(record.get("spouseName"), Some("John Doe"));
        assert_eq!(record.get("employerName"), None);
    }

    #[test]
    fn test_deserialize_camel_case() {
        let json = r#"{
            "fullName": "Jane Doe",
            "dateOfBirth": "1990-01-01",
            "nationality": "South African",
            "extra": { "maritalStatus": "Married" }
        }"#;
        let record: PersonalDataRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.full_name, "Jane Doe");
        assert_eq!(record.get("maritalStatus"), Some("Married"));
        assert!(record.id_number.is_empty());
    }
}
