//! Form layer - turns raw user input into a validated personal data record.

pub mod record;
pub mod validation;

pub use record::{validate_for, PersonalDataRecord, ValidatedRecord};
pub use validation::{ValidationError, ValidationErrors};
