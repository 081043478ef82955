//! Document and registration number minting.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use super::GenerationError;

const MAX_MINT_ATTEMPTS: u32 = 8;

/// Issues document numbers that are unique for the lifetime of the issuer.
///
/// Every issued number is remembered, so memory grows by one short string
/// per document until the issuer is dropped.
pub struct NumberIssuer {
    issued: Mutex<HashSet<String>>,
    sequence: AtomicU64,
}

impl Default for NumberIssuer {
    fn default() -> Self {
        Self::new()
    }
}

impl NumberIssuer {
    pub fn new() -> Self {
        Self {
            issued: Mutex::new(HashSet::new()),
            sequence: AtomicU64::new(1),
        }
    }

    /// `<prefix><yy><8 hex>`, e.g. `ID25A1B2C3D4`.
    pub fn document_number(
        &self,
        prefix: &str,
        now: DateTime<Utc>,
    ) -> Result<String, GenerationError> {
        let year = now.format("%y").to_string();
        self.mint_unique(|| {
            let entropy = Uuid::new_v4().simple().to_string().to_uppercase();
            format!("{}{}{}", prefix, year, &entropy[..8])
        })
    }

    /// `DHA-<yyyymmdd>-<sequence>`, the sequence zero-padded to at least six
    /// digits. It widens rather than wrapping, so numbers never repeat.
    pub fn registration_number(&self, now: DateTime<Utc>) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("DHA-{}-{:06}", now.format("%Y%m%d"), seq)
    }

    pub fn issued_count(&self) -> usize {
        self.issued.lock().len()
    }

    fn mint_unique(
        &self,
        mut candidate: impl FnMut() -> String,
    ) -> Result<String, GenerationError> {
        let mut issued = self.issued.lock();
        for _ in 0..MAX_MINT_ATTEMPTS {
            let number = candidate();
            if issued.insert(number.clone()) {
                return Ok(number);
            }
            log::warn!("Document number collision on {}, re-minting", number);
        }
        Err(GenerationError::NumberCollision(MAX_MINT_ATTEMPTS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_number_format() {
        let issuer = NumberIssuer::new();
        let now = "2025-03-14T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let number = issuer.document_number("ID", now).unwrap();
        assert!(number.starts_with("ID25"));
        assert_eq!(number.len(), 12);
        assert!(number[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_collision_is_reminted() {
        let issuer = NumberIssuer::new();
        let mut candidates = vec!["B", "A", "A"];
        assert_eq!(issuer.mint_unique(|| "A".to_string()).unwrap(), "A");
        let second = issuer
            .mint_unique(|| candidates.pop().unwrap_or("C").to_string())
            .unwrap();
        assert_eq!(second, "B");
        assert_eq!(issuer.issued_count(), 2);
    }

    #[test]
    fn test_persistent_collision_fails() {
        let issuer = NumberIssuer::new();
        issuer.mint_unique(|| "SAME".to_string()).unwrap();
        let err = issuer.mint_unique(|| "SAME".to_string()).unwrap_err();
        assert!(matches!(err, GenerationError::NumberCollision(8)));
    }

    #[test]
    fn test_registration_numbers_are_sequential() {
        let issuer = NumberIssuer::new();
        let now = "2025-03-14T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(issuer.registration_number(now), "DHA-20250314-000001");
        assert_eq!(issuer.registration_number(now), "DHA-20250314-000002");
    }

    #[test]
    fn test_registration_sequence_widens_past_six_digits() {
        let issuer = NumberIssuer::new();
        issuer.sequence.store(999_999, Ordering::Relaxed);
        let now = "2025-03-14T10:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert_eq!(issuer.registration_number(now), "DHA-20250314-999999");
        assert_eq!(issuer.registration_number(now), "DHA-20250314-1000000");
    }
}
