//! The "recent documents" list: most-recent-first, capped, oldest evicted.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::generation::GenerationResult;

pub const MAX_RECENT_DOCUMENTS: usize = 10;

/// Summary of a generated document. The PDF itself is not kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentDocument {
    pub document_number: String,
    pub registration_number: String,
    pub document_type: String,
    pub full_name: String,
    pub filename: String,
    pub verification_url: String,
    pub generated_at: DateTime<Utc>,
}

impl RecentDocument {
    pub fn from_result(result: &GenerationResult, full_name: &str) -> Self {
        Self {
            document_number: result.document_number.clone(),
            registration_number: result.registration_number.clone(),
            document_type: result.document_type.clone(),
            full_name: full_name.to_string(),
            filename: result.filename.clone(),
            verification_url: result.verification_url.clone(),
            generated_at: result.generated_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentDocuments {
    entries: VecDeque<RecentDocument>,
}

impl RecentDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert at the front. An entry with the same document number is
    /// replaced rather than duplicated. Returns the evicted entry, if any.
    pub fn push(&mut self, entry: RecentDocument) -> Option<RecentDocument> {
        self.entries
            .retain(|e| e.document_number != entry.document_number);
        self.entries.push_front(entry);
        if self.entries.len() > MAX_RECENT_DOCUMENTS {
            self.entries.pop_back()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecentDocument> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<RecentDocument> {
        self.entries.iter().cloned().collect()
    }

    /// Enforce the cap on lists loaded from storage written by older clients.
    pub fn truncate(&mut self) {
        self.entries.truncate(MAX_RECENT_DOCUMENTS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(n: usize) -> RecentDocument {
        RecentDocument {
            document_number: format!("ID25{:08}", n),
            registration_number: format!("DHA-20250101-{:06}", n),
            document_type: "smart_id_card".to_string(),
            full_name: "Jane Doe".to_string(),
            filename: format!("smart-id-card-{}.pdf", n),
            verification_url: format!("http://localhost/verify/{}", n),
            generated_at: Utc::now(),
        }
    }

    #[test]
    fn test_eleventh_entry_evicts_oldest() {
        let mut recent = RecentDocuments::new();
        for n in 0..10 {
            assert!(recent.push(entry(n)).is_none());
        }
        assert_eq!(recent.len(), 10);

        let evicted = recent.push(entry(10)).unwrap();
        assert_eq!(evicted.document_number, entry(0).document_number);
        assert_eq!(recent.len(), 10);
        assert_eq!(
            recent.iter().next().unwrap().document_number,
            entry(10).document_number
        );
    }

    #[test]
    fn test_same_document_is_moved_to_front() {
        let mut recent = RecentDocuments::new();
        recent.push(entry(1));
        recent.push(entry(2));
        recent.push(entry(1));
        let numbers: Vec<_> = recent.iter().map(|e| e.document_number.clone()).collect();
        assert_eq!(numbers, vec![entry(1).document_number, entry(2).document_number]);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let mut recent = RecentDocuments::new();
        recent.push(entry(1));
        let json = serde_json::to_value(&recent).unwrap();
        assert!(json.is_array());
        assert_eq!(json[0]["documentNumber"], entry(1).document_number);
    }
}
