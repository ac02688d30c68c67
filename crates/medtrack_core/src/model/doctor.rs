//! Doctor model.
//!
//! # Invariants
//! - Two doctors are the same registry entry when their match keys are equal.
//! - Doctors are never deleted as a side effect of appointment changes.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Stable identifier of a doctor record.
pub type DoctorId = Uuid;

/// A doctor and the practice they work at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub name: String,
    pub practice_name: String,
}

impl Doctor {
    pub fn new(name: impl Into<String>, practice_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            practice_name: practice_name.into(),
        }
    }

    /// Registry lookup key for this doctor/practice pair.
    pub fn match_key(&self) -> String {
        doctor_match_key(&self.name, &self.practice_name)
    }
}

/// Builds the lookup key for a doctor/practice label pair.
///
/// Labels are trimmed, inner whitespace is collapsed and case is folded, so
/// `"Dr.  Smith"` and `"dr. smith"` resolve to the same doctor.
pub fn doctor_match_key(name: &str, practice_name: &str) -> String {
    format!(
        "{}\u{1f}{}",
        normalize_label(name),
        normalize_label(practice_name)
    )
}

fn normalize_label(value: &str) -> String {
    WHITESPACE_RE
        .replace_all(value.trim(), " ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{doctor_match_key, Doctor};

    #[test]
    fn match_key_ignores_case_and_spacing() {
        assert_eq!(
            doctor_match_key("  Dr.  Smith ", "Sample\tClinic"),
            doctor_match_key("dr. smith", "SAMPLE CLINIC")
        );
    }

    #[test]
    fn match_key_keeps_name_and_practice_apart() {
        assert_ne!(doctor_match_key("a b", "c"), doctor_match_key("a", "b c"));
    }

    #[test]
    fn new_doctor_has_fresh_id() {
        let doctor = Doctor::new("Dr. Smith", "Sample Clinic");
        assert!(!doctor.id.is_nil());
        assert_eq!(doctor.match_key(), doctor_match_key("Dr. Smith", "Sample Clinic"));
    }
}
