//! Reference-group configuration.
//!
//! The reference group is the fixed "in-group" of ZIP codes every other ZIP
//! is compared against. A built-in default ships with the binary; a JSON
//! file (a flat array of ZIP strings) can override it.

use crate::error::{Error, Result};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default reference ZIP codes: the university's enrollment footprint
/// across Riverside and San Bernardino counties.
pub const DEFAULT_REFERENCE_ZIPS: [&str; 50] = [
    "92503", "92504", "92508", "92506", "92880", "92571", "92336", "92509", "92882", "92399",
    "92881", "92505", "92223", "92557", "92553", "92555", "91709", "92879", "92584", "92883",
    "92507", "92374", "92562", "91752", "91710", "92335", "92570", "92407", "92324", "91739",
    "92592", "92376", "92563", "92346", "92373", "92860", "92530", "92337", "92551", "91761",
    "92404", "91737", "92532", "92544", "91762", "92308", "92545", "92392", "91701", "92583",
];

/// Validated, order-preserving set of reference ZIP codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceGroup {
    zips: Vec<String>,
}

impl ReferenceGroup {
    /// The built-in default group.
    pub fn default_group() -> Self {
        Self {
            zips: DEFAULT_REFERENCE_ZIPS
                .iter()
                .map(|z| z.to_string())
                .collect(),
        }
    }

    /// Build a group from arbitrary strings, validating each entry.
    ///
    /// Entries are trimmed and must be exactly five ASCII digits.
    /// Duplicates collapse, keeping first occurrence order.
    pub fn from_zips<I>(zips: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen: AHashSet<String> = AHashSet::new();
        let mut validated = Vec::new();
        for raw in zips {
            let zip = validate_zip(&raw)?;
            if seen.insert(zip.clone()) {
                validated.push(zip);
            }
        }
        if validated.is_empty() {
            return Err(Error::EmptyReferenceList);
        }
        Ok(Self { zips: validated })
    }

    /// Load a group from a JSON array of ZIP strings.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let zips: Vec<String> = serde_json::from_str(&text)?;
        Self::from_zips(zips)
    }

    pub fn zips(&self) -> &[String] {
        &self.zips
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.zips.clone()
    }

    pub fn len(&self) -> usize {
        self.zips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zips.is_empty()
    }
}

fn validate_zip(raw: &str) -> Result<String> {
    let zip = raw.trim();
    if zip.len() == 5 && zip.bytes().all(|b| b.is_ascii_digit()) {
        Ok(zip.to_string())
    } else {
        Err(Error::MalformedReferenceZip(raw.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_group_is_valid() {
        let group = ReferenceGroup::default_group();
        assert_eq!(group.len(), 50);
        // The default list round-trips through validation untouched.
        let revalidated = ReferenceGroup::from_zips(group.to_vec()).unwrap();
        assert_eq!(group, revalidated);
    }

    #[test]
    fn test_from_zips_trims_and_dedups() {
        let group = ReferenceGroup::from_zips(vec![
            " 92503 ".to_string(),
            "92504".to_string(),
            "92503".to_string(),
        ])
        .unwrap();
        assert_eq!(group.zips(), &["92503".to_string(), "92504".to_string()]);
    }

    #[test]
    fn test_malformed_zip_rejected() {
        for bad in ["9250", "925033", "92x03", ""] {
            let err = ReferenceGroup::from_zips(vec![bad.to_string()]).unwrap_err();
            assert!(matches!(err, Error::MalformedReferenceZip(_)), "{bad:?}");
        }
    }

    #[test]
    fn test_empty_list_rejected() {
        let err = ReferenceGroup::from_zips(Vec::new()).unwrap_err();
        assert!(matches!(err, Error::EmptyReferenceList));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["92503", "92504"]"#).unwrap();
        let group = ReferenceGroup::from_json_file(file.path()).unwrap();
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn test_from_json_file_rejects_non_array() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"zips": []}}"#).unwrap();
        assert!(ReferenceGroup::from_json_file(file.path()).is_err());
    }
}
