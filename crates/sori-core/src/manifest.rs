//! Per-subject manifest — text → audio filename index read by the web app
//! from `audio/tts/<subject>/manifest.json`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Fixed manifest filename inside a subject's output directory.
pub const MANIFEST_FILENAME: &str = "manifest.json";

/// Text → filename mapping. Keys serialize in sorted order, which is the same
/// order the filenames were numbered in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(BTreeMap<String, String>);

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, text: impl Into<String>, filename: impl Into<String>) {
        self.0.insert(text.into(), filename.into());
    }

    pub fn get(&self, text: &str) -> Option<&str> {
        self.0.get(text).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Pretty JSON, two-space indent, Hangul written as-is.
    pub fn to_json(&self) -> String {
        // A string-to-string map always serializes.
        serde_json::to_string_pretty(&self.0).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl FromIterator<(String, String)> for Manifest {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filename::{assign_filenames, derive_filename};

    #[test]
    fn json_keeps_hangul_literal() {
        let mut m = Manifest::new();
        m.insert("하나", "0000_abcdef.mp3");
        let json = m.to_json();
        assert!(json.contains("\"하나\""));
        assert!(!json.contains("\\u"));
    }

    #[test]
    fn json_is_indented() {
        let mut m = Manifest::new();
        m.insert("둘", "0000_aaaaaa.mp3");
        m.insert("하나", "0001_bbbbbb.mp3");
        assert_eq!(
            m.to_json(),
            "{\n  \"둘\": \"0000_aaaaaa.mp3\",\n  \"하나\": \"0001_bbbbbb.mp3\"\n}"
        );
    }

    #[test]
    fn empty_manifest() {
        assert_eq!(Manifest::new().to_json(), "{}");
    }

    #[test]
    fn built_from_assignments_matches_text_set() {
        let texts = vec!["둘".to_string(), "하나".to_string()];
        let manifest: Manifest = assign_filenames(&texts).into_iter().collect();
        assert_eq!(manifest.len(), texts.len());
        for (i, text) in texts.iter().enumerate() {
            assert_eq!(manifest.get(text), Some(derive_filename(text, i).as_str()));
        }
    }

    #[test]
    fn reads_back() {
        let manifest = Manifest::from_json(r#"{"사과": "0000_123abc.mp3"}"#).unwrap();
        assert_eq!(manifest.get("사과"), Some("0000_123abc.mp3"));
        assert_eq!(manifest.iter().count(), 1);
    }
}
