//! Subject record model — the lesson data one learner's pages are built from.
//!
//! Only the fields that carry spoken Korean text are modelled. Everything else
//! in a record (English glosses, emoji, quiz answers) is ignored on parse.

use serde::Deserialize;

/// One subject's lesson data, as stored in `<data_dir>/<subject>.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRecord {
    #[serde(default)]
    pub review: Vec<TextItem>,
    #[serde(default)]
    pub numbers: Vec<TextItem>,
    #[serde(default)]
    pub verbs: Vec<VerbItem>,
    #[serde(default)]
    pub nouns: Vec<TextItem>,
    #[serde(default)]
    pub sentences: Vec<SentenceItem>,
    #[serde(default)]
    pub picture_quiz: Vec<PictureQuizItem>,
}

/// An item whose only spoken field is its primary text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextItem {
    #[serde(default)]
    pub kr: Option<String>,
}

/// A verb: dictionary form plus polite (-요) form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerbItem {
    #[serde(default)]
    pub kr: Option<String>,
    #[serde(default)]
    pub polite: Option<String>,
}

/// A full sentence and the word blocks a sentence puzzle splits it into.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SentenceItem {
    #[serde(default)]
    pub kr: Option<String>,
    #[serde(default)]
    pub blocks: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PictureQuizItem {
    #[serde(default)]
    pub sentence: Option<TextItem>,
}

impl SubjectRecord {
    /// Parse a record from its JSON document.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
