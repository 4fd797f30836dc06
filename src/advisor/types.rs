use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a note sits in the fragrance pyramid, or `Single` for a
/// single-note product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotePosition {
    Top,
    Middle,
    Base,
    Single,
}

impl fmt::Display for NotePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NotePosition::Top => "top",
            NotePosition::Middle => "middle",
            NotePosition::Base => "base",
            NotePosition::Single => "single",
        })
    }
}

pub type Notes = BTreeMap<NotePosition, String>;

/// One validated recommendation. Unknown keys in the LLM output are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationItem {
    pub name: String,
    /// Fragrance family, e.g. "Woody".
    pub line: String,
    /// Concentration (Eau de Parfum, Eau de Toilette…). Absent for most diffusers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    pub brand: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Notes>,
    pub reason: String,
    pub situation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub recommendations: Vec<RecommendationItem>,
    /// Overall feel of the set, when the model supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}
