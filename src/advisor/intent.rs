use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::catalog::ProductKind;
use super::error::AdvisorError;

/// Category of conversational request. Selects the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Chat,
    Recommendation,
    DiffuserRecommendation,
}

impl Intent {
    pub const ALL: [Intent; 3] = [Intent::Chat, Intent::Recommendation, Intent::DiffuserRecommendation];

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Chat => "chat",
            Intent::Recommendation => "recommendation",
            Intent::DiffuserRecommendation => "diffuser_recommendation",
        }
    }

    /// Exact number of items a structured response must carry.
    /// `None` for chat, whose output is prose.
    pub fn expected_items(self) -> Option<usize> {
        match self {
            Intent::Chat => None,
            Intent::Recommendation => Some(3),
            Intent::DiffuserRecommendation => Some(2),
        }
    }

    /// Catalog slice rendered into `{perfumes_text}`.
    pub fn product_kind(self) -> Option<ProductKind> {
        match self {
            Intent::Chat => None,
            Intent::Recommendation => Some(ProductKind::Perfume),
            Intent::DiffuserRecommendation => Some(ProductKind::Diffuser),
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Intent::ALL
            .into_iter()
            .find(|i| i.as_str() == s.trim())
            .ok_or_else(|| AdvisorError::UnknownIntent(s.to_string()))
    }
}
