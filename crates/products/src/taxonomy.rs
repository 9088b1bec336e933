//! Product taxonomies (categories and tags).

use serde::{Deserialize, Serialize};

use catalog_core::TermId;

/// The two product taxonomies the catalog exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Taxonomy {
    #[serde(rename = "product_cat")]
    Category,
    #[serde(rename = "product_tag")]
    Tag,
}

impl Taxonomy {
    /// Platform taxonomy key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Taxonomy::Category => "product_cat",
            Taxonomy::Tag => "product_tag",
        }
    }
}

/// A single taxonomy term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: TermId,
    pub taxonomy: Taxonomy,
    pub name: String,
    #[serde(default)]
    pub slug: String,
}

impl Term {
    /// Filter predicates compare by name, case-insensitively.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}
