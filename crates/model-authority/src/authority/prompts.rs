use serde::{Deserialize, Serialize};
use tracing::warn;

use super::history::RepositoryError;

/// Canonical probe prompts. Sampling every brand with the same ordered set
/// keeps share-of-model figures comparable across brands and over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptSet {
    prompts: &'static [&'static str],
}

const DEFAULT_PROMPTS: [&str; 5] = [
    "Best AI SEO tools",
    "Top platforms for generative optimization",
    "Most recommended AI visibility tools",
    "Leading AI authority analytics software",
    "Best tools for LLM visibility tracking",
];

impl PromptSet {
    pub const fn default_set() -> Self {
        Self {
            prompts: &DEFAULT_PROMPTS,
        }
    }

    pub fn prompts(&self) -> &'static [&'static str] {
        self.prompts
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::default_set()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    Informational,
    Comparative,
    Transactional,
}

/// Niche-specific prompt kept in the prompt library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptTemplate {
    pub id: String,
    pub niche: String,
    pub subcategory: String,
    pub kind: PromptKind,
    pub strategic_weight: f64,
    pub text: String,
}

impl PromptTemplate {
    pub fn fallback(niche: &str) -> Self {
        Self {
            id: "fallback-1".to_string(),
            niche: niche.to_string(),
            subcategory: "general".to_string(),
            kind: PromptKind::Informational,
            strategic_weight: 0.5,
            text: format!("What are the best brands in the {niche} sector?"),
        }
    }
}

pub trait PromptLibrary: Send + Sync {
    fn by_niche(&self, niche: &str) -> Result<Vec<PromptTemplate>, RepositoryError>;
}

/// Library templates for `niche`, heaviest strategic weight first.
///
/// An unavailable library degrades to a single generic prompt so sampling can
/// still run.
pub fn prompts_for_niche<L: PromptLibrary + ?Sized>(library: &L, niche: &str) -> Vec<PromptTemplate> {
    match library.by_niche(niche) {
        Ok(mut templates) => {
            templates.sort_by(|a, b| {
                b.strategic_weight
                    .partial_cmp(&a.strategic_weight)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            templates
        }
        Err(err) => {
            warn!(%niche, error = %err, "prompt library unavailable, using fallback prompt");
            vec![PromptTemplate::fallback(niche)]
        }
    }
}

/// Library backed by a fixed list of templates.
#[derive(Debug, Clone, Default)]
pub struct StaticPromptLibrary {
    templates: Vec<PromptTemplate>,
}

impl StaticPromptLibrary {
    pub fn new(templates: Vec<PromptTemplate>) -> Self {
        Self { templates }
    }
}

impl PromptLibrary for StaticPromptLibrary {
    fn by_niche(&self, niche: &str) -> Result<Vec<PromptTemplate>, RepositoryError> {
        Ok(self
            .templates
            .iter()
            .filter(|template| template.niche.eq_ignore_ascii_case(niche))
            .cloned()
            .collect())
    }
}
