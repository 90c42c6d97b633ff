//! Translation target: a validated language choice from a request.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};

/// Sentinel requesting a translation into every registered language.
pub const ALL_LANGUAGES: &str = "ALL";

/// Where a message should be translated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationTarget {
    /// A single dictionary language.
    Single(&'static LanguageConfig),
    /// Every dictionary language, in dictionary order.
    All,
}

impl TranslationTarget {
    /// Resolve a language name from a request.
    ///
    /// `"ALL"` (case-sensitive) selects every language; any other value must
    /// be a registered language name.
    pub fn from_name(name: &str) -> Result<Self> {
        if name == ALL_LANGUAGES {
            return Ok(TranslationTarget::All);
        }

        match LanguageRegistry::get().get_by_name(name) {
            Some(config) => Ok(TranslationTarget::Single(config)),
            None => bail!("Unsupported language: '{}'", name),
        }
    }

    /// The languages this target expands to, in dictionary order.
    pub fn languages(&self) -> Vec<&'static LanguageConfig> {
        match self {
            TranslationTarget::Single(config) => vec![*config],
            TranslationTarget::All => LanguageRegistry::get().list_all().iter().collect(),
        }
    }
}
