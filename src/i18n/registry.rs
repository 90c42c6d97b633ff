//! Language registry: the fixed dictionary of languages messages can be
//! translated into.
//!
//! The registry is a process-wide singleton built once with `OnceLock`. It
//! keeps languages in a stable order (used when translating into every
//! language) and an index by name for constant-time lookup.

use std::collections::HashMap;
use std::sync::OnceLock;

/// A language the relay can translate into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageConfig {
    /// ISO 639-1 language code (e.g., "fr", "de")
    pub code: &'static str,

    /// English name of the language, as sent by clients (e.g., "French")
    pub name: &'static str,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
    by_name: HashMap<&'static str, usize>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry::new(default_languages()))
    }

    fn new(languages: Vec<LanguageConfig>) -> Self {
        let by_name = languages
            .iter()
            .enumerate()
            .map(|(i, lang)| (lang.name, i))
            .collect();

        Self { languages, by_name }
    }

    /// Look up a language by its English name. Case-sensitive.
    ///
    /// # Returns
    /// * `Some(&LanguageConfig)` if the name is in the dictionary
    /// * `None` otherwise
    pub fn get_by_name(&self, name: &str) -> Option<&LanguageConfig> {
        self.by_name.get(name).map(|&i| &self.languages[i])
    }

    /// Look up the ISO code for a language name.
    pub fn iso_code(&self, name: &str) -> Option<&'static str> {
        self.get_by_name(name).map(|lang| lang.code)
    }

    /// All languages, in dictionary order.
    pub fn list_all(&self) -> &[LanguageConfig] {
        &self.languages
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

fn default_languages() -> Vec<LanguageConfig> {
    [
        ("en", "English"),
        ("fr", "French"),
        ("de", "German"),
        ("es", "Spanish"),
        ("it", "Italian"),
        ("pt", "Portuguese"),
        ("nl", "Dutch"),
        ("ru", "Russian"),
        ("ja", "Japanese"),
        ("zh", "Chinese"),
    ]
    .into_iter()
    .map(|(code, name)| LanguageConfig { code, name })
    .collect()
}
