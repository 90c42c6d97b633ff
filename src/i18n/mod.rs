//! Language dictionary used to validate and route translation requests.
//!
//! - `registry`: the fixed, ordered mapping from language names to ISO 639-1 codes
//! - `language`: `TranslationTarget`, a request's language choice resolved
//!   against the registry (a single language or `"ALL"`)
//!
//! # Example
//!
//! ```rust,ignore
//! use message_relay::i18n::{LanguageRegistry, TranslationTarget};
//!
//! let french = LanguageRegistry::get().iso_code("French"); // Some("fr")
//! let every = TranslationTarget::from_name("ALL")?;
//! ```

mod language;
mod registry;

pub use language::{TranslationTarget, ALL_LANGUAGES};
pub use registry::{LanguageConfig, LanguageRegistry};
