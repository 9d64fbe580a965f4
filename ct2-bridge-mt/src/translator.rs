//! Machine Translation trait and utilities
//!
//! This module defines the `MachineTranslator` trait for provider abstraction,
//! so callers can swap the offline CTranslate2 pipeline for a mock (or any
//! other backend) without changing their code.
//!
//! # Example
//!
//! ```ignore
//! use ct2_bridge_mt::{MachineTranslator, OfflineTranslator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider: OfflineTranslator = build_translator()?;
//!
//!     // Translate a single string
//!     let result = provider.translate("こんにちは", "ja", "en").await?;
//!     println!("{}", result);
//!
//!     // Translate multiple strings in a batch
//!     let texts = vec!["おはよう".to_string(), "さようなら".to_string()];
//!     let results = provider.translate_batch(&texts, "ja", "en").await?;
//!     println!("{:?}", results);
//!
//!     Ok(())
//! }
//! ```

use crate::error::{MtError, MtResult};
use async_trait::async_trait;

/// Generic trait for machine translation providers
///
/// All methods are async; implementations backed by a local engine move the
/// blocking work off the async runtime.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text string from source to target locale
    ///
    /// # Arguments
    ///
    /// * `text` - The text to translate
    /// * `source_locale` - Source language code (e.g., "ja", "en-US")
    /// * `target_locale` - Target language code (e.g., "en", "fr-FR")
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String>;

    /// Translate multiple strings in a single batch operation
    ///
    /// # Guarantees
    ///
    /// - Output order matches input order
    /// - Output length equals input length
    /// - Each translation is independent
    async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<Vec<String>>;

    /// Get the name of this translation provider
    ///
    /// Used for logging to identify which provider handled a translation.
    fn provider_name(&self) -> &str;
}

/// Normalize a locale code by stripping region information
///
/// - `en-US` → `en`
/// - `zh-Hans` → `zh`
/// - `ja_JP` → `ja`
pub fn normalize_locale(locale: &str) -> String {
    locale
        .split(['-', '_'])
        .next()
        .unwrap_or(locale)
        .to_lowercase()
}

/// Validate that a locale code is in acceptable format
///
/// Accepts ASCII alphanumerics, hyphens and underscores.
/// An empty code means "detect" to some providers and is rejected here;
/// callers wanting auto-detection pass `None` instead.
pub fn validate_locale(locale: &str) -> MtResult<()> {
    if locale.is_empty() {
        return Err(MtError::InvalidLocale("Locale code is empty".to_string()));
    }

    if !locale
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(MtError::InvalidLocale(format!(
            "Invalid characters in locale code: {}",
            locale
        )));
    }

    Ok(())
}
