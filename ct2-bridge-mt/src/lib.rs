//! Offline machine translation on top of `ct2-bridge`
//!
//! This crate turns the token-level [`ct2_bridge::Translator`] into a text
//! translator for converted CTranslate2 models: JParaCrawl, Sugoi, M2M100 and
//! NLLB. It handles tokenization, language tokens, source language detection,
//! model caching and fetching model files from the Hugging Face hub.
//!
//! # Workflow Example
//!
//! ```ignore
//! use ct2_bridge_mt::{
//!     EngineKind, Language, ModelDownloader, ModelRegistry, OfflineTranslator, family_from_name,
//! };
//! use ct2_bridge::{Device, ModelFormat};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Pick a model family and find its files
//!     let family = family_from_name("m2m100-418m")?;
//!     let registry = ModelRegistry::builtin();
//!     let entry = registry.entry_for(family.as_ref(), Device::Cpu, ModelFormat::Compact)?;
//!
//!     // 2. Download whatever is missing
//!     let model_dir = ModelDownloader::new("models").ensure(entry).await?;
//!
//!     // 3. Translate
//!     let translator = OfflineTranslator::builder(family, EngineKind::Python.build()?, model_dir)
//!         .build();
//!     let output = translator.translate("Hello world", Some(Language::English), Language::French)?;
//!
//!     println!("Result: {}", output.text);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod detector;
pub mod download;
pub mod engine;
pub mod error;
pub mod families;
pub mod language;
pub mod logging;
pub mod pipeline;
pub mod registry;
pub mod tokenizer;
pub mod translator;


// Re-export main types for convenient access
pub use config::{Config, get_config_path};
pub use detector::{LanguageDetector, default_detector};
pub use download::{DEFAULT_ENDPOINT, ModelDownloader};
pub use engine::EngineKind;
pub use error::{MtError, MtResult};
pub use families::{
    JParaCrawl, JParaCrawlSize, LanguagePair, M2M100, M2M100Size, ModelFamily, Nllb, NllbSize,
    Sugoi, all_families, family_from_name,
};
pub use language::Language;
pub use logging::init_logging;
pub use pipeline::{
    OfflineTranslator, OfflineTranslatorBuilder, TranslationOutput, TranslationVecOutput,
};
pub use registry::{ModelEntry, ModelRegistry};
pub use tokenizer::{
    Tokenizer, TokenizerLoader, WhitespaceTokenizer, default_loader, whitespace_loader,
};
#[cfg(feature = "sentencepiece")]
pub use tokenizer::SentencePieceTokenizer;
pub use translator::{MachineTranslator, normalize_locale, validate_locale};
