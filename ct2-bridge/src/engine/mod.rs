//! Engine abstraction
//!
//! An [`Engine`] knows how to turn a converted model directory into a
//! [`LoadedModel`]; the loaded model performs batch translation. Model
//! loading, batching, decoding and device placement all happen inside the
//! engine; this crate only forwards calls and checks the shape of what comes
//! back.
//!
//! Available engines:
//!
//! - [`MockEngine`]: deterministic, in-process, used by tests and `--mock`
//! - [`PythonEngine`]: the `ctranslate2` Python package through PyO3
//!   (requires the `python` feature)

use crate::error::BridgeResult;
use crate::options::{BatchOptions, TranslatorOptions};
use crate::result::TranslationResult;
use std::path::Path;

pub mod mock;
#[cfg(feature = "python")]
pub mod python;

pub use mock::{EngineStats, MockEngine, MockMode};
#[cfg(feature = "python")]
pub use python::PythonEngine;

/// A translation backend able to load models
pub trait Engine: Send + Sync {
    /// Load the model stored in `model_path`
    ///
    /// Errors raised by the backend (missing files, unsupported device,
    /// out of memory) are returned as-is.
    fn load(
        &self,
        model_path: &Path,
        options: &TranslatorOptions,
    ) -> BridgeResult<Box<dyn LoadedModel>>;

    /// Name used in logs
    fn name(&self) -> &str;
}

/// A model resident in the engine
pub trait LoadedModel: Send + Sync {
    /// Translate a batch of token sequences
    ///
    /// Implementations should return one result per input, in input order.
    fn translate_batch(
        &self,
        source: &[Vec<String>],
        options: &BatchOptions,
    ) -> BridgeResult<Vec<TranslationResult>>;

    /// Release engine resources held by the model
    fn unload(self: Box<Self>) -> BridgeResult<()> {
        Ok(())
    }
}
