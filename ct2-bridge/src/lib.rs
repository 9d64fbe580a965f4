//! Batch translation adapter for CTranslate2-style engines
//!
//! This crate is a thin, typed layer between callers and a neural machine
//! translation engine. It does not decode anything itself: it loads a model
//! through an [`Engine`], forwards batches of token sequences, checks that one
//! result comes back per input, and extracts the best hypothesis of each.
//!
//! # Overview
//!
//! 1. **Initialize** - [`Translator::new`] loads a model directory on a [`Device`]
//! 2. **Translate** - [`Translator::translate_batch`] returns the engine's raw [`TranslationResult`]s
//! 3. **Extract** - [`top_hypotheses`] keeps the top-ranked hypothesis of each result
//! 4. **Dispose** - [`Translator::dispose`] releases the model
//!
//! # Example
//!
//! ```ignore
//! use ct2_bridge::{Device, MockEngine, MockMode, Translator, top_hypotheses};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = MockEngine::new(MockMode::Echo);
//!     let translator = Translator::new(&engine, "models/sugoi", Device::Cpu)?;
//!
//!     let batch = vec![vec!["▁こんにちは".to_string()]];
//!     let results = translator.translate_batch(&batch)?;
//!     println!("{:?}", top_hypotheses(&results)?);
//!
//!     translator.dispose()?;
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod device;
pub mod engine;
pub mod error;
pub mod options;
pub mod result;
pub mod translator;

pub use cache::{ModelCache, ModelLifetime};
pub use device::{ComputeType, Device, ModelFormat};
pub use engine::{Engine, EngineStats, LoadedModel, MockEngine, MockMode};
#[cfg(feature = "python")]
pub use engine::PythonEngine;
pub use error::{BridgeError, BridgeResult};
pub use options::{BatchOptions, BatchType, TranslatorOptions};
pub use result::{Hypothesis, TranslationResult, into_top_hypotheses, top_hypotheses};
pub use translator::Translator;
