//! Translator handle
//!
//! [`Translator`] is the adapter between callers and an [`Engine`]: it is
//! created for one model on one device, forwards batches to the engine and
//! hands back the raw [`TranslationResult`]s. Pair it with
//! [`top_hypotheses`](crate::result::top_hypotheses) to keep only the best
//! output of each input.
//!
//! # Example
//!
//! ```ignore
//! use ct2_bridge::{Device, PythonEngine, Translator, top_hypotheses};
//!
//! let engine = PythonEngine::new();
//! let translator = Translator::new(&engine, "models/jparacrawl/ja-en", Device::Cpu)?;
//! let results = translator.translate_batch(&tokens)?;
//! let best = top_hypotheses(&results)?;
//! translator.dispose()?;
//! ```

use crate::device::Device;
use crate::engine::{Engine, LoadedModel};
use crate::error::{BridgeError, BridgeResult};
use crate::options::{BatchOptions, TranslatorOptions};
use crate::result::{TranslationResult, into_top_hypotheses};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// A model loaded in an engine, ready to translate batches
pub struct Translator {
    model: Box<dyn LoadedModel>,
    model_path: PathBuf,
    options: TranslatorOptions,
    engine_name: String,
}

impl Translator {
    /// Load `model_path` on `device` with default options
    pub fn new(
        engine: &dyn Engine,
        model_path: impl AsRef<Path>,
        device: Device,
    ) -> BridgeResult<Self> {
        Self::with_options(engine, model_path, TranslatorOptions::for_device(device))
    }

    /// Load `model_path` with explicit translator options
    pub fn with_options(
        engine: &dyn Engine,
        model_path: impl AsRef<Path>,
        options: TranslatorOptions,
    ) -> BridgeResult<Self> {
        let model_path = model_path.as_ref().to_path_buf();
        let model = engine.load(&model_path, &options)?;
        info!(
            "{} loaded {} on {}",
            engine.name(),
            model_path.display(),
            options.device
        );
        Ok(Self {
            model,
            model_path,
            options,
            engine_name: engine.name().to_string(),
        })
    }

    /// Translate a batch with default decoding options
    pub fn translate_batch(&self, source: &[Vec<String>]) -> BridgeResult<Vec<TranslationResult>> {
        self.translate_batch_with(source, &BatchOptions::default())
    }

    /// Translate a batch, returning the engine's results unmodified
    ///
    /// The engine must return exactly one result per input sequence;
    /// anything else is reported as [`BridgeError::BatchSizeMismatch`].
    pub fn translate_batch_with(
        &self,
        source: &[Vec<String>],
        options: &BatchOptions,
    ) -> BridgeResult<Vec<TranslationResult>> {
        if source.is_empty() {
            return Ok(Vec::new());
        }
        options.validate(source.len())?;

        let started = Instant::now();
        let results = self.model.translate_batch(source, options)?;
        if results.len() != source.len() {
            return Err(BridgeError::BatchSizeMismatch {
                expected: source.len(),
                actual: results.len(),
            });
        }
        debug!(
            "Translated batch of {} with {} in {:?}",
            source.len(),
            self.model_path.display(),
            started.elapsed()
        );
        Ok(results)
    }

    /// Translate a batch and keep only the best hypothesis of each input
    pub fn translate_tokens(
        &self,
        source: &[Vec<String>],
        options: &BatchOptions,
    ) -> BridgeResult<Vec<Vec<String>>> {
        let results = self.translate_batch_with(source, options)?;
        into_top_hypotheses(results)
    }

    /// Release the model
    ///
    /// Consumes the handle, so it cannot be used afterwards. Dropping a
    /// translator without calling this also releases the model, but
    /// ignores any error the engine reports while doing so.
    pub fn dispose(self) -> BridgeResult<()> {
        debug!("Disposing translator for {}", self.model_path.display());
        self.model.unload()
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn device(&self) -> Device {
        self.options.device
    }

    pub fn options(&self) -> &TranslatorOptions {
        &self.options
    }
}

impl fmt::Debug for Translator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translator")
            .field("engine", &self.engine_name)
            .field("model_path", &self.model_path)
            .field("device", &self.options.device)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MockEngine, MockMode};
    use crate::result::top_hypotheses;

    fn tokens(s: &str) -> Vec<String> {
        s.split_whitespace().map(String::from).collect()
    }

    // ========== Initialize ==========

    #[test]
    fn test_new_loads_model() {
        let engine = MockEngine::new(MockMode::Echo);
        let translator = Translator::new(&engine, "models/ja-en", Device::Cuda).unwrap();
        assert_eq!(engine.stats().loads(), 1);
        assert_eq!(translator.model_path(), Path::new("models/ja-en"));
        assert_eq!(translator.device(), Device::Cuda);
    }

    #[test]
    fn test_new_propagates_engine_error() {
        let engine = MockEngine::new(MockMode::Echo).with_missing_model("models/none");
        match Translator::new(&engine, "models/none", Device::Cpu) {
            Err(BridgeError::ModelLoad { path, .. }) => {
                assert_eq!(path, PathBuf::from("models/none"))
            }
            other => panic!("Expected ModelLoad, got {:?}", other),
        }
    }

    // ========== Translate ==========

    #[test]
    fn test_batch_size_is_preserved() {
        let engine = MockEngine::new(MockMode::Echo);
        let translator = Translator::new(&engine, "m", Device::Cpu).unwrap();
        let source = vec![tokens("a"), tokens("b c"), tokens("d e f")];
        let results = translator.translate_batch(&source).unwrap();
        assert_eq!(results.len(), source.len());
    }

    #[test]
    fn test_results_are_returned_unmodified() {
        let engine = MockEngine::new(MockMode::Echo);
        let translator = Translator::new(&engine, "m", Device::Cpu).unwrap();
        let options = BatchOptions {
            beam_size: 3,
            num_hypotheses: 2,
            ..BatchOptions::default()
        };
        let results = translator
            .translate_batch_with(&[tokens("x y")], &options)
            .unwrap();
        assert_eq!(results[0].hypotheses.len(), 2);
        assert_eq!(results[0].hypotheses[1].tokens, tokens("x y <alt1>"));
    }

    #[test]
    fn test_empty_batch_skips_engine() {
        let engine = MockEngine::new(MockMode::Echo);
        let translator = Translator::new(&engine, "m", Device::Cpu).unwrap();
        let results = translator.translate_batch(&[]).unwrap();
        assert!(results.is_empty());
        assert_eq!(engine.stats().batches(), 0);
    }

    #[test]
    fn test_short_batch_is_detected() {
        let engine = MockEngine::new(MockMode::ShortBatch);
        let translator = Translator::new(&engine, "m", Device::Cpu).unwrap();
        let result = translator.translate_batch(&[tokens("a"), tokens("b")]);
        assert_eq!(
            result,
            Err(BridgeError::BatchSizeMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_engine_error_propagates() {
        let engine = MockEngine::new(MockMode::Error("device lost".to_string()));
        let translator = Translator::new(&engine, "m", Device::Cpu).unwrap();
        let result = translator.translate_batch(&[tokens("a")]);
        assert_eq!(result, Err(BridgeError::Engine("device lost".to_string())));
    }

    #[test]
    fn test_invalid_options_rejected_before_engine() {
        let engine = MockEngine::new(MockMode::Echo);
        let translator = Translator::new(&engine, "m", Device::Cpu).unwrap();
        let options = BatchOptions::default().with_target_prefix(vec![]);
        let result = translator.translate_batch_with(&[tokens("a")], &options);
        assert!(matches!(result, Err(BridgeError::InvalidOption(_))));
        assert_eq!(engine.stats().batches(), 0);
    }

    // ========== Extract ==========

    #[test]
    fn test_extract_is_order_preserving() {
        let engine = MockEngine::new(MockMode::Reverse);
        let translator = Translator::new(&engine, "m", Device::Cpu).unwrap();
        let source = vec![tokens("1 2"), tokens("3 4"), tokens("5 6")];
        let results = translator.translate_batch(&source).unwrap();
        let best = top_hypotheses(&results).unwrap();
        assert_eq!(best, vec![tokens("2 1"), tokens("4 3"), tokens("6 5")]);
    }

    #[test]
    fn test_translate_tokens_reports_missing_hypothesis() {
        let engine = MockEngine::new(MockMode::NoHypotheses);
        let translator = Translator::new(&engine, "m", Device::Cpu).unwrap();
        let result = translator.translate_tokens(&[tokens("a")], &BatchOptions::default());
        assert_eq!(result, Err(BridgeError::MissingHypothesis { index: 0 }));
    }

    // ========== Dispose ==========

    #[test]
    fn test_dispose_releases_model() {
        let engine = MockEngine::new(MockMode::Echo);
        let stats = engine.stats();
        let translator = Translator::new(&engine, "m", Device::Cpu).unwrap();
        assert_eq!(stats.live(), 1);
        translator.dispose().unwrap();
        assert_eq!(stats.live(), 0);
    }

    #[test]
    fn test_drop_releases_model() {
        let engine = MockEngine::new(MockMode::Echo);
        let stats = engine.stats();
        {
            let _translator = Translator::new(&engine, "m", Device::Cpu).unwrap();
            assert_eq!(stats.live(), 1);
        }
        assert_eq!(stats.released(), 1);
    }

    #[test]
    fn test_debug_output() {
        let engine = MockEngine::new(MockMode::Echo);
        let translator = Translator::new(&engine, "models/x", Device::Cpu).unwrap();
        let debug_str = format!("{:?}", translator);
        assert!(debug_str.contains("Mock Engine"));
        assert!(debug_str.contains("models/x"));
    }
}
