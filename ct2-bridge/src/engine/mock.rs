//! Mock engine for testing
//!
//! A deterministic, model-free engine for exercising the adapter and the
//! pipelines built on it without CTranslate2 installed.
//!
//! # Example
//!
//! ```ignore
//! use ct2_bridge::{Device, MockEngine, MockMode, Translator};
//!
//! let engine = MockEngine::new(MockMode::Reverse);
//! let translator = Translator::new(&engine, "models/any", Device::Cpu)?;
//! let results = translator.translate_batch(&[vec!["a".into(), "b".into()]])?;
//! assert_eq!(results[0].hypotheses[0].tokens, vec!["b", "a"]);
//! ```

use crate::engine::{Engine, LoadedModel};
use crate::error::{BridgeError, BridgeResult};
use crate::options::{BatchOptions, TranslatorOptions};
use crate::result::{Hypothesis, TranslationResult};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

/// Behaviours the mock engine can simulate
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Output tokens equal the input tokens
    Echo,

    /// Output tokens are the input tokens in reverse order
    /// (stands in for word-order-changing language pairs)
    Reverse,

    /// Predefined source -> target token mappings, echo otherwise
    Mappings(HashMap<Vec<String>, Vec<String>>),

    /// Every batch fails with the given message
    Error(String),

    /// Drop the last result of every non-empty batch
    ShortBatch,

    /// Return results without any hypothesis
    NoHypotheses,
}

/// Counters shared between a mock engine and the models it loaded
#[derive(Debug, Default)]
pub struct EngineStats {
    loads: AtomicUsize,
    batches: AtomicUsize,
    released: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl EngineStats {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn batches(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Models loaded and not yet released
    pub fn live(&self) -> usize {
        self.loads().saturating_sub(self.released())
    }

    /// Most batches ever running at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

/// Engine that simulates translation without a model
#[derive(Debug, Clone)]
pub struct MockEngine {
    mode: MockMode,
    /// Model paths that fail to load
    missing: Vec<String>,
    unload_error: Option<String>,
    latency: Option<Duration>,
    stats: Arc<EngineStats>,
}

impl MockEngine {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            missing: Vec::new(),
            unload_error: None,
            latency: None,
            stats: Arc::new(EngineStats::default()),
        }
    }

    /// Make loading `path` fail like a missing model directory would
    pub fn with_missing_model(mut self, path: impl Into<String>) -> Self {
        self.missing.push(path.into());
        self
    }

    /// Make every unload report `message`; the model is released anyway
    pub fn with_failing_unload(mut self, message: impl Into<String>) -> Self {
        self.unload_error = Some(message.into());
        self
    }

    /// Sleep this long in every batch
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn stats(&self) -> Arc<EngineStats> {
        Arc::clone(&self.stats)
    }
}

impl Engine for MockEngine {
    fn load(
        &self,
        model_path: &Path,
        _options: &TranslatorOptions,
    ) -> BridgeResult<Box<dyn LoadedModel>> {
        let path = model_path.to_string_lossy();
        if self.missing.iter().any(|m| m.as_str() == path) {
            return Err(BridgeError::ModelLoad {
                path: model_path.to_path_buf(),
                message: "model directory not found".to_string(),
            });
        }

        self.stats.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockModel {
            mode: self.mode.clone(),
            unload_error: self.unload_error.clone(),
            latency: self.latency,
            stats: Arc::clone(&self.stats),
        }))
    }

    fn name(&self) -> &str {
        "Mock Engine"
    }
}

struct MockModel {
    mode: MockMode,
    unload_error: Option<String>,
    latency: Option<Duration>,
    stats: Arc<EngineStats>,
}

impl MockModel {
    fn best_tokens(&self, source: &[String]) -> Vec<String> {
        match &self.mode {
            MockMode::Reverse => source.iter().rev().cloned().collect(),
            MockMode::Mappings(map) => map.get(source).cloned().unwrap_or_else(|| source.to_vec()),
            _ => source.to_vec(),
        }
    }

    fn translate_one(
        &self,
        source: &[String],
        prefix: Option<&Vec<String>>,
        n: usize,
    ) -> TranslationResult {
        let best = self.best_tokens(source);
        let hypotheses = (0..n)
            .map(|rank| {
                let mut tokens = prefix.cloned().unwrap_or_default();
                tokens.extend(best.iter().cloned());
                if rank > 0 {
                    tokens.push(format!("<alt{}>", rank));
                }
                Hypothesis::with_score(tokens, -(rank as f32) - 0.5)
            })
            .collect();
        TranslationResult::new(hypotheses)
    }

    fn run_batch(
        &self,
        source: &[Vec<String>],
        options: &BatchOptions,
    ) -> BridgeResult<Vec<TranslationResult>> {
        match &self.mode {
            MockMode::Error(msg) => return Err(BridgeError::Engine(msg.clone())),
            MockMode::NoHypotheses => {
                return Ok(vec![TranslationResult::default(); source.len()]);
            }
            _ => {}
        }

        let prefixes = options.target_prefix.as_ref();
        let mut results: Vec<TranslationResult> = source
            .iter()
            .enumerate()
            .map(|(i, tokens)| {
                let prefix = prefixes.and_then(|p| p.get(i));
                self.translate_one(tokens, prefix, options.num_hypotheses)
            })
            .collect();

        if matches!(self.mode, MockMode::ShortBatch) {
            results.pop();
        }
        Ok(results)
    }
}

impl LoadedModel for MockModel {
    fn translate_batch(
        &self,
        source: &[Vec<String>],
        options: &BatchOptions,
    ) -> BridgeResult<Vec<TranslationResult>> {
        self.stats.batches.fetch_add(1, Ordering::SeqCst);
        let running = self.stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats
            .peak_in_flight
            .fetch_max(running, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            thread::sleep(latency);
        }
        let results = self.run_batch(source, options);

        self.stats.in_flight.fetch_sub(1, Ordering::SeqCst);
        results
    }

    fn unload(self: Box<Self>) -> BridgeResult<()> {
        match &self.unload_error {
            Some(message) => Err(BridgeError::Engine(message.clone())),
            None => Ok(()),
        }
    }
}

impl Drop for MockModel {
    fn drop(&mut self) {
        self.stats.released.fetch_add(1, Ordering::SeqCst);
    }
}
