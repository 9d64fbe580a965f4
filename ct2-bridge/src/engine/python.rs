//! CTranslate2 through its Python package
//!
//! Drives `ctranslate2.Translator` directly with PyO3. The interpreter is
//! initialized on first use; the `ctranslate2` package must be importable
//! from it.

use crate::engine::{Engine, LoadedModel};
use crate::error::{BridgeError, BridgeResult};
use crate::options::{BatchOptions, TranslatorOptions};
use crate::result::TranslationResult;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Engine backed by the `ctranslate2` Python module
#[derive(Debug, Clone)]
pub struct PythonEngine {
    module: String,
}

impl PythonEngine {
    pub fn new() -> Self {
        Self {
            module: "ctranslate2".to_string(),
        }
    }

    /// Use a different module exposing the same `Translator` API
    pub fn with_module(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
        }
    }
}

impl Default for PythonEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn engine_error(err: PyErr) -> BridgeError {
    BridgeError::Engine(err.to_string())
}

impl Engine for PythonEngine {
    fn load(
        &self,
        model_path: &Path,
        options: &TranslatorOptions,
    ) -> BridgeResult<Box<dyn LoadedModel>> {
        let path = model_path.to_str().ok_or_else(|| BridgeError::ModelLoad {
            path: model_path.to_path_buf(),
            message: "model path is not valid UTF-8".to_string(),
        })?;
        let load_error = |err: PyErr| BridgeError::ModelLoad {
            path: model_path.to_path_buf(),
            message: err.to_string(),
        };

        let started = Instant::now();
        let translator = Python::with_gil(|py| -> BridgeResult<Py<PyAny>> {
            let module = PyModule::import_bound(py, self.module.as_str()).map_err(load_error)?;
            let kwargs = PyDict::new_bound(py);
            kwargs
                .set_item("device", options.device.as_str())
                .map_err(engine_error)?;
            kwargs
                .set_item("compute_type", options.compute_type.as_str())
                .map_err(engine_error)?;
            kwargs
                .set_item("inter_threads", options.inter_threads)
                .map_err(engine_error)?;
            kwargs
                .set_item("intra_threads", options.intra_threads)
                .map_err(engine_error)?;
            if !options.device_index.is_empty() {
                kwargs
                    .set_item("device_index", options.device_index.clone())
                    .map_err(engine_error)?;
            }

            let translator = module
                .getattr("Translator")
                .and_then(|cls| cls.call((path,), Some(&kwargs)))
                .map_err(load_error)?;
            Ok(translator.unbind())
        })?;

        info!(
            "Loaded {} on {} ({}) in {:?}",
            path,
            options.device,
            options.compute_type,
            started.elapsed()
        );
        Ok(Box::new(PythonModel { translator }))
    }

    fn name(&self) -> &str {
        "CTranslate2 (Python)"
    }
}

struct PythonModel {
    translator: Py<PyAny>,
}

impl LoadedModel for PythonModel {
    fn translate_batch(
        &self,
        source: &[Vec<String>],
        options: &BatchOptions,
    ) -> BridgeResult<Vec<TranslationResult>> {
        Python::with_gil(|py| {
            let kwargs = PyDict::new_bound(py);
            kwargs
                .set_item("beam_size", options.beam_size)
                .map_err(engine_error)?;
            kwargs
                .set_item("num_hypotheses", options.num_hypotheses)
                .map_err(engine_error)?;
            kwargs
                .set_item("max_batch_size", options.max_batch_size)
                .map_err(engine_error)?;
            kwargs
                .set_item("batch_type", options.batch_type.as_str())
                .map_err(engine_error)?;
            kwargs
                .set_item("max_decoding_length", options.max_decoding_length)
                .map_err(engine_error)?;
            kwargs
                .set_item("return_scores", options.return_scores)
                .map_err(engine_error)?;
            if let Some(prefix) = &options.target_prefix {
                kwargs
                    .set_item("target_prefix", prefix.clone())
                    .map_err(engine_error)?;
            }

            let output = self
                .translator
                .bind(py)
                .call_method("translate_batch", (source.to_vec(),), Some(&kwargs))
                .map_err(engine_error)?;

            let mut results = Vec::with_capacity(source.len());
            for item in output.iter().map_err(engine_error)? {
                let item = item.map_err(engine_error)?;
                let hypotheses: Vec<Vec<String>> = item
                    .getattr("hypotheses")
                    .and_then(|h| h.extract())
                    .map_err(engine_error)?;
                // `scores` is an empty list unless return_scores was set
                let scores: Vec<f32> = item
                    .getattr("scores")
                    .and_then(|s| s.extract())
                    .unwrap_or_default();
                results.push(TranslationResult::from_parts(hypotheses, scores));
            }
            debug!("ctranslate2 returned {} results", results.len());
            Ok(results)
        })
    }

    fn unload(self: Box<Self>) -> BridgeResult<()> {
        Python::with_gil(|py| {
            self.translator
                .bind(py)
                .call_method0("unload_model")
                .map_err(engine_error)?;
            drop(self.translator);
            Ok(())
        })
    }
}
