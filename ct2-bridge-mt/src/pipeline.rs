//! Offline translation pipeline
//!
//! [`OfflineTranslator`] turns text into text with one [`ModelFamily`]:
//!
//! 1. resolve the language pair, detecting the source when it is unknown
//! 2. split queries the way the family wants
//! 3. tokenize and add language tokens
//! 4. translate with a cached [`Translator`] and keep the best hypothesis
//! 5. detokenize, clean up and merge split parts
//!
//! Translators and tokenizers are cached per model path. With
//! [`ModelLifetime::Dispose`] both caches are emptied after every request.
//! The cache lock is only held while looking up or loading a model, so
//! requests translate in parallel.

use crate::detector::{LanguageDetector, default_detector};
use crate::error::{MtError, MtResult};
use crate::families::{LanguagePair, ModelFamily};
use crate::language::Language;
use crate::tokenizer::{Tokenizer, TokenizerLoader, default_loader};
use crate::translator::MachineTranslator;
use async_trait::async_trait;
use ct2_bridge::{BatchOptions, Engine, ModelCache, ModelLifetime, Translator, TranslatorOptions};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Result of translating one query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationOutput {
    pub text: String,
    /// Source language, when known or inferred
    pub lang: Option<Language>,
}

/// Result of translating a batch of queries, in input order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationVecOutput {
    pub text: Vec<String>,
    pub lang: Option<Language>,
}

/// Text-to-text translator backed by a local engine
///
/// Cloning is cheap; clones share the caches.
#[derive(Clone)]
pub struct OfflineTranslator {
    inner: Arc<Pipeline>,
}

struct Pipeline {
    family: Arc<dyn ModelFamily>,
    engine: Arc<dyn Engine>,
    model_root: PathBuf,
    translator_options: TranslatorOptions,
    batch_options: BatchOptions,
    tokenizer_loader: TokenizerLoader,
    detector: Option<LanguageDetector>,
    translators: Mutex<ModelCache<Arc<Translator>>>,
    tokenizers: Mutex<ModelCache<Arc<dyn Tokenizer>>>,
}

/// Builder for [`OfflineTranslator`]
pub struct OfflineTranslatorBuilder {
    family: Arc<dyn ModelFamily>,
    engine: Arc<dyn Engine>,
    model_root: PathBuf,
    translator_options: TranslatorOptions,
    batch_options: BatchOptions,
    tokenizer_loader: TokenizerLoader,
    detector: Option<LanguageDetector>,
    lifetime: ModelLifetime,
}

impl OfflineTranslatorBuilder {
    pub fn translator_options(mut self, options: TranslatorOptions) -> Self {
        self.translator_options = options;
        self
    }

    pub fn batch_options(mut self, options: BatchOptions) -> Self {
        self.batch_options = options;
        self
    }

    pub fn tokenizer_loader(mut self, loader: TokenizerLoader) -> Self {
        self.tokenizer_loader = loader;
        self
    }

    /// Detector for unknown source languages, `None` to disable detection
    pub fn language_detector(mut self, detector: Option<LanguageDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn lifetime(mut self, lifetime: ModelLifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn build(self) -> OfflineTranslator {
        OfflineTranslator {
            inner: Arc::new(Pipeline {
                family: self.family,
                engine: self.engine,
                model_root: self.model_root,
                translator_options: self.translator_options,
                batch_options: self.batch_options,
                tokenizer_loader: self.tokenizer_loader,
                detector: self.detector,
                translators: Mutex::new(ModelCache::new(self.lifetime)),
                tokenizers: Mutex::new(ModelCache::new(self.lifetime)),
            }),
        }
    }
}

impl OfflineTranslator {
    /// Start building a translator for the model stored in `model_root`
    pub fn builder(
        family: Arc<dyn ModelFamily>,
        engine: Arc<dyn Engine>,
        model_root: impl Into<PathBuf>,
    ) -> OfflineTranslatorBuilder {
        OfflineTranslatorBuilder {
            family,
            engine,
            model_root: model_root.into(),
            translator_options: TranslatorOptions::default(),
            batch_options: BatchOptions::default(),
            tokenizer_loader: default_loader(),
            detector: default_detector(),
            lifetime: ModelLifetime::default(),
        }
    }

    pub fn family(&self) -> &dyn ModelFamily {
        self.inner.family.as_ref()
    }

    pub fn model_root(&self) -> &Path {
        &self.inner.model_root
    }

    /// Translate a batch of queries
    ///
    /// `from` may be `None`; families that can infer the source fill it in,
    /// the others fall back to the language detector. The source used is
    /// reported in the output.
    pub fn translate_vec(
        &self,
        queries: &[String],
        from: Option<Language>,
        to: Language,
    ) -> MtResult<TranslationVecOutput> {
        self.inner.translate_vec(queries, from, to)
    }

    pub fn translate(
        &self,
        query: &str,
        from: Option<Language>,
        to: Language,
    ) -> MtResult<TranslationOutput> {
        let output = self.translate_vec(&[query.to_string()], from, to)?;
        let text = output.text.into_iter().next().ok_or_else(|| {
            MtError::TranslationError("no translation returned for query".to_string())
        })?;
        Ok(TranslationOutput {
            text,
            lang: output.lang,
        })
    }

    /// Number of translators currently cached
    pub fn loaded_models(&self) -> MtResult<usize> {
        Ok(self.inner.translators()?.len())
    }

    /// Dispose every cached translator and drop cached tokenizers
    ///
    /// All translators are disposed even if one fails; the first error is
    /// returned. A translator still in use by a running request is released
    /// when that request finishes.
    pub fn unload_all(&self) -> MtResult<()> {
        let drained = self.inner.translators()?.drain();
        self.inner.tokenizers()?.drain();

        let mut first_error = None;
        for (ident, translator) in drained {
            let Ok(translator) = Arc::try_unwrap(translator) else {
                debug!("Translator {} still in use, releasing it later", ident);
                continue;
            };
            debug!("Disposing translator {}", ident);
            if let Err(e) = translator.dispose() {
                warn!("Failed to dispose {}: {}", ident, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

impl Pipeline {
    fn translators(&self) -> MtResult<MutexGuard<'_, ModelCache<Arc<Translator>>>> {
        self.translators
            .lock()
            .map_err(|_| MtError::TranslationError("translator cache lock poisoned".to_string()))
    }

    fn tokenizers(&self) -> MtResult<MutexGuard<'_, ModelCache<Arc<dyn Tokenizer>>>> {
        self.tokenizers
            .lock()
            .map_err(|_| MtError::TranslationError("tokenizer cache lock poisoned".to_string()))
    }

    fn translate_vec(
        &self,
        queries: &[String],
        from: Option<Language>,
        to: Language,
    ) -> MtResult<TranslationVecOutput> {
        let pair = self.family.resolve_pair(from, to)?;
        if queries.is_empty() {
            return Ok(TranslationVecOutput {
                text: Vec::new(),
                lang: pair.source,
            });
        }
        let pair = match pair.source {
            Some(_) => pair,
            None => self.detect_source(queries, pair),
        };

        info!(
            "Translating {} queries with {} ({:?} -> {})",
            queries.len(),
            self.family.name(),
            pair.source,
            pair.target
        );
        let result = self.run(queries, &pair);
        self.cleanup()?;
        let text = result?;

        if text.len() != queries.len() {
            return Err(MtError::TranslationError(format!(
                "{} produced {} translations for {} queries",
                self.family.name(),
                text.len(),
                queries.len()
            )));
        }
        Ok(TranslationVecOutput {
            text,
            lang: pair.source,
        })
    }

    fn run(&self, queries: &[String], pair: &LanguagePair) -> MtResult<Vec<String>> {
        let tokenizer = self.tokenizer(pair)?;

        let split = self.family.split_queries(queries);
        let tokens = tokenizer.tokenize(&split.texts)?;
        let tokens = self.family.decorate_source(tokens, pair);

        let mut options = self.batch_options.clone();
        if let Some(prefix) = self.family.target_prefix(pair, tokens.len()) {
            options = options.with_target_prefix(prefix);
        }

        let model_dir = self.family.translator_dir(&self.model_root, pair)?;
        let translator = self.translator(&model_dir)?;
        let hypotheses = translator.translate_tokens(&tokens, &options)?;

        let sentences = tokenizer.detokenize(hypotheses)?;
        Ok(self.family.finish(sentences, pair, &split.parts))
    }

    /// Fill in the source language of a pair the family left open
    ///
    /// Keeps the pair unchanged when nothing is detected or the family
    /// rejects the detected language.
    fn detect_source(&self, queries: &[String], pair: LanguagePair) -> LanguagePair {
        let Some(detect) = &self.detector else {
            return pair;
        };
        let Some(lang) = detect(&queries.join("\n")) else {
            debug!("Could not detect the source language");
            return pair;
        };
        match self.family.resolve_pair(Some(lang), pair.target) {
            Ok(detected) => {
                debug!("Detected source language {}", lang);
                detected
            }
            Err(e) => {
                debug!("Ignoring detected language {}: {}", lang, e);
                pair
            }
        }
    }

    fn translator(&self, model_dir: &Path) -> MtResult<Arc<Translator>> {
        let mut translators = self.translators()?;
        let translator = translators.get_or_try_insert_with(&cache_key(model_dir), || {
            Translator::with_options(
                self.engine.as_ref(),
                model_dir,
                self.translator_options.clone(),
            )
            .map(Arc::new)
        })?;
        Ok(Arc::clone(translator))
    }

    fn tokenizer(&self, pair: &LanguagePair) -> MtResult<Arc<dyn Tokenizer>> {
        let path = self.model_root.join(self.family.tokenizer_file(pair)?);
        let mut tokenizers = self.tokenizers()?;
        let tokenizer = tokenizers.get_or_try_insert_with(&cache_key(&path), || {
            debug!("Loading tokenizer {}", path.display());
            (self.tokenizer_loader)(&path)
        })?;
        Ok(Arc::clone(tokenizer))
    }

    fn cleanup(&self) -> MtResult<()> {
        self.tokenizers()?.cleanup();
        self.translators()?.cleanup();
        Ok(())
    }
}

fn cache_key(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[async_trait]
impl MachineTranslator for OfflineTranslator {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<String> {
        let mut results = self
            .translate_batch(&[text.to_string()], source_locale, target_locale)
            .await?;
        results
            .pop()
            .ok_or_else(|| MtError::TranslationError("no translation returned".to_string()))
    }

    async fn translate_batch(
        &self,
        texts: &[String],
        source_locale: &str,
        target_locale: &str,
    ) -> MtResult<Vec<String>> {
        let from = Language::parse_optional(Some(source_locale))?;
        let to: Language = target_locale.parse()?;
        let pipeline = Arc::clone(&self.inner);
        let texts = texts.to_vec();

        let output = tokio::task::spawn_blocking(move || pipeline.translate_vec(&texts, from, to))
            .await
            .map_err(|e| MtError::TranslationError(format!("translation task failed: {}", e)))??;
        Ok(output.text)
    }

    fn provider_name(&self) -> &str {
        self.inner.family.name()
    }
}
