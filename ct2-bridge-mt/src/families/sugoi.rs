use super::{HUB_ACCOUNT, LanguagePair, ModelFamily, SplitQueries, merge_parts, variant_suffix};
use crate::error::{MtError, MtResult};
use crate::language::Language;
use ct2_bridge::{Device, ModelFormat};
use regex::Regex;
use std::sync::LazyLock;

/// Sentences per chunk handed to the model
pub const SENTENCES_PER_CHUNK: usize = 4;

// A word character followed by sentence-ending punctuation
static SENTENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w[.‥…!?。・]+").expect("sentence regex is valid"));

/// Sugoi v4 Japanese → English model
///
/// Long inputs are cut into chunks of a few sentences; full stops are masked
/// as `@` while the model sees them and restored afterwards.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sugoi;

impl Sugoi {
    /// Split one query into sentences, keeping each sentence's punctuation
    pub fn sentences(query: &str) -> Vec<&str> {
        let mut sentences = Vec::new();
        let mut start = 0;
        for m in SENTENCE_END.find_iter(query) {
            sentences.push(&query[start..m.end()]);
            start = m.end();
        }
        if start < query.len() {
            sentences.push(&query[start..]);
        }
        sentences
    }

    fn mask(chunk: &str) -> String {
        chunk.replace(['.', '。'], "@")
    }

    fn unmask(text: &str) -> String {
        text.replace('@', ".")
            .replace('▁', " ")
            .replace("<unk>", "")
    }
}

impl ModelFamily for Sugoi {
    fn name(&self) -> &str {
        "Sugoi v4"
    }

    fn model_id(&self, device: Device, format: ModelFormat) -> String {
        format!("sugoi-v4-ja-en-ct2{}", variant_suffix(device, format, '-'))
    }

    fn version(&self) -> &str {
        "4.0"
    }

    fn hub_repo(&self, device: Device, format: ModelFormat) -> Option<String> {
        Some(format!("{}/{}", HUB_ACCOUNT, self.model_id(device, format)))
    }

    fn files(&self) -> Vec<String> {
        [
            "source_vocabulary.txt",
            "target_vocabulary.txt",
            "spm.ja.nopretok.vocab",
            "spm.ja.nopretok.model",
            "model.bin",
            "config.json",
        ]
        .iter()
        .map(|f| f.to_string())
        .collect()
    }

    fn resolve_pair(&self, source: Option<Language>, target: Language) -> MtResult<LanguagePair> {
        match (source, target) {
            (Some(Language::Japanese) | None, Language::English) => {
                Ok(LanguagePair::new(Some(Language::Japanese), Language::English))
            }
            (source, target) => Err(MtError::UnsupportedLanguage(format!(
                "Sugoi only translates Japanese to English, not {} to {}",
                source
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unknown".to_string()),
                target
            ))),
        }
    }

    fn tokenizer_file(&self, _pair: &LanguagePair) -> MtResult<String> {
        Ok("spm.ja.nopretok.model".to_string())
    }

    fn split_queries(&self, queries: &[String]) -> SplitQueries {
        let mut texts = Vec::new();
        let mut parts = Vec::with_capacity(queries.len());
        for query in queries {
            let sentences = Self::sentences(query);
            let before = texts.len();
            texts.extend(
                sentences
                    .chunks(SENTENCES_PER_CHUNK)
                    .map(|chunk| Self::mask(&chunk.concat())),
            );
            parts.push(texts.len() - before);
        }
        SplitQueries { texts, parts }
    }

    fn finish(&self, sentences: Vec<String>, _pair: &LanguagePair, parts: &[usize]) -> Vec<String> {
        merge_parts(sentences, parts, " ")
            .iter()
            .map(|s| Self::unmask(s))
            .collect()
    }
}
