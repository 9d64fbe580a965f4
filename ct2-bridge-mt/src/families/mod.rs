//! Model families
//!
//! A family describes everything that differs between converted model sets:
//! which language pairs they serve, where the tokenizer and translator files
//! live, how the source is decorated with language tokens, which target prefix
//! forces the output language, and how the decoded text is cleaned up.
//!
//! | Family | Pairs | Notes |
//! |--------|-------|-------|
//! | [`JParaCrawl`] | en ↔ ja | one translator directory per direction |
//! | [`Sugoi`] | ja → en | sentence chunking before tokenization |
//! | [`M2M100`] | any ↔ any | `__xx__` language tokens |
//! | [`Nllb`] | any ↔ any | FLORES-200 language tokens |

use crate::error::{MtError, MtResult};
use crate::language::Language;
use ct2_bridge::{Device, ModelFormat};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod jparacrawl;
pub mod m2m100;
pub mod nllb;
pub mod sugoi;

pub use jparacrawl::{JParaCrawl, JParaCrawlSize};
pub use m2m100::{M2M100, M2M100Size};
pub use nllb::{Nllb, NllbSize};
pub use sugoi::Sugoi;

/// Hub account hosting the converted CTranslate2 models
pub const HUB_ACCOUNT: &str = "JustFrederik";

/// Source and target of one translation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguagePair {
    /// `None` when the caller did not say and the family could not infer it
    pub source: Option<Language>,
    pub target: Language,
}

impl LanguagePair {
    pub fn new(source: Option<Language>, target: Language) -> Self {
        Self { source, target }
    }
}

/// Queries after family-specific splitting
///
/// `parts[i]` is the number of consecutive entries of `texts` that belong to
/// the i-th original query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitQueries {
    pub texts: Vec<String>,
    pub parts: Vec<usize>,
}

impl SplitQueries {
    /// One entry per query, no splitting
    pub fn unsplit(queries: &[String]) -> Self {
        Self {
            texts: queries.to_vec(),
            parts: vec![1; queries.len()],
        }
    }
}

pub trait ModelFamily: Send + Sync + Debug {
    /// Human-readable name used in logs and `provider_name`
    fn name(&self) -> &str;

    /// Registry identifier for this family converted for `device` in `format`
    fn model_id(&self, device: Device, format: ModelFormat) -> String;

    /// Release of the converted weights
    fn version(&self) -> &str {
        "1.0"
    }

    /// Hub repository hosting the model, `None` for local-only models
    fn hub_repo(&self, device: Device, format: ModelFormat) -> Option<String>;

    /// Files making up the converted model, relative to its directory
    fn files(&self) -> Vec<String>;

    /// Check the pair and fill in the source language when it can be inferred
    fn resolve_pair(&self, source: Option<Language>, target: Language) -> MtResult<LanguagePair>;

    /// Tokenizer model file, relative to the model directory
    fn tokenizer_file(&self, pair: &LanguagePair) -> MtResult<String>;

    /// Directory handed to the engine
    fn translator_dir(&self, root: &Path, _pair: &LanguagePair) -> MtResult<PathBuf> {
        Ok(root.to_path_buf())
    }

    fn split_queries(&self, queries: &[String]) -> SplitQueries {
        SplitQueries::unsplit(queries)
    }

    /// Add language tokens around tokenized sources
    fn decorate_source(&self, tokens: Vec<Vec<String>>, _pair: &LanguagePair) -> Vec<Vec<String>> {
        tokens
    }

    /// Tokens forcing the output language, one list per input
    fn target_prefix(&self, _pair: &LanguagePair, _count: usize) -> Option<Vec<Vec<String>>> {
        None
    }

    /// Clean decoded sentences and merge split parts back into one per query
    fn finish(&self, sentences: Vec<String>, _pair: &LanguagePair, parts: &[usize]) -> Vec<String> {
        merge_parts(sentences, parts, " ")
    }
}

/// Join consecutive sentences belonging to the same query
pub fn merge_parts(sentences: Vec<String>, parts: &[usize], separator: &str) -> Vec<String> {
    let mut sentences = sentences.into_iter();
    parts
        .iter()
        .map(|&count| {
            sentences
                .by_ref()
                .take(count)
                .collect::<Vec<_>>()
                .join(separator)
        })
        .collect()
}

/// Remove a leading language token and the space after it
pub fn strip_language_token(sentence: &str, token: &str) -> String {
    sentence
        .trim_start()
        .strip_prefix(token)
        .unwrap_or(sentence)
        .trim_start()
        .to_string()
}

/// Registry id suffix: `-int8`, `_float16` or nothing
pub(crate) fn variant_suffix(device: Device, format: ModelFormat, separator: char) -> String {
    format
        .variant_tag(device)
        .map(|tag| format!("{}{}", separator, tag))
        .unwrap_or_default()
}

/// Look up a family by the short name used in configuration and on the CLI
///
/// Accepted names: `jparacrawl-small`, `jparacrawl-base`, `jparacrawl-big`,
/// `sugoi`, `m2m100-418m`, `m2m100-1.2b`, `nllb-600m`, `nllb-1.3b-distilled`,
/// `nllb-1.3b`, `nllb-3.3b`.
pub fn family_from_name(name: &str) -> MtResult<Arc<dyn ModelFamily>> {
    let family: Arc<dyn ModelFamily> = match name.to_ascii_lowercase().as_str() {
        "jparacrawl" | "jparacrawl-small" => Arc::new(JParaCrawl::new(JParaCrawlSize::Small)),
        "jparacrawl-base" => Arc::new(JParaCrawl::new(JParaCrawlSize::Base)),
        "jparacrawl-big" => Arc::new(JParaCrawl::new(JParaCrawlSize::Big)),
        "sugoi" => Arc::new(Sugoi),
        "m2m100" | "m2m100-418m" => Arc::new(M2M100::new(M2M100Size::Small418M)),
        "m2m100-1.2b" => Arc::new(M2M100::new(M2M100Size::Big1_2B)),
        "nllb" | "nllb-600m" => Arc::new(Nllb::new(NllbSize::DistilledSmall600M)),
        "nllb-1.3b-distilled" => Arc::new(Nllb::new(NllbSize::DistilledBig1_3B)),
        "nllb-1.3b" => Arc::new(Nllb::new(NllbSize::Small1_3B)),
        "nllb-3.3b" => Arc::new(Nllb::new(NllbSize::Big3_3B)),
        other => {
            return Err(MtError::Config(format!("unknown model family '{}'", other)));
        }
    };
    Ok(family)
}

/// Every bundled family variant
pub fn all_families() -> Vec<Arc<dyn ModelFamily>> {
    vec![
        Arc::new(JParaCrawl::new(JParaCrawlSize::Small)),
        Arc::new(JParaCrawl::new(JParaCrawlSize::Base)),
        Arc::new(JParaCrawl::new(JParaCrawlSize::Big)),
        Arc::new(Sugoi),
        Arc::new(M2M100::new(M2M100Size::Small418M)),
        Arc::new(M2M100::new(M2M100Size::Big1_2B)),
        Arc::new(Nllb::new(NllbSize::DistilledSmall600M)),
        Arc::new(Nllb::new(NllbSize::DistilledBig1_3B)),
        Arc::new(Nllb::new(NllbSize::Small1_3B)),
        Arc::new(Nllb::new(NllbSize::Big3_3B)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_parts() {
        let sentences = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(merge_parts(sentences, &[2, 1], " "), vec!["a b", "c"]);
    }

    #[test]
    fn test_merge_parts_unsplit_is_identity() {
        let queries = vec!["x".to_string(), "y".to_string()];
        let split = SplitQueries::unsplit(&queries);
        assert_eq!(merge_parts(split.texts, &split.parts, " "), queries);
    }

    #[test]
    fn test_strip_language_token() {
        assert_eq!(strip_language_token("__fr__ Bonjour", "__fr__"), "Bonjour");
        assert_eq!(strip_language_token("fra_Latn Salut", "fra_Latn"), "Salut");
        assert_eq!(strip_language_token("no token", "__fr__"), "no token");
    }

    #[test]
    fn test_family_from_name() {
        assert_eq!(family_from_name("sugoi").unwrap().name(), "Sugoi v4");
        assert_eq!(
            family_from_name("M2M100-1.2B").unwrap().name(),
            "M2M100 1.2B"
        );
        assert!(matches!(
            family_from_name("marian"),
            Err(MtError::Config(_))
        ));
    }

    #[test]
    fn test_all_families_have_distinct_ids() {
        let mut ids: Vec<String> = all_families()
            .iter()
            .map(|f| f.model_id(Device::Cpu, ModelFormat::Compact))
            .collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }
}
