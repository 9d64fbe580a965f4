use super::{HUB_ACCOUNT, LanguagePair, ModelFamily, variant_suffix};
use crate::error::{MtError, MtResult};
use crate::language::Language;
use ct2_bridge::{Device, ModelFormat};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JParaCrawlSize {
    Small,
    Base,
    Big,
}

impl JParaCrawlSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            JParaCrawlSize::Small => "small",
            JParaCrawlSize::Base => "base",
            JParaCrawlSize::Big => "big",
        }
    }
}

/// JParaCrawl v3 English ↔ Japanese models
///
/// Each direction is its own translator under `{src}-{tgt}/`, and each source
/// language has its own SentencePiece model.
#[derive(Debug, Clone)]
pub struct JParaCrawl {
    size: JParaCrawlSize,
    name: String,
}

impl JParaCrawl {
    pub fn new(size: JParaCrawlSize) -> Self {
        Self {
            size,
            name: format!("JParaCrawl {}", size.as_str()),
        }
    }

    pub fn size(&self) -> JParaCrawlSize {
        self.size
    }
}

impl ModelFamily for JParaCrawl {
    fn name(&self) -> &str {
        &self.name
    }

    fn model_id(&self, device: Device, format: ModelFormat) -> String {
        format!(
            "jparacrawl-{}-ct2{}",
            self.size.as_str(),
            variant_suffix(device, format, '-')
        )
    }

    fn version(&self) -> &str {
        "3.0"
    }

    fn hub_repo(&self, device: Device, format: ModelFormat) -> Option<String> {
        Some(format!(
            "{}/jparacrawl-v3-{}-ct2{}",
            HUB_ACCOUNT,
            self.size.as_str(),
            variant_suffix(device, format, '-')
        ))
    }

    fn files(&self) -> Vec<String> {
        let mut files = vec![
            "spm.ja.nopretok.vocab".to_string(),
            "spm.ja.nopretok.model".to_string(),
            "spm.en.nopretok.vocab".to_string(),
            "spm.en.nopretok.model".to_string(),
        ];
        for dir in ["ja-en", "en-ja"] {
            for file in [
                "config.json",
                "model.bin",
                "source_vocabulary.txt",
                "target_vocabulary.txt",
            ] {
                files.push(format!("{}/{}", dir, file));
            }
        }
        files
    }

    fn resolve_pair(&self, source: Option<Language>, target: Language) -> MtResult<LanguagePair> {
        let source = match (source, target) {
            (Some(Language::English), Language::Japanese)
            | (None, Language::Japanese) => Language::English,
            (Some(Language::Japanese), Language::English)
            | (None, Language::English) => Language::Japanese,
            (source, target) => {
                return Err(MtError::UnsupportedLanguage(format!(
                    "{} cannot translate {} to {}",
                    self.name,
                    source
                        .map(|s| s.to_string())
                        .unwrap_or_else(|| "unknown".to_string()),
                    target
                )));
            }
        };
        Ok(LanguagePair::new(Some(source), target))
    }

    fn tokenizer_file(&self, pair: &LanguagePair) -> MtResult<String> {
        let source = source_of(pair)?;
        Ok(format!("spm.{}.nopretok.model", source.jparacrawl_code()?))
    }

    fn translator_dir(&self, root: &Path, pair: &LanguagePair) -> MtResult<PathBuf> {
        let source = source_of(pair)?;
        Ok(root.join(format!(
            "{}-{}",
            source.jparacrawl_code()?,
            pair.target.jparacrawl_code()?
        )))
    }
}

fn source_of(pair: &LanguagePair) -> MtResult<Language> {
    pair.source
        .ok_or_else(|| MtError::UnsupportedLanguage("source language is required".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family() -> JParaCrawl {
        JParaCrawl::new(JParaCrawlSize::Small)
    }

    #[test]
    fn test_resolve_infers_source() {
        let pair = family().resolve_pair(None, Language::English).unwrap();
        assert_eq!(pair.source, Some(Language::Japanese));

        let pair = family().resolve_pair(None, Language::Japanese).unwrap();
        assert_eq!(pair.source, Some(Language::English));
    }

    #[test]
    fn test_resolve_rejects_other_pairs() {
        assert!(
            family()
                .resolve_pair(Some(Language::English), Language::English)
                .is_err()
        );
        assert!(family().resolve_pair(None, Language::German).is_err());
        assert!(
            family()
                .resolve_pair(Some(Language::French), Language::Japanese)
                .is_err()
        );
    }

    #[test]
    fn test_paths_follow_direction() {
        let pair = family()
            .resolve_pair(Some(Language::Japanese), Language::English)
            .unwrap();
        assert_eq!(
            family().tokenizer_file(&pair).unwrap(),
            "spm.ja.nopretok.model"
        );
        assert_eq!(
            family().translator_dir(Path::new("/m"), &pair).unwrap(),
            PathBuf::from("/m/ja-en")
        );
    }

    #[test]
    fn test_model_ids() {
        let big = JParaCrawl::new(JParaCrawlSize::Big);
        assert_eq!(
            big.model_id(Device::Cpu, ModelFormat::Compact),
            "jparacrawl-big-ct2-int8"
        );
        assert_eq!(
            big.model_id(Device::Cuda, ModelFormat::Normal),
            "jparacrawl-big-ct2"
        );
        assert_eq!(
            family()
                .hub_repo(Device::Cuda, ModelFormat::Compact)
                .unwrap(),
            "JustFrederik/jparacrawl-v3-small-ct2-float16"
        );
    }

    #[test]
    fn test_files_cover_both_directions() {
        let files = family().files();
        assert_eq!(files.len(), 12);
        assert!(files.contains(&"en-ja/model.bin".to_string()));
        assert!(files.contains(&"ja-en/model.bin".to_string()));
    }
}
