use super::{
    HUB_ACCOUNT, LanguagePair, ModelFamily, merge_parts, strip_language_token, variant_suffix,
};
use crate::error::MtResult;
use crate::language::Language;
use ct2_bridge::{Device, ModelFormat};

/// End-of-sentence token appended to decorated sources
pub const EOS: &str = "</s>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum M2M100Size {
    Small418M,
    Big1_2B,
}

impl M2M100Size {
    pub fn as_str(&self) -> &'static str {
        match self {
            M2M100Size::Small418M => "418m",
            M2M100Size::Big1_2B => "1.2b",
        }
    }
}

/// Facebook M2M100 many-to-many model
#[derive(Debug, Clone)]
pub struct M2M100 {
    size: M2M100Size,
    name: String,
}

impl M2M100 {
    pub fn new(size: M2M100Size) -> Self {
        Self {
            size,
            name: format!("M2M100 {}", size.as_str().to_uppercase()),
        }
    }
}

impl ModelFamily for M2M100 {
    fn name(&self) -> &str {
        &self.name
    }

    fn model_id(&self, device: Device, format: ModelFormat) -> String {
        format!(
            "m2m_100_{}_ct2{}",
            self.size.as_str(),
            variant_suffix(device, format, '_')
        )
    }

    fn hub_repo(&self, device: Device, format: ModelFormat) -> Option<String> {
        Some(format!("{}/{}", HUB_ACCOUNT, self.model_id(device, format)))
    }

    fn files(&self) -> Vec<String> {
        ["spm.128k.model", "shared_vocabulary.txt", "model.bin", "config.json"]
            .iter()
            .map(|f| f.to_string())
            .collect()
    }

    fn resolve_pair(&self, source: Option<Language>, target: Language) -> MtResult<LanguagePair> {
        Ok(LanguagePair::new(source, target))
    }

    fn tokenizer_file(&self, _pair: &LanguagePair) -> MtResult<String> {
        Ok("spm.128k.model".to_string())
    }

    fn decorate_source(&self, tokens: Vec<Vec<String>>, pair: &LanguagePair) -> Vec<Vec<String>> {
        let prefix = pair.source.map(|s| s.m2m100_token());
        tokens
            .into_iter()
            .map(|sentence| {
                prefix
                    .iter()
                    .cloned()
                    .chain(sentence)
                    .chain(std::iter::once(EOS.to_string()))
                    .collect()
            })
            .collect()
    }

    fn target_prefix(&self, pair: &LanguagePair, count: usize) -> Option<Vec<Vec<String>>> {
        Some(vec![vec![pair.target.m2m100_token()]; count])
    }

    fn finish(&self, sentences: Vec<String>, pair: &LanguagePair, parts: &[usize]) -> Vec<String> {
        let token = pair.target.m2m100_token();
        let stripped = sentences
            .iter()
            .map(|s| strip_language_token(s, &token))
            .collect();
        merge_parts(stripped, parts, " ")
    }
}
