use super::{
    LanguagePair, ModelFamily, SplitQueries, merge_parts, strip_language_token, variant_suffix,
};
use crate::error::MtResult;
use crate::language::Language;
use ct2_bridge::{Device, ModelFormat};

use super::m2m100::EOS;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NllbSize {
    #[default]
    DistilledSmall600M,
    DistilledBig1_3B,
    Small1_3B,
    Big3_3B,
}

impl NllbSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            NllbSize::DistilledSmall600M => "200-distilled-600M",
            NllbSize::DistilledBig1_3B => "200-distilled-1.3B",
            NllbSize::Small1_3B => "200-1.3B",
            NllbSize::Big3_3B => "200-3.3B",
        }
    }
}

/// Meta NLLB-200 model
///
/// Converted NLLB models are not published on the hub; they have to be
/// placed in the models directory by hand.
#[derive(Debug, Clone)]
pub struct Nllb {
    size: NllbSize,
    name: String,
}

impl Nllb {
    pub fn new(size: NllbSize) -> Self {
        Self {
            size,
            name: format!("NLLB-{}", size.as_str()),
        }
    }
}

impl ModelFamily for Nllb {
    fn name(&self) -> &str {
        &self.name
    }

    fn model_id(&self, device: Device, format: ModelFormat) -> String {
        format!(
            "nllb-{}-ct2{}",
            self.size.as_str(),
            variant_suffix(device, format, '-')
        )
    }

    fn hub_repo(&self, _device: Device, _format: ModelFormat) -> Option<String> {
        None
    }

    fn files(&self) -> Vec<String> {
        [
            "sentencepiece.bpe.model",
            "shared_vocabulary.txt",
            "model.bin",
            "config.json",
        ]
        .iter()
        .map(|f| f.to_string())
        .collect()
    }

    fn resolve_pair(&self, source: Option<Language>, target: Language) -> MtResult<LanguagePair> {
        Ok(LanguagePair::new(source, target))
    }

    fn tokenizer_file(&self, _pair: &LanguagePair) -> MtResult<String> {
        Ok("sentencepiece.bpe.model".to_string())
    }

    fn split_queries(&self, queries: &[String]) -> SplitQueries {
        SplitQueries {
            texts: queries.iter().map(|q| q.trim().to_string()).collect(),
            parts: vec![1; queries.len()],
        }
    }

    fn decorate_source(&self, tokens: Vec<Vec<String>>, pair: &LanguagePair) -> Vec<Vec<String>> {
        let prefix = pair.source.map(|s| s.nllb_code().to_string());
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
        Some(vec![vec![pair.target.nllb_code().to_string()]; count])
    }

    fn finish(&self, sentences: Vec<String>, pair: &LanguagePair, parts: &[usize]) -> Vec<String> {
        let code = pair.target.nllb_code();
        let stripped = sentences
            .iter()
            .map(|s| strip_language_token(s, code))
            .collect();
        merge_parts(stripped, parts, " ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_ids_are_local_only() {
        let family = Nllb::new(NllbSize::DistilledSmall600M);
        assert_eq!(
            family.model_id(Device::Cpu, ModelFormat::Compact),
            "nllb-200-distilled-600M-ct2-int8"
        );
        assert_eq!(
            Nllb::new(NllbSize::Big3_3B).model_id(Device::Cuda, ModelFormat::Normal),
            "nllb-200-3.3B-ct2"
        );
        assert!(family.hub_repo(Device::Cpu, ModelFormat::Compact).is_none());
    }

    #[test]
    fn test_split_trims_queries() {
        let family = Nllb::new(NllbSize::default());
        let split = family.split_queries(&["  Hello \n".to_string()]);
        assert_eq!(split.texts, vec!["Hello"]);
        assert_eq!(split.parts, vec![1]);
    }

    #[test]
    fn test_flores_tokens() {
        let family = Nllb::new(NllbSize::default());
        let pair = LanguagePair::new(Some(Language::English), Language::Japanese);
        let decorated = family.decorate_source(vec![vec!["▁Hi".to_string()]], &pair);
        assert_eq!(decorated[0], vec!["eng_Latn", "▁Hi", "</s>"]);
        assert_eq!(
            family.target_prefix(&pair, 1).unwrap(),
            vec![vec!["jpn_Jpan".to_string()]]
        );
        assert_eq!(
            family.finish(vec!["jpn_Jpan こんにちは".to_string()], &pair, &[1]),
            vec!["こんにちは"]
        );
    }
}
