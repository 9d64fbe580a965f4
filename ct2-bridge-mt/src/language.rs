//! Languages served by the bundled model families
//!
//! Each family names languages differently: M2M100 uses ISO 639-1 codes
//! wrapped as `__en__`, NLLB-200 uses FLORES-200 codes (`eng_Latn`) and
//! JParaCrawl only knows `en` and `ja`.

use crate::error::{MtError, MtResult};
use crate::translator::{normalize_locale, validate_locale};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    Arabic,
    Chinese,
    Czech,
    Dutch,
    English,
    French,
    German,
    Hindi,
    Indonesian,
    Italian,
    Japanese,
    Korean,
    Polish,
    Portuguese,
    Russian,
    Spanish,
    Swedish,
    Thai,
    Turkish,
    Ukrainian,
    Vietnamese,
}

// (language, ISO 639-1, FLORES-200)
const CODES: &[(Language, &str, &str)] = &[
    (Language::Arabic, "ar", "arb_Arab"),
    (Language::Chinese, "zh", "zho_Hans"),
    (Language::Czech, "cs", "ces_Latn"),
    (Language::Dutch, "nl", "nld_Latn"),
    (Language::English, "en", "eng_Latn"),
    (Language::French, "fr", "fra_Latn"),
    (Language::German, "de", "deu_Latn"),
    (Language::Hindi, "hi", "hin_Deva"),
    (Language::Indonesian, "id", "ind_Latn"),
    (Language::Italian, "it", "ita_Latn"),
    (Language::Japanese, "ja", "jpn_Jpan"),
    (Language::Korean, "ko", "kor_Hang"),
    (Language::Polish, "pl", "pol_Latn"),
    (Language::Portuguese, "pt", "por_Latn"),
    (Language::Russian, "ru", "rus_Cyrl"),
    (Language::Spanish, "es", "spa_Latn"),
    (Language::Swedish, "sv", "swe_Latn"),
    (Language::Thai, "th", "tha_Thai"),
    (Language::Turkish, "tr", "tur_Latn"),
    (Language::Ukrainian, "uk", "ukr_Cyrl"),
    (Language::Vietnamese, "vi", "vie_Latn"),
];

impl Language {
    pub fn all() -> impl Iterator<Item = Language> {
        CODES.iter().map(|(lang, _, _)| *lang)
    }

    fn codes(&self) -> (&'static str, &'static str) {
        CODES
            .iter()
            .find(|(lang, _, _)| lang == self)
            .map(|(_, iso, flores)| (*iso, *flores))
            .unwrap_or(("und", "und"))
    }

    /// ISO 639-1 code
    pub fn iso_code(&self) -> &'static str {
        self.codes().0
    }

    /// Language token used by M2M100, e.g. `__fr__`
    pub fn m2m100_token(&self) -> String {
        format!("__{}__", self.iso_code())
    }

    /// FLORES-200 code used by NLLB, e.g. `fra_Latn`
    pub fn nllb_code(&self) -> &'static str {
        self.codes().1
    }

    /// Code used in JParaCrawl file and directory names
    pub fn jparacrawl_code(&self) -> MtResult<&'static str> {
        match self {
            Language::English => Ok("en"),
            Language::Japanese => Ok("ja"),
            other => Err(MtError::UnsupportedLanguage(format!(
                "JParaCrawl only translates between English and Japanese, not {}",
                other
            ))),
        }
    }

    /// Parse an optional locale, treating an empty string as "unknown"
    pub fn parse_optional(locale: Option<&str>) -> MtResult<Option<Language>> {
        match locale {
            None => Ok(None),
            Some(l) if l.trim().is_empty() => Ok(None),
            Some(l) => l.parse().map(Some),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Serialized as the ISO 639-1 code
impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.iso_code())
    }
}

impl FromStr for Language {
    type Err = MtError;

    fn from_str(locale: &str) -> MtResult<Self> {
        validate_locale(locale)?;
        let code = normalize_locale(locale);
        CODES
            .iter()
            .find(|(_, iso, _)| *iso == code)
            .map(|(lang, _, _)| *lang)
            .ok_or_else(|| {
                MtError::UnsupportedLanguage(format!("no model family serves '{}'", locale))
            })
    }
}
