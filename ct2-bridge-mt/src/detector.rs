//! Source language detection
//!
//! M2M100 and NLLB accept any source language but translate better when
//! told which one it is. When the caller does not say, the pipeline asks a
//! [`LanguageDetector`]. The `detector` feature provides one backed by
//! [whatlang](https://github.com/greyblake/whatlang-rs).

use crate::language::Language;
use std::sync::Arc;

/// Guesses the language of a text, `None` when unsure or unsupported
pub type LanguageDetector = Arc<dyn Fn(&str) -> Option<Language> + Send + Sync>;

/// Detector used when none is configured
pub fn default_detector() -> Option<LanguageDetector> {
    #[cfg(feature = "detector")]
    {
        Some(Arc::new(detect_whatlang) as LanguageDetector)
    }
    #[cfg(not(feature = "detector"))]
    {
        None
    }
}

/// Detect with whatlang, mapped onto the languages the families serve
#[cfg(feature = "detector")]
pub fn detect_whatlang(text: &str) -> Option<Language> {
    use whatlang::Lang;

    let info = whatlang::detect(text)?;
    let lang = match info.lang() {
        Lang::Ara => Language::Arabic,
        Lang::Cmn => Language::Chinese,
        Lang::Ces => Language::Czech,
        Lang::Nld => Language::Dutch,
        Lang::Eng => Language::English,
        Lang::Fra => Language::French,
        Lang::Deu => Language::German,
        Lang::Hin => Language::Hindi,
        Lang::Ind => Language::Indonesian,
        Lang::Ita => Language::Italian,
        Lang::Jpn => Language::Japanese,
        Lang::Kor => Language::Korean,
        Lang::Pol => Language::Polish,
        Lang::Por => Language::Portuguese,
        Lang::Rus => Language::Russian,
        Lang::Spa => Language::Spanish,
        Lang::Swe => Language::Swedish,
        Lang::Tha => Language::Thai,
        Lang::Tur => Language::Turkish,
        Lang::Ukr => Language::Ukrainian,
        Lang::Vie => Language::Vietnamese,
        _ => return None,
    };
    Some(lang)
}
