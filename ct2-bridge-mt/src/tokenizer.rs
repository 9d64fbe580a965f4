//! Subword tokenizers
//!
//! CTranslate2 models consume token strings, not text. The converted models
//! handled here ship SentencePiece models next to `model.bin`;
//! [`SentencePieceTokenizer`] loads them when the `sentencepiece` feature is
//! enabled. [`WhitespaceTokenizer`] only suits the mock engine.

use crate::error::MtResult;
use std::path::Path;
use std::sync::Arc;

/// Converts text to token sequences and back
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &[String]) -> MtResult<Vec<Vec<String>>>;

    fn detokenize(&self, tokens: Vec<Vec<String>>) -> MtResult<Vec<String>>;
}

/// Builds a tokenizer from a model file path
pub type TokenizerLoader = Arc<dyn Fn(&Path) -> MtResult<Arc<dyn Tokenizer>> + Send + Sync>;

/// Splits on whitespace and joins tokens with a single space
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, text: &[String]) -> MtResult<Vec<Vec<String>>> {
        Ok(text
            .iter()
            .map(|t| t.split_whitespace().map(String::from).collect())
            .collect())
    }

    fn detokenize(&self, tokens: Vec<Vec<String>>) -> MtResult<Vec<String>> {
        Ok(tokens.into_iter().map(|t| t.join(" ")).collect())
    }
}

#[cfg(feature = "sentencepiece")]
pub use spm::SentencePieceTokenizer;

#[cfg(feature = "sentencepiece")]
mod spm {
    use super::Tokenizer;
    use crate::error::{MtError, MtResult};
    use sentencepiece::SentencePieceProcessor;
    use std::path::Path;

    pub struct SentencePieceTokenizer {
        spp: SentencePieceProcessor,
    }

    impl SentencePieceTokenizer {
        pub fn open(path: &Path) -> MtResult<Self> {
            let spp = SentencePieceProcessor::open(path).map_err(|e| {
                MtError::Tokenizer(format!("cannot open {}: {}", path.display(), e))
            })?;
            Ok(Self { spp })
        }
    }

    impl Tokenizer for SentencePieceTokenizer {
        fn tokenize(&self, text: &[String]) -> MtResult<Vec<Vec<String>>> {
            text.iter()
                .map(|t| {
                    self.spp
                        .encode(t)
                        .map(|pieces| pieces.into_iter().map(|p| p.piece).collect())
                        .map_err(|e| MtError::Tokenizer(e.to_string()))
                })
                .collect()
        }

        fn detokenize(&self, tokens: Vec<Vec<String>>) -> MtResult<Vec<String>> {
            tokens
                .iter()
                .map(|t| {
                    self.spp
                        .decode_pieces(t.as_slice())
                        .map_err(|e| MtError::Tokenizer(e.to_string()))
                })
                .collect()
        }
    }
}

/// Loader used when none is configured
///
/// Opens the SentencePiece model. Without the `sentencepiece` feature every
/// load fails, since real models cannot read whitespace-split words.
pub fn default_loader() -> TokenizerLoader {
    #[cfg(feature = "sentencepiece")]
    {
        Arc::new(|path: &Path| {
            let tokenizer = SentencePieceTokenizer::open(path)?;
            Ok(Arc::new(tokenizer) as Arc<dyn Tokenizer>)
        })
    }
    #[cfg(not(feature = "sentencepiece"))]
    {
        Arc::new(|path: &Path| {
            Err::<Arc<dyn Tokenizer>, _>(crate::error::MtError::Tokenizer(format!(
                "cannot load {}: built without the `sentencepiece` feature",
                path.display()
            )))
        })
    }
}

/// Loader ignoring the model file and returning a [`WhitespaceTokenizer`]
///
/// For tests and the mock engine.
pub fn whitespace_loader() -> TokenizerLoader {
    Arc::new(|_path: &Path| Ok(Arc::new(WhitespaceTokenizer) as Arc<dyn Tokenizer>))
}
