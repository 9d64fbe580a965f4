//! Options forwarded to the engine when loading a model and translating a batch

use crate::device::{ComputeType, Device};
use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Options used when constructing a translator
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatorOptions {
    pub device: Device,
    /// Device ordinals, empty means the engine default (device 0)
    pub device_index: Vec<i32>,
    pub compute_type: ComputeType,
    /// Number of batches translated in parallel
    pub inter_threads: usize,
    /// Threads used per batch, 0 lets the engine decide
    pub intra_threads: usize,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            device: Device::Cpu,
            device_index: Vec::new(),
            compute_type: ComputeType::Default,
            inter_threads: 1,
            intra_threads: 0,
        }
    }
}

impl TranslatorOptions {
    pub fn for_device(device: Device) -> Self {
        Self {
            device,
            ..Self::default()
        }
    }

    pub fn with_compute_type(mut self, compute_type: ComputeType) -> Self {
        self.compute_type = compute_type;
        self
    }

    pub fn with_threads(mut self, inter_threads: usize, intra_threads: usize) -> Self {
        self.inter_threads = inter_threads;
        self.intra_threads = intra_threads;
        self
    }
}

/// Unit used by `max_batch_size`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchType {
    #[default]
    Examples,
    Tokens,
}

impl BatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchType::Examples => "examples",
            BatchType::Tokens => "tokens",
        }
    }
}

impl FromStr for BatchType {
    type Err = BridgeError;

    fn from_str(s: &str) -> BridgeResult<Self> {
        match s {
            "examples" | "example" => Ok(BatchType::Examples),
            "tokens" | "token" => Ok(BatchType::Tokens),
            other => Err(BridgeError::InvalidOption(format!(
                "unknown batch type '{}'",
                other
            ))),
        }
    }
}

/// Decoding options for one `translate_batch` call
#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    pub beam_size: usize,
    pub num_hypotheses: usize,
    /// 0 translates the whole batch at once
    pub max_batch_size: usize,
    pub batch_type: BatchType,
    pub max_decoding_length: usize,
    pub return_scores: bool,
    /// Tokens forced at the start of each output, one list per input
    pub target_prefix: Option<Vec<Vec<String>>>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            beam_size: 2,
            num_hypotheses: 1,
            max_batch_size: 0,
            batch_type: BatchType::Examples,
            max_decoding_length: 256,
            return_scores: false,
            target_prefix: None,
        }
    }
}

impl BatchOptions {
    pub fn with_target_prefix(mut self, prefix: Vec<Vec<String>>) -> Self {
        self.target_prefix = Some(prefix);
        self
    }

    /// Reject values the engine would refuse for a batch of `batch_len` inputs
    pub fn validate(&self, batch_len: usize) -> BridgeResult<()> {
        if self.beam_size == 0 {
            return Err(BridgeError::InvalidOption("beam_size must be at least 1".to_string()));
        }
        if self.num_hypotheses == 0 || self.num_hypotheses > self.beam_size {
            return Err(BridgeError::InvalidOption(format!(
                "num_hypotheses must be between 1 and beam_size ({})",
                self.beam_size
            )));
        }
        if let Some(prefix) = &self.target_prefix {
            if prefix.len() != batch_len {
                return Err(BridgeError::InvalidOption(format!(
                    "target_prefix has {} entries for a batch of {}",
                    prefix.len(),
                    batch_len
                )));
            }
        }
        Ok(())
    }
}
