//! Device selectors and numeric precision
//!
//! The engine receives the device as a plain string (`"cpu"`, `"cuda"`,
//! `"auto"`) and the compute type as one of its quantization names.

use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Compute resource the engine should run inference on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Cpu,
    Cuda,
    /// Let the engine pick (CUDA when available)
    Auto,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cpu => "cpu",
            Device::Cuda => "cuda",
            Device::Auto => "auto",
        }
    }

    pub fn is_cuda(&self) -> bool {
        matches!(self, Device::Cuda)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = BridgeError;

    fn from_str(s: &str) -> BridgeResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(Device::Cpu),
            "cuda" | "gpu" => Ok(Device::Cuda),
            "auto" => Ok(Device::Auto),
            other => Err(BridgeError::InvalidDevice(format!(
                "unknown device selector '{}'",
                other
            ))),
        }
    }
}

/// Weight and activation precision understood by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputeType {
    /// Whatever the converted model was saved with
    #[default]
    Default,
    Int8,
    Int8Float16,
    Float16,
    Float32,
}

impl ComputeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComputeType::Default => "default",
            ComputeType::Int8 => "int8",
            ComputeType::Int8Float16 => "int8_float16",
            ComputeType::Float16 => "float16",
            ComputeType::Float32 => "float32",
        }
    }
}

impl fmt::Display for ComputeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a model was converted: quantized for the device, or full precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    #[default]
    Compact,
    Normal,
}

impl ModelFormat {
    pub fn is_compressed(&self) -> bool {
        matches!(self, ModelFormat::Compact)
    }

    /// Precision matching this format on `device`
    ///
    /// `Auto` gets the int8 variant, which runs on both CPU and CUDA.
    pub fn compute_type(&self, device: Device) -> ComputeType {
        match (self, device) {
            (ModelFormat::Normal, _) => ComputeType::Default,
            (ModelFormat::Compact, Device::Cuda) => ComputeType::Float16,
            (ModelFormat::Compact, Device::Cpu | Device::Auto) => ComputeType::Int8,
        }
    }

    /// Quantization tag used in model identifiers, if any
    pub fn variant_tag(&self, device: Device) -> Option<&'static str> {
        match self.compute_type(device) {
            ComputeType::Int8 => Some("int8"),
            ComputeType::Float16 => Some("float16"),
            _ => None,
        }
    }
}

impl FromStr for ModelFormat {
    type Err = BridgeError;

    fn from_str(s: &str) -> BridgeResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(ModelFormat::Compact),
            "normal" => Ok(ModelFormat::Normal),
            other => Err(BridgeError::InvalidOption(format!(
                "unknown model format '{}'",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_parse_case_insensitive() {
        assert_eq!("CPU".parse::<Device>().unwrap(), Device::Cpu);
        assert_eq!(" cuda ".parse::<Device>().unwrap(), Device::Cuda);
        assert_eq!("gpu".parse::<Device>().unwrap(), Device::Cuda);
        assert_eq!("Auto".parse::<Device>().unwrap(), Device::Auto);
    }

    #[test]
    fn test_device_parse_unknown() {
        match "tpu".parse::<Device>() {
            Err(BridgeError::InvalidDevice(msg)) => assert!(msg.contains("tpu")),
            other => panic!("Expected InvalidDevice, got {:?}", other),
        }
    }

    #[test]
    fn test_device_display_round_trips_engine_strings() {
        assert_eq!(Device::Cpu.to_string(), "cpu");
        assert_eq!(Device::Cuda.to_string(), "cuda");
        assert!(Device::Cuda.is_cuda());
        assert!(!Device::Auto.is_cuda());
    }

    #[test]
    fn test_compact_format_depends_on_device() {
        assert_eq!(
            ModelFormat::Compact.compute_type(Device::Cpu),
            ComputeType::Int8
        );
        assert_eq!(
            ModelFormat::Compact.compute_type(Device::Cuda),
            ComputeType::Float16
        );
        assert_eq!(
            ModelFormat::Normal.compute_type(Device::Cuda),
            ComputeType::Default
        );
    }

    #[test]
    fn test_variant_tag() {
        assert_eq!(ModelFormat::Compact.variant_tag(Device::Cpu), Some("int8"));
        assert_eq!(
            ModelFormat::Compact.variant_tag(Device::Cuda),
            Some("float16")
        );
        assert_eq!(ModelFormat::Normal.variant_tag(Device::Cpu), None);
    }

    #[test]
    fn test_auto_device_uses_int8_variant() {
        assert_eq!(
            ModelFormat::Compact.compute_type(Device::Auto),
            ComputeType::Int8
        );
        assert_eq!(ModelFormat::Compact.variant_tag(Device::Auto), Some("int8"));
        assert_eq!(ModelFormat::Normal.variant_tag(Device::Auto), None);
    }

    #[test]
    fn test_compute_type_names() {
        assert_eq!(ComputeType::Int8Float16.as_str(), "int8_float16");
        assert_eq!(ComputeType::Default.to_string(), "default");
    }
}
