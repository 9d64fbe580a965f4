//! Engine selection from configuration

use crate::error::{MtError, MtResult};
use ct2_bridge::{Engine, MockEngine, MockMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// The `ctranslate2` Python package
    #[default]
    Python,
    /// Deterministic echo engine, no models needed
    Mock,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Python => "python",
            EngineKind::Mock => "mock",
        }
    }

    pub fn build(&self) -> MtResult<Arc<dyn Engine>> {
        match self {
            EngineKind::Mock => Ok(Arc::new(MockEngine::new(MockMode::Echo))),
            #[cfg(feature = "python")]
            EngineKind::Python => Ok(Arc::new(ct2_bridge::PythonEngine::new())),
            #[cfg(not(feature = "python"))]
            EngineKind::Python => Err(MtError::Config(
                "built without the `python` feature; rebuild with --features python or use the mock engine"
                    .to_string(),
            )),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = MtError;

    fn from_str(s: &str) -> MtResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "python" => Ok(EngineKind::Python),
            "mock" => Ok(EngineKind::Mock),
            other => Err(MtError::Config(format!("unknown engine '{}'", other))),
        }
    }
}
