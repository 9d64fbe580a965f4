//! Known converted models and where to find them

use crate::error::{MtError, MtResult};
use crate::families::{ModelFamily, all_families};
use ct2_bridge::{Device, ModelFormat};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Subdirectory of the models root holding translator models
pub const TRANSLATORS_DIR: &str = "translators";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelEntry {
    pub id: String,
    /// Relative to the models root
    pub directory: PathBuf,
    /// Hugging Face repository, `None` for models that must be installed by hand
    pub repo: Option<String>,
    pub files: Vec<String>,
    pub version: String,
}

impl ModelEntry {
    pub fn for_family(family: &dyn ModelFamily, device: Device, format: ModelFormat) -> Self {
        let id = family.model_id(device, format);
        Self {
            directory: PathBuf::from(TRANSLATORS_DIR).join(&id),
            repo: family.hub_repo(device, format),
            files: family.files(),
            version: family.version().to_string(),
            id,
        }
    }

    pub fn is_downloadable(&self) -> bool {
        self.repo.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    entries: BTreeMap<String, ModelEntry>,
}

impl ModelRegistry {
    /// Every bundled family in full precision and in both compact variants
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        let variants = [
            (Device::Cpu, ModelFormat::Normal),
            (Device::Cpu, ModelFormat::Compact),
            (Device::Cuda, ModelFormat::Compact),
        ];
        for family in all_families() {
            for (device, format) in variants {
                registry.register(ModelEntry::for_family(family.as_ref(), device, format));
            }
        }
        registry
    }

    /// Add or replace an entry
    pub fn register(&mut self, entry: ModelEntry) {
        self.entries.insert(entry.id.clone(), entry);
    }

    pub fn get(&self, id: &str) -> Option<&ModelEntry> {
        self.entries.get(id)
    }

    /// Entry serving `family` on `device` in `format`
    pub fn entry_for(
        &self,
        family: &dyn ModelFamily,
        device: Device,
        format: ModelFormat,
    ) -> MtResult<&ModelEntry> {
        let id = family.model_id(device, format);
        self.get(&id)
            .ok_or_else(|| MtError::Config(format!("no registered model '{}'", id)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::families::{Nllb, NllbSize, Sugoi};

    #[test]
    fn test_builtin_entries() {
        let registry = ModelRegistry::builtin();
        // 10 family variants, 3 precisions each
        assert_eq!(registry.len(), 30);

        let entry = registry.get("m2m_100_418m_ct2_int8").unwrap();
        assert_eq!(
            entry.repo.as_deref(),
            Some("JustFrederik/m2m_100_418m_ct2_int8")
        );
        assert_eq!(
            entry.directory,
            PathBuf::from("translators/m2m_100_418m_ct2_int8")
        );
        assert!(entry.files.contains(&"spm.128k.model".to_string()));
    }

    #[test]
    fn test_jparacrawl_version_and_repo() {
        let registry = ModelRegistry::builtin();
        let entry = registry.get("jparacrawl-base-ct2-float16").unwrap();
        assert_eq!(entry.version, "3.0");
        assert_eq!(
            entry.repo.as_deref(),
            Some("JustFrederik/jparacrawl-v3-base-ct2-float16")
        );
    }

    #[test]
    fn test_nllb_is_local_only() {
        let registry = ModelRegistry::builtin();
        let entry = registry
            .entry_for(
                &Nllb::new(NllbSize::DistilledSmall600M),
                Device::Cpu,
                ModelFormat::Compact,
            )
            .unwrap();
        assert_eq!(entry.id, "nllb-200-distilled-600M-ct2-int8");
        assert!(!entry.is_downloadable());
    }

    #[test]
    fn test_auto_device_resolves_to_quantized_entry() {
        let registry = ModelRegistry::builtin();
        let entry = registry
            .entry_for(&Sugoi, Device::Auto, ModelFormat::Compact)
            .unwrap();
        assert_eq!(entry.id, "sugoi-v4-ja-en-ct2-int8");
    }

    #[test]
    fn test_entry_for_unknown_variant() {
        let registry = ModelRegistry::default();
        assert!(matches!(
            registry.entry_for(&Sugoi, Device::Cpu, ModelFormat::Normal),
            Err(MtError::Config(_))
        ));
    }
}
