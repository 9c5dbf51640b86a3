//! Source catalog loading.
//!
//! The catalog maps each upstream feed name to its format, the hosts-line
//! token holding the domain, and the rule type its domains are emitted as.
//!
//! ```toml
//! [StevenBlack]
//! format = "hosts"
//! domain_index = 1
//! type = "domain"
//!
//! [oisd_big]
//! format = "dnsmasq"
//! type = "domain_suffix"
//! ```
//!
//! Files with a `.toml` extension are read as TOML, anything else as JSON
//! with the same shape.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use dnsbl_core::{RuleType, SourceDescriptor, SourceFormat};

use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct SourceEntry {
    format: SourceFormat,

    #[serde(default)]
    domain_index: usize,

    /// Kept as a string so an unknown value only disables its own source.
    #[serde(rename = "type", default)]
    rule_type: Option<String>,
}

/// All configured upstream feeds, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceCatalog {
    sources: BTreeMap<String, SourceDescriptor>,
}

impl SourceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a catalog file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let entries: BTreeMap<String, SourceEntry> = if is_toml {
            toml::from_str(&text).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            serde_json::from_str(&text).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?
        };

        if entries.is_empty() {
            return Err(ConfigError::Empty {
                path: path.to_path_buf(),
            });
        }

        let catalog = Self::from_entries(entries)?;
        log::info!("loaded {} source(s) from '{}'", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let entries: BTreeMap<String, SourceEntry> =
            toml::from_str(text).map_err(|source| ConfigError::Toml {
                path: "<inline>".into(),
                source,
            })?;
        Self::from_entries(entries)
    }

    fn from_entries(entries: BTreeMap<String, SourceEntry>) -> Result<Self, ConfigError> {
        let mut catalog = Self::new();
        for (name, entry) in entries {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptySourceName);
            }

            let rule_type = match entry.rule_type.as_deref() {
                Some(raw) => match raw.parse::<RuleType>() {
                    Ok(rule_type) => Some(rule_type),
                    Err(e) => {
                        log::warn!("source '{}': {}; its domains will be excluded", name, e);
                        None
                    }
                },
                None => {
                    log::warn!("source '{}' has no type; its domains will be excluded", name);
                    None
                }
            };

            catalog.insert(SourceDescriptor {
                name,
                format: entry.format,
                domain_index: entry.domain_index,
                rule_type,
            });
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, source: SourceDescriptor) {
        self.sources.insert(source.name.clone(), source);
    }

    pub fn get(&self, name: &str) -> Option<&SourceDescriptor> {
        self.sources.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SourceDescriptor> {
        self.sources.values()
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
