use crate::filter::PersonFilter;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A validation error in the configuration
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]: {}", self.field, self.message)
    }
}

/// How amounts and tables are rendered
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DisplayConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_page_size() -> usize {
    20
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            page_size: default_page_size(),
        }
    }
}

/// Where records come from
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DataConfig {
    /// JSON data file; built-in fixtures when unset
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Audit log settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuditConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: None,
        }
    }
}

impl AuditConfig {
    /// Configured directory, or `.backoffice/audit` under `root`
    pub fn dir_under(&self, root: &Path) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| root.join(".backoffice").join("audit"))
    }
}

/// A saved person filter, e.g. `[views.premium-active]`
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
pub struct ViewPreset {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default, alias = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tier: Option<String>,
    #[serde(default)]
    pub last_active: Option<String>,
}

impl ViewPreset {
    /// Build the filter this preset describes
    pub fn to_filter(&self) -> Result<PersonFilter> {
        let mut filter = PersonFilter::new();
        let facets = [
            ("search", &self.search),
            ("type", &self.kind),
            ("status", &self.status),
            ("tier", &self.tier),
            ("last_active", &self.last_active),
        ];
        for (facet, value) in facets {
            if let Some(value) = value {
                filter.set(facet, value)?;
            }
        }
        Ok(filter)
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub audit: AuditConfig,
    #[serde(default)]
    pub views: BTreeMap<String, ViewPreset>,
    /// Files that were merged into this config, in load order
    #[serde(skip)]
    pub sources: Vec<PathBuf>,
}

impl Config {
    /// Load configuration from default paths
    /// Priority: local (.backoffice/config.local.toml) > project (.backoffice/config.toml)
    /// > user (~/.backoffice/config.toml)
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".backoffice").join("config.toml");
            if user_config.exists() {
                let user = Self::load_from(&user_config)?;
                config.merge(user);
            }
        }

        let project_config = Path::new(".backoffice").join("config.toml");
        if project_config.exists() {
            let project = Self::load_from(&project_config)?;
            config.merge(project);
        }

        // Should be gitignored
        let local_config = Path::new(".backoffice").join("config.local.toml");
        if local_config.exists() {
            let local = Self::load_from(&local_config)?;
            config.merge(local);
        }

        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.sources.push(path.to_path_buf());
        Ok(config)
    }

    /// Merge another config into this one (other takes priority)
    pub fn merge(&mut self, other: Config) {
        // Scalars override only when the later layer moved off the default
        if other.display.currency != default_currency() {
            self.display.currency = other.display.currency;
        }
        if other.display.page_size != default_page_size() {
            self.display.page_size = other.display.page_size;
        }
        if !other.audit.enabled {
            self.audit.enabled = false;
        }
        if other.audit.dir.is_some() {
            self.audit.dir = other.audit.dir;
        }

        if other.data.file.is_some() {
            self.data.file = other.data.file;
        }

        for (name, preset) in other.views {
            self.views.insert(name, preset);
        }

        self.sources.extend(other.sources);
    }

    /// Validate configuration and return any errors found
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let glyph_len = self.display.currency.chars().count();
        if glyph_len == 0 || glyph_len > 3 {
            errors.push(ValidationError {
                field: "display.currency".to_string(),
                message: format!(
                    "Expected a 1-3 character currency glyph, got '{}'",
                    self.display.currency
                ),
            });
        }

        if self.display.page_size == 0 {
            errors.push(ValidationError {
                field: "display.page_size".to_string(),
                message: "Must be greater than 0".to_string(),
            });
        }

        for (name, preset) in &self.views {
            if name.trim().is_empty() {
                errors.push(ValidationError {
                    field: "views".to_string(),
                    message: "View name must not be empty".to_string(),
                });
            }
            if let Err(e) = preset.to_filter() {
                errors.push(ValidationError {
                    field: format!("views.{}", name),
                    message: e.to_string(),
                });
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Facet;
    use crate::records::{Status, Tier};

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.display.currency, "$");
        assert_eq!(config.display.page_size, 20);
        assert!(config.audit.enabled);
        assert!(config.validate().is_ok());
        assert_eq!(
            config.audit.dir_under(Path::new("/srv")),
            Path::new("/srv/.backoffice/audit")
        );
    }

    #[test]
    fn test_load_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[display]
currency = "₦"

[data]
file = "people.json"

[views.premium-active]
status = "active"
tier = "premium"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.display.currency, "₦");
        assert_eq!(config.display.page_size, 20);
        assert_eq!(config.data.file, Some(PathBuf::from("people.json")));
        assert_eq!(config.sources, vec![path]);

        let filter = config.views["premium-active"].to_filter().unwrap();
        assert_eq!(filter.status, Facet::Only(Status::Active));
        assert_eq!(filter.tier, Facet::Only(Tier::Premium));
        assert!(filter.last_active.is_all());
    }

    #[test]
    fn test_merge_later_layer_wins() {
        let mut base: Config = toml::from_str(
            r#"
[data]
file = "base.json"

[views.a]
status = "active"
[views.b]
tier = "premium"
"#,
        )
        .unwrap();
        let other: Config = toml::from_str(
            r#"
[display]
currency = "€"

[views.b]
tier = "non-premium"
"#,
        )
        .unwrap();

        base.merge(other);
        assert_eq!(base.display.currency, "€");
        assert_eq!(base.data.file, Some(PathBuf::from("base.json")));
        assert_eq!(base.views.len(), 2);
        assert_eq!(base.views["b"].tier.as_deref(), Some("non-premium"));
    }

    #[test]
    fn test_validate_bad_view() {
        let mut config = Config::default();
        config.views.insert(
            "broken".to_string(),
            ViewPreset {
                status: Some("sleeping".to_string()),
                ..Default::default()
            },
        );
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "views.broken");
        assert!(errors[0].message.contains("sleeping"));
    }

    #[test]
    fn test_validate_currency_and_page_size() {
        let mut config = Config::default();
        config.display.currency = String::new();
        config.display.page_size = 0;
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].field.contains("currency"));
        assert!(errors[1].message.contains("greater than 0"));
    }
}
