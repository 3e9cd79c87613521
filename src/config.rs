use crate::error::{AppError, Result};
use crate::graph::types::ConflictBehavior;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

const CONFIG_DIR_PREFIX: &str = "form-workbook-provisioner";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    pub graph: GraphConfig,
    #[serde(default)]
    pub workbook: WorkbookConfig,
    #[serde(default)]
    pub form: FormConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct GraphConfig {
    pub tenant_id: String,
    pub client_id: String,
    pub client_secret: String,
}

impl GraphConfig {
    pub fn authority(&self) -> String {
        format!("https://login.microsoftonline.com/{}", self.tenant_id)
    }

    pub fn auth_url(&self) -> String {
        format!("{}/oauth2/v2.0/authorize", self.authority())
    }

    pub fn token_url(&self) -> String {
        format!("{}/oauth2/v2.0/token", self.authority())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WorkbookConfig {
    /// Name of the workbook file created in the app folder.
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// Worksheet holding the submissions table.
    #[serde(default = "default_worksheet")]
    pub worksheet: String,

    /// What to do when a file of the same name already exists.
    #[serde(default)]
    pub conflict_behavior: ConflictBehavior,
}

impl Default for WorkbookConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
            worksheet: default_worksheet(),
            conflict_behavior: ConflictBehavior::default(),
        }
    }
}

fn default_file_name() -> String {
    "Form submissions.xlsx".to_string()
}

fn default_worksheet() -> String {
    "Sheet1".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct FormConfig {
    /// Question labels, one table column each, in presentation order.
    #[serde(default)]
    pub questions: Vec<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file()?;

        if !config_path.exists() {
            return Err(AppError::Config(format!(
                "Config file not found at {:?}. Please create one.",
                config_path
            )));
        }

        let contents = fs::read_to_string(&config_path)?;
        let config: Config = toml::from_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {}", e)))?;

        if config.graph.tenant_id.is_empty()
            || config.graph.client_id.is_empty()
            || config.graph.client_secret.is_empty()
        {
            return Err(AppError::Config(
                "Graph tenant_id, client_id and client_secret must be set in config file"
                    .to_string(),
            ));
        }

        Ok(config)
    }

    fn xdg_dirs() -> xdg::BaseDirectories {
        xdg::BaseDirectories::with_prefix(CONFIG_DIR_PREFIX)
    }

    /// Get the config file path
    pub fn config_file() -> Result<PathBuf> {
        let xdg_dirs = Self::xdg_dirs();
        xdg_dirs
            .place_config_file("config.toml")
            .map_err(|e| AppError::Config(format!("Failed to create config directory: {}", e)))
    }

    /// Get the cache directory path
    pub fn cache_dir() -> Result<PathBuf> {
        let xdg = Self::xdg_dirs();
        xdg.get_cache_home()
            .ok_or_else(|| AppError::Config("Failed to determine cache directory".to_string()))
    }

    /// Get a cache file path
    pub fn cache_file(filename: &str) -> Result<PathBuf> {
        let xdg = Self::xdg_dirs();
        xdg.place_cache_file(filename)
            .map_err(|e| AppError::Config(format!("Failed to create cache file path: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = Config {
            graph: GraphConfig {
                tenant_id: "test_tenant".to_string(),
                client_id: "test_id".to_string(),
                client_secret: "test_secret".to_string(),
            },
            workbook: WorkbookConfig::default(),
            form: FormConfig {
                questions: vec!["What’s your name?".to_string()],
            },
        };

        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(config.graph.tenant_id, deserialized.graph.tenant_id);
        assert_eq!(config.form.questions, deserialized.form.questions);
    }

    #[test]
    fn test_workbook_defaults() {
        let toml_str = r#"
            [graph]
            tenant_id = "tenant"
            client_id = "client"
            client_secret = "secret"

            [form]
            questions = ["Q1", "Q2"]
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.workbook.file_name, "Form submissions.xlsx");
        assert_eq!(config.workbook.worksheet, "Sheet1");
        assert_eq!(config.workbook.conflict_behavior, ConflictBehavior::Rename);
    }

    #[test]
    fn test_authority_urls() {
        let config = GraphConfig {
            tenant_id: "abc123".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
        };
        assert_eq!(
            config.authority(),
            "https://login.microsoftonline.com/abc123"
        );
        assert_eq!(
            config.auth_url(),
            "https://login.microsoftonline.com/abc123/oauth2/v2.0/authorize"
        );
        assert_eq!(
            config.token_url(),
            "https://login.microsoftonline.com/abc123/oauth2/v2.0/token"
        );
    }
}
