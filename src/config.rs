// ABOUTME: Tool settings loaded from a TOML file: which SSH config to read and which programs to run
// ABOUTME: Missing settings file falls back to defaults that mirror a stock OpenSSH setup

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    pub ssh: SshConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SshConfig {
    pub config_path: String,
    #[serde(default = "default_ssh_binary")]
    pub ssh_binary: String,
    #[serde(default = "default_scp_binary")]
    pub scp_binary: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct UiConfig {
    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_ssh_binary() -> String {
    "ssh".to_string()
}

fn default_scp_binary() -> String {
    "scp".to_string()
}

fn default_color() -> bool {
    true
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            color: default_color(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ssh: SshConfig {
                config_path: "~/.ssh/config".to_string(),
                ssh_binary: default_ssh_binary(),
                scp_binary: default_scp_binary(),
            },
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    pub fn default_config_content() -> &'static str {
        r#"# gt configuration

[ssh]
# SSH config file that host aliases are read from
config_path = "~/.ssh/config"
# Programs used for interactive sessions and file transfers
ssh_binary = "ssh"
scp_binary = "scp"

[ui]
# Colorize `gt list` output (NO_COLOR in the environment always disables it)
color = true
"#
    }

    pub fn load_from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse configuration")
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        Self::load_from_str(&content)
    }

    /// Loads an explicitly requested settings file, or the default location
    /// if it exists, or the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_file(path);
        }

        let default_path = Self::default_config_path()?;
        if default_path.exists() {
            tracing::debug!("Loading settings from {}", default_path.display());
            Self::load_from_file(&default_path)
        } else {
            tracing::debug!("No settings file at {}, using defaults", default_path.display());
            Ok(Self::default())
        }
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to determine config directory")?;
        Ok(config_dir.join("gt").join("config.toml"))
    }

    pub fn expand_path(&mut self) -> Result<()> {
        self.ssh.config_path = expand_tilde(&self.ssh.config_path)?;
        Ok(())
    }

    pub fn ssh_config_path(&self) -> PathBuf {
        PathBuf::from(&self.ssh.config_path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ssh.config_path.is_empty() {
            anyhow::bail!("SSH config path cannot be empty");
        }

        if self.ssh.ssh_binary.is_empty() {
            anyhow::bail!("ssh_binary cannot be empty");
        }

        if self.ssh.scp_binary.is_empty() {
            anyhow::bail!("scp_binary cannot be empty");
        }

        Ok(())
    }

    /// Logs a warning for each configured program that cannot be found.
    pub fn warn_missing_programs(&self) {
        for program in [&self.ssh.ssh_binary, &self.ssh.scp_binary] {
            if which::which(program).is_err() {
                tracing::warn!("Configured program '{program}' was not found");
            }
        }
    }
}

fn expand_tilde(path: &str) -> Result<String> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home.join(rest).to_string_lossy().into_owned())
    } else {
        Ok(path.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_minimal_config() {
        let config_str = r#"
[ssh]
config_path = "~/.ssh/config"
"#;

        let config = Config::load_from_str(config_str).unwrap();

        assert_eq!(config.ssh.config_path, "~/.ssh/config");
        assert_eq!(config.ssh.ssh_binary, "ssh"); // Default value
        assert_eq!(config.ssh.scp_binary, "scp"); // Default value
        assert!(config.ui.color);
    }

    #[test]
    fn test_parse_full_config() {
        let config_str = r#"
[ssh]
config_path = "/etc/ssh/ssh_config"
ssh_binary = "/usr/local/bin/ssh"
scp_binary = "/usr/local/bin/scp"

[ui]
color = false
"#;

        let config = Config::load_from_str(config_str).unwrap();

        assert_eq!(config.ssh.config_path, "/etc/ssh/ssh_config");
        assert_eq!(config.ssh.ssh_binary, "/usr/local/bin/ssh");
        assert_eq!(config.ssh.scp_binary, "/usr/local/bin/scp");
        assert!(!config.ui.color);
    }

    #[test]
    fn test_parse_invalid_config_missing_section() {
        let config_str = r#"
[ui]
color = true
"#;

        let result = Config::load_from_str(config_str);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Failed to parse configuration"));
    }

    #[test]
    fn test_parse_invalid_config_wrong_type() {
        let config_str = r#"
[ssh]
config_path = "~/.ssh/config"

[ui]
color = "yes"  # Should be boolean
"#;

        let result = Config::load_from_str(config_str);
        assert!(result.is_err());
    }

    #[test]
    fn test_expand_tilde() {
        let home = dirs::home_dir().unwrap();
        let home_str = home.to_string_lossy();

        assert_eq!(expand_tilde("~/test").unwrap(), format!("{}/test", home_str));
        assert_eq!(expand_tilde("/absolute/path").unwrap(), "/absolute/path");
        assert_eq!(expand_tilde("relative/path").unwrap(), "relative/path");
    }

    #[test]
    fn test_config_expand_paths() {
        let mut config = Config::default();
        config.expand_path().unwrap();

        let home = dirs::home_dir().unwrap();
        assert_eq!(config.ssh.config_path, home.join(".ssh/config").to_string_lossy());
        assert_eq!(config.ssh_config_path(), home.join(".ssh/config"));
        assert_eq!(config.ssh.ssh_binary, "ssh");
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path().unwrap();
        assert!(path.to_string_lossy().contains("gt"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_validate_empty_fields() {
        let mut config = Config::default();
        config.ssh.config_path = "".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("SSH config path"));

        let mut config = Config::default();
        config.ssh.ssh_binary = "".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("ssh_binary"));

        let mut config = Config::default();
        config.ssh.scp_binary = "".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("scp_binary"));
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_content_can_be_parsed() {
        let content = Config::default_config_content();
        let config = Config::load_from_str(content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_with_explicit_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, Config::default_config_content()).unwrap();

        let config = Config::load_or_default(Some(&path)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_or_default_missing_explicit_path_fails() {
        let temp_dir = TempDir::new().unwrap();
        let result = Config::load_or_default(Some(&temp_dir.path().join("missing.toml")));

        assert!(result.unwrap_err().to_string().contains("Failed to read configuration file"));
    }
}
