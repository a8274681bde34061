use super::types::{AppConfig, WordPressConfig};
use anyhow::{Context, Result};
use config::{Config, Environment, File};

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    config_file: Option<String>,
    load_env: bool,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self {
            config_file: None,
            load_env: false,
        }
    }

    /// Load configuration from file
    pub fn load_from_file(mut self, path: Option<&str>) -> Self {
        self.config_file = path.map(String::from);
        self
    }

    /// Load configuration from environment variables
    pub fn load_from_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> Result<AppConfig> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        if let Some(config_path) = &self.config_file {
            // 明示的に指定されたファイルは必須
            builder = builder.add_source(File::with_name(config_path).required(true));
        } else {
            builder = builder
                .add_source(File::with_name("content-agent").required(false))
                .add_source(File::with_name("config/content-agent").required(false));
        }

        if self.load_env {
            builder = builder.add_source(
                Environment::with_prefix("CONTENT_AGENT")
                    .prefix_separator("_")
                    .separator("__"),
            );
        }

        let mut config: AppConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        if self.load_env {
            apply_legacy_env(&mut config, |key| std::env::var(key).ok());
        }

        Ok(config)
    }

    /// Render a sample configuration file
    pub fn sample_config() -> Result<String> {
        let sample = AppConfig {
            wordpress: Some(WordPressConfig::new(
                "https://your-wordpress-site.com",
                "your_username",
                "your_application_password",
            )),
            ..AppConfig::default()
        };

        let body = toml::to_string_pretty(&sample).context("Failed to render sample config")?;

        Ok(format!(
            r#"# content-agent configuration
#
# Save as content-agent.toml. Every key can be overridden from the
# environment, e.g. CONTENT_AGENT_WORDPRESS__URL=https://example.com
# WORDPRESS_URL / WORDPRESS_USERNAME / WORDPRESS_PASSWORD / GEMINI_API_KEY
# are honoured as well.
#
# [wordpress]
#   password: Application Password for self-hosted sites,
#             OAuth access token for *.wordpress.com sites

{}"#,
            body
        ))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// 後方互換性のための環境変数上書き
fn apply_legacy_env(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup("WORDPRESS_URL") {
        let wordpress = config
            .wordpress
            .get_or_insert_with(|| WordPressConfig::new(url.clone(), "", ""));
        wordpress.url = url;
    }

    if let Some(wordpress) = config.wordpress.as_mut() {
        if let Some(username) = lookup("WORDPRESS_USERNAME") {
            wordpress.username = username;
        }
        if let Some(password) = lookup("WORDPRESS_PASSWORD") {
            wordpress.password = password;
        }
    }

    if let Some(api_key) = lookup("GEMINI_API_KEY") {
        config.generator.api_key = api_key;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_without_sources() {
        let config = ConfigLoader::new()
            .load_from_file(None)
            .build()
            .expect("default config");

        assert!(config.wordpress.is_none());
        assert_eq!(config.generator.model, "gemini-2.0-flash");
        assert_eq!(config.output.markdown_dir.to_str(), Some("generated_content"));
    }

    #[test]
    fn test_legacy_env_creates_wordpress_section() {
        let vars: HashMap<&str, &str> = [
            ("WORDPRESS_URL", "https://example.com"),
            ("WORDPRESS_USERNAME", "admin"),
            ("WORDPRESS_PASSWORD", "app-pw"),
            ("GEMINI_API_KEY", "key-123"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        apply_legacy_env(&mut config, |k| vars.get(k).map(|v| v.to_string()));

        let wordpress = config.wordpress.expect("wordpress section");
        assert_eq!(wordpress.url, "https://example.com");
        assert_eq!(wordpress.username, "admin");
        assert_eq!(wordpress.password, "app-pw");
        assert_eq!(wordpress.read_timeout_seconds, 10);
        assert_eq!(wordpress.write_timeout_seconds, 30);
        assert_eq!(config.generator.api_key, "key-123");
    }

    #[test]
    fn test_file_source_overrides_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("agent.toml");
        std::fs::write(
            &path,
            r#"
[wordpress]
url = "https://blog.example.org"
username = "editor"
password = "secret"
read_timeout_seconds = 5

[generator]
model = "gemini-1.5-pro"
"#,
        )
        .expect("write config");

        let config = ConfigLoader::new()
            .load_from_file(path.to_str())
            .build()
            .expect("config from file");

        let wordpress = config.wordpress.expect("wordpress section");
        assert_eq!(wordpress.url, "https://blog.example.org");
        assert_eq!(wordpress.read_timeout_seconds, 5);
        assert_eq!(wordpress.write_timeout_seconds, 30);
        assert_eq!(
            wordpress.hosted_api_base,
            "https://public-api.wordpress.com/rest/v1.1/sites"
        );
        assert_eq!(config.generator.model, "gemini-1.5-pro");
    }

    #[test]
    fn test_sample_config_parses_back() {
        let sample = ConfigLoader::sample_config().expect("sample");
        let parsed: AppConfig = toml::from_str(&sample).expect("sample is valid toml");
        assert_eq!(
            parsed.wordpress.map(|w| w.url),
            Some("https://your-wordpress-site.com".to_string())
        );
    }
}
