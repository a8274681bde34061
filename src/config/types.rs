use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::logging::LogConfig;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// WordPress connection, absent until configured
    #[serde(default)]
    pub wordpress: Option<WordPressConfig>,

    /// Text generation endpoint
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LogConfig,

    /// Output directories for exported artifacts
    #[serde(default)]
    pub output: OutputConfig,
}

/// WordPress connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordPressConfig {
    /// Site URL (self-hosted or `*.wordpress.com`)
    pub url: String,
    /// Unused for WordPress.com sites
    #[serde(default)]
    pub username: String,
    /// Application Password (self-hosted) or OAuth access token (WordPress.com)
    #[serde(default)]
    pub password: String,
    /// Base of the WordPress.com REST API; the site domain is appended
    #[serde(default = "default_hosted_api_base")]
    pub hosted_api_base: String,
    /// Timeout for connection checks and reads
    #[serde(default = "default_read_timeout")]
    pub read_timeout_seconds: u64,
    /// Timeout for uploads and post creation
    #[serde(default = "default_write_timeout")]
    pub write_timeout_seconds: u64,
    /// Post status used when the CLI does not specify one
    #[serde(default = "default_status")]
    pub default_status: String,
}

impl WordPressConfig {
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            hosted_api_base: default_hosted_api_base(),
            read_timeout_seconds: default_read_timeout(),
            write_timeout_seconds: default_write_timeout(),
            default_status: default_status(),
        }
    }
}

/// Text generation (Gemini) settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// API key; empty means generation is unavailable
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_generation_timeout")]
    pub timeout_seconds: u64,
    /// Image source used when no featured image file is supplied
    #[serde(default = "default_placeholder_image_url")]
    pub placeholder_image_url: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: default_model(),
            endpoint: default_endpoint(),
            timeout_seconds: default_generation_timeout(),
            placeholder_image_url: default_placeholder_image_url(),
        }
    }
}

/// Where exported files are written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_markdown_dir")]
    pub markdown_dir: PathBuf,
    #[serde(default = "default_website_dir")]
    pub website_dir: PathBuf,
    #[serde(default = "default_projects_dir")]
    pub projects_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            markdown_dir: default_markdown_dir(),
            website_dir: default_website_dir(),
            projects_dir: default_projects_dir(),
        }
    }
}

fn default_hosted_api_base() -> String {
    "https://public-api.wordpress.com/rest/v1.1/sites".to_string()
}

fn default_read_timeout() -> u64 {
    10
}

fn default_write_timeout() -> u64 {
    30
}

fn default_status() -> String {
    "draft".to_string()
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_generation_timeout() -> u64 {
    60
}

fn default_placeholder_image_url() -> String {
    "https://via.placeholder.com/600x400?text=AI+Generated+Image".to_string()
}

fn default_markdown_dir() -> PathBuf {
    PathBuf::from("generated_content")
}

fn default_website_dir() -> PathBuf {
    PathBuf::from("generated_website")
}

fn default_projects_dir() -> PathBuf {
    PathBuf::from("generated_projects")
}
