//! Site connection: mode detection, endpoint resolution and the fixed
//! request header set.

use base64::{engine::general_purpose, Engine as _};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use url::Url;

use super::types::{PermalinkMode, SiteMode};
use crate::config::WordPressConfig;
use crate::error::{Error, Result};

/// Domain token that marks a WordPress.com site
const HOSTED_DOMAIN_TOKEN: &str = "wordpress.com";

/// Default base of the WordPress.com REST API
pub const DEFAULT_HOSTED_API_BASE: &str = "https://public-api.wordpress.com/rest/v1.1/sites";

/// One configured WordPress site
#[derive(Debug, Clone)]
pub struct SiteConnection {
    site_url: String,
    mode: SiteMode,
    username: String,
    /// `{hosted base}/{domain}` for WordPress.com, unused otherwise
    api_base: Option<String>,
    permalink_mode: PermalinkMode,
    headers: HeaderMap,
}

impl SiteConnection {
    /// Configure a connection against the public WordPress.com API base
    pub fn configure(site_url: &str, username: &str, secret: &str) -> Result<Self> {
        Self::configure_with_hosted_base(site_url, username, secret, DEFAULT_HOSTED_API_BASE)
    }

    /// Configure a connection with an explicit WordPress.com API base
    pub fn configure_with_hosted_base(
        site_url: &str,
        username: &str,
        secret: &str,
        hosted_api_base: &str,
    ) -> Result<Self> {
        let url = parse_site_url(site_url)?;
        let site_url = normalize_site_url(&url);
        let mode = if site_url.to_lowercase().contains(HOSTED_DOMAIN_TOKEN) {
            SiteMode::HostedCom
        } else {
            SiteMode::SelfHosted
        };

        let authorization = match mode {
            SiteMode::HostedCom => format!("Bearer {}", secret),
            SiteMode::SelfHosted => format!(
                "Basic {}",
                general_purpose::STANDARD.encode(format!("{}:{}", username, secret))
            ),
        };
        let mut auth_value = HeaderValue::from_str(&authorization)
            .map_err(|e| Error::Config(format!("Invalid credentials for header: {}", e)))?;
        auth_value.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let api_base = match mode {
            SiteMode::HostedCom => {
                let domain = site_url
                    .split_once("://")
                    .map(|(_, rest)| rest)
                    .unwrap_or(&site_url);
                Some(format!("{}/{}", hosted_api_base.trim_end_matches('/'), domain))
            }
            SiteMode::SelfHosted => None,
        };

        Ok(Self {
            site_url,
            mode,
            username: username.to_string(),
            api_base,
            permalink_mode: PermalinkMode::Unknown,
            headers,
        })
    }

    /// Configure from the `[wordpress]` config section
    pub fn from_config(config: &WordPressConfig) -> Result<Self> {
        Self::configure_with_hosted_base(
            &config.url,
            &config.username,
            &config.password,
            &config.hosted_api_base,
        )
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub fn mode(&self) -> SiteMode {
        self.mode
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn permalink_mode(&self) -> PermalinkMode {
        self.permalink_mode
    }

    pub(crate) fn set_permalink_mode(&mut self, mode: PermalinkMode) {
        self.permalink_mode = mode;
    }

    /// Shared header set. Callers that need different headers clone it.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// WordPress.com API base, `None` for self-hosted sites
    pub fn api_base(&self) -> Option<&str> {
        self.api_base.as_deref()
    }

    /// Full URL for a REST path.
    ///
    /// WordPress.com: `{api_base}{path}`. Self-hosted: the query-parameter
    /// form once detected, the `/wp-json` form otherwise.
    pub fn resolve_endpoint(&self, path: &str) -> String {
        match (&self.api_base, self.permalink_mode) {
            (Some(base), _) => format!("{}{}", base, path),
            (None, PermalinkMode::QueryParam) => self.query_param_endpoint(path),
            (None, _) => self.pretty_endpoint(path),
        }
    }

    /// `{site}/wp-json{path}` regardless of the detected mode
    pub fn pretty_endpoint(&self, path: &str) -> String {
        format!("{}/wp-json{}", self.site_url, path)
    }

    /// `{site}/?rest_route={path}` regardless of the detected mode
    pub fn query_param_endpoint(&self, path: &str) -> String {
        format!("{}/?rest_route={}", self.site_url, path)
    }

    /// Admin edit screen for a post
    pub fn edit_url(&self, post_id: u64) -> String {
        format!(
            "{}/wp-admin/post.php?post={}&action=edit",
            self.site_url, post_id
        )
    }
}

fn parse_site_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Config("Site URL is empty".to_string()));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&with_scheme)
        .map_err(|e| Error::Config(format!("Invalid site URL '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(Error::Config(format!(
                "Unsupported URL scheme: {}. Use http:// or https://",
                other
            )))
        }
    }

    if url.host_str().is_none() {
        return Err(Error::Config("Site URL must contain a host".to_string()));
    }

    Ok(url)
}

/// Scheme + host (+ port, + install sub-path), no trailing slash
fn normalize_site_url(url: &Url) -> String {
    let origin = url.origin().ascii_serialization();
    let path = url.path().trim_end_matches('/');
    format!("{}{}", origin, path)
}
