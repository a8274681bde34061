//! Data types shared by the WordPress publisher and the session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

/// Which REST API surface the site exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteMode {
    /// Self-administered installation (`/wp-json/wp/v2/...`)
    SelfHosted,
    /// WordPress.com (`public-api.wordpress.com/rest/v1.1/sites/{domain}`)
    HostedCom,
}

/// How a self-hosted site exposes its REST routes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PermalinkMode {
    /// Not detected yet
    #[default]
    Unknown,
    /// `{site}/wp-json{path}`
    Pretty,
    /// `{site}/?rest_route={path}`
    QueryParam,
}

/// Category or tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub id: u64,
    pub name: String,
}

impl Term {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Taxonomy a term belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TermKind {
    Categories,
    Tags,
}

impl TermKind {
    /// REST collection name (`/wp/v2/{kind}`)
    pub fn as_str(&self) -> &'static str {
        match self {
            TermKind::Categories => "categories",
            TermKind::Tags => "tags",
        }
    }
}

impl fmt::Display for TermKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TermKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "categories" | "category" => Ok(TermKind::Categories),
            "tags" | "tag" => Ok(TermKind::Tags),
            other => Err(Error::Config(format!("unknown term kind: {other}"))),
        }
    }
}

/// Post status accepted by both API variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Publish,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Publish => "publish",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "draft" => Ok(PostStatus::Draft),
            "publish" | "published" => Ok(PostStatus::Publish),
            other => Err(Error::Config(format!("unknown post status: {other}"))),
        }
    }
}

/// Outcome of a successful connection test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionStatus {
    pub mode: SiteMode,
    /// Detected permalink mode; always `Unknown` for WordPress.com
    pub permalink_mode: PermalinkMode,
    pub message: String,
}

/// Media library entry created by an upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub media_id: u64,
    pub media_url: String,
}

/// Post as reported back by WordPress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub post_id: u64,
    pub url: String,
    pub edit_url: String,
}

/// A post to be created
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: String,
    pub markdown_body: String,
    pub status: PostStatus,
    pub category_names: Vec<String>,
    pub tag_names: Vec<String>,
    pub featured_media_id: Option<u64>,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, markdown_body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            markdown_body: markdown_body.into(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_categories(mut self, names: Vec<String>) -> Self {
        self.category_names = names;
        self
    }

    pub fn with_tags(mut self, names: Vec<String>) -> Self {
        self.tag_names = names;
        self
    }

    pub fn with_featured_media(mut self, media_id: u64) -> Self {
        self.featured_media_id = Some(media_id);
        self
    }
}

/// `tags` is a list of IDs on self-hosted sites and a comma-joined name
/// list on WordPress.com.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TagField {
    Ids(Vec<u64>),
    Names(String),
}

/// JSON body sent to the post-creation endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostPayload {
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_media: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagField>,
}

/// Non-fatal problem noticed while publishing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishWarning {
    /// Some requested term names had no match in the cached terms
    UnresolvedTerms { kind: TermKind, names: Vec<String> },
    /// None of the requested names resolved, the field was omitted
    NoTermsResolved { kind: TermKind, requested: Vec<String> },
    /// WordPress.com posts are created without categories
    CategoriesUnsupported { requested: Vec<String> },
    /// Term list could not be fetched; cache left empty
    TermFetchFailed { kind: TermKind, error: String },
    /// Featured image upload failed, post created without it
    MediaUploadFailed { error: String },
}

impl fmt::Display for PublishWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishWarning::UnresolvedTerms { kind, names } => {
                write!(f, "{} not found on the site: {}", kind, names.join(", "))
            }
            PublishWarning::NoTermsResolved { kind, requested } => write!(
                f,
                "None of the specified {} ({}) were found; post is sent without {}",
                kind,
                requested.join(", "),
                kind
            ),
            PublishWarning::CategoriesUnsupported { requested } => write!(
                f,
                "Categories are not supported for WordPress.com; ignored: {}",
                requested.join(", ")
            ),
            PublishWarning::TermFetchFailed { kind, error } => {
                write!(f, "Failed to fetch {}: {}", kind, error)
            }
            PublishWarning::MediaUploadFailed { error } => write!(
                f,
                "Featured image upload failed ({}); publishing without featured image",
                error
            ),
        }
    }
}

/// One entry of the publish log
#[derive(Debug, Clone, Serialize)]
pub struct PublishResult {
    pub id: Uuid,
    pub platform: String,
    pub success: bool,
    pub post_id: Option<u64>,
    pub url: Option<String>,
    pub edit_url: Option<String>,
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl PublishResult {
    pub const PLATFORM: &'static str = "WordPress";

    pub fn succeeded(post: &PublishedPost) -> Self {
        Self {
            id: Uuid::new_v4(),
            platform: Self::PLATFORM.to_string(),
            success: true,
            post_id: Some(post.post_id),
            url: Some(post.url.clone()),
            edit_url: Some(post.edit_url.clone()),
            error: None,
            timestamp: Utc::now(),
        }
    }

    pub fn failed(error: &Error) -> Self {
        Self {
            id: Uuid::new_v4(),
            platform: Self::PLATFORM.to_string(),
            success: false,
            post_id: None,
            url: None,
            edit_url: None,
            error: Some(error.to_string()),
            timestamp: Utc::now(),
        }
    }
}

/// Transient image to be uploaded as featured media
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaAsset {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub mime_type: String,
}

// ---- wire formats ----

/// `GET /wp/v2/users/me`
#[derive(Debug, Deserialize)]
pub(crate) struct WpUser {
    #[serde(default)]
    pub name: Option<String>,
}

/// `GET {hosted base}/`
#[derive(Debug, Deserialize)]
pub(crate) struct WpComSite {
    #[serde(default)]
    pub name: Option<String>,
}

/// Item of `GET /wp/v2/categories` and `/wp/v2/tags`
#[derive(Debug, Deserialize)]
pub(crate) struct WpTerm {
    pub id: u64,
    pub name: String,
}

/// `POST /wp/v2/media`
#[derive(Debug, Deserialize)]
pub(crate) struct WpMedia {
    pub id: u64,
    #[serde(default)]
    pub source_url: String,
}

/// `POST /wp/v2/posts`
#[derive(Debug, Deserialize)]
pub(crate) struct WpPost {
    pub id: u64,
    pub link: String,
}

/// `POST {hosted base}/posts/new`
#[derive(Debug, Deserialize)]
pub(crate) struct WpComPost {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "URL")]
    pub url: String,
}
