//! WordPress REST publisher for self-hosted and WordPress.com sites.

use reqwest::header::{HeaderValue, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::connection::SiteConnection;
use super::terms::{resolve_term_ids, TermCache};
use super::types::{
    ConnectionStatus, MediaAsset, PermalinkMode, PostDraft, PostPayload, PublishWarning,
    PublishedPost, SiteMode, TagField, Term, TermKind, UploadedMedia, WpComPost, WpComSite,
    WpMedia, WpPost, WpTerm, WpUser,
};
use crate::config::WordPressConfig;
use crate::error::{Error, Result};
use crate::markdown;

const USERS_ME: &str = "/wp/v2/users/me";
const MEDIA: &str = "/wp/v2/media";
const POSTS: &str = "/wp/v2/posts";
const HOSTED_POSTS_NEW: &str = "/posts/new";

/// Default deadline for connection checks and reads
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);
/// Default deadline for uploads and post creation
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(30);

/// Publishing interface over both WordPress API variants
#[derive(Debug, Clone)]
pub struct WordPressPublisher {
    client: Client,
    connection: SiteConnection,
    read_timeout: Duration,
    write_timeout: Duration,
}

impl WordPressPublisher {
    pub fn new(connection: SiteConnection) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(READ_TIMEOUT)
            .user_agent(concat!("content-agent-rs/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            connection,
            read_timeout: READ_TIMEOUT,
            write_timeout: WRITE_TIMEOUT,
        })
    }

    pub fn from_config(config: &WordPressConfig) -> Result<Self> {
        let connection = SiteConnection::from_config(config)?;
        Ok(Self::new(connection)?.with_timeouts(
            Duration::from_secs(config.read_timeout_seconds),
            Duration::from_secs(config.write_timeout_seconds),
        ))
    }

    pub fn with_timeouts(mut self, read: Duration, write: Duration) -> Self {
        self.read_timeout = read;
        self.write_timeout = write;
        self
    }

    pub fn connection(&self) -> &SiteConnection {
        &self.connection
    }

    pub fn mode(&self) -> SiteMode {
        self.connection.mode()
    }

    pub fn permalink_mode(&self) -> PermalinkMode {
        self.connection.permalink_mode()
    }

    fn request(&self, method: Method, url: &str, timeout: Duration) -> RequestBuilder {
        self.client
            .request(method, url)
            .headers(self.connection.headers().clone())
            .timeout(timeout)
    }

    /// Verify credentials and, for self-hosted sites, detect the permalink mode.
    ///
    /// The detected mode is cached on the connection and drives every later
    /// self-hosted request.
    pub async fn test_connection(&mut self) -> Result<ConnectionStatus> {
        match self.connection.mode() {
            SiteMode::HostedCom => self.test_hosted_connection().await,
            SiteMode::SelfHosted => self.test_self_hosted_connection().await,
        }
    }

    async fn test_hosted_connection(&self) -> Result<ConnectionStatus> {
        let url = self.connection.resolve_endpoint("/");
        info!(url = %url, "Testing WordPress.com connection");

        let response = self.request(Method::GET, &url, self.read_timeout).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        match status {
            200 => {
                let site: WpComSite = serde_json::from_str(&body)?;
                let name = site.name.unwrap_or_else(|| "Unknown".to_string());
                info!(site = %name, "Connected to WordPress.com site");
                Ok(ConnectionStatus {
                    mode: SiteMode::HostedCom,
                    permalink_mode: PermalinkMode::Unknown,
                    message: format!("Connected to WordPress.com site: {}", name),
                })
            }
            403 => Err(Error::AccessDenied(
                "WordPress.com site is private or in Coming Soon mode. Please make your site public first."
                    .to_string(),
            )),
            _ => Err(Error::ApiError { status, body }),
        }
    }

    async fn test_self_hosted_connection(&mut self) -> Result<ConnectionStatus> {
        // 1回目: /wp-json 形式で試行
        let pretty_url = self.connection.pretty_endpoint(USERS_ME);
        info!(url = %pretty_url, "Checking REST API with pretty permalinks");

        let response = self.request(Method::GET, &pretty_url, self.read_timeout).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        match status {
            200 => return self.finish_detection(&body, PermalinkMode::Pretty),
            401 => return Err(auth_failure()),
            404 => debug!("Pretty permalink request returned 404, trying rest_route form"),
            _ => return Err(Error::ApiError { status, body }),
        }

        // 2回目: ?rest_route= 形式にフォールバック
        let fallback_url = self.connection.query_param_endpoint(USERS_ME);
        info!(url = %fallback_url, "Checking REST API with query parameter format");

        let response = self.request(Method::GET, &fallback_url, self.read_timeout).send().await?;
        let fallback_status = response.status().as_u16();
        let fallback_body = response.text().await?;

        match fallback_status {
            200 => self.finish_detection(&fallback_body, PermalinkMode::QueryParam),
            401 => Err(auth_failure()),
            _ => Err(Error::ApiError {
                status: fallback_status,
                body: format!(
                    "pretty permalink request returned 404 ({}); query parameter request returned {} ({}). \
                     Check if the REST API is enabled and credentials are correct.",
                    body.trim(),
                    fallback_status,
                    fallback_body.trim()
                ),
            }),
        }
    }

    fn finish_detection(&mut self, body: &str, mode: PermalinkMode) -> Result<ConnectionStatus> {
        let user: WpUser = serde_json::from_str(body)?;
        let name = user.name.unwrap_or_else(|| "Unknown".to_string());
        self.connection.set_permalink_mode(mode);

        info!(user = %name, permalink_mode = ?mode, "Connected to WordPress");

        let message = match mode {
            PermalinkMode::QueryParam => {
                format!("Connected as {} (using query parameter format)", name)
            }
            _ => format!("Connected as {}", name),
        };

        Ok(ConnectionStatus {
            mode: SiteMode::SelfHosted,
            permalink_mode: mode,
            message,
        })
    }

    /// Fetch the site's categories or tags as `{id, name}` pairs.
    ///
    /// WordPress.com is rejected with [`Error::Unsupported`].
    pub async fn fetch_terms(&self, kind: TermKind) -> Result<Vec<Term>> {
        if self.connection.mode() == SiteMode::HostedCom {
            return Err(Error::Unsupported(format!(
                "Fetching {} is not supported for WordPress.com",
                kind
            )));
        }

        let url = self
            .connection
            .resolve_endpoint(&format!("/wp/v2/{}", kind.as_str()));
        info!(url = %url, kind = %kind, "Fetching WordPress terms");

        let response = self
            .request(Method::GET, &url, self.read_timeout)
            .query(&[("per_page", "100")])
            .send()
            .await?;
        let (status, body) = read_response(response).await?;

        if status != 200 {
            return Err(Error::from_status(status, body));
        }

        let terms: Vec<WpTerm> = serde_json::from_str(&body)?;
        let terms: Vec<Term> = terms.into_iter().map(|t| Term::new(t.id, t.name)).collect();
        debug!(kind = %kind, count = terms.len(), "Fetched terms");
        Ok(terms)
    }

    /// Upload raw image bytes to the media library.
    ///
    /// The request carries the asset's MIME type and a `Content-Disposition`
    /// header; the shared JSON header set is left untouched.
    pub async fn upload_media(&self, asset: &MediaAsset) -> Result<UploadedMedia> {
        if self.connection.mode() == SiteMode::HostedCom {
            return Err(Error::Unsupported(
                "WordPress.com image upload is not supported. Try a self-hosted WordPress site."
                    .to_string(),
            ));
        }

        let mut headers = self.connection.headers().clone();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_str(&asset.mime_type)
                .map_err(|e| Error::Config(format!("Invalid MIME type: {}", e)))?,
        );
        headers.insert(
            CONTENT_DISPOSITION,
            HeaderValue::from_str(&content_disposition(&asset.filename))
                .map_err(|e| Error::Config(format!("Invalid file name: {}", e)))?,
        );

        let url = self.connection.resolve_endpoint(MEDIA);
        info!(
            url = %url,
            filename = %asset.filename,
            mime_type = %asset.mime_type,
            size = asset.bytes.len(),
            "Uploading media file"
        );

        let response = self
            .client
            .post(&url)
            .headers(headers)
            .timeout(self.write_timeout)
            .body(asset.bytes.clone())
            .send()
            .await?;
        let (status, body) = read_response(response).await?;

        if status != 201 {
            return Err(Error::from_status(status, body));
        }

        let media: WpMedia = serde_json::from_str(&body)?;
        info!(media_id = media.id, "Media uploaded");
        Ok(UploadedMedia {
            media_id: media.id,
            media_url: media.source_url,
        })
    }

    /// Build the post-creation body for this site's API variant.
    ///
    /// Self-hosted: term names are resolved to IDs against `terms`; a field
    /// with no resolved IDs is omitted. WordPress.com: tags go out as a
    /// comma-joined name list and categories are never sent.
    pub fn build_payload(
        &self,
        draft: &PostDraft,
        terms: &TermCache,
    ) -> (PostPayload, Vec<PublishWarning>) {
        let mut warnings = Vec::new();
        let mut payload = PostPayload {
            title: draft.title.clone(),
            content: markdown::to_html(&draft.markdown_body),
            status: draft.status,
            format: "standard".to_string(),
            featured_media: draft.featured_media_id,
            categories: None,
            tags: None,
        };

        match self.connection.mode() {
            SiteMode::HostedCom => {
                let tags: Vec<&str> = draft
                    .tag_names
                    .iter()
                    .map(|t| t.trim())
                    .filter(|t| !t.is_empty())
                    .collect();
                if !tags.is_empty() {
                    payload.tags = Some(TagField::Names(tags.join(",")));
                }
                if !draft.category_names.is_empty() {
                    warnings.push(PublishWarning::CategoriesUnsupported {
                        requested: draft.category_names.clone(),
                    });
                }
            }
            SiteMode::SelfHosted => {
                payload.categories = resolve_field(
                    TermKind::Categories,
                    &draft.category_names,
                    terms,
                    &mut warnings,
                );
                payload.tags = resolve_field(TermKind::Tags, &draft.tag_names, terms, &mut warnings)
                    .map(TagField::Ids);
            }
        }

        for warning in &warnings {
            warn!(warning = %warning, "Publish warning");
        }

        (payload, warnings)
    }

    /// Send a prepared payload to the post-creation endpoint
    pub async fn create_post(&self, payload: &PostPayload) -> Result<PublishedPost> {
        let (path, expected) = match self.connection.mode() {
            SiteMode::HostedCom => (HOSTED_POSTS_NEW, 200),
            SiteMode::SelfHosted => (POSTS, 201),
        };
        let url = self.connection.resolve_endpoint(path);
        info!(url = %url, status = %payload.status, "Creating WordPress post");

        let response = self
            .request(Method::POST, &url, self.write_timeout)
            .json(payload)
            .send()
            .await?;
        let (status, body) = read_response(response).await?;

        if status != expected {
            return Err(Error::from_status(status, body));
        }

        let (post_id, link) = match self.connection.mode() {
            SiteMode::HostedCom => {
                let post: WpComPost = serde_json::from_str(&body)?;
                (post.id, post.url)
            }
            SiteMode::SelfHosted => {
                let post: WpPost = serde_json::from_str(&body)?;
                (post.id, post.link)
            }
        };

        info!(post_id, url = %link, "Post created");
        Ok(PublishedPost {
            post_id,
            url: link,
            edit_url: self.connection.edit_url(post_id),
        })
    }
}

fn auth_failure() -> Error {
    Error::AuthFailure(
        "Authentication failed. Please check your username and application password.".to_string(),
    )
}

async fn read_response(response: Response) -> Result<(u16, String)> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    Ok((status, body))
}

fn content_disposition(filename: &str) -> String {
    let safe: String = filename
        .chars()
        .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

fn resolve_field(
    kind: TermKind,
    names: &[String],
    terms: &TermCache,
    warnings: &mut Vec<PublishWarning>,
) -> Option<Vec<u64>> {
    if names.is_empty() {
        return None;
    }

    let resolution = resolve_term_ids(names, terms.get(kind));
    if resolution.is_empty() {
        warnings.push(PublishWarning::NoTermsResolved {
            kind,
            requested: names.to_vec(),
        });
        return None;
    }

    if !resolution.unmatched.is_empty() {
        warnings.push(PublishWarning::UnresolvedTerms {
            kind,
            names: resolution.unmatched,
        });
    }

    Some(resolution.ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn self_hosted() -> WordPressPublisher {
        let conn = SiteConnection::configure("https://example.com", "admin", "app-pw").unwrap();
        WordPressPublisher::new(conn).unwrap()
    }

    fn hosted() -> WordPressPublisher {
        let conn = SiteConnection::configure("https://myblog.wordpress.com", "me", "tok").unwrap();
        WordPressPublisher::new(conn).unwrap()
    }

    fn cache() -> TermCache {
        TermCache {
            categories: vec![Term::new(3, "News"), Term::new(4, "Tech")],
            tags: vec![Term::new(10, "rust"), Term::new(11, "wasm")],
        }
    }

    #[test]
    fn test_self_hosted_payload_resolves_ids() {
        let draft = PostDraft::new("Hello", "# Hi\nBody")
            .with_categories(vec!["tech".into(), "Ghost".into()])
            .with_tags(vec!["Rust".into()])
            .with_featured_media(55);

        let (payload, warnings) = self_hosted().build_payload(&draft, &cache());

        assert_eq!(payload.categories, Some(vec![4]));
        assert_eq!(payload.tags, Some(TagField::Ids(vec![10])));
        assert_eq!(payload.featured_media, Some(55));
        assert!(payload.content.contains("<h1>Hi</h1>"));
        assert_eq!(
            warnings,
            vec![PublishWarning::UnresolvedTerms {
                kind: TermKind::Categories,
                names: vec!["Ghost".to_string()],
            }]
        );
    }

    #[test]
    fn test_self_hosted_payload_omits_unresolved_field() {
        let draft = PostDraft::new("Hello", "Body").with_tags(vec!["nothing".into()]);
        let (payload, warnings) = self_hosted().build_payload(&draft, &cache());

        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("tags").is_none());
        assert!(json.get("categories").is_none());
        assert!(matches!(
            warnings.as_slice(),
            [PublishWarning::NoTermsResolved { kind: TermKind::Tags, .. }]
        ));
    }

    #[test]
    fn test_hosted_payload_never_sends_categories() {
        let draft = PostDraft::new("Hello", "Body")
            .with_categories(vec!["Tech".into()])
            .with_tags(vec!["rust".into(), " web ".into()]);

        let (payload, warnings) = hosted().build_payload(&draft, &cache());
        let json = serde_json::to_value(&payload).unwrap();

        assert!(json.get("categories").is_none());
        assert_eq!(json["tags"], "rust,web");
        assert!(matches!(
            warnings.as_slice(),
            [PublishWarning::CategoriesUnsupported { .. }]
        ));
    }

    #[test]
    fn test_content_disposition_strips_quotes() {
        assert_eq!(
            content_disposition("my \"cover\".png"),
            "attachment; filename=\"my cover.png\""
        );
    }

    #[tokio::test]
    async fn test_hosted_rejects_terms_and_media() {
        let publisher = hosted();
        assert!(matches!(
            publisher.fetch_terms(TermKind::Categories).await,
            Err(Error::Unsupported(_))
        ));

        let asset = MediaAsset {
            bytes: vec![1, 2, 3],
            filename: "a.png".into(),
            mime_type: "image/png".into(),
        };
        assert!(matches!(
            publisher.upload_media(&asset).await,
            Err(Error::Unsupported(_))
        ));
    }
}
