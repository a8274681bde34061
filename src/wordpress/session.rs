//! Per-session publishing state: connection, term cache and publish log.

use tracing::{debug, info, warn};

use super::publisher::WordPressPublisher;
use super::terms::TermCache;
use super::types::{
    ConnectionStatus, MediaAsset, PostDraft, PublishResult, PublishWarning, SiteMode, Term,
    TermKind, UploadedMedia,
};
use crate::config::WordPressConfig;
use crate::error::{Error, Result};

/// Stage of a single publish attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStage {
    Idle,
    UploadingMedia,
    BuildingPayload,
    Posting,
    Success,
    Failed,
}

/// Successful connection test plus term-cache problems
#[derive(Debug, Clone)]
pub struct ConnectionReport {
    pub status: ConnectionStatus,
    pub warnings: Vec<PublishWarning>,
}

/// Everything a caller needs to report one publish attempt
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    /// The entry appended to the publish log
    pub result: PublishResult,
    /// Last stage reached
    pub stage: PublishStage,
    /// Featured image, when the upload succeeded
    pub media: Option<UploadedMedia>,
    pub warnings: Vec<PublishWarning>,
}

/// Session state owned by one operator
#[derive(Debug, Default)]
pub struct PublishSession {
    publisher: Option<WordPressPublisher>,
    terms: TermCache,
    history: Vec<PublishResult>,
}

impl PublishSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)configure the site. Resets the permalink mode and term cache.
    pub fn configure(&mut self, site_url: &str, username: &str, secret: &str) -> Result<SiteMode> {
        let connection = super::SiteConnection::configure(site_url, username, secret)?;
        self.install(WordPressPublisher::new(connection)?)
    }

    /// Configure from the `[wordpress]` config section
    pub fn configure_from(&mut self, config: &WordPressConfig) -> Result<SiteMode> {
        self.install(WordPressPublisher::from_config(config)?)
    }

    /// Use an already built publisher
    pub fn install(&mut self, publisher: WordPressPublisher) -> Result<SiteMode> {
        let mode = publisher.mode();
        info!(
            site = %publisher.connection().site_url(),
            mode = ?mode,
            "WordPress configured"
        );
        self.publisher = Some(publisher);
        self.terms.clear();
        Ok(mode)
    }

    pub fn is_configured(&self) -> bool {
        self.publisher.is_some()
    }

    pub fn publisher(&self) -> Result<&WordPressPublisher> {
        self.publisher.as_ref().ok_or(Error::NotConfigured)
    }

    pub fn terms(&self) -> &TermCache {
        &self.terms
    }

    /// Publish log, oldest first
    pub fn history(&self) -> &[PublishResult] {
        &self.history
    }

    /// Test the connection; on a self-hosted success the term cache is
    /// refreshed, with fetch failures reported as warnings.
    pub async fn test_connection(&mut self) -> Result<ConnectionReport> {
        let publisher = self.publisher.as_mut().ok_or(Error::NotConfigured)?;
        let status = publisher.test_connection().await?;

        let warnings = match status.mode {
            SiteMode::SelfHosted => self.refresh_terms().await,
            SiteMode::HostedCom => Vec::new(),
        };

        Ok(ConnectionReport { status, warnings })
    }

    /// Best-effort fetch of categories and tags into the cache
    pub async fn refresh_terms(&mut self) -> Vec<PublishWarning> {
        let mut warnings = Vec::new();
        let Some(publisher) = self.publisher.as_ref() else {
            return warnings;
        };

        let mut fetched: Vec<(TermKind, Vec<Term>)> = Vec::new();
        for kind in [TermKind::Categories, TermKind::Tags] {
            match publisher.fetch_terms(kind).await {
                Ok(terms) => {
                    info!(kind = %kind, count = terms.len(), "Cached terms");
                    fetched.push((kind, terms));
                }
                Err(e) => {
                    let warning = PublishWarning::TermFetchFailed {
                        kind,
                        error: e.to_string(),
                    };
                    warn!(warning = %warning, "Term fetch failed");
                    warnings.push(warning);
                    fetched.push((kind, Vec::new()));
                }
            }
        }

        for (kind, terms) in fetched {
            self.terms.set(kind, terms);
        }
        warnings
    }

    /// Run one publish attempt and append its result to the log.
    ///
    /// A failed featured-image upload is downgraded to a warning and the
    /// post is created without it. This never returns an error; failures
    /// land in `PublishOutcome::result`.
    pub async fn publish(&mut self, mut draft: PostDraft, media: Option<MediaAsset>) -> PublishOutcome {
        let mut warnings = Vec::new();
        let mut uploaded = None;
        let mut stage = PublishStage::Idle;

        let outcome = match self.publisher.as_ref() {
            None => Err(Error::NotConfigured),
            Some(publisher) => {
                if let Some(asset) = media {
                    stage = PublishStage::UploadingMedia;
                    debug!(stage = ?stage, filename = %asset.filename, "Publish stage");
                    match publisher.upload_media(&asset).await {
                        Ok(media) => {
                            draft.featured_media_id = Some(media.media_id);
                            uploaded = Some(media);
                        }
                        Err(e) => {
                            let warning = PublishWarning::MediaUploadFailed {
                                error: e.to_string(),
                            };
                            warn!(warning = %warning, "Continuing without featured image");
                            warnings.push(warning);
                        }
                    }
                }

                stage = PublishStage::BuildingPayload;
                debug!(stage = ?stage, "Publish stage");
                let (payload, payload_warnings) = publisher.build_payload(&draft, &self.terms);
                warnings.extend(payload_warnings);

                stage = PublishStage::Posting;
                debug!(stage = ?stage, "Publish stage");
                publisher.create_post(&payload).await
            }
        };

        let (result, stage) = match outcome {
            Ok(post) => (PublishResult::succeeded(&post), PublishStage::Success),
            Err(e) => {
                warn!(error = %e, kind = e.kind(), stage = ?stage, "Publish failed");
                (PublishResult::failed(&e), PublishStage::Failed)
            }
        };

        self.history.push(result.clone());
        PublishOutcome {
            result,
            stage,
            media: uploaded,
            warnings,
        }
    }
}
