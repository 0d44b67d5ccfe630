//! Paced submission of documents to the creation endpoint.

use crate::{Admission, Document, Quota, RateLimiter, SubmitError};
use reqwest::StatusCode;
use std::sync::Arc;

/// Production endpoint for document creation.
pub const CREATE_DOCUMENT_URL: &str = "https://ismp.crpt.ru/api/v3/lk/documents/create";

/// What the endpoint answered for an accepted document.
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    /// Status code, always 200 or 201 on this path.
    pub status: StatusCode,
    /// Response body, verbatim.
    pub body: String,
}

/// Submits documents to a fixed HTTP endpoint, pacing every call through an
/// admission gate.
///
/// Only *admission* is throttled; once admitted, calls run concurrently. A
/// failed call is surfaced, not retried — a resubmission goes back through
/// the gate like any other call.
///
/// ```rust,no_run
/// use turnstile::{DocumentSubmitter, Document, Quota};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let submitter = DocumentSubmitter::builder()
///     .quota(Quota::per_second(3).unwrap())
///     .build()
///     .unwrap();
///
/// let document = Document { doc_id: "42".into(), ..Document::default() };
/// let receipt = submitter.submit(&document, "signature").await.unwrap();
/// println!("created: {}", receipt.status);
/// # });
/// ```
pub struct DocumentSubmitter {
    gate: Arc<dyn Admission>,
    http: reqwest::Client,
    endpoint: reqwest::Url,
}

impl std::fmt::Debug for DocumentSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSubmitter").field("endpoint", &self.endpoint.as_str()).finish()
    }
}

impl DocumentSubmitter {
    /// Construct a new builder.
    pub fn builder() -> DocumentSubmitterBuilder {
        DocumentSubmitterBuilder::new()
    }

    /// Submitter with the given quota against the production endpoint.
    pub fn new(quota: Quota) -> Result<Self, SubmitError> {
        Self::builder().quota(quota).build()
    }

    /// Inspect the configured endpoint.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Submit one document.
    ///
    /// Preconditions are checked before the gate, so a doomed request never
    /// consumes a permit: a blank `signature` or a document without a
    /// `doc_id` fails with [`SubmitError::InvalidArgument`] immediately.
    ///
    /// May suspend inside the gate while the quota is exhausted. Once
    /// admitted, performs exactly one `POST` with the JSON-encoded document
    /// and the `Signature` header. 200/201 yield a [`SubmitReceipt`]; any
    /// other status is [`SubmitError::Rejected`] with the body preserved.
    pub async fn submit(
        &self,
        document: &Document,
        signature: &str,
    ) -> Result<SubmitReceipt, SubmitError> {
        if signature.trim().is_empty() {
            return Err(SubmitError::InvalidArgument("signature must not be blank".into()));
        }
        if document.doc_id.trim().is_empty() {
            return Err(SubmitError::InvalidArgument(
                "document has no doc_id; nothing to submit".into(),
            ));
        }

        self.gate.acquire().await?;
        tracing::debug!(doc_id = %document.doc_id, "admitted, posting document");

        let response = self
            .http
            .post(self.endpoint.clone())
            .header("Signature", signature)
            .json(document)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if status == StatusCode::OK || status == StatusCode::CREATED {
            tracing::debug!(%status, doc_id = %document.doc_id, "document created");
            Ok(SubmitReceipt { status, body })
        } else {
            tracing::warn!(%status, doc_id = %document.doc_id, "endpoint rejected document");
            Err(SubmitError::Rejected { status, body })
        }
    }
}

/// Builder for [`DocumentSubmitter`].
///
/// A [`quota`](Self::quota) or a [`gate`](Self::gate) is required; endpoint
/// and HTTP client have production defaults.
pub struct DocumentSubmitterBuilder {
    quota: Option<Quota>,
    gate: Option<Arc<dyn Admission>>,
    endpoint: String,
    http: Option<reqwest::Client>,
}

impl DocumentSubmitterBuilder {
    fn new() -> Self {
        Self { quota: None, gate: None, endpoint: CREATE_DOCUMENT_URL.to_string(), http: None }
    }

    /// Pace submissions with a fresh limiter built from `quota`.
    pub fn quota(mut self, quota: Quota) -> Self {
        self.quota = Some(quota);
        self
    }

    /// Pace submissions through an existing gate, e.g. a [`RateLimiter`]
    /// shared with other submitters. Takes precedence over
    /// [`quota`](Self::quota).
    pub fn gate(mut self, gate: impl Admission + 'static) -> Self {
        self.gate = Some(Arc::new(gate));
        self
    }

    /// Override the endpoint URL (tests, staging).
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the HTTP client (timeouts, proxies, TLS config).
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Validate the configuration and build the submitter.
    pub fn build(self) -> Result<DocumentSubmitter, SubmitError> {
        let endpoint = self
            .endpoint
            .parse::<reqwest::Url>()
            .map_err(|e| SubmitError::Endpoint(format!("{}: {}", self.endpoint, e)))?;
        let gate: Arc<dyn Admission> = match (self.gate, self.quota) {
            (Some(gate), _) => gate,
            (None, Some(quota)) => Arc::new(RateLimiter::new(quota)),
            (None, None) => {
                return Err(SubmitError::InvalidArgument(
                    "a quota or an admission gate is required".into(),
                ));
            }
        };
        Ok(DocumentSubmitter { gate, http: self.http.unwrap_or_default(), endpoint })
    }
}
