use std::fmt;
use std::time::Duration;

use reqwest::header::{HeaderValue, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Method, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::{parse_error_payload, parse_retry_after, Result, TranscriptError};
use crate::models::{
    BatchRequest, BatchResponse, JobOptions, PollOptions, TranscriptionRequest,
    TranscriptionResponse,
};

const DEFAULT_BASE_URL: &str = "https://api.vidtranscript.dev/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);
const API_KEY_ENV: &str = "VIDTRANSCRIPT_API_KEY";
const CLIENT_HEADER: &str = "x-client";
const CLIENT_ID: &str = concat!("vidtranscript-rust/", env!("CARGO_PKG_VERSION"));

/// Builder for constructing a [`Client`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// use vidtranscript::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> vidtranscript::Result<()> {
/// let client = ClientBuilder::new()
///     .api_key("vt_live_abc123")
///     .base_url("https://custom.example.com/v1/")
///     .timeout(Duration::from_secs(60))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    api_key: Option<SecretString>,
    base_url: String,
    timeout: Duration,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the API key for authentication.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(SecretString::from(key.into()));
        self
    }

    /// Override the base URL (defaults to `https://api.vidtranscript.dev/v1`).
    /// Trailing slashes are stripped.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-request timeout (defaults to 30 seconds).
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = d;
        self
    }

    /// Same as [`timeout`](Self::timeout), in milliseconds.
    pub fn timeout_ms(self, ms: u64) -> Self {
        self.timeout(Duration::from_millis(ms))
    }

    /// Build the [`Client`].
    ///
    /// If no API key was set via [`api_key`](Self::api_key), the builder will
    /// attempt to read the `VIDTRANSCRIPT_API_KEY` environment variable.
    ///
    /// Returns [`TranscriptError::Config`] if no usable key is available.
    pub fn build(self) -> Result<Client> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var(API_KEY_ENV).ok().map(SecretString::from))
            .ok_or_else(|| {
                TranscriptError::Config(format!(
                    "API key is required. Pass it to ClientBuilder::api_key() \
                     or set the {API_KEY_ENV} environment variable."
                ))
            })?;

        if api_key.expose_secret().trim().is_empty() {
            return Err(TranscriptError::Config("API key must not be empty".into()));
        }
        HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret())).map_err(|_| {
            TranscriptError::Config("API key contains characters not allowed in a header".into())
        })?;

        let base_url = self.base_url.trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url)
            .map_err(|e| TranscriptError::Config(format!("invalid base URL: {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(TranscriptError::Config(format!(
                "base URL {base_url} cannot carry a path"
            )));
        }

        let http = reqwest::Client::builder()
            .build()
            .map_err(TranscriptError::Http)?;

        Ok(Client {
            base_url,
            api_key,
            http,
            timeout: self.timeout,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The VidTranscript API client.
///
/// Use [`Client::new`] for quick construction or [`ClientBuilder`] for full control.
/// Cloning is cheap and clones share the underlying connection pool.
///
/// # Example
///
/// ```no_run
/// use vidtranscript::Client;
///
/// # async fn example() -> vidtranscript::Result<()> {
/// let client = Client::new("vt_live_abc123")?;
///
/// let resp = client.get_transcript("dQw4w9WgXcQ", Some("en")).await?;
/// if let Some(text) = resp.transcript() {
///     println!("{text}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    base_url: String,
    api_key: SecretString,
    http: reqwest::Client,
    timeout: Duration,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a new client with the given API key and default settings.
    ///
    /// For customization, use [`ClientBuilder`] instead.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().api_key(api_key).build()
    }

    /// The base URL requests are sent to, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The timeout applied to each individual request.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Request a transcript.
    ///
    /// The response may already be `completed`, or carry a `job_id` to poll
    /// with [`get_job`](Self::get_job) / [`wait_for_job`](Self::wait_for_job).
    ///
    /// # Errors
    ///
    /// - [`TranscriptError::NoCaptions`] if the video has no captions in the requested language.
    /// - [`TranscriptError::InsufficientCredits`] if the account is out of credits.
    /// - [`TranscriptError::Timeout`] if the server does not answer within the client timeout.
    pub async fn transcribe(&self, request: &TranscriptionRequest) -> Result<TranscriptionResponse> {
        self.request(Method::POST, &["transcribe"], &[], Some(request))
            .await
    }

    /// Shorthand for [`transcribe`](Self::transcribe) with only a video and optional language.
    pub async fn get_transcript(
        &self,
        video: &str,
        language: Option<&str>,
    ) -> Result<TranscriptionResponse> {
        let mut request = TranscriptionRequest::new(video);
        request.language = language.map(str::to_string);
        self.transcribe(&request).await
    }

    /// Submit several videos at once. The list is sent as-is; the server
    /// rejects batches over its size limit.
    pub async fn batch(&self, request: &BatchRequest) -> Result<BatchResponse> {
        self.request(Method::POST, &["batch"], &[], Some(request)).await
    }

    /// Fetch the current state of an asynchronous job.
    pub async fn get_job(
        &self,
        job_id: &str,
        options: Option<&JobOptions>,
    ) -> Result<TranscriptionResponse> {
        let query = options.map(JobOptions::query_pairs).unwrap_or_default();
        self.request::<_, ()>(Method::GET, &["jobs", job_id], &query, None)
            .await
    }

    /// Fetch the current state of a batch.
    pub async fn get_batch(&self, batch_id: &str) -> Result<BatchResponse> {
        self.request::<_, ()>(Method::GET, &["batch", batch_id], &[], None)
            .await
    }

    /// Poll a job until it is `completed` or `failed`.
    ///
    /// A failed job is returned as `Ok`; check [`TranscriptionResponse::status`].
    ///
    /// # Errors
    ///
    /// - [`TranscriptError::PollTimeout`] after `max_attempts` non-terminal polls.
    /// - Any error from [`get_job`](Self::get_job), returned immediately.
    pub async fn wait_for_job(
        &self,
        job_id: &str,
        opts: Option<PollOptions>,
    ) -> Result<TranscriptionResponse> {
        self.wait_for_job_with(job_id, &JobOptions::default(), opts)
            .await
    }

    /// Like [`wait_for_job`](Self::wait_for_job), passing `options` on every poll.
    pub async fn wait_for_job_with(
        &self,
        job_id: &str,
        options: &JobOptions,
        opts: Option<PollOptions>,
    ) -> Result<TranscriptionResponse> {
        let opts = opts.unwrap_or_default();

        for attempt in 1..=opts.max_attempts {
            let job = self.get_job(job_id, Some(options)).await?;
            debug!(job_id, attempt, status = ?job.status, "polled job");

            if job.status.is_terminal() {
                return Ok(job);
            }
            if attempt < opts.max_attempts {
                tokio::time::sleep(opts.interval).await;
            }
        }

        warn!(job_id, attempts = opts.max_attempts, "job did not finish");
        Err(TranscriptError::PollTimeout {
            resource: "job",
            id: job_id.to_string(),
            attempts: opts.max_attempts,
        })
    }

    /// Poll a batch until it is `completed`. `partial` keeps polling, even
    /// when individual results inside it have failed.
    ///
    /// # Errors
    ///
    /// - [`TranscriptError::PollTimeout`] after `max_attempts` non-terminal polls.
    pub async fn wait_for_batch(
        &self,
        batch_id: &str,
        opts: Option<PollOptions>,
    ) -> Result<BatchResponse> {
        let opts = opts.unwrap_or_default();

        for attempt in 1..=opts.max_attempts {
            let batch = self.get_batch(batch_id).await?;
            debug!(batch_id, attempt, status = ?batch.status, "polled batch");

            if batch.status.is_terminal() {
                return Ok(batch);
            }
            if attempt < opts.max_attempts {
                tokio::time::sleep(opts.interval).await;
            }
        }

        warn!(batch_id, attempts = opts.max_attempts, "batch did not finish");
        Err(TranscriptError::PollTimeout {
            resource: "batch",
            id: batch_id.to_string(),
            attempts: opts.max_attempts,
        })
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Join `segments` onto the base URL, percent-encoding each one so an id
    /// cannot add path components or a query string.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| TranscriptError::Config(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| TranscriptError::Config("base URL cannot carry a path".into()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Execute one HTTP request under the client timeout.
    ///
    /// The body is read and parsed as JSON for every status; non-2xx
    /// statuses are mapped through [`TranscriptError::from_status`].
    async fn request<T, B>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = self.endpoint(segments)?;
        let path = format!("/{}", segments.join("/"));
        let path = path.as_str();

        let mut req = self
            .http
            .request(method.clone(), url)
            .bearer_auth(self.api_key.expose_secret())
            .header(CONTENT_TYPE, "application/json")
            .header(CLIENT_HEADER, CLIENT_ID);

        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(b) = body {
            req = req.body(serde_json::to_vec(b)?);
        }

        debug!(%method, path, "sending request");

        // Dropping the future on timeout aborts the in-flight call.
        let exchange = async {
            let response = req.send().await?;
            let status = response.status();
            let retry_after = parse_retry_after(
                response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok()),
            );
            let bytes = response.bytes().await?;
            Ok::<_, TranscriptError>((status, retry_after, bytes))
        };

        let (status, retry_after, bytes) = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result?,
            Err(_) => {
                warn!(%method, path, timeout = ?self.timeout, "request timed out");
                return Err(TranscriptError::Timeout {
                    path: path.to_string(),
                    timeout: self.timeout,
                });
            }
        };

        debug!(%method, path, status = status.as_u16(), "received response");

        if status.is_success() {
            return Ok(serde_json::from_slice(&bytes)?);
        }

        Err(TranscriptError::from_status(
            status.as_u16(),
            parse_error_payload(&bytes),
            retry_after,
        ))
    }
}
