use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where the transcript should come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Human captions if available, otherwise auto-generated ones.
    Auto,
    /// Human-authored captions only.
    Manual,
    /// Speech recognition on the audio track (billed separately).
    Asr,
}

/// Body of `POST /transcribe`.
///
/// ```
/// use vidtranscript::{Source, TranscriptionRequest};
///
/// let req = TranscriptionRequest::new("dQw4w9WgXcQ")
///     .language("en")
///     .source(Source::Manual)
///     .include_timestamps(true);
/// assert_eq!(req.video, "dQw4w9WgXcQ");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionRequest {
    /// Video URL or 11-character video ID.
    pub video: String,

    /// ISO 639-1 code, e.g. "en".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,

    /// Confirms that ASR may be used (and billed) when no captions exist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_asr: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_timestamps: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_paragraphs: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_words: Option<bool>,

    /// Receives the result when the transcript is produced asynchronously.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl TranscriptionRequest {
    pub fn new(video: impl Into<String>) -> Self {
        Self {
            video: video.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    #[must_use]
    pub fn source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn use_asr(mut self, confirm: bool) -> Self {
        self.use_asr = Some(confirm);
        self
    }

    #[must_use]
    pub fn include_timestamps(mut self, on: bool) -> Self {
        self.include_timestamps = Some(on);
        self
    }

    #[must_use]
    pub fn include_paragraphs(mut self, on: bool) -> Self {
        self.include_paragraphs = Some(on);
        self
    }

    #[must_use]
    pub fn include_words(mut self, on: bool) -> Self {
        self.include_words = Some(on);
        self
    }

    #[must_use]
    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }
}

/// Body of `POST /batch`. The API accepts at most 100 videos per batch;
/// the limit is enforced server-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub videos: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Source>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_asr: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_timestamps: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_paragraphs: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_words: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl BatchRequest {
    pub fn new<I, S>(videos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            videos: videos.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    #[must_use]
    pub fn source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn use_asr(mut self, confirm: bool) -> Self {
        self.use_asr = Some(confirm);
        self
    }

    #[must_use]
    pub fn include_timestamps(mut self, on: bool) -> Self {
        self.include_timestamps = Some(on);
        self
    }

    #[must_use]
    pub fn include_paragraphs(mut self, on: bool) -> Self {
        self.include_paragraphs = Some(on);
        self
    }

    #[must_use]
    pub fn include_words(mut self, on: bool) -> Self {
        self.include_words = Some(on);
        self
    }

    #[must_use]
    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptionStatus {
    Completed,
    Processing,
    Failed,
    /// No captions exist; resend with `use_asr(true)` to transcribe the audio.
    RequiresAsrConfirmation,
}

impl TranscriptionStatus {
    /// Terminal = won't change anymore (completed or failed).
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Completed,
    /// Some videos are done, others are still processing.
    Partial,
    Processing,
}

impl BatchStatus {
    /// Only `Completed` is terminal; a batch never reports itself as failed.
    pub fn is_terminal(self) -> bool {
        self == Self::Completed
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    /// Seconds from video start.
    pub start: f64,
    /// Seconds.
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    pub start: f64,
    pub end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub word: String,
    pub start: f64,
    pub end: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// The transcript itself. Detail lists are present only when requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptData {
    pub video_id: String,
    pub text: String,
    pub language: String,
    pub source: Source,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<Segment>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraphs: Option<Vec<Paragraph>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<Word>>,
}

/// Returned by `transcribe`, `get_transcript` and `get_job`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionResponse {
    pub request_id: String,
    pub status: TranscriptionStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TranscriptData>,

    /// Set when the work continues asynchronously; poll with `get_job`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits_used: Option<f64>,

    /// Quoted on `requires_asr_confirmation` before any credits are spent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_credits: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration_seconds: Option<f64>,

    /// Server hint on how to proceed, e.g. which language to request instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl TranscriptionResponse {
    pub fn is_completed(&self) -> bool {
        self.status == TranscriptionStatus::Completed
    }

    /// Plain transcript text, if the response carries one.
    pub fn transcript(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.text.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub succeeded: u32,
    #[serde(default)]
    pub failed: u32,
    #[serde(default)]
    pub processing: u32,
}

/// Returned by `batch` and `get_batch`. `results` keeps request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub batch_id: String,
    pub status: BatchStatus,

    #[serde(default)]
    pub results: Vec<TranscriptionResponse>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<BatchSummary>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits_used: Option<f64>,
}

impl BatchResponse {
    pub fn is_completed(&self) -> bool {
        self.status == BatchStatus::Completed
    }

    /// Per-video results that failed, even inside a completed batch.
    pub fn failed_results(&self) -> impl Iterator<Item = &TranscriptionResponse> {
        self.results
            .iter()
            .filter(|r| r.status == TranscriptionStatus::Failed)
    }
}

/// Detail flags for `get_job`. Only flags set to `true` are sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobOptions {
    pub include_segments: bool,
    pub include_paragraphs: bool,
    pub include_words: bool,
}

impl JobOptions {
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, &'static str)> {
        [
            ("include_segments", self.include_segments),
            ("include_paragraphs", self.include_paragraphs),
            ("include_words", self.include_words),
        ]
        .into_iter()
        .filter(|(_, on)| *on)
        .map(|(name, _)| (name, "true"))
        .collect()
    }
}

/// Polling config for `wait_for_job` / `wait_for_batch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Delay between polls. Default: 5s.
    pub interval: Duration,
    /// Polls made before giving up. Default: 60.
    pub max_attempts: u32,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5000),
            max_attempts: 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_request_fields_are_omitted() {
        let body = serde_json::to_value(TranscriptionRequest::new("dQw4w9WgXcQ")).unwrap();
        assert_eq!(body, json!({ "video": "dQw4w9WgXcQ" }));
    }

    #[test]
    fn request_setters_serialize_snake_case() {
        let req = TranscriptionRequest::new("https://youtu.be/dQw4w9WgXcQ")
            .language("de")
            .source(Source::Asr)
            .use_asr(true)
            .include_words(true)
            .webhook_url("https://example.com/hook");

        assert_eq!(
            serde_json::to_value(req).unwrap(),
            json!({
                "video": "https://youtu.be/dQw4w9WgXcQ",
                "language": "de",
                "source": "asr",
                "use_asr": true,
                "include_words": true,
                "webhook_url": "https://example.com/hook",
            })
        );
    }

    #[test]
    fn batch_request_passes_videos_through_unchecked() {
        let ids: Vec<String> = (0..150).map(|i| format!("video{i:06}")).collect();
        let req = BatchRequest::new(ids.clone()).include_timestamps(true);

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["videos"].as_array().unwrap().len(), 150);
        assert_eq!(body["include_timestamps"], true);
        assert_eq!(req.videos, ids);
    }

    #[test]
    fn status_terminal_rules() {
        assert!(TranscriptionStatus::Completed.is_terminal());
        assert!(TranscriptionStatus::Failed.is_terminal());
        assert!(!TranscriptionStatus::Processing.is_terminal());
        assert!(!TranscriptionStatus::RequiresAsrConfirmation.is_terminal());

        assert!(BatchStatus::Completed.is_terminal());
        assert!(!BatchStatus::Partial.is_terminal());
        assert!(!BatchStatus::Processing.is_terminal());
    }

    #[test]
    fn parses_asr_confirmation_response() {
        let resp: TranscriptionResponse = serde_json::from_value(json!({
            "request_id": "req_1",
            "status": "requires_asr_confirmation",
            "estimated_credits": 4.0,
            "estimated_duration_seconds": 212.0,
            "suggestion": "Set use_asr to true to transcribe the audio"
        }))
        .unwrap();

        assert_eq!(resp.status, TranscriptionStatus::RequiresAsrConfirmation);
        assert_eq!(resp.estimated_credits, Some(4.0));
        assert!(resp.data.is_none());
        assert!(resp.transcript().is_none());
    }

    #[test]
    fn parses_batch_with_failed_item() {
        let resp: BatchResponse = serde_json::from_value(json!({
            "batch_id": "batch_1",
            "status": "completed",
            "results": [
                {
                    "request_id": "req_a",
                    "status": "completed",
                    "data": {
                        "video_id": "aaaaaaaaaaa",
                        "text": "hello",
                        "language": "en",
                        "source": "manual"
                    }
                },
                { "request_id": "req_b", "status": "failed" }
            ],
            "summary": { "total": 2, "succeeded": 1, "failed": 1 }
        }))
        .unwrap();

        assert!(resp.is_completed());
        assert_eq!(resp.results[0].transcript(), Some("hello"));
        assert_eq!(resp.failed_results().count(), 1);
        assert_eq!(resp.summary.unwrap().processing, 0);
    }

    #[test]
    fn job_options_emit_only_true_flags() {
        assert!(JobOptions::default().query_pairs().is_empty());

        let opts = JobOptions {
            include_segments: true,
            include_words: true,
            ..JobOptions::default()
        };
        assert_eq!(
            opts.query_pairs(),
            vec![("include_segments", "true"), ("include_words", "true")]
        );
    }

    #[test]
    fn poll_defaults() {
        let opts = PollOptions::default();
        assert_eq!(opts.interval, Duration::from_secs(5));
        assert_eq!(opts.max_attempts, 60);
    }
}
