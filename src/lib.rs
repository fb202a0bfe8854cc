//! # VidTranscript SDK for Rust
//!
//! Async client for the VidTranscript video transcription API. Fetch
//! captions, fall back to speech recognition, submit batches, and poll
//! asynchronous jobs -- all with typed requests, responses and errors.
//!
//! ## Quick start
//!
//! ```no_run
//! use vidtranscript::{Client, TranscriptionRequest, TranscriptionStatus};
//!
//! #[tokio::main]
//! async fn main() -> vidtranscript::Result<()> {
//!     let client = Client::new("vt_live_your_api_key")?;
//!
//!     let req = TranscriptionRequest::new("dQw4w9WgXcQ").language("en");
//!     let mut resp = client.transcribe(&req).await?;
//!
//!     // Long videos and ASR are processed asynchronously.
//!     if let Some(job_id) = resp.job_id.clone() {
//!         resp = client.wait_for_job(&job_id, None).await?;
//!     }
//!
//!     if resp.status == TranscriptionStatus::Completed {
//!         println!("{}", resp.transcript().unwrap_or_default());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Errors
//!
//! Every failure is a [`TranscriptError`]. API failures carry the HTTP
//! status, the server's error code and message; use
//! [`TranscriptError::kind`] to branch on them.
//!
//! ```no_run
//! use vidtranscript::{Client, ErrorKind};
//!
//! # async fn example(client: Client) {
//! match client.get_transcript("dQw4w9WgXcQ", None).await {
//!     Ok(resp) => println!("{:?}", resp.status),
//!     Err(e) if e.kind() == ErrorKind::RateLimit => {
//!         println!("retry in {:?}s", e.retry_after());
//!     }
//!     Err(e) => eprintln!("{e}"),
//! }
//! # }
//! ```

mod client;
mod errors;
mod models;

pub use client::{Client, ClientBuilder};
pub use errors::{ApiError, ErrorKind, ErrorPayload, Result, TranscriptError};
pub use models::{
    BatchRequest, BatchResponse, BatchStatus, BatchSummary, JobOptions, Paragraph, PollOptions,
    Segment, Source, TranscriptData, TranscriptionRequest, TranscriptionResponse,
    TranscriptionStatus, Word,
};
