//! Quick-start examples for the VidTranscript Rust SDK.
//!
//! Run with:
//!   VIDTRANSCRIPT_API_KEY=vt_live_... RUST_LOG=vidtranscript=debug cargo run --example quickstart
//!
//! Or pass the key directly in code (not recommended for production).

use std::time::Duration;

use tracing_subscriber::EnvFilter;
use vidtranscript::{
    BatchRequest, ClientBuilder, ErrorKind, JobOptions, PollOptions, Source,
    TranscriptionRequest, TranscriptionStatus,
};

#[tokio::main]
async fn main() -> vidtranscript::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // -----------------------------------------------------------------------
    // 1. Create a client (reads VIDTRANSCRIPT_API_KEY from environment)
    // -----------------------------------------------------------------------
    let client = ClientBuilder::new().timeout(Duration::from_secs(20)).build()?;

    // Or provide the key directly:
    // let client = vidtranscript::Client::new("vt_live_abc123")?;

    // -----------------------------------------------------------------------
    // 2. Fetch existing captions
    // -----------------------------------------------------------------------
    match client.get_transcript("dQw4w9WgXcQ", Some("en")).await {
        Ok(resp) => {
            println!("Status: {:?}", resp.status);
            if let Some(text) = resp.transcript() {
                println!("{text}");
            }
        }
        Err(e) if e.kind() == ErrorKind::NoCaptions => {
            println!("No captions: {}", e.message().unwrap_or_default());
        }
        Err(e) if e.kind() == ErrorKind::RateLimit => {
            println!("Rate limited, retry in {:?}s", e.retry_after());
        }
        Err(e) => return Err(e),
    }
    println!();

    // -----------------------------------------------------------------------
    // 3. Fall back to ASR and wait for the job
    // -----------------------------------------------------------------------
    let req = TranscriptionRequest::new("https://www.youtube.com/watch?v=jNQXAC9IVRw")
        .source(Source::Asr)
        .include_timestamps(true);

    let resp = client.transcribe(&req).await?;

    let resp = if resp.status == TranscriptionStatus::RequiresAsrConfirmation {
        println!(
            "ASR needs confirmation (estimated {:?} credits)",
            resp.estimated_credits
        );
        client.transcribe(&req.clone().use_asr(true)).await?
    } else {
        resp
    };

    if let Some(job_id) = &resp.job_id {
        let opts = PollOptions {
            interval: Duration::from_secs(3),
            max_attempts: 100,
        };
        let detail = JobOptions {
            include_segments: true,
            ..JobOptions::default()
        };
        let job = client.wait_for_job_with(job_id, &detail, Some(opts)).await?;

        println!("Job {job_id} finished: {:?}", job.status);
        if let Some(segments) = job.data.and_then(|d| d.segments) {
            for seg in segments {
                println!("  [{:.1}s +{:.1}s] {}", seg.start, seg.duration, seg.text);
            }
        }
    }
    println!();

    // -----------------------------------------------------------------------
    // 4. Batch several videos
    // -----------------------------------------------------------------------
    let batch = client
        .batch(&BatchRequest::new(["dQw4w9WgXcQ", "jNQXAC9IVRw"]).language("en"))
        .await?;

    let batch = client.wait_for_batch(&batch.batch_id, None).await?;
    if let Some(summary) = &batch.summary {
        println!(
            "Batch {}: {}/{} succeeded",
            batch.batch_id, summary.succeeded, summary.total
        );
    }
    for failed in batch.failed_results() {
        println!("  failed: {}", failed.request_id);
    }

    Ok(())
}
