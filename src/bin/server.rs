//! HTTP front end — `GET /mora` annotates the configured audio file.
//!
//! Usage:
//!   moratime-server --audio ./audio.wav --transcript ./transcript.json
//!
//! Response body:
//! ```json
//! { "data": { "transcription": "…", "accent_phrases": [ … ], … }, "samplerate": 24000 }
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use clap::Parser;
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use moratime::{
    AudioBuffer, AudioQuery, MoraPipeline, PipelineConfig, Transcriber, TranscriptFile,
};

#[derive(Debug, Parser)]
#[command(name = "moratime-server", version, about = "Serve mora timing annotations over HTTP")]
struct Args {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(long, default_value_t = 8000)]
    port: u16,

    /// WAV file annotated on every request.
    #[arg(long, default_value = "./audio.wav")]
    audio: PathBuf,

    /// Word-timestamped transcription of `--audio`.
    #[arg(long)]
    transcript: PathBuf,

    #[arg(long, default_value = "files/mapping.json")]
    mapping: PathBuf,

    #[arg(long)]
    config: Option<PathBuf>,
}

struct AppState {
    pipeline: MoraPipeline,
    audio: PathBuf,
    transcript: TranscriptFile,
}

#[derive(Serialize)]
struct MoraResponse {
    data: AudioQuery,
    samplerate: u32,
}

// ─── Handlers ────────────────────────────────────────────────────────────────

async fn get_mora(
    State(state): State<Arc<AppState>>,
) -> std::result::Result<Json<MoraResponse>, (StatusCode, String)> {
    // Decoding and pitch analysis are CPU-bound; keep them off the reactor.
    let joined = tokio::task::spawn_blocking(move || -> moratime::Result<MoraResponse> {
        let audio = AudioBuffer::open(&state.audio)?;
        let transcription =
            state.transcript.transcribe(&state.audio, &state.pipeline.config().language)?;
        let data = state.pipeline.annotate(&transcription, &audio)?;
        Ok(MoraResponse { data, samplerate: audio.sample_rate() })
    })
    .await;

    match joined {
        Ok(Ok(response)) => {
            info!(phrases = response.data.accent_phrases.len(), "served /mora");
            Ok(Json(response))
        }
        Ok(Err(e)) => {
            error!("annotation failed: {e}");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
        Err(e) => {
            error!("annotation task failed: {e}");
            Err((StatusCode::INTERNAL_SERVER_ERROR, "annotation task failed".to_string()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("cannot listen for ctrl-c: {e}");
    }
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Cannot load config: {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let pipeline = MoraPipeline::load(config, &args.mapping)
        .with_context(|| format!("Cannot load mapping: {}", args.mapping.display()))?;

    let state = Arc::new(AppState {
        pipeline,
        audio: args.audio,
        transcript: TranscriptFile::new(args.transcript),
    });

    let app = Router::new()
        .route("/mora", get(get_mora))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind((args.host.as_str(), args.port))
        .await
        .with_context(|| format!("Cannot bind {}:{}", args.host, args.port))?;
    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}
