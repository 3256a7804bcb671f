//! MCQ Workflow · textbook PDF → bilingual MCQs
//!
//! Client-side orchestration for the three-step flow: upload a PDF to the ingestion
//! engine, generate English/Mongolian MCQs over the ingested pages, review and export
//! them as JSON.
//!
//! - `serve` (default): local HTTP API + static presentation bundle
//! - `run`: one-shot upload → generate → export to a file
//!
//! Important env variables:
//!   MCQ_BACKEND_URL : engine base URL (default "http://localhost:8000")
//!   MCQ_CONFIG_PATH : optional TOML config (see `config.rs`)
//!   PORT            : u16 for `serve` (default 3000)
//!   LOG_LEVEL       : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT      : "pretty" (default) or "json"

mod telemetry;
mod domain;
mod error;
mod config;
mod engine;
mod ingestion;
mod generation;
mod review;
mod workflow;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::{Args, Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::Config;
use crate::domain::{Difficulty, DEFAULT_QUESTIONS};
use crate::generation::GenerationParams;
use crate::ingestion::UploadForm;
use crate::routes::build_router;
use crate::state::AppState;
use crate::workflow::Completion;

#[derive(Parser)]
#[command(name = "mcq-workflow", version, about = "Turn textbook PDFs into bilingual MCQs")]
struct Cli {
    /// Engine base URL; overrides the config file and MCQ_BACKEND_URL.
    #[arg(long, global = true)]
    backend_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the local workflow API (default).
    Serve,
    /// Upload a PDF, generate MCQs and write the export file.
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Path to the PDF file.
    #[arg(long)]
    pdf: PathBuf,
    /// Inclusive start page to ingest.
    #[arg(long)]
    start_page: Option<u32>,
    /// Inclusive end page to ingest.
    #[arg(long)]
    end_page: Option<u32>,
    #[arg(long, default_value_t = DEFAULT_QUESTIONS)]
    num_questions: u32,
    #[arg(long, default_value_t = Difficulty::Medium)]
    difficulty: Difficulty,
    /// Directory the `mcqs_<pdf_id>.json` export is written to.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    telemetry::init_tracing();

    let cli = Cli::parse();
    let mut config = Config::load();
    if let Some(url) = cli.backend_url {
        config = config.with_backend_url(url);
    }
    let state = AppState::new(config)?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(Arc::new(state)).await,
        Command::Run(args) => run_once(&state, args).await,
    }
}

async fn serve(state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let app = build_router(state.clone());

    let listener = TcpListener::bind(addr).await?;
    info!(target: "mcq_workflow", %addr, backend_url = %state.engine.base_url, "HTTP server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(target: "mcq_workflow", error = %e, "Could not install Ctrl-C handler");
            }
        })
        .await?;
    Ok(())
}

async fn run_once(state: &AppState, args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let filename = args
        .pdf
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let bytes = tokio::fs::read(&args.pdf).await?;
    let form = UploadForm { filename, bytes, start_page: args.start_page, end_page: args.end_page };

    let (done, view) = logic::run_upload(state, form).await?;
    if let Completion::Failed(msg) = done {
        return Err(msg.into());
    }
    if let Some(r) = &view.ingestion {
        info!(target: "mcq_workflow", pdf_id = %r.pdf_id, chunks = r.chunks_created, defaults = ?view.page_defaults, "PDF processed");
    }

    let params = GenerationParams {
        num_questions: args.num_questions,
        difficulty: args.difficulty,
        ..GenerationParams::default()
    };
    let (done, view) = logic::run_generation(state, params).await?;
    if let Completion::Failed(msg) = done {
        return Err(msg.into());
    }

    let art = logic::export(state).await?;
    tokio::fs::create_dir_all(&args.out_dir).await?;
    let path = args.out_dir.join(&art.filename);
    tokio::fs::write(&path, &art.bytes).await?;
    info!(target: "mcq_workflow", path = %path.display(), mcqs = view.mcqs.len(), "Export written");
    println!("{}", path.display());
    Ok(())
}
