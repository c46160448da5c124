// ============================================================================
// File: src/main.rs
// Entry point and CLI handling
// ============================================================================

mod api_client;
mod chat;
mod config;
mod error;
mod models;
mod upload;
mod view;

#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::api_client::{ApiClient, Backend};
use crate::chat::ChatController;
use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::models::FileSelection;
use crate::upload::UploadController;
use crate::view::{Renderer, StatusLine};

/// Command-line arguments for the document chat client
#[derive(Parser, Debug)]
#[command(name = "docchat")]
#[command(about = "Upload documents to a retrieval backend and ask questions about them", long_about = None)]
struct Args {
    /// Path to the JSON configuration file [default: docchat.json]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL, overriding the configuration file
    #[arg(short, long)]
    server: Option<String>,

    /// Enable verbose output (request logging on stderr)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload files one at a time, stopping at the first failure
    Upload {
        /// Files to upload, in order
        files: Vec<PathBuf>,
    },

    /// Ask a single question
    Ask {
        /// The question; multiple words are joined with spaces
        #[arg(required = true)]
        query: Vec<String>,
    },

    /// Interactive chat session; each line read is one question
    Chat,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Parse command-line arguments
    let args = Args::parse();
    init_logging(args.verbose);

    // Load configuration from JSON file
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    let mut config = Config::load(&config_path, args.config.is_some())?;
    if let Some(server) = args.server {
        config.server_url = server;
    }
    config.validate()?;

    let backend: Arc<dyn Backend> = Arc::new(ApiClient::new(config.server_url.clone()));
    let renderer = Renderer::new(config.show_latency);

    let ok = match args.command {
        Command::Upload { files } => run_upload(backend, &renderer, &files).await,
        Command::Ask { query } => {
            let mut controller = ChatController::new(backend, config.top_k);
            controller.set_input(query.join(" "));
            submit(&mut controller, &renderer).await;
            renderer.chat(controller.view(), 0);
            controller.view().status.is_none()
        }
        Command::Chat => {
            let mut controller = ChatController::new(backend, config.top_k);
            run_chat(&mut controller, &renderer, &config.server_url).await?;
            true
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "docchat=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_upload(backend: Arc<dyn Backend>, renderer: &Renderer, files: &[PathBuf]) -> bool {
    let selection = match FileSelection::read_paths(files).await {
        Ok(selection) => selection,
        Err(err) => {
            let status = StatusLine::from_error(&err, "Upload failed.");
            renderer.status(&status);
            return false;
        }
    };

    let mut controller = UploadController::new(backend);
    let spinner = (!selection.is_empty()).then(|| renderer.spinner("Uploading & processing..."));
    controller.submit_selected_files(selection).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    renderer.upload(controller.view());
    !controller
        .view()
        .status
        .as_ref()
        .is_some_and(StatusLine::is_error)
}

/// Submit the pending input with the loading spinner shown.
async fn submit(controller: &mut ChatController, renderer: &Renderer) {
    if controller.view().input.trim().is_empty() {
        return;
    }
    let spinner = renderer.spinner("Searching documents...");
    controller.submit_query().await;
    spinner.finish_and_clear();
}

async fn run_chat(controller: &mut ChatController, renderer: &Renderer, server_url: &str) -> Result<()> {
    renderer.chat_banner(server_url);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut rendered = 0;
    loop {
        renderer.prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        match line.trim() {
            "/quit" => break,
            "" => continue,
            _ => {}
        }

        controller.set_input(line);
        submit(controller, renderer).await;
        rendered = renderer.chat(controller.view(), rendered);
    }

    println!();
    Ok(())
}
