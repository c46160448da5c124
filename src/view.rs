// ============================================================================
// File: src/view.rs
// View-models owned by the controllers, and the terminal renderer that reads them
// ============================================================================

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;

use crate::error::ClientError;
use crate::models::{ChatMessage, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    InProgress,
    Success,
    Error,
}

/// One line of user-facing status text
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub text: String,
    pub tone: Tone,
}

impl StatusLine {
    pub fn in_progress(text: impl Into<String>) -> Self {
        Self { text: text.into(), tone: Tone::InProgress }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self { text: text.into(), tone: Tone::Success }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { text: text.into(), tone: Tone::Error }
    }

    /// Error state shown for any failed operation. Rejections show the
    /// server's detail, else `rejected`; transport and decode failures
    /// collapse to a generic server error.
    pub fn from_error(err: &ClientError, rejected: &str) -> Self {
        let text = match err {
            ClientError::Validation(message) => message.clone(),
            ClientError::UpstreamRejection { .. } => {
                err.detail().unwrap_or(rejected).to_string()
            }
            ClientError::Transport(_) | ClientError::Decode(_) => "Server error.".to_string(),
        };
        Self::error(text)
    }

    pub fn is_error(&self) -> bool {
        self.tone == Tone::Error
    }
}

/// State behind the upload panel
#[derive(Debug, Default)]
pub struct UploadView {
    pub status: Option<StatusLine>,
}

/// State behind the chat panel
#[derive(Debug, Default)]
pub struct ChatView {
    /// Current contents of the chat input
    pub input: String,
    /// Append-only for the whole session
    pub transcript: Vec<ChatMessage>,
    pub loading: bool,
    /// Round trip of the last answered query
    pub latency: Option<Duration>,
    /// Error state of the last submission, cleared on the next one
    pub status: Option<StatusLine>,
}

impl ChatView {
    pub fn latency_text(&self) -> Option<String> {
        self.latency
            .map(|latency| format!("Query Latency: {:.2}s", latency.as_secs_f64()))
    }
}

/// Prints view-models to the terminal. Never mutates them.
pub struct Renderer {
    show_latency: bool,
}

impl Renderer {
    pub fn new(show_latency: bool) -> Self {
        Self { show_latency }
    }

    pub fn status(&self, status: &StatusLine) {
        let line = match status.tone {
            Tone::InProgress => status.text.blue(),
            Tone::Success => status.text.green().bold(),
            Tone::Error => status.text.red().bold(),
        };
        let marker = match status.tone {
            Tone::InProgress => "…".blue(),
            Tone::Success => "✓".green().bold(),
            Tone::Error => "✗".red().bold(),
        };
        println!("{} {}", marker, line);
    }

    pub fn upload(&self, view: &UploadView) {
        if let Some(status) = &view.status {
            self.status(status);
        }
    }

    /// Print transcript entries from `from` onwards, then latency and any
    /// error state. Returns the new transcript length.
    pub fn chat(&self, view: &ChatView, from: usize) -> usize {
        if view.loading {
            println!("{}", "Waiting for the backend...".bright_black());
        }

        for message in view.transcript.iter().skip(from) {
            self.message(message);
        }

        if let Some(status) = &view.status {
            self.status(status);
        } else if self.show_latency {
            if let Some(latency) = view.latency_text() {
                println!("{}", latency.bright_black());
            }
        }

        view.transcript.len()
    }

    fn message(&self, message: &ChatMessage) {
        match message.role {
            Role::User => {
                println!("\n{} {}", "●".bright_cyan(), "You".bright_white().bold());
                println!("{}", message.text);
            }
            Role::Assistant => {
                println!("\n{} {}", "●".bright_green(), "Assistant".bright_white().bold());
                println!("{}", "─".repeat(40).bright_black());
                for line in message.text.lines() {
                    println!("{}", line);
                }
                if !message.sources.is_empty() {
                    println!("{}", format!("Sources: {}", message.sources.join(", ")).bright_black().italic());
                }
            }
        }
    }

    pub fn chat_banner(&self, server_url: &str) {
        println!("{}", "\n═══════════════════════════════════════".bright_blue());
        println!("{}", "          DOCUMENT CHAT".bright_white().bold());
        println!("{}", "═══════════════════════════════════════".bright_blue());
        println!("\n{}: {}", "Server".green().bold(), server_url);
        println!("{}\n", "Type a question and press Enter. /quit to leave.".bright_black());
    }

    pub fn prompt(&self) -> std::io::Result<()> {
        print!("{} ", "›".yellow().bold());
        std::io::stdout().flush()
    }

    /// Loading indicator shown while a request is in flight.
    pub fn spinner(&self, message: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }
}
