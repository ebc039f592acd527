//! Command-line argument parsing for faqbuddy
//!
//! Provides the clap-based CLI: subcommands, config overrides and verbosity.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{FaqConfig, LogFormat};

/// faqbuddy - Answer company FAQ questions with a local model
#[derive(Parser, Debug)]
#[command(name = "faqbuddy")]
#[command(version)]
#[command(about = "Answer questions from a company FAQ corpus with retrieval-augmented generation", long_about = None)]
pub struct Args {
    /// Configuration file path (default: ~/.faqbuddy/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Ollama model to use
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Vector collection holding the FAQ corpus
    #[arg(long, global = true)]
    pub collection: Option<String>,

    /// Qdrant gRPC endpoint
    #[arg(long, global = true)]
    pub qdrant_url: Option<String>,

    /// Ollama server URL
    #[arg(long, global = true)]
    pub ollama_url: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Verbosity: -v (debug), -vv (trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Answer a single question
    Ask {
        #[arg(value_name = "QUESTION", required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// Interactive question loop
    Chat,

    /// Print the pipeline status report
    Status {
        /// Also check that the Ollama server responds
        #[arg(long)]
        ping_llm: bool,

        /// Report without loading the pipeline components first
        #[arg(long)]
        skip_init: bool,
    },

    /// Load a JSON FAQ file into the vector collection
    Ingest {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Commands {
    /// Question text for `ask`, words joined by single spaces
    pub fn question(&self) -> Option<String> {
        match self {
            Commands::Ask { question } => Some(question.join(" ")),
            _ => None,
        }
    }
}

impl Args {
    /// Apply flag overrides on top of file and environment settings
    pub fn apply_to(&self, config: &mut FaqConfig) {
        if let Some(model) = &self.model {
            config.llm.model = model.clone();
        }
        if let Some(collection) = &self.collection {
            config.vector_store.collection = collection.clone();
        }
        if let Some(url) = &self.qdrant_url {
            config.vector_store.url = url.clone();
        }
        if let Some(url) = &self.ollama_url {
            config.llm.ollama_url = url.trim_end_matches('/').to_string();
        }
        if self.json_logs {
            config.telemetry.log_format = LogFormat::Json;
        }
        match self.verbose {
            0 => {}
            1 => config.telemetry.filter = "debug".to_string(),
            _ => config.telemetry.filter = "trace".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_ask_joins_words() {
        let args = parse(&["faqbuddy", "ask", "what", "are", "your", "hours?"]);
        assert_eq!(args.command.question().as_deref(), Some("what are your hours?"));
    }

    #[test]
    fn test_ask_requires_question() {
        assert!(Args::try_parse_from(["faqbuddy", "ask"]).is_err());
    }

    #[test]
    fn test_status_ping_llm() {
        let args = parse(&["faqbuddy", "status", "--ping-llm"]);
        assert_eq!(
            args.command,
            Commands::Status {
                ping_llm: true,
                skip_init: false
            }
        );
    }

    #[test]
    fn test_status_skip_init() {
        let args = parse(&["faqbuddy", "status", "--skip-init"]);
        assert_eq!(
            args.command,
            Commands::Status {
                ping_llm: false,
                skip_init: true
            }
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&["faqbuddy", "chat", "--model", "llama3", "-vv"]);
        assert_eq!(args.model.as_deref(), Some("llama3"));
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_apply_to_overrides_config() {
        let args = parse(&[
            "faqbuddy",
            "--collection",
            "support",
            "--ollama-url",
            "http://gpu-box:11434/",
            "--json-logs",
            "-v",
            "ingest",
            "faqs.json",
        ]);
        let mut config = FaqConfig::default();
        args.apply_to(&mut config);

        assert_eq!(config.vector_store.collection, "support");
        assert_eq!(config.llm.ollama_url, "http://gpu-box:11434");
        assert_eq!(config.telemetry.log_format, LogFormat::Json);
        assert_eq!(config.telemetry.filter, "debug");
        assert_eq!(config.llm.model, FaqConfig::default().llm.model);
    }

    #[test]
    fn test_no_flags_keeps_config() {
        let args = parse(&["faqbuddy", "status"]);
        let mut config = FaqConfig::default();
        args.apply_to(&mut config);
        assert_eq!(config, FaqConfig::default());
    }
}
