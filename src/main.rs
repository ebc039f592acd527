//! faqbuddy - Main CLI Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use faqbuddy::{
    agent::AnswerOrchestrator,
    cli::{Args, Commands, InputHandler, InputLine},
    config::FaqConfig,
    llm::OllamaClient,
    rag::{ingest, PipelineStatus, ResourceRegistry},
    telemetry,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => FaqConfig::load_from(path)?,
        None => FaqConfig::load()?,
    };
    config.apply_env();
    args.apply_to(&mut config);

    if !telemetry::init_tracing(&config.telemetry) {
        eprintln!("Tracing subscriber already installed; continuing without it");
    }
    debug!(?config, "Configuration loaded");

    let orchestrator = AnswerOrchestrator::new(Arc::new(ResourceRegistry::new(config)));

    match &args.command {
        Commands::Ask { .. } => {
            let question = args.command.question().unwrap_or_default();
            ask(&orchestrator, &question).await?;
        }
        Commands::Chat => {
            chat(&orchestrator).await?;
        }
        Commands::Status { ping_llm, skip_init } => {
            status(&orchestrator, *ping_llm, !*skip_init).await?;
        }
        Commands::Ingest { file } => {
            let entries = ingest::load_entries(file)?;
            println!("{} {} FAQ entries from {}", "Ingesting".cyan(), entries.len(), file.display());

            let report = ingest::ingest(orchestrator.registry(), entries).await?;
            println!(
                "{} {} entries into '{}' ({} documents total)",
                "✓ Stored".green(),
                report.ingested,
                report.collection,
                report.total_documents
            );
        }
    }

    Ok(())
}

fn thinking_spinner() -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .context("Invalid spinner template")?,
    );
    pb.set_message("Searching FAQs...");
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

async fn ask(orchestrator: &AnswerOrchestrator, question: &str) -> Result<()> {
    let pb = thinking_spinner()?;
    let answer = orchestrator.answer(question).await;
    pb.finish_and_clear();

    println!("{}", answer);
    Ok(())
}

async fn chat(orchestrator: &AnswerOrchestrator) -> Result<()> {
    let mut input = match InputHandler::default_history_path() {
        Some(path) => InputHandler::with_history(path)?,
        None => InputHandler::new()?,
    };

    println!("{}", "Company FAQ Assistant".bold());
    println!("{}", "Ask a question, or type 'exit' to quit.".dimmed());

    loop {
        match input.read_line()? {
            InputLine::Exit => break,
            InputLine::Empty => continue,
            InputLine::Question(question) => {
                let pb = thinking_spinner()?;
                let answer = orchestrator.answer(&question).await;
                pb.finish_and_clear();
                println!("{}\n", answer);
            }
        }
    }

    if let Err(e) = input.save_history() {
        warn!(error = %e, "Failed to save chat history");
    }
    Ok(())
}

async fn status(orchestrator: &AnswerOrchestrator, ping_llm: bool, initialize: bool) -> Result<()> {
    let report = orchestrator.status_report(initialize).await;
    println!("{}", serde_json::to_string_pretty(&report)?);

    let label = match report.rag_system.state.status {
        PipelineStatus::Ready => "ready".green(),
        PipelineStatus::Failed => "failed".red(),
        PipelineStatus::Initializing => "initializing".yellow(),
        PipelineStatus::Uninitialized => "uninitialized".yellow(),
    };
    println!("\nPipeline: {}", label);

    if ping_llm {
        let llm = &orchestrator.registry().config().llm;
        let client = OllamaClient::with_config(
            &llm.ollama_url,
            &llm.model,
            Duration::from_secs(llm.timeout_secs),
        )?;
        if client.health_check().await {
            println!("Ollama at {}: {}", client.base_url(), "reachable".green());
        } else {
            println!("Ollama at {}: {}", client.base_url(), "unreachable".red());
        }
    }

    Ok(())
}
