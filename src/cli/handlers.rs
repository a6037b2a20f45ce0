//! Command handlers for the EventPulse CLI

use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tracing::warn;

use crate::api::serve_api;
use crate::cli::output::*;
use crate::rag::PipelineRequest;
use crate::rag::RagService;
use crate::surface::RequestComposer;
use crate::surface::Transcript;
use crate::AppConfig;
use crate::Result;

const SOURCE_PREVIEW_CHARS: usize = 300;

/// One-shot recommendation
pub async fn handle_ask(
    config: &AppConfig,
    query: &str,
    city: &str,
    full_sources: bool,
) -> Result<()> {
    let composer = RequestComposer::new(&config.surface);
    let question = composer.compose(query, city)?;
    let rag_service = RagService::new(config)?;

    print_info(&format!("🔍 {question}"));
    println!("⏳ Waiting for response...");

    let outcome = rag_service.run(PipelineRequest::new(question.clone())).await?;
    if outcome.is_invalid_intent() {
        print_warning("No talent request found; try describing who you need");
        return Ok(());
    }
    let response = outcome.into_response();

    let mut transcript = Transcript::new();
    transcript.record_success(&question, response);
    let preview = (!full_sources).then_some(SOURCE_PREVIEW_CHARS);
    if let Some(answer) = transcript.turns().last() {
        print_turn(answer, preview);
    }

    Ok(())
}

/// Interactive chat REPL
///
/// Lines starting with `/` are commands: `/city <name>`, `/cities`,
/// `/history`, `/quit`. Anything else is sent as a request.
pub async fn handle_chat(config: &AppConfig, city: &str) -> Result<()> {
    let composer = RequestComposer::new(&config.surface);
    let mut city = composer
        .resolve_city(city)
        .ok_or_else(|| {
            crate::EventPulseError::MalformedRequest(format!(
                "Unknown city '{city}'; choose one of: {}",
                composer.cities().join(", ")
            ))
        })?
        .to_string();
    let rag_service = RagService::new(config)?;
    let mut transcript = Transcript::new();

    println!("💬 EventPulse: Talent Recommendations");
    println!("   Seek. Find. Talent Unleashed. (city: {city}, /quit to exit)\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::Write::flush(&mut std::io::stdout())?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('/') {
            let (name, arg) = command.split_once(' ').unwrap_or((command, ""));
            match name {
                "quit" | "exit" => break,
                "cities" => print_cities(composer.cities()),
                "history" => {
                    for turn in transcript.turns() {
                        print_turn(turn, Some(SOURCE_PREVIEW_CHARS));
                    }
                }
                "city" => match composer.resolve_city(arg) {
                    Some(resolved) => {
                        city = resolved.to_string();
                        print_success(&format!("City set to {city}"));
                    }
                    None => print_warning(&format!("Unknown city '{}'", arg.trim())),
                },
                _ => print_warning(&format!("Unknown command /{name}")),
            }
            continue;
        }

        let question = match composer.compose(line, &city) {
            Ok(question) => question,
            Err(e) => {
                print_error(&e.to_string());
                continue;
            }
        };

        let history = if config.pipeline.use_chat_history {
            transcript.history()
        } else {
            crate::rag::ChatHistory::new()
        };

        transcript.begin_request()?;
        println!("⏳ Waiting for response...");
        match rag_service
            .run(PipelineRequest::new(question.clone()).with_history(history))
            .await
        {
            Ok(outcome) => {
                if outcome.is_invalid_intent() {
                    print_warning("No talent request found; try describing who you need");
                }
                transcript.record_success(&question, outcome.into_response());
                if let Some(answer) = transcript.turns().last() {
                    print_turn(answer, Some(SOURCE_PREVIEW_CHARS));
                }
            }
            Err(e) => {
                warn!("Chat request failed: {}", e);
                transcript.record_failure(e.to_string());
                if let Some(message) = transcript.error() {
                    print_error(message);
                }
            }
        }
    }

    print_info(&format!(
        "Session ended after {} exchanges",
        transcript.history().len()
    ));
    Ok(())
}

/// Start the HTTP API, CLI flags taking priority over config
pub async fn handle_serve(
    config: &AppConfig,
    host: Option<String>,
    port: Option<u16>,
    cors: bool,
) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let cors = cors || config.server.enable_cors;

    println!("🚀 Starting EventPulse API Server");
    println!("===============================\n");
    println!("📍 Host: {host}");
    println!("🔌 Port: {port}");
    println!("🌐 CORS: {}", if cors { "Enabled" } else { "Disabled" });
    println!();

    serve_api(config, host, port, cors).await
}
