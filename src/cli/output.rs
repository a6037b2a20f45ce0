//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the EventPulse CLI

use crate::rag::Role;
use crate::rag::SourceDocument;
use crate::rag::Turn;
use crate::AppConfig;

/// Safely truncate a string at character boundary (not byte boundary)
///
/// # Returns
/// Truncated string with "..." suffix if truncated, otherwise the original string
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Render sources the way the chat UI's accordion lists them
#[must_use]
pub fn format_sources(documents: &[SourceDocument], max_chars: Option<usize>) -> String {
    let mut output = String::new();
    for (idx, doc) in documents.iter().enumerate() {
        let content = match max_chars {
            Some(limit) => truncate_str(doc.page_content.trim(), limit),
            None => doc.page_content.trim().to_string(),
        };
        output.push_str(&format!("── Source {} ──\n", idx + 1));
        output.push_str(&format!("{content}\n"));
        output.push_str(&format!("Source: {}\n", doc.metadata.source));
    }
    output
}

/// Print one transcript turn and any sources attached to it
pub fn print_turn(turn: &Turn, max_source_chars: Option<usize>) {
    match turn.role {
        Role::User => println!("\n🧑 {}", turn.text),
        Role::Assistant => {
            println!("\n{}", "═".repeat(80));
            println!("🤖 {}", turn.text.trim());
            println!("{}", "═".repeat(80));
        }
    }

    if let Some(documents) = &turn.source_documents {
        if !documents.is_empty() {
            println!("\n📚 Sources ({}):", documents.len());
            print!("{}", format_sources(documents, max_source_chars));
        }
    }
}

pub fn print_cities(cities: &[String]) {
    println!("🏙️  Available cities:");
    for city in cities {
        println!("  - {city}");
    }
}

pub fn print_config(config: &AppConfig) {
    println!("⚙️  EventPulse configuration");
    println!("  LLM:          {} ({})", config.llm.endpoint, config.llm.model);
    println!("  Temperature:  {}", config.llm.temperature);
    println!(
        "  Embeddings:   {} ({}, {})",
        config.embeddings.endpoint, config.embeddings.provider, config.embeddings.model
    );
    println!("  Vector index: {}", config.vector_store.endpoint);
    if let Some(namespace) = &config.vector_store.namespace {
        println!("  Namespace:    {namespace}");
    }
    println!("  Top K:        {}", config.vector_store.top_k);
    println!(
        "  Chat history: {}",
        if config.pipeline.use_chat_history {
            format!("enabled (last {} exchanges)", config.pipeline.max_history_turns)
        } else {
            "disabled".to_string()
        }
    );
    println!("  Server:       {}:{}", config.server.host, config.server.port);
    println!("  Log level:    {}", config.logging.level);
    println!("  Backtrace:    {}", config.logging.backtrace);
}

pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("❌ {msg}");
}
