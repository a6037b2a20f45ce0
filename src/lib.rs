pub mod api;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod rag;
pub mod surface;
pub mod vector_store;


pub use config::AppConfig;
pub use errors::*;
