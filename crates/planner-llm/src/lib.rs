pub mod cohere;
pub mod extract;
pub mod provider;

pub use cohere::{CohereProvider, CompletionSettings};
pub use extract::{extract_text, TextSource, FALLBACK_PLAN};
pub use provider::{Completion, CompletionClient, CompletionError, Result};
