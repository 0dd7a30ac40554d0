//! Session-scoped PDF question-answering backend: extract text from an
//! uploaded PDF, inject it once into a bounded conversation, and answer
//! questions about it through an LLM provider.

pub mod chat;
pub mod config;
pub mod conversation;
pub mod extractor;
pub mod llm;
pub mod store;

pub use chat::{ChatError, ChatService, DocumentStatus};
pub use config::{available_models, ChatConfig, ModelInfo, Settings};
pub use conversation::{Conversation, Role, Turn, DOCUMENT_PREFIX};
pub use extractor::{ExtractedDocument, ExtractionError};
pub use llm::{LlmError, Provider};
pub use store::SessionStore;
