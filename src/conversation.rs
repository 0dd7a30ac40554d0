use serde::{Deserialize, Serialize};

/// Marker prefix identifying the injected-document turn.
pub const DOCUMENT_PREFIX: &str = "This is the content of the uploaded PDF:\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One message in a conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn system(content: impl Into<String>) -> Self {
        Turn {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Turn {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Turn {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InvalidInput {
    #[error("question must not be empty")]
    EmptyQuestion,
    #[error("document text must not be empty")]
    EmptyDocument,
}

/// Ordered turn history for one session. Turn 0 is always the system
/// instruction; at most one turn holds the injected document content.
#[derive(Debug, Clone, Serialize)]
pub struct Conversation {
    turns: Vec<Turn>,
    /// Index of the injected-document turn, if any.
    injected_doc: Option<usize>,
}

impl Conversation {
    pub fn new(system_text: impl Into<String>) -> Self {
        Conversation {
            turns: vec![Turn::system(system_text)],
            injected_doc: None,
        }
    }

    /// Append the extracted document as a user turn, truncated to
    /// `max_chars` characters. Injection happens at most once per
    /// conversation lifetime: repeated calls are no-ops until `reset`.
    /// Empty or whitespace-only text is also a no-op; validation of
    /// extraction output belongs to the caller.
    ///
    /// Returns whether a turn was appended.
    pub fn inject_document(&mut self, text: &str, max_chars: usize) -> bool {
        if self.injected_doc.is_some() || text.trim().is_empty() {
            return false;
        }
        let truncated: String = text.chars().take(max_chars).collect();
        self.injected_doc = Some(self.turns.len());
        self.turns
            .push(Turn::user(format!("{DOCUMENT_PREFIX}{truncated}")));
        true
    }

    pub fn append_question(&mut self, question: &str) -> Result<(), InvalidInput> {
        let question = question.trim();
        if question.is_empty() {
            return Err(InvalidInput::EmptyQuestion);
        }
        self.turns.push(Turn::user(question));
        Ok(())
    }

    /// Append the assistant's turn verbatim. The caller guarantees the
    /// role is `Assistant`.
    pub fn append_answer(&mut self, answer: Turn) {
        debug_assert_eq!(answer.role, Role::Assistant);
        self.turns.push(answer);
    }

    /// The bounded suffix actually sent per request: all turns when the
    /// history fits in `size`, otherwise the system turn plus the last
    /// `size - 1` turns. The system instruction is never dropped from a
    /// long conversation.
    pub fn window(&self, size: usize) -> Vec<Turn> {
        if size == 0 {
            return Vec::new();
        }
        if self.turns.len() <= size {
            return self.turns.clone();
        }
        let mut window = Vec::with_capacity(size);
        window.push(self.turns[0].clone());
        let tail = self.turns.len() - (size - 1);
        window.extend(self.turns[tail..].iter().cloned());
        window
    }

    /// Discard all turns and start a fresh lifecycle: new system turn,
    /// document re-injected when still available.
    pub fn reset(&mut self, system_text: &str, document_text: Option<&str>, max_chars: usize) {
        self.turns = vec![Turn::system(system_text)];
        self.injected_doc = None;
        if let Some(doc) = document_text {
            self.inject_document(doc, max_chars);
        }
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn is_document_injected(&self) -> bool {
        self.injected_doc.is_some()
    }

    /// Injected document content without the marker prefix. The injected
    /// turn is the single copy of the extracted text.
    pub fn document_text(&self) -> Option<&str> {
        let idx = self.injected_doc?;
        let content = self.turns[idx].content.as_str();
        Some(content.strip_prefix(DOCUMENT_PREFIX).unwrap_or(content))
    }

    pub fn last_assistant(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::Assistant)
            .map(|t| t.content.as_str())
    }
}
