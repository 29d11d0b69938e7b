//! Conversation state for one app session.

use crate::gemini::GeminiError;

pub mod prompt;

pub const WELCOME_MESSAGE: &str = "👋 Olá! Eu sou seu assistente virtual que irá te ajudar a criar testes unitários.

Posso ajudar você da seguinte forma:
- ❓ Responder perguntas sobre testes unitários
- 💻 Explicar conceitos de qualidade de código
- 📝 Criar testes unitários robustos baseados em funções
- 🧮 Resolver problemas referentes a bugs no código
- 🎨 Novas ideias para qualidade do software

Como posso ajudar você hoje?";

/// One conversation turn. The role is an open string: "user" and
/// "assistant" are the recognized values, anything else is tolerated and
/// skipped during prompt assembly.
#[derive(Debug, Clone)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Append-only message list owned by the UI session.
///
/// Invariant: after construction and after every [`clear`](Self::clear)
/// the list starts with the synthetic assistant welcome message.
#[derive(Debug)]
pub struct ChatState {
    messages: Vec<Message>,
}

impl ChatState {
    pub fn new() -> Self {
        let mut state = Self {
            messages: Vec::new(),
        };
        state.ensure_welcome();
        state
    }

    fn ensure_welcome(&mut self) {
        if self.messages.is_empty() {
            self.messages.push(Message::assistant(WELCOME_MESSAGE));
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.ensure_welcome();
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders a completion failure as the transcript text shown to the user.
/// The failed turn is appended as a normal assistant message, so the
/// session always continues.
pub fn failure_text(err: &GeminiError) -> String {
    format!("Erro ao gerar resposta: {err}")
}
