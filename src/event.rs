use crate::gemini::GeminiError;

/// Events sent from the completion task back to the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    ReplyReady(String),
    ReplyFailed(GeminiError),
}
