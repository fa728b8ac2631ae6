//! Handler contract
//!
//! A handler is the unit of work behind one settings row. The core only talks to
//! handlers through the [`Handler`] trait: it configures the three lookup parameters
//! and the environment value, runs `apply`, and reads back status, label and messages.

pub mod builtin;
pub mod registry;

use std::fmt;

pub use registry::{HandlerFactory, HandlerRegistry};

/// Lifecycle status of a handler.
///
/// `NotExecuted` is the only non-terminal state; `apply` moves a handler into one of
/// the others and nothing moves it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerStatus {
    NotExecuted,
    Done,
    AlreadyInPlace,
    Skipped,
    SubjectNotFound,
    Error,
}

impl HandlerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandlerStatus::NotExecuted => "not_executed",
            HandlerStatus::Done => "done",
            HandlerStatus::AlreadyInPlace => "already_in_place",
            HandlerStatus::Skipped => "skipped",
            HandlerStatus::SubjectNotFound => "subject_not_found",
            HandlerStatus::Error => "error",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, HandlerStatus::Error)
    }
}

impl fmt::Display for HandlerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Ok,
    Warning,
    Error,
    Skipped,
}

impl MessageLevel {
    fn tag(&self) -> &'static str {
        match self {
            MessageLevel::Info => "INFO",
            MessageLevel::Ok => "OK",
            MessageLevel::Warning => "WARNING",
            MessageLevel::Error => "ERROR",
            MessageLevel::Skipped => "SKIPPED",
        }
    }
}

/// A line of output produced by a handler while applying
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

impl Message {
    pub fn new(level: MessageLevel, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level.tag(), self.text)
    }
}

/// Configuration and outcome shared by every handler implementation.
///
/// Implementations embed one of these and expose it through
/// [`Handler::state`]/[`Handler::state_mut`]; the trait's provided methods do the rest.
#[derive(Debug, Clone)]
pub struct HandlerState {
    pub param1: String,
    pub param2: String,
    pub param3: String,
    pub value: String,
    status: HandlerStatus,
    messages: Vec<Message>,
}

impl Default for HandlerState {
    fn default() -> Self {
        Self {
            param1: String::new(),
            param2: String::new(),
            param3: String::new(),
            value: String::new(),
            status: HandlerStatus::NotExecuted,
            messages: Vec::new(),
        }
    }
}

impl HandlerState {
    pub fn status(&self) -> HandlerStatus {
        self.status
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn add_message(&mut self, level: MessageLevel, text: impl Into<String>) {
        self.messages.push(Message::new(level, text));
    }

    /// Records the terminal status of an apply run.
    /// Returns whether the run counts as a success.
    pub fn finish(&mut self, status: HandlerStatus) -> bool {
        debug_assert!(status != HandlerStatus::NotExecuted);
        self.status = status;
        !status.is_failure()
    }
}

/// Capability set every settings handler provides.
pub trait Handler {
    fn state(&self) -> &HandlerState;

    fn state_mut(&mut self) -> &mut HandlerState;

    /// Performs the side effect for the configured value.
    /// Returns false when the handler failed; the run stops there.
    fn apply(&mut self) -> bool;

    /// Human readable description used as the report heading
    fn label(&self) -> String;

    fn set_param1(&mut self, value: &str) {
        self.state_mut().param1 = value.to_string();
    }

    fn set_param2(&mut self, value: &str) {
        self.state_mut().param2 = value.to_string();
    }

    fn set_param3(&mut self, value: &str) {
        self.state_mut().param3 = value.to_string();
    }

    fn set_value(&mut self, value: &str) {
        self.state_mut().value = value.to_string();
    }

    fn param1(&self) -> &str {
        &self.state().param1
    }

    fn param2(&self) -> &str {
        &self.state().param2
    }

    fn param3(&self) -> &str {
        &self.state().param3
    }

    fn value(&self) -> &str {
        &self.state().value
    }

    fn status(&self) -> HandlerStatus {
        self.state().status()
    }

    fn messages(&self) -> &[Message] {
        self.state().messages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Noop {
        state: HandlerState,
    }

    impl Handler for Noop {
        fn state(&self) -> &HandlerState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut HandlerState {
            &mut self.state
        }

        fn apply(&mut self) -> bool {
            self.state.add_message(MessageLevel::Skipped, "nothing to do");
            self.state.finish(HandlerStatus::Skipped)
        }

        fn label(&self) -> String {
            format!("Noop {}", self.param1())
        }
    }

    #[test]
    fn test_provided_setters_write_state() {
        let mut handler = Noop::default();
        handler.set_param1("a");
        handler.set_param2("b");
        handler.set_param3("c");
        handler.set_value("v");

        assert_eq!(
            (handler.param1(), handler.param2(), handler.param3(), handler.value()),
            ("a", "b", "c", "v")
        );
        assert_eq!(handler.status(), HandlerStatus::NotExecuted);
        assert!(handler.messages().is_empty());
    }

    #[test]
    fn test_finish_reports_success_unless_error() {
        let mut handler = Noop::default();
        assert!(handler.apply());
        assert_eq!(handler.status(), HandlerStatus::Skipped);
        assert_eq!(handler.messages()[0].to_string(), "[SKIPPED] nothing to do");

        let mut state = HandlerState::default();
        assert!(!state.finish(HandlerStatus::Error));
        assert_eq!(state.status(), HandlerStatus::Error);
    }

    #[test]
    fn test_status_display_names() {
        assert_eq!(HandlerStatus::NotExecuted.to_string(), "not_executed");
        assert_eq!(HandlerStatus::AlreadyInPlace.to_string(), "already_in_place");
        assert!(HandlerStatus::Error.is_failure());
        assert!(!HandlerStatus::SubjectNotFound.is_failure());
    }
}
