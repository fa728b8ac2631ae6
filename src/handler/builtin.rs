//! Built-in handlers shipped with the binary.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use super::{Handler, HandlerState, HandlerStatus, MessageLevel};

/// Records the configured value as a message. Useful for checking which value a
/// settings table resolves to for an environment.
#[derive(Default)]
pub struct EchoHandler {
    state: HandlerState,
}

impl Handler for EchoHandler {
    fn state(&self) -> &HandlerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut HandlerState {
        &mut self.state
    }

    fn apply(&mut self) -> bool {
        let text = format!("Value: {}", self.state.value);
        self.state.add_message(MessageLevel::Info, text);
        self.state.finish(HandlerStatus::Done)
    }

    fn label(&self) -> String {
        format!(
            "Echo (param1: {}, param2: {}, param3: {})",
            self.state.param1, self.state.param2, self.state.param3
        )
    }
}

/// Writes the configured value into the file named by param1.
#[derive(Default)]
pub struct FileContentHandler {
    state: HandlerState,
}

impl Handler for FileContentHandler {
    fn state(&self) -> &HandlerState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut HandlerState {
        &mut self.state
    }

    fn apply(&mut self) -> bool {
        let target = self.state.param1.trim().to_string();
        if target.is_empty() {
            self.state
                .add_message(MessageLevel::Error, "No target file set in param1");
            return self.state.finish(HandlerStatus::Error);
        }
        let path = Path::new(&target);

        if let Ok(current) = fs::read_to_string(path) {
            if current == self.state.value {
                self.state.add_message(
                    MessageLevel::Skipped,
                    format!("{} already contains the expected value", path.display()),
                );
                return self.state.finish(HandlerStatus::AlreadyInPlace);
            }
        }

        match fs::write(path, &self.state.value) {
            Ok(()) => {
                debug!("Wrote {} bytes to {}", self.state.value.len(), path.display());
                self.state.add_message(
                    MessageLevel::Ok,
                    format!("Updated {}", path.display()),
                );
                self.state.finish(HandlerStatus::Done)
            }
            Err(e) => {
                warn!("Failed to write {}: {}", path.display(), e);
                self.state.add_message(
                    MessageLevel::Error,
                    format!("Could not write {}: {}", path.display(), e),
                );
                self.state.finish(HandlerStatus::Error)
            }
        }
    }

    fn label(&self) -> String {
        format!("File content (file: {})", self.state.param1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_echo_records_value() {
        let mut handler = EchoHandler::default();
        handler.set_param1("a");
        handler.set_value("hello");

        assert!(handler.apply());
        assert_eq!(handler.status(), HandlerStatus::Done);
        assert_eq!(handler.messages()[0].to_string(), "[INFO] Value: hello");
        assert!(handler.label().starts_with("Echo (param1: a"));
    }

    #[test]
    fn test_file_content_writes_then_reports_in_place() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("robots.txt");
        let target_str = target.to_str().unwrap();

        let mut first = FileContentHandler::default();
        first.set_param1(target_str);
        first.set_value("User-agent: *");
        assert!(first.apply());
        assert_eq!(first.status(), HandlerStatus::Done);
        assert_eq!(fs::read_to_string(&target).unwrap(), "User-agent: *");

        let mut second = FileContentHandler::default();
        second.set_param1(target_str);
        second.set_value("User-agent: *");
        assert!(second.apply());
        assert_eq!(second.status(), HandlerStatus::AlreadyInPlace);
    }

    #[test]
    fn test_file_content_fails_without_target() {
        let mut handler = FileContentHandler::default();
        handler.set_value("x");

        assert!(!handler.apply());
        assert_eq!(handler.status(), HandlerStatus::Error);
    }

    #[test]
    fn test_file_content_fails_on_unwritable_path() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("missing").join("file.txt");

        let mut handler = FileContentHandler::default();
        handler.set_param1(target.to_str().unwrap());
        handler.set_value("x");

        assert!(!handler.apply());
        assert_eq!(handler.status(), HandlerStatus::Error);
        assert_eq!(handler.messages()[0].level, MessageLevel::Error);
    }
}
