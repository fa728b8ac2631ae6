use std::collections::HashMap;
use std::fmt;

use crate::error::{EstError, Result};
use crate::handler::Handler;

/// Lookup key of a handler: its type name plus the three parameters from the same row
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerKey {
    pub handler_type: String,
    pub param1: String,
    pub param2: String,
    pub param3: String,
}

impl HandlerKey {
    pub fn new(handler_type: &str, param1: &str, param2: &str, param3: &str) -> Self {
        Self {
            handler_type: handler_type.to_string(),
            param1: param1.to_string(),
            param2: param2.to_string(),
            param3: param3.to_string(),
        }
    }
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.handler_type, self.param1, self.param2, self.param3
        )
    }
}

/// Owns every parsed handler, in file order, and indexes them by [`HandlerKey`].
#[derive(Default)]
pub struct HandlerIndex {
    handlers: Vec<Box<dyn Handler>>,
    positions: HashMap<HandlerKey, usize>,
}

impl HandlerIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a handler under `key`. Fails if the key was used before; the index is left
    /// untouched in that case.
    pub fn insert(&mut self, key: HandlerKey, handler: Box<dyn Handler>) -> Result<()> {
        if self.positions.contains_key(&key) {
            return Err(EstError::Config(format!(
                "This param combination was used before: {}",
                key
            )));
        }
        self.positions.insert(key, self.handlers.len());
        self.handlers.push(handler);
        Ok(())
    }

    pub fn get(&self, key: &HandlerKey) -> Option<&dyn Handler> {
        self.positions
            .get(key)
            .map(|&position| self.handlers[position].as_ref())
    }

    /// Handlers in the order their rows appear in the settings table
    pub fn handlers(&self) -> &[Box<dyn Handler>] {
        &self.handlers
    }

    pub fn handlers_mut(&mut self) -> &mut [Box<dyn Handler>] {
        &mut self.handlers
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::builtin::EchoHandler;

    fn echo(value: &str) -> Box<dyn Handler> {
        let mut handler: Box<dyn Handler> = Box::new(EchoHandler::default());
        handler.set_value(value);
        handler
    }

    #[test]
    fn test_insert_and_get_preserve_order() {
        let mut index = HandlerIndex::new();
        index.insert(HandlerKey::new("Echo", "a", "", ""), echo("1")).unwrap();
        index.insert(HandlerKey::new("Echo", "b", "", ""), echo("2")).unwrap();

        assert_eq!(index.len(), 2);
        let values: Vec<&str> = index.handlers().iter().map(|h| h.value()).collect();
        assert_eq!(values, vec!["1", "2"]);

        let found = index.get(&HandlerKey::new("Echo", "b", "", "")).unwrap();
        assert_eq!(found.value(), "2");
        assert!(index.get(&HandlerKey::new("Echo", "c", "", "")).is_none());
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let mut index = HandlerIndex::new();
        let key = HandlerKey::new("Echo", "a", "b", "c");
        index.insert(key.clone(), echo("dev")).unwrap();

        let err = index.insert(key.clone(), echo("prod")).unwrap_err();
        assert!(matches!(err, EstError::Config(_)));
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(&key).unwrap().value(), "dev");
    }

    #[test]
    fn test_keys_differing_in_param3_are_distinct() {
        let mut index = HandlerIndex::new();
        index.insert(HandlerKey::new("Echo", "a", "b", "c"), echo("1")).unwrap();
        index.insert(HandlerKey::new("Echo", "a", "b", "d"), echo("2")).unwrap();

        assert_eq!(index.len(), 2);
    }
}
