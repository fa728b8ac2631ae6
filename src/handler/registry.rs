use std::collections::HashMap;

use super::builtin::{EchoHandler, FileContentHandler};
use super::Handler;
use crate::constants;
use crate::error::{EstError, Result};

/// Builds a fresh, unconfigured handler
pub type HandlerFactory = Box<dyn Fn() -> Box<dyn Handler>>;

/// Registry mapping handler type names (column 0 of the settings table) to factories
pub struct HandlerRegistry {
    factories: HashMap<String, HandlerFactory>,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Create a registry with the built-in handlers registered
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(constants::ECHO_HANDLER, || Box::new(EchoHandler::default()));
        registry.register(constants::FILE_CONTENT_HANDLER, || {
            Box::new(FileContentHandler::default())
        });
        registry
    }

    /// Register a factory for a handler type; a later registration replaces an earlier one
    pub fn register<F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        F: Fn() -> Box<dyn Handler> + 'static,
    {
        self.factories.insert(type_name.into(), Box::new(factory));
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Construct a new handler of the given type
    pub fn create(&self, type_name: &str) -> Result<Box<dyn Handler>> {
        self.factories
            .get(type_name)
            .map(|factory| factory())
            .ok_or_else(|| {
                EstError::Config(format!("Could not find handler class \"{}\"", type_name))
            })
    }

    /// List all registered type names, sorted
    pub fn list_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.factories.keys().map(|k| k.as_str()).collect();
        types.sort_unstable();
        types
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}
