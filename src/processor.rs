use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, instrument, warn};

use crate::error::{EstError, Result};
use crate::handler::{Handler, HandlerRegistry};
use crate::index::{HandlerIndex, HandlerKey};
use crate::report::{self, StatisticsSummary};
use crate::settings::{SettingsParser, SettingsTable};

/// Result of an apply run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Every handler ran and none failed
    Completed { applied: usize },
    /// A handler failed; later handlers were left untouched
    Aborted { applied: usize, failed: String },
}

impl ApplyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ApplyOutcome::Completed { .. })
    }
}

/// Applies the settings of one environment from a settings file.
///
/// The settings file is parsed on first use and the resulting handlers are kept for
/// the lifetime of the processor, so `apply`, `handler` and `print_results` all see
/// the same handler instances.
pub struct Processor {
    environment: String,
    settings_file: PathBuf,
    registry: HandlerRegistry,
    index: HandlerIndex,
    parsed: bool,
}

impl Processor {
    /// Create a processor using the built-in handlers
    pub fn new(environment: &str, settings_file: impl AsRef<Path>) -> Result<Self> {
        Self::with_registry(environment, settings_file, HandlerRegistry::with_builtin())
    }

    pub fn with_registry(
        environment: &str,
        settings_file: impl AsRef<Path>,
        registry: HandlerRegistry,
    ) -> Result<Self> {
        let settings_file = settings_file.as_ref();
        if environment.trim().is_empty() {
            return Err(EstError::Argument("No environment parameter set.".to_string()));
        }
        if settings_file.as_os_str().is_empty() {
            return Err(EstError::Argument("No settings file set.".to_string()));
        }
        if !settings_file.is_file() {
            return Err(EstError::Argument(format!(
                "Could not read settings file '{}'.",
                settings_file.display()
            )));
        }

        Ok(Self {
            environment: environment.to_string(),
            settings_file: settings_file.to_path_buf(),
            registry,
            index: HandlerIndex::new(),
            parsed: false,
        })
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn settings_file(&self) -> &Path {
        &self.settings_file
    }

    /// Handlers in file order. Empty until the settings file has been parsed.
    pub fn handlers(&self) -> &[Box<dyn Handler>] {
        self.index.handlers()
    }

    /// Parse the settings file unless that already happened.
    ///
    /// Handlers are only kept when the whole table parsed; a failed parse leaves the
    /// processor empty so a retry reports the same error.
    fn ensure_parsed(&mut self) -> Result<()> {
        if self.parsed {
            debug!("Settings already parsed, reusing {} handlers", self.index.len());
            return Ok(());
        }

        let table = SettingsTable::open(&self.settings_file, &self.environment)?;
        let mut index = HandlerIndex::new();
        SettingsParser::new(&self.registry).build(table, &mut index)?;
        self.index = index;
        self.parsed = true;
        Ok(())
    }

    /// Run every handler in file order, stopping at the first failure.
    ///
    /// Parse errors are returned as `Err`; a failing handler is a normal outcome.
    #[instrument(skip(self), fields(environment = %self.environment))]
    pub fn apply(&mut self) -> Result<ApplyOutcome> {
        self.ensure_parsed()?;
        info!("Applying {} handlers", self.index.len());

        let mut applied = 0;
        for handler in self.index.handlers_mut() {
            let succeeded = handler.apply();
            applied += 1;
            let status = handler.status();
            metrics::counter!("est_handlers_applied_total", "status" => status.as_str())
                .increment(1);

            if !succeeded {
                let failed = handler.label();
                error!("Handler \"{}\" failed with status {}", failed, status);
                metrics::counter!("est_apply_runs_total", "outcome" => "aborted").increment(1);
                return Ok(ApplyOutcome::Aborted { applied, failed });
            }
            debug!("Handler \"{}\" finished with status {}", handler.label(), status);
        }

        info!("All {} handlers applied", applied);
        metrics::counter!("est_apply_runs_total", "outcome" => "completed").increment(1);
        Ok(ApplyOutcome::Completed { applied })
    }

    /// Look up the handler configured for an exact parameter combination
    pub fn handler(
        &mut self,
        handler_type: &str,
        param1: &str,
        param2: &str,
        param3: &str,
    ) -> Result<&dyn Handler> {
        self.ensure_parsed()?;

        let key = HandlerKey::new(handler_type, param1, param2, param3);
        self.index.get(&key).ok_or_else(|| {
            warn!("No handler indexed for {}", key);
            EstError::Lookup(format!("Parameter combination not found: {}", key))
        })
    }

    /// Write the per-handler results and the status summary to `out`
    pub fn print_results<W: Write>(&self, out: &mut W) -> Result<StatisticsSummary> {
        Ok(report::print_results(self.index.handlers(), out)?)
    }
}
