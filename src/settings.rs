//! Settings table parsing
//!
//! The settings table is a CSV file whose first row names the columns. Columns 0-3
//! hold the handler type and its three parameters, every further column holds the
//! values for one environment:
//!
//! ```text
//! Handler,Param1,Param2,Param3,dev,prod
//! Echo,greeting,,,hello dev,hello prod
//! # comment rows and blank rows are skipped
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::constants::{
    self, FIRST_ENVIRONMENT_COLUMN, HANDLER_COLUMN, PARAM1_COLUMN, PARAM2_COLUMN, PARAM3_COLUMN,
};
use crate::error::{EstError, Result};
use crate::handler::HandlerRegistry;
use crate::index::{HandlerKey, HandlerIndex};

/// One data row, reduced to the columns relevant for the selected environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsRow {
    pub handler_type: String,
    pub param1: String,
    pub param2: String,
    pub param3: String,
    pub value: String,
    /// 1-based line of the row in the source file
    pub line: u64,
}

impl SettingsRow {
    pub fn key(&self) -> HandlerKey {
        HandlerKey::new(&self.handler_type, &self.param1, &self.param2, &self.param3)
    }
}

/// A validated settings table for a single environment
#[derive(Debug, Clone)]
pub struct SettingsTable {
    pub environment: String,
    /// Index of the environment's column in the header
    pub column: usize,
    /// Data rows in file order, comments and blank rows removed
    pub rows: Vec<SettingsRow>,
}

impl SettingsTable {
    /// Open and read a settings file from disk
    pub fn open(path: impl AsRef<Path>, environment: &str) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            EstError::Format(format!(
                "Could not open settings file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_reader(file, environment)
    }

    /// Read a settings table from any CSV source, keeping the values of `environment`
    pub fn from_reader<R: Read>(reader: R, environment: &str) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let mut records = rdr.records();

        let labels = match records.next() {
            Some(Ok(labels)) if !labels.is_empty() => labels,
            Some(Err(e)) => {
                return Err(EstError::Format(format!(
                    "Error while reading labels from csv file: {}",
                    e
                )))
            }
            _ => {
                return Err(EstError::Format(
                    "Error while reading labels from csv file: no header row".to_string(),
                ))
            }
        };

        let column = labels
            .iter()
            .position(|label| label == environment)
            .ok_or_else(|| {
                EstError::Config(format!(
                    "Could not find environment \"{}\" in csv file",
                    environment
                ))
            })?;
        if column < FIRST_ENVIRONMENT_COLUMN {
            return Err(EstError::Config(format!(
                "Environment \"{}\" cannot be defined in one of the first {} columns",
                environment, FIRST_ENVIRONMENT_COLUMN
            )));
        }
        debug!("Environment \"{}\" found in column {}", environment, column);

        let mut rows = Vec::new();
        for record in records {
            let record = record.map_err(|e| {
                EstError::Format(format!("Error while reading csv file: {}", e))
            })?;
            let cell = |i: usize| record.get(i).unwrap_or("").to_string();

            let handler_type = cell(HANDLER_COLUMN).trim().to_string();
            if constants::is_comment_cell(&handler_type) {
                continue;
            }

            rows.push(SettingsRow {
                handler_type,
                param1: cell(PARAM1_COLUMN),
                param2: cell(PARAM2_COLUMN),
                param3: cell(PARAM3_COLUMN),
                value: cell(column),
                line: record.position().map(|p| p.line()).unwrap_or_default(),
            });
        }

        Ok(Self {
            environment: environment.to_string(),
            column,
            rows,
        })
    }
}

/// Turns settings rows into configured handlers and adds them to an index
pub struct SettingsParser<'a> {
    registry: &'a HandlerRegistry,
}

impl<'a> SettingsParser<'a> {
    pub fn new(registry: &'a HandlerRegistry) -> Self {
        Self { registry }
    }

    /// Read `reader` and add one handler per data row to `index`.
    ///
    /// Rows are added in file order. Feeding the same table into an index that
    /// already holds its handlers fails on the first row with a duplicate-key error.
    /// Returns the number of handlers added.
    #[instrument(skip(self, reader, index))]
    pub fn parse_into<R: Read>(
        &self,
        reader: R,
        environment: &str,
        index: &mut HandlerIndex,
    ) -> Result<usize> {
        let table = SettingsTable::from_reader(reader, environment)?;
        self.build(table, index)
    }

    /// Add one configured handler per row of an already validated table
    pub fn build(&self, table: SettingsTable, index: &mut HandlerIndex) -> Result<usize> {
        let count = table.rows.len();

        for row in table.rows {
            let mut handler = self.registry.create(&row.handler_type)?;
            handler.set_param1(&row.param1);
            handler.set_param2(&row.param2);
            handler.set_param3(&row.param3);
            handler.set_value(&row.value);

            debug!("Line {}: configured {} handler", row.line, row.handler_type);
            index.insert(row.key(), handler)?;
            metrics::counter!("est_handlers_parsed_total", "handler" => row.handler_type)
                .increment(1);
        }

        info!(
            "Parsed {} handlers for environment \"{}\"",
            count, table.environment
        );
        Ok(count)
    }
}
