/// Column layout of the settings table.
/// Columns before `FIRST_ENVIRONMENT_COLUMN` are reserved for the handler type and its
/// three lookup parameters; every later column is an environment.
pub const HANDLER_COLUMN: usize = 0;
pub const PARAM1_COLUMN: usize = 1;
pub const PARAM2_COLUMN: usize = 2;
pub const PARAM3_COLUMN: usize = 3;
pub const FIRST_ENVIRONMENT_COLUMN: usize = 4;

/// A handler cell starting with one of these marks a comment row
pub const COMMENT_MARKERS: [char; 2] = ['#', '/'];

pub const STATUS_SUMMARY_HEADING: &str = "Status summary:";

// Environment variables consulted when resolving the run configuration
pub const ENVIRONMENT_VAR: &str = "EST_ENVIRONMENT";
pub const SETTINGS_FILE_VAR: &str = "EST_SETTINGS_FILE";

pub const DEFAULT_CONFIG_FILE: &str = "est.toml";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const LOG_FILE_PREFIX: &str = "est.log";

// Built-in handler type names
pub const ECHO_HANDLER: &str = "Echo";
pub const FILE_CONTENT_HANDLER: &str = "FileContent";

/// Returns true when a (trimmed) handler cell marks a blank or comment row
pub fn is_comment_cell(cell: &str) -> bool {
    cell.is_empty() || cell.starts_with(COMMENT_MARKERS)
}
