//! Workspace-wide constants.

/// Environment variable holding a JSON-encoded [`CompositionConfig`](crate::config::CompositionConfig).
pub const CONFIG_ENV_VAR: &str = "STAGEWIRE_CONFIG";

/// Default path the CLI looks at for a configuration file.
pub const DEFAULT_CONFIG_FILE: &str = "stagewire.json";

/// Maximum length of a service name, in bytes.
pub const MAX_SERVICE_NAME_LEN: usize = 128;

/// Application name used in CLI output.
pub const APP_NAME: &str = "stagewire";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "stagewire";
