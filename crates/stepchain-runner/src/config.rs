use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

const DEFAULT_LABEL: &str = "stepchain";

/// How a nested scope relates to the scope it was opened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum NestingMode {
    /// Each nested scope is a savepoint; rolling it back only discards its
    /// own writes.
    #[default]
    Savepoint,
    /// Nested scopes join the outermost one; rolling back a nested scope
    /// makes the whole transaction roll back.
    Joined,
}

impl NestingMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Savepoint => "savepoint",
            Self::Joined => "joined",
        }
    }
}

impl std::fmt::Display for NestingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings for a [`Runner`](crate::Runner).
///
/// Read from the optional `[stepchain]` table of a TOML document:
///
/// ```toml
/// [stepchain]
/// label = "orders"
/// log-payloads = true
/// nesting = "joined"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct RunnerConfig {
    label: Option<String>,
    log_payloads: bool,
    nesting: NestingMode,
}

#[derive(Debug, Deserialize)]
struct ConfigDocument {
    stepchain: Option<RunnerConfig>,
}

impl RunnerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_log_payloads(mut self, log_payloads: bool) -> Self {
        self.log_payloads = log_payloads;
        self
    }

    #[must_use]
    pub fn with_nesting(mut self, nesting: NestingMode) -> Self {
        self.nesting = nesting;
        self
    }

    /// Name used for the tracing span around each run.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(DEFAULT_LABEL)
    }

    /// Whether failure payloads are included in log events.
    #[must_use]
    pub const fn log_payloads(&self) -> bool {
        self.log_payloads
    }

    #[must_use]
    pub const fn nesting(&self) -> NestingMode {
        self.nesting
    }

    /// Parse the `[stepchain]` table from a TOML document.
    ///
    /// A document without the table yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is not valid TOML or
    /// the table has unexpected keys or values.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let document: ConfigDocument = toml::from_str(content)?;
        Ok(document.stepchain.unwrap_or_default())
    }

    /// Read and parse a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read, or
    /// [`ConfigError::ParseFile`] if its content is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let document: ConfigDocument =
            toml::from_str(&content).map_err(|source| ConfigError::ParseFile {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(document.stepchain.unwrap_or_default())
    }
}
