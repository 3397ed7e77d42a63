//! Compare settings and engine limits.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::editor::ViewId;

/// Default bound on the diff search trace, in stored cells.
pub const DEFAULT_LCS_TRACE_CELL_LIMIT: usize = 1 << 25;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Fold ASCII case before hashing lines and words.
    pub ignore_case: bool,
    /// Skip spaces and tabs while hashing lines; drop whitespace words while
    /// tokenizing.
    pub ignore_spaces: bool,
    /// Detect line runs relocated between the documents.
    pub detect_moves: bool,
    /// The view holding the older file. Its unmatched lines paint as removed,
    /// the other view's as added.
    pub old_file_view: ViewId,
    /// Upper bound on diff-search memory, in stored trace cells. Exceeding it
    /// fails the compare instead of allocating further.
    pub lcs_trace_cell_limit: usize,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            ignore_case: false,
            ignore_spaces: false,
            detect_moves: true,
            old_file_view: ViewId::Main,
            lcs_trace_cell_limit: DEFAULT_LCS_TRACE_CELL_LIMIT,
        }
    }
}

impl CompareConfig {
    pub fn builder() -> CompareConfigBuilder {
        CompareConfigBuilder {
            inner: CompareConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lcs_trace_cell_limit == 0 {
            return Err(ConfigError::NonPositiveLimit {
                field: "lcs_trace_cell_limit",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    NonPositiveLimit { field: &'static str },
}

#[derive(Debug, Clone, Default)]
pub struct CompareConfigBuilder {
    inner: CompareConfig,
}

impl CompareConfigBuilder {
    pub fn new() -> Self {
        CompareConfig::builder()
    }

    pub fn ignore_case(mut self, value: bool) -> Self {
        self.inner.ignore_case = value;
        self
    }

    pub fn ignore_spaces(mut self, value: bool) -> Self {
        self.inner.ignore_spaces = value;
        self
    }

    pub fn detect_moves(mut self, value: bool) -> Self {
        self.inner.detect_moves = value;
        self
    }

    pub fn old_file_view(mut self, value: ViewId) -> Self {
        self.inner.old_file_view = value;
        self
    }

    pub fn lcs_trace_cell_limit(mut self, value: usize) -> Self {
        self.inner.lcs_trace_cell_limit = value;
        self
    }

    pub fn build(self) -> Result<CompareConfig, ConfigError> {
        self.inner.validate()?;
        Ok(self.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_conservative() {
        let config = CompareConfig::default();
        assert!(!config.ignore_case);
        assert!(!config.ignore_spaces);
        assert!(config.detect_moves);
        assert_eq!(config.old_file_view, ViewId::Main);
        assert_eq!(config.lcs_trace_cell_limit, DEFAULT_LCS_TRACE_CELL_LIMIT);
    }

    #[test]
    fn serde_roundtrip_preserves_defaults() {
        let config = CompareConfig::default();
        let json = serde_json::to_string(&config).expect("serialize default config");
        let parsed: CompareConfig = serde_json::from_str(&json).expect("deserialize config");
        assert_eq!(config, parsed);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parsed: CompareConfig =
            serde_json::from_str(r#"{"ignore_case": true}"#).expect("partial config");
        assert!(parsed.ignore_case);
        assert!(parsed.detect_moves);
        assert_eq!(parsed.lcs_trace_cell_limit, DEFAULT_LCS_TRACE_CELL_LIMIT);
    }

    #[test]
    fn builder_rejects_zero_trace_limit() {
        let err = CompareConfig::builder()
            .lcs_trace_cell_limit(0)
            .build()
            .expect_err("zero limit must be rejected");
        assert!(matches!(
            err,
            ConfigError::NonPositiveLimit {
                field: "lcs_trace_cell_limit"
            }
        ));
    }

    #[test]
    fn builder_sets_all_fields() {
        let config = CompareConfig::builder()
            .ignore_case(true)
            .ignore_spaces(true)
            .detect_moves(false)
            .old_file_view(ViewId::Sub)
            .lcs_trace_cell_limit(1024)
            .build()
            .expect("valid config");
        assert!(config.ignore_case);
        assert!(config.ignore_spaces);
        assert!(!config.detect_moves);
        assert_eq!(config.old_file_view, ViewId::Sub);
        assert_eq!(config.lcs_trace_cell_limit, 1024);
    }
}
