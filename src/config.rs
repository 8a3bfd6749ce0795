//! Pass configuration

use thiserror::Error;

/// Errors reported by [`PassConfig::validate`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A TODO pattern is not a valid regular expression.
    #[error("invalid TODO pattern `{pattern}`: {source}")]
    InvalidTodoPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Options for the general analysis pass.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PassConfig {
    /// Keep analyzing ancestors of nodes that already reported an error
    pub force_highlight_parents: bool,
    /// Upper bound (milliseconds) of the randomized restart delay
    pub restart_jitter_ms: u64,
    /// Analyze injected documents on the rayon pool
    pub parallel_injections: bool,
    /// Include every ancestor of the common parent when extracting nodes
    pub include_all_ancestors: bool,
    /// Emit an informational marker over each injected host shred
    pub highlight_injected_fragments: bool,
    /// Regular expressions recognized as action-item markers
    pub todo_patterns: Vec<String>,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            force_highlight_parents: false,
            restart_jitter_ms: 100,
            parallel_injections: true,
            include_all_ancestors: true,
            highlight_injected_fragments: true,
            todo_patterns: vec![r"\bTODO\b.*".to_string(), r"\bFIXME\b.*".to_string()],
        }
    }
}

impl PassConfig {
    /// Check that every TODO pattern compiles.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for pattern in &self.todo_patterns {
            regex::Regex::new(pattern).map_err(|source| ConfigError::InvalidTodoPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }
        Ok(())
    }
}
