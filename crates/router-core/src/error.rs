//! Configuration error taxonomy for the derivation engine.

/// Errors raised while building the derivation inputs or deriving records.
///
/// Every variant except `GitError` is a configuration error: the invocation
/// cannot proceed and the binary exits non-zero. Git lookups degrade instead.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("no usable reference: neither a tag nor a branch is available")]
    NoReference,

    #[error("malformed region line {line}: {content:?} (expected CODE=name)")]
    MalformedRegionLine { line: usize, content: String },

    #[error("invalid region code {code:?}: expected two ASCII letters")]
    InvalidRegionCode { code: String },

    #[error("duplicate region code: {0}")]
    DuplicateRegionCode(String),

    #[error("duplicate region name: {0}")]
    DuplicateRegionName(String),

    #[error("region map is empty")]
    EmptyRegionMap,

    #[error("default region {0} is not in the region map")]
    UnknownDefaultRegion(String),

    #[error("every configured region is excluded, nothing to build")]
    NoTargetRegions,

    #[error("git error: {0}")]
    GitError(String),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result type for derivation operations.
pub type Result<T> = std::result::Result<T, RouterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_line_display() {
        let err = RouterError::MalformedRegionLine {
            line: 3,
            content: "SG singapore".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("line 3"));
        assert!(msg.contains("SG singapore"));
    }

    #[test]
    fn test_unknown_default_region_display() {
        let err = RouterError::UnknownDefaultRegion("MY".to_string());
        assert!(err.to_string().contains("MY"));
    }
}
