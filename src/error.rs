//! Error types.
//!
//! The reconciler and store are total over well-formed input. Everything in
//! here is a precondition violation surfaced as early as possible: a root that
//! does not resolve, a malformed attribute, a mutation registered twice, or a
//! real tree that has drifted away from the virtual tree it is diffed against.

use thiserror::Error;

/// Errors raised by tree construction, store setup, and synchronization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VdomError {
    #[error("root selector '{selector}' matched no node")]
    RootNotFound { selector: String },

    #[error("root selector '{selector}' matched {matches} nodes, expected exactly one")]
    AmbiguousRoot { selector: String, matches: usize },

    #[error("invalid attribute '{name}': {reason}")]
    InvalidAttribute { name: String, reason: &'static str },

    #[error("mutation '{name}' is registered more than once")]
    DuplicateMutation { name: String },

    #[error("no real node occupies child slot {index}; real tree diverged from the current tree")]
    MissingRealNode { index: usize },
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, VdomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = VdomError::AmbiguousRoot {
            selector: ".app".into(),
            matches: 2,
        };
        assert_eq!(
            err.to_string(),
            "root selector '.app' matched 2 nodes, expected exactly one"
        );

        let err = VdomError::InvalidAttribute {
            name: "onclick".into(),
            reason: "handler attribute needs a callback",
        };
        assert!(err.to_string().contains("onclick"));
    }
}
