//! Error types for Flowcanvas.
//!
//! All errors in Flowcanvas are represented by the `FlowError` enum,
//! which provides specific variants for different error categories.

use std::io::ErrorKind;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Flowcanvas operations.
///
/// Each variant represents a specific category of error that can occur
/// while editing a canvas, loading configuration, or talking to the workflow API.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    /// Configuration parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON, TOML).
    #[error("{0}")]
    Convert(String),

    /// Canvas state errors (operation not allowed in the current mode).
    #[error("{0}")]
    Canvas(String),

    /// Node lookup or definition errors.
    #[error("{0}")]
    Node(String),

    /// Edge lookup or definition errors.
    #[error("{0}")]
    Edge(String),

    /// Workflow resource errors.
    #[error("{0}")]
    Workflow(String),

    /// Save attempted while no workflow is selected.
    #[error("select a workflow first")]
    NoWorkflowSelected,

    /// Save attempted while a previous save is still outstanding.
    #[error("a save is already in progress")]
    SaveInProgress,

    /// The server copy changed since it was loaded.
    #[error("workflow {id} was modified by another session")]
    Conflict {
        id: i64,
    },

    /// Non-success HTTP response from the backend.
    #[error("http {status}: {body}")]
    Http {
        status: u16,
        body: String,
    },

    /// Transport level failures (connect, timeout, decode).
    #[error("{0}")]
    Transport(String),

    /// I/O operation errors.
    #[error("{0}")]
    IoError(String),

    /// Notice queue errors.
    #[error("{0}")]
    Queue(String),
}

impl From<FlowError> for String {
    fn from(val: FlowError) -> Self {
        val.to_string()
    }
}

impl From<std::io::Error> for FlowError {
    fn from(error: std::io::Error) -> Self {
        FlowError::IoError(error.to_string())
    }
}

impl From<FlowError> for std::io::Error {
    fn from(val: FlowError) -> Self {
        #[allow(clippy::io_other_error)]
        std::io::Error::new(ErrorKind::Other, val.to_string())
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(error: serde_json::Error) -> Self {
        FlowError::Convert(error.to_string())
    }
}

impl From<toml::de::Error> for FlowError {
    fn from(error: toml::de::Error) -> Self {
        FlowError::Config(error.to_string())
    }
}

impl From<reqwest::Error> for FlowError {
    fn from(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) => FlowError::Http {
                status: status.as_u16(),
                body: error.to_string(),
            },
            None => FlowError::Transport(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_workflow_message_is_user_facing() {
        assert_eq!(FlowError::NoWorkflowSelected.to_string(), "select a workflow first");
    }

    #[test]
    fn test_json_error_maps_to_convert() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(FlowError::from(err), FlowError::Convert(_)));
    }
}
