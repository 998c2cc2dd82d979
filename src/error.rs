//! Error types for the sarissa-jpc bridge.
//!
//! Every fallible operation inside the bridge and the engine it drives returns
//! [`Result<T>`]. Errors never cross the C boundary as values: the ffi layer
//! turns each [`JpcError`] into a status code with [`JpcError::status`] and,
//! where possible, a JSON error buffer tagged with [`JpcError::kind`].
//!
//! # Examples
//!
//! ```
//! use sarissa_jpc::error::{JpcError, Result};
//! use sarissa_jpc::ffi::status::STATUS_UNKNOWN_COMMAND;
//!
//! fn lookup(name: &str) -> Result<()> {
//!     Err(JpcError::unknown_command(name))
//! }
//!
//! let err = lookup("frobnicate").unwrap_err();
//! assert_eq!(err.status(), STATUS_UNKNOWN_COMMAND);
//! assert_eq!(err.kind(), "unknown_command");
//! ```

use thiserror::Error;

use crate::ffi::status::{
    STATUS_ALLOCATION, STATUS_ENGINE_ERROR, STATUS_INVALID_INPUT, STATUS_LIFECYCLE,
    STATUS_PARSE_ERROR, STATUS_UNKNOWN_COMMAND,
};

/// The main error type for bridge and engine operations.
#[derive(Error, Debug)]
pub enum JpcError {
    /// An operation was invoked outside the init → … → term ordering.
    #[error("Lifecycle error: {0}")]
    Lifecycle(String),

    /// The request envelope is not a UTF-8 JSON object.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The command, object or method name is not recognized.
    #[error("Not Recognized : `{0}`")]
    UnknownCommand(String),

    /// Null pointers, missing names, malformed payloads.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Schema-related errors
    #[error("Schema error: {0}")]
    Schema(String),

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Query-related errors (parsing, invalid queries, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Index and writer errors
    #[error("Index error: {0}")]
    Index(String),

    /// Document construction errors
    #[error("Document error: {0}")]
    Document(String),

    /// A referenced object does not exist yet
    #[error("Not found: {0}")]
    NotFound(String),

    /// An object exists but is not in a state that allows the call
    #[error("Bad state: {0}")]
    BadState(String),

    /// The response buffer set could not be allocated.
    #[error("Allocation failed: {0}")]
    Allocation(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for operations that may fail with JpcError.
pub type Result<T> = std::result::Result<T, JpcError>;

impl JpcError {
    /// Create a new lifecycle error.
    pub fn lifecycle<S: Into<String>>(msg: S) -> Self {
        JpcError::Lifecycle(msg.into())
    }

    /// Create a new envelope parse error.
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        JpcError::Parse(msg.into())
    }

    /// Create a new unknown command error.
    pub fn unknown_command<S: Into<String>>(name: S) -> Self {
        JpcError::UnknownCommand(name.into())
    }

    /// Create a new invalid input error.
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        JpcError::InvalidInput(msg.into())
    }

    /// Create a new schema error.
    pub fn schema<S: Into<String>>(msg: S) -> Self {
        JpcError::Schema(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        JpcError::Analysis(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        JpcError::Query(msg.into())
    }

    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        JpcError::Index(msg.into())
    }

    /// Create a new document error.
    pub fn document<S: Into<String>>(msg: S) -> Self {
        JpcError::Document(msg.into())
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        JpcError::NotFound(msg.into())
    }

    /// Create a new bad state error.
    pub fn bad_state<S: Into<String>>(msg: S) -> Self {
        JpcError::BadState(msg.into())
    }

    /// Create a new allocation error.
    pub fn allocation<S: Into<String>>(msg: S) -> Self {
        JpcError::Allocation(msg.into())
    }

    /// Status code reported across the boundary for this error.
    pub fn status(&self) -> i64 {
        match self {
            JpcError::Lifecycle(_) => STATUS_LIFECYCLE,
            JpcError::Parse(_) => STATUS_PARSE_ERROR,
            JpcError::UnknownCommand(_) => STATUS_UNKNOWN_COMMAND,
            JpcError::InvalidInput(_) => STATUS_INVALID_INPUT,
            JpcError::Allocation(_) => STATUS_ALLOCATION,
            JpcError::Schema(_)
            | JpcError::Analysis(_)
            | JpcError::Query(_)
            | JpcError::Index(_)
            | JpcError::Document(_)
            | JpcError::NotFound(_)
            | JpcError::BadState(_)
            | JpcError::Json(_) => STATUS_ENGINE_ERROR,
        }
    }

    /// Stable tag written into error buffers.
    pub fn kind(&self) -> &'static str {
        match self {
            JpcError::Lifecycle(_) => "lifecycle",
            JpcError::Parse(_) => "parse_error",
            JpcError::UnknownCommand(_) => "unknown_command",
            JpcError::InvalidInput(_) => "invalid_input",
            JpcError::Allocation(_) => "allocation",
            JpcError::Schema(_) => "schema",
            JpcError::Analysis(_) => "analysis",
            JpcError::Query(_) => "query",
            JpcError::Index(_) => "index",
            JpcError::Document(_) => "document",
            JpcError::NotFound(_) => "not_found",
            JpcError::BadState(_) => "bad_state",
            JpcError::Json(_) => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = JpcError::schema("Test schema error");
        assert_eq!(error.to_string(), "Schema error: Test schema error");

        let error = JpcError::unknown_command("some_function");
        assert_eq!(error.to_string(), "Not Recognized : `some_function`");

        let error = JpcError::lifecycle("bridge not initialized");
        assert_eq!(error.to_string(), "Lifecycle error: bridge not initialized");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(JpcError::parse("x").status(), STATUS_PARSE_ERROR);
        assert_eq!(JpcError::lifecycle("x").status(), STATUS_LIFECYCLE);
        assert_eq!(JpcError::invalid_input("x").status(), STATUS_INVALID_INPUT);
        assert_eq!(JpcError::allocation("x").status(), STATUS_ALLOCATION);
        assert_eq!(JpcError::index("x").status(), STATUS_ENGINE_ERROR);
        assert_eq!(JpcError::not_found("x").status(), STATUS_ENGINE_ERROR);
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = JpcError::from(json_error);

        match error {
            JpcError::Json(_) => {} // Expected
            _ => panic!("Expected JSON error variant"),
        }
        assert_eq!(error.kind(), "json");
    }
}
