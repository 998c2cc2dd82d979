//! Request dispatch: envelope parsing, command resolution and response encoding.
//!
//! [`dispatch`] is the only entry point. It never panics on malformed input;
//! every failure is returned in the [`Reply`] so the ffi layer can turn it into
//! a status code and an error buffer.

pub mod command;
pub mod envelope;
pub mod response;

use serde_json::Value;
use tracing::{debug, warn};

use crate::engine::Engine;
use crate::error::Result;
use crate::search::ScoringParams;

pub use command::{Command, FieldRef, COMMAND_NAMES};
pub use envelope::Envelope;
pub use response::{encode_items, error_body, JPC_VERSION};

/// Outcome of one request.
#[derive(Debug)]
pub struct Reply {
    /// Session the request ran against; empty when the envelope did not parse.
    pub id: String,
    /// Result items, one buffer each.
    pub result: Result<Vec<Value>>,
}

/// Parse a raw request, resolve its command and execute it on `engine`.
pub fn dispatch(engine: &mut Engine, scoring: &ScoringParams, bytes: &[u8]) -> Reply {
    let envelope = match Envelope::parse(bytes) {
        Ok(envelope) => envelope,
        Err(e) => {
            warn!(error = %e, "rejecting request");
            return Reply {
                id: String::new(),
                result: Err(e),
            };
        }
    };

    let id = envelope
        .id()
        .map(str::to_string)
        .unwrap_or_else(|| engine.config().default_session.clone());

    let result = envelope.into_command().and_then(|command| {
        debug!(session = %id, ?command, "dispatching");
        engine.execute(&id, command, scoring)
    });
    if let Err(e) = &result {
        warn!(session = %id, kind = e.kind(), error = %e, "request failed");
    }

    Reply { id, result }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::error::JpcError;

    fn engine() -> Engine {
        Engine::new(BridgeConfig::default()).unwrap()
    }

    #[test]
    fn test_parse_failure_has_empty_id() {
        let reply = dispatch(&mut engine(), &ScoringParams::default(), b"{not json");
        assert_eq!(reply.id, "");
        assert!(matches!(reply.result, Err(JpcError::Parse(_))));
    }

    #[test]
    fn test_missing_id_uses_default_session() {
        let mut engine = engine();
        let reply = dispatch(&mut engine, &ScoringParams::default(), br#"{"cmd":"num_docs"}"#);
        assert_eq!(reply.id, "default");
        assert!(engine.session("default").is_some());
    }

    #[test]
    fn test_unknown_command() {
        let reply = dispatch(
            &mut engine(),
            &ScoringParams::default(),
            br#"{"id":"s1","cmd":"launch"}"#,
        );
        assert_eq!(reply.id, "s1");
        assert!(matches!(reply.result, Err(JpcError::UnknownCommand(_))));
    }
}
