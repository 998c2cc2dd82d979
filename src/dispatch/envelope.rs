//! Request envelope parsing.
//!
//! Two shapes are accepted:
//!
//! - command shape: `{"cmd": "search", "id": "s1", "q": "sea"}`; the payload
//!   is the envelope without `cmd`, `id` and `jpc`;
//! - object shape: `{"id": "s1", "jpc": "1.0", "obj": "searcher", "method": "search", "params": {}}`,
//!   named `searcher.search` with `params` as payload.

use serde_json::{Map, Value};

use crate::dispatch::command::Command;
use crate::error::{JpcError, Result};

const KEY_CMD: &str = "cmd";
const KEY_ID: &str = "id";
const KEY_JPC: &str = "jpc";
const KEY_OBJ: &str = "obj";
const KEY_METHOD: &str = "method";
const KEY_PARAMS: &str = "params";

/// A parsed request whose command is not resolved yet.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    id: Option<String>,
    fields: Map<String, Value>,
}

impl Envelope {
    /// Parse the raw request bytes. Only syntax is checked here.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| JpcError::parse(format!("request is not UTF-8: {e}")))?;
        let value: Value = serde_json::from_str(text)
            .map_err(|e| JpcError::parse(format!("request is not JSON: {e}")))?;
        let Value::Object(fields) = value else {
            return Err(JpcError::parse("request must be a JSON object"));
        };

        let id = match fields.get(KEY_ID) {
            Some(Value::String(id)) => Some(id.clone()),
            Some(Value::Number(id)) => Some(id.to_string()),
            _ => None,
        };

        Ok(Envelope { id, fields })
    }

    /// The session id named by the request.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The command name and its payload.
    pub fn name_and_payload(mut self) -> Result<(String, Value)> {
        if let Some(cmd) = self.fields.remove(KEY_CMD) {
            let Value::String(name) = cmd else {
                return Err(JpcError::invalid_input("cmd must be a string"));
            };
            self.fields.remove(KEY_ID);
            self.fields.remove(KEY_JPC);
            return Ok((name, Value::Object(self.fields)));
        }

        match (self.fields.get(KEY_OBJ), self.fields.get(KEY_METHOD)) {
            (Some(Value::String(obj)), Some(Value::String(method))) => {
                let name = format!("{obj}.{method}");
                let payload = match self.fields.remove(KEY_PARAMS) {
                    None | Some(Value::Null) => Value::Object(Map::new()),
                    Some(params @ Value::Object(_)) => params,
                    Some(_) => {
                        return Err(JpcError::invalid_input(format!(
                            "params of {name} must be an object"
                        )));
                    }
                };
                Ok((name, payload))
            }
            (None, None) => Err(JpcError::invalid_input(
                "request names no command: expected cmd or obj/method",
            )),
            _ => Err(JpcError::invalid_input("obj and method must both be strings")),
        }
    }

    /// Resolve and decode the command.
    pub fn into_command(self) -> Result<Command> {
        let (name, payload) = self.name_and_payload()?;
        Command::from_parts(&name, payload)
    }
}
