//! The search engine behind the bridge: a map of sessions.

use std::sync::Arc;

use ahash::AHashMap;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::analysis::AnalyzerRegistry;
use crate::config::BridgeConfig;
use crate::dispatch::command::Command;
use crate::engine::session::Session;
use crate::error::Result;
use crate::search::ScoringParams;

/// Every session created during one process lifetime.
#[derive(Debug)]
pub struct Engine {
    sessions: AHashMap<String, Session>,
    analyzers: Arc<AnalyzerRegistry>,
    config: BridgeConfig,
}

impl Engine {
    /// Create an engine with no session.
    pub fn new(config: BridgeConfig) -> Result<Self> {
        Ok(Engine {
            sessions: AHashMap::new(),
            analyzers: Arc::new(AnalyzerRegistry::new()?),
            config,
        })
    }

    /// The configuration the engine was created with.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Number of live sessions.
    pub fn num_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// A session, if it exists.
    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    /// Execute a command against a session.
    ///
    /// Mutating commands create the session on first use. Read-only commands
    /// on an unknown id run against an empty session that is not kept.
    pub fn execute(
        &mut self,
        session_id: &str,
        command: Command,
        scoring: &ScoringParams,
    ) -> Result<Vec<Value>> {
        debug!(session = session_id, mutating = command.is_mutating(), "executing");

        match command {
            Command::SessionOpen => {
                let id = Uuid::new_v4().to_string();
                self.sessions.insert(id.clone(), Session::new());
                info!(session = %id, "session opened");
                return Ok(vec![json!({ "id": id })]);
            }
            Command::SessionClose => {
                let closed = self.sessions.remove(session_id).is_some();
                info!(session = session_id, closed, "session closed");
                return Ok(vec![json!({ "closed": closed })]);
            }
            _ => {}
        }

        let analyzers = &self.analyzers;
        let config = &self.config;
        let mut scratch;
        let session = if command.is_mutating() {
            self.sessions.entry(session_id.to_string()).or_default()
        } else {
            match self.sessions.get_mut(session_id) {
                Some(session) => session,
                None => {
                    scratch = Session::new();
                    &mut scratch
                }
            }
        };

        match command {
            Command::IndexDocument(params) => session.index_document(analyzers, params),
            Command::Search(params) => session.search(config, scoring, params),
            Command::Delete(params) | Command::WriterDeleteTerm(params) => session.delete(params),
            Command::Commit => session.commit_command(),
            Command::NumDocs => Ok(session.num_docs()),
            Command::AddTextField(params) => session.add_text_field(analyzers, params),
            Command::AddField(field_type, params) => session.add_field(field_type, params),
            Command::BuildSchema => session.build_schema(),
            Command::GetFieldEntry(params) => session.get_field_entry(params),
            Command::GetFieldName(params) => session.get_field_name(params),
            Command::NumFields => session.num_fields(),
            Command::CreateDocument => Ok(session.create_document()),
            Command::AddValue(field_type, params) => session.add_value(field_type, params),
            Command::CreateIndex(params) => session.create_index(analyzers, params),
            Command::ReaderBuilder => session.reader_builder(),
            Command::WriterAddDocument(params) => session.writer_add_document(params),
            Command::WriterCommit => session.writer_commit(),
            Command::ReaderSearcher => session.reader_searcher(),
            Command::ParserForIndex(params) => session.parser_for_index(params),
            Command::ParseQuery(params) => session.parse_query(params),
            Command::ParseFuzzyQuery(params) => session.parse_fuzzy_query(analyzers, params),
            Command::SearcherSearch(params) => session.searcher_search(config, scoring, params),
            Command::Docset(params) => session.docset(config, scoring, params),
            Command::GetDocument(params) => session.get_document(scoring, params),
            Command::SearchRaw(params) => session.search_raw(params),
            Command::FuzzySearch(params) => session.fuzzy_search(config, scoring, params),
            Command::SessionOpen | Command::SessionClose => Ok(Vec::new()),
        }
    }
}
