//! Per-session engine state and the handlers of every session command.
//!
//! A session walks the object pipeline: schema builder, schema, documents,
//! index with its writer, reader, query parser and parsed queries. The
//! command shape (`index_document`, `search`, ...) shortcuts it with an
//! index on a dynamic schema.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::analysis::AnalyzerRegistry;
use crate::config::BridgeConfig;
use crate::dispatch::command::{
    AddDocumentParams, AddFieldParams, AddTextFieldParams, AddValueParams, DeleteParams,
    FieldNameParams, FieldRef, ForIndexParams, FuzzyQueryParams, GetDocumentParams,
    IndexCreateParams, IndexDocumentParams, ParseQueryParams, SearchParams, SearchRawParams,
    SearcherSearchParams, TopLimitParams,
};
use crate::document::{Document, FieldValue, NamedDocument};
use crate::error::{JpcError, Result};
use crate::index::{DocId, Index};
use crate::query::fuzzy::DEFAULT_DISTANCE;
use crate::query::{Query, QueryParser};
use crate::schema::{FieldId, FieldType, Schema, SchemaBuilder, TextKind};
use crate::search::{Explanation, ScoringParams, Searcher};

/// Segment ordinal reported in results; every index has one segment.
const SEGMENT_ORD: u32 = 0;

/// One search result as returned to the host.
#[derive(Debug, Clone, Serialize)]
pub struct HitRecord {
    /// Stored fields by name.
    pub doc: NamedDocument,
    /// BM25 score.
    pub score: f32,
    /// Document id.
    pub doc_id: DocId,
    /// Always 0.
    pub segment_ord: u32,
    /// Score explanation when requested.
    pub explain: Option<Explanation>,
    /// HTML snippets by field name.
    pub snippet: BTreeMap<String, String>,
}

/// Everything a host built up under one session id.
#[derive(Debug, Default)]
pub struct Session {
    builder: Option<SchemaBuilder>,
    schema: Option<Schema>,
    documents: Vec<Document>,
    index: Option<Index>,
    reader_ready: bool,
    reader: Option<Searcher>,
    query_parser: Option<QueryParser>,
    query: Option<Query>,
    fuzzy_query: Option<Query>,
}

impl Session {
    /// Create an empty session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The index of this session, if any.
    pub fn index(&self) -> Option<&Index> {
        self.index.as_ref()
    }

    fn require_index(&mut self) -> Result<&mut Index> {
        self.index
            .as_mut()
            .ok_or_else(|| JpcError::bad_state("an index must be created first"))
    }

    /// The index, created on a dynamic schema (or the built one) if missing.
    fn index_or_create(&mut self, analyzers: &Arc<AnalyzerRegistry>) -> Result<&mut Index> {
        if self.index.is_none() {
            let schema = self.schema.clone().unwrap_or_else(Schema::dynamic);
            debug!(dynamic = schema.is_dynamic(), "creating index on first use");
            self.index = Some(Index::create_in_ram(schema, Arc::clone(analyzers))?);
        }
        self.require_index()
    }

    /// The reader snapshot if one was taken, else the latest commit.
    fn searcher(&self) -> Result<Searcher> {
        if let Some(reader) = &self.reader {
            return Ok(reader.clone());
        }
        self.index
            .as_ref()
            .map(Index::searcher)
            .ok_or_else(|| JpcError::bad_state("an index must be created first"))
    }

    fn commit(&mut self) -> Result<u64> {
        let index = self.require_index()?;
        let opstamp = index.commit();
        let searcher = index.searcher();
        if self.reader.is_some() {
            self.reader = Some(searcher);
        }
        info!(opstamp, "committed");
        Ok(opstamp)
    }

    fn current_schema(&self) -> Result<&Schema> {
        if let Some(index) = &self.index {
            return Ok(index.schema());
        }
        self.schema
            .as_ref()
            .ok_or_else(|| JpcError::bad_state("no schema has been built"))
    }

    // ----- command shape -----

    pub(crate) fn index_document(
        &mut self,
        analyzers: &Arc<AnalyzerRegistry>,
        params: IndexDocumentParams,
    ) -> Result<Vec<Value>> {
        let opstamp = self.index_or_create(analyzers)?.add_json_document(&params.doc)?;
        debug!(opstamp, "document queued");
        Ok(vec![json!({ "opstamp": opstamp })])
    }

    pub(crate) fn search(
        &self,
        config: &BridgeConfig,
        scoring: &ScoringParams,
        params: SearchParams,
    ) -> Result<Vec<Value>> {
        let Some(index) = &self.index else {
            debug!("search before any document was indexed");
            return Ok(Vec::new());
        };
        let fields = match &params.fields {
            Some(names) => names
                .iter()
                .map(|name| index.schema().require_field(name))
                .collect::<Result<Vec<_>>>()?,
            None => index.schema().default_search_fields(),
        };
        if fields.is_empty() {
            debug!("no searchable field yet");
            return Ok(Vec::new());
        }

        let query = QueryParser::for_index(index, fields).parse_query(&params.q)?;
        let searcher = index.searcher();
        let limit = config.top_limit(params.top_limit);
        hits(&searcher, &query, limit, scoring, params.explain, &params.snippet_field)
    }

    pub(crate) fn delete(&mut self, params: DeleteParams) -> Result<Vec<Value>> {
        let term = term_text(&params.term)?;
        let opstamp = self.require_index()?.delete_term(&params.field, &term)?;
        Ok(vec![json!({ "opstamp": opstamp })])
    }

    pub(crate) fn commit_command(&mut self) -> Result<Vec<Value>> {
        let opstamp = self.commit()?;
        Ok(vec![json!({ "opstamp": opstamp })])
    }

    pub(crate) fn num_docs(&self) -> Vec<Value> {
        let num_docs = self.index.as_ref().map(Index::num_docs).unwrap_or(0);
        vec![json!({ "num_docs": num_docs })]
    }

    // ----- builder / schema -----

    pub(crate) fn add_text_field(
        &mut self,
        analyzers: &AnalyzerRegistry,
        params: AddTextFieldParams,
    ) -> Result<Vec<Value>> {
        let kind = TextKind::from_code(params.kind)?;
        if let Some(tokenizer) = &params.tokenizer {
            if !analyzers.contains(tokenizer) {
                return Err(JpcError::schema(format!("unknown tokenizer {tokenizer}")));
            }
        }
        let field = self.builder.get_or_insert_with(Schema::builder).add_text_field(
            &params.name,
            kind,
            params.stored,
            params.indexed,
            params.tokenizer.as_deref(),
        )?;
        debug!(name = %params.name, field, "text field added");
        Ok(vec![json!({ "field": field })])
    }

    pub(crate) fn add_field(
        &mut self,
        field_type: FieldType,
        params: AddFieldParams,
    ) -> Result<Vec<Value>> {
        let field = self.builder.get_or_insert_with(Schema::builder).add_field(
            &params.name,
            field_type,
            params.stored,
            params.indexed,
        )?;
        debug!(name = %params.name, field, field_type = field_type.as_str(), "field added");
        Ok(vec![json!({ "field": field })])
    }

    pub(crate) fn build_schema(&mut self) -> Result<Vec<Value>> {
        let builder = self
            .builder
            .take()
            .ok_or_else(|| JpcError::bad_state("no field has been declared"))?;
        let schema = builder.build();
        let item = json!({ "schema": &schema });
        info!(fields = schema.num_fields(), "schema built");
        self.schema = Some(schema);
        Ok(vec![item])
    }

    pub(crate) fn get_field_entry(&self, params: FieldNameParams) -> Result<Vec<Value>> {
        let schema = self.current_schema()?;
        let field = schema.require_field(first_name(&params.field)?)?;
        Ok(vec![serde_json::to_value(schema.get_field_entry(field)?)?])
    }

    pub(crate) fn get_field_name(&self, params: FieldNameParams) -> Result<Vec<Value>> {
        let schema = self.current_schema()?;
        let field = schema.require_field(first_name(&params.field)?)?;
        Ok(vec![json!(schema.get_field_name(field)?)])
    }

    pub(crate) fn num_fields(&self) -> Result<Vec<Value>> {
        Ok(vec![json!(self.current_schema()?.num_fields())])
    }

    // ----- documents -----

    pub(crate) fn create_document(&mut self) -> Vec<Value> {
        self.documents.push(Document::new());
        vec![json!({ "document_count": self.documents.len() })]
    }

    pub(crate) fn add_value(
        &mut self,
        field_type: FieldType,
        params: AddValueParams,
    ) -> Result<Vec<Value>> {
        let schema = self
            .schema
            .as_ref()
            .ok_or_else(|| JpcError::bad_state("a schema must be built before adding values"))?;
        let field = resolve_field(schema, &params.field)?;
        let value = FieldValue::from_json(field_type, &params.value)?;
        let count = self.documents.len();
        let document = document_at(&mut self.documents, params.doc_id)?;
        document.add_checked(schema, field, value)?;
        Ok(vec![json!({ "document_count": count })])
    }

    // ----- index / writer / reader -----

    pub(crate) fn create_index(
        &mut self,
        analyzers: &Arc<AnalyzerRegistry>,
        params: IndexCreateParams,
    ) -> Result<Vec<Value>> {
        if let Some(directory) = params.directory.as_deref().filter(|d| !d.is_empty()) {
            warn!(directory, "indexes live in RAM, directory ignored");
        }
        if self.index.is_some() {
            return Ok(vec![json!({ "created": false })]);
        }
        let schema = self
            .schema
            .clone()
            .ok_or_else(|| JpcError::bad_state("a schema must be built before an index"))?;
        self.index = Some(Index::create_in_ram(schema, Arc::clone(analyzers))?);
        info!("index created in RAM");
        Ok(vec![json!({ "created": true })])
    }

    pub(crate) fn reader_builder(&mut self) -> Result<Vec<Value>> {
        self.require_index()?;
        self.reader_ready = true;
        Ok(vec![json!({ "reader_builder": true })])
    }

    pub(crate) fn writer_add_document(&mut self, params: AddDocumentParams) -> Result<Vec<Value>> {
        let document = document_at(&mut self.documents, params.id)?.clone();
        let opstamp = self.require_index()?.add_document(document)?;
        debug!(id = params.id, opstamp, "document queued");
        Ok(vec![json!({ "opstamp": opstamp })])
    }

    pub(crate) fn writer_commit(&mut self) -> Result<Vec<Value>> {
        let opstamp = self.commit()?;
        Ok(vec![json!({ "id": opstamp })])
    }

    pub(crate) fn reader_searcher(&mut self) -> Result<Vec<Value>> {
        if !self.reader_ready {
            return Err(JpcError::bad_state("index.reader_builder must be called first"));
        }
        let searcher = self.require_index()?.searcher();
        let num_docs = searcher.num_docs();
        self.reader = Some(searcher);
        Ok(vec![json!({ "num_docs": num_docs })])
    }

    // ----- queries -----

    pub(crate) fn parser_for_index(&mut self, params: ForIndexParams) -> Result<Vec<Value>> {
        let index = self
            .index
            .as_ref()
            .ok_or_else(|| JpcError::bad_state("an index must be created first"))?;

        let mut fields = Vec::with_capacity(params.fields.len());
        for field in &params.fields {
            match resolve_field(index.schema(), field) {
                Ok(id) => fields.push(id),
                Err(e) => warn!(error = %e, "skipping default field"),
            }
        }

        self.query_parser = Some(QueryParser::for_index(index, fields.clone()));
        Ok(vec![json!({ "fields": fields })])
    }

    pub(crate) fn parse_query(&mut self, params: ParseQueryParams) -> Result<Vec<Value>> {
        let parser = self
            .query_parser
            .as_ref()
            .ok_or_else(|| JpcError::bad_state("query_parser.for_index must be called first"))?;
        let query = parser.parse_query(&params.query)?;
        let item = json!({ "query": &query });
        self.query = Some(query);
        Ok(vec![item])
    }

    pub(crate) fn parse_fuzzy_query(
        &mut self,
        analyzers: &Arc<AnalyzerRegistry>,
        params: FuzzyQueryParams,
    ) -> Result<Vec<Value>> {
        let [field_name] = params.field.as_slice() else {
            return Err(JpcError::invalid_input("a fuzzy query takes exactly one field"));
        };
        let [term] = params.term.as_slice() else {
            return Err(JpcError::invalid_input("a fuzzy query takes exactly one term"));
        };

        let index = self
            .index
            .as_ref()
            .ok_or_else(|| JpcError::bad_state("an index must be created first"))?;
        let field = index.schema().require_field(field_name)?;
        let parser = QueryParser::new(index.shared_schema(), Arc::clone(analyzers), vec![field]);
        let query = parser.fuzzy_query(
            field,
            term,
            params.distance.unwrap_or(DEFAULT_DISTANCE),
            params.transposition.unwrap_or(true),
        )?;

        let item = json!({ "query": &query });
        self.fuzzy_query = Some(query);
        Ok(vec![item])
    }

    // ----- searchers -----

    fn parsed_query(&self) -> Result<&Query> {
        self.query
            .as_ref()
            .ok_or_else(|| JpcError::bad_state("query_parser.parse_query must be called first"))
    }

    pub(crate) fn searcher_search(
        &self,
        config: &BridgeConfig,
        scoring: &ScoringParams,
        params: SearcherSearchParams,
    ) -> Result<Vec<Value>> {
        let query = self.parsed_query()?;
        let searcher = self.searcher()?;
        let limit = config.top_limit(params.top_limit);
        hits(&searcher, query, limit, scoring, params.explain, &params.snippet_field)
    }

    pub(crate) fn docset(
        &self,
        config: &BridgeConfig,
        scoring: &ScoringParams,
        params: TopLimitParams,
    ) -> Result<Vec<Value>> {
        let query = self.parsed_query()?;
        let searcher = self.searcher()?;
        let limit = config.top_limit(params.top_limit);

        Ok(searcher
            .search(query, limit, scoring)?
            .into_iter()
            .map(|hit| {
                json!({
                    "doc_id": hit.doc_id,
                    "score": hit.score,
                    "segment_ord": SEGMENT_ORD,
                })
            })
            .collect())
    }

    pub(crate) fn get_document(
        &self,
        scoring: &ScoringParams,
        params: GetDocumentParams,
    ) -> Result<Vec<Value>> {
        if let Some(segment_ord) = params.segment_ord.filter(|ord| *ord != SEGMENT_ORD) {
            return Err(JpcError::not_found(format!("segment {segment_ord} does not exist")));
        }
        let searcher = self.searcher()?;
        let doc = searcher.named_doc(params.doc_id)?;

        let (explanation, snippet) = match &self.query {
            Some(query) => (
                searcher.explain(query, params.doc_id, scoring)?,
                snippets(&searcher, query, params.doc_id, &params.snippet_field)?,
            ),
            None => (None, BTreeMap::new()),
        };
        let score = params
            .score
            .or_else(|| explanation.as_ref().map(|e| e.value))
            .unwrap_or(0.0);

        let record = HitRecord {
            doc,
            score,
            doc_id: params.doc_id,
            segment_ord: SEGMENT_ORD,
            explain: explanation.filter(|_| params.explain),
            snippet,
        };
        Ok(vec![serde_json::to_value(record)?])
    }

    pub(crate) fn search_raw(&self, params: SearchRawParams) -> Result<Vec<Value>> {
        let query = self.parsed_query()?;
        let searcher = self.searcher()?;

        searcher
            .search_raw(query, params.limit)?
            .into_iter()
            .map(|doc_id| Ok(serde_json::to_value(searcher.named_doc(doc_id)?)?))
            .collect()
    }

    pub(crate) fn fuzzy_search(
        &self,
        config: &BridgeConfig,
        scoring: &ScoringParams,
        params: TopLimitParams,
    ) -> Result<Vec<Value>> {
        let query = self.fuzzy_query.as_ref().ok_or_else(|| {
            JpcError::bad_state("query_parser.parse_fuzzy_query must be called first")
        })?;
        let searcher = self.searcher()?;
        let limit = config.top_limit(params.top_limit);

        searcher
            .search(query, limit, scoring)?
            .into_iter()
            .map(|hit| {
                Ok(json!({
                    "doc": searcher.named_doc(hit.doc_id)?,
                    "score": hit.score,
                }))
            })
            .collect()
    }
}

/// Run a search and build one hit record per result.
fn hits(
    searcher: &Searcher,
    query: &Query,
    limit: usize,
    scoring: &ScoringParams,
    explain: bool,
    snippet_fields: &[FieldRef],
) -> Result<Vec<Value>> {
    let results = searcher.search(query, limit, scoring)?;
    debug!(hits = results.len(), limit, "search done");

    results
        .into_iter()
        .map(|hit| {
            let record = HitRecord {
                doc: searcher.named_doc(hit.doc_id)?,
                score: hit.score,
                doc_id: hit.doc_id,
                segment_ord: SEGMENT_ORD,
                snippet: snippets(searcher, query, hit.doc_id, snippet_fields)?,
                explain: explain.then_some(hit.explanation),
            };
            Ok(serde_json::to_value(record)?)
        })
        .collect()
}

fn snippets(
    searcher: &Searcher,
    query: &Query,
    doc_id: DocId,
    fields: &[FieldRef],
) -> Result<BTreeMap<String, String>> {
    let mut ids = Vec::with_capacity(fields.len());
    for field in fields {
        if matches!(field, FieldRef::Name(name) if name.is_empty()) {
            continue;
        }
        ids.push(resolve_field(searcher.schema(), field)?);
    }
    if ids.is_empty() {
        return Ok(BTreeMap::new());
    }
    searcher.snippets(query, doc_id, &ids)
}

fn resolve_field(schema: &Schema, field: &FieldRef) -> Result<FieldId> {
    match field {
        FieldRef::Id(id) => schema.get_field_entry(*id).map(|_| *id),
        FieldRef::Name(name) => schema.require_field(name),
    }
}

fn first_name(names: &[String]) -> Result<&str> {
    names
        .first()
        .map(String::as_str)
        .ok_or_else(|| JpcError::invalid_input("field names no field"))
}

/// A document by its 1-based id.
fn document_at(documents: &mut [Document], id: usize) -> Result<&mut Document> {
    id.checked_sub(1)
        .and_then(|index| documents.get_mut(index))
        .ok_or_else(|| JpcError::not_found(format!("document {id} has not been created")))
}

/// The exact term text of a delete request.
fn term_text(term: &Value) -> Result<String> {
    match term {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(JpcError::invalid_input(format!("{other} is not a term"))),
    }
}
