//! Typed commands and their payloads.
//!
//! Every envelope resolves to a name such as `search` or `searcher.search`
//! and a JSON payload. [`Command::from_parts`] maps the name to a variant and
//! decodes the payload into that variant's parameters.

use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{JpcError, Result};
use crate::index::DocId;
use crate::schema::{FieldId, FieldType};

/// A field named either by id or by name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FieldRef {
    /// Field id.
    Id(FieldId),
    /// Field name.
    Name(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

/// Accept `x`, `[x, ...]` or `null`.
fn one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
    })
}

fn default_true() -> bool {
    true
}

/// `index_document` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexDocumentParams {
    /// `{field: value | [values]}`.
    pub doc: Map<String, Value>,
}

/// `search` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchParams {
    /// Query string.
    pub q: String,
    /// Default fields; all indexed text fields when absent.
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    /// Maximum number of hits.
    #[serde(default)]
    pub top_limit: Option<usize>,
    /// Attach score explanations.
    #[serde(default)]
    pub explain: bool,
    /// Fields to cut snippets from.
    #[serde(default, deserialize_with = "one_or_many")]
    pub snippet_field: Vec<FieldRef>,
}

/// `delete` and `indexwriter.delete_term` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeleteParams {
    /// Field name.
    pub field: String,
    /// Exact indexed term; numbers are accepted for numeric fields.
    pub term: Value,
}

/// `builder.add_text_field` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddTextFieldParams {
    /// Field name.
    pub name: String,
    /// 1 for STRING, 2 for TEXT.
    #[serde(rename = "type")]
    pub kind: u64,
    /// Keep the original value.
    #[serde(default)]
    pub stored: bool,
    /// Make the field searchable.
    #[serde(default = "default_true")]
    pub indexed: bool,
    /// Analyzer name for TEXT fields.
    #[serde(default)]
    pub tokenizer: Option<String>,
}

/// `builder.add_{i64,u64,f64,date}_field` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddFieldParams {
    /// Field name.
    pub name: String,
    /// Keep the original value.
    #[serde(default)]
    pub stored: bool,
    /// Make the field searchable.
    #[serde(default = "default_true")]
    pub indexed: bool,
}

/// `schema.get_field_entry` / `schema.get_field_name` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldNameParams {
    /// `[name]`; only the first name is used.
    #[serde(deserialize_with = "one_or_many")]
    pub field: Vec<String>,
}

/// `document.add_*` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddValueParams {
    /// 1-based document id as returned by `document.create`.
    pub doc_id: usize,
    /// Target field.
    pub field: FieldRef,
    /// The value.
    pub value: Value,
}

/// `index.create` payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct IndexCreateParams {
    /// Accepted for compatibility; indexes always live in RAM.
    #[serde(default)]
    pub directory: Option<String>,
}

/// `indexwriter.add_document` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddDocumentParams {
    /// 1-based document id.
    pub id: usize,
}

/// `query_parser.for_index` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForIndexParams {
    /// Default fields of the parser.
    #[serde(deserialize_with = "one_or_many")]
    pub fields: Vec<FieldRef>,
}

/// `query_parser.parse_query` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ParseQueryParams {
    /// Query string.
    pub query: String,
}

/// `query_parser.parse_fuzzy_query` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FuzzyQueryParams {
    /// `[name]`; exactly one field.
    #[serde(deserialize_with = "one_or_many")]
    pub field: Vec<String>,
    /// `[text]`; exactly one term.
    #[serde(deserialize_with = "one_or_many")]
    pub term: Vec<String>,
    /// Maximum edit distance.
    #[serde(default)]
    pub distance: Option<u8>,
    /// Whether an adjacent swap is one edit.
    #[serde(default)]
    pub transposition: Option<bool>,
}

/// `searcher.search` payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearcherSearchParams {
    /// Maximum number of hits.
    #[serde(default)]
    pub top_limit: Option<usize>,
    /// Attach score explanations.
    #[serde(default)]
    pub explain: bool,
    /// Fields to cut snippets from.
    #[serde(default, deserialize_with = "one_or_many")]
    pub snippet_field: Vec<FieldRef>,
}

/// Payload of commands taking only a limit.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TopLimitParams {
    /// Maximum number of results.
    #[serde(default)]
    pub top_limit: Option<usize>,
}

/// `searcher.get_document` payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GetDocumentParams {
    /// Doc id from a previous `searcher.docset`.
    pub doc_id: DocId,
    /// Always 0; there is a single segment.
    #[serde(default)]
    pub segment_ord: Option<u32>,
    /// Score to report instead of recomputing it.
    #[serde(default)]
    pub score: Option<f32>,
    /// Attach the score explanation.
    #[serde(default)]
    pub explain: bool,
    /// Fields to cut snippets from.
    #[serde(default, deserialize_with = "one_or_many")]
    pub snippet_field: Vec<FieldRef>,
}

/// `searcher.search_raw` payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchRawParams {
    /// Maximum number of documents; 0 returns every match.
    #[serde(default)]
    pub limit: usize,
}

/// A decoded request.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `index_document`
    IndexDocument(IndexDocumentParams),
    /// `search`
    Search(SearchParams),
    /// `delete`
    Delete(DeleteParams),
    /// `commit`
    Commit,
    /// `num_docs`
    NumDocs,
    /// `session.open`
    SessionOpen,
    /// `session.close`
    SessionClose,
    /// `builder.add_text_field`
    AddTextField(AddTextFieldParams),
    /// `builder.add_{i64,u64,f64,date}_field`
    AddField(FieldType, AddFieldParams),
    /// `builder.build`
    BuildSchema,
    /// `schema.get_field_entry`
    GetFieldEntry(FieldNameParams),
    /// `schema.get_field_name`
    GetFieldName(FieldNameParams),
    /// `schema.num_fields`
    NumFields,
    /// `document.create`
    CreateDocument,
    /// `document.add_{text,int,uint,f64,date}`
    AddValue(FieldType, AddValueParams),
    /// `index.create`
    CreateIndex(IndexCreateParams),
    /// `index.reader_builder`
    ReaderBuilder,
    /// `indexwriter.add_document`
    WriterAddDocument(AddDocumentParams),
    /// `indexwriter.commit`
    WriterCommit,
    /// `indexwriter.delete_term`
    WriterDeleteTerm(DeleteParams),
    /// `index_reader.searcher`
    ReaderSearcher,
    /// `query_parser.for_index`
    ParserForIndex(ForIndexParams),
    /// `query_parser.parse_query`
    ParseQuery(ParseQueryParams),
    /// `query_parser.parse_fuzzy_query`
    ParseFuzzyQuery(FuzzyQueryParams),
    /// `searcher.search`
    SearcherSearch(SearcherSearchParams),
    /// `searcher.docset`
    Docset(TopLimitParams),
    /// `searcher.get_document`
    GetDocument(GetDocumentParams),
    /// `searcher.search_raw`
    SearchRaw(SearchRawParams),
    /// `fuzzy_searcher.fuzzy_searcher`
    FuzzySearch(TopLimitParams),
}

/// Every name [`Command::from_parts`] accepts.
pub const COMMAND_NAMES: &[&str] = &[
    "index_document",
    "search",
    "delete",
    "commit",
    "num_docs",
    "session.open",
    "session.close",
    "builder.add_text_field",
    "builder.add_i64_field",
    "builder.add_u64_field",
    "builder.add_f64_field",
    "builder.add_date_field",
    "builder.build",
    "schema.get_field_entry",
    "schema.get_field_name",
    "schema.num_fields",
    "document.create",
    "document.add_text",
    "document.add_int",
    "document.add_uint",
    "document.add_f64",
    "document.add_date",
    "index.create",
    "index.reader_builder",
    "indexwriter.add_document",
    "indexwriter.commit",
    "indexwriter.delete_term",
    "index_reader.searcher",
    "query_parser.for_index",
    "query_parser.parse_query",
    "query_parser.parse_fuzzy_query",
    "searcher.search",
    "searcher.docset",
    "searcher.get_document",
    "searcher.search_raw",
    "fuzzy_searcher.fuzzy_searcher",
];

fn decode<T: DeserializeOwned>(name: &str, payload: Value) -> Result<T> {
    serde_json::from_value(payload)
        .map_err(|e| JpcError::invalid_input(format!("invalid {name} payload: {e}")))
}

impl Command {
    /// Resolve a command name and decode its payload.
    pub fn from_parts(name: &str, payload: Value) -> Result<Self> {
        let command = match name {
            "index_document" => Command::IndexDocument(decode(name, payload)?),
            "search" => Command::Search(decode(name, payload)?),
            "delete" => Command::Delete(decode(name, payload)?),
            "commit" => Command::Commit,
            "num_docs" => Command::NumDocs,
            "session.open" => Command::SessionOpen,
            "session.close" => Command::SessionClose,
            "builder.add_text_field" => Command::AddTextField(decode(name, payload)?),
            "builder.add_i64_field" => Command::AddField(FieldType::I64, decode(name, payload)?),
            "builder.add_u64_field" => Command::AddField(FieldType::U64, decode(name, payload)?),
            "builder.add_f64_field" => Command::AddField(FieldType::F64, decode(name, payload)?),
            "builder.add_date_field" => Command::AddField(FieldType::Date, decode(name, payload)?),
            "builder.build" => Command::BuildSchema,
            "schema.get_field_entry" => Command::GetFieldEntry(decode(name, payload)?),
            "schema.get_field_name" => Command::GetFieldName(decode(name, payload)?),
            "schema.num_fields" => Command::NumFields,
            "document.create" => Command::CreateDocument,
            "document.add_text" => Command::AddValue(FieldType::Text, decode(name, payload)?),
            "document.add_int" => Command::AddValue(FieldType::I64, decode(name, payload)?),
            "document.add_uint" => Command::AddValue(FieldType::U64, decode(name, payload)?),
            "document.add_f64" => Command::AddValue(FieldType::F64, decode(name, payload)?),
            "document.add_date" => Command::AddValue(FieldType::Date, decode(name, payload)?),
            "index.create" => Command::CreateIndex(decode(name, payload)?),
            "index.reader_builder" => Command::ReaderBuilder,
            "indexwriter.add_document" => Command::WriterAddDocument(decode(name, payload)?),
            "indexwriter.commit" => Command::WriterCommit,
            "indexwriter.delete_term" => Command::WriterDeleteTerm(decode(name, payload)?),
            "index_reader.searcher" => Command::ReaderSearcher,
            "query_parser.for_index" => Command::ParserForIndex(decode(name, payload)?),
            "query_parser.parse_query" => Command::ParseQuery(decode(name, payload)?),
            "query_parser.parse_fuzzy_query" => Command::ParseFuzzyQuery(decode(name, payload)?),
            "searcher.search" => Command::SearcherSearch(decode(name, payload)?),
            "searcher.docset" => Command::Docset(decode(name, payload)?),
            "searcher.get_document" => Command::GetDocument(decode(name, payload)?),
            "searcher.search_raw" => Command::SearchRaw(decode(name, payload)?),
            "fuzzy_searcher.fuzzy_searcher" => Command::FuzzySearch(decode(name, payload)?),
            _ => return Err(JpcError::unknown_command(name)),
        };
        Ok(command)
    }

    /// Whether executing the command can change engine state.
    pub fn is_mutating(&self) -> bool {
        !matches!(
            self,
            Command::Search(_)
                | Command::NumDocs
                | Command::GetFieldEntry(_)
                | Command::GetFieldName(_)
                | Command::NumFields
                | Command::SearcherSearch(_)
                | Command::Docset(_)
                | Command::GetDocument(_)
                | Command::SearchRaw(_)
                | Command::FuzzySearch(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_name_resolves() {
        for name in COMMAND_NAMES {
            let result = Command::from_parts(name, json!({}));
            assert!(
                !matches!(result, Err(JpcError::UnknownCommand(_))),
                "{name} should be known"
            );
        }
    }

    #[test]
    fn test_unknown_name() {
        assert!(matches!(
            Command::from_parts("searcher.teleport", json!({})),
            Err(JpcError::UnknownCommand(_))
        ));
    }

    #[test]
    fn test_malformed_payload_is_invalid_input() {
        assert!(matches!(
            Command::from_parts("search", json!({"q": 7})),
            Err(JpcError::InvalidInput(_))
        ));
        assert!(matches!(
            Command::from_parts("indexwriter.add_document", json!({})),
            Err(JpcError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_search_defaults() {
        let command = Command::from_parts("search", json!({"q": "sea"})).unwrap();
        let Command::Search(params) = command else {
            panic!("expected search");
        };
        assert_eq!(params.q, "sea");
        assert_eq!(params.top_limit, None);
        assert!(!params.explain);
        assert!(params.snippet_field.is_empty());
    }

    #[test]
    fn test_snippet_field_one_or_many() {
        let one = Command::from_parts("searcher.search", json!({"snippet_field": "body"})).unwrap();
        let many =
            Command::from_parts("searcher.search", json!({"snippet_field": [0, "body"]})).unwrap();

        let Command::SearcherSearch(one) = one else {
            panic!("expected searcher.search");
        };
        let Command::SearcherSearch(many) = many else {
            panic!("expected searcher.search");
        };
        assert_eq!(one.snippet_field, vec![FieldRef::Name("body".into())]);
        assert_eq!(
            many.snippet_field,
            vec![FieldRef::Id(0), FieldRef::Name("body".into())]
        );
    }

    #[test]
    fn test_typed_variants() {
        assert_eq!(
            Command::from_parts("builder.add_u64_field", json!({"name": "pages"})).unwrap(),
            Command::AddField(
                FieldType::U64,
                AddFieldParams {
                    name: "pages".into(),
                    stored: false,
                    indexed: true,
                }
            )
        );
        assert!(Command::from_parts("num_docs", json!({})).is_ok_and(|c| !c.is_mutating()));
        assert!(Command::from_parts("commit", json!({})).is_ok_and(|c| c.is_mutating()));
    }
}
