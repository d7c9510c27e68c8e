//! Query layer: SQL execution against the directory database over HTTP.
//!
//! The data source is any endpoint that accepts `POST {"sql": "...",
//! "params": {...}}` and answers `{"rows": [{column: value, ...}, ...]}`.
//! Parameters are always bound by name and shipped out-of-band; query text
//! never has values interpolated into it.
//!
//! Failure policy: [`run_query`] is the boundary where transport and query
//! failures stop propagating. A failed fetch is reported on stderr with the
//! offending SQL and degrades to zero rows; the run continues and later,
//! independent fetches are unaffected. There is no retry. Every query this
//! crate issues is a SELECT.

use crate::types::Row;
use serde::Deserialize;
use serde_json::Value as Json;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    /// Network or connection failure reaching the endpoint.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The endpoint reported an execution error, or the response did not
    /// have the documented shape.
    #[error("query failed: {0}")]
    Query(String),
}

/// Named parameters bound to a query.
pub type Params<'a> = &'a [(&'a str, Json)];

/// The seam between the fetchers and the transport. Production uses
/// [`HttpExecutor`]; tests substitute an in-memory implementation.
pub trait QueryExecutor {
    fn execute(&self, sql: &str, params: Params) -> Result<Vec<Row>, QueryError>;
}

/// Response shape of the query endpoint. A present `error` takes precedence
/// over whatever `rows` contains.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    rows: Vec<Row>,
    #[serde(default)]
    error: Option<String>,
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking HTTP executor. The endpoint URL is threaded through the
/// constructor, not read from a rebindable global, so two executors against
/// different sources can coexist.
pub struct HttpExecutor {
    url: String,
    client: reqwest::blocking::Client,
}

impl HttpExecutor {
    pub fn new(url: &str) -> Result<HttpExecutor, QueryError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(HttpExecutor {
            url: url.to_string(),
            client,
        })
    }
}

impl QueryExecutor for HttpExecutor {
    fn execute(&self, sql: &str, params: Params) -> Result<Vec<Row>, QueryError> {
        let bound: serde_json::Map<String, Json> = params
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        let body = serde_json::json!({ "sql": sql, "params": bound });

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()?
            .error_for_status()?;
        let text = response.text()?;

        parse_response(&text)
    }
}

/// Decode a response body into rows, independent of the transport so the
/// shape handling is testable on its own.
fn parse_response(body: &str) -> Result<Vec<Row>, QueryError> {
    let decoded: QueryResponse = serde_json::from_str(body)
        .map_err(|e| QueryError::Query(format!("unexpected response shape: {e}")))?;
    if let Some(message) = decoded.error {
        return Err(QueryError::Query(message));
    }
    Ok(decoded.rows)
}

/// Execute a query, degrading any failure to an empty row set.
///
/// Callers treat "failed" and "no rows" identically: the affected page
/// renders its empty state instead of aborting the run.
pub fn run_query(db: &dyn QueryExecutor, sql: &str, params: Params) -> Vec<Row> {
    match db.execute(sql, params) {
        Ok(rows) => rows,
        Err(err) => {
            eprintln!("query failed: {err}");
            eprintln!("  sql: {}", sql.split_whitespace().collect::<Vec<_>>().join(" "));
            Vec::new()
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;

    /// Mock executor that returns canned rows keyed by a SQL fragment and
    /// records every call for assertion.
    #[derive(Default)]
    pub struct MockDb {
        pub canned: Vec<(&'static str, Vec<Row>)>,
        pub calls: RefCell<Vec<(String, Vec<(String, Json)>)>>,
    }

    impl MockDb {
        pub fn with(fragment: &'static str, rows: Vec<Json>) -> MockDb {
            let rows = rows
                .into_iter()
                .map(|v| v.as_object().unwrap().clone())
                .collect();
            MockDb {
                canned: vec![(fragment, rows)],
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl QueryExecutor for MockDb {
        fn execute(&self, sql: &str, params: Params) -> Result<Vec<Row>, QueryError> {
            self.calls.borrow_mut().push((
                sql.to_string(),
                params
                    .iter()
                    .map(|(name, value)| (name.to_string(), value.clone()))
                    .collect(),
            ));
            for (fragment, rows) in &self.canned {
                if sql.contains(fragment) {
                    return Ok(rows.clone());
                }
            }
            Ok(Vec::new())
        }
    }

    /// Executor whose every query fails, for exercising the degrade path.
    pub struct FailingDb;

    impl QueryExecutor for FailingDb {
        fn execute(&self, _sql: &str, _params: Params) -> Result<Vec<Row>, QueryError> {
            Err(QueryError::Query("no such table: listings".to_string()))
        }
    }

    #[test]
    fn parse_response_decodes_rows() {
        let rows = parse_response(r#"{"rows": [{"id": 1, "name": "A"}]}"#).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["name"], json!("A"));
    }

    #[test]
    fn parse_response_empty_rows() {
        assert!(parse_response(r#"{"rows": []}"#).unwrap().is_empty());
    }

    #[test]
    fn parse_response_missing_rows_key_is_empty() {
        assert!(parse_response("{}").unwrap().is_empty());
    }

    #[test]
    fn parse_response_surfaces_endpoint_error() {
        let err = parse_response(r#"{"error": "no such column: slub"}"#).unwrap_err();
        assert!(matches!(err, QueryError::Query(m) if m.contains("slub")));
    }

    #[test]
    fn parse_response_rejects_non_json() {
        assert!(matches!(
            parse_response("<html>gateway timeout</html>"),
            Err(QueryError::Query(_))
        ));
    }

    #[test]
    fn run_query_degrades_failure_to_empty() {
        assert!(run_query(&FailingDb, "SELECT 1", &[]).is_empty());
    }

    #[test]
    fn run_query_passes_rows_through() {
        let db = MockDb::with("FROM things", vec![json!({"id": 1})]);
        let rows = run_query(&db, "SELECT id FROM things", &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(db.calls.borrow().len(), 1);
    }
}
