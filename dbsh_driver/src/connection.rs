use crate::Error::Unsupported;
use crate::aliases::Aliases;
use crate::error::Result;
use crate::value::{Document, Value};
use async_trait::async_trait;
use mockall::automock;
use std::fmt::Debug;

/// A single row of a query result
pub type Row = Vec<Value>;

/// Name of the identifier field that leads document columns
pub const ID_FIELD: &str = "_id";

/// Convert `?` placeholders to numbered `$1, $2, ...` placeholders; quoted text is left as is.
#[must_use]
pub fn convert_to_numbered_placeholders(sql: &str) -> String {
    let mut result = String::with_capacity(sql.len());
    let mut param_index = 0u32;
    let mut chars = sql.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\'' | '"' => {
                result.push(ch);
                for quoted in chars.by_ref() {
                    result.push(quoted);
                    if quoted == ch {
                        break;
                    }
                }
            }
            '?' => {
                param_index += 1;
                result.push('$');
                result.push_str(&param_index.to_string());
            }
            _ => result.push(ch),
        }
    }
    result
}

/// Tabular results: ordered column names and rows of values
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl QueryResult {
    #[must_use]
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Build a result from documents; the columns are the union of the document keys in the
    /// order they are first seen, with `_id` first.  Missing fields are null.
    #[must_use]
    pub fn from_documents(documents: Vec<Document>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for document in &documents {
            for key in document.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        if let Some(index) = columns.iter().position(|column| column == ID_FIELD) {
            let id = columns.remove(index);
            columns.insert(0, id);
        }

        let rows = documents
            .into_iter()
            .map(|mut document| {
                columns
                    .iter()
                    .map(|column| document.swap_remove(column).unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Build a single column result from a list of values
    #[must_use]
    pub fn from_values<S: Into<String>>(column: S, values: Vec<Value>) -> Self {
        let rows = values.into_iter().map(|value| vec![value]).collect();
        Self::new(vec![column.into()], rows)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Convert the rows back to documents keyed by column name.
    #[must_use]
    pub fn to_documents(&self) -> Vec<Document> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }

    /// Keep at most `limit` rows; zero keeps all rows.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        if limit > 0 {
            self.rows.truncate(limit);
        }
        self
    }
}

/// Results from evaluating a command or expression
#[derive(Clone, Debug, PartialEq)]
pub enum Results {
    /// Rows of data
    Query(QueryResult),
    /// Number of entries affected by a change
    Execute(u64),
    /// A single value
    Value(Value),
    /// Nothing to display
    Empty,
}

impl Results {
    #[must_use]
    pub fn is_query(&self) -> bool {
        matches!(self, Results::Query(_))
    }

    #[must_use]
    pub fn is_execute(&self) -> bool {
        matches!(self, Results::Execute(_))
    }

    /// Convert the results to rows, used when exporting.
    #[must_use]
    pub fn to_query_result(&self) -> QueryResult {
        match self {
            Results::Query(query_result) => query_result.clone(),
            Results::Execute(rows) => QueryResult::from_values("rows", vec![Value::from(*rows)]),
            Results::Value(Value::Array(values)) => {
                let maps: Option<Vec<Document>> =
                    values.iter().map(|value| value.as_map().cloned()).collect();
                match maps {
                    Some(documents) => QueryResult::from_documents(documents),
                    None => QueryResult::from_values("value", values.clone()),
                }
            }
            Results::Value(Value::Map(document)) => {
                QueryResult::from_documents(vec![document.clone()])
            }
            Results::Value(value) => QueryResult::from_values("value", vec![value.clone()]),
            Results::Empty => QueryResult::default(),
        }
    }
}

/// A connection to a database with the operations the shell commands are built on.
#[automock]
#[async_trait]
pub trait Connection: Debug + Send + Sync {
    /// The URL used to connect
    fn url(&self) -> &String;

    /// The currently selected database
    fn database(&self) -> String;

    /// Select the database subsequent operations run against
    async fn use_database(&mut self, name: &str) -> Result<()>;

    async fn databases(&mut self) -> Result<Vec<String>>;

    /// Names of the collections or tables in the current database
    async fn collections(&mut self) -> Result<Vec<String>>;

    async fn count(&mut self, collection: &str, filter: &Document) -> Result<u64>;

    async fn distinct(
        &mut self,
        collection: &str,
        field: &str,
        filter: &Document,
    ) -> Result<Vec<Value>>;

    /// Find entries matching the filter; a `limit` of zero returns all entries.
    async fn find(
        &mut self,
        collection: &str,
        filter: &Document,
        projection: &Document,
        limit: u64,
    ) -> Result<QueryResult>;

    async fn aggregate(&mut self, _collection: &str, _pipeline: &[Document]) -> Result<QueryResult> {
        Err(Unsupported {
            operation: "aggregate".to_string(),
        })
    }

    async fn indexes(&mut self, collection: &str) -> Result<QueryResult>;

    async fn describe(&mut self, collection: &str) -> Result<QueryResult>;

    /// Statistics for a collection, or for the database when `collection` is empty
    async fn stats(&mut self, collection: &str) -> Result<QueryResult>;

    async fn top(&mut self, limit: usize) -> Result<QueryResult>;

    /// Execute a statement with positional parameters
    async fn query(&mut self, _sql: &str, _parameters: &[Value]) -> Result<Results> {
        Err(Unsupported {
            operation: "query".to_string(),
        })
    }

    /// Evaluate a line of database native input
    async fn evaluate(&mut self, input: &str, aliases: &Aliases) -> Result<Results>;

    async fn close(&mut self) -> Result<()>;
}
