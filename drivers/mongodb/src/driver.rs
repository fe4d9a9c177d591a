use crate::conversion::{bson_to_document, bson_to_value, bson_type_name, document_to_bson};
use crate::expression::{self, Find, Operation, Target};
use crate::tls;
use async_trait::async_trait;
use bson::{Bson, Document as BsonDocument, doc};
use dbsh_driver::Error::IoError;
use dbsh_driver::{Aliases, Document, QueryResult, Result, Results, Value};
use futures_util::TryStreamExt;
use indexmap::IndexMap;
use mongodb::options::{ClientOptions, FindOptions};
use mongodb::results::UpdateResult;
use mongodb::{Client, Collection, Database, IndexModel};
use tracing::{debug, instrument};

const DEFAULT_DATABASE: &str = "test";
const ADMIN_DATABASE: &str = "admin";
/// Number of documents sampled by `describe`
const DESCRIBE_SAMPLE_SIZE: i64 = 100;

#[derive(Debug)]
pub struct Driver;

#[async_trait]
impl dbsh_driver::Driver for Driver {
    fn schemes(&self) -> Vec<&'static str> {
        vec!["mongodb", "mongodb+srv"]
    }

    async fn connect(&self, url: &str) -> Result<Box<dyn dbsh_driver::Connection>> {
        let connection = Connection::new(url).await?;
        Ok(Box::new(connection))
    }
}

#[derive(Debug)]
pub struct Connection {
    url: String,
    client: Client,
    database: String,
}

impl Connection {
    pub(crate) async fn new(url: &str) -> Result<Connection> {
        let (client_url, tls_settings) = tls::extract(url)?;
        let mut options = ClientOptions::parse(client_url.as_str())
            .await
            .map_err(mongo_error)?;
        tls_settings.apply(&mut options);
        let database = options
            .default_database
            .clone()
            .unwrap_or_else(|| DEFAULT_DATABASE.to_string());

        let client = Client::with_options(options).map_err(mongo_error)?;
        client
            .database(ADMIN_DATABASE)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(mongo_error)?;
        debug!("Connected to MongoDB; database {database}");

        Ok(Connection {
            url: url.to_string(),
            client,
            database,
        })
    }

    fn current_database(&self) -> Database {
        self.client.database(&self.database)
    }

    fn collection(&self, name: &str) -> Collection<BsonDocument> {
        self.current_database().collection(name)
    }

    async fn find_documents(&self, collection: &str, find: &Find) -> Result<Vec<Document>> {
        let collection = self.collection(collection);
        let cursor = collection
            .find(document_to_bson(&find.filter))
            .with_options(find_options(find))
            .await
            .map_err(mongo_error)?;
        let documents: Vec<BsonDocument> = cursor.try_collect().await.map_err(mongo_error)?;
        Ok(documents.iter().map(bson_to_document).collect())
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Document,
        projection: &Document,
    ) -> Result<Value> {
        let collection = self.collection(collection);
        let mut action = collection.find_one(document_to_bson(filter));
        if !projection.is_empty() {
            action = action.projection(document_to_bson(projection));
        }
        let document = action.await.map_err(mongo_error)?;
        Ok(document.map_or(Value::Null, |document| {
            Value::Map(bson_to_document(&document))
        }))
    }

    async fn run_command(&self, command: &Document) -> Result<Value> {
        let result = self
            .current_database()
            .run_command(document_to_bson(command))
            .await
            .map_err(mongo_error)?;
        Ok(Value::Map(bson_to_document(&result)))
    }

    async fn execute(&mut self, operation: Operation) -> Result<Results> {
        let results = match operation {
            Operation::Handle(target) => handle(&self.database, &target),
            Operation::GetName => handle(&self.database, &Target::Database),
            Operation::GetCollectionNames => {
                let names = dbsh_driver::Connection::collections(self).await?;
                Results::Value(Value::Array(names.into_iter().map(Value::String).collect()))
            }
            Operation::DatabaseStats => {
                Results::Query(dbsh_driver::Connection::stats(self, "").await?)
            }
            Operation::RunCommand(command) => Results::Value(self.run_command(&command).await?),
            Operation::Find { collection, find } => {
                let documents = self.find_documents(&collection, &find).await?;
                Results::Query(QueryResult::from_documents(documents))
            }
            Operation::FindOne {
                collection,
                filter,
                projection,
            } => Results::Value(self.find_one(&collection, &filter, &projection).await?),
            Operation::Aggregate {
                collection,
                pipeline,
            } => Results::Query(
                dbsh_driver::Connection::aggregate(self, &collection, &pipeline).await?,
            ),
            Operation::Count { collection, filter } => {
                let count = dbsh_driver::Connection::count(self, &collection, &filter).await?;
                Results::Value(Value::from(count))
            }
            Operation::EstimatedCount { collection } => {
                let count = self
                    .collection(&collection)
                    .estimated_document_count()
                    .await
                    .map_err(mongo_error)?;
                Results::Value(Value::from(count))
            }
            Operation::Distinct {
                collection,
                field,
                filter,
            } => {
                let values =
                    dbsh_driver::Connection::distinct(self, &collection, &field, &filter).await?;
                Results::Value(Value::Array(values))
            }
            Operation::InsertOne {
                collection,
                document,
            } => {
                let result = self
                    .collection(&collection)
                    .insert_one(document_to_bson(&document))
                    .await
                    .map_err(mongo_error)?;
                Results::Value(acknowledged(vec![(
                    "insertedId",
                    bson_to_value(&result.inserted_id),
                )]))
            }
            Operation::InsertMany {
                collection,
                documents,
            } => {
                let documents: Vec<BsonDocument> = documents.iter().map(document_to_bson).collect();
                let result = self
                    .collection(&collection)
                    .insert_many(documents)
                    .await
                    .map_err(mongo_error)?;
                let mut inserted: Vec<(usize, Bson)> = result.inserted_ids.into_iter().collect();
                inserted.sort_by_key(|(index, _)| *index);
                let ids = inserted.iter().map(|(_, id)| bson_to_value(id)).collect();
                Results::Value(acknowledged(vec![("insertedIds", Value::Array(ids))]))
            }
            Operation::Update {
                collection,
                filter,
                update,
                many,
            } => {
                let collection = self.collection(&collection);
                let filter = document_to_bson(&filter);
                let update = document_to_bson(&update);
                let result = if many {
                    collection.update_many(filter, update).await
                } else {
                    collection.update_one(filter, update).await
                };
                Results::Value(update_summary(&result.map_err(mongo_error)?))
            }
            Operation::ReplaceOne {
                collection,
                filter,
                replacement,
            } => {
                let result = self
                    .collection(&collection)
                    .replace_one(document_to_bson(&filter), document_to_bson(&replacement))
                    .await
                    .map_err(mongo_error)?;
                Results::Value(update_summary(&result))
            }
            Operation::Delete {
                collection,
                filter,
                many,
            } => {
                let collection = self.collection(&collection);
                let filter = document_to_bson(&filter);
                let result = if many {
                    collection.delete_many(filter).await
                } else {
                    collection.delete_one(filter).await
                }
                .map_err(mongo_error)?;
                Results::Value(acknowledged(vec![(
                    "deletedCount",
                    Value::from(result.deleted_count),
                )]))
            }
            Operation::Drop { collection } => {
                self.collection(&collection)
                    .drop()
                    .await
                    .map_err(mongo_error)?;
                Results::Value(Value::Bool(true))
            }
            Operation::GetIndexes { collection } => {
                Results::Query(dbsh_driver::Connection::indexes(self, &collection).await?)
            }
        };

        Ok(results)
    }
}

#[async_trait]
impl dbsh_driver::Connection for Connection {
    fn url(&self) -> &String {
        &self.url
    }

    fn database(&self) -> String {
        self.database.clone()
    }

    async fn use_database(&mut self, name: &str) -> Result<()> {
        debug!("Switching database from {} to {name}", self.database);
        self.database = name.to_string();
        Ok(())
    }

    async fn databases(&mut self) -> Result<Vec<String>> {
        let mut names = self
            .client
            .list_database_names()
            .await
            .map_err(mongo_error)?;
        names.sort();
        Ok(names)
    }

    async fn collections(&mut self) -> Result<Vec<String>> {
        let mut names = self
            .current_database()
            .list_collection_names()
            .await
            .map_err(mongo_error)?;
        names.sort();
        Ok(names)
    }

    async fn count(&mut self, collection: &str, filter: &Document) -> Result<u64> {
        self.collection(collection)
            .count_documents(document_to_bson(filter))
            .await
            .map_err(mongo_error)
    }

    async fn distinct(
        &mut self,
        collection: &str,
        field: &str,
        filter: &Document,
    ) -> Result<Vec<Value>> {
        let values = self
            .collection(collection)
            .distinct(field, document_to_bson(filter))
            .await
            .map_err(mongo_error)?;
        Ok(values.iter().map(bson_to_value).collect())
    }

    async fn find(
        &mut self,
        collection: &str,
        filter: &Document,
        projection: &Document,
        limit: u64,
    ) -> Result<QueryResult> {
        let limit = if limit == 0 {
            None
        } else {
            Some(i64::try_from(limit)?)
        };
        let find = Find {
            filter: filter.clone(),
            projection: projection.clone(),
            limit,
            ..Default::default()
        };
        let documents = self.find_documents(collection, &find).await?;
        Ok(QueryResult::from_documents(documents))
    }

    async fn aggregate(&mut self, collection: &str, pipeline: &[Document]) -> Result<QueryResult> {
        let pipeline: Vec<BsonDocument> = pipeline.iter().map(document_to_bson).collect();
        let cursor = self
            .collection(collection)
            .aggregate(pipeline)
            .await
            .map_err(mongo_error)?;
        let documents: Vec<BsonDocument> = cursor.try_collect().await.map_err(mongo_error)?;
        Ok(QueryResult::from_documents(
            documents.iter().map(bson_to_document).collect(),
        ))
    }

    async fn indexes(&mut self, collection: &str) -> Result<QueryResult> {
        let cursor = self
            .collection(collection)
            .list_indexes()
            .await
            .map_err(mongo_error)?;
        let indexes: Vec<IndexModel> = cursor.try_collect().await.map_err(mongo_error)?;
        Ok(index_result(&indexes))
    }

    async fn describe(&mut self, collection: &str) -> Result<QueryResult> {
        let cursor = self
            .collection(collection)
            .find(BsonDocument::new())
            .limit(DESCRIBE_SAMPLE_SIZE)
            .await
            .map_err(mongo_error)?;
        let documents: Vec<BsonDocument> = cursor.try_collect().await.map_err(mongo_error)?;
        Ok(describe_result(&documents))
    }

    async fn stats(&mut self, collection: &str) -> Result<QueryResult> {
        let command = if collection.is_empty() {
            doc! { "dbStats": 1 }
        } else {
            doc! { "collStats": collection }
        };
        let result = self
            .current_database()
            .run_command(command)
            .await
            .map_err(mongo_error)?;
        Ok(stats_result(&result))
    }

    async fn top(&mut self, limit: usize) -> Result<QueryResult> {
        let result = self
            .client
            .database(ADMIN_DATABASE)
            .run_command(doc! { "top": 1 })
            .await
            .map_err(mongo_error)?;
        let totals = result.get_document("totals").cloned().unwrap_or_default();
        Ok(top_result(&totals, limit))
    }

    #[instrument(level = "debug", skip(self, aliases))]
    async fn evaluate(&mut self, input: &str, aliases: &Aliases) -> Result<Results> {
        let operation = expression::parse(input, aliases)?;
        debug!("Evaluating {operation:?}");
        self.execute(operation).await
    }

    async fn close(&mut self) -> Result<()> {
        debug!("Closing MongoDB connection");
        Ok(())
    }
}

/// The display value of a bare receiver: the database name or `<database>.<collection>`
fn handle(database: &str, target: &Target) -> Results {
    match target {
        Target::Database => Results::Value(Value::String(database.to_string())),
        Target::Collection(collection) => {
            Results::Value(Value::String(format!("{database}.{collection}")))
        }
    }
}

/// Options for a `find` with its cursor modifiers; empty documents are left unset
fn find_options(find: &Find) -> FindOptions {
    let mut options = FindOptions::default();
    if !find.projection.is_empty() {
        options.projection = Some(document_to_bson(&find.projection));
    }
    if !find.sort.is_empty() {
        options.sort = Some(document_to_bson(&find.sort));
    }
    options.skip = find.skip;
    options.limit = find.limit;
    options
}

fn mongo_error(error: mongodb::error::Error) -> dbsh_driver::Error {
    IoError(error.to_string())
}

/// A write result document with `acknowledged: true` followed by the given fields
fn acknowledged(fields: Vec<(&str, Value)>) -> Value {
    let mut document = Document::new();
    document.insert("acknowledged".to_string(), Value::Bool(true));
    for (key, value) in fields {
        document.insert(key.to_string(), value);
    }
    Value::Map(document)
}

fn update_summary(result: &UpdateResult) -> Value {
    acknowledged(vec![
        ("matchedCount", Value::from(result.matched_count)),
        ("modifiedCount", Value::from(result.modified_count)),
        (
            "upsertedId",
            result.upserted_id.as_ref().map_or(Value::Null, bson_to_value),
        ),
    ])
}

fn index_result(indexes: &[IndexModel]) -> QueryResult {
    let columns = vec!["name".to_string(), "keys".to_string(), "unique".to_string()];
    let rows = indexes
        .iter()
        .map(|index| {
            let options = index.options.as_ref();
            let name = options
                .and_then(|options| options.name.clone())
                .map_or(Value::Null, Value::String);
            let unique = options
                .and_then(|options| options.unique)
                .unwrap_or_default();
            vec![
                name,
                Value::Map(bson_to_document(&index.keys)),
                Value::Bool(unique),
            ]
        })
        .collect();
    QueryResult::new(columns, rows)
}

/// Each top level field of the sampled documents with the types it was seen with
fn describe_result(documents: &[BsonDocument]) -> QueryResult {
    let mut fields: IndexMap<String, Vec<&'static str>> = IndexMap::new();
    for document in documents {
        for (key, value) in document {
            let types = fields.entry(key.clone()).or_default();
            let type_name = bson_type_name(value);
            if !types.contains(&type_name) {
                types.push(type_name);
            }
        }
    }

    let columns = vec!["field".to_string(), "types".to_string()];
    let rows = fields
        .into_iter()
        .map(|(field, types)| vec![Value::String(field), Value::String(types.join(", "))])
        .collect();
    QueryResult::new(columns, rows)
}

fn stats_result(stats: &BsonDocument) -> QueryResult {
    let columns = vec!["stat".to_string(), "value".to_string()];
    let rows = stats
        .iter()
        .map(|(key, value)| vec![Value::String(key.clone()), bson_to_value(value)])
        .collect();
    QueryResult::new(columns, rows)
}

/// Namespaces from the `totals` of the admin `top` command, busiest first
fn top_result(totals: &BsonDocument, limit: usize) -> QueryResult {
    let mut entries: Vec<(String, i64, i64, i64, i64)> = totals
        .iter()
        .filter_map(|(namespace, usage)| {
            let usage = usage.as_document()?;
            Some((
                namespace.clone(),
                usage_number(usage, "total", "time"),
                usage_number(usage, "total", "count"),
                usage_number(usage, "readLock", "time"),
                usage_number(usage, "writeLock", "time"),
            ))
        })
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries.truncate(limit);

    let columns = [
        "namespace",
        "total_time",
        "total_count",
        "read_time",
        "write_time",
    ]
    .iter()
    .map(ToString::to_string)
    .collect();
    let rows = entries
        .into_iter()
        .map(|(namespace, total_time, total_count, read_time, write_time)| {
            vec![
                Value::String(namespace),
                Value::I64(total_time),
                Value::I64(total_count),
                Value::I64(read_time),
                Value::I64(write_time),
            ]
        })
        .collect();
    QueryResult::new(columns, rows)
}

fn usage_number(usage: &BsonDocument, section: &str, field: &str) -> i64 {
    let value = usage
        .get_document(section)
        .ok()
        .and_then(|section| section.get(field));
    match value {
        Some(Bson::Int32(value)) => i64::from(*value),
        Some(Bson::Int64(value)) => *value,
        Some(Bson::Double(value)) => *value as i64,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbsh_driver::Driver as _;

    #[test]
    fn test_schemes() {
        let driver = Driver;
        assert_eq!(driver.schemes(), vec!["mongodb", "mongodb+srv"]);
    }

    #[tokio::test]
    async fn test_connect_invalid_url() {
        let driver = Driver;
        let result = driver.connect("mongodb://localhost:port/").await;
        assert!(result.is_err());

        let result = driver.connect("mongodb://localhost/?tls=maybe").await;
        assert!(result.is_err());
    }

    async fn connection(database: &str) -> anyhow::Result<Connection> {
        let url = format!("mongodb://localhost:27017/{database}");
        let options = ClientOptions::parse(url.as_str()).await?;
        let client = Client::with_options(options)?;
        Ok(Connection {
            url,
            client,
            database: database.to_string(),
        })
    }

    #[tokio::test]
    async fn test_evaluate_handles() -> anyhow::Result<()> {
        let mut connection = connection("shop").await?;
        let mut aliases = Aliases::new();
        aliases.refresh(["order-items"]);

        let results = dbsh_driver::Connection::evaluate(&mut connection, "db", &aliases).await?;
        assert_eq!(results, Results::Value(Value::from("shop")));
        let results =
            dbsh_driver::Connection::evaluate(&mut connection, "db.getName()", &aliases).await?;
        assert_eq!(results, Results::Value(Value::from("shop")));
        let results =
            dbsh_driver::Connection::evaluate(&mut connection, "db.users", &aliases).await?;
        assert_eq!(results, Results::Value(Value::from("shop.users")));
        let results =
            dbsh_driver::Connection::evaluate(&mut connection, "order_items", &aliases).await?;
        assert_eq!(results, Results::Value(Value::from("shop.order-items")));
        Ok(())
    }

    #[tokio::test]
    async fn test_evaluate_after_use_database() -> anyhow::Result<()> {
        let mut connection = connection("shop").await?;
        dbsh_driver::Connection::use_database(&mut connection, "inventory").await?;

        let results =
            dbsh_driver::Connection::evaluate(&mut connection, "db.items", &Aliases::new())
                .await?;

        assert_eq!(results, Results::Value(Value::from("inventory.items")));
        Ok(())
    }

    #[tokio::test]
    async fn test_evaluate_unsupported_method() -> anyhow::Result<()> {
        let mut connection = connection("shop").await?;

        let result =
            dbsh_driver::Connection::evaluate(&mut connection, "db.users.mapReduce()", &Aliases::new())
                .await;

        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_handle() {
        assert_eq!(
            handle("shop", &Target::Database),
            Results::Value(Value::from("shop"))
        );
        assert_eq!(
            handle("shop", &Target::Collection("sales.daily".to_string())),
            Results::Value(Value::from("shop.sales.daily"))
        );
    }

    #[test]
    fn test_find_options() -> anyhow::Result<()> {
        let aliases = Aliases::new();
        let Operation::Find { find, .. } = expression::parse(
            "db.users.find({active: true}, {name: 1}).sort({name: -1}).skip(5).limit(10)",
            &aliases,
        )?
        else {
            panic!("expected a find");
        };

        let options = find_options(&find);

        assert_eq!(options.projection, Some(doc! { "name": 1_i64 }));
        assert_eq!(options.sort, Some(doc! { "name": -1_i64 }));
        assert_eq!(options.skip, Some(5));
        assert_eq!(options.limit, Some(10));
        Ok(())
    }

    #[test]
    fn test_find_options_empty() {
        let options = find_options(&Find::default());

        assert!(options.projection.is_none());
        assert!(options.sort.is_none());
        assert!(options.skip.is_none());
        assert!(options.limit.is_none());
    }

    #[test]
    fn test_acknowledged() {
        let value = acknowledged(vec![("deletedCount", Value::I64(2))]);
        let Value::Map(document) = value else {
            panic!("expected a map");
        };
        let keys: Vec<&String> = document.keys().collect();
        assert_eq!(keys, vec!["acknowledged", "deletedCount"]);
        assert_eq!(document.get("deletedCount"), Some(&Value::I64(2)));
    }

    #[test]
    fn test_describe_result() {
        let documents = vec![
            doc! { "_id": 1, "name": "a" },
            doc! { "_id": 2, "name": Bson::Null, "tags": ["x"] },
            doc! { "_id": 3_i64, "name": "c" },
        ];
        let query_result = describe_result(&documents);

        assert_eq!(query_result.columns(), &["field", "types"]);
        assert_eq!(
            query_result.rows(),
            &[
                vec![Value::from("_id"), Value::from("int, long")],
                vec![Value::from("name"), Value::from("string, null")],
                vec![Value::from("tags"), Value::from("array")],
            ]
        );
    }

    #[test]
    fn test_stats_result() {
        let stats = doc! { "db": "test", "collections": 3, "ok": 1.0 };
        let query_result = stats_result(&stats);

        assert_eq!(query_result.columns(), &["stat", "value"]);
        assert_eq!(query_result.len(), 3);
        assert_eq!(
            query_result.rows()[1],
            vec![Value::from("collections"), Value::I32(3)]
        );
    }

    #[test]
    fn test_top_result() {
        let totals = doc! {
            "note": "all times in microseconds",
            "test.users": {
                "total": { "time": 500_i64, "count": 10 },
                "readLock": { "time": 400_i64, "count": 8 },
                "writeLock": { "time": 100_i64, "count": 2 },
            },
            "test.orders": {
                "total": { "time": 900_i64, "count": 3 },
                "readLock": { "time": 0_i64, "count": 0 },
                "writeLock": { "time": 900_i64, "count": 3 },
            },
            "test.empty": {
                "total": { "time": 1_i64, "count": 1 },
            },
        };

        let query_result = top_result(&totals, 2);

        assert_eq!(
            query_result.columns(),
            &[
                "namespace",
                "total_time",
                "total_count",
                "read_time",
                "write_time"
            ]
        );
        assert_eq!(
            query_result.rows(),
            &[
                vec![
                    Value::from("test.orders"),
                    Value::I64(900),
                    Value::I64(3),
                    Value::I64(0),
                    Value::I64(900),
                ],
                vec![
                    Value::from("test.users"),
                    Value::I64(500),
                    Value::I64(10),
                    Value::I64(400),
                    Value::I64(100),
                ],
            ]
        );
    }

    #[test]
    fn test_index_result() {
        let index = IndexModel::builder().keys(doc! { "email": 1 }).build();
        let query_result = index_result(&[index]);

        assert_eq!(query_result.columns(), &["name", "keys", "unique"]);
        let row = &query_result.rows()[0];
        assert_eq!(row[0], Value::Null);
        assert_eq!(row[2], Value::Bool(false));
    }
}
