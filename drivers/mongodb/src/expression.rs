//! Interpreter for MongoDB shell expressions.
//!
//! An expression is a receiver followed by a chain of method calls:
//!
//! ```text
//! db.users.find({age: {$gt: 21}}, {name: 1}).sort({name: 1}).limit(10)
//! db.getCollection("order-items").countDocuments()
//! users.findOne({_id: ObjectId("507f1f77bcf86cd799439011")})
//! ```
//!
//! The receiver is `db`, `db.<collection>` (dotted names allowed), `db.getCollection(name)` or
//! an alias of a collection.  Arguments are literals parsed by [`dbsh_driver::literal`]; nothing
//! else is evaluated.

use dbsh_driver::literal::{self, ParseError, Result};
use dbsh_driver::{Aliases, DATABASE_ALIAS, Document, Value};
use std::iter::Peekable;
use std::vec::IntoIter;

/// Methods that may follow `find(...)`
const CURSOR_METHODS: [&str; 6] = ["count", "limit", "pretty", "skip", "sort", "toArray"];

/// What an expression operates on
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    Database,
    Collection(String),
}

/// Arguments of a `find` including the cursor modifiers applied to it
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Find {
    pub filter: Document,
    pub projection: Document,
    pub sort: Document,
    pub limit: Option<i64>,
    pub skip: Option<u64>,
}

/// A parsed expression
#[derive(Clone, Debug, PartialEq)]
pub enum Operation {
    /// A bare receiver
    Handle(Target),
    GetName,
    GetCollectionNames,
    DatabaseStats,
    RunCommand(Document),
    Find {
        collection: String,
        find: Find,
    },
    FindOne {
        collection: String,
        filter: Document,
        projection: Document,
    },
    Aggregate {
        collection: String,
        pipeline: Vec<Document>,
    },
    Count {
        collection: String,
        filter: Document,
    },
    EstimatedCount {
        collection: String,
    },
    Distinct {
        collection: String,
        field: String,
        filter: Document,
    },
    InsertOne {
        collection: String,
        document: Document,
    },
    InsertMany {
        collection: String,
        documents: Vec<Document>,
    },
    Update {
        collection: String,
        filter: Document,
        update: Document,
        many: bool,
    },
    ReplaceOne {
        collection: String,
        filter: Document,
        replacement: Document,
    },
    Delete {
        collection: String,
        filter: Document,
        many: bool,
    },
    Drop {
        collection: String,
    },
    GetIndexes {
        collection: String,
    },
}

#[derive(Debug)]
struct Call {
    name: String,
    arguments: Option<Vec<Value>>,
    position: usize,
}

type Calls = Peekable<IntoIter<Call>>;

/// Parse an expression; identifiers other than `db` are resolved through `aliases`.
///
/// # Errors
/// * If the expression is malformed or uses an unsupported method
pub fn parse(input: &str, aliases: &Aliases) -> Result<Operation> {
    let input = input.trim().trim_end_matches(';').trim_end();
    let mut calls = parse_chain(input)?.into_iter().peekable();
    let Some(first) = calls.next() else {
        return Err(error("empty expression", 0));
    };
    if first.arguments.is_some() {
        return Err(error(
            format!("unsupported function {}", first.name),
            first.position,
        ));
    }

    let target = if first.name == DATABASE_ALIAS {
        let names = take_names(&mut calls);
        if !names.is_empty() {
            Target::Collection(names.join("."))
        } else if let Some(call) = calls.next_if(|call| call.name == "getCollection") {
            Target::Collection(string_argument(&call, 0)?)
        } else {
            Target::Database
        }
    } else if let Some(collection) = aliases.resolve(&first.name) {
        let mut names = vec![collection.to_string()];
        names.extend(take_names(&mut calls));
        Target::Collection(names.join("."))
    } else {
        return Err(error(
            format!("unknown identifier {}", first.name),
            first.position,
        ));
    };

    let operation = match target {
        Target::Database => database_operation(&mut calls)?,
        Target::Collection(collection) => collection_operation(collection, &mut calls)?,
    };

    match calls.next() {
        Some(call) => Err(unsupported(&call)),
        None => Ok(operation),
    }
}

fn take_names(calls: &mut Calls) -> Vec<String> {
    let mut names = Vec::new();
    while let Some(call) = calls.next_if(|call| call.arguments.is_none()) {
        names.push(call.name);
    }
    names
}

fn database_operation(calls: &mut Calls) -> Result<Operation> {
    let Some(call) = calls.next() else {
        return Ok(Operation::Handle(Target::Database));
    };

    let operation = match call.name.as_str() {
        "getName" => Operation::GetName,
        "getCollectionNames" => Operation::GetCollectionNames,
        "stats" => Operation::DatabaseStats,
        "runCommand" => Operation::RunCommand(required_document(&call, 0)?),
        _ => return Err(unsupported(&call)),
    };
    Ok(operation)
}

fn collection_operation(collection: String, calls: &mut Calls) -> Result<Operation> {
    let Some(call) = calls.next() else {
        return Ok(Operation::Handle(Target::Collection(collection)));
    };

    let operation = match call.name.as_str() {
        "find" => {
            let find = Find {
                filter: optional_document(&call, 0)?,
                projection: optional_document(&call, 1)?,
                ..Default::default()
            };
            return cursor_operation(collection, find, calls);
        }
        "findOne" => Operation::FindOne {
            collection,
            filter: optional_document(&call, 0)?,
            projection: optional_document(&call, 1)?,
        },
        "aggregate" => Operation::Aggregate {
            collection,
            pipeline: pipeline(&call)?,
        },
        "count" | "countDocuments" => Operation::Count {
            collection,
            filter: optional_document(&call, 0)?,
        },
        "estimatedDocumentCount" => Operation::EstimatedCount { collection },
        "distinct" => Operation::Distinct {
            collection,
            field: string_argument(&call, 0)?,
            filter: optional_document(&call, 1)?,
        },
        "insertOne" => Operation::InsertOne {
            collection,
            document: required_document(&call, 0)?,
        },
        "insertMany" => Operation::InsertMany {
            collection,
            documents: required_documents(&call, 0)?,
        },
        "updateOne" | "updateMany" => Operation::Update {
            collection,
            filter: required_document(&call, 0)?,
            update: required_document(&call, 1)?,
            many: call.name == "updateMany",
        },
        "replaceOne" => Operation::ReplaceOne {
            collection,
            filter: required_document(&call, 0)?,
            replacement: required_document(&call, 1)?,
        },
        "deleteOne" | "deleteMany" => Operation::Delete {
            collection,
            filter: required_document(&call, 0)?,
            many: call.name == "deleteMany",
        },
        "drop" => Operation::Drop { collection },
        "getIndexes" => Operation::GetIndexes { collection },
        _ => return Err(unsupported(&call)),
    };
    Ok(operation)
}

fn cursor_operation(collection: String, mut find: Find, calls: &mut Calls) -> Result<Operation> {
    while let Some(call) =
        calls.next_if(|call| call.arguments.is_some() && CURSOR_METHODS.contains(&call.name.as_str()))
    {
        match call.name.as_str() {
            "sort" => find.sort = required_document(&call, 0)?,
            "limit" => find.limit = Some(integer_argument(&call, 0)?),
            "skip" => {
                let skip = integer_argument(&call, 0)?;
                let skip = u64::try_from(skip)
                    .map_err(|_| error("skip must not be negative", call.position))?;
                find.skip = Some(skip);
            }
            "count" => {
                return Ok(Operation::Count {
                    collection,
                    filter: find.filter,
                });
            }
            _ => {}
        }
    }

    Ok(Operation::Find { collection, find })
}

fn argument(call: &Call, index: usize) -> Option<&Value> {
    call.arguments
        .as_ref()
        .and_then(|arguments| arguments.get(index))
}

fn optional_document(call: &Call, index: usize) -> Result<Document> {
    match argument(call, index) {
        None | Some(Value::Null) => Ok(Document::new()),
        Some(Value::Map(document)) => Ok(document.clone()),
        Some(_) => Err(invalid_argument(call, index, "an object")),
    }
}

fn required_document(call: &Call, index: usize) -> Result<Document> {
    match argument(call, index) {
        Some(Value::Map(document)) => Ok(document.clone()),
        _ => Err(invalid_argument(call, index, "an object")),
    }
}

fn required_documents(call: &Call, index: usize) -> Result<Vec<Document>> {
    match argument(call, index) {
        Some(Value::Array(values)) => values
            .iter()
            .map(|value| {
                value
                    .as_map()
                    .cloned()
                    .ok_or_else(|| invalid_argument(call, index, "an array of objects"))
            })
            .collect(),
        _ => Err(invalid_argument(call, index, "an array of objects")),
    }
}

/// The stages of `aggregate([...])`, or of the older `aggregate({...}, {...})` form
fn pipeline(call: &Call) -> Result<Vec<Document>> {
    match argument(call, 0) {
        None => Ok(Vec::new()),
        Some(Value::Array(_)) => required_documents(call, 0),
        Some(_) => {
            let arguments = call.arguments.as_deref().unwrap_or_default();
            (0..arguments.len())
                .map(|index| required_document(call, index))
                .collect()
        }
    }
}

fn string_argument(call: &Call, index: usize) -> Result<String> {
    match argument(call, index) {
        Some(Value::String(value)) => Ok(value.clone()),
        _ => Err(invalid_argument(call, index, "a string")),
    }
}

fn integer_argument(call: &Call, index: usize) -> Result<i64> {
    argument(call, index)
        .and_then(Value::as_i64)
        .ok_or_else(|| invalid_argument(call, index, "an integer"))
}

/// Split the input into `name` and `name(arguments)` segments separated by dots.
fn parse_chain(input: &str) -> Result<Vec<Call>> {
    let chars: Vec<char> = input.chars().collect();
    let mut calls = Vec::new();
    let mut position = 0;

    loop {
        skip_whitespace(&chars, &mut position);
        let start = position;
        while chars.get(position).is_some_and(|c| is_identifier_char(*c)) {
            position += 1;
        }
        if start == position {
            return Err(error("expected an identifier", start));
        }
        let name: String = chars[start..position].iter().collect();

        skip_whitespace(&chars, &mut position);
        let arguments = if chars.get(position) == Some(&'(') {
            let end = closing_parenthesis(&chars, position)?;
            let text: String = chars[position + 1..end].iter().collect();
            position = end + 1;
            Some(parse_arguments(&name, &text, start)?)
        } else {
            None
        };
        calls.push(Call {
            name,
            arguments,
            position: start,
        });

        skip_whitespace(&chars, &mut position);
        match chars.get(position) {
            None => return Ok(calls),
            Some('.') => position += 1,
            Some(c) => return Err(error(format!("unexpected character '{c}'"), position)),
        }
    }
}

fn parse_arguments(name: &str, text: &str, position: usize) -> Result<Vec<Value>> {
    literal::split_list(text)
        .iter()
        .map(|argument| {
            literal::parse(argument).map_err(|parse_error| {
                error(
                    format!("invalid argument to {name}: {}", parse_error.message),
                    position,
                )
            })
        })
        .collect()
}

fn closing_parenthesis(chars: &[char], open: usize) -> Result<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (index, &c) in chars.iter().enumerate().skip(open) {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => quote = Some(c),
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return if c == ')' {
                        Ok(index)
                    } else {
                        Err(error(format!("unbalanced '{c}'"), index))
                    };
                }
            }
            _ => {}
        }
    }

    Err(error("unterminated argument list", open))
}

fn skip_whitespace(chars: &[char], position: &mut usize) {
    while chars.get(*position).is_some_and(|c| c.is_whitespace()) {
        *position += 1;
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '-'
}

fn error<S: Into<String>>(message: S, position: usize) -> ParseError {
    ParseError {
        message: message.into(),
        position,
    }
}

fn unsupported(call: &Call) -> ParseError {
    error(format!("unsupported method {}", call.name), call.position)
}

fn invalid_argument(call: &Call, index: usize, expected: &str) -> ParseError {
    error(
        format!("argument {} of {} must be {expected}", index + 1, call.name),
        call.position,
    )
}
