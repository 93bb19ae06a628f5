use crate::collection::Document;
use crate::common::{
    SortOrder, Value, JOIN_AS, JOIN_COLLECTION, JOIN_FROM, JOIN_OPTIONS, JOIN_TO, OPT_JOIN,
    OPT_PROJECT, OPT_SKIP, OPT_SORT, OPT_TAKE,
};
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};

/// Options shaping the result of `find`, `update` and `remove`.
///
/// `QueryOptions` carries a multi-key sort, a skip/take window, a projection
/// and a list of joins. Results are produced in this order: joins are
/// attached, then documents are sorted, windowed and finally projected, so
/// a property can be a sort key even when the projection drops it.
///
/// Options can be built fluently or parsed from a document with the keys
/// `sort`, `project`, `skip`, `take` and `join`.
///
/// # Examples
///
/// ```rust
/// use docstore::collection::{JoinSpec, QueryOptions};
/// use docstore::common::SortOrder;
/// use docstore::doc;
///
/// let options = QueryOptions::new()
///     .sort_by("age", SortOrder::Ascending)
///     .sort_by("name", SortOrder::Descending)
///     .skip(10)
///     .take(20)
///     .include("name")
///     .join(JoinSpec::new("tickets", "purchased", "_id", "tickets"));
///
/// let parsed = QueryOptions::from_document(&doc! {
///     sort: { age: 1, name: (-1) },
///     skip: 10,
///     take: 20,
///     project: { name: 1 },
///     join: [{ collection: "tickets", from: "purchased", to: "_id", as: "tickets" }],
/// })
/// .unwrap();
/// assert_eq!(parsed, options);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryOptions {
    pub(crate) sort_by: Vec<(String, SortOrder)>,
    pub(crate) skip: Option<usize>,
    pub(crate) take: Option<usize>,
    pub(crate) projection: Option<Projection>,
    pub(crate) joins: Vec<JoinSpec>,
}

/// Creates `QueryOptions` sorting by one property.
pub fn order_by(name: &str, sort_order: SortOrder) -> QueryOptions {
    QueryOptions::new().sort_by(name, sort_order)
}

/// Creates `QueryOptions` skipping the first `skip` results.
pub fn skip_by(skip: usize) -> QueryOptions {
    QueryOptions::new().skip(skip)
}

/// Creates `QueryOptions` returning at most `take` results.
pub fn take_only(take: usize) -> QueryOptions {
    QueryOptions::new().take(take)
}

impl QueryOptions {
    pub fn new() -> QueryOptions {
        QueryOptions::default()
    }

    /// Adds a sort key. Keys are compared in the order they were added.
    pub fn sort_by(mut self, name: &str, sort_order: SortOrder) -> QueryOptions {
        self.sort_by.push((name.to_string(), sort_order));
        self
    }

    pub fn skip(mut self, skip: usize) -> QueryOptions {
        self.skip = Some(skip);
        self
    }

    pub fn take(mut self, take: usize) -> QueryOptions {
        self.take = Some(take);
        self
    }

    /// Marks a property as included in the projection.
    pub fn include(mut self, name: &str) -> QueryOptions {
        self.projection
            .get_or_insert_with(Projection::default)
            .fields
            .push((name.to_string(), true));
        self
    }

    /// Marks a property as excluded from the projection.
    pub fn exclude(mut self, name: &str) -> QueryOptions {
        self.projection
            .get_or_insert_with(Projection::default)
            .fields
            .push((name.to_string(), false));
        self
    }

    pub fn join(mut self, join: JoinSpec) -> QueryOptions {
        self.joins.push(join);
        self
    }

    pub fn sort_order(&self) -> &[(String, SortOrder)] {
        &self.sort_by
    }

    pub fn skip_count(&self) -> Option<usize> {
        self.skip
    }

    pub fn take_count(&self) -> Option<usize> {
        self.take
    }

    pub fn projection(&self) -> Option<&Projection> {
        self.projection.as_ref()
    }

    pub fn joins(&self) -> &[JoinSpec] {
        &self.joins
    }

    /// Parses options from a document.
    ///
    /// # Errors
    ///
    /// Returns `MalformedQuery` for an unknown key or a value of the wrong
    /// shape, such as a negative `skip` or a join without `as`.
    pub fn from_document(options: &Document) -> DocStoreResult<QueryOptions> {
        let mut parsed = QueryOptions::new();
        for (key, value) in options.iter() {
            match key.as_str() {
                OPT_SORT => {
                    for (name, direction) in expect_document(key, value)?.iter() {
                        let order = SortOrder::from_value(direction).ok_or_else(|| {
                            malformed(&format!("Invalid sort direction {} for '{}'", direction, name))
                        })?;
                        parsed.sort_by.push((name.clone(), order));
                    }
                }
                OPT_PROJECT => {
                    let mut projection = Projection::default();
                    for (name, flag) in expect_document(key, value)?.iter() {
                        let included = match flag {
                            Value::Bool(included) => *included,
                            number if number.is_number() => number.as_f64() != Some(0.0),
                            _ => {
                                return Err(malformed(&format!(
                                    "Invalid projection flag {} for '{}'",
                                    flag, name
                                )))
                            }
                        };
                        projection.fields.push((name.clone(), included));
                    }
                    parsed.projection = Some(projection);
                }
                OPT_SKIP => parsed.skip = Some(expect_count(key, value)?),
                OPT_TAKE => parsed.take = Some(expect_count(key, value)?),
                OPT_JOIN => {
                    let descriptors = match value {
                        Value::Array(items) => items.iter().collect::<Vec<_>>(),
                        Value::Document(_) => vec![value],
                        _ => return Err(malformed(&format!("Invalid join {}", value))),
                    };
                    for descriptor in descriptors {
                        let descriptor = expect_document(key, descriptor)?;
                        parsed.joins.push(JoinSpec::from_document(descriptor)?);
                    }
                }
                _ => return Err(malformed(&format!("Unknown query option '{}'", key))),
            }
        }
        Ok(parsed)
    }
}

impl TryFrom<&Document> for QueryOptions {
    type Error = DocStoreError;

    fn try_from(options: &Document) -> DocStoreResult<QueryOptions> {
        QueryOptions::from_document(options)
    }
}

/// Which top-level properties a result document keeps.
///
/// The mode is decided by the non-identifier entries. When all of them are
/// inclusions, only those properties are kept. Otherwise every property is
/// kept except the excluded ones, and inclusions have no further effect.
/// The identifier is kept in every mode unless it is explicitly excluded;
/// a projection listing only the included identifier keeps just the
/// identifier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Projection {
    fields: Vec<(String, bool)>,
}

impl Projection {
    pub fn fields(&self) -> &[(String, bool)] {
        &self.fields
    }

    /// Returns the projected copy of `document`, keeping property order.
    pub fn apply(&self, document: &Document, id_key: &str) -> Document {
        let keep_id = self
            .fields
            .iter()
            .rev()
            .find(|(name, _)| name == id_key)
            .map(|(_, included)| *included)
            .unwrap_or(true);
        let listed: Vec<&(String, bool)> =
            self.fields.iter().filter(|(name, _)| name != id_key).collect();

        let pick_mode = if listed.is_empty() {
            self.fields.iter().any(|(_, included)| *included)
        } else {
            listed.iter().all(|(_, included)| *included)
        };

        let mut projected = document.clone();
        projected.retain(|key, _| {
            if key == id_key {
                return keep_id;
            }
            if pick_mode {
                listed.iter().any(|(name, _)| name == key)
            } else {
                !listed.iter().any(|(name, included)| name == key && !*included)
            }
        });
        projected
    }
}

/// Describes one join: documents of `collection` whose `to` property equals
/// any value of this document's `from` property are attached under `as`.
#[derive(Clone, Debug, PartialEq)]
pub struct JoinSpec {
    collection: String,
    from: String,
    to: String,
    as_name: String,
    options: QueryOptions,
}

impl JoinSpec {
    pub fn new(collection: &str, from: &str, to: &str, as_name: &str) -> JoinSpec {
        JoinSpec {
            collection: collection.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            as_name: as_name.to_string(),
            options: QueryOptions::default(),
        }
    }

    /// Options shaping the joined documents, including further joins.
    pub fn with_options(mut self, options: QueryOptions) -> JoinSpec {
        self.options = options;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn to(&self) -> &str {
        &self.to
    }

    pub fn as_name(&self) -> &str {
        &self.as_name
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Checks that this join names a collection, both properties and an
    /// output name. Nested joins are not checked.
    pub(crate) fn validate(&self) -> DocStoreResult<()> {
        let names = [
            (JOIN_COLLECTION, &self.collection),
            (JOIN_FROM, &self.from),
            (JOIN_TO, &self.to),
            (JOIN_AS, &self.as_name),
        ];
        match names.iter().find(|(_, name)| name.is_empty()) {
            Some((key, _)) => Err(malformed(&format!("Join option '{}' cannot be empty", key))),
            None => Ok(()),
        }
    }

    fn from_document(descriptor: &Document) -> DocStoreResult<JoinSpec> {
        let mut collection = None;
        let mut from = None;
        let mut to = None;
        let mut as_name = None;
        let mut options = QueryOptions::default();

        for (key, value) in descriptor.iter() {
            match key.as_str() {
                JOIN_COLLECTION => collection = Some(expect_name(key, value)?),
                JOIN_FROM => from = Some(expect_name(key, value)?),
                JOIN_TO => to = Some(expect_name(key, value)?),
                JOIN_AS => as_name = Some(expect_name(key, value)?),
                JOIN_OPTIONS => options = QueryOptions::from_document(expect_document(key, value)?)?,
                _ => return Err(malformed(&format!("Unknown join option '{}'", key))),
            }
        }

        match (collection, from, to, as_name) {
            (Some(collection), Some(from), Some(to), Some(as_name)) => Ok(JoinSpec {
                collection,
                from,
                to,
                as_name,
                options,
            }),
            _ => Err(malformed(&format!(
                "Join {} needs '{}', '{}', '{}' and '{}'",
                descriptor, JOIN_COLLECTION, JOIN_FROM, JOIN_TO, JOIN_AS
            ))),
        }
    }
}

fn malformed(message: &str) -> DocStoreError {
    log::error!("{}", message);
    DocStoreError::new(message, ErrorKind::MalformedQuery)
}

fn expect_document<'a>(key: &str, value: &'a Value) -> DocStoreResult<&'a Document> {
    value
        .as_document()
        .ok_or_else(|| malformed(&format!("Option '{}' expects a document, found {}", key, value)))
}

fn expect_name(key: &str, value: &Value) -> DocStoreResult<String> {
    match value {
        Value::String(name) if !name.is_empty() => Ok(name.clone()),
        _ => Err(malformed(&format!(
            "Option '{}' expects a property or collection name, found {}",
            key, value
        ))),
    }
}

fn expect_count(key: &str, value: &Value) -> DocStoreResult<usize> {
    match value {
        Value::I64(count) if *count >= 0 => Ok(*count as usize),
        _ => Err(malformed(&format!(
            "Option '{}' expects a non-negative integer, found {}",
            key, value
        ))),
    }
}
