use crate::collection::Document;
use crate::common::{locate, lookup, PropertyPath, Value, OP_AND, OP_OR};
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};
use crate::filter::Comparison;
use std::fmt::{Display, Formatter};

/// A parsed query.
///
/// A query is a conjunction of clauses, one per key of the query document.
/// Parsing happens once, before any document is scanned, so every
/// structural problem surfaces as an error before state is touched;
/// [Query::matches] itself cannot fail.
///
/// # Examples
///
/// ```rust
/// use docstore::doc;
/// use docstore::filter::Query;
///
/// let query = Query::parse(&doc! { "$or": [{ avg: 475 }, { diameter: { "$gt": 12000 } }] }).unwrap();
/// assert!(query.matches(&doc! { name: "Venus", temp: { avg: 475 } }));
/// assert!(!query.matches(&doc! { name: "Mercury", diameter: 4880 }));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Query {
    clauses: Vec<Clause>,
}

/// One key of a query document.
#[derive(Clone, Debug)]
pub enum Clause {
    /// `$and`: every sub-query matches. Vacuously true when empty.
    And(Vec<Query>),
    /// `$or`: at least one sub-query matches. Vacuously false when empty.
    Or(Vec<Query>),
    /// A property name with the predicate its value must satisfy.
    Field { name: String, predicate: Predicate },
}

/// What a property's value must satisfy.
#[derive(Clone, Debug)]
pub enum Predicate {
    /// Every comparison holds.
    Operators(Vec<Comparison>),
    /// The value is a document matching the nested query.
    Nested(Query),
    /// The value deep-equals the literal.
    Literal(Value),
}

impl Query {
    /// A query matching every document.
    pub fn all() -> Query {
        Query::default()
    }

    /// Parses a query document.
    ///
    /// # Errors
    ///
    /// * `UnknownOperator` for an unrecognized `$` key, naming the key.
    /// * `MalformedQuery` for a combinator or operator with an invalid payload.
    pub fn parse(query: &Document) -> DocStoreResult<Query> {
        let mut clauses = Vec::with_capacity(query.size());
        for (key, value) in query.iter() {
            let clause = match key.as_str() {
                OP_AND => Clause::And(parse_branches(key, value)?),
                OP_OR => Clause::Or(parse_branches(key, value)?),
                _ if key.starts_with('$') => {
                    log::error!("Unknown query operator '{}'", key);
                    return Err(DocStoreError::new(
                        &format!("Unknown query operator '{}'", key),
                        ErrorKind::UnknownOperator,
                    ));
                }
                _ => Clause::Field {
                    name: key.clone(),
                    predicate: Predicate::parse(value)?,
                },
            };
            clauses.push(clause);
        }
        Ok(Query { clauses })
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Tests a document against every clause.
    pub fn matches(&self, document: &Document) -> bool {
        self.clauses.iter().all(|clause| clause.matches(document))
    }

    /// Finds where a `$merge` issued with this query should land in
    /// `document`.
    ///
    /// Clauses are walked in order, descending into `$and` branches and into
    /// the `$or` branches the document satisfies. The first nested
    /// sub-query whose property resolves to a document anchors the merge,
    /// and its own nested sub-queries refine the anchor further. Returns
    /// `None` when the query addresses no nested document, in which case the
    /// merge targets the document root.
    pub fn merge_anchor(&self, document: &Document) -> Option<PropertyPath> {
        for clause in &self.clauses {
            match clause {
                Clause::And(branches) => {
                    if let Some(anchor) = branches.iter().find_map(|q| q.merge_anchor(document)) {
                        return Some(anchor);
                    }
                }
                Clause::Or(branches) => {
                    let anchor = branches
                        .iter()
                        .filter(|q| q.matches(document))
                        .find_map(|q| q.merge_anchor(document));
                    if anchor.is_some() {
                        return anchor;
                    }
                }
                Clause::Field {
                    name,
                    predicate: Predicate::Nested(nested),
                } => {
                    let Some(mut path) = locate(document, name) else {
                        continue;
                    };
                    if let Some(Value::Document(inner)) = path.resolve(document) {
                        if let Some(deeper) = nested.merge_anchor(inner) {
                            path.append(&deeper);
                        }
                        return Some(path);
                    }
                }
                Clause::Field { .. } => {}
            }
        }
        None
    }
}

impl Clause {
    fn matches(&self, document: &Document) -> bool {
        match self {
            Clause::And(branches) => branches.iter().all(|q| q.matches(document)),
            Clause::Or(branches) => branches.iter().any(|q| q.matches(document)),
            Clause::Field { name, predicate } => match lookup(document, name) {
                Some(value) => predicate.test(value),
                None => false,
            },
        }
    }
}

impl Predicate {
    fn parse(value: &Value) -> DocStoreResult<Predicate> {
        match value {
            Value::Document(mapping) if is_operator_mapping(mapping) => {
                let comparisons = mapping
                    .iter()
                    .map(|(operator, operand)| Comparison::parse(operator, operand))
                    .collect::<DocStoreResult<Vec<_>>>()?;
                Ok(Predicate::Operators(comparisons))
            }
            Value::Document(mapping) => Ok(Predicate::Nested(Query::parse(mapping)?)),
            literal => Ok(Predicate::Literal(literal.clone())),
        }
    }

    fn test(&self, value: &Value) -> bool {
        match self {
            Predicate::Operators(comparisons) => comparisons.iter().all(|c| c.evaluate(value)),
            Predicate::Nested(query) => value
                .as_document()
                .map(|nested| query.matches(nested))
                .unwrap_or(false),
            Predicate::Literal(literal) => value == literal,
        }
    }
}

fn is_operator_mapping(mapping: &Document) -> bool {
    !mapping.is_empty() && mapping.keys().all(|k| k.starts_with('$'))
}

fn parse_branches(combinator: &str, value: &Value) -> DocStoreResult<Vec<Query>> {
    let malformed = || {
        log::error!("{} expects an array of queries, found {}", combinator, value);
        DocStoreError::new(
            &format!("{} expects an array of queries, found {}", combinator, value),
            ErrorKind::MalformedQuery,
        )
    };

    let branches = value.as_array().ok_or_else(malformed)?;
    branches
        .iter()
        .map(|branch| match branch {
            Value::Document(query) => Query::parse(query),
            _ => Err(malformed()),
        })
        .collect()
}

impl Display for Query {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.clauses.is_empty() {
            return write!(f, "(all)");
        }

        write!(f, "(")?;
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                write!(f, " && ")?;
            }
            match clause {
                Clause::And(branches) => write_branches(f, branches, " && ")?,
                Clause::Or(branches) => write_branches(f, branches, " || ")?,
                Clause::Field { name, predicate } => match predicate {
                    Predicate::Operators(comparisons) => {
                        for (j, comparison) in comparisons.iter().enumerate() {
                            if j > 0 {
                                write!(f, " && ")?;
                            }
                            write!(f, "{} {}", name, comparison)?;
                        }
                    }
                    Predicate::Nested(query) => write!(f, "{}: {}", name, query)?,
                    Predicate::Literal(value) => write!(f, "{} == {}", name, value)?,
                },
            }
        }
        write!(f, ")")
    }
}

fn write_branches(f: &mut Formatter<'_>, branches: &[Query], separator: &str) -> std::fmt::Result {
    write!(f, "[")?;
    for (i, branch) in branches.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", separator)?;
        }
        write!(f, "{}", branch)?;
    }
    write!(f, "]")
}
