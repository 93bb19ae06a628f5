use crate::collection::Document;
use crate::common::{locate, PropertyPath, Value, MOD_INC, MOD_MERGE, MOD_PUSH, MOD_SET, MOD_UNSET};
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};
use crate::filter::Query;

/// A single update operator with its per-property payload.
#[derive(Clone, Debug)]
pub enum Modifier {
    /// `$inc`: add a numeric delta to each property.
    Inc(Vec<(String, Value)>),
    /// `$set`: replace each property's value.
    Set(Vec<(String, Value)>),
    /// `$unset`: remove each property.
    Unset(Vec<String>),
    /// `$push`: append a value to each array property.
    Push(Vec<(String, Value)>),
    /// `$merge`: deep-merge each payload at the location the query addressed.
    Merge(Vec<Document>),
}

/// A parsed set of update operators.
///
/// Operators apply in the order they appear in the modifier document, each
/// seeing the result of the previous one. Parsing validates every payload,
/// so an update with a malformed modifier fails before any document changes.
///
/// # Examples
///
/// ```rust
/// use docstore::collection::ModifierSet;
/// use docstore::doc;
/// use docstore::filter::Query;
///
/// let modifiers = ModifierSet::parse(&doc! { "$inc": { population: 10 } }).unwrap();
/// let updated = modifiers
///     .apply(&doc! { name: "Lyon", population: 500 }, &Query::all())
///     .unwrap();
/// assert_eq!(updated, doc! { name: "Lyon", population: 510 });
/// ```
#[derive(Clone, Debug, Default)]
pub struct ModifierSet {
    modifiers: Vec<Modifier>,
}

impl ModifierSet {
    /// Parses a modifier document.
    ///
    /// # Errors
    ///
    /// * `UnknownOperator` for an unrecognized key, naming the key.
    /// * `MalformedModifier` for a payload of the wrong shape or a
    ///   non-numeric `$inc` delta.
    pub fn parse(modifiers: &Document) -> DocStoreResult<ModifierSet> {
        let mut parsed = Vec::with_capacity(modifiers.size());
        for (operator, payload) in modifiers.iter() {
            let modifier = match operator.as_str() {
                MOD_INC => {
                    let entries = property_payload(operator, payload)?;
                    if let Some((name, delta)) = entries.iter().find(|(_, d)| !d.is_number()) {
                        log::error!("{} expects a numeric delta for '{}', found {}", operator, name, delta);
                        return Err(DocStoreError::new(
                            &format!("{} expects a numeric delta for '{}', found {}", operator, name, delta),
                            ErrorKind::MalformedModifier,
                        ));
                    }
                    Modifier::Inc(entries)
                }
                MOD_SET => Modifier::Set(property_payload(operator, payload)?),
                MOD_UNSET => Modifier::Unset(
                    property_payload(operator, payload)?
                        .into_iter()
                        .map(|(name, _)| name)
                        .collect(),
                ),
                MOD_PUSH => Modifier::Push(property_payload(operator, payload)?),
                MOD_MERGE => Modifier::Merge(merge_payload(operator, payload)?),
                _ => {
                    log::error!("Unknown update operator '{}'", operator);
                    return Err(DocStoreError::new(
                        &format!("Unknown update operator '{}'", operator),
                        ErrorKind::UnknownOperator,
                    ));
                }
            };
            parsed.push(modifier);
        }
        Ok(ModifierSet { modifiers: parsed })
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Applies every operator to a copy of `document`.
    ///
    /// `query` is the query that selected the document; it decides where
    /// `$merge` payloads land.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDataType` when `$inc` meets a non-numeric value or
    /// `$push` meets a non-array value. `document` itself is never changed.
    pub fn apply(&self, document: &Document, query: &Query) -> DocStoreResult<Document> {
        let mut updated = document.clone();
        for modifier in &self.modifiers {
            match modifier {
                Modifier::Inc(entries) => {
                    for (name, delta) in entries {
                        increment(&mut updated, name, delta)?;
                    }
                }
                Modifier::Set(entries) => {
                    for (name, value) in entries {
                        match locate(&updated, name).and_then(|p| p.resolve_mut(&mut updated)) {
                            Some(slot) => *slot = value.clone(),
                            None => updated.put(name.as_str(), value.clone())?,
                        }
                    }
                }
                Modifier::Unset(names) => {
                    for name in names {
                        if let Some(path) = locate(&updated, name) {
                            path.remove_from(&mut updated);
                        }
                    }
                }
                Modifier::Push(entries) => {
                    for (name, value) in entries {
                        push(&mut updated, name, value)?;
                    }
                }
                Modifier::Merge(payloads) => {
                    for payload in payloads {
                        let anchor = query.merge_anchor(&updated).unwrap_or_else(PropertyPath::root);
                        let target = anchor.resolve_document_mut(&mut updated).ok_or_else(|| {
                            log::error!("Merge target {} is not a document", anchor);
                            DocStoreError::new(
                                &format!("Merge target {} is not a document", anchor),
                                ErrorKind::InternalError,
                            )
                        })?;
                        target.merge(payload);
                    }
                }
            }
        }
        Ok(updated)
    }
}

fn increment(document: &mut Document, name: &str, delta: &Value) -> DocStoreResult<()> {
    let Some(path) = locate(document, name) else {
        return document.put(name, delta.clone());
    };

    if let Some(slot) = path.resolve_mut(document) {
        let sum = slot.checked_add(delta).ok_or_else(|| {
            log::error!("Cannot increment {} holding a {} value", path, slot.type_name());
            DocStoreError::new(
                &format!("Cannot increment {} holding a {} value", path, slot.type_name()),
                ErrorKind::InvalidDataType,
            )
        })?;
        *slot = sum;
    }
    Ok(())
}

fn push(document: &mut Document, name: &str, value: &Value) -> DocStoreResult<()> {
    let Some(path) = locate(document, name) else {
        return document.put(name, Value::Array(vec![value.clone()]));
    };

    if let Some(slot) = path.resolve_mut(document) {
        let type_name = slot.type_name();
        let items = slot.as_array_mut().ok_or_else(|| {
            log::error!("Cannot push onto {} holding a {} value", path, type_name);
            DocStoreError::new(
                &format!("Cannot push onto {} holding a {} value", path, type_name),
                ErrorKind::InvalidDataType,
            )
        })?;
        items.push(value.clone());
    }
    Ok(())
}

fn property_payload(operator: &str, payload: &Value) -> DocStoreResult<Vec<(String, Value)>> {
    match payload {
        Value::Document(entries) => Ok(entries
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()),
        _ => {
            log::error!("{} expects a document payload, found {}", operator, payload);
            Err(DocStoreError::new(
                &format!("{} expects a document payload, found {}", operator, payload),
                ErrorKind::MalformedModifier,
            ))
        }
    }
}

fn merge_payload(operator: &str, payload: &Value) -> DocStoreResult<Vec<Document>> {
    let malformed = || {
        log::error!("{} expects a document or an array of documents, found {}", operator, payload);
        DocStoreError::new(
            &format!("{} expects a document or an array of documents, found {}", operator, payload),
            ErrorKind::MalformedModifier,
        )
    };

    match payload {
        Value::Document(document) => Ok(vec![document.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_document().cloned().ok_or_else(malformed))
            .collect(),
        _ => Err(malformed()),
    }
}
