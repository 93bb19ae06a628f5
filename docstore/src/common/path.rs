use crate::collection::Document;
use crate::common::Value;
use smallvec::SmallVec;
use std::fmt::{Display, Formatter};

/// One step of a [PropertyPath].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A property of a document.
    Key(String),
    /// A position in an array.
    Index(usize),
}

/// The position of a value inside a [Document].
///
/// Paths are produced by [locate], which implements the flexible property
/// lookup shared by query matching, sorting and modifiers: a bare property
/// name is found wherever it sits in the document tree, not only at the top
/// level.
///
/// # Examples
///
/// ```rust
/// use docstore::common::{locate, Value};
/// use docstore::doc;
///
/// let planet = doc! { name: "Venus", temp: { avg: 475 } };
/// let path = locate(&planet, "avg").unwrap();
/// assert_eq!(path.to_string(), "temp.avg");
/// assert_eq!(path.resolve(&planet), Some(&Value::I64(475)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PropertyPath {
    segments: SmallVec<[Segment; 4]>,
}

impl PropertyPath {
    /// A path addressing a top-level property.
    pub fn top_level(name: &str) -> Self {
        let mut segments = SmallVec::new();
        segments.push(Segment::Key(name.to_string()));
        PropertyPath { segments }
    }

    /// The empty path, addressing the document itself.
    pub fn root() -> Self {
        PropertyPath::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_top_level(&self) -> bool {
        self.segments.len() == 1
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Extends this path with the segments of `other`.
    pub fn append(&mut self, other: &PropertyPath) {
        self.segments.extend(other.segments.iter().cloned());
    }

    /// Returns the value this path addresses, if it still exists.
    pub fn resolve<'a>(&self, document: &'a Document) -> Option<&'a Value> {
        let (first, rest) = self.segments.split_first()?;
        let mut current = match first {
            Segment::Key(key) => document.get(key)?,
            Segment::Index(_) => return None,
        };

        for segment in rest {
            current = match (segment, current) {
                (Segment::Key(key), Value::Document(nested)) => nested.get(key)?,
                (Segment::Index(index), Value::Array(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn resolve_mut<'a>(&self, document: &'a mut Document) -> Option<&'a mut Value> {
        let (first, rest) = self.segments.split_first()?;
        let mut current = match first {
            Segment::Key(key) => document.get_mut(key)?,
            Segment::Index(_) => return None,
        };

        for segment in rest {
            current = match (segment, current) {
                (Segment::Key(key), Value::Document(nested)) => nested.get_mut(key)?,
                (Segment::Index(index), Value::Array(items)) => items.get_mut(*index)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Returns the document this path addresses. The root path addresses
    /// `document` itself.
    pub fn resolve_document_mut<'a>(&self, document: &'a mut Document) -> Option<&'a mut Document> {
        if self.is_root() {
            return Some(document);
        }
        self.resolve_mut(document)?.as_document_mut()
    }

    /// Removes the addressed value from its parent and returns it.
    pub fn remove_from(&self, document: &mut Document) -> Option<Value> {
        let (last, parents) = self.segments.split_last()?;
        if parents.is_empty() {
            return match last {
                Segment::Key(key) => document.remove(key),
                Segment::Index(_) => None,
            };
        }

        let parent_path = PropertyPath {
            segments: parents.iter().cloned().collect(),
        };
        match (last, parent_path.resolve_mut(document)?) {
            (Segment::Key(key), Value::Document(parent)) => parent.remove(key),
            (Segment::Index(index), Value::Array(items)) if *index < items.len() => {
                Some(items.remove(*index))
            }
            _ => None,
        }
    }
}

impl Display for PropertyPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) if position == 0 => write!(f, "{}", key)?,
                Segment::Key(key) => write!(f, ".{}", key)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// Finds the first position of a property named `name` in `document`.
///
/// A property of the document itself wins. Otherwise the document's values
/// are searched depth-first in property order, descending into nested
/// documents and into documents held by arrays. Returns `None` when no
/// property with that name is reachable; a property holding
/// [Value::Null] is still found.
pub fn locate(document: &Document, name: &str) -> Option<PropertyPath> {
    let mut segments = SmallVec::new();
    if search_document(document, name, &mut segments) {
        Some(PropertyPath { segments })
    } else {
        None
    }
}

/// Finds and resolves `name` in one step.
pub fn lookup<'a>(document: &'a Document, name: &str) -> Option<&'a Value> {
    if let Some(value) = document.get(name) {
        return Some(value);
    }
    locate(document, name).and_then(|path| path.resolve(document))
}

fn search_document(
    document: &Document,
    name: &str,
    trail: &mut SmallVec<[Segment; 4]>,
) -> bool {
    if document.contains_key(name) {
        trail.push(Segment::Key(name.to_string()));
        return true;
    }

    for (key, value) in document.iter() {
        trail.push(Segment::Key(key.clone()));
        if search_value(value, name, trail) {
            return true;
        }
        trail.pop();
    }
    false
}

fn search_value(value: &Value, name: &str, trail: &mut SmallVec<[Segment; 4]>) -> bool {
    match value {
        Value::Document(nested) => search_document(nested, name, trail),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                trail.push(Segment::Index(index));
                if search_value(item, name, trail) {
                    return true;
                }
                trail.pop();
            }
            false
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    fn planet() -> Document {
        doc! {
            name: "Venus",
            temp: { avg: 475, range: { min: 462, max: 480 } },
            moons: [],
            rings: [{ label: "inner", width: 3 }, { label: "outer" }],
        }
    }

    #[test]
    fn test_locate_top_level() {
        let doc = planet();
        let path = locate(&doc, "name").unwrap();
        assert!(path.is_top_level());
        assert_eq!(path.resolve(&doc), Some(&Value::from("Venus")));
    }

    #[test]
    fn test_locate_nested() {
        let doc = planet();
        let path = locate(&doc, "max").unwrap();
        assert_eq!(path.to_string(), "temp.range.max");
        assert_eq!(path.resolve(&doc), Some(&Value::I64(480)));
    }

    #[test]
    fn test_locate_inside_array() {
        let doc = planet();
        let path = locate(&doc, "width").unwrap();
        assert_eq!(path.to_string(), "rings[0].width");
        assert_eq!(path.resolve(&doc), Some(&Value::I64(3)));
    }

    #[test]
    fn test_locate_prefers_own_property() {
        let doc = doc! { nested: { avg: 1 }, avg: 2 };
        assert_eq!(lookup(&doc, "avg"), Some(&Value::I64(2)));
    }

    #[test]
    fn test_locate_first_in_property_order() {
        let doc = doc! { a: { avg: 1 }, b: { avg: 2 } };
        assert_eq!(locate(&doc, "avg").unwrap().to_string(), "a.avg");
    }

    #[test]
    fn test_locate_missing_vs_null() {
        let doc = doc! { present: (Value::Null) };
        assert!(locate(&doc, "absent").is_none());
        assert_eq!(lookup(&doc, "present"), Some(&Value::Null));
    }

    #[test]
    fn test_resolve_mut_updates_in_place() {
        let mut doc = planet();
        let path = locate(&doc, "min").unwrap();
        *path.resolve_mut(&mut doc).unwrap() = Value::I64(400);
        assert_eq!(lookup(&doc, "min"), Some(&Value::I64(400)));
    }

    #[test]
    fn test_remove_from_nested_and_array() {
        let mut doc = planet();
        let path = locate(&doc, "range").unwrap();
        assert!(path.remove_from(&mut doc).is_some());
        assert!(locate(&doc, "min").is_none());

        let path = locate(&doc, "label").unwrap();
        assert_eq!(path.remove_from(&mut doc), Some(Value::from("inner")));
        assert_eq!(lookup(&doc, "label"), Some(&Value::from("outer")));
    }

    #[test]
    fn test_resolve_stale_path() {
        let doc = planet();
        let path = locate(&doc, "max").unwrap();
        assert!(path.resolve(&doc! { temp: 5 }).is_none());
    }

    #[test]
    fn test_root_path_resolves_document() {
        let mut doc = planet();
        let root = PropertyPath::root();
        assert!(root.is_root());
        assert_eq!(root.resolve_document_mut(&mut doc).map(|d| d.size()), Some(4));
    }
}
