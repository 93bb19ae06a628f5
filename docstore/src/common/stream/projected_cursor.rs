use crate::collection::{Document, Projection};

/// Applies a projection to every document of a stream.
pub(crate) struct ProjectedStream<'a, I> {
    iter: I,
    projection: Option<&'a Projection>,
    id_key: &'a str,
}

impl<'a, I: Iterator<Item = Document>> ProjectedStream<'a, I> {
    pub fn new(iter: I, projection: Option<&'a Projection>, id_key: &'a str) -> Self {
        ProjectedStream {
            iter,
            projection,
            id_key,
        }
    }
}

impl<I: Iterator<Item = Document>> Iterator for ProjectedStream<'_, I> {
    type Item = Document;

    fn next(&mut self) -> Option<Self::Item> {
        let document = self.iter.next()?;
        match self.projection {
            Some(projection) => Some(projection.apply(&document, self.id_key)),
            None => Some(document),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}
