use crate::common::Value;

/// Specifies the direction for sorting documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort from smallest to largest value.
    Ascending,
    /// Sort from largest to smallest value.
    Descending,
}

impl SortOrder {
    /// Reads a direction from a sort specification value.
    ///
    /// A positive number means ascending; zero or a negative number means
    /// descending. Anything else is not a direction.
    pub fn from_value(value: &Value) -> Option<SortOrder> {
        let direction = value.as_f64()?;
        if direction > 0.0 {
            Some(SortOrder::Ascending)
        } else {
            Some(SortOrder::Descending)
        }
    }
}
