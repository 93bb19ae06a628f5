use crate::common::{
    Value, OP_EQ, OP_GT, OP_GTE, OP_IN, OP_LT, OP_LTE, OP_NE, OP_NIN, OP_REGEX,
};
use crate::errors::{DocStoreError, DocStoreResult, ErrorKind};
use regex::Regex;
use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

/// A single comparison operator with its comparand.
///
/// Comparisons never fail once parsed. Ordering operators use
/// [Value::compare], so a type mismatch (a string against a number, say)
/// simply does not match.
#[derive(Clone, Debug)]
pub enum Comparison {
    /// `$eq`: deep equality.
    Eq(Value),
    /// `$ne`: deep inequality.
    Ne(Value),
    /// `$gt`: the resolved value is greater than the comparand.
    Gt(Value),
    /// `$gte`: greater than or equal.
    Gte(Value),
    /// `$lt`: less than.
    Lt(Value),
    /// `$lte`: less than or equal.
    Lte(Value),
    /// `$in`: equal to any element.
    In(Vec<Value>),
    /// `$nin`: equal to no element.
    Nin(Vec<Value>),
    /// `$regex`: a string value matching the pattern.
    Regex(Regex),
}

impl Comparison {
    /// Parses one `operator: comparand` entry of an operator mapping.
    pub fn parse(operator: &str, operand: &Value) -> DocStoreResult<Comparison> {
        match operator {
            OP_EQ => Ok(Comparison::Eq(operand.clone())),
            OP_NE => Ok(Comparison::Ne(operand.clone())),
            OP_GT => Ok(Comparison::Gt(operand.clone())),
            OP_GTE => Ok(Comparison::Gte(operand.clone())),
            OP_LT => Ok(Comparison::Lt(operand.clone())),
            OP_LTE => Ok(Comparison::Lte(operand.clone())),
            OP_IN => Ok(Comparison::In(array_operand(operator, operand)?)),
            OP_NIN => Ok(Comparison::Nin(array_operand(operator, operand)?)),
            OP_REGEX => {
                let pattern = operand.as_string().ok_or_else(|| {
                    log::error!("{} expects a string pattern, found {}", operator, operand);
                    DocStoreError::new(
                        &format!("{} expects a string pattern, found {}", operator, operand),
                        ErrorKind::MalformedQuery,
                    )
                })?;
                let regex = Regex::new(pattern).map_err(|e| {
                    log::error!("Invalid regex pattern '{}': {}", pattern, e);
                    DocStoreError::new(
                        &format!("Invalid regex pattern '{}': {}", pattern, e),
                        ErrorKind::MalformedQuery,
                    )
                })?;
                Ok(Comparison::Regex(regex))
            }
            _ => {
                log::error!("Unknown query operator '{}'", operator);
                Err(DocStoreError::new(
                    &format!("Unknown query operator '{}'", operator),
                    ErrorKind::UnknownOperator,
                ))
            }
        }
    }

    /// Tests the resolved property value against this comparison.
    #[inline]
    pub fn evaluate(&self, value: &Value) -> bool {
        match self {
            Comparison::Eq(operand) => value == operand,
            Comparison::Ne(operand) => value != operand,
            Comparison::Gt(operand) => matches!(value.compare(operand), Some(Ordering::Greater)),
            Comparison::Gte(operand) => matches!(
                value.compare(operand),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Comparison::Lt(operand) => matches!(value.compare(operand), Some(Ordering::Less)),
            Comparison::Lte(operand) => matches!(
                value.compare(operand),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Comparison::In(operands) => operands.contains(value),
            Comparison::Nin(operands) => !operands.contains(value),
            Comparison::Regex(regex) => value
                .as_string()
                .map(|text| regex.is_match(text))
                .unwrap_or(false),
        }
    }
}

fn array_operand(operator: &str, operand: &Value) -> DocStoreResult<Vec<Value>> {
    match operand {
        Value::Array(items) => Ok(items.clone()),
        _ => {
            log::error!("{} expects an array, found {}", operator, operand);
            Err(DocStoreError::new(
                &format!("{} expects an array, found {}", operator, operand),
                ErrorKind::MalformedQuery,
            ))
        }
    }
}

impl Display for Comparison {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Comparison::Eq(v) => write!(f, "== {}", v),
            Comparison::Ne(v) => write!(f, "!= {}", v),
            Comparison::Gt(v) => write!(f, "> {}", v),
            Comparison::Gte(v) => write!(f, ">= {}", v),
            Comparison::Lt(v) => write!(f, "< {}", v),
            Comparison::Lte(v) => write!(f, "<= {}", v),
            Comparison::In(v) => write!(f, "in {}", Value::Array(v.clone())),
            Comparison::Nin(v) => write!(f, "not in {}", Value::Array(v.clone())),
            Comparison::Regex(r) => write!(f, "=~ {}", r.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_operators() {
        let gt = Comparison::parse("$gt", &Value::I64(12000)).unwrap();
        assert!(gt.evaluate(&Value::I64(12104)));
        assert!(!gt.evaluate(&Value::I64(12000)));
        assert!(gt.evaluate(&Value::F64(12000.5)));

        let lte = Comparison::parse("$lte", &Value::from("m")).unwrap();
        assert!(lte.evaluate(&Value::from("apple")));
        assert!(lte.evaluate(&Value::from("m")));
        assert!(!lte.evaluate(&Value::from("zebra")));
    }

    #[test]
    fn test_type_mismatch_is_false() {
        let gt = Comparison::parse("$gt", &Value::I64(1)).unwrap();
        assert!(!gt.evaluate(&Value::from("2")));
        assert!(!gt.evaluate(&Value::Null));
        let lt = Comparison::parse("$lt", &Value::I64(1)).unwrap();
        assert!(!lt.evaluate(&Value::Bool(false)));
    }

    #[test]
    fn test_equality_operators() {
        let eq = Comparison::parse("$eq", &Value::I64(3)).unwrap();
        assert!(eq.evaluate(&Value::F64(3.0)));
        let ne = Comparison::parse("$ne", &Value::I64(3)).unwrap();
        assert!(ne.evaluate(&Value::from("3")));
        assert!(!ne.evaluate(&Value::I64(3)));
    }

    #[test]
    fn test_membership_operators() {
        let operand = Value::from(vec![1, 2]);
        let within = Comparison::parse("$in", &operand).unwrap();
        assert!(within.evaluate(&Value::I64(2)));
        assert!(!within.evaluate(&Value::I64(3)));
        let outside = Comparison::parse("$nin", &operand).unwrap();
        assert!(outside.evaluate(&Value::I64(3)));

        let err = Comparison::parse("$in", &Value::I64(1)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MalformedQuery);
    }

    #[test]
    fn test_regex_operator() {
        let regex = Comparison::parse("$regex", &Value::from("^Ve")).unwrap();
        assert!(regex.evaluate(&Value::from("Venus")));
        assert!(!regex.evaluate(&Value::from("Mars")));
        assert!(!regex.evaluate(&Value::I64(1)));

        let err = Comparison::parse("$regex", &Value::from("(")).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MalformedQuery);
    }

    #[test]
    fn test_unknown_operator_names_key() {
        let err = Comparison::parse("$near", &Value::I64(1)).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnknownOperator);
        assert!(err.message().contains("$near"));
    }
}
