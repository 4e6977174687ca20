//! Cell values stored in table records.
//!
//! The remote service stores scalars directly and encodes richer values
//! (dates, references, lists) as JSON arrays. Scalars get their own variants;
//! everything else is kept as [`CellValue::Composite`] and never compares
//! equal during reconciliation.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Arrays and objects, carried through untouched
    Composite(serde_json::Value),
}

impl CellValue {
    /// Strict equality used to detect changed cells.
    ///
    /// Numbers compare exactly across `Int`/`Float`: a float equals an
    /// integer only when it holds that integer without rounding. Values of
    /// different kinds differ, and a composite differs from everything,
    /// itself included.
    pub fn same_as(&self, other: &CellValue) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => a == b,
            (CellValue::Int(a), CellValue::Float(b)) | (CellValue::Float(b), CellValue::Int(a)) => {
                CellValue::Float(*b).as_i64() == Some(*a)
            }
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, CellValue::Composite(_))
    }

    /// Integer view of the value, accepting integral floats in `i64` range.
    pub fn as_i64(&self) -> Option<i64> {
        // 2^63 is exact as a float; anything at or above it saturates the cast
        const LIMIT: f64 = 9_223_372_036_854_775_808.0;
        match self {
            CellValue::Int(n) => Some(*n),
            CellValue::Float(f) if f.fract() == 0.0 && (-LIMIT..LIMIT).contains(f) => {
                Some(*f as i64)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Human readable kind name, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            CellValue::Null => "Null",
            CellValue::Bool(_) => "Bool",
            CellValue::Int(_) => "Int",
            CellValue::Float(_) => "Float",
            CellValue::Text(_) => "Text",
            CellValue::Composite(v) if v.is_array() => "Array",
            CellValue::Composite(_) => "Object",
        }
    }

    /// Convert back into a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Null => serde_json::Value::Null,
            CellValue::Bool(b) => serde_json::Value::Bool(*b),
            CellValue::Int(n) => serde_json::Value::from(*n),
            // Non-finite floats have no JSON form
            CellValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            CellValue::Text(s) => serde_json::Value::String(s.clone()),
            CellValue::Composite(v) => v.clone(),
        }
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Bool(b) => CellValue::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => CellValue::Int(i),
                None => CellValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => CellValue::Text(s),
            other => CellValue::Composite(other),
        }
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Int(value.into())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(CellValue::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalars_compare_by_value() {
        assert!(CellValue::from("a").same_as(&CellValue::from("a")));
        assert!(!CellValue::from("a").same_as(&CellValue::from("b")));
        assert!(CellValue::Null.same_as(&CellValue::Null));
        assert!(CellValue::Int(1).same_as(&CellValue::Float(1.0)));
        assert!(!CellValue::Int(1).same_as(&CellValue::from("1")));
        assert!(!CellValue::Bool(false).same_as(&CellValue::Null));
    }

    #[test]
    fn nan_never_equal() {
        let nan = CellValue::Float(f64::NAN);
        assert!(!nan.same_as(&nan.clone()));
    }

    #[test]
    fn composites_always_differ() {
        let a = CellValue::from(json!(["L", 1, 2]));
        let b = CellValue::from(json!(["L", 1, 2]));
        assert!(a.is_composite());
        assert!(!a.same_as(&b));
        assert_eq!(a.kind(), "Array");
    }

    #[test]
    fn from_json_picks_variant() {
        assert_eq!(CellValue::from(json!(5)), CellValue::Int(5));
        assert_eq!(CellValue::from(json!(2.5)), CellValue::Float(2.5));
        assert_eq!(CellValue::from(json!("x")), CellValue::Text("x".into()));
        assert_eq!(CellValue::from(json!(null)), CellValue::Null);
        assert_eq!(CellValue::from(json!(true)), CellValue::Bool(true));
    }

    #[test]
    fn integral_float_reads_as_integer() {
        assert_eq!(CellValue::Float(3.0).as_i64(), Some(3));
        assert_eq!(CellValue::Float(3.5).as_i64(), None);
        assert_eq!(CellValue::from("3").as_i64(), None);
    }

    #[test]
    fn large_numbers_compare_exactly() {
        // 2^53 + 1 has no float form; the nearest float is 2^53
        let int = CellValue::Int(9_007_199_254_740_993);
        let float = CellValue::Float(9_007_199_254_740_992.0);
        assert!(!int.same_as(&float));
        assert!(!float.same_as(&int));
        assert!(CellValue::Int(9_007_199_254_740_992).same_as(&float));

        // 2^63 is one past i64::MAX and must not saturate into it
        let two_pow_63 = CellValue::Float(9_223_372_036_854_775_808.0);
        assert_eq!(two_pow_63.as_i64(), None);
        assert!(!CellValue::Int(i64::MAX).same_as(&two_pow_63));
        assert_eq!(CellValue::Float(-9_223_372_036_854_775_808.0).as_i64(), Some(i64::MIN));
        assert_eq!(CellValue::Float(f64::INFINITY).as_i64(), None);
    }

    #[test]
    fn serializes_as_plain_json() {
        let value = CellValue::from(json!({"a": [1, 2]}));
        assert_eq!(serde_json::to_value(&value).unwrap(), json!({"a": [1, 2]}));
        assert_eq!(serde_json::to_value(CellValue::Float(f64::INFINITY)).unwrap(), json!(null));
    }
}
