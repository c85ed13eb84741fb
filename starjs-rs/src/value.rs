//! Host-side value type.
//!
//! [`HostValue`] mirrors the shapes a JavaScript caller can hand us: booleans,
//! a single number type, strings, arrays, plain objects, and null.  Objects
//! keep their entries in insertion order so that key order survives a trip
//! through Starlark and back.
//!
//! The JSON mapping (used by the CLI host) lives here too; the `JsValue`
//! mapping lives in [`crate::js`].

use std::fmt;

/// A value in the host environment's dynamic type system.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HostValue {
    /// `null`, `undefined`, and anything the host has no better shape for.
    #[default]
    Null,
    Bool(bool),
    /// The host has one numeric type; integrality is decided by the bridge.
    Number(f64),
    String(String),
    Array(Vec<HostValue>),
    /// Own enumerable properties, in enumeration order.
    Object(Vec<(String, HostValue)>),
}

impl HostValue {
    /// Build an object from `(key, value)` pairs.
    pub fn object<K: Into<String>>(entries: impl IntoIterator<Item = (K, HostValue)>) -> Self {
        HostValue::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Look up a property on an object.  Returns `None` for every other shape.
    pub fn get(&self, key: &str) -> Option<&HostValue> {
        match self {
            HostValue::Object(entries) => entries.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    /// Name of the shape, as JS `typeof` would report it (arrays and null
    /// both report `"object"`).
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Null | HostValue::Array(_) | HostValue::Object(_) => "object",
            HostValue::Bool(_) => "boolean",
            HostValue::Number(_) => "number",
            HostValue::String(_) => "string",
        }
    }

    /// Coerce to a string the way JS `String(x)` does.
    pub fn to_host_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for HostValue {
    /// JS `String(x)` semantics: arrays join their elements with `,`,
    /// objects render as `[object Object]`, null inside an array is empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Null => write!(f, "null"),
            HostValue::Bool(b) => write!(f, "{b}"),
            HostValue::Number(n) => write!(f, "{}", format_number(*n)),
            HostValue::String(s) => write!(f, "{s}"),
            HostValue::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    if !item.is_null() {
                        write!(f, "{item}")?;
                    }
                }
                Ok(())
            }
            HostValue::Object(_) => write!(f, "[object Object]"),
        }
    }
}

/// Render a number the way JS prints it: integral values without a
/// fractional part, `NaN` and `Infinity` spelled out.
fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n == f64::INFINITY {
        "Infinity".to_owned()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_owned()
    } else if n == 0.0 {
        // Covers -0, which JS prints as "0".
        "0".to_owned()
    } else if n == n.trunc() && n.abs() < 1e21 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

// ── JSON mapping ──────────────────────────────────────────────────────────────

impl From<serde_json::Value> for HostValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => HostValue::Null,
            serde_json::Value::Bool(b) => HostValue::Bool(b),
            // Integers above 2^53 lose precision here, exactly as JSON.parse does.
            serde_json::Value::Number(n) => HostValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => HostValue::String(s),
            serde_json::Value::Array(items) => {
                HostValue::Array(items.into_iter().map(HostValue::from).collect())
            }
            serde_json::Value::Object(map) => {
                HostValue::Object(map.into_iter().map(|(k, v)| (k, HostValue::from(v))).collect())
            }
        }
    }
}

impl From<&HostValue> for serde_json::Value {
    fn from(value: &HostValue) -> Self {
        match value {
            HostValue::Null => serde_json::Value::Null,
            HostValue::Bool(b) => serde_json::Value::Bool(*b),
            HostValue::Number(n) => number_to_json(*n),
            HostValue::String(s) => serde_json::Value::String(s.clone()),
            HostValue::Array(items) => {
                serde_json::Value::Array(items.iter().map(serde_json::Value::from).collect())
            }
            HostValue::Object(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// Largest integer a double represents exactly (`Number.MAX_SAFE_INTEGER`).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Integral numbers within the safe range are written without a fractional
/// part (`42`, not `42.0`).  Non-finite numbers become `null`, as in
/// `JSON.stringify`.
fn number_to_json(n: f64) -> serde_json::Value {
    if n == n.trunc() && n.abs() <= MAX_SAFE_INTEGER {
        serde_json::Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

impl serde::Serialize for HostValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde_json::Value::from(self).serialize(serializer)
    }
}

impl<'de> serde::Deserialize<'de> for HostValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(HostValue::from)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_object_keeps_key_order() {
        let v = HostValue::from(json!({"zeta": 1, "alpha": 2, "mid": 3}));
        let HostValue::Object(entries) = &v else { panic!("expected object: {v:?}") };
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn integral_numbers_serialize_without_fraction() {
        assert_eq!(serde_json::to_string(&HostValue::Number(42.0)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&HostValue::Number(-3.0)).unwrap(), "-3");
        assert_eq!(serde_json::to_string(&HostValue::Number(2.5)).unwrap(), "2.5");
    }

    #[test]
    fn non_finite_numbers_serialize_as_null() {
        assert_eq!(serde_json::to_string(&HostValue::Number(f64::NAN)).unwrap(), "null");
        assert_eq!(serde_json::to_string(&HostValue::Number(f64::INFINITY)).unwrap(), "null");
    }

    #[test]
    fn deserialize_nested() {
        let v: HostValue = serde_json::from_str(r#"[1, "a", {"k": [true, null]}]"#).unwrap();
        assert_eq!(
            v,
            HostValue::Array(vec![
                HostValue::Number(1.0),
                HostValue::String("a".into()),
                HostValue::object([(
                    "k",
                    HostValue::Array(vec![HostValue::Bool(true), HostValue::Null])
                )]),
            ])
        );
    }

    #[test]
    fn js_string_coercion() {
        assert_eq!(HostValue::Null.to_host_string(), "null");
        assert_eq!(HostValue::Bool(true).to_host_string(), "true");
        assert_eq!(HostValue::Number(3.0).to_host_string(), "3");
        assert_eq!(HostValue::Number(0.5).to_host_string(), "0.5");
        assert_eq!(HostValue::Number(f64::NEG_INFINITY).to_host_string(), "-Infinity");
        let arr = HostValue::Array(vec![
            HostValue::Number(1.0),
            HostValue::Null,
            HostValue::String("x".into()),
        ]);
        assert_eq!(arr.to_host_string(), "1,,x");
        assert_eq!(HostValue::object([("a", HostValue::Null)]).to_host_string(), "[object Object]");
    }

    #[test]
    fn get_on_object_and_other_shapes() {
        let obj = HostValue::object([("error", HostValue::String("boom".into()))]);
        assert_eq!(obj.get("error"), Some(&HostValue::String("boom".into())));
        assert_eq!(obj.get("message"), None);
        assert_eq!(HostValue::Number(1.0).get("error"), None);
    }

    #[test]
    fn type_names_follow_typeof() {
        assert_eq!(HostValue::Null.type_name(), "object");
        assert_eq!(HostValue::Array(vec![]).type_name(), "object");
        assert_eq!(HostValue::Number(1.0).type_name(), "number");
    }
}
