//! Value bridge between [`HostValue`] and Starlark values.
//!
//! Both directions are total: every input has a defined output, and
//! anything outside the shared shape set becomes null/`None` rather than an
//! error.
//!
//! | Host          | Starlark                               |
//! |---------------|----------------------------------------|
//! | `Null`        | `None`                                 |
//! | `Bool`        | `bool`                                 |
//! | `Number`      | `int` if integral, else `float`        |
//! | `String`      | `string`                               |
//! | `Array`       | `list`                                 |
//! | `Object`      | `dict` with string keys                |
//!
//! Starlark types with no host shape (tuples, functions, structs, …) map
//! to `Null`.
//!
//! Nesting deeper than [`BridgeConfig::max_depth`] (128 by default) maps to
//! null as well.  That keeps self-referencing lists finite, but it also
//! cuts acyclic values nested past the limit, so only values within it
//! survive a round trip unchanged.  Raise `max_depth` for deeper data.

use starlark::values::dict::{AllocDict, DictRef};
use starlark::values::float::StarlarkFloat;
use starlark::values::list::{AllocList, ListRef};
use starlark::values::{Heap, UnpackValue, Value, ValueLike};

use crate::config::{BridgeConfig, IntOverflow};
use crate::value::HostValue;

/// Converter configured with depth and overflow policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bridge {
    config: BridgeConfig,
}

impl Bridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    // ── Host → Starlark ───────────────────────────────────────────────────────

    /// Convert a host value into a Starlark value allocated on `heap`.
    ///
    /// Numbers are split by integrality, not by any tag: `3` and `3.0`
    /// both become `int`, `3.5` becomes `float`.  Integral numbers beyond
    /// 2^53 are already approximate on the host side and convert to that
    /// approximation; beyond the `i64` range they saturate.
    pub fn to_starlark<'v>(&self, value: &HostValue, heap: &'v Heap) -> Value<'v> {
        self.to_starlark_at(value, heap, 0)
    }

    fn to_starlark_at<'v>(&self, value: &HostValue, heap: &'v Heap, depth: usize) -> Value<'v> {
        if depth > self.config.max_depth {
            return Value::new_none();
        }
        match value {
            HostValue::Null => Value::new_none(),
            HostValue::Bool(b) => Value::new_bool(*b),
            HostValue::Number(n) => {
                if is_integral(*n) {
                    // `as` saturates at the i64 bounds.
                    heap.alloc(*n as i64)
                } else {
                    heap.alloc(StarlarkFloat(*n))
                }
            }
            HostValue::String(s) => heap.alloc(s.as_str()),
            HostValue::Array(items) => {
                let items: Vec<Value<'v>> = items
                    .iter()
                    .map(|item| self.to_starlark_at(item, heap, depth + 1))
                    .collect();
                heap.alloc(AllocList(items))
            }
            HostValue::Object(entries) => {
                let entries: Vec<(Value<'v>, Value<'v>)> = entries
                    .iter()
                    .map(|(k, v)| (heap.alloc(k.as_str()), self.to_starlark_at(v, heap, depth + 1)))
                    .collect();
                heap.alloc(AllocDict(entries))
            }
        }
    }

    // ── Starlark → Host ───────────────────────────────────────────────────────

    /// Convert a Starlark value back into a host value.
    ///
    /// Ints pass through an `i64`; ints outside that range follow
    /// [`BridgeConfig::int_overflow`].
    pub fn to_host(&self, value: Value) -> HostValue {
        self.to_host_at(value, 0)
    }

    fn to_host_at(&self, value: Value, depth: usize) -> HostValue {
        if depth > self.config.max_depth || value.is_none() {
            return HostValue::Null;
        }
        if let Some(b) = value.unpack_bool() {
            return HostValue::Bool(b);
        }
        if let Some(f) = value.downcast_ref::<StarlarkFloat>() {
            return HostValue::Number(f.0);
        }
        if let Some(s) = value.unpack_str() {
            return HostValue::String(s.to_owned());
        }
        match i64::unpack_value(value) {
            Ok(Some(i)) => return HostValue::Number(i as f64),
            // Only a big int fails to unpack.
            Err(_) => return HostValue::Number(self.big_int_to_number(&value.to_str())),
            Ok(None) => {}
        }
        if let Some(list) = ListRef::from_value(value) {
            return HostValue::Array(
                list.iter().map(|item| self.to_host_at(item, depth + 1)).collect(),
            );
        }
        if let Some(dict) = DictRef::from_value(value) {
            return HostValue::Object(
                dict.iter()
                    .map(|(k, v)| (dict_key(k), self.to_host_at(v, depth + 1)))
                    .collect(),
            );
        }
        HostValue::Null
    }

    /// Number for a Starlark int outside the `i64` range, given its
    /// decimal rendering.
    fn big_int_to_number(&self, repr: &str) -> f64 {
        match self.config.int_overflow {
            IntOverflow::Saturate => {
                if repr.starts_with('-') {
                    i64::MIN as f64
                } else {
                    i64::MAX as f64
                }
            }
            IntOverflow::Nearest => repr.parse::<f64>().unwrap_or(f64::NAN),
        }
    }
}

/// Whether a host number converts to a Starlark `int`.
pub fn is_integral(n: f64) -> bool {
    n.is_finite() && n == n.trunc()
}

/// Dict keys become property names: strings verbatim, anything else via
/// its `str()` rendering.
fn dict_key(key: Value) -> String {
    match key.unpack_str() {
        Some(s) => s.to_owned(),
        None => key.to_str(),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
