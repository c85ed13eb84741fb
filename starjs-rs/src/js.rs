//! JavaScript host binding (wasm32, `js` feature).
//!
//! Build with:
//! ```text
//! cargo build --target wasm32-unknown-unknown --no-default-features --features js
//! ```
//!
//! On instantiation the module's start function calls [`register`], which
//! installs a variadic `run_starlark_code(source, functionName?, ...args)`
//! on the JS global object (fixed arity under a CSP without
//! `unsafe-eval`, see [`register`]).  The closure behind it is leaked on purpose so
//! it stays callable for as long as the wasm instance lives; there is no
//! unregister path.
//!
//! Bundler users can call the exported `runStarlark(argsArray)` directly.

#[cfg(feature = "js")]
pub use js_impl::{from_js, register, run_starlark, to_js, FIXED_ARITY_ARGS, GLOBAL_NAME};

#[cfg(feature = "js")]
mod js_impl {
    use std::sync::atomic::{AtomicBool, Ordering};

    use js_sys::{Array, Function, Object, Reflect};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use web_sys::console;

    use crate::config::Config;
    use crate::gateway::Gateway;
    use crate::value::HostValue;

    /// Name of the function installed on the JS global object.
    pub const GLOBAL_NAME: &str = "run_starlark_code";

    static REGISTERED: AtomicBool = AtomicBool::new(false);

    // ── Value conversion ──────────────────────────────────────────────────

    /// Read a JS value into a [`HostValue`].
    ///
    /// Functions, symbols, bigints, `null` and `undefined` read as `Null`.
    /// Nesting deeper than `max_depth` also reads as `Null`, so objects that
    /// reference themselves terminate.
    pub fn from_js(value: &JsValue, max_depth: usize) -> HostValue {
        from_js_at(value, max_depth, 0)
    }

    fn from_js_at(value: &JsValue, max_depth: usize, depth: usize) -> HostValue {
        if depth > max_depth {
            return HostValue::Null;
        }
        if let Some(b) = value.as_bool() {
            return HostValue::Bool(b);
        }
        if let Some(n) = value.as_f64() {
            return HostValue::Number(n);
        }
        if let Some(s) = value.as_string() {
            return HostValue::String(s);
        }
        if Array::is_array(value) {
            let array: &Array = value.unchecked_ref();
            return HostValue::Array(
                array.iter().map(|item| from_js_at(&item, max_depth, depth + 1)).collect(),
            );
        }
        if value.is_object() && !value.is_function() {
            let object: &Object = value.unchecked_ref();
            let entries = Object::keys(object)
                .iter()
                .filter_map(|key| {
                    let name = key.as_string()?;
                    let item = Reflect::get(value, &key).unwrap_or(JsValue::UNDEFINED);
                    Some((name, from_js_at(&item, max_depth, depth + 1)))
                })
                .collect();
            return HostValue::Object(entries);
        }
        HostValue::Null
    }

    /// Build the JS value for a [`HostValue`].
    pub fn to_js(value: &HostValue) -> JsValue {
        match value {
            HostValue::Null => JsValue::NULL,
            HostValue::Bool(b) => JsValue::from_bool(*b),
            HostValue::Number(n) => JsValue::from_f64(*n),
            HostValue::String(s) => JsValue::from_str(s),
            HostValue::Array(items) => items.iter().map(to_js).collect::<Array>().into(),
            HostValue::Object(entries) => {
                let object = Object::new();
                for (k, v) in entries {
                    // Setting a property on a fresh plain object cannot throw.
                    let _ = Reflect::set(&object, &JsValue::from_str(k), &to_js(v));
                }
                object.into()
            }
        }
    }

    // ── Entry points ──────────────────────────────────────────────────────

    /// Run one invocation from an array of positional arguments and return
    /// `{error}` or `{message, returnValue}`.
    #[wasm_bindgen(js_name = runStarlark)]
    pub fn run_starlark(args: Array) -> JsValue {
        let gateway = Gateway::new(Config::default());
        let max_depth = gateway.config().bridge.max_depth;
        let args: Vec<HostValue> = args.iter().map(|a| from_js(&a, max_depth)).collect();
        to_js(&gateway.run(args).to_host())
    }

    /// Install `run_starlark_code` on the JS global object.
    ///
    /// Runs at most once; later calls return `Ok(())` without touching the
    /// global.  The variadic entry point is built with the JS `Function`
    /// constructor, which pages with a Content-Security-Policy lacking
    /// `unsafe-eval` refuse.  There the global falls back to a fixed-arity
    /// entry that takes the source, the function name and up to
    /// [`FIXED_ARITY_ARGS`] call arguments.
    pub fn register() -> Result<(), JsValue> {
        if REGISTERED.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let entry = variadic_entry().unwrap_or_else(|e| {
            console::warn_2(
                &JsValue::from_str("starjs: variadic entry unavailable, using fixed arity:"),
                &e,
            );
            fixed_arity_entry()
        });
        if let Err(e) = Reflect::set(&js_sys::global(), &JsValue::from_str(GLOBAL_NAME), &entry) {
            REGISTERED.store(false, Ordering::SeqCst);
            return Err(e);
        }

        console::log_1(&JsValue::from_str(&format!(
            "{GLOBAL_NAME} has been added to the javascript globals"
        )));
        Ok(())
    }

    /// `function () { return inner([...arguments]); }` around
    /// [`run_starlark`].
    fn variadic_entry() -> Result<JsValue, JsValue> {
        let constructor: Function =
            Reflect::get(&js_sys::global(), &JsValue::from_str("Function"))?.dyn_into()?;
        let shim: Function = Reflect::construct(
            &constructor,
            &Array::of2(
                &JsValue::from_str("inner"),
                &JsValue::from_str(
                    "return function () { return inner(Array.prototype.slice.call(arguments)); };",
                ),
            ),
        )?
        .dyn_into()?;

        let inner = Closure::wrap(Box::new(run_starlark) as Box<dyn Fn(Array) -> JsValue>);
        let entry = shim.call1(&JsValue::UNDEFINED, inner.as_ref())?;
        inner.forget();
        Ok(entry)
    }

    /// Call arguments accepted by the fixed-arity entry point.
    pub const FIXED_ARITY_ARGS: usize = 6;

    type FixedArity = dyn Fn(JsValue, JsValue, JsValue, JsValue, JsValue, JsValue, JsValue, JsValue) -> JsValue;

    /// Eight-parameter closure around [`run_starlark`].  Trailing
    /// `undefined`s are dropped, so `f(src)` and `f(src, "main", 1)` pass
    /// one and three arguments.
    pub(crate) fn fixed_arity_entry() -> JsValue {
        let call = |a: JsValue, b: JsValue, c: JsValue, d: JsValue, e: JsValue, f: JsValue, g: JsValue, h: JsValue| {
            let mut args = vec![a, b, c, d, e, f, g, h];
            while args.last().is_some_and(JsValue::is_undefined) {
                args.pop();
            }
            run_starlark(args.into_iter().collect())
        };
        let closure = Closure::wrap(Box::new(call) as Box<FixedArity>);
        let entry = closure.as_ref().clone();
        closure.forget();
        entry
    }

    #[wasm_bindgen(start)]
    pub fn start() -> Result<(), JsValue> {
        register()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
