//! Invocation gateway: one `(source, function, args)` request in, one
//! [`Outcome`] out.
//!
//! Each invocation walks
//! `Idle → Validating → Loading → Resolving → Calling → Succeeded | Failed`
//! with a fresh Starlark [`Module`], [`Evaluator`] and [`OutputSink`].  No
//! interpreter state survives between calls, so a [`Gateway`] can be shared
//! freely across threads.

use std::fmt;

use serde::Serialize;
use starlark::environment::{Globals, LibraryExtension, Module};
use starlark::eval::Evaluator;
use starlark::syntax::AstModule;

use crate::bridge::Bridge;
use crate::config::Config;
use crate::error::GatewayError;
use crate::sink::OutputSink;
use crate::value::HostValue;

/// File name reported in Starlark diagnostics.
const SOURCE_NAME: &str = "main.star";

// ── Stage ─────────────────────────────────────────────────────────────────────

/// Where an invocation is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Validating,
    Loading,
    Resolving,
    Calling,
    Succeeded,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "idle",
            Stage::Validating => "validating",
            Stage::Loading => "loading",
            Stage::Resolving => "resolving",
            Stage::Calling => "calling",
            Stage::Succeeded => "succeeded",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

// ── Request / Outcome ─────────────────────────────────────────────────────────

/// A validated invocation request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub source: String,
    pub function: String,
    pub args: Vec<HostValue>,
}

impl Request {
    pub fn new(source: impl Into<String>, function: impl Into<String>, args: Vec<HostValue>) -> Self {
        Self { source: source.into(), function: function.into(), args }
    }

    /// Build a request from the host's positional arguments:
    /// `source, [function], args…`.
    ///
    /// A missing or null function name selects `default_function`.
    /// Non-string source and function values are coerced like JS `String(x)`.
    pub fn from_host_args(args: Vec<HostValue>, default_function: &str) -> Result<Self, GatewayError> {
        let mut args = args.into_iter();
        let Some(source) = args.next() else {
            return Err(GatewayError::Arity { got: 0 });
        };
        let function = match args.next() {
            None | Some(HostValue::Null) => default_function.to_owned(),
            Some(f) => coerce_string(f),
        };
        Ok(Self { source: coerce_string(source), function, args: args.collect() })
    }
}

fn coerce_string(value: HostValue) -> String {
    match value {
        HostValue::String(s) => s,
        other => other.to_host_string(),
    }
}

/// Result of a successful call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Success {
    /// Everything the script printed, one `\n`-terminated line per `print`.
    pub message: String,
    #[serde(rename = "returnValue")]
    pub return_value: HostValue,
}

/// The envelope handed back to the host: exactly one of `{error}` or
/// `{message, returnValue}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Outcome {
    Success(Success),
    Failure { error: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// The envelope as a host object.
    pub fn to_host(&self) -> HostValue {
        match self {
            Outcome::Success(s) => HostValue::object([
                ("message", HostValue::String(s.message.clone())),
                ("returnValue", s.return_value.clone()),
            ]),
            Outcome::Failure { error } => HostValue::object([("error", HostValue::String(error.clone()))]),
        }
    }
}

impl From<Result<Success, GatewayError>> for Outcome {
    fn from(result: Result<Success, GatewayError>) -> Self {
        match result {
            Ok(s) => Outcome::Success(s),
            Err(e) => Outcome::Failure { error: e.to_string() },
        }
    }
}

// ── Gateway ───────────────────────────────────────────────────────────────────

/// The single entry point the host calls.
#[derive(Debug, Clone, Default)]
pub struct Gateway {
    config: Config,
    bridge: Bridge,
}

impl Gateway {
    pub fn new(config: Config) -> Self {
        let bridge = Bridge::new(config.bridge);
        Self { config, bridge }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    /// Run one call from the host's positional arguments.  Never fails:
    /// every error becomes [`Outcome::Failure`].
    pub fn run(&self, args: Vec<HostValue>) -> Outcome {
        log::trace!("{}", Stage::Validating);
        let result = Request::from_host_args(args, &self.config.interpreter.default_function)
            .and_then(|request| self.invoke(&request));
        if let Err(e) = &result {
            log::debug!("invocation {} during {}: {e}", Stage::Failed, e.stage());
        }
        result.into()
    }

    /// Execute a validated request.
    pub fn invoke(&self, request: &Request) -> Result<Success, GatewayError> {
        log::debug!(
            "invoking {:?} with {} argument(s), {} bytes of source",
            request.function,
            request.args.len(),
            request.source.len()
        );

        let module = Module::new();
        let sink = OutputSink::new();
        let globals = script_globals();
        let heap = module.heap();

        let args: Vec<_> = request.args.iter().map(|a| self.bridge.to_starlark(a, heap)).collect();

        let mut eval = Evaluator::new(&module);
        eval.set_print_handler(&sink);

        log::trace!("{}", Stage::Loading);
        let dialect = self.config.interpreter.dialect.dialect();
        let ast = AstModule::parse(SOURCE_NAME, request.source.clone(), &dialect)
            .map_err(|e| GatewayError::Load(e.to_string()))?;
        eval.eval_module(ast, &globals).map_err(|e| GatewayError::Load(e.to_string()))?;

        log::trace!("{}", Stage::Resolving);
        let function = module
            .get(&request.function)
            .ok_or_else(|| GatewayError::NameResolution(request.function.clone()))?;

        log::trace!("{}", Stage::Calling);
        let result = eval
            .eval_function(function, &args, &[])
            .map_err(|e| GatewayError::Call(e.to_string()))?;
        let return_value = self.bridge.to_host(result);

        log::trace!("{}", Stage::Succeeded);
        Ok(Success { message: sink.take(), return_value })
    }
}

/// Builtins visible to scripts: the standard set plus `print`, which
/// `starlark` ships as an extension rather than a standard builtin.
pub fn script_globals() -> Globals {
    Globals::extended_by(&[LibraryExtension::Print])
}

// ── Tests ─────────────────────────────────────────────────────────────────────
