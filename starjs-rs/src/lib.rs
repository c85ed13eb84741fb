//! Starlark for JavaScript hosts.
//!
//! `starjs` runs a Starlark module and calls one function in it on behalf of
//! a host environment, converting values across the boundary in both
//! directions.  The interpreter itself is the `starlark` crate; this crate
//! only marshals values and drives one invocation per call.
//!
//! Two hosts are provided:
//!
//! - JavaScript, through `wasm-bindgen` (`js` feature, see [`js`]), which
//!   installs `run_starlark_code(source, functionName?, ...args)` on the
//!   global object.
//! - A JSON command-line host (`cli` feature, on by default): `starjs run`
//!   for a single call and `starjs serve` for a resident request loop.
//!
//! # Quick start
//!
//! ```rust
//! use starjs::{Gateway, HostValue, Outcome};
//!
//! let src = "def main(x, y):\n    print('adding')\n    return x + y\n";
//! let outcome = Gateway::default().run(vec![
//!     HostValue::String(src.into()),
//!     HostValue::String("main".into()),
//!     HostValue::Number(2.0),
//!     HostValue::Number(3.0),
//! ]);
//! match outcome {
//!     Outcome::Success(ok) => {
//!         assert_eq!(ok.message, "adding\n");
//!         assert_eq!(ok.return_value, HostValue::Number(5.0));
//!     }
//!     Outcome::Failure { error } => panic!("{error}"),
//! }
//! ```

pub mod bridge;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod js;
#[cfg(feature = "cli")]
pub mod serve;
pub mod sink;
pub mod value;

// Re-exports for convenience.
pub use bridge::Bridge;
pub use config::Config;
pub use error::GatewayError;
pub use gateway::{Gateway, Outcome, Request, Stage, Success};
pub use value::HostValue;
