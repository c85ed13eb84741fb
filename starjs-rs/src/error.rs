//! Failure taxonomy for one gateway invocation.
//!
//! Every variant is turned into an `{error}` envelope at the gateway
//! boundary; none of them reach the host as an exception.

use thiserror::Error;

use crate::gateway::Stage;

/// Why an invocation did not produce a return value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// The required source-text argument is missing.
    #[error("expected at least one argument with the source code, got {got}")]
    Arity { got: usize },

    /// The source failed to parse or its top-level statements failed.
    #[error("failed to evaluate the starlark code: {0}")]
    Load(String),

    /// The requested name is not bound in the module globals.
    #[error("the function {0:?} is missing from the starlark code")]
    NameResolution(String),

    /// The call itself raised a runtime error.
    #[error("failed to execute the starlark code: {0}")]
    Call(String),
}

impl GatewayError {
    /// The stage the invocation was in when it failed.
    pub fn stage(&self) -> Stage {
        match self {
            GatewayError::Arity { .. } => Stage::Validating,
            GatewayError::Load(_) => Stage::Loading,
            GatewayError::NameResolution(_) => Stage::Resolving,
            GatewayError::Call(_) => Stage::Calling,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_resolution_message_quotes_the_name() {
        let e = GatewayError::NameResolution("bar".into());
        assert_eq!(e.to_string(), "the function \"bar\" is missing from the starlark code");
    }

    #[test]
    fn arity_message_is_descriptive() {
        let msg = GatewayError::Arity { got: 0 }.to_string();
        assert!(msg.contains("source code"), "{msg}");
    }

    #[test]
    fn stages() {
        assert_eq!(GatewayError::Arity { got: 0 }.stage(), Stage::Validating);
        assert_eq!(GatewayError::Load(String::new()).stage(), Stage::Loading);
        assert_eq!(GatewayError::NameResolution(String::new()).stage(), Stage::Resolving);
        assert_eq!(GatewayError::Call(String::new()).stage(), Stage::Calling);
    }
}
