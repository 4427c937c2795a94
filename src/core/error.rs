//! Framework error taxonomy
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.2.0
//!
//! ## Changelog
//! - 1.1.0: Split argument access errors out of resolution errors
//! - 1.0.0: Initial configuration and resolution errors

use thiserror::Error;

use crate::commands::argument::ArgumentType;

/// Load-time configuration errors.
///
/// These abort the load step that raised them. Handler factories return them
/// (wrapped in `anyhow::Error`) when their declared metadata is malformed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("registry is frozen, cannot register {0}")]
    RegistryFrozen(String),

    #[error("registry has already been loaded")]
    AlreadyLoaded,

    #[error("invalid argument \"{name}\": {reason}")]
    InvalidArgument { name: String, reason: String },

    #[error("invalid argument list: {0}")]
    InvalidArgumentList(String),

    #[error("invalid subcommand \"{key}\": {reason}")]
    InvalidSubcommand { key: String, reason: String },

    #[error("application command data for {0} has no name")]
    MissingSchemaName(String),

    #[error("prefix command {0} declares no triggers")]
    MissingTriggers(String),

    #[error("component prefix \"{0}\" is already registered")]
    DuplicateComponentPrefix(String),
}

/// User-visible failures while matching tokens against declared arguments.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("missing required {kind} argument \"{name}\"")]
    MissingRequired { name: String, kind: ArgumentType },

    #[error("invalid value for {kind} argument \"{name}\": {reason}")]
    InvalidValue {
        name: String,
        kind: ArgumentType,
        reason: String,
    },

    #[error("expected at most {expected} values but received {received}")]
    TooManyValues { expected: usize, received: usize },

    #[error("unexpected value \"{0}\"")]
    UnexpectedValue(String),
}

/// Misuse of the parsed-argument accessors by handler code.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AccessError {
    #[error("argument \"{0}\" is not declared for this command")]
    Undeclared(String),

    #[error("argument \"{name}\" is a {actual} argument, not {expected}")]
    TypeMismatch {
        name: String,
        expected: String,
        actual: ArgumentType,
    },

    #[error("argument \"{name}\" {}", shape_label(.tuple))]
    ShapeMismatch { name: String, tuple: bool },

    #[error("missing required {kind} argument \"{name}\"")]
    MissingArgument { name: String, kind: ArgumentType },
}

fn shape_label(tuple: &bool) -> &'static str {
    if *tuple {
        "is a tuple"
    } else {
        "is not a tuple"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_error_messages() {
        let err = ResolutionError::MissingRequired {
            name: "tag".to_string(),
            kind: ArgumentType::String,
        };
        assert_eq!(err.to_string(), "missing required string argument \"tag\"");

        let err = ResolutionError::TooManyValues {
            expected: 1,
            received: 3,
        };
        assert_eq!(err.to_string(), "expected at most 1 values but received 3");
    }

    #[test]
    fn test_shape_mismatch_message() {
        let err = AccessError::ShapeMismatch {
            name: "content".to_string(),
            tuple: true,
        };
        assert_eq!(err.to_string(), "argument \"content\" is a tuple");

        let err = AccessError::ShapeMismatch {
            name: "tag".to_string(),
            tuple: false,
        };
        assert_eq!(err.to_string(), "argument \"tag\" is not a tuple");
    }

    #[test]
    fn test_config_error_survives_anyhow() {
        let err: anyhow::Error = ConfigError::AlreadyLoaded.into();
        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::AlreadyLoaded)
        );
    }
}
