//! Error types for descriptor invocation and instantiation.

use std::fmt;

use crate::config::ConfigError;

/// Failure raised by a descriptor closure (constructor, factory method or mutator body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    /// A required argument was absent
    MissingArgument {
        position: usize,
        expected: &'static str,
    },

    /// An argument was present but had a different type than the closure expected
    ArgumentMismatch {
        position: usize,
        expected: &'static str,
    },

    /// An instance method was called on a receiver of the wrong type
    ReceiverMismatch { expected: &'static str },

    /// The target code itself reported a failure
    Failed { message: String },
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvokeError::MissingArgument { position, expected } => {
                write!(
                    f,
                    "missing required argument {} (expected {})",
                    position, expected
                )
            }
            InvokeError::ArgumentMismatch { position, expected } => {
                write!(f, "argument {} is not a {}", position, expected)
            }
            InvokeError::ReceiverMismatch { expected } => {
                write!(f, "receiver is not a {}", expected)
            }
            InvokeError::Failed { message } => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for InvokeError {}

impl InvokeError {
    /// Create a target-side failure
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
        }
    }
}

/// Error returned by the populator.
///
/// Only [`PopulateError::EmptyEnum`] and [`PopulateError::BuilderFailed`] are construction
/// errors in the strict sense; the remaining variants are invocation failures that the engine
/// propagates instead of absorbing. Unconstructible members are not errors at all, they come back
/// as `Ok(None)`.
#[derive(Debug, Clone, PartialEq)]
pub enum PopulateError {
    /// An enumeration with no members was asked for a value
    EmptyEnum { type_name: &'static str },

    /// A static factory method could not be invoked
    BuilderFailed {
        type_name: &'static str,
        method: &'static str,
        recursion: u32,
        source: InvokeError,
    },

    /// A constructor could not be invoked
    ConstructorFailed {
        type_name: &'static str,
        source: InvokeError,
    },

    /// A mutator could not be invoked on a freshly built instance
    MutatorFailed {
        type_name: &'static str,
        method: &'static str,
        source: InvokeError,
    },

    /// A container could not be assembled from its generated entries
    ContainerFailed {
        type_name: &'static str,
        source: InvokeError,
    },

    /// A descriptor produced a value of a different type than requested
    TypeMismatch { expected: &'static str },

    /// The populator configuration is invalid
    Config(ConfigError),
}

impl fmt::Display for PopulateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PopulateError::EmptyEnum { type_name } => {
                write!(f, "Can't instantiate an enum with no values: {}", type_name)
            }
            PopulateError::BuilderFailed {
                type_name,
                method,
                recursion,
                source,
            } => {
                write!(
                    f,
                    "Builder method `{}` failed for {}: recursion value: {}",
                    method, type_name, recursion
                )?;
                if *recursion == 0 {
                    write!(f, " (exhausted, a required argument was probably absent)")?;
                }
                write!(f, ": {}", source)
            }
            PopulateError::ConstructorFailed { type_name, source } => {
                write!(f, "Constructor failed for {}: {}", type_name, source)
            }
            PopulateError::MutatorFailed {
                type_name,
                method,
                source,
            } => {
                write!(f, "Mutator `{}` failed for {}: {}", method, type_name, source)
            }
            PopulateError::ContainerFailed { type_name, source } => {
                write!(f, "Container {} could not be populated: {}", type_name, source)
            }
            PopulateError::TypeMismatch { expected } => {
                write!(f, "Descriptor produced a value that is not a {}", expected)
            }
            PopulateError::Config(err) => write!(f, "Configuration error: {}", err),
        }
    }
}

impl std::error::Error for PopulateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PopulateError::BuilderFailed { source, .. }
            | PopulateError::ConstructorFailed { source, .. }
            | PopulateError::MutatorFailed { source, .. }
            | PopulateError::ContainerFailed { source, .. } => Some(source),
            PopulateError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for PopulateError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Result alias used throughout the crate
pub type PopulateResult<T> = Result<T, PopulateError>;

impl PopulateError {
    /// Whether this is a construction error (empty enum or failed builder method)
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            PopulateError::EmptyEnum { .. } | PopulateError::BuilderFailed { .. }
        )
    }

    /// The recursion value recorded when a builder method failed
    pub fn recursion(&self) -> Option<u32> {
        match self {
            PopulateError::BuilderFailed { recursion, .. } => Some(*recursion),
            _ => None,
        }
    }

    /// Create an empty-enum construction error
    pub fn empty_enum(type_name: &'static str) -> Self {
        Self::EmptyEnum { type_name }
    }

    /// Create a builder construction error carrying the active recursion value
    pub fn builder_failed(
        type_name: &'static str,
        method: &'static str,
        recursion: u32,
        source: InvokeError,
    ) -> Self {
        Self::BuilderFailed {
            type_name,
            method,
            recursion,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoke_error_display() {
        let error = InvokeError::MissingArgument {
            position: 0,
            expected: "alloc::string::String",
        };
        assert_eq!(
            format!("{}", error),
            "missing required argument 0 (expected alloc::string::String)"
        );

        let error = InvokeError::failed("boom");
        assert_eq!(format!("{}", error), "boom");
    }

    #[test]
    fn test_builder_failure_mentions_recursion() {
        let error = PopulateError::builder_failed(
            "Node",
            "of",
            0,
            InvokeError::MissingArgument {
                position: 0,
                expected: "Node",
            },
        );
        let message = format!("{}", error);
        assert!(message.contains("recursion value: 0"));
        assert!(message.contains("exhausted"));
        assert!(error.is_construction_error());
        assert_eq!(error.recursion(), Some(0));
    }

    #[test]
    fn test_builder_failure_with_budget_left() {
        let error = PopulateError::builder_failed("Node", "of", 2, InvokeError::failed("nope"));
        let message = format!("{}", error);
        assert!(message.contains("recursion value: 2"));
        assert!(!message.contains("exhausted"));
    }

    #[test]
    fn test_construction_error_classification() {
        assert!(PopulateError::empty_enum("Empty").is_construction_error());
        assert!(
            !PopulateError::ConstructorFailed {
                type_name: "Cat",
                source: InvokeError::failed("x"),
            }
            .is_construction_error()
        );
        assert_eq!(
            format!("{}", PopulateError::empty_enum("Empty")),
            "Can't instantiate an enum with no values: Empty"
        );
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;

        let error = PopulateError::MutatorFailed {
            type_name: "Cat",
            method: "set_name",
            source: InvokeError::failed("inner"),
        };
        assert_eq!(error.source().map(|s| s.to_string()), Some("inner".into()));
        assert!(PopulateError::empty_enum("E").source().is_none());
    }
}
