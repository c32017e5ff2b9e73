//! Error types for contract verification operations

use thiserror::Error;

/// Errors that can occur while building models, resolving factories, or
/// verifying equality contracts
#[derive(Debug, Error)]
pub enum VerifyError {
    /// Invalid caller-supplied specification, detected at model-build time
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// No value factory is registered for the requested type
    #[error("No factory found for type {type_name}")]
    NoFactoryFound {
        /// Name of the type that has no registered factory
        type_name: &'static str,
    },

    /// The full factory fallback chain failed to produce a generator
    #[error(
        "Failed to find suitable factory for property '{property}' of type {requested} \
         on {owner}. Please register a custom factory."
    )]
    Resolution {
        /// Type that owns the property being resolved
        owner: &'static str,
        /// Name of the property being resolved
        property: String,
        /// Type the factory was requested for
        requested: &'static str,
        /// The synthesis-time failure that exhausted the chain
        #[source]
        source: Option<Box<VerifyError>>,
    },

    /// A factory or creator failed while producing a value
    #[error("Value creation failed: {0}")]
    Creation(String),

    /// A dynamic value did not hold the expected concrete type
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Name of the type that was expected
        expected: &'static str,
        /// Name of the type that was found
        actual: &'static str,
    },

    /// A property name did not resolve against the bean model
    #[error("Unknown property '{property}' on {owner}")]
    UnknownProperty {
        /// Type the lookup ran against
        owner: &'static str,
        /// The name that failed to resolve
        property: String,
    },

    /// An equality or hash-code expectation was violated during verification
    #[error("{owner}: {expectation} (property '{property}')")]
    ContractViolation {
        /// Type under test
        owner: &'static str,
        /// Property whose manipulation exposed the violation
        property: String,
        /// Which expectation diverged
        expectation: String,
    },
}

/// Result type for contract verification operations
pub type VerifyResult<T> = Result<T, VerifyError>;

impl VerifyError {
    /// Shorthand for a configuration error with a formatted message
    pub fn configuration(message: impl Into<String>) -> Self {
        VerifyError::Configuration(message.into())
    }

    /// Shorthand for a creation error with a formatted message
    pub fn creation(message: impl Into<String>) -> Self {
        VerifyError::Creation(message.into())
    }
}
