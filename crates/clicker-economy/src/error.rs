//! Error types for the `clicker-economy` crate.
//!
//! Every fallible operation in this crate returns [`EconomyError`]. Failing
//! operations leave the entity they were called on unchanged. Running out of
//! money is not an error; purchases report that through
//! [`PurchaseResult`](clicker_types::PurchaseResult).

use clicker_types::{AutomatorId, CurrencyId, GeneratorId, ModifierId};

/// Errors raised by economy entities and the world that owns them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EconomyError {
    /// A construction config is unusable (e.g. it targets an entity that
    /// is not registered in the world).
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },

    /// A mutator received a value outside its accepted domain.
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument {
        /// The field being set.
        field: &'static str,
        /// Explanation of why the value was rejected.
        reason: String,
    },

    /// No currency with this id is registered in the world.
    #[error("currency not found: {0}")]
    CurrencyNotFound(CurrencyId),

    /// No generator with this id is registered in the world.
    #[error("generator not found: {0}")]
    GeneratorNotFound(GeneratorId),

    /// No automator with this id is registered in the world.
    #[error("automator not found: {0}")]
    AutomatorNotFound(AutomatorId),

    /// No modifier with this id is registered in the world.
    #[error("modifier not found: {0}")]
    ModifierNotFound(ModifierId),

    /// A checked counter would overflow.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Which counter overflowed.
        context: &'static str,
    },
}

impl EconomyError {
    /// Shorthand for an [`EconomyError::InvalidArgument`].
    pub fn invalid_argument(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field,
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`EconomyError::InvalidConfig`].
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type EconomyResult<T> = Result<T, EconomyError>;
