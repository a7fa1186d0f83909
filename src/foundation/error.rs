/// Convenience result type used across the engine.
pub type LpeResult<T> = Result<T, LpeError>;

/// Error taxonomy shared by parameters, effects, stacks and host documents.
#[derive(thiserror::Error, Debug)]
pub enum LpeError {
    /// A parameter value or attribute text that cannot be used.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Input geometry below an effect's minimum (too few nodes, zero length, no area).
    #[error("degenerate input: {0}")]
    Degenerate(String),

    /// An effect kind key with no registry entry.
    #[error("unknown effect kind: {0}")]
    UnknownKind(String),

    /// An effect whose attachment or required input is no longer valid.
    #[error("broken effect: {0}")]
    Broken(String),

    /// Errors when serializing or deserializing host documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LpeError {
    /// Build a [`LpeError::InvalidParameter`] value.
    pub fn invalid_parameter(msg: impl Into<String>) -> Self {
        Self::InvalidParameter(msg.into())
    }

    /// Build a [`LpeError::Degenerate`] value.
    pub fn degenerate(msg: impl Into<String>) -> Self {
        Self::Degenerate(msg.into())
    }

    /// Build a [`LpeError::UnknownKind`] value.
    pub fn unknown_kind(msg: impl Into<String>) -> Self {
        Self::UnknownKind(msg.into())
    }

    /// Build a [`LpeError::Broken`] value.
    pub fn broken(msg: impl Into<String>) -> Self {
        Self::Broken(msg.into())
    }

    /// Build a [`LpeError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Degenerate input is recoverable: the stage falls back to identity.
    pub fn is_degenerate(&self) -> bool {
        matches!(self, Self::Degenerate(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
