//! Error types for the core vocabulary.

/// A kind or sub-kind name that is not recognized.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum KindError {
    /// The name does not match any [`Kind`](crate::Kind).
    #[error("unknown entity kind '{0}'")]
    UnknownKind(String),
    /// The name does not match any [`SubKind`](crate::SubKind).
    #[error("unknown sub-kind '{0}'")]
    UnknownSubKind(String),
}
