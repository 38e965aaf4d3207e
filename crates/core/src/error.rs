/// Result alias that carries the custom [`BeamVizError`] type.
pub type Result<T> = std::result::Result<T, BeamVizError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum BeamVizError {
    /// Shape parameters that cannot describe a drawable primitive, such as a
    /// negative radius or a non-finite coordinate.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    /// A node was used as a reference before it was given a position, or a
    /// name/id does not exist in the layout.
    #[error("unresolved reference `{0}`")]
    UnresolvedReference(String),
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
}

impl BeamVizError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub fn invalid<T: Into<String>>(reason: T) -> Self {
        Self::InvalidGeometry(reason.into())
    }

    pub fn unresolved<T: Into<String>>(name: T) -> Self {
        Self::UnresolvedReference(name.into())
    }
}

impl From<&str> for BeamVizError {
    fn from(value: &str) -> Self {
        Self::msg(value)
    }
}

impl From<String> for BeamVizError {
    fn from(value: String) -> Self {
        Self::Message(value)
    }
}
