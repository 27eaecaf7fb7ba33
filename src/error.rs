//! Error types for beamer-passes.
//!
//! Structural and resource errors abort the slide being composited; best-effort
//! parse failures (overlay tokens, merge counts) never reach this type.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while compositing a document.
#[derive(Debug, Error)]
pub enum CompositeError {
    /// Malformed table or multicolumn specification
    #[error("invalid table column definition: {0}")]
    Structural(String),

    /// Image not found on any search path
    #[error("image \"{name}\" not found ({} search path(s))", .searched.len())]
    ImageNotFound {
        /// Image name as written in the document
        name: String,
        /// Directories that were searched
        searched: Vec<PathBuf>,
    },

    /// Required structural node missing from the document tree
    #[error("document has no {0} node")]
    MissingNode(&'static str),

    /// The document contains no slides
    #[error("empty presentation - output omitted")]
    EmptyPresentation,

    /// Pass discovery did not converge
    #[error("slide {slide} exceeded the limit of {limit} passes")]
    PassLimit {
        /// 1-based slide index
        slide: usize,
        /// Configured maximum
        limit: usize,
    },

    /// Error raised while compositing a particular slide
    #[error("slide {index}: {source}")]
    Slide {
        /// 1-based slide index
        index: usize,
        /// Underlying error
        #[source]
        source: Box<CompositeError>,
    },

    /// Error reported by the shape sink
    #[error("shape sink error: {0}")]
    Sink(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type alias for compositing operations.
pub type CompositeResult<T> = Result<T, CompositeError>;

impl CompositeError {
    /// Create a structural error with a message.
    pub fn structural(msg: impl Into<String>) -> Self {
        Self::Structural(msg.into())
    }

    /// Attach slide context, keeping an existing context untouched.
    pub fn in_slide(self, index: usize) -> Self {
        match self {
            err @ Self::Slide { .. } => err,
            err @ Self::PassLimit { .. } => err,
            err => Self::Slide {
                index,
                source: Box::new(err),
            },
        }
    }

    /// Wrap a sink error.
    pub fn sink(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Sink(Box::new(err))
    }

    /// Unwrap slide context, if any.
    pub fn root_cause(&self) -> &CompositeError {
        match self {
            Self::Slide { source, .. } => source.root_cause(),
            err => err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CompositeError::structural("missing repeat count");
        assert_eq!(
            err.to_string(),
            "invalid table column definition: missing repeat count"
        );

        let err = CompositeError::ImageNotFound {
            name: "logo".to_string(),
            searched: vec![PathBuf::from("."), PathBuf::from("img")],
        };
        assert_eq!(err.to_string(), "image \"logo\" not found (2 search path(s))");
    }

    #[test]
    fn test_slide_context() {
        let err = CompositeError::structural("bad").in_slide(3);
        assert_eq!(err.to_string(), "slide 3: invalid table column definition: bad");
        assert!(matches!(err.root_cause(), CompositeError::Structural(_)));

        // context is attached once
        let err = err.in_slide(4);
        assert!(matches!(err, CompositeError::Slide { index: 3, .. }));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompositeError>();
    }
}
