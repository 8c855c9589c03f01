//! Launcher error types with rich context

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Launcher error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Shape Resource Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Shape data truncated in {block} at byte {offset}")]
    ShapeTruncated { block: String, offset: usize },

    #[error("Invalid shape command {opcode:#06x} in {block} at byte {offset}")]
    ShapeInvalidOpcode {
        block: String,
        opcode: u16,
        offset: usize,
    },

    #[error("Invalid shape block length {length} for {block}")]
    ShapeInvalidLength { block: String, length: i64 },

    #[error("Invalid shape aspect ratio: {0}")]
    ShapeAspectRatio(f32),

    #[error("Opacity must be between 0 and 1, got {0}")]
    InvalidOpacity(f32),

    #[error("Invalid color '{value}': {reason}")]
    InvalidColor { value: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // Host Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Host error: {message}")]
    Host { message: String },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Not supported on this platform: {capability}")]
    Unsupported { capability: String },

    #[error("Icon unavailable for {component}")]
    IconUnavailable { component: String },

    #[error("Enumeration cycle {generation} failed: {message}")]
    Enumeration { generation: u64, message: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration / Preference Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Preferences error: {message}")]
    Preferences { message: String },

    // ─────────────────────────────────────────────────────────────
    // Channel/Communication Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Channel closed unexpectedly")]
    ChannelClosed,

    #[error("Enumeration cycle {generation} was superseded")]
    Superseded { generation: u64 },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn shape_truncated(block: impl Into<String>, offset: usize) -> Self {
        Self::ShapeTruncated {
            block: block.into(),
            offset,
        }
    }

    pub fn host(message: impl Into<String>) -> Self {
        Self::Host {
            message: message.into(),
        }
    }

    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: message.into(),
        }
    }

    pub fn unsupported(capability: impl Into<String>) -> Self {
        Self::Unsupported {
            capability: capability.into(),
        }
    }

    pub fn icon_unavailable(component: impl Into<String>) -> Self {
        Self::IconUnavailable {
            component: component.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn preferences(message: impl Into<String>) -> Self {
        Self::Preferences {
            message: message.into(),
        }
    }

    pub fn enumeration(generation: u64, message: impl Into<String>) -> Self {
        Self::Enumeration {
            generation,
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::PermissionDenied { .. }
                | Error::Unsupported { .. }
                | Error::IconUnavailable { .. }
                | Error::Host { .. }
                | Error::Enumeration { .. }
                | Error::Superseded { .. }
        )
    }

    /// Check if this error should abort the operation that produced it
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::ShapeTruncated { .. }
                | Error::ShapeInvalidOpcode { .. }
                | Error::ShapeInvalidLength { .. }
                | Error::ShapeAspectRatio(_)
        )
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}
