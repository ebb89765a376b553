use std::fmt;

/// Result type for network operations
pub type Result<T> = std::result::Result<T, NetError>;

/// Main error type for the network engine
#[derive(Debug, Clone, PartialEq)]
pub enum NetError {
    /// Topology list is too short or contains an empty layer
    InvalidTopology {
        reason: String,
    },

    /// No compatible compute device could be opened
    BackendUnavailable(String),

    /// Kernel source failed to build; carries the compiler log
    KernelCompileError(String),

    /// Feature vector length differs from the input layer size
    InputSizeMismatch {
        expected: usize,
        actual: usize,
    },

    /// A kernel dispatch did not complete
    DispatchFailure {
        kernel: &'static str,
        layer: usize,
        reason: String,
    },

    /// Target label outside the output layer
    InvalidLabel {
        label: usize,
        classes: usize,
    },

    /// Backward pass or loss requested without forward state to consume
    MissingForwardPass,

    /// Invalid parameter value
    InvalidParameter {
        name: String,
        reason: String,
    },

    /// IO errors (file operations)
    Io(String),

    /// Configuration could not be parsed
    Config(String),

    /// Malformed sample data
    InvalidData(String),
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::InvalidTopology { reason } => write!(f, "Invalid topology: {}", reason),
            NetError::BackendUnavailable(msg) => write!(f, "Compute backend unavailable: {}", msg),
            NetError::KernelCompileError(log) => write!(f, "Kernel compilation failed:\n{}", log),
            NetError::InputSizeMismatch { expected, actual } => {
                write!(f, "Input size mismatch: expected {} features, got {}", expected, actual)
            }
            NetError::DispatchFailure { kernel, layer, reason } => {
                write!(f, "Dispatch of '{}' for layer {} failed: {}", kernel, layer, reason)
            }
            NetError::InvalidLabel { label, classes } => {
                write!(f, "Invalid label {}: must be less than {}", label, classes)
            }
            NetError::MissingForwardPass => {
                write!(f, "No forward pass state available; call forward() first")
            }
            NetError::InvalidParameter { name, reason } => {
                write!(f, "Invalid parameter '{}': {}", name, reason)
            }
            NetError::Io(msg) => write!(f, "IO error: {}", msg),
            NetError::Config(msg) => write!(f, "Configuration error: {}", msg),
            NetError::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
        }
    }
}

impl std::error::Error for NetError {}

impl From<std::io::Error> for NetError {
    fn from(err: std::io::Error) -> Self {
        NetError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for NetError {
    fn from(err: serde_json::Error) -> Self {
        NetError::Config(err.to_string())
    }
}

// Helper functions for common error patterns
impl NetError {
    pub fn invalid_topology<S: Into<String>>(reason: S) -> Self {
        NetError::InvalidTopology {
            reason: reason.into(),
        }
    }

    pub fn invalid_parameter<S: Into<String>>(name: S, reason: S) -> Self {
        NetError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn dispatch_failure<S: Into<String>>(kernel: &'static str, layer: usize, reason: S) -> Self {
        NetError::DispatchFailure {
            kernel,
            layer,
            reason: reason.into(),
        }
    }

    /// Errors the caller can recover from by retrying with different input
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            NetError::InputSizeMismatch { .. } | NetError::InvalidLabel { .. } | NetError::MissingForwardPass
        )
    }
}
