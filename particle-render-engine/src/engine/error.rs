use thiserror::Error;

/// Failures surfaced by the particle pipeline.
///
/// Load and malformed-asset failures are recoverable: they are reported and
/// leave the active particle system untouched. Shader failures abort the
/// particle system they were raised for.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParticleError {
    #[error("failed to load '{path}': {reason}")]
    LoadFailure { path: String, reason: String },

    #[error("malformed asset '{path}': {reason}")]
    MalformedAsset { path: String, reason: String },

    #[error("shader '{shader}' failed to compile: {message}")]
    ShaderCompileFailure { shader: String, message: String },
}

impl ParticleError {
    pub fn load(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::LoadFailure {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(path: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedAsset {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn shader(shader: impl Into<String>, message: impl ToString) -> Self {
        Self::ShaderCompileFailure {
            shader: shader.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error tears down the particle system it belongs to.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::ShaderCompileFailure { .. })
    }
}

/// Configuration file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}
