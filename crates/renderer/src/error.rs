//! Render error taxonomy.
//!
//! Initialization-time errors are unrecoverable and surface to the host as
//! a failed `initialize`. Per-tick errors are contained to the current
//! frame where possible: an object with a bad attribute table is disabled
//! and the loop continues; a fatal backend error halts the loop.

use corelib::MatrixError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// The drawable surface cannot produce a rendering context.
    #[error("rendering backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Shader source was rejected; the backend diagnostic is preserved.
    #[error("shader compilation failed:\n{log}")]
    ShaderCompileFailed { log: String },

    /// Pipeline creation / program link failed; diagnostic preserved.
    #[error("shader program link failed:\n{log}")]
    ProgramLinkFailed { log: String },

    /// A vertex attribute table is missing or does not match the shader
    /// inputs. The offending object is skipped, not the whole engine.
    #[error("vertex attribute '{name}' missing or mismatched")]
    InvalidAttribute { name: &'static str },

    /// Fatal surface-level failure (lost device, out of memory).
    #[error("surface error: {0}")]
    Surface(String),

    #[error(transparent)]
    Matrix(#[from] MatrixError),
}

pub type RenderResult<T> = Result<T, RenderError>;
