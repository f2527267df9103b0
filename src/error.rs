use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SymbolError {
    #[error("invalid geometry: {message}")]
    InvalidGeometry { message: String },
    #[error("invalid scale '{input}': {reason}")]
    InvalidScaleInput { input: String, reason: String },
    #[error("invalid plant data: {message}")]
    InvalidPlantData { message: String },
    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
    #[error("preset config error: {message}")]
    PresetConfig { message: String },
}

impl SymbolError {
    pub(crate) fn geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            message: message.into(),
        }
    }

    pub(crate) fn scale(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidScaleInput {
            input: input.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn plant(message: impl Into<String>) -> Self {
        Self::InvalidPlantData {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SymbolError>;
