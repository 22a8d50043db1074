use thiserror::Error;

/// Everything that can go wrong while handling a request.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CalculusError {
    /// A well-formed move whose preconditions do not hold.
    #[error("{0}")]
    IllegalMove(String),
    #[error("{0}")]
    UnificationImpossible(String),
    /// Normal form requested for a formula the transformation cannot handle.
    #[error("{0}")]
    FormulaConversion(String),
    #[error("{0}")]
    InvalidFormula(String),
    /// Malformed or tampered state, move or params.
    #[error("{0}")]
    JsonParse(String),
}

impl CalculusError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IllegalMove(_) => "IllegalMove",
            Self::UnificationImpossible(_) => "UnificationImpossible",
            Self::FormulaConversion(_) => "FormulaConversionException",
            Self::InvalidFormula(_) => "InvalidFormulaFormat",
            Self::JsonParse(_) => "JsonParseException",
        }
    }
}

pub type Result<T, E = CalculusError> = std::result::Result<T, E>;

macro_rules! illegal_move {
    ($($arg:tt)*) => {
        $crate::error::CalculusError::IllegalMove(format!($($arg)*))
    };
}
