//! Chemistry container errors.

use pn_core::PnError;
use thiserror::Error;

/// Result type for chemistry operations.
pub type ChemResult<T> = Result<T, ChemError>;

/// Errors raised by mixtures, solutions and the species catalog.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChemError {
    /// Negative or non-finite quantity handed to a container.
    #[error("Invalid quantity for {what}: {value}")]
    InvalidQuantity { what: &'static str, value: f64 },

    /// Temperature must be finite and above absolute zero.
    #[error("Invalid temperature: {value} K")]
    InvalidTemperature { value: f64 },

    /// Catalog property outside its physical range.
    #[error("Invalid species property {what} for {species}")]
    InvalidProps {
        species: &'static str,
        what: &'static str,
    },

    #[error("Unknown species: {name}")]
    UnknownSpecies { name: String },

    #[error(transparent)]
    Core(#[from] PnError),
}

impl From<ChemError> for PnError {
    fn from(err: ChemError) -> Self {
        match err {
            ChemError::InvalidQuantity { what, value } => PnError::Negative { what, value },
            ChemError::InvalidTemperature { value } => PnError::NonFinite {
                what: "temperature",
                value,
            },
            ChemError::InvalidProps { what, .. } => PnError::InvalidArg { what },
            ChemError::UnknownSpecies { .. } => PnError::InvalidArg {
                what: "unknown species",
            },
            ChemError::Core(e) => e,
        }
    }
}

/// Validate a container quantity (moles, grams, liters).
pub(crate) fn check_quantity(value: f64, what: &'static str) -> ChemResult<f64> {
    if !value.is_finite() || value < 0.0 {
        return Err(ChemError::InvalidQuantity { what, value });
    }
    Ok(value)
}

/// Validate an absolute temperature.
pub(crate) fn check_temperature(value: f64) -> ChemResult<f64> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ChemError::InvalidTemperature { value });
    }
    Ok(value)
}
