use thiserror::Error;

use crate::domain::material::MaterialId;

/// Outcome taxonomy for stock mutation. `Insufficient` and `NotFound` are
/// rejected commits with nothing written; `Storage` carries backing-store
/// detail destined for the operational log, never for the end user.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StockError {
    #[error("insufficient stock: {requested} requested, {available} available")]
    Insufficient { available: i64, requested: i64 },
    #[error("material {0} not found")]
    NotFound(MaterialId),
    #[error("storage failure: {0}")]
    Storage(String),
}
