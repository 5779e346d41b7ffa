pub mod config;
pub mod dialog;
pub mod domain;
pub mod errors;

pub use dialog::{decode, level, Decision, StockAction, StockCommand};
pub use domain::material::{Material, MaterialId};
pub use domain::stakeholder::{Address, Stakeholder, StakeholderId};
pub use errors::StockError;
