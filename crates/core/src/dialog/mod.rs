pub mod engine;
pub mod screens;

pub use engine::{decode, level, Decision, MenuAction, StockAction, StockCommand};
pub use screens::{CONTINUE_PREFIX, END_PREFIX, SEGMENT_DELIMITER};
