//! Stateless dialog decoding.
//!
//! The carrier re-sends the full keystroke history on every round trip as
//! a `*`-joined string, so the whole navigation state is re-derived here
//! each call: the segment count is the level, the segment values are the
//! choices. `decode` is pure over `(raw_input, materials)` and performs no
//! I/O; mutating branches come back as a [`StockCommand`] instruction for
//! the transport layer to commit through the inventory store.

use serde::{Deserialize, Serialize};

use crate::dialog::screens;
use crate::domain::material::Material;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuAction {
    RecordReceived,
    CheckStock,
    RecordUsed,
}

impl MenuAction {
    fn parse(segment: &str) -> Option<Self> {
        match segment {
            "1" => Some(Self::RecordReceived),
            "2" => Some(Self::CheckStock),
            "3" => Some(Self::RecordUsed),
            _ => None,
        }
    }

    fn material_menu_title(self) -> &'static str {
        match self {
            Self::RecordReceived => "Select Material Received:",
            Self::CheckStock => "Select Material:",
            Self::RecordUsed => "Select Material Used:",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockAction {
    Received,
    Used,
}

impl StockAction {
    pub fn verb(self) -> &'static str {
        match self {
            Self::Received => "RECEIVED",
            Self::Used => "USED",
        }
    }

    /// Signs a positive quantity for the store's delta operation.
    pub fn signed_delta(self, quantity: i64) -> i64 {
        match self {
            Self::Received => quantity,
            Self::Used => -quantity,
        }
    }
}

/// Side-effect instruction attached to a terminal, mutating branch. The
/// engine never checks stock sufficiency itself; that decision belongs to
/// the store's atomic commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockCommand {
    pub material: Material,
    pub action: StockAction,
    pub quantity: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Non-terminal screen; the caller must supply one more segment.
    Prompt(String),
    /// Terminal screen with no side effect.
    Terminal(String),
    /// Terminal branch pending an atomic stock delta; the final screen
    /// text depends on the commit outcome.
    Commit(StockCommand),
}

/// Number of delimiter-separated segments. An empty raw input is level 0;
/// a single empty segment is not a choice.
pub fn level(raw_input: &str) -> usize {
    if raw_input.is_empty() {
        0
    } else {
        raw_input.split(screens::SEGMENT_DELIMITER).count()
    }
}

pub fn decode(raw_input: &str, materials: &[Material]) -> Decision {
    let segments: Vec<&str> = if raw_input.is_empty() {
        Vec::new()
    } else {
        raw_input.split(screens::SEGMENT_DELIMITER).collect()
    };

    match segments.as_slice() {
        [] => Decision::Prompt(screens::ROOT_MENU.to_string()),
        [action] => decode_action(action, materials),
        [action, index] => decode_material(action, index, materials),
        [action, index, quantity] => decode_quantity(action, index, quantity, materials),
        _ => Decision::Terminal(screens::TOO_MANY_STEPS.to_string()),
    }
}

fn decode_action(segment: &str, materials: &[Material]) -> Decision {
    let Some(action) = MenuAction::parse(segment) else {
        return Decision::Terminal(screens::INVALID_CHOICE.to_string());
    };
    if materials.is_empty() {
        return Decision::Terminal(screens::NO_MATERIALS.to_string());
    }
    Decision::Prompt(screens::material_menu(action.material_menu_title(), materials))
}

fn decode_material(action_segment: &str, index_segment: &str, materials: &[Material]) -> Decision {
    let Some(action) = MenuAction::parse(action_segment) else {
        return Decision::Terminal(screens::INVALID_CHOICE.to_string());
    };
    let Some(material) = select_material(index_segment, materials) else {
        return Decision::Terminal(screens::INVALID_MATERIAL.to_string());
    };

    match action {
        MenuAction::CheckStock => Decision::Terminal(screens::stock_level(material)),
        MenuAction::RecordReceived => {
            Decision::Prompt(screens::quantity_prompt(material, StockAction::Received))
        }
        MenuAction::RecordUsed => {
            Decision::Prompt(screens::quantity_prompt(material, StockAction::Used))
        }
    }
}

fn decode_quantity(
    action_segment: &str,
    index_segment: &str,
    quantity_segment: &str,
    materials: &[Material],
) -> Decision {
    let action = match MenuAction::parse(action_segment) {
        Some(MenuAction::RecordReceived) => StockAction::Received,
        Some(MenuAction::RecordUsed) => StockAction::Used,
        // Check-stock ends at level 2; a third segment is a protocol slip.
        Some(MenuAction::CheckStock) => {
            return Decision::Terminal(screens::INVALID_SEQUENCE.to_string());
        }
        None => return Decision::Terminal(screens::INVALID_CHOICE.to_string()),
    };
    let Some(material) = select_material(index_segment, materials) else {
        return Decision::Terminal(screens::INVALID_MATERIAL.to_string());
    };
    let Some(quantity) = parse_quantity(quantity_segment) else {
        return Decision::Terminal(screens::INVALID_QUANTITY.to_string());
    };

    Decision::Commit(StockCommand { material: material.clone(), action, quantity })
}

/// Resolves a 1-based menu index against the snapshot the menu was built
/// from. Non-numeric and out-of-range selections both fail.
fn select_material<'a>(segment: &str, materials: &'a [Material]) -> Option<&'a Material> {
    let position: usize = segment.parse().ok()?;
    position.checked_sub(1).and_then(|index| materials.get(index))
}

fn parse_quantity(segment: &str) -> Option<i64> {
    segment.parse::<i64>().ok().filter(|quantity| *quantity > 0)
}
