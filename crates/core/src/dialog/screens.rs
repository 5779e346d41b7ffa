//! Fixed screen texts and wire framing for the USSD dialog.
//!
//! The carrier gateway recognizes exactly two reply prefixes: `CON ` keeps
//! the session open for one more segment, `END ` terminates it. The pure
//! engine emits bare text; the transport layer prepends the marker.

use crate::dialog::engine::{StockAction, StockCommand};
use crate::domain::material::Material;

pub const CONTINUE_PREFIX: &str = "CON ";
pub const END_PREFIX: &str = "END ";
pub const SEGMENT_DELIMITER: char = '*';

pub const ROOT_MENU: &str = "Welcome to SiteStock\n1. Record Material Received\n2. Check Stock Level\n3. Record Material Used";

pub const INVALID_CHOICE: &str = "Invalid choice. Please try again.";
pub const INVALID_MATERIAL: &str = "Invalid material selection.";
pub const INVALID_QUANTITY: &str = "Invalid quantity. Please enter a positive number.";
pub const INVALID_SEQUENCE: &str = "Invalid action sequence.";
pub const NO_MATERIALS: &str = "No materials found.";
pub const TOO_MANY_STEPS: &str = "Too many steps. Please dial again to restart.";
pub const INTERNAL_ERROR: &str = "An internal error occurred. Please try again later.";
pub const UPDATE_FAILED: &str = "Failed to update stock. Please try again.";

pub fn material_menu(title: &str, materials: &[Material]) -> String {
    let mut screen = String::from(title);
    for (position, material) in materials.iter().enumerate() {
        screen.push('\n');
        screen.push_str(&format!("{}. {}", position + 1, material.name));
    }
    screen
}

pub fn stock_level(material: &Material) -> String {
    format!("{}: {} {} in stock", material.name, material.quantity, material.unit)
}

pub fn quantity_prompt(material: &Material, action: StockAction) -> String {
    format!("Enter quantity of {} ({}) {}:", material.name, material.unit, action.verb())
}

/// Terminal confirmation after a committed delta. Usage reports the
/// remaining quantity so field users see the new on-hand count.
pub fn commit_confirmation(command: &StockCommand, new_quantity: i64) -> String {
    match command.action {
        StockAction::Received => format!(
            "{} {} of {} recorded as RECEIVED.",
            command.quantity, command.material.unit, command.material.name
        ),
        StockAction::Used => format!(
            "{} {} of {} recorded as USED. Remaining: {} {}.",
            command.quantity,
            command.material.unit,
            command.material.name,
            new_quantity,
            command.material.unit
        ),
    }
}

pub fn insufficient_stock(command: &StockCommand, available: i64) -> String {
    format!(
        "Cannot use {} {}. Only {} available.",
        command.quantity, command.material.unit, available
    )
}

/// Broadcast line for registered stakeholders, naming the caller who
/// recorded the change.
pub fn stakeholder_alert(command: &StockCommand, caller: &str, new_quantity: i64) -> String {
    match command.action {
        StockAction::Received => format!(
            "RECEIVED: {} {} of {} recorded by {}.",
            command.quantity, command.material.unit, command.material.name, caller
        ),
        StockAction::Used => format!(
            "USED: {} {} of {} recorded by {}. Remaining: {}.",
            command.quantity, command.material.unit, command.material.name, caller, new_quantity
        ),
    }
}

/// Personal confirmation sent to the caller after their own commit.
pub fn caller_confirmation(command: &StockCommand, new_quantity: i64) -> String {
    match command.action {
        StockAction::Received => format!(
            "Confirmed: recorded {} {} of {} received.",
            command.quantity, command.material.unit, command.material.name
        ),
        StockAction::Used => format!(
            "Confirmed: recorded {} {} of {} used. Remaining: {}.",
            command.quantity, command.material.unit, command.material.name, new_quantity
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{material_menu, stock_level};
    use crate::domain::material::{Material, MaterialId};

    fn cement() -> Material {
        Material { id: MaterialId(1), name: "Cement".to_string(), unit: "bags".to_string(), quantity: 40 }
    }

    #[test]
    fn material_menu_numbers_from_one() {
        let materials = vec![
            cement(),
            Material { id: MaterialId(2), name: "Sand".to_string(), unit: "tonnes".to_string(), quantity: 12 },
        ];
        assert_eq!(
            material_menu("Select Material:", &materials),
            "Select Material:\n1. Cement\n2. Sand"
        );
    }

    #[test]
    fn stock_level_reports_name_quantity_and_unit() {
        assert_eq!(stock_level(&cement()), "Cement: 40 bags in stock");
    }
}
