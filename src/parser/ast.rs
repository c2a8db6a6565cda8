// Syntax tree for channel binding expressions

use crate::registry::Slot;

/// `channel: column`
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub slot: Slot,
    pub column: String,
}

/// A full expression such as `x: a, y: b, z: c, size: "Body Mass (g)"`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EncodingExpr {
    pub bindings: Vec<Binding>,
}

impl EncodingExpr {
    pub fn get(&self, slot: Slot) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.slot == slot)
            .map(|b| b.column.as_str())
    }

    /// Bindings in x, y, z, symbol, color, size order, the order the
    /// selection cascade expects them to be applied in.
    pub fn in_slot_order(&self) -> Vec<(Slot, &str)> {
        Slot::ALL
            .iter()
            .filter_map(|&slot| self.get(slot).map(|column| (slot, column)))
            .collect()
    }
}
