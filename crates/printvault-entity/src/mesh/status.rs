//! Derived print status for a mesh record.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Print progress of a mesh, derived from its two counters.
///
/// This is a computed projection of `(quantity, printed_quantity)` — it is
/// never stored independently, so the counters and the status cannot drift
/// apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeshStatus {
    /// No copies printed yet.
    Todo,
    /// Some, but not all, desired copies printed.
    Partial,
    /// All desired copies printed.
    Printed,
}

impl MeshStatus {
    /// Derive the status from the desired and completed print counts.
    pub fn derive(quantity: i32, printed_quantity: i32) -> Self {
        if printed_quantity >= quantity {
            Self::Printed
        } else if printed_quantity > 0 {
            Self::Partial
        } else {
            Self::Todo
        }
    }
}

impl fmt::Display for MeshStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Todo => write!(f, "todo"),
            Self::Partial => write!(f, "partial"),
            Self::Printed => write!(f, "printed"),
        }
    }
}
