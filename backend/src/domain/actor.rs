//! Acting staff members as seen through the authorization port.
//!
//! The core treats capability names as opaque strings supplied by the
//! external role store; the constants below are the names it consults.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Capability names consulted by the scheduling core.
pub mod capability {
    pub const CREATE_EVENTS: &str = "create_events";
    pub const UPDATE_EVENTS: &str = "update_events";
    pub const CHECKOUT_ANIMALS: &str = "checkout_animals";
    pub const CHECKIN_ANIMALS: &str = "checkin_animals";
    pub const DELETE_ANIMALS: &str = "delete_animals";
    pub const MAKE_ANIMAL_UNAVAILABLE: &str = "make_animal_unavailable";
    pub const MAKE_ANIMAL_AVAILABLE: &str = "make_animal_available";
    /// Elevated capability required for handling-restricted animals.
    pub const HANDLER: &str = "handler";
}

/// A staff member performing a scheduling action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i32,
    pub display_name: String,
    pub role_name: String,
    /// Clearance tier (1–4); must meet or exceed an animal's tier.
    pub tier: i16,
    capabilities: HashSet<String>,
}

impl Actor {
    /// Build an actor from the external role store's view.
    pub fn new(
        id: i32,
        display_name: impl Into<String>,
        role_name: impl Into<String>,
        tier: i16,
        capabilities: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            role_name: role_name.into(),
            tier,
            capabilities: capabilities.into_iter().collect(),
        }
    }

    /// Whether the actor's role grants the named capability.
    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities.contains(name)
    }

    /// Attribution string used in audit descriptions, e.g.
    /// `"Dana Obi (handler)"`.
    pub fn attribution(&self) -> String {
        format!("{} ({})", self.display_name, self.role_name)
    }
}
