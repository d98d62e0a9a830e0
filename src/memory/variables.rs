//! Variable memory
//!
//! A single global scope: an insertion-ordered map from name to
//! [`Variable`]. Each slot carries a synthetic address, drawn at random when
//! the slot is created, that exists only to be displayed. Addresses never
//! influence execution and are not part of any equality check on a run.
//!
//! Re-declaring a name overwrites its value and mints a new address (shadowing
//! in one global scope); assigning keeps the address.

use super::value::{Address, Value};
use crate::interpreter::constants::{SLOT_ADDRESS_BASE, SLOT_ADDRESS_SPAN, SLOT_ALIGN};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;

/// A named variable slot
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub value: Value,
    pub address: Address, // Synthetic, display only
}

impl Variable {
    /// Address as shown to the user, e.g. `0x7ffd004a13c8`
    pub fn display_address(&self) -> String {
        format!("0x{:012x}", self.address)
    }
}

/// Ordered variable memory for one run
#[derive(Debug, Clone)]
pub struct Memory {
    slots: FxHashMap<String, Variable>,
    insertion_order: Vec<String>, // Track order of first declaration
    rng: StdRng,
}

impl Memory {
    /// Memory whose addresses come from OS entropy
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Memory whose addresses are reproducible
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Memory {
            slots: FxHashMap::default(),
            insertion_order: Vec::new(),
            rng,
        }
    }

    /// Create (or re-create) a slot with a fresh address
    pub fn declare(&mut self, name: &str, value: Value) -> &Variable {
        let address = self.fresh_address();
        if !self.slots.contains_key(name) {
            self.insertion_order.push(name.to_string());
        }
        self.slots.insert(
            name.to_string(),
            Variable {
                name: name.to_string(),
                value,
                address,
            },
        );
        &self.slots[name]
    }

    /// Update the value of an existing slot; the address is kept
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), String> {
        match self.slots.get_mut(name) {
            Some(var) => {
                var.value = value;
                Ok(())
            }
            None => Err(format!("Unbound variable: {}", name)),
        }
    }

    /// Current value of a variable, `None` if it was never declared
    pub fn read(&self, name: &str) -> Option<&Value> {
        self.slots.get(name).map(|v| &v.value)
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.slots.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Variables in order of first declaration (for UI display)
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.insertion_order
            .iter()
            .filter_map(|name| self.slots.get(name))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// A random aligned address not held by any live slot
    fn fresh_address(&mut self) -> Address {
        loop {
            let offset = self.rng.gen_range(0..SLOT_ADDRESS_SPAN / SLOT_ALIGN) * SLOT_ALIGN;
            let address = SLOT_ADDRESS_BASE + offset;
            if !self.slots.values().any(|v| v.address == address) {
                return address;
            }
        }
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}
