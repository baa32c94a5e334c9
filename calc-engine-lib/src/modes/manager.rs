use crate::modes::{Mode, ProgrammerMode, ScientificMode, StandardMode};
use itertools::Itertools;
use log::trace;
use std::collections::HashMap;

/// Name of the mode used when none is chosen.
pub const DEFAULT_MODE: &str = "standard";

/// Registry of calculator modes by name.
pub struct ModeManager {
    modes: HashMap<String, Box<dyn Mode>>,
}

impl Default for ModeManager {
    fn default() -> Self {
        ModeManager::new()
    }
}

impl ModeManager {
    /// Creates a manager holding the standard, scientific and programmer modes.
    ///
    /// # Examples
    ///
    /// ```
    /// use calc_engine::modes::ModeManager;
    ///
    /// let manager = ModeManager::new();
    /// assert_eq!(manager.available_modes(), vec!["programmer", "scientific", "standard"]);
    ///
    /// let programmer = manager.get_mode("programmer").unwrap();
    /// assert_eq!(programmer.evaluate("0xFF & 0x0F").value(), 15.0);
    /// ```
    pub fn new() -> ModeManager {
        let mut manager = ModeManager::empty();
        manager.register_mode(Box::new(StandardMode::new()));
        manager.register_mode(Box::new(ScientificMode::new()));
        manager.register_mode(Box::new(ProgrammerMode::new()));
        manager
    }

    pub fn empty() -> ModeManager {
        ModeManager {
            modes: HashMap::new(),
        }
    }

    /// Adds a mode under its own name.
    ///
    /// returns: `false`, leaving the registry untouched, if the name is taken.
    pub fn register_mode(&mut self, mode: Box<dyn Mode>) -> bool {
        let name = mode.name().to_string();
        if self.modes.contains_key(&name) {
            return false;
        }
        trace!("registering {} mode", name);
        self.modes.insert(name, mode);
        true
    }

    pub fn get_mode(&self, name: &str) -> Option<&dyn Mode> {
        self.modes.get(name).map(|mode| mode.as_ref())
    }

    pub fn get_mode_mut(&mut self, name: &str) -> Option<&mut dyn Mode> {
        let mode = self.modes.get_mut(name)?;
        Some(mode.as_mut())
    }

    pub fn default_mode(&self) -> Option<&dyn Mode> {
        self.get_mode(DEFAULT_MODE)
    }

    /// Names of every registered mode, sorted.
    pub fn available_modes(&self) -> Vec<String> {
        self.modes.keys().sorted().cloned().collect()
    }

    pub fn has_mode(&self, name: &str) -> bool {
        self.modes.contains_key(name)
    }

    pub fn mode_count(&self) -> usize {
        self.modes.len()
    }
}
