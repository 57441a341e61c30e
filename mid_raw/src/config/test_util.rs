#![allow(missing_docs)]

use crate::util::*;

#[derive(Debug, Clone, Default)]
/// Configurable mock config for testing
pub struct MockConfig {
    pub debug_mode: bool,
    pub user_logic: bool,
    pub concurrent: bool,
    pub busy_policy: BusyPolicy,
    pub electronics_delay: ElectronicsDelay,
}

impl MockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_debug() -> Self {
        Self {
            debug_mode: true,
            ..Default::default()
        }
    }

    pub fn new_user_logic() -> Self {
        Self {
            user_logic: true,
            ..Default::default()
        }
    }
}

impl DecodeOpt for MockConfig {
    fn debug_mode(&self) -> bool {
        self.debug_mode
    }
    fn user_logic(&self) -> bool {
        self.user_logic
    }
    fn concurrent(&self) -> bool {
        self.concurrent
    }
    fn electronics_delay(&self) -> ElectronicsDelay {
        self.electronics_delay
    }
}

impl CheckOpt for MockConfig {
    fn busy_policy(&self) -> BusyPolicy {
        self.busy_policy
    }
}
