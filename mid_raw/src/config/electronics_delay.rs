//! Contains [ElectronicsDelay], the delays between the trigger and the answer of the boards.

use crate::util::*;

/// Delays, in bunch crossings, introduced by the electronics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectronicsDelay {
    /// Delay between a calibration trigger and the FET answer
    pub calib_to_fet: u16,
    /// Delay between the collision and the answer of the local boards
    pub bc_to_local: u16,
    /// Delay between the answer of the regional boards and the answer of the local boards
    pub reg_to_local: u16,
}

impl Default for ElectronicsDelay {
    fn default() -> Self {
        Self {
            calib_to_fet: 10,
            bc_to_local: 0,
            reg_to_local: 6,
        }
    }
}

impl Display for ElectronicsDelay {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "calib to FET: {}  BC to local: {}  regional to local: {}",
            self.calib_to_fet, self.bc_to_local, self.reg_to_local
        )
    }
}
