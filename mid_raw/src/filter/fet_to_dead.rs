//! Contains [FetToDead], finding the dead channels from the answers to the test pulses (FET).
//!
//! During a FET event every working strip answers. The dead channels are the strips of the detector
//! that did not answer: the inverted FET patterns restricted to the existing strips.

use super::mask_maker::make_default_masks;
use crate::util::*;

/// Converts FET data into dead channels.
#[derive(Debug, Clone)]
pub struct FetToDead {
    default_masks: Vec<ColumnData>,
    handler: ColumnDataHandler,
    dead: Vec<ColumnData>,
}

impl Default for FetToDead {
    fn default() -> Self {
        Self::new()
    }
}

impl FetToDead {
    /// Creates the converter for the boards of the detector mapping.
    pub fn new() -> Self {
        Self {
            default_masks: make_default_masks(CrateMapper::instance()),
            handler: ColumnDataHandler::new(),
            dead: Vec::new(),
        }
    }

    /// Computes the dead channels from the FET data of one or more FET events.
    ///
    /// Columns without any FET answer are entirely dead. Columns without dead channels are not returned.
    /// The result is sorted by detection element and column.
    pub fn process(&mut self, fet_data: &[ColumnData]) -> &[ColumnData] {
        self.handler.clear();
        self.handler.merge(fet_data);
        let answered: HashMap<u16, &ColumnData> = self
            .handler
            .merged()
            .iter()
            .map(|col| (col.column_key(), col))
            .collect();

        self.dead.clear();
        for mask in &self.default_masks {
            let mut dead = *mask;
            if let Some(fet) = answered.get(&mask.column_key()) {
                for (pattern, fet_pattern) in dead.patterns.iter_mut().zip(fet.patterns) {
                    *pattern &= !fet_pattern;
                }
            }
            if !dead.is_empty() {
                self.dead.push(dead);
            }
        }
        log::debug!("{} columns with dead channels", self.dead.len());
        &self.dead
    }
}
