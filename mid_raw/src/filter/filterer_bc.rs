//! Contains [FiltererBc], keeping the events compatible with a colliding bunch crossing.
//!
//! The signal of one collision can be spread over a few bunch crossings.
//! Events within the window of a colliding bunch crossing are attributed to it and merged into one event.

use crate::util::*;

/// Filters the events by bunch crossing.
#[derive(Debug, Clone)]
pub struct FiltererBc {
    bunch_filling: BunchFilling,
    bc_diff_low: i32,
    bc_diff_high: i32,
    handler: ColumnDataHandler,
    data: Vec<ColumnData>,
    rofs: Vec<RofRecord>,
}

impl FiltererBc {
    /// Creates a filterer for the colliding bunch crossings of `bunch_filling`, with an empty window.
    pub fn new(bunch_filling: BunchFilling) -> Self {
        Self {
            bunch_filling,
            bc_diff_low: 0,
            bc_diff_high: 0,
            handler: ColumnDataHandler::new(),
            data: Vec::new(),
            rofs: Vec::new(),
        }
    }

    /// Sets the window `[bc + low, bc + high]` around a colliding bunch crossing, `low` is usually negative.
    pub fn with_window(mut self, low: i32, high: i32) -> Self {
        self.set_bc_diff_low(low);
        self.set_bc_diff_high(high);
        self
    }

    /// Sets the lower edge of the window.
    pub fn set_bc_diff_low(&mut self, low: i32) {
        self.bc_diff_low = low;
    }

    /// Sets the upper edge of the window.
    pub fn set_bc_diff_high(&mut self, high: i32) {
        self.bc_diff_high = high;
    }

    fn matched_collision(&self, bc: u16) -> Option<u16> {
        let bc = i32::from(bc);
        (bc + self.bc_diff_low..=bc + self.bc_diff_high)
            .find(|&ibc| self.bunch_filling.test_interacting_bc(ibc))
            .map(|ibc| ibc as u16)
    }

    /// Filters the events, replacing the previous output. `rofs` index into `data` and are sorted in time.
    ///
    /// An event is kept if a colliding bunch crossing is within the window, and takes its bunch crossing.
    /// The following events of the same orbit within the window of the same collision are merged into it.
    pub fn process(&mut self, data: &[ColumnData], rofs: &[RofRecord]) {
        self.data.clear();
        self.rofs.clear();
        let mut irof = 0;
        while irof < rofs.len() {
            let rof = &rofs[irof];
            let Some(matched_bc) = self.matched_collision(rof.ir.bc) else {
                irof += 1;
                continue;
            };
            let mut last = irof;
            for (iaux, aux) in rofs.iter().enumerate().skip(irof + 1) {
                if aux.ir.orbit != rof.ir.orbit {
                    break;
                }
                let bc_diff = i32::from(aux.ir.bc) - i32::from(matched_bc);
                if bc_diff < self.bc_diff_low || bc_diff > self.bc_diff_high {
                    break;
                }
                self.handler.merge(&data[aux.range()]);
                last = iaux;
            }

            let first_entry = self.data.len();
            if last == irof {
                self.data.extend_from_slice(&data[rof.range()]);
            } else {
                self.handler.merge(&data[rof.range()]);
                self.data.extend_from_slice(self.handler.merged());
                self.handler.clear();
            }
            self.rofs.push(RofRecord::new(
                InteractionRecord::new(matched_bc, rof.ir.orbit),
                rofs[last].event_type,
                first_entry,
                self.data.len() - first_entry,
            ));
            irof = last + 1;
        }
    }

    /// Filtered data.
    #[inline]
    pub fn data(&self) -> &[ColumnData] {
        &self.data
    }

    /// Events of the filtered data.
    #[inline]
    pub fn rof_records(&self) -> &[RofRecord] {
        &self.rofs
    }
}
