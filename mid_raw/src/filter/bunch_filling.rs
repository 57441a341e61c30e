//! Contains [BunchFilling], the bunch crossings of an orbit where collisions take place.

use crate::util::*;

/// Colliding bunch crossings of the LHC filling scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BunchFilling {
    colliding: Vec<bool>,
}

impl Default for BunchFilling {
    fn default() -> Self {
        Self {
            colliding: vec![false; usize::from(LHC_MAX_BUNCHES)],
        }
    }
}

impl BunchFilling {
    /// Creates a filling scheme without collisions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a filling scheme with collisions at the given bunch crossings.
    pub fn from_bcs(bcs: impl IntoIterator<Item = u16>) -> Self {
        let mut filling = Self::new();
        bcs.into_iter().for_each(|bc| filling.set_bc(bc));
        filling
    }

    /// Declares a colliding bunch crossing. Bunch crossings beyond the orbit are ignored.
    pub fn set_bc(&mut self, bc: u16) {
        match self.colliding.get_mut(usize::from(bc)) {
            Some(is_colliding) => *is_colliding = true,
            None => log::warn!("Bunch crossing {bc} is beyond the orbit length, ignored"),
        }
    }

    /// True if collisions take place at `bc`. Bunch crossings outside the orbit never collide.
    #[inline]
    pub fn test_interacting_bc(&self, bc: i32) -> bool {
        usize::try_from(bc)
            .ok()
            .and_then(|bc| self.colliding.get(bc))
            .copied()
            .unwrap_or_default()
    }

    /// The colliding bunch crossings, in increasing order.
    pub fn colliding_bcs(&self) -> Vec<u16> {
        self.colliding
            .iter()
            .positions(|&is_colliding| is_colliding)
            .map(|bc| bc as u16)
            .collect()
    }
}
