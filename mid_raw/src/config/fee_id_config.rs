//! Contains [FeeIdConfig] mapping the physical identity of a GBT link to its FEE ID.
//!
//! The physical identity is the combination of the link ID, the CRU end point and the CRU ID found in the RDH.
//! The configuration file has one line per link, in the form `feeId linkId endPointId cruId`.

use super::crate_params::{N_GBTS_PER_SIDE, N_GBTS};
use super::{narrow, parse_table};
use crate::util::*;

/// Mapping from the physical link identity to the FEE ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeIdConfig {
    fee_ids: HashMap<u32, u16>,
}

impl Default for FeeIdConfig {
    /// The default mapping: one CRU per side with 12 links on end point 0 and 4 on end point 1.
    fn default() -> Self {
        let mut config = Self::empty();
        for iside in 0..2u16 {
            for igbt in 0..N_GBTS_PER_SIDE as u16 {
                config.set_fee_id(
                    igbt + N_GBTS_PER_SIDE as u16 * iside,
                    (igbt % 12) as u8,
                    (igbt / 12) as u8,
                    iside,
                );
            }
        }
        config
    }
}

impl FeeIdConfig {
    /// Creates a mapping without any link.
    pub fn empty() -> Self {
        Self {
            fee_ids: HashMap::new(),
        }
    }

    #[inline]
    fn unique_id(link_id: u8, endpoint: u8, cru_id: u16) -> u32 {
        u32::from(link_id) | u32::from(endpoint) << 8 | u32::from(cru_id) << 16
    }

    /// Loads the mapping from a configuration file.
    pub fn load(path: &Path) -> Result<Self, io::Error> {
        let content = fs::read_to_string(path)?;
        content.parse().map_err(|e: io::Error| {
            io::Error::new(e.kind(), format!("{}: {e}", path.display()))
        })
    }

    /// Writes the mapping to a configuration file that can be read back with [FeeIdConfig::load].
    pub fn write(&self, path: &Path) -> Result<(), io::Error> {
        fs::write(path, self.to_string())
    }

    /// Adds a link to the mapping, replacing the FEE ID if the link is already known.
    pub fn set_fee_id(&mut self, fee_id: u16, link_id: u8, endpoint: u8, cru_id: u16) {
        let _ = self
            .fee_ids
            .insert(Self::unique_id(link_id, endpoint, cru_id), fee_id);
    }

    /// Gets the FEE ID of a link, or [None] if the link is not in the mapping.
    #[inline]
    pub fn fee_id(&self, link_id: u8, endpoint: u8, cru_id: u16) -> Option<u16> {
        self.fee_ids
            .get(&Self::unique_id(link_id, endpoint, cru_id))
            .copied()
    }

    /// Gets the FEE ID of the link that sent a page.
    ///
    /// Returns [None] for unknown links and for FEE IDs beyond the number of GBT links.
    #[inline]
    pub fn fee_id_from_rdh(&self, rdh: &Rdh) -> Option<u16> {
        self.fee_id(rdh.link_id, rdh.endpoint, rdh.cru_id)
            .filter(|&fee_id| usize::from(fee_id) < N_GBTS)
    }

    /// Gets the `(link ID, end point, CRU ID)` of a FEE ID. If several links share the FEE ID the lowest one is returned.
    pub fn link_of(&self, fee_id: u16) -> Option<(u8, u8, u16)> {
        self.fee_ids
            .iter()
            .filter(|(_, &fee)| fee == fee_id)
            .map(|(&unique_id, _)| unique_id)
            .min()
            .map(|unique_id| {
                (
                    (unique_id & 0xFF) as u8,
                    ((unique_id >> 8) & 0xFF) as u8,
                    (unique_id >> 16) as u16,
                )
            })
    }

    /// The FEE IDs in the mapping, sorted.
    pub fn fee_ids(&self) -> Vec<u16> {
        self.fee_ids.values().copied().sorted().collect()
    }

    /// Number of links in the mapping.
    pub fn len(&self) -> usize {
        self.fee_ids.len()
    }

    /// True if no link is in the mapping.
    pub fn is_empty(&self) -> bool {
        self.fee_ids.is_empty()
    }
}

impl FromStr for FeeIdConfig {
    type Err = io::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut config = Self::empty();
        for record in parse_table(s, 4)? {
            config.set_fee_id(
                narrow(record[0], "FEE ID")?,
                narrow(record[1], "link ID")?,
                narrow(record[2], "end point ID")?,
                narrow(record[3], "CRU ID")?,
            );
        }
        Ok(config)
    }
}

impl Display for FeeIdConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "# feeId linkId endPointId cruId")?;
        for (unique_id, fee_id) in self.fee_ids.iter().sorted_by_key(|(id, fee)| (**fee, **id)) {
            writeln!(
                f,
                "{fee_id} {} {} {}",
                unique_id & 0xFF,
                (unique_id >> 8) & 0xFF,
                unique_id >> 16
            )?;
        }
        Ok(())
    }
}
