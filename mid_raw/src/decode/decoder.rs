//! Contains the [Decoder] that splits a buffer of pages by GBT link, decodes each link and merges the output.
//!
//! The links are independent, so they can be decoded concurrently with one scoped thread per link.
//! The output is merged in order of first appearance of the links in the buffer,
//! so it does not depend on which thread finishes first.

use crate::config::crate_params::N_GBTS;
use crate::stats::report;
use crate::util::lib::display_error;
use crate::util::*;

type LinkPages<'a> = Vec<(Rdh, &'a [u8])>;

/// Decoder of buffers of pages coming from any of the GBT links.
#[derive(Debug)]
pub struct Decoder {
    link_decoders: Vec<Box<dyn LinkDecoder + Send>>,
    fee_id_config: FeeIdConfig,
    concurrent: bool,
    data: Vec<RoBoard>,
    rofs: Vec<RofRecord>,
    stats_sender: Option<flume::Sender<StatType>>,
}

impl Decoder {
    /// Creates a decoder with one link decoder per FEE ID.
    ///
    /// The local boards of each link are read according to `crate_masks`.
    pub fn new(config: &impl DecodeOpt, fee_id_config: FeeIdConfig, crate_masks: &CrateMasks) -> Self {
        let link_decoders = (0..N_GBTS as u16)
            .map(|fee_id| create_link_decoder(fee_id, crate_masks.mask(fee_id), config))
            .collect();
        Self {
            link_decoders,
            fee_id_config,
            concurrent: config.concurrent(),
            data: Vec::new(),
            rofs: Vec::new(),
            stats_sender: None,
        }
    }

    /// Creates a decoder from a [DecoderConfig], loading the FEE ID mapping and the crate masks it refers to.
    pub fn from_config(config: &DecoderConfig) -> Result<Self, io::Error> {
        let fee_id_config = config.fee_id_config()?;
        let crate_masks = config.crate_masks()?;
        Ok(Self::new(config, fee_id_config, &crate_masks))
    }

    /// Reports statistics through `sender`.
    pub fn with_stats(mut self, sender: flume::Sender<StatType>) -> Self {
        self.stats_sender = Some(sender);
        self
    }

    // Splits the pages by link, links in order of first appearance
    fn split_by_link<'a>(&self, buffer: &'a [u8]) -> Vec<(u16, LinkPages<'a>)> {
        let mut links: Vec<(u16, LinkPages<'a>)> = Vec::new();
        let mut reader = RawPageReader::new(buffer);
        while reader.next_page() {
            let Some(rdh) = reader.rdh().copied() else {
                break;
            };
            let Some(fee_id) = self.fee_id_config.fee_id_from_rdh(&rdh) else {
                log::warn!(
                    "Page {} skipped: unknown link (link ID {}, end point {}, CRU ID {})",
                    reader.pages_read() - 1,
                    rdh.link_id,
                    rdh.endpoint,
                    rdh.cru_id
                );
                report(
                    self.stats_sender.as_ref(),
                    StatType::UnknownFeeId {
                        link_id: rdh.link_id,
                        endpoint: rdh.endpoint,
                        cru_id: rdh.cru_id,
                    },
                );
                continue;
            };
            match links.iter_mut().find(|(fee, _)| *fee == fee_id) {
                Some((_, pages)) => pages.push((rdh, reader.payload())),
                None => {
                    report(self.stats_sender.as_ref(), StatType::FeeId(fee_id));
                    links.push((fee_id, vec![(rdh, reader.payload())]));
                }
            }
        }
        links
    }

    fn decode_link(decoder: &mut (dyn LinkDecoder + Send), pages: &[(Rdh, &[u8])]) {
        for (rdh, payload) in pages {
            decoder.process(payload, rdh);
        }
    }

    fn decode_sequential(&mut self, links: &[(u16, LinkPages<'_>)]) {
        for (fee_id, pages) in links {
            Self::decode_link(self.link_decoders[usize::from(*fee_id)].as_mut(), pages);
        }
    }

    fn decode_concurrent(&mut self, links: &[(u16, LinkPages<'_>)]) {
        let mut not_spawned = Vec::new();
        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(links.len());
            for (decoder, (fee_id, pages)) in self
                .link_decoders
                .iter_mut()
                .enumerate()
                .filter_map(|(fee_id, decoder)| {
                    links
                        .iter()
                        .find(|(fee, _)| usize::from(*fee) == fee_id)
                        .map(|link| (decoder, link))
                })
            {
                let spawned = thread::Builder::new()
                    .name(format!("GBT decoder #{fee_id}"))
                    .spawn_scoped(scope, move || Self::decode_link(decoder.as_mut(), pages));
                match spawned {
                    Ok(handle) => handles.push((*fee_id, handle)),
                    Err(e) => {
                        log::warn!("Failed to spawn the decoder thread of FEE {fee_id}: {e}");
                        not_spawned.push(*fee_id);
                    }
                }
            }
            for (fee_id, handle) in handles {
                if handle.join().is_err() {
                    display_error(&format!("Decoder thread of FEE {fee_id} panicked"));
                }
            }
        });
        for (fee_id, pages) in links.iter().filter(|(fee, _)| not_spawned.contains(fee)) {
            Self::decode_link(self.link_decoders[usize::from(*fee_id)].as_mut(), pages);
        }
    }

    /// Decodes a buffer of pages, replacing the previous output.
    ///
    /// Pages from links that are not in the FEE ID mapping are skipped.
    /// The state of each link is kept between calls, so a board word may span two buffers.
    pub fn process(&mut self, buffer: &[u8]) {
        self.clear();
        let links = self.split_by_link(buffer);
        let n_pages: usize = links.iter().map(|(_, pages)| pages.len()).sum();
        log::debug!(
            "Decoding {n_pages} pages from {} links{}",
            links.len(),
            if self.concurrent { " concurrently" } else { "" }
        );

        if self.concurrent && links.len() > 1 {
            self.decode_concurrent(&links);
        } else {
            self.decode_sequential(&links);
        }

        for (fee_id, _) in &links {
            let decoder = &self.link_decoders[usize::from(*fee_id)];
            let offset = self.data.len();
            self.data.extend_from_slice(decoder.data());
            self.rofs.extend(decoder.rof_records().iter().map(|rof| RofRecord {
                first_entry: rof.first_entry + offset,
                ..*rof
            }));
        }

        report(self.stats_sender.as_ref(), StatType::PagesDecoded(n_pages as u32));
        report(
            self.stats_sender.as_ref(),
            StatType::BoardsDecoded(self.data.len() as u32),
        );
    }

    fn clear(&mut self) {
        self.data.clear();
        self.rofs.clear();
        self.link_decoders.iter_mut().for_each(|decoder| decoder.clear());
    }

    /// Decoded boards of the last buffer.
    #[inline]
    pub fn data(&self) -> &[RoBoard] {
        &self.data
    }

    /// One record per decoded board of the last buffer.
    #[inline]
    pub fn rof_records(&self) -> &[RofRecord] {
        &self.rofs
    }

    /// Clears the output and the state of all links.
    pub fn reset(&mut self) {
        self.clear();
        self.link_decoders.iter_mut().for_each(|decoder| decoder.reset());
    }

    /// True if no board word is partially received on any link.
    pub fn is_complete(&self) -> bool {
        self.link_decoders.iter().all(|decoder| decoder.is_complete())
    }
}
