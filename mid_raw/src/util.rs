//! Miscellaneous utility functions, and the imports shared by the modules of the crate.
pub mod lib;

pub(crate) use {
    crate::{
        config::prelude::*,
        decode::{
            elink_decoder::ELinkDecoder,
            link_decoder::{create_link_decoder, LinkDecoder},
            link_state::{DebugMode, LinkState, Mode, ProductionMode},
        },
        filter::{
            bunch_filling::BunchFilling, channel_masks::ChannelMasks,
            channel_scalers::ChannelScalers, column_data_handler::ColumnDataHandler,
        },
        stats::StatType,
        words::{
            column_data::{make_column_key, ColumnData},
            interaction_record::{InteractionRecord, LHC_MAX_BUNCHES},
            raw_info,
            ro_board::RoBoard,
            rof_record::{EventType, RofRecord},
        },
    },
    byteorder::{BigEndian, ByteOrder},
    itertools::Itertools,
    mid_protocol_reader::prelude::*,
    owo_colors::OwoColorize,
    serde::{Deserialize, Serialize},
    sm::sm,
    std::{
        collections::{BTreeMap, HashMap},
        fmt::{self, Display},
        fs, io,
        marker::PhantomData,
        path::{Path, PathBuf},
        str::FromStr,
        sync::{Arc, OnceLock},
        thread,
    },
};
