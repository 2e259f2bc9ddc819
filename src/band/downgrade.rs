//! Transformations deriving an older PHY version of a band from a newer one.
//!
//! Every function takes a band by value and returns the modified band, so version chains
//! read as nested calls and stay usable in `const` context.

use super::channel_plan::ChMaskFamily;
use super::{Band, PhyVersion};
use crate::types::DR;

/// Sets the version the band record describes.
pub const fn with_version(band: Band, version: PhyVersion) -> Band {
    Band { version, ..band }
}

/// JoinAccepts carry no CFList.
pub const fn disable_cf_list(band: Band) -> Band {
    Band { implements_cf_list: false, ..band }
}

/// ChMaskCntl 5 is not understood by devices of the version.
pub const fn disable_ch_mask_cntl5(band: Band) -> Band {
    let ch_mask = match band.ch_mask {
        ChMaskFamily::SeventyTwo { .. } => ChMaskFamily::SeventyTwo { cntl5: false },
        other => other,
    };
    Band { ch_mask, ..band }
}

/// Only the first `n` TXPower indices are defined.
pub const fn clip_tx_offsets(band: Band, n: usize) -> Band {
    let n = if n < band.tx_offsets.len() { n } else { band.tx_offsets.len() };
    Band { tx_offsets: band.tx_offsets.split_at(n).0, ..band }
}

/// The beacon uses another data rate.
pub const fn set_beacon_data_rate(band: Band, data_rate_index: DR) -> Band {
    let mut band = band;
    band.beacon.data_rate_index = data_rate_index;
    band
}

/// Data rates `first..=last` are not defined.
pub const fn disable_data_rates(band: Band, first: DR, last: DR) -> Band {
    let mut band = band;
    let mut i = first as usize;
    while i <= last as usize {
        band.data_rates[i] = None;
        i += 1;
    }
    band
}

/// TxParamSetupReq is not supported.
pub const fn disable_tx_param_setup_req(band: Band) -> Band {
    Band { tx_param_setup_req_support: false, ..band }
}

/// Another default maximum EIRP.
pub const fn set_max_eirp(band: Band, max_eirp: f32) -> Band {
    Band { default_max_eirp: max_eirp, ..band }
}

/// Another highest ADR data rate.
pub const fn set_max_adr_data_rate(band: Band, index: DR) -> Band {
    Band { max_adr_data_rate_index: index, ..band }
}
