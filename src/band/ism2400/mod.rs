//! Processing for the 2.4 GHz ISM band.

use super::data_rate::{constant, Bandwidth, CodingRate, DataRate, SpreadingFactor};
use super::downgrade::with_version;
use super::*;

const UPLINK_CHANNELS: [Channel; 3] = [
    Channel::new(2_403_000_000, DR::_0, DR::_7),
    Channel::new(2_425_000_000, DR::_0, DR::_7),
    Channel::new(2_479_000_000, DR::_0, DR::_7),
];

const SUB_BANDS: [SubBand; 1] = [SubBand {
    min_frequency: 2_400_000_000,
    max_frequency: 2_500_000_000,
    duty_cycle: 1.0,
    max_eirp: 10.0,
}];

const fn lora(spreading_factor: SpreadingFactor, size: u16) -> Option<DataRate> {
    Some(DataRate::lora_with_coding_rate(
        spreading_factor,
        Bandwidth::_812KHz,
        CodingRate::_4_8Li,
        constant(size),
    ))
}

const DATA_RATES: [Option<DataRate>; 16] = [
    lora(SpreadingFactor::_12, 59),
    lora(SpreadingFactor::_11, 123),
    lora(SpreadingFactor::_10, 248),
    lora(SpreadingFactor::_9, 248),
    lora(SpreadingFactor::_8, 248),
    lora(SpreadingFactor::_7, 248),
    lora(SpreadingFactor::_6, 248),
    lora(SpreadingFactor::_5, 248),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
];

const BEACON_FREQUENCIES: [u32; 1] = [2_424_000_000];

const LATEST: Band = Band {
    id: BandId::Ism2400,
    version: PhyVersion::Rp002V1_0_4,
    beacon: Beacon {
        data_rate_index: DR::_0,
        coding_rate: CodingRate::_4_8Li,
        frequencies: &BEACON_FREQUENCIES,
    },
    ping_slot_frequencies: &BEACON_FREQUENCIES,
    max_uplink_channels: 16,
    uplink_channels: &UPLINK_CHANNELS,
    max_downlink_channels: 16,
    downlink_channels: &UPLINK_CHANNELS,
    sub_bands: &SUB_BANDS,
    data_rates: DATA_RATES,
    freq_multiplier: 200,
    implements_cf_list: true,
    cf_list_type: CfListType::Frequencies,
    receive_delay_1: RECEIVE_DELAY_1,
    receive_delay_2: RECEIVE_DELAY_2,
    join_accept_delay_1: JOIN_ACCEPT_DELAY_1,
    join_accept_delay_2: JOIN_ACCEPT_DELAY_2,
    max_fcnt_gap: MAX_FCNT_GAP,
    supports_dynamic_adr: true,
    adr_ack_limit: ADR_ACK_LIMIT,
    adr_ack_delay: ADR_ACK_DELAY,
    min_retransmit_timeout: MIN_RETRANSMIT_TIMEOUT,
    max_retransmit_timeout: MAX_RETRANSMIT_TIMEOUT,
    tx_offsets: &eu868::TX_OFFSETS,
    max_adr_data_rate_index: DR::_7,
    strict_coding_rate: false,
    tx_param_setup_req_support: false,
    default_max_eirp: 10.0,
    default_rx2: Rx2Parameters { data_rate_index: DR::_0, frequency: 2_423_000_000 },
    boot_dwell_time: DwellTime { uplinks: None, downlinks: None },
    rx1_channel: Rx1Channel::Identity,
    rx1_data_rate: Rx1DataRate::Subtract { max_offset: 5, min: DR::_0 },
    ch_mask: ChMaskFamily::Sixteen,
};

/// Only defined alongside the RP002 documents.
const fn band(version: PhyVersion) -> Option<Band> {
    match version {
        PhyVersion::Rp002V1_0_0
        | PhyVersion::Rp002V1_0_1
        | PhyVersion::Rp002V1_0_2
        | PhyVersion::Rp002V1_0_3
        | PhyVersion::Rp002V1_0_4 => Some(with_version(LATEST, version)),
        _ => None,
    }
}

pub(crate) static BANDS: [Option<Band>; 12] = versions!(band);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::Frequency;

    #[test]
    fn frequencies_use_a_200_hz_unit() {
        let band = get_latest(BandId::Ism2400).unwrap();
        let freq = Frequency::from_hz(band.uplink_channels[2].frequency, band.freq_multiplier).unwrap();
        assert_eq!(freq.hz(band.freq_multiplier), 2_479_000_000);
        assert!(Frequency::from_hz(2_479_000_000, 100).is_none());
    }
}
