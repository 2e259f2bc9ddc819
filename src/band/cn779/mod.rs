//! Processing for the CN779 region.

use super::data_rate::{constant, Bandwidth, DataRate, SpreadingFactor};
use super::downgrade::with_version;
use super::*;

const UPLINK_CHANNELS: [Channel; 3] = [
    Channel::new(779_500_000, DR::_0, DR::_5),
    Channel::new(779_700_000, DR::_0, DR::_5),
    Channel::new(779_900_000, DR::_0, DR::_5),
];

const SUB_BANDS: [SubBand; 1] = [SubBand {
    min_frequency: 779_000_000,
    max_frequency: 787_000_000,
    duty_cycle: 0.01,
    max_eirp: 12.15,
}];

pub(crate) const DATA_RATES: [Option<DataRate>; 16] = [
    Some(DataRate::lora(SpreadingFactor::_12, Bandwidth::_125KHz, constant(59))),
    Some(DataRate::lora(SpreadingFactor::_11, Bandwidth::_125KHz, constant(59))),
    Some(DataRate::lora(SpreadingFactor::_10, Bandwidth::_125KHz, constant(59))),
    Some(DataRate::lora(SpreadingFactor::_9, Bandwidth::_125KHz, constant(123))),
    Some(DataRate::lora(SpreadingFactor::_8, Bandwidth::_125KHz, constant(230))),
    Some(DataRate::lora(SpreadingFactor::_7, Bandwidth::_125KHz, constant(230))),
    Some(DataRate::lora(SpreadingFactor::_7, Bandwidth::_250KHz, constant(230))),
    Some(DataRate::fsk(50_000, constant(230))),
    None,
    None,
    None,
    None,
    None,
    None,
    None,
    None,
];

pub(crate) const TX_OFFSETS: [f32; 6] = [0.0, -2.0, -4.0, -6.0, -8.0, -10.0];

const BEACON_FREQUENCIES: [u32; 1] = [785_000_000];

const LATEST: Band = Band {
    id: BandId::Cn779787,
    version: PhyVersion::Rp002V1_0_4,
    beacon: Beacon {
        data_rate_index: DR::_3,
        coding_rate: data_rate::CodingRate::_4_5,
        frequencies: &BEACON_FREQUENCIES,
    },
    ping_slot_frequencies: &BEACON_FREQUENCIES,
    max_uplink_channels: 16,
    uplink_channels: &UPLINK_CHANNELS,
    max_downlink_channels: 16,
    downlink_channels: &UPLINK_CHANNELS,
    sub_bands: &SUB_BANDS,
    data_rates: DATA_RATES,
    freq_multiplier: 100,
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
    tx_offsets: &TX_OFFSETS,
    max_adr_data_rate_index: DR::_5,
    strict_coding_rate: true,
    tx_param_setup_req_support: false,
    default_max_eirp: 12.15,
    default_rx2: Rx2Parameters { data_rate_index: DR::_0, frequency: 786_000_000 },
    boot_dwell_time: DwellTime { uplinks: None, downlinks: None },
    rx1_channel: Rx1Channel::Identity,
    rx1_data_rate: Rx1DataRate::Subtract { max_offset: 5, min: DR::_0 },
    ch_mask: ChMaskFamily::Sixteen,
};

const fn band(version: PhyVersion) -> Option<Band> {
    Some(with_version(LATEST, version))
}

pub(crate) static BANDS: [Option<Band>; 12] = versions!(band);
