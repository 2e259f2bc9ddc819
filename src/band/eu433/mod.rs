//! Processing for the EU433 region.

use super::downgrade::with_version;
use super::*;

const UPLINK_CHANNELS: [Channel; 3] = [
    Channel::new(433_175_000, DR::_0, DR::_5),
    Channel::new(433_375_000, DR::_0, DR::_5),
    Channel::new(433_575_000, DR::_0, DR::_5),
];

const SUB_BANDS: [SubBand; 1] = [SubBand {
    min_frequency: 433_175_000,
    max_frequency: 434_665_000,
    duty_cycle: 0.01,
    max_eirp: 12.15,
}];

const BEACON_FREQUENCIES: [u32; 1] = [434_665_000];

const LATEST: Band = Band {
    id: BandId::Eu433,
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
    data_rates: cn779::DATA_RATES,
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
    tx_offsets: &cn779::TX_OFFSETS,
    max_adr_data_rate_index: DR::_5,
    strict_coding_rate: true,
    tx_param_setup_req_support: false,
    default_max_eirp: 12.15,
    default_rx2: Rx2Parameters { data_rate_index: DR::_0, frequency: 434_665_000 },
    boot_dwell_time: DwellTime { uplinks: None, downlinks: None },
    rx1_channel: Rx1Channel::Identity,
    rx1_data_rate: Rx1DataRate::Subtract { max_offset: 5, min: DR::_0 },
    ch_mask: ChMaskFamily::Sixteen,
};

const fn band(version: PhyVersion) -> Option<Band> {
    Some(with_version(LATEST, version))
}

pub(crate) static BANDS: [Option<Band>; 12] = versions!(band);
