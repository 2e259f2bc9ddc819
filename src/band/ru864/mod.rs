//! Processing for the RU864 region.

use super::downgrade::with_version;
use super::*;

const UPLINK_CHANNELS: [Channel; 2] = [
    Channel::new(868_900_000, DR::_0, DR::_5),
    Channel::new(869_100_000, DR::_0, DR::_5),
];

const SUB_BANDS: [SubBand; 4] = [
    SubBand { min_frequency: 864_000_000, max_frequency: 865_000_000, duty_cycle: 0.001, max_eirp: 16.15 },
    SubBand { min_frequency: 866_000_000, max_frequency: 868_000_000, duty_cycle: 0.01, max_eirp: 16.15 },
    SubBand { min_frequency: 868_700_000, max_frequency: 869_200_000, duty_cycle: 0.01, max_eirp: 16.15 },
    SubBand { min_frequency: 869_400_000, max_frequency: 869_650_000, duty_cycle: 0.1, max_eirp: 16.15 },
];

const BEACON_FREQUENCIES: [u32; 1] = [869_100_000];

const LATEST: Band = Band {
    id: BandId::Ru864870,
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
    tx_offsets: &eu868::TX_OFFSETS,
    max_adr_data_rate_index: DR::_5,
    strict_coding_rate: true,
    tx_param_setup_req_support: false,
    default_max_eirp: 16.15,
    default_rx2: Rx2Parameters { data_rate_index: DR::_0, frequency: 869_100_000 },
    boot_dwell_time: DwellTime { uplinks: None, downlinks: None },
    rx1_channel: Rx1Channel::Identity,
    rx1_data_rate: Rx1DataRate::Subtract { max_offset: 5, min: DR::_0 },
    ch_mask: ChMaskFamily::Sixteen,
};

/// The band appeared in 1.0.3-a.
const fn band(version: PhyVersion) -> Option<Band> {
    match version {
        PhyVersion::V1_0_3RevA
        | PhyVersion::Rp002V1_0_0
        | PhyVersion::Rp002V1_0_1
        | PhyVersion::Rp002V1_0_2
        | PhyVersion::Rp002V1_0_3
        | PhyVersion::Rp002V1_0_4 => Some(with_version(LATEST, version)),
        _ => None,
    }
}

pub(crate) static BANDS: [Option<Band>; 12] = versions!(band);
