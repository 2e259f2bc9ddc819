//! Processing for the CN470 region, which uses a fixed 96 channel plan.

use super::data_rate::{constant, Bandwidth, DataRate, SpreadingFactor};
use super::downgrade::{clip_tx_offsets, disable_cf_list, disable_data_rates, with_version};
use super::*;

const UPLINK_CHANNELS: [Channel; 96] = channels::<96>(470_300_000, 200_000, DR::_0, DR::_5);

const DOWNLINK_CHANNELS: [Channel; 48] = channels::<48>(500_300_000, 200_000, DR::_0, DR::_5);

const BEACON_FREQUENCIES: [u32; 8] = frequencies::<8>(508_300_000, 200_000);

const SUB_BANDS: [SubBand; 1] = [SubBand {
    min_frequency: 470_000_000,
    max_frequency: 510_000_000,
    duty_cycle: 1.0,
    max_eirp: 19.15,
}];

const DATA_RATES: [Option<DataRate>; 16] = [
    Some(DataRate::lora(SpreadingFactor::_12, Bandwidth::_125KHz, constant(59))),
    Some(DataRate::lora(SpreadingFactor::_11, Bandwidth::_125KHz, constant(59))),
    Some(DataRate::lora(SpreadingFactor::_10, Bandwidth::_125KHz, constant(59))),
    Some(DataRate::lora(SpreadingFactor::_9, Bandwidth::_125KHz, constant(123))),
    Some(DataRate::lora(SpreadingFactor::_8, Bandwidth::_125KHz, constant(230))),
    Some(DataRate::lora(SpreadingFactor::_7, Bandwidth::_125KHz, constant(230))),
    Some(DataRate::lora(SpreadingFactor::_7, Bandwidth::_500KHz, constant(230))),
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

const LATEST: Band = Band {
    id: BandId::Cn470510,
    version: PhyVersion::Rp002V1_0_4,
    beacon: Beacon {
        data_rate_index: DR::_2,
        coding_rate: data_rate::CodingRate::_4_5,
        frequencies: &BEACON_FREQUENCIES,
    },
    ping_slot_frequencies: &BEACON_FREQUENCIES,
    max_uplink_channels: 96,
    uplink_channels: &UPLINK_CHANNELS,
    max_downlink_channels: 48,
    downlink_channels: &DOWNLINK_CHANNELS,
    sub_bands: &SUB_BANDS,
    data_rates: DATA_RATES,
    freq_multiplier: 100,
    implements_cf_list: true,
    cf_list_type: CfListType::ChannelMasks,
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
    default_max_eirp: 19.15,
    default_rx2: Rx2Parameters { data_rate_index: DR::_0, frequency: 505_300_000 },
    boot_dwell_time: DwellTime { uplinks: None, downlinks: None },
    rx1_channel: Rx1Channel::Modulo(48),
    rx1_data_rate: Rx1DataRate::Subtract { max_offset: 5, min: DR::_0 },
    ch_mask: ChMaskFamily::NinetySix,
};

const fn band(version: PhyVersion) -> Option<Band> {
    let band = with_version(LATEST, version);
    Some(match version {
        PhyVersion::Rp002V1_0_0
        | PhyVersion::Rp002V1_0_1
        | PhyVersion::Rp002V1_0_2
        | PhyVersion::Rp002V1_0_3
        | PhyVersion::Rp002V1_0_4 => band,
        PhyVersion::V1_1RevA | PhyVersion::V1_1RevB | PhyVersion::V1_0_3RevA => {
            disable_data_rates(band, DR::_6, DR::_7)
        }
        PhyVersion::V1_0_2RevA | PhyVersion::V1_0_2RevB => {
            disable_cf_list(disable_data_rates(band, DR::_6, DR::_7))
        }
        PhyVersion::V1_0 | PhyVersion::V1_0_1 => {
            clip_tx_offsets(disable_cf_list(disable_data_rates(band, DR::_6, DR::_7)), 6)
        }
    })
}

pub(crate) static BANDS: [Option<Band>; 12] = versions!(band);
