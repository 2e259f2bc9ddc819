//! Processing for the AU915 region, which uses a fixed 72 channel plan.

use super::data_rate::{
    constant, dwell_dependent, Bandwidth, DataRate, LrFhssCodingRate, SpreadingFactor,
};
use super::downgrade::{
    clip_tx_offsets, disable_cf_list, disable_ch_mask_cntl5, disable_data_rates,
    disable_tx_param_setup_req, with_version,
};
use super::*;

const UPLINK_CHANNELS: [Channel; 72] =
    channels_72(915_200_000, (DR::_0, DR::_5), 915_900_000, (DR::_6, DR::_6));

const DOWNLINK_CHANNELS: [Channel; 8] = channels::<8>(923_300_000, 600_000, DR::_8, DR::_13);

const DOWNLINK_FREQUENCIES: [u32; 8] = frequencies::<8>(923_300_000, 600_000);

const SUB_BANDS: [SubBand; 1] = [SubBand {
    min_frequency: 915_000_000,
    max_frequency: 928_000_000,
    duty_cycle: 1.0,
    max_eirp: 30.0,
}];

const DATA_RATES: [Option<DataRate>; 16] = [
    Some(DataRate::lora(SpreadingFactor::_12, Bandwidth::_125KHz, dwell_dependent(59, 0))),
    Some(DataRate::lora(SpreadingFactor::_11, Bandwidth::_125KHz, dwell_dependent(59, 0))),
    Some(DataRate::lora(SpreadingFactor::_10, Bandwidth::_125KHz, dwell_dependent(59, 19))),
    Some(DataRate::lora(SpreadingFactor::_9, Bandwidth::_125KHz, dwell_dependent(123, 61))),
    Some(DataRate::lora(SpreadingFactor::_8, Bandwidth::_125KHz, dwell_dependent(230, 133))),
    Some(DataRate::lora(SpreadingFactor::_7, Bandwidth::_125KHz, constant(230))),
    Some(DataRate::lora(SpreadingFactor::_8, Bandwidth::_500KHz, constant(230))),
    Some(DataRate::lr_fhss(1_523_000, LrFhssCodingRate::_1_3, dwell_dependent(58, 0))),
    Some(DataRate::lora(SpreadingFactor::_12, Bandwidth::_500KHz, constant(61))),
    Some(DataRate::lora(SpreadingFactor::_11, Bandwidth::_500KHz, constant(137))),
    Some(DataRate::lora(SpreadingFactor::_10, Bandwidth::_500KHz, constant(250))),
    Some(DataRate::lora(SpreadingFactor::_9, Bandwidth::_500KHz, constant(250))),
    Some(DataRate::lora(SpreadingFactor::_8, Bandwidth::_500KHz, constant(250))),
    Some(DataRate::lora(SpreadingFactor::_7, Bandwidth::_500KHz, constant(250))),
    None,
    None,
];

const RX1_DATA_RATES: &[&[DR]] = &[
    &[DR::_8, DR::_8, DR::_8, DR::_8, DR::_8, DR::_8],
    &[DR::_9, DR::_8, DR::_8, DR::_8, DR::_8, DR::_8],
    &[DR::_10, DR::_9, DR::_8, DR::_8, DR::_8, DR::_8],
    &[DR::_11, DR::_10, DR::_9, DR::_8, DR::_8, DR::_8],
    &[DR::_12, DR::_11, DR::_10, DR::_9, DR::_8, DR::_8],
    &[DR::_13, DR::_12, DR::_11, DR::_10, DR::_9, DR::_8],
    &[DR::_13, DR::_13, DR::_12, DR::_11, DR::_10, DR::_9],
    &[DR::_9, DR::_8, DR::_8, DR::_8, DR::_8, DR::_8],
];

const LATEST: Band = Band {
    id: BandId::Au915928,
    version: PhyVersion::Rp002V1_0_4,
    beacon: Beacon {
        data_rate_index: DR::_8,
        coding_rate: data_rate::CodingRate::_4_5,
        frequencies: &DOWNLINK_FREQUENCIES,
    },
    ping_slot_frequencies: &DOWNLINK_FREQUENCIES,
    max_uplink_channels: 72,
    uplink_channels: &UPLINK_CHANNELS,
    max_downlink_channels: 8,
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
    tx_offsets: &us915::TX_OFFSETS,
    max_adr_data_rate_index: DR::_5,
    strict_coding_rate: true,
    tx_param_setup_req_support: true,
    default_max_eirp: 30.0,
    default_rx2: Rx2Parameters { data_rate_index: DR::_8, frequency: 923_300_000 },
    boot_dwell_time: DwellTime { uplinks: Some(true), downlinks: Some(false) },
    rx1_channel: Rx1Channel::Modulo(8),
    rx1_data_rate: Rx1DataRate::Table(RX1_DATA_RATES),
    ch_mask: ChMaskFamily::SeventyTwo { cntl5: true },
};

const fn band(version: PhyVersion) -> Option<Band> {
    let band = with_version(LATEST, version);
    Some(match version {
        PhyVersion::V1_0 => return None,
        PhyVersion::Rp002V1_0_2 | PhyVersion::Rp002V1_0_3 | PhyVersion::Rp002V1_0_4 => band,
        PhyVersion::V1_0_3RevA | PhyVersion::Rp002V1_0_0 | PhyVersion::Rp002V1_0_1 => {
            disable_data_rates(band, DR::_7, DR::_7)
        }
        PhyVersion::V1_1RevA | PhyVersion::V1_1RevB => {
            disable_tx_param_setup_req(disable_data_rates(band, DR::_7, DR::_7))
        }
        PhyVersion::V1_0_2RevB => disable_cf_list(disable_tx_param_setup_req(
            disable_data_rates(band, DR::_7, DR::_7),
        )),
        PhyVersion::V1_0_2RevA => disable_ch_mask_cntl5(disable_cf_list(
            disable_tx_param_setup_req(disable_data_rates(band, DR::_7, DR::_7)),
        )),
        PhyVersion::V1_0_1 => clip_tx_offsets(
            disable_ch_mask_cntl5(disable_cf_list(disable_tx_param_setup_req(
                disable_data_rates(band, DR::_7, DR::_7),
            ))),
            11,
        ),
    })
}

pub(crate) static BANDS: [Option<Band>; 12] = versions!(band);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dwell_time_limits_payload_size() {
        let band = get_latest(BandId::Au915928).unwrap();
        assert_eq!(band.max_mac_payload_size(DR::_2, false), Some(59));
        assert_eq!(band.max_mac_payload_size(DR::_2, true), Some(19));
        assert_eq!(band.max_mac_payload_size(DR::_14, true), None);
    }

    #[test]
    fn not_defined_before_1_0_1() {
        assert!(get(BandId::Au915928, PhyVersion::V1_0).is_err());
        let band = get(BandId::Au915928, PhyVersion::V1_0_2RevB).unwrap();
        assert!(!band.tx_param_setup_req_support);
        assert!(band.data_rate(DR::_7).is_none());
        assert!(get_latest(BandId::Au915928).unwrap().tx_param_setup_req_support);
    }

    #[test]
    fn uplink_data_rate_maps_from_us915() {
        let us = get_latest(BandId::Us902928).unwrap();
        let au = get_latest(BandId::Au915928).unwrap();
        assert_eq!(map_data_rate_index(us, DR::_4, au), Ok(DR::_6));
        assert_eq!(map_data_rate_index(us, DR::_8, au), Ok(DR::_8));
    }
}
