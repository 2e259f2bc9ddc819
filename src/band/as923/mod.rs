//! Processing for the AS923 regions. Groups 2 to 4 shift every group 1 frequency by a fixed
//! offset.

use super::data_rate::{constant, dwell_dependent, Bandwidth, DataRate, SpreadingFactor};
use super::downgrade::{disable_tx_param_setup_req, with_version};
use super::*;

const GROUP_2_OFFSET: i32 = -1_800_000;
const GROUP_3_OFFSET: i32 = -6_600_000;
const GROUP_4_OFFSET: i32 = -5_900_000;

const fn shift(frequency: u32, offset: i32) -> u32 {
    frequency.wrapping_add_signed(offset)
}

const fn uplink_channels(offset: i32) -> [Channel; 2] {
    [
        Channel::new(shift(923_200_000, offset), DR::_0, DR::_5),
        Channel::new(shift(923_400_000, offset), DR::_0, DR::_5),
    ]
}

const CHANNELS_1: [Channel; 2] = uplink_channels(0);
const CHANNELS_2: [Channel; 2] = uplink_channels(GROUP_2_OFFSET);
const CHANNELS_3: [Channel; 2] = uplink_channels(GROUP_3_OFFSET);
const CHANNELS_4: [Channel; 2] = uplink_channels(GROUP_4_OFFSET);

const BEACON_1: [u32; 1] = [923_400_000];
const BEACON_2: [u32; 1] = [shift(923_400_000, GROUP_2_OFFSET)];
const BEACON_3: [u32; 1] = [shift(923_400_000, GROUP_3_OFFSET)];
const BEACON_4: [u32; 1] = [shift(923_400_000, GROUP_4_OFFSET)];

const SUB_BANDS: [SubBand; 1] = [SubBand {
    min_frequency: 915_000_000,
    max_frequency: 928_000_000,
    duty_cycle: 0.01,
    max_eirp: 16.15,
}];

const DATA_RATES: [Option<DataRate>; 16] = [
    Some(DataRate::lora(SpreadingFactor::_12, Bandwidth::_125KHz, dwell_dependent(59, 0))),
    Some(DataRate::lora(SpreadingFactor::_11, Bandwidth::_125KHz, dwell_dependent(59, 0))),
    Some(DataRate::lora(SpreadingFactor::_10, Bandwidth::_125KHz, dwell_dependent(59, 19))),
    Some(DataRate::lora(SpreadingFactor::_9, Bandwidth::_125KHz, dwell_dependent(123, 61))),
    Some(DataRate::lora(SpreadingFactor::_8, Bandwidth::_125KHz, dwell_dependent(230, 133))),
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

const fn latest(
    id: BandId,
    channels: &'static [Channel],
    beacon: &'static [u32],
    offset: i32,
) -> Band {
    Band {
        id,
        version: PhyVersion::Rp002V1_0_4,
        beacon: Beacon {
            data_rate_index: DR::_3,
            coding_rate: data_rate::CodingRate::_4_5,
            frequencies: beacon,
        },
        ping_slot_frequencies: beacon,
        max_uplink_channels: 16,
        uplink_channels: channels,
        max_downlink_channels: 16,
        downlink_channels: channels,
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
        tx_offsets: &eu868::TX_OFFSETS,
        max_adr_data_rate_index: DR::_5,
        strict_coding_rate: true,
        tx_param_setup_req_support: true,
        default_max_eirp: 16.15,
        default_rx2: Rx2Parameters {
            data_rate_index: DR::_2,
            frequency: shift(923_200_000, offset),
        },
        boot_dwell_time: DwellTime { uplinks: Some(true), downlinks: Some(true) },
        rx1_channel: Rx1Channel::Identity,
        rx1_data_rate: Rx1DataRate::Effective { min: DR::_0, dwell_time_min: DR::_2, max: DR::_5 },
        ch_mask: ChMaskFamily::Sixteen,
    }
}

const LATEST_1: Band = latest(BandId::As923, &CHANNELS_1, &BEACON_1, 0);
const LATEST_2: Band = latest(BandId::As923_2, &CHANNELS_2, &BEACON_2, GROUP_2_OFFSET);
const LATEST_3: Band = latest(BandId::As923_3, &CHANNELS_3, &BEACON_3, GROUP_3_OFFSET);
const LATEST_4: Band = latest(BandId::As923_4, &CHANNELS_4, &BEACON_4, GROUP_4_OFFSET);

/// Group 1 predates TxParamSetupReq in 1.0.1 and 1.0.2-a.
const fn group_1(version: PhyVersion) -> Option<Band> {
    let band = with_version(LATEST_1, version);
    match version {
        PhyVersion::V1_0 => None,
        PhyVersion::V1_0_1 | PhyVersion::V1_0_2RevA => Some(disable_tx_param_setup_req(band)),
        _ => Some(band),
    }
}

const fn offset_group(band: Band, version: PhyVersion) -> Option<Band> {
    match version {
        PhyVersion::V1_0 | PhyVersion::V1_0_1 | PhyVersion::V1_0_2RevA => None,
        _ => Some(with_version(band, version)),
    }
}

const fn group_2(version: PhyVersion) -> Option<Band> {
    offset_group(LATEST_2, version)
}

const fn group_3(version: PhyVersion) -> Option<Band> {
    offset_group(LATEST_3, version)
}

const fn group_4(version: PhyVersion) -> Option<Band> {
    offset_group(LATEST_4, version)
}

pub(crate) static BANDS_1: [Option<Band>; 12] = versions!(group_1);
pub(crate) static BANDS_2: [Option<Band>; 12] = versions!(group_2);
pub(crate) static BANDS_3: [Option<Band>; 12] = versions!(group_3);
pub(crate) static BANDS_4: [Option<Band>; 12] = versions!(group_4);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_are_shifted() {
        let band = get_latest(BandId::As923_2).unwrap();
        assert_eq!(band.uplink_channels[0].frequency, 921_400_000);
        assert_eq!(band.default_rx2.frequency, 921_400_000);
        assert_eq!(band.beacon.frequencies, &[921_600_000]);
        let band = get_latest(BandId::As923_3).unwrap();
        assert_eq!(band.uplink_channels[1].frequency, 916_800_000);
        let band = get_latest(BandId::As923_4).unwrap();
        assert_eq!(band.uplink_channels[0].frequency, 917_300_000);
        assert!(get(BandId::As923_4, PhyVersion::V1_0_2RevA).is_err());
        assert!(get(BandId::As923, PhyVersion::V1_0_2RevA).is_ok());
    }

    #[test]
    fn effective_rx1_offsets() {
        let band = get_latest(BandId::As923).unwrap();
        assert_eq!(band.rx1_data_rate(DR::_3, 1, false), Ok(DR::_2));
        assert_eq!(band.rx1_data_rate(DR::_3, 6, false), Ok(DR::_4));
        assert_eq!(band.rx1_data_rate(DR::_5, 7, false), Ok(DR::_5));
        assert_eq!(band.rx1_data_rate(DR::_1, 1, true), Ok(DR::_2));
        assert_eq!(band.rx1_data_rate(DR::_1, 1, false), Ok(DR::_0));
        assert_eq!(
            band.rx1_data_rate(DR::_1, 8, false),
            Err(Error::DataRateOffsetTooHigh { offset: 8, max: 7 })
        );
    }
}
