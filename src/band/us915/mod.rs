//! Processing for the US915 region, which uses a fixed 72 channel plan.

use super::data_rate::{constant, Bandwidth, DataRate, LrFhssCodingRate, SpreadingFactor};
use super::downgrade::{
    clip_tx_offsets, disable_cf_list, disable_ch_mask_cntl5, disable_data_rates, with_version,
};
use super::*;

const UPLINK_CHANNELS: [Channel; 72] =
    channels_72(902_300_000, (DR::_0, DR::_3), 903_000_000, (DR::_4, DR::_4));

const DOWNLINK_CHANNELS: [Channel; 8] = channels::<8>(923_300_000, 600_000, DR::_8, DR::_13);

const DOWNLINK_FREQUENCIES: [u32; 8] = frequencies::<8>(923_300_000, 600_000);

const SUB_BANDS: [SubBand; 1] = [SubBand {
    min_frequency: 902_000_000,
    max_frequency: 928_000_000,
    duty_cycle: 1.0,
    max_eirp: 30.0,
}];

const DATA_RATES: [Option<DataRate>; 16] = [
    Some(DataRate::lora(SpreadingFactor::_10, Bandwidth::_125KHz, constant(19))),
    Some(DataRate::lora(SpreadingFactor::_9, Bandwidth::_125KHz, constant(61))),
    Some(DataRate::lora(SpreadingFactor::_8, Bandwidth::_125KHz, constant(133))),
    Some(DataRate::lora(SpreadingFactor::_7, Bandwidth::_125KHz, constant(250))),
    Some(DataRate::lora(SpreadingFactor::_8, Bandwidth::_500KHz, constant(250))),
    Some(DataRate::lr_fhss(1_523_000, LrFhssCodingRate::_1_3, constant(58))),
    Some(DataRate::lr_fhss(1_523_000, LrFhssCodingRate::_2_3, constant(133))),
    None,
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
    &[DR::_10, DR::_9, DR::_8, DR::_8],
    &[DR::_11, DR::_10, DR::_9, DR::_8],
    &[DR::_12, DR::_11, DR::_10, DR::_9],
    &[DR::_13, DR::_12, DR::_11, DR::_10],
    &[DR::_13, DR::_13, DR::_12, DR::_11],
    &[DR::_10, DR::_9, DR::_8, DR::_8],
    &[DR::_11, DR::_10, DR::_9, DR::_8],
];

pub(crate) const TX_OFFSETS: [f32; 15] = [
    0.0, -2.0, -4.0, -6.0, -8.0, -10.0, -12.0, -14.0, -16.0, -18.0, -20.0, -22.0, -24.0, -26.0,
    -28.0,
];

const LATEST: Band = Band {
    id: BandId::Us902928,
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
    tx_offsets: &TX_OFFSETS,
    max_adr_data_rate_index: DR::_3,
    strict_coding_rate: true,
    tx_param_setup_req_support: false,
    default_max_eirp: 30.0,
    default_rx2: Rx2Parameters { data_rate_index: DR::_8, frequency: 923_300_000 },
    boot_dwell_time: DwellTime { uplinks: None, downlinks: None },
    rx1_channel: Rx1Channel::Modulo(8),
    rx1_data_rate: Rx1DataRate::Table(RX1_DATA_RATES),
    ch_mask: ChMaskFamily::SeventyTwo { cntl5: true },
};

const fn band(version: PhyVersion) -> Option<Band> {
    let band = with_version(LATEST, version);
    Some(match version {
        PhyVersion::Rp002V1_0_2 | PhyVersion::Rp002V1_0_3 | PhyVersion::Rp002V1_0_4 => band,
        PhyVersion::V1_1RevA
        | PhyVersion::V1_1RevB
        | PhyVersion::V1_0_3RevA
        | PhyVersion::Rp002V1_0_0
        | PhyVersion::Rp002V1_0_1 => disable_data_rates(band, DR::_5, DR::_6),
        PhyVersion::V1_0_2RevB => disable_cf_list(disable_data_rates(band, DR::_5, DR::_6)),
        PhyVersion::V1_0_2RevA => {
            disable_ch_mask_cntl5(disable_cf_list(disable_data_rates(band, DR::_5, DR::_6)))
        }
        PhyVersion::V1_0 | PhyVersion::V1_0_1 => clip_tx_offsets(
            disable_ch_mask_cntl5(disable_cf_list(disable_data_rates(band, DR::_5, DR::_6))),
            11,
        ),
    })
}

pub(crate) static BANDS: [Option<Band>; 12] = versions!(band);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::data_rate::{CodingRate, Modulation};

    #[test]
    fn same_modulation_at_two_indices() {
        let band = get_latest(BandId::Us902928).unwrap();
        let rate = DataRate::lora(SpreadingFactor::_8, Bandwidth::_500KHz, constant(0));
        assert_eq!(band.find_uplink_data_rate(&rate).map(|(dr, _)| dr), Some(DR::_4));
        assert_eq!(band.find_downlink_data_rate(&rate).map(|(dr, _)| dr), Some(DR::_12));
        let missing = DataRate::lora(SpreadingFactor::_12, Bandwidth::_125KHz, constant(0));
        assert!(band.find_uplink_data_rate(&missing).is_none());
    }

    #[test]
    fn rx1_from_table() {
        let band = get_latest(BandId::Us902928).unwrap();
        assert_eq!(band.rx1_data_rate(DR::_0, 0, false), Ok(DR::_10));
        assert_eq!(band.rx1_data_rate(DR::_4, 3, false), Ok(DR::_11));
        assert_eq!(
            band.rx1_data_rate(DR::_1, 4, false),
            Err(Error::DataRateOffsetTooHigh { offset: 4, max: 3 })
        );
    }

    #[test]
    fn default_channels() {
        let band = get_latest(BandId::Us902928).unwrap();
        assert_eq!(band.uplink_channels.len(), 72);
        assert_eq!(band.uplink_channels[63].frequency, 914_900_000);
        assert_eq!(band.uplink_channels[64].frequency, 903_000_000);
        assert_eq!(band.uplink_channels[71].frequency, 914_200_000);
        assert_eq!(band.downlink_channels[7].frequency, 927_500_000);
        assert!(matches!(
            band.data_rate(DR::_8).map(|r| r.modulation),
            Some(Modulation::Lora { coding_rate: CodingRate::_4_5, .. })
        ));
    }
}
