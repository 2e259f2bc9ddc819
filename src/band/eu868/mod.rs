//! Processing for the EU868 region, which uses a dynamic channel plan.

use super::channel_plan::ChMaskFamily;
use super::data_rate::{
    constant, Bandwidth, CodingRate, DataRate, LrFhssCodingRate, SpreadingFactor,
};
use super::downgrade::{clip_tx_offsets, disable_data_rates, with_version};
use super::*;

const UPLINK_CHANNELS: [Channel; 3] = [
    Channel::new(868_100_000, DR::_0, DR::_5),
    Channel::new(868_300_000, DR::_0, DR::_5),
    Channel::new(868_500_000, DR::_0, DR::_5),
];

const SUB_BANDS: [SubBand; 6] = [
    SubBand { min_frequency: 863_000_000, max_frequency: 865_000_000, duty_cycle: 0.001, max_eirp: 16.15 },
    SubBand { min_frequency: 865_000_000, max_frequency: 868_000_000, duty_cycle: 0.01, max_eirp: 16.15 },
    SubBand { min_frequency: 868_000_000, max_frequency: 868_600_000, duty_cycle: 0.01, max_eirp: 16.15 },
    SubBand { min_frequency: 868_700_000, max_frequency: 869_200_000, duty_cycle: 0.001, max_eirp: 16.15 },
    SubBand { min_frequency: 869_400_000, max_frequency: 869_650_000, duty_cycle: 0.1, max_eirp: 29.15 },
    SubBand { min_frequency: 869_700_000, max_frequency: 870_000_000, duty_cycle: 0.01, max_eirp: 16.15 },
];

pub(crate) const DATA_RATES: [Option<DataRate>; 16] = [
    Some(DataRate::lora(SpreadingFactor::_12, Bandwidth::_125KHz, constant(59))),
    Some(DataRate::lora(SpreadingFactor::_11, Bandwidth::_125KHz, constant(59))),
    Some(DataRate::lora(SpreadingFactor::_10, Bandwidth::_125KHz, constant(59))),
    Some(DataRate::lora(SpreadingFactor::_9, Bandwidth::_125KHz, constant(123))),
    Some(DataRate::lora(SpreadingFactor::_8, Bandwidth::_125KHz, constant(230))),
    Some(DataRate::lora(SpreadingFactor::_7, Bandwidth::_125KHz, constant(230))),
    Some(DataRate::lora(SpreadingFactor::_7, Bandwidth::_250KHz, constant(230))),
    Some(DataRate::fsk(50_000, constant(230))),
    Some(DataRate::lr_fhss(137_000, LrFhssCodingRate::_1_3, constant(58))),
    Some(DataRate::lr_fhss(137_000, LrFhssCodingRate::_2_3, constant(123))),
    Some(DataRate::lr_fhss(336_000, LrFhssCodingRate::_1_3, constant(58))),
    Some(DataRate::lr_fhss(336_000, LrFhssCodingRate::_2_3, constant(123))),
    None,
    None,
    None,
    None,
];

const RX1_DATA_RATES: &[&[DR]] = &[
    &[DR::_0, DR::_0, DR::_0, DR::_0, DR::_0, DR::_0],
    &[DR::_1, DR::_0, DR::_0, DR::_0, DR::_0, DR::_0],
    &[DR::_2, DR::_1, DR::_0, DR::_0, DR::_0, DR::_0],
    &[DR::_3, DR::_2, DR::_1, DR::_0, DR::_0, DR::_0],
    &[DR::_4, DR::_3, DR::_2, DR::_1, DR::_0, DR::_0],
    &[DR::_5, DR::_4, DR::_3, DR::_2, DR::_1, DR::_0],
    &[DR::_6, DR::_5, DR::_4, DR::_3, DR::_2, DR::_1],
    &[DR::_7, DR::_6, DR::_5, DR::_4, DR::_3, DR::_2],
    &[DR::_1, DR::_0, DR::_0, DR::_0, DR::_0, DR::_0],
    &[DR::_2, DR::_1, DR::_0, DR::_0, DR::_0, DR::_0],
    &[DR::_1, DR::_0, DR::_0, DR::_0, DR::_0, DR::_0],
    &[DR::_2, DR::_1, DR::_0, DR::_0, DR::_0, DR::_0],
];

pub(crate) const TX_OFFSETS: [f32; 8] = [0.0, -2.0, -4.0, -6.0, -8.0, -10.0, -12.0, -14.0];

const BEACON_FREQUENCIES: [u32; 1] = [869_525_000];

const LATEST: Band = Band {
    id: BandId::Eu863870,
    version: PhyVersion::Rp002V1_0_4,
    beacon: Beacon {
        data_rate_index: DR::_3,
        coding_rate: CodingRate::_4_5,
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
    default_max_eirp: 16.15,
    default_rx2: Rx2Parameters { data_rate_index: DR::_0, frequency: 869_525_000 },
    boot_dwell_time: DwellTime { uplinks: None, downlinks: None },
    rx1_channel: Rx1Channel::Identity,
    rx1_data_rate: Rx1DataRate::Table(RX1_DATA_RATES),
    ch_mask: ChMaskFamily::Sixteen,
};

const fn band(version: PhyVersion) -> Option<Band> {
    let band = with_version(LATEST, version);
    Some(match version {
        PhyVersion::Rp002V1_0_2 | PhyVersion::Rp002V1_0_3 | PhyVersion::Rp002V1_0_4 => band,
        PhyVersion::V1_0_2RevB
        | PhyVersion::V1_1RevA
        | PhyVersion::V1_1RevB
        | PhyVersion::V1_0_3RevA
        | PhyVersion::Rp002V1_0_0
        | PhyVersion::Rp002V1_0_1 => disable_data_rates(band, DR::_8, DR::_11),
        PhyVersion::V1_0 | PhyVersion::V1_0_1 | PhyVersion::V1_0_2RevA => {
            clip_tx_offsets(disable_data_rates(band, DR::_8, DR::_11), 6)
        }
    })
}

pub(crate) static BANDS: [Option<Band>; 12] = versions!(band);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rx1_data_rate_saturates_at_dr0() {
        let band = get_latest(BandId::Eu863870).unwrap();
        assert_eq!(band.rx1_data_rate(DR::_5, 2, false), Ok(DR::_3));
        assert_eq!(band.rx1_data_rate(DR::_1, 5, false), Ok(DR::_0));
        assert_eq!(band.rx1_data_rate(DR::_9, 1, false), Ok(DR::_1));
        assert_eq!(
            band.rx1_data_rate(DR::_5, 6, false),
            Err(Error::DataRateOffsetTooHigh { offset: 6, max: 5 })
        );
        assert_eq!(
            band.rx1_data_rate(DR::_12, 0, false),
            Err(Error::DataRateIndexTooHigh { index: DR::_12, max: DR::_11 })
        );
    }

    #[test]
    fn older_versions_lack_lr_fhss() {
        let band = get(BandId::Eu863870, PhyVersion::V1_0_2RevB).unwrap();
        assert!(band.data_rate(DR::_8).is_none());
        assert_eq!(band.tx_offsets.len(), 8);
        let band = get(BandId::Eu863870, PhyVersion::V1_0).unwrap();
        assert_eq!(band.tx_offsets.len(), 6);
    }

    #[test]
    fn sub_band_lookup() {
        let band = get_latest(BandId::Eu863870).unwrap();
        assert_eq!(band.find_sub_band(869_525_000).map(|sb| sb.duty_cycle), Some(0.1));
        assert_eq!(band.find_sub_band(868_100_000).map(|sb| sb.duty_cycle), Some(0.01));
        assert!(band.find_sub_band(869_300_000).is_none());
    }
}
