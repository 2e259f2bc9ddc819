//! Processing for the IN865 region.

use super::data_rate::{constant, Bandwidth, DataRate, SpreadingFactor};
use super::downgrade::{set_beacon_data_rate, with_version};
use super::*;

const UPLINK_CHANNELS: [Channel; 3] = [
    Channel::new(865_062_500, DR::_0, DR::_5),
    Channel::new(865_402_500, DR::_0, DR::_5),
    Channel::new(865_985_000, DR::_0, DR::_5),
];

const SUB_BANDS: [SubBand; 1] = [SubBand {
    min_frequency: 865_000_000,
    max_frequency: 867_000_000,
    duty_cycle: 1.0,
    max_eirp: 30.0,
}];

const DATA_RATES: [Option<DataRate>; 16] = [
    Some(DataRate::lora(SpreadingFactor::_12, Bandwidth::_125KHz, constant(59))),
    Some(DataRate::lora(SpreadingFactor::_11, Bandwidth::_125KHz, constant(59))),
    Some(DataRate::lora(SpreadingFactor::_10, Bandwidth::_125KHz, constant(59))),
    Some(DataRate::lora(SpreadingFactor::_9, Bandwidth::_125KHz, constant(123))),
    Some(DataRate::lora(SpreadingFactor::_8, Bandwidth::_125KHz, constant(230))),
    Some(DataRate::lora(SpreadingFactor::_7, Bandwidth::_125KHz, constant(230))),
    None,
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

const TX_OFFSETS: [f32; 11] =
    [0.0, -2.0, -4.0, -6.0, -8.0, -10.0, -12.0, -14.0, -16.0, -18.0, -20.0];

const BEACON_FREQUENCIES: [u32; 1] = [866_550_000];

const LATEST: Band = Band {
    id: BandId::In865867,
    version: PhyVersion::Rp002V1_0_4,
    beacon: Beacon {
        data_rate_index: DR::_4,
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
    default_max_eirp: 30.0,
    default_rx2: Rx2Parameters { data_rate_index: DR::_2, frequency: 866_550_000 },
    boot_dwell_time: DwellTime { uplinks: None, downlinks: None },
    rx1_channel: Rx1Channel::Identity,
    rx1_data_rate: Rx1DataRate::Effective { min: DR::_0, dwell_time_min: DR::_0, max: DR::_5 },
    ch_mask: ChMaskFamily::Sixteen,
};

/// The band appeared in 1.0.2-b. Until 1.0.3-a its beacon used DR5.
const fn band(version: PhyVersion) -> Option<Band> {
    let band = with_version(LATEST, version);
    match version {
        PhyVersion::V1_0 | PhyVersion::V1_0_1 | PhyVersion::V1_0_2RevA => None,
        PhyVersion::V1_0_2RevB | PhyVersion::V1_1RevA | PhyVersion::V1_1RevB => {
            Some(set_beacon_data_rate(band, DR::_5))
        }
        _ => Some(band),
    }
}

pub(crate) static BANDS: [Option<Band>; 12] = versions!(band);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rx1_skips_the_undefined_data_rate() {
        let band = get_latest(BandId::In865867).unwrap();
        assert_eq!(band.rx1_data_rate(DR::_5, 0, false), Ok(DR::_5));
        assert_eq!(band.rx1_data_rate(DR::_4, 6, false), Ok(DR::_5));
        assert_eq!(band.rx1_data_rate(DR::_7, 0, false), Ok(DR::_5));
    }

    #[test]
    fn beacon_data_rate_by_version() {
        assert_eq!(get_latest(BandId::In865867).unwrap().beacon.data_rate_index, DR::_4);
        let old = get(BandId::In865867, PhyVersion::V1_1RevB).unwrap();
        assert_eq!(old.beacon.data_rate_index, DR::_5);
    }
}
