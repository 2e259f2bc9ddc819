use lorawan_codec::band::{all, get, get_latest, supported_versions, BandId, PhyVersion};
use lorawan_codec::frequency::{Frequency, MIN_FREQUENCY};
use lorawan_codec::types::DR;

#[test]
fn latest_record_matches_latest_version() {
    for id in BandId::ALL {
        let band = get_latest(*id).unwrap();
        assert_eq!(band.id, *id);
        assert_eq!(band.version, id.latest_version());
        assert_eq!(supported_versions(*id).last(), Some(id.latest_version()));
    }
}

#[test]
fn every_supported_version_resolves() {
    for id in BandId::ALL {
        let versions: Vec<PhyVersion> = supported_versions(*id).collect();
        assert!(versions.windows(2).all(|w| w[0] < w[1]), "{} versions out of order", id);
        for version in versions {
            let band = get(*id, version).unwrap();
            assert_eq!((band.id, band.version), (*id, version));
        }
    }
}

#[test]
fn default_channels_are_encodable_and_in_a_sub_band() {
    for band in all() {
        assert!(band.freq_multiplier == 100 || band.freq_multiplier == 200);
        assert!(band.uplink_channels.len() <= usize::from(band.max_uplink_channels));
        for ch in band.uplink_channels.iter().chain(band.downlink_channels) {
            assert!(ch.frequency >= MIN_FREQUENCY);
            let packed = Frequency::from_hz(ch.frequency, band.freq_multiplier).unwrap();
            assert_eq!(packed.hz(band.freq_multiplier), ch.frequency, "{} {}", band.id, ch.frequency);
            assert!(band.find_sub_band(ch.frequency).is_some(), "{} {}", band.id, ch.frequency);
        }
    }
}

#[test]
fn data_rate_lookups_are_consistent() {
    for band in all() {
        assert!(band.data_rate(DR::_0).is_some(), "{} has no DR0", band.id);
        for dr in DR::ALL {
            let Some(rate) = band.data_rate(dr) else { continue };
            let (up, _) = band.find_uplink_data_rate(rate).unwrap();
            let (down, _) = band.find_downlink_data_rate(rate).unwrap();
            assert!(up <= dr && dr <= down);
        }
    }
}

#[test]
fn tx_power_offsets_decrease() {
    for band in all() {
        assert_eq!(band.tx_offsets.first(), Some(&0.0), "{}", band.id);
        assert!(band.tx_offsets.windows(2).all(|w| w[1] < w[0]), "{}", band.id);
    }
}

#[test]
fn older_versions_differ_only_where_downgraded() {
    let latest = get_latest(BandId::Eu863870).unwrap();
    let oldest = get(BandId::Eu863870, PhyVersion::V1_0).unwrap();
    assert_eq!(latest.uplink_channels, oldest.uplink_channels);
    assert_eq!(latest.freq_multiplier, oldest.freq_multiplier);
    assert!(oldest.tx_offsets.len() <= latest.tx_offsets.len());
}
