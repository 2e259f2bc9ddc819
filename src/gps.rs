//! Conversion between wall-clock instants and GPS time, as carried by DeviceTimeAns and the
//! class B beacon.

use core::time::Duration;

use chrono::{DateTime, Utc};

/// 1980-01-06T00:00:00Z as a Unix timestamp.
pub const GPS_EPOCH_UNIX: i64 = 315_964_800;

/// Unix timestamps at which a leap second had been inserted, up to 2017-01-01.
const LEAP_SECONDS: [i64; 18] = [
    362_793_600,
    394_329_600,
    425_865_600,
    489_024_000,
    567_993_600,
    631_152_000,
    662_688_000,
    709_948_800,
    741_484_800,
    773_020_800,
    820_454_400,
    867_715_200,
    915_148_800,
    1_136_073_600,
    1_230_768_000,
    1_341_100_800,
    1_435_708_800,
    1_483_228_800,
];

/// Time elapsed since the GPS epoch at `time`, leap seconds included.
///
/// Returns `None` before the epoch.
pub fn to_gps(time: DateTime<Utc>) -> Option<Duration> {
    let unix = time.timestamp();
    if unix < GPS_EPOCH_UNIX {
        return None;
    }
    let leaps = LEAP_SECONDS.iter().filter(|&&leap| leap <= unix).count() as i64;
    let secs = u64::try_from(unix - GPS_EPOCH_UNIX + leaps).ok()?;
    Some(Duration::new(secs, time.timestamp_subsec_nanos()))
}

/// Wall-clock instant of a GPS time.
pub fn from_gps(gps: Duration) -> Option<DateTime<Utc>> {
    let secs = i64::try_from(gps.as_secs()).ok()?;
    let leaps = LEAP_SECONDS
        .iter()
        .enumerate()
        .filter(|&(i, &leap)| leap - GPS_EPOCH_UNIX + i as i64 + 1 <= secs)
        .count() as i64;
    let unix = secs.checked_add(GPS_EPOCH_UNIX)? - leaps;
    DateTime::<Utc>::from_timestamp(unix, gps.subsec_nanos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_zero() {
        let epoch = DateTime::<Utc>::from_timestamp(GPS_EPOCH_UNIX, 0).unwrap();
        assert_eq!(to_gps(epoch), Some(Duration::ZERO));
        assert_eq!(from_gps(Duration::ZERO), Some(epoch));
        let before = DateTime::<Utc>::from_timestamp(GPS_EPOCH_UNIX - 1, 0).unwrap();
        assert_eq!(to_gps(before), None);
    }

    #[test]
    fn eighteen_leap_seconds_since_2017() {
        // 2020-01-01T00:00:00Z
        let time = DateTime::<Utc>::from_timestamp(1_577_836_800, 500_000_000).unwrap();
        let gps = to_gps(time).unwrap();
        assert_eq!(gps, Duration::new(1_577_836_800 - 315_964_800 + 18, 500_000_000));
        assert_eq!(from_gps(gps), Some(time));
    }

    #[test]
    fn around_a_leap_second() {
        let leap = LEAP_SECONDS[17];
        for unix in [leap - 2, leap - 1, leap, leap + 1] {
            let time = DateTime::<Utc>::from_timestamp(unix, 0).unwrap();
            assert_eq!(from_gps(to_gps(time).unwrap()), Some(time));
        }
    }
}
