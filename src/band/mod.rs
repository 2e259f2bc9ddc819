//! Regional parameters of every supported band at every supported PHY version.
//!
//! Each band is defined once at its latest PHY version. Older versions are derived from it
//! with the value-level transformations in [`downgrade`], and the whole catalog is
//! compile-time data.

use core::fmt;
use core::str::FromStr;
use core::time::Duration;

use crate::channel_mask::ChMask16;
use crate::types::DR;

use self::channel_plan::{ChMaskCntlPairs, ChMaskFamily, ChMaskUpdate};
use self::data_rate::{CodingRate, DataRate};

pub mod channel_plan;
pub mod data_rate;
pub mod downgrade;

mod as923;
mod au915;
mod cn470;
mod cn779;
mod eu433;
mod eu868;
mod in865;
mod ism2400;
mod kr920;
mod ru864;
mod us915;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum Error {
    #[error("band {id} is not defined for PHY version {version}")]
    BandNotFound { id: BandId, version: PhyVersion },
    #[error("unknown band identifier")]
    UnknownBandId,
    #[error("unknown PHY version")]
    UnknownPhyVersion,
    #[error("data rate {index} not found")]
    DataRateNotFound { index: DR },
    #[error("data rate {index} too high, maximum is {max}")]
    DataRateIndexTooHigh { index: DR, max: DR },
    #[error("data rate offset {offset} too high, maximum is {max}")]
    DataRateOffsetTooHigh { offset: u8, max: u8 },
}

macro_rules! band_ids {
    ($( $(#[$outer:meta])* $name:ident = $tag:literal => $latest:ident, )*) => {
        /// Frequency plan family.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum BandId {
            $( $(#[$outer])* #[cfg_attr(feature = "serde", serde(rename = $tag))] $name, )*
        }

        impl BandId {
            /// Every band, in catalog order.
            pub const ALL: &'static [BandId] = &[$( BandId::$name, )*];

            /// Region tag, e.g. `EU_863_870`.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $( BandId::$name => $tag, )*
                }
            }

            /// Most recent PHY version defined for the band.
            pub const fn latest_version(&self) -> PhyVersion {
                match self {
                    $( BandId::$name => PhyVersion::$latest, )*
                }
            }
        }

        impl FromStr for BandId {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $tag => Ok(BandId::$name), )*
                    _ => Err(Error::UnknownBandId),
                }
            }
        }
    };
}

band_ids! {
    /// Europe 863-870 MHz.
    Eu863870 = "EU_863_870" => Rp002V1_0_4,
    /// United States 902-928 MHz.
    Us902928 = "US_902_928" => Rp002V1_0_4,
    /// Australia 915-928 MHz.
    Au915928 = "AU_915_928" => Rp002V1_0_4,
    /// Asia 923 MHz, group 1.
    As923 = "AS_923" => Rp002V1_0_4,
    /// Asia 923 MHz, group 2 (-1.8 MHz).
    As923_2 = "AS_923_2" => Rp002V1_0_4,
    /// Asia 923 MHz, group 3 (-6.6 MHz).
    As923_3 = "AS_923_3" => Rp002V1_0_4,
    /// Asia 923 MHz, group 4 (-5.9 MHz).
    As923_4 = "AS_923_4" => Rp002V1_0_4,
    /// China 470-510 MHz.
    Cn470510 = "CN_470_510" => Rp002V1_0_4,
    /// China 779-787 MHz.
    Cn779787 = "CN_779_787" => Rp002V1_0_4,
    /// Europe 433 MHz.
    Eu433 = "EU_433" => Rp002V1_0_4,
    /// India 865-867 MHz.
    In865867 = "IN_865_867" => Rp002V1_0_4,
    /// South Korea 920-923 MHz.
    Kr920923 = "KR_920_923" => Rp002V1_0_4,
    /// Russia 864-870 MHz.
    Ru864870 = "RU_864_870" => Rp002V1_0_4,
    /// 2.4 GHz ISM band.
    Ism2400 = "ISM_2400" => Rp002V1_0_4,
}

impl fmt::Display for BandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Version of the regional parameters document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum PhyVersion {
    V1_0,
    V1_0_1,
    V1_0_2RevA,
    V1_0_2RevB,
    V1_1RevA,
    V1_1RevB,
    V1_0_3RevA,
    Rp002V1_0_0,
    Rp002V1_0_1,
    Rp002V1_0_2,
    Rp002V1_0_3,
    Rp002V1_0_4,
}

impl PhyVersion {
    /// Every version in release order.
    pub const ALL: [PhyVersion; 12] = [
        PhyVersion::V1_0,
        PhyVersion::V1_0_1,
        PhyVersion::V1_0_2RevA,
        PhyVersion::V1_0_2RevB,
        PhyVersion::V1_1RevA,
        PhyVersion::V1_1RevB,
        PhyVersion::V1_0_3RevA,
        PhyVersion::Rp002V1_0_0,
        PhyVersion::Rp002V1_0_1,
        PhyVersion::Rp002V1_0_2,
        PhyVersion::Rp002V1_0_3,
        PhyVersion::Rp002V1_0_4,
    ];

    /// Canonical name, e.g. `1.0.2-b` or `RP002-1.0.4`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PhyVersion::V1_0 => "1.0",
            PhyVersion::V1_0_1 => "1.0.1",
            PhyVersion::V1_0_2RevA => "1.0.2-a",
            PhyVersion::V1_0_2RevB => "1.0.2-b",
            PhyVersion::V1_1RevA => "1.1-a",
            PhyVersion::V1_1RevB => "1.1-b",
            PhyVersion::V1_0_3RevA => "1.0.3-a",
            PhyVersion::Rp002V1_0_0 => "RP002-1.0.0",
            PhyVersion::Rp002V1_0_1 => "RP002-1.0.1",
            PhyVersion::Rp002V1_0_2 => "RP002-1.0.2",
            PhyVersion::Rp002V1_0_3 => "RP002-1.0.3",
            PhyVersion::Rp002V1_0_4 => "RP002-1.0.4",
        }
    }
}

impl fmt::Display for PhyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhyVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PhyVersion::ALL
            .iter()
            .find(|v| v.as_str() == s)
            .copied()
            .ok_or(Error::UnknownPhyVersion)
    }
}

impl TryFrom<u8> for PhyVersion {
    type Error = Error;

    /// Numbering of the version enumeration used by LoRaWAN backend interfaces, 1-based.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1..=12 => Ok(PhyVersion::ALL[value as usize - 1]),
            _ => Err(Error::UnknownPhyVersion),
        }
    }
}

/// A default channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Channel {
    /// Frequency in Hz.
    pub frequency: u32,
    /// Lowest data rate allowed on the channel.
    pub min_data_rate: DR,
    /// Highest data rate allowed on the channel.
    pub max_data_rate: DR,
}

impl Channel {
    pub(crate) const fn new(frequency: u32, min_data_rate: DR, max_data_rate: DR) -> Self {
        Self { frequency, min_data_rate, max_data_rate }
    }
}

/// Frequency range with its own duty cycle and EIRP limits.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SubBand {
    /// Lowest frequency in Hz, inclusive.
    pub min_frequency: u32,
    /// Highest frequency in Hz, inclusive.
    pub max_frequency: u32,
    /// Duty cycle in (0, 1].
    pub duty_cycle: f32,
    /// Maximum EIRP in dBm.
    pub max_eirp: f32,
}

impl SubBand {
    /// Whether `frequency` lies in the sub-band.
    pub const fn contains(&self, frequency: u32) -> bool {
        self.min_frequency <= frequency && frequency <= self.max_frequency
    }
}

/// Class B beacon parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Beacon {
    /// Data rate of the beacon.
    pub data_rate_index: DR,
    /// Coding rate of the beacon.
    pub coding_rate: CodingRate,
    /// Beacon frequencies in Hz. More than one means the beacon hops.
    pub frequencies: &'static [u32],
}

/// Beacon period in seconds.
pub const BEACON_PERIOD: u64 = 128;

impl Beacon {
    /// Beacon frequency for the beacon sent at `beacon_time`, in GPS seconds.
    pub fn frequency_at(&self, beacon_time: u64) -> Option<u32> {
        hopping_frequency(self.frequencies, beacon_time)
    }
}

fn hopping_frequency(frequencies: &[u32], beacon_time: u64) -> Option<u32> {
    if frequencies.is_empty() {
        return None;
    }
    let index = (beacon_time / BEACON_PERIOD) % frequencies.len() as u64;
    frequencies.get(index as usize).copied()
}

/// Default RX2 window parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rx2Parameters {
    /// Data rate.
    pub data_rate_index: DR,
    /// Frequency in Hz.
    pub frequency: u32,
}

/// Dwell time state a device boots with. `None` means the band does not define one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DwellTime {
    /// Uplink dwell time limitation.
    pub uplinks: Option<bool>,
    /// Downlink dwell time limitation.
    pub downlinks: Option<bool>,
}

/// Layout of the CFList sent in a JoinAccept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CfListType {
    /// Up to five additional channel frequencies.
    Frequencies,
    /// 96 bits of channel enablement.
    ChannelMasks,
}

/// Mapping of an uplink channel to its RX1 downlink channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rx1Channel {
    /// The downlink uses the uplink channel.
    Identity,
    /// The downlink channel is the uplink channel modulo the count.
    Modulo(u8),
}

/// Derivation of the RX1 data rate from the uplink data rate and the RX1 offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Rx1DataRate {
    /// Rows are indexed by uplink data rate, columns by offset.
    Table(&'static [&'static [DR]]),
    /// The offset is subtracted from the uplink data rate, saturating at `min`.
    Subtract {
        /// Largest allowed offset.
        max_offset: u8,
        /// Lowest downlink data rate.
        min: DR,
    },
    /// Offsets 0..5 lower the data rate, offsets 6 and 7 raise it by one and two.
    Effective {
        /// Lowest downlink data rate without downlink dwell time limitation.
        min: DR,
        /// Lowest downlink data rate with downlink dwell time limitation.
        dwell_time_min: DR,
        /// Highest downlink data rate.
        max: DR,
    },
}

/// Regional parameters of one band at one PHY version.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    /// Frequency plan family.
    pub id: BandId,
    /// Regional parameters version.
    pub version: PhyVersion,

    /// Class B beacon.
    pub beacon: Beacon,
    /// Class B ping slot frequencies in Hz, hopping like the beacon.
    pub ping_slot_frequencies: &'static [u32],

    /// Maximum number of uplink channels.
    pub max_uplink_channels: u8,
    /// Uplink channels every device starts with.
    pub uplink_channels: &'static [Channel],
    /// Maximum number of downlink channels.
    pub max_downlink_channels: u8,
    /// Downlink channels every device starts with.
    pub downlink_channels: &'static [Channel],

    /// Duty cycle and EIRP limits, in lookup order.
    pub sub_bands: &'static [SubBand],

    /// Data rates by index, `None` where the index is not defined.
    pub data_rates: [Option<DataRate>; 16],

    /// Unit of the 24-bit frequency fields, in Hz.
    pub freq_multiplier: u32,
    /// Whether a JoinAccept may carry a CFList.
    pub implements_cf_list: bool,
    /// Layout of the CFList.
    pub cf_list_type: CfListType,

    /// Delay of the first receive window.
    pub receive_delay_1: Duration,
    /// Delay of the second receive window.
    pub receive_delay_2: Duration,
    /// Delay of the first join accept window.
    pub join_accept_delay_1: Duration,
    /// Delay of the second join accept window.
    pub join_accept_delay_2: Duration,
    /// Largest accepted frame counter gap.
    pub max_fcnt_gap: u32,
    /// Whether the band supports dynamic ADR.
    pub supports_dynamic_adr: bool,
    /// ADR_ACK_LIMIT.
    pub adr_ack_limit: u16,
    /// ADR_ACK_DELAY.
    pub adr_ack_delay: u16,
    /// Lower bound of the retransmission timeout.
    pub min_retransmit_timeout: Duration,
    /// Upper bound of the retransmission timeout.
    pub max_retransmit_timeout: Duration,

    /// dB reductions from the maximum EIRP, indexed by TXPower.
    pub tx_offsets: &'static [f32],
    /// Highest data rate ADR may assign.
    pub max_adr_data_rate_index: DR,
    /// Whether only the band's coding rate may be used.
    pub strict_coding_rate: bool,
    /// Whether the band supports TxParamSetupReq.
    pub tx_param_setup_req_support: bool,
    /// Default maximum EIRP in dBm.
    pub default_max_eirp: f32,
    /// Default RX2 parameters.
    pub default_rx2: Rx2Parameters,
    /// Dwell time state after boot.
    pub boot_dwell_time: DwellTime,

    /// RX1 channel derivation.
    pub rx1_channel: Rx1Channel,
    /// RX1 data rate derivation.
    pub rx1_data_rate: Rx1DataRate,
    /// ChMaskCntl semantics.
    pub ch_mask: ChMaskFamily,
}

pub(crate) const RECEIVE_DELAY_1: Duration = Duration::from_secs(1);
pub(crate) const RECEIVE_DELAY_2: Duration = Duration::from_secs(2);
pub(crate) const JOIN_ACCEPT_DELAY_1: Duration = Duration::from_secs(5);
pub(crate) const JOIN_ACCEPT_DELAY_2: Duration = Duration::from_secs(6);
pub(crate) const MAX_FCNT_GAP: u32 = 16384;
pub(crate) const ADR_ACK_LIMIT: u16 = 64;
pub(crate) const ADR_ACK_DELAY: u16 = 32;
pub(crate) const MIN_RETRANSMIT_TIMEOUT: Duration = Duration::from_secs(1);
pub(crate) const MAX_RETRANSMIT_TIMEOUT: Duration = Duration::from_secs(3);

/// `N` frequencies spaced by `step` Hz.
pub(crate) const fn frequencies<const N: usize>(first: u32, step: u32) -> [u32; N] {
    let mut freqs = [0; N];
    let mut i = 0;
    while i < N {
        freqs[i] = first + step * i as u32;
        i += 1;
    }
    freqs
}

/// `N` channels spaced by `step` Hz sharing one data rate range.
pub(crate) const fn channels<const N: usize>(first: u32, step: u32, min: DR, max: DR) -> [Channel; N] {
    let freqs = frequencies::<N>(first, step);
    let mut chs = [Channel::new(0, min, max); N];
    let mut i = 0;
    while i < N {
        chs[i].frequency = freqs[i];
        i += 1;
    }
    chs
}

/// 64 125 kHz channels followed by 8 500 kHz channels.
pub(crate) const fn channels_72(
    first_125khz: u32,
    range_125khz: (DR, DR),
    first_500khz: u32,
    range_500khz: (DR, DR),
) -> [Channel; 72] {
    let narrow = channels::<64>(first_125khz, 200_000, range_125khz.0, range_125khz.1);
    let wide = channels::<8>(first_500khz, 1_600_000, range_500khz.0, range_500khz.1);
    let mut chs = [Channel::new(0, DR::_0, DR::_0); 72];
    let mut i = 0;
    while i < 64 {
        chs[i] = narrow[i];
        i += 1;
    }
    while i < 72 {
        chs[i] = wide[i - 64];
        i += 1;
    }
    chs
}

impl Band {
    /// Data rate at `index`, if defined.
    pub fn data_rate(&self, index: DR) -> Option<&DataRate> {
        self.data_rates[index as usize].as_ref()
    }

    /// Smallest index with the same modulation as `rate`.
    pub fn find_uplink_data_rate(&self, rate: &DataRate) -> Option<(DR, &DataRate)> {
        DR::ALL
            .iter()
            .find_map(|dr| self.data_rate(*dr).filter(|r| r.same_rate(rate)).map(|r| (*dr, r)))
    }

    /// Largest index with the same modulation as `rate`.
    pub fn find_downlink_data_rate(&self, rate: &DataRate) -> Option<(DR, &DataRate)> {
        DR::ALL
            .iter()
            .rev()
            .find_map(|dr| self.data_rate(*dr).filter(|r| r.same_rate(rate)).map(|r| (*dr, r)))
    }

    /// First sub-band containing `frequency`.
    pub fn find_sub_band(&self, frequency: u32) -> Option<&SubBand> {
        self.sub_bands.iter().find(|sb| sb.contains(frequency))
    }

    /// Maximum MAC payload size at `index` for the given dwell time state.
    pub fn max_mac_payload_size(&self, index: DR, dwell_time: bool) -> Option<u16> {
        self.data_rate(index).map(|dr| dr.max_mac_payload_size(dwell_time))
    }

    /// Highest TXPower index the band defines.
    pub fn max_tx_power_index(&self) -> u8 {
        self.tx_offsets.len().saturating_sub(1) as u8
    }

    /// EIRP in dBm for TXPower `index`, starting from `max_eirp`.
    pub fn eirp(&self, max_eirp: f32, index: u8) -> Option<f32> {
        self.tx_offsets.get(index as usize).map(|offset| max_eirp + offset)
    }

    /// Ping slot frequency for the beacon period starting at `beacon_time`, in GPS seconds.
    pub fn ping_slot_frequency_at(&self, beacon_time: u64) -> Option<u32> {
        hopping_frequency(self.ping_slot_frequencies, beacon_time)
    }

    /// Downlink channel index of RX1 for the uplink channel `index`.
    pub fn rx1_channel(&self, index: u8) -> u8 {
        match self.rx1_channel {
            Rx1Channel::Identity => index,
            Rx1Channel::Modulo(n) => index % n.max(1),
        }
    }

    /// RX1 data rate for an uplink at `index` with the RX1 data rate `offset`.
    pub fn rx1_data_rate(&self, index: DR, offset: u8, dwell_time: bool) -> Result<DR, Error> {
        if self.data_rate(index).is_none() {
            return Err(Error::DataRateIndexTooHigh { index, max: self.max_uplink_data_rate() });
        }
        let dr = match self.rx1_data_rate {
            Rx1DataRate::Table(rows) => {
                let Some(row) = rows.get(index as usize) else {
                    let max = DR::from_nibble(rows.len().saturating_sub(1) as u8);
                    return Err(Error::DataRateIndexTooHigh { index, max });
                };
                let Some(dr) = row.get(offset as usize) else {
                    let max = row.len().saturating_sub(1) as u8;
                    return Err(Error::DataRateOffsetTooHigh { offset, max });
                };
                *dr
            }
            Rx1DataRate::Subtract { max_offset, min } => {
                if offset > max_offset {
                    return Err(Error::DataRateOffsetTooHigh { offset, max: max_offset });
                }
                DR::from_nibble((index as u8).saturating_sub(offset).max(min as u8))
            }
            Rx1DataRate::Effective { min, dwell_time_min, max } => {
                if offset > 7 {
                    return Err(Error::DataRateOffsetTooHigh { offset, max: 7 });
                }
                let effective = match offset {
                    6 => -1,
                    7 => -2,
                    o => o as i8,
                };
                let min = if dwell_time { dwell_time_min } else { min };
                let dr = (index as i8 - effective).clamp(min as i8, max as i8);
                DR::from_nibble(dr as u8)
            }
        };
        if self.data_rate(dr).is_none() {
            return Err(Error::DataRateNotFound { index: dr });
        }
        Ok(dr)
    }

    fn max_uplink_data_rate(&self) -> DR {
        DR::ALL
            .iter()
            .rev()
            .find(|dr| self.data_rate(**dr).is_some())
            .copied()
            .unwrap_or(DR::_0)
    }

    /// Shortest LinkADRReq block moving the device from `current` to `desired`.
    pub fn generate_ch_masks(
        &self,
        current: &[bool],
        desired: &[bool],
        atomic: bool,
    ) -> Result<ChMaskCntlPairs, channel_plan::Error> {
        self.ch_mask.generate(current, desired, atomic)
    }

    /// Channels controlled by one LinkADRReq.
    pub fn parse_ch_mask(&self, mask: ChMask16, cntl: u8) -> Result<ChMaskUpdate, channel_plan::Error> {
        self.ch_mask.parse(mask, cntl)
    }
}

macro_rules! versions {
    ($f:path) => {
        [
            $f(PhyVersion::V1_0),
            $f(PhyVersion::V1_0_1),
            $f(PhyVersion::V1_0_2RevA),
            $f(PhyVersion::V1_0_2RevB),
            $f(PhyVersion::V1_1RevA),
            $f(PhyVersion::V1_1RevB),
            $f(PhyVersion::V1_0_3RevA),
            $f(PhyVersion::Rp002V1_0_0),
            $f(PhyVersion::Rp002V1_0_1),
            $f(PhyVersion::Rp002V1_0_2),
            $f(PhyVersion::Rp002V1_0_3),
            $f(PhyVersion::Rp002V1_0_4),
        ]
    };
}
pub(crate) use versions;

/// Every band at every version it is defined for.
fn catalog(id: BandId) -> &'static [Option<Band>] {
    match id {
        BandId::Eu863870 => &eu868::BANDS,
        BandId::Us902928 => &us915::BANDS,
        BandId::Au915928 => &au915::BANDS,
        BandId::As923 => &as923::BANDS_1,
        BandId::As923_2 => &as923::BANDS_2,
        BandId::As923_3 => &as923::BANDS_3,
        BandId::As923_4 => &as923::BANDS_4,
        BandId::Cn470510 => &cn470::BANDS,
        BandId::Cn779787 => &cn779::BANDS,
        BandId::Eu433 => &eu433::BANDS,
        BandId::In865867 => &in865::BANDS,
        BandId::Kr920923 => &kr920::BANDS,
        BandId::Ru864870 => &ru864::BANDS,
        BandId::Ism2400 => &ism2400::BANDS,
    }
}

/// Band `id` at PHY `version`.
pub fn get(id: BandId, version: PhyVersion) -> Result<&'static Band, Error> {
    catalog(id)
        .iter()
        .flatten()
        .find(|b| b.version == version)
        .ok_or(Error::BandNotFound { id, version })
}

/// Band `id` at its latest PHY version.
pub fn get_latest(id: BandId) -> Result<&'static Band, Error> {
    get(id, id.latest_version())
}

/// PHY versions band `id` is defined for, in release order.
pub fn supported_versions(id: BandId) -> impl Iterator<Item = PhyVersion> {
    catalog(id).iter().flatten().map(|b| b.version)
}

/// Every band record of the catalog.
pub fn all() -> impl Iterator<Item = &'static Band> {
    BandId::ALL.iter().flat_map(|id| catalog(*id).iter().flatten())
}

/// Index in `dst` of the data rate found at `index` in `src`.
pub fn map_data_rate_index(src: &Band, index: DR, dst: &Band) -> Result<DR, Error> {
    let Some(rate) = src.data_rate(index) else {
        return Err(Error::DataRateNotFound { index });
    };
    if dst.data_rate(index).is_some_and(|r| r.same_rate(rate)) {
        return Ok(index);
    }
    dst.find_uplink_data_rate(rate)
        .map(|(dr, _)| dr)
        .ok_or(Error::DataRateNotFound { index })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_id_and_version() {
        let band = get(BandId::Eu863870, PhyVersion::V1_0_2RevB).unwrap();
        assert_eq!(band.id, BandId::Eu863870);
        assert_eq!(band.version, PhyVersion::V1_0_2RevB);
        assert_eq!(get_latest(BandId::Us902928).unwrap().version, PhyVersion::Rp002V1_0_4);
        assert_eq!(
            get(BandId::Ism2400, PhyVersion::V1_0),
            Err(Error::BandNotFound { id: BandId::Ism2400, version: PhyVersion::V1_0 })
        );
    }

    #[test]
    fn parses_tags() {
        assert_eq!("AS_923_3".parse::<BandId>(), Ok(BandId::As923_3));
        assert_eq!("XX_1".parse::<BandId>(), Err(Error::UnknownBandId));
        assert_eq!("1.0.2-b".parse::<PhyVersion>(), Ok(PhyVersion::V1_0_2RevB));
        assert_eq!("1.2".parse::<PhyVersion>(), Err(Error::UnknownPhyVersion));
        assert_eq!(PhyVersion::try_from(12), Ok(PhyVersion::Rp002V1_0_4));
        assert_eq!(PhyVersion::try_from(0), Err(Error::UnknownPhyVersion));
    }

    #[test]
    fn hopping_beacon() {
        let band = get_latest(BandId::Us902928).unwrap();
        assert_eq!(band.beacon.frequency_at(0), Some(923_300_000));
        assert_eq!(band.beacon.frequency_at(128), Some(923_900_000));
        assert_eq!(band.beacon.frequency_at(8 * 128), Some(923_300_000));
        let band = get_latest(BandId::Eu863870).unwrap();
        assert_eq!(band.ping_slot_frequency_at(1_000_000), Some(869_525_000));
    }

    #[test]
    fn rx1_channel_derivation() {
        assert_eq!(get_latest(BandId::Us902928).unwrap().rx1_channel(65), 1);
        assert_eq!(get_latest(BandId::Cn470510).unwrap().rx1_channel(50), 2);
        assert_eq!(get_latest(BandId::Eu863870).unwrap().rx1_channel(7), 7);
    }

    #[test]
    fn eirp_from_tx_power_index() {
        let band = get_latest(BandId::Eu863870).unwrap();
        assert_eq!(band.max_tx_power_index(), 7);
        assert_eq!(band.eirp(band.default_max_eirp, 1), Some(band.default_max_eirp - 2.0));
        assert_eq!(band.eirp(band.default_max_eirp, 8), None);
    }
}
