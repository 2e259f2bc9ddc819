//! Data rate records of the regional parameter tables.

/// LoRa bandwidth.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Bandwidth {
    _125KHz,
    _250KHz,
    _500KHz,
    _812KHz,
}

impl Bandwidth {
    /// Bandwidth in Hz.
    pub const fn hz(self) -> u32 {
        match self {
            Bandwidth::_125KHz => 125_000,
            Bandwidth::_250KHz => 250_000,
            Bandwidth::_500KHz => 500_000,
            Bandwidth::_812KHz => 812_000,
        }
    }
}

/// Convert the bandwidth for use in the external lora-modulation crate
impl TryFrom<Bandwidth> for lora_modulation::Bandwidth {
    type Error = ();

    fn try_from(bw: Bandwidth) -> Result<Self, Self::Error> {
        match bw {
            Bandwidth::_125KHz => Ok(lora_modulation::Bandwidth::_125KHz),
            Bandwidth::_250KHz => Ok(lora_modulation::Bandwidth::_250KHz),
            Bandwidth::_500KHz => Ok(lora_modulation::Bandwidth::_500KHz),
            Bandwidth::_812KHz => Err(()),
        }
    }
}

/// LoRa spreading factor.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum SpreadingFactor {
    _5,
    _6,
    _7,
    _8,
    _9,
    _10,
    _11,
    _12,
}

/// Convert the spreading factor for use in the external lora-modulation crate
impl From<SpreadingFactor> for lora_modulation::SpreadingFactor {
    fn from(sf: SpreadingFactor) -> Self {
        match sf {
            SpreadingFactor::_5 => lora_modulation::SpreadingFactor::_5,
            SpreadingFactor::_6 => lora_modulation::SpreadingFactor::_6,
            SpreadingFactor::_7 => lora_modulation::SpreadingFactor::_7,
            SpreadingFactor::_8 => lora_modulation::SpreadingFactor::_8,
            SpreadingFactor::_9 => lora_modulation::SpreadingFactor::_9,
            SpreadingFactor::_10 => lora_modulation::SpreadingFactor::_10,
            SpreadingFactor::_11 => lora_modulation::SpreadingFactor::_11,
            SpreadingFactor::_12 => lora_modulation::SpreadingFactor::_12,
        }
    }
}

/// LoRa coding rate. `_4_8Li` is the long-interleaving rate of the 2.4 GHz band.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum CodingRate {
    _4_5,
    _4_6,
    _4_7,
    _4_8,
    _4_8Li,
}

/// Convert the coding rate for use in the external lora-modulation crate
impl TryFrom<CodingRate> for lora_modulation::CodingRate {
    type Error = ();

    fn try_from(cr: CodingRate) -> Result<Self, Self::Error> {
        match cr {
            CodingRate::_4_5 => Ok(lora_modulation::CodingRate::_4_5),
            CodingRate::_4_6 => Ok(lora_modulation::CodingRate::_4_6),
            CodingRate::_4_7 => Ok(lora_modulation::CodingRate::_4_7),
            CodingRate::_4_8 => Ok(lora_modulation::CodingRate::_4_8),
            CodingRate::_4_8Li => Err(()),
        }
    }
}

/// LR-FHSS coding rate.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum LrFhssCodingRate {
    _1_3,
    _2_3,
}

/// Modulation parameters of a data rate.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modulation {
    /// Chirp spread spectrum.
    Lora {
        /// Spreading factor.
        spreading_factor: SpreadingFactor,
        /// Bandwidth.
        bandwidth: Bandwidth,
        /// Coding rate.
        coding_rate: CodingRate,
    },
    /// GFSK.
    Fsk {
        /// Bit rate in bit/s.
        bit_rate: u32,
    },
    /// Long range frequency hopping spread spectrum.
    LrFhss {
        /// Modulation type, 0 for GMSK 488 bauds.
        modulation_type: u8,
        /// Operating channel width in Hz.
        operating_channel_width: u32,
        /// Coding rate.
        coding_rate: LrFhssCodingRate,
    },
}

/// Maximum MAC payload size of a data rate.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaxMacPayloadSize {
    /// Same size regardless of the dwell time limitation.
    Constant(u16),
    /// Smaller size while a 400 ms dwell time limitation is active.
    DwellTimeDependent {
        /// Size without dwell time limitation.
        no_dwell_time: u16,
        /// Size with dwell time limitation.
        dwell_time: u16,
    },
}

impl MaxMacPayloadSize {
    /// Size for the given dwell time state.
    pub const fn size(&self, dwell_time: bool) -> u16 {
        match *self {
            MaxMacPayloadSize::Constant(size) => size,
            MaxMacPayloadSize::DwellTimeDependent { no_dwell_time, dwell_time: dwell } => {
                if dwell_time {
                    dwell
                } else {
                    no_dwell_time
                }
            }
        }
    }
}

/// A data rate entry of a band.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DataRate {
    /// Modulation parameters.
    pub modulation: Modulation,
    /// Payload size limits.
    pub max_mac_payload_size: MaxMacPayloadSize,
}

impl DataRate {
    /// LoRa data rate with coding rate 4/5.
    pub const fn lora(
        spreading_factor: SpreadingFactor,
        bandwidth: Bandwidth,
        max_mac_payload_size: MaxMacPayloadSize,
    ) -> Self {
        Self::lora_with_coding_rate(spreading_factor, bandwidth, CodingRate::_4_5, max_mac_payload_size)
    }

    /// LoRa data rate.
    pub const fn lora_with_coding_rate(
        spreading_factor: SpreadingFactor,
        bandwidth: Bandwidth,
        coding_rate: CodingRate,
        max_mac_payload_size: MaxMacPayloadSize,
    ) -> Self {
        Self {
            modulation: Modulation::Lora { spreading_factor, bandwidth, coding_rate },
            max_mac_payload_size,
        }
    }

    /// FSK data rate.
    pub const fn fsk(bit_rate: u32, max_mac_payload_size: MaxMacPayloadSize) -> Self {
        Self { modulation: Modulation::Fsk { bit_rate }, max_mac_payload_size }
    }

    /// LR-FHSS data rate with GMSK 488 bauds.
    pub const fn lr_fhss(
        operating_channel_width: u32,
        coding_rate: LrFhssCodingRate,
        max_mac_payload_size: MaxMacPayloadSize,
    ) -> Self {
        Self {
            modulation: Modulation::LrFhss {
                modulation_type: 0,
                operating_channel_width,
                coding_rate,
            },
            max_mac_payload_size,
        }
    }

    /// Maximum MAC payload size for the given dwell time state.
    pub const fn max_mac_payload_size(&self, dwell_time: bool) -> u16 {
        self.max_mac_payload_size.size(dwell_time)
    }

    /// Whether both records describe the same modulation. Payload sizes are ignored.
    pub fn same_rate(&self, other: &DataRate) -> bool {
        self.modulation == other.modulation
    }
}

/// Shorthand for [`MaxMacPayloadSize::Constant`].
pub(crate) const fn constant(size: u16) -> MaxMacPayloadSize {
    MaxMacPayloadSize::Constant(size)
}

/// Shorthand for [`MaxMacPayloadSize::DwellTimeDependent`].
pub(crate) const fn dwell_dependent(no_dwell_time: u16, dwell_time: u16) -> MaxMacPayloadSize {
    MaxMacPayloadSize::DwellTimeDependent { no_dwell_time, dwell_time }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dwell_time_dependent_sizes() {
        let dr = DataRate::lora(SpreadingFactor::_10, Bandwidth::_125KHz, dwell_dependent(59, 19));
        assert_eq!(dr.max_mac_payload_size(false), 59);
        assert_eq!(dr.max_mac_payload_size(true), 19);
        let dr = DataRate::fsk(50_000, constant(230));
        assert_eq!(dr.max_mac_payload_size(true), 230);
    }

    #[test]
    fn equality_ignores_payload_size() {
        let a = DataRate::lora(SpreadingFactor::_7, Bandwidth::_125KHz, constant(230));
        let b = DataRate::lora(SpreadingFactor::_7, Bandwidth::_125KHz, constant(250));
        let c = DataRate::lora(SpreadingFactor::_7, Bandwidth::_250KHz, constant(230));
        assert!(a.same_rate(&b));
        assert!(!a.same_rate(&c));
    }

    #[test]
    fn converts_to_radio_parameters() {
        assert!(lora_modulation::Bandwidth::try_from(Bandwidth::_812KHz).is_err());
        assert!(lora_modulation::Bandwidth::try_from(Bandwidth::_125KHz).is_ok());
        assert!(lora_modulation::CodingRate::try_from(CodingRate::_4_8Li).is_err());
        let _sf: lora_modulation::SpreadingFactor = SpreadingFactor::_9.into();
    }
}
