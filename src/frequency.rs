//! 24-bit frequency fields as carried by MAC commands, relay wrappers and CFLists.

/// Lowest frequency a MAC command may carry, in Hz. Zero is handled separately.
pub const MIN_FREQUENCY: u32 = 100_000;

/// Largest value a 24-bit field can carry.
pub const MAX_FIELD_VALUE: u32 = 0x00ff_ffff;

/// Packed 24-bit little-endian frequency field.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Frequency([u8; 3]);

#[cfg(feature = "defmt")]
impl defmt::Format for Frequency {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "Frequency({=u32})", self.raw())
    }
}

impl Frequency {
    /// Constructs the field from its little-endian wire bytes.
    pub fn new(data: &[u8]) -> Option<Self> {
        if data.len() < 3 {
            return None;
        }
        Some(Self([data[0], data[1], data[2]]))
    }

    /// Packs a frequency in Hz into `multiplier` units.
    ///
    /// Returns `None` when the packed value does not fit in 24 bits.
    pub fn from_hz(hz: u32, multiplier: u32) -> Option<Self> {
        let value = hz / multiplier.max(1);
        if value > MAX_FIELD_VALUE {
            return None;
        }
        let data = value.to_le_bytes();
        Some(Self([data[0], data[1], data[2]]))
    }

    /// Packed value, in the unit the field was written with.
    pub fn raw(&self) -> u32 {
        (u32::from(self.0[2]) << 16) | (u32::from(self.0[1]) << 8) | u32::from(self.0[0])
    }

    /// Frequency in Hz for the given multiplier.
    pub fn hz(&self, multiplier: u32) -> u32 {
        self.raw().saturating_mul(multiplier)
    }

    /// Largest frequency in Hz representable with `multiplier`.
    pub fn max_hz(multiplier: u32) -> u64 {
        u64::from(MAX_FIELD_VALUE) * u64::from(multiplier)
    }
}

impl From<[u8; 3]> for Frequency {
    fn from(v: [u8; 3]) -> Self {
        Self(v)
    }
}

impl AsRef<[u8]> for Frequency {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_in_multiplier_units() {
        let f = Frequency::from_hz(868_100_000, 100).unwrap();
        assert_eq!(f.raw(), 8_681_000);
        assert_eq!(f.as_ref(), &[0x28, 0x76, 0x84]);
        assert_eq!(f.hz(100), 868_100_000);

        let f = Frequency::from_hz(2_423_000_000, 200).unwrap();
        assert_eq!(f.raw(), 12_115_000);
        assert_eq!(f.hz(200), 2_423_000_000);
    }

    #[test]
    fn rejects_values_wider_than_24_bits() {
        assert!(Frequency::from_hz(2_423_000_000, 100).is_none());
        assert_eq!(Frequency::max_hz(100), 1_677_721_500);
    }
}
