//! Identifiers and scalar values shared by the band tables and the wire codec.

use core::fmt;

/// Data rate index as carried in LinkADRReq, DLSettings and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
#[repr(u8)]
pub enum DR {
    #[default]
    _0 = 0,
    _1 = 1,
    _2 = 2,
    _3 = 3,
    _4 = 4,
    _5 = 5,
    _6 = 6,
    _7 = 7,
    _8 = 8,
    _9 = 9,
    _10 = 10,
    _11 = 11,
    _12 = 12,
    _13 = 13,
    _14 = 14,
    _15 = 15,
}

impl DR {
    /// Every data rate index in ascending order.
    pub const ALL: [DR; 16] = [
        DR::_0,
        DR::_1,
        DR::_2,
        DR::_3,
        DR::_4,
        DR::_5,
        DR::_6,
        DR::_7,
        DR::_8,
        DR::_9,
        DR::_10,
        DR::_11,
        DR::_12,
        DR::_13,
        DR::_14,
        DR::_15,
    ];

    /// Reads the data rate from the low nibble of `value`.
    pub const fn from_nibble(value: u8) -> DR {
        Self::ALL[(value & 0x0f) as usize]
    }

    /// Numeric index.
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Is this DR within range?
    pub fn in_range(&self, range: (DR, DR)) -> bool {
        (range.0 as u8 <= *self as u8) && (*self as u8 <= range.1 as u8)
    }
}

impl TryFrom<u8> for DR {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > 15 {
            return Err(());
        }
        Ok(Self::from_nibble(value))
    }
}

impl From<DR> for u8 {
    fn from(dr: DR) -> Self {
        dr as u8
    }
}

impl fmt::Display for DR {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DR{}", *self as u8)
    }
}

macro_rules! fixed_len_struct {
    (
        $(#[$outer:meta])*
        struct $type:ident[$size:expr];
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $type(pub [u8; $size]);

        impl $type {
            /// Length in bytes.
            pub const LEN: usize = $size;

            /// Creates the value from its most-significant-byte-first representation.
            pub const fn new(bytes: [u8; $size]) -> Self {
                Self(bytes)
            }

            /// Reads the value from its little-endian wire representation.
            pub fn from_le_slice(data: &[u8]) -> Option<Self> {
                if data.len() != $size {
                    return None;
                }
                let mut bytes = [0u8; $size];
                for (dst, src) in bytes.iter_mut().zip(data.iter().rev()) {
                    *dst = *src;
                }
                Some(Self(bytes))
            }

            /// Little-endian wire representation.
            pub fn to_le_bytes(&self) -> [u8; $size] {
                let mut bytes = self.0;
                bytes.reverse();
                bytes
            }
        }

        impl From<[u8; $size]> for $type {
            fn from(v: [u8; $size]) -> Self {
                Self(v)
            }
        }

        impl AsRef<[u8]> for $type {
            fn as_ref(&self) -> &[u8] {
                &self.0[..]
            }
        }

        impl fmt::Display for $type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                for b in self.0.iter() {
                    write!(f, "{:02X}", b)?;
                }
                Ok(())
            }
        }
    };
}

fixed_len_struct! {
    /// 64-bit extended unique identifier (DevEUI, JoinEUI).
    struct Eui64[8];
}

fixed_len_struct! {
    /// 32-bit session device address.
    struct DevAddr[4];
}

fixed_len_struct! {
    /// 24-bit network identifier.
    struct NetId[3];
}

fixed_len_struct! {
    /// Message integrity code. Carried opaquely, never computed here.
    struct Mic[4];
}

impl DevAddr {
    /// Address as a 32-bit integer.
    pub fn to_u32(&self) -> u32 {
        u32::from_be_bytes(self.0)
    }
}

impl From<u32> for DevAddr {
    fn from(v: u32) -> Self {
        Self(v.to_be_bytes())
    }
}

impl From<u64> for Eui64 {
    fn from(v: u64) -> Self {
        Self(v.to_be_bytes())
    }
}

impl From<Eui64> for u64 {
    fn from(v: Eui64) -> Self {
        u64::from_be_bytes(v.0)
    }
}

impl NetId {
    /// Identifier as a 24-bit integer.
    pub fn to_u32(&self) -> u32 {
        u32::from_be_bytes([0, self.0[0], self.0[1], self.0[2]])
    }
}

/// Opaque 128-bit key material. Only carried, never used for cryptography.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AesKey(pub [u8; 16]);

/// Device nonce of a JoinRequest.
pub type DevNonce = u16;

/// 24-bit join nonce of a JoinAccept.
pub type JoinNonce = u32;

/// LoRaWAN MAC minor version, as exchanged by ResetInd and RekeyInd.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Minor {
    /// Reserved for future use.
    Rfu(u8),
    /// LoRaWAN 1.1.
    One,
}

impl Minor {
    /// Reads the minor version from the low nibble of `value`.
    pub const fn from_nibble(value: u8) -> Self {
        match value & 0x0f {
            1 => Minor::One,
            v => Minor::Rfu(v),
        }
    }

    /// Numeric value.
    pub const fn value(self) -> u8 {
        match self {
            Minor::One => 1,
            Minor::Rfu(v) => v,
        }
    }
}

/// Device class as exchanged by DeviceModeInd.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(missing_docs)]
pub enum DeviceClass {
    A,
    B,
    C,
}

impl DeviceClass {
    /// Wire value.
    pub const fn value(self) -> u8 {
        match self {
            DeviceClass::A => 0,
            DeviceClass::B => 1,
            DeviceClass::C => 2,
        }
    }
}

impl TryFrom<u8> for DeviceClass {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(DeviceClass::A),
            1 => Ok(DeviceClass::B),
            2 => Ok(DeviceClass::C),
            _ => Err(()),
        }
    }
}
