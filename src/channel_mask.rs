/// Packed channel enablement bits, least significant bit first.
///
/// `ChannelMask<2>` is the 16-bit ChMask of LinkADRReq, `ChannelMask<12>` the 96-bit
/// channel mask block of a type 1 CFList.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelMask<const N: usize>([u8; N]);

/// The ChMask field of LinkADRReq.
pub type ChMask16 = ChannelMask<2>;

impl<const N: usize> Default for ChannelMask<N> {
    fn default() -> Self {
        ChannelMask([0; N])
    }
}

#[cfg(feature = "defmt")]
impl<const N: usize> defmt::Format for ChannelMask<N> {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "ChannelMask({=[u8]:x})", &self.0[..])
    }
}

#[cfg(feature = "serde")]
impl<const N: usize> serde::Serialize for ChannelMask<N> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for e in &self.0 {
            seq.serialize_element(e)?;
        }
        seq.end()
    }
}

#[cfg(feature = "serde")]
struct ChannelMaskDeserializer<const N: usize>;

#[cfg(feature = "serde")]
impl<'de, const N: usize> serde::de::Visitor<'de> for ChannelMaskDeserializer<N> {
    type Value = ChannelMask<N>;

    fn expecting(&self, formatter: &mut core::fmt::Formatter) -> core::fmt::Result {
        formatter.write_str("a sequence of channel mask bytes")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::SeqAccess<'de>,
    {
        let mut arr = [0; N];
        let mut index = 0;
        while let Some(el) = seq.next_element()? {
            if index >= N {
                return Err(serde::de::Error::custom("ChannelMask has too many elements"));
            }
            arr[index] = el;
            index += 1;
        }
        if index != N {
            return Err(serde::de::Error::invalid_length(index, &self));
        }
        Ok(ChannelMask(arr))
    }
}

#[cfg(feature = "serde")]
impl<'de, const N: usize> serde::Deserialize<'de> for ChannelMask<N> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_seq(ChannelMaskDeserializer)
    }
}

impl<const N: usize> ChannelMask<N> {
    /// Number of channels the mask covers.
    pub const CHANNELS: usize = N * 8;

    /// Constructs a new ChannelMask from the provided little-endian data.
    pub fn new(data: &[u8]) -> Option<Self> {
        if data.len() < N {
            return None;
        }
        let mut payload = [0; N];
        payload.copy_from_slice(&data[..N]);
        Some(ChannelMask(payload))
    }

    /// Builds the mask from the leading `N * 8` entries of `statuses`. Missing entries are off.
    pub fn from_statuses(statuses: &[bool]) -> Self {
        let mut mask = Self::default();
        for (i, on) in statuses.iter().take(Self::CHANNELS).enumerate() {
            mask.set_channel(i, *on);
        }
        mask
    }

    /// Enable or disable a specific channel. Out of range channels are ignored.
    pub fn set_channel(&mut self, channel: usize, set: bool) {
        let Some(byte) = self.0.get_mut(channel >> 3) else {
            return;
        };
        let flag = 0b1 << (channel & 0x07);
        if set {
            *byte |= flag;
        } else {
            *byte &= !flag;
        }
    }

    /// Verifies if a given channel is enabled. Out of range channels read as disabled.
    pub fn is_enabled(&self, index: usize) -> bool {
        self.0.get(index >> 3).is_some_and(|b| b & (1 << (index & 0x07)) != 0)
    }

    /// Provides information for each of the first `M` channels if they are enabled.
    pub fn statuses<const M: usize>(&self) -> [bool; M] {
        let mut res = [false; M];
        for (i, c) in res.iter_mut().enumerate() {
            *c = self.is_enabled(i);
        }
        res
    }

    /// Number of enabled channels.
    pub fn count_enabled(&self) -> usize {
        self.0.iter().map(|b| b.count_ones() as usize).sum()
    }
}

impl ChMask16 {
    /// Mask as a 16-bit integer.
    pub fn value(&self) -> u16 {
        u16::from_le_bytes(self.0)
    }
}

impl From<u16> for ChMask16 {
    fn from(v: u16) -> Self {
        ChannelMask(v.to_le_bytes())
    }
}

impl<const N: usize> From<[u8; N]> for ChannelMask<N> {
    fn from(v: [u8; N]) -> Self {
        ChannelMask(v)
    }
}

impl<const N: usize> AsRef<[u8]> for ChannelMask<N> {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_bit_order() {
        let mask = ChMask16::from(0x0204);
        let statuses = mask.statuses::<16>();
        assert!(statuses[2]);
        assert!(statuses[9]);
        assert_eq!(statuses.iter().filter(|s| **s).count(), 2);
        assert_eq!(mask.as_ref(), &[0x04, 0x02]);
    }

    #[test]
    fn set_and_clear() {
        let mut mask = ChannelMask::<12>::default();
        mask.set_channel(95, true);
        mask.set_channel(0, true);
        mask.set_channel(0, false);
        mask.set_channel(200, true);
        assert!(mask.is_enabled(95));
        assert!(!mask.is_enabled(0));
        assert!(!mask.is_enabled(200));
        assert_eq!(mask.count_enabled(), 1);
    }

    #[test]
    fn from_statuses_truncates() {
        let statuses = [true; 20];
        let mask = ChMask16::from_statuses(&statuses);
        assert_eq!(mask.value(), 0xffff);
    }
}
