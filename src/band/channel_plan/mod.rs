//! ChMaskCntl/ChMask sequences of LinkADRReq for every channel plan family.
//!
//! Parsing yields the channels one LinkADRReq controls, generating yields the shortest
//! LinkADRReq block that moves a device from its current channel set to a desired one.

use crate::channel_mask::ChMask16;

pub mod dynamic;
pub mod fixed;

/// Largest channel plan in any band.
pub const MAX_CHANNELS: usize = 96;
/// Number of channels addressed by one matrix ChMask.
pub const NUM_OF_CHANNELS_IN_BLOCK: usize = 16;
/// Upper bound on the pairs a generated block may hold.
pub const MAX_CH_MASK_PAIRS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum Error {
    #[error("expected {expected} channels, got {actual}")]
    InvalidChannelCount { expected: usize, actual: usize },
    #[error("unsupported ChMaskCntl {cntl}")]
    UnsupportedChMaskCntl { cntl: u8 },
}

/// One LinkADRReq worth of channel mask information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChMaskCntlPair {
    /// ChMaskCntl, 0..7.
    pub cntl: u8,
    /// ChMask.
    pub mask: ChMask16,
}

impl ChMaskCntlPair {
    /// Creates a pair.
    pub const fn new(cntl: u8, mask: ChMask16) -> Self {
        Self { cntl, mask }
    }
}

/// A generated LinkADRReq block, in transmission order.
pub type ChMaskCntlPairs = heapless::Vec<ChMaskCntlPair, MAX_CH_MASK_PAIRS>;

/// Channel plan family of a band, selecting the ChMaskCntl semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChMaskFamily {
    /// 16 dynamic channels.
    Sixteen,
    /// 48 fixed channels.
    FortyEight,
    /// 64 fixed channels.
    SixtyFour,
    /// 64 125 kHz channels plus 8 500 kHz channels.
    SeventyTwo {
        /// ChMaskCntl 5 enables or disables whole sub-bands.
        cntl5: bool,
    },
    /// 96 fixed channels.
    NinetySix,
}

impl ChMaskFamily {
    /// Number of channels in the family.
    pub const fn channels(&self) -> usize {
        match self {
            ChMaskFamily::Sixteen => 16,
            ChMaskFamily::FortyEight => 48,
            ChMaskFamily::SixtyFour => 64,
            ChMaskFamily::SeventyTwo { .. } => 72,
            ChMaskFamily::NinetySix => 96,
        }
    }

    /// Channels controlled by a single LinkADRReq.
    pub fn parse(&self, mask: ChMask16, cntl: u8) -> Result<ChMaskUpdate, Error> {
        match *self {
            ChMaskFamily::Sixteen => dynamic::parse_ch_mask_16(mask, cntl),
            ChMaskFamily::FortyEight => fixed::parse_ch_mask_48(mask, cntl),
            ChMaskFamily::SixtyFour => fixed::parse_ch_mask_64(mask, cntl),
            ChMaskFamily::SeventyTwo { cntl5 } => fixed::parse_ch_mask_72(mask, cntl, cntl5),
            ChMaskFamily::NinetySix => fixed::parse_ch_mask_96(mask, cntl),
        }
    }

    /// Shortest LinkADRReq block moving `current` to `desired`.
    ///
    /// `atomic` states whether the device applies the block as a whole. It only changes the
    /// outcome for the 72 channel family, where a non-atomic device must never be left
    /// without an enabled channel between two commands.
    pub fn generate(
        &self,
        current: &[bool],
        desired: &[bool],
        atomic: bool,
    ) -> Result<ChMaskCntlPairs, Error> {
        match *self {
            ChMaskFamily::Sixteen => dynamic::generate_ch_masks_16(current, desired),
            ChMaskFamily::FortyEight => fixed::generate_ch_masks_48(current, desired),
            ChMaskFamily::SixtyFour => fixed::generate_ch_masks_64(current, desired),
            ChMaskFamily::SeventyTwo { cntl5 } => {
                fixed::generate_ch_masks_72(current, desired, cntl5, atomic)
            }
            ChMaskFamily::NinetySix => fixed::generate_ch_masks_96(current, desired),
        }
    }

    /// Applies `pairs` in order on top of `state`.
    pub fn apply(&self, state: &mut [bool], pairs: &[ChMaskCntlPair]) -> Result<(), Error> {
        check_len(state, self.channels())?;
        for pair in pairs {
            self.parse(pair.mask, pair.cntl)?.apply(state);
        }
        Ok(())
    }
}

/// Channel states set by one LinkADRReq. Channels outside of `affected` keep their state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChMaskUpdate {
    affected: u128,
    enabled: u128,
}

impl ChMaskUpdate {
    /// An update touching no channel.
    pub const fn new() -> Self {
        Self { affected: 0, enabled: 0 }
    }

    /// Sets the state of a single channel.
    pub fn set(&mut self, channel: usize, on: bool) {
        if channel >= MAX_CHANNELS {
            return;
        }
        let bit = 1u128 << channel;
        self.affected |= bit;
        if on {
            self.enabled |= bit;
        } else {
            self.enabled &= !bit;
        }
    }

    /// Sets `count` channels starting at `first` to `on`.
    pub fn set_range(&mut self, first: usize, count: usize, on: bool) {
        for channel in first..first + count {
            self.set(channel, on);
        }
    }

    /// Sets `count` channels starting at `first` from the low bits of `mask`.
    pub fn set_from_mask(&mut self, first: usize, count: usize, mask: ChMask16) {
        for i in 0..count {
            self.set(first + i, mask.is_enabled(i));
        }
    }

    /// State the update assigns to `channel`, `None` if the channel is not affected.
    pub fn get(&self, channel: usize) -> Option<bool> {
        if channel >= MAX_CHANNELS || self.affected & (1u128 << channel) == 0 {
            return None;
        }
        Some(self.enabled & (1u128 << channel) != 0)
    }

    /// Number of affected channels.
    pub fn len(&self) -> usize {
        self.affected.count_ones() as usize
    }

    /// Whether no channel is affected.
    pub fn is_empty(&self) -> bool {
        self.affected == 0
    }

    /// Affected channels with their new state, in ascending channel order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, bool)> + '_ {
        (0..MAX_CHANNELS).filter_map(move |ch| self.get(ch).map(|on| (ch, on)))
    }

    /// Merges the update onto `state`. Channels beyond `state` are ignored.
    pub fn apply(&self, state: &mut [bool]) {
        for (ch, on) in self.iter() {
            if let Some(slot) = state.get_mut(ch) {
                *slot = on;
            }
        }
    }
}

pub(crate) fn check_len(chs: &[bool], expected: usize) -> Result<(), Error> {
    if chs.len() != expected {
        return Err(Error::InvalidChannelCount { expected, actual: chs.len() });
    }
    Ok(())
}

pub(crate) fn count_enabled(chs: &[bool]) -> usize {
    chs.iter().filter(|on| **on).count()
}

/// Mask of the 16 channel block `block`, zero padded past the end of `chs`.
pub(crate) fn block_mask(chs: &[bool], block: usize) -> ChMask16 {
    let start = (block * NUM_OF_CHANNELS_IN_BLOCK).min(chs.len());
    let end = (start + NUM_OF_CHANNELS_IN_BLOCK).min(chs.len());
    ChMask16::from_statuses(&chs[start..end])
}

fn block(chs: &[bool], block: usize) -> &[bool] {
    let start = (block * NUM_OF_CHANNELS_IN_BLOCK).min(chs.len());
    let end = (start + NUM_OF_CHANNELS_IN_BLOCK).min(chs.len());
    &chs[start..end]
}

/// Generation for families built from whole 16 channel blocks plus optional all-on and
/// all-off commands.
pub(crate) fn generate_blocks(
    current: &[bool],
    desired: &[bool],
    channels: usize,
    all_on_cntl: Option<u8>,
    all_off_cntl: Option<u8>,
) -> Result<ChMaskCntlPairs, Error> {
    check_len(current, channels)?;
    check_len(desired, channels)?;

    let mut pairs = ChMaskCntlPairs::new();
    if current == desired {
        // capacity holds every family's largest block
        let _ = pairs.push(ChMaskCntlPair::new(0, block_mask(desired, 0)));
        return Ok(pairs);
    }
    let blocks = channels / NUM_OF_CHANNELS_IN_BLOCK;

    let mut best = ChMaskCntlPairs::new();
    for i in 0..blocks {
        if block(current, i) != block(desired, i) {
            let _ = best.push(ChMaskCntlPair::new(i as u8, block_mask(desired, i)));
        }
    }

    if let Some(cntl) = all_on_cntl {
        let mut candidate = ChMaskCntlPairs::new();
        let _ = candidate.push(ChMaskCntlPair::new(cntl, ChMask16::default()));
        for i in 0..blocks {
            if block(desired, i).iter().any(|on| !on) {
                let _ = candidate.push(ChMaskCntlPair::new(i as u8, block_mask(desired, i)));
            }
        }
        if candidate.len() < best.len() {
            best = candidate;
        }
    }

    if let Some(cntl) = all_off_cntl {
        let mut candidate = ChMaskCntlPairs::new();
        let _ = candidate.push(ChMaskCntlPair::new(cntl, ChMask16::default()));
        for i in 0..blocks {
            if block(desired, i).iter().any(|on| *on) {
                let _ = candidate.push(ChMaskCntlPair::new(i as u8, block_mask(desired, i)));
            }
        }
        if candidate.len() < best.len() {
            best = candidate;
        }
    }

    trace!("generated {} ChMask pairs for {} channels", best.len(), channels);
    Ok(best)
}
