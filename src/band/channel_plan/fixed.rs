//! Fixed channel plan processing (48, 64, 72 and 96 channels).

use super::{
    block_mask, check_len, count_enabled, generate_blocks, ChMaskCntlPair, ChMaskCntlPairs,
    ChMaskUpdate, Error, NUM_OF_CHANNELS_IN_BLOCK,
};
use crate::channel_mask::ChMask16;

/// Number of 125 kHz channels of a 72 channel plan.
pub const NUM_OF_125KHZ_CHANNELS: usize = 64;
/// Number of 500 kHz channels of a 72 channel plan.
pub const NUM_OF_500KHZ_CHANNELS: usize = 8;
/// Channels per fixed sub-band.
pub const NUM_OF_CHANNELS_IN_SUB_BAND: usize = 8;

fn parse_blocks(
    mask: ChMask16,
    cntl: u8,
    blocks: u8,
    channels: usize,
    all_on: Option<u8>,
    all_off: Option<u8>,
) -> Result<ChMaskUpdate, Error> {
    let mut update = ChMaskUpdate::new();
    if cntl < blocks {
        update.set_from_mask(cntl as usize * NUM_OF_CHANNELS_IN_BLOCK, NUM_OF_CHANNELS_IN_BLOCK, mask);
    } else if Some(cntl) == all_on {
        update.set_range(0, channels, true);
    } else if Some(cntl) == all_off {
        update.set_range(0, channels, false);
    } else {
        return Err(Error::UnsupportedChMaskCntl { cntl });
    }
    Ok(update)
}

/// ChMaskCntl 0..2 select a block of 16, 3 enables and 4 disables all 48 channels.
pub fn parse_ch_mask_48(mask: ChMask16, cntl: u8) -> Result<ChMaskUpdate, Error> {
    parse_blocks(mask, cntl, 3, 48, Some(3), Some(4))
}

/// Shortest block for a 48 channel plan.
pub fn generate_ch_masks_48(current: &[bool], desired: &[bool]) -> Result<ChMaskCntlPairs, Error> {
    generate_blocks(current, desired, 48, Some(3), Some(4))
}

/// ChMaskCntl 0..3 select a block of 16, 6 enables and 7 disables all 64 channels.
pub fn parse_ch_mask_64(mask: ChMask16, cntl: u8) -> Result<ChMaskUpdate, Error> {
    parse_blocks(mask, cntl, 4, 64, Some(6), Some(7))
}

/// Shortest block for a 64 channel plan.
pub fn generate_ch_masks_64(current: &[bool], desired: &[bool]) -> Result<ChMaskCntlPairs, Error> {
    generate_blocks(current, desired, 64, Some(6), Some(7))
}

/// ChMaskCntl 0..5 select a block of 16, 6 enables all 96 channels.
pub fn parse_ch_mask_96(mask: ChMask16, cntl: u8) -> Result<ChMaskUpdate, Error> {
    parse_blocks(mask, cntl, 6, 96, Some(6), None)
}

/// Shortest block for a 96 channel plan.
pub fn generate_ch_masks_96(current: &[bool], desired: &[bool]) -> Result<ChMaskCntlPairs, Error> {
    generate_blocks(current, desired, 96, Some(6), None)
}

/// Channels controlled by one LinkADRReq of a 72 channel plan.
///
/// * 0..3: a block of 16 125 kHz channels
/// * 4: the 500 kHz channels 64..71 from the low byte
/// * 5: each low bit enables or disables a sub-band of 8 125 kHz channels
/// * 6 and 7: all 125 kHz channels on or off, 500 kHz channels from the low byte
pub fn parse_ch_mask_72(mask: ChMask16, cntl: u8, cntl5: bool) -> Result<ChMaskUpdate, Error> {
    let mut update = ChMaskUpdate::new();
    match cntl {
        0..=3 => update.set_from_mask(
            cntl as usize * NUM_OF_CHANNELS_IN_BLOCK,
            NUM_OF_CHANNELS_IN_BLOCK,
            mask,
        ),
        4 => update.set_from_mask(NUM_OF_125KHZ_CHANNELS, NUM_OF_500KHZ_CHANNELS, mask),
        5 if cntl5 => {
            for sub_band in 0..NUM_OF_125KHZ_CHANNELS / NUM_OF_CHANNELS_IN_SUB_BAND {
                update.set_range(
                    sub_band * NUM_OF_CHANNELS_IN_SUB_BAND,
                    NUM_OF_CHANNELS_IN_SUB_BAND,
                    mask.is_enabled(sub_band),
                );
            }
        }
        6 | 7 => {
            update.set_range(0, NUM_OF_125KHZ_CHANNELS, cntl == 6);
            update.set_from_mask(NUM_OF_125KHZ_CHANNELS, NUM_OF_500KHZ_CHANNELS, mask);
        }
        _ => return Err(Error::UnsupportedChMaskCntl { cntl }),
    }
    Ok(update)
}

fn block_72(chs: &[bool], block: usize) -> &[bool] {
    if block < 4 {
        &chs[block * NUM_OF_CHANNELS_IN_BLOCK..(block + 1) * NUM_OF_CHANNELS_IN_BLOCK]
    } else {
        &chs[NUM_OF_125KHZ_CHANNELS..]
    }
}

/// The 500 kHz channels as the low byte of a mask.
fn mask_500khz(chs: &[bool]) -> ChMask16 {
    ChMask16::from_statuses(&chs[NUM_OF_125KHZ_CHANNELS..])
}

fn push(pairs: &mut ChMaskCntlPairs, cntl: u8, mask: ChMask16) {
    // capacity covers the largest candidate of a 72 channel plan
    let _ = pairs.push(ChMaskCntlPair::new(cntl, mask));
}

fn matrix_72(current: &[bool], desired: &[bool]) -> ChMaskCntlPairs {
    let mut pairs = ChMaskCntlPairs::new();
    for i in 0..4 {
        if block_72(current, i) != block_72(desired, i) {
            push(&mut pairs, i as u8, block_mask(desired, i));
        }
    }
    if block_72(current, 4) != block_72(desired, 4) {
        push(&mut pairs, 4, mask_500khz(desired));
    }
    pairs
}

fn primed_72(desired: &[bool], all_on: bool) -> ChMaskCntlPairs {
    let mut pairs = ChMaskCntlPairs::new();
    push(&mut pairs, if all_on { 6 } else { 7 }, mask_500khz(desired));
    for i in 0..4 {
        let differs = if all_on {
            block_72(desired, i).iter().any(|on| !on)
        } else {
            block_72(desired, i).iter().any(|on| *on)
        };
        if differs {
            push(&mut pairs, i as u8, block_mask(desired, i));
        }
    }
    pairs
}

fn sub_band_primed_72(current: &[bool], desired: &[bool]) -> ChMaskCntlPairs {
    let mut primed = [false; 72];
    primed[NUM_OF_125KHZ_CHANNELS..].copy_from_slice(&current[NUM_OF_125KHZ_CHANNELS..]);
    let mut sub_bands = ChMask16::default();
    for (i, chs) in desired[..NUM_OF_125KHZ_CHANNELS]
        .chunks(NUM_OF_CHANNELS_IN_SUB_BAND)
        .enumerate()
    {
        let on = chs.iter().all(|on| *on);
        sub_bands.set_channel(i, on);
        for slot in primed[i * NUM_OF_CHANNELS_IN_SUB_BAND..][..NUM_OF_CHANNELS_IN_SUB_BAND].iter_mut() {
            *slot = on;
        }
    }
    let mut pairs = ChMaskCntlPairs::new();
    push(&mut pairs, 5, sub_bands);
    for pair in matrix_72(&primed, desired) {
        push(&mut pairs, pair.cntl, pair.mask);
    }
    pairs
}

/// Whether applying `pairs` one by one ever leaves `current` without an enabled channel.
fn mutes_device(current: &[bool], pairs: &[ChMaskCntlPair], cntl5: bool) -> bool {
    let mut state = [false; 72];
    state.copy_from_slice(current);
    for pair in pairs {
        match parse_ch_mask_72(pair.mask, pair.cntl, cntl5) {
            Ok(update) => update.apply(&mut state),
            Err(_) => return true,
        }
        if count_enabled(&state) == 0 {
            return true;
        }
    }
    false
}

/// Shortest block for a 72 channel plan.
///
/// Candidates are the plain matrix block, blocks primed with ChMaskCntl 6 or 7 and, when the
/// band supports it, a block primed with ChMaskCntl 5. Ties favour the matrix block, then
/// ChMaskCntl 6. A device that does not apply the block atomically falls back to the matrix
/// block ordered by descending number of enabled channels whenever the chosen block would
/// pass through a state without any enabled channel.
pub fn generate_ch_masks_72(
    current: &[bool],
    desired: &[bool],
    cntl5: bool,
    atomic: bool,
) -> Result<ChMaskCntlPairs, Error> {
    check_len(current, 72)?;
    check_len(desired, 72)?;

    if current == desired {
        let mut pairs = ChMaskCntlPairs::new();
        push(&mut pairs, 0, block_mask(desired, 0));
        return Ok(pairs);
    }

    let matrix = matrix_72(current, desired);
    let mut best = matrix.clone();
    for candidate in [primed_72(desired, true), primed_72(desired, false)] {
        if candidate.len() < best.len() {
            best = candidate;
        }
    }
    if cntl5 {
        let candidate = sub_band_primed_72(current, desired);
        if candidate.len() < best.len() {
            best = candidate;
        }
    }

    if !atomic && mutes_device(current, &best, cntl5) {
        debug!("falling back to ordered matrix ChMask block");
        let mut ordered = matrix;
        ordered.sort_unstable_by_key(|pair| (core::cmp::Reverse(pair.mask.count_enabled()), pair.cntl));
        best = ordered;
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::channel_plan::ChMaskFamily;

    fn apply(family: ChMaskFamily, current: &[bool], pairs: &[ChMaskCntlPair]) -> [bool; 96] {
        let mut state = [false; 96];
        state[..current.len()].copy_from_slice(current);
        family.apply(&mut state[..current.len()], pairs).unwrap();
        state
    }

    #[test]
    fn parse_48_all_off_covers_every_channel() {
        let update = parse_ch_mask_48(ChMask16::default(), 4).unwrap();
        assert_eq!(update.len(), 48);
        assert_eq!(update.get(47), Some(false));
        assert_eq!(update.get(48), None);
        assert!(parse_ch_mask_48(ChMask16::default(), 5).is_err());
    }

    #[test]
    fn parse_96_selects_blocks() {
        let update = parse_ch_mask_96(ChMask16::from(0x8001), 5).unwrap();
        assert_eq!(update.get(80), Some(true));
        assert_eq!(update.get(95), Some(true));
        assert_eq!(update.get(81), Some(false));
        assert_eq!(update.get(79), None);
        assert_eq!(parse_ch_mask_96(ChMask16::default(), 6).unwrap().len(), 96);
        assert!(parse_ch_mask_96(ChMask16::default(), 7).is_err());
    }

    #[test]
    fn parse_72_sub_bands() {
        let update = parse_ch_mask_72(ChMask16::from(0b10), 5, true).unwrap();
        assert_eq!(update.len(), 64);
        assert_eq!(update.get(7), Some(false));
        assert_eq!(update.get(8), Some(true));
        assert_eq!(update.get(15), Some(true));
        assert_eq!(update.get(64), None);
        assert_eq!(
            parse_ch_mask_72(ChMask16::from(0b10), 5, false),
            Err(Error::UnsupportedChMaskCntl { cntl: 5 })
        );
    }

    #[test]
    fn parse_72_all_off_keeps_500khz_from_mask() {
        let update = parse_ch_mask_72(ChMask16::from(0x01), 7, false).unwrap();
        assert_eq!(update.get(0), Some(false));
        assert_eq!(update.get(64), Some(true));
        assert_eq!(update.get(65), Some(false));
    }

    #[test]
    fn generate_72_single_500khz_change() {
        let mut current = [true; 72];
        current[64..].fill(false);
        let mut desired = current;
        desired[64] = true;
        let pairs = generate_ch_masks_72(&current, &desired, true, true).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].cntl, 4);
        assert_eq!(pairs[0].mask.value(), 0x0001);
    }

    #[test]
    fn generate_72_prefers_sub_band_priming() {
        let current = [true; 72];
        let mut desired = [false; 72];
        desired[8..16].fill(true);
        desired[65] = true;
        let pairs = generate_ch_masks_72(&current, &desired, true, true).unwrap();
        // ChMaskCntl 7 with the 500 kHz byte plus one block
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].cntl, 7);
        assert_eq!(apply(ChMaskFamily::SeventyTwo { cntl5: true }, &current, &pairs)[..72], desired);

        let mut desired = [false; 72];
        desired[0..8].fill(true);
        desired[24..32].fill(true);
        desired[40..48].fill(true);
        desired[56..64].fill(true);
        let current = [false; 72];
        let pairs = generate_ch_masks_72(&current, &desired, true, true).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].cntl, 5);
        assert_eq!(pairs[0].mask.value(), 0b1010_1001);
    }

    #[test]
    fn generate_72_non_atomic_never_mutes() {
        let mut current = [false; 72];
        current[0] = true;
        let mut desired = [false; 72];
        desired[20] = true;
        let atomic = generate_ch_masks_72(&current, &desired, false, true).unwrap();
        assert_eq!(atomic[0].cntl, 0);
        let pairs = generate_ch_masks_72(&current, &desired, false, false).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].cntl, 1);
        assert!(!mutes_device(&current, &pairs, false));
        assert_eq!(apply(ChMaskFamily::SeventyTwo { cntl5: false }, &current, &pairs)[..72], desired);
    }

    #[test]
    fn generate_64_uses_all_off() {
        let current = [true; 64];
        let mut desired = [false; 64];
        desired[33] = true;
        let pairs = generate_ch_masks_64(&current, &desired).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].cntl, 7);
        assert_eq!(pairs[1].cntl, 2);
    }

    #[test]
    fn generate_48_uses_all_on() {
        let current = [false; 48];
        let mut desired = [true; 48];
        desired[47] = false;
        let pairs = generate_ch_masks_48(&current, &desired).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].cntl, 3);
        assert_eq!(pairs[1].cntl, 2);
        assert_eq!(apply(ChMaskFamily::FortyEight, &current, &pairs)[..48], desired);
    }
}
