//! Dynamic channel plan processing (16 channels, EU868-like bands).

use super::{generate_blocks, ChMaskCntlPairs, ChMaskUpdate, Error};
use crate::channel_mask::ChMask16;

/// Number of channels of a dynamic channel plan.
pub const MAX_CHANNELS: usize = 16;

/// ChMaskCntl 0 sets channels 0..15 from the mask, 6 enables every defined channel.
pub fn parse_ch_mask_16(mask: ChMask16, cntl: u8) -> Result<ChMaskUpdate, Error> {
    let mut update = ChMaskUpdate::new();
    match cntl {
        0 => update.set_from_mask(0, MAX_CHANNELS, mask),
        6 => update.set_range(0, MAX_CHANNELS, true),
        _ => return Err(Error::UnsupportedChMaskCntl { cntl }),
    }
    Ok(update)
}

/// Shortest block for a dynamic channel plan.
pub fn generate_ch_masks_16(current: &[bool], desired: &[bool]) -> Result<ChMaskCntlPairs, Error> {
    generate_blocks(current, desired, MAX_CHANNELS, Some(6), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_matrix_and_all_on() {
        let update = parse_ch_mask_16(ChMask16::from(0x0007), 0).unwrap();
        assert_eq!(update.len(), 16);
        assert_eq!(update.get(2), Some(true));
        assert_eq!(update.get(3), Some(false));

        let update = parse_ch_mask_16(ChMask16::default(), 6).unwrap();
        assert!(update.iter().all(|(_, on)| on));
        assert_eq!(
            parse_ch_mask_16(ChMask16::default(), 1),
            Err(Error::UnsupportedChMaskCntl { cntl: 1 })
        );
    }

    #[test]
    fn generate_is_a_single_matrix_command() {
        let current = [true; 16];
        let mut desired = [false; 16];
        desired[0] = true;
        desired[2] = true;
        let pairs = generate_ch_masks_16(&current, &desired).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].cntl, 0);
        assert_eq!(pairs[0].mask.value(), 0b101);
    }

    #[test]
    fn generate_without_change_is_a_no_op() {
        let mut chs = [false; 16];
        chs[1] = true;
        let pairs = generate_ch_masks_16(&chs, &chs).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].cntl, 0);
        assert_eq!(pairs[0].mask.value(), 0b10);
    }

    #[test]
    fn generate_rejects_wrong_size() {
        assert_eq!(
            generate_ch_masks_16(&[true; 16], &[true; 8]),
            Err(Error::InvalidChannelCount { expected: 16, actual: 8 })
        );
    }
}
