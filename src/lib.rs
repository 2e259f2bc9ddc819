#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod band;
pub mod channel_mask;
pub mod encoding;
pub mod frequency;
pub mod gps;
pub mod types;

pub use band::{get, get_latest, Band, BandId, PhyVersion};
pub use channel_mask::{ChMask16, ChannelMask};
pub use encoding::creator::marshal_message;
pub use encoding::parser::unmarshal_message;
pub use types::{DevAddr, Eui64, DR};

/// Any error raised by the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[allow(missing_docs)]
pub enum Error {
    #[error(transparent)]
    Band(#[from] band::Error),
    #[error(transparent)]
    ChannelPlan(#[from] band::channel_plan::Error),
    #[error(transparent)]
    Encoding(#[from] encoding::Error),
}
