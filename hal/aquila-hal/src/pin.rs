//! GPIO pin identity

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Opaque identity of a GPIO pin, as packed by the board definition
///
/// The board definition assigns each usable pin a non-zero tag; the
/// output driver only passes tags through to the backend and never
/// interprets the packing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinTag(pub u8);
