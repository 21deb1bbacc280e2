use core::num::NonZeroU8;

use embassy_rp::gpio::{self, Level};

use crate::Result;
use crate::error::Error::IndexOutOfBounds;

/// A fixed-size group of GPIO output pins driven together, used for the
/// display's cell-select and segment lines.
pub struct OutputArray<'a, const N: usize>([gpio::Output<'a>; N]);

impl<'a, const N: usize> OutputArray<'a, N> {
    pub const fn new(outputs: [gpio::Output<'a>; N]) -> Self {
        Self(outputs)
    }

    #[inline]
    pub(crate) fn set_levels_at_indexes(&mut self, indexes: &[u8], level: Level) -> Result<()> {
        for &index in indexes {
            self.set_level_at_index(index, level)?;
        }
        Ok(())
    }

    #[inline]
    fn set_level_at_index(&mut self, index: u8, level: Level) -> Result<()> {
        self.0
            .get_mut(index as usize)
            .ok_or(IndexOutOfBounds)?
            .set_level(level);
        Ok(())
    }
}

impl OutputArray<'_, { u8::BITS as usize }> {
    /// Drives one pin per bit, LSB first; set bits go HIGH.
    #[expect(clippy::shadow_reuse, reason = "Converting NonZeroU8 to u8")]
    #[inline]
    pub(crate) fn set_from_nonzero_bits(&mut self, bits: NonZeroU8) {
        let mut bits = bits.get();
        for output in &mut self.0 {
            let level: Level = ((bits & 1) == 1).into();
            output.set_level(level);
            bits >>= 1;
        }
    }
}
