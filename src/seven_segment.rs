//! Segment patterns for a 4-digit 7-segment display.

use core::num::NonZeroU8;
use core::ops::Index;

use heapless::{LinearMap, Vec};

use crate::error::{Error, Result};

/// Number of digits in the display.
const CELL_COUNT: usize = 4;
const CELL_COUNT_U8: u8 = CELL_COUNT as u8;

/// Segments for digits 0-9, bit 0 = segment A through bit 6 = segment G.
const DIGITS: [u8; 10] = [
    0b_0011_1111, // Digit 0
    0b_0000_0110, // Digit 1
    0b_0101_1011, // Digit 2
    0b_0100_1111, // Digit 3
    0b_0110_0110, // Digit 4
    0b_0110_1101, // Digit 5
    0b_0111_1101, // Digit 6
    0b_0000_0111, // Digit 7
    0b_0111_1111, // Digit 8
    0b_0110_1111, // Digit 9
];

/// The middle segment alone; shown on every cell while the clock is unsynced.
const DASH: u8 = 0b_0100_0000;

/// Largest number the display can render.
const MAX_NUMBER: u16 = 9999;

/// Maps segment bit patterns to the indexes of cells that share that pattern,
/// so multiplexing can light identical cells together.
#[doc(hidden)]
pub type BitsToIndexes = LinearMap<NonZeroU8, Vec<u8, CELL_COUNT>, CELL_COUNT>;

/// Raw segment bit patterns for all four cells, left to right.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentFrame([u8; CELL_COUNT]);

impl SegmentFrame {
    /// All cells blank.
    #[must_use]
    pub const fn blank() -> Self {
        Self([0; CELL_COUNT])
    }

    /// A dash in every cell.
    #[must_use]
    pub const fn dashes() -> Self {
        Self([DASH; CELL_COUNT])
    }

    /// Renders `number` right-aligned without leading zeros. Values above
    /// 9999 are shown as 9999.
    #[expect(
        clippy::indexing_slicing,
        clippy::integer_division_remainder_used,
        reason = "digit extraction by modulo stays within the table"
    )]
    #[must_use]
    pub fn from_number(number: u16) -> Self {
        let mut number = number.min(MAX_NUMBER);
        let mut frame = Self::blank();

        for bits in frame.iter_mut().rev() {
            *bits = DIGITS[(number % 10) as usize];
            number /= 10;
            if number == 0 {
                break;
            }
        }

        frame
    }

    pub fn iter(&self) -> impl Iterator<Item = &u8> {
        self.0.iter()
    }

    fn iter_mut(&mut self) -> core::slice::IterMut<'_, u8> {
        self.0.iter_mut()
    }

    /// Converts to the grouped index mapping used by the multiplex loop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BitsToIndexesFull`] when the map cannot hold another
    /// entry, which cannot happen for four cells and a map of capacity four.
    #[doc(hidden)]
    pub fn bits_to_indexes(&self, bits_to_index: &mut BitsToIndexes) -> Result<()> {
        bits_to_index.clear();
        for (&bits, index) in self.iter().zip(0..CELL_COUNT_U8) {
            if let Some(nonzero_bits) = NonZeroU8::new(bits) {
                if let Some(vec) = bits_to_index.get_mut(&nonzero_bits) {
                    vec.push(index).map_err(|_| Error::BitsToIndexesFull)?;
                } else {
                    let vec = Vec::from_slice(&[index]).map_err(|_| Error::BitsToIndexesFull)?;
                    bits_to_index
                        .insert(nonzero_bits, vec)
                        .map_err(|_| Error::BitsToIndexesFull)?;
                }
            }
        }
        Ok(())
    }
}

impl Default for SegmentFrame {
    fn default() -> Self {
        Self::blank()
    }
}

impl Index<usize> for SegmentFrame {
    type Output = u8;

    #[expect(clippy::indexing_slicing, reason = "Caller's responsibility")]
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

#[cfg(all(test, not(target_os = "none")))]
mod tests {
    use super::*;

    #[test]
    fn test_from_number() {
        let frame = SegmentFrame::from_number(1234);
        assert_eq!(frame[0], 0b_0000_0110); // '1'
        assert_eq!(frame[1], 0b_0101_1011); // '2'
        assert_eq!(frame[2], 0b_0100_1111); // '3'
        assert_eq!(frame[3], 0b_0110_0110); // '4'
    }

    #[test]
    fn test_from_number_no_leading_zeros() {
        let frame = SegmentFrame::from_number(42);
        assert_eq!(frame[0], 0);
        assert_eq!(frame[1], 0);
        assert_eq!(frame[2], 0b_0110_0110); // '4'
        assert_eq!(frame[3], 0b_0101_1011); // '2'
    }

    #[test]
    fn test_from_number_zero() {
        let frame = SegmentFrame::from_number(0);
        assert_eq!(frame[0], 0);
        assert_eq!(frame[1], 0);
        assert_eq!(frame[2], 0);
        assert_eq!(frame[3], 0b_0011_1111); // '0'
    }

    #[test]
    fn test_from_number_clamps_above_9999() {
        assert_eq!(
            SegmentFrame::from_number(10_000),
            SegmentFrame::from_number(9999)
        );
        assert_eq!(
            SegmentFrame::from_number(u16::MAX),
            SegmentFrame::from_number(9999)
        );
    }

    #[test]
    fn test_dashes() {
        let frame = SegmentFrame::dashes();
        for &bits in frame.iter() {
            assert_eq!(bits, 0b_0100_0000);
        }
    }

    #[test]
    fn test_bits_to_indexes_groups_identical_cells() {
        // For 1221, '1' appears at positions 0 and 3, '2' at positions 1 and 2.
        let frame = SegmentFrame::from_number(1221);
        let mut bits_to_index = BitsToIndexes::new();

        frame
            .bits_to_indexes(&mut bits_to_index)
            .expect("four cells always fit");

        assert_eq!(bits_to_index.len(), 2);

        let pattern_1 = NonZeroU8::new(0b_0000_0110).unwrap();
        let indexes = bits_to_index.get(&pattern_1).expect("'1' must be present");
        assert_eq!(indexes.len(), 2);
        assert!(indexes.contains(&0));
        assert!(indexes.contains(&3));

        let pattern_2 = NonZeroU8::new(0b_0101_1011).unwrap();
        let indexes = bits_to_index.get(&pattern_2).expect("'2' must be present");
        assert_eq!(indexes.len(), 2);
        assert!(indexes.contains(&1));
        assert!(indexes.contains(&2));
    }

    #[test]
    fn test_bits_to_indexes_skips_blank_cells() {
        let frame = SegmentFrame::from_number(7);
        let mut bits_to_index = BitsToIndexes::new();

        frame
            .bits_to_indexes(&mut bits_to_index)
            .expect("four cells always fit");

        // Three blank cells are not mapped; only '7' is.
        assert_eq!(bits_to_index.len(), 1);
        let pattern_7 = NonZeroU8::new(0b_0000_0111).unwrap();
        let indexes = bits_to_index.get(&pattern_7).expect("'7' must be present");
        assert_eq!(indexes.as_slice(), &[3]);
    }
}
