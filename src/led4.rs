//! A device abstraction for a 4-digit, 7-segment LED display.
//!
//! Owns the cell and segment pins and multiplexes them from a background
//! task. Callers hand it a number or the dash pattern; the task keeps the
//! display lit until the next value arrives.

use core::convert::Infallible;

#[cfg(feature = "display-trace")]
use defmt::info;
use embassy_executor::{SpawnError, Spawner};
use embassy_futures::select::{Either, select};
use embassy_rp::gpio::Level;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, signal::Signal};
use embassy_time::{Duration, Timer};

use crate::Result;
use crate::seven_segment::{BitsToIndexes, SegmentFrame};

mod output_array;
pub use output_array::OutputArray;

/// The number of cells (digits) in the display.
pub(crate) const CELL_COUNT: usize = 4;

/// The number of segments per digit, decimal point included.
pub(crate) const SEGMENT_COUNT: usize = 8;

/// Sleep duration between multiplexing updates.
const MULTIPLEX_SLEEP: Duration = Duration::from_millis(3);

/// Static for the [`Led4`] device.
pub struct Led4Static(Signal<CriticalSectionRawMutex, SegmentFrame>);

impl Led4Static {
    const fn new() -> Self {
        Self(Signal::new())
    }

    fn signal(&self, frame: SegmentFrame) {
        self.0.signal(frame);
    }

    async fn wait(&self) -> SegmentFrame {
        self.0.wait().await
    }
}

/// A device abstraction for a 4-digit, 7-segment LED display.
///
/// Cell pins select the active digit (LOW = on, HIGH = off); segment pins
/// drive that digit's segments (HIGH = lit). Cells sharing a segment pattern
/// are lit together to cut multiplex iterations.
pub struct Led4<'a>(&'a Led4Static);

impl Led4<'_> {
    /// Creates static channel resources for the display.
    #[must_use]
    pub const fn new_static() -> Led4Static {
        Led4Static::new()
    }

    /// Creates the display device and spawns its background task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task cannot be spawned.
    #[must_use = "Must be used to manage the spawned task"]
    pub fn new(
        led4_static: &'static Led4Static,
        cell_pins: OutputArray<'static, CELL_COUNT>,
        segment_pins: OutputArray<'static, SEGMENT_COUNT>,
        spawner: Spawner,
    ) -> Result<Self, SpawnError> {
        let token = device_loop(cell_pins, segment_pins, led4_static)?;
        spawner.spawn(token);
        Ok(Self(led4_static))
    }

    /// Shows a prebuilt segment frame.
    pub fn show(&self, frame: SegmentFrame) {
        self.0.signal(frame);
    }

    /// Shows `number` right-aligned; values above 9999 display as 9999.
    pub fn show_number(&self, number: u16) {
        #[cfg(feature = "display-trace")]
        info!("show_number: {}", number);
        self.show(SegmentFrame::from_number(number));
    }

    /// Shows a dash in every cell, the not-synced-yet marker.
    pub fn show_dashes(&self) {
        #[cfg(feature = "display-trace")]
        info!("show_dashes");
        self.show(SegmentFrame::dashes());
    }
}

#[embassy_executor::task]
async fn device_loop(
    cell_pins: OutputArray<'static, CELL_COUNT>,
    segment_pins: OutputArray<'static, SEGMENT_COUNT>,
    led4_static: &'static Led4Static,
) -> ! {
    let err = inner_device_loop(cell_pins, segment_pins, led4_static)
        .await
        .unwrap_err();
    panic!("{err}");
}

async fn inner_device_loop(
    mut cell_pins: OutputArray<'static, CELL_COUNT>,
    mut segment_pins: OutputArray<'static, SEGMENT_COUNT>,
    led4_static: &'static Led4Static,
) -> Result<Infallible> {
    let mut frame = SegmentFrame::default();
    let mut bits_to_indexes = BitsToIndexes::default();
    'outer: loop {
        #[cfg(feature = "display-trace")]
        info!("frame: {:?}", frame);
        frame.bits_to_indexes(&mut bits_to_indexes)?;
        #[cfg(feature = "display-trace")]
        info!("# of unique cell patterns: {:?}", bits_to_indexes.len());

        match bits_to_indexes.iter().next() {
            // Blank display; nothing to multiplex until a new frame arrives.
            None => frame = led4_static.wait().await,
            // One shared pattern; light those cells steadily, no rotation.
            Some((&bits, indexes)) if bits_to_indexes.len() == 1 => {
                segment_pins.set_from_nonzero_bits(bits);
                cell_pins.set_levels_at_indexes(indexes, Level::Low)?;
                frame = led4_static.wait().await;
                cell_pins.set_levels_at_indexes(indexes, Level::High)?;
            }
            _ => loop {
                for (bits, indexes) in &bits_to_indexes {
                    segment_pins.set_from_nonzero_bits(*bits);
                    cell_pins.set_levels_at_indexes(indexes, Level::Low)?;
                    let timeout_or_signal =
                        select(Timer::after(MULTIPLEX_SLEEP), led4_static.wait()).await;
                    cell_pins.set_levels_at_indexes(indexes, Level::High)?;
                    if let Either::Second(notification) = timeout_or_signal {
                        frame = notification;
                        continue 'outer;
                    }
                }
            },
        }
    }
}
