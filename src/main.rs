//! A 4-digit 7-segment countdown clock: hours left until a target moment.
//!
//! Runs on a Raspberry Pi Pico W RP2040. See the `README.md` for more information.
#![no_std]
#![no_main]
#![allow(clippy::future_not_send, reason = "Single-threaded")]

use core::convert::Infallible;

use countdown_clock::countdown::days_and_remainder;
use countdown_clock::{
    Config, Countdown, DisplayValue, Hardware, Led4, Led4Static, Reporter, Result, SyncedClock,
    TimeSync, TimeSyncEvent, TimeSyncStatic,
};
#[cfg(feature = "wifi")]
use countdown_clock::{Wifi, WifiCredentials, WifiStatic};
use defmt::info;
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_futures::select::{Either, select};
use embassy_time::{Duration, Instant, Timer};
use panic_probe as _;

/// Pace of the orchestrator loop. Reports, display pushes, and mode flips all
/// run on their own deadlines inside [`Reporter`].
const TICK: Duration = Duration::from_secs(1);

/// Wall-clock time, anchored whenever the time-sync task reports success.
static CLOCK: SyncedClock = SyncedClock::new();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) -> ! {
    // If it returns, something went wrong.
    let err = inner_main(spawner).await.unwrap_err();
    panic!("{err}");
}

async fn inner_main(spawner: Spawner) -> Result<Infallible> {
    let config = Config::from_build_env()?;
    let hardware = Hardware::default();

    static LED4_STATIC: Led4Static = Led4::new_static();
    let led4 = Led4::new(&LED4_STATIC, hardware.cells, hardware.segments, spawner)?;
    led4.show_dashes();

    let countdown = Countdown::new(&config.tz, config.target_datetime, config.target_label)?;
    info!(
        "Counting down to {} (unix {})",
        countdown.label(),
        countdown.target().as_i64()
    );

    #[cfg(feature = "wifi")]
    let (wifi, time_sync) = {
        static WIFI_STATIC: WifiStatic = Wifi::new_static();
        let wifi = Wifi::new(
            &WIFI_STATIC,
            hardware.pin_23,
            hardware.pin_25,
            hardware.pio0,
            hardware.pin_24,
            hardware.pin_29,
            hardware.dma_ch0,
            WifiCredentials {
                ssid: config.wifi_ssid,
                password: config.wifi_pass,
            },
            spawner,
        );
        static TIME_SYNC_STATIC: TimeSyncStatic = TimeSync::new_static();
        let time_sync = TimeSync::new(
            &TIME_SYNC_STATIC,
            wifi,
            config.ntp_servers,
            Duration::from_millis(config.sync_grace_ms),
            Duration::from_millis(config.resync_interval_ms),
            spawner,
        );
        (wifi, time_sync)
    };
    #[cfg(not(feature = "wifi"))]
    let time_sync = {
        static TIME_SYNC_STATIC: TimeSyncStatic = TimeSync::new_static();
        TimeSync::new(&TIME_SYNC_STATIC, spawner)
    };

    let mut reporter = Reporter::new(config.print_interval_ms, config.display_mode_ms);

    loop {
        let remaining = countdown.hours_remaining(CLOCK.now());
        let actions = reporter.step(Instant::now().as_millis(), remaining);

        if actions.announce_waiting {
            #[cfg(feature = "wifi")]
            if wifi.is_connected() {
                info!("Waiting for time sync...");
            } else {
                info!("Waiting for time sync (network link down)...");
            }
            #[cfg(not(feature = "wifi"))]
            info!("Waiting for time sync (no network in this build)...");
        }
        if let Some(hours) = actions.report {
            let (days, day_hours) = days_and_remainder(hours);
            info!(
                "Hours left until {}: {} (≈ {} days {} h)",
                countdown.label(),
                hours,
                days,
                day_hours
            );
        }
        match actions.show {
            Some(DisplayValue::Dashes) => led4.show_dashes(),
            Some(DisplayValue::Number(number)) => led4.show_number(number),
            None => {}
        }

        match select(Timer::after(TICK), time_sync.wait()).await {
            Either::First(()) => {}
            Either::Second(TimeSyncEvent::Success { unix_seconds }) => {
                CLOCK.set_from_unix(unix_seconds);
                info!("Time synced: unix {}", unix_seconds.as_i64());
            }
            Either::Second(TimeSyncEvent::Failed(message)) => {
                info!("Time sync failed: {}", message);
            }
        }
    }
}
