//! WiFi client for the Pico W's CYW43439 radio.
//!
//! Brings the chip up, joins the configured network, and keeps the DHCP
//! stack alive, rejoining whenever the link drops. Consumers that need the
//! network await [`Wifi::stack`], which resolves once DHCP has an address.

#![allow(clippy::future_not_send, reason = "single-threaded")]
#![allow(
    unsafe_code,
    reason = "StackStorage uses UnsafeCell in single-threaded context"
)]

use core::cell::UnsafeCell;

use cyw43::JoinOptions;
use cyw43_pio::{DEFAULT_CLOCK_DIVIDER, PioSpi};
use defmt::{error, info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_net::{Config, Stack, StackResources};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::{DMA_CH0, PIN_23, PIN_24, PIN_25, PIN_29, PIO0};
use embassy_rp::pio::{InterruptHandler, Pio};
use embassy_rp::{Peri, bind_interrupts};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Timer, with_timeout};
use portable_atomic::{AtomicBool, Ordering};
use static_cell::StaticCell;

/// Bound on a single join attempt before it is logged and retried.
const WIFI_CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

/// Network name and passphrase, baked in at build time.
#[derive(Clone, Copy)]
pub struct WifiCredentials {
    pub ssid: &'static str,
    pub password: &'static str,
}

/// Single-threaded once-storage for the network stack.
///
/// SAFETY: init happens once from the WiFi device loop; readers only see the
/// value after the initialized flag is set.
struct StackStorage {
    initialized: AtomicBool,
    ready: Signal<CriticalSectionRawMutex, ()>,
    value: UnsafeCell<Option<&'static Stack<'static>>>,
}

// SAFETY: We're in a single-threaded context (Embassy on Pico)
unsafe impl Sync for StackStorage {}

impl StackStorage {
    const fn new() -> Self {
        Self {
            initialized: AtomicBool::new(false),
            ready: Signal::new(),
            value: UnsafeCell::new(None),
        }
    }

    fn init(&self, stack: &'static Stack<'static>) {
        // SAFETY: This is called once from the WiFi device loop
        unsafe {
            *self.value.get() = Some(stack);
        }
        self.initialized.store(true, Ordering::Release);
        self.ready.signal(());
    }

    async fn get(&self) -> &'static Stack<'static> {
        if !self.initialized.load(Ordering::Acquire) {
            self.ready.wait().await;
        }
        // SAFETY: initialized is true, so value is set
        unsafe { (*self.value.get()).unwrap_or_else(|| core::unreachable!()) }
    }

    fn try_get(&self) -> Option<&'static Stack<'static>> {
        if !self.initialized.load(Ordering::Acquire) {
            return None;
        }
        // SAFETY: initialized is true, so value is set
        unsafe { *self.value.get() }
    }
}

/// Resources needed by the WiFi device.
pub struct WifiStatic {
    stack: StackStorage,
    wifi_cell: StaticCell<Wifi>,
}

/// A device abstraction that owns the radio and the network stack.
pub struct Wifi {
    stack: &'static StackStorage,
}

impl Wifi {
    /// Create WiFi resources. Call once and keep in a `static`.
    #[must_use]
    pub const fn new_static() -> WifiStatic {
        WifiStatic {
            stack: StackStorage::new(),
            wifi_cell: StaticCell::new(),
        }
    }

    /// Create the WiFi device and spawn its background task.
    ///
    /// The task powers the chip, joins `credentials.ssid`, and then watches
    /// the link. The returned handle is alive for the rest of the program.
    #[expect(clippy::too_many_arguments, reason = "each pin is wired separately")]
    pub fn new(
        wifi_static: &'static WifiStatic,
        pin_23: Peri<'static, PIN_23>,
        pin_25: Peri<'static, PIN_25>,
        pio0: Peri<'static, PIO0>,
        pin_24: Peri<'static, PIN_24>,
        pin_29: Peri<'static, PIN_29>,
        dma_ch0: Peri<'static, DMA_CH0>,
        credentials: WifiCredentials,
        spawner: Spawner,
    ) -> &'static Self {
        let token = unwrap!(wifi_device_loop(
            pin_23,
            pin_25,
            pio0,
            pin_24,
            pin_29,
            dma_ch0,
            credentials,
            &wifi_static.stack,
            spawner,
        ));
        spawner.spawn(token);
        wifi_static.wifi_cell.init(Self {
            stack: &wifi_static.stack,
        })
    }

    /// Wait until DHCP has configured the stack and return it.
    pub async fn stack(&self) -> &'static Stack<'static> {
        self.stack.get().await
    }

    /// Whether the link currently has a DHCP configuration. False before the
    /// first association and while a lost link is being rejoined.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.stack.try_get().is_some_and(|stack| stack.is_config_up())
    }
}

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => InterruptHandler<PIO0>;
});

#[embassy_executor::task]
async fn wifi_device_loop(
    pin_23: Peri<'static, PIN_23>,
    pin_25: Peri<'static, PIN_25>,
    pio0: Peri<'static, PIO0>,
    pin_24: Peri<'static, PIN_24>,
    pin_29: Peri<'static, PIN_29>,
    dma_ch0: Peri<'static, DMA_CH0>,
    credentials: WifiCredentials,
    stack_storage: &'static StackStorage,
    spawner: Spawner,
) -> ! {
    info!("WiFi device initializing in client mode");

    let fw = cyw43_firmware::CYW43_43439A0;
    let clm = cyw43_firmware::CYW43_43439A0_CLM;

    let pwr = Output::new(pin_23, Level::Low);
    let cs = Output::new(pin_25, Level::High);
    let mut pio = Pio::new(pio0, Irqs);
    let spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        pin_24,
        pin_29,
        dma_ch0,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw).await;
    let wifi_token = unwrap!(wifi_task(runner));
    spawner.spawn(wifi_token);

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::PowerSave)
        .await;

    let config = Config::dhcpv4(Default::default());
    let seed = 0x9e37_79b9_7f4a_7c15;

    static RESOURCES: StaticCell<StackResources<5>> = StaticCell::new();
    static STACK: StaticCell<Stack<'static>> = StaticCell::new();
    let (stack_val, runner) = embassy_net::new(
        net_device,
        config,
        RESOURCES.init(StackResources::<5>::new()),
        seed,
    );
    let stack = STACK.init(stack_val);

    let net_token = unwrap!(net_task(runner));
    spawner.spawn(net_token);

    join_until_connected(&mut control, &credentials).await;

    info!("WiFi connected! Waiting for DHCP...");
    stack.wait_config_up().await;
    if let Some(config) = stack.config_v4() {
        info!("IP Address: {}", config.address);
    }
    info!("WiFi client ready");

    stack_storage.init(stack);

    // Link watch: when DHCP config drops the access point is gone; rejoin
    // and wait for a fresh lease.
    loop {
        stack.wait_config_down().await;
        warn!("WiFi link lost; reconnecting to {}", credentials.ssid);
        join_until_connected(&mut control, &credentials).await;
        stack.wait_config_up().await;
        if let Some(config) = stack.config_v4() {
            info!("WiFi reconnected, IP Address: {}", config.address);
        }
    }
}

/// Join the configured network, retrying until it succeeds. Each attempt is
/// bounded so a wrong passphrase or absent network keeps producing logs
/// instead of hanging silently.
async fn join_until_connected(control: &mut cyw43::Control<'static>, credentials: &WifiCredentials) {
    info!("Connecting to WiFi: {}", credentials.ssid);
    loop {
        let join = control.join(
            credentials.ssid,
            JoinOptions::new(credentials.password.as_bytes()),
        );
        match with_timeout(WIFI_CONNECT_TIMEOUT, join).await {
            Ok(Ok(())) => break,
            Ok(Err(err)) => {
                warn!("Join failed: {}", err.status);
                Timer::after_secs(1).await;
            }
            Err(_) => {
                error!(
                    "WiFi connection attempt timed out after {} s; retrying",
                    WIFI_CONNECT_TIMEOUT.as_secs()
                );
            }
        }
    }
}

#[embassy_executor::task]
async fn wifi_task(
    runner: cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>,
) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}
