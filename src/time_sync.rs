//! A device abstraction for NTP time synchronization over WiFi.
//!
//! Runs its own schedule: one attempt as soon as the network is up, retries
//! on a short grace interval until the first success, then a slow periodic
//! resync (with the same grace retries after a failed attempt). Consumers
//! watch [`TimeSync::wait`] for the outcome of each attempt.

#![allow(clippy::future_not_send, reason = "single-threaded")]

#[cfg(feature = "wifi")]
mod wifi_impl {
    use core::convert::Infallible;

    use defmt::{info, unwrap, warn};
    use embassy_executor::Spawner;
    use embassy_net::{Stack, dns, udp};
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_sync::signal::Signal;
    use embassy_time::{Duration, Timer, with_timeout};
    use static_cell::StaticCell;

    use crate::Result;
    use crate::unix_seconds::UnixSeconds;
    use crate::wifi::Wifi;

    const NTP_PORT: u16 = 123;

    /// Bound on waiting for a server's reply.
    const NTP_RECV_TIMEOUT: Duration = Duration::from_secs(5);

    /// Outcome of one sync attempt.
    #[derive(Clone)]
    pub enum TimeSyncEvent {
        Success { unix_seconds: UnixSeconds },
        Failed(&'static str),
    }

    type TimeSyncEvents = Signal<CriticalSectionRawMutex, TimeSyncEvent>;

    /// Resources needed to construct a [`TimeSync`].
    pub struct TimeSyncStatic {
        events: TimeSyncEvents,
        time_sync_cell: StaticCell<TimeSync>,
    }

    /// Device abstraction that keeps the clock synced over NTP.
    ///
    /// Waits for the network internally, so it can be created before WiFi
    /// has an address without blocking the caller.
    pub struct TimeSync {
        events: &'static TimeSyncEvents,
    }

    impl TimeSync {
        /// Create [`TimeSync`] resources. Call once and keep in a `static`.
        #[must_use]
        pub const fn new_static() -> TimeSyncStatic {
            TimeSyncStatic {
                events: Signal::new(),
                time_sync_cell: StaticCell::new(),
            }
        }

        /// Create the device and spawn its schedule task.
        ///
        /// `servers` is a comma-separated list of NTP hosts tried in order on
        /// every attempt. `grace` paces retries after a failure; `resync`
        /// paces periodic refreshes after a success.
        pub fn new(
            time_sync_static: &'static TimeSyncStatic,
            wifi: &'static Wifi,
            servers: &'static str,
            grace: Duration,
            resync: Duration,
            spawner: Spawner,
        ) -> &'static Self {
            let token = unwrap!(time_sync_device_loop(
                wifi,
                servers,
                grace,
                resync,
                &time_sync_static.events,
            ));
            spawner.spawn(token);

            time_sync_static.time_sync_cell.init(Self {
                events: &time_sync_static.events,
            })
        }

        /// Wait for and return the next [`TimeSyncEvent`].
        pub async fn wait(&self) -> TimeSyncEvent {
            self.events.wait().await
        }
    }

    #[embassy_executor::task]
    async fn time_sync_device_loop(
        wifi: &'static Wifi,
        servers: &'static str,
        grace: Duration,
        resync: Duration,
        sync_events: &'static TimeSyncEvents,
    ) -> ! {
        let err = run_time_sync_loop(wifi, servers, grace, resync, sync_events)
            .await
            .unwrap_err();
        core::panic!("{err}");
    }

    async fn run_time_sync_loop(
        wifi: &'static Wifi,
        servers: &'static str,
        grace: Duration,
        resync: Duration,
        sync_events: &'static TimeSyncEvents,
    ) -> Result<Infallible> {
        let stack = wifi.stack().await;
        info!("TimeSync device started");

        // One loop covers the whole schedule: a failure is retried after the
        // grace interval, a success is refreshed after the resync interval.
        let mut attempt: u32 = 0;
        loop {
            attempt = attempt.saturating_add(1);
            info!("Sync attempt {}", attempt);
            match fetch_ntp_time(stack, servers).await {
                Ok(unix_seconds) => {
                    info!("Sync successful: unix_seconds={}", unix_seconds.as_i64());
                    sync_events.signal(TimeSyncEvent::Success { unix_seconds });
                    attempt = 0;
                    Timer::after(resync).await;
                }
                Err(message) => {
                    info!("Sync failed: {}; retrying in {} s", message, grace.as_secs());
                    sync_events.signal(TimeSyncEvent::Failed(message));
                    Timer::after(grace).await;
                }
            }
        }
    }

    /// Try each configured server in order; the first good reply wins.
    async fn fetch_ntp_time(
        stack: &'static Stack<'static>,
        servers: &'static str,
    ) -> Result<UnixSeconds, &'static str> {
        for server in servers.split(',').map(str::trim) {
            if server.is_empty() {
                continue;
            }
            match fetch_from_server(stack, server).await {
                Ok(unix_seconds) => return Ok(unix_seconds),
                Err(message) => warn!("NTP fetch from {} failed: {}", server, message),
            }
        }
        Err("all NTP servers failed")
    }

    #[expect(
        clippy::indexing_slicing,
        reason = "fixed 48-byte NTP packet layout, length checked before reads"
    )]
    async fn fetch_from_server(
        stack: &'static Stack<'static>,
        server: &str,
    ) -> Result<UnixSeconds, &'static str> {
        use dns::DnsQueryType;
        use udp::UdpSocket;

        info!("Resolving NTP host {}...", server);
        let dns_result = stack
            .dns_query(server, DnsQueryType::A)
            .await
            .map_err(|err| {
                warn!("DNS lookup failed: {:?}", err);
                "DNS lookup failed"
            })?;
        let server_addr = dns_result.first().ok_or("No DNS results")?;

        info!("NTP server IP: {}", server_addr);

        let mut rx_meta = [udp::PacketMetadata::EMPTY; 1];
        let mut rx_buffer = [0; 128];
        let mut tx_meta = [udp::PacketMetadata::EMPTY; 1];
        let mut tx_buffer = [0; 128];
        let mut socket = UdpSocket::new(
            *stack,
            &mut rx_meta,
            &mut rx_buffer,
            &mut tx_meta,
            &mut tx_buffer,
        );

        socket.bind(0).map_err(|err| {
            warn!("Socket bind failed: {:?}", err);
            "Socket bind failed"
        })?;

        // 48-byte request: LI=0, VN=3, Mode=3 (client)
        let mut ntp_request = [0u8; 48];
        ntp_request[0] = 0x1B;

        info!("Sending NTP request to {}...", server_addr);
        socket
            .send_to(&ntp_request, (*server_addr, NTP_PORT))
            .await
            .map_err(|err| {
                warn!("NTP send failed: {:?}", err);
                "NTP send failed"
            })?;

        let mut response = [0u8; 48];
        let (len, _from) = with_timeout(NTP_RECV_TIMEOUT, socket.recv_from(&mut response))
            .await
            .map_err(|_| {
                warn!("NTP receive timeout");
                "NTP receive timeout"
            })?
            .map_err(|err| {
                warn!("NTP receive failed: {:?}", err);
                "NTP receive failed"
            })?;

        if len < 48 {
            warn!("NTP response too short: {} bytes", len);
            return Err("NTP response too short");
        }

        // Transmit timestamp seconds, bytes 40-43 big-endian.
        let ntp_seconds =
            u32::from_be_bytes([response[40], response[41], response[42], response[43]]);

        let unix_time =
            UnixSeconds::from_ntp_seconds(ntp_seconds).ok_or("Invalid NTP timestamp")?;

        info!("NTP time: {} (unix timestamp)", unix_time.as_i64());
        Ok(unix_time)
    }
} // end wifi_impl module

#[cfg(feature = "wifi")]
pub use wifi_impl::{TimeSync, TimeSyncEvent, TimeSyncStatic};

// ============================================================================
// No-WiFi Stub Implementation
// ============================================================================

#[cfg(not(feature = "wifi"))]
mod stub {
    use embassy_executor::Spawner;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embassy_sync::signal::Signal;
    use static_cell::StaticCell;

    use crate::unix_seconds::UnixSeconds;

    /// Outcome of one sync attempt; the stub never produces one.
    #[derive(Clone)]
    pub enum TimeSyncEvent {
        Success { unix_seconds: UnixSeconds },
        Failed(&'static str),
    }

    type TimeSyncEvents = Signal<CriticalSectionRawMutex, TimeSyncEvent>;

    /// Resources needed to construct a [`TimeSync`].
    pub struct TimeSyncStatic {
        events: TimeSyncEvents,
        time_sync_cell: StaticCell<TimeSync>,
    }

    /// Stub device for builds without WiFi; the display stays on dashes.
    pub struct TimeSync {
        events: &'static TimeSyncEvents,
    }

    impl TimeSync {
        /// Create [`TimeSync`] resources. Call once and keep in a `static`.
        #[must_use]
        pub const fn new_static() -> TimeSyncStatic {
            TimeSyncStatic {
                events: Signal::new(),
                time_sync_cell: StaticCell::new(),
            }
        }

        /// Construct the stub device; it spawns nothing.
        pub fn new(time_sync_static: &'static TimeSyncStatic, _spawner: Spawner) -> &'static Self {
            time_sync_static.time_sync_cell.init(Self {
                events: &time_sync_static.events,
            })
        }

        /// Wait for the next [`TimeSyncEvent`]. The stub never signals, so
        /// this pends forever.
        pub async fn wait(&self) -> TimeSyncEvent {
            self.events.wait().await
        }
    }
}

#[cfg(not(feature = "wifi"))]
pub use stub::{TimeSync, TimeSyncEvent, TimeSyncStatic};
