//! Station link and time sync task
//!
//! Keeps the station connected and mirrors the link state to the status
//! LED blink rate. The clock is synced from the network on every fresh
//! connection and then once per sync interval; the result is handed to
//! the clock task through `time_sync`. Failures are logged and retried.

use beedesk_core::config::{StatusLedConfig, WifiConfig};
use beedesk_core::traits::Network;
use beedesk_core::{Context, Task, TaskError, TaskStatus, TICKS_MS};

use crate::keys;

/// Wait between failed connection attempts
pub const RETRY_INTERVAL_MS: i64 = 10_000;

pub struct WifiTask<N> {
    net: N,
    config: WifiConfig,
    led: StatusLedConfig,
    connected: bool,
    last_attempt: Option<i64>,
    last_sync: Option<i64>,
}

impl<N: Network> WifiTask<N> {
    /// Create a new task; nothing is attempted before the first run
    pub fn new(net: N, config: WifiConfig, led: StatusLedConfig) -> Self {
        Self {
            net,
            config,
            led,
            connected: false,
            last_attempt: None,
            last_sync: None,
        }
    }

    pub fn network(&self) -> &N {
        &self.net
    }

    fn elapsed(since: Option<i64>, now: i64, interval: i64) -> bool {
        since.map_or(true, |t| now - t >= interval)
    }

    fn connect(&mut self, now: i64) {
        if !Self::elapsed(self.last_attempt, now, RETRY_INTERVAL_MS) {
            return;
        }
        self.last_attempt = Some(now);
        debug!("wifi: connecting to {}", self.config.ssid.as_str());
        if let Err(e) = self.net.connect(&self.config.ssid, &self.config.password) {
            warn!("wifi: connect failed: {:?}", e);
        }
    }

    fn sync(&mut self, ctx: &mut Context, now: i64) -> Result<(), TaskError> {
        self.last_sync = Some(now);
        match self.net.sync_time() {
            Ok(time) => {
                info!("wifi: time synced");
                ctx.set_text(keys::TIME_SYNC, time.format().as_str())?;
            }
            Err(e) => warn!("wifi: time sync failed: {:?}", e),
        }
        Ok(())
    }
}

impl<N: Network> Task for WifiTask<N> {
    fn name(&self) -> Option<&'static str> {
        Some(keys::names::WIFI)
    }

    fn setup(&mut self) -> Result<(), TaskError> {
        if !self.config.is_configured() {
            warn!("wifi: no credentials, staying offline");
        }
        Ok(())
    }

    fn run(&mut self, ctx: &mut Context) -> Result<TaskStatus, TaskError> {
        if !self.config.is_configured() {
            return Ok(TaskStatus::Running);
        }
        let now = ctx.get_int(TICKS_MS, 0);

        if !self.net.is_connected() {
            if self.connected {
                info!("wifi: link lost");
                self.connected = false;
                self.last_attempt = None;
                ctx.set(keys::WIFI_CONNECTED, false)?;
            }
            ctx.set(
                keys::STATUS_INTERVAL,
                i64::from(self.led.disconnected_interval),
            )?;
            self.connect(now);
            return Ok(TaskStatus::Running);
        }

        ctx.set(keys::STATUS_INTERVAL, i64::from(self.led.connected_interval))?;
        if !self.connected {
            info!("wifi: connected");
            self.connected = true;
            ctx.set(keys::WIFI_CONNECTED, true)?;
            self.sync(ctx, now)?;
        } else if Self::elapsed(self.last_sync, now, i64::from(self.config.sync_interval_ms)) {
            self.sync(ctx, now)?;
        }

        Ok(TaskStatus::Running)
    }
}
