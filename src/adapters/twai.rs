//! TWAI (CAN) bus adapter.
//!
//! Implements [`BusPort`] on the ESP32-S2's internal TWAI controller,
//! normal mode, accept-all filter.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: raw `twai_*` driver calls.
//! On host/test: an in-memory controller whose bus-off state and transmit
//! failures are injected through the `sim_*` hooks.
//!
//! `status()` only reads controller state. After a completed bus-off
//! recovery the controller sits in STOPPED; the next transmit restarts it.

use log::{debug, info};

use crate::app::ports::{BusPort, BusStatus};
use crate::drivers::hw_init::HwInitError;
use crate::error::BusError;
use crate::protocol::MAX_PAYLOAD;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// bindgen exposes the esp_err_t macros as u32; normalise once.
#[cfg(target_os = "espidf")]
const OK: esp_err_t = ESP_OK as esp_err_t;
#[cfg(target_os = "espidf")]
const ERR_TIMEOUT: esp_err_t = ESP_ERR_TIMEOUT as esp_err_t;
#[cfg(target_os = "espidf")]
const ERR_INVALID_STATE: esp_err_t = ESP_ERR_INVALID_STATE as esp_err_t;
#[cfg(target_os = "espidf")]
const FAIL: esp_err_t = ESP_FAIL as esp_err_t;

/// Bit timing for the supported nominal bitrates, expressed the way the
/// ESP-IDF `TWAI_TIMING_CONFIG_*` macros do: quanta clock plus segment
/// lengths (1 + 15 + 4 = 20 quanta per bit, 75 % sample point).
///
/// Values are copied from `TWAI_TIMING_CONFIG_125KBITS()` through
/// `TWAI_TIMING_CONFIG_1MBITS()` in ESP-IDF's `hal/twai_types.h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitTiming {
    pub quanta_resolution_hz: u32,
    pub tseg_1: u8,
    pub tseg_2: u8,
    pub sjw: u8,
}

impl BitTiming {
    pub const fn for_bitrate(bitrate: u32) -> Option<Self> {
        let quanta_resolution_hz = match bitrate {
            125_000 => 2_500_000,
            250_000 => 5_000_000,
            500_000 => 10_000_000,
            1_000_000 => 20_000_000,
            _ => return None,
        };
        Some(Self {
            quanta_resolution_hz,
            tseg_1: 15,
            tseg_2: 4,
            sjw: 3,
        })
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF implementation
// ───────────────────────────────────────────────────────────────

/// Installed and started TWAI controller.
pub struct TwaiBus {
    frames_sent: u32,
}

#[cfg(target_os = "espidf")]
impl TwaiBus {
    /// Install and start the driver. Any failure here is fatal at boot.
    pub fn install(tx_gpio: i32, rx_gpio: i32, bitrate: u32) -> Result<Self, HwInitError> {
        let timing = BitTiming::for_bitrate(bitrate).ok_or(HwInitError::UnsupportedBitrate(bitrate))?;

        let g_config = twai_general_config_t {
            mode: twai_mode_t_TWAI_MODE_NORMAL,
            tx_io: tx_gpio,
            rx_io: rx_gpio,
            clkout_io: -1,
            bus_off_io: -1,
            tx_queue_len: 5,
            rx_queue_len: 5,
            alerts_enabled: 0,
            clkout_divider: 0,
            intr_flags: ESP_INTR_FLAG_LEVEL1 as i32,
            ..Default::default()
        };
        let t_config = twai_timing_config_t {
            quanta_resolution_hz: timing.quanta_resolution_hz,
            tseg_1: timing.tseg_1,
            tseg_2: timing.tseg_2,
            sjw: timing.sjw,
            triple_sampling: false,
            ..Default::default()
        };
        let f_config = twai_filter_config_t {
            acceptance_code: 0,
            acceptance_mask: 0xFFFF_FFFF,
            single_filter: true,
        };

        // SAFETY: called once from main() before the loop; the config
        // structs outlive the call.
        let ret = unsafe { twai_driver_install(&g_config, &t_config, &f_config) };
        if ret != OK {
            return Err(HwInitError::TwaiInstallFailed(ret));
        }
        // SAFETY: driver installed above.
        let ret = unsafe { twai_driver_start() };
        if ret != OK {
            return Err(HwInitError::TwaiStartFailed(ret));
        }

        info!("TWAI started: {} bit/s (tx={}, rx={})", bitrate, tx_gpio, rx_gpio);
        Ok(Self { frames_sent: 0 })
    }

    fn raw_transmit(&mut self, id: u32, data: &[u8], timeout_ms: u32) -> Result<(), BusError> {
        if data.len() > MAX_PAYLOAD {
            return Err(BusError::Driver(ESP_ERR_INVALID_ARG as esp_err_t));
        }
        if Self::state() == Some(twai_state_t_TWAI_STATE_STOPPED) {
            // Recovery completed since the last send.
            // SAFETY: driver is installed and stopped.
            let ret = unsafe { twai_driver_start() };
            info!("TWAI recovered, restart rc={}", ret);
        }

        let len = data.len();
        // SAFETY: twai_message_t is plain data (ids, flags union, bytes);
        // all-zero is a valid standard data frame with no flags set.
        let mut msg: twai_message_t = unsafe { core::mem::zeroed() };
        msg.identifier = id;
        msg.data_length_code = len as u8;
        msg.data[..len].copy_from_slice(&data[..len]);

        let ticks = (u64::from(timeout_ms) * u64::from(configTICK_RATE_HZ) / 1000) as TickType_t;
        // SAFETY: msg lives across the call; the driver copies it into its TX queue.
        let ret = unsafe { twai_transmit(&msg, ticks) };
        match ret {
            OK => Ok(()),
            ERR_TIMEOUT => Err(BusError::Timeout),
            ERR_INVALID_STATE => Err(BusError::NotRunning),
            FAIL => Err(BusError::BusOff),
            rc => Err(BusError::Driver(rc)),
        }
    }

    fn state() -> Option<twai_state_t> {
        // SAFETY: status query only reads driver state.
        let mut info: twai_status_info_t = unsafe { core::mem::zeroed() };
        if unsafe { twai_get_status_info(&mut info) } != OK {
            return None;
        }
        Some(info.state)
    }

    fn raw_status(&mut self) -> BusStatus {
        match Self::state() {
            Some(state) if state == twai_state_t_TWAI_STATE_BUS_OFF => BusStatus::BusOff,
            _ => BusStatus::Normal,
        }
    }

    fn raw_initiate_recovery(&mut self) {
        // SAFETY: valid only in bus-off, which the guard checked first.
        let ret = unsafe { twai_initiate_recovery() };
        if ret != OK {
            log::warn!("twai_initiate_recovery rc={}", ret);
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Host simulation
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
mod sim {
    use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    pub(super) static BUS_OFF: AtomicBool = AtomicBool::new(false);
    pub(super) static STOPPED: AtomicBool = AtomicBool::new(false);
    pub(super) static FAIL_NEXT: AtomicU32 = AtomicU32::new(0);
    pub(super) static RECOVERIES: AtomicU32 = AtomicU32::new(0);
    pub(super) static RESTARTS: AtomicU32 = AtomicU32::new(0);

    pub(super) fn take_failure() -> bool {
        FAIL_NEXT
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1))
            .is_ok()
    }

    pub(super) fn load(flag: &AtomicBool) -> bool {
        flag.load(Ordering::Relaxed)
    }
}

/// Put the simulated controller into (or out of) bus-off.
#[cfg(not(target_os = "espidf"))]
pub fn sim_set_bus_off(bus_off: bool) {
    sim::BUS_OFF.store(bus_off, core::sync::atomic::Ordering::Relaxed);
}

/// Make the next `n` simulated transmits time out.
#[cfg(not(target_os = "espidf"))]
pub fn sim_fail_next(n: u32) {
    sim::FAIL_NEXT.store(n, core::sync::atomic::Ordering::Relaxed);
}

/// Recoveries initiated on the simulated controller.
#[cfg(not(target_os = "espidf"))]
pub fn sim_recoveries() -> u32 {
    sim::RECOVERIES.load(core::sync::atomic::Ordering::Relaxed)
}

/// Restarts of the simulated controller out of STOPPED.
#[cfg(not(target_os = "espidf"))]
pub fn sim_restarts() -> u32 {
    sim::RESTARTS.load(core::sync::atomic::Ordering::Relaxed)
}

#[cfg(not(target_os = "espidf"))]
impl TwaiBus {
    pub fn install(tx_gpio: i32, rx_gpio: i32, bitrate: u32) -> Result<Self, HwInitError> {
        if BitTiming::for_bitrate(bitrate).is_none() {
            return Err(HwInitError::UnsupportedBitrate(bitrate));
        }
        info!("TWAI(sim): {} bit/s (tx={}, rx={})", bitrate, tx_gpio, rx_gpio);
        Ok(Self { frames_sent: 0 })
    }

    fn raw_transmit(&mut self, _id: u32, data: &[u8], _timeout_ms: u32) -> Result<(), BusError> {
        if data.len() > MAX_PAYLOAD {
            return Err(BusError::Driver(-1));
        }
        if sim::load(&sim::BUS_OFF) {
            return Err(BusError::BusOff);
        }
        if sim::STOPPED.swap(false, core::sync::atomic::Ordering::Relaxed) {
            sim::RESTARTS.fetch_add(1, core::sync::atomic::Ordering::Relaxed);
            info!("TWAI(sim) recovered, restarted");
        }
        if sim::take_failure() {
            return Err(BusError::Timeout);
        }
        Ok(())
    }

    fn raw_status(&mut self) -> BusStatus {
        if sim::load(&sim::BUS_OFF) {
            BusStatus::BusOff
        } else {
            BusStatus::Normal
        }
    }

    fn raw_initiate_recovery(&mut self) {
        // Recovery completes at once and leaves the controller stopped.
        sim::RECOVERIES.fetch_add(1, core::sync::atomic::Ordering::Relaxed);
        sim::BUS_OFF.store(false, core::sync::atomic::Ordering::Relaxed);
        sim::STOPPED.store(true, core::sync::atomic::Ordering::Relaxed);
    }
}

impl TwaiBus {
    /// Frames accepted by the controller since install.
    pub fn frames_sent(&self) -> u32 {
        self.frames_sent
    }
}

// ── BusPort implementation ────────────────────────────────────

impl BusPort for TwaiBus {
    fn transmit(&mut self, id: u32, data: &[u8], timeout_ms: u32) -> Result<(), BusError> {
        self.raw_transmit(id, data, timeout_ms)?;
        self.frames_sent = self.frames_sent.wrapping_add(1);
        debug!("Sent: CAN ID 0x{:03X} {:02X?}", id, data);
        Ok(())
    }

    fn status(&mut self) -> BusStatus {
        self.raw_status()
    }

    fn initiate_recovery(&mut self) {
        self.raw_initiate_recovery();
    }
}
