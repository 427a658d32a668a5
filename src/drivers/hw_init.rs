//! One-shot hardware peripheral initialization.
//!
//! Configures the ADC1 oneshot unit for the Hall sensor using raw ESP-IDF
//! sys calls. Called once from `main()` before the polling loop starts.
//! The indicator outputs are claimed through `esp-idf-hal` pin drivers and
//! the TWAI controller by [`TwaiBus::install`](crate::adapters::twai::TwaiBus::install).

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization. All are fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    TwaiInstallFailed(i32),
    TwaiStartFailed(i32),
    UnsupportedBitrate(u32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC1 init failed (rc={})", rc),
            Self::TwaiInstallFailed(rc) => write!(f, "TWAI driver install failed (rc={})", rc),
            Self::TwaiStartFailed(rc) => write!(f, "TWAI driver start failed (rc={})", rc),
            Self::UnsupportedBitrate(b) => write!(f, "unsupported CAN bitrate {} bit/s", b),
        }
    }
}

impl From<HwInitError> for crate::error::Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}

#[cfg(target_os = "espidf")]
use log::info;

use crate::pins;

// ADC1 channel n is GPIO n + 1 on the ESP32-S2.
const _: () = assert!(pins::HALL_ADC_GPIO == pins::HALL_ADC_CHANNEL as i32 + 1);

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the loop; single-threaded.
    unsafe {
        init_adc()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path. No concurrent access is possible because
/// `init_adc()` completes before the loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<(), HwInitError> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    // 12 dB attenuation covers the sensor's 0–3.1 V swing.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_DEFAULT,
    };

    let ret = unsafe { adc_oneshot_config_channel(adc1_handle(), pins::HALL_ADC_CHANNEL, &chan_cfg) };
    if ret != ESP_OK as i32 { return Err(HwInitError::AdcInitFailed(ret)); }

    info!("hw_init: ADC1 configured (CH{}=hall)", pins::HALL_ADC_CHANNEL);
    Ok(())
}

/// One conversion scaled to 12 bits, or the driver's error code.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> Result<u16, i32> {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract: single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return Err(ret);
    }
    Ok(scale_to_12_bit(raw.max(0) as u16))
}

/// The S2's SAR ADC converts at 13 bits; thresholds are specified on a
/// 12-bit scale.
pub const fn scale_to_12_bit(raw: u16) -> u16 {
    let shifted = raw >> (pins::ADC_NATIVE_BITS - 12);
    if shifted > pins::ADC_MAX { pins::ADC_MAX } else { shifted }
}
