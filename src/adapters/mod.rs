//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                  |
//! |------------|--------------------|------------------------------|
//! | `hardware` | SensorPort         | Hall sensor on ADC1          |
//! |            | BusPort            | TWAI controller              |
//! |            | IndicatorPort      | Red/green LEDs               |
//! | `log_sink` | EventSink          | Serial log output            |
//! | `time`     | (none)             | ESP32 high-resolution timer  |
//! | `twai`     | BusPort            | ESP-IDF TWAI driver          |

pub mod hardware;
pub mod log_sink;
pub mod time;
pub mod twai;
