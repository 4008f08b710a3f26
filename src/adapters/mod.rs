//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter   | Implements   | Connects to                    |
//! |-----------|--------------|--------------------------------|
//! | `clock`   | ClockPort    | esp_timer + system clock       |
//! | `flashfs` | LogMedium    | SPIFFS flash filesystem        |
//! | `log_sink`| EventSink    | Serial log output              |
//! | `nvs`     | StoragePort  | NVS / in-memory store          |
//! | `wifi`    | —            | ESP-IDF WiFi STA bring-up      |

pub mod clock;
pub mod flashfs;
pub mod log_sink;
pub mod nvs;
pub mod wifi;
