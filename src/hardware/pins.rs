use esp_idf_svc::hal::gpio::{Gpio34, Gpio35};

/// センサーピン設定構造体
///
/// ESP32 の ADC1 チャンネルのみ使用する（ADC2 は Wi-Fi 動作中に読めない）
pub struct AdcPins {
    /// 電流センサー (ACS712)
    pub current: Gpio34,
    /// 電圧センサー (ZMPT101B)
    pub voltage: Gpio35,
}

impl AdcPins {
    pub fn new(current: Gpio34, voltage: Gpio35) -> Self {
        Self { current, voltage }
    }
}
