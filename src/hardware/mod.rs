/// ハードウェア制御モジュール
pub mod pins;
pub mod sensor_adc;

pub use pins::AdcPins;
pub use sensor_adc::EspSensorAdc;
