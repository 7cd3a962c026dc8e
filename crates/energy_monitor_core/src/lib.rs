/*!
 * # Energy Monitor Core
 *
 * ACS712 電流センサーと ZMPT101B 電圧センサーによる電力計測の
 * ハードウェア非依存ロジック
 *
 * ## モジュール構成
 * - `settings`: 計測・ネットワーク・保存間隔などの固定設定値
 * - `calibration`: 実行時に調整可能な電圧センサー感度
 * - `units`: 物理量ごとの型
 * - `rms` / `sampler`: ADCサンプルからの実効値計算
 * - `power`: 電力・電力量の計算
 * - `schedule`: 保存（送信）間隔の判定
 * - `monitor`: 計測ループの状態（電力量の積算と送信タイミング）
 * - `reading`: サーバーへ送信するペイロード
 * - `command`: 校正コマンドの解析
 * - `validation`: 設定値の検証
 */

pub mod calibration;
pub mod command;
pub mod monitor;
pub mod power;
pub mod reading;
pub mod rms;
pub mod sampler;
pub mod schedule;
pub mod settings;
pub mod units;
pub mod validation;

pub use calibration::{VoltageCalibration, VOLTAGE_CALIBRATION};
pub use command::{apply_command, parse_command, Command, CommandOutcome, CommandParseError};
pub use monitor::EnergyMonitor;
pub use power::{EnergyAccumulator, EnergyReport, PowerSample};
pub use reading::{derive_power_url, PayloadError, PowerPayload, ReadingPayload};
pub use rms::RmsAccumulator;
pub use sampler::{DualChannelAdc, Sampler, SamplingError, WindowRms};
pub use schedule::SaveScheduler;
pub use settings::{
    AdcSettings, CurrentSensorSettings, MeasurementSettings, MonitorSettings, NetworkSettings,
    PersistenceSettings, SensorPins, SettingsSnapshot, VoltageSensorSettings,
};
pub use units::{Amperes, Microseconds, Milliseconds, Volts, VoltsPerAmpere, WattHours, Watts};
pub use validation::ValidationError;
