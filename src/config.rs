use std::borrow::Cow;

use energy_monitor_core::settings::{CURRENT_SENSOR_PIN, VOLTAGE_SENSOR_PIN};
use energy_monitor_core::validation::validate_server_url;
use energy_monitor_core::{
    derive_power_url, AdcSettings, Amperes, CurrentSensorSettings, MeasurementSettings,
    Microseconds, Milliseconds, MonitorSettings, NetworkSettings, PersistenceSettings, SensorPins,
    ValidationError, VoltageSensorSettings, Volts, VoltsPerAmpere,
};

/// アプリケーション設定
///
/// この構造体はビルド時に`build.rs`によって`cfg.toml`ファイルから
/// 読み込まれた設定を保持します。センサーピン (GPIO34/35) は
/// ペリフェラルの型で固定されるため設定項目にはありません。
#[toml_cfg::toml_config]
pub struct Config {
    #[default("http://192.168.1.110:3000/readings")]
    server_url: &'static str,

    #[default("")] // 空なら server_url から /power を導出
    power_url: &'static str,

    // SSID / パスワードは NVS に保存され、未保存の場合のみここから書き込む
    #[default("")]
    wifi_ssid: &'static str,

    #[default("")]
    wifi_password: &'static str,

    // ADC設定
    #[default(3.3)] // ADC基準電圧
    adc_reference_voltage: f32,

    #[default(4095)] // 12bit = 2^12 - 1
    adc_resolution: u16,

    // 電流センサー (ACS712)
    #[default(0.100)] // ACS712 20A = 100mV/A
    current_sensitivity: f32,

    #[default(5.0)] // ACS712 の電源電圧
    current_sensor_supply_voltage: f32,

    // 電圧センサー (ZMPT101B)
    #[default(0.0017)] // 220V RMS と一致するまで調整
    voltage_sensitivity: f32,

    // 計測設定
    #[default(220.0)] // 公称電圧 (フォールバック)
    line_voltage: f32,

    #[default(0.85)]
    power_factor: f32,

    #[default(500)]
    samples_per_rms: u32,

    #[default(100)]
    sample_delay_us: u32,

    #[default(0.2)] // これ未満の電流はノイズ扱い
    noise_threshold: f32,

    // 保存設定
    #[default(600000)] // 10分
    save_interval_ms: u32,

    #[default(1000)] // 計測ウィンドウ間の待ち時間
    measurement_pause_ms: u32,

    #[default(false)]
    debug_mode: bool,
}

/// 設定エラー
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("設定値が無効です: {0}")]
    Invalid(#[from] ValidationError),
}

/// アプリケーション設定を表す構造体
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 計測器の固定設定
    pub settings: MonitorSettings,

    /// 有効電力の送信先
    pub power_url: String,

    /// cfg.toml に書かれた Wi-Fi SSID（NVS 未保存時の初期値）
    pub wifi_ssid: String,

    /// cfg.toml に書かれた Wi-Fi パスワード
    pub wifi_password: String,

    /// 計測ウィンドウ間の待ち時間（ミリ秒）
    pub measurement_pause_ms: u32,

    /// デバッグモード（詳細ログ）
    pub debug_mode: bool,
}

impl AppConfig {
    /// 設定ファイルから設定をロードします
    pub fn load() -> Result<Self, ConfigError> {
        // toml_cfg によって生成された定数
        Self::from_config(&CONFIG)
    }

    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let adc_reference = Volts(config.adc_reference_voltage);

        let power_url = if config.power_url.trim().is_empty() {
            None
        } else {
            Some(Cow::Owned(config.power_url.trim().to_string()))
        };

        let settings = MonitorSettings {
            network: NetworkSettings {
                server_url: Cow::Owned(config.server_url.trim().to_string()),
                power_url,
            },
            pins: SensorPins {
                current: CURRENT_SENSOR_PIN,
                voltage: VOLTAGE_SENSOR_PIN,
            },
            adc: AdcSettings {
                reference_voltage: adc_reference,
                resolution: config.adc_resolution,
            },
            current_sensor: CurrentSensorSettings::new(
                VoltsPerAmpere(config.current_sensitivity),
                Volts(config.current_sensor_supply_voltage),
                adc_reference,
            ),
            voltage_sensor: VoltageSensorSettings {
                initial_sensitivity: config.voltage_sensitivity,
            },
            measurement: MeasurementSettings {
                line_voltage: Volts(config.line_voltage),
                power_factor: config.power_factor,
                samples_per_rms: config.samples_per_rms,
                sample_delay: Microseconds(config.sample_delay_us),
                noise_threshold: Amperes(config.noise_threshold),
            },
            persistence: PersistenceSettings {
                save_interval: Milliseconds(config.save_interval_ms),
            },
        };
        settings.validate()?;

        let power_url = match &settings.network.power_url {
            Some(url) => url.to_string(),
            None => derive_power_url(&settings.network.server_url),
        };
        validate_server_url(&power_url)?;

        Ok(AppConfig {
            settings,
            power_url,
            wifi_ssid: config.wifi_ssid.to_string(),
            wifi_password: config.wifi_password.to_string(),
            measurement_pause_ms: config.measurement_pause_ms,
            debug_mode: config.debug_mode,
        })
    }

    pub fn readings_url(&self) -> &str {
        &self.settings.network.server_url
    }
}
