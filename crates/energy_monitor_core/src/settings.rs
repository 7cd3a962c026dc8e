use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::calibration::VoltageCalibration;
use crate::units::{Amperes, Microseconds, Milliseconds, Volts, VoltsPerAmpere};
use crate::validation::{
    validate_positive, validate_power_factor, validate_sample_count, validate_server_url,
    ValidationError,
};

// ==========================================
// ネットワーク
// ==========================================

/// 計測値の送信先（`POST /readings`）
/// Wi-Fi の SSID / パスワードは preferences (NVS) 側に保存する
pub const SERVER_URL: &str = "http://192.168.1.110:3000/readings";

// ==========================================
// センサーピン
// ==========================================

/// 電流センサー (ACS712)
pub const CURRENT_SENSOR_PIN: u8 = 34;
/// 電圧センサー (ZMPT101B)
pub const VOLTAGE_SENSOR_PIN: u8 = 35;

// ==========================================
// ADC
// ==========================================

/// ADC基準電圧
pub const ADC_REFERENCE_VOLTAGE: Volts = Volts(3.3);
pub const ADC_BITS: u32 = 12;
/// 12bit = 2^12 - 1
pub const ADC_RESOLUTION: u16 = ((1u32 << ADC_BITS) - 1) as u16;

// ==========================================
// 電流センサー (ACS712)
// ==========================================

/// ACS712 20A = 100mV/A
pub const CURRENT_SENSITIVITY: VoltsPerAmpere = VoltsPerAmpere(0.100);
/// ACS712 の電源電圧
pub const CURRENT_SENSOR_SUPPLY_VOLTAGE: Volts = Volts(5.0);
/// ADC (3.3V) からセンサー (5V) 側への換算係数
pub const DIVISOR_FACTOR: f32 = CURRENT_SENSOR_SUPPLY_VOLTAGE.0 / ADC_REFERENCE_VOLTAGE.0;

// ==========================================
// 電圧センサー (ZMPT101B)
// ==========================================

/// 感度の初期値。220V RMS と一致するまで調整する値なので
/// 実行中は [`crate::calibration::VOLTAGE_CALIBRATION`] を参照すること
pub const DEFAULT_VOLTAGE_SENSITIVITY: f32 = 0.0017;

// ==========================================
// 計測
// ==========================================

/// 公称電圧（電圧が取れないときのフォールバック）
pub const LINE_VOLTAGE: Volts = Volts(220.0);
pub const POWER_FACTOR: f32 = 0.85;
pub const SAMPLES_PER_RMS: u32 = 500;
pub const SAMPLE_DELAY_US: Microseconds = Microseconds(100);
/// これ未満の電流はノイズとして 0A 扱い
pub const NOISE_THRESHOLD: Amperes = Amperes(0.2);

// ==========================================
// 保存
// ==========================================

/// 10分
pub const SAVE_INTERVAL_MS: Milliseconds = Milliseconds(600_000);

/// ネットワーク設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSettings {
    pub server_url: Cow<'static, str>,
    /// 未指定なら `server_url` の末尾を `power` に置き換えて使う
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_url: Option<Cow<'static, str>>,
}

/// センサー接続ピン（GPIO番号）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorPins {
    pub current: u8,
    pub voltage: u8,
}

/// ADC設定
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdcSettings {
    pub reference_voltage: Volts,
    pub resolution: u16,
}

impl AdcSettings {
    /// ADCの生値を電圧に変換
    pub fn raw_to_volts(&self, raw: u16) -> Volts {
        Volts(raw as f32 * self.reference_voltage.0 / self.resolution as f32)
    }
}

/// 電流センサー設定
///
/// `divisor_factor` は導出値なので JSON には書き出さず、読み込み時に
/// `supply_voltage` と ADC基準電圧から計算し直す。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrentSensorSettings {
    pub sensitivity: VoltsPerAmpere,
    pub supply_voltage: Volts,
    /// `supply_voltage / ADC基準電圧`
    #[serde(skip)]
    pub divisor_factor: f32,
}

impl CurrentSensorSettings {
    pub const fn new(sensitivity: VoltsPerAmpere, supply_voltage: Volts, adc_reference: Volts) -> Self {
        Self {
            sensitivity,
            supply_voltage,
            divisor_factor: supply_voltage.0 / adc_reference.0,
        }
    }

    /// ADC側のRMS電圧から電流を求める（ノイズ除去前）
    pub fn current_from_adc_rms(&self, adc_rms: Volts) -> Amperes {
        Amperes(adc_rms.0 * self.divisor_factor / self.sensitivity.0)
    }
}

/// 電圧センサー設定
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoltageSensorSettings {
    pub initial_sensitivity: f32,
}

/// 計測パラメータ
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementSettings {
    pub line_voltage: Volts,
    pub power_factor: f32,
    pub samples_per_rms: u32,
    pub sample_delay: Microseconds,
    pub noise_threshold: Amperes,
}

/// 保存（送信）設定
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PersistenceSettings {
    pub save_interval: Milliseconds,
}

/// 計測器全体の設定
///
/// 起動後に変わらない値だけを持つ。電圧センサー感度の現在値はここではなく
/// [`crate::calibration::VoltageCalibration`] が保持する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MonitorSettingsDocument")]
pub struct MonitorSettings {
    pub network: NetworkSettings,
    pub pins: SensorPins,
    pub adc: AdcSettings,
    pub current_sensor: CurrentSensorSettings,
    pub voltage_sensor: VoltageSensorSettings,
    pub measurement: MeasurementSettings,
    pub persistence: PersistenceSettings,
}

/// JSON 上の電流センサー設定（導出値を含まない）
#[derive(Deserialize)]
struct CurrentSensorDocument {
    sensitivity: VoltsPerAmpere,
    supply_voltage: Volts,
}

/// JSON から読み込むときの形
#[derive(Deserialize)]
struct MonitorSettingsDocument {
    network: NetworkSettings,
    pins: SensorPins,
    adc: AdcSettings,
    current_sensor: CurrentSensorDocument,
    voltage_sensor: VoltageSensorSettings,
    measurement: MeasurementSettings,
    persistence: PersistenceSettings,
}

impl From<MonitorSettingsDocument> for MonitorSettings {
    fn from(doc: MonitorSettingsDocument) -> Self {
        Self {
            current_sensor: CurrentSensorSettings::new(
                doc.current_sensor.sensitivity,
                doc.current_sensor.supply_voltage,
                doc.adc.reference_voltage,
            ),
            network: doc.network,
            pins: doc.pins,
            adc: doc.adc,
            voltage_sensor: doc.voltage_sensor,
            measurement: doc.measurement,
            persistence: doc.persistence,
        }
    }
}

impl MonitorSettings {
    pub const DEFAULT: MonitorSettings = MonitorSettings {
        network: NetworkSettings {
            server_url: Cow::Borrowed(SERVER_URL),
            power_url: None,
        },
        pins: SensorPins {
            current: CURRENT_SENSOR_PIN,
            voltage: VOLTAGE_SENSOR_PIN,
        },
        adc: AdcSettings {
            reference_voltage: ADC_REFERENCE_VOLTAGE,
            resolution: ADC_RESOLUTION,
        },
        current_sensor: CurrentSensorSettings::new(
            CURRENT_SENSITIVITY,
            CURRENT_SENSOR_SUPPLY_VOLTAGE,
            ADC_REFERENCE_VOLTAGE,
        ),
        voltage_sensor: VoltageSensorSettings {
            initial_sensitivity: DEFAULT_VOLTAGE_SENSITIVITY,
        },
        measurement: MeasurementSettings {
            line_voltage: LINE_VOLTAGE,
            power_factor: POWER_FACTOR,
            samples_per_rms: SAMPLES_PER_RMS,
            sample_delay: SAMPLE_DELAY_US,
            noise_threshold: NOISE_THRESHOLD,
        },
        persistence: PersistenceSettings {
            save_interval: SAVE_INTERVAL_MS,
        },
    };

    /// 人が読める形式（JSON）に変換
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// 固定設定に現在の電圧センサー感度を添えたもの
    pub fn snapshot(&self, calibration: &VoltageCalibration) -> SettingsSnapshot {
        SettingsSnapshot {
            settings: self.clone(),
            voltage_sensitivity: calibration.sensitivity(),
        }
    }

    /// ビルド時設定の妥当性を確認
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_server_url(&self.network.server_url)?;
        if let Some(power_url) = &self.network.power_url {
            validate_server_url(power_url)?;
        }
        if self.adc.resolution == 0 {
            return Err(ValidationError::InvalidAdcResolution);
        }
        validate_positive("adc_reference_voltage", self.adc.reference_voltage.0)?;
        validate_positive("current_sensitivity", self.current_sensor.sensitivity.0)?;
        validate_positive("current_sensor_supply_voltage", self.current_sensor.supply_voltage.0)?;
        let expected = self.current_sensor.supply_voltage.0 / self.adc.reference_voltage.0;
        let actual = self.current_sensor.divisor_factor;
        let in_sync = (actual - expected).abs() <= expected * f32::EPSILON;
        if !in_sync {
            return Err(ValidationError::DivisorFactorMismatch { expected, actual });
        }
        validate_positive("voltage_sensitivity", self.voltage_sensor.initial_sensitivity)?;
        validate_positive("line_voltage", self.measurement.line_voltage.0)?;
        validate_power_factor(self.measurement.power_factor)?;
        validate_sample_count(self.measurement.samples_per_rms)?;
        Ok(())
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// 設定の全体像（固定設定 + 実行中の電圧センサー感度）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsSnapshot {
    pub settings: MonitorSettings,
    pub voltage_sensitivity: f32,
}

impl SettingsSnapshot {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        self.settings.validate()?;
        validate_positive("voltage_sensitivity", self.voltage_sensitivity)
    }

    /// 保存されていた感度を校正値に戻す
    pub fn apply(&self, calibration: &VoltageCalibration) {
        calibration.set_sensitivity(self.voltage_sensitivity);
    }
}
