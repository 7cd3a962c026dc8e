use std::sync::atomic::{AtomicU32, Ordering};

use log::info;

use crate::settings::{VoltageSensorSettings, DEFAULT_VOLTAGE_SENSITIVITY};
use crate::units::Volts;

/// 電圧センサー (ZMPT101B) の感度
///
/// 個体差があるため、既知の 220V RMS と計測値が一致するまで実行中に
/// 調整できる唯一の設定値。f32 のビット列を `AtomicU32` に保持するので、
/// 他スレッドからの読み取りは常に更新前か更新後のどちらかの値になる。
#[derive(Debug)]
pub struct VoltageCalibration {
    sensitivity_bits: AtomicU32,
}

/// プロセス全体で共有する校正値
pub static VOLTAGE_CALIBRATION: VoltageCalibration =
    VoltageCalibration::new(DEFAULT_VOLTAGE_SENSITIVITY);

impl VoltageCalibration {
    pub const fn new(sensitivity: f32) -> Self {
        Self {
            sensitivity_bits: AtomicU32::new(sensitivity.to_bits()),
        }
    }

    pub fn sensitivity(&self) -> f32 {
        f32::from_bits(self.sensitivity_bits.load(Ordering::Acquire))
    }

    /// 感度を更新する（範囲チェックは呼び出し側の責務）
    pub fn set_sensitivity(&self, sensitivity: f32) {
        self.sensitivity_bits
            .store(sensitivity.to_bits(), Ordering::Release);
    }

    /// cfg.toml の初期値に戻し、その値を返す
    pub fn reset(&self, voltage_sensor: &VoltageSensorSettings) -> f32 {
        self.set_sensitivity(voltage_sensor.initial_sensitivity);
        voltage_sensor.initial_sensitivity
    }

    /// ADC側のRMS電圧から線間電圧を求める
    pub fn line_voltage(&self, adc_rms: Volts) -> Volts {
        Volts(adc_rms.0 / self.sensitivity())
    }

    /// 計測値が基準電圧と一致するよう感度を補正し、新しい感度を返す
    ///
    /// `V = adc_rms / s` なので、`s' = s * measured / reference` とすれば
    /// 同じ入力に対して `reference` が得られる。
    pub fn calibrate_to_reference(&self, measured: Volts, reference: Volts) -> Option<f32> {
        if !(measured.0.is_finite() && measured.0 > 0.0 && reference.0.is_finite() && reference.0 > 0.0)
        {
            return None;
        }
        let current = self.sensitivity();
        let updated = current * measured.0 / reference.0;
        if !updated.is_finite() || updated <= 0.0 {
            return None;
        }
        self.set_sensitivity(updated);
        info!(
            "電圧センサー感度を補正: {:.6} -> {:.6} (計測 {} / 基準 {})",
            current, updated, measured, reference
        );
        Some(updated)
    }
}

impl Default for VoltageCalibration {
    fn default() -> Self {
        Self::new(DEFAULT_VOLTAGE_SENSITIVITY)
    }
}
