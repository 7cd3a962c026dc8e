use serde::Serialize;

use crate::calibration::VoltageCalibration;
use crate::sampler::WindowRms;
use crate::settings::MonitorSettings;
use crate::units::{Amperes, Milliseconds, Volts, WattHours, Watts};

/// 公称電圧に対してこの割合を下回る電圧は、センサー未接続とみなして
/// 公称電圧で代用する
pub const MIN_VALID_LINE_RATIO: f32 = 0.5;

/// 1ウィンドウ分の計測結果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PowerSample {
    pub voltage: Volts,
    pub current: Amperes,
    /// 有効電力 `V × I × 力率`
    pub real_power: Watts,
    /// 皮相電力 `V × I`
    pub apparent_power: Watts,
    /// 電圧が公称値で代用された
    pub voltage_fallback: bool,
}

impl PowerSample {
    pub fn from_window(
        window: &WindowRms,
        settings: &MonitorSettings,
        calibration: &VoltageCalibration,
    ) -> Self {
        let measurement = &settings.measurement;

        let raw_current = settings
            .current_sensor
            .current_from_adc_rms(window.current_adc_rms);
        let current = if raw_current.0.is_finite() && raw_current.0 >= measurement.noise_threshold.0 {
            raw_current
        } else {
            Amperes(0.0)
        };

        let min_valid = measurement.line_voltage.0 * MIN_VALID_LINE_RATIO;
        let (voltage, voltage_fallback) = match window
            .voltage_adc_rms
            .map(|adc_rms| calibration.line_voltage(adc_rms))
        {
            Some(v) if v.0.is_finite() && v.0 >= min_valid => (v, false),
            _ => (measurement.line_voltage, true),
        };

        Self::new(voltage, current, measurement.power_factor, voltage_fallback)
    }

    pub fn new(voltage: Volts, current: Amperes, power_factor: f32, voltage_fallback: bool) -> Self {
        let apparent = voltage.0 * current.0;
        Self {
            voltage,
            current,
            real_power: Watts(apparent * power_factor),
            apparent_power: Watts(apparent),
            voltage_fallback,
        }
    }

    /// ログ用のサマリ
    pub fn summary(&self) -> String {
        let mut summary = format!(
            "電圧:{}, 電流:{}, 有効電力:{}, 皮相電力:{}",
            self.voltage, self.current, self.real_power, self.apparent_power
        );
        if self.voltage_fallback {
            summary.push_str(" (電圧は公称値)");
        }
        summary
    }
}

/// 送信単位の電力量
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnergyReport {
    pub energy: WattHours,
    pub duration: Milliseconds,
    /// 期間中の最新の有効電力
    pub last_real_power: Watts,
}

/// 有効電力を時間で積算する
#[derive(Debug, Clone, Copy, Default)]
pub struct EnergyAccumulator {
    energy: WattHours,
    duration: Milliseconds,
    last_real_power: Watts,
}

impl EnergyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// `elapsed` の間 `sample` の電力が続いたものとして加算
    pub fn add(&mut self, sample: &PowerSample, elapsed: Milliseconds) {
        self.energy.0 += sample.real_power.over(elapsed).0;
        self.duration = Milliseconds(self.duration.0.saturating_add(elapsed.0));
        self.last_real_power = sample.real_power;
    }

    pub fn energy(&self) -> WattHours {
        self.energy
    }

    pub fn duration(&self) -> Milliseconds {
        self.duration
    }

    /// 積算値を取り出してリセット
    pub fn take(&mut self) -> EnergyReport {
        let report = EnergyReport {
            energy: self.energy,
            duration: self.duration,
            last_real_power: self.last_real_power,
        };
        *self = Self::default();
        report
    }

    /// 送信に失敗したレポートを戻す
    pub fn restore(&mut self, report: EnergyReport) {
        self.energy.0 += report.energy.0;
        self.duration = Milliseconds(self.duration.0.saturating_add(report.duration.0));
        if self.last_real_power == Watts(0.0) {
            self.last_real_power = report.last_real_power;
        }
    }
}
