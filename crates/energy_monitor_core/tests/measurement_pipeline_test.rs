// 計測パイプラインの結合テスト
// 正弦波を返すモックADCで、サンプリングから送信ペイロードまでを確認します

use std::f64::consts::PI;

use embedded_hal::delay::DelayNs;
use energy_monitor_core::{
    DualChannelAdc, EnergyAccumulator, Milliseconds, MonitorSettings, PowerSample, ReadingPayload,
    SaveScheduler, Sampler, SamplingError, VoltageCalibration,
};

/// 1周期 100 サンプルの正弦波を返すモックADC
struct SineAdc {
    index: u32,
    current_peak_counts: f64,
    voltage_peak_counts: f64,
    fail_current_at: Option<u32>,
}

impl SineAdc {
    fn new(current_peak_counts: f64, voltage_peak_counts: f64) -> Self {
        Self {
            index: 0,
            current_peak_counts,
            voltage_peak_counts,
            fail_current_at: None,
        }
    }

    fn phase(&self) -> f64 {
        2.0 * PI * (self.index % 100) as f64 / 100.0
    }
}

impl DualChannelAdc for SineAdc {
    type Error = String;

    fn read_current_raw(&mut self) -> Result<u16, Self::Error> {
        if self.fail_current_at == Some(self.index) {
            return Err(format!("timeout at {}", self.index));
        }
        Ok((2048.0 + self.current_peak_counts * self.phase().sin()).round() as u16)
    }

    fn read_voltage_raw(&mut self) -> Result<u16, Self::Error> {
        let raw = (2048.0 + self.voltage_peak_counts * self.phase().sin()).round() as u16;
        self.index += 1;
        Ok(raw)
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// ADC側RMS電圧 → 正弦波のピークカウント
fn peak_counts(adc_rms_volts: f64) -> f64 {
    adc_rms_volts * 2f64.sqrt() / 3.3 * 4095.0
}

#[test]
fn test_five_amps_at_220_volts() {
    let settings = MonitorSettings::DEFAULT;
    let calibration = VoltageCalibration::new(settings.voltage_sensor.initial_sensitivity);
    let sampler = Sampler::from_settings(&settings);

    // 5A → センサー側 0.5V → ADC側 0.33V, 220V → ADC側 0.374V
    let mut adc = SineAdc::new(peak_counts(0.33), peak_counts(0.374));
    let window = sampler.sample_window(&mut adc, &mut NoDelay).unwrap();
    let sample = PowerSample::from_window(&window, &settings, &calibration);

    assert!((sample.current.0 - 5.0).abs() < 0.05, "current = {}", sample.current);
    assert!((sample.voltage.0 - 220.0).abs() < 1.0, "voltage = {}", sample.voltage);
    assert!((sample.real_power.0 - 220.0 * 5.0 * 0.85).abs() < 15.0);
    assert!(!sample.voltage_fallback);
}

#[test]
fn test_idle_load_reads_zero_current() {
    let settings = MonitorSettings::DEFAULT;
    let calibration = VoltageCalibration::new(settings.voltage_sensor.initial_sensitivity);
    let sampler = Sampler::from_settings(&settings);

    // ±3カウント程度のノイズ
    let mut adc = SineAdc::new(3.0, peak_counts(0.374));
    let window = sampler.sample_window(&mut adc, &mut NoDelay).unwrap();
    let sample = PowerSample::from_window(&window, &settings, &calibration);

    assert_eq!(sample.current.0, 0.0);
    assert_eq!(sample.real_power.0, 0.0);
}

#[test]
fn test_disconnected_voltage_sensor_uses_line_voltage() {
    let settings = MonitorSettings::DEFAULT;
    let calibration = VoltageCalibration::new(settings.voltage_sensor.initial_sensitivity);
    let sampler = Sampler::from_settings(&settings);

    let mut adc = SineAdc::new(peak_counts(0.33), 0.0);
    let window = sampler.sample_window(&mut adc, &mut NoDelay).unwrap();
    let sample = PowerSample::from_window(&window, &settings, &calibration);

    assert!(sample.voltage_fallback);
    assert_eq!(sample.voltage, settings.measurement.line_voltage);
}

#[test]
fn test_current_read_error_aborts_window() {
    let settings = MonitorSettings::DEFAULT;
    let sampler = Sampler::from_settings(&settings);

    let mut adc = SineAdc::new(peak_counts(0.33), peak_counts(0.374));
    adc.fail_current_at = Some(42);
    let result = sampler.sample_window(&mut adc, &mut NoDelay);

    match result {
        Err(SamplingError::Adc { channel, detail }) => {
            assert_eq!(channel, "current");
            assert!(detail.contains("42"));
        }
        other => panic!("Expected ADC error, got {:?}", other),
    }
}

#[test]
fn test_recalibration_changes_next_reading() {
    let settings = MonitorSettings::DEFAULT;
    let calibration = VoltageCalibration::new(settings.voltage_sensor.initial_sensitivity);
    let sampler = Sampler::from_settings(&settings);

    // 実際は 230V の入力
    let mut adc = SineAdc::new(peak_counts(0.33), peak_counts(0.391));
    let window = sampler.sample_window(&mut adc, &mut NoDelay).unwrap();
    let before = PowerSample::from_window(&window, &settings, &calibration);

    calibration
        .calibrate_to_reference(before.voltage, energy_monitor_core::Volts(220.0))
        .unwrap();
    let after = PowerSample::from_window(&window, &settings, &calibration);
    assert!((after.voltage.0 - 220.0).abs() < 0.01);
}

#[test]
fn test_ten_minutes_of_readings_become_one_payload() {
    let settings = MonitorSettings::DEFAULT;
    let calibration = VoltageCalibration::new(settings.voltage_sensor.initial_sensitivity);
    let sampler = Sampler::from_settings(&settings);
    let mut scheduler = SaveScheduler::new(settings.persistence.save_interval, 0);
    let mut energy = EnergyAccumulator::new();

    let mut adc = SineAdc::new(peak_counts(0.33), peak_counts(0.374));
    let window_ms = Milliseconds(1_000);
    let mut now_ms: u32 = 0;
    let mut payloads = Vec::new();

    for _ in 0..1_200 {
        let window = sampler.sample_window(&mut adc, &mut NoDelay).unwrap();
        let sample = PowerSample::from_window(&window, &settings, &calibration);
        now_ms += window_ms.0;
        energy.add(&sample, window_ms);

        if scheduler.is_due(now_ms) {
            let report = energy.take();
            payloads.push(ReadingPayload::from_report(settings.pins.current, &report));
            scheduler.mark_saved(now_ms);
        }
    }

    assert_eq!(payloads.len(), 2);
    for payload in &payloads {
        assert_eq!(payload.port, "34");
        assert!((payload.duration_min - 10.0).abs() < 1e-9);
        // 935W × 10分 ≈ 155.8Wh
        assert!((payload.energy_wh - 935.0 / 6.0).abs() < 3.0, "energy = {}", payload.energy_wh);
    }
}
