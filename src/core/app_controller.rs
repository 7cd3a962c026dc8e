use std::time::Instant;

use energy_monitor_core::{
    DualChannelAdc, EnergyMonitor, EnergyReport, PowerSample, Sampler, VOLTAGE_CALIBRATION,
};
use esp_idf_svc::hal::delay::{Ets, FreeRtos};
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use log::{debug, error, info, warn};

use crate::communication::{HttpReporter, NetworkManager};
use crate::config::AppConfig;
use crate::core::console::ConsoleLink;
use crate::storage::Preferences;

/// 計測ループで使う周辺リソース
pub struct MonitorResources<'a, A: DualChannelAdc> {
    pub adc: A,
    pub wifi: &'a mut BlockingWifi<EspWifi<'static>>,
    pub reporter: &'a HttpReporter,
    pub preferences: &'a mut Preferences,
    pub console: &'a ConsoleLink,
}

/// アプリケーションの主要な制御フローを管理するモジュール
pub struct AppController;

impl AppController {
    /// 計測・積算・送信を繰り返す（戻らない）
    pub fn run<A: DualChannelAdc>(
        config: &AppConfig,
        mut resources: MonitorResources<'_, A>,
    ) -> anyhow::Result<()> {
        let sampler = Sampler::from_settings(&config.settings);
        let boot = Instant::now();
        // ボードの millis() 相当。u32 で一周しても差分計算は wrapping で行う
        let now_ms = || boot.elapsed().as_millis() as u32;
        let mut monitor = EnergyMonitor::new(&config.settings, now_ms());
        let mut delay = Ets;

        info!(
            "計測を開始します: {} サンプル/ウィンドウ, 保存間隔 {}分",
            config.settings.measurement.samples_per_rms,
            config.settings.persistence.save_interval.as_minutes()
        );

        loop {
            match sampler.sample_window(&mut resources.adc, &mut delay) {
                Ok(window) => {
                    let sample =
                        PowerSample::from_window(&window, &config.settings, &VOLTAGE_CALIBRATION);
                    if config.debug_mode {
                        info!("{}", sample.summary());
                    } else {
                        debug!("{}", sample.summary());
                    }

                    if let Some(report) = monitor.record(&sample, now_ms()) {
                        if let Err(e) = Self::deliver(&report, &mut resources) {
                            error!("計測値の送信に失敗しました: {:?}", e);
                            monitor.report_failed(report);
                        }
                    }
                    resources
                        .console
                        .publish_measurement(monitor.last_measured_voltage());
                }
                Err(e) => error!("サンプリングに失敗しました: {}", e),
            }

            Self::persist_calibration(&mut resources);
            FreeRtos::delay_ms(config.measurement_pause_ms);
        }
    }

    fn deliver<A: DualChannelAdc>(
        report: &EnergyReport,
        resources: &mut MonitorResources<'_, A>,
    ) -> anyhow::Result<()> {
        NetworkManager::ensure_connected(resources.wifi)?;
        resources.reporter.send_report(report)
    }

    fn persist_calibration<A: DualChannelAdc>(resources: &mut MonitorResources<'_, A>) {
        if let Some(sensitivity) = resources.console.pending_sensitivity() {
            if let Err(e) = resources.preferences.save_voltage_sensitivity(sensitivity) {
                warn!("電圧センサー感度の保存に失敗しました: {:?}", e);
            }
        }
    }
}
