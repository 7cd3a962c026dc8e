use log::{debug, info, warn};

use crate::power::{EnergyAccumulator, EnergyReport, PowerSample};
use crate::schedule::SaveScheduler;
use crate::settings::MonitorSettings;
use crate::units::{Milliseconds, Volts};

/// 計測ループの状態
///
/// 計測結果を受け取るたびに前回からの経過時間分の電力量を積算し、
/// 保存間隔に達したら送信用のレポートを返す。ハードウェアと通信は扱わない。
#[derive(Debug)]
pub struct EnergyMonitor {
    scheduler: SaveScheduler,
    energy: EnergyAccumulator,
    last_tick_ms: u32,
    last_measured_voltage: Option<Volts>,
}

impl EnergyMonitor {
    pub fn new(settings: &MonitorSettings, now_ms: u32) -> Self {
        Self {
            scheduler: SaveScheduler::new(settings.persistence.save_interval, now_ms),
            energy: EnergyAccumulator::new(),
            last_tick_ms: now_ms,
            last_measured_voltage: None,
        }
    }

    /// 計測結果を記録し、保存タイミングならレポートを返す
    pub fn record(&mut self, sample: &PowerSample, now_ms: u32) -> Option<EnergyReport> {
        let elapsed = Milliseconds(now_ms.wrapping_sub(self.last_tick_ms));
        self.last_tick_ms = now_ms;
        self.energy.add(sample, elapsed);

        if !sample.voltage_fallback {
            self.last_measured_voltage = Some(sample.voltage);
        }

        debug!(
            "積算中: {} / {} (次の保存まで {})",
            self.energy.energy(),
            self.energy.duration(),
            self.scheduler.remaining(now_ms)
        );

        if self.scheduler.is_due(now_ms) {
            self.scheduler.mark_saved(now_ms);
            let report = self.energy.take();
            info!(
                "保存間隔に到達: {} / {:.1}分",
                report.energy,
                report.duration.as_minutes_f64()
            );
            Some(report)
        } else {
            None
        }
    }

    /// 送信できなかったレポートを次回分に繰り越す
    pub fn report_failed(&mut self, report: EnergyReport) {
        warn!("送信失敗のため {} を次回に繰り越します", report.energy);
        self.energy.restore(report);
    }

    /// 公称値で代用していない直近の計測電圧
    pub fn last_measured_voltage(&self) -> Option<Volts> {
        self.last_measured_voltage
    }

    pub fn pending_energy(&self) -> EnergyAccumulator {
        self.energy
    }
}
