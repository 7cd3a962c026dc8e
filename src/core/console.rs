use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;

use energy_monitor_core::{
    apply_command, parse_command, CommandOutcome, MonitorSettings, Volts, VOLTAGE_CALIBRATION,
};
use esp_idf_svc::hal::delay::FreeRtos;
use log::{error, info, warn};

const CONSOLE_STACK_SIZE: usize = 6 * 1024;
const CONSOLE_POLL_MS: u32 = 100;

/// 計測ループ側から見たコンソールとの接点
pub struct ConsoleLink {
    last_measured: Arc<Mutex<Option<Volts>>>,
    sensitivity_rx: Receiver<f32>,
}

impl ConsoleLink {
    /// 直近の計測電圧をコンソールに知らせる
    pub fn publish_measurement(&self, voltage: Option<Volts>) {
        if let Ok(mut last) = self.last_measured.lock() {
            *last = voltage;
        }
    }

    /// コンソールで変更された感度（NVS 未保存のもの）
    pub fn pending_sensitivity(&self) -> Option<f32> {
        // 複数あれば最後の値だけでよい
        self.sensitivity_rx.try_iter().last()
    }
}

/// UART コンソールから校正コマンドを受け付ける
pub struct CalibrationConsole;

impl CalibrationConsole {
    pub fn spawn(settings: MonitorSettings) -> anyhow::Result<ConsoleLink> {
        let last_measured = Arc::new(Mutex::new(None));
        let (sensitivity_tx, sensitivity_rx) = mpsc::channel();

        let shared = Arc::clone(&last_measured);
        thread::Builder::new()
            .name("cal-console".to_string())
            .stack_size(CONSOLE_STACK_SIZE)
            .spawn(move || Self::run(settings, shared, sensitivity_tx))?;

        info!("校正コンソールを起動しました (CAL_VSENS:<値> / CAL_REF:<電圧> / CAL_SHOW / CAL_RESET)");
        Ok(ConsoleLink {
            last_measured,
            sensitivity_rx,
        })
    }

    fn run(settings: MonitorSettings, last_measured: Arc<Mutex<Option<Volts>>>, tx: Sender<f32>) {
        let stdin = std::io::stdin();
        let mut line = String::new();

        loop {
            // UART の読み取りはデータが無いと即座に戻ることがある
            match stdin.lock().read_line(&mut line) {
                Ok(_) if line.ends_with('\n') => {
                    Self::handle_line(&line, &settings, &last_measured, &tx);
                    line.clear();
                }
                Ok(_) | Err(_) => FreeRtos::delay_ms(CONSOLE_POLL_MS),
            }
        }
    }

    fn handle_line(
        line: &str,
        settings: &MonitorSettings,
        last_measured: &Arc<Mutex<Option<Volts>>>,
        tx: &Sender<f32>,
    ) {
        if line.trim().is_empty() {
            return;
        }

        let command = match parse_command(line) {
            Ok(command) => command,
            Err(e) => {
                warn!("コマンドを解析できません: {}", e);
                return;
            }
        };

        let measured = last_measured.lock().ok().and_then(|last| *last);
        match apply_command(&command, &VOLTAGE_CALIBRATION, measured, settings) {
            CommandOutcome::SensitivityChanged(sensitivity) => {
                if tx.send(sensitivity).is_err() {
                    error!("計測ループが停止しているため感度を保存できません");
                }
            }
            CommandOutcome::Report(text) => info!("{}", text),
            CommandOutcome::Rejected(reason) => warn!("{}", reason),
        }
    }
}
