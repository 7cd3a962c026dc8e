use embedded_hal::delay::DelayNs;
use log::{debug, warn};
use std::fmt::Debug;

use crate::rms::RmsAccumulator;
use crate::settings::{AdcSettings, MonitorSettings};
use crate::units::{Microseconds, Volts};

/// 電流・電圧の2チャンネルを読むADC
///
/// ESP32 では ADC1 のワンショットドライバー、テストではモックが実装する。
pub trait DualChannelAdc {
    type Error: Debug;

    /// 電流センサーの生値 (0..=分解能)
    fn read_current_raw(&mut self) -> Result<u16, Self::Error>;

    /// 電圧センサーの生値 (0..=分解能)
    fn read_voltage_raw(&mut self) -> Result<u16, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SamplingError {
    #[error("ADC読み取りエラー ({channel}): {detail}")]
    Adc { channel: &'static str, detail: String },
    #[error("サンプル数が0です")]
    EmptyWindow,
}

/// 1ウィンドウ分のADC側RMS電圧
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowRms {
    pub current_adc_rms: Volts,
    /// 電圧チャンネルが読めなかった場合は `None`
    pub voltage_adc_rms: Option<Volts>,
    pub samples: u32,
}

/// RMSウィンドウのサンプリング
#[derive(Debug, Clone, Copy)]
pub struct Sampler {
    adc: AdcSettings,
    samples_per_rms: u32,
    sample_delay: Microseconds,
}

impl Sampler {
    pub fn new(adc: AdcSettings, samples_per_rms: u32, sample_delay: Microseconds) -> Self {
        Self {
            adc,
            samples_per_rms,
            sample_delay,
        }
    }

    pub fn from_settings(settings: &MonitorSettings) -> Self {
        Self::new(
            settings.adc,
            settings.measurement.samples_per_rms,
            settings.measurement.sample_delay,
        )
    }

    /// `samples_per_rms` 回サンプリングしてRMSを求める
    ///
    /// 電流チャンネルの読み取りエラーはウィンドウを中断する。電圧チャンネルの
    /// エラーは電圧だけを欠測扱いにし、電流のサンプリングは続ける。
    pub fn sample_window<A, D>(&self, adc: &mut A, delay: &mut D) -> Result<WindowRms, SamplingError>
    where
        A: DualChannelAdc,
        D: DelayNs,
    {
        if self.samples_per_rms == 0 {
            return Err(SamplingError::EmptyWindow);
        }

        let mut current = RmsAccumulator::new();
        let mut voltage = RmsAccumulator::new();
        let mut voltage_failed = false;

        for i in 0..self.samples_per_rms {
            let raw_current = adc.read_current_raw().map_err(|e| SamplingError::Adc {
                channel: "current",
                detail: format!("{:?}", e),
            })?;
            current.push(self.adc.raw_to_volts(raw_current));

            if !voltage_failed {
                match adc.read_voltage_raw() {
                    Ok(raw_voltage) => voltage.push(self.adc.raw_to_volts(raw_voltage)),
                    Err(e) => {
                        warn!("電圧チャンネルの読み取りに失敗 (サンプル {}): {:?}", i, e);
                        voltage_failed = true;
                    }
                }
            }

            if i + 1 < self.samples_per_rms {
                delay.delay_us(self.sample_delay.0);
            }
        }

        let current_adc_rms = current.rms().ok_or(SamplingError::EmptyWindow)?;
        let voltage_adc_rms = if voltage_failed { None } else { voltage.rms() };

        debug!(
            "RMSウィンドウ完了: {} サンプル, 電流側 {:.4}V, 電圧側 {:?}",
            self.samples_per_rms, current_adc_rms.0, voltage_adc_rms
        );

        Ok(WindowRms {
            current_adc_rms,
            voltage_adc_rms,
            samples: self.samples_per_rms,
        })
    }
}
