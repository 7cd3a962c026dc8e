use std::sync::Arc;

use esp_idf_svc::hal::{
    adc::{
        attenuation::DB_11,
        oneshot::{config::AdcChannelConfig, AdcChannelDriver, AdcDriver},
        ADC1,
    },
    gpio::{Gpio34, Gpio35},
};
use esp_idf_svc::sys::EspError;
use energy_monitor_core::DualChannelAdc;
use log::info;

use crate::hardware::AdcPins;

type SharedAdc1 = Arc<AdcDriver<'static, ADC1>>;

/// ADC1 で電流・電圧センサーを読み取るドライバー
///
/// 生値を `VCC_ADC / 分解能` で電圧に換算するため、ESP-IDF のADC補正は使わない。
pub struct EspSensorAdc {
    current: AdcChannelDriver<'static, Gpio34, SharedAdc1>,
    voltage: AdcChannelDriver<'static, Gpio35, SharedAdc1>,
}

impl EspSensorAdc {
    pub fn new(adc1: ADC1, pins: AdcPins) -> anyhow::Result<Self> {
        info!("ADC1を初期化しています (GPIO34: 電流, GPIO35: 電圧)");
        let adc_driver = Arc::new(AdcDriver::new(adc1)?);
        let adc_config = AdcChannelConfig {
            attenuation: DB_11,
            ..Default::default()
        };

        let current = AdcChannelDriver::new(adc_driver.clone(), pins.current, &adc_config)?;
        let voltage = AdcChannelDriver::new(adc_driver, pins.voltage, &adc_config)?;

        Ok(Self { current, voltage })
    }
}

impl DualChannelAdc for EspSensorAdc {
    type Error = EspError;

    fn read_current_raw(&mut self) -> Result<u16, Self::Error> {
        self.current.read_raw()
    }

    fn read_voltage_raw(&mut self) -> Result<u16, Self::Error> {
        self.voltage.read_raw()
    }
}
