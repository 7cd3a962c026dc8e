use energy_monitor_core::VoltageCalibration;
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
use log::{info, warn};

use crate::credentials::WifiCredentials;

const NAMESPACE: &str = "energy";
const KEY_WIFI_SSID: &str = "wifi_ssid";
const KEY_WIFI_PASSWORD: &str = "wifi_pass";
/// f32 のビット列を u32 として保存
const KEY_VOLTAGE_SENSITIVITY: &str = "v_sens";

/// NVS に保存する設定（Wi-Fi 接続情報と電圧センサー感度）
pub struct Preferences {
    nvs: EspNvs<NvsDefault>,
}

impl Preferences {
    pub fn open(partition: EspDefaultNvsPartition) -> anyhow::Result<Self> {
        let nvs = EspNvs::new(partition, NAMESPACE, true)?;
        info!("NVS 名前空間 '{}' を開きました", NAMESPACE);
        Ok(Self { nvs })
    }

    pub fn load_wifi_credentials(&self) -> anyhow::Result<Option<WifiCredentials>> {
        // 終端NULを含めたバッファ
        let mut ssid_buf = [0u8; 33];
        let mut password_buf = [0u8; 65];

        let ssid = match self.nvs.get_str(KEY_WIFI_SSID, &mut ssid_buf)? {
            Some(ssid) => ssid.to_string(),
            None => return Ok(None),
        };
        let password = self
            .nvs
            .get_str(KEY_WIFI_PASSWORD, &mut password_buf)?
            .unwrap_or_default()
            .to_string();

        Ok(Some(WifiCredentials { ssid, password }))
    }

    pub fn save_wifi_credentials(&mut self, credentials: &WifiCredentials) -> anyhow::Result<()> {
        self.nvs.set_str(KEY_WIFI_SSID, &credentials.ssid)?;
        self.nvs.set_str(KEY_WIFI_PASSWORD, &credentials.password)?;
        info!("Wi-Fi 設定を NVS に保存しました: {}", credentials.ssid);
        Ok(())
    }

    pub fn load_voltage_sensitivity(&self) -> anyhow::Result<Option<f32>> {
        Ok(self.nvs.get_u32(KEY_VOLTAGE_SENSITIVITY)?.map(f32::from_bits))
    }

    pub fn save_voltage_sensitivity(&mut self, sensitivity: f32) -> anyhow::Result<()> {
        self.nvs
            .set_u32(KEY_VOLTAGE_SENSITIVITY, sensitivity.to_bits())?;
        info!("電圧センサー感度を NVS に保存しました: {:.6}", sensitivity);
        Ok(())
    }

    /// 保存済みの感度があれば校正値に反映する
    pub fn restore_calibration(&self, calibration: &VoltageCalibration) -> anyhow::Result<()> {
        match self.load_voltage_sensitivity()? {
            Some(sensitivity) if sensitivity.is_finite() && sensitivity > 0.0 => {
                calibration.set_sensitivity(sensitivity);
                info!("保存済みの電圧センサー感度を使用します: {:.6}", sensitivity);
            }
            Some(sensitivity) => {
                warn!("NVS の電圧センサー感度が無効です ({}). 初期値を使用します", sensitivity);
            }
            None => {
                info!(
                    "電圧センサー感度は未保存です。初期値を使用します: {:.6}",
                    calibration.sensitivity()
                );
            }
        }
        Ok(())
    }
}
