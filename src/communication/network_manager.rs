use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};
use log::{info, warn};

use crate::credentials::WifiCredentials;

/// Wi-Fi (STAモード) の接続を管理するモジュール
pub struct NetworkManager;

impl NetworkManager {
    /// STAモードでアクセスポイントに接続し、IPアドレス取得まで待つ
    pub fn connect(
        modem: Modem,
        sysloop: &EspSystemEventLoop,
        nvs_partition: &EspDefaultNvsPartition,
        credentials: &WifiCredentials,
    ) -> anyhow::Result<BlockingWifi<EspWifi<'static>>> {
        info!("Wi-Fi を STA モードで初期化します: {}", credentials.ssid);

        let mut wifi = BlockingWifi::wrap(
            EspWifi::new(modem, sysloop.clone(), Some(nvs_partition.clone()))?,
            sysloop.clone(),
        )?;

        let auth_method = if credentials.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid: credentials
                .ssid
                .as_str()
                .try_into()
                .map_err(|_| anyhow::anyhow!("SSIDが長すぎます: {}", credentials.ssid))?,
            password: credentials
                .password
                .as_str()
                .try_into()
                .map_err(|_| anyhow::anyhow!("Wi-Fi パスワードが長すぎます"))?,
            auth_method,
            ..Default::default()
        }))?;

        wifi.start()?;
        info!("Wi-Fi が起動しました。接続中...");

        wifi.connect()?;
        wifi.wait_netif_up()?;

        let ip_info = wifi.wifi().sta_netif().get_ip_info()?;
        info!("Wi-Fi 接続完了: IP {}", ip_info.ip);

        Ok(wifi)
    }

    /// 切断されていれば再接続する
    pub fn ensure_connected(wifi: &mut BlockingWifi<EspWifi<'static>>) -> anyhow::Result<()> {
        if wifi.is_connected()? {
            return Ok(());
        }

        warn!("Wi-Fi が切断されています。再接続します");
        wifi.connect()?;
        wifi.wait_netif_up()?;
        info!("Wi-Fi 再接続完了");
        Ok(())
    }
}
