use std::time::Duration;

use embedded_svc::http::client::Client;
use embedded_svc::io::Write;
use energy_monitor_core::{EnergyReport, PowerPayload, ReadingPayload};
use esp_idf_svc::http::client::{Configuration as HttpConfiguration, EspHttpConnection};
use log::{error, info};

use crate::config::AppConfig;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// 計測値をサーバーへ POST する
pub struct HttpReporter {
    readings_url: String,
    power_url: String,
    port: u8,
}

impl HttpReporter {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            readings_url: config.readings_url().to_string(),
            power_url: config.power_url.clone(),
            port: config.settings.pins.current,
        }
    }

    /// 電力量と有効電力を送信する
    ///
    /// 電力量 (`/readings`) の送信に失敗した場合のみエラーを返す。
    /// 有効電力 (`/power`) はログに残すだけで、次回分に繰り越さない。
    pub fn send_report(&self, report: &EnergyReport) -> anyhow::Result<()> {
        let reading = ReadingPayload::from_report(self.port, report);
        let body = reading.to_json()?;
        let status = self.post_json(&self.readings_url, &body)?;
        info!(
            "電力量を送信しました (HTTP {}): {:.3}Wh / {:.1}分",
            status, reading.energy_wh, reading.duration_min
        );

        let power = PowerPayload::from_report(self.port, report);
        match power
            .to_json()
            .map_err(anyhow::Error::from)
            .and_then(|body| self.post_json(&self.power_url, &body))
        {
            Ok(status) => info!("有効電力を送信しました (HTTP {}): {:.1}W", status, power.real_power),
            Err(e) => error!("有効電力の送信に失敗しました: {:?}", e),
        }

        Ok(())
    }

    fn post_json(&self, url: &str, body: &str) -> anyhow::Result<u16> {
        let connection = EspHttpConnection::new(&HttpConfiguration {
            timeout: Some(HTTP_TIMEOUT),
            ..Default::default()
        })?;
        let mut client = Client::wrap(connection);

        let content_length = body.len().to_string();
        let headers = [
            ("content-type", "application/json"),
            ("content-length", content_length.as_str()),
        ];

        let mut request = client.post(url, &headers)?;
        request.write_all(body.as_bytes())?;
        request.flush()?;

        let response = request.submit()?;
        let status = response.status();
        if !(200..300).contains(&status) {
            return Err(anyhow::anyhow!("HTTPエラー: {} ({})", status, url));
        }

        Ok(status)
    }
}
