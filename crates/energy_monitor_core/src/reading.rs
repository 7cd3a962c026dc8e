//! サーバーへ送信するペイロード
//!
//! サーバーはデバイスを「ポート（センサーのピン番号）」で識別する。
//! - `POST /readings`: `{"port", "energyWh", "durationMin"}`
//! - `POST /power`: `{"port", "realPower"}`
use serde::{Deserialize, Serialize};

use crate::power::EnergyReport;

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("JSONへの変換に失敗: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// 電力量の読み取り値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingPayload {
    pub port: String,
    pub energy_wh: f64,
    pub duration_min: f64,
}

impl ReadingPayload {
    pub fn from_report(port: u8, report: &EnergyReport) -> Self {
        Self {
            port: port.to_string(),
            energy_wh: report.energy.0,
            duration_min: report.duration.as_minutes_f64(),
        }
    }

    pub fn to_json(&self) -> Result<String, PayloadError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// 有効電力の読み取り値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerPayload {
    pub port: String,
    pub real_power: f32,
}

impl PowerPayload {
    pub fn from_report(port: u8, report: &EnergyReport) -> Self {
        Self {
            port: port.to_string(),
            real_power: report.last_real_power.0,
        }
    }

    pub fn to_json(&self) -> Result<String, PayloadError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// `/readings` のURLから `/power` のURLを作る（最後のパス要素を置き換える）
pub fn derive_power_url(server_url: &str) -> String {
    let trimmed = server_url.trim().trim_end_matches('/');
    let (scheme, rest) = match trimmed.find("://") {
        Some(idx) => trimmed.split_at(idx + 3),
        None => ("", trimmed),
    };

    match rest.rfind('/') {
        Some(idx) => format!("{}{}/power", scheme, &rest[..idx]),
        None => format!("{}{}/power", scheme, rest),
    }
}
