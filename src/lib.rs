/*!
 * # ESP32 Energy Monitor
 *
 * ACS712 (電流) と ZMPT101B (電圧) を ESP32 の ADC1 で計測し、
 * 10分ごとに電力量と有効電力を HTTP でサーバーへ送信するファームウェア
 *
 * ## モジュール構成
 * - `config`: cfg.toml から読み込むビルド時設定
 * - `credentials`: Wi-Fi 接続情報の選択（NVS / cfg.toml）
 * - `core`: 計測ループと校正コンソール
 * - `hardware`: ADC とセンサーピン
 * - `communication`: Wi-Fi 接続と HTTP 送信
 * - `storage`: NVS (preferences) への保存
 *
 * ハードウェア非依存の計算は `energy_monitor_core` クレートにある。
 */

pub mod config;
pub mod credentials;

// ESP32 ターゲット専用モジュール
#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
pub mod communication;
#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
pub mod core;
#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
pub mod hardware;
#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
pub mod storage;

pub use config::{AppConfig, ConfigError};
pub use credentials::{resolve_wifi_credentials, CredentialSource, WifiCredentials};
pub use energy_monitor_core as monitor_core;

/// ファームウェアのバージョン情報
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
