use energy_monitor_core::validation::validate_wifi_credentials;
use energy_monitor_core::ValidationError;
use log::info;

/// Wi-Fi 接続情報
#[derive(Clone, PartialEq, Eq)]
pub struct WifiCredentials {
    pub ssid: String,
    pub password: String,
}

impl WifiCredentials {
    pub fn new(ssid: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            ssid: ssid.into(),
            password: password.into(),
        }
    }
}

// パスワードをログに出さない
impl std::fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"***")
            .finish()
    }
}

/// 接続情報の取得元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// NVS に保存済み
    Stored,
    /// cfg.toml の値（NVS への書き込みが必要）
    BuildConfig,
}

/// NVS の保存値を優先し、無ければ cfg.toml の値を使う
pub fn resolve_wifi_credentials(
    stored: Option<WifiCredentials>,
    configured_ssid: &str,
    configured_password: &str,
) -> Result<(WifiCredentials, CredentialSource), ValidationError> {
    if let Some(stored) = stored.filter(|c| !c.ssid.is_empty()) {
        validate_wifi_credentials(&stored.ssid, &stored.password)?;
        info!("NVS に保存された Wi-Fi 設定を使用します: {}", stored.ssid);
        return Ok((stored, CredentialSource::Stored));
    }

    validate_wifi_credentials(configured_ssid, configured_password)?;
    info!("cfg.toml の Wi-Fi 設定を使用します: {}", configured_ssid);
    Ok((
        WifiCredentials::new(configured_ssid, configured_password),
        CredentialSource::BuildConfig,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_credentials_win() {
        let stored = WifiCredentials::new("home", "stored-pass");
        let (credentials, source) =
            resolve_wifi_credentials(Some(stored.clone()), "build", "build-pass").unwrap();
        assert_eq!(credentials, stored);
        assert_eq!(source, CredentialSource::Stored);
    }

    #[test]
    fn test_build_config_seeds_when_nothing_stored() {
        let (credentials, source) = resolve_wifi_credentials(None, "build", "build-pass").unwrap();
        assert_eq!(credentials, WifiCredentials::new("build", "build-pass"));
        assert_eq!(source, CredentialSource::BuildConfig);
    }

    #[test]
    fn test_empty_stored_ssid_is_ignored() {
        let stored = WifiCredentials::new("", "");
        let (_, source) = resolve_wifi_credentials(Some(stored), "build", "").unwrap();
        assert_eq!(source, CredentialSource::BuildConfig);
    }

    #[test]
    fn test_missing_everywhere() {
        assert_eq!(
            resolve_wifi_credentials(None, "", ""),
            Err(ValidationError::MissingWifiSsid)
        );
    }

    #[test]
    fn test_debug_hides_password() {
        let credentials = WifiCredentials::new("home", "secret");
        let debug = format!("{:?}", credentials);
        assert!(debug.contains("home"));
        assert!(!debug.contains("secret"));
    }
}
