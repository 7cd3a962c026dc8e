/// 設定値の検証
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("送信先URLが設定されていません")]
    MissingServerUrl,
    #[error("送信先URLは http:// で始まる必要があります: {0}")]
    InvalidServerUrl(String),
    #[error("Wi-Fi SSID が設定されていません")]
    MissingWifiSsid,
    #[error("Wi-Fi SSID が長すぎます (最大32バイト): {0}")]
    WifiSsidTooLong(String),
    #[error("Wi-Fi パスワードが長すぎます (最大64バイト)")]
    WifiPasswordTooLong,
    #[error("ADC分解能が0です")]
    InvalidAdcResolution,
    #[error("{name} は正の値である必要があります: {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("力率は 0 より大きく 1 以下である必要があります: {0}")]
    InvalidPowerFactor(f32),
    #[error("RMSサンプル数は1以上である必要があります")]
    InvalidSampleCount,
    #[error("換算係数が電源電圧 / ADC基準電圧と一致しません: {actual} (期待値 {expected})")]
    DivisorFactorMismatch { expected: f32, actual: f32 },
}

const WIFI_SSID_MAX_LEN: usize = 32;
const WIFI_PASSWORD_MAX_LEN: usize = 64;

pub fn validate_server_url(url: &str) -> Result<(), ValidationError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingServerUrl);
    }
    match trimmed.strip_prefix("http://") {
        Some(rest) if !rest.is_empty() => Ok(()),
        _ => Err(ValidationError::InvalidServerUrl(url.to_string())),
    }
}

pub fn validate_wifi_credentials(ssid: &str, password: &str) -> Result<(), ValidationError> {
    if ssid.is_empty() {
        return Err(ValidationError::MissingWifiSsid);
    }
    if ssid.len() > WIFI_SSID_MAX_LEN {
        return Err(ValidationError::WifiSsidTooLong(ssid.to_string()));
    }
    if password.len() > WIFI_PASSWORD_MAX_LEN {
        return Err(ValidationError::WifiPasswordTooLong);
    }
    Ok(())
}

pub fn validate_positive(name: &'static str, value: f32) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NonPositive { name, value })
    }
}

pub fn validate_power_factor(value: f32) -> Result<(), ValidationError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidPowerFactor(value))
    }
}

pub fn validate_sample_count(samples: u32) -> Result<(), ValidationError> {
    if samples == 0 {
        Err(ValidationError::InvalidSampleCount)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_url() {
        assert!(validate_server_url("http://192.168.1.110:3000/readings").is_ok());
        assert_eq!(validate_server_url("  "), Err(ValidationError::MissingServerUrl));
        assert_eq!(
            validate_server_url("https://example.com/readings"),
            Err(ValidationError::InvalidServerUrl("https://example.com/readings".to_string()))
        );
        assert!(validate_server_url("http://").is_err());
    }

    #[test]
    fn test_wifi_credentials() {
        assert!(validate_wifi_credentials("farm", "secret").is_ok());
        assert!(validate_wifi_credentials("open-network", "").is_ok());
        assert_eq!(
            validate_wifi_credentials("", "secret"),
            Err(ValidationError::MissingWifiSsid)
        );
        let long_ssid = "x".repeat(33);
        assert!(matches!(
            validate_wifi_credentials(&long_ssid, ""),
            Err(ValidationError::WifiSsidTooLong(_))
        ));
        assert_eq!(
            validate_wifi_credentials("farm", &"p".repeat(65)),
            Err(ValidationError::WifiPasswordTooLong)
        );
    }

    #[test]
    fn test_positive() {
        assert!(validate_positive("x", 0.1).is_ok());
        assert!(validate_positive("x", 0.0).is_err());
        assert!(validate_positive("x", f32::NAN).is_err());
    }

    #[test]
    fn test_power_factor_bounds() {
        assert!(validate_power_factor(1.0).is_ok());
        assert!(validate_power_factor(0.85).is_ok());
        assert!(validate_power_factor(0.0).is_err());
        assert!(validate_power_factor(1.01).is_err());
    }

    #[test]
    fn test_sample_count() {
        assert!(validate_sample_count(500).is_ok());
        assert_eq!(validate_sample_count(0), Err(ValidationError::InvalidSampleCount));
    }
}
