//! 校正コマンド解析機能
use log::{debug, info, warn};

use crate::calibration::VoltageCalibration;
use crate::settings::MonitorSettings;
use crate::units::Volts;

/// 解析されたコマンド
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// 電圧センサー感度を直接設定
    /// フォーマット: "CAL_VSENS:0.0017"
    SetVoltageSensitivity(f32),
    /// 直前の計測値が指定電圧になるよう感度を補正
    /// フォーマット: "CAL_REF:220"
    CalibrateToReference(f32),
    /// 現在の設定と感度を表示
    /// フォーマット: "CAL_SHOW"
    Show,
    /// 感度を初期値に戻す
    /// フォーマット: "CAL_RESET"
    Reset,
    /// 不明なコマンド
    Unknown(String),
}

/// コマンド解析エラー
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandParseError {
    /// 値がない（コマンド名を保持）
    #[error("{0} の値がありません")]
    MissingValue(String),
    /// 数値として解析できない、または正の有限値でない
    #[error("無効な値です: '{0}'")]
    InvalidValue(String),
}

const SET_SENSITIVITY: &str = "CAL_VSENS";
const REFERENCE: &str = "CAL_REF";

/// コマンド文字列を解析します
///
/// # 引数
/// * `command_str` - 解析するコマンド文字列（前後の空白は無視）
pub fn parse_command(command_str: &str) -> Result<Command, CommandParseError> {
    debug!("Parsing command: '{}'", command_str);

    let trimmed = command_str.trim();

    if let Some(value) = command_value(trimmed, SET_SENSITIVITY) {
        parse_positive(SET_SENSITIVITY, value).map(Command::SetVoltageSensitivity)
    } else if let Some(value) = command_value(trimmed, REFERENCE) {
        parse_positive(REFERENCE, value).map(Command::CalibrateToReference)
    } else if trimmed == "CAL_SHOW" {
        Ok(Command::Show)
    } else if trimmed == "CAL_RESET" {
        Ok(Command::Reset)
    } else {
        warn!("Unknown command format: '{}'", trimmed);
        Ok(Command::Unknown(trimmed.to_string()))
    }
}

/// "NAME:値" の値部分
fn command_value<'a>(command: &'a str, name: &str) -> Option<&'a str> {
    command.strip_prefix(name)?.strip_prefix(':')
}

fn parse_positive(name: &str, value: &str) -> Result<f32, CommandParseError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CommandParseError::MissingValue(name.to_string()));
    }

    match value.parse::<f32>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        _ => {
            warn!("Invalid value: '{}'", value);
            Err(CommandParseError::InvalidValue(value.to_string()))
        }
    }
}

/// コマンド実行結果
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// 感度が変わった（永続化が必要）
    SensitivityChanged(f32),
    /// 表示のみ
    Report(String),
    /// 実行できなかった
    Rejected(String),
}

/// コマンドを校正値に適用します
///
/// `last_measured` は公称値で代用していない直近の計測電圧。
pub fn apply_command(
    command: &Command,
    calibration: &VoltageCalibration,
    last_measured: Option<Volts>,
    settings: &MonitorSettings,
) -> CommandOutcome {
    match command {
        Command::SetVoltageSensitivity(value) => {
            calibration.set_sensitivity(*value);
            info!("電圧センサー感度を設定: {:.6}", value);
            CommandOutcome::SensitivityChanged(*value)
        }
        Command::CalibrateToReference(reference) => match last_measured {
            Some(measured) => match calibration.calibrate_to_reference(measured, Volts(*reference)) {
                Some(updated) => CommandOutcome::SensitivityChanged(updated),
                None => CommandOutcome::Rejected(format!(
                    "補正できません (計測 {} / 基準 {}V)",
                    measured, reference
                )),
            },
            None => CommandOutcome::Rejected("電圧の計測値がまだありません".to_string()),
        },
        Command::Show => {
            let summary = format!(
                "電圧センサー感度: {:.6} (初期値 {:.6}), 送信先: {}, 保存間隔: {}分",
                calibration.sensitivity(),
                settings.voltage_sensor.initial_sensitivity,
                settings.network.server_url,
                settings.persistence.save_interval.as_minutes()
            );
            match settings.snapshot(calibration).to_json() {
                Ok(json) => CommandOutcome::Report(format!("{}\n{}", summary, json)),
                Err(e) => CommandOutcome::Report(format!("{} (JSON変換に失敗: {})", summary, e)),
            }
        }
        Command::Reset => {
            let initial = calibration.reset(&settings.voltage_sensor);
            info!("電圧センサー感度を初期値に戻しました: {:.6}", initial);
            CommandOutcome::SensitivityChanged(initial)
        }
        Command::Unknown(text) => CommandOutcome::Rejected(format!("不明なコマンド: {}", text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_sensitivity() {
        assert_eq!(
            parse_command("CAL_VSENS:0.0019").unwrap(),
            Command::SetVoltageSensitivity(0.0019)
        );
    }

    #[test]
    fn test_reference_with_whitespace() {
        assert_eq!(
            parse_command("  CAL_REF: 220.5 \r\n").unwrap(),
            Command::CalibrateToReference(220.5)
        );
    }

    #[test]
    fn test_show_and_reset() {
        assert_eq!(parse_command("CAL_SHOW").unwrap(), Command::Show);
        assert_eq!(parse_command("CAL_RESET\n").unwrap(), Command::Reset);
    }

    #[test]
    fn test_missing_value() {
        assert_eq!(
            parse_command("CAL_VSENS:"),
            Err(CommandParseError::MissingValue("CAL_VSENS".to_string()))
        );
        let err = parse_command("CAL_REF:  ").unwrap_err();
        assert_eq!(err.to_string(), "CAL_REF の値がありません");
    }

    #[test]
    fn test_invalid_values() {
        for command in ["CAL_VSENS:abc", "CAL_VSENS:-0.1", "CAL_VSENS:0", "CAL_REF:inf", "CAL_REF:NaN"] {
            assert!(
                matches!(parse_command(command), Err(CommandParseError::InvalidValue(_))),
                "{} should be rejected",
                command
            );
        }
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            parse_command("HELLO").unwrap(),
            Command::Unknown("HELLO".to_string())
        );
    }

    #[test]
    fn test_apply_set_and_reset() {
        let calibration = VoltageCalibration::new(0.0017);
        let settings = MonitorSettings::DEFAULT;

        let outcome = apply_command(
            &Command::SetVoltageSensitivity(0.002),
            &calibration,
            None,
            &settings,
        );
        assert_eq!(outcome, CommandOutcome::SensitivityChanged(0.002));
        assert_eq!(calibration.sensitivity(), 0.002);

        let outcome = apply_command(&Command::Reset, &calibration, None, &settings);
        assert_eq!(outcome, CommandOutcome::SensitivityChanged(0.0017));
        assert_eq!(calibration.sensitivity(), 0.0017);
    }

    #[test]
    fn test_reset_uses_configured_initial_value() {
        // cfg.toml で初期値が上書きされている場合
        let calibration = VoltageCalibration::new(0.0025);
        let mut settings = MonitorSettings::DEFAULT;
        settings.voltage_sensor.initial_sensitivity = 0.0019;

        let outcome = apply_command(&Command::Reset, &calibration, None, &settings);
        assert_eq!(outcome, CommandOutcome::SensitivityChanged(0.0019));
        assert_eq!(calibration.sensitivity(), 0.0019);
    }

    #[test]
    fn test_apply_reference_requires_measurement() {
        let calibration = VoltageCalibration::new(0.0017);
        let settings = MonitorSettings::DEFAULT;

        let outcome = apply_command(
            &Command::CalibrateToReference(220.0),
            &calibration,
            None,
            &settings,
        );
        assert!(matches!(outcome, CommandOutcome::Rejected(_)));
        assert_eq!(calibration.sensitivity(), 0.0017);
    }

    #[test]
    fn test_apply_reference() {
        let calibration = VoltageCalibration::new(0.0017);
        let settings = MonitorSettings::DEFAULT;

        // 200V と計測されたが実際は 220V
        let outcome = apply_command(
            &Command::CalibrateToReference(220.0),
            &calibration,
            Some(Volts(200.0)),
            &settings,
        );
        match outcome {
            CommandOutcome::SensitivityChanged(value) => {
                assert!((value - 0.0017 * 200.0 / 220.0).abs() < 1e-7)
            }
            other => panic!("Expected SensitivityChanged, got {:?}", other),
        }
    }

    #[test]
    fn test_apply_show() {
        let calibration = VoltageCalibration::new(0.0017);
        let outcome = apply_command(&Command::Show, &calibration, None, &MonitorSettings::DEFAULT);
        match outcome {
            CommandOutcome::Report(text) => {
                assert!(text.contains("0.001700"));
                assert!(text.contains("10分"));
                let json = text.lines().nth(1).unwrap();
                let snapshot = crate::settings::SettingsSnapshot::from_json(json).unwrap();
                assert_eq!(snapshot.voltage_sensitivity, 0.0017);
            }
            other => panic!("Expected Report, got {:?}", other),
        }
    }
}
