//! 物理量の型
//!
//! 電圧・電流・時間などを素の数値で扱うと単位の取り違えが起きやすいため、
//! 量ごとに別の型を持たせる。JSON 上はただの数値として現れる。
use serde::{Deserialize, Serialize};
use std::fmt;

/// 電圧（V）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volts(pub f32);

/// 電流（A）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amperes(pub f32);

/// 電流センサーの感度（V/A）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoltsPerAmpere(pub f32);

/// 電力（W）
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watts(pub f32);

/// 電力量（Wh）
///
/// 10分間の積算でも誤差が目立たないよう f64 で保持する
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WattHours(pub f64);

/// マイクロ秒
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Microseconds(pub u32);

/// ミリ秒
///
/// u32 で約49日分まで保持できる
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Milliseconds(pub u32);

impl Milliseconds {
    /// u32 に収まらない分数は上限に丸める
    pub const fn from_minutes(minutes: u32) -> Self {
        Milliseconds(minutes.saturating_mul(60_000))
    }

    /// 分単位（切り捨て）
    pub const fn as_minutes(self) -> u32 {
        self.0 / 60_000
    }

    /// 分単位（小数）
    pub fn as_minutes_f64(self) -> f64 {
        self.0 as f64 / 60_000.0
    }

    /// 時間単位（小数）
    pub fn as_hours_f64(self) -> f64 {
        self.0 as f64 / 3_600_000.0
    }
}

impl Watts {
    /// 指定時間この電力が続いた場合の電力量
    pub fn over(self, elapsed: Milliseconds) -> WattHours {
        WattHours(self.0 as f64 * elapsed.as_hours_f64())
    }
}

impl fmt::Display for Volts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}V", self.0)
    }
}

impl fmt::Display for Amperes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}A", self.0)
    }
}

impl fmt::Display for Watts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}W", self.0)
    }
}

impl fmt::Display for WattHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}Wh", self.0)
    }
}

impl fmt::Display for Milliseconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_conversion() {
        assert_eq!(Milliseconds(600_000).as_minutes(), 10);
        assert_eq!(Milliseconds::from_minutes(10), Milliseconds(600_000));
        assert!((Milliseconds(90_000).as_minutes_f64() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_from_minutes_saturates() {
        assert_eq!(Milliseconds::from_minutes(71_582), Milliseconds(4_294_920_000));
        assert_eq!(Milliseconds::from_minutes(71_583), Milliseconds(u32::MAX));
        assert_eq!(Milliseconds::from_minutes(u32::MAX), Milliseconds(u32::MAX));
    }

    #[test]
    fn test_watts_over_one_hour() {
        let energy = Watts(100.0).over(Milliseconds(3_600_000));
        assert!((energy.0 - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_watts_over_ten_minutes() {
        // 60W × 10分 = 10Wh
        let energy = Watts(60.0).over(Milliseconds::from_minutes(10));
        assert!((energy.0 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&Microseconds(100)).unwrap(), "100");
        assert_eq!(serde_json::to_string(&Milliseconds(600_000)).unwrap(), "600000");
    }

    #[test]
    fn test_display() {
        assert_eq!(Volts(220.0).to_string(), "220.0V");
        assert_eq!(Amperes(1.5).to_string(), "1.500A");
    }
}
