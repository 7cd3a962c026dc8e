use crate::units::Volts;

/// 実効値計算用の積算器
///
/// センサー出力は電源電圧の中点を中心に振れるため、平均（DC成分）を
/// 差し引いた交流成分の実効値を返す。
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RmsAccumulator {
    count: u32,
    sum: f64,
    sum_sq: f64,
}

impl RmsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: Volts) {
        let v = sample.0 as f64;
        self.count += 1;
        self.sum += v;
        self.sum_sq += v * v;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// DC成分（平均電圧）
    pub fn mean(&self) -> Option<Volts> {
        if self.count == 0 {
            return None;
        }
        Some(Volts((self.sum / self.count as f64) as f32))
    }

    /// DC成分を除いた実効値
    pub fn rms(&self) -> Option<Volts> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as f64;
        let mean = self.sum / n;
        // 丸め誤差で僅かに負になることがある
        let variance = (self.sum_sq / n - mean * mean).max(0.0);
        Some(Volts(variance.sqrt() as f32))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_empty_window() {
        let acc = RmsAccumulator::new();
        assert_eq!(acc.rms(), None);
        assert_eq!(acc.mean(), None);
    }

    #[test]
    fn test_constant_signal_has_zero_rms() {
        let mut acc = RmsAccumulator::new();
        for _ in 0..100 {
            acc.push(Volts(1.65));
        }
        assert!(acc.rms().unwrap().0.abs() < 1e-4);
        assert!((acc.mean().unwrap().0 - 1.65).abs() < 1e-6);
    }

    #[test]
    fn test_sine_with_offset() {
        // 振幅 1V の正弦波 → 実効値 1/√2
        let mut acc = RmsAccumulator::new();
        let samples = 1000;
        for i in 0..samples {
            let phase = 2.0 * PI * i as f64 / samples as f64;
            acc.push(Volts((1.65 + phase.sin()) as f32));
        }
        let rms = acc.rms().unwrap().0;
        assert!((rms - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-3, "rms = {}", rms);
    }

    #[test]
    fn test_reset() {
        let mut acc = RmsAccumulator::new();
        acc.push(Volts(1.0));
        acc.reset();
        assert_eq!(acc.count(), 0);
    }
}
