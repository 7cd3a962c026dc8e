use crate::units::Milliseconds;

/// 保存（送信）タイミングの判定
///
/// 起動からのミリ秒カウンタ（u32、約49日で一周）を前提に、差分は
/// wrapping で計算する。
#[derive(Debug, Clone, Copy)]
pub struct SaveScheduler {
    interval: Milliseconds,
    last_saved_ms: u32,
}

impl SaveScheduler {
    pub fn new(interval: Milliseconds, now_ms: u32) -> Self {
        Self {
            interval,
            last_saved_ms: now_ms,
        }
    }

    pub fn interval(&self) -> Milliseconds {
        self.interval
    }

    /// 前回保存からの経過時間
    pub fn elapsed(&self, now_ms: u32) -> Milliseconds {
        Milliseconds(now_ms.wrapping_sub(self.last_saved_ms))
    }

    pub fn is_due(&self, now_ms: u32) -> bool {
        self.elapsed(now_ms) >= self.interval
    }

    /// 次の保存までの残り時間
    pub fn remaining(&self, now_ms: u32) -> Milliseconds {
        Milliseconds(self.interval.0.saturating_sub(self.elapsed(now_ms).0))
    }

    pub fn mark_saved(&mut self, now_ms: u32) {
        self.last_saved_ms = now_ms;
    }
}
