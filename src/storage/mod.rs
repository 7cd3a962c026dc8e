/// 永続化モジュール
pub mod preferences;

pub use preferences::Preferences;
