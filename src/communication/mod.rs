/// 通信モジュール
pub mod http_reporter;
pub mod network_manager;

pub use http_reporter::HttpReporter;
pub use network_manager::NetworkManager;
