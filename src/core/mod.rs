/// コアシステムモジュール
pub mod app_controller;
pub mod console;

pub use app_controller::{AppController, MonitorResources};
pub use console::{CalibrationConsole, ConsoleLink};
