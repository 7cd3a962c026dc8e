#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop, hal::peripherals::Peripherals, nvs::EspDefaultNvsPartition,
};

#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
use energy_monitor::{
    communication::{HttpReporter, NetworkManager},
    core::{AppController, CalibrationConsole, MonitorResources},
    hardware::{AdcPins, EspSensorAdc},
    monitor_core::VOLTAGE_CALIBRATION,
    resolve_wifi_credentials,
    storage::Preferences,
    AppConfig, CredentialSource,
};
#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
use log::{error, info, warn};

/// アプリケーションのメインエントリーポイント
#[cfg(any(target_arch = "riscv32", target_arch = "xtensa"))]
fn main() -> anyhow::Result<()> {
    // ESP-IDFの基本初期化
    esp_idf_sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    info!("Energy Monitor v{} を起動します", energy_monitor::VERSION);

    // 設定ファイル読み込み
    let app_config = AppConfig::load().map_err(|e| {
        error!("設定ファイルの読み込みに失敗しました: {}", e);
        anyhow::anyhow!("設定ファイルの読み込みエラー: {}", e)
    })?;

    info!("ペリフェラルを初期化しています");
    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    // 電圧センサー感度: cfg.toml の初期値を NVS の保存値で上書き
    VOLTAGE_CALIBRATION.set_sensitivity(app_config.settings.voltage_sensor.initial_sensitivity);
    let mut preferences = Preferences::open(nvs_partition.clone())?;
    if let Err(e) = preferences.restore_calibration(&VOLTAGE_CALIBRATION) {
        warn!("電圧センサー感度の読み込みに失敗しました: {:?}", e);
    }

    // Wi-Fi 接続情報
    let stored = preferences.load_wifi_credentials().unwrap_or_else(|e| {
        warn!("NVS の Wi-Fi 設定を読み込めません: {:?}", e);
        None
    });
    let (credentials, source) =
        resolve_wifi_credentials(stored, &app_config.wifi_ssid, &app_config.wifi_password)?;
    if source == CredentialSource::BuildConfig {
        if let Err(e) = preferences.save_wifi_credentials(&credentials) {
            warn!("Wi-Fi 設定を NVS に保存できませんでした: {:?}", e);
        }
    }

    let mut wifi =
        NetworkManager::connect(peripherals.modem, &sysloop, &nvs_partition, &credentials)?;

    let console = CalibrationConsole::spawn(app_config.settings.clone())?;

    let pins = peripherals.pins;
    let adc = EspSensorAdc::new(peripherals.adc1, AdcPins::new(pins.gpio34, pins.gpio35))?;
    let reporter = HttpReporter::new(&app_config);
    info!(
        "送信先: {} / {}",
        app_config.readings_url(),
        app_config.power_url
    );

    AppController::run(
        &app_config,
        MonitorResources {
            adc,
            wifi: &mut wifi,
            reporter: &reporter,
            preferences: &mut preferences,
            console: &console,
        },
    )
}

/// ホスト環境ではハードウェアを扱えないため、設定の検証だけを行う
#[cfg(not(any(target_arch = "riscv32", target_arch = "xtensa")))]
fn main() -> anyhow::Result<()> {
    use energy_monitor::monitor_core::VOLTAGE_CALIBRATION;

    let app_config = energy_monitor::AppConfig::load()?;
    VOLTAGE_CALIBRATION.set_sensitivity(app_config.settings.voltage_sensor.initial_sensitivity);
    println!(
        "{}",
        app_config.settings.snapshot(&VOLTAGE_CALIBRATION).to_json_pretty()?
    );
    Ok(())
}
