fn main() {
    println!("cargo:rerun-if-changed=cfg.toml");

    // ESP-IDF の環境変数はターゲットビルド時のみ出力する
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}
