use aip_skill::config::{AipConfig, DEFAULT_ENDPOINT};
use aip_skill::utils::validation::Validate;
use anyhow::Result;
use std::io::Write;
use tempfile::NamedTempFile;

/// 環境變數是行程全域的，整個流程放在同一個測試裡依序驗證：
/// 1. 缺 USER_WALLET_ADDRESS 是致命設定錯誤
/// 2. AIP_ENDPOINT 未設定時使用平台預設端點
/// 3. `.env` 檔會補上未設定的變數
/// 4. `.env` 檔不會覆寫已設定的變數
#[test]
fn test_env_file_populates_only_unset_variables() -> Result<()> {
    std::env::remove_var("USER_WALLET_ADDRESS");
    std::env::remove_var("AIP_ENDPOINT");
    std::env::remove_var("MEMBASE_ACCOUNT");
    std::env::remove_var("MEMBASE_SECRET_KEY");

    // 1. 沒有 .env、沒有環境變數：必須在任何網路互動前就失敗
    let err = AipConfig::from_env_file("/nonexistent/.env").unwrap_err();
    assert_eq!(err.to_string(), "Missing env: set USER_WALLET_ADDRESS");

    // 2. 只有 wallet 時端點落回預設值
    let mut wallet_only = NamedTempFile::new()?;
    writeln!(wallet_only, "USER_WALLET_ADDRESS=0xfromfile")?;

    let config = AipConfig::from_env_file(wallet_only.path())?;
    assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
    assert_eq!(config.user_wallet, "0xfromfile");
    assert_eq!(config.user_id(), "user:0xfromfile");
    assert!(config.validate().is_ok());

    // 3. .env 補上其他未設定的變數
    let mut env_file = NamedTempFile::new()?;
    writeln!(env_file, "USER_WALLET_ADDRESS=0xignored-already-set")?;
    writeln!(env_file, "AIP_ENDPOINT=http://env-file.example.com")?;
    writeln!(env_file, "MEMBASE_ACCOUNT=acct-from-file")?;

    let config = AipConfig::from_env_file(env_file.path())?;
    assert_eq!(config.endpoint, "http://env-file.example.com");
    assert_eq!(config.membase_account.as_deref(), Some("acct-from-file"));
    assert!(config.membase_secret_key.is_none());

    // 4. 步驟 2 已把 wallet 寫進行程環境，.env 裡的新值不得覆寫
    assert_eq!(config.user_wallet, "0xfromfile");

    std::env::remove_var("USER_WALLET_ADDRESS");
    std::env::remove_var("AIP_ENDPOINT");
    std::env::remove_var("MEMBASE_ACCOUNT");
    Ok(())
}
