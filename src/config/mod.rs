use crate::utils::error::{AipError, Result};
use crate::utils::validation::{validate_non_empty, validate_url, Validate};
use std::path::Path;

pub const DEFAULT_ENDPOINT: &str = "http://api.aip.unibase.com";

#[derive(Debug, Clone)]
pub struct AipConfig {
    pub endpoint: String,
    pub user_wallet: String,
    pub membase_account: Option<String>,
    pub membase_secret_key: Option<String>,
}

impl AipConfig {
    /// 從環境變數載入設定；`.env` 只補「尚未設定」的變數
    pub fn from_env() -> Result<Self> {
        // dotenvy 不會覆寫已存在的環境變數
        let _ = dotenvy::dotenv();
        Self::from_current_env()
    }

    /// 同 `from_env`，但從指定的 key-value 檔載入
    pub fn from_env_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let _ = dotenvy::from_path(path);
        Self::from_current_env()
    }

    fn from_current_env() -> Result<Self> {
        let endpoint =
            std::env::var("AIP_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());

        let user_wallet =
            std::env::var("USER_WALLET_ADDRESS").map_err(|_| AipError::MissingConfigError {
                field: "USER_WALLET_ADDRESS".to_string(),
            })?;

        Ok(Self {
            endpoint,
            user_wallet,
            membase_account: std::env::var("MEMBASE_ACCOUNT").ok(),
            membase_secret_key: std::env::var("MEMBASE_SECRET_KEY").ok(),
        })
    }

    /// 平台端使用的使用者識別
    pub fn user_id(&self) -> String {
        format!("user:{}", self.user_wallet)
    }
}

impl Validate for AipConfig {
    fn validate(&self) -> Result<()> {
        validate_url("AIP_ENDPOINT", &self.endpoint)?;
        validate_non_empty("USER_WALLET_ADDRESS", &self.user_wallet)?;
        Ok(())
    }
}
