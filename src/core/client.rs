use crate::config::AipConfig;
use crate::domain::model::{AgentRecord, Page, PriceRecord, RunEvent, RunResult, UserRecord};
use crate::utils::error::{AipError, Result};
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::mpsc;

const MEMBASE_ACCOUNT_HEADER: &str = "X-Membase-Account";
const MEMBASE_SECRET_HEADER: &str = "X-Membase-Secret-Key";

/// 串流事件的緩衝區大小；接收端中斷後發送端自然結束
const STREAM_CHANNEL_CAPACITY: usize = 64;

/// AIP 平台的非同步 HTTP 客戶端，一次執行建立一個
pub struct AipClient {
    client: Client,
    base_url: String,
    user_id: String,
    wallet: String,
}

impl AipClient {
    pub fn new(config: &AipConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();

        // Membase 憑證存在時掛在每個請求上
        if let Some(account) = &config.membase_account {
            headers.insert(MEMBASE_ACCOUNT_HEADER, header_value("MEMBASE_ACCOUNT", account)?);
        }
        if let Some(secret) = &config.membase_secret_key {
            headers.insert(MEMBASE_SECRET_HEADER, header_value("MEMBASE_SECRET_KEY", secret)?);
        }

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            user_id: config.user_id(),
            wallet: config.user_wallet.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 非 2xx 回應轉成帶狀態碼的平台錯誤
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        Err(AipError::PlatformError {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        tracing::debug!("GET {}", path);
        let response = self.client.get(self.url(path)).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn get_paged<T: DeserializeOwned>(
        &self,
        path: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Page<T>> {
        tracing::debug!("GET {} (limit={}, offset={})", path, limit, offset);
        let response = self
            .client
            .get(self.url(path))
            .query(&[("limit", limit.to_string()), ("offset", offset.to_string())])
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn health_check(&self) -> Result<bool> {
        let response = self.client.get(self.url("/health")).send().await?;
        Ok(response.status().is_success())
    }

    /// 執行一個 objective；`agent` 為 None 時由平台自動路由
    pub async fn run(
        &self,
        objective: &str,
        agent: Option<&str>,
        timeout: Duration,
    ) -> Result<RunResult> {
        let mut body = json!({
            "objective": objective,
            "user_id": self.user_id,
            "timeout": timeout.as_secs_f64(),
        });
        if let Some(agent) = agent {
            body["agent"] = json!(agent);
        }

        tracing::debug!("POST /api/v1/runs (agent={:?})", agent);
        let response = self
            .client
            .post(self.url("/api/v1/runs"))
            .timeout(timeout)
            .json(&body)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// 以 SSE 串流執行；事件經由 channel 交付，接收端可在完成事件後直接停止
    pub async fn run_stream(
        &self,
        objective: &str,
        agent: Option<&str>,
    ) -> Result<mpsc::Receiver<Result<RunEvent>>> {
        let mut body = json!({
            "objective": objective,
            "user_id": self.user_id,
        });
        if let Some(agent) = agent {
            body["agent"] = json!(agent);
        }

        tracing::debug!("POST /api/v1/runs/stream (agent={:?})", agent);
        let response = self
            .client
            .post(self.url("/api/v1/runs/stream"))
            .header(ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await?;
        let response = Self::check(response).await?;

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk) = stream.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        let _ = tx.send(Err(AipError::ApiError(e))).await;
                        return;
                    }
                };
                buffer.push_str(&String::from_utf8_lossy(&chunk));

                // 逐行取出完整的 SSE 行，殘餘部分留在緩衝區
                while let Some(pos) = buffer.find('\n') {
                    let line = buffer[..pos].trim_end_matches('\r').to_string();
                    buffer.drain(..=pos);
                    if let Some(event) = parse_sse_data(&line) {
                        if tx.send(Ok(event)).await.is_err() {
                            // 接收端已停止（例如看到完成事件）
                            return;
                        }
                    }
                }
            }

            // 沒有結尾換行的最後一行也要交付
            if let Some(event) = parse_sse_data(buffer.trim_end_matches('\r')) {
                let _ = tx.send(Ok(event)).await;
            }
        });

        Ok(rx)
    }

    pub async fn list_user_agents(&self, limit: u64, offset: u64) -> Result<Page<AgentRecord>> {
        self.get_paged(&format!("/api/v1/users/{}/agents", self.user_id), limit, offset)
            .await
    }

    /// 回傳 None 表示平台不認得這個 agent
    pub async fn get_agent(&self, agent_id: &str) -> Result<Option<AgentRecord>> {
        let path = format!("/api/v1/users/{}/agents/{}", self.user_id, agent_id);
        tracing::debug!("GET {}", path);
        let response = self.client.get(self.url(&path)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::check(response).await?.json().await?))
    }

    pub async fn list_user_runs(&self, limit: u64, offset: u64) -> Result<Page<Value>> {
        self.get_paged(&format!("/api/v1/users/{}/runs", self.user_id), limit, offset)
            .await
    }

    pub async fn get_run_events(&self, run_id: &str) -> Result<Value> {
        self.get_json(&format!("/api/v1/runs/{}/events", run_id)).await
    }

    pub async fn get_run_payments(&self, run_id: &str) -> Result<Value> {
        self.get_json(&format!("/api/v1/runs/{}/payments", run_id)).await
    }

    pub async fn get_agent_price(&self, agent_id: &str) -> Result<PriceRecord> {
        self.get_json(&format!(
            "/api/v1/users/{}/agents/{}/price",
            self.user_id, agent_id
        ))
        .await
    }

    pub async fn list_agent_prices(&self, limit: u64, offset: u64) -> Result<Page<PriceRecord>> {
        self.get_paged("/api/v1/prices", limit, offset).await
    }

    pub async fn register_agent(&self, agent_config: &Value) -> Result<Value> {
        let path = format!("/api/v1/users/{}/agents", self.user_id);
        tracing::debug!("POST {}", path);
        let response = self
            .client
            .post(self.url(&path))
            .json(agent_config)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn unregister_agent(&self, agent_id: &str) -> Result<Value> {
        let path = format!("/api/v1/users/{}/agents/{}", self.user_id, agent_id);
        tracing::debug!("DELETE {}", path);
        let response = self.client.delete(self.url(&path)).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn register_user(&self, email: Option<&str>) -> Result<Value> {
        let mut body = json!({ "wallet_address": self.wallet });
        if let Some(email) = email {
            body["email"] = json!(email);
        }

        tracing::debug!("POST /api/v1/users");
        let response = self
            .client
            .post(self.url("/api/v1/users"))
            .json(&body)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn list_users(&self, limit: u64, offset: u64) -> Result<Page<UserRecord>> {
        self.get_paged("/api/v1/users", limit, offset).await
    }
}

fn header_value(field: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value).map_err(|e| AipError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: format!("Invalid header value: {}", e),
    })
}

/// 解析一行 SSE；只關心 `data:` 行，其他（`event:`、註解、空行）一律略過
pub fn parse_sse_data(line: &str) -> Option<RunEvent> {
    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    serde_json::from_str(data).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sse_data_line() {
        let event =
            parse_sse_data(r#"data: {"event_type":"step_started","payload":{"step":1}}"#).unwrap();
        assert_eq!(event.event_type, "step_started");
        assert_eq!(event.payload["step"], 1);
    }

    #[test]
    fn test_parse_sse_ignores_non_data_lines() {
        assert!(parse_sse_data("event: run_started").is_none());
        assert!(parse_sse_data(": keep-alive").is_none());
        assert!(parse_sse_data("").is_none());
    }

    #[test]
    fn test_parse_sse_ignores_done_sentinel_and_malformed_json() {
        assert!(parse_sse_data("data: [DONE]").is_none());
        assert!(parse_sse_data("data: {not json").is_none());
        assert!(parse_sse_data("data:").is_none());
    }

    #[test]
    fn test_parse_sse_without_space_after_colon() {
        let event = parse_sse_data(r#"data:{"event_type":"run_completed"}"#).unwrap();
        assert!(event.is_terminal());
    }
}
