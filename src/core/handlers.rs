use crate::config::AipConfig;
use crate::core::client::AipClient;
use crate::utils::error::{AipError, Result};
use serde_json::{json, Value};
use std::time::Duration;

/// 單次執行的平台端逾時
const RUN_TIMEOUT: Duration = Duration::from_secs(60);

const DISCOVERY_UNAVAILABLE_NOTE: &str = "Agent discovery endpoint not available. \
    Use call_agent with known handles like 'weather_public' or 'calculator_private'.";

pub async fn call_agent(config: &AipConfig, agent_handle: &str, objective: &str) -> Result<Value> {
    let client = AipClient::new(config)?;
    let result = client.run(objective, Some(agent_handle), RUN_TIMEOUT).await?;

    Ok(json!({
        "success": result.success,
        "status": result.status,
        "output": result.output,
        "agent": agent_handle,
        "objective": objective,
    }))
}

pub async fn stream_agent(config: &AipConfig, agent_handle: &str, objective: &str) -> Result<Value> {
    let client = AipClient::new(config)?;
    let mut receiver = client.run_stream(objective, Some(agent_handle)).await?;

    let mut events = Vec::new();
    while let Some(event) = receiver.recv().await {
        let event = event?;
        let terminal = event.is_terminal();
        events.push(json!({
            "event_type": event.event_type,
            "payload": event.payload,
        }));
        // 完成或錯誤事件後不再讀取
        if terminal {
            break;
        }
    }

    Ok(Value::Array(events))
}

pub async fn auto_route(config: &AipConfig, objective: &str) -> Result<Value> {
    let client = AipClient::new(config)?;
    let result = client.run(objective, None, RUN_TIMEOUT).await?;

    Ok(json!({
        "success": result.success,
        "status": result.status,
        "output": result.output,
        "objective": objective,
        "routed": true,
    }))
}

pub async fn health_check(config: &AipConfig) -> Result<Value> {
    let client = AipClient::new(config)?;
    let healthy = client.health_check().await?;

    Ok(json!({
        "healthy": healthy,
        "endpoint": config.endpoint,
    }))
}

pub async fn list_agents(config: &AipConfig, limit: u64, offset: u64) -> Result<Value> {
    let client = AipClient::new(config)?;

    match client.list_user_agents(limit, offset).await {
        Ok(page) => {
            let agents: Vec<Value> = page
                .items
                .iter()
                .map(|agent| {
                    json!({
                        "agent_id": agent.agent_id,
                        "handle": agent.handle,
                        "name": agent.name,
                        "description": agent.description,
                        "price": agent.price,
                        "capabilities": agent.capabilities,
                        "on_chain": agent.on_chain,
                        "identity_address": agent.identity_address,
                    })
                })
                .collect();

            Ok(json!({
                "agents": agents,
                "total": page.total,
                "limit": page.limit,
                "offset": page.offset,
            }))
        }
        // 發現端點尚未開放時退回空結果
        Err(AipError::PlatformError { status: 502 | 404, .. }) => Ok(json!({
            "agents": [],
            "total": 0,
            "limit": limit,
            "offset": offset,
            "note": DISCOVERY_UNAVAILABLE_NOTE,
        })),
        Err(e) => Err(e),
    }
}

pub async fn get_agent_info(config: &AipConfig, agent_id: &str) -> Result<Value> {
    let client = AipClient::new(config)?;
    let agent = client
        .get_agent(agent_id)
        .await?
        .ok_or_else(|| AipError::ProcessingError {
            message: format!("Agent not found: {}", agent_id),
        })?;

    Ok(json!({
        "agent_id": agent.agent_id,
        "handle": agent.handle,
        "name": agent.name,
        "description": agent.description,
        "price": agent.price,
        "capabilities": agent.capabilities,
        "skills": agent.skills,
        "metadata": agent.metadata,
        "endpoint_url": agent.endpoint_url,
        "on_chain": agent.on_chain,
        "identity_address": agent.identity_address,
    }))
}

pub async fn list_runs(config: &AipConfig, limit: u64, offset: u64) -> Result<Value> {
    let client = AipClient::new(config)?;
    let page = client.list_user_runs(limit, offset).await?;

    Ok(json!({
        "runs": page.items,
        "total": page.total,
        "limit": page.limit,
        "offset": page.offset,
    }))
}

pub async fn get_run_details(config: &AipConfig, run_id: &str) -> Result<Value> {
    let client = AipClient::new(config)?;
    let events = client.get_run_events(run_id).await?;
    let payments = client.get_run_payments(run_id).await?;

    Ok(json!({
        "run_id": run_id,
        "events": events,
        "payments": payments,
    }))
}

pub async fn get_agent_price(config: &AipConfig, agent_id: &str) -> Result<Value> {
    let client = AipClient::new(config)?;
    let price = client.get_agent_price(agent_id).await?;

    Ok(json!({
        "agent_id": price.identifier,
        "amount": price.amount,
        "currency": price.currency,
        "metadata": price.metadata,
    }))
}

pub async fn list_agent_prices(config: &AipConfig, limit: u64, offset: u64) -> Result<Value> {
    let client = AipClient::new(config)?;
    let page = client.list_agent_prices(limit, offset).await?;

    let prices: Vec<Value> = page
        .items
        .iter()
        .map(|price| {
            json!({
                "agent_id": price.identifier,
                "amount": price.amount,
                "currency": price.currency,
                "metadata": price.metadata,
            })
        })
        .collect();

    Ok(json!({
        "prices": prices,
        "total": page.total,
        "limit": page.limit,
        "offset": page.offset,
    }))
}

pub async fn register_agent(config: &AipConfig, agent_config_json: &str) -> Result<Value> {
    // 先驗證參數是合法 JSON，再碰網路
    let agent_config: Value =
        serde_json::from_str(agent_config_json).map_err(|e| AipError::InvalidPayloadError {
            reason: e.to_string(),
        })?;

    let client = AipClient::new(config)?;
    client.register_agent(&agent_config).await
}

pub async fn unregister_agent(config: &AipConfig, agent_id: &str) -> Result<Value> {
    let client = AipClient::new(config)?;
    client.unregister_agent(agent_id).await
}

pub async fn register_user(config: &AipConfig, email: Option<&str>) -> Result<Value> {
    let client = AipClient::new(config)?;
    client.register_user(email).await
}

pub async fn list_users(config: &AipConfig, limit: u64, offset: u64) -> Result<Value> {
    let client = AipClient::new(config)?;
    let page = client.list_users(limit, offset).await?;

    let users: Vec<Value> = page
        .items
        .iter()
        .map(|user| {
            json!({
                "user_id": user.user_id,
                "wallet_address": user.wallet_address,
                "email": user.email,
                "created_at": user.created_at,
            })
        })
        .collect();

    Ok(json!({
        "users": users,
        "total": page.total,
        "limit": page.limit,
        "offset": page.offset,
    }))
}
