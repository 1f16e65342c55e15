use crate::config::AipConfig;
use crate::core::handlers;
use crate::utils::error::{AipError, Result};
use serde_json::Value;

const DEFAULT_LIMIT: u64 = 100;
const DEFAULT_OFFSET: u64 = 0;

/// 一個 CLI 工具：名稱、最少參數數、使用說明
#[derive(Debug)]
pub struct ToolSpec {
    pub name: &'static str,
    pub min_args: usize,
    pub usage: &'static str,
}

pub const TOOLS: &[ToolSpec] = &[
    ToolSpec {
        name: "call_agent",
        min_args: 2,
        usage: "call_agent \"<agent_handle>\" \"<objective>\"",
    },
    ToolSpec {
        name: "stream_agent",
        min_args: 2,
        usage: "stream_agent \"<agent_handle>\" \"<objective>\"",
    },
    ToolSpec {
        name: "auto_route",
        min_args: 1,
        usage: "auto_route \"<objective>\"",
    },
    ToolSpec {
        name: "health_check",
        min_args: 0,
        usage: "health_check",
    },
    ToolSpec {
        name: "list_agents",
        min_args: 0,
        usage: "list_agents [limit] [offset]",
    },
    ToolSpec {
        name: "get_agent_info",
        min_args: 1,
        usage: "get_agent_info \"<agent_id>\"",
    },
    ToolSpec {
        name: "list_runs",
        min_args: 0,
        usage: "list_runs [limit] [offset]",
    },
    ToolSpec {
        name: "get_run_details",
        min_args: 1,
        usage: "get_run_details \"<run_id>\"",
    },
    ToolSpec {
        name: "get_agent_price",
        min_args: 1,
        usage: "get_agent_price \"<agent_id>\"",
    },
    ToolSpec {
        name: "list_agent_prices",
        min_args: 0,
        usage: "list_agent_prices [limit] [offset]",
    },
    ToolSpec {
        name: "register_agent",
        min_args: 1,
        usage: "register_agent \"<agent_config_json>\"",
    },
    ToolSpec {
        name: "unregister_agent",
        min_args: 1,
        usage: "unregister_agent \"<agent_id>\"",
    },
    ToolSpec {
        name: "register_user",
        min_args: 0,
        usage: "register_user [email]",
    },
    ToolSpec {
        name: "list_users",
        min_args: 0,
        usage: "list_users [limit] [offset]",
    },
];

/// 所有工具使用說明的彙總，用於頂層 usage 錯誤
pub fn usage_summary() -> String {
    TOOLS
        .iter()
        .map(|tool| tool.usage)
        .collect::<Vec<_>>()
        .join(" | ")
}

pub fn find_tool(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|tool| tool.name == name)
}

/// 驗證工具名稱與最少參數數；任何網路互動前都要先通過
pub fn validate_invocation(tool: &str, args: &[String]) -> Result<&'static ToolSpec> {
    let spec = find_tool(tool).ok_or_else(|| AipError::UnknownToolError {
        name: tool.to_string(),
        usage: usage_summary(),
    })?;

    if args.len() < spec.min_args {
        return Err(AipError::UsageError {
            usage: spec.usage.to_string(),
        });
    }

    Ok(spec)
}

pub async fn dispatch(config: &AipConfig, tool: &str, args: &[String]) -> Result<Value> {
    let spec = validate_invocation(tool, args)?;

    match spec.name {
        "call_agent" => handlers::call_agent(config, &args[0], &args[1]).await,
        "stream_agent" => handlers::stream_agent(config, &args[0], &args[1]).await,
        "auto_route" => handlers::auto_route(config, &args[0]).await,
        "health_check" => handlers::health_check(config).await,
        "list_agents" => {
            let (limit, offset) = paging_args(args)?;
            handlers::list_agents(config, limit, offset).await
        }
        "get_agent_info" => handlers::get_agent_info(config, &args[0]).await,
        "list_runs" => {
            let (limit, offset) = paging_args(args)?;
            handlers::list_runs(config, limit, offset).await
        }
        "get_run_details" => handlers::get_run_details(config, &args[0]).await,
        "get_agent_price" => handlers::get_agent_price(config, &args[0]).await,
        "list_agent_prices" => {
            let (limit, offset) = paging_args(args)?;
            handlers::list_agent_prices(config, limit, offset).await
        }
        "register_agent" => handlers::register_agent(config, &args[0]).await,
        "unregister_agent" => handlers::unregister_agent(config, &args[0]).await,
        "register_user" => {
            handlers::register_user(config, args.first().map(String::as_str)).await
        }
        "list_users" => {
            let (limit, offset) = paging_args(args)?;
            handlers::list_users(config, limit, offset).await
        }
        // TOOLS 表之外的名稱在 validate_invocation 就被擋下了
        _ => unreachable!("tool present in TOOLS but not dispatched: {}", spec.name),
    }
}

/// 選填的 `[limit] [offset]` 參數；缺省為 100 / 0
fn paging_args(args: &[String]) -> Result<(u64, u64)> {
    let limit = parse_count_arg(args, 0, "limit", DEFAULT_LIMIT)?;
    let offset = parse_count_arg(args, 1, "offset", DEFAULT_OFFSET)?;
    Ok((limit, offset))
}

fn parse_count_arg(args: &[String], index: usize, field: &str, default: u64) -> Result<u64> {
    match args.get(index) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| AipError::InvalidArgumentError {
            field: field.to_string(),
            value: raw.clone(),
        }),
    }
}
