use aip_skill::utils::validation::Validate;
use aip_skill::utils::{logger, output};
use aip_skill::{tools, AipConfig, AipError};
use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "aip-skill")]
#[command(about = "CLI adapter for the Unibase AIP agent-orchestration platform")]
struct Cli {
    /// Tool name (call_agent, stream_agent, auto_route, ...)
    tool: Option<String>,

    /// Positional arguments for the tool
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,

    #[arg(long, help = "Enable verbose output")]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logger::init_cli_logger(cli.verbose);
    if cli.verbose {
        tracing::debug!("CLI invocation: {:?}", cli);
    }

    match run_cli(&cli).await {
        Ok(value) => {
            if let Err(e) = output::print_json(&value) {
                cli_err(&e.to_string());
            }
        }
        Err(e) => {
            tracing::error!("❌ Tool failed: {}", e);
            cli_err(&e.to_string());
        }
    }
}

async fn run_cli(cli: &Cli) -> aip_skill::Result<serde_json::Value> {
    let tool = cli.tool.as_deref().ok_or_else(|| AipError::UsageError {
        usage: tools::usage_summary(),
    })?;

    // 參數與設定都在任何網路互動前驗證
    tools::validate_invocation(tool, &cli.args)?;
    let config = AipConfig::from_env()?;
    config.validate()?;

    tracing::info!("Running tool: {}", tool);
    tools::dispatch(&config, tool, &cli.args).await
}

fn cli_err(message: &str) -> ! {
    // 錯誤也要遵守「stdout 只有一個 JSON 值」的約定
    println!("{}", output::error_body(message));
    std::process::exit(1);
}
