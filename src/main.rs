use clap::{Parser, ValueEnum};
use falcon_mcp::constants::{env, network};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Transport {
    Stdio,
    Http,
}

/// MCP server exposing the CrowdStrike Falcon API as tools.
#[derive(Debug, Parser)]
#[command(name = "falcon-mcp", version, about)]
struct Cli {
    /// Transport to serve MCP on.
    #[arg(long, value_enum, default_value_t = Transport::Stdio)]
    transport: Transport,

    /// Listen address for the HTTP transport.
    #[arg(long, env = env::HTTP_ADDR, default_value = network::HTTP_DEFAULT_ADDR)]
    listen: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let outcome = match cli.transport {
        Transport::Stdio => falcon_mcp::mcp::server::run_stdio().await,
        Transport::Http => falcon_mcp::mcp::http::run_http(&cli.listen).await,
    };
    if let Err(err) = outcome {
        eprintln!("falcon-mcp: {}", err);
        std::process::exit(1);
    }
}
