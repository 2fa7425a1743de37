mod config;
mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mesh_dashboard_client::{
    loaders, AdapterType, Backend, EndpointTable, HttpExecutor, MeshApi, MockProvider,
    ServerAction,
};
use serde_json::json;
use std::path::PathBuf;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use config::Config;

#[derive(Parser, Debug)]
#[command(name = "meshctl")]
#[command(about = "Monitor and control a mesh of network nodes", long_about = None)]
struct Args {
    /// Orchestrator base URL
    #[arg(long, env = "MESH_API_URL", global = true)]
    base_url: Option<String>,

    /// Serve canned data instead of calling the orchestrator
    #[arg(
        long,
        env = "MESH_MOCK",
        global = true,
        value_parser = clap::builder::BoolishValueParser::new()
    )]
    mock: bool,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    /// Print the unwrapped payload as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all known nodes
    Nodes,
    /// Show one node
    Node { mac: String },
    /// Show mesh server status
    Status,
    /// Start or stop the mesh server
    Server {
        #[command(subcommand)]
        action: ServerCommand,
    },
    /// Set the adapter type of one node
    Configure {
        mac: String,
        #[arg(long, allow_negative_numbers = true)]
        adapter: i32,
    },
    /// Set the adapter type of every node
    ConfigureAll {
        #[arg(long, allow_negative_numbers = true)]
        adapter: i32,
    },
    /// Ask every node for a health report
    Health,
    /// Broadcast a payload to all nodes
    Broadcast {
        #[arg(long)]
        data_type: i32,
        #[arg(long)]
        data: String,
    },
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum ServerCommand {
    Start,
    Stop,
}

impl From<ServerCommand> for ServerAction {
    fn from(cmd: ServerCommand) -> Self {
        match cmd {
            ServerCommand::Start => ServerAction::Start,
            ServerCommand::Stop => ServerAction::Stop,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = args.config.clone().unwrap_or_else(config::default_config_path);
    debug!("Loading config from {:?}", config_path);
    let settings = Config::load(&config_path)?.resolve(args.base_url.clone(), args.mock);

    let backend = if settings.mock {
        Backend::Mock(MockProvider::new())
    } else {
        let endpoints = EndpointTable::new(&settings.base_url).context("Invalid base URL")?;
        Backend::Http(HttpExecutor::new(endpoints).context("Failed to create HTTP client")?)
    };
    info!("Using {}", backend);
    if backend.is_mock() {
        warn!("Serving canned data; nothing is sent to the orchestrator");
    }

    let output = run(&backend, &args.command, args.json).await?;
    print!("{}", output);
    Ok(())
}

async fn run(api: &dyn MeshApi, command: &Command, as_json: bool) -> Result<String> {
    let output = match command {
        Command::Nodes => {
            let nodes = loaders::load_nodes(api).await?;
            if as_json {
                render::json(&nodes)?
            } else {
                render::node_list(&nodes)
            }
        }
        Command::Node { mac } => {
            let node = loaders::load_node(api, mac).await?;
            if as_json {
                render::json(&node)?
            } else {
                render::node_detail(&node)
            }
        }
        Command::Status => {
            let status = loaders::load_status(api).await?;
            if as_json {
                render::json(&status)?
            } else {
                render::status(&status)
            }
        }
        Command::Server { action } => {
            let status = loaders::server_action(api, (*action).into()).await?;
            if as_json {
                render::json(&status)?
            } else {
                render::status(&status)
            }
        }
        Command::Configure { mac, adapter } => {
            let msg = loaders::configure_node(api, mac, AdapterType::from(*adapter)).await?;
            render_message(&msg, as_json)?
        }
        Command::ConfigureAll { adapter } => {
            let msg = loaders::configure_all(api, AdapterType::from(*adapter)).await?;
            render_message(&msg, as_json)?
        }
        Command::Health => {
            let msg = loaders::request_health(api).await?;
            render_message(&msg, as_json)?
        }
        Command::Broadcast { data_type, data } => {
            let msg = loaders::broadcast(api, *data_type, data.as_bytes().to_vec()).await?;
            render_message(&msg, as_json)?
        }
    };
    Ok(output)
}

fn render_message(msg: &str, as_json: bool) -> Result<String> {
    if as_json {
        render::json(&json!({ "message": msg }))
    } else {
        Ok(render::message(msg))
    }
}
