use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tabled::{Table, Tabled};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use truenas_entities::entities::{
    ActionRegistry, Payload, Resolver, SensorDescriptor, SensorRegistry,
};
use truenas_entities::{config::Config, server};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/Default.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List sensor descriptors
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List maintenance actions
    Actions,
    /// Validate the descriptor table and configuration
    Validate,
    /// Resolve a payload snapshot into entities
    Resolve {
        /// Payload JSON file
        #[arg(short, long)]
        payload: String,

        /// Appliance name (overrides config)
        #[arg(long, env = "TRUENAS_INSTANCE")]
        instance: Option<String>,
    },
    /// Serve descriptors and resolution over HTTP
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "ENTITIES_PORT")]
        port: Option<u16>,

        /// Address to bind to
        #[arg(short, long, env = "ENTITIES_ADDR")]
        addr: Option<String>,

        /// Payload snapshot published on /metrics (overrides config)
        #[arg(long, env = "ENTITIES_PAYLOAD")]
        payload: Option<String>,
    },
}

#[derive(Tabled)]
struct DescriptorRow {
    key: &'static str,
    name: &'static str,
    unit: String,
    device_class: String,
    data_path: String,
    data_attribute: &'static str,
    kind: String,
}

impl From<&SensorDescriptor> for DescriptorRow {
    fn from(d: &SensorDescriptor) -> Self {
        let or_dash = |s: Option<String>| s.unwrap_or_else(|| "-".to_string());
        Self {
            key: d.key,
            name: d.name,
            unit: or_dash(d.unit.map(|u| u.to_string())),
            device_class: or_dash(d.device_class.map(|c| c.to_string())),
            data_path: d.data_path.to_string(),
            data_attribute: d.data_attribute,
            kind: d.kind.to_string(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so command output stays parseable
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let mut config = Config::load(&args.config)?;
    let registry = SensorRegistry::builtin().context("Built-in descriptor table is invalid")?;
    let actions = ActionRegistry::builtin();

    match args.command {
        Command::List { json } => {
            if json {
                let descriptors: Vec<&SensorDescriptor> = registry.iter().collect();
                println!("{}", serde_json::to_string_pretty(&descriptors)?);
            } else {
                let rows: Vec<DescriptorRow> = registry.iter().map(DescriptorRow::from).collect();
                println!("{}", Table::new(rows));
            }
        }
        Command::Actions => {
            let actions: Vec<_> = actions.iter().collect();
            println!("{}", serde_json::to_string_pretty(&actions)?);
        }
        Command::Validate => {
            config.validate(registry)?;
            info!(
                "{} sensors and {} actions are valid",
                registry.len(),
                actions.len()
            );
        }
        Command::Resolve { payload, instance } => {
            if let Some(instance) = instance {
                config.entities.instance = instance;
            }
            config.validate(registry)?;

            let text = std::fs::read_to_string(&payload)
                .with_context(|| format!("Failed to read payload {}", payload))?;
            let payload = Payload::from_json(&text)?;
            let sensors = Resolver::new(registry, config.entities.instance.clone())
                .with_disabled(config.entities.disabled_sensors.iter().cloned())
                .resolve_all(&payload);
            println!("{}", serde_json::to_string_pretty(&sensors)?);
        }
        Command::Serve {
            port,
            addr,
            payload,
        } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(addr) = addr {
                config.server.addr = addr;
            }
            if payload.is_some() {
                config.entities.payload_path = payload;
            }

            info!(
                "Starting TrueNAS entity server v{}",
                env!("CARGO_PKG_VERSION")
            );
            info!("Instance: {}", config.entities.instance);

            if let Err(e) = server::start(config).await {
                error!("Server error: {}", e);
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
