use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use buspeek::RemoteObject;

#[derive(Parser)]
#[command(name = "buspeek")]
#[command(author, version, about = "Inspect D-Bus objects: properties, methods, children", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Talk to the session bus instead of the system bus
    #[arg(long, global = true)]
    session: bool,

    /// Bus name of the remote service (e.g. "org.freedesktop.login1")
    #[arg(short, long)]
    dest: String,

    /// Object path on the service
    #[arg(short, long, default_value = "/")]
    path: String,

    /// Interface to read properties from and call methods on
    #[arg(short, long)]
    interface: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read all properties of the interface
    Props,

    /// Read a single property
    Get {
        /// Property name
        name: String,
    },

    /// Invoke a method
    Call {
        /// Method name
        method: String,

        /// Arguments, each parsed as a JSON scalar (bare words become strings)
        args: Vec<String>,
    },

    /// List the immediate child objects below the path
    Children,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("buspeek=debug,zbus=info")
    } else {
        EnvFilter::new("buspeek=info,zbus=warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Arguments are JSON scalars; anything that doesn't parse is a bare string.
fn parse_arg(arg: &str) -> serde_json::Value {
    serde_json::from_str(arg).unwrap_or_else(|_| serde_json::Value::String(arg.to_string()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let remote = if cli.session {
        RemoteObject::session(&cli.dest, &cli.path, &cli.interface).await?
    } else {
        RemoteObject::system(&cli.dest, &cli.path, &cli.interface).await?
    };

    match cli.command {
        Commands::Props => {
            let props = remote.props().await?;
            println!("{}", serde_json::to_string_pretty(&props)?);
        }

        Commands::Get { name } => {
            let value = remote.prop(&name).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }

        Commands::Call { method, args } => {
            let args: Vec<serde_json::Value> = args.iter().map(|a| parse_arg(a)).collect();
            let reply = remote.call_json(&method, &args).await?;
            println!("{}", serde_json::to_string_pretty(&reply)?);
        }

        Commands::Children => {
            for name in remote.children().await? {
                println!("{name}");
            }
        }
    }

    Ok(())
}
