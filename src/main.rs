// threeid demo binary - drives the connect/profile flow over stdin
// Wired to the mock collaborators; the library is what a real deployment
// would reuse with its own provider and network adapters.

use clap::Parser;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use threeid::app::App;
use threeid::identity::SessionConfig;
use threeid::network::MockIdentityNetwork;
use threeid::wallet::{MockWallet, ModalConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "threeid", about = "Wallet-to-3ID session demo")]
struct Cli {
    /// Target network for the wallet session
    #[arg(long, default_value = "goerli")]
    network: String,

    /// Bound on the session bootstrap call, in seconds
    #[arg(long, default_value_t = 30)]
    connect_timeout_secs: u64,

    /// Network the mock wallet starts on (set differently to exercise the
    /// network switch prompt)
    #[arg(long, default_value = "goerli")]
    wallet_network: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("threeid=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let provider = Arc::new(MockWallet::new(&cli.wallet_network));
    let network = Arc::new(MockIdentityNetwork::new());

    let mut app = App::new(
        provider,
        network,
        ModalConfig::new().with_network(&cli.network),
        SessionConfig::new()
            .with_connect_timeout(Duration::from_secs(cli.connect_timeout_secs)),
    );

    println!("threeid demo - type 'help' for commands");
    print_status(&app);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let mut parts = line.split_whitespace();

        match parts.next() {
            Some("connect") => match app.connect().await {
                Ok(id) => println!("connected: {}", id),
                Err(e) => println!("connect failed: {}", e),
            },
            Some("disconnect") => match app.disconnect() {
                Ok(()) => println!("disconnected"),
                Err(e) => println!("disconnect failed: {}", e),
            },
            Some("status") => print_status(&app),
            Some("profile") => println!("{}", app.profile_line()),
            Some("set-name") => {
                let name = parts.collect::<Vec<_>>().join(" ");
                if name.is_empty() {
                    println!("usage: set-name <name>");
                    continue;
                }
                match app.set_profile_name(&name).await {
                    Ok(()) => println!("{}", app.profile_line()),
                    Err(e) => println!("update failed: {}", e),
                }
            }
            Some("help") => {
                println!("commands: connect, disconnect, status, profile, set-name <name>, quit");
            }
            Some("quit") | Some("exit") => break,
            Some(other) => println!("unknown command: {}", other),
            None => {}
        }
    }

    Ok(())
}

fn print_status(app: &App) {
    println!("{}", app.status_line());
    if app.status().is_connected() {
        println!("{}", app.profile_line());
    }
}
