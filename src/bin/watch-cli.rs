use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Method, RequestBuilder};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "watch-cli")]
#[command(about = "Management CLI for endpoint-watch", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:7878", env = "ENDPOINT_WATCH_URL")]
    url: String,

    #[arg(short, long, default_value = "CHANGE_ME", env = "ENDPOINT_WATCH_KEY")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show daemon status
    Status,
    /// List connections in display order
    List,
    /// Show cached health, for one connection or all
    Health { id: Option<String> },
    /// Probe now, one connection or all
    Check { id: Option<String> },
    /// Add a website connection
    AddWebsite {
        name: String,
        url: String,
        #[arg(long)]
        check_path: Option<String>,
    },
    /// Add an SSH connection
    AddSsh {
        name: String,
        host: String,
        #[arg(short, long, default_value_t = 22)]
        port: u16,
        #[arg(short = 'U', long, default_value = "root")]
        username: String,
        /// MAC address; enables Wake-on-LAN
        #[arg(long)]
        mac: Option<String>,
        #[arg(long)]
        broadcast: Option<String>,
    },
    /// Delete a connection
    Delete { id: String },
    /// Set the display order (complete list of ids)
    Reorder {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Send a Wake-on-LAN packet
    Wake { id: String },
    /// Look up a host's MAC address in the daemon's ARP table
    Mac { host: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", cli.key))?);

    let base = cli.url.trim_end_matches('/');
    let request = |method: Method, path: String| -> RequestBuilder {
        client
            .request(method, format!("{}{}", base, path))
            .headers(headers.clone())
    };

    let builder = match cli.command {
        Commands::Status => request(Method::GET, "/api/status".into()),
        Commands::List => request(Method::GET, "/api/connections".into()),
        Commands::Health { id: Some(id) } => request(Method::GET, format!("/api/health/{}", id)),
        Commands::Health { id: None } => request(Method::GET, "/api/health".into()),
        Commands::Check { id: Some(id) } => request(Method::POST, format!("/api/health/{}/check", id)),
        Commands::Check { id: None } => request(Method::POST, "/api/health/check".into()),
        Commands::AddWebsite { name, url, check_path } => request(Method::POST, "/api/connections".into()).json(&json!({
            "name": name,
            "config": { "type": "website", "url": url, "checkPath": check_path },
        })),
        Commands::AddSsh { name, host, port, username, mac, broadcast } => {
            request(Method::POST, "/api/connections".into()).json(&json!({
                "name": name,
                "config": {
                    "type": "ssh",
                    "host": host,
                    "port": port,
                    "username": username,
                    "wolEnabled": mac.is_some(),
                    "macAddress": mac,
                    "broadcastAddr": broadcast,
                },
            }))
        }
        Commands::Delete { id } => request(Method::DELETE, format!("/api/connections/{}", id)),
        Commands::Reorder { ids } => request(Method::POST, "/api/connections/reorder".into()).json(&json!({ "ids": ids })),
        Commands::Wake { id } => request(Method::POST, format!("/api/connections/{}/wake", id)),
        Commands::Mac { host } => request(Method::GET, format!("/api/mac/{}", host)),
    };

    print_response(builder.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    if text.is_empty() {
        println!("{}", status);
        return Ok(());
    }

    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
