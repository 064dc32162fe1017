use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Send search and generate requests to a running relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000", env = "RELAY_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a search query
    Search {
        /// Query text
        query: String,
    },
    /// Send a generate request
    Generate {
        /// Read the JSON body from a file
        #[arg(short, long, conflicts_with = "json")]
        file: Option<PathBuf>,

        /// Inline JSON body
        #[arg(short, long)]
        json: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Search { query } => {
            let res = client
                .post(format!("{}/search", base))
                .json(&json!({ "query": query }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Generate { file, json } => {
            let raw = match (file, json) {
                (Some(path), _) => std::fs::read_to_string(path)?,
                (None, Some(inline)) => inline,
                (None, None) => "{}".to_string(),
            };
            let body: Value = serde_json::from_str(&raw)?;
            let res = client
                .post(format!("{}/generate", base))
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: relay returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
