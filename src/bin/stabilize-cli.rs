use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "stabilize-cli")]
#[command(about = "Management CLI for the stability proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8111")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or change the WebDriver server address
    Address {
        #[arg(long)]
        set: Option<String>,
    },
    /// Show or toggle stabilization
    Enabled {
        #[arg(long)]
        set: Option<bool>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let (name, update) = match cli.command {
        Commands::Address { set } => ("selenium_address", set.map(Value::from)),
        Commands::Enabled { set } => ("enabled", set.map(Value::from)),
    };
    let endpoint = format!("{base}/stabilize_proxy/{name}");

    let res = match update {
        Some(value) => client.post(&endpoint).json(&json!({ "value": value })).send().await?,
        None => client.get(&endpoint).send().await?,
    };
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: proxy returned status {}", status);
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    if text.is_empty() {
        println!("ok");
        return Ok(());
    }

    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
