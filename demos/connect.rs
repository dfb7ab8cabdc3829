//! Connect to a MySQL server and print the client status.
//!
//! cargo run --example connect -- --host 127.0.0.1:3306 --user root --password root --database test

use clap::Parser;
use mysql_middleware::prelude::*;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(about = "Connect to MySQL and report client status")]
struct Args {
    #[arg(long, default_value = "127.0.0.1:3306")]
    host: String,
    #[arg(long, default_value = "root")]
    user: String,
    #[arg(long, default_value = "")]
    password: String,
    #[arg(long, default_value = "test")]
    database: String,
    #[arg(long, default_value = "10s")]
    timeout: String,
    /// Optional query to run once connected
    #[arg(long)]
    query: Option<String>,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(Level::DEBUG)
        .init();

    let mut client = Client::connect(
        &args.host,
        &args.user,
        &args.password,
        &args.database,
        &args.timeout,
    )
    .await;

    if let Err(err) = client.ping().await {
        eprintln!("{err}");
    }

    if let (Some(query), true) = (&args.query, client.is_healthy()) {
        match client.get_result(query, &[]).await {
            Ok(rows) => println!(
                "{}",
                serde_json::to_string_pretty(&rows).unwrap_or_else(|_| "[]".to_string())
            ),
            Err(err) => eprintln!("query failed: {err}"),
        }
    }

    let status = serde_json::to_string_pretty(&client.status()).unwrap_or_else(|_| "{}".to_string());
    println!("{status}");
}
