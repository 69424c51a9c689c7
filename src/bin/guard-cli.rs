use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

use consent_guard::security::credentials::hash_password;

#[derive(Parser)]
#[command(name = "guard-cli")]
#[command(about = "Management CLI for consent-guard", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, env = "CONSENT_GUARD_ADMIN_KEY", default_value = "CHANGE_ME_IN_PRODUCTION")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service status
    Status,
    /// List active sign-in lockouts
    Lockouts,
    /// Clear the lockout for an email and client address
    Unlock { email: String, ip: String },
    /// List DSARs with their deadline state
    Dsar,
    /// Show DSAR counts and overdue totals
    DsarSummary,
    /// Move a DSAR to a new status (pending, in_progress, completed, rejected)
    SetStatus { id: String, status: String },
    /// Print the Argon2 password hash for an `[[accounts]]` config entry
    Hash { password: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::Hash { password } = &cli.command {
        let hash = hash_password(password).map_err(|e| format!("hashing failed: {e}"))?;
        println!("{hash}");
        return Ok(());
    }

    let client = reqwest::Client::new();
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let request = match cli.command {
        Commands::Status => client.get(format!("{}/admin/status", cli.url)),
        Commands::Lockouts => client.get(format!("{}/admin/lockouts", cli.url)),
        Commands::Unlock { email, ip } => client
            .post(format!("{}/admin/lockouts/unlock", cli.url))
            .json(&json!({ "email": email, "ip": ip })),
        Commands::Dsar => client.get(format!("{}/admin/dsar", cli.url)),
        Commands::DsarSummary => client.get(format!("{}/admin/dsar/summary", cli.url)),
        Commands::SetStatus { id, status } => client
            .patch(format!("{}/admin/dsar/{}", cli.url, id))
            .json(&json!({ "status": status })),
        Commands::Hash { .. } => unreachable!("handled above"),
    };

    let res = request.headers(headers).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
