//! Ledgerload CLI - Import CSV transactions into a remote ledger service
//!
//! # Main Commands
//!
//! ```bash
//! ledgerload serve                                  # Start HTTP server (port 3000)
//! ledgerload import txs.csv --mapping mapping.json  # Run an import
//! ledgerload test-connection                        # Check service credentials
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! ledgerload parse txs.csv          # Just parse CSV to JSON rows
//! ```

use clap::{Parser, Subcommand};
use ledgerload::{
    parse_csv_file_auto, ColumnMapping, HttpLedgerClient, ImportConfig, Importer,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ledgerload")]
#[command(about = "Import CSV transactions into a remote ledger service", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CSV file and output its rows as JSON
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Import a CSV file into the ledger service
    Import {
        /// Input CSV file
        input: PathBuf,

        /// Column mapping JSON file
        #[arg(short, long)]
        mapping: PathBuf,

        /// Override the configured default currency
        #[arg(short, long)]
        currency: Option<String>,
    },

    /// Start the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Verify the ledger service is reachable with the configured token
    TestConnection,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse { input, output } => cmd_parse(&input, output.as_deref()),

        Commands::Import {
            input,
            mapping,
            currency,
        } => cmd_import(&input, &mapping, currency).await,

        Commands::Serve { port } => cmd_serve(port).await,

        Commands::TestConnection => cmd_test_connection().await,
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_parse(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let result = parse_csv_file_auto(input)?;

    eprintln!("   Encoding: {}", result.encoding);
    eprintln!(
        "   Delimiter: '{}'",
        match result.delimiter {
            '\t' => "\\t".to_string(),
            c => c.to_string(),
        }
    );
    eprintln!("   Columns: {}", result.headers.join(", "));
    eprintln!("✅ Parsed {} rows", result.rows.len());

    let json = serde_json::to_string_pretty(&result.rows)?;
    write_output(&json, output)?;

    Ok(())
}

async fn cmd_import(
    input: &Path,
    mapping_path: &Path,
    currency: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Importing: {}", input.display());

    let mapping_json = fs::read_to_string(mapping_path)?;
    let mapping: ColumnMapping = serde_json::from_str(&mapping_json)?;

    let config = ImportConfig::from_env()?;
    let currency = currency.unwrap_or_else(|| config.default_currency.clone());
    let client = HttpLedgerClient::new(&config)?;

    let parsed = parse_csv_file_auto(input)?;
    eprintln!("   Found {} rows", parsed.rows.len());

    let importer = Importer::new(&client, currency);
    let result = importer.run(&parsed.rows, &mapping).await?;

    eprintln!("\n📊 Results:");
    eprintln!("   Imported: {}", result.imported);
    eprintln!("   Skipped:  {}", result.skipped);
    eprintln!("   Success:  {}", result.success_rate());

    if !result.accounts_created.is_empty() {
        eprintln!("   Accounts created:");
        for name in &result.accounts_created {
            eprintln!("     + {}", name);
        }
    }

    if !result.errors.is_empty() {
        eprintln!("\n⚠️  Row errors:");
        for err in result.errors.iter().take(10) {
            eprintln!("   Row {}: {}", err.row, err.reason);
        }
        if result.errors.len() > 10 {
            eprintln!("   ... +{} more", result.errors.len() - 10);
        }
    }

    eprintln!("\n✨ Done!");
    Ok(())
}

async fn cmd_serve(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let config = ImportConfig::from_env()?;
    ledgerload::server::start_server(port, config).await
}

async fn cmd_test_connection() -> Result<(), Box<dyn std::error::Error>> {
    let config = ImportConfig::from_env()?;
    eprintln!("🔌 Testing connection to {}...", config.base_url);

    let client = HttpLedgerClient::new(&config)?;
    client.test_connection().await?;

    eprintln!("✅ Connected");
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
