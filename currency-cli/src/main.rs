//! Currency CLI
//!
//! Command-line interface for the currency reference API.

use anyhow::Result;
use clap::{Parser, Subcommand};

use currency_client::CurrencyClient;
use currency_types::{DEFAULT_LIMIT, PaginationQuery, UpdateCurrencyRequest};

#[derive(Parser)]
#[command(name = "currency")]
#[command(author, version, about = "Currency reference API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the currency API
    #[arg(long, env = "CURRENCY_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Currency catalog operations
    Currency {
        #[command(subcommand)]
        action: CurrencyCommands,
    },
    /// Rate snapshot operations
    Rate {
        #[command(subcommand)]
        action: RateCommands,
    },
    /// Convert with the source currency's newest snapshot
    Convert {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        amount: f64,
        /// Convert through the EUR snapshot instead
        #[arg(long)]
        cross: bool,
    },
    /// Check API health
    Health,
}

#[derive(clap::Args)]
struct PageArgs {
    #[arg(long, default_value_t = 0)]
    skip: u32,
    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    limit: u32,
    /// Field to order by; prefix with `-` for descending
    #[arg(long, allow_hyphen_values = true)]
    order_by: Option<String>,
}

impl From<PageArgs> for PaginationQuery {
    fn from(args: PageArgs) -> Self {
        PaginationQuery {
            skip: args.skip,
            limit: args.limit,
            order_by: args.order_by,
        }
    }
}

#[derive(Subcommand)]
enum CurrencyCommands {
    /// Create a new currency
    Create {
        /// Display name
        name: String,
        /// Currency code (e.g. USD)
        code: String,
    },
    /// Get currency details
    Get { code: String },
    /// List currencies
    List {
        #[command(flatten)]
        page: PageArgs,
    },
    /// Change the name and/or code of a currency
    Update {
        code: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long = "new-code")]
        new_code: Option<String>,
    },
    /// Delete a currency
    Delete { code: String },
    /// Import every currency the rate provider supports
    Import,
}

#[derive(Subcommand)]
enum RateCommands {
    /// List stored snapshots of a currency
    List {
        code: String,
        #[command(flatten)]
        page: PageArgs,
    },
    /// Get (fetching if needed) today's snapshot of a currency
    Latest { code: String },
    /// Newest stored snapshot for each code (comma-separated)
    Show {
        #[arg(value_delimiter = ',', required = true)]
        codes: Vec<String>,
    },
    /// Refresh today's snapshot of every currency in the background
    RefreshAll,
    /// Backfill daily snapshots in the background
    Backfill {
        /// Currency code; every currency when omitted
        #[arg(long)]
        code: Option<String>,
        /// First day, YYYY-MM-DD
        #[arg(long)]
        start: String,
        /// Last day, YYYY-MM-DD
        #[arg(long)]
        end: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = CurrencyClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is healthy");
            } else {
                println!("✗ API is not healthy");
                std::process::exit(1);
            }
        }

        Commands::Currency { action } => match action {
            CurrencyCommands::Create { name, code } => {
                let currency = client.create_currency(&name, &code).await?;
                println!("{}", serde_json::to_string_pretty(&currency)?);
            }
            CurrencyCommands::Get { code } => {
                let currency = client.get_currency(&code).await?;
                println!("{}", serde_json::to_string_pretty(&currency)?);
            }
            CurrencyCommands::List { page } => {
                let currencies = client.list_currencies(&page.into()).await?;
                println!("{}", serde_json::to_string_pretty(&currencies)?);
            }
            CurrencyCommands::Update {
                code,
                name,
                new_code,
            } => {
                if name.is_none() && new_code.is_none() {
                    anyhow::bail!("Nothing to update: pass --name and/or --new-code");
                }
                let patch = UpdateCurrencyRequest {
                    name,
                    code: new_code,
                };
                let currency = client.update_currency(&code, &patch).await?;
                println!("{}", serde_json::to_string_pretty(&currency)?);
            }
            CurrencyCommands::Delete { code } => {
                client.delete_currency(&code).await?;
                println!("✓ Currency {} deleted", code);
            }
            CurrencyCommands::Import => {
                let summary = client.import_currencies().await?;
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        },

        Commands::Rate { action } => match action {
            RateCommands::List { code, page } => {
                let rates = client.list_rates(&code, &page.into()).await?;
                println!("{}", serde_json::to_string_pretty(&rates)?);
            }
            RateCommands::Latest { code } => {
                let rate = client.latest_rate(&code).await?;
                println!("{}", serde_json::to_string_pretty(&rate)?);
            }
            RateCommands::Show { codes } => {
                let codes: Vec<&str> = codes.iter().map(String::as_str).collect();
                let rates = client.latest_rates_for_codes(&codes).await?;
                println!("{}", serde_json::to_string_pretty(&rates)?);
            }
            RateCommands::RefreshAll => {
                client.refresh_all_rates().await?;
                println!("✓ Refresh accepted");
            }
            RateCommands::Backfill { code, start, end } => {
                match code {
                    Some(code) => client.backfill_rates(&code, &start, &end).await?,
                    None => client.backfill_all_rates(&start, &end).await?,
                }
                println!("✓ Backfill accepted");
            }
        },

        Commands::Convert {
            from,
            to,
            amount,
            cross,
        } => {
            let conversion = if cross {
                client.convert_cross(&from, &to, amount).await?
            } else {
                client.convert(&from, &to, amount).await?
            };
            println!("{}", serde_json::to_string_pretty(&conversion)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_descending_order_accepted() {
        let cli = Cli::try_parse_from(["currency", "currency", "list", "--order-by", "-code"])
            .unwrap();
        match cli.command {
            Commands::Currency {
                action: CurrencyCommands::List { page },
            } => assert_eq!(page.order_by.as_deref(), Some("-code")),
            _ => panic!("expected currency list"),
        }
    }
}
