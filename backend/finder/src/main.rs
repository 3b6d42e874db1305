use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use finder::{
    browse, check_allergen,
    client::{DEFAULT_RELAY_URL, RelayClient},
    filters::{
        ALERT_TYPES, ALLERGY_ALERT, COUNTRIES, DEFAULT_COUNTRY, FilterSet, HAZARD_CATEGORIES,
    },
    models::VocabularyTerm,
    render,
};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Base URL of the alerts relay
    #[arg(long, env = "ALERTS_RELAY_URL", default_value = DEFAULT_RELAY_URL)]
    relay: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search alerts, newest first
    Search {
        /// Country code, e.g. GB-SCT
        #[arg(long, default_value = DEFAULT_COUNTRY)]
        country: String,

        /// Alert type code: AA, PRIN or FAFA
        #[arg(long = "type")]
        alert_type: Option<String>,

        /// Hazard category, e.g. Microbiological
        #[arg(long)]
        hazard: Option<String>,

        /// Allergen notation, only used with --type AA
        #[arg(long)]
        allergen: Option<String>,

        /// Only alerts created since this date
        #[arg(long)]
        since: Option<String>,

        /// Pages of 20 to load
        #[arg(long, default_value_t = 1)]
        pages: usize,

        /// Print the API call log after the results
        #[arg(long)]
        log: bool,
    },

    /// List allergen options
    Allergens,

    /// List alert types known to upstream
    AlertTypes,

    /// List the fixed form options
    Options,

    /// Check the relay is up
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();
    let client = RelayClient::new(&args.relay)?;

    match args.command {
        Command::Search {
            country,
            alert_type,
            hazard,
            allergen,
            since,
            pages,
            log,
        } => {
            if allergen.is_some() && alert_type.as_deref() != Some(ALLERGY_ALERT) {
                warn!("--allergen only applies to allergy alerts (--type AA), ignoring it");
            }

            let filters = FilterSet::from_form(Some(country), alert_type, hazard, allergen, since);
            let filters = check_allergen(&client, filters).await;
            let session = browse(&client, filters, pages.max(1)).await;

            print!("{}", render(&session));
            if log {
                println!("\nAPI Call Log");
                print!("{}", session.calls());
            }
        }
        Command::Allergens => print_terms(&client.allergens().await?),
        Command::AlertTypes => print_terms(&client.alert_types().await?),
        Command::Options => {
            for (title, options) in [
                ("Countries", &COUNTRIES[..]),
                ("Alert types", &ALERT_TYPES[..]),
                ("Hazard categories", &HAZARD_CATEGORIES[..]),
            ] {
                println!("{title}");
                for (code, label) in options {
                    println!("  {code:<16} {label}");
                }
            }
        }
        Command::Health => {
            let health = client.health().await?;
            println!("{} at {}", health.status, health.timestamp);
        }
    }

    Ok(())
}

fn print_terms(terms: &[VocabularyTerm]) {
    if terms.is_empty() {
        println!("No terms returned.");
    }

    for term in terms {
        println!("{:<24} {}", term.value, term.label);
    }
}
