use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

// Use library instead of local modules
use income_rank::{check_age, demographic_for_age, logging, Config, RankService, ALL_DEMOGRAPHIC};

#[derive(Parser)]
#[command(name = "income-rank")]
#[command(about = "Where does an income rank within the census distribution?")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "INCOME_RANK_CONFIG", default_value = "income-rank.toml")]
    config: PathBuf,

    /// Data directory (overrides config file)
    #[arg(short, long, env = "INCOME_RANK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rank an individual employment income
    Percentile {
        #[arg(long)]
        income: f64,

        /// Age in years; picks the matching age demographic
        #[arg(long, conflicts_with = "demographic")]
        age: Option<u32>,

        /// Demographic code, e.g. "age-25-29"
        #[arg(long)]
        demographic: Option<String>,

        /// Geography code (defaults to the configured one)
        #[arg(long)]
        geography: Option<String>,
    },

    /// Rank a household income
    Household {
        #[arg(long)]
        income: f64,
    },

    /// List loaded geographies and demographics
    List,
}

fn main() -> Result<()> {
    logging::init();
    let cli = Cli::parse();

    let mut config = Config::load(Some(cli.config.as_path()))?;
    if let Some(data_dir) = cli.data_dir {
        config.data.data_dir = data_dir;
    }

    let service = RankService::load(&config)?;

    match cli.command {
        Command::Percentile {
            income,
            age,
            demographic,
            geography,
        } => {
            let demographic = match (age, demographic) {
                (Some(age), _) => demographic_for_age(check_age(age)?).to_string(),
                (None, Some(code)) => code,
                (None, None) => ALL_DEMOGRAPHIC.to_string(),
            };
            let geography = geography.unwrap_or_else(|| config.data.default_geography.clone());

            let result = service.compare_income(income, &geography, &demographic)?;

            println!("📊 {} - {} ({})", result.geography, result.demographic, result.year);
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            println!("Income:      {:.0}", result.income);
            println!("Percentile:  {:.1}", result.standing.percentile);
            println!("Bracket:     {}", result.bracket);
            println!(
                "Below you:   {}% (~{} people)",
                result.standing.below_you, result.estimated_people_below_you
            );
            println!(
                "vs median:   {:+} ({:+.1}%)",
                result.median.difference, result.median.percent_difference
            );
            println!(
                "vs average:  {:+} ({:+.1}%)",
                result.average.difference, result.average.percent_difference
            );
        }

        Command::Household { income } => {
            let result = service.compare_household(income)?;

            println!("🏠 Household income - {} ({})", result.geography, result.year);
            println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            println!("Income:      {:.0}", result.income);
            println!("Quintile:    {} ({})", result.quintile, result.quintile_label);
            println!("Bracket:     {}", result.bracket);
            println!("Percentile:  {:.1}", result.standing.percentile);
            println!(
                "Below you:   {}% (~{} households)",
                result.standing.below_you, result.estimated_households_below_you
            );
        }

        Command::List => {
            println!("🌍 Geographies");
            for geography in service.store().geographies() {
                println!("  {:<8} {} ({})", geography.code, geography.name, geography.kind);
            }

            println!("\n👥 Demographics");
            if service.store().demographics().is_empty() {
                println!("  (only \"{}\")", ALL_DEMOGRAPHIC);
            }
            for demographic in service.store().demographics() {
                println!("  {:<12} {} ({})", demographic.code, demographic.name, demographic.kind);
            }

            println!(
                "\n🏠 Household data: {}",
                if service.household().is_ok() { "loaded" } else { "not available" }
            );
        }
    }

    Ok(())
}
