mod commands;
mod config;
mod server;
mod view;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    cmd_meal_add, cmd_meal_delete, cmd_target_set, cmd_target_show, cmd_week,
    cmd_weight_history, cmd_weight_log,
};
use crate::config::Config;
use foodfit_core::db::Database;
use foodfit_core::models::Nutrients;

#[derive(Parser)]
#[command(
    name = "foodfit",
    version,
    about = "Track body weight and meal nutrition, one week at a time"
)]
struct Cli {
    /// Path to the SQLite database (default: per-user data directory)
    #[arg(long, global = true, env = "FOODFIT_DB", value_name = "PATH")]
    db: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web interface
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000")]
        port: u16,
        /// Address to bind to (default: 127.0.0.1, use 0.0.0.0 to expose to network)
        #[arg(short, long, default_value = "127.0.0.1")]
        bind: String,
    },
    /// Show meals and nutrient totals for the week containing a date
    Week {
        /// Any date in the week (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Track body weight
    Weight {
        #[command(subcommand)]
        command: WeightCommands,
    },
    /// Manage the target weight
    Target {
        #[command(subcommand)]
        command: TargetCommands,
    },
    /// Log or remove meal items
    Meal {
        #[command(subcommand)]
        command: MealCommands,
    },
}

#[derive(Subcommand)]
enum WeightCommands {
    /// Log a weight entry (replaces any entry for the same date)
    Log {
        /// Weight value (number)
        value: f64,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show every weight entry, oldest first
    History {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum TargetCommands {
    /// Set the target weight
    Set {
        /// Target weight (number)
        value: f64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the target weight
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct NutrientArgs {
    /// Calories
    #[arg(long)]
    calories: Option<f64>,
    /// Protein (g)
    #[arg(long)]
    protein: Option<f64>,
    /// Fat (g)
    #[arg(long)]
    fat: Option<f64>,
    /// Sugars (g)
    #[arg(long)]
    sugars: Option<f64>,
    /// Carbohydrates (g)
    #[arg(long)]
    carbs: Option<f64>,
}

impl From<NutrientArgs> for Nutrients {
    fn from(args: NutrientArgs) -> Self {
        Nutrients {
            calories: args.calories,
            protein: args.protein,
            fat: args.fat,
            sugars: args.sugars,
            carbs: args.carbs,
        }
    }
}

#[derive(Subcommand)]
enum MealCommands {
    /// Add a meal item
    Add {
        /// Food name
        food: String,
        /// Meal type: breakfast, lunch, dinner
        #[arg(short, long)]
        meal: String,
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        #[arg(long)]
        date: Option<String>,
        #[command(flatten)]
        nutrients: NutrientArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a meal item by ID
    Delete {
        /// Meal item ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("foodfit=info,foodfit_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.db)?;
    let db = Database::open(&config.db_path)?;
    tracing::debug!(path = %config.db_path.display(), "database opened");

    match cli.command {
        Commands::Serve { port, bind } => server::start_server(db, port, &bind).await,
        Commands::Week { date, json } => cmd_week(&db, date.as_deref(), json),
        Commands::Weight { command } => match command {
            WeightCommands::Log { value, date, json } => cmd_weight_log(&db, value, date, json),
            WeightCommands::History { json } => cmd_weight_history(&db, json),
        },
        Commands::Target { command } => match command {
            TargetCommands::Set { value, json } => cmd_target_set(&db, value, json),
            TargetCommands::Show { json } => cmd_target_show(&db, json),
        },
        Commands::Meal { command } => match command {
            MealCommands::Add {
                food,
                meal,
                date,
                nutrients,
                json,
            } => cmd_meal_add(&db, &food, &meal, date, nutrients.into(), json),
            MealCommands::Delete { id, json } => cmd_meal_delete(&db, id, json),
        },
    }
}
