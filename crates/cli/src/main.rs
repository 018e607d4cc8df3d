//! Stockroom CLI - Browse and edit the product catalog.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (admin accounts can edit the catalog)
//! stockroom login emilys -p emilyspass
//!
//! # List products, sorted by price, second page
//! stockroom products list --sort price --page 2
//!
//! # Create a product (kept locally even though the API discards it)
//! stockroom products create --title Lamp --description "Desk lamp" \
//!     --price 19.99 --category home-decoration --stock 4
//!
//! # Edit a remote product (creates a local fork)
//! stockroom products update 5 --title "Updated"
//!
//! # Show or wipe locally stored records
//! stockroom local list
//! stockroom local clear
//! ```
//!
//! # Commands
//!
//! - `login`, `logout`, `whoami`, `register` - Account management
//! - `products` - List, inspect and edit the merged catalog
//! - `local` - Inspect the local record store
//!
//! State lives in `STOCKROOM_DATA_DIR` unless `--ephemeral` is given.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use stockroom_core::{ProductId, SortField, SortOrder};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod commands;
mod context;
mod output;

use context::AppContext;

#[derive(Parser)]
#[command(name = "stockroom")]
#[command(author, version, about = "Stockroom catalog admin")]
struct Cli {
    /// Keep all state in memory for this run only
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login {
        username: String,

        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Create an account, then sign in with it
    Register(RegisterArgs),
    /// Browse and edit products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Inspect locally stored products
    Local {
        #[command(subcommand)]
        action: LocalAction,
    },
}

#[derive(Args)]
struct RegisterArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long)]
    password: String,
    /// Defaults to `--password`
    #[arg(long)]
    confirm_password: Option<String>,
    #[arg(long)]
    age: u32,
    #[arg(long)]
    gender: String,
    /// Avatar URL
    #[arg(long)]
    image: Option<String>,
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List the merged catalog
    List(ListArgs),
    /// Show one product
    Get { id: ProductId },
    /// Create a product
    Create(CreateArgs),
    /// Change fields of a product
    Update {
        id: ProductId,
        #[command(flatten)]
        changes: UpdateArgs,
    },
    /// Delete a product
    Delete { id: ProductId },
    /// List the categories known to the API
    Categories,
}

#[derive(Args)]
struct ListArgs {
    /// Case-insensitive match on title or description
    #[arg(short, long)]
    search: Option<String>,
    /// Category slug, e.g. `smartphones`
    #[arg(short, long)]
    category: Option<String>,
    #[arg(long, default_value = "title")]
    sort: SortField,
    #[arg(long, default_value = "asc")]
    order: SortOrder,
    /// Page number, starting at 1
    #[arg(long, default_value_t = 1)]
    page: usize,
    #[arg(long, default_value_t = 10)]
    per_page: usize,
}

#[derive(Args)]
struct CreateArgs {
    #[arg(long)]
    title: String,
    #[arg(long)]
    description: String,
    #[arg(long)]
    price: Decimal,
    #[arg(long)]
    category: String,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    stock: i64,
    #[arg(long)]
    brand: Option<String>,
    #[arg(long)]
    discount: Option<f64>,
    #[arg(long)]
    rating: Option<f64>,
    #[arg(long)]
    thumbnail: Option<String>,
}

#[derive(Args)]
struct UpdateArgs {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    price: Option<Decimal>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long, allow_negative_numbers = true)]
    stock: Option<i64>,
    #[arg(long)]
    brand: Option<String>,
    #[arg(long)]
    discount: Option<f64>,
    #[arg(long)]
    rating: Option<f64>,
    #[arg(long)]
    thumbnail: Option<String>,
}

#[derive(Subcommand)]
enum LocalAction {
    /// List locally stored products
    List,
    /// Delete every locally stored product
    Clear,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

/// Text logs locally, JSON when `STOCKROOM_LOG_JSON` is set.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "stockroom_admin=info,stockroom_cli=info".into());

    let is_json = std::env::var_os("STOCKROOM_LOG_JSON").is_some();
    let json_layer = is_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!is_json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = AppContext::load(cli.ephemeral, cli.json)?;

    match cli.command {
        Commands::Login { username, password } => {
            commands::account::login(&mut ctx, &username, password).await?;
        }
        Commands::Logout => commands::account::logout(&mut ctx)?,
        Commands::Whoami => commands::account::whoami(&mut ctx).await?,
        Commands::Register(args) => commands::account::register(&mut ctx, args).await?,
        Commands::Products { action } => match action {
            ProductsAction::List(args) => commands::products::list(&mut ctx, args).await?,
            ProductsAction::Get { id } => commands::products::get(&ctx, &id).await?,
            ProductsAction::Create(args) => commands::products::create(&mut ctx, args).await?,
            ProductsAction::Update { id, changes } => {
                commands::products::update(&mut ctx, &id, changes).await?;
            }
            ProductsAction::Delete { id } => commands::products::delete(&mut ctx, &id).await?,
            ProductsAction::Categories => commands::products::categories(&ctx).await?,
        },
        Commands::Local { action } => match action {
            LocalAction::List => commands::local::list(&ctx)?,
            LocalAction::Clear => commands::local::clear(&ctx)?,
        },
    }
    Ok(())
}
