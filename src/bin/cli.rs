use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use prettytable::{Cell, Row, Table};
use spark_joy::actions;
use spark_joy::auth::{self, CurrentUser};
use spark_joy::config::AppConfig;
use spark_joy::models::{parse_mood, Item, NewItem, SparkScore};
use spark_joy::quest::{QuestDice, QuestKind};
use spark_joy::storage::{ItemStore, Storage};
use spark_joy::user_storage::UserStorage;
use std::fs;
use std::path::{Path, PathBuf};

const SESSION_FILE: &str = ".spark-session";

#[derive(Parser)]
#[command(name = "spark")]
#[command(about = "Manage your belongings and today's declutter quest", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "spark-joy.toml", help = "Path to configuration file")]
    config: PathBuf,

    #[arg(short, long, env = "SPARK_JOY_DATA_DIR", help = "Data directory override")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Create a new account")]
    Signup {
        #[arg(short, long, help = "Username")]
        username: String,

        #[arg(short, long, help = "Password")]
        password: String,
    },

    #[command(about = "Log in to your account")]
    Login {
        #[arg(short, long, help = "Username")]
        username: String,

        #[arg(short, long, help = "Password")]
        password: String,
    },

    #[command(about = "Log out of your account")]
    Logout,

    #[command(about = "Show current user")]
    Whoami,

    #[command(about = "Register a new item")]
    Add {
        #[arg(short, long, help = "Item name")]
        name: String,

        #[arg(short, long, help = "Category")]
        category: String,

        #[arg(short, long, help = "Notes about the item (optional)")]
        features: Option<String>,
    },

    #[command(about = "List your items")]
    List,

    #[command(about = "Give an item a spark score from 1 to 5")]
    Rate {
        #[arg(short, long, help = "Item ID or its first characters")]
        item: String,

        #[arg(short, long, help = "Spark score (1-5)")]
        score: String,

        #[arg(short, long, help = "How you feel (optional)")]
        mood: Option<String>,
    },

    #[command(about = "Let go of an item for good")]
    Delete {
        #[arg(short, long, help = "Item ID or its first characters")]
        item: String,

        #[arg(short, long, help = "How you feel (optional)")]
        mood: Option<String>,
    },

    #[command(about = "Show today's quest")]
    Quest,

    #[command(about = "Show your rating and letting-go history")]
    History,
}

struct App {
    cfg: AppConfig,
    storage: Storage,
    users: UserStorage,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut cfg = AppConfig::load_or_default(&cli.config)?;
    if let Some(data_dir) = cli.data_dir {
        cfg.data_dir = data_dir;
    }

    let app = App {
        storage: Storage::open(&cfg.data_dir)?,
        users: UserStorage::open(&cfg.data_dir)?.with_session_ttl(cfg.session_ttl()),
        cfg,
    };

    match cli.command {
        Commands::Signup { username, password } => signup(&app, username, password).await,
        Commands::Login { username, password } => login(&app, username, password).await,
        Commands::Logout => logout(&app).await,
        Commands::Whoami => whoami(&app).await,
        Commands::Add {
            name,
            category,
            features,
        } => {
            let user = require_login(&app).await?;
            add_item(&app, &user, name, category, features).await
        }
        Commands::List => {
            let user = require_login(&app).await?;
            list_items(&app, &user).await
        }
        Commands::Rate { item, score, mood } => {
            let user = require_login(&app).await?;
            rate_item(&app, &user, item, score, mood).await
        }
        Commands::Delete { item, mood } => {
            let user = require_login(&app).await?;
            delete_item(&app, &user, item, mood).await
        }
        Commands::Quest => {
            let user = require_login(&app).await?;
            show_quest(&app, &user).await
        }
        Commands::History => {
            let user = require_login(&app).await?;
            show_history(&app, &user).await
        }
    }
}

fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE)
}

async fn signup(app: &App, username: String, password: String) -> Result<()> {
    let user = auth::register(
        &app.users,
        &username,
        &password,
        app.cfg.min_password_len,
        app.cfg.bcrypt_cost,
    )
    .await?;

    println!("✅ Account created successfully!");
    println!("👤 Username: {}", user.username);
    println!("\n💡 You can now log in using: spark login -u {} -p <password>", user.username);
    Ok(())
}

async fn login(app: &App, username: String, password: String) -> Result<()> {
    let user = auth::authenticate(&app.users, &username, &password).await?;
    let session = app.users.start_session(&user).await?;

    fs::write(session_path(&app.cfg.data_dir), &session.token).context("Failed to save session")?;

    println!("✅ Login successful!");
    println!("👤 Welcome back, {}!", user.username);
    Ok(())
}

async fn logout(app: &App) -> Result<()> {
    let path = session_path(&app.cfg.data_dir);
    if path.exists() {
        let token = fs::read_to_string(&path)?;
        app.users.end_session(token.trim()).await?;
        fs::remove_file(&path)?;
    }
    println!("✅ Logged out successfully!");
    Ok(())
}

async fn current_user(app: &App) -> Result<Option<CurrentUser>> {
    let path = session_path(&app.cfg.data_dir);
    if !path.exists() {
        return Ok(None);
    }

    let token = fs::read_to_string(&path).context("Failed to read session")?;
    let session = app.users.find_session(token.trim()).await?;
    Ok(session.as_ref().map(CurrentUser::from))
}

async fn require_login(app: &App) -> Result<CurrentUser> {
    current_user(app)
        .await?
        .ok_or_else(|| anyhow::anyhow!("You must be logged in. Use: spark login -u <username> -p <password>"))
}

async fn whoami(app: &App) -> Result<()> {
    match current_user(app).await? {
        Some(user) => {
            println!("👤 Logged in as: {}", user.username);
            println!("🆔 User ID: {}", user.id);
        }
        None => {
            println!("❌ Not logged in");
            println!("💡 Use 'spark login -u <username> -p <password>' to log in");
        }
    }
    Ok(())
}

/// Accepts a full item id or an unambiguous prefix of one.
async fn find_item(app: &App, user: &CurrentUser, reference: &str) -> Result<Item> {
    let reference = reference.trim();
    if reference.is_empty() {
        bail!("Item ID cannot be empty");
    }

    let items = app.storage.items_for_owner(user.id).await?;
    let mut matches = items
        .into_iter()
        .filter(|i| i.id.to_string().starts_with(reference));

    match (matches.next(), matches.next()) {
        (Some(item), None) => Ok(item),
        (Some(_), Some(_)) => bail!("'{}' matches more than one item, use more characters", reference),
        (None, _) => bail!("Item not found with ID: {}", reference),
    }
}

async fn add_item(
    app: &App,
    user: &CurrentUser,
    name: String,
    category: String,
    features: Option<String>,
) -> Result<()> {
    let new_item = NewItem::parse(&name, &category, features.as_deref())?;
    let item = actions::add_item(&app.storage, user.id, new_item).await?;

    println!("✅ Item added!");
    println!("📦 {} ({})", item.name, item.category);
    println!("🆔 Item ID: {}", item.id);
    println!("\n💡 Rate it with: spark rate -i {} -s <1-5>", &item.id.to_string()[..8]);
    Ok(())
}

fn score_cell(score: Option<SparkScore>) -> String {
    score.map_or_else(|| "-".to_string(), |s| "✨".repeat(usize::from(s.value())))
}

async fn list_items(app: &App, user: &CurrentUser) -> Result<()> {
    let items = app.storage.items_for_owner(user.id).await?;

    if items.is_empty() {
        println!("📭 No items yet.");
        println!("💡 Use 'spark add -n <name> -c <category>' to register one");
        return Ok(());
    }

    println!("\n📦 Your items ({})\n", items.len());

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("ID"),
        Cell::new("Name"),
        Cell::new("Category"),
        Cell::new("Spark"),
        Cell::new("Added"),
    ]));

    for item in items.iter().rev() {
        table.add_row(Row::new(vec![
            Cell::new(&item.id.to_string()[..8]),
            Cell::new(&item.name),
            Cell::new(&item.category),
            Cell::new(&score_cell(item.score)),
            Cell::new(&item.created_at.format("%Y-%m-%d").to_string()),
        ]));
    }

    table.printstd();
    println!();
    Ok(())
}

async fn rate_item(
    app: &App,
    user: &CurrentUser,
    reference: String,
    score: String,
    mood: Option<String>,
) -> Result<()> {
    let item = find_item(app, user, &reference).await?;
    let score = SparkScore::parse(&score)?;
    let mood = parse_mood(mood.as_deref())?;

    let item = actions::rate_item(&app.storage, &app.storage, user.id, item.id, score, mood).await?;

    println!("✅ Rated {} at {} {}", item.name, score, score_cell(item.score));
    Ok(())
}

async fn delete_item(app: &App, user: &CurrentUser, reference: String, mood: Option<String>) -> Result<()> {
    let item = find_item(app, user, &reference).await?;
    let mood = parse_mood(mood.as_deref())?;

    let item = actions::dispose_item(&app.storage, &app.storage, user.id, item.id, mood).await?;

    println!("🍃 Let go of {}. Thank you for everything it did.", item.name);
    Ok(())
}

async fn show_quest(app: &App, user: &CurrentUser) -> Result<()> {
    let items = app.storage.items_for_owner(user.id).await?;
    let dice = QuestDice::from_seed_option(app.cfg.quest_seed);

    let Some(quest) = dice.select(&items) else {
        println!("📭 No quest today. Add an item to get started.");
        return Ok(());
    };

    let heading = if quest.is_special() {
        "🌟 Special quest"
    } else {
        "🎯 Today's quest"
    };
    println!("{}", heading);
    println!("   {}", quest.text);

    let short_id: String = quest.target.to_string().chars().take(8).collect();
    let hint = match quest.kind {
        QuestKind::Special => "spark add -n <name> -c <category>".to_string(),
        QuestKind::Dispose => format!("spark delete -i {}", short_id),
        QuestKind::Rating | QuestKind::Review => format!("spark rate -i {} -s <1-5>", short_id),
    };
    println!("\n💡 {}", hint);
    Ok(())
}

async fn show_history(app: &App, user: &CurrentUser) -> Result<()> {
    let history = actions::history(&app.storage, user.id).await?;

    println!(
        "\n📜 History: {} rated, {} let go\n",
        history.counts.rated, history.counts.deleted
    );

    if history.entries.is_empty() {
        println!("📭 Nothing recorded yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("When"),
        Cell::new("Action"),
        Cell::new("Item"),
        Cell::new("Mood"),
    ]));

    for entry in &history.entries {
        table.add_row(Row::new(vec![
            Cell::new(&entry.timestamp.format("%Y-%m-%d %H:%M").to_string()),
            Cell::new(entry.action.as_str()),
            Cell::new(&entry.item_name),
            Cell::new(&entry.mood),
        ]));
    }

    table.printstd();
    println!();
    Ok(())
}
