use clap::{Parser, Subcommand};
use medvault_core::models::NewUser;
use medvault_core::{CoreConfig, Database, EmailAddress, NonEmptyText, SharingService, UserService};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "medvault")]
#[command(about = "MedVault medical record system admin CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database (if needed) and apply migrations
    Migrate,
    /// Create the default user from DEFAULT_USER_* environment variables
    Seed,
    /// List a user's share links
    Shares {
        /// Owner email address
        email: String,
    },
    /// Revoke one of a user's share links
    Revoke {
        /// Owner email address
        email: String,
        /// Share link UUID
        share_id: String,
    },
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_owned())
}

async fn open_database() -> Result<Database, Box<dyn std::error::Error>> {
    let cfg = CoreConfig::from_process_env()?;
    let db = Database::connect(&cfg).await?;
    db.migrate().await?;
    Ok(db)
}

async fn owner_id(db: &Database, email: &str) -> Result<Uuid, Box<dyn std::error::Error>> {
    let email = EmailAddress::parse(email)?;
    match UserService::new(db.clone()).find_by_email(&email).await? {
        Some(user) => Ok(user.id),
        None => Err(format!("No user registered with email {}", email.as_str()).into()),
    }
}

async fn seed(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let users = UserService::new(db.clone());
    let email = EmailAddress::parse(&env_or("DEFAULT_USER_EMAIL", "admin@medvault.local"))?;

    if users.find_by_email(&email).await?.is_some() {
        println!("Default user {} already exists, skipping.", email.as_str());
        return Ok(());
    }

    let password = std::env::var("DEFAULT_USER_PASSWORD")
        .map_err(|_| "DEFAULT_USER_PASSWORD must be set to seed the default user")?;
    let user = users
        .register(NewUser {
            email,
            password,
            first_name: NonEmptyText::new(&env_or("DEFAULT_USER_FIRSTNAME", "Admin"))?,
            last_name: NonEmptyText::new(&env_or("DEFAULT_USER_LASTNAME", "User"))?,
            phone: String::new(),
        })
        .await?;
    println!("Created default user {} with ID: {}", user.email, user.id);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Migrate) => {
            open_database().await?;
            println!("Database is up to date.");
        }
        Some(Commands::Seed) => {
            let db = open_database().await?;
            seed(&db).await?;
        }
        Some(Commands::Shares { email }) => {
            let db = open_database().await?;
            let owner = owner_id(&db, &email).await?;
            let links = SharingService::new(db).list_for_owner(owner).await?;
            if links.is_empty() {
                println!("No share links found.");
            } else {
                for link in links {
                    let record = &link.shared_record;
                    println!(
                        "ID: {}, Type: {}, Active: {}, Accesses: {}/{}, Expires: {}, Logs: {}",
                        record.id,
                        record.record_type,
                        record.is_active,
                        record.current_access_count,
                        record.max_access_count,
                        record.expires_at.to_rfc3339(),
                        link.access_logs.len()
                    );
                }
            }
        }
        Some(Commands::Revoke { email, share_id }) => {
            let db = open_database().await?;
            let owner = owner_id(&db, &email).await?;
            let share_id = Uuid::parse_str(&share_id)?;
            match SharingService::new(db).revoke(owner, share_id).await? {
                0 => eprintln!("No share link {} owned by {}", share_id, email),
                _ => println!("Revoked share link {}", share_id),
            }
        }
        None => {
            println!("Use 'medvault --help' for commands");
        }
    }

    Ok(())
}
