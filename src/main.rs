mod cli;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{CategoryAction, Cli, Commands, DetailArgs};
use photohub::{config, fetch_image, Accounts, AggregationService, ContentStore, SignupRequest};
use ph_core::{Config, ImageId};
use ph_db::models::{Category, PersonalDetails, User};
use ph_db::pool::get_conn;
use ph_db::queries::{categories, users};
use serde::Serialize;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "photohub=trace,ph_db=debug,ph_core=debug".to_string()
        } else {
            "photohub=info,ph_db=warn,ph_core=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Version => print_version(),
        command => {
            let config = config::load_config_or_default(cli.config.as_deref())?;
            let store = ContentStore::open(&config).with_context(|| {
                format!("Failed to open database {}", config.database.path.display())
            })?;
            run(command, &store, &config)
        }
    }
}

fn run(command: Commands, store: &ContentStore, config: &Config) -> Result<()> {
    match command {
        Commands::Init => {
            println!("Database ready at {}", config.database.path.display());
            Ok(())
        }
        Commands::Category { action } => match action {
            CategoryAction::Add { name } => add_category(store, &name),
            CategoryAction::List => list_categories(store),
        },
        Commands::Signup {
            username,
            password,
            email,
            details,
        } => {
            let request = SignupRequest {
                username,
                email,
                password,
                details: details.into(),
            };
            let user = accounts(store, config).signup(&request)?;
            println!("Created account {} <{}> ({})", user.username, user.email, user.id);
            Ok(())
        }
        Commands::Login { username, password } => {
            let user = accounts(store, config).login(&username, &password)?;
            println!("Credentials valid for {} ({})", user.username, user.id);
            Ok(())
        }
        Commands::Upload {
            file,
            owner,
            category,
        } => upload(store, &file, &owner, &category),
        Commands::Fetch {
            id,
            output,
            save,
            json,
        } => fetch(store, &id, output, save, json),
        Commands::Dashboard { owner } => {
            let owner_id = match owner {
                Some(username) => Some(find_user(store, &username)?.id),
                None => None,
            };
            print_json(&aggregation(store, config).group_by_category(owner_id)?)
        }
        Commands::Browse { category } => {
            let category = find_category(store, &category)?;
            print_json(&aggregation(store, config).browse_category(category.id)?)
        }
        Commands::Profile { username } => {
            let user = find_user(store, &username)?;
            print_json(&aggregation(store, config).photographer_profile(user.id)?)
        }
        Commands::Photographers => {
            let conn = get_conn(store.pool())?;
            print_json(&users::list_users(&conn)?)
        }
        Commands::Version => print_version(),
    }
}

fn print_version() -> Result<()> {
    println!("photohub {}", env!("CARGO_PKG_VERSION"));
    Ok(())
}

fn accounts(store: &ContentStore, config: &Config) -> Accounts {
    Accounts::new(store.pool().clone(), config.auth.clone())
}

fn aggregation(store: &ContentStore, config: &Config) -> AggregationService {
    AggregationService::new(store.clone(), config.aggregation.clone())
}

fn find_user(store: &ContentStore, username: &str) -> Result<User> {
    let conn = get_conn(store.pool())?;
    users::get_user_by_username(&conn, username)?
        .with_context(|| format!("No photographer named '{username}'"))
}

fn find_category(store: &ContentStore, name: &str) -> Result<Category> {
    let conn = get_conn(store.pool())?;
    categories::get_category_by_name(&conn, name)?
        .with_context(|| format!("No category named '{name}'"))
}

fn add_category(store: &ContentStore, name: &str) -> Result<()> {
    let conn = get_conn(store.pool())?;
    let category = categories::create_category(&conn, name)?;
    tracing::info!(category_id = %category.id, "Created category {}", category.name);
    println!("{}\t{}", category.id, category.name);
    Ok(())
}

fn list_categories(store: &ContentStore) -> Result<()> {
    for category in store.list_categories()? {
        println!("{}\t{}", category.id, category.name);
    }
    Ok(())
}

fn upload(store: &ContentStore, file: &Path, owner: &str, category: &str) -> Result<()> {
    let owner = find_user(store, owner)?;
    let category = find_category(store, category)?;

    let reader = BufReader::new(
        File::open(file).with_context(|| format!("Failed to open {}", file.display()))?,
    );
    let image_id = store.put_reader(reader, owner.id, category.id)?;

    match ph_sniff::classify_mime(&store.peek(image_id, ph_sniff::SNIFF_LEN)?) {
        Some(mime) => println!("{image_id}\t{mime}"),
        None => {
            tracing::warn!("{} does not look like a known image type", file.display());
            println!("{image_id}\t{}", ph_sniff::FALLBACK_MIME);
        }
    }
    Ok(())
}

fn fetch(store: &ContentStore, id: &str, output: Option<PathBuf>, save: bool, json: bool) -> Result<()> {
    let image_id: ImageId = id
        .parse()
        .with_context(|| format!("'{id}' is not a valid image id"))?;
    let image = fetch_image(store, image_id)?;

    let output = match output {
        Some(path) => Some(path),
        None if save => Some(PathBuf::from(image.file_name())),
        None => None,
    };

    match output {
        Some(path) => {
            std::fs::write(&path, &image.bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} bytes of {} to {}", image.bytes.len(), image.mime_type, path.display());
            Ok(())
        }
        None if json => print_json(&image),
        None => {
            println!("{}\t{}\t{} bytes", image.image_id, image.mime_type, image.bytes.len());
            Ok(())
        }
    }
}

impl From<DetailArgs> for PersonalDetails {
    fn from(args: DetailArgs) -> Self {
        PersonalDetails {
            first_name: args.first_name,
            middle_name: args.middle_name,
            surname: args.surname,
            gender: args.gender,
            date_of_birth: args.dob,
            location: args.location,
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
