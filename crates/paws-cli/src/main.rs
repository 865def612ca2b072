//! paws - command-line front-end for the local password store
//!
//! Asks for the master password once, opens one store for the session and
//! runs a single command against it. Secrets are printed only by `get` and
//! `find` with `--show`; `list` never decrypts anything.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::{debug, info};

use paws_core::{
    generate, Credential, CredentialStore, GeneratorOptions, ListQuery, PawsError,
    SettingsManager, SortKey,
};

/// paws - local encrypted password manager
#[derive(Parser, Debug)]
#[command(name = "paws")]
#[command(version)]
#[command(about = "Local encrypted password manager")]
struct Args {
    /// Database file (defaults to the one named in settings.json)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Master password (prompted for when not set)
    #[arg(long, env = "PAWS_MASTER_PASSWORD", hide_env_values = true, global = true)]
    master_password: Option<String>,

    /// Log store activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add a credential; generates the password unless --secret is given
    Add {
        service: String,
        #[arg(short, long, default_value = "")]
        username: String,
        #[arg(short, long)]
        secret: Option<String>,
        #[arg(short, long, default_value = "")]
        notes: String,
        #[command(flatten)]
        generator: GeneratorArgs,
    },
    /// Show one credential by id
    Get {
        id: i64,
        /// Print the decrypted password
        #[arg(long)]
        show: bool,
    },
    /// Show the first credential for a service
    Find {
        service: String,
        #[arg(long)]
        show: bool,
    },
    /// List credentials without their passwords
    List {
        /// Case-insensitive match on service or username
        filter: Option<String>,
        /// id, service, username, notes, created_at or updated_at
        #[arg(long)]
        sort: Option<SortKey>,
        #[arg(long)]
        desc: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Replace a credential's fields; the password is kept unless --secret is given
    Update {
        id: i64,
        service: String,
        #[arg(short, long, default_value = "")]
        username: String,
        #[arg(short, long)]
        secret: Option<String>,
        #[arg(short, long, default_value = "")]
        notes: String,
    },
    /// Delete a credential (no error if it is already gone)
    Delete { id: i64 },
    /// Print a random password without touching the store
    Generate {
        #[command(flatten)]
        generator: GeneratorArgs,
    },
}

/// Overrides for the generator defaults from settings.json
#[derive(ClapArgs, Debug)]
struct GeneratorArgs {
    #[arg(long)]
    length: Option<usize>,
    #[arg(long)]
    no_digits: bool,
    #[arg(long)]
    no_upper: bool,
    #[arg(long)]
    no_symbols: bool,
}

impl GeneratorArgs {
    fn apply(&self, defaults: GeneratorOptions) -> GeneratorOptions {
        GeneratorOptions {
            length: self.length.unwrap_or(defaults.length),
            digits: defaults.digits && !self.no_digits,
            upper: defaults.upper && !self.no_upper,
            symbols: defaults.symbols && !self.no_symbols,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();

    let settings = SettingsManager::new().context("Failed to load settings")?;
    let generator_defaults = settings.get().generator;

    // Generating needs no store and no master password
    if let Command::Generate { generator } = &args.command {
        let password = generate(&generator.apply(generator_defaults))?;
        println!("{}", password);
        return Ok(());
    }

    let db_path = args.db.clone().unwrap_or_else(|| settings.database_path());
    let master_password = match args.master_password.clone() {
        Some(password) => password,
        None => rpassword::prompt_password("Master password: ")?,
    };

    let store = CredentialStore::open(&db_path, &master_password)
        .with_context(|| format!("Failed to open store at {}", db_path.display()))?;
    debug!("Session opened on {:?}", store.path());

    match args.command {
        Command::Add {
            service,
            username,
            secret,
            notes,
            generator,
        } => {
            let secret = match secret {
                Some(secret) => secret,
                None => {
                    let generated = generate(&generator.apply(generator_defaults))?;
                    info!("Generated password for {}", service);
                    generated
                }
            };
            let id = store.add(&service, &username, &secret, &notes)?;
            println!("Added credential {}", id);
        }
        Command::Get { id, show } => {
            let credential = store.get(id).map_err(explain)?;
            print_credential(&credential, show);
        }
        Command::Find { service, show } => match store.find_by_service(&service).map_err(explain)? {
            Some(credential) => print_credential(&credential, show),
            None => bail!("No credential for service '{}'", service),
        },
        Command::List {
            filter,
            sort,
            desc,
            json,
        } => {
            let defaults = settings.get().default_query();
            let query = ListQuery {
                filter,
                sort_by: sort.unwrap_or(defaults.sort_by),
                ascending: if sort.is_some() { !desc } else { defaults.ascending && !desc },
            };
            let rows = store.list(&query)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in &rows {
                    println!(
                        "{:>5}  {:<24} {:<24} {}",
                        row.id,
                        row.service,
                        row.username,
                        row.updated_at
                            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_default()
                    );
                }
            }
        }
        Command::Update {
            id,
            service,
            username,
            secret,
            notes,
        } => {
            store
                .update(id, &service, &username, secret.as_deref(), &notes)
                .map_err(explain)?;
            println!("Updated credential {}", id);
        }
        Command::Delete { id } => {
            store.delete(id)?;
            println!("Deleted credential {}", id);
        }
        // Handled before the store was opened
        Command::Generate { .. } => {}
    }

    Ok(())
}

fn print_credential(credential: &Credential, show: bool) {
    println!("id:       {}", credential.id);
    println!("service:  {}", credential.service);
    println!("username: {}", credential.username);
    if show {
        println!("password: {}", credential.secret.expose());
    } else {
        println!("password: ********");
    }
    if !credential.notes.is_empty() {
        println!("notes:    {}", credential.notes);
    }
}

/// Turn store errors into messages a user can act on
fn explain(err: PawsError) -> anyhow::Error {
    match err {
        PawsError::DecryptionError(_) => {
            anyhow::Error::new(err).context("Wrong master password or corrupted entry")
        }
        PawsError::NotFound(id) => anyhow::anyhow!("Entry {} does not exist (already deleted?)", id),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_generator_flags_override_settings() {
        let args = Args::parse_from(["paws", "generate", "--length", "8", "--no-symbols"]);
        let Command::Generate { generator } = args.command else {
            panic!("expected generate command");
        };

        let options = generator.apply(GeneratorOptions::default());
        assert_eq!(options.length, 8);
        assert!(options.digits);
        assert!(!options.symbols);
    }

    #[test]
    fn test_list_sort_parses() {
        let args = Args::parse_from(["paws", "list", "git", "--sort", "updated_at", "--desc"]);
        match args.command {
            Command::List { filter, sort, desc, .. } => {
                assert_eq!(filter.as_deref(), Some("git"));
                assert_eq!(sort, Some(SortKey::UpdatedAt));
                assert!(desc);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
