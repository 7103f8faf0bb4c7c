use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use shelf_core::view::{SortOrder, StatusFilter, TagFilter, ViewCriteria, ViewEngine};
use shelf_core::{
    xfer, Capture, FieldUpdate, FileStore, Item, RemoveOutcome, SaveOutcome, Status, Store,
    UpdateOutcome,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod config;
mod view;

#[derive(Parser)]
#[command(name = "shelf", version, about = "Saved post shelf")]
struct Cli {
    /// Path to the JSON store (overrides settings)
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    /// Settings file (default: <config_dir>/shelf/settings.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a post (text read from STDIN if omitted)
    Add {
        id: String,
        #[arg(long, default_value = "")]
        url: String,
        #[arg(long, default_value = "")]
        author: String,
        text: Option<String>,
    },
    /// List saved posts
    List {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Search text, author, note and tags
    Search {
        query: String,
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Manage tags on a post
    Tag {
        #[command(subcommand)]
        cmd: TagCmd,
    },
    /// Set a post's note (clears it when TEXT is omitted)
    Note { id: String, text: Option<String> },
    Archive { id: String },
    /// Mark a post unread
    Unread { id: String },
    /// Flip a post between unread and archived
    Toggle { id: String },
    Delete { id: String },
    /// Write a backup file (or a bare mirror array with --mirror)
    Export {
        path: PathBuf,
        #[arg(long)]
        mirror: bool,
    },
    /// Merge a backup (or mirror) file into the store
    Import {
        path: PathBuf,
        #[arg(long)]
        mirror: bool,
    },
    /// Collection counts
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Render the list view headlessly
    View(view::ViewArgs),
    /// Print resolved settings and paths
    Config {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum TagCmd {
    Add {
        id: String,
        #[arg(required = true)]
        tags: Vec<String>,
    },
    Rm {
        id: String,
        #[arg(required = true)]
        tags: Vec<String>,
    },
    /// Tags of one post, or every tag in the collection
    Ls { id: Option<String> },
}

#[derive(Args, Debug, Clone)]
pub(crate) struct FilterArgs {
    /// all|unread|archived
    #[arg(long, default_value = "all")]
    status: String,
    #[arg(long)]
    tag: Option<String>,
    /// newest|oldest
    #[arg(long, default_value = "newest")]
    sort: String,
}

impl FilterArgs {
    pub(crate) fn criteria(&self) -> Result<ViewCriteria> {
        let status: StatusFilter = self.status.parse()?;
        let sort: SortOrder = self.sort.parse()?;
        let tag = self
            .tag
            .as_deref()
            .map(TagFilter::from)
            .unwrap_or_default();
        Ok(ViewCriteria::default()
            .with_status(status)
            .with_tag(tag)
            .with_sort(sort))
    }
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub(crate) enum Format {
    #[default]
    Text,
    Html,
    Json,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let settings = config::load_settings(cli.config.as_deref());
    let store_path = cli.store.clone().unwrap_or_else(|| settings.store_path());
    // Opened on first use so `config` and `view --from-mirror` never touch it.
    let open_store = || -> Result<FileStore> {
        tracing::debug!(path = %store_path.display(), "opening store");
        FileStore::new(&store_path)
            .with_context(|| format!("opening store {}", store_path.display()))
    };

    match cli.command {
        Commands::Add {
            id,
            url,
            author,
            text,
        } => {
            let text = match text {
                Some(t) => t,
                None => {
                    use std::io::{self, Read};
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf.trim_end().to_string()
                }
            };
            let store = open_store()?;
            match store.save(Capture {
                id: id.clone(),
                url,
                author,
                text,
            })? {
                SaveOutcome::Saved(item) => println!("added {}", item.id),
                SaveOutcome::Duplicate => println!("already saved {id}"),
            }
        }
        Commands::List {
            filter,
            limit,
            json,
        } => {
            let criteria = filter.criteria()?;
            print_listing(&open_store()?, &settings, criteria, limit, json)?;
        }
        Commands::Search {
            query,
            filter,
            limit,
            json,
        } => {
            let criteria = filter.criteria()?.with_search(query);
            print_listing(&open_store()?, &settings, criteria, limit, json)?;
        }
        Commands::Tag { cmd } => {
            let store = open_store()?;
            match cmd {
                TagCmd::Add { id, tags } => {
                    let mut current = find(&store, &id)?.tags;
                    for t in tags {
                        let t = t.trim().to_string();
                        if !t.is_empty() && !current.contains(&t) {
                            current.push(t);
                        }
                    }
                    set_tags(&store, &id, current)?;
                }
                TagCmd::Rm { id, tags } => {
                    let mut current = find(&store, &id)?.tags;
                    current.retain(|t| !tags.contains(t));
                    set_tags(&store, &id, current)?;
                }
                TagCmd::Ls { id: Some(id) } => {
                    for t in find(&store, &id)?.tags {
                        println!("{t}");
                    }
                }
                TagCmd::Ls { id: None } => {
                    let items = store.list_all()?;
                    for t in shelf_core::view::criteria::available_tags(&items) {
                        println!("{t}");
                    }
                }
            }
        }
        Commands::Note { id, text } => {
            let update = FieldUpdate {
                note: Some(text.unwrap_or_default()),
                ..FieldUpdate::default()
            };
            apply_update(&open_store()?, &id, &update)?;
            println!("noted {id}");
        }
        Commands::Archive { id } => {
            set_status(&open_store()?, &id, Status::Archived)?;
        }
        Commands::Unread { id } => {
            set_status(&open_store()?, &id, Status::Unread)?;
        }
        Commands::Toggle { id } => {
            let store = open_store()?;
            let next = find(&store, &id)?.status.toggled();
            set_status(&store, &id, next)?;
        }
        Commands::Delete { id } => match open_store()?.remove(&id)? {
            RemoveOutcome::Removed => println!("deleted {id}"),
            RemoveOutcome::NotFound => bail!("item not found: {id}"),
        },
        Commands::Export { path, mirror } => {
            let items = open_store()?.list_all()?;
            if mirror {
                xfer::write_mirror(&path, &items)?;
            } else {
                xfer::write_backup(&path, &items, Utc::now())?;
            }
            println!("exported {} posts to {}", items.len(), path.display());
        }
        Commands::Import { path, mirror } => {
            let parsed = if mirror {
                xfer::read_mirror(&path, Utc::now())
            } else {
                xfer::read_backup(&path, Utc::now())
            }
            .with_context(|| format!("reading {}", path.display()))?;
            let summary = open_store()?.import_batch(parsed.items)?;
            print!(
                "imported {}, skipped {} duplicates",
                summary.imported, summary.skipped
            );
            if parsed.rejected > 0 {
                print!(", ignored {} invalid entries", parsed.rejected);
            }
            println!();
        }
        Commands::Stats { json } => {
            let mut engine = ViewEngine::new(settings.view_config())?;
            engine.set_all(open_store()?.list_all()?);
            let stats = engine.stats();
            let last = engine.last_updated();
            if json {
                let v = serde_json::json!({
                    "total": stats.total,
                    "unread": stats.unread,
                    "archived": stats.archived,
                    "lastUpdated": last,
                });
                println!("{}", serde_json::to_string_pretty(&v)?);
            } else {
                println!("total: {}", stats.total);
                println!("unread: {}", stats.unread);
                println!("archived: {}", stats.archived);
                if let Some(at) = last {
                    println!("last updated: {}", at.format("%b %-d, %Y %H:%M"));
                }
            }
        }
        Commands::View(args) => view::run(&args, &settings, open_store)?,
        Commands::Config { json } => {
            let view_cfg = settings.view_config();
            if json {
                let v = serde_json::json!({
                    "config_dir": config::config_dir(),
                    "settings_path": cli.config.clone().unwrap_or_else(config::settings_path),
                    "store_path": store_path,
                    "view": view_cfg,
                });
                println!("{}", serde_json::to_string_pretty(&v)?);
            } else {
                println!("config dir: {}", config::config_dir().display());
                println!("store: {}", store_path.display());
                println!("{}", toml::to_string_pretty(&view_cfg)?);
            }
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("SHELF_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_listing(
    store: &dyn Store,
    settings: &config::Settings,
    criteria: ViewCriteria,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let mut engine = ViewEngine::new(settings.view_config())?;
    engine.set_all(store.list_all()?);
    engine.apply_criteria(criteria);
    let items: Vec<&Item> = engine
        .filtered_view()
        .take(limit.unwrap_or(usize::MAX))
        .collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for it in items {
            println!("{}", listing_line(it));
        }
    }
    Ok(())
}

pub(crate) fn listing_line(it: &Item) -> String {
    let mark = match it.status {
        Status::Unread => "*",
        Status::Archived => " ",
    };
    let author = if it.author.is_empty() {
        "unknown"
    } else {
        &it.author
    };
    format!(
        "{}\t{}\t{}\t@{}\t{}",
        it.id,
        mark,
        it.saved_at.format("%Y-%m-%d"),
        author,
        preview(&it.text)
    )
}

fn find(store: &dyn Store, id: &str) -> Result<Item> {
    match store.list_all()?.into_iter().find(|i| i.id == id) {
        Some(item) => Ok(item),
        None => bail!("item not found: {id}"),
    }
}

fn apply_update(store: &dyn Store, id: &str, update: &FieldUpdate) -> Result<Item> {
    match store.update_fields(id, update)? {
        UpdateOutcome::Updated(item) => Ok(item),
        UpdateOutcome::NotFound => bail!("item not found: {id}"),
    }
}

fn set_tags(store: &dyn Store, id: &str, tags: Vec<String>) -> Result<()> {
    let update = FieldUpdate {
        tags: Some(tags),
        ..FieldUpdate::default()
    };
    let item = apply_update(store, id, &update)?;
    println!("{}: {}", item.id, item.tags.join(", "));
    Ok(())
}

fn set_status(store: &dyn Store, id: &str, status: Status) -> Result<()> {
    let item = apply_update(store, id, &FieldUpdate::status(status))?;
    println!("{} {}", item.status.as_str(), item.id);
    Ok(())
}

fn preview(s: &str) -> String {
    let s = s.replace('\n', " ");
    const MAX: usize = 60;
    match s.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}…", &s[..cut]),
        None => s,
    }
}
