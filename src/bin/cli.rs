//! Forum client CLI
//!
//! Renders forum pages and content from the command line.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use forum_client::{
    content::adjust_attached_content,
    dom::Element,
    error::{AppError, Result},
    models::{Config, LocaleConfig, PageLink, PaginationInfo, compute_page_links},
    pages::{AppContext, Master, lock_page},
    services::HttpForumApi,
    storage::{
        LocalPreferences, PreferenceStore, external_content_allowed, set_external_content_allowed,
    },
};
use url::Url;

/// Forum client - render a discussion forum from its JSON API
#[derive(Parser, Debug)]
#[command(name = "forum-client", version, about = "Discussion forum rendering client")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Path to the locale file
    #[arg(short, long, default_value = "data/locale.toml")]
    locale: PathBuf,

    /// Directory holding persisted preferences
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch a forum page and print its HTML and notifications
    Render {
        /// Page URL or path, e.g. `/threads/page/2`
        url: String,
    },

    /// Expand a markdown file the way message content is shown
    Expand {
        file: PathBuf,
    },

    /// Print the pagination window for a collection
    Pages {
        #[arg(long)]
        total: usize,

        #[arg(long, default_value_t = 20)]
        page_size: usize,

        /// Zero-based page index
        #[arg(long, default_value_t = 0)]
        page: usize,
    },

    /// Manage the external content consent
    Consent {
        #[arg(value_enum)]
        action: ConsentAction,
    },

    /// Validate configuration and locale files
    Validate,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ConsentAction {
    Allow,
    Revoke,
    Show,
}

/// Initialize logging from the verbosity flag or the configured level.
fn init_logging(verbose: bool, configured: &str) {
    let level = if verbose { "debug" } else { configured };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Location part of `target`, which may be a full URL or a bare path.
fn location_of(target: &str) -> Result<String> {
    if target.starts_with('/') {
        return Ok(target.to_string());
    }
    let url = Url::parse(target)?;
    Ok(match url.query() {
        Some(query) => format!("{}?{query}", url.path()),
        None => url.path().to_string(),
    })
}

fn context(
    config: Config,
    locale: LocaleConfig,
    preferences: Arc<dyn PreferenceStore>,
) -> Result<Arc<AppContext>> {
    let api = Arc::new(HttpForumApi::new(&config.api)?);
    Ok(Arc::new(AppContext::new(config, locale, api, preferences)?))
}

async fn render(ctx: Arc<AppContext>, target: &str) -> Result<()> {
    let location = location_of(target)?;
    let master = Master::new(ctx);
    master.bootstrap().await;

    let shown = master.navigate(&location).await;
    {
        let mut page = lock_page(master.page());
        println!("{}", page.document.to_html());
        for notification in page.notifications.drain() {
            eprintln!("[{}] {}", notification.severity, notification.message);
        }
    }
    master.shutdown();
    shown
}

async fn expand(ctx: Arc<AppContext>, file: &Path) -> Result<()> {
    let content = tokio::fs::read_to_string(file).await?;
    ctx.expander.warm_references([content.as_str()]).await;
    let consent = ctx.consent().await;

    let mut wrapper = Element::new("div").child(ctx.expander.expand_element(&content));
    adjust_attached_content(&mut wrapper, &ctx.adjust_context(consent));
    println!("{}", wrapper.to_html());
    Ok(())
}

fn print_pages(config: &Config, total: usize, page_size: usize, page: usize) {
    let info = PaginationInfo::new(page, page_size, total);
    let links: Vec<String> = compute_page_links(&info, &config.display.pagination)
        .into_iter()
        .map(|link| match link {
            PageLink::Page(index) if index == info.page() => format!("[{}]", index + 1),
            PageLink::Page(index) => (index + 1).to_string(),
            PageLink::Ellipsis => "...".to_string(),
        })
        .collect();

    if links.is_empty() {
        log::info!("Empty collection, no pagination");
    } else {
        println!("{}", links.join(" "));
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config);
    init_logging(cli.verbose, &config.logging.level);

    log::debug!("Loaded configuration from {}", cli.config.display());

    let preferences: Arc<dyn PreferenceStore> = Arc::new(LocalPreferences::new(&cli.data_dir));

    match cli.command {
        Command::Render { url } => {
            let locale = LocaleConfig::load_or_default(&cli.locale);
            render(context(config, locale, preferences)?, &url).await?;
        }

        Command::Expand { file } => {
            let locale = LocaleConfig::load_or_default(&cli.locale);
            expand(context(config, locale, preferences)?, &file).await?;
        }

        Command::Pages {
            total,
            page_size,
            page,
        } => print_pages(&config, total, page_size, page),

        Command::Consent { action } => {
            let store = preferences.as_ref();
            match action {
                ConsentAction::Allow => set_external_content_allowed(store, true).await?,
                ConsentAction::Revoke => set_external_content_allowed(store, false).await?,
                ConsentAction::Show => {}
            }
            let allowed = external_content_allowed(store).await;
            println!(
                "External content: {}",
                if allowed { "allowed" } else { "blocked" }
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = Config::load(&cli.config).and_then(|config| config.validate()) {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            if let Err(e) = LocaleConfig::load(&cli.locale) {
                log::error!("Locale validation failed: {}", e);
                return Err(AppError::config(format!(
                    "{}: {e}",
                    cli.locale.display()
                )));
            }
            log::info!("✓ Locale OK");

            log::info!("All validations passed!");
        }
    }

    Ok(())
}
