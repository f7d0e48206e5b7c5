// src/main.rs
// =============================================================================
// Entry point of the repodocs CLI.
//
// What happens here:
// 1. Parse command-line arguments (clap) and set up logging (tracing)
// 2. Resolve configuration and open the settings store
// 3. Dispatch to the subcommand handler
// 4. Print the result as text or JSON
// 5. Exit with a code: 0 = ok, 1 = could not resolve what was asked for,
//    2 = internal error (bad config, unreadable settings, ...)
//
// Logs go to stderr so that `--json` output on stdout stays parseable.
// =============================================================================

mod cli;
mod config;
mod document;
mod error;
mod github;
mod markdown;
mod nav;
mod settings;
mod tree;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, DocOutput, RepoAction};
use config::Config;
use document::{list_posts, DocumentStatus, DocumentTarget, DocumentView, LoadedDocument, NavigateOutcome};
use error::ResolveError;
use github::{ContentSource, GitHubClient};
use markdown::{render_markdown, CodeBlockTransformer, LanguageTagged, PlainCodeBlocks};
use nav::{PasskeyGate, RepoSelection, RepoSwitcher, SwitchError};
use settings::{FileSettingsStore, MemorySettingsStore, Settings, SettingsStore};
use tree::{LoadStatus, Sidebar, TreeRow, ROOT};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// -v -> info, -vv -> debug. RUST_LOG overrides both.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    let config = Config::from_cli(&cli)?;
    debug!(
        api_base = %config.api_base,
        settings = %config.settings_path.display(),
        "resolved configuration"
    );

    let store: Arc<dyn SettingsStore> = match &config.repo_override {
        // --repo: this run only, nothing touches the settings file
        Some(_) => Arc::new(MemorySettingsStore::new()),
        None => {
            let file = FileSettingsStore::with_path(config.settings_path.clone());
            debug!(path = %file.path().display(), "using settings file");
            Arc::new(file)
        }
    };
    let settings = Settings::new(store);
    if let Some(repo) = &config.repo_override {
        settings.set_repository(repo)?;
    }

    let selection = RepoSelection::load(settings).with_context(|| {
        format!("could not read settings from {}", config.settings_path.display())
    })?;
    let client: Arc<dyn ContentSource> =
        Arc::new(GitHubClient::new(&config.api_base).context("could not build the GitHub client")?);

    let json = cli.json;
    match cli.command {
        Commands::Tree {
            active,
            depth,
            toggle,
        } => {
            let sidebar = Sidebar::new(client, selection.subscribe());
            prepare_sidebar(&sidebar, active.as_deref(), depth, &toggle).await;
            handle_tree(&sidebar, &selection, json)
        }
        Commands::Doc { path, output } => {
            handle_document(client, &selection, DocumentTarget::Doc(path), output, json).await
        }
        Commands::Post { slug, output } => {
            handle_document(client, &selection, DocumentTarget::Post(slug), output, json).await
        }
        Commands::Blog => handle_blog(client.as_ref(), &selection, json).await,
        Commands::Repo { action } => match action {
            RepoAction::Show => handle_repo_show(&selection, json),
            RepoAction::Set { url, passkey } => {
                if config.repo_override.is_some() {
                    bail!("--repo cannot be combined with `repo set`");
                }
                handle_repo_set(client.as_ref(), &selection, &config, &url, &passkey, json).await
            }
        },
    }
}

// Loads what the 'tree' flags ask for: the active path first, then every
// directory within `depth`, then each toggle in the order given
async fn prepare_sidebar(sidebar: &Sidebar, active: Option<&str>, depth: usize, toggles: &[String]) {
    if let Some(active) = active {
        sidebar.set_active_path(active);
    }
    sidebar.expand_to_depth(depth).await;
    for dir in toggles {
        debug!(dir = %dir, "toggling directory");
        sidebar.toggle(dir.trim_matches('/')).await;
    }
}

// Handles the 'tree' subcommand
fn handle_tree(sidebar: &Sidebar, selection: &RepoSelection, json: bool) -> Result<i32> {
    let Some(root) = sidebar.listing(ROOT) else {
        bail!("no repository selected");
    };
    if let LoadStatus::Failed(err) = &root.status {
        print_resolve_error(err, json)?;
        return Ok(1);
    }

    let rows = sidebar.rows();
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!("📚 {}", selection.repository());
        print_tree(&rows);
    }

    let any_failed = rows
        .iter()
        .any(|row| matches!(row.status, Some(LoadStatus::Failed(_))));
    Ok(if any_failed { 1 } else { 0 })
}

// Handles the 'doc' and 'post' subcommands
async fn handle_document(
    client: Arc<dyn ContentSource>,
    selection: &RepoSelection,
    target: DocumentTarget,
    output: DocOutput,
    json: bool,
) -> Result<i32> {
    let view = DocumentView::new(client, selection.subscribe());

    match view.navigate(target).await {
        NavigateOutcome::Applied => {}
        NavigateOutcome::Skipped => bail!("nothing to show: empty path or no repository selected"),
        NavigateOutcome::Stale => bail!("the repository changed while the document was loading"),
    }

    match view.status() {
        DocumentStatus::Ready { loaded } => {
            print_document(&loaded, output, json)?;
            Ok(0)
        }
        DocumentStatus::Failed { error, .. } => {
            print_resolve_error(&error, json)?;
            Ok(1)
        }
        other => bail!("document did not finish loading: {:?}", other),
    }
}

// Handles the 'blog' subcommand
async fn handle_blog(source: &dyn ContentSource, selection: &RepoSelection, json: bool) -> Result<i32> {
    let posts = match list_posts(source, &selection.repository()).await {
        Ok(posts) => posts,
        Err(err) => {
            print_resolve_error(&err, json)?;
            return Ok(1);
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&posts)?);
    } else if posts.is_empty() {
        println!("⚠️  No posts found");
    } else {
        for post in &posts {
            println!("📝 {:<40} {}", post.title, post.slug);
        }
    }
    Ok(0)
}

fn handle_repo_show(selection: &RepoSelection, json: bool) -> Result<i32> {
    let repo = selection.repository();
    if json {
        let value = json!({
            "owner": repo.owner,
            "name": repo.name,
            "url": repo.web_url(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("📚 {} ({})", repo, repo.web_url());
    }
    Ok(0)
}

async fn handle_repo_set(
    source: &dyn ContentSource,
    selection: &RepoSelection,
    config: &Config,
    url: &str,
    passkey: &str,
    json: bool,
) -> Result<i32> {
    let gate = PasskeyGate::new(config.passkey.clone());
    let switcher = RepoSwitcher::new(source, selection);

    let result = match gate.unlock(passkey) {
        Ok(unlocked) => switcher.switch(&unlocked, url).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(snapshot) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("✅ Now showing {}", snapshot.repo);
            }
            Ok(0)
        }
        // Failing to save is our problem, not the user's input
        Err(SwitchError::Selection(e)) => {
            Err(e).with_context(|| format!("could not save {}", config.settings_path.display()))
        }
        Err(e) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&json!({ "error": e.to_string() }))?);
            } else {
                eprintln!("❌ {}", e);
            }
            Ok(1)
        }
    }
}

fn print_document(loaded: &LoadedDocument, output: DocOutput, json: bool) -> Result<()> {
    if output.toc {
        if json {
            println!("{}", serde_json::to_string_pretty(&loaded.toc)?);
        } else if loaded.toc.is_empty() {
            println!("⚠️  No sections in {}", loaded.document.title);
        } else {
            for entry in &loaded.toc {
                let indent = "  ".repeat(usize::from(entry.level.saturating_sub(2)));
                println!("{}- {} (#{})", indent, entry.text, entry.id);
            }
        }
        return Ok(());
    }

    if output.html {
        let transformer: &dyn CodeBlockTransformer = if output.plain_code {
            &PlainCodeBlocks
        } else {
            &LanguageTagged
        };
        let html = render_markdown(&loaded.document.content, transformer);
        if json {
            let value = json!({ "title": loaded.document.title, "html": html });
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            println!("{}", html);
        }
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(loaded)?);
    } else {
        println!("📄 {}\n", loaded.document.title);
        println!("{}", loaded.document.content);
    }
    Ok(())
}

fn print_tree(rows: &[TreeRow]) {
    for row in rows {
        let indent = "  ".repeat(row.depth + 1);
        let entry = &row.entry;

        if !entry.is_directory {
            println!("{}📄 {}  ({})", indent, entry.label, entry.path);
            continue;
        }

        let marker = if row.expanded { "▾" } else { "▸" };
        match &row.status {
            Some(LoadStatus::Failed(err)) => {
                println!("{}{} 📁 {}  ❌ {}", indent, marker, entry.label, err)
            }
            Some(LoadStatus::Loading) => println!("{}{} 📁 {}  ...", indent, marker, entry.label),
            _ => println!("{}{} 📁 {}", indent, marker, entry.label),
        }
    }
}

// Text goes to stderr, JSON to stdout, so scripts can still parse it
fn print_resolve_error(err: &ResolveError, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&json!({ "error": err }))?);
    } else {
        eprintln!("❌ {}: {}", err.label(), err);
    }
    Ok(())
}


// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why Arc<dyn ContentSource>?
//    - Sidebar and DocumentView keep the source for their whole life, and the
//      tests swap in an in-memory source, so they take a shared trait object
//
// 2. Why do handlers return Result<i32>?
//    - Ok(code) is an expected outcome (including "file not found" = 1)
//    - Err(...) is something broken on our side, which main turns into 2
// -----------------------------------------------------------------------------
