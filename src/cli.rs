// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
// Global flags go before or after the subcommand (they are `global = true`),
// and most of them can also come from REPODOCS_* environment variables.
//
// Subcommands map one-to-one onto what the browser version shows:
//   tree  -> the sidebar
//   doc   -> a document page (with its "On this page" outline)
//   post  -> a blog post, addressed by slug
//   blog  -> the blog index
//   repo  -> the settings dialog (show / switch repository)
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "repodocs",
    version = "0.1.0",
    about = "Browse documentation and blog posts straight from a public GitHub repository",
    long_about = "repodocs reads Markdown files from a public GitHub repository through the \
                  contents API and prints them as a navigable tree, rendered pages, tables of \
                  contents and a blog index."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// GitHub API base URL (useful for GitHub Enterprise or a local mock)
    #[arg(long, env = "REPODOCS_API_BASE", global = true)]
    pub api_base: Option<String>,

    /// Path of the settings file that remembers the selected repository
    #[arg(long, env = "REPODOCS_SETTINGS", global = true)]
    pub settings: Option<PathBuf>,

    /// Use this repository (owner/name) for one run without saving it
    #[arg(long, global = true)]
    pub repo: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// More logging on stderr (-v info, -vv debug). RUST_LOG wins if set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Passkey `repo set` expects
    #[arg(long, env = "REPODOCS_PASSKEY", hide = true, hide_env_values = true, global = true)]
    pub expected_passkey: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the repository tree
    ///
    /// Example: repodocs tree --depth 1 --toggle guides --toggle guides/setup
    Tree {
        /// Expand the directories leading to this document
        #[arg(long)]
        active: Option<String>,

        /// Expand every directory down to this depth (0 = root only)
        #[arg(long, default_value_t = 0)]
        depth: usize,

        /// Open a collapsed directory, or close an open one. Repeatable,
        /// applied in order after --active and --depth
        #[arg(long = "toggle", value_name = "DIR")]
        toggle: Vec<String>,
    },

    /// Print a document by its path in the repository
    ///
    /// Example: repodocs doc guides/getting-started.md --toc
    Doc {
        /// File path, e.g. guides/getting-started.md
        path: String,

        #[command(flatten)]
        output: DocOutput,
    },

    /// Print a blog post by slug (blog/<slug>.md or blog/<slug>.mdx)
    ///
    /// Example: repodocs post hello-world
    Post {
        slug: String,

        #[command(flatten)]
        output: DocOutput,
    },

    /// List the posts in the repository's blog/ directory
    Blog,

    /// Show or change the selected repository
    Repo {
        #[command(subcommand)]
        action: RepoAction,
    },
}

/// How a document is printed.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct DocOutput {
    /// Render to HTML instead of printing the raw Markdown
    #[arg(long)]
    pub html: bool,

    /// Print only the table of contents
    #[arg(long, conflicts_with = "html")]
    pub toc: bool,

    /// With --html: leave code blocks as plain <pre><code>, no language tags
    #[arg(long, requires = "html")]
    pub plain_code: bool,
}

#[derive(Subcommand, Debug)]
pub enum RepoAction {
    /// Print the selected repository
    Show,

    /// Switch to another public repository
    ///
    /// Example: repodocs repo set https://github.com/rust-lang/book --passkey ...
    Set {
        /// GitHub repository URL (https://github.com/owner/repo)
        url: String,

        /// The shared passkey
        #[arg(long)]
        passkey: String,
    },
}


// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why `global = true`?
//    - `repodocs --json blog` and `repodocs blog --json` both work
//
// 2. Why `#[command(flatten)]` for DocOutput?
//    - doc and post print the same way, so they share one set of flags
//
// 3. Where do defaults come from?
//    - Flags are Option<...> here; config.rs fills in the defaults so they
//      are in one place
// -----------------------------------------------------------------------------
