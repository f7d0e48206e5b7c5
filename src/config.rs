// src/config.rs
// =============================================================================
// Runtime configuration, resolved once at startup.
//
// Sources, highest priority first:
//   1. command-line flags            (--api-base, --settings, --repo)
//   2. environment variables         (REPODOCS_API_BASE, REPODOCS_SETTINGS,
//                                     REPODOCS_PASSKEY)
//   3. built-in defaults             (api.github.com, <config dir>/repodocs/)
//
// clap already merges 1 and 2 for us (the `env` feature), so this file only
// fills in the defaults and validates what it got.
// =============================================================================

use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use url::Url;

use crate::cli::Cli;
use crate::github::{RepositoryRef, DEFAULT_API_BASE};

/// Passkey used when REPODOCS_PASSKEY is not set.
pub const DEFAULT_PASSKEY: &str = "PratyanchIsGod";

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the GitHub REST API
    pub api_base: String,
    /// Where the repository selection is saved
    pub settings_path: PathBuf,
    /// Expected passkey for `repo set`
    pub passkey: String,
    /// One-off repository for this run; nothing gets saved
    pub repo_override: Option<RepositoryRef>,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let api_base = cli
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Url::parse(&api_base).with_context(|| format!("invalid API base URL: {}", api_base))?;

        let settings_path = match &cli.settings {
            Some(path) => path.clone(),
            None => default_settings_path()?,
        };

        let repo_override = cli.repo.as_deref().map(parse_repo_arg).transpose()?;

        Ok(Self {
            api_base,
            settings_path,
            passkey: cli
                .expected_passkey
                .clone()
                .unwrap_or_else(|| DEFAULT_PASSKEY.to_string()),
            repo_override,
        })
    }
}

/// `<config dir>/repodocs/settings.toml`, e.g. ~/.config/repodocs/settings.toml
pub fn default_settings_path() -> Result<PathBuf> {
    let dir = dirs::config_dir().context("could not determine the user config directory")?;
    Ok(dir.join("repodocs").join("settings.toml"))
}

// "owner/name" for --repo
fn parse_repo_arg(value: &str) -> Result<RepositoryRef> {
    match value.trim().split_once('/') {
        Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
            Ok(RepositoryRef::new(owner, name))
        }
        _ => bail!("--repo must look like owner/name, got '{}'", value),
    }
}
