use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};
use crate::core::prompt::{CommitMode, TEMP_PREFIX};

/// Config file names, first match wins
pub const CONFIG_FILES: [&str; 2] = ["editprompt.toml", ".editprompt.toml"];

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config
{
    /// Editor command line; overrides `EDITOR` when set
    pub editor: Option<String>,

    /// Temp file name prefix
    pub temp_prefix: String,

    /// How validated changes are written back
    pub commit: CommitMode,

    /// Checks applied to every edit
    pub checks: ChecksConfig,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecksConfig
{
    pub utf8: bool,
    pub non_empty: bool,
    pub command: Option<String>,
}

impl Default for Config
{
    fn default() -> Self
    {
        Self {
            editor: None,
            temp_prefix: TEMP_PREFIX.to_string(),
            commit: CommitMode::InPlace,
            checks: ChecksConfig::default(),
        }
    }
}

pub fn load_config() -> Result<Config>
{
    load_config_from(Path::new("."))
}

/// Load `editprompt.toml` (or `.editprompt.toml`) from `dir`, then
/// `EDITPROMPT_*` environment variables on top
pub fn load_config_from(dir: &Path) -> Result<Config>
{
    let mut builder = config::Config::builder();

    for name in &CONFIG_FILES
    {
        let path = dir.join(name);
        if path.exists()
        {
            builder = builder.add_source(config::File::from(path));
            break;
        }
    }

    // Add environment variables with EDITPROMPT_ prefix
    builder = builder.add_source(
        config::Environment::with_prefix("EDITPROMPT")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join(CONFIG_FILES[0]);

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    if ctx.dry_run
    {
        if !ctx.quiet
        {
            println!("Would write {}:\n{toml_string}", config_path.display());
        }
        return Ok(());
    }

    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}
