use std::{io::Read as _, path::PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context as _, Result};
use riven_companion::{
    ApiClient, Config, PlexDebridItem, group_by_state,
    util::{self, DateStyle},
};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "riven")]
#[command(version, about = "Settings client and display helpers for the Riven backend")]
pub struct Args {
    /// Config file to use instead of the one in the user config directory
    #[arg(long = "config", global = true)]
    pub config_file: Option<PathBuf>,

    /// Backend address, overrides the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Read or change backend settings
    Settings {
        #[command(subcommand)]
        action: SettingsCommand,
    },
    /// Format a timestamp in the local time zone
    Date {
        timestamp: String,
        /// "short" or "long"; defaults to the configured style
        #[arg(long)]
        style: Option<String>,
        /// Describe the timestamp relative to now
        #[arg(long, conflicts_with = "debrid")]
        relative: bool,
        /// The timestamp comes from Real-Debrid (Paris time) instead of UTC. Always printed
        /// as an absolute date, even if `relativeDates` is set in the config
        #[arg(long)]
        debrid: bool,
    },
    /// Turn an underscore_separated identifier into a label
    Words { text: String },
    /// Group a JSON array of items by state; reads stdin if no file is given
    Group { file: Option<PathBuf> },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Fetch settings by key
    Get {
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Set KEY=VALUE pairs, then save and reload. VALUE is parsed as JSON, or taken as a
    /// string if it isn't valid JSON.
    Set {
        #[arg(required = true, value_parser = parse_entry)]
        entries: Vec<(String, Value)>,
    },
    /// Persist the backend's current settings
    Save,
    /// Reload the backend's settings from storage
    Load,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Print the effective config
    Show,
    /// Write the effective config to disk
    Init,
}

fn parse_entry(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {raw:?}"))?;
    if key.is_empty() {
        return Err(format!("missing key in {raw:?}"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Resolves the config file and loads it with the env and `--base-url` overrides applied.
/// Only called by commands that read the config.
fn load_config(
    config_file: Option<PathBuf>,
    base_url: Option<String>,
) -> Result<(PathBuf, Config)> {
    let config_path = match config_file {
        Some(path) => path,
        None => Config::get_path()?,
    };
    let mut config = Config::load_with_env(&config_path)?;
    if let Some(base_url) = base_url {
        config.api.base_url = base_url;
    }
    Ok((config_path, config))
}

/// Whether `date` prints relative output. Real-Debrid timestamps are always absolute, so
/// the configured default only applies to UTC timestamps.
fn use_relative(relative: bool, debrid: bool, config: &Config) -> bool {
    if debrid {
        if config.display.relative_dates {
            tracing::info!("relativeDates is ignored for --debrid timestamps");
        }
        return false;
    }
    relative || config.display.relative_dates
}

pub async fn run(args: Args) -> Result<()> {
    let Args {
        config_file,
        base_url,
        command,
    } = args;

    match command {
        Command::Settings { action } => {
            let (_, config) = load_config(config_file, base_url)?;
            let client = ApiClient::new(&config.api.base_url)?;
            tracing::debug!("Using settings service at {}", client.base_url());
            run_settings(&client, action).await
        }
        Command::Date {
            timestamp,
            style,
            relative,
            debrid,
        } => {
            let (_, config) = load_config(config_file, base_url)?;
            let style = style
                .map(|s| s.parse::<DateStyle>().unwrap_or_default())
                .unwrap_or(config.display.date_style);
            let relative = use_relative(relative, debrid, &config);
            let formatted = if debrid {
                util::format_rd_date(&timestamp, style)
            } else {
                util::format_date(&timestamp, style, relative)
            };
            println!("{formatted}");
            Ok(())
        }
        Command::Words { text } => {
            println!("{}", util::format_words(&text));
            Ok(())
        }
        Command::Group { file } => {
            let contents = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => {
                    let mut contents = String::new();
                    std::io::stdin()
                        .read_to_string(&mut contents)
                        .context("Failed to read stdin")?;
                    contents
                }
            };
            let items = serde_json::from_str::<Vec<PlexDebridItem>>(&contents)
                .context("Expected a JSON array of items with a \"state\" field")?;
            print_json(&group_by_state(&items))
        }
        Command::Config { action } => {
            let (config_path, config) = load_config(config_file, base_url)?;
            match action {
                ConfigCommand::Show => print_json(&config),
                ConfigCommand::Init => {
                    config.save_to(&config_path)?;
                    println!("Wrote {}", config_path.display());
                    Ok(())
                }
            }
        }
    }
}

async fn run_settings(client: &ApiClient, action: SettingsCommand) -> Result<()> {
    match action {
        SettingsCommand::Get { keys } => {
            let settings = client.get_settings(keys.as_slice()).await?;
            print_json(&settings)
        }
        SettingsCommand::Set { entries } => {
            let result = client.set_settings(entries).await?;
            if result.failed_count() > 0 {
                tracing::warn!("{} setting(s) were rejected", result.failed_count());
            }
            print_json(&result)
        }
        SettingsCommand::Save => print_json(&client.save_settings().await?),
        SettingsCommand::Load => print_json(&client.load_settings().await?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory as _;
    use serde_json::json;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_entry() {
        assert_eq!(
            parse_entry("debug=true").unwrap(),
            ("debug".to_string(), json!(true))
        );
        assert_eq!(
            parse_entry("ranking={\"profile\":\"default\"}").unwrap(),
            ("ranking".to_string(), json!({ "profile": "default" }))
        );
        // Not JSON, taken verbatim
        assert_eq!(
            parse_entry("name=riven").unwrap(),
            ("name".to_string(), json!("riven"))
        );
        // Only the first '=' separates key and value
        assert_eq!(
            parse_entry("query=a=b").unwrap(),
            ("query".to_string(), json!("a=b"))
        );
        assert_eq!(parse_entry("empty=").unwrap(), ("empty".to_string(), json!("")));
    }

    #[test]
    fn test_parse_entry_rejects_malformed() {
        assert!(parse_entry("novalue").is_err());
        assert!(parse_entry("=1").is_err());
    }

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from([
            "riven",
            "--base-url",
            "http://localhost:9000",
            "settings",
            "set",
            "a=1",
            "b=x",
        ]);
        assert_eq!(args.base_url.as_deref(), Some("http://localhost:9000"));
        match args.command {
            Command::Settings {
                action: SettingsCommand::Set { entries },
            } => {
                assert_eq!(
                    entries,
                    vec![("a".to_string(), json!(1)), ("b".to_string(), json!("x"))]
                );
            }
            _ => panic!("expected settings set"),
        }
    }

    #[test]
    fn test_relative_conflicts_with_debrid() {
        let result =
            Args::try_parse_from(["riven", "date", "2023-10-14", "--relative", "--debrid"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_use_relative() {
        let mut config = Config::default();
        assert!(!use_relative(false, false, &config));
        assert!(use_relative(true, false, &config));

        config.display.relative_dates = true;
        assert!(use_relative(false, false, &config));
        // Real-Debrid dates stay absolute whatever the config says
        assert!(!use_relative(false, true, &config));
    }

    #[tokio::test]
    async fn test_config_is_only_read_when_needed() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config.json");
        std::fs::write(&config, "{ not json").unwrap();
        let items = dir.path().join("items.json");
        std::fs::write(&items, r#"[{ "state": "Completed" }]"#).unwrap();

        let with_config = |rest: &[&str]| {
            let mut argv = vec![
                "riven".to_string(),
                "--config".to_string(),
                config.display().to_string(),
            ];
            argv.extend(rest.iter().map(|arg| arg.to_string()));
            Args::parse_from(argv)
        };

        assert!(run(with_config(&["words", "hello_world"])).await.is_ok());
        assert!(
            run(with_config(&["group", items.to_str().unwrap()]))
                .await
                .is_ok()
        );
        // Commands that use the config still report a broken file
        assert!(run(with_config(&["date", "2023-10-14"])).await.is_err());
        assert!(run(with_config(&["config", "show"])).await.is_err());
    }
}
