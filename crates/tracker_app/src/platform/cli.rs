use std::path::PathBuf;

use thiserror::Error;
use tracker_core::ItemId;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct CliError(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Add {
        code: String,
        label: Option<String>,
    },
    Edit {
        id: ItemId,
        code: Option<String>,
        label: Option<String>,
    },
    Delete {
        id: ItemId,
    },
    /// Refresh one item, or every item when `id` is `None`.
    Refresh {
        id: Option<ItemId>,
    },
    Badge,
    Watch,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAction {
    Help,
    Run(CliArgs),
}

pub fn parse_cli_flags<I>(args: I) -> Result<CliAction, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut config_path = None;
    let mut label = None;
    let mut code_flag = None;
    let mut positionals = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                config_path = Some(PathBuf::from(read_cli_value(&arg, args.next())?));
            }
            "--label" => label = Some(read_cli_value(&arg, args.next())?),
            "--code" => code_flag = Some(read_cli_value(&arg, args.next())?),
            "--help" | "-h" => return Ok(CliAction::Help),
            value if value.starts_with("--") => {
                return Err(CliError(format!(
                    "Unknown flag '{value}'. Run with --help for valid flags."
                )));
            }
            _ => positionals.push(arg),
        }
    }

    let mut positionals = positionals.into_iter();
    let command = match positionals.next().as_deref() {
        None | Some("list") => Command::List,
        Some("add") => Command::Add {
            code: required(positionals.next(), "add <code>")?,
            label,
        },
        Some("edit") => {
            let id = ItemId::new(required(positionals.next(), "edit <id>")?);
            if code_flag.is_none() && label.is_none() {
                return Err(CliError(
                    "edit needs --code <code> and/or --label <text>.".to_string(),
                ));
            }
            Command::Edit {
                id,
                code: code_flag.take(),
                label,
            }
        }
        Some("delete") => Command::Delete {
            id: ItemId::new(required(positionals.next(), "delete <id>")?),
        },
        Some("refresh") => Command::Refresh {
            id: positionals.next().map(ItemId::new),
        },
        Some("badge") => Command::Badge,
        Some("watch") => Command::Watch,
        Some(other) => {
            return Err(CliError(format!(
                "Unknown command '{other}'. Run with --help for valid commands."
            )));
        }
    };

    if let Some(extra) = positionals.next() {
        return Err(CliError(format!(
            "Unexpected argument '{extra}'. Run with --help for valid flags."
        )));
    }
    if code_flag.is_some() {
        return Err(CliError("--code is only valid with edit.".to_string()));
    }

    Ok(CliAction::Run(CliArgs {
        config_path,
        command,
    }))
}

fn read_cli_value(flag: &str, value: Option<String>) -> Result<String, CliError> {
    match value {
        Some(value) if !value.starts_with("--") => Ok(value),
        _ => Err(CliError(format!("Missing value after {flag}."))),
    }
}

fn required(value: Option<String>, usage: &str) -> Result<String, CliError> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| CliError(format!("Missing argument. Use: parcel-tracker {usage}")))
}

pub fn print_cli_help() {
    println!("Usage: parcel-tracker [--config <path>] <command>");
    println!();
    println!("Commands:");
    println!("  list                                      Show tracked items (default)");
    println!("  add <code> [--label <text>]               Track a new code and look it up");
    println!("  edit <id> [--code <code>] [--label <text>] Change an item's code or label");
    println!("  delete <id>                               Stop tracking an item");
    println!("  refresh [<id>]                            Refresh one item, or all of them");
    println!("  badge                                     Show the badge for the stored list");
    println!("  watch                                     Poll in the background until Ctrl-C");
    println!();
    println!("  --config <path>   Read settings from this RON file");
    println!("  --help            Show this help message");
}
