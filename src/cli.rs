use std::collections::HashMap;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::Serialize;

use monjez::{
    api::{ApiError, GridQuery, GridService, PrayerQuery, PrayerService, convert_date},
    calendar::{TaskPriority, TaskStatus},
    prayer::{PrayerSource, StaticPrayerTable},
    storage::{Config, SqliteTaskStore},
};

pub const USAGE: &str = "Usage: monjez <command> [options]
  grid --owner ID [--view day|week|month|year] [--cal gregorian|hijri] [--from YYYY-MM-DD] [--overlays a,b]
  convert DATE [--from gregorian|hijri] [--to gregorian|hijri]
  prayer [--date YYYY-MM-DD] [--city NAME]
  prayer-week [--start YYYY-MM-DD] [--city NAME]
  islamic-day [--date YYYY-MM-DD]
  task add --owner ID --title TITLE [--due RFC3339] [--priority low|med|high|urgent] [--status S]
  task complete ID
  task delete ID";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Grid { owner: String, query: GridQuery },
    Convert { date: String, from: Option<String>, to: Option<String> },
    Prayer(PrayerQuery),
    PrayerWeek(PrayerQuery),
    IslamicDay { date: Option<String> },
    TaskAdd {
        owner: String,
        title: String,
        due: Option<String>,
        priority: Option<String>,
        status: Option<String>,
    },
    TaskComplete(String),
    TaskDelete(String),
    Help,
}

#[derive(Debug, Default)]
struct Args {
    positional: Vec<String>,
    flags: HashMap<String, String>,
}

impl Args {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut parsed = Self::default();
        let mut iter = args.into_iter();

        while let Some(arg) = iter.next() {
            if let Some(name) = arg.strip_prefix("--") {
                if name == "help" {
                    parsed.flags.insert("help".to_string(), String::new());
                    continue;
                }
                let Some(value) = iter.next() else {
                    return Err(format!("Missing value for --{}", name));
                };
                parsed.flags.insert(name.to_string(), value);
            } else {
                parsed.positional.push(arg);
            }
        }

        Ok(parsed)
    }

    fn take(&mut self, name: &str) -> Option<String> {
        self.flags.remove(name)
    }

    fn require(&mut self, name: &str) -> Result<String, String> {
        self.take(name).ok_or_else(|| format!("Missing required --{}", name))
    }

    fn finish(self) -> Result<(), String> {
        if let Some(extra) = self.positional.first() {
            return Err(format!("Unexpected argument: {}", extra));
        }
        let mut unknown: Vec<_> = self.flags.keys().collect();
        unknown.sort();
        match unknown.first() {
            Some(flag) => Err(format!("Unknown option: --{}", flag)),
            None => Ok(()),
        }
    }
}

pub fn parse_command(args: impl IntoIterator<Item = String>) -> Result<Command, String> {
    let mut args = Args::parse(args)?;
    if args.take("help").is_some() || args.positional.is_empty() {
        return Ok(Command::Help);
    }

    let name = args.positional.remove(0);
    let command = match name.as_str() {
        "grid" => Command::Grid {
            owner: args.require("owner")?,
            query: GridQuery {
                view: args.take("view"),
                cal: args.take("cal"),
                from: args.take("from"),
                overlays: args.take("overlays"),
            },
        },
        "convert" => {
            if args.positional.is_empty() {
                return Err("convert needs a DATE".to_string());
            }
            Command::Convert {
                date: args.positional.remove(0),
                from: args.take("from"),
                to: args.take("to"),
            }
        }
        "prayer" => Command::Prayer(PrayerQuery {
            date: args.take("date"),
            city: args.take("city"),
        }),
        "prayer-week" => Command::PrayerWeek(PrayerQuery {
            date: args.take("start"),
            city: args.take("city"),
        }),
        "islamic-day" => Command::IslamicDay {
            date: args.take("date"),
        },
        "task" => parse_task_command(&mut args)?,
        other => return Err(format!("Unknown command: {}", other)),
    };

    args.finish()?;
    Ok(command)
}

fn parse_task_command(args: &mut Args) -> Result<Command, String> {
    if args.positional.is_empty() {
        return Err("task needs a subcommand: add, complete or delete".to_string());
    }
    let action = args.positional.remove(0);

    match action.as_str() {
        "add" => Ok(Command::TaskAdd {
            owner: args.require("owner")?,
            title: args.require("title")?,
            due: args.take("due"),
            priority: args.take("priority"),
            status: args.take("status"),
        }),
        "complete" | "delete" => {
            if args.positional.is_empty() {
                return Err(format!("task {} needs a task ID", action));
            }
            let id = args.positional.remove(0);
            if action == "complete" {
                Ok(Command::TaskComplete(id))
            } else {
                Ok(Command::TaskDelete(id))
            }
        }
        other => Err(format!("Unknown task subcommand: {}", other)),
    }
}

/// Runs one command and returns its JSON output.
pub fn run(command: Command, config: &Config) -> anyhow::Result<String> {
    let tz = config.timezone()?;
    let now = Utc::now().with_timezone(&tz).naive_local();
    let today = now.date();

    match command {
        Command::Help => Ok(USAGE.to_string()),
        Command::Grid { owner, query } => {
            let store = open_store(config)?;
            let service = GridService::new(store, tz).with_defaults(
                config.calendar.default_view,
                config.calendar.default_calendar,
            );
            to_json(&service.grid(&owner, &query, today)?)
        }
        Command::Convert { date, from, to } => {
            to_json(&convert_date(Some(&date), from.as_deref(), to.as_deref())?)
        }
        Command::Prayer(query) => to_json(&prayer_service(config)?.times(&query, now)?),
        Command::PrayerWeek(query) => to_json(&prayer_service(config)?.week(&query, today)?),
        Command::IslamicDay { date } => {
            to_json(&prayer_service(config)?.islamic_day(date.as_deref(), today)?)
        }
        Command::TaskAdd {
            owner,
            title,
            due,
            priority,
            status,
        } => {
            let due = due.as_deref().map(parse_due).transpose()?;
            let priority = match priority {
                Some(raw) => TaskPriority::parse(&raw).map_err(ApiError::from)?,
                None => TaskPriority::default(),
            };
            let status = match status {
                Some(raw) => TaskStatus::parse(&raw).map_err(ApiError::from)?,
                None => TaskStatus::default(),
            };

            let store = open_store(config)?;
            let mut task = store
                .create_task(&owner, &title, due, priority)
                .map_err(ApiError::from)?;
            if task.status != status {
                task = task.with_status(status);
                store.store_task(&owner, &task).map_err(ApiError::from)?;
            }
            to_json(&task)
        }
        Command::TaskComplete(id) => {
            let store = open_store(config)?;
            to_json(&store.complete_task(&id).map_err(ApiError::from)?)
        }
        Command::TaskDelete(id) => {
            let store = open_store(config)?;
            store.delete_task(&id).map_err(ApiError::from)?;
            to_json(&serde_json::json!({ "deleted": id }))
        }
    }
}

/// Prints a failed command: request errors as JSON plus usage, anything
/// else as a plain message.
pub fn report_error(err: &anyhow::Error) {
    match err.downcast_ref::<ApiError>() {
        Some(api_error) => {
            tracing::warn!("Request rejected: {}", api_error);
            let body = serde_json::to_string_pretty(&api_error.body())
                .unwrap_or_else(|_| api_error.to_string());
            println!("{}", body);
            if matches!(api_error, ApiError::InvalidInput { .. }) {
                eprintln!("{}", USAGE);
            }
        }
        None => {
            tracing::error!("Command failed: {:#}", err);
            eprintln!("Error: {:#}", err);
        }
    }
}

fn open_store(config: &Config) -> anyhow::Result<SqliteTaskStore> {
    let path = &config.storage.database_path;
    SqliteTaskStore::open(path)
        .with_context(|| format!("Failed to open task store at {}", path.display()))
}

fn prayer_service(config: &Config) -> anyhow::Result<PrayerService> {
    let source: Box<dyn PrayerSource> = match &config.prayer.table_path {
        Some(path) => Box::new(
            StaticPrayerTable::load(path)
                .with_context(|| format!("Failed to load prayer table {}", path.display()))?,
        ),
        None => Box::new(StaticPrayerTable::riyadh()),
    };
    Ok(PrayerService::new(source, config.prayer.default_city.clone()))
}

fn parse_due(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|due| due.with_timezone(&Utc))
        .map_err(|e| ApiError::InvalidInput {
            field: "due",
            reason: format!("'{}' is not RFC 3339: {}", raw, e),
        })
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("Failed to encode response")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(line: &str) -> Vec<String> {
        line.split_whitespace().map(str::to_string).collect()
    }

    fn test_config(dir: &tempfile::TempDir) -> Config {
        let mut config = Config::default();
        config.storage.database_path = dir.path().join("tasks.db");
        config.logging.directory = dir.path().join("logs");
        config
    }

    #[test]
    fn no_arguments_shows_help() {
        assert_eq!(parse_command(Vec::<String>::new()).unwrap(), Command::Help);
        assert_eq!(parse_command(args("grid --help")).unwrap(), Command::Help);
    }

    #[test]
    fn parses_grid_command() {
        let command = parse_command(args("grid --owner u1 --view week --from 2025-08-27")).unwrap();

        assert_eq!(
            command,
            Command::Grid {
                owner: "u1".to_string(),
                query: GridQuery::default().with_view("week").with_from("2025-08-27"),
            }
        );
    }

    #[test]
    fn grid_requires_owner() {
        let err = parse_command(args("grid --view week")).unwrap_err();

        assert_eq!(err, "Missing required --owner");
    }

    #[test]
    fn parses_convert_command() {
        let command = parse_command(args("convert 1447-03-03 --from hijri --to gregorian")).unwrap();

        assert_eq!(
            command,
            Command::Convert {
                date: "1447-03-03".to_string(),
                from: Some("hijri".to_string()),
                to: Some("gregorian".to_string()),
            }
        );
    }

    #[test]
    fn prayer_week_reads_start_flag() {
        let command = parse_command(args("prayer-week --start 2025-08-25")).unwrap();

        assert_eq!(
            command,
            Command::PrayerWeek(PrayerQuery::default().with_date("2025-08-25"))
        );
    }

    #[test]
    fn parses_task_subcommands() {
        assert_eq!(
            parse_command(args("task complete abc")).unwrap(),
            Command::TaskComplete("abc".to_string())
        );
        assert_eq!(
            parse_command(args("task delete abc")).unwrap(),
            Command::TaskDelete("abc".to_string())
        );
        assert!(matches!(
            parse_command(args("task add --owner u1 --title Read --priority high")).unwrap(),
            Command::TaskAdd { priority: Some(p), .. } if p == "high"
        ));
    }

    #[test]
    fn rejects_unknown_command_and_options() {
        assert!(parse_command(args("agenda")).is_err());
        assert!(parse_command(args("prayer --mosque central")).is_err());
        assert!(parse_command(args("prayer --date")).is_err());
        assert!(parse_command(args("islamic-day extra")).is_err());
    }

    #[test]
    fn convert_outputs_json() {
        let dir = tempfile::tempdir().unwrap();
        let command = parse_command(args("convert 2024-03-11")).unwrap();

        let output = run(command, &test_config(&dir)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(json["converted_date"], "1445-09-01");
    }

    #[test]
    fn invalid_input_surfaces_as_api_error() {
        let dir = tempfile::tempdir().unwrap();
        let command = parse_command(args("convert 2024-13-01")).unwrap();

        let err = run(command, &test_config(&dir)).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::InvalidInput { field: "date", .. })
        ));
    }

    #[test]
    fn added_task_shows_up_in_grid() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(&dir);

        let added = run(
            parse_command(args("task add --owner u1 --title Read --due 2025-08-27T10:00:00Z")).unwrap(),
            &config,
        )
        .unwrap();
        let grid = run(
            parse_command(args("grid --owner u1 --view day --from 2025-08-27")).unwrap(),
            &config,
        )
        .unwrap();

        let added: serde_json::Value = serde_json::from_str(&added).unwrap();
        let grid: serde_json::Value = serde_json::from_str(&grid).unwrap();
        assert_eq!(grid["total_tasks"], 1);
        assert_eq!(grid["grid"][0]["tasks"][0]["id"], added["id"]);
    }

    #[test]
    fn completing_unknown_task_is_not_found() {
        let dir = tempfile::tempdir().unwrap();

        let err = run(Command::TaskComplete("missing".to_string()), &test_config(&dir)).unwrap_err();

        assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::NotFound(_))));
    }

    #[test]
    fn bad_due_timestamp_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let command = parse_command(args("task add --owner u1 --title Read --due tomorrow")).unwrap();

        let err = run(command, &test_config(&dir)).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::InvalidInput { field: "due", .. })
        ));
    }
}
