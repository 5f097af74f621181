use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{value_parser, Arg, ArgMatches, Command};
use routine_core::{Frequency, FrequencyUnit, TaskId, ToggleOutcome};
use routine_domain::{JsonFileStore, RecordingScheduler, RoutineService};
use tracing::{debug, info};

use crate::render::render_board;

const STORE_FILE_NAME: &str = "store.json";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub(crate) store_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(dir) = std::env::var("ROUTINE_DATA_DIR") {
            if !dir.trim().is_empty() {
                config.store_path = PathBuf::from(dir).join(STORE_FILE_NAME);
            }
        }
        if let Ok(file) = std::env::var("ROUTINE_STORE_FILE") {
            if !file.trim().is_empty() {
                config.store_path = PathBuf::from(file);
            }
        }
        debug!(path = %config.store_path.display(), "store location resolved");
        Ok(config)
    }

    pub fn with_store_path(path: impl Into<PathBuf>) -> Self {
        Self {
            store_path: path.into(),
        }
    }

    fn open_service(&self) -> Result<RoutineService> {
        RoutineService::builder()
            .with_store(Arc::new(JsonFileStore::new(&self.store_path)))
            .with_scheduler(Arc::new(RecordingScheduler::new()))
            .build()
            .with_context(|| {
                format!(
                    "failed to open routine store at {}",
                    self.store_path.display()
                )
            })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let store_path = dirs::data_dir()
            .map(|dir| dir.join("routine").join(STORE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(STORE_FILE_NAME));
        Self { store_path }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    List {
        today: Option<NaiveDate>,
    },
    Add {
        title: String,
        every: i64,
        unit: FrequencyUnit,
    },
    Edit {
        id: TaskId,
        title: Option<String>,
        every: Option<i64>,
        unit: Option<FrequencyUnit>,
    },
    Delete {
        id: TaskId,
    },
    Toggle {
        id: TaskId,
        date: NaiveDate,
        today: Option<NaiveDate>,
    },
    Reset,
    Export {
        path: Option<PathBuf>,
    },
    Import {
        path: PathBuf,
    },
}

pub fn cli() -> Command {
    Command::new("routine")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Track recurring routines and mark them done")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("list")
                .about("Show the seven-day window for every routine")
                .arg(today_arg()),
        )
        .subcommand(
            Command::new("add")
                .about("Add a routine")
                .arg(Arg::new("title").required(true).index(1))
                .arg(every_arg().default_value("1"))
                .arg(unit_arg().default_value("day")),
        )
        .subcommand(
            Command::new("edit")
                .about("Change a routine's title or frequency")
                .arg(id_arg())
                .arg(Arg::new("title").long("title").value_name("TITLE"))
                .arg(every_arg())
                .arg(unit_arg()),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a routine and cancel its reminders")
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("toggle")
                .about("Mark or unmark a date as done")
                .arg(id_arg())
                .arg(
                    Arg::new("date")
                        .required(true)
                        .index(2)
                        .value_name("YYYY-MM-DD")
                        .value_parser(parse_date),
                )
                .arg(today_arg()),
        )
        .subcommand(Command::new("reset").about("Delete every routine and reminder"))
        .subcommand(
            Command::new("export")
                .about("Write all routines as JSON (stdout when no path is given)")
                .arg(Arg::new("path").index(1).value_parser(value_parser!(PathBuf))),
        )
        .subcommand(
            Command::new("import")
                .about("Replace all routines with a previously exported JSON file")
                .arg(
                    Arg::new("path")
                        .required(true)
                        .index(1)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
}

fn id_arg() -> Arg {
    Arg::new("id").required(true).index(1).value_name("TASK_ID")
}

fn today_arg() -> Arg {
    Arg::new("today")
        .long("today")
        .value_name("YYYY-MM-DD")
        .help("Pretend today is this date")
        .value_parser(parse_date)
}

fn every_arg() -> Arg {
    Arg::new("every")
        .long("every")
        .value_name("N")
        .value_parser(value_parser!(i64))
}

fn unit_arg() -> Arg {
    Arg::new("unit")
        .long("unit")
        .value_name("day|week|month")
        .value_parser(parse_unit)
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD: {err}"))
}

fn parse_unit(value: &str) -> Result<FrequencyUnit, String> {
    value.parse().map_err(|err: routine_core::RoutineError| err.to_string())
}

impl Action {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let (name, sub) = matches
            .subcommand()
            .ok_or_else(|| anyhow!("no command given"))?;
        let id = || -> Result<TaskId> {
            sub.get_one::<String>("id")
                .map(|id| TaskId::from(id.as_str()))
                .ok_or_else(|| anyhow!("missing task id"))
        };
        let today = sub
            .try_get_one::<NaiveDate>("today")
            .ok()
            .flatten()
            .copied();

        let action = match name {
            "list" => Action::List { today },
            "add" => Action::Add {
                title: sub
                    .get_one::<String>("title")
                    .cloned()
                    .ok_or_else(|| anyhow!("missing title"))?,
                every: sub.get_one::<i64>("every").copied().unwrap_or(1),
                unit: sub
                    .get_one::<FrequencyUnit>("unit")
                    .copied()
                    .unwrap_or(FrequencyUnit::Day),
            },
            "edit" => Action::Edit {
                id: id()?,
                title: sub.get_one::<String>("title").cloned(),
                every: sub.get_one::<i64>("every").copied(),
                unit: sub.get_one::<FrequencyUnit>("unit").copied(),
            },
            "delete" => Action::Delete { id: id()? },
            "toggle" => Action::Toggle {
                id: id()?,
                date: sub
                    .get_one::<NaiveDate>("date")
                    .copied()
                    .ok_or_else(|| anyhow!("missing date"))?,
                today,
            },
            "reset" => Action::Reset,
            "export" => Action::Export {
                path: sub.get_one::<PathBuf>("path").cloned(),
            },
            "import" => Action::Import {
                path: sub
                    .get_one::<PathBuf>("path")
                    .cloned()
                    .ok_or_else(|| anyhow!("missing import path"))?,
            },
            other => return Err(anyhow!("unknown command `{other}`")),
        };
        Ok(action)
    }
}

/// Executes one action against the configured store and returns the text
/// to print. `now` is the caller's local wall-clock time.
pub fn run(config: &AppConfig, action: Action, now: NaiveDateTime) -> Result<String> {
    let service = config.open_service()?;
    info!(?action, "running command");

    match action {
        Action::List { today } => {
            let board = service.board(today.unwrap_or(now.date()))?;
            Ok(render_board(&board))
        }
        Action::Add { title, every, unit } => {
            let frequency = Frequency::new(unit, every)?;
            let task = service.add_task(&title, frequency, now)?;
            Ok(format!(
                "Added \"{}\" ({}) with id {}",
                task.title(),
                frequency,
                task.id()
            ))
        }
        Action::Edit {
            id,
            title,
            every,
            unit,
        } => {
            let current = service.task(&id)?;
            let frequency = if every.is_some() || unit.is_some() {
                let existing = current.frequency();
                Some(Frequency::new(
                    unit.unwrap_or(existing.unit()),
                    every.unwrap_or(i64::from(existing.count())),
                )?)
            } else {
                None
            };
            let task = service.edit_task(&id, title.as_deref(), frequency, now)?;
            Ok(format!("Updated \"{}\" ({})", task.title(), task.frequency()))
        }
        Action::Delete { id } => {
            let removed = service.delete_task(&id)?;
            Ok(format!("Deleted \"{}\"", removed.title()))
        }
        Action::Toggle { id, date, today } => {
            let today = today.unwrap_or(now.date());
            let title = service.task(&id)?.title().to_string();
            let message = match service.toggle_completion(&id, date, today)? {
                ToggleOutcome::Added(day) => format!("Marked \"{title}\" done on {day}"),
                ToggleOutcome::Removed(day) => format!("Cleared \"{title}\" on {day}"),
                ToggleOutcome::Rejected => {
                    format!("{date} is in the future; \"{title}\" was left unchanged")
                }
            };
            Ok(message)
        }
        Action::Reset => {
            service.reset_all()?;
            Ok("All routines deleted".to_string())
        }
        Action::Export { path } => {
            let json = service.export_json()?;
            match path {
                Some(path) => {
                    fs::write(&path, &json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    Ok(format!(
                        "Exported {} routine(s) to {}",
                        service.tasks().len(),
                        path.display()
                    ))
                }
                None => Ok(json),
            }
        }
        Action::Import { path } => {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let count = service.import_json(&raw, now)?;
            Ok(format!("Imported {count} routine(s)"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 10)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn parse(args: &[&str]) -> Action {
        let matches = cli().try_get_matches_from(args.iter().copied()).unwrap();
        Action::from_matches(&matches).unwrap()
    }

    #[test]
    fn parses_add_with_defaults() {
        assert_eq!(
            parse(&["routine", "add", "Stretch"]),
            Action::Add {
                title: "Stretch".into(),
                every: 1,
                unit: FrequencyUnit::Day,
            }
        );
        assert_eq!(
            parse(&["routine", "add", "Laundry", "--every", "2", "--unit", "weeks"]),
            Action::Add {
                title: "Laundry".into(),
                every: 2,
                unit: FrequencyUnit::Week,
            }
        );
    }

    #[test]
    fn rejects_unknown_unit_and_bad_dates() {
        assert!(cli()
            .try_get_matches_from(["routine", "add", "X", "--unit", "year"])
            .is_err());
        assert!(cli()
            .try_get_matches_from(["routine", "toggle", "id", "10/06/2024"])
            .is_err());
    }

    #[test]
    fn add_toggle_and_list_through_the_store() {
        let temp = tempdir().unwrap();
        let config = AppConfig::with_store_path(temp.path().join("store.json"));

        let added = run(
            &config,
            Action::Add {
                title: "Floss".into(),
                every: 1,
                unit: FrequencyUnit::Day,
            },
            now(),
        )
        .unwrap();
        assert!(added.starts_with("Added \"Floss\" (Daily)"));

        let service = config.open_service().unwrap();
        let id = service.tasks()[0].id().clone();
        drop(service);

        let today = now().date();
        let marked = run(
            &config,
            Action::Toggle {
                id: id.clone(),
                date: today,
                today: None,
            },
            now(),
        )
        .unwrap();
        assert!(marked.contains("done on 2024-06-10"));

        let future = NaiveDate::from_ymd_opt(2024, 6, 11).unwrap();
        let rejected = run(
            &config,
            Action::Toggle {
                id,
                date: future,
                today: None,
            },
            now(),
        )
        .unwrap();
        assert!(rejected.contains("left unchanged"));

        let board = run(&config, Action::List { today: None }, now()).unwrap();
        assert!(board.contains("   ×   ×   ×   ×   ✓   ·   ·"));
    }

    #[test]
    fn edit_keeps_unit_when_only_count_changes() {
        let temp = tempdir().unwrap();
        let config = AppConfig::with_store_path(temp.path().join("store.json"));
        run(
            &config,
            Action::Add {
                title: "Review".into(),
                every: 1,
                unit: FrequencyUnit::Week,
            },
            now(),
        )
        .unwrap();
        let id = config.open_service().unwrap().tasks()[0].id().clone();

        let edited = run(
            &config,
            Action::Edit {
                id,
                title: None,
                every: Some(3),
                unit: None,
            },
            now(),
        )
        .unwrap();
        assert_eq!(edited, "Updated \"Review\" (Every 3 weeks)");
    }
}
