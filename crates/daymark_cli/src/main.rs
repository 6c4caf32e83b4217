//! CLI smoke entry point.
//!
//! # Responsibility
//! - Exercise `daymark_core` wiring end to end: config, logging, storage,
//!   grid generation and store mutations.
//! - Keep output deterministic for quick local checks.

use clap::{Parser, Subcommand};
use daymark_core::grid::WEEK_DAYS;
use daymark_core::{
    init_logging, AnnotationDraft, AnnotationPatch, AnnotationStore, CalendarDate, CalendarGrid,
    CoreConfig, DateKey, JsonFileAdapter, MonthCursor, PersistenceAdapter, SqliteBlobAdapter,
    StorageBackend,
};
use log::warn;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];
const WEEKDAY_HEADER: &str = "Sun Mon Tue Wed Thu Fri Sat";

#[derive(Debug, Parser)]
#[command(name = "daymark", version, about = "Month calendar with day notes")]
struct Cli {
    /// Month to show, as YYYY-MM. Defaults to the current month.
    #[arg(long, value_parser = parse_month)]
    month: Option<MonthCursor>,
    /// Storage backend override (sqlite|file).
    #[arg(long, value_parser = parse_backend)]
    store: Option<StorageBackend>,
    /// Storage file override.
    #[arg(long)]
    path: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the month grid (default).
    Show,
    /// Replace the note of a day, keeping its links and photos.
    Note {
        #[arg(value_parser = parse_date)]
        date: CalendarDate,
        text: String,
    },
    /// Append a link to a day.
    Link {
        #[arg(value_parser = parse_date)]
        date: CalendarDate,
        url: String,
    },
    /// Remove everything stored for a day.
    Clear {
        #[arg(value_parser = parse_date)]
        date: CalendarDate,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("daymark: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = CoreConfig::load()?;
    if let Some(backend) = cli.store {
        config.storage_backend = backend;
    }

    if let Err(err) = init_logging(config.log_level, &config.log_dir()) {
        eprintln!("daymark: logging disabled: {err}");
    }

    let adapter: Box<dyn PersistenceAdapter> = match cli.path {
        Some(path) => match config.storage_backend {
            StorageBackend::Sqlite => Box::new(SqliteBlobAdapter::open(
                path,
                config.storage_key.clone(),
            )?),
            StorageBackend::File => Box::new(JsonFileAdapter::new(path)),
        },
        None => config.open_adapter()?,
    };
    let mut store = AnnotationStore::load_or_empty(adapter)?;

    let mut cursor = cli.month.unwrap_or_else(MonthCursor::today);
    match cli.command.unwrap_or(Command::Show) {
        Command::Show => {}
        Command::Note { date, text } => {
            store.merge(date, AnnotationPatch::note(text))?;
            cursor = MonthCursor::containing(date);
        }
        Command::Link { date, url } => {
            let mut draft = AnnotationDraft::from_annotation(store.get(&date));
            draft.add_link(&url)?;
            store.set(date, draft.build())?;
            cursor = MonthCursor::containing(date);
        }
        Command::Clear { date } => {
            if !store.clear(&date)? {
                warn!("event=cli_clear module=cli status=noop key={}", date.key());
            }
            cursor = MonthCursor::containing(date);
        }
    }

    print_month(&store, &cursor.grid()?);
    Ok(())
}

fn print_month<A: PersistenceAdapter>(store: &AnnotationStore<A>, grid: &CalendarGrid) {
    let name = MONTH_NAMES[(grid.month() - 1) as usize];
    println!("{name} {}", grid.year());
    println!("{WEEKDAY_HEADER}");

    let indicators = store.indicators(grid);
    for (row, week) in grid.weeks().enumerate() {
        let line = week
            .iter()
            .enumerate()
            .map(|(col, slot)| match slot {
                Some(date) => {
                    let marker = if indicators[row * WEEK_DAYS + col] { '*' } else { ' ' };
                    format!("{:>2}{marker}", date.day())
                }
                None => "   ".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ");
        println!("{}", line.trim_end());
    }

    for date in grid.days() {
        if let Some(summary) = store.summary(&date).filter(|s| s.has_content) {
            println!(
                "{}  {}  links={} photos={}",
                date.key(),
                summary.note_preview.unwrap_or_default(),
                summary.link_count,
                summary.photo_count
            );
        }
    }
}

fn parse_month(raw: &str) -> Result<MonthCursor, String> {
    let (year, month) = raw
        .rsplit_once('-')
        .ok_or_else(|| format!("expected YYYY-MM, got `{raw}`"))?;
    let year: i32 = year.parse().map_err(|_| format!("invalid year in `{raw}`"))?;
    let month: u32 = month.parse().map_err(|_| format!("invalid month in `{raw}`"))?;
    MonthCursor::new(year, month).map_err(|err| err.to_string())
}

fn parse_backend(raw: &str) -> Result<StorageBackend, String> {
    raw.parse().map_err(|err: daymark_core::ConfigError| err.to_string())
}

fn parse_date(raw: &str) -> Result<CalendarDate, String> {
    DateKey::parse(raw)
        .map(|key| key.date())
        .map_err(|err| err.to_string())
}
