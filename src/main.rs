use chrono::NaiveDate;
use std::path::PathBuf;

use daybook::config::DaybookConfig;
use daybook::core::clock::SystemClock;
use daybook::core::line::LineKind;
use daybook::daily::DailyNotes;
use daybook::store::{FsFolder, PathPicker, PermissionStore};

const USAGE: &str = "\
Usage: daybook [--debug] <command>

Commands:
  open <folder>       Use <folder> for daily notes and open today's note
  close               Forget the current folder
  today               Show today's note (default)
  list                List all daily notes, newest first
  show <YYYY-MM-DD>   Show the note for a date
  add <text...>       Add a task to today's note
  toggle <line>       Check or uncheck a task by line number
";

#[derive(Debug, PartialEq)]
enum Command {
    Open(PathBuf),
    Close,
    Today,
    List,
    Show(NaiveDate),
    Add(String),
    Toggle(usize),
    Help,
}

impl Command {
    fn parse(args: &[&str]) -> Result<Self, String> {
        let Some((&name, rest)) = args.split_first() else {
            return Ok(Self::Today);
        };
        match name {
            "open" => match rest {
                [path] => Ok(Self::Open(PathBuf::from(*path))),
                _ => Err("open takes exactly one folder".into()),
            },
            "close" => Ok(Self::Close),
            "today" => Ok(Self::Today),
            "list" => Ok(Self::List),
            "show" => match rest {
                [date] => NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .map(Self::Show)
                    .map_err(|e| format!("invalid date {}: {}", date, e)),
                _ => Err("show takes a date (YYYY-MM-DD)".into()),
            },
            "add" => Ok(Self::Add(rest.join(" "))),
            "toggle" => match rest {
                [line] => match line.parse::<usize>() {
                    Ok(n) if n > 0 => Ok(Self::Toggle(n - 1)),
                    _ => Err(format!("invalid line number {}", line)),
                },
                _ => Err("toggle takes a line number".into()),
            },
            "help" | "-h" | "--help" => Ok(Self::Help),
            other => Err(format!("unknown command {}", other)),
        }
    }
}

fn install_logger(config: &DaybookConfig, debug_flag: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Log to the systemd user journal (`journalctl --user -t daybook -f`).
    // Wrapper filters: daybook at info/debug, everything else at warn.
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("daybook") {
                let max = if daybook::debug_logging() {
                    log::LevelFilter::Debug
                } else {
                    log::LevelFilter::Info
                };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    let journal = systemd_journal_logger::JournalLog::new()?
        .with_syslog_identifier("daybook".to_string());

    daybook::set_debug_logging(config.debug_logging || debug_flag);

    log::set_boxed_logger(Box::new(FilteredJournal { inner: journal }))?;
    // Global max must be Debug so debug logs can pass through when toggled
    log::set_max_level(log::LevelFilter::Debug);
    Ok(())
}

fn print_note(notes: &DailyNotes<FsFolder, SystemClock>) {
    let Some(active) = notes.active() else {
        println!("No note selected.");
        return;
    };
    let (done, total) = active.document.progress();
    println!("== {} ({}/{} done)", active.entry.label(), done, total);
    for line in active.document.render() {
        let number = line.index + 1;
        match line.kind {
            LineKind::Todo => {
                let mark = if line.checked { "x" } else { " " };
                println!("{:>3}  [{}] {}", number, mark, line.text);
            }
            LineKind::Spacer => println!("{:>3}", number),
            LineKind::Markdown => println!("{:>3}      {}", number, line.text),
        }
    }
}

fn print_listing(notes: &DailyNotes<FsFolder, SystemClock>) {
    let Some(listing) = notes.listing() else {
        return;
    };
    let active = notes.active().map(|a| a.entry.name());
    for entry in listing.iter() {
        let marker = if Some(entry.name()) == active { "*" } else { " " };
        println!("{} {}", marker, entry.label());
    }
}

fn no_folder() -> bool {
    eprintln!("No folder selected. Choose one with `daybook open <folder>`.");
    false
}

async fn run(command: Command, notes: &mut DailyNotes<FsFolder, SystemClock>) -> bool {
    match command {
        Command::Help => {
            print!("{}", USAGE);
            true
        }
        Command::Open(path) => {
            if !notes.select_folder(&PathPicker::new(Some(path.clone()))).await {
                if notes.has_folder() {
                    eprintln!("Using {}, but could not open today's note.", path.display());
                } else {
                    eprintln!("Cannot use {} for notes.", path.display());
                }
                return false;
            }
            if let Some(folder) = notes.folder() {
                println!("Using {}", folder.root().display());
            }
            print_note(notes);
            true
        }
        Command::Close => {
            notes.close_folder().await;
            println!("Folder forgotten.");
            true
        }
        command => {
            let opened = notes.startup().await;
            if !notes.has_folder() {
                return no_folder();
            }
            let needs_today = !matches!(command, Command::List | Command::Show(_));
            if !opened && needs_today {
                eprintln!("Could not open today's note.");
                return false;
            }
            match command {
                Command::List => {
                    print_listing(notes);
                    true
                }
                Command::Show(date) => {
                    if !notes.open_date(date).await {
                        eprintln!("No note for {}.", date.format("%Y-%m-%d"));
                        return false;
                    }
                    print_note(notes);
                    true
                }
                Command::Add(text) => {
                    if !notes.add_task(&text).await {
                        eprintln!("Nothing added.");
                        return false;
                    }
                    print_note(notes);
                    true
                }
                Command::Toggle(index) => {
                    let outcome = notes.toggle(index).await;
                    if !outcome.changed() {
                        eprintln!("Line {} is not a task.", index + 1);
                        return false;
                    }
                    print_note(notes);
                    if outcome.should_celebrate() {
                        println!("\n  *** Nice work! ***");
                    }
                    true
                }
                _ => {
                    if notes.active().is_none() {
                        eprintln!("Could not open today's note.");
                        return false;
                    }
                    print_note(notes);
                    true
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = DaybookConfig::load();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let debug_flag = args.iter().any(|a| a == "--debug");
    install_logger(&config, debug_flag)?;

    let args: Vec<&str> = args
        .iter()
        .map(String::as_str)
        .filter(|a| *a != "--debug")
        .collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("daybook: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    let mut notes = DailyNotes::new(
        PermissionStore::new(config.state_path()),
        SystemClock,
        config.header_template.clone(),
    );

    if !run(command, &mut notes).await {
        std::process::exit(1);
    }
    Ok(())
}
