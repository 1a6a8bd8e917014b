//! Interactive single-screen session on the terminal.
//!
//! Commands are read line by line from stdin. Picture loads run on their own
//! task and report back through a channel, so the prompt stays usable while
//! a file is read. Only the most recent load is applied.

use crate::cli::filter_table;
use anyhow::Result;
use filter_session::{FilterKind, FilterSession, LoadOutcome, LoadTicket, Slot};
use log::{debug, warn};
use std::io::Write;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};

const HELP: &str = "\
open <path>            load a picture
filters                list the filters
filter <index|name>    change the filter
set <slot> <value>     move a slider (intensity, radius, scale)
status                 show the screen state
share                  export the filtered picture
help                   show this help
quit                   leave";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Open(String),
    Filters,
    Filter(FilterKind),
    Set(Slot, f32),
    Status,
    Share,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Command>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };

        let command = match name.to_ascii_lowercase().as_str() {
            "open" | "o" if !rest.is_empty() => Command::Open(rest.to_string()),
            "open" | "o" => return Err("usage: open <path>".to_string()),
            "filters" | "ls" => Command::Filters,
            "filter" | "f" if !rest.is_empty() => Command::Filter(rest.parse()?),
            "filter" | "f" => return Err("usage: filter <index|name>".to_string()),
            "set" | "s" => {
                let (slot, value) = rest
                    .split_once(char::is_whitespace)
                    .ok_or_else(|| "usage: set <slot> <value>".to_string())?;
                let value = value
                    .trim()
                    .parse::<f32>()
                    .map_err(|e| format!("bad value `{}`: {e}", value.trim()))?;
                Command::Set(slot.parse()?, value)
            }
            "status" => Command::Status,
            "share" => Command::Share,
            "help" | "h" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            _ => return Err(format!("unknown command `{name}`, try `help`")),
        };

        Ok(Some(command))
    }
}

/// Result of a load task
type Loaded = (LoadTicket, String, Option<Vec<u8>>);

pub async fn run(mut session: FilterSession) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Loaded>();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Instafilter, type `help` for commands");
    println!("{}", status(&session));

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };

                match Command::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => handle(&mut session, command, &tx),
                    Ok(None) => (),
                    Err(e) => println!("{e}"),
                }
            }
            Some((ticket, selection, bytes)) = rx.recv() => {
                println!();
                println!("{}", finish_load(&mut session, ticket, &selection, bytes));
            }
        }
    }

    if let Err(e) = session.flush() {
        warn!("save usage count failed: {e}");
    }

    Ok(())
}

fn handle(session: &mut FilterSession, command: Command, tx: &mpsc::UnboundedSender<Loaded>) {
    match command {
        Command::Open(path) => {
            let ticket = session.begin_selection();
            let source = session.image_source();
            let tx = tx.clone();

            debug!("load {path} as {ticket:?}");
            tokio::spawn(async move {
                let bytes = source.fetch(&path).await;
                _ = tx.send((ticket, path, bytes));
            });
        }
        Command::Filters => println!("{}", filter_table()),
        command => println!("{}", apply(session, command)),
    }
}

/// Runs a synchronous command and returns what to show.
pub fn apply(session: &mut FilterSession, command: Command) -> String {
    match command {
        Command::Filter(kind) => {
            if !session.can_change_filter() {
                return "load a picture first".to_string();
            }

            session.change_filter(kind);
            status(session)
        }
        Command::Set(slot, value) => {
            if !session.slot_visible(slot) {
                return format!("{} has no {slot}", session.active_filter());
            }
            if !session.slot_enabled(slot) {
                return "load a picture first".to_string();
            }

            session.set_parameter(slot, value);
            format!("{slot} = {}", session.parameters().get(slot))
        }
        Command::Status => status(session),
        Command::Share => match session.share() {
            Ok(handle) => format!("shared to {}", handle.location),
            Err(e) => e.to_string(),
        },
        Command::Help => HELP.to_string(),
        Command::Open(_) | Command::Filters | Command::Quit => String::new(),
    }
}

pub fn finish_load(
    session: &mut FilterSession,
    ticket: LoadTicket,
    selection: &str,
    bytes: Option<Vec<u8>>,
) -> String {
    match session.finish_selection(ticket, bytes) {
        LoadOutcome::Applied => status(session),
        LoadOutcome::Empty | LoadOutcome::Undecodable => {
            format!("could not load {selection}")
        }
        LoadOutcome::Stale => {
            debug!("{selection} superseded by a newer selection");
            String::new()
        }
    }
}

/// Text rendition of the screen: picture or placeholder, sliders, buttons.
pub fn status(session: &FilterSession) -> String {
    let mut lines = Vec::new();

    match (session.rendered(), session.placeholder()) {
        (Some(image), _) => lines.push(format!("picture: {}x{}", image.width(), image.height())),
        (None, Some(placeholder)) => {
            lines.push(format!("{} ({})", placeholder.title, placeholder.description))
        }
        (None, None) => (),
    }

    lines.push(format!("filter: {}", session.active_filter()));

    for slot in Slot::ALL {
        if !session.slot_visible(slot) {
            continue;
        }

        let state = if session.slot_enabled(slot) {
            ""
        } else {
            " (disabled)"
        };
        lines.push(format!(
            "  {slot}: {}{state}",
            session.parameters().get(slot)
        ));
    }

    if session.can_share() {
        lines.push("share: ready".to_string());
    }

    lines.join("\n")
}
