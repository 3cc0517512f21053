//! Line-driven front end for the event loop.
//!
//! Each stdin line is one UI input. Everything the app emits is printed to
//! stdout as one JSON object per line: `{"event": ...}` for transitions and
//! `{"snapshot": ...}` for `status`. Confirmation prompts go to stderr and
//! are answered with `yes` / `no`.

use clap::{Args, ValueEnum};
use reelfeed_core::{
    Action, App, ConfirmDialog, Config, Decision, Event, PagingMode, Route, ScrollPhase, Snapshot,
    ViewToken,
};
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

const HELP: &str = "\
commands:
  scroll drag|momentum <offset>   end of a scroll gesture (snap mode)
  view <index>:<pct> ...          visible rows (native mode)
  resize <height>                 viewport height changed
  redeem <index>                  tap redeem on a reel
  yes | no                        answer the confirmation prompt
  dismiss                         dismiss the lost-code notice
  tab map|reels|leaderboard       switch tab
  status                          print the current snapshot
  quit                            stop";

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Snap,
    Native,
}

impl From<ModeArg> for PagingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Snap => PagingMode::Snap,
            ModeArg::Native => PagingMode::Native,
        }
    }
}

#[derive(Args)]
pub struct RunArgs {
    /// Override the configured paging mode
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,
    /// Override the configured session length in seconds
    #[arg(long)]
    session_secs: Option<u32>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Output<'a> {
    Event(&'a Event),
    Snapshot(&'a Snapshot),
}

#[derive(Debug, PartialEq)]
enum Line {
    Send(Action),
    Status,
    Help,
    Quit,
    Empty,
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    if let Some(mode) = args.mode {
        config.feed.mode = mode.into();
    }
    if let Some(secs) = args.session_secs {
        config.redemption.session_length_secs = secs;
    }
    config.validate()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(interactive(config))
}

async fn interactive(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let (app, handle) = App::from_config(&config)?;
    let mut events = handle.subscribe();
    let app_task = tokio::spawn(app.run());
    tracing::info!(mode = ?config.feed.mode, "feed ready, type 'help' for commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_line(&line) {
                    Ok(Line::Send(action)) => handle.dispatch(action)?,
                    Ok(Line::Status) => print(&Output::Snapshot(&handle.fetch().await?))?,
                    Ok(Line::Help) => eprintln!("{HELP}"),
                    Ok(Line::Quit) => break,
                    Ok(Line::Empty) => {}
                    Err(msg) => eprintln!("error: {msg}"),
                }
            }
            event = events.recv() => match event {
                Ok(event) => show(&event)?,
                Err(RecvError::Lagged(skipped)) => tracing::warn!(skipped, "event output fell behind"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    // Already stopped if the loop ended on its own.
    let _ = handle.shutdown();
    app_task.await?;
    while let Ok(event) = events.try_recv() {
        show(&event)?;
    }
    Ok(())
}

fn show(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    if let Event::ConfirmationRequested { dialog, .. } = event {
        prompt(dialog);
    }
    print(&Output::Event(event))
}

fn prompt(dialog: &ConfirmDialog) {
    match dialog {
        ConfirmDialog::Alert {
            title,
            message,
            cancel_label,
            confirm_label,
        } => eprintln!("{title}\n{message}\n[no = {cancel_label}, yes = {confirm_label}]"),
        ConfirmDialog::Inline { message } => eprintln!("{message} [yes/no]"),
    }
}

fn print(output: &Output<'_>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string(output)?);
    Ok(())
}

fn parse_line(line: &str) -> Result<Line, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Line::Empty);
    };
    let args: Vec<&str> = words.collect();

    let line = match (command.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("scroll", [phase, offset]) => {
            let phase = match *phase {
                "drag" => ScrollPhase::Drag,
                "momentum" => ScrollPhase::Momentum,
                other => return Err(format!("unknown scroll phase: {other}")),
            };
            Line::Send(Action::ScrollEnd {
                phase,
                offset: parse_num(offset)?,
            })
        }
        ("view", tokens) if !tokens.is_empty() => Line::Send(Action::ViewableItemsChanged {
            tokens: tokens.iter().map(|t| parse_token(t)).collect::<Result<_, _>>()?,
        }),
        ("resize", [height]) => Line::Send(Action::Resize {
            page_height: parse_num(height)?,
        }),
        ("redeem", [index]) => Line::Send(Action::RequestRedeem {
            item_index: parse_num(index)?,
        }),
        ("yes" | "y" | "confirm", []) => Line::Send(Action::Decide {
            decision: Decision::Confirm,
        }),
        ("no" | "n" | "cancel", []) => Line::Send(Action::Decide {
            decision: Decision::Cancel,
        }),
        ("dismiss", []) => Line::Send(Action::DismissLost),
        ("tab", [route]) => Line::Send(Action::Navigate {
            route: route.parse::<Route>()?,
        }),
        ("status", []) => Line::Status,
        ("help" | "?", []) => Line::Help,
        ("quit" | "exit", []) => Line::Quit,
        (other, _) => return Err(format!("cannot parse '{other}' with {} argument(s), try 'help'", args.len())),
    };
    Ok(line)
}

fn parse_num<T: std::str::FromStr>(s: &str) -> Result<T, String> {
    s.parse().map_err(|_| format!("not a number: {s}"))
}

fn parse_token(s: &str) -> Result<ViewToken, String> {
    let (index, pct) = s
        .split_once(':')
        .ok_or_else(|| format!("expected <index>:<pct>, got {s}"))?;
    Ok(ViewToken::new(parse_num(index)?, parse_num(pct)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ui_inputs() {
        assert_eq!(
            parse_line("scroll drag 412.5"),
            Ok(Line::Send(Action::ScrollEnd {
                phase: ScrollPhase::Drag,
                offset: 412.5
            }))
        );
        assert_eq!(
            parse_line("redeem 2"),
            Ok(Line::Send(Action::RequestRedeem { item_index: 2 }))
        );
        assert_eq!(
            parse_line("TAB Leaderboard"),
            Ok(Line::Send(Action::Navigate {
                route: Route::Leaderboard
            }))
        );
        assert_eq!(
            parse_line("view 0:20 1:80"),
            Ok(Line::Send(Action::ViewableItemsChanged {
                tokens: vec![ViewToken::new(0, 20.0), ViewToken::new(1, 80.0)]
            }))
        );
        assert_eq!(parse_line("   "), Ok(Line::Empty));
        assert_eq!(parse_line("status"), Ok(Line::Status));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_line("scroll sideways 10").is_err());
        assert!(parse_line("redeem one").is_err());
        assert!(parse_line("view 1-80").is_err());
        assert!(parse_line("tab settings").is_err());
        assert!(parse_line("yes please").is_err());
    }
}
