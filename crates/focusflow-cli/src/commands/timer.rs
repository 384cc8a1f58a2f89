use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use clap::Subcommand;
use focusflow_core::notification::ParseActionError;
use focusflow_core::timer::registry;
use focusflow_core::{
    Config, Database, Event, Notification, NotificationAction, Notifier, NotifyError,
    SessionService, TimerControl, TimerEngine, TimerSnapshot,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run an interactive timer session (commands are read from stdin)
    Run,
    /// Print the configured starting state as JSON
    Status,
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Run => run_session(),
        TimerAction::Status => {
            let config = Config::load()?;
            let snapshot = TimerSnapshot::initial(&config.timer_config());
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
            Ok(())
        }
    }
}

/// Writes the ongoing notification as a single refreshing line on stderr.
struct TerminalNotifier {
    bell: bool,
    last_title: Option<String>,
}

impl Notifier for TerminalNotifier {
    fn notify(&mut self, notification: &Notification) -> Result<(), NotifyError> {
        let mut err = std::io::stderr().lock();
        let phase_changed = self
            .last_title
            .as_deref()
            .is_some_and(|t| t != notification.title);
        if phase_changed && self.bell {
            write!(err, "\x07")?;
        }
        write!(err, "\r\x1b[2K{}", notification.line())?;
        err.flush()?;
        self.last_title = Some(notification.title.clone());
        Ok(())
    }
}

enum Command {
    Action(NotificationAction),
    /// Change a setting and push the timer part into the running engine.
    Set { key: String, value: String },
    /// Start over at Focus with the counters zeroed.
    Restart,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let head = words.next().unwrap_or_default().to_ascii_lowercase();
    match head.as_str() {
        "quit" | "q" | "exit" => Ok(Command::Quit),
        "restart" => Ok(Command::Restart),
        "set" => {
            let key = words.next().ok_or("usage: set <key> <value>")?;
            let value = words.collect::<Vec<_>>().join(" ");
            if value.is_empty() {
                return Err("usage: set <key> <value>".into());
            }
            Ok(Command::Set {
                key: key.to_string(),
                value,
            })
        }
        other => other
            .parse()
            .map(Command::Action)
            .map_err(|e: ParseActionError| e.to_string()),
    }
}

/// Update, save and apply one setting. Returns the stored value.
fn apply_setting(
    config: &mut Config,
    engine: &TimerEngine,
    key: &str,
    value: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut updated = config.clone();
    updated.set(key, value)?;
    updated.save()?;
    engine.set_config(updated.timer_config());
    let stored = updated.get(key).unwrap_or_default();
    *config = updated;
    Ok(stored)
}

fn run_session() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let result = runtime.block_on(session(config, db));
    // A pending stdin read would otherwise keep the runtime alive.
    runtime.shutdown_timeout(Duration::from_millis(100));
    result
}

async fn session(mut config: Config, db: Database) -> Result<(), Box<dyn std::error::Error>> {
    let engine = Arc::new(TimerEngine::new(config.timer_config()));
    let slot = registry::global();
    slot.install(&engine);

    let mut service = SessionService::from_slot(slot)
        .ok_or("timer engine is not registered")?
        .with_summary_sink(db);
    if config.notifications.enabled {
        service = service.with_notifier(TerminalNotifier {
            bell: config.notifications.sound_enabled,
            last_title: None,
        });
    }

    let cancel = CancellationToken::new();
    let service_task = tokio::spawn(service.run(cancel.child_token()));
    let mut events = engine.subscribe_events();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!("commands: start, pause, reset, skip, restart, set <key> <value>, quit");
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Action(action)) => action.apply(&*engine),
                    Ok(Command::Restart) => {
                        engine.full_reset();
                        println!("timer restarted");
                    }
                    Ok(Command::Set { key, value }) => {
                        match apply_setting(&mut config, &engine, &key, &value) {
                            Ok(stored) => {
                                let state = engine.state();
                                println!(
                                    "{key} = {stored} ({} {})",
                                    state.phase.title(),
                                    state.format_remaining()
                                );
                            }
                            Err(e) => eprintln!("\nerror: {e}"),
                        }
                    }
                    Err(e) => eprintln!("\n{e}"),
                }
            }
            event = events.recv() => match event {
                Ok(event @ Event::PhaseCompleted { .. }) => {
                    println!("{}", serde_json::to_string(&event)?);
                }
                Ok(_) => {}
                Err(RecvError::Lagged(n)) => tracing::warn!(skipped = n, "event stream lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    }

    engine.pause();
    cancel.cancel();
    slot.clear();
    let report = service_task.await?;
    let state = engine.state();
    eprintln!();
    tracing::info!(?report, "session ended");
    println!(
        "session ended: {} pomodoro(s) completed",
        state.completed_pomodoros
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quit_and_actions() {
        assert!(matches!(parse_command(" Quit "), Ok(Command::Quit)));
        assert!(matches!(parse_command("q"), Ok(Command::Quit)));
        assert!(matches!(
            parse_command("skip"),
            Ok(Command::Action(NotificationAction::Skip))
        ));
        assert!(parse_command("launch").is_err());
        assert!(matches!(parse_command("restart"), Ok(Command::Restart)));
    }

    #[test]
    fn parses_set_with_key_and_value() {
        match parse_command("set  timer.focus_minutes 50") {
            Ok(Command::Set { key, value }) => {
                assert_eq!(key, "timer.focus_minutes");
                assert_eq!(value, "50");
            }
            _ => panic!("expected a set command"),
        }
        assert!(parse_command("set timer.focus_minutes").is_err());
        assert!(parse_command("set").is_err());
    }
}
