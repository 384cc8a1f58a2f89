use clap::Subcommand;
use focusflow_core::{DailySummary, Database};

#[derive(Subcommand)]
pub enum SummaryAction {
    /// Today's focus time and completed sessions
    Today {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Recent days, newest first
    History {
        /// Number of days to show
        #[arg(long, default_value = "7")]
        days: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear today's totals
    Reset,
}

fn print_line(summary: &DailySummary) {
    println!(
        "{}  {:>7}  {} session(s)",
        summary.date,
        summary.format_focus(),
        summary.completed_focus_sessions
    );
}

pub fn run(action: SummaryAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        SummaryAction::Today { json } => {
            let summary = db.summary_today()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_line(&summary);
            }
        }
        SummaryAction::History { days, json } => {
            let history = db.summary_history(days)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&history)?);
            } else if history.is_empty() {
                println!("no focus time recorded yet");
            } else {
                for summary in &history {
                    print_line(summary);
                }
            }
        }
        SummaryAction::Reset => {
            db.reset_today()?;
            println!("today's summary cleared");
        }
    }
    Ok(())
}
