//! @acp:module "Remind Command"
//! @acp:summary "Report urgent tags and overdue dated TODOs"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::Result;
use chrono::Local;
use console::style;

use crate::config::Config;
use crate::lifecycle::{reminders, Reminder, ReminderReason};

use super::index::load_index;

/// Options for the remind command
#[derive(Debug, Clone)]
pub struct RemindOptions {
    pub root: PathBuf,
    pub from: Option<PathBuf>,
    /// Report even when reminders are disabled in config
    pub force: bool,
    /// Keep reporting every `reminder_interval_minutes`
    pub repeat: bool,
    pub json: bool,
}

/// Execute the remind command
pub fn execute_remind(options: RemindOptions, config: Config) -> Result<()> {
    if !config.enable_reminders && !options.force {
        println!(
            "{} Reminders are disabled; set enable_reminders or pass --force",
            style("•").dim()
        );
        return Ok(());
    }

    loop {
        let index = load_index(&options.root, options.from.as_deref(), &config)?;
        let due = reminders(&index, config.reminder_days_threshold, Local::now().date_naive());
        report(&due, options.json)?;

        if !options.repeat {
            return Ok(());
        }
        std::thread::sleep(config.reminder_interval());
    }
}

fn report(due: &[Reminder], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(due)?);
        return Ok(());
    }

    if due.is_empty() {
        println!("{} Nothing needs attention", style("✓").green());
        return Ok(());
    }

    println!(
        "{} {} comment(s) need attention",
        style("⚠").yellow(),
        due.len()
    );
    for reminder in due {
        let tag = &reminder.tag;
        let why = match reminder.reason {
            ReminderReason::Urgent => style("urgent".to_string()).red(),
            ReminderReason::Overdue { days, .. } => style(format!("{} days old", days)).yellow(),
        };
        let line: String = tag.full_line.trim().chars().take(100).collect();
        println!("  {}:{}  {}  {}", tag.file_path, tag.line + 1, why, line);
    }
    Ok(())
}
