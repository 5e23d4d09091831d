use std::io::{self, Write};

use anyhow::{Result, bail};
use eclipse_core::{EventReceiver, LaunchOutcome, LauncherEvent};

const BAR_WIDTH: u64 = 30;

/// Turns launcher events into terminal output. Status messages get their own
/// line; progress redraws a single line in place.
#[derive(Default)]
pub struct EventPrinter {
    progress_open: bool,
}

impl EventPrinter {
    pub fn print(&mut self, out: &mut impl Write, event: &LauncherEvent) -> io::Result<()> {
        match event {
            LauncherEvent::Status { message } => {
                self.close_progress(out)?;
                writeln!(out, "{message}")?;
            }
            LauncherEvent::Progress {
                percent,
                current,
                max,
            } => {
                let filled = (*percent).min(100) * BAR_WIDTH / 100;
                let bar = format!(
                    "{}{}",
                    "#".repeat(filled as usize),
                    "-".repeat((BAR_WIDTH - filled) as usize)
                );
                write!(out, "\r[{bar}] {percent:>3}% ({current}/{max})")?;
                out.flush()?;
                self.progress_open = true;
            }
            LauncherEvent::History { entries } => {
                tracing::debug!(entries = entries.len(), "launch history updated");
            }
            LauncherEvent::Finished { .. } => self.close_progress(out)?,
        }
        Ok(())
    }

    fn close_progress(&mut self, out: &mut impl Write) -> io::Result<()> {
        if self.progress_open {
            writeln!(out)?;
            self.progress_open = false;
        }
        Ok(())
    }
}

/// Prints events until the launch reports its outcome.
pub async fn follow(receiver: &mut EventReceiver) -> Result<LaunchOutcome> {
    let mut printer = EventPrinter::default();
    while let Some(event) = receiver.recv().await {
        printer.print(&mut io::stdout().lock(), &event)?;
        if let LauncherEvent::Finished { outcome } = event {
            return Ok(outcome);
        }
    }
    bail!("Launcher event channel closed before the launch finished")
}

/// Prints whatever is already queued without waiting for more.
pub fn drain(receiver: &mut EventReceiver) -> Result<()> {
    let mut printer = EventPrinter::default();
    let mut stdout = io::stdout().lock();
    while let Ok(event) = receiver.try_recv() {
        printer.print(&mut stdout, &event)?;
    }
    Ok(())
}
