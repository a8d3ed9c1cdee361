use std::io::{self, Write};

use serde::Serialize;

use crate::twarn;

/// Where the tracker shows its label.
///
/// The daemon sets the tooltip once, the label once per successful tick, and
/// calls `quit` after the final flush. Quit requests flow the other way
/// through the daemon's shutdown channel.
pub trait TrayPresenter: Send {
    fn set_label(&mut self, label: &str);
    fn set_tooltip(&mut self, tooltip: &str);
    fn quit(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// One plain label per line.
    Plain,
    /// One waybar-style JSON object per line.
    Json,
    /// Nothing on stdout; the label is only reachable through `info`.
    Silent,
}

#[derive(Debug, Serialize)]
struct StatusLine<'a> {
    text: &'a str,
    tooltip: &'a str,
    class: &'a str,
}

/// Status-line indicator for bars that read a child's stdout
/// (waybar `custom` modules, i3blocks, polybar `tail`).
///
/// Only label changes are written.
pub struct StatusLinePresenter<W: Write + Send> {
    out: W,
    mode: OutputMode,
    tooltip: String,
    last_label: Option<String>,
}

impl StatusLinePresenter<io::Stdout> {
    pub fn stdout(mode: OutputMode) -> Self {
        Self::new(io::stdout(), mode)
    }
}

impl<W: Write + Send> StatusLinePresenter<W> {
    pub fn new(out: W, mode: OutputMode) -> Self {
        Self {
            out,
            mode,
            tooltip: String::new(),
            last_label: None,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, label: &str, class: &str) {
        let line = match self.mode {
            OutputMode::Silent => return,
            OutputMode::Plain => label.to_string(),
            OutputMode::Json => {
                let status = StatusLine {
                    text: label,
                    tooltip: &self.tooltip,
                    class,
                };
                match serde_json::to_string(&status) {
                    Ok(s) => s,
                    Err(e) => {
                        twarn!("Tray", "failed to encode status line: {e}");
                        return;
                    }
                }
            }
        };

        if let Err(e) = writeln!(self.out, "{line}").and_then(|_| self.out.flush()) {
            twarn!("Tray", "failed to write status line: {e}");
        }
    }
}

impl<W: Write + Send> TrayPresenter for StatusLinePresenter<W> {
    fn set_label(&mut self, label: &str) {
        if self.last_label.as_deref() == Some(label) {
            return;
        }
        self.emit(label, "active-time");
        self.last_label = Some(label.to_string());
    }

    fn set_tooltip(&mut self, tooltip: &str) {
        self.tooltip = tooltip.to_string();
    }

    fn quit(&mut self) {
        // leave the bar with the last known label, marked stopped
        if let Some(label) = self.last_label.take() {
            if self.mode == OutputMode::Json {
                self.emit(&label, "stopped");
            }
        }
        let _ = self.out.flush();
    }
}
