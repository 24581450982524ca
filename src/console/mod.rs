pub mod print;

use std::io::{self, BufRead, Write};
use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::runtime::{Handle, RuntimeFlavor};

use crate::view::{Control, MemorySurface, Slot, Surface};

pub struct ConsoleSurface {
    page: MemorySurface,
    assume_yes: bool,
    spinner: Option<(Control, ProgressBar)>,
}

impl ConsoleSurface {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            page: MemorySurface::new(),
            assume_yes,
            spinner: None,
        }
    }

    pub fn page(&self) -> &MemorySurface {
        &self.page
    }

    fn start_spinner(&mut self, control: Control, label: &str) {
        let pb = ProgressBar::new_spinner();
        pb.set_draw_target(ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg} [{elapsed}]") {
            pb.set_style(style);
        }
        pb.set_message(label.to_string());
        pb.enable_steady_tick(Duration::from_millis(120));
        self.spinner = Some((control, pb));
    }

    fn stop_spinner(&mut self) {
        if let Some((_, pb)) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }
}

impl Surface for ConsoleSurface {
    fn set_html(&mut self, slot: Slot, html: String) {
        self.page.set_html(slot, html);
    }

    fn set_visible(&mut self, slot: Slot, visible: bool) {
        self.page.set_visible(slot, visible);
    }

    fn set_control(&mut self, control: Control, enabled: bool, label: &str) {
        self.page.set_control(control, enabled, label);
        if !enabled {
            self.stop_spinner();
            self.start_spinner(control, label);
        } else if matches!(self.spinner, Some((busy, _)) if busy == control) {
            self.stop_spinner();
        }
    }

    fn show_control(&mut self, control: Control, visible: bool) {
        self.page.show_control(control, visible);
    }

    fn alert(&mut self, message: &str) {
        self.page.alert(message);
        self.stop_spinner();
        eprintln!("{} {}", "::".bold().yellow(), message);
    }

    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            self.page.answer_next_confirm(true);
            return self.page.confirm(message);
        }
        self.stop_spinner();
        eprint!("{} {} [y/N] ", "::".bold().yellow(), message);
        let _ = io::stderr().flush();
        let answer = read_answer();
        self.page.answer_next_confirm(answer);
        self.page.confirm(message)
    }
}

fn is_yes(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

// Blocks the calling worker; other tasks move to the remaining workers.
fn read_answer() -> bool {
    let read = || {
        let mut line = String::new();
        io::stdin()
            .lock()
            .read_line(&mut line)
            .map(|_| is_yes(&line))
            .unwrap_or(false)
    };
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(read)
        }
        _ => read(),
    }
}

impl Drop for ConsoleSurface {
    fn drop(&mut self) {
        self.stop_spinner();
    }
}
