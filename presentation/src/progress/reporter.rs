//! Progress reporting for dispatches

use colored::Colorize;
use hotbox_application::DispatchProgress;
use hotbox_domain::{ModeKind, OrchestrationResult, Outcome, ProviderId};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Reports dispatch progress with a progress bar on stderr
pub struct ProgressReporter {
    multi: MultiProgress,
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bar: Mutex::new(None),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn mode_display_name(mode: ModeKind) -> &'static str {
        match mode {
            ModeKind::Single => "Asking",
            ModeKind::Fastest => "Racing",
            ModeKind::Consensus => "Collecting",
            ModeKind::Best => "Collecting candidates",
            ModeKind::Parallel => "Querying",
        }
    }

    fn outcome_line(outcome: &Outcome) -> String {
        match outcome {
            Outcome::Success { provider, latency, .. } => {
                format!("{} {} ({} ms)", "v".green(), provider, latency.as_millis())
            }
            Outcome::Failure { provider, error, .. } => {
                format!("{} {} ({})", "x".red(), provider, error)
            }
        }
    }

    fn replace_bar(&self, bar: ProgressBar) {
        if let Ok(mut slot) = self.bar.lock()
            && let Some(previous) = slot.replace(bar)
        {
            previous.finish_and_clear();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl DispatchProgress for ProgressReporter {
    fn on_dispatch_start(&self, mode: ModeKind, total_providers: usize) {
        let pb = self.multi.add(ProgressBar::new(total_providers as u64));
        pb.set_style(Self::bar_style());
        pb.set_prefix(Self::mode_display_name(mode));
        pb.set_message("waiting for providers...");
        pb.enable_steady_tick(Duration::from_millis(100));
        self.replace_bar(pb);
    }

    fn on_provider_complete(&self, outcome: &Outcome) {
        if let Ok(slot) = self.bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            pb.set_message(Self::outcome_line(outcome));
            pb.inc(1);
        }
    }

    fn on_arbiter_start(&self, arbiter: &ProviderId) {
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(Self::spinner_style());
        pb.set_prefix("Judging");
        pb.set_message(format!("{} is picking the best answer...", arbiter));
        pb.enable_steady_tick(Duration::from_millis(100));
        self.replace_bar(pb);
    }

    fn on_dispatch_complete(&self, _result: &OrchestrationResult) {
        if let Ok(mut slot) = self.bar.lock()
            && let Some(pb) = slot.take()
        {
            pb.finish_and_clear();
        }
    }
}

/// Simple line-based progress on stderr (no fancy UI)
pub struct SimpleProgress;

impl DispatchProgress for SimpleProgress {
    fn on_dispatch_start(&self, mode: ModeKind, total_providers: usize) {
        eprintln!(
            "{} {} ({} providers)",
            "->".cyan(),
            ProgressReporter::mode_display_name(mode).bold(),
            total_providers
        );
    }

    fn on_provider_complete(&self, outcome: &Outcome) {
        eprintln!("  {}", ProgressReporter::outcome_line(outcome));
    }

    fn on_arbiter_start(&self, arbiter: &ProviderId) {
        eprintln!("{} {} ({})", "->".cyan(), "Judging".bold(), arbiter);
    }
}
