//! Console output formatter for dispatch results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use hotbox_application::ProviderStatus;
use hotbox_domain::{ModeKind, OrchestrationResult, Outcome, ProviderId};
use std::time::Duration;

/// Total width used for side-by-side rendering
const SCREEN_WIDTH: usize = 120;
/// Narrowest column before falling back to stacked output
const MIN_COLUMN_WIDTH: usize = 24;

/// Formats dispatch results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete result
    pub fn format(result: &OrchestrationResult) -> String {
        let mut output = String::new();

        // Header
        output.push_str(&Self::header("Holly Hot Box"));
        output.push('\n');

        output.push_str(&format!("{} {}\n", "Prompt:".cyan().bold(), result.prompt));
        output.push_str(&format!(
            "{} {} ({})\n",
            "Mode:".cyan().bold(),
            result.mode,
            result
                .providers()
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));

        // Responses
        output.push_str(&Self::section_header("Responses"));
        match Self::column_width(result) {
            Some(width) => {
                output.push('\n');
                output.push_str(&Self::side_by_side(&result.outcomes, width));
            }
            None => {
                for outcome in &result.outcomes {
                    output.push_str(&Self::outcome_block(outcome));
                }
            }
        }

        // Arbiter verdict and selection (best mode)
        if let Some(arbiter) = &result.arbiter {
            output.push_str(&Self::section_header("Arbiter"));
            output.push_str(&Self::outcome_block(arbiter));
        }
        if result.mode == ModeKind::Best {
            output.push_str(&Self::section_header("Selected Answer"));
            match &result.selected {
                Some(selected) => output.push_str(&Self::outcome_block(selected)),
                None => output.push_str(&format!(
                    "\n{}\n",
                    "No provider succeeded, nothing to judge.".red()
                )),
            }
        }

        output.push_str(&format!("\n{}\n", Self::summary(result).dimmed()));
        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(result: &OrchestrationResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the answer only (concise output)
    pub fn format_answer_only(result: &OrchestrationResult) -> String {
        match result.answer() {
            Some(Outcome::Success { text, .. }) => format!("{}\n", text),
            Some(Outcome::Failure {
                provider,
                error,
                message,
                ..
            }) => format!(
                "{} {} [{}]: {}\n",
                "Error from".red().bold(),
                provider,
                error,
                message
            ),
            None => format!("{}\n", "No provider produced an answer.".red()),
        }
    }

    /// Format provider credential and live check status
    pub fn format_provider_statuses(statuses: &[ProviderStatus]) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", "Providers:".cyan().bold()));

        for status in statuses {
            let key = if status.has_credential {
                "key set".green()
            } else {
                "no key".red()
            };
            let live = match &status.outcome {
                None => String::new(),
                Some(Outcome::Success { latency, .. }) => {
                    format!("  {} ({} ms)", "responding".green(), latency.as_millis())
                }
                Some(Outcome::Failure { error, message, .. }) => {
                    format!("  {} [{}] {}", "failing".red(), error, message)
                }
            };
            output.push_str(&format!(
                "  {:<12} {:<18} {}{}\n",
                status.provider.as_str(),
                status.provider.display_name(),
                key,
                live
            ));
        }

        output
    }

    fn outcome_block(outcome: &Outcome) -> String {
        match outcome {
            Outcome::Success {
                provider,
                text,
                latency,
                tokens,
                ..
            } => format!(
                "\n{}\n{}\n",
                Self::title(provider, *latency, *tokens).yellow().bold(),
                text
            ),
            Outcome::Failure {
                provider,
                error,
                message,
                latency,
            } => format!(
                "\n{}\n{} {}\n",
                Self::title(provider, *latency, None).red().bold(),
                format!("Error [{}]:", error).red(),
                message
            ),
        }
    }

    fn title(provider: &ProviderId, latency: Duration, tokens: Option<u32>) -> String {
        let mut meta = format!("{} ms", latency.as_millis());
        if let Some(tokens) = tokens {
            meta.push_str(&format!(", {} tokens", tokens));
        }
        format!("── {} ({}) ──", provider.display_name(), meta)
    }

    fn summary(result: &OrchestrationResult) -> String {
        let mut summary = format!(
            "{} succeeded, {} failed",
            result.successes().count(),
            result.failures().count()
        );
        let tokens = result.total_tokens();
        if tokens > 0 {
            summary.push_str(&format!(", {} tokens", tokens));
        }
        summary
    }

    /// Column width for side-by-side output, when the result calls for it
    fn column_width(result: &OrchestrationResult) -> Option<usize> {
        let columns = result.outcomes.len();
        if result.mode != ModeKind::Parallel || columns < 2 {
            return None;
        }
        let width = SCREEN_WIDTH.saturating_sub(3 * (columns - 1)) / columns;
        (width >= MIN_COLUMN_WIDTH).then_some(width)
    }

    fn side_by_side(outcomes: &[Outcome], width: usize) -> String {
        let columns: Vec<(String, Vec<String>, bool)> = outcomes
            .iter()
            .map(|outcome| {
                let head = format!(
                    "{} ({} ms)",
                    outcome.provider(),
                    outcome.latency().as_millis()
                );
                let body = match outcome {
                    Outcome::Success { text, .. } => text.clone(),
                    Outcome::Failure { error, message, .. } => {
                        format!("Error [{}]: {}", error, message)
                    }
                };
                (head, Self::wrap(&body, width), outcome.is_success())
            })
            .collect();

        let mut output = String::new();

        let header = columns
            .iter()
            .map(|(head, _, ok)| {
                let cell = Self::pad(&head.chars().take(width).collect::<String>(), width);
                if *ok {
                    cell.yellow().bold().to_string()
                } else {
                    cell.red().bold().to_string()
                }
            })
            .collect::<Vec<_>>();
        output.push_str(&header.join(" │ "));
        output.push('\n');
        output.push_str(
            &columns
                .iter()
                .map(|_| "─".repeat(width))
                .collect::<Vec<_>>()
                .join("─┼─"),
        );
        output.push('\n');

        let height = columns.iter().map(|(_, lines, _)| lines.len()).max().unwrap_or(0);
        for row in 0..height {
            let cells = columns
                .iter()
                .map(|(_, lines, _)| {
                    Self::pad(lines.get(row).map(String::as_str).unwrap_or(""), width)
                })
                .collect::<Vec<_>>();
            output.push_str(cells.join(" │ ").trim_end());
            output.push('\n');
        }

        output
    }

    /// Greedy word wrap on character counts; overlong words are split
    fn wrap(text: &str, width: usize) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.lines() {
            let mut current = String::new();
            let mut current_len = 0;
            for word in paragraph.split_whitespace() {
                let chars: Vec<char> = word.chars().collect();
                for chunk in chars.chunks(width.max(1)) {
                    let piece: String = chunk.iter().collect();
                    let needed = if current_len == 0 {
                        chunk.len()
                    } else {
                        current_len + 1 + chunk.len()
                    };
                    if needed > width && current_len > 0 {
                        lines.push(std::mem::take(&mut current));
                        current_len = 0;
                    }
                    if current_len > 0 {
                        current.push(' ');
                        current_len += 1;
                    }
                    current.push_str(&piece);
                    current_len += chunk.len();
                }
            }
            lines.push(current);
        }
        lines
    }

    fn pad(text: &str, width: usize) -> String {
        format!("{:<width$}", text, width = width)
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &OrchestrationResult) -> String {
        Self::format(result)
    }

    fn format_json(&self, result: &OrchestrationResult) -> String {
        Self::format_json(result)
    }

    fn format_answer_only(&self, result: &OrchestrationResult) -> String {
        Self::format_answer_only(result)
    }
}
