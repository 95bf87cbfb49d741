//! Output formatter trait

use hotbox_domain::{OrchestrationResult, OutputFormat};

/// Trait for formatting dispatch results
pub trait OutputFormatter {
    /// Format the complete result
    fn format(&self, result: &OrchestrationResult) -> String;

    /// Format as JSON
    fn format_json(&self, result: &OrchestrationResult) -> String;

    /// Format the answer only (concise output)
    fn format_answer_only(&self, result: &OrchestrationResult) -> String;

    /// Format according to the requested output format
    fn render(&self, result: &OrchestrationResult, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => self.format(result),
            OutputFormat::Answer => self.format_answer_only(result),
            OutputFormat::Json => self.format_json(result),
        }
    }
}
