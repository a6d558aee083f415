//! Console output formatter for generation results

use colored::Colorize;
use fncall_application::{IntentReport, RunGenerationOutput};
use fncall_domain::{CombinedResult, FunctionCall, IntentOutcome, OutputFormat};

/// Formats generation results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format according to the selected output format
    pub fn render(output: &RunGenerationOutput, format: OutputFormat) -> String {
        match format {
            OutputFormat::Full => Self::format(output),
            OutputFormat::Calls => Self::format_calls(&output.result),
            OutputFormat::Json => Self::format_json(&output.result),
        }
    }

    /// Format the complete result with per-intent detail
    pub fn format(output: &RunGenerationOutput) -> String {
        let result = &output.result;
        let mut text = String::new();

        text.push_str(&Self::header("Function Calls"));
        text.push('\n');

        text.push_str(&format!(
            "{} {}\n",
            "Mode:".cyan().bold(),
            output.mode
        ));
        let source = if result.source.is_degraded() {
            result.source.to_string().yellow()
        } else {
            result.source.to_string().green()
        };
        text.push_str(&format!("{} {}\n", "Source:".cyan().bold(), source));
        text.push_str(&format!(
            "{} {:.0}ms\n",
            "Time:".cyan().bold(),
            result.total_time_ms
        ));
        if let Some(confidence) = result.confidence {
            text.push_str(&format!(
                "{} {:.2}\n",
                "Confidence:".cyan().bold(),
                confidence
            ));
        }
        if output.cloud_fallback_used {
            text.push_str(&format!("{}\n", "Answered by cloud fallback".yellow()));
        }

        if !output.intents.is_empty() {
            text.push_str(&Self::section_header("Intents"));
            for (i, intent) in output.intents.iter().enumerate() {
                text.push_str(&Self::format_intent(i, intent));
            }
        }

        text.push_str(&Self::section_header("Calls"));
        text.push_str(&Self::format_calls(result));

        text.push_str(&Self::footer());
        text
    }

    fn format_intent(index: usize, intent: &IntentReport) -> String {
        let resolution = &intent.resolution;
        let outcome = match resolution.outcome {
            IntentOutcome::Quorum => resolution.outcome.to_string().green(),
            IntentOutcome::NoQuorum => resolution.outcome.to_string().yellow(),
            IntentOutcome::Failed => resolution.outcome.to_string().red(),
        };
        let label = intent.fragment.as_deref().unwrap_or("(whole conversation)");

        format!(
            "\n{} {}\n  {} {}\n  {} {} ({} agreeing, {} completed, {} failed)\n",
            format!("{}.", index + 1).bold(),
            label,
            "tools:".dimmed(),
            intent.tools.join(", "),
            "outcome:".dimmed(),
            outcome,
            resolution.agreement,
            resolution.completed,
            resolution.failed
        )
    }

    /// Format only the calls, one per line
    pub fn format_calls(result: &CombinedResult) -> String {
        if result.function_calls.is_empty() {
            return format!("{}\n", "(no function calls)".dimmed());
        }
        result
            .function_calls
            .iter()
            .map(|call| format!("{}\n", Self::format_call(call)))
            .collect()
    }

    /// `name(key=value, ...)` with values as JSON
    pub fn format_call(call: &FunctionCall) -> String {
        let args = call
            .arguments
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({})", call.name.bold(), args)
    }

    /// Format as JSON
    pub fn format_json(result: &CombinedResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
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
