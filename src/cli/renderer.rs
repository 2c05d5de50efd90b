use colored::{control, ColoredString, Colorize};

use usage_forwarder::core::models::outcome::DeliveryOutcome;
use usage_forwarder::core::models::usage::{EventStatus, UsageRecord};

fn format_tokens(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{:.1}K", count as f64 / 1_000.0)
    } else {
        format!("{}", count)
    }
}

fn format_cost(cost: f64) -> String {
    if cost > 0.0 && cost < 0.01 {
        format!("${:.6}", cost)
    } else {
        format!("${:.2}", cost)
    }
}

/// Render a normalized payload as a colored (or plain) block.
///
/// Layout:
/// ```text
///  gpt-4o (success)
///   Call      abc
///   Request   chatcmpl-42
///   Tokens    10 in / 20 out / 30 total
///   Cost      $0.001500
///   Metadata  {"team":"search"}
/// ```
pub fn render_record(record: &UsageRecord, use_color: bool) -> String {
    control::set_override(use_color);

    let status: ColoredString = match record.status {
        EventStatus::Success => record.status.as_str().green(),
        EventStatus::Failure => record.status.as_str().red(),
    };
    let mut lines = vec![format!(" {} ({})", record.model.bold(), status)];

    let dash = || "-".dimmed().to_string();
    lines.push(format!(
        "  {}      {}",
        "Call".cyan(),
        record.id.clone().unwrap_or_else(dash)
    ));
    lines.push(format!(
        "  {}   {}",
        "Request".cyan(),
        record.request_id.clone().unwrap_or_else(dash)
    ));
    lines.push(format!(
        "  {}    {} in / {} out / {} total",
        "Tokens".cyan(),
        format_tokens(record.usage.prompt_tokens),
        format_tokens(record.usage.completion_tokens),
        format_tokens(record.usage.total_tokens)
    ));
    lines.push(format!("  {}      {}", "Cost".cyan(), format_cost(record.response_cost)));
    lines.push(format!("  {}  {}", "Metadata".cyan(), record.metadata));

    lines.join("\n")
}

pub fn render_outcome(outcome: &DeliveryOutcome, use_color: bool) -> String {
    control::set_override(use_color);

    let text = outcome.to_string();
    let colored: ColoredString = match outcome {
        DeliveryOutcome::Delivered { .. } => text.green(),
        DeliveryOutcome::Disabled => text.dimmed(),
        DeliveryOutcome::Dropped { .. } => text.yellow(),
        DeliveryOutcome::Rejected { .. } | DeliveryOutcome::Failed { .. } => text.red(),
    };

    match outcome {
        DeliveryOutcome::Rejected { body, .. } if !body.is_empty() => {
            format!(" {}\n  {}", colored, body)
        }
        _ => format!(" {}", colored),
    }
}
