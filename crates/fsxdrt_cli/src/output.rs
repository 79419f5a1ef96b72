//! Renderers for the task response and report listings.

use anyhow::{Context, Result};
use clap::ValueEnum;
use fsxdrt_contract::{to_canonical_json, TaskResponse};
use fsxdrt_core::ReportListing;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

pub fn render_task(response: &TaskResponse, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            to_canonical_json(response).context("failed to format task response as JSON")
        }
        OutputFormat::Text => Ok(task_lines(response).join("\n")),
    }
}

fn task_lines(response: &TaskResponse) -> Vec<String> {
    let mut lines = vec![format!("task: {}", response.task_id)];
    if let Some(lifecycle) = &response.lifecycle {
        lines.push(format!("lifecycle: {lifecycle}"));
    }
    if let Some(kind) = response.kind {
        lines.push(format!("type: {}", kind.as_str()));
    }
    if let Some(file_system_id) = &response.file_system_id {
        lines.push(format!("filesystem: {file_system_id}"));
    }
    if !response.paths.is_empty() {
        lines.push(format!("paths: {}", response.paths.join(", ")));
    }
    if let Some(report) = &response.report {
        lines.push(format!(
            "report: {} ({}, {})",
            report.path, report.format, report.scope
        ));
    }
    if let Some(created) = response.creation_time {
        lines.push(format!("created: {}", created.to_rfc3339()));
    }
    if let Some(status) = &response.status {
        let count = |value: Option<i64>| value.map_or_else(|| "-".to_string(), |n| n.to_string());
        lines.push(format!(
            "progress: {} total, {} succeeded, {} failed, {} released",
            count(status.total_count),
            count(status.succeeded_count),
            count(status.failed_count),
            count(status.released_count),
        ));
    }
    if let Some(message) = &response.failure_message {
        lines.push(format!("failure: {message}"));
    }
    lines
}

pub fn render_reports(listing: &ReportListing, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            to_canonical_json(listing).context("failed to format report listing as JSON")
        }
        OutputFormat::Text => {
            let mut lines = vec![format!("location: {}", listing.location)];
            if listing.objects.is_empty() {
                lines.push("no reports found".to_string());
                return Ok(lines.join("\n"));
            }
            lines.push(format!("{:>12} {:<25} KEY", "SIZE", "LAST MODIFIED"));
            for object in &listing.objects {
                let size = object
                    .size
                    .map_or_else(|| "-".to_string(), |size| size.to_string());
                let modified = object
                    .last_modified
                    .map_or_else(|| "-".to_string(), |at| at.to_rfc3339());
                lines.push(format!("{size:>12} {modified:<25} {}", object.key));
            }
            Ok(lines.join("\n"))
        }
    }
}
