//! Markdown rendering
//!
//! Turns processed documents into the final report: one heading per schema
//! with a stable HTML anchor, the synthesized sample as a fenced JSON block,
//! one property table per flattened block, and an enumerated-values table
//! when any row carries an enum.

use crate::document::{DocumentReport, SchemaSection};
use crate::error::Result;
use specdown_core::{Block, Row};
use std::fmt::Write;

/// Render a batch of processed documents into a single Markdown report.
pub fn render_report(reports: &[DocumentReport]) -> Result<String> {
    let mut out = String::new();
    for report in reports {
        render_document(&mut out, report)?;
    }
    Ok(out)
}

fn render_document(out: &mut String, report: &DocumentReport) -> Result<()> {
    writeln!(out, "# {}\n", report.title).ok();
    writeln!(out, "## Schemas\n").ok();
    for section in &report.sections {
        render_section(out, section)?;
    }
    Ok(())
}

fn render_section(out: &mut String, section: &SchemaSection) -> Result<()> {
    writeln!(out, "<a id=\"{}\"></a>\n", section.anchor).ok();
    writeln!(out, "### {}\n", section.name).ok();
    if let Some(description) = &section.description {
        if !description.is_empty() {
            writeln!(out, "{description}\n").ok();
        }
    }

    writeln!(out, "```json").ok();
    let sample = serde_json::to_string_pretty(&section.sample)?;
    writeln!(out, "{sample}").ok();
    writeln!(out, "```\n").ok();

    writeln!(out, "#### Properties\n").ok();
    let mut any_rows = false;
    for block in &section.blocks {
        any_rows |= !block.rows.is_empty();
        render_block(out, block);
    }
    if !any_rows {
        writeln!(out, "*None*\n").ok();
    }

    let enumerated: Vec<&Row> = section
        .blocks
        .iter()
        .flat_map(|b| &b.rows)
        .filter(|r| !r.enum_values.is_empty())
        .collect();
    if !enumerated.is_empty() {
        writeln!(out, "#### Enumerated Values\n").ok();
        writeln!(out, "|Property|Value|").ok();
        writeln!(out, "|---|---|").ok();
        for row in enumerated {
            for value in &row.enum_values {
                writeln!(out, "|{}|{}|", cell(&row.name), cell(&literal(value))).ok();
            }
        }
        writeln!(out).ok();
    }
    Ok(())
}

fn render_block(out: &mut String, block: &Block) {
    if block.rows.is_empty() {
        return;
    }
    if !block.title.is_empty() {
        writeln!(out, "*{}*\n", block.title).ok();
    }
    writeln!(out, "|Name|Type|Required|Description|").ok();
    writeln!(out, "|---|---|---|---|").ok();
    for row in &block.rows {
        let description = if row.description.is_empty() {
            "none".to_string()
        } else {
            cell(&row.description)
        };
        writeln!(
            out,
            "|{}|{}|{}|{}|",
            cell(&row.display_name),
            cell(&row.type_label),
            row.required,
            description
        )
        .ok();
    }
    writeln!(out).ok();
}

/// Enum values render unquoted except that non-scalars keep JSON syntax.
fn literal(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Make a string safe inside a Markdown table cell.
fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
