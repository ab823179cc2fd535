//! HTML fragments for the Grimoire interface.
//!
//! Every function returns a complete fragment for its container, so
//! re-rendering replaces what was there before instead of appending.

use std::fmt::{self, Write};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::models::{
    FileListing, QuickHit, ResultRecord, SearchResponsePage, SemanticHit, StagedFile,
    UploadedDocument,
};
use crate::session::{Control, Controls, FlashMessage, ProgressItem, UploadStatus};

pub const NO_RESULTS: &str = "No results found.";
pub const NO_DOCUMENTS: &str = "No documents uploaded yet. Upload files to get started.";
pub const NO_FILES: &str = "No files found.";
const NO_SUMMARY: &str = "No summary available";

/// Standalone page wrapping a fragment.
pub fn base_template(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Grimoire</title>
</head>
<body>
    <header class="sui-header"><h1>Grimoire</h1></header>
    <main id="resultsContainer">
{content}
    </main>
</body>
</html>"#,
        title = html_escape(title),
        content = content
    )
}

/// Flash messages, newest first, each with a dismiss button.
pub fn flashes(messages: &[FlashMessage]) -> String {
    if messages.is_empty() {
        return String::new();
    }

    let items: String = messages
        .iter()
        .map(|m| {
            format!(
                r#"<div class="flash {severity}" data-flash-id="{id}">{text}<button type="button" class="close-btn">×</button></div>"#,
                severity = m.severity.as_str(),
                id = m.id.0,
                text = html_escape(&m.message)
            )
        })
        .collect();

    format!(r#"<div class="flashes">{}</div>"#, items)
}

/// Documents uploaded during this session.
pub fn document_list(documents: &[UploadedDocument]) -> String {
    if documents.is_empty() {
        return no_results(NO_DOCUMENTS);
    }

    documents
        .iter()
        .map(|doc| {
            format!(
                r#"<div class="result-card" data-document-id="{id}">
    <h4>📄 {name}</h4>
    <p>Size: {size}</p>
    <div class="result-meta">Uploaded just now</div>
</div>"#,
                id = doc.id,
                name = html_escape(&doc.filename),
                size = format_bytes(doc.file_size)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Per-file upload indicators.
pub fn upload_progress(items: &[ProgressItem]) -> String {
    items
        .iter()
        .map(|item| {
            let status = match item.status {
                UploadStatus::Pending => r#"<span class="spinner"></span>"#,
                UploadStatus::Uploaded => r#"<span class="status ok">✓ Uploaded</span>"#,
                UploadStatus::Failed => r#"<span class="status error">✗ Error</span>"#,
            };
            format!(
                r#"<div class="progress-item"><span>{}</span>{}</div>"#,
                html_escape(&item.name),
                status
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Files waiting to be submitted, each removable.
pub fn staged_files(files: &[StagedFile]) -> String {
    if files.is_empty() {
        return String::new();
    }

    let items: String = files
        .iter()
        .enumerate()
        .map(|(i, f)| {
            format!(
                r#"<li data-index="{}">{} <small>{}</small><button type="button" class="remove-file-btn" title="Remove file">×</button></li>"#,
                i,
                html_escape(&f.name),
                format_bytes(f.size)
            )
        })
        .collect();

    format!(r#"<ul class="file-list">{}</ul>"#, items)
}

/// Action buttons with their current label and disabled state.
pub fn action_buttons(controls: &Controls) -> String {
    Control::ALL
        .iter()
        .map(|&control| {
            format!(
                r#"<button type="button" id="{id}"{disabled}>{label}</button>"#,
                id = control.dom_id(),
                disabled = if controls.get(control).is_clickable() {
                    ""
                } else {
                    " disabled"
                },
                label = controls.label(control)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Card for an extract or summarize result.
pub fn action_card(text: Option<&str>, summary: Option<&str>, preview_chars: usize) -> String {
    let mut html = String::from(r#"<div class="result-card">"#);

    if let Some(text) = text.filter(|t| !t.is_empty()) {
        html.push_str(&format!(
            "<h4>📝 Extracted Text</h4>\n<p>{}</p>",
            html_escape(&preview(text, preview_chars))
        ));
    }

    if let Some(summary) = summary.filter(|s| !s.is_empty()) {
        html.push_str(&format!(
            "<h4>✨ Summary</h4>\n<p>{}</p>",
            html_escape(summary)
        ));
    }

    html.push_str("</div>");
    html
}

/// Results of the semantic document search.
pub fn semantic_hits(hits: &[SemanticHit], date_format: &str) -> String {
    if hits.is_empty() {
        return no_results(NO_RESULTS);
    }

    hits.iter()
        .map(|hit| {
            let date = hit
                .created_at
                .as_deref()
                .map(|d| format_date(d, date_format))
                .unwrap_or_default();
            format!(
                r#"<div class="result-card">
    <h4>🔍 {name}</h4>
    <p><strong>Relevance:</strong> {relevance:.1}%</p>
    <p>{summary}</p>
    <div class="result-meta">{date}</div>
</div>"#,
                name = html_escape(&hit.filename),
                relevance = hit.similarity_score * 100.0,
                summary = html_escape(
                    hit.summary
                        .as_deref()
                        .filter(|s| !s.is_empty())
                        .unwrap_or(NO_SUMMARY)
                ),
                date = html_escape(&date)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A connector page: paging info, facet sidebar and the result list.
pub fn search_page(
    page: &SearchResponsePage,
    current: u32,
    results_per_page: u32,
    date_format: &str,
) -> String {
    if page.results.is_empty() {
        return no_results(NO_RESULTS);
    }

    let items: String = page
        .results
        .iter()
        .map(|r| search_result(r, date_format))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<div class="sui-layout-header">{info}</div>
<aside class="sui-facets">{facets}</aside>
<ul class="sui-results-container">
{items}
</ul>"#,
        info = paging_info(page, current, results_per_page),
        facets = facets(page),
        items = items
    )
}

/// "Showing a - b of n".
pub fn paging_info(page: &SearchResponsePage, current: u32, results_per_page: u32) -> String {
    if page.total_results == 0 || page.results.is_empty() {
        return String::new();
    }
    let start = u64::from(current.max(1) - 1) * u64::from(results_per_page) + 1;
    let end = (start + page.results.len() as u64 - 1).min(page.total_results);
    format!(
        r#"<div class="sui-paging-info">Showing <strong>{} - {}</strong> of <strong>{}</strong></div>"#,
        start, end, page.total_results
    )
}

/// Facet value counts.
pub fn facets(page: &SearchResponsePage) -> String {
    let mut html = String::new();
    for (name, groups) in &page.facets {
        let values: String = groups
            .iter()
            .flat_map(|g| g.data.iter())
            .map(|v| {
                let label = match &v.value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                format!(
                    r#"<li><span class="facet-value">{}</span> <span class="facet-count">{}</span></li>"#,
                    html_escape(&label),
                    v.count
                )
            })
            .collect();
        html.push_str(&format!(
            r#"<fieldset class="sui-facet"><legend>{}</legend><ul>{}</ul></fieldset>"#,
            html_escape(name),
            values
        ));
    }
    html
}

/// A single connector result.
///
/// Snippets are server-highlighted HTML and are inserted as-is; raw values
/// are escaped.
pub fn search_result(result: &ResultRecord, date_format: &str) -> String {
    let file_type = result.raw_str("fileType").unwrap_or_default();
    let file_name = result.raw_str("fileName").unwrap_or_default();
    let title = result
        .snippet("fileName")
        .map(str::to_string)
        .unwrap_or_else(|| html_escape(&file_name));
    let summary = result
        .snippet("summary")
        .map(str::to_string)
        .or_else(|| result.raw_str("summary").map(|s| html_escape(&s)))
        .unwrap_or_default();
    let size = format_bytes(result.raw("fileSize").and_then(Value::as_u64).unwrap_or(0));
    let uploaded = result
        .raw_str("uploadDate")
        .map(|d| format_date(&d, date_format))
        .unwrap_or_default();

    let description = if summary.is_empty() {
        String::new()
    } else {
        format!(
            r#"<span class="sui-result__description">{}</span>"#,
            summary
        )
    };
    let upload_tag = if uploaded.is_empty() {
        String::new()
    } else {
        format!("<li><strong>Uploaded:</strong> {}</li>", html_escape(&uploaded))
    };

    format!(
        r#"<li class="sui-result">
    <div class="sui-result__header">
        <span class="file-icon">{icon}</span>
        <span class="sui-result__title">{title}</span>
        <span class="file-type-badge">{badge}</span>
    </div>
    <div class="sui-result__body">
        <div class="sui-result__details">
            {description}
            <ul class="sui-result__tags"><li><strong>Size:</strong> {size}</li>{upload_tag}</ul>
        </div>
    </div>
    <div class="sui-result__actions">
        <a href="/files/{href}" target="_blank" rel="noopener noreferrer" class="sui-download-btn">↓ Download</a>
    </div>
</li>"#,
        icon = file_icon(&file_type),
        title = title,
        badge = html_escape(&file_type.to_uppercase()),
        description = description,
        size = size,
        upload_tag = upload_tag,
        href = urlencoding::encode(&file_name)
    )
}

/// Results of the keyword lookup.
pub fn quick_hits(hits: &[QuickHit]) -> String {
    if hits.is_empty() {
        return no_results(NO_RESULTS);
    }

    hits.iter()
        .map(|hit| {
            format!(
                r#"<div class="resultado-item">
    <h3 class="resultado-titulo"><a href="{url}">{title}</a></h3>
    <p class="resultado-descripcion">{description}</p>
</div>"#,
                url = html_escape(&hit.url),
                title = html_escape(&hit.title),
                description = html_escape(&hit.description)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Files held by the server.
pub fn file_listing(listing: &FileListing) -> String {
    if listing.files.is_empty() {
        return no_results(NO_FILES);
    }

    let items: String = listing
        .files
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let details = [
                Some(format!("{} KB", f.size_kb)),
                f.modified.clone(),
                f.kind.clone(),
                Some(f.path.clone()).filter(|p| !p.is_empty()),
            ]
            .into_iter()
            .flatten()
            .map(|d| html_escape(&d))
            .collect::<Vec<_>>()
            .join(" · ");
            format!(
                r#"<li><div id="archivo-item-archivo{i}" title="{size} KB">{name}</div><div id="archivo-info-archivo{i}" class="archivo-info">{details}</div></li>"#,
                i = i,
                size = f.size_kb,
                name = html_escape(&f.name),
                details = details
            )
        })
        .collect();

    format!(r#"<ul id="files-list">{}</ul>"#, items)
}

fn no_results(text: &str) -> String {
    format!(r#"<div class="no-results">{}</div>"#, text)
}

/// Human-readable size with base-1024 units, rounded to two decimals.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut exponent = 0;
    let mut threshold = 1024u64;
    while exponent < UNITS.len() - 1 && bytes >= threshold {
        exponent += 1;
        threshold = threshold.saturating_mul(1024);
    }

    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[exponent])
}

/// Icon for a file extension.
pub fn file_icon(extension: &str) -> &'static str {
    match extension.to_lowercase().as_str() {
        "pdf" => "📄",
        "xlsx" | "xls" | "csv" => "📊",
        "docx" | "doc" => "📝",
        "png" | "jpg" | "jpeg" => "🖼️",
        "txt" => "📃",
        _ => "📁",
    }
}

/// Format a server timestamp. Unparseable input is returned unchanged.
pub fn format_date(raw: &str, format: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return write_date(dt.format(format), raw);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return write_date(dt.format(format), raw);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return write_date(date.format(format), raw);
    }
    raw.to_string()
}

/// An invalid format string makes chrono's `Display` fail; show the raw
/// value instead.
fn write_date(formatted: impl fmt::Display, raw: &str) -> String {
    let mut out = String::new();
    match write!(out, "{}", formatted) {
        Ok(()) => out,
        Err(_) => raw.to_string(),
    }
}

/// First `max_chars` characters of `text`, with `...` appended when cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
