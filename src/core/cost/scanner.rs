use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::core::models::usage::UsageEvent;

// ── Session JSONL structs ─────────────────────────────────────────────

#[derive(Deserialize)]
struct JsonlMessage {
    model: Option<String>,
    usage: Option<JsonlUsage>,
    id: Option<String>,
}

#[derive(Deserialize)]
struct JsonlUsage {
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
    cache_read_input_tokens: Option<u64>,
    cache_creation_input_tokens: Option<u64>,
}

#[derive(Deserialize)]
struct JsonlLine {
    #[serde(rename = "type")]
    line_type: Option<String>,
    message: Option<JsonlMessage>,
    #[serde(rename = "requestId")]
    request_id: Option<String>,
    timestamp: Option<String>,
}

/// (message id, request id); both empty means the line cannot be deduplicated.
type DedupKey = (String, String);

#[derive(Debug)]
struct ParsedEvent {
    key: Option<DedupKey>,
    event: UsageEvent,
}

// ── File discovery ────────────────────────────────────────────────────

/// Directories Claude keeps its logs in, followed by `extra`.
pub fn default_roots(extra: &[PathBuf]) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = Vec::new();

    if let Some(home) = dirs::home_dir() {
        roots.push(home.join(".claude"));
    }

    if let Ok(config_dir) = std::env::var("CLAUDE_CONFIG_DIR") {
        roots.push(PathBuf::from(config_dir));
    }

    if let Some(config_home) = dirs::config_dir() {
        roots.push(config_home.join("claude"));
    }

    roots.extend(extra.iter().cloned());
    roots.dedup();
    roots
}

/// Find session files under each root.
///
/// A root with a `projects/` directory is read as a Claude data directory:
/// `projects/<project>/*.jsonl` and `projects/<project>/<session>/subagents/*.jsonl`.
/// Any other directory is searched for `*.jsonl` a few levels deep.
pub fn discover_files(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    for root in roots {
        let projects_dir = root.join("projects");
        if projects_dir.is_dir() {
            collect_project_files(&projects_dir, &mut files);
        } else if root.is_dir() {
            collect_jsonl_recursive(root, &mut files, 4);
        } else {
            debug!(root = %root.display(), "log root not found");
        }
    }
    files.sort();
    files.dedup();
    files
}

fn collect_project_files(projects_dir: &Path, files: &mut Vec<PathBuf>) {
    let projects = match std::fs::read_dir(projects_dir) {
        Ok(p) => p,
        Err(e) => {
            warn!(dir = %projects_dir.display(), error = %e, "cannot list projects");
            return;
        }
    };
    for project_entry in projects.flatten() {
        let project_path = project_entry.path();
        if !project_path.is_dir() {
            continue;
        }
        let entries = match std::fs::read_dir(&project_path) {
            Ok(e) => e,
            Err(_) => continue,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if is_jsonl(&path) {
                files.push(path);
            } else if path.is_dir() {
                // {project}/{session}/subagents/*.jsonl
                let subagents = path.join("subagents");
                if let Ok(sa_entries) = std::fs::read_dir(&subagents) {
                    files.extend(sa_entries.flatten().map(|e| e.path()).filter(|p| is_jsonl(p)));
                }
            }
        }
    }
}

/// Recursively collect *.jsonl files up to `max_depth` levels deep.
fn collect_jsonl_recursive(dir: &Path, files: &mut Vec<PathBuf>, max_depth: u32) {
    if max_depth == 0 {
        return;
    }
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if is_jsonl(&path) {
            files.push(path);
        } else if path.is_dir() {
            collect_jsonl_recursive(&path, files, max_depth - 1);
        }
    }
}

fn is_jsonl(path: &Path) -> bool {
    path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("jsonl")
}

// ── Parser ────────────────────────────────────────────────────────────

/// Fast ASCII check: does this line look like it contains usage data?
fn is_candidate_line(line: &str) -> bool {
    line.contains("\"assistant\"") && line.contains("\"usage\"")
}

fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_line(line: &str) -> Option<ParsedEvent> {
    let parsed: JsonlLine = serde_json::from_str(line).ok()?;
    if parsed.line_type.as_deref() != Some("assistant") {
        return None;
    }
    let message = parsed.message?;
    let model = message.model?;
    let usage = message.usage?;
    let timestamp = parse_timestamp(parsed.timestamp.as_deref()?)?;

    let msg_id = message.id.unwrap_or_default();
    let req_id = parsed.request_id.unwrap_or_default();
    let key = if msg_id.is_empty() && req_id.is_empty() {
        None
    } else {
        Some((msg_id, req_id))
    };

    Some(ParsedEvent {
        key,
        event: UsageEvent {
            timestamp,
            model,
            input_tokens: usage.input_tokens.unwrap_or(0),
            output_tokens: usage.output_tokens.unwrap_or(0),
            cache_read_tokens: usage.cache_read_input_tokens.unwrap_or(0),
            cache_write_tokens: usage.cache_creation_input_tokens.unwrap_or(0),
        },
    })
}

/// Parse one session file. Streaming chunks repeat the same ids; the last one wins.
fn parse_session_file(path: &Path) -> Result<Vec<ParsedEvent>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader = std::io::BufReader::new(file);

    let mut records: Vec<ParsedEvent> = Vec::new();
    let mut dedup: HashMap<DedupKey, usize> = HashMap::new();
    let mut skipped = 0usize;
    let mut buf: Vec<u8> = Vec::new();

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if read == 0 {
            break;
        }
        // A session still being written can end in a torn multi-byte character.
        let text = String::from_utf8_lossy(&buf);
        let line = text.trim();
        if line.is_empty() || !is_candidate_line(line) {
            continue;
        }

        let record = match parse_line(line) {
            Some(r) => r,
            None => {
                skipped += 1;
                continue;
            }
        };

        match record.key.clone() {
            Some(key) => {
                if let Some(idx) = dedup.get(&key) {
                    records[*idx] = record;
                } else {
                    dedup.insert(key, records.len());
                    records.push(record);
                }
            }
            None => records.push(record),
        }
    }

    if skipped > 0 {
        debug!(file = %path.display(), skipped, "skipped undecodable usage lines");
    }
    Ok(records)
}

// ── Main scan entry point ─────────────────────────────────────────────

/// Read every session file under `roots` into usage events, oldest first.
///
/// Unreadable files are skipped with a warning. A request already seen in an earlier file
/// (resumed sessions copy their history) is counted once.
pub fn scan(roots: &[PathBuf]) -> Vec<UsageEvent> {
    let files = discover_files(roots);
    debug!(files = files.len(), "discovered session files");

    let mut seen: HashSet<DedupKey> = HashSet::new();
    let mut events: Vec<UsageEvent> = Vec::new();

    for file_path in &files {
        let records = match parse_session_file(file_path) {
            Ok(r) => r,
            Err(e) => {
                warn!(
                    file = %file_path.display(),
                    error = %format!("{:#}", e),
                    "skipping session file"
                );
                continue;
            }
        };
        for record in records {
            if let Some(key) = record.key {
                if !seen.insert(key) {
                    continue;
                }
            }
            events.push(record.event);
        }
    }

    events.sort_by_key(|e| e.timestamp);
    debug!(events = events.len(), "loaded usage events");
    events
}
