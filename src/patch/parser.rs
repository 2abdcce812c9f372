//! Parsing `*** Begin Patch` documents into file operations

use super::{FileOperation, Hunk, HunkLine, PatchDocument};
use crate::core::ToolError;

const BEGIN_PATCH: &str = "*** Begin Patch";
const END_PATCH: &str = "*** End Patch";
const ADD_FILE: &str = "*** Add File: ";
const DELETE_FILE: &str = "*** Delete File: ";
const UPDATE_FILE: &str = "*** Update File: ";
const ANCHOR: &str = "@@ ";
const HUNK_SEPARATOR: &str = "@@";

/// A body line with its 1-based line number in the original document
type Numbered<'a> = (usize, &'a str);

/// Parse a patch document into file operations
pub fn parse_patch(document: &str) -> Result<PatchDocument, ToolError> {
    let mut lines: Vec<Numbered> = document
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .skip_while(|(_, line)| line.trim().is_empty())
        .collect();
    while matches!(lines.last(), Some((_, line)) if line.trim().is_empty()) {
        lines.pop();
    }

    match lines.first() {
        Some((_, line)) if line.trim_end() == BEGIN_PATCH => {}
        first => {
            return Err(format_error(
                first.map_or(1, |(n, _)| *n),
                format!("patch must start with '{}'", BEGIN_PATCH),
            ))
        }
    }
    match lines.last() {
        Some((_, line)) if lines.len() > 1 && line.trim_end() == END_PATCH => {}
        last => {
            return Err(format_error(
                last.map_or(1, |(n, _)| *n),
                format!("patch must end with '{}'", END_PATCH),
            ))
        }
    }

    let body = &lines[1..lines.len() - 1];
    let mut operations = Vec::new();
    let mut cursor = 0;

    while cursor < body.len() {
        let (number, line) = body[cursor];
        cursor += 1;

        if let Some(path) = line.strip_prefix(ADD_FILE) {
            let path = header_path(number, path)?;
            let (section, rest) = take_section(&body[cursor..]);
            cursor = body.len() - rest.len();
            let content = section
                .iter()
                .map(|(_, l)| l.strip_prefix('+').unwrap_or(l).to_string())
                .collect();
            operations.push(FileOperation::AddFile { path, content });
        } else if let Some(path) = line.strip_prefix(DELETE_FILE) {
            let path = header_path(number, path)?;
            operations.push(FileOperation::DeleteFile { path });
        } else if let Some(path) = line.strip_prefix(UPDATE_FILE) {
            let path = header_path(number, path)?;
            let (section, rest) = take_section(&body[cursor..]);
            cursor = body.len() - rest.len();
            let hunks = parse_hunks(section)?;
            operations.push(FileOperation::UpdateFile { path, hunks });
        } else if line.trim().is_empty() {
            continue;
        } else {
            return Err(format_error(
                number,
                format!("expected a file operation header, found {:?}", line),
            ));
        }
    }

    Ok(PatchDocument { operations })
}

/// Split off the lines up to the next `***` header
fn take_section<'a, 'b>(lines: &'b [Numbered<'a>]) -> (&'b [Numbered<'a>], &'b [Numbered<'a>]) {
    let end = lines
        .iter()
        .position(|(_, line)| line.starts_with("***"))
        .unwrap_or(lines.len());
    lines.split_at(end)
}

fn parse_hunks(section: &[Numbered]) -> Result<Vec<Hunk>, ToolError> {
    let mut hunks = Vec::new();
    let mut current = Hunk::default();

    for &(number, line) in section {
        let hunk_line = if let Some(anchor) = line.strip_prefix(ANCHOR) {
            if !current.lines.is_empty() {
                hunks.push(std::mem::take(&mut current));
            }
            HunkLine::Anchor(anchor.to_string())
        } else if line.trim_end() == HUNK_SEPARATOR {
            if !current.lines.is_empty() {
                hunks.push(std::mem::take(&mut current));
            }
            continue;
        } else if let Some(text) = line.strip_prefix(' ') {
            HunkLine::Context(text.to_string())
        } else if let Some(text) = line.strip_prefix('-') {
            HunkLine::Remove(text.to_string())
        } else if let Some(text) = line.strip_prefix('+') {
            HunkLine::Add(text.to_string())
        } else if line.is_empty() {
            continue;
        } else {
            return Err(format_error(
                number,
                format!("unexpected line in update hunk: {:?}", line),
            ));
        };
        current.lines.push(hunk_line);
    }

    if !current.lines.is_empty() {
        hunks.push(current);
    }
    Ok(hunks)
}

fn header_path(number: usize, raw: &str) -> Result<String, ToolError> {
    let path = raw.trim();
    if path.is_empty() {
        return Err(format_error(number, "operation header is missing a path"));
    }
    Ok(path.to_string())
}

fn format_error(line: usize, message: impl Into<String>) -> ToolError {
    ToolError::PatchFormat {
        line,
        message: message.into(),
    }
}
