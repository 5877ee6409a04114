//! Tool-call extraction from streamed model output.
//!
//! The model invokes tools with lines of the form
//! `TOOL: <name> {<json object>}`. Text arrives in arbitrary deltas, so a
//! call is only returned once its JSON object is structurally complete:
//! braces balanced, counted outside string literals, with backslash escapes
//! honoured. A returned call never changes on later input.

use codewright_core::tool::ToolCall;

const MARKER: &str = "TOOL:";

/// Result of scanning a JSON object that starts at the first byte of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonScan {
    /// The object closes; the value is the byte length including the final `}`.
    Complete(usize),
    /// More input is needed.
    Incomplete,
}

/// Find where the JSON object at the start of `text` ends.
///
/// `text` must begin with `{`. Anything else is reported as incomplete.
pub fn scan_json_object(text: &str) -> JsonScan {
    let bytes = text.as_bytes();
    if bytes.first() != Some(&b'{') {
        return JsonScan::Incomplete;
    }

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        match b {
            b'\\' => escaped = true,
            b'"' => in_string = !in_string,
            b'{' if !in_string => depth += 1,
            b'}' if !in_string => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return JsonScan::Complete(i + 1);
                }
            }
            _ => {}
        }
    }
    JsonScan::Incomplete
}

/// Whether `text` is exactly one balanced JSON object.
pub fn is_complete_json_object(text: &str) -> bool {
    scan_json_object(text) == JsonScan::Complete(text.len())
}

/// What follows a `TOOL:` marker.
enum Match {
    /// A complete call; `end` is the byte offset just past its JSON object.
    Call { call: ToolCall, end: usize },
    /// The text so far is a valid prefix of a call; wait for more.
    Pending,
    /// Not a call; resume scanning after the marker.
    NoMatch,
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Try to read `<ws> name <ws> {json}` starting at `start`.
fn match_call(text: &str, start: usize) -> Match {
    let bytes = text.as_bytes();
    let mut i = start;

    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    let name_start = i;
    while i < bytes.len() && is_name_byte(bytes[i]) {
        i += 1;
    }
    if i == bytes.len() {
        return Match::Pending;
    }
    if i == name_start {
        return Match::NoMatch;
    }
    let name_end = i;

    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if i == bytes.len() {
        return Match::Pending;
    }
    if bytes[i] != b'{' {
        return Match::NoMatch;
    }

    match scan_json_object(&text[i..]) {
        JsonScan::Complete(len) => Match::Call {
            call: ToolCall::new(&text[name_start..name_end], &text[i..i + len]),
            end: i + len,
        },
        JsonScan::Incomplete => Match::Pending,
    }
}

/// Scan `text` from `from`, returning complete calls in order and the offset
/// up to which the text is fully consumed.
fn scan(text: &str, from: usize) -> (Vec<ToolCall>, usize) {
    let mut calls = Vec::new();
    let mut cursor = from;
    let mut search = from;

    while let Some(found) = text[search..].find(MARKER) {
        let marker_at = search + found;
        match match_call(text, marker_at + MARKER.len()) {
            Match::Call { call, end } => {
                calls.push(call);
                cursor = end;
                search = end;
            }
            // A call still streaming in swallows everything after it.
            Match::Pending => return (calls, marker_at),
            Match::NoMatch => {
                search = marker_at + MARKER.len();
                cursor = search;
            }
        }
    }

    // Keep a possibly split marker at the tail for the next scan.
    let tail_keep = MARKER.len() - 1;
    let safe_end = text.len().saturating_sub(tail_keep).max(cursor);
    let safe_end = (cursor..=safe_end)
        .rev()
        .find(|&i| text.is_char_boundary(i))
        .unwrap_or(cursor);
    (calls, safe_end)
}

/// Extract every complete tool call from a whole buffer, in text order.
pub fn extract_tool_calls(text: &str) -> Vec<ToolCall> {
    scan(text, 0).0
}

/// Incremental extractor fed with stream deltas.
///
/// Each call is returned exactly once, by position. Two identical calls at
/// different positions are both returned; deduplication is the caller's job.
#[derive(Debug, Default)]
pub struct ToolCallExtractor {
    buffer: String,
    consumed: usize,
}

impl ToolCallExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delta and return the calls it completed.
    pub fn push(&mut self, delta: &str) -> Vec<ToolCall> {
        self.buffer.push_str(delta);
        let (calls, consumed) = scan(&self.buffer, self.consumed);
        self.consumed = consumed;
        calls
    }

    /// Everything received so far.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn into_buffer(self) -> String {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_strict_prefix_is_incomplete() {
        let object = r#"{"path": "src/{weird}.rs", "content": "say \"}\" then {", "n": {"a": 1}}"#;
        assert!(is_complete_json_object(object));
        for end in 1..object.len() {
            assert_eq!(
                scan_json_object(&object[..end]),
                JsonScan::Incomplete,
                "prefix of length {end} reported complete"
            );
        }
    }

    #[test]
    fn braces_inside_strings_do_not_count() {
        assert_eq!(scan_json_object(r#"{"a": "}"}"#), JsonScan::Complete(10));
        assert_eq!(scan_json_object(r#"{"a": "{"#), JsonScan::Incomplete);
        assert_eq!(scan_json_object(r#"{"a": "\"}"#), JsonScan::Incomplete);
        assert_eq!(scan_json_object(r#"{"a": "\\"}"#), JsonScan::Complete(11));
    }

    #[test]
    fn trailing_text_is_not_part_of_the_object() {
        assert_eq!(scan_json_object(r#"{"a":1} and more"#), JsonScan::Complete(7));
        assert!(!is_complete_json_object(r#"{"a":1} and more"#));
        assert!(!is_complete_json_object("no brace"));
    }

    #[test]
    fn extracts_calls_in_order_around_prose() {
        let text = concat!(
            "Let me start.\n",
            "TOOL: log_thought {\"thought\": \"plan\"}\n",
            "Now write.\n",
            "TOOL:write_file{\"path\": \"a.txt\", \"content\": \"x\"} done"
        );
        let calls = extract_tool_calls(text);
        assert_eq!(
            calls,
            vec![
                ToolCall::new("log_thought", r#"{"thought": "plan"}"#),
                ToolCall::new("write_file", r#"{"path": "a.txt", "content": "x"}"#),
            ]
        );
    }

    #[test]
    fn marker_without_object_is_skipped() {
        let text = "TOOL: none here. TOOL: finish_task {\"summary\": \"ok\"}";
        let calls = extract_tool_calls(text);
        assert_eq!(calls, vec![ToolCall::new("finish_task", r#"{"summary": "ok"}"#)]);
    }

    #[test]
    fn marker_inside_arguments_is_not_a_call() {
        let text = r#"TOOL: write_file {"path": "p.md", "content": "TOOL: read_file {\"path\": \"x\"}"}"#;
        let calls = extract_tool_calls(text);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "write_file");
    }

    #[test]
    fn incomplete_call_waits() {
        assert!(extract_tool_calls(r#"TOOL: log_thought {"thought": "te"#).is_empty());
        assert!(extract_tool_calls("TOOL: log_thought").is_empty());
    }

    #[test]
    fn call_split_across_three_deltas_is_returned_once() {
        let mut extractor = ToolCallExtractor::new();
        assert!(extractor.push("TOOL: log_thou").is_empty());
        assert!(extractor.push(r#"ght {"thought":"te"#).is_empty());
        let calls = extractor.push(r#"st"}"#);
        assert_eq!(calls, vec![ToolCall::new("log_thought", r#"{"thought":"test"}"#)]);
        assert!(extractor.push("\nsome trailing prose").is_empty());
        assert_eq!(
            extractor.buffer(),
            "TOOL: log_thought {\"thought\":\"test\"}\nsome trailing prose"
        );
    }

    #[test]
    fn marker_split_across_deltas() {
        let mut extractor = ToolCallExtractor::new();
        assert!(extractor.push("thinking... TO").is_empty());
        assert!(extractor.push("OL: finish_task ").is_empty());
        let calls = extractor.push(r#"{"summary": "done"}"#);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "finish_task");
    }

    #[test]
    fn identical_calls_at_different_positions_are_both_returned() {
        let mut extractor = ToolCallExtractor::new();
        let a = extractor.push(r#"TOOL: log_thought {"thought":"a"} "#);
        let b = extractor.push(r#"TOOL: log_thought {"thought":"a"}"#);
        assert_eq!(a.len(), 1);
        assert_eq!(b.len(), 1);
        assert_eq!(a[0].key(), b[0].key());
    }

    #[test]
    fn incremental_matches_whole_buffer() {
        let text = concat!(
            "TOOL: log_thought {\"thought\": \"a {nested} \\\"quote\\\"\"}\n",
            "TOOL: write_file {\"path\": \"é.txt\", \"content\": \"ü\"}\n",
            "TOOL: finish_task {\"summary\": \"fin\"}"
        );
        let whole = extract_tool_calls(text);
        assert_eq!(whole.len(), 3);

        let mut extractor = ToolCallExtractor::new();
        let mut streamed = Vec::new();
        for ch in text.chars() {
            streamed.extend(extractor.push(&ch.to_string()));
        }
        assert_eq!(streamed, whole);
    }
}
