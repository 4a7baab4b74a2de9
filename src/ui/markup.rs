//! Display-time expansion of the small markup subset used in message text
//! (`**bold**`, `*italic*`, line breaks, `•` bullets). Nothing here
//! mutates stored text.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Display bound for long medication fields.
pub const PREVIEW_CHARS: usize = 200;

static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*|\*(.*?)\*").expect("valid emphasis regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Plain,
    Strong,
    Italic,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub emphasis: Emphasis,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Line {
    pub bullet: bool,
    pub spans: Vec<Span>,
}

pub fn expand(text: &str) -> Vec<Line> {
    text.lines().map(expand_line).collect()
}

fn expand_line(line: &str) -> Line {
    let (bullet, body) = match line.strip_prefix("• ") {
        Some(rest) => (true, rest),
        None => (false, line),
    };

    let mut spans = Vec::new();
    let mut cursor = 0;
    for caps in EMPHASIS.captures_iter(body) {
        let Some(whole) = caps.get(0) else { continue };
        push_span(&mut spans, &body[cursor..whole.start()], Emphasis::Plain);
        match (caps.get(1), caps.get(2)) {
            (Some(strong), _) => push_span(&mut spans, strong.as_str(), Emphasis::Strong),
            (_, Some(italic)) => push_span(&mut spans, italic.as_str(), Emphasis::Italic),
            _ => {}
        }
        cursor = whole.end();
    }
    push_span(&mut spans, &body[cursor..], Emphasis::Plain);

    Line { bullet, spans }
}

fn push_span(spans: &mut Vec<Span>, text: &str, emphasis: Emphasis) {
    if !text.is_empty() {
        spans.push(Span {
            text: text.to_string(),
            emphasis,
        });
    }
}

/// Truncate to `max_chars` characters, appending `...` only when cut.
pub fn preview(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => Cow::Owned(format!("{}...", &text[..byte_idx])),
        None => Cow::Borrowed(text),
    }
}

/// `Confidence: 90%`; hidden for missing or zero scores.
pub fn confidence_label(confidence: Option<f64>) -> Option<String> {
    let confidence = confidence.filter(|c| *c > 0.0)?;
    Some(format!(
        "Confidence: {}%",
        (confidence.clamp(0.0, 1.0) * 100.0).round() as u32
    ))
}
