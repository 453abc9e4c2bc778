//! Block, documentation and embedded comment strategies

use super::{next_char_boundary, CommentKind, CommentSpan, Segment};
use crate::language::BlockDelimiters;

/// Plain block comments. Starts spelled as `doc_start` are left to [`locate_docs`].
pub(super) fn locate_blocks(
    text: &str,
    block: &BlockDelimiters,
    doc_start: Option<&str>,
    line_spans: &[CommentSpan],
) -> Vec<CommentSpan> {
    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(found) = text[pos..].find(&block.start) {
        let start = pos + found;
        let is_doc = doc_start.is_some_and(|ds| text[start..].starts_with(ds)) && !is_empty_block(text, start, block);

        if is_doc || !opens_at_boundary(text, start) || inside_line_comment(line_spans, start) {
            pos = next_char_boundary(text, start);
            continue;
        }

        let span = enclose(text, start, block.start.len(), &block.end, CommentKind::Block);
        pos = span.end;
        spans.push(span);
    }

    spans
}

/// Documentation blocks opened by `doc_start`.
pub(super) fn locate_docs(
    text: &str,
    block: &BlockDelimiters,
    doc_start: &str,
    line_spans: &[CommentSpan],
) -> Vec<CommentSpan> {
    let mut spans = Vec::new();
    let mut pos = 0;

    while let Some(found) = text[pos..].find(doc_start) {
        let start = pos + found;
        if is_empty_block(text, start, block)
            || !opens_at_boundary(text, start)
            || inside_line_comment(line_spans, start)
        {
            pos = next_char_boundary(text, start);
            continue;
        }

        let span = enclose(text, start, doc_start.len(), &block.end, CommentKind::Doc);
        pos = span.end;
        spans.push(span);
    }

    spans
}

/// Block comments wrapped in braces, `{/* ... */}`. The brace need not follow
/// whitespace, which is what the plain block strategy misses.
pub(super) fn locate_embedded(text: &str, block: &BlockDelimiters, doc_start: Option<&str>) -> Vec<CommentSpan> {
    let mut spans = Vec::new();

    for (brace, _) in text.match_indices('{') {
        let inner = text[brace + 1..].trim_start();
        if !inner.starts_with(&block.start) {
            continue;
        }
        let start = text.len() - inner.len();
        let (opener_len, kind) = match doc_start {
            Some(ds) if inner.starts_with(ds) && !is_empty_block(text, start, block) => (ds.len(), CommentKind::Doc),
            _ => (block.start.len(), CommentKind::Block),
        };

        let content_start = start + opener_len;
        let Some(found) = text[content_start..].find(&block.end) else {
            continue;
        };
        let content_end = content_start + found;
        let end = content_end + block.end.len();
        if !text[end..].trim_start().starts_with('}') {
            continue;
        }

        spans.push(CommentSpan {
            start,
            end,
            kind,
            segments: segments(text, content_start, content_end),
        });
    }

    spans
}

/// Span from `start` to the first end marker after the opener, or to the end of
/// the text when unterminated.
fn enclose(text: &str, start: usize, opener_len: usize, end_marker: &str, kind: CommentKind) -> CommentSpan {
    let content_start = start + opener_len;
    let (content_end, end) = match text[content_start..].find(end_marker) {
        Some(found) => {
            let content_end = content_start + found;
            (content_end, content_end + end_marker.len())
        }
        None => (text.len(), text.len()),
    };

    CommentSpan {
        start,
        end,
        kind,
        segments: segments(text, content_start, content_end),
    }
}

/// `/**/`: the start marker immediately followed by the end marker.
fn is_empty_block(text: &str, start: usize, block: &BlockDelimiters) -> bool {
    text[start + block.start.len()..].starts_with(&block.end)
}

fn opens_at_boundary(text: &str, start: usize) -> bool {
    text[..start]
        .chars()
        .next_back()
        .map_or(true, |c| matches!(c, ' ' | '\t' | '\n' | '\r'))
}

/// Whether `offset` lies past the opening delimiter of a line comment.
fn inside_line_comment(line_spans: &[CommentSpan], offset: usize) -> bool {
    let idx = line_spans.partition_point(|s| s.start < offset);
    idx > 0 && line_spans[idx - 1].end > offset
}

/// One segment per physical line of `start..end`, gutter stripped, empties dropped.
fn segments(text: &str, start: usize, end: usize) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut line_start = start;
    let mut first = true;

    loop {
        let line_end = text[line_start..end]
            .find('\n')
            .map(|i| line_start + i)
            .unwrap_or(end);
        let mut body_end = line_end;
        if text[line_start..body_end].ends_with('\r') {
            body_end -= 1;
        }

        let body_start = strip_gutter(text, line_start, body_end, first);
        if body_start < body_end {
            out.push(Segment {
                start: body_start,
                end: body_end,
            });
        }

        if line_end >= end {
            break;
        }
        line_start = line_end + 1;
        first = false;
    }

    out
}

/// Offset of the first matchable byte of a block line.
///
/// Continuation lines drop leading whitespace and one `*` followed by
/// whitespace or the end of the line. The opening line only drops whitespace.
/// Any line that is nothing but stars (`/*****`, ` *****/`) is dropped whole.
fn strip_gutter(text: &str, start: usize, end: usize, first: bool) -> usize {
    let line = &text[start..end];
    let rest = line.trim_start_matches([' ', '\t']);
    let offset = start + (line.len() - rest.len());

    if rest.trim_end().chars().all(|c| c == '*') {
        return end;
    }
    if first {
        return offset;
    }

    match rest.strip_prefix('*') {
        Some(after) if after.is_empty() || after.starts_with([' ', '\t']) => {
            let body = after.trim_start_matches([' ', '\t']);
            end - body.len()
        }
        _ => offset,
    }
}
