//! Line comment strategy

use regex::Regex;

use super::{next_char_boundary, CommentKind, CommentSpan, Segment};

/// `(?:d1|d2)+` over the escaped delimiters, longest first.
pub(super) fn delimiter_regex(delimiters: &[String]) -> Option<Regex> {
    if delimiters.is_empty() {
        return None;
    }

    let mut sorted: Vec<&String> = delimiters.iter().collect();
    sorted.sort_by(|a, b| b.len().cmp(&a.len()));
    let alternatives: Vec<String> = sorted.iter().map(|d| regex::escape(d)).collect();

    match Regex::new(&format!("(?:{})+", alternatives.join("|"))) {
        Ok(re) => Some(re),
        Err(err) => {
            tracing::warn!("Line delimiters {:?} did not compile: {}", delimiters, err);
            None
        }
    }
}

pub(super) fn locate(text: &str, delimiter: &Regex) -> Vec<CommentSpan> {
    let mut spans = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let Some(m) = delimiter.find_at(text, pos) else {
            break;
        };
        if m.is_empty() {
            pos = next_char_boundary(text, m.start());
            continue;
        }

        let line_end = text[m.start()..]
            .find('\n')
            .map(|i| m.start() + i)
            .unwrap_or(text.len());
        let end = if text[m.end()..line_end].ends_with('\r') {
            line_end - 1
        } else {
            line_end
        };

        let mut segments = Vec::new();
        let mut body_start = m.end();
        loop {
            if body_start < end {
                segments.push(Segment {
                    start: body_start,
                    end,
                });
            }
            match delimiter.find_at(&text[..end], body_start) {
                Some(next) if !next.is_empty() => body_start = next.end(),
                _ => break,
            }
        }

        spans.push(CommentSpan {
            start: m.start(),
            end,
            kind: CommentKind::Line,
            segments,
        });
        pos = line_end;
    }

    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delimiters(ds: &[&str]) -> Regex {
        let owned: Vec<String> = ds.iter().map(|d| d.to_string()).collect();
        delimiter_regex(&owned).unwrap()
    }

    #[test]
    fn test_one_span_per_line() {
        let re = delimiters(&["#"]);
        let text = "a # one # two\nb\n# three";
        let spans = locate(text, &re);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].segments.len(), 2);
        assert_eq!(&text[spans[1].start..spans[1].end], "# three");
    }

    #[test]
    fn test_crlf_is_excluded() {
        let re = delimiters(&["//"]);
        let text = "// TODO\r\nx";
        let spans = locate(text, &re);
        assert_eq!(&text[spans[0].start..spans[0].end], "// TODO");
    }

    #[test]
    fn test_mixed_delimiters() {
        let re = delimiters(&["//", "#"]);
        let text = "$a = 1; #// NOTE\n";
        let spans = locate(text, &re);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].segments[0].text(text), " NOTE");
    }

    #[test]
    fn test_empty_delimiter_list() {
        assert!(delimiter_regex(&[]).is_none());
    }

    #[test]
    fn test_bare_delimiter_has_no_segments() {
        let re = delimiters(&["--"]);
        let spans = locate("x --\n", &re);
        assert_eq!(spans.len(), 1);
        assert!(spans[0].segments.is_empty());
    }
}
