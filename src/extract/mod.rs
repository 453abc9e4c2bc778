//! @acp:module "Tag Match Extractor"
//! @acp:summary "Intersects comment spans with compiled tag patterns"
//! @acp:domain core
//! @acp:layer service
//!
//! # Matching order
//!
//! For every located occurrence the strict test runs over all tag
//! definitions, in configured order, before the loose whole-word fallback is
//! tried. An occurrence yields at most one match: a line comment is one
//! occurrence, each non-empty line of a block comment is one occurrence.
//!
//! Plain-text documents have no comments; every line is scanned with the
//! anchored patterns instead.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::language::LanguageCommentProfile;
use crate::span::{next_char_boundary, CommentKind, CommentSpan, LocateOptions, Segment, SpanLocator};
use crate::tags::{CompiledTag, TagSet};

/// @acp:summary "One recognized tag occurrence"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagMatch {
    pub tag_name: String,
    /// 0-based line of the tag token
    pub line: usize,
    /// 0-based character column of the tag token
    pub column: usize,
    pub matched_text: String,
    pub full_line: String,
    /// Byte offset where the highlight starts
    pub start: usize,
    /// Byte offset where the highlight ends
    pub end: usize,
    /// Comment kind the match came from; `None` for whole-text scanning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<CommentKind>,
}

/// A resolved tag token inside a segment, offsets absolute.
struct Hit<'t> {
    tag: &'t CompiledTag,
    start: usize,
    end: usize,
}

/// @acp:summary "Compiled matcher for one language and one tag table"
///
/// Rebuilt when the language or the configuration changes; scanning only reads it.
#[derive(Debug, Clone)]
pub struct Matcher {
    locator: SpanLocator,
    tags: Arc<TagSet>,
}

impl Matcher {
    pub fn new(profile: LanguageCommentProfile, options: LocateOptions, tags: Arc<TagSet>) -> Self {
        Self {
            locator: SpanLocator::new(profile, options),
            tags,
        }
    }

    pub fn profile(&self) -> &LanguageCommentProfile {
        self.locator.profile()
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Comment spans of a text, as the matcher sees them
    pub fn spans(&self, text: &str) -> Vec<CommentSpan> {
        self.locator.locate(text)
    }

    /// @acp:summary "Find every tag match in a document"
    ///
    /// Matches are sorted by highlight start. The same token is never
    /// reported twice, even when spans of different kinds overlap.
    pub fn find_matches(&self, doc: &Document) -> Vec<TagMatch> {
        if self.tags.is_empty() {
            return Vec::new();
        }
        if self.profile().is_plain_text {
            return self.plain_text_matches(doc);
        }

        let text = doc.get_text();
        let mut seen = HashSet::new();
        let mut matches = Vec::new();

        for span in self.locator.locate(text) {
            if self.profile().ignore_first_line && span.start == 0 {
                continue;
            }

            match span.kind {
                CommentKind::Line => {
                    if let Some((hit, anchor)) = self.resolve_line(text, &span) {
                        if !self.verify_line(doc, hit.start) {
                            continue;
                        }
                        let highlight = (self.anchor_start(text, &span, anchor), span.end);
                        if seen.insert((hit.tag.name.clone(), hit.start)) {
                            matches.push(record(doc, &hit, highlight, Some(span.kind)));
                        }
                    }
                }
                CommentKind::Block | CommentKind::Doc => {
                    for segment in &span.segments {
                        let Some(hit) = self.resolve(text, segment, true) else {
                            continue;
                        };
                        if !span.contains_range(hit.start, hit.end) {
                            continue;
                        }
                        if seen.insert((hit.tag.name.clone(), hit.start)) {
                            let highlight = (segment.start, segment.end);
                            matches.push(record(doc, &hit, highlight, Some(span.kind)));
                        }
                    }
                }
            }
        }

        matches.sort_by_key(|m| (m.start, m.end));
        matches
    }

    /// Strict test over every delimiter occurrence, then the fallback on the first.
    fn resolve_line<'t>(&'t self, text: &str, span: &CommentSpan) -> Option<(Hit<'t>, usize)> {
        for (index, segment) in span.segments.iter().enumerate() {
            if let Some(hit) = self.resolve(text, segment, false) {
                return Some((hit, index));
            }
        }
        let first = span.segments.first()?;
        self.fallback(text, first).map(|hit| (hit, 0))
    }

    fn resolve<'t>(&'t self, text: &str, segment: &Segment, with_fallback: bool) -> Option<Hit<'t>> {
        let body = segment.text(text);
        if body.trim().is_empty() {
            return None;
        }

        for tag in self.tags.iter() {
            if let Some((start, end)) = tag.match_strict(body) {
                return Some(Hit {
                    tag,
                    start: segment.start + start,
                    end: segment.start + end,
                });
            }
        }

        if with_fallback {
            self.fallback(text, segment)
        } else {
            None
        }
    }

    fn fallback<'t>(&'t self, text: &str, segment: &Segment) -> Option<Hit<'t>> {
        let body = segment.text(text);
        self.tags.iter().find_map(|tag| {
            tag.match_word(body).map(|(start, end)| Hit {
                tag,
                start: segment.start + start,
                end: segment.start + end,
            })
        })
    }

    /// A line comment delimiter must precede the token on its physical line.
    fn verify_line(&self, doc: &Document, offset: usize) -> bool {
        let line = doc.line_at(doc.line_of(offset));
        let before = &doc.get_text()[line.offset..offset];
        self.profile()
            .line_delimiters
            .iter()
            .any(|delimiter| before.contains(delimiter.as_str()))
    }

    /// Start of the delimiter run that opens segment `anchor` of a line span.
    fn anchor_start(&self, text: &str, span: &CommentSpan, anchor: usize) -> usize {
        if anchor == 0 {
            return span.start;
        }
        let (Some(delimiter), Some(segment)) = (self.locator.line_delimiter(), span.segments.get(anchor)) else {
            return span.start;
        };
        delimiter
            .find_iter(&text[span.start..segment.start])
            .last()
            .map(|m| span.start + m.start())
            .unwrap_or(span.start)
    }

    fn plain_text_matches(&self, doc: &Document) -> Vec<TagMatch> {
        let mut matches = Vec::new();

        for number in 0..doc.line_count() {
            let line = doc.line_at(number);
            let mut pos = 0;

            while pos < line.text.len() {
                let mut best: Option<(&CompiledTag, usize, usize)> = None;
                for tag in self.tags.iter() {
                    if let Some((start, end)) = first_token(tag, line.text, pos) {
                        if best.map_or(true, |(_, best_start, _)| start < best_start) {
                            best = Some((tag, start, end));
                        }
                    }
                }

                let Some((tag, start, end)) = best else {
                    break;
                };
                let hit = Hit {
                    tag,
                    start: line.offset + start,
                    end: line.offset + end,
                };
                matches.push(record(doc, &hit, (hit.start, hit.end), None));
                pos = end;
            }
        }

        matches
    }
}

/// First anchored token of `tag` at or after `from` that is not blank.
fn first_token(tag: &CompiledTag, line: &str, mut from: usize) -> Option<(usize, usize)> {
    while from <= line.len() {
        let (start, end) = tag.find_anchored_at(line, from)?;
        if let Some(range) = crate::tags::trim_range(line, start, end) {
            return Some(range);
        }
        from = if end > from {
            end
        } else if from < line.len() {
            next_char_boundary(line, from)
        } else {
            return None;
        };
    }
    None
}

fn record(doc: &Document, hit: &Hit<'_>, highlight: (usize, usize), kind: Option<CommentKind>) -> TagMatch {
    let position = doc.position_at(hit.start);
    TagMatch {
        tag_name: hit.tag.name.clone(),
        line: position.line,
        column: position.character,
        matched_text: doc.get_text()[hit.start..hit.end].to_string(),
        full_line: doc.line_at(position.line).text.to_string(),
        start: highlight.0,
        end: highlight.1,
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::ProfileResolver;
    use crate::tags::{canonical_tags, TagConfig};
    use pretty_assertions::assert_eq;

    fn matcher(language: &str) -> Matcher {
        matcher_with(language, canonical_tags())
    }

    fn matcher_with(language: &str, tags: Vec<TagConfig>) -> Matcher {
        let profile = ProfileResolver::default().resolve(language).unwrap();
        Matcher::new(profile, LocateOptions::default(), Arc::new(TagSet::compile(&tags)))
    }

    fn summary(matches: &[TagMatch]) -> Vec<(&str, usize, usize, &str)> {
        matches
            .iter()
            .map(|m| (m.tag_name.as_str(), m.line, m.column, m.matched_text.as_str()))
            .collect()
    }

    #[test]
    fn test_indented_line_comment() {
        let doc = Document::new("a.rs", "rust", "fn main() {\n    // TODO: wire up\n}\n");
        let matches = matcher("rust").find_matches(&doc);
        assert_eq!(summary(&matches), vec![("TODO", 1, 7, "TODO:")]);
        assert_eq!(&doc.get_text()[matches[0].start..matches[0].end], "// TODO: wire up");
        assert_eq!(matches[0].full_line, "    // TODO: wire up");
    }

    #[test]
    fn test_second_delimiter_resolves_symbol_tag() {
        let text = "// TODO: fix later\nconst x = 1; // not a comment marker // ! urgent\n";
        let doc = Document::new("a.ts", "typescript", text);
        let matches = matcher("typescript").find_matches(&doc);

        assert_eq!(summary(&matches), vec![("TODO", 0, 3, "TODO:"), ("!", 1, 40, "!")]);
        assert_eq!(&text[matches[1].start..matches[1].end], "// ! urgent");
    }

    #[test]
    fn test_block_comment_yields_match_per_line() {
        let doc = Document::new("a.c", "c", "/* TODO: refactor\n * FIXME: edge case */\n");
        let matches = matcher("c").find_matches(&doc);
        assert_eq!(summary(&matches), vec![("TODO", 0, 3, "TODO:"), ("FIXME", 1, 3, "FIXME:")]);
        assert!(matches.iter().all(|m| m.kind == Some(CommentKind::Block)));
    }

    #[test]
    fn test_doc_comment_matches() {
        let doc = Document::new("a.js", "javascript", "/**\n * NOTE: public api\n */\n");
        let matches = matcher("javascript").find_matches(&doc);
        assert_eq!(summary(&matches), vec![("NOTE", 1, 3, "NOTE:")]);
        assert_eq!(matches[0].kind, Some(CommentKind::Doc));
    }

    #[test]
    fn test_star_rules_do_not_match_star_tag() {
        let doc = Document::new("a.c", "c", "/*********\n * NOTE: x\n *********/\nint a;\n");
        let matches = matcher("c").find_matches(&doc);
        assert_eq!(summary(&matches), vec![("NOTE", 1, 3, "NOTE:")]);

        let doc = Document::new("a.js", "javascript", "/**\n * NOTE: x\n ***/\n");
        let matches = matcher("javascript").find_matches(&doc);
        assert_eq!(summary(&matches), vec![("NOTE", 1, 3, "NOTE:")]);
    }

    #[test]
    fn test_emoji_prefixed_tag() {
        let doc = Document::new("a.py", "python", "x = 1\n# 📌 TODO: pin\n");
        let matches = matcher("python").find_matches(&doc);
        assert_eq!(summary(&matches), vec![("TODO", 1, 2, "📌 TODO:")]);
    }

    #[test]
    fn test_ignore_first_line() {
        let doc = Document::new("a.py", "python", "# TODO: shebang-like\n# TODO: real\n");
        let matches = matcher("python").find_matches(&doc);
        assert_eq!(summary(&matches), vec![("TODO", 1, 2, "TODO:")]);
    }

    #[test]
    fn test_first_line_kept_when_not_at_offset_zero() {
        let doc = Document::new("a.py", "python", "x = 1  # TODO: keep\n");
        let matches = matcher("python").find_matches(&doc);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_fallback_finds_word_inside_comment() {
        let doc = Document::new("a.go", "go", "// we should fix: this\n");
        let matches = matcher("go").find_matches(&doc);
        assert_eq!(summary(&matches), vec![("FIXME", 0, 13, "fix")]);
    }

    #[test]
    fn test_code_outside_comments_is_ignored() {
        let doc = Document::new("a.rs", "rust", "let todo = \"TODO\";\nlet fixme = 1;\n");
        assert!(matcher("rust").find_matches(&doc).is_empty());
    }

    #[test]
    fn test_invalid_pattern_does_not_block_other_tags() {
        let tags = vec![
            TagConfig::new("BROKEN").with_pattern("("),
            TagConfig::new("TODO"),
        ];
        let doc = Document::new("a.rs", "rust", "// TODO: still works\n");
        let matches = matcher_with("rust", tags).find_matches(&doc);
        assert_eq!(summary(&matches), vec![("TODO", 0, 3, "TODO")]);
    }

    #[test]
    fn test_empty_tag_table_yields_nothing() {
        let doc = Document::new("a.rs", "rust", "// TODO\n");
        assert!(matcher_with("rust", Vec::new()).find_matches(&doc).is_empty());
    }

    #[test]
    fn test_empty_matching_pattern_terminates() {
        let tags = vec![TagConfig::new("EMPTY").with_pattern("x*"), TagConfig::new("TODO")];
        let doc = Document::new("a.rs", "rust", "// hello\n/* \n */\n// TODO\n");
        let matches = matcher_with("rust", tags).find_matches(&doc);
        assert_eq!(summary(&matches), vec![("TODO", 3, 3, "TODO")]);
    }

    #[test]
    fn test_configured_order_breaks_ties() {
        let tags = vec![
            TagConfig::new("FIRST").with_pattern("TODO"),
            TagConfig::new("SECOND").with_pattern("TODO"),
        ];
        let doc = Document::new("a.rs", "rust", "// TODO\n");
        let matches = matcher_with("rust", tags).find_matches(&doc);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].tag_name, "FIRST");
    }

    #[test]
    fn test_overlapping_kinds_do_not_duplicate() {
        let doc = Document::new("a.tsx", "typescriptreact", "<a>{ /** TODO: x */ }</a>\n");
        let matches = matcher("typescriptreact").find_matches(&doc);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_plain_text_mode() {
        let profile = LanguageCommentProfile::plain_text();
        let matcher = Matcher::new(profile, LocateOptions::default(), Arc::new(TagSet::compile(&canonical_tags())));
        let doc = Document::new("notes.txt", "plaintext", "TODO: buy milk\n  and NOTE this\nnothing\n");
        let matches = matcher.find_matches(&doc);

        assert_eq!(summary(&matches), vec![("TODO", 0, 0, "TODO:"), ("NOTE", 1, 6, "NOTE")]);
        assert_eq!(matches[1].kind, None);
    }

    #[test]
    fn test_matching_is_idempotent() {
        let doc = Document::new("a.c", "c", "/* TODO */\n// FIXME\n");
        let matcher = matcher("c");
        assert_eq!(matcher.find_matches(&doc), matcher.find_matches(&doc));
    }
}
