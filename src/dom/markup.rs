//! Minimal markup handling: `<br>` aware message parsing and tree serialization.

use super::{Document, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Text(String),
    LineBreak,
}

/// Split `source` into text runs and line breaks. `<br>`, `<br/>` and `<br />`
/// are recognized in any case; everything else stays literal text.
pub fn parse_inline(source: &str) -> Vec<Fragment> {
    let mut out = Vec::new();
    let mut text = String::new();
    let mut rest = source;

    while let Some(start) = rest.find('<') {
        text.push_str(&rest[..start]);
        let tail = &rest[start..];
        match line_break_len(tail) {
            Some(len) => {
                if !text.is_empty() {
                    out.push(Fragment::Text(std::mem::take(&mut text)));
                }
                out.push(Fragment::LineBreak);
                rest = &tail[len..];
            }
            None => {
                text.push('<');
                rest = &tail[1..];
            }
        }
    }
    text.push_str(rest);
    if !text.is_empty() {
        out.push(Fragment::Text(text));
    }
    out
}

fn line_break_len(tail: &str) -> Option<usize> {
    let end = tail.find('>')?;
    let inner = tail[1..end].trim();
    let inner = inner.strip_suffix('/').unwrap_or(inner).trim_end();
    inner.eq_ignore_ascii_case("br").then_some(end + 1)
}

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "meta", "link"];

/// Serialize `id` and its subtree as HTML
pub fn to_markup(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, out: &mut String) {
    if let Some(text) = doc.text(id) {
        out.push_str(&escape_text(text));
        return;
    }
    let Some(tag) = doc.tag(id) else {
        // Document node: just its children
        for &child in doc.children(id) {
            write_node(doc, child, out);
        }
        return;
    };

    out.push('<');
    out.push_str(tag);
    for (name, value) in doc.attrs(id) {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_attr(value));
        out.push('"');
    }
    out.push('>');

    if VOID_TAGS.contains(&tag) {
        return;
    }
    for &child in doc.children(id) {
        write_node(doc, child, out);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_line_break_variants() {
        let parts = parse_inline("a<br>b<BR/>c<br />d");
        assert_eq!(
            parts,
            vec![
                Fragment::Text("a".into()),
                Fragment::LineBreak,
                Fragment::Text("b".into()),
                Fragment::LineBreak,
                Fragment::Text("c".into()),
                Fragment::LineBreak,
                Fragment::Text("d".into()),
            ]
        );
    }

    #[test]
    fn test_parse_keeps_other_tags_literal() {
        assert_eq!(
            parse_inline("1 < 2 <b>x</b>"),
            vec![Fragment::Text("1 < 2 <b>x</b>".into())]
        );
        assert!(parse_inline("").is_empty());
    }

    #[test]
    fn test_to_markup_escapes() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        doc.set_attr(p, "title", "say \"hi\"").unwrap();
        doc.set_inner_markup(p, "a<br>b & c").unwrap();
        assert_eq!(
            to_markup(&doc, p),
            "<p title=\"say &quot;hi&quot;\">a<br>b &amp; c</p>"
        );
    }
}
