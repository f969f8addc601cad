//! A small, forgiving HTML scanner and the document mutator built on top of
//! it. The scanner understands just enough structure to walk start and end
//! tags, read their attributes, and skip the places where `<` does not start a
//! tag (comments, doctypes, and the contents of `<script>`, `<style>`,
//! `<title>`, and `<textarea>`). It never rejects input; markup it can't make
//! sense of is treated as text.
//!
//! Navigation fragments are recognized by the [`NAV_MARKER`] attribute rather
//! than by their exact text, so restyling the fragment template doesn't leave
//! stale bars behind on the next run.

use std::ops::Range;

/// The attribute that identifies a navigation fragment's container `<div>`.
pub const NAV_MARKER: &str = "data-slide-nav";

/// The inline-style signature of navigation bars written by the older,
/// marker-less slide linker. Recognizing it lets the first run over such a
/// deck replace those bars instead of stacking a second one on top.
const LEGACY_NAV_STYLE: &str = "position: fixed; bottom: 20px;";

/// Elements whose contents are text, not markup.
const RAW_TEXT_ELEMENTS: [&str; 4] = ["script", "style", "textarea", "title"];

/// The result of [`inject_nav`].
#[derive(Debug, PartialEq, Eq)]
pub enum Injection {
    /// The updated document, with exactly one navigation fragment.
    Injected(String),

    /// The document has no `<body>` to put the fragment in. The document was
    /// left alone.
    NoBody,
}

/// Removes every navigation fragment from `doc` and appends `fragment` as the
/// last child of its body. The fragment is followed by a single newline,
/// which [`strip_nav`] removes again, so that repeated injection of the same
/// fragment is a fixed point.
pub fn inject_nav(doc: &str, fragment: &str) -> Injection {
    let stripped = strip_nav(doc);
    match insertion_point(&stripped) {
        None => Injection::NoBody,
        Some(at) => {
            let fragment = fragment.trim();
            let mut out =
                String::with_capacity(stripped.len() + fragment.len() + 1);
            out.push_str(&stripped[..at]);
            out.push_str(fragment);
            out.push('\n');
            out.push_str(&stripped[at..]);
            Injection::Injected(out)
        }
    }
}

/// Returns `doc` without any navigation fragments (see
/// [`find_nav_fragments`]). A newline directly after a fragment goes with it.
pub fn strip_nav(doc: &str) -> String {
    let mut out = String::with_capacity(doc.len());
    let mut last = 0;
    for range in find_nav_fragments(doc) {
        out.push_str(&doc[last..range.start]);
        last = match doc[range.end..].starts_with('\n') {
            true => range.end + 1,
            false => range.end,
        };
    }
    out.push_str(&doc[last..]);
    out
}

/// Finds the byte ranges of every navigation fragment in `doc`, from the `<`
/// of the container's start tag through the `>` of its matching `</div>`.
/// Fragments nested inside another fragment are part of the outer range. A
/// fragment whose `</div>` never comes runs up to the next `</body>` (or
/// `</html>`, or the end of the document), so a damaged bar is still removed.
pub fn find_nav_fragments(doc: &str) -> Vec<Range<usize>> {
    scan_nav_fragments(doc)
        .into_iter()
        .map(|(range, _)| range)
        .collect()
}

/// Reports whether `markup` is exactly one navigation fragment, closed by its
/// own `</div>`, ignoring surrounding whitespace.
pub fn is_single_nav_fragment(markup: &str) -> bool {
    let markup = markup.trim();
    scan_nav_fragments(markup) == vec![(0..markup.len(), true)]
}

/// Finds navigation fragments along with whether each one was closed by its
/// matching `</div>`.
fn scan_nav_fragments(doc: &str) -> Vec<(Range<usize>, bool)> {
    let mut fragments = Vec::new();
    let mut tags = Tags::new(doc);
    while let Some(tag) = tags.next() {
        if !tag.is_nav_fragment() {
            continue;
        }
        let mut lookahead = tags.clone();
        match matching_div_end(&mut lookahead) {
            Some(end) => {
                fragments.push((tag.span.start..end, true));
                tags = lookahead;
            }
            None => {
                let end = tags
                    .clone()
                    .find(|t| t.closing && (t.name == "body" || t.name == "html"))
                    .map_or(doc.len(), |t| t.span.start);
                fragments.push((tag.span.start..end, false));
                tags.pos = end;
            }
        }
    }
    fragments
}

/// Returns the text of the document's first `<title>` element with runs of
/// whitespace collapsed to a single space, or `None` if there is no title or
/// it is blank. The text is returned as written, so character references stay
/// escaped.
pub fn extract_title(doc: &str) -> Option<String> {
    let open = Tags::new(doc).find(|t| !t.closing && t.name == "title")?;
    let end = find_ignore_case(doc, "</title", open.span.end)
        .unwrap_or_else(|| doc.len());
    let title = doc[open.span.end..end]
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    match title.is_empty() {
        true => None,
        false => Some(title),
    }
}

/// Where a fragment goes: just before the last `</body>`. Without one, a
/// document that opened a `<body>` gets the fragment before its `</html>` (or
/// at the very end); a document that never opened a body gets nothing.
fn insertion_point(doc: &str) -> Option<usize> {
    let mut body_open = false;
    let mut body_close = None;
    let mut html_close = None;
    for tag in Tags::new(doc) {
        match (tag.name.as_str(), tag.closing) {
            ("body", false) => body_open = true,
            ("body", true) => body_close = Some(tag.span.start),
            ("html", true) if html_close.is_none() => {
                html_close = Some(tag.span.start)
            }
            _ => {}
        }
    }
    match (body_close, body_open) {
        (Some(at), _) => Some(at),
        (None, true) => Some(html_close.unwrap_or_else(|| doc.len())),
        (None, false) => None,
    }
}

/// Consumes tags up to and including the `</div>` that closes a `<div>` whose
/// start tag was just read, returning the end offset of that `</div>`.
fn matching_div_end(tags: &mut Tags) -> Option<usize> {
    let mut depth = 1usize;
    for tag in tags {
        if tag.name != "div" {
            continue;
        }
        if tag.closing {
            depth -= 1;
            if depth == 0 {
                return Some(tag.span.end);
            }
        } else {
            depth += 1;
        }
    }
    None
}

/// A start or end tag found by [`Tags`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    /// The tag name, lowercased.
    pub name: String,

    /// Whether this is an end tag (`</name>`).
    pub closing: bool,

    /// The unparsed attribute text between the name and the closing `>`.
    pub attributes: &'a str,

    /// The byte range of the whole tag, `<` through `>`.
    pub span: Range<usize>,
}

impl<'a> Tag<'a> {
    /// Returns the value of the attribute called `name` (case-insensitive).
    /// Attributes written without a value yield `Some("")`.
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        parse_attributes(self.attributes)
            .into_iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.unwrap_or(""))
    }

    fn is_nav_fragment(&self) -> bool {
        if self.closing || self.name != "div" {
            return false;
        }
        self.attribute(NAV_MARKER).is_some()
            || self
                .attribute("style")
                .map_or(false, |style| style.contains(LEGACY_NAV_STYLE))
    }
}

/// An iterator over the tags of a document, in document order.
#[derive(Clone)]
pub struct Tags<'a> {
    doc: &'a str,
    pos: usize,
}

impl<'a> Tags<'a> {
    pub fn new(doc: &'a str) -> Tags<'a> {
        Tags { doc, pos: 0 }
    }

    /// Skips past the end of the construct starting at `start` that ends in
    /// `terminator`, or to the end of the document if it is unterminated.
    fn skip_past(&mut self, start: usize, terminator: &str) {
        self.pos = match self.doc[start..].find(terminator) {
            Some(i) => start + i + terminator.len(),
            None => self.doc.len(),
        };
    }
}

impl<'a> Iterator for Tags<'a> {
    type Item = Tag<'a>;

    fn next(&mut self) -> Option<Tag<'a>> {
        let doc = self.doc;
        let bytes = doc.as_bytes();
        loop {
            let start = self.pos + doc[self.pos..].find('<')?;
            let rest = &doc[start..];
            if rest.starts_with("<!--") {
                self.skip_past(start + 4, "-->");
                continue;
            }
            if rest.starts_with("<!") || rest.starts_with("<?") {
                self.skip_past(start, ">");
                continue;
            }

            let closing = rest.starts_with("</");
            let name_start = start + if closing { 2 } else { 1 };
            if !bytes.get(name_start).map_or(false, u8::is_ascii_alphabetic) {
                // A stray `<` in text.
                self.pos = start + 1;
                continue;
            }
            let name_end = name_start
                + bytes[name_start..]
                    .iter()
                    .position(|b| !(b.is_ascii_alphanumeric() || *b == b'-'))
                    .unwrap_or(bytes.len() - name_start);

            let attributes_end = tag_end(bytes, name_end);
            let end = (attributes_end + 1).min(doc.len());
            let name = doc[name_start..name_end].to_ascii_lowercase();
            self.pos = end;

            if !closing && RAW_TEXT_ELEMENTS.contains(&name.as_str()) {
                let close = format!("</{}", name);
                self.pos = find_ignore_case(doc, &close, end)
                    .unwrap_or_else(|| doc.len());
            }

            return Some(Tag {
                name,
                closing,
                attributes: doc[name_end..attributes_end]
                    .trim_end_matches('/'),
                span: start..end,
            });
        }
    }
}

/// Returns the offset of the `>` that ends the tag whose attributes begin at
/// `from`, or the document length if there isn't one. A `>` inside a quoted
/// attribute value doesn't count.
fn tag_end(bytes: &[u8], from: usize) -> usize {
    let mut quote: Option<u8> = None;
    let mut after_equals = false;
    for (i, &b) in bytes.iter().enumerate().skip(from) {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                }
            }
            None => match b {
                b'>' => return i,
                b'"' | b'\'' if after_equals => quote = Some(b),
                _ => {}
            },
        }
        if !b.is_ascii_whitespace() {
            after_equals = quote.is_none() && b == b'=';
        }
    }
    bytes.len()
}

/// Splits raw attribute text into `(name, value)` pairs. Values may be
/// double-quoted, single-quoted, or bare.
fn parse_attributes(src: &str) -> Vec<(&str, Option<&str>)> {
    let bytes = src.as_bytes();
    let len = bytes.len();
    let skip_space = |mut i: usize| {
        while i < len && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/') {
            i += 1;
        }
        i
    };

    let mut attributes = Vec::new();
    let mut i = skip_space(0);
    while i < len {
        let name_start = i;
        while i < len && !bytes[i].is_ascii_whitespace() && bytes[i] != b'=' {
            i += 1;
        }
        let name = &src[name_start..i];
        i = skip_space(i);

        let value = if i < len && bytes[i] == b'=' {
            i = skip_space(i + 1);
            if i < len && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i];
                let value_start = i + 1;
                i = value_start;
                while i < len && bytes[i] != quote {
                    i += 1;
                }
                let value = &src[value_start..i];
                i = (i + 1).min(len);
                Some(value)
            } else {
                let value_start = i;
                while i < len && !bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                Some(&src[value_start..i])
            }
        } else {
            None
        };

        if !name.is_empty() {
            attributes.push((name, value));
        }
        i = skip_space(i);
    }
    attributes
}

/// Finds the ASCII `needle` in `haystack` at or after `from`, ignoring ASCII
/// case.
fn find_ignore_case(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let needle = needle.as_bytes();
    haystack.as_bytes()[from..]
        .windows(needle.len())
        .position(|window| window.eq_ignore_ascii_case(needle))
        .map(|i| from + i)
}

#[cfg(test)]
mod test {
    use super::*;

    const FRAGMENT: &str =
        r#"<div data-slide-nav class="nav"><a href="index.html">Home</a></div>"#;

    fn names(doc: &str) -> Vec<String> {
        Tags::new(doc)
            .map(|t| match t.closing {
                true => format!("/{}", t.name),
                false => t.name,
            })
            .collect()
    }

    #[test]
    fn test_tags_skip_comments_doctype_and_raw_text() {
        let doc = "<!DOCTYPE html><HTML><!-- <div> --><head>\
                   <script>if (a < b) { x = '<div>'; }</script>\
                   <title>a <b> c</title></head><body>1 < 2</body></html>";
        assert_eq!(
            vec![
                "html", "head", "script", "/script", "title", "/title",
                "/head", "body", "/body", "/html"
            ],
            names(doc),
        );
    }

    #[test]
    fn test_tag_attributes() {
        let doc = r#"<div id=main data-slide-nav style='a: "b" > c'>"#;
        let tag = Tags::new(doc).next().unwrap();
        assert_eq!(0..doc.len(), tag.span);
        assert_eq!(Some("main"), tag.attribute("ID"));
        assert_eq!(Some(""), tag.attribute(NAV_MARKER));
        assert_eq!(Some(r#"a: "b" > c"#), tag.attribute("style"));
        assert_eq!(None, tag.attribute("class"));
    }

    #[test]
    fn test_find_nav_fragments_nested_divs() {
        let doc = format!(
            "<body><div>x</div>{}<div data-slide-nav><div>a</div><div>b</div></div></body>",
            "<p>text</p>"
        );
        let start = doc.find("<div data-slide-nav").unwrap();
        let end = doc.find("</body>").unwrap();
        assert_eq!(vec![start..end], find_nav_fragments(&doc));
    }

    #[test]
    fn test_find_nav_fragments_legacy_style() {
        let doc = "<body><div style=\"position: fixed; bottom: 20px; right: 20px;\">\
                   <a href=\"index.html\">Home</a></div></body>";
        let ranges = find_nav_fragments(doc);
        assert_eq!(1, ranges.len());
        assert!(doc[ranges[0].clone()].ends_with("Home</a></div>"));
    }

    #[test]
    fn test_find_nav_fragments_unterminated_runs_to_body_close() {
        let doc = "<body><div data-slide-nav>stale<div>x</div></body>";
        let start = doc.find("<div data-slide-nav").unwrap();
        let end = doc.find("</body>").unwrap();
        assert_eq!(vec![start..end], find_nav_fragments(doc));
        assert_eq!(
            vec![6..doc.len()],
            find_nav_fragments("<body><div data-slide-nav>x")
        );
    }

    #[test]
    fn test_find_nav_fragments_after_unterminated() {
        let doc = format!(
            "<body><div data-slide-nav>stale</body><body>{}</body>",
            FRAGMENT
        );
        let second = doc.rfind("<div data-slide-nav").unwrap();
        let ranges = find_nav_fragments(&doc);
        assert_eq!(2, ranges.len());
        assert_eq!(second..second + FRAGMENT.len(), ranges[1]);
    }

    #[test]
    fn test_inject_replaces_unterminated_fragment() {
        let mut doc = String::from(
            "<html><body><div data-slide-nav>stale</body></html>",
        );
        for _ in 0..3 {
            doc = match inject_nav(&doc, FRAGMENT) {
                Injection::Injected(updated) => updated,
                Injection::NoBody => panic!("expected a body"),
            };
        }
        assert_eq!(
            format!("<html><body>{}\n</body></html>", FRAGMENT),
            doc
        );
        assert_eq!(1, doc.matches(NAV_MARKER).count());
    }

    #[test]
    fn test_inject_before_body_close() {
        let doc = "<html><body>\n<h1>Hi</h1>\n</body></html>";
        assert_eq!(
            Injection::Injected(format!(
                "<html><body>\n<h1>Hi</h1>\n{}\n</body></html>",
                FRAGMENT
            )),
            inject_nav(doc, FRAGMENT),
        );
    }

    #[test]
    fn test_inject_is_idempotent() {
        let doc = "<html><body><h1>Hi</h1></body></html>";
        let once = match inject_nav(doc, FRAGMENT) {
            Injection::Injected(once) => once,
            Injection::NoBody => panic!("expected a body"),
        };
        assert_eq!(Injection::Injected(once.clone()), inject_nav(&once, FRAGMENT));
        assert_eq!(1, find_nav_fragments(&once).len());
    }

    #[test]
    fn test_inject_replaces_restyled_fragment() {
        let doc = "<body><h1>Hi</h1><div data-slide-nav style=\"color: red\">old</div>\n</body>";
        let updated = match inject_nav(doc, FRAGMENT) {
            Injection::Injected(updated) => updated,
            Injection::NoBody => panic!("expected a body"),
        };
        assert_eq!(format!("<body><h1>Hi</h1>{}\n</body>", FRAGMENT), updated);
    }

    #[test]
    fn test_inject_body_without_close_tag() {
        assert_eq!(
            Injection::Injected(format!("<body><p>x{}\n</html>", FRAGMENT)),
            inject_nav("<body><p>x</html>", FRAGMENT),
        );
        assert_eq!(
            Injection::Injected(format!("<BODY>x{}\n", FRAGMENT)),
            inject_nav("<BODY>x", FRAGMENT),
        );
    }

    #[test]
    fn test_inject_without_body() {
        assert_eq!(Injection::NoBody, inject_nav("<p>fragment</p>", FRAGMENT));
        assert_eq!(
            Injection::NoBody,
            inject_nav("<!-- <body> --><p>x</p>", FRAGMENT)
        );
    }

    #[test]
    fn test_is_single_nav_fragment() {
        assert!(is_single_nav_fragment(&format!("\n  {}\n", FRAGMENT)));
        assert!(!is_single_nav_fragment("<div class=\"nav\"></div>"));
        assert!(!is_single_nav_fragment(&format!("{}<p></p>", FRAGMENT)));
        assert!(!is_single_nav_fragment("<div data-slide-nav><a>Home</a>"));
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(
            Some(String::from("Q3 &amp; Beyond")),
            extract_title("<head><TITLE>\n  Q3 &amp;\n Beyond </TITLE></head>"),
        );
        assert_eq!(None, extract_title("<head><title>  </title></head>"));
        assert_eq!(None, extract_title("<head></head><body>title</body>"));
        assert_eq!(
            Some(String::from("a < b")),
            extract_title("<title>a < b</title>")
        );
    }
}
