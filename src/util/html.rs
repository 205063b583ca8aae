/// Reduce an HTML fragment from a feed summary to plain text.
///
/// `<script>` and `<style>` blocks are dropped with their content, other
/// tags are removed, the common character entities are decoded and runs of
/// whitespace collapse to one space. Only real HTML tags are removed (see
/// [`html_tag_len`]), so prose such as "M < 10^9" or "M<Mcrit" survives.
///
/// ```
/// use feedsift::util::strip_html;
///
/// assert_eq!(strip_html("<p>AGN &amp; quasars</p>\n<p>z &lt; 2</p>"), "AGN & quasars z < 2");
/// assert_eq!(strip_html("halos with M<Mcrit > 10^9"), "halos with M<Mcrit > 10^9");
/// ```
pub fn strip_html(input: &str) -> String {
    if !input.contains(['<', '&']) {
        return collapse_whitespace(input);
    }

    let without_blocks = drop_blocks(input);
    let mut text = String::with_capacity(without_blocks.len());
    let mut rest = without_blocks.as_str();

    while let Some(idx) = rest.find('<') {
        text.push_str(&rest[..idx]);
        match html_tag_len(&rest[idx..]) {
            Some(len) => {
                // Tags separate words
                text.push(' ');
                rest = &rest[idx + len..];
            }
            None => {
                text.push('<');
                rest = &rest[idx + 1..];
            }
        }
    }
    text.push_str(rest);

    collapse_whitespace(&decode_entities(&text))
}

/// Elements that show up in feed summaries, arXiv abstracts included.
const KNOWN_ELEMENTS: &[&str] = &[
    "a", "abbr", "article", "b", "big", "blockquote", "body", "br", "center", "cite", "code", "dd",
    "del", "div", "dl", "dt", "em", "figcaption", "figure", "font", "footer", "h1", "h2", "h3",
    "h4", "h5", "h6", "head", "header", "hr", "html", "i", "img", "ins", "li", "link", "mark",
    "math", "meta", "mi", "mn", "mo", "mrow", "msub", "msubsup", "msup", "nav", "ol", "p", "pre",
    "q", "s", "script", "section", "small", "span", "strong", "style", "sub", "sup", "table",
    "tbody", "td", "th", "thead", "title", "tr", "tt", "u", "ul",
];

/// Byte length of the HTML tag at the start of `s`, or `None` when the `<`
/// there is prose.
///
/// A tag is `<name ...>` or `</name>` for a known element name, where the
/// name ends at whitespace, `/` or `>`, or a `<!...>` comment or doctype.
/// The closing `>` must come before any further `<`.
///
/// ```
/// use feedsift::util::html_tag_len;
///
/// assert_eq!(html_tag_len("<p class=\"x\">text"), Some(13));
/// assert_eq!(html_tag_len("</sub> rest"), Some(6));
/// assert_eq!(html_tag_len("<Mcrit host > 10"), None);
/// assert_eq!(html_tag_len("< 10^9"), None);
/// ```
pub fn html_tag_len(s: &str) -> Option<usize> {
    let rest = s.strip_prefix('<')?;
    let close = rest.find('>')?;
    let inner = &rest[..close];
    if inner.contains('<') {
        return None;
    }
    let len = close + 2;

    if inner.starts_with('!') {
        return Some(len);
    }

    let body = inner.strip_prefix('/').unwrap_or(inner);
    let name_end = body
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(body.len());
    let (name, after) = body.split_at(name_end);
    let name_ends_cleanly = after.is_empty() || after.starts_with(|c: char| c.is_whitespace() || c == '/');
    if name.is_empty() || !name_ends_cleanly {
        return None;
    }

    let name = name.to_ascii_lowercase();
    KNOWN_ELEMENTS.contains(&name.as_str()).then_some(len)
}

/// Remove `<script>` and `<style>` elements including their content.
fn drop_blocks(input: &str) -> String {
    let mut buf = input.to_string();
    for tag in ["script", "style"] {
        let open = format!("<{tag}");
        let close = format!("</{tag}>");
        // ASCII lowercasing keeps byte offsets aligned with `buf`
        while let Some(start) = buf.to_ascii_lowercase().find(&open) {
            let end = buf.to_ascii_lowercase()[start..]
                .find(&close)
                .map_or(buf.len(), |rel| start + rel + close.len());
            buf.replace_range(start..end, "");
        }
    }
    buf
}

fn decode_entities(text: &str) -> String {
    const ENTITIES: [(&str, &str); 6] = [
        ("&lt;", "<"),
        ("&gt;", ">"),
        ("&quot;", "\""),
        ("&#39;", "'"),
        ("&nbsp;", " "),
        // Last so "&amp;lt;" decodes to "&lt;" and not "<"
        ("&amp;", "&"),
    ];
    if !text.contains('&') {
        return text.to_string();
    }
    ENTITIES
        .iter()
        .fold(text.to_string(), |acc, (entity, plain)| acc.replace(entity, plain))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
