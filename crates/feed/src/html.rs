//! Minimal HTML text helpers for scraping a single value out of a page.
//!
//! Offsets are computed on an ASCII-lowercased copy of the source, which has
//! the same byte length and char boundaries as the original.

/// Elements whose content is never rendered as text.
const INVISIBLE_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Finds the next `<name` opening tag at or after `from`.
fn find_open_tag(lc: &str, name: &str, from: usize) -> Option<usize> {
    let pat = format!("<{}", name);
    let mut pos = from;
    loop {
        let start = lc.get(pos..)?.find(&pat)? + pos;
        let after = start + pat.len();
        match lc.as_bytes().get(after) {
            None => return None,
            Some(b) if *b == b'>' || *b == b'/' || b.is_ascii_whitespace() => return Some(start),
            Some(_) => pos = after,
        }
    }
}

/// Finds the next `</name>` closing tag at or after `from`.
/// Returns `(start, end)` where `end` is one past the closing `>`.
fn find_close_tag(lc: &str, name: &str, from: usize) -> Option<(usize, usize)> {
    let pat = format!("</{}", name);
    let start = lc.get(from..)?.find(&pat)? + from;
    let end = lc[start..].find('>')? + start + 1;
    Some((start, end))
}

/// Earliest opening tag among `names`.
fn find_any_open_tag(lc: &str, names: &[&str], from: usize) -> Option<usize> {
    names
        .iter()
        .filter_map(|name| find_open_tag(lc, name, from))
        .min()
}

/// Drops `<!-- ... -->` comments. An unterminated comment swallows the rest.
fn strip_comments(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find("<!--") {
        out.push_str(&rest[..start]);
        match rest[start + 4..].find("-->") {
            Some(end) => rest = &rest[start + 4 + end + 3..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

/// Drops every `<name ...>...</name>` block.
fn strip_element(html: &str, name: &str) -> String {
    let lc = html.to_ascii_lowercase();
    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(start) = find_open_tag(&lc, name, pos) {
        out.push_str(&html[pos..start]);
        match find_close_tag(&lc, name, start) {
            Some((_, end)) => pos = end,
            None => return out,
        }
    }
    out.push_str(&html[pos..]);
    out
}

/// Removes comments and non-rendered elements.
pub fn remove_invisible(html: &str) -> String {
    INVISIBLE_ELEMENTS
        .iter()
        .fold(strip_comments(html), |acc, name| strip_element(&acc, name))
}

/// Elements that start a new line of rendered text. Everything else is inline.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "br", "dd", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "head", "header", "hr", "html", "li", "main", "nav", "ol", "p", "pre", "section", "table",
    "td", "th", "title", "tr", "ul",
];

fn is_block_tag(tag: &str) -> bool {
    let name: String = tag
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    BLOCK_ELEMENTS.contains(&name.as_str())
}

/// # Summary
/// Flattens markup to text.
///
/// # Logic
/// 1. Block-level tags (and `<br>`) become `block_sep`.
/// 2. Inline tags vanish, so `<b>4.52</b>%` stays `4.52%`.
/// 3. An unterminated tag swallows the rest of the input.
pub fn strip_tags(s: &str, block_sep: char) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let tag = &rest[open + 1..];
        let Some(close) = tag.find('>') else {
            return out;
        };
        if is_block_tag(&tag[..close]) {
            out.push(block_sep);
        }
        rest = &tag[close + 1..];
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "nbsp" => Some(' '),
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "percnt" => Some('%'),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(|c: char| c == 'x' || c == 'X') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Decodes the handful of entities that show up around numbers and labels.
/// Unknown entities are left as written.
pub fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let decoded = tail
            .find(';')
            .filter(|&semi| semi > 0 && semi <= 8)
            .and_then(|semi| decode_entity(&tail[..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Collapses whitespace runs into a single space and trims.
pub fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// # Summary
/// The rendered text of a page, one text run per line.
///
/// # Logic
/// 1. Removes comments, scripts and styles.
/// 2. Breaks lines at newlines and block-level tags; inline markup is joined.
/// 3. Decodes entities, normalizes whitespace and drops empty lines.
pub fn visible_lines(html: &str) -> Vec<String> {
    let text = strip_tags(&remove_invisible(html), '\n');
    text.lines()
        .map(|line| normalize_ws(&decode_entities(line)))
        .filter(|line| !line.is_empty())
        .collect()
}

/// # Summary
/// Text of every table row's cells (`td` and `th`), in document order.
///
/// # Logic
/// 1. A row runs from `<tr` to its `</tr>`, or to the next `<tr` when the
///    closing tag is omitted.
/// 2. A cell runs from `<td`/`<th` to its closing tag, or to the next cell.
/// 3. Cell markup is flattened to plain text.
pub fn table_rows(html: &str) -> Vec<Vec<String>> {
    let html = remove_invisible(html);
    let lc = html.to_ascii_lowercase();
    let mut rows = Vec::new();
    let mut pos = 0;

    while let Some(row_start) = find_open_tag(&lc, "tr", pos) {
        let Some(open_end) = lc[row_start..].find('>').map(|i| row_start + i + 1) else {
            break;
        };
        let next_row = find_open_tag(&lc, "tr", open_end).unwrap_or(lc.len());
        let row_end = find_close_tag(&lc, "tr", open_end)
            .map(|(start, _)| start)
            .filter(|&start| start < next_row)
            .unwrap_or(next_row);

        rows.push(row_cells(&html[open_end..row_end], &lc[open_end..row_end]));
        pos = row_end;
    }
    rows
}

fn row_cells(row: &str, lc: &str) -> Vec<String> {
    const CELLS: [&str; 2] = ["td", "th"];
    let mut cells = Vec::new();
    let mut pos = 0;

    while let Some(cell_start) = find_any_open_tag(lc, &CELLS, pos) {
        let Some(open_end) = lc[cell_start..].find('>').map(|i| cell_start + i + 1) else {
            break;
        };
        let next_cell = find_any_open_tag(lc, &CELLS, open_end).unwrap_or(lc.len());
        let close = CELLS
            .iter()
            .filter_map(|name| find_close_tag(lc, name, open_end).map(|(start, _)| start))
            .min()
            .filter(|&start| start < next_cell)
            .unwrap_or(next_cell);

        let text = strip_tags(&row[open_end..close], ' ');
        cells.push(normalize_ws(&decode_entities(&text)));
        pos = close;
    }
    cells
}
