use super::visitor::HtmlVisitor;

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

/// Elements whose content is raw text, not markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Scan HTML source and emit events to all registered visitors.
/// This is a "lossy" lexer: it recognizes tags, attributes and character data,
/// and skips comments, doctypes, processing instructions and script/style bodies.
/// Unclosed or stray markup never fails the scan.
pub fn scan_html(source: &str, visitors: &mut [&mut dyn HtmlVisitor]) {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut i = 0;
    let mut text_start = 0;

    while i < len {
        if bytes[i] != b'<' || i + 1 >= len {
            i += 1;
            continue;
        }

        let next = bytes[i + 1];
        let is_markup = next == b'/' || next == b'!' || next == b'?' || next.is_ascii_alphabetic();
        if !is_markup {
            i += 1;
            continue;
        }

        emit_text(&source[text_start..i], visitors);

        // ── Comment: <!-- ... --> ──
        if starts_with_at(bytes, i, b"<!--") {
            i = match find_from(source, i + 4, "-->") {
                Some(end) => end + 3,
                None => len,
            };
            text_start = i;
            continue;
        }

        // ── Doctype / processing instruction ──
        if next == b'!' || next == b'?' {
            i = skip_past(bytes, i, b'>');
            text_start = i;
            continue;
        }

        // ── Closing tag: </name> ──
        if next == b'/' {
            let (tag_name, tag_end) = read_tag_name(bytes, i + 2);
            if !tag_name.is_empty() {
                for v in visitors.iter_mut() {
                    v.on_tag_close(&tag_name);
                }
            }
            i = skip_past(bytes, tag_end, b'>');
            text_start = i;
            continue;
        }

        // ── Opening tag ──
        let (tag_name, name_end) = read_tag_name(bytes, i + 1);
        let tag_close = find_tag_close(bytes, name_end);
        let raw_tag = &source[i..tag_close];
        let is_self_closing = raw_tag.ends_with("/>") || VOID_ELEMENTS.contains(&tag_name.as_str());

        if RAW_TEXT_ELEMENTS.contains(&tag_name.as_str()) && !is_self_closing {
            let closing = format!("</{tag_name}");
            i = match find_from_ci(source, tag_close, &closing) {
                Some(end) => skip_past(bytes, end, b'>'),
                None => len,
            };
            text_start = i;
            continue;
        }

        for v in visitors.iter_mut() {
            v.on_tag_open(&tag_name, is_self_closing, raw_tag);
        }
        i = tag_close;
        text_start = i;
    }

    emit_text(&source[text_start..], visitors);

    for v in visitors.iter_mut() {
        v.on_document_end();
    }
}

fn emit_text(raw: &str, visitors: &mut [&mut dyn HtmlVisitor]) {
    if raw.is_empty() {
        return;
    }
    let text = decode_entities(raw);
    for v in visitors.iter_mut() {
        v.on_text(&text);
    }
}

/// Read the value of attribute `name` (case-insensitive) from a raw opening tag.
/// Quoted, single-quoted and unquoted values are supported; entities are decoded.
/// A bare attribute without `=` yields an empty string.
pub fn attribute_value(raw_tag: &str, name: &str) -> Option<String> {
    let bytes = raw_tag.as_bytes();
    let len = bytes.len();
    let (_, mut j) = read_tag_name(bytes, 1);

    while j < len {
        j = skip_ws(bytes, j);
        if j >= len || bytes[j] == b'>' || bytes[j] == b'/' {
            j += 1;
            continue;
        }

        let attr_start = j;
        while j < len && !bytes[j].is_ascii_whitespace() && !matches!(bytes[j], b'=' | b'>' | b'/') {
            j += 1;
        }
        let attr_name = &raw_tag[attr_start..j];
        if attr_name.is_empty() {
            j += 1;
            continue;
        }

        let after_name = skip_ws(bytes, j);
        let value = if after_name < len && bytes[after_name] == b'=' {
            let v_start = skip_ws(bytes, after_name + 1);
            if v_start < len && (bytes[v_start] == b'"' || bytes[v_start] == b'\'') {
                let quote = bytes[v_start];
                let mut v_end = v_start + 1;
                while v_end < len && bytes[v_end] != quote {
                    v_end += 1;
                }
                j = (v_end + 1).min(len);
                &raw_tag[v_start + 1..v_end.min(len)]
            } else {
                let mut v_end = v_start;
                while v_end < len && !bytes[v_end].is_ascii_whitespace() && bytes[v_end] != b'>' {
                    v_end += 1;
                }
                j = v_end;
                &raw_tag[v_start.min(v_end)..v_end]
            }
        } else {
            j = after_name;
            ""
        };

        if attr_name.eq_ignore_ascii_case(name) {
            return Some(decode_entities(value));
        }
    }

    None
}

/// Decode the common named entities and numeric character references.
/// Unknown entities are left untouched.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail.find(';').filter(|&semi| semi <= 10).and_then(|semi| {
            let entity = &tail[1..semi];
            let ch = match entity {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                _ => numeric_reference(entity),
            };
            ch.map(|c| (c, semi + 1))
        });

        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn numeric_reference(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse().ok()?,
    };
    char::from_u32(code)
}

// ── Helper Functions ──────────────────────────────────────────────────

/// Valid tag-name characters: letters, digits, hyphen, colon, underscore
fn is_tag_name_ch(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == b'-' || ch == b':' || ch == b'_'
}

/// Read a tag name starting at `start`. Returns (lowercased name, end_position).
fn read_tag_name(bytes: &[u8], start: usize) -> (String, usize) {
    let start = start.min(bytes.len());
    let mut end = start;
    while end < bytes.len() && is_tag_name_ch(bytes[end]) {
        end += 1;
    }
    let name = String::from_utf8_lossy(&bytes[start..end]).to_ascii_lowercase();
    (name, end)
}

/// Skip whitespace from position i.
fn skip_ws(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    i
}

/// Position just past the next `target` at or after `from`, or the end of input.
fn skip_past(bytes: &[u8], from: usize, target: u8) -> usize {
    let mut j = from;
    while j < bytes.len() && bytes[j] != target {
        j += 1;
    }
    (j + 1).min(bytes.len())
}

/// Check if bytes at position `at` start with `prefix`.
fn starts_with_at(bytes: &[u8], at: usize, prefix: &[u8]) -> bool {
    bytes.len() >= at + prefix.len() && &bytes[at..at + prefix.len()] == prefix
}

fn find_from(source: &str, from: usize, needle: &str) -> Option<usize> {
    source.get(from..)?.find(needle).map(|p| p + from)
}

/// Case-insensitive ASCII search.
fn find_from_ci(source: &str, from: usize, needle: &str) -> Option<usize> {
    let hay = source.as_bytes();
    let needle = needle.as_bytes();
    (from..hay.len().saturating_sub(needle.len() - 1)).find(|&p| hay[p..p + needle.len()].eq_ignore_ascii_case(needle))
}

/// Find the byte offset just past the closing `>` of a tag, skipping quoted
/// attribute values. Returns the end of input for an unterminated tag.
fn find_tag_close(bytes: &[u8], from_pos: usize) -> usize {
    let len = bytes.len();
    let mut j = from_pos;

    while j < len {
        let ch = bytes[j];
        if ch == b'"' || ch == b'\'' {
            j += 1;
            while j < len && bytes[j] != ch {
                j += 1;
            }
            j += 1;
            continue;
        }
        if ch == b'>' {
            return j + 1;
        }
        j += 1;
    }

    len
}
