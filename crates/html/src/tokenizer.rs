//! Simplified HTML tokenizer with a constrained, practical tag-name character set.
//!
//! Supported tag-name characters (ASCII only): `[A-Za-z0-9:_-]`.
//! Attribute names use the same ASCII character class, plus `.` so that
//! framework-style names (`data-x.y`) survive intact.
//!
//! Known limitations:
//! - Not a full HTML5 tokenizer/state machine (no parse-error recovery).
//! - Rawtext close-tag scanning accepts only ASCII whitespace before `>`.
//! - Doctype parsing understands the `PUBLIC`/`SYSTEM` keyword forms and quoted
//!   identifiers; anything else after the name is ignored.
use crate::entities::decode_entities;
use crate::types::{Doctype, Token};
use memchr::memchr;

const HTML_COMMENT_START: &str = "<!--";
const HTML_COMMENT_END: &str = "-->";
const DOCTYPE_OPEN: &[u8] = b"<!doctype";

// < cannot appear in UTF-8 continuation bytes, so scanning for it bytewise is safe.
const SCRIPT_CLOSE_TAG: &[u8] = b"</script";
const STYLE_CLOSE_TAG: &[u8] = b"</style";

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':'
}

fn is_attr_name_char(c: u8) -> bool {
    is_name_char(c) || c == b'.'
}

fn find_rawtext_close_tag(haystack: &str, close_tag: &[u8]) -> Option<(usize, usize)> {
    let bytes = haystack.as_bytes();
    let len = bytes.len();
    let n = close_tag.len();
    let mut i = 0;
    while i + n <= len {
        let rel = memchr(b'<', &bytes[i..])?;
        i += rel;
        if i + n > len {
            return None;
        }
        if starts_with_ignore_ascii_case_at(bytes, i, close_tag) {
            let mut k = i + n;
            while k < len && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < len && bytes[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "keygen"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Parses the body of a doctype declaration (everything between `<!DOCTYPE` and `>`).
pub(crate) fn parse_doctype(body: &str) -> Doctype {
    let mut rest = body.trim_start();
    let name_end = rest
        .find(|c: char| c.is_ascii_whitespace())
        .unwrap_or(rest.len());
    let name = rest[..name_end].to_ascii_lowercase();
    rest = rest[name_end..].trim_start();

    let mut doctype = Doctype {
        name,
        ..Doctype::default()
    };

    let keyword_len = 6;
    if rest.len() < keyword_len || !rest.is_char_boundary(keyword_len) {
        return doctype;
    }
    let (keyword, tail) = rest.split_at(keyword_len);
    if keyword.eq_ignore_ascii_case("public") {
        let (public_id, tail) = take_quoted(tail);
        doctype.public_id = public_id.unwrap_or_default();
        let (system_id, _) = take_quoted(tail);
        doctype.system_id = system_id.unwrap_or_default();
    } else if keyword.eq_ignore_ascii_case("system") {
        let (system_id, _) = take_quoted(tail);
        doctype.system_id = system_id.unwrap_or_default();
    }
    doctype
}

fn take_quoted(input: &str) -> (Option<String>, &str) {
    let input = input.trim_start();
    let Some(quote) = input.chars().next().filter(|c| *c == '"' || *c == '\'') else {
        return (None, input);
    };
    let body = &input[1..];
    match body.find(quote) {
        Some(end) => (Some(body[..end].to_string()), &body[end + 1..]),
        None => (Some(body.to_string()), ""),
    }
}

pub fn tokenize(input: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut i = 0;
    // Slice endpoints only ever land on ASCII structural bytes, so they stay
    // valid UTF-8 boundaries.
    while i < len {
        if bytes[i] != b'<' {
            let start = i;
            i = memchr(b'<', &bytes[i..]).map_or(len, |rel| i + rel);
            let decoded = decode_entities(&input[start..i]);
            if !decoded.is_empty() {
                out.push(Token::Text(decoded));
            }
            continue;
        }

        if input[i..].starts_with(HTML_COMMENT_START) {
            let body_start = i + HTML_COMMENT_START.len();
            match input[body_start..].find(HTML_COMMENT_END) {
                Some(end) => {
                    out.push(Token::Comment(input[body_start..body_start + end].to_string()));
                    i = body_start + end + HTML_COMMENT_END.len();
                    continue;
                }
                None => {
                    out.push(Token::Comment(input[body_start..].to_string()));
                    break;
                }
            }
        }

        if starts_with_ignore_ascii_case_at(bytes, i, DOCTYPE_OPEN) {
            let body_start = i + DOCTYPE_OPEN.len();
            let Some(end) = memchr(b'>', &bytes[body_start..]) else {
                break;
            };
            out.push(Token::Doctype(parse_doctype(
                &input[body_start..body_start + end],
            )));
            i = body_start + end + 1;
            continue;
        }

        // other markup declarations / processing instructions are dropped
        if i + 1 < len && (bytes[i + 1] == b'!' || bytes[i + 1] == b'?') {
            i = memchr(b'>', &bytes[i..]).map_or(len, |rel| i + rel + 1);
            continue;
        }

        if i + 1 < len && bytes[i + 1] == b'/' {
            let start = i + 2;
            let mut j = start;
            while j < len && is_name_char(bytes[j]) {
                j += 1;
            }
            let name = input[start..j].to_ascii_lowercase();
            j = memchr(b'>', &bytes[j..]).map_or(len, |rel| j + rel + 1);
            if !name.is_empty() {
                out.push(Token::EndTag(name));
            }
            i = j;
            continue;
        }

        let start = i + 1;
        let mut j = start;
        while j < len && is_name_char(bytes[j]) {
            j += 1;
        }
        if j == start {
            // a lone '<' is text
            out.push(Token::Text("<".to_string()));
            i += 1;
            continue;
        }
        let name = input[start..j].to_ascii_lowercase();
        let (attributes, self_closing, next) = scan_attributes(input, j);
        let self_closing = self_closing || is_void_element(&name);
        let rawtext = !self_closing && (name == "script" || name == "style");
        out.push(Token::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });
        i = next;

        if rawtext {
            let close_tag = if name == "script" {
                SCRIPT_CLOSE_TAG
            } else {
                STYLE_CLOSE_TAG
            };
            match find_rawtext_close_tag(&input[i..], close_tag) {
                Some((rel_start, rel_end)) => {
                    let raw = &input[i..i + rel_start];
                    if !raw.is_empty() {
                        out.push(Token::Text(raw.to_string()));
                    }
                    out.push(Token::EndTag(name));
                    i += rel_end;
                }
                None => {
                    let raw = &input[i..];
                    if !raw.is_empty() {
                        out.push(Token::Text(raw.to_string()));
                    }
                    out.push(Token::EndTag(name));
                    break;
                }
            }
        }
    }
    log::trace!(target: "html.tokenizer", "tokenized {} bytes into {} tokens", len, out.len());
    out
}

type Attributes = Vec<(String, Option<String>)>;

/// Scans attributes starting right after the tag name; returns the attributes,
/// whether the tag was explicitly self-closed and the offset after `>`.
fn scan_attributes(input: &str, mut k: usize) -> (Attributes, bool, usize) {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut attributes: Attributes = Vec::new();
    let mut self_closing = false;

    let skip_whitespace = |k: &mut usize| {
        while *k < len && bytes[*k].is_ascii_whitespace() {
            *k += 1;
        }
    };

    loop {
        skip_whitespace(&mut k);
        if k >= len {
            break;
        }
        if bytes[k] == b'>' {
            k += 1;
            break;
        }
        if bytes[k] == b'/' {
            if k + 1 < len && bytes[k + 1] == b'>' {
                self_closing = true;
                k += 2;
                break;
            }
            k += 1;
            continue;
        }
        let name_start = k;
        while k < len && is_attr_name_char(bytes[k]) {
            k += 1;
        }
        if name_start == k {
            k += 1;
            continue;
        }
        let attribute_name = input[name_start..k].to_ascii_lowercase();

        skip_whitespace(&mut k);
        let value = if k < len && bytes[k] == b'=' {
            k += 1;
            skip_whitespace(&mut k);
            if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
                let quote = bytes[k];
                k += 1;
                let vstart = k;
                k = memchr(quote, &bytes[k..]).map_or(len, |rel| k + rel);
                let raw = &input[vstart..k];
                if k < len {
                    k += 1;
                }
                Some(decode_entities(raw))
            } else {
                let vstart = k;
                while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                    if bytes[k] == b'/' && k + 1 < len && bytes[k + 1] == b'>' {
                        break;
                    }
                    k += 1;
                }
                Some(decode_entities(&input[vstart..k]))
            }
        } else {
            None
        };
        // first occurrence wins, later duplicates are dropped
        if !attributes.iter().any(|(n, _)| *n == attribute_name) {
            attributes.push((attribute_name, value));
        }
    }
    (attributes, self_closing, k)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctype_of(input: &str) -> Doctype {
        match tokenize(input).into_iter().next() {
            Some(Token::Doctype(d)) => d,
            other => panic!("expected doctype token, got {other:?}"),
        }
    }

    #[test]
    fn tokenize_handles_mixed_case_doctype() {
        let d = doctype_of("<!DoCtYpE HTML>");
        assert_eq!(d.name, "html");
        assert!(d.public_id.is_empty());
        assert!(d.system_id.is_empty());
    }

    #[test]
    fn doctype_public_and_system_identifiers() {
        let d = doctype_of(
            r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#,
        );
        assert_eq!(d.name, "html");
        assert_eq!(d.public_id, "-//W3C//DTD HTML 4.01//EN");
        assert_eq!(d.system_id, "http://www.w3.org/TR/html4/strict.dtd");
    }

    #[test]
    fn doctype_system_legacy_compat() {
        let d = doctype_of("<!doctype html system 'about:legacy-compat'>");
        assert!(d.public_id.is_empty());
        assert_eq!(d.system_id, "about:legacy-compat");
    }

    #[test]
    fn tokenize_lowercases_names_and_keeps_bare_attributes() {
        let tokens = tokenize(r#"<INPUT Type=Email REQUIRED data-x.y="1">"#);
        assert_eq!(
            tokens,
            vec![Token::StartTag {
                name: "input".to_string(),
                attributes: vec![
                    ("type".to_string(), Some("Email".to_string())),
                    ("required".to_string(), None),
                    ("data-x.y".to_string(), Some("1".to_string())),
                ],
                self_closing: true,
            }]
        );
    }

    #[test]
    fn tokenize_finds_script_end_tag_case_insensitive() {
        let tokens = tokenize("<script>if (a < b) go();</ScRiPt><p>");
        assert!(
            matches!(
                tokens.as_slice(),
                [
                    Token::StartTag { name, .. },
                    Token::Text(body),
                    Token::EndTag(end),
                    Token::StartTag { .. },
                ] if name == "script" && body == "if (a < b) go();" && end == "script"
            ),
            "unexpected tokens: {tokens:?}"
        );
    }

    #[test]
    fn tokenize_preserves_utf8_text_and_decodes_entities() {
        let tokens = tokenize("<p>caf\u{e9} &amp; \u{1F60A}</p>");
        assert!(
            tokens
                .iter()
                .any(|t| matches!(t, Token::Text(s) if s == "caf\u{e9} & \u{1F60A}")),
            "got {tokens:?}"
        );
    }

    #[test]
    fn duplicate_attributes_keep_first() {
        let tokens = tokenize(r#"<a href="1" HREF="2">"#);
        let Token::StartTag { attributes, .. } = &tokens[0] else {
            panic!("expected start tag");
        };
        assert_eq!(attributes, &vec![("href".to_string(), Some("1".to_string()))]);
    }
}
