/// Decode a minimal, explicitly limited subset of HTML entities.
///
/// Named entities decoded: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`, `&nbsp;`.
/// Numeric entities decode only when well-formed and semicolon-terminated
/// (`&#123;`, `&#x1F4A9;`) and only to valid Unicode scalar values. Everything
/// else passes through unchanged.
pub(crate) fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    const NAMED: &[(&str, char)] = &[
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&apos;", '\''),
        ("&nbsp;", '\u{a0}'),
    ];
    const MAX_DIGITS: usize = 7;

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        if let Some((entity, ch)) = NAMED.iter().find(|(e, _)| rest.starts_with(e)) {
            out.push(*ch);
            rest = &rest[entity.len()..];
            continue;
        }

        if let Some((ch, consumed)) = decode_numeric(rest, MAX_DIGITS) {
            out.push(ch);
            rest = &rest[consumed..];
            continue;
        }

        out.push('&');
        rest = &rest[1..];
    }
    out.push_str(rest);
    out
}

/// `input` starts with `&`; returns the decoded char and the bytes consumed.
fn decode_numeric(input: &str, max_digits: usize) -> Option<(char, usize)> {
    let body = input.strip_prefix("&#")?;
    let (digits_start, radix) = match body.as_bytes().first() {
        Some(b'x') | Some(b'X') => (1, 16),
        _ => (0, 10),
    };
    let semi = body.find(';')?;
    let digits = &body[digits_start..semi];
    if digits.is_empty()
        || digits.len() > max_digits
        || !digits.chars().all(|c| c.is_digit(radix))
    {
        return None;
    }
    let value = u32::from_str_radix(digits, radix).ok()?;
    let ch = char::from_u32(value)?;
    Some((ch, 2 + semi + 1))
}

#[cfg(test)]
mod tests {
    use super::decode_entities;

    #[test]
    fn decodes_named_and_numeric() {
        assert_eq!(decode_entities("a &lt;b&gt; &#65;&#x42;"), "a <b> AB");
    }

    #[test]
    fn leaves_malformed_entities_alone() {
        assert_eq!(decode_entities("&unknown; &#xZZ; &#12"), "&unknown; &#xZZ; &#12");
    }

    #[test]
    fn rejects_invalid_scalars() {
        assert_eq!(decode_entities("&#xD800;"), "&#xD800;");
    }
}
