//! Text comparison between the original plaintext and whatever the
//! receiver recovered.

/// Marker line the receiver prints before the recovered message.
pub const DECRYPTED_MARKER: &str = "Decrypted Message:";

/// Canonicalize text for comparison: CRLF/CR to LF, trim, collapse
/// space/tab runs to one space, collapse newline runs to one newline.
pub fn normalize_text(s: &str) -> String {
    let s = s.replace("\r\n", "\n").replace('\r', "\n");
    let s = s.trim();

    let mut out = String::with_capacity(s.len());
    let mut in_blank = false;
    for c in s.chars() {
        if c == ' ' || c == '\t' {
            if !in_blank {
                out.push(' ');
            }
            in_blank = true;
        } else {
            out.push(c);
            in_blank = false;
        }
    }

    let mut collapsed = String::with_capacity(out.len());
    let mut in_newline = false;
    for c in out.chars() {
        if c == '\n' {
            if !in_newline {
                collapsed.push('\n');
            }
            in_newline = true;
        } else {
            collapsed.push(c);
            in_newline = false;
        }
    }
    collapsed
}

pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Positional character-similarity ratio between two texts after
/// normalization: matching indices over the longer length. Both empty is
/// a perfect 1.0; exactly one empty is 0.0.
pub fn similarity_quick(a: &str, b: &str) -> f64 {
    let a = normalize_text(a);
    let b = normalize_text(b);
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let eq = a_chars
        .iter()
        .zip(b_chars.iter())
        .filter(|(x, y)| x == y)
        .count();
    eq as f64 / a_chars.len().max(b_chars.len()) as f64
}

/// Pull the recovered text out of the receiver's stdout: everything after
/// the first marker line. Without a marker (or with nothing after it on
/// the same line), the whole trimmed stdout is used.
pub fn parse_receiver_output(stdout: &str) -> String {
    if let Some(idx) = stdout.find(DECRYPTED_MARKER) {
        let rest = &stdout[idx + DECRYPTED_MARKER.len()..];
        if let Some(nl) = rest.find('\n') {
            return rest[nl + 1..].trim().to_string();
        }
    }
    stdout.trim().to_string()
}
