//! Subject line cleanup
//!
//! Easynews subjects look like
//! `1a2b3c4d5e6f "Some.Movie.2020.1080p.mkv" yEnc (1/50)` or
//! `poster (Some.Show.S01E01.720p.HDTV)`. The heuristics below pull out the
//! release name and turn separators into spaces.

pub const DEFAULT_TITLE: &str = "No title";

/// Minimum length of a leading token treated as a backend message id
const MIN_ID_TOKEN_LEN: usize = 8;

/// A parenthesised candidate needs more than this many characters
const MIN_PAREN_TAIL_CHARS: usize = 10;

/// Normalize a raw backend subject into a release title. Never empty.
pub fn normalize(raw: &str) -> String {
    let title = if raw.is_empty() { DEFAULT_TITLE } else { raw };

    let title = strip_id_token(title);
    let title = extract_candidate(&title);
    let title = title.replace(['.', '_'], " ");
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");

    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title
    }
}

fn strip_id_token(title: &str) -> String {
    let mut parts = title.split_whitespace();
    let Some(first) = parts.next() else {
        return title.to_string();
    };

    if first.len() < MIN_ID_TOKEN_LEN || !first.chars().all(|c| c.is_ascii_hexdigit()) {
        return title.to_string();
    }

    let rest = parts.collect::<Vec<_>>().join(" ");
    if rest.is_empty() {
        title.to_string()
    } else {
        rest
    }
}

fn extract_candidate(title: &str) -> String {
    if let Some(open) = title.find('"') {
        let after = &title[open + 1..];
        return match after.find('"') {
            Some(close) if close > 0 => after[..close].to_string(),
            _ => title.to_string(),
        };
    }

    if let Some(open) = title.find('(') {
        let tail = &title[open..];
        if tail.chars().count() > MIN_PAREN_TAIL_CHARS {
            let inner = &tail[1..];
            return inner.strip_suffix(')').unwrap_or(inner).to_string();
        }
    }

    title.to_string()
}
