//! Download filename derivation
//!
//! Strategies are tried in order and the first non-empty answer wins:
//! the upstream `Content-Disposition` filename, then the last path segment
//! of the backend URL, then [`DEFAULT_FILENAME`].

pub const DEFAULT_FILENAME: &str = "easynews.nzb";

const NZB_EXTENSION: &str = ".nzb";

/// Pick the filename for a proxied download
pub fn derive_filename(content_disposition: Option<&str>, url: &str) -> String {
    content_disposition
        .and_then(from_content_disposition)
        .and_then(usable)
        .or_else(|| from_url_path(url).and_then(usable))
        .unwrap_or_else(|| DEFAULT_FILENAME.to_string())
}

fn usable(name: String) -> Option<String> {
    let name = sanitize(&name);
    (!name.is_empty()).then_some(name)
}

fn from_content_disposition(header: &str) -> Option<String> {
    let (_, rest) = header.split_once("filename=")?;
    let name = rest
        .trim()
        .trim_matches(|c| c == '"' || c == ';');
    (!name.is_empty()).then(|| name.to_string())
}

fn from_url_path(url: &str) -> Option<String> {
    let path = url.split('?').next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);

    if segment.is_empty() {
        return None;
    }

    if segment.to_lowercase().ends_with(NZB_EXTENSION) {
        Some(segment.to_string())
    } else {
        Some(format!("{segment}{NZB_EXTENSION}"))
    }
}

/// Make a name safe to put inside a quoted header parameter
fn sanitize(name: &str) -> String {
    sanitize_filename::sanitize(name)
        .chars()
        .filter(|c| *c != '"' && !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}
