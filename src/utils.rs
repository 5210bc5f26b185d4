use std::borrow::Cow;

/// Max number of chars of a payload shown in log messages
pub const PREVIEW_LEN: usize = 80;

/// Replaces line breaks (`\r\n`, `\n` or a lone `\r`) with a single `↵`
pub fn make_single_line(s: &str) -> Cow<str> {
    if s.contains(['\n', '\r']) {
        Cow::Owned(s.replace("\r\n", "↵").replace(['\n', '\r'], "↵"))
    } else {
        Cow::Borrowed(s)
    }
}

/// Single line version of `s` cut to at most [`PREVIEW_LEN`] chars, suitable for a log line
pub fn preview(s: &str) -> String {
    let line = make_single_line(s);
    match line.char_indices().nth(PREVIEW_LEN) {
        Some((idx, _)) => format!("{}… ({} bytes total)", &line[..idx], s.len()),
        None => line.into_owned(),
    }
}
