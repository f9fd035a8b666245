//! Multi-document manifest handling
//!
//! Helm hands the postrenderer one stream with every rendered resource,
//! separated by `---` lines. The stream is cut into sections so that each
//! resource can be inspected on its own, then glued back together.

/// Separator between resources in a rendered manifest stream
pub const RESOURCES_SEPARATOR: &str = "---\n";

/// A contiguous slice of the input between two separators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section<'a> {
    /// Position of the section in the stream (0-based)
    pub index: usize,
    /// Raw text, without the separator
    pub text: &'a str,
}

impl Section<'_> {
    /// True if the section holds no YAML content
    pub fn is_blank(&self) -> bool {
        is_whitespace_or_comments(self.text)
    }
}

/// Split a manifest stream into sections
///
/// The separator is only honoured at the start of a line, so a scalar that
/// happens to end in `---` stays inside its document. There is always at
/// least one section, possibly empty.
pub fn split_sections(text: &str) -> Vec<Section<'_>> {
    let bytes = text.as_bytes();
    let mut sections = Vec::new();
    let mut start = 0;
    let mut search = 0;

    while let Some(pos) = text[search..].find(RESOURCES_SEPARATOR) {
        let at = search + pos;
        if at == 0 || bytes[at - 1] == b'\n' {
            sections.push(Section {
                index: sections.len(),
                text: &text[start..at],
            });
            start = at + RESOURCES_SEPARATOR.len();
            search = start;
        } else {
            search = at + 1;
        }
    }

    sections.push(Section {
        index: sections.len(),
        text: &text[start..],
    });
    sections
}

/// Join section texts back into a manifest stream
///
/// Inverse of [`split_sections`]: the separator is emitted before every
/// section but the first.
pub fn join_sections<I, S>(sections: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut buf = String::new();
    for (i, section) in sections.into_iter().enumerate() {
        if i > 0 {
            buf.push_str(RESOURCES_SEPARATOR);
        }
        buf.push_str(section.as_ref());
    }
    buf
}

/// Returns true if the text is empty, whitespace or comments only
///
/// Lines starting with `--` count as comments too, which covers stray
/// separators such as a trailing `---` without a newline.
pub fn is_whitespace_or_comments(text: &str) -> bool {
    text.split('\n').all(|line| {
        let t = line.trim();
        t.is_empty() || t.starts_with('#') || t.starts_with("--")
    })
}
