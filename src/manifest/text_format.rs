//! Line-terminator conventions captured from raw file content

use std::borrow::Cow;

/// Line terminator sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Newline {
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
    /// bare `\r`
    Cr,
}

impl Newline {
    /// The terminator as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Newline::Lf => "\n",
            Newline::CrLf => "\r\n",
            Newline::Cr => "\r",
        }
    }

    /// Terminator used by the current platform
    pub fn platform() -> Self {
        if cfg!(windows) {
            Newline::CrLf
        } else {
            Newline::Lf
        }
    }
}

/// Formatting state that must survive a rewrite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextFormat {
    /// Line terminator of the file
    pub newline: Newline,
    /// Whether the last byte of the file is a line terminator
    pub trailing_newline: bool,
}

impl TextFormat {
    /// Detect the format of raw content
    ///
    /// The first terminator in the file decides the style. Files without any
    /// terminator use the platform default.
    pub fn detect(content: &str) -> Self {
        let bytes = content.as_bytes();
        let newline = bytes
            .iter()
            .position(|&b| b == b'\r' || b == b'\n')
            .map(|i| match (bytes[i], bytes.get(i + 1)) {
                (b'\r', Some(b'\n')) => Newline::CrLf,
                (b'\r', _) => Newline::Cr,
                _ => Newline::Lf,
            })
            .unwrap_or_else(Newline::platform);
        let trailing_newline = content.ends_with('\n') || content.ends_with('\r');

        Self {
            newline,
            trailing_newline,
        }
    }

    /// Re-apply this format to content
    ///
    /// Every line terminator is rewritten to the captured style and the
    /// trailing terminator is added or removed to match. Content that already
    /// conforms is returned unchanged.
    pub fn apply<'a>(&self, content: &'a str) -> Cow<'a, str> {
        let mut normalized = normalize_newlines(content, self.newline);

        let has_trailing = normalized.ends_with('\n') || normalized.ends_with('\r');
        if self.trailing_newline && !has_trailing {
            normalized.to_mut().push_str(self.newline.as_str());
        } else if !self.trailing_newline && has_trailing {
            let trimmed = normalized.trim_end_matches(['\r', '\n']).len();
            normalized.to_mut().truncate(trimmed);
        }
        normalized
    }
}

fn normalize_newlines(content: &str, newline: Newline) -> Cow<'_, str> {
    let target = newline.as_str();
    let bytes = content.as_bytes();
    let conforms = {
        let mut i = 0;
        let mut ok = true;
        while i < bytes.len() {
            match bytes[i] {
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                    ok &= newline == Newline::CrLf;
                    i += 2;
                    continue;
                }
                b'\r' => ok &= newline == Newline::Cr,
                b'\n' => ok &= newline == Newline::Lf,
                _ => {}
            }
            if !ok {
                break;
            }
            i += 1;
        }
        ok
    };
    if conforms {
        return Cow::Borrowed(content);
    }

    let mut out = String::with_capacity(content.len() + 16);
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str(target);
            }
            '\n' => out.push_str(target),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}
