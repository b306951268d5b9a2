//! Fenced code tracking for the directive splitter.
//!
//! Directive fences inside fenced code are literal text, so the splitter
//! feeds every line through a [`FenceTracker`] before looking for `:::`.

/// An open code fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFence {
    /// Fence marker character (`` ` `` or `~`).
    pub marker: char,
    /// Length of the opening run.
    pub length: usize,
}

/// Line-by-line CommonMark code fence tracker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FenceTracker {
    open: Option<OpenFence>,
}

impl FenceTracker {
    /// Creates a tracker outside any fence.
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently open fence, if any.
    pub fn open_fence(&self) -> Option<OpenFence> {
        self.open
    }

    /// True while inside a fence.
    pub fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Feeds one line and reports whether it belongs to fenced code
    /// (opening and closing fence lines included).
    pub fn observe(&mut self, line: &str) -> bool {
        let (columns, bytes) = leading_whitespace(line);
        // 4+ columns is an indented code line, never a fence.
        let candidate = if columns <= 3 {
            fence_run(&line[bytes..])
        } else {
            None
        };

        match self.open {
            None => {
                if let Some((marker, length, info)) = candidate {
                    // Backtick fences may not carry backticks in the info string.
                    if marker == '`' && info.contains('`') {
                        return false;
                    }
                    self.open = Some(OpenFence { marker, length });
                    return true;
                }
                false
            }
            Some(open) => {
                if let Some((marker, length, info)) = candidate {
                    if marker == open.marker && length >= open.length && info.trim().is_empty() {
                        self.open = None;
                    }
                }
                true
            }
        }
    }
}

/// Returns (visual columns, byte offset) of leading whitespace; tabs advance
/// to the next multiple of four.
pub(crate) fn leading_whitespace(line: &str) -> (usize, usize) {
    let mut columns = 0;
    let mut bytes = 0;
    for b in line.bytes() {
        match b {
            b' ' => columns += 1,
            b'\t' => columns += 4 - (columns % 4),
            _ => break,
        }
        bytes += 1;
    }
    (columns, bytes)
}

/// Marker, run length and the rest of the line for a 3+ run of `` ` `` or `~`.
fn fence_run(text: &str) -> Option<(char, usize, &str)> {
    let marker = text.chars().next()?;
    if marker != '`' && marker != '~' {
        return None;
    }
    let length = text.chars().take_while(|c| *c == marker).count();
    if length < 3 {
        return None;
    }
    Some((marker, length, &text[length..]))
}
