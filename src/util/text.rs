use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";
const ELLIPSIS_WIDTH: usize = 3;

/// Width of `s` in terminal columns (CJK and emoji count as two).
///
/// ```
/// use feedsift::util::display_width;
///
/// assert_eq!(display_width("AGN"), 3);
/// assert_eq!(display_width("銀河"), 4);
/// ```
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Cut `s` so it occupies at most `max_width` columns, ending in "..." when
/// something was removed.
///
/// Widths of three columns or less have no room for the ellipsis and get
/// the leading characters that fit. Returns the input borrowed when it
/// already fits.
///
/// ```
/// use feedsift::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Stellar streams", 10), "Stellar...");
/// assert_eq!(truncate_to_width("Halo", 10), "Halo");
/// assert_eq!(truncate_to_width("Halo", 2), "Ha");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if max_width == 0 {
        return Cow::Borrowed("");
    }

    if max_width <= ELLIPSIS_WIDTH {
        let mut end = 0;
        let mut width = 0;
        for (idx, c) in s.char_indices() {
            let w = UnicodeWidthChar::width(c).unwrap_or(0);
            if width + w > max_width {
                break;
            }
            width += w;
            end = idx + c.len_utf8();
        }
        return if end == s.len() {
            Cow::Borrowed(s)
        } else {
            Cow::Owned(s[..end].to_string())
        };
    }

    let target = max_width - ELLIPSIS_WIDTH;
    let mut width = 0;
    let mut cut = None;

    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if cut.is_none() && width + w > target {
            cut = Some(idx);
        }
        if width + w > max_width {
            let cut = cut.unwrap_or(idx);
            return Cow::Owned(format!("{}{}", s[..cut].trim_end(), ELLIPSIS));
        }
        width += w;
    }

    Cow::Borrowed(s)
}

fn is_stripped(b: u8) -> bool {
    b == 0x1b || b == 0x7f || (b < 0x20 && b != b'\t' && b != b'\n' && b != b'\r')
}

/// Remove terminal control characters and ANSI escape sequences.
///
/// Feed titles and abstracts are untrusted and end up on the terminal, so
/// C0 controls (except tab, newline, carriage return), DEL, CSI sequences,
/// OSC sequences and stray ESC bytes are dropped. Clean input is returned
/// borrowed.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    if !bytes.iter().any(|&b| is_stripped(b)) {
        return Cow::Borrowed(s);
    }

    let len = bytes.len();
    let mut out = String::with_capacity(len);
    let mut i = 0;

    while i < len {
        match bytes[i] {
            0x1b if bytes.get(i + 1) == Some(&b'[') => {
                // CSI: parameters run until a final byte in 0x40..=0x7e
                i += 2;
                while i < len {
                    let c = bytes[i];
                    i += 1;
                    if (0x40..=0x7e).contains(&c) {
                        break;
                    }
                }
            }
            0x1b if bytes.get(i + 1) == Some(&b']') => {
                // OSC: terminated by BEL or ESC \
                i += 2;
                while i < len {
                    if bytes[i] == 0x07 {
                        i += 1;
                        break;
                    }
                    if bytes[i] == 0x1b && bytes.get(i + 1) == Some(&b'\\') {
                        i += 2;
                        break;
                    }
                    i += 1;
                }
            }
            b if is_stripped(b) => i += 1,
            _ => {
                let start = i;
                while i < len && !is_stripped(bytes[i]) {
                    i += 1;
                }
                // Only ASCII bytes stop the run, so the slice is on a char boundary
                out.push_str(&s[start..i]);
            }
        }
    }

    Cow::Owned(out)
}
