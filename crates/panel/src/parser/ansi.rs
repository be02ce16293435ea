/// ANSI escape stripping for console output.
///
/// Game servers started with a TTY colour their output and redraw progress
/// lines in place. Escapes are removed before any carriage-return handling,
/// so colour codes never survive into the buffer.
///
/// Recognised forms:
/// - CSI: `ESC [` parameters/intermediates, final byte `0x40..=0x7E`
/// - OSC: `ESC ]` … terminated by BEL or `ESC \`
/// - two-byte Fe escapes: `ESC` followed by `0x40..=0x5F`

use std::borrow::Cow;

const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Scan {
    Text,
    Escape,
    Csi,
    Osc,
    OscEscape,
}

/// Remove ANSI escape sequences from `input`.
///
/// Borrows when there is nothing to strip. An escape left unterminated at the
/// end of the input is dropped along with whatever followed it.
pub fn strip_ansi_codes(input: &[u8]) -> Cow<'_, [u8]> {
    if !input.contains(&ESC) {
        return Cow::Borrowed(input);
    }

    let mut output = Vec::with_capacity(input.len());
    let mut scan = Scan::Text;

    for &b in input {
        scan = match scan {
            Scan::Text if b == ESC => Scan::Escape,
            Scan::Text => {
                output.push(b);
                Scan::Text
            }
            Scan::Escape => match b {
                b'[' => Scan::Csi,
                b']' => Scan::Osc,
                0x40..=0x5F => Scan::Text,
                ESC => Scan::Escape,
                // Not an escape we know: keep the byte, drop the ESC.
                _ => {
                    output.push(b);
                    Scan::Text
                }
            },
            Scan::Csi if (0x40..=0x7E).contains(&b) => Scan::Text,
            Scan::Csi => Scan::Csi,
            Scan::Osc if b == BEL => Scan::Text,
            Scan::Osc if b == ESC => Scan::OscEscape,
            Scan::Osc => Scan::Osc,
            Scan::OscEscape if b == b'\\' => Scan::Text,
            Scan::OscEscape if b == ESC => Scan::OscEscape,
            Scan::OscEscape => Scan::Osc,
        };
    }

    Cow::Owned(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_input_is_borrowed() {
        let input = b"[Server] World saved";
        match strip_ansi_codes(input) {
            Cow::Borrowed(s) => assert_eq!(s, input),
            Cow::Owned(_) => panic!("Should not have allocated"),
        }
    }

    #[test]
    fn test_strip_colour_codes() {
        let input = b"\x1b[32mSteve\x1b[0m has joined.";
        assert_eq!(strip_ansi_codes(input).as_ref(), b"Steve has joined.");
    }

    #[test]
    fn test_strip_cursor_movement() {
        // Erase-line and cursor-home sequences used when redrawing prompts
        let input = b"\x1b[2K\x1b[1GLoading world: 42%";
        assert_eq!(strip_ansi_codes(input).as_ref(), b"Loading world: 42%");
    }

    #[test]
    fn test_strip_fe_escape() {
        let input = b"a\x1bMb";
        assert_eq!(strip_ansi_codes(input).as_ref(), b"ab");
    }

    #[test]
    fn test_strip_osc_with_bel_and_st() {
        let input = b"\x1b]0;title\x07ready \x1b]8;;http://x\x1b\\link";
        assert_eq!(strip_ansi_codes(input).as_ref(), b"ready link");
    }

    #[test]
    fn test_only_escapes() {
        let input = b"\x1b[0m\x1b[1;31m\x1b[m";
        assert_eq!(strip_ansi_codes(input).as_ref(), b"");
    }

    #[test]
    fn test_trailing_lone_escape_is_dropped() {
        let input = b"text\x1b";
        assert_eq!(strip_ansi_codes(input).as_ref(), b"text");
    }

    #[test]
    fn test_carriage_return_survives_stripping() {
        let input = b"\x1b[33m10%\r\x1b[33m20%";
        assert_eq!(strip_ansi_codes(input).as_ref(), b"10%\r20%");
    }
}
