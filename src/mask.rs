//! Mask construction
//!
//! A masked line is the original line with one matched span replaced by
//! the same number of placeholder characters. Everything outside the span
//! survives byte for byte, which is what makes the masks usable as
//! password-structure evidence.

use crate::scanner::Hit;

/// Default span replacement character. Deliberately a character that the
/// corpus filter can also key on: lines already containing it are treated
/// as previously-masked data.
pub const DEFAULT_PLACEHOLDER: char = '|';

/// Builds the masked line for one hit, without a line terminator.
pub fn masked_line(line: &str, hit: Hit, placeholder: char) -> String {
    let mut out = String::with_capacity(line.len() + 8);
    push_span(&mut out, line, hit, placeholder);
    out
}

/// Appends the masked line for `hit` plus a `\n` terminator to `buf`.
/// Scan workers render whole batches into one buffer with this.
pub fn push_masked_line(buf: &mut String, line: &str, hit: Hit, placeholder: char) {
    push_span(buf, line, hit, placeholder);
    buf.push('\n');
}

fn push_span(buf: &mut String, line: &str, hit: Hit, placeholder: char) {
    buf.push_str(&line[..hit.start]);
    for _ in 0..hit.len {
        buf.push(placeholder);
    }
    buf.push_str(&line[hit.start + hit.len..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_one_span_and_keeps_the_rest() {
        let hit = Hit { start: 0, len: 3 };
        assert_eq!(masked_line("Annabelle", hit, '|'), "|||abelle");

        let hit = Hit { start: 3, len: 4 };
        assert_eq!(masked_line("xyzanna99", hit, '|'), "xyz||||99");
    }

    #[test]
    fn mask_length_matches_span_length() {
        let line = "maxwell";
        let hit = Hit { start: 0, len: 3 };
        let masked = masked_line(line, hit, '|');
        assert_eq!(masked.len(), line.len());
        assert_eq!(masked, "|||well");
    }

    #[test]
    fn restoring_the_span_recovers_the_line() {
        let line = "superman1990";
        let hit = Hit { start: 5, len: 3 };
        let masked = masked_line(line, hit, '|');
        assert_eq!(masked, "super|||1990");

        let restored = format!(
            "{}{}{}",
            &masked[..hit.start],
            hit.text(line),
            &masked[hit.start + hit.len..]
        );
        assert_eq!(restored, line);
    }

    #[test]
    fn custom_placeholder_is_honored() {
        let hit = Hit { start: 0, len: 4 };
        assert_eq!(masked_line("anna", hit, '#'), "####");
    }

    #[test]
    fn wide_placeholder_repeats_per_character() {
        // Non-ASCII placeholders are rejected at the CLI; the span math
        // still counts characters, not bytes.
        let hit = Hit { start: 0, len: 3 };
        let masked = masked_line("ann", hit, '\u{2605}');
        assert_eq!(masked.chars().count(), 3);
    }

    #[test]
    fn full_line_match_masks_everything() {
        let hit = Hit { start: 0, len: 5 };
        assert_eq!(masked_line("perry", hit, '|'), "|||||");
    }

    #[test]
    fn multibyte_prefix_survives_verbatim() {
        let line = "héllo ann";
        let hit = Hit { start: 7, len: 3 };
        assert_eq!(masked_line(line, hit, '|'), "héllo |||");
    }

    #[test]
    fn push_variant_appends_terminated_lines() {
        let mut buf = String::new();
        push_masked_line(&mut buf, "ann1", Hit { start: 0, len: 3 }, '|');
        push_masked_line(&mut buf, "2ann", Hit { start: 1, len: 3 }, '|');
        assert_eq!(buf, "|||1\n2|||\n");
    }
}
