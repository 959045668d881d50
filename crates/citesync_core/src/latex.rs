/*
SPDX-License-Identifier: MPL-2.0
SPDX-FileCopyrightText: © 2023-2026 Bruce D'Arcus
*/

//! Conversion of LaTeX-flavoured field values to plain Unicode text.
//!
//! Field values from BibTeX sources carry accent commands, escaped
//! specials and protective braces. Everything placed into a document or a
//! sort key passes through [`to_unicode`] first.

/// Convert LaTeX markup in `input` to plain text.
///
/// Braces are dropped, accent and letter commands become their Unicode
/// characters, `--`/`---` become dashes and `~` becomes a no-break space.
/// Unknown commands are dropped and their arguments kept.
pub fn to_unicode(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '{' | '}' => i += 1,
            '~' => {
                out.push('\u{a0}');
                i += 1;
            }
            '-' if chars.get(i + 1) == Some(&'-') => {
                if chars.get(i + 2) == Some(&'-') {
                    out.push('\u{2014}');
                    i += 3;
                } else {
                    out.push('\u{2013}');
                    i += 2;
                }
            }
            '\\' => i = command(&chars, i + 1, &mut out),
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Handle a command starting after the backslash at `start`, returning the
/// index just past what was consumed.
fn command(chars: &[char], start: usize, out: &mut String) -> usize {
    let Some(&first) = chars.get(start) else {
        return start;
    };

    if !first.is_ascii_alphabetic() {
        if let Some(accent) = accent_kind(first) {
            let (base, next) = accent_argument(chars, start + 1);
            if let Some(base) = base {
                out.push(accented(accent, base).unwrap_or(base));
            }
            return next;
        }
        // Escaped specials such as \& \% \$ \_ \{ \}
        out.push(first);
        return start + 1;
    }

    let mut end = start;
    while end < chars.len() && chars[end].is_ascii_alphabetic() {
        end += 1;
    }
    let name: String = chars[start..end].iter().collect();
    // Control words swallow one following space.
    let after = if chars.get(end) == Some(&' ') { end + 1 } else { end };

    if let Some(letter) = letter_command(&name) {
        out.push_str(letter);
        return after;
    }
    if let Some(accent) = accent_kind_named(&name) {
        let (base, next) = accent_argument(chars, after);
        if let Some(base) = base {
            out.push(accented(accent, base).unwrap_or(base));
        }
        return next;
    }
    // \emph{..}, \textit{..} and friends: keep the argument.
    after
}

/// Read the base letter of an accent: either `{x}`, `{\i}` or a bare char.
fn accent_argument(chars: &[char], start: usize) -> (Option<char>, usize) {
    match chars.get(start) {
        Some('{') => {
            let mut i = start + 1;
            let mut base = None;
            while i < chars.len() && chars[i] != '}' {
                if chars[i] == '\\' {
                    // dotless i and j
                    if let Some(&c) = chars.get(i + 1) {
                        base.get_or_insert(c);
                    }
                    i += 2;
                    continue;
                }
                base.get_or_insert(chars[i]);
                i += 1;
            }
            (base, (i + 1).min(chars.len()))
        }
        Some(' ') => accent_argument(chars, start + 1),
        Some('\\') => (chars.get(start + 1).copied(), (start + 2).min(chars.len())),
        Some(&c) => (Some(c), start + 1),
        None => (None, start),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Accent {
    Acute,
    Grave,
    Circumflex,
    Umlaut,
    Tilde,
    Macron,
    Dot,
    Cedilla,
    Caron,
    Ring,
    Breve,
    DoubleAcute,
    Ogonek,
}

fn accent_kind(c: char) -> Option<Accent> {
    Some(match c {
        '\'' => Accent::Acute,
        '`' => Accent::Grave,
        '^' => Accent::Circumflex,
        '"' => Accent::Umlaut,
        '~' => Accent::Tilde,
        '=' => Accent::Macron,
        '.' => Accent::Dot,
        _ => return None,
    })
}

fn accent_kind_named(name: &str) -> Option<Accent> {
    Some(match name {
        "c" => Accent::Cedilla,
        "v" => Accent::Caron,
        "r" => Accent::Ring,
        "u" => Accent::Breve,
        "H" => Accent::DoubleAcute,
        "k" => Accent::Ogonek,
        _ => return None,
    })
}

fn letter_command(name: &str) -> Option<&'static str> {
    Some(match name {
        "ss" => "ß",
        "o" => "ø",
        "O" => "Ø",
        "aa" => "å",
        "AA" => "Å",
        "ae" => "æ",
        "AE" => "Æ",
        "oe" => "œ",
        "OE" => "Œ",
        "l" => "ł",
        "L" => "Ł",
        "i" => "ı",
        "j" => "ȷ",
        "dh" => "ð",
        "DH" => "Ð",
        "th" => "þ",
        "TH" => "Þ",
        "textendash" => "\u{2013}",
        "textemdash" => "\u{2014}",
        "S" => "§",
        "P" => "¶",
        "copyright" => "©",
        "ldots" | "dots" => "…",
        _ => return None,
    })
}

fn accented(accent: Accent, base: char) -> Option<char> {
    use Accent::*;
    Some(match (accent, base) {
        (Acute, 'a') => 'á',
        (Acute, 'e') => 'é',
        (Acute, 'i') | (Acute, 'ı') => 'í',
        (Acute, 'o') => 'ó',
        (Acute, 'u') => 'ú',
        (Acute, 'y') => 'ý',
        (Acute, 'c') => 'ć',
        (Acute, 'n') => 'ń',
        (Acute, 's') => 'ś',
        (Acute, 'z') => 'ź',
        (Acute, 'A') => 'Á',
        (Acute, 'E') => 'É',
        (Acute, 'I') => 'Í',
        (Acute, 'O') => 'Ó',
        (Acute, 'U') => 'Ú',
        (Acute, 'Y') => 'Ý',
        (Acute, 'C') => 'Ć',
        (Acute, 'N') => 'Ń',
        (Acute, 'S') => 'Ś',
        (Acute, 'Z') => 'Ź',
        (Grave, 'a') => 'à',
        (Grave, 'e') => 'è',
        (Grave, 'i') | (Grave, 'ı') => 'ì',
        (Grave, 'o') => 'ò',
        (Grave, 'u') => 'ù',
        (Grave, 'A') => 'À',
        (Grave, 'E') => 'È',
        (Grave, 'I') => 'Ì',
        (Grave, 'O') => 'Ò',
        (Grave, 'U') => 'Ù',
        (Circumflex, 'a') => 'â',
        (Circumflex, 'e') => 'ê',
        (Circumflex, 'i') | (Circumflex, 'ı') => 'î',
        (Circumflex, 'o') => 'ô',
        (Circumflex, 'u') => 'û',
        (Circumflex, 'A') => 'Â',
        (Circumflex, 'E') => 'Ê',
        (Circumflex, 'I') => 'Î',
        (Circumflex, 'O') => 'Ô',
        (Circumflex, 'U') => 'Û',
        (Umlaut, 'a') => 'ä',
        (Umlaut, 'e') => 'ë',
        (Umlaut, 'i') | (Umlaut, 'ı') => 'ï',
        (Umlaut, 'o') => 'ö',
        (Umlaut, 'u') => 'ü',
        (Umlaut, 'y') => 'ÿ',
        (Umlaut, 'A') => 'Ä',
        (Umlaut, 'E') => 'Ë',
        (Umlaut, 'I') => 'Ï',
        (Umlaut, 'O') => 'Ö',
        (Umlaut, 'U') => 'Ü',
        (Tilde, 'a') => 'ã',
        (Tilde, 'n') => 'ñ',
        (Tilde, 'o') => 'õ',
        (Tilde, 'A') => 'Ã',
        (Tilde, 'N') => 'Ñ',
        (Tilde, 'O') => 'Õ',
        (Macron, 'a') => 'ā',
        (Macron, 'e') => 'ē',
        (Macron, 'i') | (Macron, 'ı') => 'ī',
        (Macron, 'o') => 'ō',
        (Macron, 'u') => 'ū',
        (Dot, 'z') => 'ż',
        (Dot, 'Z') => 'Ż',
        (Dot, 'I') => 'İ',
        (Dot, 'e') => 'ė',
        (Cedilla, 'c') => 'ç',
        (Cedilla, 'C') => 'Ç',
        (Cedilla, 's') => 'ş',
        (Cedilla, 'S') => 'Ş',
        (Caron, 'c') => 'č',
        (Caron, 'C') => 'Č',
        (Caron, 's') => 'š',
        (Caron, 'S') => 'Š',
        (Caron, 'z') => 'ž',
        (Caron, 'Z') => 'Ž',
        (Caron, 'r') => 'ř',
        (Caron, 'R') => 'Ř',
        (Caron, 'e') => 'ě',
        (Caron, 'E') => 'Ě',
        (Caron, 'n') => 'ň',
        (Ring, 'a') => 'å',
        (Ring, 'A') => 'Å',
        (Ring, 'u') => 'ů',
        (Ring, 'U') => 'Ů',
        (Breve, 'a') => 'ă',
        (Breve, 'A') => 'Ă',
        (Breve, 'g') => 'ğ',
        (Breve, 'G') => 'Ğ',
        (DoubleAcute, 'o') => 'ő',
        (DoubleAcute, 'O') => 'Ő',
        (DoubleAcute, 'u') => 'ű',
        (DoubleAcute, 'U') => 'Ű',
        (Ogonek, 'a') => 'ą',
        (Ogonek, 'A') => 'Ą',
        (Ogonek, 'e') => 'ę',
        (Ogonek, 'E') => 'Ę',
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accents() {
        assert_eq!(to_unicode(r#"Bostr{\"o}m"#), "Boström");
        assert_eq!(to_unicode(r#"Bostr\"om"#), "Boström");
        assert_eq!(to_unicode(r#"W{\"a}yrynen"#), "Wäyrynen");
        assert_eq!(to_unicode(r#"Bod{\'e}n"#), "Bodén");
        assert_eq!(to_unicode(r#"Fran\c{c}ois"#), "François");
        assert_eq!(to_unicode(r#"{\v S}koda"#), "Škoda");
        assert_eq!(to_unicode(r#"Ram{\'\i}rez"#), "Ramírez");
    }

    #[test]
    fn test_letters_and_specials() {
        assert_eq!(to_unicode(r"Stra{\ss}e"), "Straße");
        assert_eq!(to_unicode(r"\O{}stergaard"), "Østergaard");
        assert_eq!(to_unicode(r"Smith \& Sons"), "Smith & Sons");
        assert_eq!(to_unicode(r"50\%"), "50%");
    }

    #[test]
    fn test_braces_and_dashes() {
        assert_eq!(to_unicode("{JabRef Development Team}"), "JabRef Development Team");
        assert_eq!(to_unicode("11--18"), "11\u{2013}18");
        assert_eq!(to_unicode("a---b"), "a\u{2014}b");
        assert_eq!(to_unicode("single-dash"), "single-dash");
    }

    #[test]
    fn test_unknown_command_keeps_argument() {
        assert_eq!(to_unicode(r"\emph{Important} text"), "Important text");
    }

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(to_unicode("Plain text, 2001"), "Plain text, 2001");
    }
}
