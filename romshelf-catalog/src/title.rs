//! Display-title normalization for raw ROM filenames.
//!
//! Dump filenames carry release-group tags, regions, versions and
//! separators that do not belong in a title:
//! ```text
//! super_mario-bros (USA) [!] v1.1.nes   →   Super Mario Bros
//! ```

use romshelf_core::path::extname;

/// Normalize a ROM filename into a display title.
///
/// Strips the extension, bracketed/parenthesized/braced spans, version
/// markers (`v1.0`), revision markers (`Rev 2`), and `-`/`_` separators, then
/// collapses whitespace and title-cases every word. If nothing is left, the
/// original filename is returned unchanged, extension included.
///
/// # Examples
///
/// ```
/// use romshelf_catalog::title::clean_title;
///
/// assert_eq!(clean_title("Super Mario Bros (USA).nes"), "Super Mario Bros");
/// assert_eq!(clean_title("Pokemon Red (USA, Europe) [S][!].gb"), "Pokemon Red");
/// assert_eq!(clean_title("[USA].nes"), "[USA].nes");
/// ```
pub fn clean_title(filename: &str) -> String {
    let stem = strip_extension(filename);

    let mut text = remove_spans(stem, '[', ']');
    text = remove_spans(&text, '(', ')');
    text = remove_spans(&text, '{', '}');
    text = remove_version_markers(&text);
    text = remove_revision_markers(&text);

    let spaced: String = text
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect();

    let title = spaced
        .split_whitespace()
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        filename.to_string()
    } else {
        title
    }
}

fn strip_extension(filename: &str) -> &str {
    let ext = extname(filename);
    filename.strip_suffix(ext).unwrap_or(filename)
}

/// Remove every `open ... close` span, shortest match first.
///
/// An opener without a closer is kept as-is.
fn remove_spans(text: &str, open: char, close: char) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(open) {
        let after_open = &rest[start + open.len_utf8()..];
        match after_open.find(close) {
            Some(end) => {
                out.push_str(&rest[..start]);
                rest = &after_open[end + close.len_utf8()..];
            }
            None => break,
        }
    }
    out.push_str(rest);
    out
}

fn at_word_start(chars: &[char], i: usize) -> bool {
    i == 0 || !chars[i - 1].is_alphanumeric()
}

fn count_digits(chars: &[char], start: usize) -> usize {
    chars
        .get(start..)
        .map(|tail| tail.iter().take_while(|c| c.is_ascii_digit()).count())
        .unwrap_or(0)
}

/// End index of a `v<digits>.<digits>[.<digits>...]` marker whose `v` sits
/// just before `start`.
fn version_end(chars: &[char], start: usize) -> Option<usize> {
    let major = count_digits(chars, start);
    if major == 0 {
        return None;
    }
    let mut pos = start + major;
    let mut minors = 0;
    while chars.get(pos) == Some(&'.') {
        let minor = count_digits(chars, pos + 1);
        if minor == 0 {
            break;
        }
        pos += 1 + minor;
        minors += 1;
    }
    (minors > 0).then_some(pos)
}

fn remove_version_markers(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if matches!(chars[i], 'v' | 'V') && at_word_start(&chars, i) {
            if let Some(end) = version_end(&chars, i + 1) {
                i = end;
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Remove `Rev`, `rev 2`, `REV1` and similar. `Rev` must be a whole word
/// prefix, so titles like "Revenge" survive.
fn remove_revision_markers(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if is_revision_at(&chars, i) {
            let mut pos = i + 3;
            while chars.get(pos).is_some_and(|c| c.is_whitespace()) {
                pos += 1;
            }
            pos += count_digits(&chars, pos);
            i = pos;
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

fn is_revision_at(chars: &[char], i: usize) -> bool {
    let Some(word) = chars.get(i..i + 3) else {
        return false;
    };
    let is_rev = word
        .iter()
        .zip(['r', 'e', 'v'])
        .all(|(c, expected)| c.to_ascii_lowercase() == expected);
    is_rev
        && at_word_start(chars, i)
        && !chars.get(i + 3).is_some_and(|c| c.is_alphabetic())
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}
