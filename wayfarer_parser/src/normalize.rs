//! Input normalization and tokenizing.
//!
//! Everything downstream of the parser works on normalized text: lower-case
//! ASCII letters and digits separated by single spaces. A decimal point is
//! the one piece of punctuation that survives, and only between two digits,
//! so distances such as `1.5km` reach the movement scanner intact.

/// Normalize raw player input.
///
/// Idempotent: `normalize(&normalize(s)) == normalize(s)`.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if let Some(folded) = fold_char(ch) {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            out.push(folded);
            pending_space = false;
        } else if is_separator(ch) {
            pending_space = true;
        } else if ch == '.'
            && !pending_space
            && out.ends_with(|c: char| c.is_ascii_digit())
            && chars.peek().is_some_and(char::is_ascii_digit)
        {
            out.push('.');
        }
        // any other punctuation is dropped without splitting the word
    }

    out
}

/// Split normalized text into words. Empty input yields no tokens.
pub fn tokenize(normalized: &str) -> Vec<String> {
    normalized.split_whitespace().map(str::to_string).collect()
}

/// Normalize and tokenize in one step.
pub fn words(text: &str) -> Vec<String> {
    tokenize(&normalize(text))
}

fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '-' | '_' | '/' | '\'' | '\u{2019}')
}

/// Lower-case ASCII alphanumerics, folding common accented Latin letters.
fn fold_char(ch: char) -> Option<char> {
    if ch.is_ascii_alphanumeric() {
        return Some(ch.to_ascii_lowercase());
    }
    let folded = match ch {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' | 'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'a',
        'ç' | 'Ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => 'i',
        'ñ' | 'Ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' | 'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => 'u',
        'ý' | 'ÿ' | 'Ý' => 'y',
        _ => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_collapses_separators() {
        assert_eq!(normalize("  Pick-UP   the_Stick/now "), "pick up the stick now");
    }

    #[test]
    fn drops_punctuation_inside_words() {
        assert_eq!(normalize("Where am I?!"), "where am i");
        assert_eq!(normalize("what's in my bag"), "what s in my bag");
    }

    #[test]
    fn keeps_decimal_points_between_digits() {
        assert_eq!(normalize("walk south 1.5km."), "walk south 1.5km");
        assert_eq!(normalize("1..5"), "1.5");
        assert_eq!(normalize("ok. 5"), "ok 5");
    }

    #[test]
    fn folds_accented_letters() {
        assert_eq!(normalize("Café crème"), "cafe creme");
    }

    #[test]
    fn normalize_is_idempotent() {
        for s in [
            "",
            "   ",
            "Go NORTH, 2km!!",
            "1.2.3 km",
            "use it -- now",
            "x.5 3. .4",
            "über-trek_to/the'north",
        ] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "input {s:?}");
        }
    }

    #[test]
    fn empty_input_has_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(words(" ,,, ").is_empty());
        assert_eq!(words("use ferro rod"), vec!["use", "ferro", "rod"]);
    }
}
