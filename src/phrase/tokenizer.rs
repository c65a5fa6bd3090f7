/// Marks that stay glued to the last word of a phrase.
pub const TERMINAL_PUNCTUATION: [char; 3] = ['.', '!', '?'];

/// Split a phrase into its word tokens, in reading order.
///
/// A single trailing `.`, `!` or `?` is detached before splitting on
/// whitespace and re-attached to the final word. An empty phrase yields one
/// empty token.
pub fn tokenize(phrase: &str) -> Vec<String> {
    let trimmed = phrase.trim();
    let (body, mark) = match trimmed.chars().last() {
        Some(c) if TERMINAL_PUNCTUATION.contains(&c) => (&trimmed[..trimmed.len() - c.len_utf8()], Some(c)),
        _ => (trimmed, None),
    };

    let mut words: Vec<String> = body.split_whitespace().map(str::to_string).collect();
    if words.is_empty() {
        words.push(String::new());
    }
    if let (Some(mark), Some(last)) = (mark, words.last_mut()) {
        last.push(mark);
    }
    words
}

/// Whitespace-normalized sentence for a token sequence.
pub fn join_tokens(tokens: &[String]) -> String {
    tokens.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_keeps_period_on_last_word() {
        assert_eq!(
            tokenize("Bonjour tout le monde."),
            vec!["Bonjour", "tout", "le", "monde."]
        );
    }

    #[test]
    fn test_tokenize_collapses_whitespace() {
        assert_eq!(tokenize("  Hello \t  big\n world  "), vec!["Hello", "big", "world"]);
    }

    #[test]
    fn test_tokenize_detached_mark_is_reattached() {
        assert_eq!(tokenize("Where are you ?"), vec!["Where", "are", "you?"]);
    }

    #[test]
    fn test_tokenize_only_one_mark_is_split_off() {
        assert_eq!(tokenize("Wait.."), vec!["Wait.."]);
        assert_eq!(tokenize("Really?!"), vec!["Really?!"]);
    }

    #[test]
    fn test_tokenize_other_punctuation_is_word_text() {
        assert_eq!(
            tokenize("Oui, c'est ça; d'accord"),
            vec!["Oui,", "c'est", "ça;", "d'accord"]
        );
    }

    #[test]
    fn test_tokenize_empty_phrase() {
        assert_eq!(tokenize(""), vec![""]);
        assert_eq!(tokenize("   "), vec![""]);
    }

    #[test]
    fn test_tokenize_mark_only() {
        assert_eq!(tokenize("!"), vec!["!"]);
    }

    #[test]
    fn test_tokenize_multibyte_last_word() {
        assert_eq!(tokenize("Ça va très bien?"), vec!["Ça", "va", "très", "bien?"]);
    }

    #[test]
    fn test_join_reconstructs_normalized_phrase() {
        for phrase in [
            "Bonjour tout le monde.",
            "  one   two three!  ",
            "no mark here",
            "Vraiment ?",
        ] {
            let normalized = {
                let t = phrase.trim();
                let (body, mark) = match t.chars().last() {
                    Some(c) if TERMINAL_PUNCTUATION.contains(&c) => (&t[..t.len() - 1], c.to_string()),
                    _ => (t, String::new()),
                };
                format!("{}{}", body.split_whitespace().collect::<Vec<_>>().join(" "), mark)
            };
            assert_eq!(join_tokens(&tokenize(phrase)), normalized);
        }
    }
}
