//! Lexical tokenizer for host and path words

/// Characters that separate words in hosts and paths.
pub const DELIMITERS: [char; 10] = ['-', '.', '/', '?', '=', '@', '&', '%', ':', '_'];

/// Word tokens of a URL.
///
/// Concatenation order is fixed and not sorted: feature values such as
/// shortest/longest word depend only on the multiset, but the order is kept
/// stable so extracted rows are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    /// domain ++ path ++ subdomain
    pub raw_words: Vec<String>,
    /// domain ++ subdomain
    pub host_words: Vec<String>,
    /// path only
    pub path_words: Vec<String>,
}

/// Lowercase `s` and split it on [`DELIMITERS`], dropping empty tokens.
pub fn split_words(s: &str) -> Vec<String> {
    s.to_lowercase()
        .split(|c: char| DELIMITERS.contains(&c))
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tokenize the three URL parts.
pub fn tokenize(subdomain: &str, domain: &str, path: &str) -> TokenSet {
    let w_domain = split_words(domain);
    let w_subdomain = split_words(subdomain);
    let w_path = split_words(path);

    let raw_words = w_domain
        .iter()
        .chain(w_path.iter())
        .chain(w_subdomain.iter())
        .cloned()
        .collect();
    let host_words = w_domain.iter().chain(w_subdomain.iter()).cloned().collect();

    TokenSet {
        raw_words,
        host_words,
        path_words: w_path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_words_domain_then_subdomain() {
        let t = tokenize("sub", "example", "/a/b");
        assert_eq!(t.host_words, vec!["example", "sub"]);
        assert_eq!(t.path_words, vec!["a", "b"]);
        assert_eq!(t.raw_words, vec!["example", "a", "b", "sub"]);
    }

    #[test]
    fn test_split_all_delimiters() {
        let words = split_words("A-b.c/d?e=f@g&h%i:j_k");
        assert_eq!(
            words,
            vec!["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k"]
        );
    }

    #[test]
    fn test_empty_inputs() {
        let t = tokenize("", "", "");
        assert!(t.raw_words.is_empty());
        assert!(t.host_words.is_empty());
        assert!(t.path_words.is_empty());
        assert!(split_words("//--..").is_empty());
    }

    #[test]
    fn test_multi_label_subdomain() {
        let t = tokenize("mail.login", "paypal-secure", "/");
        assert_eq!(t.host_words, vec!["paypal", "secure", "mail", "login"]);
        assert!(t.path_words.is_empty());
    }
}
