use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

lazy_static! {
    static ref WORD: Regex = Regex::new(r"[a-z]+").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","ain","all","am","an","and","any","are","aren","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","cannot","could","couldn",
            "d","did","didn","do","does","doesn","doing","don","down","during",
            "each","few","for","from","further",
            "had","hadn","has","hasn","have","haven","having","he","her","here","hers","herself","him","himself","his","how",
            "i","if","in","into","is","isn","it","its","itself",
            "just","let","ll",
            "m","ma","me","mightn","more","most","mustn","my","myself",
            "needn","no","nor","not",
            "o","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "re","s","same","shan","she","should","shouldn","so","some","such",
            "t","than","that","the","their","theirs","them","themselves","then","there","these","they","this","those","through","to","too",
            "under","until","up","ve","very",
            "was","wasn","we","were","weren","what","when","where","which","while","who","whom","why","will","with","won","would","wouldn",
            "y","you","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// True if `token` is on the English stop-word list. Only the latent-semantic
/// vectorizer filters stop words; the classic indexes keep every token.
pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(token)
}

/// Tokenize text into lowercase alphabetic terms: every maximal run of
/// `a-z` after lowercasing, in occurrence order, duplicates retained.
/// Digits, punctuation, and non-ASCII letters are discarded.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD.find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Term frequencies of `text` under [`tokenize`]: a multiset view of its
/// tokens. Used for both query vectors and per-document counts.
pub fn term_counts(text: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for token in tokenize(text) {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_lowercase_alpha_runs() {
        assert_eq!(tokenize("the cat sat"), vec!["the", "cat", "sat"]);
        assert_eq!(tokenize("Mixed-CASE, punct. 42!"), vec!["mixed", "case", "punct"]);
    }

    #[test]
    fn digits_split_tokens() {
        assert_eq!(tokenize("abc123def"), vec!["abc", "def"]);
    }

    #[test]
    fn empty_input_yields_no_tokens() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("1984 --- 42").is_empty());
    }

    #[test]
    fn counts_are_a_multiset_view() {
        let counts = term_counts("the dog sat on the mat");
        assert_eq!(counts["the"], 2);
        assert_eq!(counts["dog"], 1);
        assert_eq!(counts.len(), 5);
    }
}
