use anyhow::Result;
use porter_stemmer::stem;
use rust_stemmers::{Algorithm as SnowballAlgorithm, Stemmer};
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::data_models::Language;

static ENGLISH_STOP_WORDS: OnceLock<HashSet<String>> = OnceLock::new();
static ARABIC_STOP_WORDS: OnceLock<HashSet<String>> = OnceLock::new();
static ARABIC_STEMMER: OnceLock<Stemmer> = OnceLock::new();

fn get_stop_words(language: Language) -> &'static HashSet<String> {
    let (cell, list) = match language {
        Language::En => (&ENGLISH_STOP_WORDS, stop_words::LANGUAGE::English),
        Language::Ar => (&ARABIC_STOP_WORDS, stop_words::LANGUAGE::Arabic),
    };
    cell.get_or_init(|| {
        stop_words::get(list)
            .into_iter()
            .map(|x| x.to_string())
            .collect()
    })
}

fn get_arabic_stemmer() -> &'static Stemmer {
    ARABIC_STEMMER.get_or_init(|| Stemmer::create(SnowballAlgorithm::Arabic))
}

fn is_arabic_letter(c: char) -> bool {
    matches!(c,
        '\u{0600}'..='\u{06ff}' |  // Arabic
        '\u{0750}'..='\u{077f}' |  // Arabic Supplement
        '\u{08a0}'..='\u{08ff}' |  // Arabic Extended-A
        '\u{fb50}'..='\u{fdff}' |  // Presentation Forms-A
        '\u{fe70}'..='\u{feff}'    // Presentation Forms-B
    ) && c.is_alphabetic()
}

/// Guesses the language of `text`: Arabic when most of its letters are Arabic
/// script, English otherwise (including text without any letters).
pub fn detect_language(text: &str) -> Language {
    let (mut letters, mut arabic) = (0usize, 0usize);
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        letters += 1;
        if is_arabic_letter(c) {
            arabic += 1;
        }
    }
    if letters > 0 && arabic * 2 > letters {
        Language::Ar
    } else {
        Language::En
    }
}

/// A character filter receives the original text and may add, remove, or change characters
/// before tokenization.
pub trait CharacterFilter: Send + Sync {
    fn filter(&self, text: String) -> String;
}

/// Removes Arabic short vowel marks (tashkeel) and the tatweel elongation character so that
/// vocalised and unvocalised spellings of a word analyse to the same term.
#[derive(Debug, Default)]
pub struct ArabicDiacriticsFilter;

impl CharacterFilter for ArabicDiacriticsFilter {
    fn filter(&self, text: String) -> String {
        text.chars()
            .filter(|c| !matches!(c, '\u{064b}'..='\u{0652}' | '\u{0670}' | '\u{0640}'))
            .collect()
    }
}

/// A tokenizer receives a stream of characters, breaks it up into individual tokens (usually individual words),
/// and outputs a stream of tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: String) -> Vec<String>;
}

/// Splits on whitespace and peels punctuation off words, so `"world!"` yields `world`.
/// Apostrophes and hyphens survive only between two alphanumeric characters (`don't`, `e-mail`).
/// Tokens made only of punctuation are dropped.
pub struct WordTokenizer;

impl WordTokenizer {
    fn is_joiner(c: char) -> bool {
        matches!(c, '\'' | '-' | '\u{2019}')
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: String) -> Vec<String> {
        let mut out = Vec::new();
        for chunk in text.split_whitespace() {
            let chars: Vec<char> = chunk.chars().collect();
            let mut current = String::new();
            for (i, &c) in chars.iter().enumerate() {
                if c.is_alphanumeric() {
                    current.push(c);
                    continue;
                }
                let joins = Self::is_joiner(c)
                    && !current.is_empty()
                    && chars.get(i + 1).is_some_and(|n| n.is_alphanumeric());
                if joins {
                    current.push(c);
                } else if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            if !current.is_empty() {
                out.push(current);
            }
        }
        out
    }
}

/// A token filter receives the token stream and may add, remove, or change tokens.
pub trait TokenFilter: Send + Sync {
    fn filter(&self, tokens: Vec<TextToken>) -> Vec<TextToken>;
}

pub struct LowerCaseTokenFilter;

impl TokenFilter for LowerCaseTokenFilter {
    fn filter(&self, tokens: Vec<TextToken>) -> Vec<TextToken> {
        tokens
            .into_iter()
            .map(|mut t| {
                t.term = t.term.to_lowercase();
                t
            })
            .collect()
    }
}

pub struct StopWordTokenFilter {
    language: Language,
}

impl StopWordTokenFilter {
    pub fn new(language: Language) -> Self {
        Self { language }
    }
}

impl Default for StopWordTokenFilter {
    fn default() -> Self {
        Self::new(Language::En)
    }
}

impl TokenFilter for StopWordTokenFilter {
    fn filter(&self, mut tokens: Vec<TextToken>) -> Vec<TextToken> {
        let stop_words = get_stop_words(self.language);
        tokens.retain(|w| !stop_words.contains(&w.term));
        tokens
    }
}

pub struct PorterStemmerTokenFilter;

impl TokenFilter for PorterStemmerTokenFilter {
    fn filter(&self, tokens: Vec<TextToken>) -> Vec<TextToken> {
        tokens
            .into_iter()
            .map(|mut w| {
                w.term = stem(&w.term);
                w
            })
            .collect::<Vec<TextToken>>()
    }
}

/// Snowball stemmer for Arabic.
pub struct SnowballStemmerTokenFilter;

impl TokenFilter for SnowballStemmerTokenFilter {
    fn filter(&self, tokens: Vec<TextToken>) -> Vec<TextToken> {
        let stemmer = get_arabic_stemmer();
        tokens
            .into_iter()
            .filter_map(|mut w| {
                let stemmed = stemmer.stem(&w.term).into_owned();
                if stemmed.is_empty() {
                    return None;
                }
                w.term = stemmed;
                Some(w)
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextToken {
    pub term: String,
    pub pos: usize,
}

impl std::ops::Deref for TextToken {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.term
    }
}

/// Pure text analysis pipeline - no async, no DB, just text transformations
pub struct TextAnalyzer {
    char_filters: Vec<Box<dyn CharacterFilter>>,
    tokenizer: Box<dyn Tokenizer>,
    token_filters: Vec<Box<dyn TokenFilter>>,
}

impl TextAnalyzer {
    pub fn new(
        char_filters: Vec<Box<dyn CharacterFilter>>,
        tokenizer: Box<dyn Tokenizer>,
        token_filters: Vec<Box<dyn TokenFilter>>,
    ) -> Self {
        Self {
            char_filters,
            tokenizer,
            token_filters,
        }
    }

    /// The pipeline used for indexing and querying text in `language`.
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::En => Self::new(
                vec![],
                Box::new(WordTokenizer),
                vec![
                    Box::new(LowerCaseTokenFilter),
                    Box::new(StopWordTokenFilter::new(Language::En)),
                    Box::new(PorterStemmerTokenFilter),
                ],
            ),
            Language::Ar => Self::new(
                vec![Box::new(ArabicDiacriticsFilter)],
                Box::new(WordTokenizer),
                vec![
                    Box::new(LowerCaseTokenFilter),
                    Box::new(StopWordTokenFilter::new(Language::Ar)),
                    Box::new(SnowballStemmerTokenFilter),
                ],
            ),
        }
    }

    pub fn char_filter(&self, mut content: String) -> String {
        for filter in self.char_filters.iter() {
            content = filter.filter(content);
        }
        content
    }

    pub fn tokenize(&self, content: String) -> Vec<TextToken> {
        self.tokenizer
            .tokenize(content)
            .into_iter()
            .enumerate()
            .map(|(idx, term)| TextToken { term, pos: idx })
            .collect()
    }

    pub fn token_filter(&self, mut tokens: Vec<TextToken>) -> Vec<TextToken> {
        for filter in self.token_filters.iter() {
            tokens = filter.filter(tokens);
        }
        tokens
    }

    /// Analyzes raw content and returns a list of tokens
    pub fn analyze(&self, raw_content: String) -> Result<Vec<TextToken>> {
        let content = self.char_filter(raw_content);

        let mut tokens = self.tokenize(content);

        tokens = self.token_filter(tokens);
        Ok(tokens)
    }

    /// Convenience wrapper returning only the terms.
    pub fn terms(&self, raw_content: &str) -> Result<Vec<String>> {
        Ok(self
            .analyze(raw_content.to_string())?
            .into_iter()
            .map(|t| t.term)
            .collect())
    }
}

/// One analyzer per supported language, built once and shared.
pub struct Analyzers {
    english: TextAnalyzer,
    arabic: TextAnalyzer,
}

impl Analyzers {
    pub fn new() -> Self {
        Self {
            english: TextAnalyzer::for_language(Language::En),
            arabic: TextAnalyzer::for_language(Language::Ar),
        }
    }

    pub fn get(&self, language: Language) -> &TextAnalyzer {
        match language {
            Language::En => &self.english,
            Language::Ar => &self.arabic,
        }
    }
}

impl Default for Analyzers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mk_tokens(terms: &[&str]) -> Vec<TextToken> {
        terms
            .iter()
            .enumerate()
            .map(|(pos, term)| TextToken {
                term: (*term).to_string(),
                pos,
            })
            .collect()
    }

    fn terms(tokens: Vec<TextToken>) -> Vec<String> {
        tokens.into_iter().map(|t| t.term).collect()
    }

    #[test]
    fn test_word_tokenizer_peels_punctuation() {
        let out = WordTokenizer.tokenize("Hello, world! (quick) brown...fox".to_string());
        assert_eq!(out, vec!["Hello", "world", "quick", "brown", "fox"]);
    }

    #[test]
    fn test_word_tokenizer_keeps_inner_joiners() {
        let out = WordTokenizer.tokenize("don't re-index 'quoted' trailing-".to_string());
        assert_eq!(out, vec!["don't", "re-index", "quoted", "trailing"]);
    }

    #[test]
    fn test_word_tokenizer_drops_pure_punctuation() {
        let out = WordTokenizer.tokenize("!!! -- ... ?".to_string());
        assert!(out.is_empty());
    }

    #[test]
    fn test_arabic_diacritics_filter() {
        let out = ArabicDiacriticsFilter.filter("كَتَبَ الكتـــاب".to_string());
        assert_eq!(out, "كتب الكتاب");
    }

    #[test]
    fn test_stop_words_are_language_specific() {
        let tokens = mk_tokens(&["the", "search", "engine"]);
        let english = terms(StopWordTokenFilter::new(Language::En).filter(tokens));
        assert_eq!(english, vec!["search", "engine"]);
    }

    #[test]
    fn test_english_pipeline() {
        let analyzer = TextAnalyzer::for_language(Language::En);
        let out = analyzer.terms("The Compilers were compiling tomatoes!").unwrap();
        assert!(out.contains(&"compil".to_string()));
        assert!(out.contains(&"tomato".to_string()));
        assert!(!out.iter().any(|t| t == "the"));
    }

    #[test]
    fn test_positions_are_assigned_before_filtering() {
        let analyzer = TextAnalyzer::for_language(Language::En);
        let tokens = analyzer.analyze("the cat".to_string()).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].pos, 1);
    }

    #[test]
    fn test_detect_language() {
        assert_eq!(detect_language("a plain english sentence"), Language::En);
        assert_eq!(detect_language("محرك البحث المحلي"), Language::Ar);
        assert_eq!(detect_language("محرك البحث search"), Language::Ar);
        assert_eq!(detect_language("1234 !!"), Language::En);
        assert_eq!(detect_language(""), Language::En);
    }
}
