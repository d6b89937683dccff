//! Edge n-gram token filter.
//!
//! Replaces every token with its leading n-grams, e.g. `search`
//! with `min_gram = 2, max_gram = 4` becomes `se`, `sea`, `sear`.
//! Grams are counted in characters, never split inside a UTF-8
//! sequence.

use tantivy::tokenizer::{Token, TokenFilter, TokenStream, Tokenizer};

#[derive(Clone, Debug)]
pub struct EdgeNgramFilter {
    min_gram: usize,
    max_gram: usize,
}

impl EdgeNgramFilter {
    pub fn new(min_gram: usize, max_gram: usize) -> Self {
        Self { min_gram, max_gram }
    }
}

impl TokenFilter for EdgeNgramFilter {
    type Tokenizer<T: Tokenizer> = EdgeNgramTokenizer<T>;

    fn transform<T: Tokenizer>(self, tokenizer: T) -> Self::Tokenizer<T> {
        EdgeNgramTokenizer {
            inner: tokenizer,
            min_gram: self.min_gram,
            max_gram: self.max_gram,
        }
    }
}

#[derive(Clone)]
pub struct EdgeNgramTokenizer<T> {
    inner: T,
    min_gram: usize,
    max_gram: usize,
}

impl<T: Tokenizer> Tokenizer for EdgeNgramTokenizer<T> {
    type TokenStream<'a> = EdgeNgramTokenStream<T::TokenStream<'a>>;

    fn token_stream<'a>(&'a mut self, text: &'a str) -> Self::TokenStream<'a> {
        EdgeNgramTokenStream {
            tail: self.inner.token_stream(text),
            min_gram: self.min_gram,
            max_gram: self.max_gram,
            gram_ends: Vec::new(),
            next_gram: 0,
            token: Token::default(),
        }
    }
}

pub struct EdgeNgramTokenStream<S> {
    tail: S,
    min_gram: usize,
    max_gram: usize,
    /// Byte offsets (into the current source token) where each gram ends
    gram_ends: Vec<usize>,
    next_gram: usize,
    token: Token,
}

impl<S: TokenStream> TokenStream for EdgeNgramTokenStream<S> {
    fn advance(&mut self) -> bool {
        loop {
            if self.next_gram < self.gram_ends.len() {
                let end = self.gram_ends[self.next_gram];
                self.next_gram += 1;

                let source = self.tail.token();
                self.token.text.clear();
                self.token.text.push_str(&source.text[..end]);
                self.token.offset_from = source.offset_from;
                self.token.offset_to = (source.offset_from + end).min(source.offset_to);
                self.token.position = source.position;
                self.token.position_length = source.position_length;
                return true;
            }

            if !self.tail.advance() {
                return false;
            }

            // Tokens shorter than min_gram yield no grams
            self.gram_ends.clear();
            self.next_gram = 0;
            for (count, (idx, ch)) in self.tail.token().text.char_indices().enumerate() {
                let gram_len = count + 1;
                if gram_len > self.max_gram {
                    break;
                }
                if gram_len >= self.min_gram {
                    self.gram_ends.push(idx + ch.len_utf8());
                }
            }
        }
    }

    fn token(&self) -> &Token {
        &self.token
    }

    fn token_mut(&mut self) -> &mut Token {
        &mut self.token
    }
}
