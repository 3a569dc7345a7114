use regex::Regex;
use std::sync::OnceLock;

/// What to do with a single word that is longer than the chunk ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OversizedWord {
    /// Hard-cut the word into ceiling-sized pieces
    #[default]
    Split,
    /// Emit the word alone, overflowing the ceiling
    Keep,
}

/// Splits text into chunks the speech API accepts in one request.
///
/// Lengths are counted in characters, not bytes. Chunks prefer sentence
/// boundaries, then word boundaries, then hard cuts.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    max_chars: usize,
    oversized_word: OversizedWord,
}

/// Split `text` into chunks of at most `max_chars` characters
pub fn split(text: &str, max_chars: usize) -> Vec<String> {
    Chunker::new(max_chars).split(text)
}

fn sentence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[.!?]+\s+").expect("sentence pattern is valid"))
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

impl Chunker {
    pub fn new(max_chars: usize) -> Self {
        Self {
            max_chars: max_chars.max(1),
            oversized_word: OversizedWord::default(),
        }
    }

    pub fn with_oversized_word(mut self, policy: OversizedWord) -> Self {
        self.oversized_word = policy;
        self
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        if char_len(text) <= self.max_chars {
            return vec![text.to_string()];
        }

        let mut builder = ChunkBuilder::new(self.max_chars);

        for sentence in sentences(text) {
            if builder.fits(sentence) {
                builder.push(sentence);
                continue;
            }

            if char_len(sentence.trim()) <= self.max_chars {
                builder.flush();
                builder.push(sentence);
                continue;
            }

            // Sentence alone is too long: fall back to words
            for word in sentence.split_inclusive(char::is_whitespace) {
                if builder.fits(word) {
                    builder.push(word);
                    continue;
                }
                builder.flush();

                let bare = word.trim();
                if char_len(bare) <= self.max_chars {
                    builder.push(word);
                    continue;
                }

                match self.oversized_word {
                    OversizedWord::Split => {
                        for piece in hard_cut(bare, self.max_chars) {
                            builder.emit(piece);
                        }
                    }
                    OversizedWord::Keep => builder.emit(bare),
                }
            }
        }

        builder.finish()
    }
}

/// Sentences with their trailing punctuation and whitespace attached
fn sentences(text: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut last_end = 0;

    for mat in sentence_pattern().find_iter(text) {
        result.push(&text[last_end..mat.end()]);
        last_end = mat.end();
    }

    if last_end < text.len() {
        result.push(&text[last_end..]);
    }

    result
}

/// Cut `word` into pieces of `max_chars` characters on char boundaries
fn hard_cut(word: &str, max_chars: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in word.char_indices() {
        if count == max_chars {
            pieces.push(&word[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }

    if start < word.len() {
        pieces.push(&word[start..]);
    }

    pieces
}

struct ChunkBuilder {
    max_chars: usize,
    chunks: Vec<String>,
    current: String,
    current_len: usize,
}

impl ChunkBuilder {
    fn new(max_chars: usize) -> Self {
        Self {
            max_chars,
            chunks: Vec::new(),
            current: String::new(),
            current_len: 0,
        }
    }

    /// Trailing whitespace of `piece` is not counted: it is trimmed if the
    /// chunk closes after it.
    fn fits(&self, piece: &str) -> bool {
        self.current_len + char_len(piece.trim_end()) <= self.max_chars
    }

    fn push(&mut self, piece: &str) {
        self.current.push_str(piece);
        self.current_len += char_len(piece);
    }

    fn emit(&mut self, chunk: &str) {
        self.flush();
        if !chunk.is_empty() {
            self.chunks.push(chunk.to_string());
        }
    }

    fn flush(&mut self) {
        let trimmed = self.current.trim();
        if !trimmed.is_empty() {
            self.chunks.push(trimmed.to_string());
        }
        self.current.clear();
        self.current_len = 0;
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.chunks
    }
}
