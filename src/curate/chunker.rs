pub const DEFAULT_MAX_WORDS: usize = 12;
pub const DEFAULT_MIN_WORDS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkedCues {
    pub cues: Vec<String>,
    /// Sentences that had to be split.
    pub changes: usize,
    pub details: Vec<String>,
}

/// Split one sentence into display-sized chunks of near-equal length.
///
/// Extra words go to the earliest chunks. A final chunk shorter than
/// `min_words` is merged into the one before it.
pub fn chunk_sentence(sentence: &str, max_words: usize, min_words: usize) -> Vec<String> {
    let words: Vec<&str> = sentence.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }
    if max_words == 0 || words.len() <= max_words {
        return vec![sentence.trim().to_string()];
    }

    let chunk_count = words.len().div_ceil(max_words);
    let base = words.len() / chunk_count;
    let extra = words.len() % chunk_count;

    let mut chunks: Vec<Vec<&str>> = Vec::with_capacity(chunk_count);
    let mut offset = 0;
    for i in 0..chunk_count {
        let size = base + usize::from(i < extra);
        chunks.push(words[offset..offset + size].to_vec());
        offset += size;
    }

    if chunks.len() > 1 && chunks.last().is_some_and(|last| last.len() < min_words) {
        if let Some(orphan) = chunks.pop() {
            if let Some(previous) = chunks.last_mut() {
                previous.extend(orphan);
            }
        }
    }

    chunks.into_iter().map(|chunk| chunk.join(" ")).collect()
}

/// Stage 7: bound every sentence to `max_words`.
pub fn chunk_sentences(sentences: &[String], max_words: usize, min_words: usize) -> ChunkedCues {
    let mut result = ChunkedCues::default();
    for sentence in sentences {
        let chunks = chunk_sentence(sentence, max_words, min_words);
        if chunks.len() > 1 {
            result.changes += 1;
            result.details.push(format!(
                "{}-word sentence split into {} cues",
                sentence.split_whitespace().count(),
                chunks.len()
            ));
        }
        result.cues.extend(chunks);
    }
    result
}
