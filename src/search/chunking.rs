//! Split document text into overlapping chunks for embedding.
//!
//! Fixed window size plus overlap so long documents stay searchable by
//! section without losing context at the seams. Chunk boundaries prefer
//! paragraph or line breaks near the raw cut point.

/// Default window size in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 600;

/// Default overlap carried into the next chunk.
pub const DEFAULT_OVERLAP: usize = 100;

// Break search window around the raw end of a chunk.
const BREAK_LOOKBEHIND: usize = 80;
const BREAK_LOOKAHEAD: usize = 20;

/// A contiguous slice of a document. `start`/`end` are character offsets
/// into the source text; `text` is the slice with surrounding whitespace
/// trimmed.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Chunk `content` with the default size and overlap.
pub fn chunk_text(content: &str) -> Vec<Chunk> {
    chunk_text_with(content, DEFAULT_CHUNK_SIZE, DEFAULT_OVERLAP)
}

/// Chunk `content` into windows of up to `chunk_size` characters, each
/// overlapping the previous by up to `overlap`.
///
/// Whitespace-only input produces no chunks. A chunk that trims to empty
/// is dropped, though its range still advances the cursor. The next start
/// is always strictly greater than the previous one, even when
/// `overlap >= chunk_size`.
pub fn chunk_text_with(content: &str, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    if content.trim().is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = content.chars().collect();
    let len = chars.len();
    let mut chunks = Vec::new();
    let mut start = 0usize;

    while start < len {
        let mut end = (start + chunk_size).min(len);

        // Prefer ending on a paragraph or line break near the raw cut.
        if end < len {
            let win_start = end.saturating_sub(BREAK_LOOKBEHIND);
            let win_end = (end + BREAK_LOOKAHEAD).min(len);
            let window = &chars[win_start..win_end];
            if let Some(at) = last_paragraph_break(window).or_else(|| last_line_break(window)) {
                end = (win_start + at).max(start + 1);
            }
        }

        let text: String = chars[start..end].iter().collect();
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            chunks.push(Chunk {
                text: trimmed.to_string(),
                start,
                end,
            });
        }

        // Overlap only applies to full-size chunks; a short trailing chunk
        // must not pull the cursor back over itself.
        let back = if end - start >= chunk_size { overlap } else { 0 };
        start = (start + 1).max(end.saturating_sub(back));
    }

    chunks
}

/// Index of the last `\n\n` pair in the window, if any.
fn last_paragraph_break(window: &[char]) -> Option<usize> {
    if window.len() < 2 {
        return None;
    }
    (0..window.len() - 1)
        .rev()
        .find(|&i| window[i] == '\n' && window[i + 1] == '\n')
}

/// Index of the last `\n` in the window, if any.
fn last_line_break(window: &[char]) -> Option<usize> {
    (0..window.len()).rev().find(|&i| window[i] == '\n')
}
