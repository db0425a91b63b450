//! Response Extractor: pulls the posts object out of free-form model text.
//!
//! Decoding contract: the model is asked for bare JSON but often wraps it in
//! prose or markdown fences, and the prose may carry braces of its own. We
//! collect the top-level balanced `{ … }` spans in one pass and decode them in
//! order. Anything short of a decodable object yields `Extraction::Empty`,
//! which callers serve as `{ "posts": [] }` with a 200.
//!
//! Span rule: depth is counted with a stack of open positions, skipping braces
//! inside JSON string literals. A span that closes swallows any earlier span
//! it contains; a `{` that never closes contributes nothing. The first span
//! that decodes with posts wins, else the first span that decodes at all.

use crate::models::post::GenerationResult;

/// Outcome of scanning model text.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Parsed(GenerationResult),
    Empty,
}

impl Extraction {
    pub fn into_result(self) -> GenerationResult {
        match self {
            Extraction::Parsed(result) => result,
            Extraction::Empty => GenerationResult::empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Extraction::Empty)
    }
}

/// Finds and decodes the posts object in `text`. Never fails.
pub fn extract_generation(text: &str) -> Extraction {
    let mut fallback = None;
    for candidate in top_level_objects(text) {
        let Ok(result) = serde_json::from_str::<GenerationResult>(candidate) else {
            continue;
        };
        if !result.posts.is_empty() {
            return Extraction::Parsed(result);
        }
        fallback.get_or_insert(result);
    }
    fallback.map_or(Extraction::Empty, Extraction::Parsed)
}

/// Balanced `{ … }` spans not nested inside another balanced span, in order of
/// appearance. Linear in the length of `text`.
fn top_level_objects(text: &str) -> Vec<&str> {
    let mut open: Vec<usize> = Vec::new();
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' if !open.is_empty() => in_string = true,
            '{' => open.push(i),
            '}' => {
                let Some(start) = open.pop() else { continue };
                while spans.last().is_some_and(|&(s, _)| s > start) {
                    spans.pop();
                }
                spans.push((start, i + 1));
            }
            _ => {}
        }
    }

    spans.into_iter().map(|(s, e)| &text[s..e]).collect()
}
