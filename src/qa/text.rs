//! Text normalization, character-bigram vectors, and cosine similarity.
//!
//! Character bigrams stand in for word segmentation on scripts without
//! whitespace-delimited words, so no dictionary is needed.

use std::collections::HashMap;

/// Trim, drop everything except letters, digits (CJK included) and whitespace,
/// then collapse whitespace runs into a single space.
///
/// Trimming happens before punctuation is removed, so a space left behind by
/// stripped trailing punctuation survives as a single `' '`.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.trim().chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
                in_space = true;
            }
        } else if c.is_alphanumeric() {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Overlapping two-character windows over the normalized text with spaces removed.
///
/// A single remaining character yields one one-character "bigram"; empty text
/// yields nothing.
pub fn bigrams(text: &str) -> Vec<String> {
    let chars: Vec<char> = normalize(text).chars().filter(|c| *c != ' ').collect();
    match chars.len() {
        0 => Vec::new(),
        1 => vec![chars[0].to_string()],
        _ => chars.windows(2).map(|w| w.iter().collect()).collect(),
    }
}

/// Sparse bag-of-bigrams: bigram → occurrence count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BigramVector {
    counts: HashMap<String, u32>,
}

impl BigramVector {
    pub fn from_text(text: &str) -> Self {
        let mut counts = HashMap::new();
        for gram in bigrams(text) {
            *counts.entry(gram).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn get(&self, gram: &str) -> u32 {
        self.counts.get(gram).copied().unwrap_or(0)
    }

    fn magnitude(&self) -> f64 {
        self.counts
            .values()
            .map(|&v| f64::from(v) * f64::from(v))
            .sum::<f64>()
            .sqrt()
    }

    /// Cosine similarity in `[0, 1]`; see [`cosine`].
    pub fn cosine(&self, other: &BigramVector) -> f64 {
        cosine(self, other)
    }
}

/// Cosine similarity of two bigram vectors. 0.0 when either side is empty or
/// has zero magnitude.
pub fn cosine(a: &BigramVector, b: &BigramVector) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    // Walk the smaller map; the dot product only needs shared keys.
    let (small, large) = if a.counts.len() <= b.counts.len() {
        (a, b)
    } else {
        (b, a)
    };
    let dot: f64 = small
        .counts
        .iter()
        .filter_map(|(k, &v)| large.counts.get(k).map(|&w| f64::from(v) * f64::from(w)))
        .sum();

    let (mag_a, mag_b) = (a.magnitude(), b.magnitude());
    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}
