//! Specificity scores and best-candidate selection.

/// Match specificity, compared lexicographically in field order.
///
/// The derived `Ord` is a total order on the tuple, so comparing candidates
/// by score is a total preorder; candidates with equal scores are never
/// ranked against each other.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
pub struct Specificity {
    /// Fields bound by name.
    pub named: u32,
    /// Bound fields whose tag constraint was checked.
    pub tagged: u32,
    /// Sum of assignment strengths.
    pub strength: u32,
    /// Fields bound by position.
    pub positional: u32,
}

/// Result of picking the top-scoring candidate.
#[derive(Clone, PartialEq, Debug)]
pub enum Selection<T> {
    None,
    Unique(T, Specificity),
    /// Every candidate that shares the top score, in input order.
    Ambiguous(Vec<T>),
}

/// Select the strict maximum by specificity. A tie at the top is ambiguous.
pub fn select_best<T>(candidates: impl IntoIterator<Item = (T, Specificity)>) -> Selection<T> {
    let mut top: Vec<T> = Vec::new();
    let mut top_score: Option<Specificity> = None;
    for (candidate, score) in candidates {
        match top_score {
            Some(best) if score < best => {}
            Some(best) if score == best => top.push(candidate),
            _ => {
                top.clear();
                top.push(candidate);
                top_score = Some(score);
            }
        }
    }
    match (top.len(), top_score) {
        (1, Some(score)) => match top.pop() {
            Some(only) => Selection::Unique(only, score),
            None => Selection::None,
        },
        (0, _) | (_, None) => Selection::None,
        _ => Selection::Ambiguous(top),
    }
}
