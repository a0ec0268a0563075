//! Candidate model ranking for the fallback loop.
//!
//! The provider retires and renames models on its own schedule, so the
//! attempt order is computed per request from name heuristics rather
//! than a pinned list: fast variants first, newer generations ahead of
//! older ones, "lite" variants pushed back.

/// Strip the provider's `models/` prefix and lowercase, for
/// deduplication and scoring.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .strip_prefix("models/")
        .unwrap_or(name.trim())
        .to_lowercase()
}

/// Heuristic preference score for a model name.
pub fn score(name: &str) -> i32 {
    let name = normalize_name(name);
    let mut score = 0;
    if name.contains("flash") {
        score += 10;
    }
    if name.contains("2.5") {
        score += 5;
    }
    if name.contains("2.0") {
        score += 4;
    }
    if name.contains("lite") {
        score -= 2;
    }
    score
}

/// Build the ranked candidate list: preferred model, static fallbacks,
/// and catalog-discovered models, deduplicated by normalized name,
/// sorted by descending score (stable, so equal-score candidates keep
/// their insertion order) and capped.
pub fn rank_candidates(
    preferred: &str,
    fallbacks: &[String],
    discovered: &[String],
    cap: usize,
) -> Vec<String> {
    let mut seen = Vec::new();
    let mut candidates: Vec<String> = Vec::new();

    for name in std::iter::once(preferred)
        .chain(fallbacks.iter().map(String::as_str))
        .chain(discovered.iter().map(String::as_str))
    {
        let normalized = normalize_name(name);
        if normalized.is_empty() || seen.contains(&normalized) {
            continue;
        }
        seen.push(normalized.clone());
        candidates.push(normalized);
    }

    candidates.sort_by_key(|name| std::cmp::Reverse(score(name)));
    candidates.truncate(cap);
    candidates
}
