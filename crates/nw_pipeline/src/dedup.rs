use std::collections::HashSet;

use nw_core::Candidate;

/// Titles at or above this similarity (0-100) refer to the same story.
pub const SIMILARITY_THRESHOLD: f64 = 80.0;

/// Levenshtein-ratio-style similarity on a 0-100 scale.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

/// Removes blank-titled, exact-duplicate and near-duplicate candidates,
/// preserving first-seen order.
///
/// Near-duplicate marks are collected over the full pair set in one pass:
/// a candidate marked for removal no longer survives as a keeper but still
/// suppresses later candidates it matches. O(n^2) comparisons, acceptable
/// at search-page sizes.
pub fn filter_candidates(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let kept: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| !c.title.trim().is_empty())
        .filter(|c| seen.insert(c.title.clone()))
        .collect();

    let mut to_drop = HashSet::new();
    for i in 0..kept.len() {
        for j in (i + 1)..kept.len() {
            if title_similarity(&kept[i].title, &kept[j].title) >= SIMILARITY_THRESHOLD {
                to_drop.insert(j);
            }
        }
    }

    kept.into_iter()
        .enumerate()
        .filter(|(i, _)| !to_drop.contains(i))
        .map(|(_, c)| c)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str) -> Candidate {
        Candidate {
            url: format!("https://example.com/{}", title.len()),
            title: title.to_string(),
            content: String::new(),
            seendate: String::new(),
            domain: String::new(),
            language: String::new(),
            sourcecountry: String::new(),
        }
    }

    fn titles(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.title.as_str()).collect()
    }

    #[test]
    fn test_blank_titles_dropped() {
        let out = filter_candidates(vec![
            candidate(""),
            candidate("   "),
            candidate("Parliament votes on budget"),
        ]);
        assert_eq!(titles(&out), vec!["Parliament votes on budget"]);
    }

    #[test]
    fn test_exact_duplicates_keep_first() {
        let out = filter_candidates(vec![
            candidate("Election results announced"),
            candidate("Election results announced"),
            candidate("Completely different story"),
        ]);
        assert_eq!(
            titles(&out),
            vec!["Election results announced", "Completely different story"]
        );
    }

    #[test]
    fn test_near_duplicates_keep_earlier_index() {
        let a = "UK economy grows by 2.1 percent in third quarter";
        let b = "UK economy grows by 2.2 percent in third quarter";
        assert!(title_similarity(a, b) >= SIMILARITY_THRESHOLD);

        let out = filter_candidates(vec![
            candidate(a),
            candidate("Wildfires force evacuations across the region"),
            candidate(b),
        ]);
        assert_eq!(
            titles(&out),
            vec![a, "Wildfires force evacuations across the region"]
        );
    }

    #[test]
    fn test_dissimilar_titles_survive() {
        let out = filter_candidates(vec![
            candidate("Central bank raises interest rates"),
            candidate("Football club wins championship final"),
        ]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let input = vec![
            candidate("UK economy grows by 2.1 percent in third quarter"),
            candidate("UK economy grows by 2.2 percent in third quarter"),
            candidate("Storm warnings issued for the coast"),
            candidate("Storm warnings issued for the coast"),
        ];
        let once = filter_candidates(input);
        let twice = filter_candidates(once.clone());
        assert_eq!(titles(&once), titles(&twice));
    }
}
