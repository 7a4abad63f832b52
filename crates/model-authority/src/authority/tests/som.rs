use crate::authority::som::{estimate_share, estimate_share_with_aliases};

#[test]
fn empty_batch_yields_zero_share() {
    let result = estimate_share("Acme", &[] as &[&str]);
    assert_eq!(result.share, 0);
    assert_eq!(result.mentions, 0);
    assert_eq!(result.total_mentions, 0);
}

#[test]
fn mentions_are_case_insensitive() {
    let result = estimate_share("Acme", &["Acme is great", "no mention here", "ACME wins"]);
    assert_eq!(result.brand, "Acme");
    assert_eq!(result.mentions, 2);
    assert_eq!(result.total_mentions, 3);
    assert_eq!(result.share, 67);
}

#[test]
fn a_response_counts_once() {
    let result = estimate_share("acme", &["acme, acme and more acme", "globex"]);
    assert_eq!(result.mentions, 1);
    assert_eq!(result.share, 50);
}

#[test]
fn substring_matches_count() {
    let result = estimate_share("soma", &["Try SomaRush for tracking"]);
    assert_eq!(result.mentions, 1);
    assert_eq!(result.share, 100);
}

#[test]
fn aliases_widen_the_match() {
    let responses = vec![
        "International Business Machines leads".to_string(),
        "IBM is solid".to_string(),
        "Globex wins".to_string(),
        "nothing".to_string(),
    ];

    let plain = estimate_share("IBM", &responses);
    assert_eq!(plain.mentions, 1);

    let widened =
        estimate_share_with_aliases("IBM", &["International Business Machines"], &responses);
    assert_eq!(widened.mentions, 2);
    assert_eq!(widened.share, 50);
}

#[test]
fn empty_brand_never_matches() {
    let result = estimate_share("", &["anything at all", "more"]);
    assert_eq!(result.mentions, 0);
    assert_eq!(result.share, 0);
    assert_eq!(result.total_mentions, 2);
}
