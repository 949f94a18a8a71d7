use super::*;

#[test]
fn test_pattern_matches_exact() {
    assert!(pattern_matches("transcript", "transcript"));
    assert!(!pattern_matches("transcript", "transcripts"));
    assert!(!pattern_matches("transcript", "audio"));
}

#[test]
fn test_pattern_matches_star() {
    assert!(pattern_matches("*", "anything"));
    assert!(pattern_matches("*", ""));
    assert!(pattern_matches("data_*", "data_in"));
    assert!(pattern_matches("data_*", "data_"));
    assert!(pattern_matches("*.out", "audio.out"));
    assert!(pattern_matches("a*b*c", "aXXbYYc"));
    assert!(!pattern_matches("data_*", "meta_in"));
    assert!(!pattern_matches("a*b*c", "aXXbYY"));
}

#[test]
fn test_pattern_matches_question_mark() {
    assert!(pattern_matches("h?llo", "hello"));
    assert!(pattern_matches("h?llo", "hallo"));
    assert!(!pattern_matches("h?llo", "hllo"));
}

#[test]
fn test_pattern_matches_classes() {
    assert!(pattern_matches("h[ae]llo", "hello"));
    assert!(pattern_matches("h[ae]llo", "hallo"));
    assert!(!pattern_matches("h[ae]llo", "hillo"));
    assert!(pattern_matches("node[0-9]", "node7"));
    assert!(!pattern_matches("node[0-9]", "nodeX"));
    assert!(pattern_matches("h[^e]llo", "hallo"));
    assert!(!pattern_matches("h[^e]llo", "hello"));
}

#[test]
fn test_pattern_matches_escape() {
    assert!(pattern_matches("data\\*", "data*"));
    assert!(!pattern_matches("data\\*", "data_in"));
}

#[test]
fn test_pattern_matches_unterminated_class_is_literal() {
    assert!(pattern_matches("a[b", "a[b"));
    assert!(!pattern_matches("a[b", "ab"));
}

#[test]
fn test_subscription_id_display() {
    assert_eq!(SubscriptionId(7).to_string(), "sub-7");
}
