//! Tests for idempotency token derivation.

use rstest::rstest;

use crate::disk::{MAX_CLIENT_TOKEN_LEN, client_token};

#[rstest]
#[case("pv-1")]
#[case("d-12345")]
fn short_ascii_names_are_used_verbatim(#[case] name: &str) {
    assert_eq!(client_token(name), format!("n:{name}"));
}

#[rstest]
fn name_filling_the_limit_is_verbatim() {
    let name = "a".repeat(MAX_CLIENT_TOKEN_LEN - 2);
    let token = client_token(&name);
    assert_eq!(token.len(), MAX_CLIENT_TOKEN_LEN);
    assert!(token.starts_with("n:"));
}

#[rstest]
#[case::one_past_the_limit("a".repeat(MAX_CLIENT_TOKEN_LEN - 1))]
#[case::long("pvc-".repeat(40))]
#[case::non_ascii(String::from("快照"))]
#[case::emoji(String::from("😊😊😊"))]
fn other_names_are_hashed(#[case] name: String) {
    let token = client_token(&name);
    assert!(token.starts_with("h:"), "unexpected token {token}");
    assert_eq!(token.len(), 45);
    assert!(token.len() <= MAX_CLIENT_TOKEN_LEN);
    assert!(
        token
            .chars()
            .skip(2)
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    );
}

#[rstest]
fn tokens_are_deterministic() {
    let name = "x".repeat(100);
    assert_eq!(client_token(&name), client_token(&name));
    assert_eq!(client_token("pv-1"), client_token("pv-1"));
}

#[rstest]
fn distinct_names_yield_distinct_tokens() {
    let long_a = format!("{}a", "x".repeat(100));
    let long_b = format!("{}b", "x".repeat(100));
    assert_ne!(client_token(&long_a), client_token(&long_b));
    assert_ne!(client_token("pv-1"), client_token("pv-2"));
}

#[rstest]
#[case::uuid_name(
    "disk-dcd6fdde-8c1e-45eb-8ec7-786a8b2e0b61",
    "n:disk-dcd6fdde-8c1e-45eb-8ec7-786a8b2e0b61"
)]
#[case::non_ascii("disk-磁盘名称-1", "h:L3y31WKigNghwG2UtDPyUwpn5jcFd8hDAGxexbW0q-Y")]
#[case::sixty_two_digits(
    "01234567890123456789012345678901234567890123456789012345678901",
    "n:01234567890123456789012345678901234567890123456789012345678901"
)]
#[case::sixty_three_digits(
    "012345678901234567890123456789012345678901234567890123456789012",
    "h:B09umsMB1dG2328d-4xvicGH6pRdNSzmopJ5qcYwaAs"
)]
fn tokens_stay_stable_across_releases(#[case] name: &str, #[case] expected: &str) {
    assert_eq!(client_token(name), expected);
}
