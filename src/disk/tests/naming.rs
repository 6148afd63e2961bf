//! Tests for provider naming rules.

use rstest::rstest;

use crate::disk::{is_valid_disk_name, is_valid_snapshot_name};

#[rstest]
#[case("快照", true)]
#[case("pv-disk.1:a_b", true)]
#[case("autosnap", true)]
#[case("a", false)]
#[case("块", false)]
#[case("???", false)]
#[case("0asdf", false)]
#[case("😊😊😊", false)]
#[case("http://disk", false)]
#[case("https://disk", false)]
fn disk_names(#[case] name: &str, #[case] valid: bool) {
    assert_eq!(is_valid_disk_name(name), valid);
}

#[rstest]
#[case("快照", true)]
#[case("snap-1", true)]
#[case("autosnap", false)]
#[case("a", false)]
fn snapshot_names(#[case] name: &str, #[case] valid: bool) {
    assert_eq!(is_valid_snapshot_name(name), valid);
}

#[rstest]
fn names_longer_than_limit_are_rejected() {
    assert!(is_valid_disk_name(&"a".repeat(128)));
    assert!(!is_valid_disk_name(&"a".repeat(129)));
}
