//! Provider naming rules for disks and snapshots.

const MIN_NAME_CHARS: usize = 2;
const MAX_NAME_CHARS: usize = 128;

/// Returns `true` when `name` is acceptable as a provider disk name.
///
/// Names are 2 to 128 characters, start with a letter (any script), contain
/// only letters, digits, `:`, `_`, `-` and `.`, and do not start with
/// `http://` or `https://`.
#[must_use]
pub fn is_valid_disk_name(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_with_letter = chars.next().is_some_and(char::is_alphabetic);
    let length = name.chars().count();
    starts_with_letter
        && (MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&length)
        && !name.starts_with("http://")
        && !name.starts_with("https://")
        && chars.all(|ch| ch.is_alphanumeric() || matches!(ch, ':' | '_' | '-' | '.'))
}

/// Returns `true` when `name` is acceptable as a provider snapshot name.
///
/// Same rules as disk names, except that `auto` is reserved as a prefix for
/// the provider's automatic snapshots.
#[must_use]
pub fn is_valid_snapshot_name(name: &str) -> bool {
    !name.starts_with("auto") && is_valid_disk_name(name)
}
