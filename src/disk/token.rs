//! Idempotency tokens derived from volume names.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

/// Longest token the provider accepts.
pub const MAX_CLIENT_TOKEN_LEN: usize = 64;

const NAME_PREFIX: &str = "n:";
const HASH_PREFIX: &str = "h:";

/// Derives the idempotency token for a volume name.
///
/// Short ASCII names are used verbatim behind `n:`. Anything else is
/// replaced by the unpadded base64url SHA-256 digest of the name behind `h:`.
/// The prefixes keep the two forms from ever colliding.
#[must_use]
pub fn client_token(name: &str) -> String {
    if name.is_ascii() && NAME_PREFIX.len() + name.len() <= MAX_CLIENT_TOKEN_LEN {
        return format!("{NAME_PREFIX}{name}");
    }
    let digest = Sha256::digest(name.as_bytes());
    format!("{HASH_PREFIX}{}", URL_SAFE_NO_PAD.encode(digest))
}
