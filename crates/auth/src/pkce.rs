//! PKCE material for the authorization-code flow.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::types::PkceChallenge;

/// Generate a fresh verifier/challenge pair.
///
/// The verifier is 32 bytes from the OS CSPRNG, base64url-encoded without
/// padding (43 characters), which satisfies the RFC 7636 length bounds of
/// 43-128.
pub fn generate_pkce_challenge() -> PkceChallenge {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    let verifier = URL_SAFE_NO_PAD.encode(bytes);
    let challenge = challenge_for(&verifier);
    PkceChallenge {
        verifier,
        challenge,
    }
}

/// SHA-256 of the verifier, base64url-encoded without padding.
pub fn challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Short random alphanumeric anti-replay value for the authorization URL.
pub fn generate_state() -> String {
    use rand::distr::{Alphanumeric, SampleString};
    Alphanumeric.sample_string(&mut rand::rng(), 10)
}
