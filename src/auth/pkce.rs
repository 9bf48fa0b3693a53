use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// PKCE verifier and its S256 challenge.
///
/// The challenge goes to the identity provider with the link request; the
/// verifier stays in a short-lived cookie until the callback exchanges the
/// code.
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    pub code_verifier: String,
    pub code_challenge: String,
}

impl PkceChallenge {
    pub fn new() -> Self {
        let mut verifier_bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut verifier_bytes);
        let code_verifier = URL_SAFE_NO_PAD.encode(verifier_bytes);
        let code_challenge = Self::challenge_for(&code_verifier);

        Self {
            code_verifier,
            code_challenge,
        }
    }

    /// S256 transform of a verifier.
    pub fn challenge_for(code_verifier: &str) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(code_verifier.as_bytes()))
    }
}

impl Default for PkceChallenge {
    fn default() -> Self {
        Self::new()
    }
}
