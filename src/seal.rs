use sha2::{Digest, Sha256};

const SEAL_DOMAIN: &[u8] = b"calculi-state-seal|";

/// State that leaves the process and must come back unmodified.
pub trait ProtectedState {
    /// Canonical rendering of every field that determines the proof,
    /// excluding the seal itself.
    fn seal_info(&self) -> String;

    fn seal(&self) -> &str;

    fn set_seal(&mut self, seal: String);

    fn compute_seal(&mut self) {
        let seal = digest(&self.seal_info());
        self.set_seal(seal);
    }

    fn verify_seal(&self) -> bool {
        digest(&self.seal_info()) == self.seal()
    }
}

pub fn digest(info: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(SEAL_DOMAIN);
    hasher.update(info.as_bytes());
    format!("{:x}", hasher.finalize())
}
