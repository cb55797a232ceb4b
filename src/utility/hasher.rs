use sha1::{Digest, Sha1};
use std::hash::Hasher;

/// Hasher returning the hex digest of an algorithm implementing Digest.
pub struct DigestHasher<D: Digest> {
    digest: D,
}

impl<D> DigestHasher<D>
where
    D: Digest,
{
    pub fn finalize(self) -> String {
        hex::encode(self.digest.finalize().0)
    }
}

impl<D> From<D> for DigestHasher<D>
where
    D: Digest,
{
    fn from(digest: D) -> Self {
        DigestHasher { digest }
    }
}

impl<D: Digest> Hasher for DigestHasher<D> {
    /// Only the hex digest from `finalize` is meaningful.
    fn finish(&self) -> u64 {
        unimplemented!("Do not call finish()");
    }

    fn write(&mut self, bytes: &[u8]) {
        self.digest.update(bytes);
    }
}

/// SHA-1 of an uploaded file, used by clients to recognise a re-upload.
pub fn upload_hash(bytes: &[u8]) -> String {
    let mut hasher = DigestHasher::from(Sha1::new());

    hasher.write(bytes);
    hasher.finalize()
}
