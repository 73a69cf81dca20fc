use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Idea,
    Task,
    Log,
}

impl IdKind {
    fn prefix(self) -> &'static str {
        match self {
            IdKind::Idea => "I",
            IdKind::Task => "T",
            IdKind::Log => "L",
        }
    }
}

/// Short hashed id such as `T-3f9a01bc`, retried until `exists` rejects no candidate.
pub fn generate_id<F>(kind: IdKind, mut exists: F) -> String
where
    F: FnMut(&str) -> bool,
{
    for _ in 0..64 {
        let seed = Uuid::now_v7().to_string();
        let mut hasher = Sha256::new();
        hasher.update(seed.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        let candidate = format!("{}-{}", kind.prefix(), &digest[..8]);
        if !exists(&candidate) {
            return candidate;
        }
    }

    format!("{}-{}", kind.prefix(), Uuid::now_v7().simple())
}
