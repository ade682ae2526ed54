use anyhow::{Context, Result};
use std::path::Path;

/// Create a directory (and parents) if it does not exist yet
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_dir_creates_nested() {
        let base = std::env::temp_dir().join(format!("gigcal-test-{}", uuid::Uuid::new_v4()));
        let nested = base.join("a").join("b");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
        // idempotent
        ensure_dir(&nested).unwrap();
        std::fs::remove_dir_all(&base).unwrap();
    }
}
