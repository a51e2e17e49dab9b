//! Small helpers shared by the harness and tests.

use std::path::Path;

use anyhow::{Context, Result};
use solana_keypair::Keypair;

/// Load a keypair from the Solana CLI's JSON file format (a 64-element byte
/// array, e.g. `~/.config/solana/id.json`).
pub fn load_keypair(path: &Path) -> Result<Keypair> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read keypair file: {}", path.display()))?;
    let bytes: Vec<u8> = serde_json::from_str(&json)
        .with_context(|| format!("keypair file is not a JSON byte array: {}", path.display()))?;
    Keypair::try_from(bytes.as_slice())
        .map_err(|e| anyhow::anyhow!("invalid keypair in {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_signer::Signer;

    #[test]
    fn test_load_keypair_round_trip() {
        let keypair = Keypair::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id.json");
        let json = serde_json::to_string(&keypair.to_bytes().to_vec()).unwrap();
        std::fs::write(&path, json).unwrap();

        let loaded = load_keypair(&path).unwrap();
        assert_eq!(loaded.pubkey(), keypair.pubkey());
    }

    #[test]
    fn test_load_keypair_missing_file() {
        let result = load_keypair(Path::new("/nonexistent/id.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_keypair_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("id.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(load_keypair(&path).is_err());
    }
}
