//! Wallet key and proxy sources.
//!
//! Both files are newline-delimited. Blank lines and `#` comments are
//! ignored for keys; for proxies they keep their line slot so line N
//! always maps to wallet N.

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::ActionError;

/// Secret key material for one wallet. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(String);

impl SecretKey {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// Parse keys from file contents.
pub fn parse_keys(content: &str) -> Vec<SecretKey> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| SecretKey(line.to_string()))
        .collect()
}

/// Key file, re-read at the start of every cycle.
#[derive(Debug, Clone)]
pub struct KeySource {
    path: PathBuf,
}

impl KeySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all keys. A missing file or an empty list is a config error.
    pub fn load(&self) -> Result<Vec<SecretKey>, ActionError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            ActionError::Config(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        let keys = parse_keys(&content);
        if keys.is_empty() {
            return Err(ActionError::Config(format!(
                "no keys in {}",
                self.path.display()
            )));
        }
        info!(count = keys.len(), file = %self.path.display(), "Loaded wallet keys");
        Ok(keys)
    }
}

/// Proxy per wallet position (0-based).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyMap {
    entries: Vec<Option<String>>,
}

impl ProxyMap {
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .map(str::trim)
            .map(|line| {
                if line.is_empty() || line.starts_with('#') {
                    None
                } else {
                    Some(line.to_string())
                }
            })
            .collect();
        Self { entries }
    }

    /// Proxy for the wallet at `index`, if any.
    pub fn for_wallet(&self, index: usize) -> Option<&str> {
        self.entries.get(index).and_then(|p| p.as_deref())
    }

    /// Number of wallets with a proxy assigned.
    pub fn assigned(&self) -> usize {
        self.entries.iter().filter(|p| p.is_some()).count()
    }
}

/// Optional proxy file. Missing means every wallet goes direct.
#[derive(Debug, Clone)]
pub struct ProxySource {
    path: PathBuf,
}

impl ProxySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> ProxyMap {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let map = ProxyMap::parse(&content);
                info!(assigned = map.assigned(), file = %self.path.display(), "Loaded proxy mappings");
                map
            }
            Err(e) => {
                warn!(file = %self.path.display(), error = %e, "No proxy file, using direct connections");
                ProxyMap::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_keys_skips_blank_and_comments() {
        let keys = parse_keys("  suiprivkey1aaa  \n\n# old wallet\nsuiprivkey1bbb\n   \n");
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].expose(), "suiprivkey1aaa");
        assert_eq!(keys[1].expose(), "suiprivkey1bbb");
    }

    #[test]
    fn test_secret_key_debug_is_redacted() {
        let keys = parse_keys("suiprivkey1secret");
        assert!(!format!("{:?}", keys).contains("secret"));
    }

    #[test]
    fn test_key_source_errors() {
        let missing = KeySource::new("/nonexistent/privatekey.txt");
        assert!(matches!(missing.load(), Err(ActionError::Config(_))));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# nothing here").unwrap();
        let empty = KeySource::new(file.path());
        assert!(matches!(empty.load(), Err(ActionError::Config(_))));
    }

    #[test]
    fn test_key_source_loads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "k1\nk2").unwrap();
        let keys = KeySource::new(file.path()).load().unwrap();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_proxy_lines_map_to_wallet_positions() {
        let map = ProxyMap::parse("http://p1:8080\n\n# skip\nhttp://p4:8080\n");
        assert_eq!(map.for_wallet(0), Some("http://p1:8080"));
        assert_eq!(map.for_wallet(1), None);
        assert_eq!(map.for_wallet(2), None);
        assert_eq!(map.for_wallet(3), Some("http://p4:8080"));
        assert_eq!(map.for_wallet(9), None);
        assert_eq!(map.assigned(), 2);
    }

    #[test]
    fn test_missing_proxy_file_is_empty() {
        let map = ProxySource::new("/nonexistent/proxy.txt").load();
        assert_eq!(map, ProxyMap::default());
    }
}
