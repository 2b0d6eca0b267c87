//! Disk cache for raw registry responses.
//!
//! Bodies are stored verbatim under `<root>/<host>/<gem>.json` and expire by
//! file mtime. Cache failures are never fatal: a miss just means another
//! network round trip.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, warn};

const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub struct ResponseCache {
    root: PathBuf,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(root: PathBuf) -> Self {
        ResponseCache {
            root,
            ttl: CACHE_TTL,
        }
    }

    #[cfg(test)]
    fn with_ttl(root: PathBuf, ttl: Duration) -> Self {
        ResponseCache { root, ttl }
    }

    /// Return the cached body for `gem`, if one exists and is newer than the
    /// TTL.
    pub fn fresh(&self, host: &str, gem: &str) -> Option<String> {
        let path = self.entry_path(host, gem);
        let modified = fs::metadata(&path).ok()?.modified().ok()?;
        let age = modified.elapsed().ok()?;
        if age > self.ttl {
            debug!(gem, host, ?age, "cached response expired");
            return None;
        }
        fs::read_to_string(&path).ok()
    }

    pub fn store(&self, host: &str, gem: &str, body: &str) {
        let path = self.entry_path(host, gem);
        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                warn!(gem, host, "could not create cache directory: {err}");
                return;
            }
        }
        if let Err(err) = fs::write(&path, body) {
            warn!(gem, host, "could not write cache entry: {err}");
        }
    }

    fn entry_path(&self, host: &str, gem: &str) -> PathBuf {
        self.root
            .join(sanitize(host))
            .join(format!("{}.json", sanitize(gem)))
    }
}

/// Hosts and gem names come from the lockfile, so they cannot be trusted as
/// path segments. Anything outside a conservative set becomes an underscore.
fn sanitize(segment: &str) -> String {
    segment
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '_' | '-' => c,
            _ => '_',
        })
        .collect()
}
