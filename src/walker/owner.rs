//! Owner name resolution with a bounded per-walker cache
//!
//! The same handful of uids recur across millions of files, so each lookup
//! against the password database is cached in an LRU map owned by the
//! walker. Nothing is shared across walkers or processes.

use crate::types::UNKNOWN_OWNER;
use lru::LruCache;
use std::num::NonZeroUsize;

/// Default number of distinct uids kept
pub const DEFAULT_OWNER_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(512) {
    Some(n) => n,
    None => panic!("owner cache capacity must be non-zero"),
};

/// LRU cache mapping uid to user name
pub struct OwnerCache {
    names: LruCache<u32, String>,
    lookups: u64,
}

impl OwnerCache {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            names: LruCache::new(capacity),
            lookups: 0,
        }
    }

    /// Resolve `uid`, falling back to [`UNKNOWN_OWNER`]
    pub fn resolve(&mut self, uid: u32) -> String {
        if let Some(name) = self.names.get(&uid) {
            return name.clone();
        }
        self.lookups += 1;
        let name = lookup_user_name(uid).unwrap_or_else(|| UNKNOWN_OWNER.to_string());
        self.names.put(uid, name.clone());
        name
    }

    /// Number of password database lookups performed (cache misses)
    pub fn lookups(&self) -> u64 {
        self.lookups
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for OwnerCache {
    fn default() -> Self {
        Self::new(DEFAULT_OWNER_CACHE_CAPACITY)
    }
}

/// Largest buffer tried for `getpwuid_r` before giving up
#[cfg(unix)]
const MAX_PASSWD_BUFFER: usize = 1 << 20;

#[cfg(unix)]
fn lookup_user_name(uid: u32) -> Option<String> {
    use std::ffi::CStr;

    let mut buf: Vec<libc::c_char> = vec![0; 1024];
    loop {
        // SAFETY: `passwd` is plain data; getpwuid_r fills it and points its
        // strings into `buf`, which outlives every read below.
        let mut pwd: libc::passwd = unsafe { std::mem::zeroed() };
        let mut result: *mut libc::passwd = std::ptr::null_mut();
        let rc = unsafe {
            libc::getpwuid_r(
                uid as libc::uid_t,
                &mut pwd,
                buf.as_mut_ptr(),
                buf.len(),
                &mut result,
            )
        };

        if rc == libc::ERANGE && buf.len() < MAX_PASSWD_BUFFER {
            let grown = buf.len() * 2;
            buf.resize(grown, 0);
            continue;
        }
        if rc != 0 || result.is_null() || pwd.pw_name.is_null() {
            return None;
        }

        let name = unsafe { CStr::from_ptr(pwd.pw_name) };
        return Some(name.to_string_lossy().into_owned());
    }
}

#[cfg(not(unix))]
fn lookup_user_name(_uid: u32) -> Option<String> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_resolve_root() {
        let mut cache = OwnerCache::default();
        assert_eq!(cache.resolve(0), "root");
    }

    #[test]
    fn test_unknown_uid_uses_sentinel() {
        let mut cache = OwnerCache::default();
        // Far above any uid a test system allocates
        assert_eq!(cache.resolve(3_999_999_999), UNKNOWN_OWNER);
    }

    #[test]
    fn test_lookups_are_memoized() {
        let mut cache = OwnerCache::default();
        let first = cache.resolve(0);
        let second = cache.resolve(0);
        assert_eq!(first, second);
        assert_eq!(cache.lookups(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_capacity_is_bounded() {
        let mut cache = OwnerCache::new(NonZeroUsize::new(2).unwrap());
        cache.resolve(3_999_999_990);
        cache.resolve(3_999_999_991);
        cache.resolve(3_999_999_992);
        assert_eq!(cache.len(), 2);

        // The oldest entry was evicted and costs another lookup
        cache.resolve(3_999_999_990);
        assert_eq!(cache.lookups(), 4);
    }
}
