//! Cookie storage used by the auth bridge.
//!
//! Cookies are plain `name=value` pairs. No attributes (expiry, path,
//! `Secure`, `HttpOnly`) are modelled.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::debug;

use crate::error::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse a `name=value` pair. Returns `None` without an `=` or a name.
    pub fn parse(pair: &str) -> Option<Self> {
        let (name, value) = pair.split_once('=')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some(Self::new(name, value.trim()))
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Somewhere cookies can be written to and read back from.
pub trait CookieJar: Send + Sync {
    /// Store `cookie`, replacing any cookie with the same name.
    fn set(&self, cookie: Cookie) -> Result<(), StoreError>;

    fn get(&self, name: &str) -> Option<String>;

    /// All cookies, ordered by name.
    fn all(&self) -> Vec<Cookie>;

    /// Render the jar the way a document exposes it: `a=1; b=2`.
    fn header_value(&self) -> String {
        self.all()
            .iter()
            .map(Cookie::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl<J: CookieJar + ?Sized> CookieJar for &J {
    fn set(&self, cookie: Cookie) -> Result<(), StoreError> {
        (**self).set(cookie)
    }

    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }

    fn all(&self) -> Vec<Cookie> {
        (**self).all()
    }
}

/// Process-local cookie jar.
#[derive(Debug, Default)]
pub struct MemoryCookieJar {
    cookies: RwLock<BTreeMap<String, String>>,
}

impl MemoryCookieJar {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CookieJar for MemoryCookieJar {
    fn set(&self, cookie: Cookie) -> Result<(), StoreError> {
        self.cookies
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(cookie.name, cookie.value);
        Ok(())
    }

    fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    fn all(&self) -> Vec<Cookie> {
        self.cookies
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(name, value)| Cookie::new(name.clone(), value.clone()))
            .collect()
    }
}

/// Cookie jar persisted as a JSON object on disk.
///
/// Every `set` rewrites the whole file.
#[derive(Debug)]
pub struct FileCookieJar {
    path: PathBuf,
    cookies: RwLock<BTreeMap<String, String>>,
}

impl FileCookieJar {
    /// Open the jar at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let cookies = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            cookies: RwLock::new(cookies),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, cookies: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(cookies)?;
        std::fs::write(&self.path, contents)?;
        debug!(path = %self.path.display(), "Cookie jar saved");
        Ok(())
    }
}

impl CookieJar for FileCookieJar {
    fn set(&self, cookie: Cookie) -> Result<(), StoreError> {
        let mut cookies = self.cookies.write().unwrap_or_else(|e| e.into_inner());
        let mut next = cookies.clone();
        next.insert(cookie.name, cookie.value);
        // Memory only changes once the file does
        self.save(&next)?;
        *cookies = next;
        Ok(())
    }

    fn get(&self, name: &str) -> Option<String> {
        self.cookies
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    fn all(&self) -> Vec<Cookie> {
        self.cookies
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(name, value)| Cookie::new(name.clone(), value.clone()))
            .collect()
    }
}
