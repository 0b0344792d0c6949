use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::MountError;

/// The page fragments are rendered into.
pub trait Document: Send + Sync + 'static {
    /// Replace the inner content of the element with id `element_id`.
    fn set_inner_html(&self, element_id: &str, html: &str) -> Result<(), MountError>;
}

/// Document holding a fixed set of mount elements in memory.
#[derive(Debug, Default)]
pub struct MemoryDocument {
    elements: RwLock<HashMap<String, String>>,
}

impl MemoryDocument {
    /// A document with an empty element for each id.
    pub fn with_mounts<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let elements = ids.into_iter().map(|id| (id.into(), String::new())).collect();
        Self {
            elements: RwLock::new(elements),
        }
    }

    pub fn inner_html(&self, element_id: &str) -> Option<String> {
        self.elements
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(element_id)
            .cloned()
    }
}

impl Document for MemoryDocument {
    fn set_inner_html(&self, element_id: &str, html: &str) -> Result<(), MountError> {
        let mut elements = self.elements.write().unwrap_or_else(|e| e.into_inner());
        match elements.get_mut(element_id) {
            Some(content) => {
                *content = html.to_string();
                Ok(())
            }
            None => Err(MountError::NotFound(element_id.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_inner_html_replaces_content() {
        let doc = MemoryDocument::with_mounts(["header"]);
        doc.set_inner_html("header", "<nav>a</nav>").unwrap();
        doc.set_inner_html("header", "<nav>b</nav>").unwrap();
        assert_eq!(doc.inner_html("header").as_deref(), Some("<nav>b</nav>"));
    }

    #[test]
    fn test_missing_mount_is_error() {
        let doc = MemoryDocument::with_mounts(["header"]);
        assert_eq!(
            doc.set_inner_html("footer", "x"),
            Err(MountError::NotFound("footer".to_string()))
        );
        assert_eq!(doc.inner_html("footer"), None);
    }
}
