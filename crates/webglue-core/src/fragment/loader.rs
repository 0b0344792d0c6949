use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::document::Document;
use super::source::FragmentSource;

/// Path of the shared page header fragment
pub const HEADER_FRAGMENT_PATH: &str = "/web/component/header.html";

/// Path of the shared page footer fragment
pub const FOOTER_FRAGMENT_PATH: &str = "/web/component/footer.html";

pub const HEADER_MOUNT_ID: &str = "header";
pub const FOOTER_MOUNT_ID: &str = "footer";

/// A fragment resource and the element it is rendered into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub mount_id: String,
    pub path: String,
}

impl Fragment {
    pub fn new(mount_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            mount_id: mount_id.into(),
            path: path.into(),
        }
    }

    pub fn header() -> Self {
        Self::new(HEADER_MOUNT_ID, HEADER_FRAGMENT_PATH)
    }

    pub fn footer() -> Self {
        Self::new(FOOTER_MOUNT_ID, FOOTER_FRAGMENT_PATH)
    }
}

/// What happened to one fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FragmentOutcome {
    Rendered { bytes: usize },
    FetchFailed(String),
    MountFailed(String),
    /// The task panicked or was cancelled by runtime shutdown.
    TaskFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentReport {
    pub fragment: Fragment,
    pub outcome: FragmentOutcome,
}

/// Spawned fragment loads.
///
/// Dropping the handle detaches the tasks; they still run to completion.
pub struct LoadHandle {
    tasks: Vec<(Fragment, JoinHandle<FragmentOutcome>)>,
}

impl LoadHandle {
    /// Wait for every fragment, reporting them in request order.
    pub async fn join(self) -> Vec<FragmentReport> {
        let (fragments, handles): (Vec<_>, Vec<_>) = self.tasks.into_iter().unzip();
        join_all(handles)
            .await
            .into_iter()
            .zip(fragments)
            .map(|(result, fragment)| FragmentReport {
                fragment,
                outcome: result.unwrap_or_else(|e| FragmentOutcome::TaskFailed(e.to_string())),
            })
            .collect()
    }
}

/// Splices the shared header and footer fragments into a document.
///
/// Each fragment is fetched on its own task, so they render in whatever
/// order the responses arrive and one failing never holds back the other.
/// Failures are logged and the mount keeps its previous content; nothing
/// is retried and nothing is cached. Must be called within a tokio runtime.
pub struct FragmentLoader<S, D> {
    source: Arc<S>,
    document: Arc<D>,
    fragments: Vec<Fragment>,
}

impl<S: FragmentSource, D: Document> FragmentLoader<S, D> {
    pub fn new(source: Arc<S>, document: Arc<D>) -> Self {
        Self {
            source,
            document,
            fragments: vec![Fragment::header(), Fragment::footer()],
        }
    }

    /// Override the header and footer resource paths.
    pub fn with_paths(mut self, header_path: &str, footer_path: &str) -> Self {
        self.fragments = vec![
            Fragment::new(HEADER_MOUNT_ID, header_path),
            Fragment::new(FOOTER_MOUNT_ID, footer_path),
        ];
        self
    }

    pub fn document(&self) -> &Arc<D> {
        &self.document
    }

    /// Fetch the header and footer and render each into its mount point.
    pub fn load_header_and_footer(&self) -> LoadHandle {
        self.load(&self.fragments)
    }

    /// Fetch and render an arbitrary set of fragments, one task each.
    pub fn load(&self, fragments: &[Fragment]) -> LoadHandle {
        let tasks = fragments
            .iter()
            .cloned()
            .map(|fragment| {
                let source = Arc::clone(&self.source);
                let document = Arc::clone(&self.document);
                let task_fragment = fragment.clone();
                let handle = tokio::spawn(async move {
                    render_fragment(source.as_ref(), document.as_ref(), &task_fragment).await
                });
                (fragment, handle)
            })
            .collect();

        LoadHandle { tasks }
    }
}

async fn render_fragment<S: FragmentSource, D: Document>(
    source: &S,
    document: &D,
    fragment: &Fragment,
) -> FragmentOutcome {
    let html = match source.fetch(&fragment.path).await {
        Ok(html) => html,
        Err(e) => {
            warn!(path = %fragment.path, error = %e, "Failed to fetch fragment");
            return FragmentOutcome::FetchFailed(e.to_string());
        }
    };

    match document.set_inner_html(&fragment.mount_id, &html) {
        Ok(()) => {
            debug!(mount = %fragment.mount_id, bytes = html.len(), "Fragment rendered");
            FragmentOutcome::Rendered { bytes: html.len() }
        }
        Err(e) => {
            warn!(mount = %fragment.mount_id, error = %e, "Failed to render fragment");
            FragmentOutcome::MountFailed(e.to_string())
        }
    }
}
