//! In-memory [`FileSystem`] capability.
//!
//! Used wherever a real disk is unavailable or unwanted: embedding hosts that
//! stage files in memory, and tests that need a fabricated tree. Failures can
//! be injected per path and operation to exercise error handling.

use std::collections::HashMap;
use std::io;

use chrono::{DateTime, Utc};
use romshelf_core::path::{basename, dirname, join};
use romshelf_core::FsOperation;
use tokio::sync::RwLock;

use crate::fs::{FileSystem, RawStat};

#[derive(Debug, Clone)]
enum Node {
    Directory { children: Vec<String> },
    File { data: Vec<u8>, modified_at: DateTime<Utc> },
    Link { target: String },
}

/// Link chains longer than this resolve to nothing, like `ELOOP`.
const MAX_LINK_DEPTH: usize = 8;

#[derive(Debug, Default)]
struct MemoryState {
    nodes: HashMap<String, Node>,
    failures: HashMap<(String, FsOperation), io::ErrorKind>,
}

impl MemoryState {
    fn check(&self, path: &str, operation: FsOperation) -> io::Result<()> {
        match self.failures.get(&(path.to_string(), operation)) {
            Some(&kind) => Err(io::Error::new(
                kind,
                format!("injected {operation} failure at {path}"),
            )),
            None => Ok(()),
        }
    }

    /// Follow links from `path`, including linked ancestors, to the node
    /// they end at.
    fn resolve(&self, path: &str) -> Option<&Node> {
        let mut current = path.to_string();
        for _ in 0..MAX_LINK_DEPTH {
            match self.nodes.get(&current) {
                Some(Node::Link { target }) => current = target.clone(),
                Some(node) => return Some(node),
                None => current = self.through_linked_ancestor(&current)?,
            }
        }
        None
    }

    /// Rewrite `path` with its nearest linked ancestor replaced by the
    /// link's target.
    fn through_linked_ancestor(&self, path: &str) -> Option<String> {
        let mut dir = dirname(path);
        loop {
            if let Some(Node::Link { target }) = self.nodes.get(&dir) {
                let rest = path.strip_prefix(dir.as_str())?;
                return Some(format!("{target}{rest}"));
            }
            let parent = dirname(&dir);
            if parent == dir {
                return None;
            }
            dir = parent;
        }
    }

    /// Create `path` and any missing parents as directories.
    fn ensure_directory(&mut self, path: &str) -> io::Result<()> {
        match self.resolve(path) {
            Some(Node::Directory { .. }) => return Ok(()),
            Some(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::NotADirectory,
                    format!("{path} is a file"),
                ));
            }
            None => {}
        }
        let parent = dirname(path);
        if parent != path {
            self.ensure_directory(&parent)?;
            self.attach(&parent, path);
        }
        self.nodes.insert(
            path.to_string(),
            Node::Directory {
                children: Vec::new(),
            },
        );
        Ok(())
    }

    /// Register `path` as a child of `parent`, keeping insertion order.
    fn attach(&mut self, parent: &str, path: &str) {
        let name = basename(path, None).to_string();
        if let Some(Node::Directory { children }) = self.nodes.get_mut(parent) {
            if !children.contains(&name) {
                children.push(name);
            }
        }
    }

    fn require_parent_directory(&self, path: &str) -> io::Result<()> {
        let parent = dirname(path);
        match self.resolve(&parent) {
            Some(Node::Directory { .. }) => Ok(()),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("parent of {path} is a file"),
            )),
            None => Err(not_found(&parent)),
        }
    }

    fn insert_file(&mut self, path: &str, data: Vec<u8>, modified_at: DateTime<Utc>) {
        let parent = dirname(path);
        self.attach(&parent, path);
        self.nodes
            .insert(path.to_string(), Node::File { data, modified_at });
    }
}

/// A file system that lives entirely in memory.
///
/// Directory listings come back in insertion order. The root `/` always
/// exists.
#[derive(Debug)]
pub struct MemoryFileSystem {
    state: RwLock<MemoryState>,
}

impl Default for MemoryFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        let mut state = MemoryState::default();
        state.nodes.insert(
            "/".to_string(),
            Node::Directory {
                children: Vec::new(),
            },
        );
        Self {
            state: RwLock::new(state),
        }
    }

    /// Add a directory (and its parents).
    pub fn add_dir(&mut self, path: &str) -> &mut Self {
        let path = join(&[path]);
        // A file already sitting at `path` leaves the tree unchanged.
        let _ = self.state.get_mut().ensure_directory(&path);
        self
    }

    /// Add a file with a fixed modification time of the Unix epoch.
    pub fn add_file(&mut self, path: &str, data: impl Into<Vec<u8>>) -> &mut Self {
        self.add_file_at(path, data, DateTime::<Utc>::UNIX_EPOCH)
    }

    /// Add a file with an explicit modification time, creating parents.
    pub fn add_file_at(
        &mut self,
        path: &str,
        data: impl Into<Vec<u8>>,
        modified_at: DateTime<Utc>,
    ) -> &mut Self {
        let path = join(&[path]);
        let state = self.state.get_mut();
        if state.ensure_directory(&dirname(&path)).is_ok() {
            state.insert_file(&path, data.into(), modified_at);
        }
        self
    }

    /// Add a symbolic link at `path` pointing to `target`, creating parents.
    /// The target does not have to exist.
    pub fn add_link(&mut self, path: &str, target: &str) -> &mut Self {
        let path = join(&[path]);
        let target = join(&[target]);
        let state = self.state.get_mut();
        let parent = dirname(&path);
        if state.ensure_directory(&parent).is_ok() {
            state.attach(&parent, &path);
            state.nodes.insert(path, Node::Link { target });
        }
        self
    }

    /// Make `operation` on `path` fail with `kind` from now on.
    pub fn fail(&mut self, path: &str, operation: FsOperation, kind: io::ErrorKind) -> &mut Self {
        self.state
            .get_mut()
            .failures
            .insert((join(&[path]), operation), kind);
        self
    }
}

fn not_found(path: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{path} does not exist"))
}

impl FileSystem for MemoryFileSystem {
    async fn list_directory(&self, path: &str) -> io::Result<Vec<String>> {
        let path = join(&[path]);
        let state = self.state.read().await;
        state.check(&path, FsOperation::List)?;
        match state.resolve(&path) {
            Some(Node::Directory { children }) => Ok(children.clone()),
            Some(_) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{path} is a file"),
            )),
            None => Err(not_found(&path)),
        }
    }

    async fn stat(&self, path: &str) -> io::Result<RawStat> {
        let path = join(&[path]);
        let state = self.state.read().await;
        state.check(&path, FsOperation::Stat)?;
        let is_symlink = matches!(state.nodes.get(&path), Some(Node::Link { .. }));
        Ok(match state.resolve(&path) {
            Some(Node::Directory { .. }) => RawStat {
                exists: true,
                is_directory: true,
                is_symlink,
                size: 0,
                modified_at: DateTime::<Utc>::UNIX_EPOCH,
            },
            Some(Node::File { data, modified_at }) => RawStat {
                exists: true,
                is_directory: false,
                is_symlink,
                size: data.len() as u64,
                modified_at: *modified_at,
            },
            Some(Node::Link { .. }) | None => RawStat::missing(),
        })
    }

    async fn read(&self, path: &str) -> io::Result<Vec<u8>> {
        let path = join(&[path]);
        let state = self.state.read().await;
        state.check(&path, FsOperation::Read)?;
        match state.resolve(&path) {
            Some(Node::File { data, .. }) => Ok(data.clone()),
            Some(Node::Directory { .. }) => Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("{path} is a directory"),
            )),
            Some(Node::Link { .. }) | None => Err(not_found(&path)),
        }
    }

    async fn read_text(&self, path: &str) -> io::Result<String> {
        let data = self.read(path).await?;
        String::from_utf8(data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    async fn write_text(&self, path: &str, content: &str) -> io::Result<()> {
        let path = join(&[path]);
        let mut state = self.state.write().await;
        state.check(&path, FsOperation::Write)?;
        state.require_parent_directory(&path)?;
        if matches!(state.nodes.get(&path), Some(Node::Directory { .. })) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("{path} is a directory"),
            ));
        }
        state.insert_file(&path, content.as_bytes().to_vec(), Utc::now());
        Ok(())
    }

    async fn make_directory(&self, path: &str, recursive: bool) -> io::Result<()> {
        let path = join(&[path]);
        let mut state = self.state.write().await;
        state.check(&path, FsOperation::MakeDirectory)?;
        if recursive {
            return state.ensure_directory(&path);
        }
        if state.nodes.contains_key(&path) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{path} already exists"),
            ));
        }
        state.require_parent_directory(&path)?;
        state.ensure_directory(&path)
    }
}
