//! Main editor orchestration.
//!
//! `Editor` is the one object the UI talks to. It owns the session, the
//! directory tree for the current root and the file editor, and keeps them
//! consistent with each other. Methods either change state synchronously or
//! hand back requests for the async tasks in [`crate::tasks`].

use crate::command::Command;
use crate::config::Config;
use crate::event::{EditorEvent, EventBus, EventHandler};
use crate::file_editor::{EditorPhase, FileEditor, LoadOutcome, LoadRequest, SaveOutcome, SaveRequest};
use crate::fs::{DirEntry, DirHandle, FileHandle, FsResult};
use crate::keymap::{KeyPress, Keymap};
use crate::session::Session;
use crate::tree::{DirectoryTree, ListRequest, ListingOutcome, NodePath};
use crate::{CoreError, CoreResult};

/// The main editor state.
///
/// Owned by the UI thread. Filesystem work happens elsewhere and comes back
/// through the `finish_*`/`apply_*` methods.
#[derive(Debug)]
pub struct Editor {
    /// Root and active file
    session: Session,

    /// Tree for the current root
    tree: Option<DirectoryTree>,

    /// Buffer and load/save state for the active file
    file_editor: FileEditor,

    /// Editor configuration
    config: Config,

    /// Key bindings
    keymap: Keymap,

    /// Event bus for notifications
    event_bus: EventBus,
}

/// Work to redo after access to the root was granted again.
#[derive(Debug, Default)]
pub struct Retry {
    pub listings: Vec<ListRequest>,
    pub load: Option<LoadRequest>,
    pub save: Option<SaveRequest>,
}

impl Retry {
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty() && self.load.is_none() && self.save.is_none()
    }
}

impl Editor {
    /// Creates an editor with default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an editor with custom configuration.
    pub fn with_config(config: Config) -> Self {
        let keymap = Keymap::from_config(&config);
        Self {
            session: Session::new(),
            tree: None,
            file_editor: FileEditor::new(),
            config,
            keymap,
            event_bus: EventBus::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn tree(&self) -> Option<&DirectoryTree> {
        self.tree.as_ref()
    }

    pub fn file_editor(&self) -> &FileEditor {
        &self.file_editor
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    // ==================== Root & Tree ====================

    /// Makes `root` the project root and builds a fresh tree for it.
    pub fn select_root(&mut self, root: DirHandle) -> Vec<ListRequest> {
        if self.session.set_root(root.clone()) {
            self.file_editor.close();
            self.emit(EditorEvent::ActiveFileChanged(None));
        }

        let (tree, requests) =
            DirectoryTree::new(root.clone(), self.config.files.collapsed_by_default.clone());
        self.tree = Some(tree);
        self.emit(EditorEvent::RootSelected(root.path().to_path_buf()));
        requests
    }

    /// Expands or collapses a directory node.
    pub fn toggle_node(&mut self, path: &NodePath) -> CoreResult<Vec<ListRequest>> {
        self.tree.as_mut().ok_or(CoreError::NoRoot)?.toggle(path)
    }

    /// Lists an expanded directory node again.
    pub fn refresh_node(&mut self, path: &NodePath) -> CoreResult<Option<ListRequest>> {
        self.tree.as_mut().ok_or(CoreError::NoRoot)?.refresh(path)
    }

    /// Feeds a finished listing to the tree.
    pub fn apply_listing(
        &mut self,
        request: &ListRequest,
        result: FsResult<Vec<DirEntry>>,
    ) -> ListingOutcome {
        let Some(tree) = self.tree.as_mut() else {
            return ListingOutcome::Stale;
        };

        let outcome = tree.apply_listing(request, result);
        match &outcome {
            ListingOutcome::Applied { entries } => self.emit(EditorEvent::DirectoryListed {
                path: request.path.clone(),
                entries: *entries,
            }),
            ListingOutcome::Failed(err) => self.emit(EditorEvent::ListingFailed {
                path: request.path.clone(),
                message: err.to_string(),
            }),
            ListingOutcome::Stale => self.emit(EditorEvent::StaleResultDiscarded),
        }
        outcome
    }

    // ==================== Active File ====================

    /// Makes `file` the active file and starts loading it.
    ///
    /// Returns `None` when `file` is already active; its buffer, edits
    /// included, stays as it is. A file whose load failed is read again.
    pub fn open_file(&mut self, file: FileHandle) -> Option<LoadRequest> {
        if self.session.active_file() == Some(&file)
            && self.file_editor.phase() != EditorPhase::LoadFailed
        {
            tracing::debug!("{} is already open", file.path().display());
            return None;
        }

        self.session.set_active_file(Some(file.clone()));
        self.emit(EditorEvent::ActiveFileChanged(Some(file.path().to_path_buf())));
        Some(self.file_editor.open(file))
    }

    /// Clears the active file.
    pub fn close_file(&mut self) {
        if self.session.active_file().is_none() {
            return;
        }
        self.session.set_active_file(None);
        self.file_editor.close();
        self.emit(EditorEvent::ActiveFileChanged(None));
    }

    /// Feeds a finished read to the file editor.
    pub fn finish_load(&mut self, request: &LoadRequest, result: FsResult<String>) -> LoadOutcome {
        let outcome = self.file_editor.finish_load(request, result);
        match &outcome {
            LoadOutcome::Loaded { .. } => {
                self.emit(EditorEvent::FileLoaded(request.file.path().to_path_buf()))
            }
            LoadOutcome::Stale => self.emit(EditorEvent::StaleResultDiscarded),
            LoadOutcome::Failed(_) => {}
        }
        outcome
    }

    /// Replaces the active file's text.
    pub fn edit(&mut self, text: &str) -> CoreResult<()> {
        self.file_editor.edit(text)
    }

    /// Starts saving the active file.
    pub fn begin_save(&mut self) -> CoreResult<SaveRequest> {
        self.file_editor.begin_save()
    }

    /// Feeds a finished write to the file editor.
    pub fn finish_save(&mut self, request: &SaveRequest, result: FsResult<()>) -> SaveOutcome {
        let outcome = self.file_editor.finish_save(request, result);
        match &outcome {
            SaveOutcome::Saved { .. } => {
                self.emit(EditorEvent::FileSaved(request.file.path().to_path_buf()))
            }
            SaveOutcome::Failed(err) => self.emit(EditorEvent::SaveFailed {
                path: request.file.path().to_path_buf(),
                message: err.to_string(),
            }),
            SaveOutcome::Stale => self.emit(EditorEvent::StaleResultDiscarded),
        }
        outcome
    }

    // ==================== Errors ====================

    /// Hides every visible error.
    ///
    /// A file that failed to load has nothing left to show, so it is closed.
    pub fn dismiss_errors(&mut self) {
        if let Some(tree) = self.tree.as_mut() {
            tree.dismiss_all_errors();
        }
        self.file_editor.dismiss_save_error();
        if self.file_editor.phase() == EditorPhase::LoadFailed {
            self.close_file();
        }
    }

    /// Hides the error shown on one tree node.
    pub fn dismiss_node_error(&mut self, path: &NodePath) {
        if let Some(tree) = self.tree.as_mut() {
            tree.dismiss_error(path);
        }
    }

    /// Hides the last save error.
    pub fn dismiss_save_error(&mut self) {
        self.file_editor.dismiss_save_error();
    }

    /// Returns true if some visible error comes from revoked access.
    pub fn permission_lost(&self) -> bool {
        let tree_lost = self.tree.as_ref().is_some_and(|tree| {
            tree.failed_paths()
                .iter()
                .filter_map(|p| tree.error(p))
                .any(|e| e.is_permission_lost())
        });
        let file_lost = [self.file_editor.load_error(), self.file_editor.save_error()]
            .into_iter()
            .flatten()
            .any(|e| e.is_permission_lost());
        tree_lost || file_lost
    }

    /// Re-issues everything that failed: listings of failed nodes, the
    /// active file's load and its last save.
    pub fn retry_failed(&mut self) -> Retry {
        let mut retry = Retry::default();

        if let Some(tree) = self.tree.as_mut() {
            for path in tree.failed_paths() {
                if let Ok(Some(request)) = tree.refresh(&path) {
                    retry.listings.push(request);
                }
            }
        }

        if self.file_editor.phase() == EditorPhase::LoadFailed {
            if let Some(file) = self.file_editor.file().cloned() {
                retry.load = Some(self.file_editor.open(file));
            }
        } else if self.file_editor.save_error().is_some() {
            retry.save = self.file_editor.begin_save().ok();
        }

        tracing::info!(
            "Retrying {} listing(s), load: {}, save: {}",
            retry.listings.len(),
            retry.load.is_some(),
            retry.save.is_some()
        );
        retry
    }

    // ==================== Keys & Events ====================

    /// Returns the command bound to `key`.
    pub fn resolve_key(&self, key: &KeyPress) -> Option<Command> {
        self.keymap.lookup(key)
    }

    /// Subscribes to editor events.
    pub fn subscribe(&self) -> EventHandler {
        EventHandler::new(self.event_bus.subscribe())
    }

    fn emit(&self, event: EditorEvent) {
        self.event_bus.emit(event);
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::memory::MemoryFileSystem;
    use crate::fs::{FileSystem, FsError, LocalFileSystem};
    use crate::tasks;
    use crate::tree::RowKind;
    use std::sync::Arc;

    /// Runs every listing request to completion, following up on the
    /// requests for newly visible nodes.
    async fn drain(editor: &mut Editor, fs: &Arc<dyn FileSystem>, requests: Vec<ListRequest>) {
        for request in requests {
            let done = tasks::list(fs.clone(), request).await;
            editor.apply_listing(&done.request, done.result);
        }
    }

    fn row_names(editor: &Editor) -> Vec<String> {
        editor
            .tree()
            .map(|t| t.rows().into_iter().map(|r| r.name).collect())
            .unwrap_or_default()
    }

    fn project() -> MemoryFileSystem {
        let fs = MemoryFileSystem::new("/p");
        fs.add_file("/p/readme.md", "hello");
        fs.add_dir("/p/src");
        fs.add_file("/p/src/main.rs", "fn main() {}");
        fs
    }

    #[tokio::test]
    async fn test_root_lists_directories_first() {
        let memfs = project();
        let fs: Arc<dyn FileSystem> = Arc::new(memfs);
        let mut editor = Editor::new();

        let requests = editor.select_root(DirHandle::new("/p"));
        drain(&mut editor, &fs, requests).await;

        assert_eq!(row_names(&editor), vec!["p", "src", "readme.md"]);
    }

    #[tokio::test]
    async fn test_each_expand_lists_again() {
        let memfs = project();
        let fs: Arc<dyn FileSystem> = Arc::new(memfs.clone());
        let mut editor = Editor::new();
        let requests = editor.select_root(DirHandle::new("/p"));
        drain(&mut editor, &fs, requests).await;
        assert_eq!(memfs.list_calls(), 1);

        let src = NodePath::root().join("src");
        for expected in [2, 2, 3] {
            let requests = editor.toggle_node(&src).unwrap();
            drain(&mut editor, &fs, requests).await;
            assert_eq!(memfs.list_calls(), expected);
        }

        // A file added on disk shows up on the next expansion
        memfs.add_file("/p/src/lib.rs", "");
        editor.toggle_node(&src).unwrap();
        let requests = editor.toggle_node(&src).unwrap();
        drain(&mut editor, &fs, requests).await;
        assert_eq!(
            row_names(&editor),
            vec!["p", "src", "main.rs", "lib.rs", "readme.md"]
        );
    }

    #[tokio::test]
    async fn test_edit_save_and_read_back() {
        let memfs = project();
        let fs: Arc<dyn FileSystem> = Arc::new(memfs.clone());
        let mut editor = Editor::new();
        editor.select_root(DirHandle::new("/p"));

        let request = editor.open_file(FileHandle::new("/p/readme.md")).unwrap();
        let done = tasks::load(fs.clone(), request).await;
        editor.finish_load(&done.request, done.result);
        assert_eq!(editor.file_editor().phase(), EditorPhase::Clean);

        editor.edit("hello world").unwrap();
        assert!(editor.file_editor().is_dirty());

        let request = editor.begin_save().unwrap();
        let done = tasks::save(fs.clone(), request).await;
        assert_eq!(
            editor.finish_save(&done.request, done.result),
            SaveOutcome::Saved { dirty: false }
        );
        assert!(!editor.file_editor().is_dirty());
        assert_eq!(memfs.content("/p/readme.md").as_deref(), Some("hello world"));
    }

    #[tokio::test]
    async fn test_clicking_open_file_keeps_edits() {
        let fs: Arc<dyn FileSystem> = Arc::new(project());
        let mut editor = Editor::new();
        editor.select_root(DirHandle::new("/p"));

        let request = editor.open_file(FileHandle::new("/p/readme.md")).unwrap();
        let done = tasks::load(fs.clone(), request).await;
        editor.finish_load(&done.request, done.result);
        editor.edit("hello, unsaved").unwrap();

        assert!(editor.open_file(FileHandle::new("/p/readme.md")).is_none());
        assert_eq!(editor.file_editor().phase(), EditorPhase::Dirty);
        assert_eq!(editor.file_editor().text(), "hello, unsaved");

        // A file that failed to load is read again
        let request = editor.open_file(FileHandle::new("/p/missing.txt")).unwrap();
        let done = tasks::load(fs.clone(), request).await;
        editor.finish_load(&done.request, done.result);
        assert_eq!(editor.file_editor().phase(), EditorPhase::LoadFailed);
        assert!(editor.open_file(FileHandle::new("/p/missing.txt")).is_some());
        assert_eq!(editor.file_editor().phase(), EditorPhase::Loading);
    }

    #[tokio::test]
    async fn test_switching_before_load_completes() {
        let memfs = MemoryFileSystem::new("/p");
        memfs.add_file("/p/a.txt", "A");
        memfs.add_file("/p/b.txt", "B");
        let fs: Arc<dyn FileSystem> = Arc::new(memfs);
        let mut editor = Editor::new();
        editor.select_root(DirHandle::new("/p"));

        let a = editor.open_file(FileHandle::new("/p/a.txt")).unwrap();
        let b = editor.open_file(FileHandle::new("/p/b.txt")).unwrap();
        let done_b = tasks::load(fs.clone(), b).await;
        let done_a = tasks::load(fs.clone(), a).await;

        editor.finish_load(&done_b.request, done_b.result);
        assert_eq!(
            editor.finish_load(&done_a.request, done_a.result),
            LoadOutcome::Stale
        );
        assert_eq!(editor.file_editor().text(), "B");
        assert_eq!(
            editor.session().active_file().map(|f| f.name()),
            Some("b.txt")
        );
    }

    #[tokio::test]
    async fn test_new_root_clears_foreign_file() {
        let memfs = project();
        memfs.add_dir("/q");
        let fs: Arc<dyn FileSystem> = Arc::new(memfs);
        let mut editor = Editor::new();
        editor.select_root(DirHandle::new("/p"));
        let request = editor.open_file(FileHandle::new("/p/readme.md")).unwrap();
        let done = tasks::load(fs, request).await;
        editor.finish_load(&done.request, done.result);

        editor.select_root(DirHandle::new("/q"));
        assert!(editor.session().active_file().is_none());
        assert_eq!(editor.file_editor().phase(), EditorPhase::Empty);
    }

    #[tokio::test]
    async fn test_listing_from_previous_root_is_ignored() {
        let memfs = project();
        memfs.add_dir("/q");
        let fs: Arc<dyn FileSystem> = Arc::new(memfs);
        let mut editor = Editor::new();

        let old = editor.select_root(DirHandle::new("/p"));
        let fresh = editor.select_root(DirHandle::new("/q"));
        drain(&mut editor, &fs, old).await;
        assert_eq!(row_names(&editor), vec!["q", ""]);

        drain(&mut editor, &fs, fresh).await;
        assert_eq!(row_names(&editor), vec!["q"]);
    }

    #[tokio::test]
    async fn test_permission_loss_and_retry() {
        let memfs = project();
        let fs: Arc<dyn FileSystem> = Arc::new(memfs.clone());
        let mut editor = Editor::new();
        let requests = editor.select_root(DirHandle::new("/p"));
        drain(&mut editor, &fs, requests).await;

        memfs.deny("/p");
        let src = NodePath::root().join("src");
        let requests = editor.toggle_node(&src).unwrap();
        drain(&mut editor, &fs, requests).await;
        assert!(editor.permission_lost());
        assert!(matches!(
            editor.tree().unwrap().error(&src),
            Some(FsError::PermissionDenied(_))
        ));

        // Still denied: granting fails and nothing is retried
        assert!(tasks::grant_access(fs.clone(), DirHandle::new("/p")).await.is_err());

        memfs.allow("/p");
        tasks::grant_access(fs.clone(), DirHandle::new("/p")).await.unwrap();
        let retry = editor.retry_failed();
        assert_eq!(retry.listings.len(), 1);
        drain(&mut editor, &fs, retry.listings).await;

        assert!(!editor.permission_lost());
        assert_eq!(row_names(&editor), vec!["p", "src", "main.rs", "readme.md"]);
    }

    #[tokio::test]
    async fn test_failed_save_is_retried() {
        let memfs = project();
        let fs: Arc<dyn FileSystem> = Arc::new(memfs.clone());
        let mut editor = Editor::new();
        editor.select_root(DirHandle::new("/p"));
        let request = editor.open_file(FileHandle::new("/p/readme.md")).unwrap();
        let done = tasks::load(fs.clone(), request).await;
        editor.finish_load(&done.request, done.result);
        editor.edit("changed").unwrap();

        memfs.fail_writes(true);
        let done = tasks::save(fs.clone(), editor.begin_save().unwrap()).await;
        assert!(matches!(
            editor.finish_save(&done.request, done.result),
            SaveOutcome::Failed(_)
        ));
        assert!(editor.file_editor().is_dirty());
        assert_eq!(memfs.content("/p/readme.md").as_deref(), Some("hello"));

        memfs.fail_writes(false);
        let retry = editor.retry_failed();
        let done = tasks::save(fs, retry.save.unwrap()).await;
        editor.finish_save(&done.request, done.result);
        assert!(!editor.file_editor().is_dirty());
        assert_eq!(memfs.content("/p/readme.md").as_deref(), Some("changed"));
    }

    #[tokio::test]
    async fn test_dismiss_closes_failed_load() {
        let fs: Arc<dyn FileSystem> = Arc::new(project());
        let mut editor = Editor::new();
        editor.select_root(DirHandle::new("/p"));
        let request = editor.open_file(FileHandle::new("/p/missing.txt")).unwrap();
        let done = tasks::load(fs, request).await;
        editor.finish_load(&done.request, done.result);
        assert_eq!(editor.file_editor().phase(), EditorPhase::LoadFailed);

        editor.dismiss_errors();
        assert_eq!(editor.file_editor().phase(), EditorPhase::Empty);
        assert!(editor.session().active_file().is_none());
    }

    #[tokio::test]
    async fn test_events_are_emitted() {
        let fs: Arc<dyn FileSystem> = Arc::new(project());
        let mut editor = Editor::new();
        let mut events = editor.subscribe();

        let requests = editor.select_root(DirHandle::new("/p"));
        drain(&mut editor, &fs, requests).await;

        assert_eq!(
            events.try_next(),
            Some(EditorEvent::RootSelected("/p".into()))
        );
        assert_eq!(
            events.try_next(),
            Some(EditorEvent::DirectoryListed {
                path: NodePath::root(),
                entries: 2
            })
        );
        assert_eq!(events.try_next(), None);
    }

    #[tokio::test]
    async fn test_local_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("src")).unwrap();
        std::fs::write(dir.path().join("readme.md"), "hello").unwrap();

        let fs: Arc<dyn FileSystem> = Arc::new(LocalFileSystem::new());
        let mut editor = Editor::new();
        let requests = editor.select_root(DirHandle::new(dir.path()));
        drain(&mut editor, &fs, requests).await;

        let rows = editor.tree().unwrap().rows();
        assert!(matches!(rows[1].kind, RowKind::Directory { .. }));
        let RowKind::File(readme) = rows[2].kind.clone() else {
            panic!("expected a file row");
        };

        let done = tasks::load(fs.clone(), editor.open_file(readme).unwrap()).await;
        editor.finish_load(&done.request, done.result);
        editor.edit("hello world").unwrap();
        let done = tasks::save(fs.clone(), editor.begin_save().unwrap()).await;
        editor.finish_save(&done.request, done.result);

        assert_eq!(
            std::fs::read_to_string(dir.path().join("readme.md")).unwrap(),
            "hello world"
        );
        assert!(!editor.file_editor().is_dirty());
    }
}
