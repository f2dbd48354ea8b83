use iced::widget::text_editor;
use iced::{Task, keyboard};

use treepad_core::tasks::{self, ListingDone, LoadDone, SaveDone};
use treepad_core::{
    Command, DirHandle, EditorEvent, EditorPhase, FsError, ListRequest, LoadOutcome, LoadRequest,
    SaveRequest,
};

use super::keys::to_key_press;
use super::{App, Message};

impl App {
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenFolder => {
                return Task::perform(
                    async {
                        match rfd::AsyncFileDialog::new().pick_folder().await {
                            Some(folder) => Ok(DirHandle::new(folder.path())),
                            None => Err(FsError::Cancelled),
                        }
                    },
                    Message::FolderPicked,
                );
            }

            Message::FolderPicked(Ok(root)) => {
                return Task::perform(
                    tasks::grant_access(self.fs.clone(), root),
                    Message::RootGranted,
                );
            }

            Message::FolderPicked(Err(FsError::Cancelled)) => {
                tracing::debug!("Folder selection cancelled");
            }

            Message::FolderPicked(Err(e)) | Message::RootGranted(Err(e)) => {
                tracing::warn!("Could not open folder: {}", e);
                self.status_message = format!("Could not open folder: {}", e);
            }

            Message::RootGranted(Ok(root)) => {
                let requests = self.editor.select_root(root);
                if self.editor.file_editor().phase() == EditorPhase::Empty {
                    self.content = text_editor::Content::new();
                }
                return self.list_tasks(requests);
            }

            Message::ToggleNode(path) => match self.editor.toggle_node(&path) {
                Ok(requests) => return self.list_tasks(requests),
                Err(e) => tracing::warn!("Toggle failed: {}", e),
            },

            Message::RetryNode(path) => match self.editor.refresh_node(&path) {
                Ok(request) => return self.list_tasks(request.into_iter().collect()),
                Err(e) => tracing::warn!("Retry failed: {}", e),
            },

            Message::DismissNodeError(path) => {
                self.editor.dismiss_node_error(&path);
            }

            Message::FileClicked(file) => {
                let Some(request) = self.editor.open_file(file) else {
                    return Task::none();
                };
                self.content = text_editor::Content::new();
                return self.load_task(request);
            }

            Message::EditorAction(action) => {
                if !matches!(
                    self.editor.file_editor().phase(),
                    EditorPhase::Clean | EditorPhase::Dirty
                ) {
                    return Task::none();
                }

                let is_edit = action.is_edit();
                self.content.perform(action);
                if is_edit {
                    let text = self.widget_text();
                    if let Err(e) = self.editor.edit(&text) {
                        tracing::warn!("Edit rejected: {}", e);
                    }
                }
            }

            Message::Save => match self.editor.begin_save() {
                Ok(request) => {
                    self.status_message = format!("Saving {}...", request.file.name());
                    return self.save_task(request);
                }
                Err(e) => {
                    self.status_message = format!("Not saved: {}", e);
                }
            },

            Message::CloseFile => {
                self.editor.close_file();
                self.content = text_editor::Content::new();
            }

            Message::DismissSaveError => {
                self.editor.dismiss_save_error();
            }

            Message::DismissErrors => {
                self.editor.dismiss_errors();
                if self.editor.file_editor().phase() == EditorPhase::Empty {
                    self.content = text_editor::Content::new();
                }
            }

            Message::GrantAccess => {
                let Some(root) = self.editor.session().root().cloned() else {
                    return self.update(Message::OpenFolder);
                };
                return Task::perform(
                    tasks::grant_access(self.fs.clone(), root),
                    Message::AccessGranted,
                );
            }

            Message::AccessGranted(Ok(_)) => {
                let retry = self.editor.retry_failed();
                if retry.is_empty() {
                    self.status_message = "Access granted".to_string();
                    return Task::none();
                }
                self.status_message = "Access granted, retrying".to_string();

                let mut batch = vec![self.list_tasks(retry.listings)];
                if let Some(request) = retry.load {
                    self.content = text_editor::Content::new();
                    batch.push(self.load_task(request));
                }
                if let Some(request) = retry.save {
                    batch.push(self.save_task(request));
                }
                return Task::batch(batch);
            }

            Message::AccessGranted(Err(e)) => {
                tracing::warn!("Access still denied: {}", e);
                self.status_message = format!("Access still denied: {}", e);
            }

            Message::KeyPressed(key, modifiers) => {
                return self.handle_key_pressed(key, modifiers);
            }

            Message::Command(command) => {
                return self.run_command(command);
            }

            Message::Listed(ListingDone { request, result }) => {
                self.editor.apply_listing(&request, result);
            }

            Message::Loaded(LoadDone { request, result }) => {
                match self.editor.finish_load(&request, result) {
                    LoadOutcome::Loaded { .. } => {
                        self.content =
                            text_editor::Content::with_text(&self.editor.file_editor().text());
                    }
                    LoadOutcome::Failed(e) => {
                        self.status_message = format!("Could not open {}: {}", request.file.name(), e);
                    }
                    LoadOutcome::Stale => {}
                }
            }

            Message::Saved(SaveDone { request, result }) => {
                self.editor.finish_save(&request, result);
            }

            Message::Event(event) => self.show_event(event),
        }

        Task::none()
    }

    /// Mirrors editor notifications in the status bar.
    fn show_event(&mut self, event: EditorEvent) {
        let file_name = |path: &std::path::Path| {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };

        self.status_message = match event {
            EditorEvent::RootSelected(path) => format!("Opened {}", path.display()),
            EditorEvent::ActiveFileChanged(Some(path)) => format!("Opening {}", file_name(&path)),
            EditorEvent::ActiveFileChanged(None) => self.ready_message(),
            EditorEvent::FileLoaded(path) => format!("Editing: {}", file_name(&path)),
            EditorEvent::FileSaved(path) => format!("Saved: {}", file_name(&path)),
            EditorEvent::SaveFailed { message, .. } => format!("Save failed: {}", message),
            EditorEvent::ListingFailed { path, message } => {
                format!("Could not list {}: {}", path, message)
            }
            EditorEvent::DirectoryListed { path, entries } => {
                tracing::trace!("Listed {} ({} entries)", path, entries);
                return;
            }
            EditorEvent::StaleResultDiscarded => return,
        };
    }

    pub fn run_command(&mut self, command: Command) -> Task<Message> {
        tracing::debug!("Running command: {}", command);
        match command {
            Command::Save => self.update(Message::Save),
            Command::OpenFolder => self.update(Message::OpenFolder),
            Command::CloseFile => self.update(Message::CloseFile),
            Command::DismissErrors => self.update(Message::DismissErrors),
        }
    }

    pub fn handle_key_pressed(
        &mut self,
        key: keyboard::Key,
        modifiers: keyboard::Modifiers,
    ) -> Task<Message> {
        let Some(press) = to_key_press(&key, modifiers) else {
            return Task::none();
        };
        match self.editor.resolve_key(&press) {
            Some(command) => self.run_command(command),
            None => Task::none(),
        }
    }

    fn list_tasks(&self, requests: Vec<ListRequest>) -> Task<Message> {
        Task::batch(
            requests
                .into_iter()
                .map(|request| Task::perform(tasks::list(self.fs.clone(), request), Message::Listed)),
        )
    }

    fn load_task(&self, request: LoadRequest) -> Task<Message> {
        Task::perform(tasks::load(self.fs.clone(), request), Message::Loaded)
    }

    fn save_task(&self, request: SaveRequest) -> Task<Message> {
        Task::perform(tasks::save(self.fs.clone(), request), Message::Saved)
    }
}
