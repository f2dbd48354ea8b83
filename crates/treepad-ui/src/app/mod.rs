use iced::futures::stream;
use iced::widget::text_editor;
use iced::{Subscription, Task, keyboard};
use std::sync::Arc;

use treepad_core::{Command, DirHandle, Editor, FileSystem, LocalFileSystem, tasks};

pub mod keys;
pub mod messages;
pub mod types;
pub mod update;
pub mod view;

pub use messages::*;
pub use types::*;

pub struct App {
    /// Session, tree and file editor state
    pub editor: Editor,
    /// Where every read, write and listing goes
    pub fs: Arc<dyn FileSystem>,
    /// Widget-side copy of the active file's text
    pub content: text_editor::Content,
    pub status_message: String,
    pub font_size: f32,
    pub sidebar_width: f32,
}

impl App {
    pub fn new(flags: Flags) -> (Self, Task<Message>) {
        let fs: Arc<dyn FileSystem> = Arc::new(LocalFileSystem::new());
        Self::with_fs(flags, fs)
    }

    pub fn with_fs(flags: Flags, fs: Arc<dyn FileSystem>) -> (Self, Task<Message>) {
        let font_size = flags.config.ui.font_size;
        let sidebar_width = flags.config.ui.sidebar_width;

        let mut app = Self {
            editor: Editor::with_config(flags.config),
            fs,
            content: text_editor::Content::new(),
            status_message: String::new(),
            font_size,
            sidebar_width,
        };
        app.status_message = app.ready_message();

        let task = match flags.root {
            Some(root) => Task::perform(
                tasks::grant_access(app.fs.clone(), DirHandle::new(root)),
                Message::RootGranted,
            ),
            None => Task::none(),
        };

        (app, task)
    }

    pub fn title(&self) -> String {
        match self.editor.file_editor().file() {
            Some(file) => {
                let modified = if self.editor.file_editor().is_dirty() { " *" } else { "" };
                format!("{}{} - Treepad", file.name(), modified)
            }
            None => match self.editor.session().root() {
                Some(root) => format!("{} - Treepad", root.name()),
                None => "Treepad".to_string(),
            },
        }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let keys =
            keyboard::on_key_press(|key, modifiers| Some(Message::KeyPressed(key, modifiers)));

        // Only the first stream is kept; later ones with the same id are dropped.
        let events = Subscription::run_with_id(
            "editor-events",
            stream::unfold(self.editor.subscribe(), |mut handler| async move {
                handler
                    .next()
                    .await
                    .map(|event| (Message::Event(event), handler))
            }),
        );

        Subscription::batch([keys, events])
    }

    /// Status line shown when nothing else is going on.
    pub fn ready_message(&self) -> String {
        let hint = self
            .editor
            .keymap()
            .hint(&[Command::OpenFolder, Command::Save]);
        if hint.is_empty() {
            "Ready".to_string()
        } else {
            format!("Ready | {}", hint)
        }
    }

    /// Text currently in the editor widget, exactly as the lines read.
    pub fn widget_text(&self) -> String {
        self.content
            .lines()
            .map(|line| line.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn run(flags: Flags) -> iced::Result {
    iced::application(App::title, App::update, App::view)
        .subscription(App::subscription)
        .window_size(iced::Size::new(1280.0, 800.0))
        .theme(|_| crate::theme::iced_theme())
        .antialiasing(true)
        .run_with(move || App::new(flags))
}
