use iced::widget::{container, horizontal_space, row, text, text_editor};
use iced::{Background, Border, Color, Element, Font, Length, Padding, Theme};

use treepad_core::{Command, EditorPhase};

use crate::app::keys::to_key_press;
use crate::app::{App, Message};
use crate::theme::colors;

impl App {
    pub fn view_editor_pane(&self) -> Element<'_, Message> {
        let file_editor = self.editor.file_editor();

        let body: Element<'_, Message> = match file_editor.phase() {
            EditorPhase::Empty => Self::placeholder("No file open".to_string()),
            EditorPhase::Loading => {
                let name = file_editor.file().map(|f| f.name()).unwrap_or_default();
                Self::placeholder(format!("Loading {}...", name))
            }
            EditorPhase::LoadFailed => {
                let message = file_editor
                    .load_error()
                    .map(|e| e.to_string())
                    .unwrap_or_default();
                let mut actions = Vec::new();
                if file_editor.load_error().is_some_and(|e| e.is_permission_lost()) {
                    actions.push(Self::small_button("Grant access", Message::GrantAccess));
                }
                actions.push(Self::small_button("Dismiss", Message::DismissErrors));

                container(Self::error_banner(message, actions))
                    .padding(16)
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .into()
            }
            EditorPhase::Clean | EditorPhase::Dirty => {
                let mut items: Vec<Element<'_, Message>> = vec![self.view_file_header()];
                if let Some(error) = file_editor.save_error() {
                    let mut actions = Vec::new();
                    if error.is_permission_lost() {
                        actions.push(Self::small_button("Grant access", Message::GrantAccess));
                    }
                    actions.push(Self::small_button("x", Message::DismissSaveError));
                    items.push(
                        container(Self::error_banner(format!("Save failed: {}", error), actions))
                            .padding(Padding::from([4, 8]))
                            .into(),
                    );
                }
                items.push(self.view_text_editor());
                iced::widget::Column::with_children(items)
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .into()
            }
        };

        container(body)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_| container::Style {
                background: Some(Background::Color(colors::BG_DARK)),
                ..Default::default()
            })
            .into()
    }

    fn view_file_header(&self) -> Element<'_, Message> {
        let file_editor = self.editor.file_editor();
        let name = file_editor.file().map(|f| f.name()).unwrap_or_default();
        let dirty = file_editor.is_dirty();

        let header = row![
            text(name).size(13).color(colors::TEXT_PRIMARY),
            text(if dirty { " *" } else { "" }).size(13).color(colors::DIRTY),
            horizontal_space(),
            Self::small_button("Save", Message::Save),
            Self::small_button("Close", Message::CloseFile),
        ]
        .spacing(8)
        .align_y(iced::Alignment::Center);

        container(header)
            .width(Length::Fill)
            .height(36)
            .padding(Padding::from([8, 14]))
            .style(|_| container::Style {
                background: Some(Background::Color(colors::BG_MEDIUM)),
                border: Border {
                    color: colors::BORDER,
                    width: 1.0,
                    radius: 0.0.into(),
                },
                ..Default::default()
            })
            .into()
    }

    fn view_text_editor(&self) -> Element<'_, Message> {
        let keymap = self.editor.keymap();
        let selection_color = Color::from_rgba(0.25, 0.46, 0.85, 0.55);

        // Use text_editor's native scroll; wrapping it in scrollable() resets
        // the scroll position on every re-render.
        text_editor(&self.content)
            .height(Length::Fill)
            .padding(iced::Padding {
                top: 16.0,
                right: 20.0,
                bottom: 16.0,
                left: 16.0,
            })
            .font(Font::MONOSPACE)
            .size(self.font_size)
            .style(move |_theme: &Theme, _status| text_editor::Style {
                background: Background::Color(colors::BG_DARK),
                border: Border {
                    width: 0.0,
                    radius: 0.0.into(),
                    color: Color::TRANSPARENT,
                },
                icon: colors::TEXT_MUTED,
                placeholder: colors::TEXT_MUTED,
                value: colors::TEXT_PRIMARY,
                selection: selection_color,
            })
            // Bound chords run their command instead of reaching the buffer,
            // so Ctrl+S saves without inserting an "s".
            .key_binding(move |key_press| {
                let command = to_key_press(&key_press.key, key_press.modifiers)
                    .filter(|press| !press.modifiers.is_empty())
                    .and_then(|press| keymap.lookup(&press));
                match command {
                    Some(Command::Save) => Some(text_editor::Binding::Custom(Message::Save)),
                    Some(command) => Some(text_editor::Binding::Custom(Message::Command(command))),
                    None => text_editor::Binding::from_key_press(key_press),
                }
            })
            .on_action(Message::EditorAction)
            .into()
    }

    fn placeholder<'a>(label: String) -> Element<'a, Message> {
        container(text(label).size(16).color(colors::TEXT_MUTED))
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }
}
