pub mod editor;
pub mod sidebar;

use iced::widget::{button, column, container, horizontal_space, row, text, Space};
use iced::{Background, Border, Element, Length, Padding, Theme};

use crate::app::{App, Message};
use crate::theme::colors;

impl App {
    pub fn view(&self) -> Element<'_, Message> {
        let content = column![
            row![self.view_sidebar(), self.view_editor_pane()].height(Length::Fill),
            self.view_status_bar(),
        ];

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(|_| container::Style {
                background: Some(Background::Color(colors::BG_DARK)),
                ..Default::default()
            })
            .into()
    }

    pub fn view_status_bar(&self) -> Element<'_, Message> {
        let file_editor = self.editor.file_editor();
        let file_info = match file_editor.file() {
            Some(file) if file_editor.is_saving() => format!("{} [saving]", file.name()),
            Some(file) => file.name().to_string(),
            None => "No file".to_string(),
        };

        let status_content = row![
            text(&self.status_message)
                .size(12)
                .color(colors::TEXT_SECONDARY),
            horizontal_space(),
            text(file_info).size(12).color(colors::TEXT_PRIMARY),
            Space::with_width(24),
            text("UTF-8").size(12).color(colors::TEXT_SECONDARY),
            Space::with_width(12),
        ]
        .padding(Padding::from([6, 12]))
        .align_y(iced::Alignment::Center);

        container(status_content)
            .width(Length::Fill)
            .height(28)
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

    /// Small flat button used in error banners and headers.
    pub fn small_button<'a>(label: &'a str, message: Message) -> Element<'a, Message> {
        button(text(label).size(11))
            .padding(Padding::from([2, 8]))
            .style(|_: &Theme, status: button::Status| {
                let bg = match status {
                    button::Status::Hovered => colors::BG_HOVER,
                    button::Status::Pressed => colors::BG_ACTIVE,
                    _ => colors::BG_MEDIUM,
                };
                button::Style {
                    background: Some(Background::Color(bg)),
                    text_color: colors::TEXT_PRIMARY,
                    border: Border {
                        radius: 3.0.into(),
                        ..Default::default()
                    },
                    ..Default::default()
                }
            })
            .on_press(message)
            .into()
    }

    /// Red banner with a message and its actions.
    pub fn error_banner<'a>(
        message: String,
        actions: Vec<Element<'a, Message>>,
    ) -> Element<'a, Message> {
        let mut items: Vec<Element<'a, Message>> = vec![
            text(message).size(12).color(colors::ERROR).into(),
            horizontal_space().into(),
        ];
        items.extend(actions);

        container(
            iced::widget::Row::with_children(items)
                .spacing(6)
                .align_y(iced::Alignment::Center),
        )
        .width(Length::Fill)
        .padding(Padding::from([6, 10]))
        .style(|_| container::Style {
            background: Some(Background::Color(colors::ERROR_BG)),
            border: Border {
                color: colors::ERROR,
                width: 1.0,
                radius: 3.0.into(),
            },
            ..Default::default()
        })
        .into()
    }
}
