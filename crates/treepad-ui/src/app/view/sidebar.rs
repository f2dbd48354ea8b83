use iced::widget::{button, column, container, row, scrollable, text, Column, Space};
use iced::{Background, Border, Color, Element, Font, Length, Padding};

use treepad_core::{RowKind, TreeRow};

use crate::app::{App, Message};
use crate::theme::colors;

impl App {
    pub fn view_sidebar(&self) -> Element<'_, Message> {
        let header = container(
            text("EXPLORER")
                .size(11)
                .color(colors::TEXT_SECONDARY)
                .font(Font::with_name("system-ui")),
        )
        .padding(Padding::from([10, 12]))
        .width(Length::Fill)
        .style(|_| container::Style {
            background: Some(Background::Color(colors::BG_MEDIUM)),
            ..Default::default()
        });

        let file_content: Element<'_, Message> = match self.editor.tree() {
            Some(tree) => {
                let items: Vec<Element<'_, Message>> =
                    tree.rows().into_iter().map(|row| self.make_tree_row(row)).collect();
                scrollable(Column::with_children(items).spacing(1).width(Length::Fill))
                    .height(Length::Fill)
                    .into()
            }
            None => self.view_select_project(),
        };

        container(column![header, file_content])
            .width(Length::Fixed(self.sidebar_width))
            .height(Length::Fill)
            .style(|_| container::Style {
                background: Some(Background::Color(colors::BG_LIGHT)),
                border: Border {
                    color: colors::BORDER,
                    width: 1.0,
                    radius: 0.0.into(),
                },
                ..Default::default()
            })
            .into()
    }

    fn view_select_project(&self) -> Element<'_, Message> {
        container(
            column![
                Space::with_height(40),
                text("No folder open").size(13).color(colors::TEXT_MUTED),
                Space::with_height(16),
                button(text("Select project").size(13).color(colors::ACCENT))
                    .padding(Padding::from([8, 16]))
                    .style(|_, status| {
                        let bg = match status {
                            button::Status::Hovered => colors::BG_HOVER,
                            _ => colors::BG_LIGHT,
                        };
                        button::Style {
                            background: Some(Background::Color(bg)),
                            text_color: colors::ACCENT,
                            border: Border {
                                color: colors::ACCENT,
                                width: 1.0,
                                radius: 4.0.into(),
                            },
                            ..Default::default()
                        }
                    })
                    .on_press(Message::OpenFolder),
            ]
            .align_x(iced::Alignment::Center)
            .width(Length::Fill),
        )
        .height(Length::Fill)
        .into()
    }

    fn make_tree_row(&self, tree_row: TreeRow) -> Element<'_, Message> {
        let indent = (tree_row.depth * 16 + 8) as f32;

        match tree_row.kind {
            RowKind::Loading => row![
                Space::with_width(Length::Fixed(indent)),
                text("Loading...").size(12).color(colors::TEXT_MUTED),
            ]
            .padding(Padding::from([4, 0]))
            .into(),

            RowKind::File(handle) => {
                Self::tree_button(indent, "  .", tree_row.name, Message::FileClicked(handle))
            }

            RowKind::Directory {
                expanded,
                loading,
                error,
            } => {
                let icon = match (expanded, loading) {
                    (_, true) => "[~]",
                    (true, false) => "[-]",
                    (false, false) => "[+]",
                };
                let header = Self::tree_button(
                    indent,
                    icon,
                    tree_row.name,
                    Message::ToggleNode(tree_row.path.clone()),
                );

                let Some(error) = error else {
                    return header;
                };

                let mut actions = Vec::new();
                if error.is_permission_lost() {
                    actions.push(Self::small_button("Grant access", Message::GrantAccess));
                } else {
                    actions.push(Self::small_button(
                        "Retry",
                        Message::RetryNode(tree_row.path.clone()),
                    ));
                }
                actions.push(Self::small_button(
                    "x",
                    Message::DismissNodeError(tree_row.path),
                ));

                column![
                    header,
                    row![
                        Space::with_width(Length::Fixed(indent + 16.0)),
                        Self::error_banner(error.to_string(), actions),
                    ]
                    .padding(Padding::from([2, 6])),
                ]
                .into()
            }
        }
    }

    fn tree_button<'a>(
        indent: f32,
        icon: &'static str,
        name: String,
        message: Message,
    ) -> Element<'a, Message> {
        button(
            row![
                Space::with_width(Length::Fixed(indent)),
                text(icon).size(12).font(Font::MONOSPACE).color(colors::TEXT_MUTED),
                Space::with_width(6),
                text(name).size(13).color(colors::TEXT_SECONDARY),
            ]
            .align_y(iced::Alignment::Center),
        )
        .width(Length::Fill)
        .padding(Padding::from([4, 0]))
        .style(|_, status| {
            let hover_bg = match status {
                button::Status::Hovered => colors::BG_HOVER,
                _ => Color::TRANSPARENT,
            };
            button::Style {
                background: Some(Background::Color(hover_bg)),
                text_color: colors::TEXT_PRIMARY,
                border: Border::default(),
                ..Default::default()
            }
        })
        .on_press(message)
        .into()
    }
}
