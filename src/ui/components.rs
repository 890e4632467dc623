//! Shared UI components (status bar, modal helpers).
//!
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::keymap::KeyAction;
use crate::app::{AppState, InputMode, ToastKind};

/// Render the bottom status bar: a live toast if any, otherwise mode and paging.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    if let Some(toast) = &app.toast {
        let (icon, color) = match toast.kind {
            ToastKind::Success => ("✓", app.theme.success),
            ToastKind::Error => ("✕", app.theme.error),
        };
        let p = Paragraph::new(format!(" {icon} {}", toast.message)).style(
            Style::default()
                .fg(color)
                .bg(app.theme.status_bg)
                .add_modifier(Modifier::BOLD),
        );
        f.render_widget(p, area);
        return;
    }

    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Modal => "MODAL",
    };
    let status = if app.view.error.is_some() {
        "error"
    } else if app.view.loading {
        "loading"
    } else {
        "ready"
    };
    let msg = format!(
        "mode: {mode}  {status}  users:{}  page:{}/{}",
        app.view.total_users, app.view.current_page, app.view.total_pages
    );
    let p = Paragraph::new(msg).style(
        Style::default()
            .fg(app.theme.status_fg)
            .bg(app.theme.status_bg),
    );
    f.render_widget(p, area);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render a generic informational modal dialog.
pub fn render_info_modal(f: &mut Frame, area: Rect, app: &AppState, message: &str) {
    let max_w = area.width.saturating_sub(6).max(30);
    let min_w = 40u16.min(max_w);
    let approx_lines = (message.len() as u16 / (min_w.saturating_sub(4).max(10))).max(1);
    let max_h = area.height.saturating_sub(6).max(5);
    let height = (approx_lines + 4).min(max_h).max(5);
    let rect = centered_rect(min_w, height, area);
    let p = Paragraph::new(message.to_string())
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title("Info")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Render the help modal, listing the keys currently bound to each action.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState, scroll: u16) {
    let width = 72u16.min(area.width.saturating_sub(4)).max(50);
    let height = 22u16.min(area.height.saturating_sub(4)).max(12);
    let rect = centered_rect(width, height, area);

    let entry = |label: &str, action: KeyAction| -> Line<'static> {
        Line::from(vec![
            Span::raw(format!("  {label:<22}")),
            Span::styled(
                app.keymap.keys_for(action).join(", "),
                Style::default().add_modifier(Modifier::ITALIC),
            ),
        ])
    };
    let heading = |text: &'static str| {
        Line::from(Span::styled(text, Style::default().add_modifier(Modifier::BOLD)))
    };

    let lines: Vec<Line> = vec![
        heading("List"),
        entry("Move up", KeyAction::MoveUp),
        entry("Move down", KeyAction::MoveDown),
        entry("Previous page", KeyAction::PrevPage),
        entry("Next page", KeyAction::NextPage),
        entry("Open user", KeyAction::EnterAction),
        Line::raw(""),
        heading("Users"),
        entry("Create user", KeyAction::NewUser),
        entry("Edit user", KeyAction::EditSelection),
        entry("Delete user", KeyAction::DeleteSelection),
        entry("Back to list", KeyAction::Back),
        entry("Retry after error", KeyAction::Retry),
        Line::raw(""),
        heading("General"),
        entry("Help", KeyAction::OpenHelp),
        entry("Quit", KeyAction::Quit),
        Line::raw(""),
        Line::from(vec![
            Span::raw("Changes stay in this session only. "),
            Span::styled("Esc / Enter", Style::default().add_modifier(Modifier::ITALIC)),
            Span::raw(" closes help."),
        ]),
    ];

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_fits_inside_area() {
        let area = Rect { x: 0, y: 0, width: 100, height: 40 };
        let r = centered_rect(40, 10, area);
        assert_eq!((r.x, r.y, r.width, r.height), (30, 15, 40, 10));

        let small = Rect { x: 2, y: 1, width: 20, height: 5 };
        let r = centered_rect(40, 10, small);
        assert_eq!((r.x, r.y, r.width, r.height), (2, 1, 20, 5));
    }
}
