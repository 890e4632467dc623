pub mod components;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, ModalState, Screen};
use crate::store::UserStore;

pub fn render(f: &mut Frame, app: &mut AppState, store: &UserStore) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)].as_ref())
        .split(f.area());

    let pages = if app.view.total_pages == 0 {
        String::new()
    } else {
        format!("  page {} of {}", app.view.current_page, app.view.total_pages)
    };
    let p = Paragraph::new(format!(
        "Users{pages}  total:{}  — n: new; Enter: open; e: edit; d: delete; ←/→: page; ?: help; q: quit",
        app.view.total_users
    ))
    .block(
        Block::default()
            .title("userdeck")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    )
    .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, root[0]);

    match app.screen {
        Screen::List => {
            let body = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)].as_ref())
                .split(root[1]);
            users::render_users_table(f, body[0], app);
            users::render_user_preview(f, body[1], app);
        }
        Screen::Detail(id) => {
            users::render_user_detail(f, root[1], app, store.get_user_by_id(id));
        }
    }

    components::render_status_bar(f, root[2], app);

    if app.modal.is_some() {
        render_modal(f, f.area(), app);
    }
}

fn render_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(state) = &app.modal else {
        return;
    };
    match state {
        ModalState::UserForm(form) => users::render_user_form(f, area, app, form),
        ModalState::DeleteConfirm { selected, .. } => {
            users::render_delete_confirm(f, area, app, *selected)
        }
        ModalState::Info { message } => components::render_info_modal(f, area, app, message),
        ModalState::Help { scroll } => components::render_help_modal(f, area, app, *scroll),
    }
}
