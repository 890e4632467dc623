use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Wrap};

use crate::app::AppState;
use crate::app::form::{FormField, UserForm};
use crate::store::User;

use super::components::centered_rect;

pub fn render_users_table(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .title("Users")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));

    if let Some(err) = &app.view.error {
        let text = vec![
            Line::from(Span::styled(err.clone(), Style::default().fg(app.theme.error))),
            Line::raw(""),
            Line::from(Span::styled("Press r to retry", Style::default().fg(app.theme.muted))),
        ];
        let p = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block);
        f.render_widget(p, area);
        return;
    }
    if app.view.loading {
        let p = Paragraph::new("Loading...")
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.muted))
            .block(block);
        f.render_widget(p, area);
        return;
    }

    let rows = app.view.users.iter().map(|u| {
        Row::new(vec![
            Cell::from(u.id.to_string()),
            Cell::from(u.full_name()),
            Cell::from(u.email.clone()),
        ])
        .style(Style::default().fg(app.theme.text))
    });
    let widths = [Constraint::Length(14), Constraint::Percentage(40), Constraint::Percentage(60)];
    let header = Row::new(vec!["ID", "NAME", "EMAIL"]).style(
        Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD),
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ")
        .column_spacing(1);

    let mut state = TableState::default();
    if !app.view.users.is_empty() {
        state.select(Some(app.selected_index));
    }
    f.render_stateful_widget(table, area, &mut state);
}

/// Compact details of the highlighted row.
pub fn render_user_preview(f: &mut Frame, area: Rect, app: &AppState) {
    let text = match app.view.users.get(app.selected_index) {
        Some(u) => format!(
            "ID: {}\nName: {}\nEmail: {}\nAvatar: {}",
            u.id,
            u.full_name(),
            u.email,
            u.avatar
        ),
        None => String::new(),
    };
    let p = Paragraph::new(text)
        .style(Style::default().fg(app.theme.text))
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title("Details")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(p, area);
}

/// Full detail screen, or a not-found notice once the user is gone.
pub fn render_user_detail(f: &mut Frame, area: Rect, app: &AppState, user: Option<&User>) {
    let block = Block::default()
        .title("User")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));
    let Some(u) = user else {
        let p = Paragraph::new("User not found.")
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.muted))
            .block(block);
        f.render_widget(p, area);
        return;
    };

    let label = Style::default().fg(app.theme.muted);
    let value = Style::default().fg(app.theme.text);
    let field = |name: &'static str, v: String| {
        Line::from(vec![Span::styled(format!("{name:<12}"), label), Span::styled(v, value)])
    };
    let lines = vec![
        Line::from(Span::styled(
            u.full_name(),
            Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(u.email.clone(), label)),
        Line::raw(""),
        field("ID", u.id.to_string()),
        field("First name", u.first_name.clone()),
        field("Last name", u.last_name.clone()),
        field("Email", u.email.clone()),
        field("Avatar", u.avatar.clone()),
        Line::raw(""),
        Line::from(Span::styled(
            "e: edit   d: delete   Esc: back",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ];
    let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(block);
    f.render_widget(p, area);
}

pub fn render_user_form(f: &mut Frame, area: Rect, app: &AppState, form: &UserForm) {
    let rect = centered_rect(64, 15, area);
    let title = if form.is_editing() { "Edit user" } else { "Create user" };

    let mut lines: Vec<Line> = Vec::new();
    for field in [FormField::FirstName, FormField::LastName, FormField::Email, FormField::Avatar] {
        let marker = if form.focus == field { "▶" } else { " " };
        let mut value = form.value(field).to_string();
        if form.focus == field {
            value.push('_');
        }
        let hint = match field {
            FormField::Avatar if form.value(field).is_empty() => {
                if form.is_editing() { "  (blank keeps current)" } else { "  (optional)" }
            }
            _ => "",
        };
        lines.push(Line::from(vec![
            Span::raw(format!("{marker} {:<11} ", field.label())),
            Span::styled(value, Style::default().fg(app.theme.text)),
            Span::styled(hint, Style::default().fg(app.theme.muted)),
        ]));
        if let Some(err) = form.errors.for_field(field) {
            lines.push(Line::from(Span::styled(
                format!("    {err}"),
                Style::default().fg(app.theme.error),
            )));
        } else {
            lines.push(Line::raw(""));
        }
    }
    let submit = if form.is_editing() { "Save changes" } else { "Create user" };
    let submit_style = if form.focus == FormField::Submit {
        Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    lines.push(Line::from(Span::styled(
        format!("{} [ {submit} ]", if form.focus == FormField::Submit { "▶" } else { " " }),
        submit_style,
    )));
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "Tab/↑/↓: move  Enter: next/submit  Esc: cancel",
        Style::default().fg(app.theme.muted),
    )));

    let p = Paragraph::new(lines).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

pub fn render_delete_confirm(f: &mut Frame, area: Rect, app: &AppState, selected: usize) {
    let rect = centered_rect(50, 8, area);
    let options = ["Cancel", "Delete"];
    let mut buttons: Vec<Span> = Vec::new();
    for (idx, label) in options.iter().enumerate() {
        let style = if idx == selected {
            Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        buttons.push(Span::styled(format!(" {label} "), style));
        buttons.push(Span::raw("   "));
    }
    let lines = vec![
        Line::from("This action cannot be undone."),
        Line::from("Delete this user?"),
        Line::raw(""),
        Line::from(buttons),
    ];
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title("Are you sure?")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.error)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
