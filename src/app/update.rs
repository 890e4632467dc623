use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::time::{Duration, Instant};

use crate::app::form::{FormField, UserForm};
use crate::app::keymap::{KeyAction, Keymap};
use crate::app::{AppContext, AppState, InputMode, ModalState, Screen, Theme, ToastKind};
use crate::store::{Snapshot, UserId, UserStore};
use crate::ui;

/// What the loop should do after a key press.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
    /// Throw the store away and build a fresh one (full reload).
    Reload,
}

pub fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    ctx: &AppContext,
    theme: Theme,
    keymap: Keymap,
) -> Result<()> {
    let mut store = ctx.new_store();
    let mut updates = store.subscribe();
    let mut app = AppState::new(theme, keymap, store.snapshot());

    loop {
        store.poll_load();
        if updates.has_changed().unwrap_or(false) {
            app.view = updates.borrow_and_update().clone();
            clamp_selection(&mut app);
        }
        app.expire_toast(Instant::now());

        terminal.draw(|f| {
            ui::render(f, &mut app, &store);
        })?;

        if !event::poll(Duration::from_millis(100))? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match handle_key(&mut app, &mut store, key) {
            Flow::Continue => {}
            Flow::Quit => break,
            Flow::Reload => {
                tracing::info!("reloading user store");
                // Dropping the old store aborts any load it still has running.
                store = ctx.new_store();
                updates = store.subscribe();
                app.reset_for_reload(store.snapshot());
            }
        }
    }

    tracing::info!(uptime = ?app.started_at.elapsed(), "exiting");
    Ok(())
}

/// Route one key press to the modal or to the current screen.
pub fn handle_key(app: &mut AppState, store: &mut UserStore, key: KeyEvent) -> Flow {
    match app.input_mode {
        InputMode::Modal => {
            handle_modal_key(app, store, key.code);
            Flow::Continue
        }
        InputMode::Normal => match app.keymap.resolve(&key) {
            Some(action) => handle_action(app, store, action),
            None => Flow::Continue,
        },
    }
}

fn handle_action(app: &mut AppState, store: &mut UserStore, action: KeyAction) -> Flow {
    let view = store.snapshot();
    match action {
        KeyAction::Quit => return Flow::Quit,
        KeyAction::Ignore => {}
        KeyAction::OpenHelp => app.open_modal(ModalState::Help { scroll: 0 }),
        // Disabled until the initial load has replaced the list.
        KeyAction::NewUser => {
            if !view.loading {
                app.open_modal(ModalState::UserForm(UserForm::create()));
            }
        }
        KeyAction::Retry => {
            if view.error.is_some() {
                return Flow::Reload;
            }
        }
        KeyAction::EditSelection => {
            if let Some(user) = focused_user_id(app, &view).and_then(|id| store.get_user_by_id(id)) {
                let form = UserForm::edit(user);
                app.open_modal(ModalState::UserForm(form));
            }
        }
        KeyAction::DeleteSelection => {
            if let Some(id) = focused_user_id(app, &view).filter(|id| store.get_user_by_id(*id).is_some()) {
                app.open_modal(ModalState::DeleteConfirm { id, selected: 0 });
            }
        }
        KeyAction::EnterAction => {
            if app.screen == Screen::List
                && let Some(user) = view.users.get(app.selected_index)
            {
                app.screen = Screen::Detail(user.id);
            }
        }
        KeyAction::Back => {
            if let Screen::Detail(_) = app.screen {
                app.screen = Screen::List;
            }
        }
        KeyAction::MoveUp => {
            if app.screen == Screen::List && app.selected_index > 0 {
                app.selected_index -= 1;
            }
        }
        KeyAction::MoveDown => {
            if app.screen == Screen::List && app.selected_index + 1 < view.users.len() {
                app.selected_index += 1;
            }
        }
        // Navigation stays inside [1, total_pages]; the store itself never clamps.
        KeyAction::PrevPage => {
            if app.screen == Screen::List && view.current_page > 1 {
                store.set_page(view.current_page - 1);
                app.selected_index = 0;
            }
        }
        KeyAction::NextPage => {
            if app.screen == Screen::List && view.current_page < view.total_pages {
                store.set_page(view.current_page + 1);
                app.selected_index = 0;
            }
        }
    }
    Flow::Continue
}

/// The user the detail screen shows, or the highlighted row on the list.
fn focused_user_id(app: &AppState, view: &Snapshot) -> Option<UserId> {
    match app.screen {
        Screen::Detail(id) => Some(id),
        Screen::List => view.users.get(app.selected_index).map(|u| u.id),
    }
}

fn handle_modal_key(app: &mut AppState, store: &mut UserStore, code: KeyCode) {
    match &mut app.modal {
        Some(ModalState::UserForm(form)) => match code {
            KeyCode::Esc => app.close_modal(),
            KeyCode::Tab | KeyCode::Down => form.focus_next(),
            KeyCode::BackTab | KeyCode::Up => form.focus_prev(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => {
                if form.focus == FormField::Submit {
                    submit_form(app, store);
                } else {
                    form.focus_next();
                }
            }
            KeyCode::Char(c) => form.input(c),
            _ => {}
        },
        Some(ModalState::DeleteConfirm { id, selected }) => match code {
            KeyCode::Esc | KeyCode::Char('n') => app.close_modal(),
            KeyCode::Left
            | KeyCode::Right
            | KeyCode::Tab
            | KeyCode::BackTab
            | KeyCode::Char('h')
            | KeyCode::Char('l') => *selected = 1 - *selected,
            KeyCode::Char('y') => {
                let id = *id;
                confirm_delete(app, store, id);
            }
            KeyCode::Enter => {
                if *selected == 1 {
                    let id = *id;
                    confirm_delete(app, store, id);
                } else {
                    app.close_modal();
                }
            }
            _ => {}
        },
        Some(ModalState::Info { .. }) => {
            if matches!(code, KeyCode::Esc | KeyCode::Enter) {
                app.close_modal();
            }
        }
        Some(ModalState::Help { scroll }) => match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q') => {
                app.close_modal()
            }
            KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => *scroll = scroll.saturating_add(1),
            _ => {}
        },
        None => app.input_mode = InputMode::Normal,
    }
}

fn submit_form(app: &mut AppState, store: &mut UserStore) {
    let Some(ModalState::UserForm(form)) = &mut app.modal else {
        return;
    };
    if !form.validate() {
        return;
    }
    let draft = form.draft();
    let avatar = form.avatar_override();
    let target = form.target;
    match target {
        Some(id) => {
            if store.get_user_by_id(id).is_none() {
                app.open_modal(ModalState::Info {
                    message: "User not found.".to_string(),
                });
                app.screen = Screen::List;
                return;
            }
            store.edit_user(id, draft, avatar);
            app.close_modal();
            app.screen = Screen::Detail(id);
            app.show_toast("Changes saved", ToastKind::Success);
        }
        None => {
            let id = store.add_user(draft, avatar);
            tracing::info!(id, "user created");
            app.close_modal();
            app.screen = Screen::List;
            app.show_toast("User created", ToastKind::Success);
        }
    }
    app.view = store.snapshot();
    clamp_selection(app);
}

fn confirm_delete(app: &mut AppState, store: &mut UserStore, id: UserId) {
    store.remove_user(id);
    tracing::info!(id, "user deleted");
    // Pull the page back when the deletion emptied the last one.
    let state = store.state();
    let last_page = state.total_pages().max(1);
    if state.current_page > last_page {
        store.set_page(last_page);
    }
    app.close_modal();
    app.screen = Screen::List;
    app.show_toast("User deleted", ToastKind::Error);
    app.view = store.snapshot();
    clamp_selection(app);
}

/// Keep the highlighted row inside the visible page.
fn clamp_selection(app: &mut AppState) {
    let len = app.view.users.len();
    if app.selected_index >= len {
        app.selected_index = len.saturating_sub(1);
    }
}
