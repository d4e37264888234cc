use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, AppMode, DialogKind, Focus};

/// Handle a key event.
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    match app.mode.clone() {
        AppMode::Normal => handle_normal_mode(app, key),
        AppMode::Help => {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc | KeyCode::Char('q')) {
                app.toggle_help();
            }
        }
        AppMode::Dialog(kind) => handle_dialog_mode(app, key, &kind),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Tab | KeyCode::BackTab => app.toggle_focus(),

        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Char('g') | KeyCode::Home => app.select_first(),
        KeyCode::Char('G') | KeyCode::End => app.select_last(),

        KeyCode::Char('v') => app.cycle_view_mode(),
        KeyCode::Char('s') => app.cycle_sort_column(),
        KeyCode::Char('o') => app.flip_sort_direction(),

        KeyCode::Char('n') => app.begin_create(),
        KeyCode::Char('r') => app.begin_rename(),
        KeyCode::Char('d') | KeyCode::Delete => app.begin_delete(),
        KeyCode::F(5) | KeyCode::Char('R') => app.refresh(),

        _ => match app.focus {
            Focus::Tree => handle_tree_key(app, key),
            Focus::Listing => handle_listing_key(app, key),
        },
    }
}

fn handle_tree_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('l') | KeyCode::Right => app.expand_selected(),
        KeyCode::Char('h') | KeyCode::Left => app.collapse_selected(),
        KeyCode::Enter => app.activate_selected_node(),
        KeyCode::Backspace => app.go_to_parent(),
        _ => {}
    }
}

fn handle_listing_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.open_selected_entry(),
        KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => app.go_to_parent(),
        _ => {}
    }
}

fn handle_dialog_mode(app: &mut App, key: KeyEvent, kind: &DialogKind) {
    match kind {
        DialogKind::CreateFolder { .. } | DialogKind::RenameFolder { .. } => match key.code {
            KeyCode::Enter => app.submit_input_dialog(),
            KeyCode::Esc => app.close_dialog(),
            KeyCode::Backspace => app.dialog_delete_char(),
            KeyCode::Left => app.dialog_move_cursor_left(),
            KeyCode::Right => app.dialog_move_cursor_right(),
            KeyCode::Home => app.dialog_cursor_home(),
            KeyCode::End => app.dialog_cursor_end(),
            KeyCode::Char(c) => app.dialog_input_char(c),
            _ => {}
        },
        DialogKind::DeleteConfirm { .. } => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete_dialog(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.close_dialog(),
            _ => {}
        },
        DialogKind::Error { .. } => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                app.close_dialog();
            }
        }
    }
}

/// Handle a mouse event: the wheel moves the focused panel's selection.
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    if app.mode != AppMode::Normal {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollDown => app.select_next(),
        MouseEventKind::ScrollUp => app.select_previous(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Command, ScreenState};
    use crossterm::event::KeyEventState;
    use remote_file_browser::browser::model::ViewMode;
    use remote_file_browser::browser::sort_view::SortViewState;
    use remote_file_browser::service::FolderInfo;
    use remote_file_browser::{Browser, Completion, Request};
    use remote_file_browser::dispatch::ServiceEvent;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn setup_app() -> App {
        let browser = Browser::new(SortViewState::default(), ScreenState::new(ViewMode::List));
        let mut app = App::new(browser, true);
        app.start(None);
        let ticket = app
            .take_commands()
            .into_iter()
            .find_map(|c| match c {
                Command::Load(requests) => requests.into_iter().find_map(|r| match r {
                    Request::LoadRoots(load) => Some(load.ticket),
                    _ => None,
                }),
                _ => None,
            })
            .expect("root load");
        app.handle_service_event(ServiceEvent::Completed(Completion::Roots {
            ticket,
            result: Ok(vec![
                FolderInfo::new("docs", "/docs", true),
                FolderInfo::new("pics", "/pics", false),
            ]),
        }));
        app
    }

    #[test]
    fn q_quits_and_ctrl_c_quits_in_dialog() {
        let mut app = setup_app();
        handle_key_event(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);

        let mut app = setup_app();
        handle_key_event(&mut app, key(KeyCode::Char('n')));
        handle_key_event(
            &mut app,
            KeyEvent {
                modifiers: KeyModifiers::CONTROL,
                ..key(KeyCode::Char('c'))
            },
        );
        assert!(app.should_quit);
    }

    #[test]
    fn tab_switches_focus() {
        let mut app = setup_app();
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Listing);
        handle_key_event(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus, Focus::Tree);
    }

    #[test]
    fn typing_goes_into_dialog_not_bindings() {
        let mut app = setup_app();
        handle_key_event(&mut app, key(KeyCode::Char('n')));
        for c in "quiz".chars() {
            handle_key_event(&mut app, key(KeyCode::Char(c)));
        }
        assert!(!app.should_quit);
        assert_eq!(app.dialog_state.input, "quiz");
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn help_toggles() {
        let mut app = setup_app();
        handle_key_event(&mut app, key(KeyCode::Char('?')));
        assert_eq!(app.mode, AppMode::Help);
        handle_key_event(&mut app, key(KeyCode::Esc));
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn j_k_move_tree_cursor() {
        let mut app = setup_app();
        handle_key_event(&mut app, key(KeyCode::Char('j')));
        assert_eq!(app.tree_cursor, 1);
        handle_key_event(&mut app, key(KeyCode::Char('k')));
        assert_eq!(app.tree_cursor, 0);
    }

    #[test]
    fn v_cycles_view_mode() {
        let mut app = setup_app();
        handle_key_event(&mut app, key(KeyCode::Char('v')));
        assert_eq!(app.browser.sort_view().view_mode(), ViewMode::Compact);
    }

    #[test]
    fn delete_confirm_n_cancels() {
        let mut app = setup_app();
        handle_key_event(&mut app, key(KeyCode::Char('d')));
        assert!(matches!(app.mode, AppMode::Dialog(DialogKind::DeleteConfirm { .. })));
        handle_key_event(&mut app, key(KeyCode::Char('n')));
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[test]
    fn release_events_are_ignored() {
        let mut app = setup_app();
        handle_key_event(
            &mut app,
            KeyEvent {
                kind: KeyEventKind::Release,
                ..key(KeyCode::Char('q'))
            },
        );
        assert!(!app.should_quit);
    }
}
