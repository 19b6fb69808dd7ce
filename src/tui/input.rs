use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::complete::KeyOutcome;
use crate::tui::app::App;

/// Handle a key press. The autocomplete session sees it first; keys it
/// forwards fall through to the editor.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('q') => {
                app.request_quit();
                return;
            }
            KeyCode::Char('s') => {
                app.save();
                return;
            }
            _ => {}
        }
    }
    app.quit_armed = false;

    match app.session.handle_key(&mut app.editor, key) {
        KeyOutcome::Consumed | KeyOutcome::Composing => return,
        KeyOutcome::Forward | KeyOutcome::Detached => {}
    }

    if edit_key(app, key) {
        app.status = None;
        app.session.on_text_change(&app.editor);
    }
}

/// Default editing. Returns whether text or caret changed.
fn edit_key(app: &mut App, key: KeyEvent) -> bool {
    let buf = &mut app.editor;
    let word = key.modifiers.intersects(KeyModifiers::ALT | KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            buf.delete_word_back()
        }
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            let mut tmp = [0u8; 4];
            buf.insert_str(c.encode_utf8(&mut tmp));
        }
        KeyCode::Enter => buf.insert_str("\n"),
        KeyCode::Tab => buf.insert_str("\t"),
        KeyCode::Backspace if word => buf.delete_word_back(),
        KeyCode::Backspace => buf.backspace(),
        KeyCode::Delete => buf.delete_forward(),
        KeyCode::Left if word => buf.move_word_left(),
        KeyCode::Right if word => buf.move_word_right(),
        KeyCode::Left => buf.move_left(),
        KeyCode::Right => buf.move_right(),
        KeyCode::Up => buf.move_up(),
        KeyCode::Down => buf.move_down(),
        KeyCode::Home => buf.move_home(),
        KeyCode::End => buf.move_end(),
        _ => return false,
    }
    true
}
