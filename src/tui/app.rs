use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crossterm::event::{
    self, DisableFocusChange, EnableFocusChange, Event, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::complete::{EditingSession, TextInput};
use crate::io::vault::{Vault, open_vault, read_note, save_note};
use crate::model::{CompletionConfig, NoteSet};
use crate::parse::parse_note;
use crate::tui::editor::EditorBuffer;
use crate::tui::theme::Theme;
use crate::tui::{input, render};

/// Editor state: one note, its autocomplete session and the vault snapshot
/// the session was built from.
pub struct App {
    /// Vault root; None when the note lives only in memory
    pub root: Option<PathBuf>,
    pub notes: NoteSet,
    /// Vault-relative path of the note being edited
    pub file: String,
    pub editor: EditorBuffer,
    pub session: EditingSession,
    pub config: CompletionConfig,
    pub theme: Theme,
    pub status: Option<String>,
    /// First Ctrl-Q on unsaved text only arms quitting
    pub quit_armed: bool,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        vault: Vault,
        file: &str,
        text: &str,
        config: CompletionConfig,
        theme: Theme,
    ) -> Self {
        let mut app = App::detached(vault.notes, file, text, config, theme);
        app.root = Some(vault.root);
        app
    }

    /// An app with nothing on disk behind it.
    pub fn detached(
        notes: NoteSet,
        file: &str,
        text: &str,
        config: CompletionConfig,
        theme: Theme,
    ) -> Self {
        let session = EditingSession::start(&notes, config.clone(), Some(file));
        App {
            root: None,
            notes,
            file: file.to_string(),
            editor: EditorBuffer::new(text),
            session,
            config,
            theme,
            status: None,
            quit_armed: false,
            should_quit: false,
        }
    }

    /// A fresh session over the current vault snapshot.
    pub fn new_session(&self) -> EditingSession {
        EditingSession::start(&self.notes, self.config.clone(), Some(&self.file))
    }

    /// Write the note, then restart the session so completions include
    /// what was just saved.
    pub fn save(&mut self) {
        let Some(root) = &self.root else {
            self.status = Some("no vault to save into".into());
            return;
        };
        match save_note(root, &self.file, self.editor.text()) {
            Ok(()) => {
                self.editor.mark_saved();
                self.notes.upsert(parse_note(&self.file, self.editor.text()));
                self.session.destroy();
                self.session = self.new_session();
                self.status = Some(format!("saved {}", self.file));
                tracing::info!(file = %self.file, "note saved");
            }
            Err(e) => {
                tracing::error!(file = %self.file, error = %e, "save failed");
                self.status = Some(format!("save failed: {}", e));
            }
        }
    }

    pub fn request_quit(&mut self) {
        if self.editor.is_dirty() && !self.quit_armed {
            self.quit_armed = true;
            self.status = Some("unsaved changes: Ctrl-Q again to quit, Ctrl-S to save".into());
            return;
        }
        self.session.destroy();
        self.should_quit = true;
    }
}

/// Open `file` from the vault at (or above) `vault_dir` in the editor.
pub fn run(vault_dir: Option<&Path>, file: &str) -> Result<(), Box<dyn std::error::Error>> {
    let start = match vault_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    let (vault, vault_config) = open_vault(&start)?;
    let root = vault.root.clone();
    let config = CompletionConfig::resolve(&vault_config);
    let theme = Theme::from_config(&vault_config.ui);

    let text = if root.join(file).exists() {
        read_note(&root, file)?
    } else {
        String::new()
    };
    let mut app = App::new(vault, file, &text, config, theme);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableFocusChange, LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(app, key);
                }
                Event::FocusLost => app.session.blur(),
                Event::FocusGained => app.session.on_text_change(&app.editor),
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}
