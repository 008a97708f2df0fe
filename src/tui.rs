//! Terminal driver: raw-mode input, the event loop, and screen rendering.
//!
//! A dedicated input thread maps terminal events to wizard [`Event`]s and
//! feeds them into the same channel the dispatcher uses, so the loop body is
//! a plain `recv` / `update` / `dispatch` / render cycle.

use std::io::{self, Write};
use std::sync::mpsc::{self, Sender};
use std::thread;

use crossterm::cursor::MoveTo;
use crossterm::event::{self, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType};
use tracing::info;

use crate::classify;
use crate::flags::Flags;
use crate::model;
use crate::output::DEFAULT_OUTPUT_PATH;
use crate::runtime::{ClientLifecycle, RuntimeController};
use crate::session::{update, Command, Event, Field, Key, Session, Stage};

const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

/// Visual styling knobs, injected into the renderer so alternate palettes
/// (or none at all) need no renderer changes.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub use_color: bool,
}

impl Theme {
    pub fn detect() -> Self {
        Self {
            use_color: std::env::var_os("NO_COLOR").is_none(),
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.use_color {
            format!("\x1b[1;36m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.use_color {
            format!("\x1b[2m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn alert(&self, text: &str) -> String {
        if self.use_color {
            format!("\x1b[1;31m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

/// Runs the wizard until the session asks to exit.
pub fn run(flags: Flags) -> io::Result<()> {
    let (sender, receiver) = mpsc::channel();

    let api_key_valid = model::mock_mode_from_env() || model::api_key_from_env().is_some();
    let mut session = Session::new(api_key_valid, flags.source_path(), flags.output_path());

    let lifecycle = ClientLifecycle::new(Box::new(model::backend_from_env));
    let runtime = RuntimeController::new(sender.clone(), lifecycle);
    let mut host = std::sync::Arc::clone(&runtime);

    info!(api_key_valid, "wizard starting");

    enable_raw_mode()?;
    let input_sender = sender;
    let input_thread = thread::Builder::new()
        .name("wizard-input".to_string())
        .spawn(move || input_loop(input_sender));
    if input_thread.is_err() {
        disable_raw_mode()?;
        return Err(io::Error::other("failed to start the input thread"));
    }

    let theme = Theme::detect();
    let mut stdout = io::stdout();
    let mut focus = Field::Source;

    let outcome = (|| -> io::Result<()> {
        render_screen(&mut stdout, &session, &theme, focus)?;
        while !session.should_exit {
            let Ok(event) = receiver.recv() else {
                break;
            };
            let commands = update(&mut session, event, &mut host);
            for command in commands {
                match command {
                    Command::FocusField(field) => focus = field,
                    other => runtime.dispatch(other),
                }
            }
            if session.should_exit {
                break;
            }
            render_screen(&mut stdout, &session, &theme, focus)?;
        }
        Ok(())
    })();

    disable_raw_mode()?;
    outcome?;

    // Leave a scrollback-friendly closing line once the screen is released.
    if session.stage == Stage::Success {
        println!("Resume written to {}", session.output_path);
    }
    info!("wizard exiting");
    Ok(())
}

fn input_loop(events: Sender<Event>) {
    loop {
        let Ok(terminal_event) = event::read() else {
            break;
        };
        let Some(mapped) = map_terminal_event(terminal_event) else {
            continue;
        };
        if events.send(mapped).is_err() {
            break;
        }
    }
}

/// Maps one terminal event to a wizard event. Repeats and releases are
/// dropped so a key press counts once.
pub fn map_terminal_event(terminal_event: event::Event) -> Option<Event> {
    match terminal_event {
        event::Event::Key(key) if key.kind == KeyEventKind::Press => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                return match key.code {
                    KeyCode::Char('c') => Some(Event::QuitRequested),
                    KeyCode::Char('d') => Some(Event::Key(Key::FinishInput)),
                    _ => None,
                };
            }
            match key.code {
                KeyCode::Char(c) => Some(Event::Key(Key::Char(c))),
                KeyCode::Enter => Some(Event::Key(Key::Confirm)),
                KeyCode::Backspace => Some(Event::Key(Key::Backspace)),
                KeyCode::Esc => Some(Event::Key(Key::Back)),
                _ => None,
            }
        }
        event::Event::Resize(columns, rows) => Some(Event::WindowResize { columns, rows }),
        _ => None,
    }
}

fn render_screen(
    out: &mut impl Write,
    session: &Session,
    theme: &Theme,
    focus: Field,
) -> io::Result<()> {
    execute!(out, Clear(ClearType::All), MoveTo(0, 0))?;
    let body = render(session, theme, focus);
    for line in body.lines() {
        write!(out, "{line}\r\n")?;
    }
    out.flush()
}

/// Renders the current stage to a plain string, one screen per stage.
pub fn render(session: &Session, theme: &Theme, focus: Field) -> String {
    let mut screen = String::new();
    let mut line = |text: String| {
        screen.push_str(&text);
        screen.push('\n');
    };

    line(theme.heading("Resume Wizard"));
    line(String::new());

    match session.stage {
        Stage::Welcome => {
            line("This wizard drafts a resume from your career notes and an".to_string());
            line("optional existing document, using the Gemini API.".to_string());
            line(String::new());
            if session.api_key_valid {
                line("API key: found".to_string());
            } else {
                line(theme.alert("API key: missing (set GEMINI_API_KEY)"));
            }
            line(String::new());
            line(theme.dim("Enter to begin, Ctrl+C to quit"));
        }
        Stage::AwaitingSourcePath => {
            line("Path to an existing resume or notes document.".to_string());
            line(theme.dim("Leave empty to start from scratch."));
            line(String::new());
            let marker = if focus == Field::Source { "> " } else { "  " };
            line(format!("{marker}{}_", session.source_path_buffer));
            line(String::new());
            line(theme.dim("Enter to continue, Ctrl+C to quit"));
        }
        Stage::AwaitingUserInput => {
            if let Some(warning) = &session.source_warning {
                line(theme.alert(&format!("Warning: {warning}")));
                line(String::new());
            }
            line("Describe your experience, skills, and anything the resume".to_string());
            line("should highlight. Enter starts a new line.".to_string());
            line(String::new());
            let marker = if focus == Field::Input { "> " } else { "  " };
            for (index, text_line) in session.user_input_buffer.split('\n').enumerate() {
                if index == 0 {
                    line(format!("{marker}{text_line}"));
                } else {
                    line(format!("  {text_line}"));
                }
            }
            line(String::new());
            line(theme.dim("Ctrl+D to finish, Ctrl+C to quit"));
        }
        Stage::ConfirmGeneration => {
            line("Ready to generate.".to_string());
            line(String::new());
            line(format!(
                "  Source document: {} characters",
                session.source_content.chars().count()
            ));
            line(format!(
                "  Career notes:    {} characters",
                session.user_input_content.chars().count()
            ));
            line(format!(
                "  Output file:     {}",
                session
                    .flag_output_path
                    .as_deref()
                    .unwrap_or(DEFAULT_OUTPUT_PATH)
            ));
            line(String::new());
            line(theme.dim("Enter to generate, Esc to edit notes, Ctrl+C to quit"));
        }
        Stage::Generating => {
            let frame = SPINNER_FRAMES[session.progress.spinner_frame % SPINNER_FRAMES.len()];
            line(format!("{frame} {}", session.progress.message));
            line(String::new());
            line(theme.dim(&format!("step: {}", session.progress.step)));
        }
        Stage::Success => {
            line("Your resume is ready.".to_string());
            line(String::new());
            line(format!("  Written to: {}", session.output_path));
            line(format!("  Length:     {} characters", session.result_summary));
            if session.truncated {
                line(String::new());
                line(theme.alert(
                    "The draft hit the output limit and may be incomplete; see the note at the end of the file.",
                ));
            }
            line(String::new());
            line(theme.dim("Enter to exit"));
        }
        Stage::Error => {
            let classification = classify::classify(&session.error_message);
            line(theme.alert(classification.category.label()));
            line(String::new());
            line(format!("  {}", session.error_message));
            line(String::new());
            for hint in classification.hints {
                line(format!("  - {hint}"));
            }
            if let Some(doc_ref) = classification.doc_ref {
                line(String::new());
                line(theme.dim(&format!("  More: {doc_ref}")));
            }
            line(String::new());
            line(theme.dim("Enter to exit"));
        }
    }

    screen
}

#[cfg(test)]
mod tests {
    use super::*;

    use crossterm::event::{KeyEvent, KeyEventState};

    fn press(code: KeyCode, modifiers: KeyModifiers) -> event::Event {
        event::Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn plain_theme() -> Theme {
        Theme { use_color: false }
    }

    #[test]
    fn key_mapping_covers_the_wizard_bindings() {
        assert_eq!(
            map_terminal_event(press(KeyCode::Enter, KeyModifiers::NONE)),
            Some(Event::Key(Key::Confirm))
        );
        assert_eq!(
            map_terminal_event(press(KeyCode::Char('x'), KeyModifiers::NONE)),
            Some(Event::Key(Key::Char('x')))
        );
        assert_eq!(
            map_terminal_event(press(KeyCode::Backspace, KeyModifiers::NONE)),
            Some(Event::Key(Key::Backspace))
        );
        assert_eq!(
            map_terminal_event(press(KeyCode::Esc, KeyModifiers::NONE)),
            Some(Event::Key(Key::Back))
        );
        assert_eq!(
            map_terminal_event(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Event::QuitRequested)
        );
        assert_eq!(
            map_terminal_event(press(KeyCode::Char('d'), KeyModifiers::CONTROL)),
            Some(Event::Key(Key::FinishInput))
        );
    }

    #[test]
    fn key_releases_and_repeats_are_dropped() {
        let release = event::Event::Key(KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });

        assert_eq!(map_terminal_event(release), None);
    }

    #[test]
    fn resize_maps_to_window_resize() {
        assert_eq!(
            map_terminal_event(event::Event::Resize(132, 43)),
            Some(Event::WindowResize {
                columns: 132,
                rows: 43
            })
        );
    }

    #[test]
    fn error_screen_shows_category_hints_and_doc_link() {
        let mut session = Session::new(true, None, None);
        session.stage = Stage::Error;
        session.error_message = "UNAUTHENTICATED: API key not valid.".to_string();

        let screen = render(&session, &plain_theme(), Field::Source);

        assert!(screen.contains("Authentication problem"));
        assert!(screen.contains("UNAUTHENTICATED: API key not valid."));
        assert!(screen.contains("GEMINI_API_KEY"));
        assert!(screen.contains("https://ai.google.dev/gemini-api/docs/api-key"));
    }

    #[test]
    fn success_screen_flags_truncated_output() {
        let mut session = Session::new(true, None, None);
        session.stage = Stage::Success;
        session.output_path = "resume.md".to_string();
        session.result_summary = "42".to_string();
        session.truncated = true;

        let screen = render(&session, &plain_theme(), Field::Source);

        assert!(screen.contains("resume.md"));
        assert!(screen.contains("42 characters"));
        assert!(screen.contains("may be incomplete"));
    }

    #[test]
    fn generating_screen_shows_the_current_step() {
        let mut session = Session::new(true, None, None);
        session.stage = Stage::Generating;
        session.progress.step = "awaiting response".to_string();
        session.progress.message = "Waiting for the generation service".to_string();
        session.progress.spinner_frame = 5;

        let screen = render(&session, &plain_theme(), Field::Source);

        assert!(screen.contains("Waiting for the generation service"));
        assert!(screen.contains("step: awaiting response"));
    }
}
