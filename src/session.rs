//! Wizard session state machine.
//!
//! `Session` is the single mutable aggregate for one wizard run. It is owned
//! exclusively by the event loop: [`update`] consumes one [`Event`] at a
//! time, mutates the session, and returns the [`Command`]s the dispatcher
//! should execute out-of-band. No side effect happens inside `update` except
//! through the injected [`HostOps`] seam, which covers the operations whose
//! outcome steers the transition itself (client lifecycle, loop control).

/// Discrete points in the wizard's fixed flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Welcome,
    AwaitingSourcePath,
    AwaitingUserInput,
    ConfirmGeneration,
    Generating,
    Success,
    Error,
}

/// Policy for file-read failures that arrive after the session has moved on.
///
/// `AlwaysFail` honors the failure regardless of the current stage.
/// `IgnoreWhenMovedOn` drops failures once the session has entered
/// `Generating` or a terminal stage, where the source content can no longer
/// affect the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaleReadPolicy {
    AlwaysFail,
    IgnoreWhenMovedOn,
}

/// Input fields the driver can move focus between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Source,
    Input,
}

/// Semantic key presses produced by the terminal driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Backspace,
    /// Enter.
    Confirm,
    /// Ctrl+D, ends multi-line note entry.
    FinishInput,
    /// Esc.
    Back,
}

/// Result of a completed source-file read.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SourceRead {
    pub content: String,
    pub warning: Option<String>,
}

/// Result of a completed (possibly recovered) generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationSummary {
    pub content: String,
    pub output_path: String,
    pub truncated: bool,
}

/// Progress shown while a generation call is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Progress {
    pub step: String,
    pub message: String,
    pub spinner_frame: usize,
}

/// Externally or asynchronously produced occurrences consumed by [`update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Key(Key),
    WindowResize { columns: u16, rows: u16 },
    FileReadCompleted(Result<SourceRead, String>),
    UserInputFinished { content: String },
    GenerationCompleted(Result<GenerationSummary, String>),
    ProgressUpdated { step: String, message: String },
    /// Spinner animation frame, posted by the dispatcher only while a
    /// generation run is active.
    Tick,
    QuitRequested,
}

/// Side-effecting requests emitted by [`update`] for the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ReadSourceFile {
        path: String,
    },
    SubmitUserInput {
        content: String,
    },
    GenerateResume {
        source: String,
        user_input: String,
        output_path: Option<String>,
    },
    EmitProgress {
        step: String,
        message: String,
    },
    FocusField(Field),
    /// Starts the spinner ticker bound to the active generation run.
    Tick,
}

/// Host operations whose outcome steers the current transition.
///
/// The remote-service handle is owned by the dispatcher's lifecycle manager,
/// not by `Session`; the state machine reaches it only through this seam so
/// tests can substitute a stub without touching global state.
pub trait HostOps {
    /// Lazily initializes the generation client. Idempotent: a second call
    /// without an intervening close returns the same handle.
    fn initialize_client(&mut self) -> Result<(), String>;

    /// Releases the generation client. Safe to call any number of times.
    fn close_client(&mut self);

    fn request_render(&mut self);

    /// Raises the session-wide cancellation signal so in-flight work aborts.
    fn request_stop(&mut self);
}

pub const ERROR_API_KEY_MISSING: &str =
    "authentication error: GEMINI_API_KEY is not set or empty";

pub const PROGRESS_STARTING_STEP: &str = "starting";
pub const PROGRESS_STARTING_MESSAGE: &str = "Contacting the generation service";

/// The single mutable aggregate holding all wizard state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub stage: Stage,
    pub api_key_valid: bool,
    pub source_path_buffer: String,
    pub source_content: String,
    pub source_warning: Option<String>,
    pub user_input_buffer: String,
    pub user_input_content: String,
    pub output_path: String,
    pub result_summary: String,
    pub truncated: bool,
    pub error_message: String,
    pub progress: Progress,
    pub stale_read_policy: StaleReadPolicy,
    pub flag_source_path: Option<String>,
    pub flag_output_path: Option<String>,
    pub should_exit: bool,
    pub columns: u16,
    pub rows: u16,
}

impl Session {
    /// Creates the session for one process run, seeded from the flag
    /// overrides and the startup credential check.
    pub fn new(
        api_key_valid: bool,
        flag_source_path: Option<String>,
        flag_output_path: Option<String>,
    ) -> Self {
        Self {
            stage: Stage::Welcome,
            api_key_valid,
            source_path_buffer: flag_source_path.clone().unwrap_or_default(),
            source_content: String::new(),
            source_warning: None,
            user_input_buffer: String::new(),
            user_input_content: String::new(),
            output_path: String::new(),
            result_summary: String::new(),
            truncated: false,
            error_message: String::new(),
            progress: Progress::default(),
            stale_read_policy: StaleReadPolicy::AlwaysFail,
            flag_source_path,
            flag_output_path,
            should_exit: false,
            columns: 80,
            rows: 24,
        }
    }

    pub fn with_stale_read_policy(mut self, policy: StaleReadPolicy) -> Self {
        self.stale_read_policy = policy;
        self
    }

    fn fail(&mut self, message: String) {
        self.error_message = message;
        self.stage = Stage::Error;
    }
}

/// Processes one event and returns the commands to dispatch.
pub fn update(session: &mut Session, event: Event, host: &mut dyn HostOps) -> Vec<Command> {
    match event {
        Event::Key(key) => handle_key(session, key, host),
        Event::WindowResize { columns, rows } => {
            session.columns = columns;
            session.rows = rows;
            host.request_render();
            Vec::new()
        }
        Event::FileReadCompleted(result) => handle_file_read(session, result, host),
        Event::UserInputFinished { content } => {
            if session.stage == Stage::AwaitingUserInput {
                session.user_input_content = content;
                session.stage = Stage::ConfirmGeneration;
                host.request_render();
            }
            Vec::new()
        }
        Event::ProgressUpdated { step, message } => {
            if session.stage == Stage::Generating {
                session.progress.step = step;
                session.progress.message = message;
                host.request_render();
            }
            Vec::new()
        }
        Event::Tick => {
            if session.stage == Stage::Generating {
                session.progress.spinner_frame = session.progress.spinner_frame.wrapping_add(1);
                host.request_render();
            }
            Vec::new()
        }
        Event::GenerationCompleted(result) => handle_generation_completed(session, result, host),
        Event::QuitRequested => quit(session, host),
    }
}

fn handle_key(session: &mut Session, key: Key, host: &mut dyn HostOps) -> Vec<Command> {
    match session.stage {
        Stage::Welcome => match key {
            Key::Confirm => {
                if !session.api_key_valid {
                    session.fail(ERROR_API_KEY_MISSING.to_string());
                    host.request_render();
                    return Vec::new();
                }

                match host.initialize_client() {
                    Ok(()) => {
                        session.stage = Stage::AwaitingSourcePath;
                        host.request_render();
                        vec![Command::FocusField(Field::Source)]
                    }
                    Err(error) => {
                        session.fail(error);
                        host.request_render();
                        Vec::new()
                    }
                }
            }
            _ => Vec::new(),
        },
        Stage::AwaitingSourcePath => match key {
            Key::Char(c) => {
                session.source_path_buffer.push(c);
                host.request_render();
                Vec::new()
            }
            Key::Backspace => {
                session.source_path_buffer.pop();
                host.request_render();
                Vec::new()
            }
            Key::Confirm => {
                session.stage = Stage::AwaitingUserInput;
                host.request_render();
                vec![
                    Command::ReadSourceFile {
                        path: session.source_path_buffer.clone(),
                    },
                    Command::FocusField(Field::Input),
                ]
            }
            _ => Vec::new(),
        },
        Stage::AwaitingUserInput => match key {
            Key::Char(c) => {
                session.user_input_buffer.push(c);
                host.request_render();
                Vec::new()
            }
            Key::Backspace => {
                session.user_input_buffer.pop();
                host.request_render();
                Vec::new()
            }
            Key::Confirm => {
                // Enter inserts a newline; notes are multi-line.
                session.user_input_buffer.push('\n');
                host.request_render();
                Vec::new()
            }
            Key::FinishInput => {
                vec![Command::SubmitUserInput {
                    content: session.user_input_buffer.clone(),
                }]
            }
            _ => Vec::new(),
        },
        Stage::ConfirmGeneration => match key {
            Key::Confirm => {
                session.stage = Stage::Generating;
                session.progress = Progress {
                    step: PROGRESS_STARTING_STEP.to_string(),
                    message: PROGRESS_STARTING_MESSAGE.to_string(),
                    spinner_frame: 0,
                };
                host.request_render();
                vec![
                    Command::EmitProgress {
                        step: PROGRESS_STARTING_STEP.to_string(),
                        message: PROGRESS_STARTING_MESSAGE.to_string(),
                    },
                    Command::GenerateResume {
                        source: session.source_content.clone(),
                        user_input: session.user_input_content.clone(),
                        output_path: session.flag_output_path.clone(),
                    },
                    Command::Tick,
                ]
            }
            Key::Back => {
                session.stage = Stage::AwaitingUserInput;
                host.request_render();
                vec![Command::FocusField(Field::Input)]
            }
            _ => Vec::new(),
        },
        Stage::Generating => Vec::new(),
        Stage::Success | Stage::Error => match key {
            Key::Confirm => quit(session, host),
            _ => Vec::new(),
        },
    }
}

fn handle_file_read(
    session: &mut Session,
    result: Result<SourceRead, String>,
    host: &mut dyn HostOps,
) -> Vec<Command> {
    match result {
        Ok(read) => {
            // A slow read may resolve after the user already finished their
            // notes; the content still matters until generation has started.
            if matches!(
                session.stage,
                Stage::AwaitingUserInput | Stage::ConfirmGeneration
            ) {
                session.source_content = read.content;
                session.source_warning = read.warning;
                host.request_render();
            }
            Vec::new()
        }
        Err(error) => {
            let stale = !matches!(
                session.stage,
                Stage::AwaitingUserInput | Stage::ConfirmGeneration
            );
            if stale && session.stale_read_policy == StaleReadPolicy::IgnoreWhenMovedOn {
                return Vec::new();
            }

            session.fail(error);
            host.request_render();
            Vec::new()
        }
    }
}

fn handle_generation_completed(
    session: &mut Session,
    result: Result<GenerationSummary, String>,
    host: &mut dyn HostOps,
) -> Vec<Command> {
    if session.stage != Stage::Generating {
        return Vec::new();
    }

    host.close_client();
    match result {
        Ok(summary) => {
            session.output_path = summary.output_path;
            session.result_summary = summary.content.chars().count().to_string();
            session.truncated = summary.truncated;
            session.stage = Stage::Success;
        }
        Err(error) => session.fail(error),
    }

    host.request_render();
    Vec::new()
}

fn quit(session: &mut Session, host: &mut dyn HostOps) -> Vec<Command> {
    host.close_client();
    session.should_exit = true;
    host.request_stop();
    Vec::new()
}
