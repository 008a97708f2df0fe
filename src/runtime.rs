//! Command dispatcher and generation-client lifecycle.
//!
//! The event loop hands every [`Command`] to [`RuntimeController::dispatch`].
//! Fast commands are handled inline by posting their completion event;
//! blocking ones (file reads, generation calls) run on named worker threads
//! whose results come back through the same event channel, so the state
//! machine only ever sees events in arrival order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use tracing::{info, warn};

use crate::files;
use crate::model::{CancelSignal, GenerationBackend, GenerationRequest};
use crate::output;
use crate::prompt;
use crate::recovery;
use crate::session::{Command, Event, GenerationSummary, HostOps, SourceRead};

const TICK_INTERVAL: Duration = Duration::from_millis(120);

pub const PROGRESS_BUILDING_REQUEST: &str = "building request";
pub const PROGRESS_AWAITING_RESPONSE: &str = "awaiting response";
pub const PROGRESS_PROCESSING_RESPONSE: &str = "processing response";
pub const PROGRESS_WRITING_OUTPUT: &str = "writing output";

/// Builds (or fails to build) the generation client.
pub type BackendFactory = Box<dyn Fn() -> Result<Arc<dyn GenerationBackend>, String> + Send>;

/// Runs once when an initialized client is closed. Injected so embedders can
/// hook teardown (connection draining, metrics flush) without subclassing.
pub type CloseStrategy = Box<dyn FnMut() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    Uninitialized,
    Initialized,
    Closed,
}

/// Owns the generation-client handle and enforces its lifecycle:
/// lazy initialization, idempotent re-initialization, close-once semantics.
pub struct ClientLifecycle {
    factory: BackendFactory,
    on_close: CloseStrategy,
    handle: Option<Arc<dyn GenerationBackend>>,
    state: HandleState,
}

impl ClientLifecycle {
    pub fn new(factory: BackendFactory) -> Self {
        Self {
            factory,
            on_close: Box::new(|| {}),
            handle: None,
            state: HandleState::Uninitialized,
        }
    }

    pub fn with_close_strategy(mut self, on_close: CloseStrategy) -> Self {
        self.on_close = on_close;
        self
    }

    pub fn state(&self) -> HandleState {
        self.state
    }

    pub fn handle(&self) -> Option<Arc<dyn GenerationBackend>> {
        self.handle.as_ref().map(Arc::clone)
    }

    /// Initializes the client on first call and returns the existing handle
    /// on repeat calls. A factory failure leaves the lifecycle uninitialized
    /// with no partial handle behind.
    pub fn initialize(&mut self) -> Result<Arc<dyn GenerationBackend>, String> {
        match self.state {
            HandleState::Initialized => self
                .handle()
                .ok_or_else(|| "generation client handle is missing".to_string()),
            HandleState::Closed => Err("generation client was already closed".to_string()),
            HandleState::Uninitialized => {
                let handle = (self.factory)()?;
                self.handle = Some(Arc::clone(&handle));
                self.state = HandleState::Initialized;
                info!("generation client initialized");
                Ok(handle)
            }
        }
    }

    /// Releases the handle. Closing a never-initialized or already-closed
    /// client is a no-op, and the close strategy runs at most once.
    pub fn close(&mut self) {
        if self.state != HandleState::Initialized {
            return;
        }
        self.handle = None;
        self.state = HandleState::Closed;
        (self.on_close)();
        info!("generation client closed");
    }
}

/// Executes commands out-of-band and feeds completion events back into the
/// session's channel. Shared between the event loop and worker threads.
pub struct RuntimeController {
    events: Sender<Event>,
    lifecycle: Mutex<ClientLifecycle>,
    cancel: CancelSignal,
    generation_active: Arc<AtomicBool>,
    ticker_running: Arc<AtomicBool>,
    render_requested: AtomicBool,
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl RuntimeController {
    pub fn new(events: Sender<Event>, lifecycle: ClientLifecycle) -> Arc<Self> {
        Arc::new(Self {
            events,
            lifecycle: Mutex::new(lifecycle),
            cancel: Arc::new(AtomicBool::new(false)),
            generation_active: Arc::new(AtomicBool::new(false)),
            ticker_running: Arc::new(AtomicBool::new(false)),
            render_requested: AtomicBool::new(false),
        })
    }

    pub fn cancel_signal(&self) -> CancelSignal {
        Arc::clone(&self.cancel)
    }

    /// Consumes a pending render request, if one was raised since the last
    /// call.
    pub fn take_render_request(&self) -> bool {
        self.render_requested.swap(false, Ordering::Relaxed)
    }

    pub fn dispatch(self: &Arc<Self>, command: Command) {
        match command {
            Command::ReadSourceFile { path } => self.spawn_source_read(path),
            Command::SubmitUserInput { content } => {
                self.post(Event::UserInputFinished { content });
            }
            Command::EmitProgress { step, message } => {
                self.post(Event::ProgressUpdated { step, message });
            }
            Command::GenerateResume {
                source,
                user_input,
                output_path,
            } => self.spawn_generation(source, user_input, output_path),
            Command::Tick => self.start_ticker(),
            // Focus is a presentation concern; the driver consumes it before
            // dispatch and this arm only catches strays.
            Command::FocusField(_) => {}
        }
    }

    fn post(&self, event: Event) {
        // A closed channel means the loop already exited; nothing to do.
        let _ = self.events.send(event);
    }

    fn spawn_source_read(self: &Arc<Self>, path: String) {
        // An empty path means "start from scratch": complete immediately
        // with empty content instead of touching the filesystem.
        if path.trim().is_empty() {
            self.post(Event::FileReadCompleted(Ok(SourceRead::default())));
            return;
        }

        let controller = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("wizard-source-read".to_string())
            .spawn(move || {
                let result = files::read_source(&path)
                    .map_err(|error| error.to_string());
                if let Err(error) = &result {
                    warn!(path = %path, error = %error, "source read failed");
                }
                controller.post(Event::FileReadCompleted(result));
            });

        if let Err(error) = spawned {
            self.post(Event::FileReadCompleted(Err(format!(
                "failed to start source read worker: {error}"
            ))));
        }
    }

    fn spawn_generation(
        self: &Arc<Self>,
        source: String,
        user_input: String,
        output_path: Option<String>,
    ) {
        let backend = lock_unpoisoned(&self.lifecycle).handle();
        let Some(backend) = backend else {
            self.post(Event::GenerationCompleted(Err(
                "generation client is not initialized".to_string(),
            )));
            return;
        };

        let controller = Arc::clone(self);
        let active = Arc::clone(&self.generation_active);
        active.store(true, Ordering::Relaxed);

        let worker_active = Arc::clone(&active);
        let spawned = thread::Builder::new()
            .name("wizard-generation".to_string())
            .spawn(move || {
                let cancel = controller.cancel_signal();
                run_generation(
                    backend.as_ref(),
                    &source,
                    &user_input,
                    output_path.as_deref(),
                    &cancel,
                    &mut |event| controller.post(event),
                );
                worker_active.store(false, Ordering::Relaxed);
            });

        if let Err(error) = spawned {
            active.store(false, Ordering::Relaxed);
            self.post(Event::GenerationCompleted(Err(format!(
                "failed to start generation worker: {error}"
            ))));
        }
    }

    /// Starts the spinner ticker for the active generation run. The thread
    /// stops on its own when the run finishes or the session is cancelled.
    fn start_ticker(self: &Arc<Self>) {
        if !self.generation_active.load(Ordering::Relaxed) {
            return;
        }
        if self.ticker_running.swap(true, Ordering::Relaxed) {
            return;
        }

        let controller = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("wizard-ticker".to_string())
            .spawn(move || {
                loop {
                    thread::sleep(TICK_INTERVAL);
                    if !controller.generation_active.load(Ordering::Relaxed)
                        || controller.cancel.load(Ordering::Relaxed)
                    {
                        break;
                    }
                    if controller.events.send(Event::Tick).is_err() {
                        break;
                    }
                }
                controller.ticker_running.store(false, Ordering::Relaxed);
            });

        if spawned.is_err() {
            // No spinner animation; the run itself is unaffected.
            self.ticker_running.store(false, Ordering::Relaxed);
        }
    }
}

impl HostOps for Arc<RuntimeController> {
    fn initialize_client(&mut self) -> Result<(), String> {
        lock_unpoisoned(&self.lifecycle).initialize().map(|_| ())
    }

    fn close_client(&mut self) {
        lock_unpoisoned(&self.lifecycle).close();
    }

    fn request_render(&mut self) {
        self.render_requested.store(true, Ordering::Relaxed);
    }

    fn request_stop(&mut self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

/// The generation pipeline, from prompt assembly to the written file. Posts
/// the fixed progress checkpoints in order and exactly one
/// `GenerationCompleted` event.
fn run_generation(
    backend: &dyn GenerationBackend,
    source: &str,
    user_input: &str,
    output_path: Option<&str>,
    cancel: &CancelSignal,
    post: &mut dyn FnMut(Event),
) {
    post(progress(
        PROGRESS_BUILDING_REQUEST,
        "Preparing the generation prompt",
    ));
    let prompt = prompt::build_prompt(source, user_input);

    post(progress(
        PROGRESS_AWAITING_RESPONSE,
        "Waiting for the generation service",
    ));
    let outcome = match backend.generate(&GenerationRequest { prompt }, cancel) {
        Ok(outcome) => outcome,
        Err(error) => {
            warn!(error = %error, "generation call failed");
            post(Event::GenerationCompleted(Err(error)));
            return;
        }
    };

    post(progress(
        PROGRESS_PROCESSING_RESPONSE,
        "Processing the generated draft",
    ));
    let recovered = match recovery::apply(outcome) {
        Ok(recovered) => recovered,
        Err(error) => {
            warn!(error = %error, "generation outcome was unusable");
            post(Event::GenerationCompleted(Err(error)));
            return;
        }
    };

    if let Err(error) = output::validate_markdown(&recovered.text) {
        post(Event::GenerationCompleted(Err(format!(
            "generated output failed markdown validation: {error}"
        ))));
        return;
    }
    let text = output::normalize_markdown(&recovered.text);

    post(progress(PROGRESS_WRITING_OUTPUT, "Writing the resume to disk"));
    match output::write_output(output_path, &text) {
        Ok(path) => {
            info!(path = %path, truncated = recovered.truncated, "resume written");
            post(Event::GenerationCompleted(Ok(GenerationSummary {
                content: text,
                output_path: path,
                truncated: recovered.truncated,
            })));
        }
        Err(error) => {
            warn!(error = %error, "output write failed");
            post(Event::GenerationCompleted(Err(error.to_string())));
        }
    }
}

fn progress(step: &str, message: &str) -> Event {
    Event::ProgressUpdated {
        step: step.to_string(),
        message: message.to_string(),
    }
}
