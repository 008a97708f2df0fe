use resume_wizard::session::HostOps;

/// Scriptable host for driving the state machine in tests.
#[derive(Default)]
pub struct StubHost {
    pub init_error: Option<String>,
    pub init_calls: usize,
    pub close_calls: usize,
    pub render_calls: usize,
    pub stop_calls: usize,
}

impl StubHost {
    pub fn failing_init(error: &str) -> Self {
        Self {
            init_error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

impl HostOps for StubHost {
    fn initialize_client(&mut self) -> Result<(), String> {
        self.init_calls += 1;
        match &self.init_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn close_client(&mut self) {
        self.close_calls += 1;
    }

    fn request_render(&mut self) {
        self.render_calls += 1;
    }

    fn request_stop(&mut self) {
        self.stop_calls += 1;
    }
}
