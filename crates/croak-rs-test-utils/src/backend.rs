use async_trait::async_trait;
use croak_rs_protocol::QuipBackend;
use parking_lot::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub url: String,
    pub prompt: String,
}

pub struct FixedBackend {
    response: String,
    metered: bool,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FixedBackend {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            metered: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn metered(mut self) -> Self {
        self.metered = true;
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl QuipBackend for FixedBackend {
    async fn generate(&self, url: &str, prompt: &str) -> String {
        self.calls.lock().push(RecordedCall {
            url: url.to_string(),
            prompt: prompt.to_string(),
        });
        self.response.clone()
    }

    fn metered(&self) -> bool {
        self.metered
    }
}
