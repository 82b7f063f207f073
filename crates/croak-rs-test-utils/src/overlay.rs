use async_trait::async_trait;
use croak_rs_protocol::{OverlayError, OverlayPort, TabId};
use parking_lot::Mutex;

#[derive(Debug, Clone)]
pub enum PageTextScript {
    Text(String),
    Fail,
    Hang,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownQuip {
    pub tab_id: TabId,
    pub quip: String,
    pub image_path: String,
}

pub struct StubOverlay {
    page_text: PageTextScript,
    shown: Mutex<Vec<ShownQuip>>,
    page_text_requests: Mutex<Vec<TabId>>,
}

impl StubOverlay {
    pub fn new() -> Self {
        Self::with_page_text(PageTextScript::Text("stub page text".to_string()))
    }

    pub fn with_page_text(page_text: PageTextScript) -> Self {
        Self {
            page_text,
            shown: Mutex::new(Vec::new()),
            page_text_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn shown(&self) -> Vec<ShownQuip> {
        self.shown.lock().clone()
    }

    pub fn page_text_requests(&self) -> Vec<TabId> {
        self.page_text_requests.lock().clone()
    }
}

impl Default for StubOverlay {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OverlayPort for StubOverlay {
    async fn show_quip(
        &self,
        tab_id: TabId,
        quip: &str,
        image_path: &str,
    ) -> Result<(), OverlayError> {
        self.shown.lock().push(ShownQuip {
            tab_id,
            quip: quip.to_string(),
            image_path: image_path.to_string(),
        });
        Ok(())
    }

    async fn page_text(&self, tab_id: TabId) -> Result<String, OverlayError> {
        self.page_text_requests.lock().push(tab_id);
        match &self.page_text {
            PageTextScript::Text(text) => Ok(text.clone()),
            PageTextScript::Fail => Err(OverlayError::Transport("scripted failure".to_string())),
            PageTextScript::Hang => std::future::pending().await,
        }
    }
}
