//! In-memory [`MailHost`] used by tests and by the development binary until
//! the native host bridge lands.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    CoreError, MailHost, MessageRecord, PostInsertionOverlay, TabId, TabInfo, TabKind,
};

#[derive(Debug, Default)]
struct HostState {
    tabs: Vec<TabInfo>,
    displayed: HashMap<TabId, MessageRecord>,
    compose_bodies: HashMap<TabId, String>,
    injected: Vec<TabId>,
    forwarded: Vec<(TabId, Value)>,
    overlays: Vec<(TabId, PostInsertionOverlay)>,
    forward_response: Option<Value>,
    fail_injection: bool,
}

/// Scriptable host: tabs, displayed messages and compose bodies are seeded
/// up front; calls made by the coordinator are recorded for assertions.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    state: Mutex<HostState>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tab(&self, tab: TabInfo) {
        self.lock().tabs.push(tab);
    }

    pub fn add_compose_tab(&self, id: TabId, body: impl Into<String>) {
        let mut state = self.lock();
        state.tabs.push(TabInfo {
            id,
            kind: TabKind::MessageCompose,
            url: None,
            active: false,
            title: None,
        });
        state.compose_bodies.insert(id, body.into());
    }

    pub fn set_displayed_message(&self, tab: TabId, message: MessageRecord) {
        self.lock().displayed.insert(tab, message);
    }

    /// Response every forwarded tab message gets. Defaults to `{"success":true}`.
    pub fn set_forward_response(&self, response: Value) {
        self.lock().forward_response = Some(response);
    }

    pub fn set_fail_injection(&self, fail: bool) {
        self.lock().fail_injection = fail;
    }

    pub fn compose_body(&self, tab: TabId) -> Option<String> {
        self.lock().compose_bodies.get(&tab).cloned()
    }

    pub fn injected_tabs(&self) -> Vec<TabId> {
        self.lock().injected.clone()
    }

    pub fn forwarded_messages(&self) -> Vec<(TabId, Value)> {
        self.lock().forwarded.clone()
    }

    pub fn shown_overlays(&self) -> Vec<(TabId, PostInsertionOverlay)> {
        self.lock().overlays.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HostState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl MailHost for InMemoryHost {
    async fn list_tabs(&self) -> Result<Vec<TabInfo>, CoreError> {
        Ok(self.lock().tabs.clone())
    }

    async fn active_tab(&self) -> Result<Option<TabInfo>, CoreError> {
        Ok(self.lock().tabs.iter().find(|tab| tab.active).cloned())
    }

    async fn send_to_tab(&self, tab: TabId, message: Value) -> Result<Value, CoreError> {
        let mut state = self.lock();
        state.forwarded.push((tab, message));
        Ok(state
            .forward_response
            .clone()
            .unwrap_or_else(|| serde_json::json!({"success": true})))
    }

    async fn inject_overlay(&self, tab: TabId) -> Result<(), CoreError> {
        let mut state = self.lock();
        if state.fail_injection {
            return Err(CoreError::DependencyUnavailable(
                "content script might already be loaded".to_owned(),
            ));
        }
        state.injected.push(tab);
        Ok(())
    }

    async fn displayed_message(&self, tab: TabId) -> Result<Option<MessageRecord>, CoreError> {
        Ok(self.lock().displayed.get(&tab).cloned())
    }

    async fn set_compose_body(&self, tab: TabId, body: &str) -> Result<(), CoreError> {
        self.lock().compose_bodies.insert(tab, body.to_owned());
        Ok(())
    }

    async fn show_post_insertion_overlay(
        &self,
        tab: TabId,
        overlay: &PostInsertionOverlay,
    ) -> Result<(), CoreError> {
        self.lock().overlays.push((tab, overlay.clone()));
        Ok(())
    }
}
