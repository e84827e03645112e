use crate::{CoreError, TabId, TabInfo, TabKind};

/// Outcome of tab resolution: the chosen target and whether the overlay must
/// be injected before forwarding. A sender-owned tab already runs the
/// overlay, so no injection is needed there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub tab: TabId,
    pub needs_injection: bool,
}

fn is_internal_url(url: &str) -> bool {
    url.contains("about:")
}

fn is_message_context(tab: &TabInfo) -> bool {
    match &tab.kind {
        TabKind::MessageDisplay => true,
        TabKind::Mail => tab
            .url
            .as_deref()
            .is_some_and(|url| !is_internal_url(url)),
        _ => false,
    }
}

/// First tab in enumeration order that displays message content.
pub fn find_message_tab(tabs: &[TabInfo]) -> Option<&TabInfo> {
    tabs.iter().find(|tab| is_message_context(tab))
}

/// Pick the single target surface for a UI command.
///
/// Strict trust hierarchy: the exact context the user is interacting with
/// (sender tab), then the most relevant open view (message display, or a
/// mail tab showing real content), then whatever is frontmost, then give up.
pub fn resolve_target(
    sender_tab: Option<TabId>,
    tabs: &[TabInfo],
    active: Option<&TabInfo>,
) -> Result<Resolution, CoreError> {
    if let Some(tab) = sender_tab {
        return Ok(Resolution {
            tab,
            needs_injection: false,
        });
    }

    if let Some(tab) = find_message_tab(tabs) {
        return Ok(Resolution {
            tab: tab.id,
            needs_injection: true,
        });
    }

    if let Some(tab) = active {
        return Ok(Resolution {
            tab: tab.id,
            needs_injection: true,
        });
    }

    Err(CoreError::NoSuitableTab)
}
