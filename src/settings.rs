/// Persisted settings for Tab Divert
use serde::{Deserialize, Serialize};

/// Storage key the whole settings blob lives under.
pub const STORAGE_KEY: &str = "tab_divert_settings";

/// User-facing configuration, persisted by the extension storage bridge.
///
/// The engine reads this once per page load; only the popup writes it.
/// Missing fields deserialize to defaults so old stored blobs keep working.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Hostnames the engine must leave alone entirely.
    pub disabled_hosts: Vec<String>,

    /// Focus the newly opened tab instead of keeping the current page active.
    pub focus_new_tab: bool,
}

impl Settings {
    pub fn new() -> Self {
        Settings::default()
    }

    /// Missing entry means enabled: the gate fails open.
    pub fn is_disabled(&self, host: &str) -> bool {
        self.disabled_hosts.iter().any(|h| h == host)
    }

    /// Returns true when the stored state actually changed.
    pub fn set_disabled(&mut self, host: &str, disabled: bool) -> bool {
        if disabled {
            if self.is_disabled(host) {
                return false;
            }
            self.disabled_hosts.push(host.to_string());
            self.disabled_hosts.sort();
            true
        } else {
            let before = self.disabled_hosts.len();
            self.disabled_hosts.retain(|h| h != host);
            self.disabled_hosts.len() < before
        }
    }
}
