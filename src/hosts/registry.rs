use std::collections::HashMap;

use crate::config::{HostConfig, Settings};

/// Telegram chat identifier
pub type ChatId = i64;

/// A named webhook source with its own template set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub name: String,
    pub enabled: bool,
    /// Message type -> template body
    pub templates: HashMap<String, String>,
}

impl Host {
    pub fn new(name: impl Into<String>, enabled: bool) -> Self {
        Self {
            name: name.into(),
            enabled,
            templates: HashMap::new(),
        }
    }

    /// Builder-style template registration.
    pub fn with_template(mut self, message_type: impl Into<String>, body: impl Into<String>) -> Self {
        self.templates.insert(message_type.into(), body.into());
        self
    }

    pub fn template(&self, message_type: &str) -> Option<&str> {
        self.templates.get(message_type).map(String::as_str)
    }
}

impl From<HostConfig> for Host {
    fn from(config: HostConfig) -> Self {
        Self {
            name: config.name,
            enabled: config.enabled,
            templates: config.templates,
        }
    }
}

/// Read-only store of hosts and destination chats
#[derive(Debug, Clone, Default)]
pub struct HostRegistry {
    hosts: Vec<Host>,
    destinations: Vec<ChatId>,
}

impl HostRegistry {
    pub fn new(hosts: Vec<Host>, destinations: Vec<ChatId>) -> Self {
        Self {
            hosts,
            destinations,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.hosts.iter().cloned().map(Host::from).collect(),
            settings.telegram.chat_ids.clone(),
        )
    }

    /// Find an enabled host by name.
    ///
    /// Disabled and unknown hosts both yield `None`. When several entries
    /// share a name, the first enabled one in configuration order wins.
    pub fn lookup_host(&self, name: &str) -> Option<&Host> {
        self.hosts
            .iter()
            .find(|host| host.enabled && host.name == name)
    }

    /// Names of all enabled hosts, in configuration order
    pub fn enabled_hosts(&self) -> Vec<String> {
        self.hosts
            .iter()
            .filter(|host| host.enabled)
            .map(|host| host.name.clone())
            .collect()
    }

    pub fn destinations(&self) -> &[ChatId] {
        &self.destinations
    }

    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }
}
