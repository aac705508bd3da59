//! Scripted transport for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{SendOutcome, TransportGateway};

/// What the scripted gateway should do for a given address.
#[derive(Debug, Clone)]
pub(crate) enum Script {
    Reply(SendOutcome),
    Hang(Duration),
    Panic,
}

/// Gateway that replies per address and records every call.
///
/// Unscripted addresses are delivered.
#[derive(Debug, Default)]
pub(crate) struct ScriptedGateway {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(mut self, address: &str, outcome: SendOutcome) -> Self {
        self.scripts.insert(address.to_string(), Script::Reply(outcome));
        self
    }

    pub(crate) fn hang(mut self, address: &str, duration: Duration) -> Self {
        self.scripts.insert(address.to_string(), Script::Hang(duration));
        self
    }

    pub(crate) fn panic_on(mut self, address: &str) -> Self {
        self.scripts.insert(address.to_string(), Script::Panic);
        self
    }

    /// Every `(to, body)` pair sent so far.
    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn sent_to(&self) -> Vec<String> {
        let mut to: Vec<String> = self.calls().into_iter().map(|(to, _)| to).collect();
        to.sort();
        to
    }
}

#[async_trait]
impl TransportGateway for ScriptedGateway {
    async fn send(&self, to: &str, body: &str) -> SendOutcome {
        self.calls
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));

        match self.scripts.get(to) {
            Some(Script::Reply(outcome)) => outcome.clone(),
            Some(Script::Hang(duration)) => {
                tokio::time::sleep(*duration).await;
                SendOutcome::delivered()
            }
            Some(Script::Panic) => panic!("scripted transport panic for {}", to),
            None => SendOutcome::delivered(),
        }
    }
}
