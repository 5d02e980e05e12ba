// ABOUTME: Optional expensive-scenario bracket around a server command.
// ABOUTME: Disabled unless --scenario is given.

use dngcm::diagnostics::Diagnostics;
use dngcm::scenario::{ExpensiveScenario, ScenarioHandle};
use dngcm::transport::Transport;

#[derive(Debug, Clone, Copy)]
pub struct Bracket {
    command: &'static str,
    enabled: bool,
}

impl Bracket {
    pub fn new(command: &'static str, enabled: bool) -> Self {
        Self { command, enabled }
    }

    pub async fn start<T: Transport + ?Sized>(
        &self,
        transport: &T,
        diag: &mut Diagnostics,
    ) -> Option<ScenarioHandle> {
        if !self.enabled {
            return None;
        }
        ExpensiveScenario::for_command(transport, self.command)
            .start_or_warn(diag)
            .await
    }

    pub async fn stop<T: Transport + ?Sized>(
        &self,
        transport: &T,
        handle: Option<ScenarioHandle>,
        diag: &mut Diagnostics,
    ) {
        if let Some(handle) = handle {
            ExpensiveScenario::for_command(transport, self.command)
                .stop_or_warn(&handle, diag)
                .await;
        }
    }
}
