// ABOUTME: Shared helper for opening an authenticated server connection.
// ABOUTME: Layers retry and fault injection over the live HTTP transport.

use dngcm::config::Config;
use dngcm::error::Result;
use dngcm::output::Output;
use dngcm::transport::{FaultInjector, HttpTransport, RetryingTransport};

/// Transport stack used by every server command.
pub type Client = FaultInjector<RetryingTransport<HttpTransport>>;

/// Log in to the configured server.
pub async fn connect(config: &Config, output: &Output) -> Result<Client> {
    let server = &config.server;
    let credentials = server.credentials()?;

    output.progress(&format!("  → Logging in to {} as {}...", server.base_url(), credentials.user));
    let http = HttpTransport::new(server.base_url(), &server.http_settings())?;
    http.login(&credentials.user, &credentials.password).await?;

    Ok(FaultInjector::new(RetryingTransport::new(http, config.retry)))
}
