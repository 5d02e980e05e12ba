// ABOUTME: State transition methods for delivery sessions.
// ABOUTME: Each method consumes the session and returns the next state, or itself with the error.

use super::error::DeliveryError;
use super::session::{DeliveryRequest, DeliverySession};
use super::state::{Committing, Created, Delivered, Discardable, Ready, SessionState};
use crate::oslc::Graph;
use crate::oslc::vocab::{delivery_state, media, prop};
use crate::resources::FactoryLookup;
use crate::tracker::{self, VerdictPolicy, WaitOptions};
use crate::transport::{Request, Response, Transport};
use crate::types::{DeliverySessionUri, TrackerUri};

/// Result type for transitions that hand the session back on failure.
pub type TransitionResult<T, S> = Result<DeliverySession<T>, (DeliverySession<S>, DeliveryError)>;

/// What a read of a freshly created session found.
#[derive(Debug)]
pub enum ReadOutcome {
    /// Nothing left to deliver.
    Delivered(DeliverySession<Delivered>),
    /// Initialised or scoped; ready to commit.
    Ready(DeliverySession<Ready>),
    /// The server is still preparing the session (202). Carries the polling URI when given.
    Processing(DeliverySession<Created>, Option<String>),
    /// A state from which the session can neither be committed nor reported delivered.
    Unexpected(DeliverySession<Created>, SessionState),
}

/// What the server did with a commit.
#[derive(Debug)]
pub enum CommitOutcome {
    /// Delivered synchronously (200).
    Delivered(DeliverySession<Delivered>),
    /// Accepted for processing (202); track it to learn the result.
    Tracking(DeliverySession<Committing>),
}

// =============================================================================
// Internal Helpers
// =============================================================================

/// `dng_config:deliverySessionState` from a session document, if present.
fn state_from_body(url: &str, response: &Response) -> Result<Option<SessionState>, DeliveryError> {
    if response.body.is_empty() {
        return Ok(None);
    }
    let graph = Graph::parse(response.content_type(), &response.body).map_err(|e| {
        DeliveryError::Protocol {
            url: url.to_string(),
            message: e.to_string(),
        }
    })?;
    let session = graph
        .subject_or_only(url)
        .or_else(|| graph.resources_of_type(prop::DNG_DELIVERY_SESSION).next());
    Ok(session
        .and_then(|s| s.first_value(prop::DNG_DELIVERY_SESSION_STATE))
        .map(SessionState::from_uri))
}

/// Answer to a session GET.
enum Fetched {
    State(SessionState),
    Processing(Option<String>),
}

impl<S> DeliverySession<S> {
    /// GET the session in the context of its source configuration.
    async fn fetch_state<T: Transport + ?Sized>(
        &self,
        transport: &T,
    ) -> Result<Fetched, DeliveryError> {
        let url = self.uri.as_str();
        let request = Request::get(url)
            .configuration_context(self.request.source.as_str())
            .oslc()
            .accept(media::RDF_XML);
        let response = transport.send(request).await?;
        tracing::debug!(session = url, status = response.status, "read delivery session");

        match response.status {
            200 => match state_from_body(url, &response)? {
                Some(state) => Ok(Fetched::State(state)),
                None => Err(DeliveryError::Protocol {
                    url: url.to_string(),
                    message: "no deliverySessionState in session document".to_string(),
                }),
            },
            202 => Ok(Fetched::Processing(
                response.location().map(str::to_string),
            )),
            404 => Err(DeliveryError::ReadFailed {
                status: 404,
                reason: "session not found in the repository",
            }),
            410 => Err(DeliveryError::ReadFailed {
                status: 410,
                reason: "session has been deleted",
            }),
            400 => Err(DeliveryError::ReadFailed {
                status: 400,
                reason: "session is unavailable",
            }),
            status => Err(DeliveryError::UnexpectedStatus {
                url: url.to_string(),
                status,
            }),
        }
    }
}

// =============================================================================
// (new) -> Created
// =============================================================================

impl DeliverySession<Created> {
    /// Create a session from the `DeliverySession` factory of the request's service provider.
    ///
    /// # Errors
    ///
    /// `CreateRejected` when the server answers 409 (source or target not
    /// found) or 400, `MissingLocation` for a 201 without a session URI.
    pub async fn create<T, L>(
        transport: &T,
        lookup: &L,
        request: DeliveryRequest,
    ) -> Result<Self, DeliveryError>
    where
        T: Transport + ?Sized,
        L: FactoryLookup + ?Sized,
    {
        let factory = lookup
            .creation_factory(&request.service_provider, prop::DNG_DELIVERY_SESSION)
            .await?;

        let http = Request::post(factory.as_str())
            .configuration_context(request.source.as_str())
            .oslc()
            .accept(media::RDF_XML)
            .rdf_xml(request.to_rdf_xml(None, None));
        let response = transport.send(http).await?;

        match response.status {
            201 => {
                let location = response.location().ok_or_else(|| DeliveryError::MissingLocation {
                    url: factory.to_string(),
                    status: 201,
                })?;
                tracing::info!(session = location, title = %request.title, "created delivery session");
                Ok(DeliverySession {
                    uri: DeliverySessionUri::new(location),
                    request,
                    state: Created,
                })
            }
            409 => Err(DeliveryError::CreateRejected {
                status: 409,
                reason: "source or target configuration not found",
            }),
            400 => Err(DeliveryError::CreateRejected {
                status: 400,
                reason: "malformed request",
            }),
            status => Err(DeliveryError::UnexpectedStatus {
                url: factory.to_string(),
                status,
            }),
        }
    }

    /// Read the server-side state.
    #[must_use = "read consumes the session and returns its next form"]
    pub async fn read<T: Transport + ?Sized>(
        self,
        transport: &T,
    ) -> Result<ReadOutcome, (Self, DeliveryError)> {
        match self.fetch_state(transport).await {
            Ok(Fetched::State(SessionState::Delivered)) => {
                Ok(ReadOutcome::Delivered(self.transition(Delivered)))
            }
            Ok(Fetched::State(state)) if state.is_committable() => {
                Ok(ReadOutcome::Ready(self.transition(Ready { state })))
            }
            Ok(Fetched::State(state)) => Ok(ReadOutcome::Unexpected(self, state)),
            Ok(Fetched::Processing(location)) => Ok(ReadOutcome::Processing(self, location)),
            Err(e) => Err((self, e)),
        }
    }
}

// =============================================================================
// Ready -> Delivered | Committing
// =============================================================================

impl DeliverySession<Ready> {
    /// Ask the server to move the session to `delivered`.
    ///
    /// # Errors
    ///
    /// `CommitRejected` for 404, 409 (invalid transition), 410 and 400.
    /// `NotDelivered` when a synchronous answer reports another state.
    #[must_use = "commit consumes the session and returns its next form"]
    pub async fn commit<T: Transport + ?Sized>(
        self,
        transport: &T,
    ) -> Result<CommitOutcome, (Self, DeliveryError)> {
        let url = self.uri.as_str().to_string();
        let http = Request::put(&url)
            .oslc()
            .accept(media::RDF_XML)
            .rdf_xml(
                self.request
                    .to_rdf_xml(Some(&url), Some(delivery_state::DELIVERED)),
            );
        tracing::debug!(session = %url, from = %self.state.state, "committing delivery session");

        let response = match transport.send(http).await {
            Ok(response) => response,
            Err(e) => return Err((self, e.into())),
        };

        let rejected = |status, reason| DeliveryError::CommitRejected { status, reason };
        match response.status {
            200 => {
                let state = match state_from_body(&url, &response) {
                    Ok(Some(state)) => state,
                    Ok(None) => match self.fetch_state(transport).await {
                        Ok(Fetched::State(state)) => state,
                        Ok(Fetched::Processing(_)) => SessionState::Other("processing".to_string()),
                        Err(e) => return Err((self, e)),
                    },
                    Err(e) => return Err((self, e)),
                };
                if state == SessionState::Delivered {
                    Ok(CommitOutcome::Delivered(self.transition(Delivered)))
                } else {
                    Err((self, DeliveryError::NotDelivered(state)))
                }
            }
            202 => match response.location() {
                Some(location) => {
                    let tracker = TrackerUri::new(location);
                    tracing::debug!(session = %url, %tracker, "commit accepted for processing");
                    Ok(CommitOutcome::Tracking(self.transition(Committing { tracker })))
                }
                None => Err((self, DeliveryError::MissingLocation { url, status: 202 })),
            },
            404 => Err((self, rejected(404, "session not found in the repository"))),
            409 => Err((self, rejected(409, "invalid state transition"))),
            410 => Err((self, rejected(410, "session has been deleted"))),
            400 => Err((self, rejected(400, "delivery could not be completed"))),
            status => Err((self, DeliveryError::UnexpectedStatus { url, status })),
        }
    }
}

// =============================================================================
// Committing -> Delivered
// =============================================================================

impl DeliverySession<Committing> {
    /// Follow the commit tracker and apply `policy` to its verdict.
    #[must_use = "track consumes the session and returns its next form"]
    pub async fn track<T: Transport + ?Sized>(
        self,
        transport: &T,
        wait: &WaitOptions,
        policy: VerdictPolicy,
    ) -> TransitionResult<Delivered, Committing> {
        match tracker::track(transport, self.state.tracker.clone(), wait, policy).await {
            Ok(completion) => {
                tracing::debug!(session = %self.uri, verdict = %completion.verdict, "delivery tracked");
                Ok(self.transition(Delivered))
            }
            Err(e) => Err((self, e.into())),
        }
    }
}

// =============================================================================
// Delivered
// =============================================================================

impl DeliverySession<Delivered> {
    /// Finish the session, returning its URI.
    pub fn finish(self) -> DeliverySessionUri {
        self.uri
    }
}

// =============================================================================
// Discard (any undelivered state)
// =============================================================================

impl<S: Discardable> DeliverySession<S> {
    /// DELETE the session. Only `200` counts as deleted.
    pub async fn discard<T: Transport + ?Sized>(self, transport: &T) -> Result<(), DeliveryError> {
        let url = self.uri.as_str();
        let response = transport
            .send(Request::delete(url).oslc().accept(media::RDF_XML))
            .await?;
        let rejected = |status, reason| Err(DeliveryError::DeleteRejected { status, reason });
        match response.status {
            200 => {
                tracing::debug!(session = url, "deleted delivery session");
                Ok(())
            }
            202 | 409 => rejected(response.status, "session is already being delivered"),
            404 => rejected(404, "session not found in the repository"),
            410 => rejected(410, "session was already deleted"),
            400 => rejected(400, "session cannot be deleted"),
            status => Err(DeliveryError::UnexpectedStatus {
                url: url.to_string(),
                status,
            }),
        }
    }
}
