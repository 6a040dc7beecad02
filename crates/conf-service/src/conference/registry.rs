//! `RegistryActor` - singleton supervisor for conference actors.
//!
//! The `RegistryActor` is the top-level actor in the hierarchy:
//!
//! - Singleton per process
//! - Supervises N `ConferenceActor` instances
//! - Handles conference creation/lookup/removal
//! - Owns the root `CancellationToken` for graceful shutdown
//! - Monitors child actor health (panic detection via `JoinHandle`)
//!
//! # Graceful Shutdown
//!
//! On shutdown, the registry stops accepting new conferences, cancels the
//! root token (propagates to all children), and waits for each conference
//! task to finish.

use crate::config::Config;
use crate::errors::ConfError;
use crate::metrics::ServiceMetrics;
use crate::stasis::{ControlPlane, EventRouter};

use super::conference::{ConferenceActor, ConferenceHandle};
use super::messages::{RegistryMessage, RegistryStatus};

use common::types::ConferenceId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Default channel buffer size for the registry mailbox.
const REGISTRY_CHANNEL_BUFFER: usize = 1000;

/// Handle to the `RegistryActor`.
///
/// This is the public interface for interacting with the registry.
/// All methods are async and return results via oneshot channels.
#[derive(Clone)]
pub struct RegistryHandle {
    sender: mpsc::Sender<RegistryMessage>,
    cancel_token: CancellationToken,
}

impl RegistryHandle {
    /// Create a new `RegistryActor` and return a handle to it.
    ///
    /// This spawns the actor task and returns immediately.
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        control: Arc<dyn ControlPlane>,
        router: Arc<EventRouter>,
        metrics: Arc<ServiceMetrics>,
    ) -> Self {
        let (sender, receiver) = mpsc::channel(REGISTRY_CHANNEL_BUFFER);
        let cancel_token = CancellationToken::new();

        let actor = RegistryActor::new(
            receiver,
            cancel_token.clone(),
            config,
            control,
            router,
            metrics,
        );

        tokio::spawn(actor.run());

        Self {
            sender,
            cancel_token,
        }
    }

    /// Create a new conference with the given display name.
    ///
    /// The conference starts in `Creating`; call
    /// [`ConferenceHandle::start`] to create its bridge and open admission.
    pub async fn create_conference(&self, name: String) -> Result<ConferenceHandle, ConfError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(RegistryMessage::CreateConference {
                name,
                respond_to: tx,
            })
            .await
            .map_err(|e| ConfError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| ConfError::Internal(format!("response receive failed: {e}")))?
    }

    /// Get a handle to an existing conference.
    pub async fn get_conference(&self, id: ConferenceId) -> Result<ConferenceHandle, ConfError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(RegistryMessage::GetConference { id, respond_to: tx })
            .await
            .map_err(|e| ConfError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| ConfError::Internal(format!("response receive failed: {e}")))?
    }

    /// Find a conference by display name.
    pub async fn find_by_name(&self, name: String) -> Result<Option<ConferenceHandle>, ConfError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(RegistryMessage::FindByName {
                name,
                respond_to: tx,
            })
            .await
            .map_err(|e| ConfError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| ConfError::Internal(format!("response receive failed: {e}")))
    }

    /// Drop a conference from the registry.
    pub async fn remove_conference(&self, id: ConferenceId) -> Result<(), ConfError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(RegistryMessage::RemoveConference { id, respond_to: tx })
            .await
            .map_err(|e| ConfError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| ConfError::Internal(format!("response receive failed: {e}")))?
    }

    /// Get the current registry status.
    pub async fn status(&self) -> Result<RegistryStatus, ConfError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(RegistryMessage::GetStatus { respond_to: tx })
            .await
            .map_err(|e| ConfError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| ConfError::Internal(format!("response receive failed: {e}")))
    }

    /// Initiate graceful shutdown.
    pub async fn shutdown(&self) -> Result<(), ConfError> {
        let (tx, rx) = tokio::sync::oneshot::channel();
        self.sender
            .send(RegistryMessage::Shutdown { respond_to: tx })
            .await
            .map_err(|e| ConfError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| ConfError::Internal(format!("response receive failed: {e}")))?
    }

    /// Cancel the actor (for immediate shutdown).
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Check if the actor is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Get a child token for spawning dependent tasks.
    #[must_use]
    pub fn child_token(&self) -> CancellationToken {
        self.cancel_token.child_token()
    }
}

/// Internal state for a managed conference.
struct ManagedConference {
    /// Handle to the conference actor.
    handle: ConferenceHandle,
    /// Join handle for monitoring the actor task.
    task_handle: JoinHandle<()>,
}

/// The `RegistryActor` implementation.
///
/// This struct owns the actor state and runs the message loop.
pub struct RegistryActor {
    /// Message receiver.
    receiver: mpsc::Receiver<RegistryMessage>,
    /// Cancellation token (root).
    cancel_token: CancellationToken,
    /// Service configuration shared with conference actors.
    config: Arc<Config>,
    /// Control-plane command facade.
    control: Arc<dyn ControlPlane>,
    /// Event router shared with conference actors.
    router: Arc<EventRouter>,
    /// Shared metrics.
    metrics: Arc<ServiceMetrics>,
    /// Managed conferences by ID.
    conferences: HashMap<ConferenceId, ManagedConference>,
    /// Whether the registry is accepting new conferences.
    accepting_new: bool,
}

impl RegistryActor {
    /// Create a new registry actor (not started).
    fn new(
        receiver: mpsc::Receiver<RegistryMessage>,
        cancel_token: CancellationToken,
        config: Arc<Config>,
        control: Arc<dyn ControlPlane>,
        router: Arc<EventRouter>,
        metrics: Arc<ServiceMetrics>,
    ) -> Self {
        Self {
            receiver,
            cancel_token,
            config,
            control,
            router,
            metrics,
            conferences: HashMap::new(),
            accepting_new: true,
        }
    }

    /// Run the actor message loop.
    #[instrument(skip_all, name = "conf.actor.registry")]
    async fn run(mut self) {
        info!(target: "conf.actor.registry", "RegistryActor started");

        loop {
            // Check for terminated conference actors
            self.check_conference_health().await;

            tokio::select! {
                // Handle cancellation
                () = self.cancel_token.cancelled() => {
                    info!(
                        target: "conf.actor.registry",
                        "RegistryActor received cancellation signal"
                    );
                    self.graceful_shutdown().await;
                    break;
                }

                // Handle messages
                msg = self.receiver.recv() => {
                    match msg {
                        Some(message) => {
                            self.handle_message(message).await;
                        }
                        None => {
                            info!(
                                target: "conf.actor.registry",
                                "RegistryActor channel closed, exiting"
                            );
                            break;
                        }
                    }
                }
            }
        }

        info!(
            target: "conf.actor.registry",
            conferences_remaining = self.conferences.len(),
            "RegistryActor stopped"
        );
    }

    /// Handle a single message.
    async fn handle_message(&mut self, message: RegistryMessage) {
        match message {
            RegistryMessage::CreateConference { name, respond_to } => {
                let result = self.create_conference(name);
                let _ = respond_to.send(result);
            }

            RegistryMessage::GetConference { id, respond_to } => {
                let result = self.get_conference(id);
                let _ = respond_to.send(result);
            }

            RegistryMessage::FindByName { name, respond_to } => {
                let result = self.find_by_name(&name);
                let _ = respond_to.send(result);
            }

            RegistryMessage::RemoveConference { id, respond_to } => {
                let result = self.remove_conference(id);
                let _ = respond_to.send(result);
            }

            RegistryMessage::GetStatus { respond_to } => {
                let _ = respond_to.send(self.get_status());
            }

            RegistryMessage::Shutdown { respond_to } => {
                let result = self.initiate_shutdown();
                let _ = respond_to.send(result);
            }
        }
    }

    /// Create a new conference actor.
    fn create_conference(&mut self, name: String) -> Result<ConferenceHandle, ConfError> {
        // Check if we're accepting new conferences
        if !self.accepting_new {
            return Err(ConfError::Draining);
        }

        // Display names double as lookup keys for call routing, so keep
        // them unique.
        if self
            .conferences
            .values()
            .any(|managed| managed.handle.name() == name)
        {
            return Err(ConfError::Conflict(
                "Conference name already in use".to_string(),
            ));
        }

        let id = ConferenceId::new();

        debug!(
            target: "conf.actor.registry",
            conference = %name,
            id = %id,
            "Creating new conference actor"
        );

        // Create child token for the conference
        let conference_token = self.cancel_token.child_token();

        let (handle, task_handle) = ConferenceActor::spawn(
            id,
            name,
            Arc::clone(&self.config),
            Arc::clone(&self.control),
            Arc::clone(&self.router),
            Arc::clone(&self.metrics),
            conference_token,
        );

        // Open the bridge-scoped event route before anything can happen to
        // the conference.
        self.router.register_bridge(handle.clone());

        self.conferences.insert(
            id,
            ManagedConference {
                handle: handle.clone(),
                task_handle,
            },
        );

        info!(
            target: "conf.actor.registry",
            conference = %handle.name(),
            id = %id,
            total_conferences = self.conferences.len(),
            "Conference actor created"
        );

        Ok(handle)
    }

    /// Get a handle to a conference.
    fn get_conference(&self, id: ConferenceId) -> Result<ConferenceHandle, ConfError> {
        self.conferences
            .get(&id)
            .map(|managed| managed.handle.clone())
            .ok_or_else(|| ConfError::ConferenceNotFound(id.to_string()))
    }

    /// Find a conference by display name.
    fn find_by_name(&self, name: &str) -> Option<ConferenceHandle> {
        self.conferences
            .values()
            .find(|managed| managed.handle.name() == name)
            .map(|managed| managed.handle.clone())
    }

    /// Drop a conference from the registry.
    ///
    /// This cancels the conference actor; cleanup is monitored by the
    /// health check rather than awaited here, so the message loop never
    /// blocks.
    fn remove_conference(&mut self, id: ConferenceId) -> Result<(), ConfError> {
        match self.conferences.remove(&id) {
            Some(managed) => {
                debug!(
                    target: "conf.actor.registry",
                    conference = %managed.handle.name(),
                    id = %id,
                    "Removing conference actor"
                );

                managed.handle.cancel();

                let name = managed.handle.name().to_string();
                tokio::spawn(async move {
                    match managed.task_handle.await {
                        Ok(()) => {
                            debug!(
                                target: "conf.actor.registry",
                                conference = %name,
                                "Conference actor task completed cleanly"
                            );
                        }
                        Err(e) => {
                            warn!(
                                target: "conf.actor.registry",
                                conference = %name,
                                error = ?e,
                                "Conference actor task failed during removal"
                            );
                        }
                    }
                });

                info!(
                    target: "conf.actor.registry",
                    id = %id,
                    total_conferences = self.conferences.len(),
                    "Conference actor removed"
                );

                Ok(())
            }
            None => Err(ConfError::ConferenceNotFound(id.to_string())),
        }
    }

    /// Get current registry status.
    fn get_status(&self) -> RegistryStatus {
        RegistryStatus {
            conference_count: self.conferences.len(),
            is_draining: !self.accepting_new,
        }
    }

    /// Initiate graceful shutdown.
    fn initiate_shutdown(&mut self) -> Result<(), ConfError> {
        info!(
            target: "conf.actor.registry",
            conference_count = self.conferences.len(),
            "Initiating graceful shutdown"
        );

        // Stop accepting new conferences
        self.accepting_new = false;

        // Cancel the root token (propagates to all children)
        self.cancel_token.cancel();

        Ok(())
    }

    /// Perform graceful shutdown.
    async fn graceful_shutdown(&mut self) {
        info!(
            target: "conf.actor.registry",
            conference_count = self.conferences.len(),
            "Performing graceful shutdown"
        );

        self.accepting_new = false;

        // Cancel all conference actors (already done via parent token, but
        // be explicit)
        for managed in self.conferences.values() {
            managed.handle.cancel();
        }

        // Wait for all conference tasks to complete
        for (id, managed) in self.conferences.drain() {
            match managed.task_handle.await {
                Ok(()) => {
                    debug!(
                        target: "conf.actor.registry",
                        id = %id,
                        "Conference actor completed cleanly"
                    );
                }
                Err(e) => {
                    warn!(
                        target: "conf.actor.registry",
                        id = %id,
                        error = ?e,
                        "Conference actor task failed during shutdown"
                    );
                }
            }
        }

        info!(target: "conf.actor.registry", "Graceful shutdown complete");
    }

    /// Check health of managed conference actors.
    ///
    /// Conferences whose actor task has finished (normally because the
    /// bridge-destroyed confirmation arrived) are swept out of the map so
    /// lookups cannot return dead handles.
    async fn check_conference_health(&mut self) {
        let mut finished = Vec::new();

        for (id, managed) in &self.conferences {
            if managed.task_handle.is_finished() {
                finished.push(*id);
            }
        }

        for id in finished {
            if let Some(managed) = self.conferences.remove(&id) {
                match managed.task_handle.await {
                    Ok(()) => {
                        info!(
                            target: "conf.actor.registry",
                            conference = %managed.handle.name(),
                            id = %id,
                            "Conference actor exited cleanly"
                        );
                    }
                    Err(join_error) => {
                        if join_error.is_panic() {
                            error!(
                                target: "conf.actor.registry",
                                conference = %managed.handle.name(),
                                id = %id,
                                error = ?join_error,
                                "Conference actor panicked - triggering investigation"
                            );
                            self.metrics.record_panic();
                        }
                    }
                }

                // The actor unregisters its own routes on exit; repeating
                // it here covers an actor killed mid-handler.
                self.router
                    .unregister_conference(managed.handle.bridge_id());
            }
        }
    }
}
