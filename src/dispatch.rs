//! Runs core [`Request`]s and folder mutations against the listing service.
//!
//! Each call spawns a tokio task; the outcome comes back through the event
//! channel so the UI loop can feed it to the core one at a time.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::browser::{Completion, Mutation, Request};
use crate::error::Result;
use crate::service::{validate_folder_name, ListingService};

/// A folder mutation the user asked for, before the service has seen it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRequest {
    Create { parent: String, name: String },
    Rename { path: String, new_name: String },
    Delete { path: String },
}

impl MutationRequest {
    /// The core mutation this request becomes once the service accepts it.
    fn applied(&self) -> Mutation {
        match self {
            MutationRequest::Create { parent, name } => Mutation::Created {
                parent: parent.clone(),
                name: name.clone(),
            },
            MutationRequest::Rename { path, new_name } => Mutation::Renamed {
                path: path.clone(),
                new_name: new_name.clone(),
            },
            MutationRequest::Delete { path } => Mutation::Deleted { path: path.clone() },
        }
    }

    fn label(&self) -> &'static str {
        match self {
            MutationRequest::Create { .. } => "create",
            MutationRequest::Rename { .. } => "rename",
            MutationRequest::Delete { .. } => "delete",
        }
    }
}

/// Service outcomes delivered back to the event loop.
#[derive(Debug)]
pub enum ServiceEvent {
    /// A core request finished.
    Completed(Completion),
    /// A mutation finished. On success carries the applied mutation and the
    /// service's message, if any.
    Mutated {
        request: MutationRequest,
        result: Result<(Mutation, Option<String>)>,
    },
    /// Answer to an is-folder-empty query.
    EmptyChecked { path: String, result: Result<bool> },
}

/// Spawns service calls and forwards their outcomes as `E`.
pub struct Dispatcher<E> {
    service: Arc<dyn ListingService>,
    tx: mpsc::UnboundedSender<E>,
}

impl<E> Clone for Dispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            tx: self.tx.clone(),
        }
    }
}

impl<E> Dispatcher<E>
where
    E: From<ServiceEvent> + Send + 'static,
{
    pub fn new(service: Arc<dyn ListingService>, tx: mpsc::UnboundedSender<E>) -> Self {
        Self { service, tx }
    }

    /// Run every request concurrently.
    pub fn dispatch(&self, requests: Vec<Request>) {
        for request in requests {
            self.spawn_request(request);
        }
    }

    fn spawn_request(&self, request: Request) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let completion = run_request(service.as_ref(), request).await;
            // Receiver gone means the app is shutting down.
            let _ = tx.send(ServiceEvent::Completed(completion).into());
        });
    }

    /// Validate and submit a mutation.
    ///
    /// Names are checked before anything is sent; an invalid name fails
    /// here and no request is made.
    pub fn mutate(&self, request: MutationRequest) -> Result<()> {
        let request = match request {
            MutationRequest::Create { parent, name } => MutationRequest::Create {
                parent,
                name: validate_folder_name(&name)?,
            },
            MutationRequest::Rename { path, new_name } => MutationRequest::Rename {
                path,
                new_name: validate_folder_name(&new_name)?,
            },
            delete => delete,
        };

        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = match &request {
                MutationRequest::Create { parent, name } => {
                    service.create_folder(parent, name).await
                }
                MutationRequest::Rename { path, new_name } => {
                    service.rename_folder(path, new_name).await
                }
                MutationRequest::Delete { path } => service.delete_folder(path).await,
            };
            match &outcome {
                Ok(_) => info!(op = request.label(), ?request, "folder mutation succeeded"),
                Err(e) => warn!(op = request.label(), ?request, error = %e, "folder mutation failed"),
            }
            let result = outcome.map(|message| (request.applied(), message));
            let _ = tx.send(ServiceEvent::Mutated { request, result }.into());
        });
        Ok(())
    }

    /// Ask whether `path` is empty, for the delete confirmation.
    pub fn check_empty(&self, path: &str) {
        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        let path = path.to_string();
        tokio::spawn(async move {
            let result = service.check_folder_empty(&path).await;
            let _ = tx.send(ServiceEvent::EmptyChecked { path, result }.into());
        });
    }
}

async fn run_request(service: &dyn ListingService, request: Request) -> Completion {
    match request {
        Request::LoadRoots(load) => {
            debug!(ticket = load.ticket, "loading top-level folders");
            Completion::Roots {
                ticket: load.ticket,
                result: service.list_folders(None).await,
            }
        }
        Request::LoadChildren(load) => {
            debug!(path = %load.path, ticket = load.ticket, "loading subfolders");
            let result = service.list_folders(Some(&load.path)).await;
            Completion::Children {
                path: load.path,
                ticket: load.ticket,
                result,
            }
        }
        Request::LoadListing(request) => {
            let key = &request.key;
            let result = service
                .list_files(&key.path, key.column, key.direction)
                .await;
            Completion::Listing { request, result }
        }
    }
}
