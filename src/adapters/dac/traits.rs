//! Seams between the orchestrator and the import/export service
//!
//! The orchestrator only sees these two traits. [`DacClient`](super::DacClient)
//! implements both over HTTP; tests substitute scripted implementations.

use crate::domain::{
    OperationHandle, OperationRequest, PollError, StatusCredentials, StatusSnapshot,
    SubmissionError,
};
use async_trait::async_trait;

/// Outcome of a successful call to [`RequestSubmitter::submit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The service accepted the request and issued a handle
    Submitted(OperationHandle),
    /// Dry run: the serialized body, nothing was sent
    Preview(String),
}

/// Builds and sends export/import requests
#[async_trait]
pub trait RequestSubmitter: Send + Sync {
    /// Submits one request
    ///
    /// With `dry_run` set, the body is built and returned as
    /// [`Submission::Preview`] without any network call.
    ///
    /// # Errors
    ///
    /// - [`SubmissionError::Transport`] if the exchange did not complete
    /// - [`SubmissionError::RemoteRejection`] for a non-success HTTP status
    /// - [`SubmissionError::MalformedResponse`] if the reply has no request id
    async fn submit(
        &self,
        request: &OperationRequest,
        dry_run: bool,
    ) -> Result<Submission, SubmissionError>;
}

/// Reads the current status of a submitted request
#[async_trait]
pub trait StatusPoller: Send + Sync {
    /// Issues one status query
    ///
    /// Only the first record of the reply is returned; an empty reply is an
    /// error, never a default status.
    ///
    /// # Errors
    ///
    /// - [`PollError::Transport`] if the exchange did not complete or was refused
    /// - [`PollError::MalformedResponse`] if the reply holds no usable record
    async fn poll(
        &self,
        handle: &OperationHandle,
        credentials: &StatusCredentials,
    ) -> Result<StatusSnapshot, PollError>;
}
