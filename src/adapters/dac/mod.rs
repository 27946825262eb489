//! DAC import/export service adapter
//!
//! Speaks the XML-over-HTTP protocol of the regional `DACWebService.svc`
//! endpoints:
//!
//! - `POST {endpoint}/Export` with an `ExportInput` body
//! - `POST {endpoint}/Import` with an `ImportInput` body
//! - `GET {endpoint}/Status?servername=&username=&password=&reqId=`
//!
//! Submissions answer with a `guid` element; status queries answer with an
//! `ArrayOfStatusInfo`. All exchange failures are classified into
//! [`SubmissionError`](crate::domain::SubmissionError) or
//! [`PollError`](crate::domain::PollError) before they leave this module.

pub mod classify;
pub mod client;
pub mod models;
pub mod traits;

pub use client::DacClient;
pub use traits::{RequestSubmitter, StatusPoller, Submission};
