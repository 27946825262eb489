//! External system integrations for sqlport.
//!
//! - [`dac`] - DAC import/export service (submission and status queries)
//!
//! # Design Pattern
//!
//! Adapters follow the **Adapter Pattern** to isolate external dependencies and
//! enable testing with mock implementations. The orchestrator depends on the
//! [`RequestSubmitter`](dac::RequestSubmitter) and
//! [`StatusPoller`](dac::StatusPoller) traits only.
//!
//! ```rust,no_run
//! use sqlport::adapters::dac::DacClient;
//! use sqlport::config::ServiceConfig;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServiceConfig {
//!     endpoint: "https://by1prod-dacsvc.azure.com/DACWebService.svc".to_string(),
//!     ..Default::default()
//! };
//!
//! let client = DacClient::new(&config)?;
//! println!("Using {}", client.endpoint());
//! # Ok(())
//! # }
//! ```

pub mod dac;
