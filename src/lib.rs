//! Multi-pass collection of hardware performance counters.
//!
//! A device exposes far more counters ("events") and derived quantities
//! ("metrics") than it can count at the same time. This crate splits a request
//! into the minimum number of passes, enables one pass worth of counter groups
//! around each execution of the caller's workload, normalizes what every pass
//! captured and finally combines all passes into event and metric values.
//!
//! The device side is reached through the [`Catalogue`] trait, which binds the
//! vendor's counter enumeration and control API.
//!
//! ## Example
//!
//! ```rust
//! use counter_multipass::{Catalogue, Opts, Request, Result, Session};
//!
//! fn profile<C: Catalogue>(catalogue: &C, mut launch_kernel: impl FnMut()) -> Result<()> {
//!     let request = Request::new()
//!         .events(["inst_executed", "active_cycles"])
//!         .metrics(["ipc", "achieved_occupancy"]);
//!
//!     let mut session = Session::new(catalogue, request, Opts::default())?;
//!
//!     // The same workload must run once per pass.
//!     for _ in 0..session.pass_count() {
//!         session.on_pass_begin()?;
//!         launch_kernel();
//!         session.on_pass_end()?;
//!     }
//!
//!     let report = session.finish()?;
//!     for (name, count) in report.events() {
//!         println!("{}: {}", name, count);
//!     }
//!     for (name, value) in report.metrics() {
//!         println!("{}: {}", name, value);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Diagnostics are emitted through [`tracing`]; install a subscriber to see
//! the pass plan (`debug`), per-event captures (`debug`) and raw per-instance
//! values (`trace`).

pub mod aggregate;
pub mod capture;
pub mod catalogue;
mod error;
mod opts;
pub mod plan;
mod request;
pub mod session;
mod value;

pub use aggregate::Report;
pub use catalogue::{Catalogue, DomainId, EventId, GroupSet, MetricId};
pub use error::{Error, Result};
pub use opts::*;
pub use request::Request;
pub use session::Session;
pub use value::{MetricValue, ValueKind};
