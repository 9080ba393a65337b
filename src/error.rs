use std::error::Error as StdError;

use thiserror::Error;
use tracing::error;

use crate::catalogue::{DomainId, EventId};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no compatible device found")]
    NoDevice,

    #[error("collection request has no events and no metrics")]
    EmptyRequest,

    #[error("catalogue partitioned a non-empty request into zero passes")]
    EmptyPlan,

    /// A call into the counter catalogue failed.
    ///
    /// Counter sessions cannot be resumed after a partial failure, so the
    /// session that hit this error refuses any further work.
    #[error("{site}: catalogue call `{call}` failed: {source}")]
    Catalogue {
        call: &'static str,
        site: &'static str,
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("session was aborted by an earlier catalogue failure")]
    Aborted,

    /// A group reported zero instances, which leaves its counters unscalable.
    #[error("event {event} is read from a group in domain {domain} that reports zero instances")]
    InvalidInstanceCount { event: EventId, domain: DomainId },

    #[error("finished after {completed} of {total} passes")]
    Incomplete { completed: usize, total: usize },

    /// A requested event did not show up in any event pass.
    #[error("event `{name}` was requested but not collected by any pass")]
    EventNotCollected { name: String },
}

impl Error {
    /// Returns `true` if the error leaves the device in a state that can not be
    /// recovered by the current session.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NoDevice | Self::Catalogue { .. } | Self::Aborted | Self::InvalidInstanceCount { .. }
        )
    }

    pub(crate) fn catalogue<E>(call: &'static str, site: &'static str) -> impl FnOnce(E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        move |source| {
            error!(call, site, %source, "catalogue call failed");
            Self::Catalogue {
                call,
                site,
                source: Box::new(source),
            }
        }
    }
}

// Invokes a catalogue method and tags its failure with the method name and call site.
macro_rules! call {
    ($catalogue:expr, $method:ident($($arg:expr),* $(,)?)) => {
        $catalogue
            .$method($($arg),*)
            .map_err($crate::error::Error::catalogue(
                stringify!($method),
                concat!(file!(), ":", line!()),
            ))
    };
}
pub(crate) use call;
