use crate::catalogue::{Catalogue, EventId, MetricId};
use crate::error::{call, Result};

/// Events and metrics to collect, in the order they are reported back.
///
/// Duplicate names are not detected.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Request {
    pub events: Vec<String>,
    pub metrics: Vec<String>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn event(mut self, name: impl Into<String>) -> Self {
        self.events.push(name.into());
        self
    }

    pub fn events<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.events.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn metric(mut self, name: impl Into<String>) -> Self {
        self.metrics.push(name.into());
        self
    }

    pub fn metrics<I>(mut self, names: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.metrics.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.metrics.is_empty()
    }
}

// Request names resolved to catalogue ids, index-aligned with `Request`.
#[derive(Clone, Debug)]
pub(crate) struct Resolved {
    pub events: Vec<EventId>,
    pub metrics: Vec<MetricId>,
}

impl Resolved {
    pub fn new<C: Catalogue>(catalogue: &C, request: &Request) -> Result<Self> {
        let metrics = request
            .metrics
            .iter()
            .map(|name| call!(catalogue, metric_id(name)))
            .collect::<Result<_>>()?;
        let events = request
            .events
            .iter()
            .map(|name| call!(catalogue, event_id(name)))
            .collect::<Result<_>>()?;

        Ok(Self { events, metrics })
    }
}
