
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::capture::PassResult;
use crate::catalogue::{Catalogue, EventId};
use crate::error::{call, Error, Result};
use crate::opts::OnMissingEvent;
use crate::plan::Plan;
use crate::request::{Request, Resolved};
use crate::value::MetricValue;

/// Event and metric values of a finished session, in request order.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Report {
    events: Vec<(String, u64)>,
    metrics: Vec<(String, MetricValue)>,
}

impl Report {
    /// Requested events with their normalized counts.
    pub fn events(&self) -> &[(String, u64)] {
        self.events.as_slice()
    }

    /// Requested metrics with their computed values.
    pub fn metrics(&self) -> &[(String, MetricValue)] {
        self.metrics.as_slice()
    }

    pub fn event_values(&self) -> impl Iterator<Item = u64> + '_ {
        self.events.iter().map(|(_, v)| *v)
    }

    pub fn metric_values(&self) -> impl Iterator<Item = MetricValue> + '_ {
        self.metrics.iter().map(|(_, v)| *v)
    }

    /// Looks up an event by name.
    pub fn event(&self, name: &str) -> Option<u64> {
        self.events.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    /// Looks up a metric by name.
    pub fn metric(&self, name: &str) -> Option<MetricValue> {
        self.metrics.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }
}

pub(crate) fn aggregate<C: Catalogue>(
    catalogue: &C,
    plan: &Plan<C::Group>,
    results: &[PassResult],
    request: &Request,
    resolved: &Resolved,
    on_missing: OnMissingEvent,
) -> Result<Report> {
    let (metric_results, event_results) = results.split_at(plan.metric_passes());

    let metrics = if resolved.metrics.is_empty() {
        vec![]
    } else {
        let expected = plan.passes()[..plan.metric_passes()]
            .iter()
            .map(|p| p.num_events())
            .sum::<usize>();

        let mut ids = Vec::with_capacity(expected);
        let mut values = Vec::with_capacity(expected);
        for result in metric_results {
            ids.extend_from_slice(result.event_ids());
            values.extend_from_slice(result.values());
        }
        if ids.len() != expected {
            warn!(expected, collected = ids.len(), "metric passes collected unexpected event count");
        }

        let mut metrics = Vec::with_capacity(resolved.metrics.len());
        for (name, id) in request.metrics.iter().zip(&resolved.metrics) {
            let value = call!(catalogue, metric_value(*id, &ids, &values))?;
            debug!(metric = %name, %value, kind = ?value.kind(), "computed metric");
            metrics.push((name.clone(), value));
        }
        metrics
    };

    let collected: HashMap<EventId, u64> = event_results.iter().flat_map(|r| r.iter()).collect();

    let mut events = Vec::with_capacity(resolved.events.len());
    for (name, id) in request.events.iter().zip(&resolved.events) {
        let value = match (collected.get(id), on_missing) {
            (Some(value), _) => *value,
            (None, OnMissingEvent::Zero) => {
                warn!(event = %name, "event not collected, reporting zero");
                0
            }
            (None, OnMissingEvent::Error) => {
                return Err(Error::EventNotCollected { name: name.clone() });
            }
        };
        events.push((name.clone(), value));
    }

    Ok(Report { events, metrics })
}
