
use tracing::debug;

use crate::catalogue::{Catalogue, EventId, GroupSet, MetricId};
use crate::error::{call, Error, Result};

/// Which half of the request a pass collects for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Origin {
    /// Events feeding the requested metrics.
    Metric,
    /// Raw events requested directly.
    Event,
}

/// Groups enabled during one execution of the workload.
#[derive(Clone, Debug)]
pub struct PassPlan<G> {
    index: usize,
    origin: Origin,
    groups: GroupSet<G>,
    num_events: usize,
}

impl<G> PassPlan<G> {
    /// Position of the pass in the global pass ordering.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn groups(&self) -> &[G] {
        self.groups.groups()
    }

    /// Number of counters the pass is expected to capture, summed over its groups.
    pub fn num_events(&self) -> usize {
        self.num_events
    }
}

/// Ordered passes of a session: every metric pass, then every event pass.
#[derive(Clone, Debug)]
pub struct Plan<G> {
    passes: Vec<PassPlan<G>>,
    metric_passes: usize,
    event_passes: usize,
}

impl<G> Plan<G> {
    pub(crate) fn new<C>(catalogue: &C, metrics: &[MetricId], events: &[EventId]) -> Result<Self>
    where
        C: Catalogue<Group = G>,
    {
        if metrics.is_empty() && events.is_empty() {
            return Err(Error::EmptyRequest);
        }

        let metric_sets = match metrics {
            [] => vec![],
            ids => call!(catalogue, metric_group_sets(ids))?,
        };
        let event_sets = match events {
            [] => vec![],
            ids => call!(catalogue, event_group_sets(ids))?,
        };

        let metric_passes = metric_sets.len();
        let event_passes = event_sets.len();
        debug!(metric_passes, event_passes, "partitioned request");

        if metric_passes + event_passes == 0 {
            return Err(Error::EmptyPlan);
        }

        let origins = (0..metric_passes)
            .map(|_| Origin::Metric)
            .chain((0..event_passes).map(|_| Origin::Event));
        let sets = metric_sets.into_iter().chain(event_sets);

        let mut passes = Vec::with_capacity(metric_passes + event_passes);
        for (index, (origin, groups)) in origins.zip(sets).enumerate() {
            let mut num_events = 0;
            for (i, group) in groups.groups().iter().enumerate() {
                let n = call!(catalogue, group_num_events(group))?;
                debug!(pass = index, ?origin, group = i, events = n, "planned group");
                num_events += n as usize;
            }
            passes.push(PassPlan {
                index,
                origin,
                groups,
                num_events,
            });
        }

        Ok(Self {
            passes,
            metric_passes,
            event_passes,
        })
    }

    /// Total number of passes, always at least one.
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    pub fn metric_passes(&self) -> usize {
        self.metric_passes
    }

    pub fn event_passes(&self) -> usize {
        self.event_passes
    }

    pub fn passes(&self) -> &[PassPlan<G>] {
        self.passes.as_slice()
    }

    pub fn pass(&self, index: usize) -> Option<&PassPlan<G>> {
        self.passes.get(index)
    }
}
