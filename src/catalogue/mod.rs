//! Binding to the device's counter catalogue.
//!
//! The catalogue knows every event and metric the device exposes, how they
//! split into groups that can be enabled together, and how to turn raw event
//! counts into metric values. This crate only drives it.

#[cfg(test)]
pub(crate) mod mock;

use std::error::Error as StdError;
use std::fmt::{self, Display};

use crate::opts::CollectionMode;
use crate::value::MetricValue;

macro_rules! id {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub struct $name(pub u32);

        impl Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id!(
    /// Catalogue handle of a raw hardware event.
    EventId
);
id!(
    /// Catalogue handle of a derived metric.
    MetricId
);
id!(
    /// Catalogue handle of a counter domain.
    DomainId
);

/// Event groups that may be enabled together for one execution of the workload.
#[derive(Clone, Debug)]
pub struct GroupSet<G> {
    groups: Vec<G>,
}

impl<G> GroupSet<G> {
    pub fn new(groups: Vec<G>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[G] {
        self.groups.as_slice()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl<G> From<Vec<G>> for GroupSet<G> {
    fn from(groups: Vec<G>) -> Self {
        Self::new(groups)
    }
}

/// Counter catalogue of one device.
///
/// Methods take `&self`: the catalogue is a thin handle over a stateful vendor
/// API, which owns the actual counter state.
pub trait Catalogue {
    /// Opaque event group handle.
    type Group;
    type Error: StdError + Send + Sync + 'static;

    fn device_count(&self) -> Result<u32, Self::Error>;

    fn event_id(&self, name: &str) -> Result<EventId, Self::Error>;
    fn metric_id(&self, name: &str) -> Result<MetricId, Self::Error>;
    /// Name of an event, used for diagnostics only.
    fn event_name(&self, event: EventId) -> Result<String, Self::Error>;

    /// Partitions the events needed by `metrics` into passes.
    fn metric_group_sets(&self, metrics: &[MetricId])
        -> Result<Vec<GroupSet<Self::Group>>, Self::Error>;
    /// Partitions raw `events` into passes.
    fn event_group_sets(&self, events: &[EventId])
        -> Result<Vec<GroupSet<Self::Group>>, Self::Error>;

    fn group_num_events(&self, group: &Self::Group) -> Result<u32, Self::Error>;
    /// Number of domain instances the group counts on.
    fn group_instance_count(&self, group: &Self::Group) -> Result<u32, Self::Error>;
    fn group_domain(&self, group: &Self::Group) -> Result<DomainId, Self::Error>;
    fn group_events(&self, group: &Self::Group) -> Result<Vec<EventId>, Self::Error>;

    /// Number of instances of `domain` present on the device.
    fn domain_total_instances(&self, domain: DomainId) -> Result<u32, Self::Error>;

    /// Reads one value per group instance of `event` into `values`.
    ///
    /// `values` is sized to the group's instance count.
    fn read_event(
        &self,
        group: &Self::Group,
        event: EventId,
        values: &mut [u64],
    ) -> Result<(), Self::Error>;

    /// Computes a metric from the flat parallel buffers of collected events.
    fn metric_value(
        &self,
        metric: MetricId,
        events: &[EventId],
        values: &[u64],
    ) -> Result<MetricValue, Self::Error>;

    /// Blocks until all prior device work completes.
    fn synchronize(&self) -> Result<(), Self::Error>;
    fn set_collection_mode(&self, mode: CollectionMode) -> Result<(), Self::Error>;
    fn set_profile_all_instances(&self, group: &Self::Group, all: bool)
        -> Result<(), Self::Error>;

    /// Enables a group; it stays enabled for every following launch until disabled.
    fn enable_group(&self, group: &Self::Group) -> Result<(), Self::Error>;
    fn disable_group(&self, group: &Self::Group) -> Result<(), Self::Error>;
}
