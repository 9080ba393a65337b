
use tracing::{debug, enabled, trace, warn, Level};

use crate::catalogue::{Catalogue, EventId};
use crate::error::{call, Error, Result};

/// Normalized counter values captured by one pass.
///
/// Filled once while the pass ends and never touched afterwards.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PassResult {
    event_ids: Vec<EventId>,
    values: Vec<u64>,
}

impl PassResult {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            event_ids: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, event: EventId, value: u64) {
        self.event_ids.push(event);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.event_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_ids.is_empty()
    }

    pub fn event_ids(&self) -> &[EventId] {
        self.event_ids.as_slice()
    }

    pub fn values(&self) -> &[u64] {
        self.values.as_slice()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EventId, u64)> + '_ {
        self.event_ids.iter().copied().zip(self.values.iter().copied())
    }
}

/// Rescales a sum observed on `instances` domain instances to the
/// `total_instances` present on the device.
///
/// Truncating integer division: `floor(sum * total_instances / instances)`.
/// Returns `None` if `instances` is zero.
pub fn normalize(sum: u128, total_instances: u32, instances: u32) -> Option<u128> {
    if instances == 0 {
        return None;
    }
    Some(sum * total_instances as u128 / instances as u128)
}

/// Reads every event of `group` and appends its normalized value to `result`.
///
/// `values` is scratch space for per-instance reads, reused across groups.
pub(crate) fn capture_group<C: Catalogue>(
    catalogue: &C,
    group: &C::Group,
    result: &mut PassResult,
    values: &mut Vec<u64>,
) -> Result<()> {
    let domain = call!(catalogue, group_domain(group))?;
    let total_instances = call!(catalogue, domain_total_instances(domain))?;
    let instances = call!(catalogue, group_instance_count(group))?;
    let events = call!(catalogue, group_events(group))?;

    values.clear();
    values.resize(instances as _, 0);

    for event in events {
        call!(catalogue, read_event(group, event, values.as_mut_slice()))?;

        let sum: u128 = values.iter().map(|&v| v as u128).sum();
        let scaled = normalize(sum, total_instances, instances)
            .ok_or(Error::InvalidInstanceCount { event, domain })?;
        let normalized = u64::try_from(scaled).unwrap_or_else(|_| {
            warn!(%event, %scaled, "normalized count overflows u64, saturating");
            u64::MAX
        });

        result.push(event, normalized);

        if enabled!(Level::DEBUG) {
            // Best effort: the name only labels diagnostics.
            let name = catalogue.event_name(event).unwrap_or_else(|e| {
                warn!(%event, error = %e, "event name lookup failed");
                event.to_string()
            });
            debug!(
                event = %name,
                %sum,
                total_instances,
                instances,
                normalized,
                "captured event"
            );
            trace!(event = %name, ?values, "per-instance values");
        }
    }

    Ok(())
}
