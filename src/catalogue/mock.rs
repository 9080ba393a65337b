use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use thiserror::Error;

use super::{Catalogue, DomainId, EventId, GroupSet, MetricId};
use crate::opts::CollectionMode;
use crate::value::{MetricValue, ValueKind};

#[derive(Debug, Error)]
#[error("mock: {0}")]
pub struct MockError(pub String);

#[derive(Clone, Debug)]
pub struct MockGroup {
    pub domain: DomainId,
    pub instances: u32,
    pub events: Vec<EventId>,
}

#[derive(Clone, Debug)]
struct MockMetric {
    name: String,
    id: MetricId,
    kind: ValueKind,
    inputs: Vec<EventId>,
}

#[derive(Debug, Default)]
pub struct MockState {
    pub enabled: HashSet<usize>,
    pub profile_all: HashMap<usize, bool>,
    pub mode: Option<CollectionMode>,
    pub syncs: usize,
    pub enables: usize,
    pub disables: usize,
    pub reads: usize,
    /// Flat buffers handed to `metric_value`, one entry per call.
    pub metric_inputs: Vec<(Vec<EventId>, Vec<u64>)>,
}

/// Scripted in-memory catalogue.
///
/// Raw values are served per event regardless of the pass that reads them,
/// and reads fail unless the group is enabled.
#[derive(Debug)]
pub struct MockCatalogue {
    devices: u32,
    events: Vec<(String, EventId)>,
    metrics: Vec<MockMetric>,
    raw: HashMap<EventId, Vec<u64>>,
    domains: HashMap<DomainId, u32>,
    groups: Vec<MockGroup>,
    metric_sets: Vec<Vec<usize>>,
    event_sets: Vec<Vec<usize>>,
    fail_on: Option<&'static str>,
    pub state: RefCell<MockState>,
}

impl MockCatalogue {
    pub fn new() -> Self {
        Self {
            devices: 1,
            events: vec![],
            metrics: vec![],
            raw: HashMap::new(),
            domains: HashMap::new(),
            groups: vec![],
            metric_sets: vec![],
            event_sets: vec![],
            fail_on: None,
            state: RefCell::default(),
        }
    }

    pub fn devices(mut self, devices: u32) -> Self {
        self.devices = devices;
        self
    }

    pub fn domain(mut self, id: u32, total_instances: u32) -> Self {
        self.domains.insert(DomainId(id), total_instances);
        self
    }

    pub fn event(mut self, name: &str, id: u32, raw: &[u64]) -> Self {
        self.events.push((name.to_string(), EventId(id)));
        self.raw.insert(EventId(id), raw.to_vec());
        self
    }

    /// Metric whose value is the sum of its input events, tagged with `kind`.
    pub fn metric(mut self, name: &str, id: u32, kind: ValueKind, inputs: &[u32]) -> Self {
        self.metrics.push(MockMetric {
            name: name.to_string(),
            id: MetricId(id),
            kind,
            inputs: inputs.iter().copied().map(EventId).collect(),
        });
        self
    }

    /// Adds a group; groups are addressed by insertion order.
    pub fn group(mut self, domain: u32, instances: u32, events: &[u32]) -> Self {
        self.groups.push(MockGroup {
            domain: DomainId(domain),
            instances,
            events: events.iter().copied().map(EventId).collect(),
        });
        self
    }

    pub fn metric_pass(mut self, groups: &[usize]) -> Self {
        self.metric_sets.push(groups.to_vec());
        self
    }

    pub fn event_pass(mut self, groups: &[usize]) -> Self {
        self.event_sets.push(groups.to_vec());
        self
    }

    /// Makes every call to `method` fail.
    pub fn fail_on(mut self, method: &'static str) -> Self {
        self.fail_on = Some(method);
        self
    }

    fn check(&self, method: &'static str) -> Result<(), MockError> {
        if self.fail_on == Some(method) {
            return Err(MockError(format!("injected failure in {}", method)));
        }
        Ok(())
    }

    fn group_ref(&self, group: &usize) -> Result<&MockGroup, MockError> {
        self.groups
            .get(*group)
            .ok_or_else(|| MockError(format!("unknown group {}", group)))
    }

    fn sets(sets: &[Vec<usize>]) -> Vec<GroupSet<usize>> {
        sets.iter().cloned().map(GroupSet::new).collect()
    }
}

impl Catalogue for MockCatalogue {
    type Group = usize;
    type Error = MockError;

    fn device_count(&self) -> Result<u32, MockError> {
        self.check("device_count")?;
        Ok(self.devices)
    }

    fn event_id(&self, name: &str) -> Result<EventId, MockError> {
        self.check("event_id")?;
        self.events
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
            .ok_or_else(|| MockError(format!("unknown event {}", name)))
    }

    fn metric_id(&self, name: &str) -> Result<MetricId, MockError> {
        self.check("metric_id")?;
        self.metrics
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.id)
            .ok_or_else(|| MockError(format!("unknown metric {}", name)))
    }

    fn event_name(&self, event: EventId) -> Result<String, MockError> {
        self.check("event_name")?;
        self.events
            .iter()
            .find(|(_, id)| *id == event)
            .map(|(n, _)| n.clone())
            .ok_or_else(|| MockError(format!("unknown event id {}", event)))
    }

    fn metric_group_sets(&self, metrics: &[MetricId]) -> Result<Vec<GroupSet<usize>>, MockError> {
        self.check("metric_group_sets")?;
        assert!(!metrics.is_empty());
        Ok(Self::sets(&self.metric_sets))
    }

    fn event_group_sets(&self, events: &[EventId]) -> Result<Vec<GroupSet<usize>>, MockError> {
        self.check("event_group_sets")?;
        assert!(!events.is_empty());
        Ok(Self::sets(&self.event_sets))
    }

    fn group_num_events(&self, group: &usize) -> Result<u32, MockError> {
        self.check("group_num_events")?;
        Ok(self.group_ref(group)?.events.len() as _)
    }

    fn group_instance_count(&self, group: &usize) -> Result<u32, MockError> {
        self.check("group_instance_count")?;
        Ok(self.group_ref(group)?.instances)
    }

    fn group_domain(&self, group: &usize) -> Result<DomainId, MockError> {
        self.check("group_domain")?;
        Ok(self.group_ref(group)?.domain)
    }

    fn group_events(&self, group: &usize) -> Result<Vec<EventId>, MockError> {
        self.check("group_events")?;
        Ok(self.group_ref(group)?.events.clone())
    }

    fn domain_total_instances(&self, domain: DomainId) -> Result<u32, MockError> {
        self.check("domain_total_instances")?;
        self.domains
            .get(&domain)
            .copied()
            .ok_or_else(|| MockError(format!("unknown domain {}", domain)))
    }

    fn read_event(&self, group: &usize, event: EventId, values: &mut [u64]) -> Result<(), MockError> {
        self.check("read_event")?;
        if !self.state.borrow().enabled.contains(group) {
            return Err(MockError(format!("group {} read while disabled", group)));
        }
        let raw = self
            .raw
            .get(&event)
            .ok_or_else(|| MockError(format!("no raw values for {}", event)))?;
        values.fill(0);
        for (dst, src) in values.iter_mut().zip(raw) {
            *dst = *src;
        }
        self.state.borrow_mut().reads += 1;
        Ok(())
    }

    fn metric_value(
        &self,
        metric: MetricId,
        events: &[EventId],
        values: &[u64],
    ) -> Result<MetricValue, MockError> {
        self.check("metric_value")?;
        assert_eq!(events.len(), values.len());
        let metric = self
            .metrics
            .iter()
            .find(|m| m.id == metric)
            .ok_or_else(|| MockError(format!("unknown metric id {}", metric)))?;

        self.state
            .borrow_mut()
            .metric_inputs
            .push((events.to_vec(), values.to_vec()));

        let sum: u64 = events
            .iter()
            .zip(values)
            .filter(|(id, _)| metric.inputs.contains(id))
            .map(|(_, v)| *v)
            .sum();
        let value = match metric.kind {
            ValueKind::Double => MetricValue::Double(sum as _),
            ValueKind::Uint64 => MetricValue::Uint64(sum),
            ValueKind::Int64 => MetricValue::Int64(sum as _),
            ValueKind::Percent => MetricValue::Percent(sum as _),
            ValueKind::Throughput => MetricValue::Throughput(sum),
            ValueKind::UtilizationLevel => MetricValue::UtilizationLevel(sum as _),
        };
        Ok(value)
    }

    fn synchronize(&self) -> Result<(), MockError> {
        self.check("synchronize")?;
        self.state.borrow_mut().syncs += 1;
        Ok(())
    }

    fn set_collection_mode(&self, mode: CollectionMode) -> Result<(), MockError> {
        self.check("set_collection_mode")?;
        self.state.borrow_mut().mode = Some(mode);
        Ok(())
    }

    fn set_profile_all_instances(&self, group: &usize, all: bool) -> Result<(), MockError> {
        self.check("set_profile_all_instances")?;
        self.state.borrow_mut().profile_all.insert(*group, all);
        Ok(())
    }

    fn enable_group(&self, group: &usize) -> Result<(), MockError> {
        self.check("enable_group")?;
        let mut state = self.state.borrow_mut();
        state.enabled.insert(*group);
        state.enables += 1;
        Ok(())
    }

    fn disable_group(&self, group: &usize) -> Result<(), MockError> {
        self.check("disable_group")?;
        let mut state = self.state.borrow_mut();
        state.enabled.remove(group);
        state.disables += 1;
        Ok(())
    }
}
