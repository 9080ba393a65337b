
use std::borrow::Borrow;

use tracing::{debug, info, trace, warn};

use crate::aggregate::{aggregate, Report};
use crate::capture::{capture_group, PassResult};
use crate::catalogue::Catalogue;
use crate::error::{call, Error, Result};
use crate::opts::Opts;
use crate::plan::{PassPlan, Plan};
use crate::request::{Request, Resolved};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Idle,
    InPass,
    Poisoned,
}

/// Multi-pass collection session.
///
/// The session plans how the requested counters split into passes. The caller
/// then runs the identical workload [`pass_count`][Self::pass_count] times,
/// calling [`on_pass_begin`][Self::on_pass_begin] right before and
/// [`on_pass_end`][Self::on_pass_end] right after each execution.
///
/// Enabled groups count every kernel launched until the pass ends, so exactly
/// one workload execution must happen between the two hooks.
///
/// Boundary calls after the last pass are ignored. Any catalogue failure
/// aborts the session: later hooks and [`finish`][Self::finish] fail with
/// [`Error::Aborted`].
///
/// # Examples
///
/// ```rust
/// use counter_multipass::{Catalogue, Opts, Request, Result, Session};
///
/// fn profile<C: Catalogue>(catalogue: &C, mut launch: impl FnMut()) -> Result<()> {
///     let request = Request::new().event("inst_executed").metric("ipc");
///     let mut session = Session::new(catalogue, request, Opts::default())?;
///
///     session.run(|_| launch())?;
///
///     let report = session.finish()?;
///     for (name, value) in report.metrics() {
///         println!("{} = {}", name, value);
///     }
///     Ok(())
/// }
/// ```
pub struct Session<'c, C: Catalogue> {
    catalogue: &'c C,
    opts: Opts,
    request: Request,
    resolved: Resolved,
    plan: Plan<C::Group>,
    results: Vec<PassResult>,
    cursor: usize,
    state: State,
    // Per-instance read buffer shared by every capture.
    values: Vec<u64>,
}

impl<'c, C: Catalogue> Session<'c, C> {
    pub fn new(catalogue: &'c C, request: Request, opts: impl Borrow<Opts>) -> Result<Self> {
        if request.is_empty() {
            return Err(Error::EmptyRequest);
        }
        if call!(catalogue, device_count())? == 0 {
            return Err(Error::NoDevice);
        }

        let resolved = Resolved::new(catalogue, &request)?;
        let plan = Plan::new(catalogue, &resolved.metrics, &resolved.events)?;
        let results = plan
            .passes()
            .iter()
            .map(|p| PassResult::with_capacity(p.num_events()))
            .collect();

        info!(
            events = request.events.len(),
            metrics = request.metrics.len(),
            passes = plan.len(),
            "planned collection"
        );

        Ok(Self {
            catalogue,
            opts: opts.borrow().clone(),
            request,
            resolved,
            plan,
            results,
            cursor: 0,
            state: State::Idle,
            values: vec![],
        })
    }

    /// Number of workload executions needed to collect everything.
    pub fn pass_count(&self) -> usize {
        self.plan.len()
    }

    pub fn metric_passes(&self) -> usize {
        self.plan.metric_passes()
    }

    pub fn event_passes(&self) -> usize {
        self.plan.event_passes()
    }

    pub fn plan(&self) -> &Plan<C::Group> {
        &self.plan
    }

    /// Index of the next pass to run; equals [`pass_count`][Self::pass_count]
    /// once every pass has ended.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.plan.len()
    }

    /// Results of the passes that already ended, in pass order.
    pub fn pass_results(&self) -> &[PassResult] {
        &self.results[..self.cursor.min(self.results.len())]
    }

    /// Enables the groups of the current pass.
    ///
    /// Call immediately before launching the workload.
    pub fn on_pass_begin(&mut self) -> Result<()> {
        self.check()?;
        let Some(pass) = self.plan.pass(self.cursor) else {
            trace!(cursor = self.cursor, "pass begin after last pass ignored");
            return Ok(());
        };
        if self.state == State::InPass {
            warn!(pass = pass.index(), "pass begins twice without ending");
        }

        let result = begin(self.catalogue, &self.opts, pass);
        self.guard(result)?;
        self.state = State::InPass;
        Ok(())
    }

    /// Captures and disables the groups of the current pass, then moves to the next pass.
    ///
    /// Call immediately after launching the workload.
    pub fn on_pass_end(&mut self) -> Result<()> {
        self.check()?;
        let Some(pass) = self.plan.pass(self.cursor) else {
            trace!(cursor = self.cursor, "pass end after last pass ignored");
            return Ok(());
        };

        let result = end(
            self.catalogue,
            pass,
            &mut self.results[self.cursor],
            &mut self.values,
        );
        self.guard(result)?;

        self.cursor += 1;
        self.state = State::Idle;
        Ok(())
    }

    /// Runs every remaining pass, calling `workload` with the pass index
    /// between the boundary hooks.
    pub fn run<F>(&mut self, mut workload: F) -> Result<()>
    where
        F: FnMut(usize),
    {
        while !self.is_complete() {
            let pass = self.cursor;
            self.on_pass_begin()?;
            workload(pass);
            self.on_pass_end()?;
        }
        Ok(())
    }

    /// Merges the results of all passes and computes the requested values.
    pub fn finish(self) -> Result<Report> {
        self.check()?;
        if !self.is_complete() {
            return Err(Error::Incomplete {
                completed: self.cursor,
                total: self.plan.len(),
            });
        }

        aggregate(
            self.catalogue,
            &self.plan,
            &self.results,
            &self.request,
            &self.resolved,
            self.opts.on_missing_event,
        )
    }

    fn check(&self) -> Result<()> {
        match self.state {
            State::Poisoned => Err(Error::Aborted),
            _ => Ok(()),
        }
    }

    fn guard(&mut self, result: Result<()>) -> Result<()> {
        if result.is_err() {
            self.state = State::Poisoned;
        }
        result
    }
}

fn begin<C: Catalogue>(catalogue: &C, opts: &Opts, pass: &PassPlan<C::Group>) -> Result<()> {
    call!(catalogue, synchronize())?;
    call!(catalogue, set_collection_mode(opts.collection_mode))?;

    for (i, group) in pass.groups().iter().enumerate() {
        debug!(pass = pass.index(), group = i, "enabling group");
        call!(catalogue, set_profile_all_instances(group, opts.profile_all_instances))?;
        call!(catalogue, enable_group(group))?;
    }
    Ok(())
}

fn end<C: Catalogue>(
    catalogue: &C,
    pass: &PassPlan<C::Group>,
    result: &mut PassResult,
    values: &mut Vec<u64>,
) -> Result<()> {
    call!(catalogue, synchronize())?;

    for group in pass.groups() {
        capture_group(catalogue, group, result, values)?;
    }
    for (i, group) in pass.groups().iter().enumerate() {
        debug!(pass = pass.index(), group = i, "disabling group");
        call!(catalogue, disable_group(group))?;
    }

    if result.len() != pass.num_events() {
        warn!(
            pass = pass.index(),
            expected = pass.num_events(),
            captured = result.len(),
            "pass captured unexpected event count"
        );
    }
    Ok(())
}
