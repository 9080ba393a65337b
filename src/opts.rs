/// Session options.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Opts {
    /// Collection mode applied at the start of every pass.
    pub collection_mode: CollectionMode,

    /// Ask every group to count on all instances of its domain instead of
    /// a sampled subset.
    ///
    /// Counts are always rescaled to the domain's total instance count, so
    /// turning this off trades accuracy for lower overhead.
    pub profile_all_instances: bool,

    /// What to do with a requested event that no pass collected.
    pub on_missing_event: OnMissingEvent,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            collection_mode: CollectionMode::default(),
            profile_all_instances: true,
            on_missing_event: OnMissingEvent::default(),
        }
    }
}

/// Granularity at which the device attributes counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollectionMode {
    /// Counts are attributed to a single kernel execution.
    #[default]
    Kernel,

    /// Counts accumulate across everything that runs while groups are enabled.
    Continuous,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OnMissingEvent {
    /// Fail with [`EventNotCollected`][crate::Error::EventNotCollected].
    #[default]
    Error,

    /// Report zero for the event.
    Zero,
}
