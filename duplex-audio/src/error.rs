use core::fmt;

/// Buffer (re)allocation failed.
///
/// When it is returned no buffer set is installed and the pipeline is paused: the transfer stage
/// runs its hooks but moves no data until a later configuration succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationError {
    block_size: usize,
}

impl AllocationError {
    pub(crate) const fn new(block_size: usize) -> Self {
        AllocationError { block_size }
    }

    /// The block size whose buffers could not be allocated.
    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to allocate audio buffers for a block size of {} frames",
            self.block_size
        )
    }
}

impl core::error::Error for AllocationError {}

/// Reconfiguration of a [`Framework`](crate::Framework) was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The new buffers could not be allocated; the pipeline is paused.
    Allocation(AllocationError),
    /// The pipeline is running and its interrupts own the buffers. Nothing
    /// was changed.
    Running,
}

impl From<AllocationError> for ConfigError {
    fn from(err: AllocationError) -> Self {
        ConfigError::Allocation(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Allocation(err) => err.fmt(f),
            ConfigError::Running => f.write_str("audio pipeline is running"),
        }
    }
}

impl core::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            ConfigError::Allocation(err) => Some(err),
            ConfigError::Running => None,
        }
    }
}
