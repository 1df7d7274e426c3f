/// Construction options for [`Pipeline`](crate::Pipeline).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    default_optimizers: bool,
    track_history: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self { default_optimizers: true, track_history: false }
    }
}

impl PipelineOptions {
    /// Registers the identity and holder optimizers at construction.
    pub fn with_default_optimizers(mut self, enabled: bool) -> Self {
        self.default_optimizers = enabled;
        self
    }

    /// Records history at every source, whether or not a stage asks for it.
    pub fn with_history(mut self, enabled: bool) -> Self {
        self.track_history = enabled;
        self
    }

    pub fn default_optimizers(&self) -> bool {
        self.default_optimizers
    }

    pub fn track_history(&self) -> bool {
        self.track_history
    }
}
