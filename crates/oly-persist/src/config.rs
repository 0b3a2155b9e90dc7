//! Save format configuration.

/// Configuration for [`save_with`](crate::save_with).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistConfig {
    /// Also write the transitional JSON master index (`master.json`)
    /// next to the legacy `master` file.
    ///
    /// Default: `false`. [`load`](crate::load) accepts either form.
    pub write_json_index: bool,

    /// List values per physical line before the writer wraps with a
    /// continuation backslash.
    ///
    /// Default: 11. Values below 1 are treated as 1. The reader joins
    /// continuations regardless of width, so files written with any
    /// width load identically.
    pub wrap_width: usize,
}

impl PersistConfig {
    /// Default for [`write_json_index`](Self::write_json_index).
    pub const DEFAULT_WRITE_JSON_INDEX: bool = false;

    /// Default for [`wrap_width`](Self::wrap_width).
    pub const DEFAULT_WRAP_WIDTH: usize = 11;

    /// Create a config with default values.
    pub fn new() -> Self {
        Self {
            write_json_index: Self::DEFAULT_WRITE_JSON_INDEX,
            wrap_width: Self::DEFAULT_WRAP_WIDTH,
        }
    }

    /// Enable or disable the JSON master index.
    #[must_use]
    pub fn with_json_index(mut self, write_json_index: bool) -> Self {
        self.write_json_index = write_json_index;
        self
    }

    /// Override the list wrap width.
    #[must_use]
    pub fn with_wrap_width(mut self, wrap_width: usize) -> Self {
        self.wrap_width = wrap_width;
        self
    }

    pub(crate) fn effective_wrap(&self) -> usize {
        self.wrap_width.max(1)
    }
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self::new()
    }
}
