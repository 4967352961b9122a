use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{
    error::{BufferError, Result},
    replacer::{self, Replacer},
};

/// Victim selection algorithm used by a buffer pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReplacementStrategy {
    #[default]
    Fifo,
    Lru,
    /// LRU-K with the given K.
    LruK(usize),
    Clock,
    Lfu,
}

impl ReplacementStrategy {
    /// LRU-K with the usual K of two.
    pub const LRU_2: ReplacementStrategy = ReplacementStrategy::LruK(2);

    pub fn build(self, capacity: usize) -> Box<dyn Replacer> {
        replacer::build(self, capacity)
    }

    pub(crate) fn validate(self) -> Result<()> {
        match self {
            ReplacementStrategy::LruK(0) => Err(BufferError::InvalidConfig(
                "LRU-K needs K of at least 1".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for ReplacementStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplacementStrategy::Fifo => f.write_str("fifo"),
            ReplacementStrategy::Lru => f.write_str("lru"),
            ReplacementStrategy::LruK(2) => f.write_str("lru-k"),
            ReplacementStrategy::LruK(k) => write!(f, "lru-{}", k),
            ReplacementStrategy::Clock => f.write_str("clock"),
            ReplacementStrategy::Lfu => f.write_str("lfu"),
        }
    }
}

impl FromStr for ReplacementStrategy {
    type Err = BufferError;

    fn from_str(s: &str) -> Result<Self> {
        let strategy = match s.trim().to_ascii_lowercase().as_str() {
            "fifo" => ReplacementStrategy::Fifo,
            "lru" => ReplacementStrategy::Lru,
            "lru-k" | "lru_k" => ReplacementStrategy::LRU_2,
            "clock" => ReplacementStrategy::Clock,
            "lfu" => ReplacementStrategy::Lfu,
            other => {
                let k = other
                    .strip_prefix("lru-")
                    .and_then(|k| k.parse::<usize>().ok())
                    .ok_or_else(|| {
                        BufferError::InvalidConfig(format!("unknown replacement strategy {:?}", s))
                    })?;
                ReplacementStrategy::LruK(k)
            }
        };
        strategy.validate()?;
        Ok(strategy)
    }
}

/// Everything needed to open a buffer pool over a page file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferPoolConfig {
    pub page_file: PathBuf,
    /// Number of frames.
    pub capacity: usize,
    pub strategy: ReplacementStrategy,
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        Self {
            page_file: PathBuf::from("testbuffer.bin"),
            capacity: 3,
            strategy: ReplacementStrategy::Fifo,
        }
    }
}

impl BufferPoolConfig {
    pub fn new(page_file: impl AsRef<Path>) -> Self {
        Self {
            page_file: page_file.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_strategy(mut self, strategy: ReplacementStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate(self.capacity, self.strategy)
    }
}

pub(crate) fn validate(capacity: usize, strategy: ReplacementStrategy) -> Result<()> {
    if capacity == 0 {
        return Err(BufferError::InvalidConfig(
            "buffer pool needs at least one frame".to_string(),
        ));
    }
    strategy.validate()
}
