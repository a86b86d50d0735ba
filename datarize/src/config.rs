//! Configuration types controlling recursion, sizing and member discovery.

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Invalid max depth (must be > 0)
    InvalidMaxDepth(usize),
    /// Invalid collection size (must be > 0)
    InvalidCollectionSize(usize),
    /// Mutator prefix must not be empty
    EmptyMutatorPrefix,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidMaxDepth(n) => {
                write!(f, "Invalid max depth: {} (must be > 0)", n)
            }
            ConfigError::InvalidCollectionSize(n) => {
                write!(f, "Invalid max collection size: {} (must be > 0)", n)
            }
            ConfigError::EmptyMutatorPrefix => {
                write!(f, "Mutator prefix must not be empty")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Default recursion budget for self-referential positions
pub const DEFAULT_RECURSION_BUDGET: u32 = 2;

/// Default length of generated strings
pub const DEFAULT_STRING_LENGTH: usize = 10;

/// Configuration for a [`Populator`](crate::Populator)
#[derive(Debug, Clone, PartialEq)]
pub struct PopulatorConfig {
    /// How many times a type may be nested inside itself before the position is left absent
    pub recursion_budget: u32,
    /// Budget handed to the container resolver for container-typed parameters
    pub container_budget: u32,
    /// Maximum nesting depth of any kind; deeper positions are left absent
    pub max_depth: usize,
    /// Length of generated strings
    pub string_length: usize,
    /// Upper bound of the random size of default containers (`Vec`, `HashSet`, `HashMap`)
    pub max_collection_size: usize,
    /// Number of insertions into non-default concrete containers
    pub concrete_insertions: usize,
    /// Names recognised as static factory methods
    pub builder_names: Vec<String>,
    /// Name prefix of mutator methods
    pub mutator_prefix: String,
    /// Optional seed for the random source
    pub seed: Option<u64>,
}

impl Default for PopulatorConfig {
    fn default() -> Self {
        Self {
            recursion_budget: DEFAULT_RECURSION_BUDGET,
            container_budget: DEFAULT_RECURSION_BUDGET,
            max_depth: 12,
            string_length: DEFAULT_STRING_LENGTH,
            max_collection_size: 10,
            concrete_insertions: 10,
            builder_names: vec!["of".to_string()],
            mutator_prefix: "set".to_string(),
            seed: None,
        }
    }
}

impl PopulatorConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidMaxDepth(self.max_depth));
        }
        if self.max_collection_size == 0 {
            return Err(ConfigError::InvalidCollectionSize(self.max_collection_size));
        }
        if self.mutator_prefix.is_empty() {
            return Err(ConfigError::EmptyMutatorPrefix);
        }
        Ok(())
    }

    /// Builder names as string slices, in configured order
    pub fn builder_name_refs(&self) -> Vec<&str> {
        self.builder_names.iter().map(String::as_str).collect()
    }
}
