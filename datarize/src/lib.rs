//! # Datarize - random fixtures for arbitrary types
//!
//! Datarize builds fully populated instances of domain types with plausible random values, so
//! tests can get throwaway valid objects without hand-written fixture code. Types describe their
//! constructible shape through the [`Describe`] trait, usually derived:
//!
//! ```rust
//! use datarize::{Describe, Populator};
//!
//! #[derive(Debug, Describe)]
//! #[describe(constructor)]
//! struct Order {
//!     id: String,
//!     quantity: i32,
//!     tags: Vec<String>,
//!     note: Option<String>,
//! }
//!
//! let populator = Populator::new();
//! let order = populator
//!     .instantiate::<Order>()
//!     .expect("no construction error")
//!     .expect("Order has a public constructor");
//!
//! assert_eq!(order.id.len(), 10);
//! assert!(order.quantity >= 0);
//! assert!((1..=10).contains(&order.tags.len()));
//! ```
//!
//! Instantiation tries, in order: a registered value generator for terminal types, a random
//! member for enumerations, a constructor, then a static factory method (`of` by default).
//! Every setter of the result is then called with a fresh value. Self-referential positions
//! spend a recursion budget (2 by default) and are left absent once it runs out.

extern crate self as datarize;

pub mod batch;
pub mod builder;
pub mod builtin;
pub mod classify;
pub mod config;
pub mod descriptor;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod generator;
pub mod resolver;
pub mod rng;

// Re-export the main public API
pub use batch::BatchConfig;
pub use builder::PopulatorBuilder;
pub use classify::{Classification, classify};
pub use config::{ConfigError, DEFAULT_RECURSION_BUDGET, DEFAULT_STRING_LENGTH, PopulatorConfig};
pub use descriptor::{
    AnyValue, Args, Collector, Constructor, ContainerKind, ContainerShape, Describe, EnumShape,
    Method, Shape, TypeDescriptor, TypeRef, Visibility,
};
pub use discovery::{find_builder_method, find_constructor, find_inserter, find_mutators};
pub use engine::{
    Populator, global, instantiate, instantiate_collection, instantiate_map, random_string,
};
pub use error::{InvokeError, PopulateError, PopulateResult};
pub use generator::{ValueGenerator, ValueGenerators};
pub use rng::{DefaultRngProvider, RngProvider, SharedRng};

// Re-export derive macro from separate crate when derive feature is enabled
#[cfg(feature = "derive")]
pub use datarize_derive::Describe;
