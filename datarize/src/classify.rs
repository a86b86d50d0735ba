//! Decides how a type is going to be built.

use crate::descriptor::{ContainerKind, Shape, TypeDescriptor};
use crate::error::{PopulateError, PopulateResult};
use crate::generator::ValueGenerators;

/// Instantiation route for a type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Produced directly by a value generator
    Terminal,
    /// An enumeration with at least one member
    Enum,
    /// A sequence, set or map
    Container(ContainerKind),
    /// Built through constructors, builder methods and setters
    GeneralObject,
}

/// Classify a described type. Terminal types are checked first, so a registered generator
/// always wins over the descriptor's shape.
pub fn classify(
    generators: &ValueGenerators,
    descriptor: &TypeDescriptor,
) -> PopulateResult<Classification> {
    if generators.contains_id(descriptor.owner().id()) {
        return Ok(Classification::Terminal);
    }
    match descriptor.shape() {
        Shape::Enum(members) if members.is_empty() => {
            Err(PopulateError::empty_enum(descriptor.type_name()))
        }
        Shape::Enum(_) => Ok(Classification::Enum),
        Shape::Container(shape) => Ok(Classification::Container(shape.kind())),
        Shape::Object => Ok(Classification::GeneralObject),
    }
}
