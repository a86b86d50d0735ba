//! Member discovery over descriptor tables.
//!
//! Everything here is pure introspection: no values are generated and nothing is invoked.

use crate::descriptor::{Constructor, ContainerKind, Method, TypeDescriptor};

/// Find a static factory method producing exactly the described type.
///
/// Candidate names are tried in order; for each name the first matching method in declaration
/// order wins. Private methods are never considered.
pub fn find_builder_method<'a>(
    descriptor: &'a TypeDescriptor,
    candidate_names: &[&str],
) -> Option<&'a Method> {
    let owner = descriptor.owner();
    candidate_names.iter().find_map(|name| {
        descriptor.methods().iter().find(|method| {
            method.is_static()
                && method.visibility().is_accessible()
                && method.name() == *name
                && method.returns() == Some(owner)
        })
    })
}

/// Find the constructor used to build a described type.
///
/// A non-private zero-argument constructor is preferred; otherwise the first non-private
/// constructor with arguments is returned.
pub fn find_constructor(descriptor: &TypeDescriptor) -> Option<&Constructor> {
    let mut accessible = descriptor
        .constructors()
        .iter()
        .filter(|constructor| constructor.visibility().is_accessible());

    let first = accessible.next()?;
    if first.params().is_empty() {
        return Some(first);
    }
    accessible
        .find(|constructor| constructor.params().is_empty())
        .or(Some(first))
}

/// Single-parameter, non-private instance methods whose name starts with `prefix`
pub fn find_mutators<'a>(descriptor: &'a TypeDescriptor, prefix: &str) -> Vec<&'a Method> {
    descriptor
        .methods()
        .iter()
        .filter(|method| {
            !method.is_static()
                && method.visibility().is_accessible()
                && method.name().starts_with(prefix)
                && method.params().len() == 1
        })
        .collect()
}

/// The `add` / `put` method of a concrete container
pub fn find_inserter(descriptor: &TypeDescriptor, kind: ContainerKind) -> Option<&Method> {
    descriptor.methods().iter().find(|method| {
        !method.is_static()
            && method.visibility().is_accessible()
            && method.name() == kind.inserter_name()
            && method.params().len() == kind.arity()
    })
}
