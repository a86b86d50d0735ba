//! Population of generic containers.
//!
//! Default forms receive a random number of entries between one and `max_collection_size`,
//! assembled through their collector. Concrete forms are built empty by the constructor strategy
//! and then receive exactly `concrete_insertions` calls to their `add` / `put` method.

use rand::Rng;
use tracing::{debug, trace};

use crate::descriptor::{
    AnyValue, Args, ContainerKind, ContainerShape, Describe, Shape, TypeDescriptor, TypeRef,
    downcast_value,
};
use crate::discovery;
use crate::engine::{Frame, Populator};
use crate::error::{PopulateError, PopulateResult};

impl Populator {
    /// Populate a sequence or set type `C`, whose element type is its generic argument.
    ///
    /// Returns `Ok(None)` when `C` is not a sequence or set container.
    pub fn instantiate_collection<C: Describe>(&self) -> PopulateResult<Option<C>> {
        self.instantiate_container::<C>(|kind| kind != ContainerKind::Map)
    }

    /// Populate a map type `M`, whose key and value types are its generic arguments.
    ///
    /// Returns `Ok(None)` when `M` is not a map container.
    pub fn instantiate_map<M: Describe>(&self) -> PopulateResult<Option<M>> {
        self.instantiate_container::<M>(|kind| kind == ContainerKind::Map)
    }

    fn instantiate_container<C: Describe>(
        &self,
        accepts: impl FnOnce(ContainerKind) -> bool,
    ) -> PopulateResult<Option<C>> {
        let descriptor = C::describe();
        let accepted = match descriptor.shape() {
            Shape::Container(shape) => accepts(shape.kind()),
            _ => false,
        };
        if !accepted {
            debug!(
                type_name = descriptor.type_name(),
                "not a container of the requested kind"
            );
            return Ok(None);
        }
        let value = self.resolve(&descriptor, Frame::root(self.config().container_budget))?;
        value.map(downcast_value::<C>).transpose()
    }

    /// Populate a described container, or `Ok(None)` if it cannot be populated
    pub(crate) fn resolve(
        &self,
        descriptor: &TypeDescriptor,
        frame: Frame,
    ) -> PopulateResult<Option<AnyValue>> {
        self.resolve_for(descriptor, frame, None)
    }

    /// Populate a container declared by `owner`.
    ///
    /// Elements, keys or values of the owner's own type are built with the frame's recursion
    /// budget instead of a fresh one. Past `max_depth` the container is left empty.
    pub(crate) fn resolve_for(
        &self,
        descriptor: &TypeDescriptor,
        frame: Frame,
        owner: Option<&TypeRef>,
    ) -> PopulateResult<Option<AnyValue>> {
        let Shape::Container(shape) = descriptor.shape() else {
            return Ok(None);
        };
        let generics = descriptor.owner().generics();
        if generics.len() != shape.kind().arity() {
            debug!(
                type_name = descriptor.type_name(),
                expected = shape.kind().arity(),
                found = generics.len(),
                "container generic arity mismatch"
            );
            return Ok(None);
        }
        if !self.within_depth(descriptor.type_name(), frame) {
            return self.empty_container(descriptor, frame);
        }

        if shape.is_default_form() {
            self.fill_default(descriptor, shape, generics, frame, owner)
        } else {
            self.fill_concrete(descriptor, shape, generics, frame, owner)
        }
    }

    /// The container as its zero-argument constructor leaves it
    pub(crate) fn empty_container(
        &self,
        descriptor: &TypeDescriptor,
        frame: Frame,
    ) -> PopulateResult<Option<AnyValue>> {
        trace!(type_name = descriptor.type_name(), "leaving container empty");
        self.from_constructor(descriptor, frame)
    }

    fn fill_default(
        &self,
        descriptor: &TypeDescriptor,
        shape: &ContainerShape,
        generics: &[TypeRef],
        frame: Frame,
        owner: Option<&TypeRef>,
    ) -> PopulateResult<Option<AnyValue>> {
        let Some(collect) = shape.collector() else {
            return Ok(None);
        };
        let max = self.config().max_collection_size;
        let size = self.draw(|rng| rng.gen_range(1..=max));
        trace!(type_name = descriptor.type_name(), size, "filling default container");

        let entries = (0..size)
            .map(|_| self.entry(generics, frame, owner).map(Args::new))
            .collect::<PopulateResult<Vec<_>>>()?;
        collect(entries)
            .map(Some)
            .map_err(|source| PopulateError::ContainerFailed {
                type_name: descriptor.type_name(),
                source,
            })
    }

    fn fill_concrete(
        &self,
        descriptor: &TypeDescriptor,
        shape: &ContainerShape,
        generics: &[TypeRef],
        frame: Frame,
        owner: Option<&TypeRef>,
    ) -> PopulateResult<Option<AnyValue>> {
        let empty = Frame {
            recursion: frame.recursion.saturating_sub(1),
            ..frame
        };
        let Some(mut instance) = self.from_constructor(descriptor, empty)? else {
            debug!(
                type_name = descriptor.type_name(),
                "concrete container has no usable constructor"
            );
            return Ok(None);
        };
        let Some(inserter) = discovery::find_inserter(descriptor, shape.kind()) else {
            debug!(
                type_name = descriptor.type_name(),
                inserter = shape.kind().inserter_name(),
                "concrete container has no inserter, leaving it empty"
            );
            return Ok(Some(instance));
        };

        let insertions = self.config().concrete_insertions;
        trace!(
            type_name = descriptor.type_name(),
            insertions, "filling concrete container"
        );
        for _ in 0..insertions {
            let entry = self.entry(generics, frame, owner)?;
            inserter
                .call(&mut *instance, entry)
                .map_err(|source| PopulateError::ContainerFailed {
                    type_name: descriptor.type_name(),
                    source,
                })?;
        }
        Ok(Some(instance))
    }

    /// One independently generated value per generic argument
    fn entry(
        &self,
        generics: &[TypeRef],
        frame: Frame,
        owner: Option<&TypeRef>,
    ) -> PopulateResult<Vec<Option<AnyValue>>> {
        generics
            .iter()
            .map(|element| match owner {
                Some(owner) if element == owner => {
                    self.instantiate_in(element, frame.child(frame.recursion))
                }
                _ => self.fresh_value(element, frame),
            })
            .collect()
    }
}
