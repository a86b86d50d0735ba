//! The instantiation engine.
//!
//! [`Populator`] classifies a requested type and dispatches to one of the construction
//! strategies: terminal generator, enumeration member, constructor or builder method, followed by
//! mutator injection on the result. Parameters are filled recursively, and the recursion budget
//! for self-referential positions travels with every call in a [`Frame`].

use std::any::{Any, TypeId};
use std::sync::OnceLock;

use rand::{Rng, RngCore};
use tracing::{debug, trace};

use crate::builder::PopulatorBuilder;
use crate::classify::{Classification, classify};
use crate::config::PopulatorConfig;
use crate::descriptor::{
    AnyValue, Describe, EnumShape, Shape, TypeDescriptor, TypeRef, downcast_value,
};
use crate::discovery;
use crate::error::{PopulateError, PopulateResult};
use crate::generator::{self, ValueGenerators};
use crate::rng::SharedRng;

/// Per-call recursion state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Frame {
    /// Remaining budget for self-referential positions
    pub(crate) recursion: u32,
    /// Nesting depth below the top-level request
    pub(crate) depth: usize,
}

impl Frame {
    pub(crate) fn root(recursion: u32) -> Self {
        Self {
            recursion,
            depth: 0,
        }
    }

    pub(crate) fn child(self, recursion: u32) -> Self {
        Self {
            recursion,
            depth: self.depth + 1,
        }
    }
}

/// Random object populator.
///
/// A populator owns its configuration, the terminal value generators and the shared random
/// source. It is `Send + Sync`, so one instance can serve any number of threads.
#[derive(Debug)]
pub struct Populator {
    config: PopulatorConfig,
    generators: ValueGenerators,
    rng: SharedRng,
}

impl Default for Populator {
    fn default() -> Self {
        Self::new()
    }
}

impl Populator {
    /// Populator with the default configuration and an entropy-seeded random source
    pub fn new() -> Self {
        Self {
            config: PopulatorConfig::default(),
            generators: ValueGenerators::standard(),
            rng: SharedRng::from_entropy(),
        }
    }

    /// Populator with a validated configuration; a configured seed makes the random source
    /// repeatable
    pub fn with_config(config: PopulatorConfig) -> PopulateResult<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => SharedRng::seeded(seed),
            None => SharedRng::from_entropy(),
        };
        Ok(Self {
            config,
            generators: ValueGenerators::standard(),
            rng,
        })
    }

    /// Replace the random source
    pub fn with_rng<R: RngCore + Send + 'static>(mut self, rng: R) -> Self {
        self.rng = SharedRng::from_rng(rng);
        self
    }

    /// Fluent builder for a customized populator
    pub fn builder() -> PopulatorBuilder {
        PopulatorBuilder::new()
    }

    pub(crate) fn from_parts(
        config: PopulatorConfig,
        generators: ValueGenerators,
        rng: SharedRng,
    ) -> Self {
        Self {
            config,
            generators,
            rng,
        }
    }

    pub fn config(&self) -> &PopulatorConfig {
        &self.config
    }

    pub fn generators(&self) -> &ValueGenerators {
        &self.generators
    }

    /// Instantiate `T` with the default recursion budget.
    ///
    /// `Ok(None)` means no strategy could produce a value. Errors are construction errors (an
    /// empty enumeration or a failing builder method) or failures raised by constructors and
    /// mutators.
    pub fn instantiate<T: Describe>(&self) -> PopulateResult<Option<T>> {
        self.instantiate_with_budget(self.config.recursion_budget)
    }

    /// Instantiate `T`, allowing `budget` levels of self-reference
    pub fn instantiate_with_budget<T: Describe>(&self, budget: u32) -> PopulateResult<Option<T>> {
        let value = self.instantiate_in(&TypeRef::of::<T>(), Frame::root(budget))?;
        value.map(downcast_value::<T>).transpose()
    }

    /// Type-erased instantiation with the default recursion budget
    pub fn instantiate_type(&self, ty: &TypeRef) -> PopulateResult<Option<AnyValue>> {
        self.instantiate_in(ty, Frame::root(self.config.recursion_budget))
    }

    /// Value of a terminal type, or `None` when no generator is registered for `T`.
    /// Never recurses.
    pub fn instantiate_from_base_objects<T: Any>(&self) -> Option<T> {
        self.generate_terminal(TypeId::of::<T>())
            .and_then(|value| downcast_value::<T>(value).ok())
    }

    /// Uniformly chosen member of an enumeration.
    ///
    /// Returns `Ok(None)` when `T` is not an enumeration and [`PopulateError::EmptyEnum`] when it
    /// has no members.
    pub fn instantiate_from_enum<T: Describe>(&self) -> PopulateResult<Option<T>> {
        let descriptor = T::describe();
        let Shape::Enum(members) = descriptor.shape() else {
            return Ok(None);
        };
        let value = self.pick_member(descriptor.type_name(), members)?;
        value.map(downcast_value::<T>).transpose()
    }

    /// Alphanumeric random string of exactly `length` characters
    pub fn random_string(&self, length: usize) -> String {
        self.rng.with(|rng| generator::random_string(rng, length))
    }

    pub(crate) fn within_depth(&self, type_name: &'static str, frame: Frame) -> bool {
        if frame.depth > self.config.max_depth {
            debug!(
                type_name,
                depth = frame.depth,
                max_depth = self.config.max_depth,
                "maximum depth reached, leaving position absent"
            );
            return false;
        }
        true
    }

    pub(crate) fn instantiate_in(
        &self,
        ty: &TypeRef,
        frame: Frame,
    ) -> PopulateResult<Option<AnyValue>> {
        if let Some(value) = self.generate_terminal(ty.id()) {
            return Ok(Some(value));
        }
        if !self.within_depth(ty.name(), frame) {
            return Ok(None);
        }
        self.build(&ty.descriptor(), frame)
    }

    pub(crate) fn build(
        &self,
        descriptor: &TypeDescriptor,
        frame: Frame,
    ) -> PopulateResult<Option<AnyValue>> {
        let classification = classify(&self.generators, descriptor)?;
        trace!(
            type_name = descriptor.type_name(),
            ?classification,
            recursion = frame.recursion,
            depth = frame.depth,
            "instantiating"
        );

        match classification {
            Classification::Terminal => Ok(self.generate_terminal(descriptor.owner().id())),
            Classification::Enum => match descriptor.shape() {
                Shape::Enum(members) => self.pick_member(descriptor.type_name(), members),
                _ => Ok(None),
            },
            Classification::Container(_) | Classification::GeneralObject => {
                let mut instance = self.from_constructor(descriptor, frame)?;
                if instance.is_none() {
                    instance = self.from_builder(descriptor, frame)?;
                }
                let Some(mut instance) = instance else {
                    debug!(
                        type_name = descriptor.type_name(),
                        "no constructor or builder method available"
                    );
                    return Ok(None);
                };
                if !matches!(classification, Classification::Container(_)) {
                    self.inject_mutators(descriptor, &mut instance, frame)?;
                }
                Ok(Some(instance))
            }
        }
    }

    fn generate_terminal(&self, id: TypeId) -> Option<AnyValue> {
        if !self.generators.contains_id(id) {
            return None;
        }
        self.rng
            .with(|rng| self.generators.generate(id, rng, &self.config))
    }

    fn pick_member(
        &self,
        type_name: &'static str,
        members: &EnumShape,
    ) -> PopulateResult<Option<AnyValue>> {
        if members.is_empty() {
            return Err(PopulateError::empty_enum(type_name));
        }
        let index = self.rng.with(|rng| rng.gen_range(0..members.len()));
        Ok(members.member(index))
    }

    pub(crate) fn from_constructor(
        &self,
        descriptor: &TypeDescriptor,
        frame: Frame,
    ) -> PopulateResult<Option<AnyValue>> {
        let Some(constructor) = discovery::find_constructor(descriptor) else {
            return Ok(None);
        };
        debug!(
            type_name = descriptor.type_name(),
            params = constructor.params().len(),
            "using constructor"
        );
        let args = self.arguments(descriptor.owner(), constructor.params(), frame)?;
        constructor
            .invoke(args)
            .map(Some)
            .map_err(|source| PopulateError::ConstructorFailed {
                type_name: descriptor.type_name(),
                source,
            })
    }

    fn from_builder(
        &self,
        descriptor: &TypeDescriptor,
        frame: Frame,
    ) -> PopulateResult<Option<AnyValue>> {
        let names = self.config.builder_name_refs();
        let Some(method) = discovery::find_builder_method(descriptor, &names) else {
            return Ok(None);
        };
        debug!(
            type_name = descriptor.type_name(),
            method = method.name(),
            recursion = frame.recursion,
            "using builder method"
        );
        let args = self.arguments(descriptor.owner(), method.params(), frame)?;
        method.call_static(args).map(Some).map_err(|source| {
            PopulateError::builder_failed(
                descriptor.type_name(),
                method.name(),
                frame.recursion,
                source,
            )
        })
    }

    fn arguments(
        &self,
        owner: &TypeRef,
        params: &[TypeRef],
        frame: Frame,
    ) -> PopulateResult<Vec<Option<AnyValue>>> {
        params
            .iter()
            .map(|param| self.argument(owner, param, frame))
            .collect()
    }

    /// Value for one parameter declared by `owner`.
    ///
    /// Self-referential parameters spend one unit of the budget, and so do containers of the
    /// declaring type. Other containers go to the resolver with the container budget. Everything
    /// else starts over with the default budget.
    fn argument(
        &self,
        owner: &TypeRef,
        param: &TypeRef,
        frame: Frame,
    ) -> PopulateResult<Option<AnyValue>> {
        if param == owner {
            if frame.recursion == 0 {
                debug!(
                    type_name = owner.name(),
                    "recursion budget exhausted, leaving argument absent"
                );
                return Ok(None);
            }
            return self.instantiate_in(param, frame.child(frame.recursion - 1));
        }
        if param.generics().contains(owner) {
            let descriptor = param.descriptor();
            if matches!(descriptor.shape(), Shape::Container(_)) {
                if frame.recursion == 0 {
                    debug!(
                        type_name = owner.name(),
                        "recursion budget exhausted, leaving container empty"
                    );
                    return self.empty_container(&descriptor, frame);
                }
                return self.resolve_for(
                    &descriptor,
                    frame.child(frame.recursion - 1),
                    Some(owner),
                );
            }
        }
        self.fresh_value(param, frame)
    }

    /// Value for a position that does not refer back to its declaring type
    pub(crate) fn fresh_value(
        &self,
        ty: &TypeRef,
        frame: Frame,
    ) -> PopulateResult<Option<AnyValue>> {
        if let Some(value) = self.generate_terminal(ty.id()) {
            return Ok(Some(value));
        }
        let descriptor = ty.descriptor();
        if matches!(descriptor.shape(), Shape::Container(_)) {
            self.resolve(&descriptor, frame.child(self.config.container_budget))
        } else if self.within_depth(ty.name(), frame.child(self.config.recursion_budget)) {
            self.build(&descriptor, frame.child(self.config.recursion_budget))
        } else {
            Ok(None)
        }
    }

    /// Call every discovered setter on a freshly built instance.
    ///
    /// The pass budget drops by one at the first self-referential setter only; once it is zero,
    /// self-referential setters are skipped.
    fn inject_mutators(
        &self,
        descriptor: &TypeDescriptor,
        instance: &mut AnyValue,
        frame: Frame,
    ) -> PopulateResult<()> {
        let owner = descriptor.owner();
        let mut budget = frame.recursion;
        let mut decremented = false;

        for mutator in discovery::find_mutators(descriptor, &self.config.mutator_prefix) {
            let param = &mutator.params()[0];
            let argument = if param == owner {
                if !decremented {
                    budget = budget.saturating_sub(1);
                    decremented = true;
                }
                if budget == 0 {
                    trace!(
                        type_name = descriptor.type_name(),
                        method = mutator.name(),
                        "skipping self-referential setter"
                    );
                    continue;
                }
                self.instantiate_in(param, frame.child(budget))?
            } else {
                self.fresh_value(param, frame)?
            };

            trace!(
                type_name = descriptor.type_name(),
                method = mutator.name(),
                present = argument.is_some(),
                "invoking setter"
            );
            mutator
                .call(&mut **instance, vec![argument])
                .map_err(|source| PopulateError::MutatorFailed {
                    type_name: descriptor.type_name(),
                    method: mutator.name(),
                    source,
                })?;
        }
        Ok(())
    }

    pub(crate) fn draw<T>(&self, f: impl FnOnce(&mut dyn RngCore) -> T) -> T {
        self.rng.with(f)
    }
}

static GLOBAL: OnceLock<Populator> = OnceLock::new();

/// Process-wide populator with the default configuration, created on first use
pub fn global() -> &'static Populator {
    GLOBAL.get_or_init(Populator::new)
}

/// Instantiate `T` with the process-wide populator
pub fn instantiate<T: Describe>() -> PopulateResult<Option<T>> {
    global().instantiate()
}

/// Populate a sequence or set with the process-wide populator
pub fn instantiate_collection<C: Describe>() -> PopulateResult<Option<C>> {
    global().instantiate_collection()
}

/// Populate a map with the process-wide populator
pub fn instantiate_map<M: Describe>() -> PopulateResult<Option<M>> {
    global().instantiate_map()
}

/// Alphanumeric random string from the process-wide populator
pub fn random_string(length: usize) -> String {
    global().random_string(length)
}
