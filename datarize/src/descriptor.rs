//! Type descriptors: the structural shape of a populatable type.
//!
//! Rust has no runtime reflection, so every type the populator can build carries an explicit
//! descriptor table instead. A [`TypeDescriptor`] lists what kind of type it is (plain object,
//! enumeration or container) together with its constructors, static factory methods and
//! instance methods. Each entry is a closure over type-erased [`Args`], which keeps the engine
//! fully generic while the closures themselves stay strongly typed.
//!
//! Descriptors are usually produced by `#[derive(Describe)]`, but they can be written by hand:
//!
//! ```rust
//! use datarize::{Describe, TypeDescriptor, TypeRef, Visibility};
//!
//! struct Cat {
//!     name: String,
//! }
//!
//! impl Describe for Cat {
//!     fn describe() -> TypeDescriptor {
//!         TypeDescriptor::object::<Self>().static_method::<Self, _>(
//!             "of",
//!             Visibility::Public,
//!             vec![TypeRef::of::<String>()],
//!             |args| Ok(Cat { name: args.required()? }),
//!         )
//!     }
//! }
//! ```

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{InvokeError, PopulateError, PopulateResult};

/// A type-erased generated value
pub type AnyValue = Box<dyn Any + Send>;

/// Closure assembling a default-form container from its generated entries
pub type Collector = Box<dyn Fn(Vec<Args>) -> Result<AnyValue, InvokeError>>;

type StaticBody = Box<dyn Fn(&mut Args) -> Result<AnyValue, InvokeError>>;
type InstanceBody = Box<dyn Fn(&mut dyn Any, &mut Args) -> Result<(), InvokeError>>;

/// Types that can describe their own constructible shape
pub trait Describe: Any + Send + Sized {
    /// Build the descriptor table for this type
    fn describe() -> TypeDescriptor;

    /// Generic argument types, in declaration order (`[T]` for `Vec<T>`, `[K, V]` for maps)
    fn generic_args() -> Vec<TypeRef> {
        Vec::new()
    }
}

/// Handle to a describable type.
///
/// Creating a `TypeRef` never builds the descriptor, so self-referential types can mention
/// themselves in their own parameter lists.
#[derive(Clone)]
pub struct TypeRef {
    id: TypeId,
    name: &'static str,
    generics: Vec<TypeRef>,
    describe: fn() -> TypeDescriptor,
}

impl TypeRef {
    /// Handle for `T`
    pub fn of<T: Describe>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            generics: T::generic_args(),
            describe: T::describe,
        }
    }

    /// The type identity
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The fully qualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Generic argument types
    pub fn generics(&self) -> &[TypeRef] {
        &self.generics
    }

    /// Build the descriptor table
    pub fn descriptor(&self) -> TypeDescriptor {
        (self.describe)()
    }

    /// Whether this handle refers to `T`
    pub fn is<T: Any>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeRef {}

impl Hash for TypeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Access level of a constructor or method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Crate,
    Private,
}

impl Visibility {
    /// Whether member discovery may use this member
    pub fn is_accessible(self) -> bool {
        self != Visibility::Private
    }
}

/// Positional arguments handed to a descriptor closure.
///
/// Each slot is either a generated value or absent. Closures pull values in declaration order
/// with [`Args::required`] or [`Args::optional`].
pub struct Args {
    values: Vec<Option<AnyValue>>,
    cursor: usize,
}

impl Args {
    /// Wrap generated argument values
    pub fn new(values: Vec<Option<AnyValue>>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Number of argument slots
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no argument slots
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Take the next argument, failing if it is absent
    pub fn required<T: Any>(&mut self) -> Result<T, InvokeError> {
        let position = self.cursor;
        match self.take_next() {
            Some(value) => downcast_argument(position, value),
            None => Err(InvokeError::MissingArgument {
                position,
                expected: type_name::<T>(),
            }),
        }
    }

    /// Take the next argument, allowing it to be absent
    pub fn optional<T: Any>(&mut self) -> Result<Option<T>, InvokeError> {
        let position = self.cursor;
        self.take_next()
            .map(|value| downcast_argument(position, value))
            .transpose()
    }

    fn take_next(&mut self) -> Option<AnyValue> {
        let slot = self.values.get_mut(self.cursor).and_then(Option::take);
        self.cursor += 1;
        slot
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("len", &self.values.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}

fn downcast_argument<T: Any>(position: usize, value: AnyValue) -> Result<T, InvokeError> {
    value
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| InvokeError::ArgumentMismatch {
            position,
            expected: type_name::<T>(),
        })
}

pub(crate) fn downcast_value<T: Any>(value: AnyValue) -> PopulateResult<T> {
    value
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| PopulateError::TypeMismatch {
            expected: type_name::<T>(),
        })
}

/// A constructor entry
pub struct Constructor {
    visibility: Visibility,
    params: Vec<TypeRef>,
    body: StaticBody,
}

impl Constructor {
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }

    /// Invoke with generated argument values
    pub fn invoke(&self, args: Vec<Option<AnyValue>>) -> Result<AnyValue, InvokeError> {
        (self.body)(&mut Args::new(args))
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("visibility", &self.visibility)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

enum MethodBody {
    Static(StaticBody),
    Instance(InstanceBody),
}

/// A static or instance method entry
pub struct Method {
    name: &'static str,
    visibility: Visibility,
    params: Vec<TypeRef>,
    returns: Option<TypeRef>,
    body: MethodBody,
}

impl Method {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn params(&self) -> &[TypeRef] {
        &self.params
    }

    /// Declared return type of a static method
    pub fn returns(&self) -> Option<&TypeRef> {
        self.returns.as_ref()
    }

    pub fn is_static(&self) -> bool {
        matches!(self.body, MethodBody::Static(_))
    }

    /// Invoke a static method
    pub fn call_static(&self, args: Vec<Option<AnyValue>>) -> Result<AnyValue, InvokeError> {
        match &self.body {
            MethodBody::Static(body) => body(&mut Args::new(args)),
            MethodBody::Instance(_) => Err(InvokeError::failed(format!(
                "`{}` is an instance method",
                self.name
            ))),
        }
    }

    /// Invoke an instance method on `receiver`
    pub fn call(
        &self,
        receiver: &mut dyn Any,
        args: Vec<Option<AnyValue>>,
    ) -> Result<(), InvokeError> {
        match &self.body {
            MethodBody::Instance(body) => body(receiver, &mut Args::new(args)),
            MethodBody::Static(_) => Err(InvokeError::failed(format!(
                "`{}` is a static method",
                self.name
            ))),
        }
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("visibility", &self.visibility)
            .field("static", &self.is_static())
            .field("params", &self.params)
            .field("returns", &self.returns)
            .finish()
    }
}

/// Members of an enumeration
pub struct EnumShape {
    len: usize,
    member: Box<dyn Fn(usize) -> Option<AnyValue>>,
}

impl EnumShape {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The member at `index`, in declaration order
    pub fn member(&self, index: usize) -> Option<AnyValue> {
        (self.member)(index)
    }
}

/// Abstract container contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerKind {
    Sequence,
    Set,
    Map,
}

impl ContainerKind {
    /// Number of generic arguments (and inserter parameters)
    pub fn arity(self) -> usize {
        match self {
            ContainerKind::Map => 2,
            ContainerKind::Sequence | ContainerKind::Set => 1,
        }
    }

    /// Name of the method used to insert into a concrete form
    pub fn inserter_name(self) -> &'static str {
        match self {
            ContainerKind::Map => "put",
            ContainerKind::Sequence | ContainerKind::Set => "add",
        }
    }
}

/// Container shape; default forms carry a collector, concrete forms are filled through `add`/`put`
pub struct ContainerShape {
    kind: ContainerKind,
    collector: Option<Collector>,
}

impl ContainerShape {
    pub fn kind(&self) -> ContainerKind {
        self.kind
    }

    pub fn is_default_form(&self) -> bool {
        self.collector.is_some()
    }

    pub fn collector(&self) -> Option<&Collector> {
        self.collector.as_ref()
    }
}

/// What kind of type a descriptor describes
pub enum Shape {
    Object,
    Enum(EnumShape),
    Container(ContainerShape),
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Object => f.write_str("Object"),
            Shape::Enum(shape) => write!(f, "Enum({} members)", shape.len()),
            Shape::Container(shape) => write!(
                f,
                "Container({:?}, {})",
                shape.kind,
                if shape.is_default_form() {
                    "default"
                } else {
                    "concrete"
                }
            ),
        }
    }
}

/// Descriptor table of one type
pub struct TypeDescriptor {
    owner: TypeRef,
    shape: Shape,
    constructors: Vec<Constructor>,
    methods: Vec<Method>,
}

impl TypeDescriptor {
    fn with_shape<T: Describe>(shape: Shape) -> Self {
        Self {
            owner: TypeRef::of::<T>(),
            shape,
            constructors: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// A plain object with no members yet
    pub fn object<T: Describe>() -> Self {
        Self::with_shape::<T>(Shape::Object)
    }

    /// An enumeration with `len` members, produced by index
    pub fn enumeration<T, F>(len: usize, member: F) -> Self
    where
        T: Describe,
        F: Fn(usize) -> Option<T> + 'static,
    {
        Self::with_shape::<T>(Shape::Enum(EnumShape {
            len,
            member: Box::new(move |index| member(index).map(|value| Box::new(value) as AnyValue)),
        }))
    }

    /// An enumeration over explicit member values
    pub fn enumeration_of<T: Describe + Clone>(members: Vec<T>) -> Self {
        let len = members.len();
        Self::enumeration(len, move |index| members.get(index).cloned())
    }

    /// A default-form container assembled by `collect`
    pub fn default_container<T, F>(kind: ContainerKind, collect: F) -> Self
    where
        T: Describe,
        F: Fn(Vec<Args>) -> Result<T, InvokeError> + 'static,
    {
        let collector: Collector =
            Box::new(move |entries| collect(entries).map(|value| Box::new(value) as AnyValue));
        Self::with_shape::<T>(Shape::Container(ContainerShape {
            kind,
            collector: Some(collector),
        }))
    }

    /// A concrete container filled through its `add`/`put` method
    pub fn concrete_container<T: Describe>(kind: ContainerKind) -> Self {
        Self::with_shape::<T>(Shape::Container(ContainerShape {
            kind,
            collector: None,
        }))
    }

    /// Add a constructor
    pub fn constructor<T, F>(
        mut self,
        visibility: Visibility,
        params: Vec<TypeRef>,
        body: F,
    ) -> Self
    where
        T: Any + Send,
        F: Fn(&mut Args) -> Result<T, InvokeError> + 'static,
    {
        self.constructors.push(Constructor {
            visibility,
            params,
            body: Box::new(move |args| body(args).map(|value| Box::new(value) as AnyValue)),
        });
        self
    }

    /// Add a static method returning `R`
    pub fn static_method<R, F>(
        mut self,
        name: &'static str,
        visibility: Visibility,
        params: Vec<TypeRef>,
        body: F,
    ) -> Self
    where
        R: Describe,
        F: Fn(&mut Args) -> Result<R, InvokeError> + 'static,
    {
        self.methods.push(Method {
            name,
            visibility,
            params,
            returns: Some(TypeRef::of::<R>()),
            body: MethodBody::Static(Box::new(move |args| {
                body(args).map(|value| Box::new(value) as AnyValue)
            })),
        });
        self
    }

    /// Add an instance method on receivers of type `S`
    pub fn method<S, F>(
        mut self,
        name: &'static str,
        visibility: Visibility,
        params: Vec<TypeRef>,
        body: F,
    ) -> Self
    where
        S: Any,
        F: Fn(&mut S, &mut Args) -> Result<(), InvokeError> + 'static,
    {
        self.methods.push(Method {
            name,
            visibility,
            params,
            returns: None,
            body: MethodBody::Instance(Box::new(move |receiver, args| {
                let this = receiver
                    .downcast_mut::<S>()
                    .ok_or(InvokeError::ReceiverMismatch {
                        expected: type_name::<S>(),
                    })?;
                body(this, args)
            })),
        });
        self
    }

    /// The described type
    pub fn owner(&self) -> &TypeRef {
        &self.owner
    }

    pub fn type_name(&self) -> &'static str {
        self.owner.name()
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("owner", &self.owner)
            .field("shape", &self.shape)
            .field("constructors", &self.constructors)
            .field("methods", &self.methods)
            .finish()
    }
}
