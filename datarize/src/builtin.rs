//! Descriptors for terminal value types and the standard containers.
//!
//! `Vec`, `HashSet` and `HashMap` are the default forms of their container kinds and are
//! assembled directly from generated entries. `VecDeque`, `LinkedList`, `BTreeSet` and `BTreeMap`
//! are concrete forms: the resolver builds them empty and fills them through `add` / `put`.

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::hash::Hash;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::descriptor::{Args, ContainerKind, Describe, TypeDescriptor, TypeRef, Visibility};
use crate::error::InvokeError;

macro_rules! describe_terminal {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Describe for $ty {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::object::<Self>()
                }
            }
        )*
    };
}

describe_terminal!(
    String,
    char,
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    u64,
    usize,
    f32,
    f64,
    Decimal,
    DateTime<Utc>,
    NaiveDate,
    NaiveTime,
    NaiveDateTime,
    Duration,
    (),
);

fn collect_elements<T, C>(entries: Vec<Args>) -> Result<C, InvokeError>
where
    T: Any,
    C: FromIterator<T>,
{
    entries
        .into_iter()
        .filter_map(|mut entry| entry.optional::<T>().transpose())
        .collect()
}

fn collect_entries<K, V, C>(entries: Vec<Args>) -> Result<C, InvokeError>
where
    K: Any,
    V: Any,
    C: FromIterator<(K, V)>,
{
    entries
        .into_iter()
        .filter_map(|mut entry| {
            let key = entry.optional::<K>();
            let value = entry.optional::<V>();
            match (key, value) {
                (Ok(Some(key)), Ok(Some(value))) => Some(Ok((key, value))),
                (Err(err), _) | (_, Err(err)) => Some(Err(err)),
                // absent keys or values are dropped
                _ => None,
            }
        })
        .collect()
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::default_container(ContainerKind::Sequence, collect_elements::<T, Self>)
            .constructor(Visibility::Public, Vec::new(), |_| Ok(Vec::<T>::new()))
            .method::<Self, _>(
                "add",
                Visibility::Public,
                vec![TypeRef::of::<T>()],
                |this, args| {
                    if let Some(value) = args.optional::<T>()? {
                        this.push(value);
                    }
                    Ok(())
                },
            )
    }

    fn generic_args() -> Vec<TypeRef> {
        vec![TypeRef::of::<T>()]
    }
}

impl<T: Describe + Eq + Hash> Describe for HashSet<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::default_container(ContainerKind::Set, collect_elements::<T, Self>)
            .constructor(Visibility::Public, Vec::new(), |_| Ok(HashSet::<T>::new()))
            .method::<Self, _>(
                "add",
                Visibility::Public,
                vec![TypeRef::of::<T>()],
                |this, args| {
                    if let Some(value) = args.optional::<T>()? {
                        this.insert(value);
                    }
                    Ok(())
                },
            )
    }

    fn generic_args() -> Vec<TypeRef> {
        vec![TypeRef::of::<T>()]
    }
}

impl<K, V> Describe for HashMap<K, V>
where
    K: Describe + Eq + Hash,
    V: Describe,
{
    fn describe() -> TypeDescriptor {
        TypeDescriptor::default_container(ContainerKind::Map, collect_entries::<K, V, Self>)
            .constructor(Visibility::Public, Vec::new(), |_| Ok(HashMap::<K, V>::new()))
            .method::<Self, _>(
                "put",
                Visibility::Public,
                vec![TypeRef::of::<K>(), TypeRef::of::<V>()],
                |this, args| {
                    if let (Some(key), Some(value)) = (args.optional::<K>()?, args.optional::<V>()?)
                    {
                        this.insert(key, value);
                    }
                    Ok(())
                },
            )
    }

    fn generic_args() -> Vec<TypeRef> {
        vec![TypeRef::of::<K>(), TypeRef::of::<V>()]
    }
}

impl<T: Describe> Describe for VecDeque<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::concrete_container::<Self>(ContainerKind::Sequence)
            .constructor(Visibility::Public, Vec::new(), |_| Ok(VecDeque::<T>::new()))
            .method::<Self, _>(
                "add",
                Visibility::Public,
                vec![TypeRef::of::<T>()],
                |this, args| {
                    if let Some(value) = args.optional::<T>()? {
                        this.push_back(value);
                    }
                    Ok(())
                },
            )
    }

    fn generic_args() -> Vec<TypeRef> {
        vec![TypeRef::of::<T>()]
    }
}

impl<T: Describe> Describe for LinkedList<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::concrete_container::<Self>(ContainerKind::Sequence)
            .constructor(Visibility::Public, Vec::new(), |_| Ok(LinkedList::<T>::new()))
            .method::<Self, _>(
                "add",
                Visibility::Public,
                vec![TypeRef::of::<T>()],
                |this, args| {
                    if let Some(value) = args.optional::<T>()? {
                        this.push_back(value);
                    }
                    Ok(())
                },
            )
    }

    fn generic_args() -> Vec<TypeRef> {
        vec![TypeRef::of::<T>()]
    }
}

impl<T: Describe + Ord> Describe for BTreeSet<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::concrete_container::<Self>(ContainerKind::Set)
            .constructor(Visibility::Public, Vec::new(), |_| Ok(BTreeSet::<T>::new()))
            .method::<Self, _>(
                "add",
                Visibility::Public,
                vec![TypeRef::of::<T>()],
                |this, args| {
                    if let Some(value) = args.optional::<T>()? {
                        this.insert(value);
                    }
                    Ok(())
                },
            )
    }

    fn generic_args() -> Vec<TypeRef> {
        vec![TypeRef::of::<T>()]
    }
}

impl<K, V> Describe for BTreeMap<K, V>
where
    K: Describe + Ord,
    V: Describe,
{
    fn describe() -> TypeDescriptor {
        TypeDescriptor::concrete_container::<Self>(ContainerKind::Map)
            .constructor(Visibility::Public, Vec::new(), |_| Ok(BTreeMap::<K, V>::new()))
            .method::<Self, _>(
                "put",
                Visibility::Public,
                vec![TypeRef::of::<K>(), TypeRef::of::<V>()],
                |this, args| {
                    if let (Some(key), Some(value)) = (args.optional::<K>()?, args.optional::<V>()?)
                    {
                        this.insert(key, value);
                    }
                    Ok(())
                },
            )
    }

    fn generic_args() -> Vec<TypeRef> {
        vec![TypeRef::of::<K>(), TypeRef::of::<V>()]
    }
}
