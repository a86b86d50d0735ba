//! End-to-end population of derived fixture types

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, LinkedList, VecDeque};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use datarize::{Describe, PopulateError, Populator, PopulatorConfig};
use rust_decimal::Decimal;

fn populator() -> Populator {
    Populator::new()
}

fn is_alphanumeric(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric())
}

// Constructor fixtures

#[derive(Debug, Default, Describe)]
#[describe(default)]
struct EmptyConstructor {
    marker: Option<String>,
}

#[derive(Debug, Default, Describe)]
#[describe(default, setters)]
struct EmptyConstructorWithSetter {
    string_value: Option<String>,
    count: i32,
}

#[derive(Debug, Describe)]
struct WithStringList {
    string_list: Vec<String>,
}

#[derive(Debug, Describe)]
struct WithStringSet {
    string_set: HashSet<String>,
}

#[derive(Debug, Describe)]
struct WithStringDeque {
    string_deque: VecDeque<String>,
}

#[derive(Debug, Describe)]
struct WithStringMap {
    string_integer_map: HashMap<String, i32>,
}

#[derive(Debug, Describe)]
struct WithStringTreeMap {
    string_integer_tree_map: BTreeMap<String, i32>,
}

#[derive(Debug, Describe)]
struct WithNestedList {
    nested: Vec<WithStringList>,
}

#[derive(Debug, Describe)]
struct Tuple(String, i64, Option<bool>);

#[test]
fn test_empty_constructor() {
    let value = populator()
        .instantiate::<EmptyConstructor>()
        .expect("no error")
        .expect("zero-argument constructor");
    assert!(value.marker.is_none());
}

#[test]
fn test_empty_constructor_and_setter() {
    let value = populator()
        .instantiate::<EmptyConstructorWithSetter>()
        .expect("no error")
        .expect("zero-argument constructor");
    let text = value.string_value.expect("setter was called");
    assert!(is_alphanumeric(&text));
    assert!(value.count >= 0);
}

#[test]
fn test_constructor_with_list() {
    let value = populator()
        .instantiate::<WithStringList>()
        .expect("no error")
        .expect("constructor");
    assert!((1..=10).contains(&value.string_list.len()));
    assert!(value.string_list.iter().all(|s| is_alphanumeric(s)));
}

#[test]
fn test_constructor_with_set() {
    let value = populator()
        .instantiate::<WithStringSet>()
        .expect("no error")
        .expect("constructor");
    assert!(!value.string_set.is_empty());
    assert!(value.string_set.len() <= 10);
}

#[test]
fn test_constructor_with_concrete_sequence() {
    let value = populator()
        .instantiate::<WithStringDeque>()
        .expect("no error")
        .expect("constructor");
    assert_eq!(value.string_deque.len(), 10);
}

#[test]
fn test_constructor_with_maps() {
    let value = populator()
        .instantiate::<WithStringMap>()
        .expect("no error")
        .expect("constructor");
    assert!(!value.string_integer_map.is_empty());

    let value = populator()
        .instantiate::<WithStringTreeMap>()
        .expect("no error")
        .expect("constructor");
    assert!(!value.string_integer_tree_map.is_empty());
}

#[test]
fn test_constructor_with_list_of_objects() {
    let value = populator()
        .instantiate::<WithNestedList>()
        .expect("no error")
        .expect("constructor");
    assert!(!value.nested.is_empty());
    assert!(value.nested.iter().all(|inner| !inner.string_list.is_empty()));
}

#[test]
fn test_tuple_struct_constructor() {
    let Tuple(text, _, _) = populator()
        .instantiate::<Tuple>()
        .expect("no error")
        .expect("constructor");
    assert_eq!(text.len(), 10);
}

// Builder fixtures

#[derive(Debug, Describe)]
#[describe(builder = "of")]
struct EmptyOfBuilder;

#[derive(Debug, Describe)]
#[describe(constructor = "private", builder = "of")]
struct NonEmptyBuilder {
    name: String,
}

#[derive(Debug, Describe)]
#[describe(builder = "create")]
struct NonDefaultBuilder {
    name: String,
}

#[derive(Debug, Describe)]
#[describe(builder = "of")]
struct BuilderWithLists {
    string_list: Vec<String>,
    integer_list: Vec<i32>,
}

#[derive(Debug, Describe)]
#[describe(builder = "of")]
struct BuilderWithListOfList {
    list_of_lists_of_integers: Vec<Vec<i32>>,
}

#[derive(Debug, Describe)]
#[describe(builder = "of")]
struct BuilderWithListOfSet {
    list_of_sets_of_integers: Vec<HashSet<i32>>,
}

#[derive(Debug, Describe)]
#[describe(builder = "of")]
struct BuilderWithListOfMap {
    list_of_map_of_string_integers: Vec<HashMap<String, i32>>,
}

#[derive(Debug, Describe)]
#[describe(builder = "of")]
struct BuilderWithMap {
    string_integer_map: HashMap<String, i32>,
}

#[test]
fn test_empty_builder() {
    let value = populator().instantiate::<EmptyOfBuilder>().expect("no error");
    assert!(value.is_some());
}

#[test]
fn test_non_empty_builder() {
    let value = populator()
        .instantiate::<NonEmptyBuilder>()
        .expect("no error")
        .expect("`of` builder");
    assert_eq!(value.name.len(), 10);
}

#[test]
fn test_builder_name_must_be_a_candidate() {
    assert!(
        populator()
            .instantiate::<NonDefaultBuilder>()
            .expect("no error")
            .is_none()
    );

    let populator = Populator::builder()
        .builder_name("create")
        .build()
        .expect("valid configuration");
    let value = populator
        .instantiate::<NonDefaultBuilder>()
        .expect("no error")
        .expect("`create` builder");
    assert!(is_alphanumeric(&value.name));
}

#[test]
fn test_builder_with_lists() {
    let value = populator()
        .instantiate::<BuilderWithLists>()
        .expect("no error")
        .expect("builder");
    assert!(!value.string_list.is_empty());
    assert!(!value.integer_list.is_empty());
}

#[test]
fn test_builder_with_nested_containers() {
    let value = populator()
        .instantiate::<BuilderWithListOfList>()
        .expect("no error")
        .expect("builder");
    assert!(!value.list_of_lists_of_integers[0].is_empty());

    let value = populator()
        .instantiate::<BuilderWithListOfSet>()
        .expect("no error")
        .expect("builder");
    assert!(!value.list_of_sets_of_integers[0].is_empty());

    let value = populator()
        .instantiate::<BuilderWithListOfMap>()
        .expect("no error")
        .expect("builder");
    assert!(!value.list_of_map_of_string_integers.is_empty());
    assert!(!value.list_of_map_of_string_integers[0].is_empty());

    let value = populator()
        .instantiate::<BuilderWithMap>()
        .expect("no error")
        .expect("builder");
    assert!(!value.string_integer_map.is_empty());
}

// Recursive fixtures

#[derive(Debug, Describe)]
#[describe(builder = "of")]
struct RecursiveRequired {
    inner: Box<RecursiveRequired>,
}

#[derive(Debug, Describe)]
#[describe(builder = "of")]
struct RecursiveOptional {
    label: String,
    next: Option<Box<RecursiveOptional>>,
}

impl RecursiveOptional {
    fn chain_len(&self) -> usize {
        1 + self.next.as_ref().map_or(0, |next| next.chain_len())
    }
}

#[derive(Debug, Default, Describe)]
#[describe(default, setters)]
struct RecursiveSetter {
    name: Option<String>,
    parent: Option<Box<RecursiveSetter>>,
}

#[test]
fn test_recursive_required_builder_fails() {
    let error = populator()
        .instantiate::<RecursiveRequired>()
        .expect_err("required self reference cannot be satisfied");
    assert!(error.is_construction_error());
    assert!(matches!(error, PopulateError::BuilderFailed { .. }));
    assert_eq!(error.recursion(), Some(0));
}

#[test]
fn test_recursive_optional_builder_ends_absent() {
    let value = populator()
        .instantiate::<RecursiveOptional>()
        .expect("optional recursion succeeds")
        .expect("builder");
    assert_eq!(value.chain_len(), 3);

    let innermost = value
        .next
        .as_ref()
        .and_then(|next| next.next.as_ref())
        .expect("two nested levels");
    assert!(innermost.next.is_none());
}

#[test]
fn test_recursive_setter() {
    let value = populator()
        .instantiate::<RecursiveSetter>()
        .expect("no error")
        .expect("default constructor");
    assert!(value.name.is_some());
    let parent = value.parent.expect("one level of self reference");
    assert!(parent.name.is_some());
    assert!(parent.parent.is_none());
}

#[derive(Debug, Default, Describe)]
#[describe(default, setters)]
struct Pair {
    left: Option<Box<Pair>>,
    right: Option<Box<Pair>>,
}

#[test]
fn test_setter_pass_spends_budget_once() {
    let pair = populator()
        .instantiate::<Pair>()
        .expect("no error")
        .expect("default constructor");
    let left = pair.left.expect("left at the top level");
    let right = pair.right.expect("right at the top level");
    for inner in [left, right] {
        assert!(inner.left.is_none());
        assert!(inner.right.is_none());
    }
}

#[derive(Debug, Describe)]
struct Tree {
    label: String,
    children: Vec<Tree>,
}

impl Tree {
    fn height(&self) -> usize {
        1 + self.children.iter().map(Tree::height).max().unwrap_or(0)
    }
}

#[test]
fn test_tree_of_own_type_spends_budget() {
    let tree = Populator::builder()
        .seed(1)
        .build()
        .expect("valid configuration")
        .instantiate::<Tree>()
        .expect("no error")
        .expect("constructor");
    assert_eq!(tree.height(), 3);
    assert!(!tree.children.is_empty());
    for child in &tree.children {
        assert!(!child.children.is_empty());
        assert!(child.children.iter().all(|leaf| leaf.children.is_empty()));
    }
}

#[test]
fn test_tree_past_max_depth_is_left_empty() {
    let tree = Populator::builder()
        .max_depth(2)
        .build()
        .expect("valid configuration")
        .instantiate_with_budget::<Tree>(5)
        .expect("no error")
        .expect("constructor");
    assert_eq!(tree.height(), 2);
    assert!(tree.children.iter().all(|child| is_alphanumeric(&child.label)));
}

#[derive(Debug, Describe)]
struct Alpha {
    name: String,
    beta: Option<Box<Beta>>,
}

#[derive(Debug, Describe)]
struct Beta {
    alpha: Option<Box<Alpha>>,
}

impl Alpha {
    fn levels(&self) -> usize {
        1 + self
            .beta
            .as_ref()
            .and_then(|beta| beta.alpha.as_ref())
            .map_or(0, |alpha| alpha.levels())
    }
}

#[test]
fn test_indirect_cycle_stops_at_max_depth() {
    let alpha = populator()
        .instantiate::<Alpha>()
        .expect("indirect cycle succeeds")
        .expect("constructor");
    // one Alpha every second level, depths 0 to 12
    assert_eq!(alpha.levels(), 7);

    let alpha = Populator::builder()
        .max_depth(4)
        .build()
        .expect("valid configuration")
        .instantiate::<Alpha>()
        .expect("indirect cycle succeeds")
        .expect("constructor");
    assert_eq!(alpha.levels(), 3);
}

// Collections requested directly

#[test]
fn test_collections_without_element_population() {
    let populator = populator();
    let list = populator
        .instantiate::<Vec<String>>()
        .expect("no error")
        .expect("constructor");
    assert!(list.is_empty());

    let deque = populator
        .instantiate::<LinkedList<String>>()
        .expect("no error")
        .expect("constructor");
    assert!(deque.is_empty());

    let set = populator
        .instantiate::<BTreeSet<String>>()
        .expect("no error")
        .expect("constructor");
    assert!(set.is_empty());

    let map = populator
        .instantiate::<HashMap<String, i32>>()
        .expect("no error")
        .expect("constructor");
    assert!(map.is_empty());
}

#[test]
fn test_collections_with_element_type() {
    let populator = populator();

    let list = populator
        .instantiate_collection::<Vec<String>>()
        .expect("no error")
        .expect("vec");
    assert!((1..=10).contains(&list.len()));

    let linked = populator
        .instantiate_collection::<LinkedList<String>>()
        .expect("no error")
        .expect("linked list");
    assert_eq!(linked.len(), 10);

    let set = populator
        .instantiate_collection::<HashSet<Decimal>>()
        .expect("no error")
        .expect("set");
    assert!(!set.is_empty());

    let tree = populator
        .instantiate_collection::<BTreeSet<String>>()
        .expect("no error")
        .expect("tree set");
    assert!(!tree.is_empty() && tree.len() <= 10);
}

#[test]
fn test_maps_with_key_and_value_types() {
    let populator = populator();
    let map = populator
        .instantiate_map::<HashMap<String, i32>>()
        .expect("no error")
        .expect("map");
    assert!(!map.is_empty());
    assert!(map.keys().all(|key| is_alphanumeric(key)));

    let tree = populator
        .instantiate_map::<BTreeMap<String, i32>>()
        .expect("no error")
        .expect("tree map");
    assert_eq!(tree.len(), 10);
}

// Base objects

#[test]
fn test_base_objects() {
    let populator = populator();
    let text = populator
        .instantiate_from_base_objects::<String>()
        .expect("string");
    assert!(is_alphanumeric(&text));
    assert_eq!(text.len(), 10);

    assert!(populator.instantiate_from_base_objects::<i32>().is_some());
    assert!(populator.instantiate_from_base_objects::<i64>().is_some());
    assert!(populator.instantiate_from_base_objects::<bool>().is_some());
    assert!(populator.instantiate_from_base_objects::<f32>().is_some());
    assert!(populator.instantiate_from_base_objects::<f64>().is_some());
    assert!(populator.instantiate_from_base_objects::<Decimal>().is_some());
    assert!(
        populator
            .instantiate_from_base_objects::<DateTime<Utc>>()
            .is_some()
    );
    assert!(populator.instantiate_from_base_objects::<NaiveDate>().is_some());
    assert!(
        populator
            .instantiate_from_base_objects::<NaiveDateTime>()
            .is_some()
    );
    assert!(populator.instantiate_from_base_objects::<NaiveTime>().is_some());
    assert!(populator.instantiate_from_base_objects::<Duration>().is_some());
    assert!(populator.instantiate_from_base_objects::<()>().is_some());
}

#[test]
fn test_unknown_base_object_is_absent() {
    assert!(
        populator()
            .instantiate_from_base_objects::<std::thread::Thread>()
            .is_none()
    );
}

#[test]
fn test_random_string() {
    let text = populator().random_string(10);
    assert_eq!(text.len(), 10);
    assert!(is_alphanumeric(&text));
    assert!(datarize::random_string(0).is_empty());
}

// Enums

#[derive(Debug, Clone, PartialEq, Describe)]
enum HasMembers {
    A,
    B,
}

#[derive(Debug, Describe)]
enum HasNoMembers {}

#[test]
fn test_enum_with_members() {
    let value = populator()
        .instantiate_from_enum::<HasMembers>()
        .expect("no error")
        .expect("member");
    assert!([HasMembers::A, HasMembers::B].contains(&value));
}

#[test]
fn test_non_enum_is_absent() {
    assert!(
        populator()
            .instantiate_from_enum::<String>()
            .expect("no error")
            .is_none()
    );
}

#[test]
fn test_enum_without_members_fails() {
    let error = populator()
        .instantiate_from_enum::<HasNoMembers>()
        .expect_err("no member to choose");
    assert!(error.is_construction_error());
    assert!(error.to_string().contains("enum with no values"));

    let error = populator()
        .instantiate::<HasNoMembers>()
        .expect_err("no member to choose");
    assert!(matches!(error, PopulateError::EmptyEnum { .. }));
}

// Configuration

#[test]
fn test_seeded_populators_agree() {
    let config = PopulatorConfig {
        seed: Some(1234),
        ..PopulatorConfig::default()
    };
    let first = Populator::with_config(config.clone()).expect("valid configuration");
    let second = Populator::with_config(config).expect("valid configuration");

    let a = first
        .instantiate::<WithStringList>()
        .expect("no error")
        .expect("constructor");
    let b = second
        .instantiate::<WithStringList>()
        .expect("no error")
        .expect("constructor");
    assert_eq!(a.string_list, b.string_list);
}

#[test]
fn test_string_length_config() {
    let populator = Populator::builder()
        .string_length(3)
        .build()
        .expect("valid configuration");
    let value = populator
        .instantiate::<NonEmptyBuilder>()
        .expect("no error")
        .expect("builder");
    assert_eq!(value.name.len(), 3);
}
