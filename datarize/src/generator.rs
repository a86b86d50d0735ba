//! Terminal value generators and their registry.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use chrono::{
    DateTime, Days, Local, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, TimeDelta, Timelike,
    Utc,
};
use num_traits::FromPrimitive;
use rand::{Rng, RngCore};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::config::PopulatorConfig;
use crate::descriptor::AnyValue;

const SECONDS_IN_DAY: i64 = 86_400;
const SECONDS_IN_HOUR: i64 = 3_600;
const DAYS_IN_YEAR_ROUGH: u64 = 365;
const MAX_DURATION_MILLIS: u64 = 10_000;
const DECIMAL_SCALE: u32 = 20;

/// Generator producing one random value of a terminal type
pub trait ValueGenerator: Send + Sync {
    /// Generate a type-erased value using the provided RNG and configuration
    fn generate(&self, rng: &mut dyn RngCore, config: &PopulatorConfig) -> AnyValue;
}

/// Wrapper to make a plain function work as a [`ValueGenerator`]
struct FnGenerator<T, F> {
    inner: F,
    _phantom: PhantomData<fn() -> T>,
}

impl<T, F> ValueGenerator for FnGenerator<T, F>
where
    T: Any + Send,
    F: Fn(&mut dyn RngCore, &PopulatorConfig) -> T + Send + Sync,
{
    fn generate(&self, rng: &mut dyn RngCore, config: &PopulatorConfig) -> AnyValue {
        Box::new((self.inner)(rng, config))
    }
}

struct Registered {
    name: &'static str,
    generator: Box<dyn ValueGenerator>,
}

/// Registry mapping terminal types to their generators
pub struct ValueGenerators {
    generators: HashMap<TypeId, Registered>,
}

impl ValueGenerators {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            generators: HashMap::new(),
        }
    }

    /// Registry holding the standard terminal kinds
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.register(|rng, config| random_string(rng, config.string_length));
        registry.register(|rng, _| rng.gen_range(0..i32::MAX));
        registry.register(|rng, _| rng.r#gen::<i64>());
        registry.register(|rng, _| rng.r#gen::<bool>());
        registry.register(|rng, _| rng.r#gen::<f32>());
        registry.register(|rng, _| rng.r#gen::<f64>());
        registry.register(random_decimal);
        registry.register(random_instant);
        registry.register(random_date);
        registry.register(random_date_time);
        registry.register(random_time);
        registry.register(random_duration);
        registry.register(|_, _| ());

        registry.register(|rng, _| random_alphanumeric(rng));
        registry.register(|rng, _| rng.r#gen::<i8>());
        registry.register(|rng, _| rng.r#gen::<i16>());
        registry.register(|rng, _| rng.r#gen::<u8>());
        registry.register(|rng, _| rng.r#gen::<u16>());
        registry.register(|rng, _| rng.r#gen::<u32>());
        registry.register(|rng, _| rng.r#gen::<u64>());
        registry.register(|rng, _| rng.gen_range(0..u32::MAX as usize));
        registry
    }

    /// Register a generator for `T`, replacing any previous one
    pub fn register<T, F>(&mut self, generator: F)
    where
        T: Any + Send,
        F: Fn(&mut dyn RngCore, &PopulatorConfig) -> T + Send + Sync + 'static,
    {
        self.generators.insert(
            TypeId::of::<T>(),
            Registered {
                name: type_name::<T>(),
                generator: Box::new(FnGenerator {
                    inner: generator,
                    _phantom: PhantomData,
                }),
            },
        );
    }

    /// Check if a generator is registered for a type id
    pub fn contains_id(&self, id: TypeId) -> bool {
        self.generators.contains_key(&id)
    }

    /// Check if a generator is registered for `T`
    pub fn contains<T: 'static>(&self) -> bool {
        self.contains_id(TypeId::of::<T>())
    }

    /// Generate a value for the type id, or `None` if it is not a terminal type
    pub fn generate(
        &self,
        id: TypeId,
        rng: &mut dyn RngCore,
        config: &PopulatorConfig,
    ) -> Option<AnyValue> {
        self.generators
            .get(&id)
            .map(|registered| registered.generator.generate(rng, config))
    }

    /// Names of the registered types, sorted
    pub fn type_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.generators.values().map(|r| r.name).collect();
        names.sort_unstable();
        names
    }

    /// Get the number of registered generators
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl Default for ValueGenerators {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for ValueGenerators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueGenerators")
            .field("types", &self.type_names())
            .finish()
    }
}

/// Generate an alphanumeric random string of exactly `length` characters.
///
/// Codes are drawn from `'0'..='z'` and the punctuation in between is rejected.
pub fn random_string(rng: &mut dyn RngCore, length: usize) -> String {
    let mut out = String::with_capacity(length);
    while out.len() < length {
        out.push(random_alphanumeric(rng));
    }
    out
}

fn random_alphanumeric(rng: &mut dyn RngCore) -> char {
    loop {
        let code = rng.gen_range(b'0'..=b'z');
        if code.is_ascii_alphanumeric() {
            return char::from(code);
        }
    }
}

// Scaled down to smaller precision
fn random_decimal(rng: &mut dyn RngCore, _config: &PopulatorConfig) -> Decimal {
    let mut value = Decimal::from_f64(rng.r#gen::<f64>())
        .unwrap_or_default()
        .round_dp_with_strategy(DECIMAL_SCALE, RoundingStrategy::ToZero);
    value.rescale(DECIMAL_SCALE);
    value
}

fn random_instant(rng: &mut dyn RngCore, _config: &PopulatorConfig) -> DateTime<Utc> {
    let offset = TimeDelta::seconds(rng.gen_range(0..SECONDS_IN_DAY));
    (Utc::now() + offset).trunc_subsecs(3)
}

fn random_date(rng: &mut dyn RngCore, _config: &PopulatorConfig) -> NaiveDate {
    let today = Local::now().date_naive();
    today
        .checked_add_days(Days::new(rng.gen_range(0..DAYS_IN_YEAR_ROUGH)))
        .unwrap_or(today)
}

fn random_date_time(rng: &mut dyn RngCore, _config: &PopulatorConfig) -> NaiveDateTime {
    let offset = TimeDelta::seconds(rng.gen_range(0..SECONDS_IN_DAY));
    (Local::now().naive_local() + offset).trunc_subsecs(3)
}

fn random_time(rng: &mut dyn RngCore, _config: &PopulatorConfig) -> NaiveTime {
    let offset = TimeDelta::seconds(rng.gen_range(0..SECONDS_IN_HOUR));
    let time = Local::now().time() + offset;
    time.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(time)
}

fn random_duration(rng: &mut dyn RngCore, _config: &PopulatorConfig) -> Duration {
    Duration::from_millis(rng.gen_range(0..MAX_DURATION_MILLIS))
}
