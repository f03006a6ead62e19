//! PropertyUpdater: per-type plans for refreshing a view's dynamic
//! properties.
//!
//! A view type declares its dynamic fields once, through
//! [`View::dynamic_properties`]. The resulting plan is built the first time
//! the type is seen and cached for the life of the process in a table keyed
//! by `TypeId`. Plans are computed outside the table's lock and inserted
//! under it; when two threads race on the same type, the first insert wins.
//!
//! Each graph node holds its own handle to the plan, so steady-state updates
//! never touch the table.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;

use super::DynamicProperty;
use crate::environment::Environment;
use crate::reactive::Publisher;
use crate::view::View;

type UpdateFn<V> = Box<dyn Fn(&V, &Environment, Option<&V>) + Send + Sync>;
type PublisherFn<V> = Box<dyn Fn(&V) -> Option<Publisher> + Send + Sync>;
type ReleaseFn<V> = Box<dyn Fn(&V) + Send + Sync>;

struct PropertyField<V> {
    name: &'static str,
    update: UpdateFn<V>,
    publisher: PublisherFn<V>,
    release: ReleaseFn<V>,
}

/// Collects the dynamic fields of a view type.
///
/// ```ignore
/// impl View for Counter {
///     fn dynamic_properties(fields: &mut PropertyFields<Self>) {
///         fields.add("count", |v| &v.count);
///     }
/// }
/// ```
pub struct PropertyFields<V> {
    fields: Vec<PropertyField<V>>,
}

impl<V: 'static> PropertyFields<V> {
    fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Declare the field returned by `accessor` as a dynamic property.
    pub fn add<P: DynamicProperty>(&mut self, name: &'static str, accessor: fn(&V) -> &P) -> &mut Self {
        self.fields.push(PropertyField {
            name,
            update: Box::new(move |view, environment, previous| {
                accessor(view).update(environment, previous.map(accessor));
            }),
            publisher: Box::new(move |view| accessor(view).publisher()),
            release: Box::new(move |view| accessor(view).release()),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

type PlanCache = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

static PLANS: LazyLock<Mutex<PlanCache>> = LazyLock::new(|| Mutex::new(HashMap::new()));

/// The cached update plan of one view type.
pub struct PropertyUpdater<V> {
    plan: Option<Arc<PropertyFields<V>>>,
}

impl<V: View> PropertyUpdater<V> {
    /// The plan for `V`, built on first use.
    pub fn for_type() -> Self {
        // A zero-sized view has no fields, so it has no dynamic properties.
        if std::mem::size_of::<V>() == 0 {
            return Self { plan: None };
        }

        let key = TypeId::of::<V>();
        let cached = PLANS.lock().get(&key).cloned();
        let erased = match cached {
            Some(plan) => plan,
            None => {
                let mut fields = PropertyFields::new();
                V::dynamic_properties(&mut fields);
                tracing::debug!(
                    view = std::any::type_name::<V>(),
                    properties = fields.len(),
                    "built dynamic property plan"
                );
                let built: Arc<dyn Any + Send + Sync> = Arc::new(fields);
                Arc::clone(PLANS.lock().entry(key).or_insert(built))
            }
        };

        let plan = match erased.downcast::<PropertyFields<V>>() {
            Ok(plan) => plan,
            Err(_) => unreachable!("plan cache entries are keyed by their own type"),
        };
        Self {
            plan: (!plan.is_empty()).then_some(plan),
        }
    }

    /// Refresh every dynamic property of `view`, adopting storage from
    /// `previous` when given.
    pub fn update(&self, view: &V, environment: &Environment, previous: Option<&V>) {
        let Some(plan) = &self.plan else {
            return;
        };
        for field in &plan.fields {
            tracing::trace!(property = field.name, "updating dynamic property");
            (field.update)(view, environment, previous);
        }
    }

    /// Publishers of every property that reports one.
    pub fn publishers(&self, view: &V) -> Vec<Publisher> {
        match &self.plan {
            Some(plan) => plan.fields.iter().filter_map(|f| (f.publisher)(view)).collect(),
            None => Vec::new(),
        }
    }

    /// Notify every property that its node was torn down.
    pub fn release(&self, view: &V) {
        if let Some(plan) = &self.plan {
            for field in &plan.fields {
                (field.release)(view);
            }
        }
    }

    pub fn property_count(&self) -> usize {
        self.plan.as_ref().map_or(0, |plan| plan.len())
    }

    pub fn property_names(&self) -> Vec<&'static str> {
        match &self.plan {
            Some(plan) => plan.fields.iter().map(|f| f.name).collect(),
            None => Vec::new(),
        }
    }

    /// Whether two updaters share one cached plan.
    pub fn shares_plan_with(&self, other: &PropertyUpdater<V>) -> bool {
        match (&self.plan, &other.plan) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<V> fmt::Debug for PropertyUpdater<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyUpdater")
            .field("view", &std::any::type_name::<V>())
            .field("properties", &self.plan.as_ref().map_or(0, |plan| plan.fields.len()))
            .finish()
    }
}

/// Type-erased updater stored on graph nodes.
pub(crate) trait ErasedUpdater {
    fn update(&self, view: &dyn Any, environment: &Environment, previous: Option<&dyn Any>);
    fn publishers(&self, view: &dyn Any) -> Vec<Publisher>;
    fn release(&self, view: &dyn Any);
}

fn downcast<V: 'static>(view: &dyn Any) -> &V {
    match view.downcast_ref::<V>() {
        Some(view) => view,
        None => {
            tracing::error!(expected = std::any::type_name::<V>(), "updater applied to a foreign view");
            panic!(
                "property updater for {} applied to a value of another type",
                std::any::type_name::<V>()
            );
        }
    }
}

impl<V: View> ErasedUpdater for PropertyUpdater<V> {
    fn update(&self, view: &dyn Any, environment: &Environment, previous: Option<&dyn Any>) {
        if self.plan.is_none() {
            return;
        }
        PropertyUpdater::update(self, downcast::<V>(view), environment, previous.map(downcast::<V>));
    }

    fn publishers(&self, view: &dyn Any) -> Vec<Publisher> {
        if self.plan.is_none() {
            return Vec::new();
        }
        PropertyUpdater::publishers(self, downcast::<V>(view))
    }

    fn release(&self, view: &dyn Any) {
        if self.plan.is_none() {
            return;
        }
        PropertyUpdater::release(self, downcast::<V>(view))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::LayoutSpacingKey;
    use crate::property::Env;
    use crate::reactive::State;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter {
        label: String,
        count: State<i32>,
        spacing: Env<LayoutSpacingKey>,
    }

    impl Counter {
        fn new(count: i32) -> Self {
            Self {
                label: String::from("counter"),
                count: State::new(count),
                spacing: Env::new(),
            }
        }
    }

    impl View for Counter {
        fn dynamic_properties(fields: &mut PropertyFields<Self>) {
            fields.add("count", |v| &v.count).add("spacing", |v| &v.spacing);
        }
    }

    #[test]
    fn plan_lists_declared_fields() {
        let updater = PropertyUpdater::<Counter>::for_type();
        assert_eq!(updater.property_count(), 2);
        assert_eq!(updater.property_names(), vec!["count", "spacing"]);
    }

    #[test]
    fn update_adopts_storage_and_reads_environment() {
        let updater = PropertyUpdater::<Counter>::for_type();
        let env = Environment::new().derive::<LayoutSpacingKey>(3);

        let first = Counter::new(1);
        updater.update(&first, &env, None);
        first.count.set(5);

        let second = Counter::new(0);
        updater.update(&second, &env, Some(&first));
        assert!(second.count.same_cell(&first.count));
        assert_eq!(second.count.get(), 5);
        assert_eq!(second.spacing.get(), 3);
        assert_eq!(second.label, "counter");
    }

    #[test]
    fn publishers_come_from_state_fields() {
        let updater = PropertyUpdater::<Counter>::for_type();
        let view = Counter::new(0);
        let publishers = updater.publishers(&view);
        assert_eq!(publishers.len(), 1);
        assert!(publishers[0].ptr_eq(&view.count.publisher()));
    }

    struct Marker;

    impl View for Marker {}

    #[test]
    fn zero_sized_views_skip_the_cache() {
        let updater = PropertyUpdater::<Marker>::for_type();
        assert_eq!(updater.property_count(), 0);
        updater.update(&Marker, &Environment::new(), Some(&Marker));
        assert!(!PLANS.lock().contains_key(&TypeId::of::<Marker>()));
    }

    static PLANNED: AtomicUsize = AtomicUsize::new(0);

    struct Planned {
        _value: State<u8>,
    }

    impl View for Planned {
        fn dynamic_properties(fields: &mut PropertyFields<Self>) {
            PLANNED.fetch_add(1, Ordering::SeqCst);
            fields.add("value", |v| &v._value);
        }
    }

    #[test]
    fn plan_is_built_once_per_type() {
        let first = PropertyUpdater::<Planned>::for_type();
        let second = PropertyUpdater::<Planned>::for_type();
        assert_eq!(PLANNED.load(Ordering::SeqCst), 1);
        assert!(first.shares_plan_with(&second));
    }

    struct Raced {
        _value: State<u16>,
    }

    impl View for Raced {
        fn dynamic_properties(fields: &mut PropertyFields<Self>) {
            fields.add("value", |v| &v._value);
        }
    }

    #[test]
    fn concurrent_first_use_converges_on_one_plan() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    let updater = PropertyUpdater::<Raced>::for_type();
                    updater.property_count()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 1);
        }
        let a = PropertyUpdater::<Raced>::for_type();
        let b = PropertyUpdater::<Raced>::for_type();
        assert!(a.shares_plan_with(&b));
    }
}
