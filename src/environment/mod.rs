//! The environment: an immutable, inherited key/value context.
//!
//! Each view node receives the environment produced by its parent. Deriving a
//! child environment is O(1): the override is pushed as a new layer over a
//! shared parent chain. After [`MAX_OVERLAY_DEPTH`] stacked overrides the
//! chain is flattened into a single map so lookups stay bounded.
//!
//! Besides typed keys, the environment carries a handful of plain fields the
//! engine itself needs: the backend, the main-thread handle, the persistent
//! value store, and whether layout caching is allowed.

pub mod actions;
pub mod keys;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use crate::backend::{Backend, MainThreadHandle};
use crate::reactive::ObservableObject;
use crate::storage::PersistentStore;

pub use actions::{AlertAction, PresentAlertAction};
pub use keys::{
    Alignment, Color, ColorScheme, ColorSchemeKey, EnvironmentKey, Font, FontKey, FontWeight,
    ForegroundColorKey, IsEnabledKey, LayoutAlignmentKey, LayoutOrientationKey, LayoutSpacingKey,
    ResolvedFont, TextSelectionKey,
};

/// Overrides stacked past this depth are flattened into one layer.
pub const MAX_OVERLAY_DEPTH: usize = 32;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum Slot {
    Key(TypeId),
    Object(TypeId),
}

enum Layer {
    Entry {
        slot: Slot,
        value: Rc<dyn Any>,
        parent: Option<Rc<Layer>>,
    },
    Flat(HashMap<Slot, Rc<dyn Any>>),
}

impl Layer {
    fn lookup(&self, slot: Slot) -> Option<&Rc<dyn Any>> {
        let mut layer = self;
        loop {
            match layer {
                Layer::Entry { slot: s, value, .. } if *s == slot => return Some(value),
                Layer::Entry { parent: Some(parent), .. } => layer = parent,
                Layer::Entry { parent: None, .. } => return None,
                Layer::Flat(map) => return map.get(&slot),
            }
        }
    }

    fn flatten(&self) -> HashMap<Slot, Rc<dyn Any>> {
        let mut map = HashMap::new();
        let mut layer = self;
        loop {
            match layer {
                Layer::Entry { slot, value, parent } => {
                    map.entry(*slot).or_insert_with(|| Rc::clone(value));
                    match parent {
                        Some(parent) => layer = parent,
                        None => return map,
                    }
                }
                Layer::Flat(base) => {
                    for (slot, value) in base {
                        map.entry(*slot).or_insert_with(|| Rc::clone(value));
                    }
                    return map;
                }
            }
        }
    }
}

/// Inherited context passed down the view graph.
///
/// Cloning is cheap: clones share every layer.
#[derive(Clone, Default)]
pub struct Environment {
    overlay: Option<Rc<Layer>>,
    depth: usize,
    allow_layout_caching: bool,
    backend: Option<Rc<dyn Backend>>,
    main_thread: Option<MainThreadHandle>,
    app_storage: Option<Arc<PersistentStore>>,
}

impl Environment {
    /// An environment with every key at its default.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, slot: Slot, value: Rc<dyn Any>) -> Environment {
        let mut env = self.clone();
        let layer = Layer::Entry {
            slot,
            value,
            parent: self.overlay.clone(),
        };
        if self.depth + 1 >= MAX_OVERLAY_DEPTH {
            tracing::trace!(depth = self.depth + 1, "flattening environment overlay");
            env.overlay = Some(Rc::new(Layer::Flat(layer.flatten())));
            env.depth = 1;
        } else {
            env.overlay = Some(Rc::new(layer));
            env.depth = self.depth + 1;
        }
        env
    }

    /// Read a key, falling back to its default.
    ///
    /// # Panics
    ///
    /// Panics if the stored value is not of the key's declared type.
    pub fn get<K: EnvironmentKey>(&self) -> K::Value {
        let slot = Slot::Key(TypeId::of::<K>());
        match self.overlay.as_ref().and_then(|layer| layer.lookup(slot)) {
            None => K::default_value(),
            Some(value) => match value.downcast_ref::<K::Value>() {
                Some(value) => value.clone(),
                None => {
                    tracing::error!(key = std::any::type_name::<K>(), "environment value has the wrong type");
                    panic!(
                        "environment key {} holds a value that is not a {}",
                        std::any::type_name::<K>(),
                        std::any::type_name::<K::Value>()
                    );
                }
            },
        }
    }

    /// A copy of this environment with `K` overridden. `self` is unchanged.
    pub fn derive<K: EnvironmentKey>(&self, value: K::Value) -> Environment {
        self.push(Slot::Key(TypeId::of::<K>()), Rc::new(value))
    }

    /// A copy of this environment carrying `object`, retrievable by type.
    pub fn with_object<M: ObservableObject>(&self, object: Rc<M>) -> Environment {
        self.push(Slot::Object(TypeId::of::<M>()), object)
    }

    /// The nearest ancestor-provided object of type `M`, if any.
    pub fn object<M: ObservableObject>(&self) -> Option<Rc<M>> {
        let slot = Slot::Object(TypeId::of::<M>());
        let value = Rc::clone(self.overlay.as_ref()?.lookup(slot)?);
        value.downcast::<M>().ok()
    }

    /// Number of stacked layers, for diagnostics.
    pub fn overlay_depth(&self) -> usize {
        self.depth
    }

    // ── Plain fields ─────────────────────────────────────────────────

    /// Whether views may reuse cached layout results. Set only while
    /// measuring (non-final layout).
    pub fn allow_layout_caching(&self) -> bool {
        self.allow_layout_caching
    }

    pub fn with_layout_caching(&self, allow: bool) -> Environment {
        let mut env = self.clone();
        env.allow_layout_caching = allow;
        env
    }

    /// The backend this environment belongs to, if attached.
    pub fn backend(&self) -> Option<&Rc<dyn Backend>> {
        self.backend.as_ref()
    }

    pub fn with_backend(&self, backend: Rc<dyn Backend>) -> Environment {
        let mut env = self.clone();
        env.main_thread = Some(backend.main_thread());
        env.backend = Some(backend);
        env
    }

    /// Handle for scheduling work on the UI thread from any thread.
    pub fn main_thread(&self) -> Option<&MainThreadHandle> {
        self.main_thread.as_ref()
    }

    /// The application's persistent value store, if attached.
    pub fn app_storage(&self) -> Option<&Arc<PersistentStore>> {
        self.app_storage.as_ref()
    }

    pub fn with_app_storage(&self, store: Arc<PersistentStore>) -> Environment {
        let mut env = self.clone();
        env.app_storage = Some(store);
        env
    }

    // ── Derived values ───────────────────────────────────────────────

    /// The current font resolved to concrete metrics.
    pub fn resolved_font(&self) -> ResolvedFont {
        self.get::<FontKey>().resolve()
    }

    /// The explicit foreground color, or the color scheme's default.
    pub fn suggested_foreground_color(&self) -> Color {
        self.get::<ForegroundColorKey>()
            .unwrap_or_else(|| self.get::<ColorSchemeKey>().default_foreground())
    }

    pub fn is_enabled(&self) -> bool {
        self.get::<IsEnabledKey>()
    }

    /// Action that presents an alert through this environment's backend.
    ///
    /// # Panics
    ///
    /// Panics if no backend is attached.
    pub fn present_alert(&self) -> PresentAlertAction {
        let Some(backend) = self.backend.clone() else {
            tracing::error!("present_alert requested without a backend");
            panic!("present_alert requires an environment attached to a backend");
        };
        PresentAlertAction::new(backend, self.clone())
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("depth", &self.depth)
            .field("allow_layout_caching", &self.allow_layout_caching)
            .field("has_backend", &self.backend.is_some())
            .field("has_app_storage", &self.app_storage.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Axis;
    use crate::reactive::Publisher;

    struct Answer;

    impl EnvironmentKey for Answer {
        type Value = i32;
        fn default_value() -> i32 {
            42
        }
    }

    #[test]
    fn absent_key_reads_default() {
        let env = Environment::new();
        assert_eq!(env.get::<Answer>(), 42);
        assert_eq!(env.get::<LayoutSpacingKey>(), 10);
        assert_eq!(env.get::<LayoutOrientationKey>(), Axis::Vertical);
    }

    #[test]
    fn derive_leaves_parent_unchanged() {
        let parent = Environment::new();
        let child = parent.derive::<Answer>(7);
        assert_eq!(child.get::<Answer>(), 7);
        assert_eq!(parent.get::<Answer>(), 42);
    }

    #[test]
    fn nearest_override_wins() {
        let env = Environment::new()
            .derive::<Answer>(1)
            .derive::<IsEnabledKey>(false)
            .derive::<Answer>(2);
        assert_eq!(env.get::<Answer>(), 2);
        assert!(!env.is_enabled());
    }

    #[test]
    fn deep_chains_are_flattened() {
        let mut env = Environment::new().derive::<IsEnabledKey>(false);
        for i in 0..100 {
            env = env.derive::<Answer>(i);
        }
        assert!(env.overlay_depth() < MAX_OVERLAY_DEPTH);
        assert_eq!(env.get::<Answer>(), 99);
        assert!(!env.is_enabled());
    }

    #[test]
    fn foreground_follows_scheme_until_overridden() {
        let env = Environment::new().derive::<ColorSchemeKey>(ColorScheme::Dark);
        assert_eq!(env.suggested_foreground_color(), Color::WHITE);
        let env = env.derive::<ForegroundColorKey>(Some(Color::RED));
        assert_eq!(env.suggested_foreground_color(), Color::RED);
    }

    struct Session {
        changes: Publisher,
    }

    impl ObservableObject for Session {
        fn did_change(&self) -> Publisher {
            self.changes.clone()
        }
    }

    #[test]
    fn objects_are_found_by_type() {
        let env = Environment::new();
        assert!(env.object::<Session>().is_none());

        let session = Rc::new(Session { changes: Publisher::new() });
        let env = env.with_object(Rc::clone(&session)).derive::<Answer>(3);
        let found = env.object::<Session>().expect("object present");
        assert!(Rc::ptr_eq(&found, &session));
    }

    #[test]
    fn layout_caching_flag_is_scoped() {
        let env = Environment::new();
        let measuring = env.with_layout_caching(true);
        assert!(measuring.allow_layout_caching());
        assert!(!env.allow_layout_caching());
    }
}
