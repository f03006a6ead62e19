//! App: configuration, windows, and the update cycle.
//!
//! [`App`] owns the root environment and one [`WindowScene`] per open window.
//! Each [`tick`](App::tick) drains main-thread work, applies queued window
//! resizes, and re-renders nodes whose observed state changed.

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use slotmap::SecondaryMap;

use crate::backend::{Backend, WindowId};
use crate::environment::{ColorScheme, ColorSchemeKey, Environment, LayoutSpacingKey};
use crate::geometry::{ProposedSize, Size};
use crate::graph::ViewGraph;
use crate::storage::{JsonFileStorage, PersistentStore};
use crate::view::View;

/// Ticks [`App::run_until_idle`] runs before giving up on reaching a quiet
/// state.
const MAX_IDLE_TICKS: usize = 1000;

// ---------------------------------------------------------------------------
// AppConfig
// ---------------------------------------------------------------------------

/// Where persisted values are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StorageConfig {
    /// In memory; lost when the app exits.
    #[default]
    Memory,
    /// One JSON file.
    File(PathBuf),
}

/// Configuration for the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Title given to every window.
    pub title: String,
    /// Size of newly opened windows.
    pub default_window_size: Size,
    pub storage: StorageConfig,
    /// Root value of the stack spacing key.
    pub layout_spacing: i32,
    pub color_scheme: ColorScheme,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            default_window_size: Size::new(900, 450),
            storage: StorageConfig::Memory,
            layout_spacing: 10,
            color_scheme: ColorScheme::Light,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_default_window_size(mut self, size: Size) -> Self {
        self.default_window_size = size;
        self
    }

    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_layout_spacing(mut self, spacing: i32) -> Self {
        self.layout_spacing = spacing;
        self
    }

    pub fn with_color_scheme(mut self, scheme: ColorScheme) -> Self {
        self.color_scheme = scheme;
        self
    }

    fn open_store(&self) -> PersistentStore {
        match &self.storage {
            StorageConfig::Memory => PersistentStore::in_memory(),
            StorageConfig::File(path) => PersistentStore::new(JsonFileStorage::new(path)),
        }
    }
}

// ---------------------------------------------------------------------------
// WindowScene
// ---------------------------------------------------------------------------

/// One open window and the view graph shown in it.
pub struct WindowScene {
    id: WindowId,
    graph: ViewGraph,
    size: Size,
    pending_resize: Rc<Cell<Option<Size>>>,
}

impl WindowScene {
    fn open(root: impl View, backend: &Rc<dyn Backend>, environment: &Environment, config: &AppConfig) -> Self {
        let id = backend.create_window(config.default_window_size);
        backend.set_window_title(id, &config.title);

        let mut graph = ViewGraph::new(root, Rc::clone(backend), environment.clone());
        backend.set_window_content(id, graph.root_widget());

        let pending_resize = Rc::new(Cell::new(None));
        let queued = Rc::clone(&pending_resize);
        backend.set_resize_handler(id, Box::new(move |size| queued.set(Some(size))));

        let size = backend.window_size(id);
        graph.compute_layout(ProposedSize::from_size(size));
        backend.show_window(id);
        tracing::debug!(?id, ?size, nodes = graph.len(), "opened window");

        Self {
            id,
            graph,
            size,
            pending_resize,
        }
    }

    pub fn id(&self) -> WindowId {
        self.id
    }

    pub fn graph(&self) -> &ViewGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut ViewGraph {
        &mut self.graph
    }

    /// The size the content was last laid out at.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Reconcile a new root view against the window's content.
    pub fn update_root(&mut self, root: impl View) {
        let before = self.graph.root_widget();
        self.graph.update_root(root);
        let after = self.graph.root_widget();
        if before != after {
            self.graph.backend().set_window_content(self.id, after);
        }
    }

    /// Apply a queued resize, if any. Returns whether one was applied.
    fn apply_resize(&mut self) -> bool {
        let Some(size) = self.pending_resize.take() else {
            return false;
        };
        tracing::debug!(id = ?self.id, ?size, "window resized");
        self.size = size;
        self.graph.compute_layout(ProposedSize::from_size(size));
        true
    }
}

impl std::fmt::Debug for WindowScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowScene")
            .field("id", &self.id)
            .field("size", &self.size)
            .field("graph", &self.graph)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The main application struct.
pub struct App {
    backend: Rc<dyn Backend>,
    config: AppConfig,
    environment: Environment,
    store: Arc<PersistentStore>,
    windows: SecondaryMap<WindowId, WindowScene>,
}

impl App {
    /// Create an app on `backend`. The root environment carries the
    /// backend, its main-thread handle, the persistent store, and the
    /// configured spacing and color scheme.
    pub fn new(backend: Rc<dyn Backend>, config: AppConfig) -> Self {
        let store = Arc::new(config.open_store());
        let environment = Environment::new()
            .derive::<LayoutSpacingKey>(config.layout_spacing)
            .derive::<ColorSchemeKey>(config.color_scheme)
            .with_backend(Rc::clone(&backend))
            .with_app_storage(Arc::clone(&store));
        Self {
            backend,
            config,
            environment,
            store,
            windows: SecondaryMap::new(),
        }
    }

    /// Open a window showing `root`, laid out at the default window size.
    pub fn open_window(&mut self, root: impl View) -> WindowId {
        let scene = WindowScene::open(root, &self.backend, &self.environment, &self.config);
        let id = scene.id();
        self.windows.insert(id, scene);
        id
    }

    /// Close a window, tearing its view graph down.
    pub fn close_window(&mut self, id: WindowId) -> bool {
        self.windows.remove(id).is_some()
    }

    /// One update cycle: run main-thread work, apply resizes, then process
    /// state invalidations in every window. Returns how much work was done;
    /// zero means the app is idle.
    pub fn tick(&mut self) -> usize {
        let mut work = self.backend.drain_main_thread();
        for scene in self.windows.values_mut() {
            if scene.apply_resize() {
                work += 1;
            }
            work += scene.graph.process_invalidations();
        }
        tracing::trace!(work, "tick");
        work
    }

    /// Tick until a tick does no work. Returns the number of ticks run.
    pub fn run_until_idle(&mut self) -> usize {
        for ticks in 1..=MAX_IDLE_TICKS {
            if self.tick() == 0 {
                return ticks;
            }
        }
        tracing::warn!(ticks = MAX_IDLE_TICKS, "app did not become idle");
        MAX_IDLE_TICKS
    }

    pub fn window(&self, id: WindowId) -> Option<&WindowScene> {
        self.windows.get(id)
    }

    pub fn window_mut(&mut self, id: WindowId) -> Option<&mut WindowScene> {
        self.windows.get_mut(id)
    }

    pub fn windows(&self) -> impl Iterator<Item = &WindowScene> {
        self.windows.values()
    }

    /// The root environment every window starts from.
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<PersistentStore> {
        &self.store
    }

    pub fn backend(&self) -> Rc<dyn Backend> {
        Rc::clone(&self.backend)
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config", &self.config)
            .field("windows", &self.windows.len())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::backend::HeadlessBackend;
    use crate::property::PropertyFields;
    use crate::reactive::State;
    use crate::view::{AnyView, ViewExt};
    use crate::views::{Rectangle, Text};
    use crate::environment::Color;

    fn headless() -> (Rc<HeadlessBackend>, App) {
        let backend = Rc::new(HeadlessBackend::new());
        let app = App::new(backend.clone(), AppConfig::new().with_title("Test"));
        (backend, app)
    }

    // ── AppConfig ────────────────────────────────────────────────────

    #[test]
    fn app_config_defaults() {
        let config = AppConfig::new();
        assert_eq!(config.title, "");
        assert_eq!(config.default_window_size, Size::new(900, 450));
        assert_eq!(config.storage, StorageConfig::Memory);
        assert_eq!(config.layout_spacing, 10);
        assert_eq!(config.color_scheme, ColorScheme::Light);
    }

    #[test]
    fn app_config_builder() {
        let config = AppConfig::new()
            .with_title("Notes")
            .with_default_window_size(Size::new(300, 200))
            .with_layout_spacing(4)
            .with_color_scheme(ColorScheme::Dark);
        assert_eq!(config.title, "Notes");
        assert_eq!(config.default_window_size, Size::new(300, 200));
        assert_eq!(config.layout_spacing, 4);
        assert_eq!(config.color_scheme, ColorScheme::Dark);
    }

    #[test]
    fn config_values_seed_the_root_environment() {
        let backend = Rc::new(HeadlessBackend::new());
        let app = App::new(
            backend,
            AppConfig::new().with_layout_spacing(3).with_color_scheme(ColorScheme::Dark),
        );
        let env = app.environment();
        assert_eq!(env.get::<LayoutSpacingKey>(), 3);
        assert_eq!(env.get::<ColorSchemeKey>(), ColorScheme::Dark);
        assert!(env.backend().is_some());
        assert!(env.main_thread().is_some());
        assert!(env.app_storage().is_some());
    }

    // ── Windows ──────────────────────────────────────────────────────

    #[test]
    fn open_window_shows_laid_out_content() {
        let (backend, mut app) = headless();
        let id = app.open_window(Rectangle::new(Color::RED));

        let window = backend.window(id).unwrap();
        assert_eq!(window.title, "Test");
        assert!(window.shown);
        assert_eq!(window.size, Size::new(900, 450));

        let scene = app.window(id).unwrap();
        assert_eq!(window.content, Some(scene.graph().root_widget()));
        let content = backend.widget(scene.graph().root_widget()).unwrap();
        assert_eq!(content.size, Size::new(900, 450));
    }

    #[test]
    fn resize_is_applied_on_the_next_tick() {
        let (backend, mut app) = headless();
        let id = app.open_window(Rectangle::new(Color::BLUE));
        let root = app.window(id).unwrap().graph().root_widget();

        backend.resize_window(id, Size::new(400, 300));
        assert_eq!(backend.widget(root).unwrap().size, Size::new(900, 450));

        assert_eq!(app.tick(), 1);
        assert_eq!(app.window(id).unwrap().size(), Size::new(400, 300));
        assert_eq!(backend.widget(root).unwrap().size, Size::new(400, 300));
        assert_eq!(app.tick(), 0);
    }

    #[test]
    fn replacing_the_root_kind_updates_window_content() {
        let (backend, mut app) = headless();
        let id = app.open_window(Rectangle::new(Color::BLUE));

        let scene = app.window_mut(id).unwrap();
        scene.update_root(Text::new("hello"));
        let root = scene.graph().root_widget();

        assert_eq!(backend.window(id).unwrap().content, Some(root));
        assert_eq!(backend.widget(root).unwrap().text.as_deref(), Some("hello"));
    }

    #[test]
    fn closing_a_window_destroys_its_widgets() {
        let (backend, mut app) = headless();
        let id = app.open_window(Text::new("bye").padding(2));
        assert_eq!(backend.widget_count(), 2);

        assert!(app.close_window(id));
        assert_eq!(backend.widget_count(), 0);
        assert!(app.window(id).is_none());
    }

    // ── Update cycle ─────────────────────────────────────────────────

    #[test]
    fn tick_runs_main_thread_work() {
        let (_backend, mut app) = headless();
        let ran = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&ran);
        let handle = app.environment().main_thread().unwrap().clone();

        std::thread::spawn(move || {
            handle.run(move || flag.store(true, Ordering::SeqCst));
        })
        .join()
        .unwrap();

        assert!(!ran.load(Ordering::SeqCst));
        assert_eq!(app.tick(), 1);
        assert!(ran.load(Ordering::SeqCst));
    }

    struct Clicks {
        count: State<u32>,
    }

    impl View for Clicks {
        fn dynamic_properties(fields: &mut PropertyFields<Self>) {
            fields.add("count", |v| &v.count);
        }

        fn content(&self) -> Vec<AnyView> {
            vec![Text::new(format!("{} clicks", self.count.get())).boxed()]
        }
    }

    #[test]
    fn run_until_idle_settles_state_changes() {
        let (backend, mut app) = headless();
        let id = app.open_window(Clicks { count: State::new(0) });
        let graph = app.window(id).unwrap().graph();
        graph.node(graph.root()).unwrap().view_as::<Clicks>().unwrap().count.set(2);

        assert_eq!(app.run_until_idle(), 2);

        let graph = app.window(id).unwrap().graph();
        assert!(backend.find_text(graph.root_widget(), "2 clicks").is_some());
    }
}
