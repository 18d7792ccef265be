#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod geom;
pub mod landmarks;
pub mod pipeline;

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

pub use config::PlannerConfig;
pub use error::{PlanError, PlanResult};
pub use pipeline::{ActionKind, ArtifactKind, Planner, RenderItem, SequencerState};

use geom::Point3;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

#[derive(Debug, Default, Serialize, PartialEq)]
struct GeometryDiff {
    added: Vec<RenderItem>,
    updated: Vec<RenderItem>,
    removed: Vec<String>,
}

/// Browser entry point wrapping one [`Planner`].
#[wasm_bindgen]
pub struct Engine {
    planner: Planner,
    geometry_map: BTreeMap<String, RenderItem>,
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<Engine, JsValue> {
        let planner = Planner::new().map_err(to_js_error)?;
        Ok(Engine::from_planner(planner))
    }

    /// Build an engine from a (partial) `PlannerConfig` object.
    #[wasm_bindgen]
    pub fn with_config(config: JsValue) -> Result<Engine, JsValue> {
        let config: PlannerConfig = if config.is_undefined() || config.is_null() {
            PlannerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|err| js_error(&format!("invalid planner configuration: {err}")))?
        };
        let planner = Planner::with_config(config).map_err(to_js_error)?;
        Ok(Engine::from_planner(planner))
    }

    /// Store a landmark and return the resulting state name.
    #[wasm_bindgen]
    pub fn set_landmark(&mut self, index: usize, x: f64, y: f64, z: f64) -> Result<String, JsValue> {
        self.planner
            .set_landmark(index, Point3::new(x, y, z))
            .map(|state| state.to_string())
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn landmark_count(&self) -> usize {
        self.planner.landmarks().count()
    }

    /// Run an action by its snake_case name, e.g. `create_valgus_plane`.
    #[wasm_bindgen]
    pub fn perform(&mut self, action: &str) -> Result<String, JsValue> {
        let action = parse_action(action)?;
        self.planner
            .perform(action)
            .map(|state| state.to_string())
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn rotate_valgus(&mut self, degrees: f64) -> Result<String, JsValue> {
        self.planner
            .rotate_valgus(degrees)
            .map(|state| state.to_string())
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn rotate_flexion(&mut self, degrees: f64) -> Result<String, JsValue> {
        self.planner
            .rotate_flexion(degrees)
            .map(|state| state.to_string())
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn adjust_resection(&mut self, delta: f64) -> Result<f64, JsValue> {
        self.planner.adjust_resection(delta).map_err(to_js_error)?;
        Ok(self.planner.resection().distance())
    }

    #[wasm_bindgen]
    pub fn set_resection(&mut self, distance: f64) -> Result<f64, JsValue> {
        self.planner.set_resection(distance).map_err(to_js_error)?;
        Ok(self.planner.resection().distance())
    }

    #[wasm_bindgen]
    pub fn toggle_resection_plane(&mut self) -> Result<bool, JsValue> {
        self.planner
            .toggle_resection_visibility()
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn set_view_position(&mut self, x: f64, y: f64, z: f64) -> Result<String, JsValue> {
        self.planner
            .set_view_position(Point3::new(x, y, z))
            .map(|state| state.to_string())
            .map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn current_state(&self) -> String {
        self.planner.current_state().to_string()
    }

    /// Names of the actions that can run right now.
    #[wasm_bindgen]
    pub fn available_actions(&self) -> Result<JsValue, JsValue> {
        let names: Vec<&str> = self
            .planner
            .available_actions()
            .into_iter()
            .map(ActionKind::name)
            .collect();
        serde_wasm_bindgen::to_value(&names).map_err(|err| JsError::new(&err.to_string()).into())
    }

    #[wasm_bindgen]
    pub fn revert_to(&mut self, state: &str) -> Result<String, JsValue> {
        let state: SequencerState = state.parse().map_err(|err: String| js_error(&err))?;
        Ok(self.planner.revert_to(state).to_string())
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.planner.reset();
    }

    /// Drain queued status messages.
    #[wasm_bindgen]
    pub fn take_status(&mut self) -> Result<JsValue, JsValue> {
        let messages = self.planner.take_status();
        serde_wasm_bindgen::to_value(&messages).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Viewport items changed since the previous call, as a diff.
    #[wasm_bindgen]
    pub fn get_geometry(&mut self) -> Result<JsValue, JsValue> {
        let diff = self.geometry_diff();
        serde_wasm_bindgen::to_value(&diff).map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Textual view of the artifact recomputation order.
    #[wasm_bindgen]
    pub fn get_topology_map(&self) -> String {
        topology_map(&self.planner)
    }
}

impl Engine {
    fn from_planner(planner: Planner) -> Self {
        Self {
            planner,
            geometry_map: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    fn geometry_diff(&mut self) -> GeometryDiff {
        let (diff, next) = diff_geometry(&self.geometry_map, self.planner.render_items());
        self.geometry_map = next;
        diff
    }
}

fn diff_geometry(
    previous: &BTreeMap<String, RenderItem>,
    items: Vec<RenderItem>,
) -> (GeometryDiff, BTreeMap<String, RenderItem>) {
    let mut diff = GeometryDiff::default();
    let mut next = BTreeMap::new();

    for item in items {
        let name = item.name().to_owned();
        match previous.get(&name) {
            Some(existing) if *existing == item => {}
            Some(_) => diff.updated.push(item.clone()),
            None => diff.added.push(item.clone()),
        }
        next.insert(name, item);
    }

    diff.removed = previous
        .keys()
        .filter(|name| !next.contains_key(*name))
        .cloned()
        .collect();

    (diff, next)
}

fn topology_map(planner: &Planner) -> String {
    planner
        .graph()
        .order()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn parse_action(name: &str) -> Result<ActionKind, JsValue> {
    name.parse().map_err(|err: String| js_error(&err))
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
