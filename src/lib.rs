pub mod city;
pub mod config;
pub mod game;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use nalgebra::Vector3;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{KeyboardEvent, Request, RequestInit, RequestMode, Response, Window};

use crate::config::AppConfig;
use crate::game::input::Control;
use crate::game::{Game, GameError};

const CONFIG_PATH: &str = "/assets/config.json";

thread_local! {
    static GAME: RefCell<Option<Game>> = RefCell::new(None);
}

#[wasm_bindgen]
pub async fn init_game() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let window = web_sys::window().ok_or("No window")?;

    let loaded = fetch_text(&window, CONFIG_PATH)
        .await
        .and_then(|text| AppConfig::from_json(&text).map_err(|e| JsValue::from_str(&e.to_string())));
    let (config, config_error) = match loaded {
        Ok(c) => (c, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    let level = if config.debug { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new().set_max_level(level).build(),
    );
    if let Some(e) = config_error {
        tracing::warn!("using default config: {:?}", e);
    }

    // Load assets
    let city_model = fetch_bytes(&window, &config.city.model.path)
        .await
        .map_err(|e| tracing::warn!("city model unavailable: {:?}", e))
        .ok();
    let bus_model = fetch_bytes(&window, &config.bus.model.path)
        .await
        .map_err(|e| tracing::warn!("bus model unavailable: {:?}", e))
        .ok();

    let seed = config
        .seed
        .unwrap_or_else(|| (js_sys::Math::random() * u32::MAX as f64) as u64);
    let game = match Game::with_assets(&config, city_model.as_deref(), bus_model.as_deref(), seed) {
        Err(GameError::Asset(e)) => {
            tracing::warn!("ignoring models: {}", e);
            Game::new(&config, None, None, seed)
        }
        built => built,
    }
    .map_err(|e| JsValue::from_str(&e.to_string()))?;
    tracing::info!(seed, "game ready");
    GAME.with(|g| *g.borrow_mut() = Some(game));

    // Input handling
    let keydown = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        if let Some(control) = Control::from_key(&event.key()) {
            with_game(|game| game.input.press(control));
            event.prevent_default();
        }
    }) as Box<dyn FnMut(_)>);
    let keyup = Closure::wrap(Box::new(move |event: KeyboardEvent| {
        if let Some(control) = Control::from_key(&event.key()) {
            with_game(|game| game.input.release(control));
            event.prevent_default();
        }
    }) as Box<dyn FnMut(_)>);

    window.add_event_listener_with_callback("keydown", keydown.as_ref().unchecked_ref())?;
    window.add_event_listener_with_callback("keyup", keyup.as_ref().unchecked_ref())?;
    keydown.forget();
    keyup.forget();

    // Game loop
    let f = Rc::new(RefCell::new(None));
    let g = f.clone();
    let last_frame = Rc::new(Cell::new(js_sys::Date::now()));

    *g.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let now = js_sys::Date::now();
        let dt = ((now - last_frame.get()) / 1000.0) as f32;
        last_frame.set(now);

        with_game(|game| {
            game.update(dt);
            update_ui(game.score, game.round.remaining(), game.game_over);
        });
        if let Some(callback) = f.borrow().as_ref() {
            request_animation_frame(callback);
        }
    }) as Box<dyn FnMut()>));

    if let Some(callback) = g.borrow().as_ref() {
        request_animation_frame(callback);
    }

    Ok(())
}

async fn fetch(window: &Window, path: &str) -> Result<Response, JsValue> {
    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request = Request::new_with_str_and_init(path, &opts)?;
    let resp: Response = JsFuture::from(window.fetch_with_request(&request))
        .await?
        .dyn_into()?;
    if !resp.ok() {
        return Err(JsValue::from_str(&format!("{} returned {}", path, resp.status())));
    }
    Ok(resp)
}

async fn fetch_text(window: &Window, path: &str) -> Result<String, JsValue> {
    let resp = fetch(window, path).await?;
    let text = JsFuture::from(resp.text()?).await?;
    text.as_string().ok_or_else(|| JsValue::from_str("response is not text"))
}

async fn fetch_bytes(window: &Window, path: &str) -> Result<Vec<u8>, JsValue> {
    let resp = fetch(window, path).await?;
    let buffer = JsFuture::from(resp.array_buffer()?).await?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

fn request_animation_frame(f: &Closure<dyn FnMut()>) {
    let requested = web_sys::window()
        .ok_or_else(|| JsValue::from_str("No window"))
        .and_then(|w| w.request_animation_frame(f.as_ref().unchecked_ref()));
    if let Err(e) = requested {
        tracing::error!("frame loop stopped: {:?}", e);
    }
}

fn update_ui(score: i32, remaining: f32, game_over: bool) {
    if let Some(window) = web_sys::window() {
        if let Some(document) = window.document() {
            if let Some(score_el) = document.get_element_by_id("score") {
                score_el.set_inner_html(&format!("Passengers: {}", score));
            }
            if let Some(timer_el) = document.get_element_by_id("timer") {
                timer_el.set_inner_html(&format!("Time: {:.0}s", remaining.ceil()));
            }
            if let Some(gameover_el) = document.get_element_by_id("gameover") {
                if game_over {
                    gameover_el.set_attribute("style", "display: block;").ok();
                } else {
                    gameover_el.set_attribute("style", "display: none;").ok();
                }
            }
        }
    }
}

fn with_game<T>(f: impl FnOnce(&mut Game) -> T) -> Option<T> {
    GAME.with(|g| g.borrow_mut().as_mut().map(f))
}

fn to_js<T: Serialize>(value: Option<T>) -> Result<JsValue, JsValue> {
    let value = value.ok_or_else(|| JsValue::from_str("game not initialised"))?;
    serde_wasm_bindgen::to_value(&value).map_err(Into::into)
}

/// Chassis position reported by the physics world after each step.
#[wasm_bindgen]
pub fn report_bus_position(x: f32, y: f32, z: f32) {
    with_game(|game| game.report_bus_position(Vector3::new(x, y, z)));
}

#[wasm_bindgen]
pub fn building_placements() -> Result<JsValue, JsValue> {
    to_js(with_game(|game| game.city.buildings()))
}

#[wasm_bindgen]
pub fn start_position() -> Result<JsValue, JsValue> {
    to_js(with_game(|game| game.city.start_position()))
}

#[wasm_bindgen]
pub fn passenger_position() -> Result<JsValue, JsValue> {
    to_js(with_game(|game| game.passenger))
}

#[wasm_bindgen]
pub fn vehicle_rig() -> Result<JsValue, JsValue> {
    to_js(with_game(|game| game.rig.clone()))
}

#[wasm_bindgen]
pub fn drive_command() -> Result<JsValue, JsValue> {
    to_js(with_game(|game| game.drive_command()))
}

/// On-screen controls: `forward`, `backward`, `left`, `right`, `restart`.
#[wasm_bindgen]
pub fn press_control(name: &str) {
    if let Some(control) = Control::from_name(name) {
        with_game(|game| game.input.press(control));
    }
}

#[wasm_bindgen]
pub fn release_control(name: &str) {
    if let Some(control) = Control::from_name(name) {
        with_game(|game| game.input.release(control));
    }
}

#[wasm_bindgen]
pub fn restart() {
    with_game(Game::restart);
}
