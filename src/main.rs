use std::{cell::RefCell, io, rc::Rc};

use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};

use wealth_inc::app::App;
use wealth_inc::click::ClickMap;
use wealth_inc::config::EconomyConfig;
use wealth_inc::economy::Screen;
use wealth_inc::save::SaveStore;
use wealth_inc::{logging, render};

/// Query the grid container's bounding rect and map a pixel position to a bound key.
fn dom_pixel_to_key(mouse_x: u32, mouse_y: u32, clicks: &ClickMap) -> Option<char> {
    let window = web_sys::window()?;
    let document = window.document()?;

    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let click_x = f64::from(mouse_x) - rect.left();
    if click_x < 0.0 {
        return None;
    }
    let click_y = f64::from(mouse_y) - rect.top();
    let key = clicks.key_at_pixel(click_y, rect.height());
    tracing::trace!(mouse_y, ?key, bindings = clicks.len(), "tap");
    key
}

/// Host clock in milliseconds, preferring the monotonic `performance.now()`.
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map_or_else(js_sys::Date::now, |p| p.now())
}

#[cfg(target_arch = "wasm32")]
fn open_store(key: &str) -> Box<dyn SaveStore> {
    Box::new(wealth_inc::save::LocalStorageStore::new(key))
}

#[cfg(not(target_arch = "wasm32"))]
fn open_store(_key: &str) -> Box<dyn SaveStore> {
    Box::new(wealth_inc::save::MemoryStore::new())
}

/// Route a key to the app. Export and import need browser dialogs, so they
/// are handled here rather than in `App`.
fn dispatch(app: &mut App, key: char) {
    match (app.economy.screen(), key) {
        (Screen::Menu, 'e') => {
            if let (Some(text), Some(window)) = (app.export_save(), web_sys::window()) {
                let _ = window.prompt_with_message_and_default("Copy your save:", &text);
            }
        }
        (Screen::Menu, 'i') => {
            let pasted = web_sys::window().and_then(|w| w.prompt_with_message("Paste a save:").ok().flatten());
            if let Some(text) = pasted {
                // failures are already logged as notices
                let _ = app.import_save(&text);
            }
        }
        _ => {
            app.handle_key(key);
        }
    }
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();

    let loaded = EconomyConfig::load_embedded();
    let config = loaded.as_ref().cloned().unwrap_or_default();
    logging::init(config.logging.level());
    if let Err(e) = &loaded {
        tracing::warn!("economy.toml rejected, using defaults: {e}");
    }

    let seed = js_sys::Date::now() as u64;
    let store = open_store(&config.persistence.storage_key);
    let app = Rc::new(RefCell::new(App::new(config, store, seed)));
    let clicks = Rc::new(RefCell::new(ClickMap::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Mouse/touch click handler
    terminal.on_mouse_event({
        let app = app.clone();
        let clicks = clicks.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }
            let key = {
                let cm = clicks.borrow();
                if cm.terminal_rows == 0 {
                    return;
                }
                dom_pixel_to_key(mouse_event.x, mouse_event.y, &cm)
            };
            if let Some(key) = key {
                dispatch(&mut app.borrow_mut(), key);
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let app = app.clone();
        move |key_event| {
            let key = match key_event.code {
                KeyCode::Char(c) => c.to_ascii_lowercase(),
                KeyCode::Enter => '\n',
                KeyCode::Esc => 'm',
                _ => return,
            };
            dispatch(&mut app.borrow_mut(), key);
        }
    });

    terminal.draw_web(move |f| {
        app.borrow_mut().frame(now_ms());
        render::draw(f, &app.borrow(), &mut clicks.borrow_mut());
    });

    Ok(())
}
