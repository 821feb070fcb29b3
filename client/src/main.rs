mod api;
mod app;
mod chart;
mod chat;
mod config;
mod mentions;
mod stats_panel;
mod storage;
mod tickets;
mod time_format;

use leptos::mount::mount_to;
use std::any::Any;
use std::cell::RefCell;
use wasm_bindgen::JsCast;

thread_local! {
    static APP_MOUNT_HANDLE: RefCell<Option<Box<dyn Any>>> = RefCell::new(None);
}

/// `#app` when the host page provides it, otherwise `<body>`.
fn mount_target() -> Option<web_sys::HtmlElement> {
    let document = web_sys::window()?.document()?;
    document
        .get_element_by_id("app")
        .and_then(|node| node.dyn_into::<web_sys::HtmlElement>().ok())
        .or_else(|| document.body())
}

fn main() {
    console_error_panic_hook::set_once();
    let Some(target) = mount_target() else {
        web_sys::console::error_1(&"Tryout relay: no mount point".into());
        return;
    };

    APP_MOUNT_HANDLE.with(move |slot| {
        // A second mount would leave the old polling loops writing to dead signals.
        let _old = slot.borrow_mut().take();
        let handle = mount_to(target, app::App);
        *slot.borrow_mut() = Some(Box::new(handle));
    });
}
