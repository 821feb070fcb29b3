use gloo_timers::callback::Timeout;
use js_sys::{Array, Function, Object, Promise, Reflect};
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use relay_shared::{ChartLayout, Classification, DrawCommand, StatInputSet, chart_commands};

use crate::config::COPY_FEEDBACK_MS;

/// Replay a command list on a 2-D context. Coordinates are CSS pixels.
fn replay(ctx: &CanvasRenderingContext2d, commands: &[DrawCommand]) {
    ctx.set_text_baseline("middle");
    for command in commands {
        match command {
            DrawCommand::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => {
                ctx.set_fill_style_str(color);
                ctx.fill_rect(*x, *y, *width, *height);
            }
            DrawCommand::BeginPath => ctx.begin_path(),
            DrawCommand::MoveTo { x, y } => ctx.move_to(*x, *y),
            DrawCommand::LineTo { x, y } => ctx.line_to(*x, *y),
            DrawCommand::Arc {
                x,
                y,
                radius,
                start,
                end,
            } => {
                ctx.arc(*x, *y, *radius, *start, *end).ok();
            }
            DrawCommand::ClosePath => ctx.close_path(),
            DrawCommand::Fill { color } => {
                ctx.set_fill_style_str(color);
                ctx.fill();
            }
            DrawCommand::Stroke { color, width } => {
                ctx.set_stroke_style_str(color);
                ctx.set_line_width(*width);
                ctx.stroke();
            }
            DrawCommand::FillText {
                text,
                x,
                y,
                color,
                font,
                align,
            } => {
                ctx.set_font(font);
                ctx.set_text_align(align.as_css());
                ctx.set_fill_style_str(color);
                ctx.fill_text(text, *x, *y).ok();
            }
        }
    }
}

/// Size the backing store for the device pixel ratio and draw the chart.
fn draw(canvas: &HtmlCanvasElement, input: &StatInputSet, classification: &Classification) {
    let layout = ChartLayout::default();
    let dpr = web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
        .max(1.0);

    let w = (layout.width * dpr).round() as u32;
    let h = (layout.height * dpr).round() as u32;
    if canvas.width() != w || canvas.height() != h {
        canvas.set_width(w);
        canvas.set_height(h);
    }

    let Some(ctx) = canvas
        .get_context("2d")
        .ok()
        .flatten()
        .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
    else {
        return;
    };
    // Resetting the transform keeps repeated draws from compounding the scale.
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0).ok();
    replay(&ctx, &chart_commands(input, classification, &layout));
}

/// Write a PNG blob to the clipboard through the async Clipboard API.
/// Browsers without `ClipboardItem` or `navigator.clipboard.write` error out.
async fn write_png(blob: JsValue) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    if blob.is_null() {
        return Err(JsValue::from_str("canvas produced no image"));
    }

    let item_ctor: Function = Reflect::get(&window, &"ClipboardItem".into())?.dyn_into()?;
    let items = Object::new();
    Reflect::set(&items, &"image/png".into(), &blob)?;
    let item = Reflect::construct(&item_ctor, &Array::of1(&items))?;

    let clipboard = Reflect::get(&window.navigator(), &"clipboard".into())?;
    let write: Function = Reflect::get(&clipboard, &"write".into())?.dyn_into()?;
    let promise: Promise = write.call1(&clipboard, &Array::of1(&item))?.dyn_into()?;
    JsFuture::from(promise).await?;
    Ok(())
}

fn copy_chart(canvas: &HtmlCanvasElement, copied: RwSignal<bool>) {
    let on_blob = Closure::once_into_js(move |blob: JsValue| {
        spawn_local(async move {
            match write_png(blob).await {
                Ok(()) => {
                    copied.set(true);
                    Timeout::new(COPY_FEEDBACK_MS, move || copied.set(false)).forget();
                }
                Err(e) => {
                    web_sys::console::warn_1(&format!("Chart copy failed: {e:?}").into());
                    if let Some(window) = web_sys::window() {
                        let _ = window.alert_with_message(
                            "Clipboard access denied. Right-click the chart to save it instead.",
                        );
                    }
                }
            }
        });
    });
    if let Err(e) = canvas.to_blob(on_blob.unchecked_ref()) {
        web_sys::console::warn_1(&format!("Chart export failed: {e:?}").into());
    }
}

/// Overlay with the rendered stat chart and a copy-to-clipboard button.
#[component]
pub(crate) fn ChartModal(
    open: RwSignal<bool>,
    input: Memo<StatInputSet>,
    classification: Memo<Classification>,
) -> impl IntoView {
    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let copied = RwSignal::new(false);
    let layout = ChartLayout::default();

    Effect::new(move || {
        if !open.get() {
            return;
        }
        let input = input.get();
        let classification = classification.get();
        if let Some(canvas) = canvas_ref.get() {
            draw(&canvas, &input, &classification);
        }
    });

    let on_copy = move |_| {
        if let Some(canvas) = canvas_ref.get_untracked() {
            copy_chart(&canvas, copied);
        }
    };

    view! {
        <Show when=move || open.get()>
            <div
                style="position: fixed; inset: 0; display: flex; align-items: center; justify-content: center; background: rgba(0,0,0,0.75); z-index: 100;"
                on:click=move |_| open.set(false)
            >
                <div
                    style="display: flex; flex-direction: column; gap: 12px; padding: 20px; background: #0a0a0f; border: 1px solid #22222e;"
                    on:click=|ev| ev.stop_propagation()
                >
                    <canvas
                        node_ref=canvas_ref
                        style=format!("width: {}px; height: {}px;", layout.width, layout.height)
                    />
                    <div style="display: flex; gap: 8px; justify-content: flex-end;">
                        <button
                            style=move || format!(
                                "padding: 8px 16px; background: transparent; color: {c}; border: 1px solid {c}; font-family: 'JetBrains Mono', monospace; font-size: 0.75rem; cursor: pointer;",
                                c = if copied.get() { "#ff6600" } else { "#00f0ff" },
                            )
                            on:click=on_copy
                        >
                            {move || if copied.get() { "CHART COPIED!" } else { "COPY CHART" }}
                        </button>
                        <button
                            style="padding: 8px 16px; background: transparent; color: #6a6a7a; border: 1px solid #22222e; font-family: 'JetBrains Mono', monospace; font-size: 0.75rem; cursor: pointer;"
                            on:click=move |_| open.set(false)
                        >
                            "CLOSE"
                        </button>
                    </div>
                </div>
            </div>
        </Show>
    }
}
