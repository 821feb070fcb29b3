use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use leptos::prelude::*;

use relay_shared::colors::hex_css;
use relay_shared::snapshot::SaveOutcome;
use relay_shared::{StatMode, StatSnapshot, classify};

use crate::chart::ChartModal;
use crate::config::SAVE_INDICATOR_MS;
use crate::storage;

#[derive(Clone, Copy, PartialEq, Eq)]
enum SaveStatus {
    Idle,
    Saving,
    Saved,
}

impl SaveStatus {
    fn text(self) -> &'static str {
        match self {
            Self::Idle => "",
            Self::Saving => "SAVING...",
            Self::Saved => "DATA SAVED LOCALLY",
        }
    }
}

#[component]
fn ModeButton(mode: StatMode, sheet: RwSignal<StatSnapshot>) -> impl IntoView {
    view! {
        <button
            style=move || {
                let active = sheet.with(|s| s.mode == mode);
                let accent = hex_css(mode.accent_rgb());
                format!(
                    "flex: 1; padding: 8px 0; background: {}; color: {}; border: 1px solid {accent}; font-family: 'JetBrains Mono', monospace; font-size: 0.8rem; letter-spacing: 0.1em; cursor: pointer;",
                    if active { accent.as_str() } else { "transparent" },
                    if active { "#0a0a0f" } else { accent.as_str() },
                )
            }
            on:click=move |_| {
                if sheet.with_untracked(|s| s.mode != mode) {
                    sheet.update(|s| s.mode = mode);
                }
            }
        >
            {mode.label()}
        </button>
    }
}

/// Stat entry form for a tryout with live average, rank and chart.
///
/// Every edit is written back to localStorage. Raw input text is kept, so
/// switching modes and back restores what was typed for the other mode.
#[component]
pub(crate) fn StatsPanel() -> impl IntoView {
    let sheet = RwSignal::new(storage::load_sheet());
    let input = Memo::new(move |_| sheet.with(StatSnapshot::input_set));
    let classification = Memo::new(move |_| classify(&input.get()));
    let chart_open = RwSignal::new(false);
    let status = RwSignal::new(SaveStatus::Idle);
    // Held so a newer save can cancel the pending "saved" flip.
    let indicator = Rc::new(RefCell::new(None::<Timeout>));

    Effect::new(move || {
        let outcome = sheet.with(storage::save_sheet);
        if outcome == Some(SaveOutcome::Written) {
            status.set(SaveStatus::Saving);
            if let Some(pending) = indicator.borrow_mut().take() {
                pending.cancel();
            }
            let timeout = Timeout::new(SAVE_INDICATOR_MS, move || status.set(SaveStatus::Saved));
            *indicator.borrow_mut() = Some(timeout);
        }
    });

    let fields = move || {
        let mode = sheet.with(|s| s.mode);
        mode.fields()
            .iter()
            .map(|field| {
                let key = field.key;
                view! {
                    <label style="display: flex; align-items: center; justify-content: space-between; gap: 12px; padding: 6px 0;">
                        <span style="font-family: 'JetBrains Mono', monospace; font-size: 0.75rem; letter-spacing: 0.08em; color: #8a8a9a;">
                            {field.label}
                        </span>
                        <input
                            type="number"
                            min="0"
                            max="10"
                            step="0.1"
                            placeholder="0.0"
                            style="width: 90px; padding: 6px 8px; background: #12121a; border: 1px solid #22222e; color: #e0e0e8; font-family: 'JetBrains Mono', monospace; text-align: right; outline: none;"
                            prop:value=move || sheet.with(|s| s.raw_value(key).to_string())
                            on:input=move |ev| {
                                let value = event_target_value(&ev);
                                sheet.update(|s| {
                                    s.stats.insert(key.to_string(), value);
                                });
                            }
                        />
                    </label>
                }
            })
            .collect_view()
    };

    let result_color = move || hex_css(classification.with(|c| c.color));

    view! {
        <main style="display: flex; flex: 1; justify-content: center; overflow-y: auto; padding: 32px 16px;">
            <div style="display: flex; flex-direction: column; gap: 18px; width: 100%; max-width: 460px;">
                <div style="display: flex; gap: 8px;">
                    <ModeButton mode=StatMode::Outfield sheet=sheet />
                    <ModeButton mode=StatMode::Goalkeeper sheet=sheet />
                </div>

                <div style="padding: 12px 16px; background: #0e0e15; border: 1px solid #22222e;">
                    {fields}
                </div>

                <div style="display: flex; flex-direction: column; align-items: center; gap: 6px; padding: 16px; border: 1px solid #22222e;">
                    <span style="font-family: 'JetBrains Mono', monospace; font-size: 0.7rem; color: #5a5a6a;">"AVERAGE"</span>
                    <span style=move || format!("font-family: 'JetBrains Mono', monospace; font-size: 2rem; font-weight: 700; color: {};", result_color())>
                        {move || classification.with(|c| c.average_label())}
                    </span>
                    <span style=move || format!("font-size: 0.95rem; font-weight: 600; letter-spacing: 0.06em; color: {};", result_color())>
                        {move || classification.with(|c| c.rank.clone())}
                    </span>
                </div>

                <textarea
                    placeholder="SCOUT NOTES..."
                    rows="4"
                    style="padding: 10px 12px; background: #12121a; border: 1px solid #22222e; color: #e0e0e8; font-family: 'Inter', system-ui, sans-serif; font-size: 0.85rem; resize: vertical; outline: none;"
                    prop:value=move || sheet.with(|s| s.notes.clone())
                    on:input=move |ev| {
                        let value = event_target_value(&ev);
                        sheet.update(|s| s.notes = value);
                    }
                ></textarea>

                <div style="display: flex; align-items: center; justify-content: space-between;">
                    <span style="font-family: 'JetBrains Mono', monospace; font-size: 0.7rem; color: #5a5a6a;">
                        {move || status.get().text()}
                    </span>
                    <button
                        style="padding: 10px 18px; background: #00f0ff; color: #0a0a0f; border: none; font-family: 'JetBrains Mono', monospace; font-size: 0.75rem; font-weight: 700; cursor: pointer;"
                        on:click=move |_| chart_open.set(true)
                    >
                        "GENERATE CHART"
                    </button>
                </div>
            </div>
            <ChartModal open=chart_open input=input classification=classification />
        </main>
    }
}
