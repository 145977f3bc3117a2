use dioxus::prelude::*;
use dioxus_router::Link;
use tracing::warn;

use crate::context::AppContext;
use crate::routes::Route;
use crate::views::lesson::OutlineRail;
use crate::views::{ViewError, ViewState, view_state_from_resource};
use crate::vm::{OutlineItemVm, map_outline};

/// Section overview: every frame in order, with the entry frame marked.
#[component]
pub fn OutlineView() -> Element {
    let ctx = use_context::<AppContext>();
    let target = ctx.target();
    let section_id = target.context.section_id;
    let remote_label = if ctx.remote_enabled() {
        "Grading: connected"
    } else {
        "Grading: offline"
    };

    let resource = use_resource(move || {
        let lesson_loop = ctx.lesson_loop();
        let entry = target.entry;
        async move {
            let (frames, start) = lesson_loop
                .load_section(section_id, entry)
                .await
                .map_err(|err| {
                    warn!(error = %err, %section_id, "outline load failed");
                    ViewError::Unknown
                })?;
            Ok::<Vec<OutlineItemVm>, ViewError>(map_outline(&frames, Some(start)))
        }
    });
    let state = view_state_from_resource(&resource);

    rsx! {
        div { class: "page",
            h2 { "Section {section_id}" }
            p { class: "outline-remote", "{remote_label}" }
            match state {
                ViewState::Idle => rsx! {
                    p { "Idle" }
                },
                ViewState::Loading => rsx! {
                    p { "Loading..." }
                },
                ViewState::Ready(items) => rsx! {
                    OutlineRail { items }
                    Link { class: "btn btn-primary", to: Route::Lesson {}, "Continue" }
                },
                ViewState::Error(_) => rsx! {
                    p { "{ViewError::message()}" }
                },
            }
        }
    }
}
