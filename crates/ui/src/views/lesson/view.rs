use std::time::Duration;

use dioxus::prelude::*;
use services::lessons::{FrameView, LessonView, Notice};
use services::playback::VideoQuality;
use services::{LessonHandle, PlaybackSurface};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::components::{
    ArticlePanel, AssessmentPanel, CompletedPanel, LessonHeader, ToastStack, VideoControls,
};
use crate::context::AppContext;
use crate::playback::{PLAYER_ELEMENT_ID, YoutubePlayer};
use crate::proctoring::{forward_penalties, is_locked_shortcut};
use crate::vm::{ToastVm, article_html, map_assessment, map_header, map_notice};

const TOAST_TTL: Duration = Duration::from_secs(4);

#[component]
pub fn PlayerView() -> Element {
    let ctx = use_context::<AppContext>();
    let mut snapshot = use_signal(LessonView::placeholder);
    let mut lesson = use_signal(|| None::<LessonHandle>);
    let toasts = use_signal(Vec::<ToastVm>::new);
    let mut load_error = use_signal(|| None::<String>);
    let player = use_hook(|| YoutubePlayer::new(PLAYER_ELEMENT_ID));
    let mut rate = use_signal(|| 1.0_f64);
    let mut quality = use_signal(VideoQuality::default);
    let mut captions = use_signal(|| false);

    let lesson_player = player.clone();
    use_future(move || {
        let ctx = ctx.clone();
        let player = lesson_player.clone();
        async move {
            let target = ctx.target();
            // Listen for player callbacks before the driver sends its first command.
            let bridge = player.install();
            let opened = ctx
                .lesson_loop()
                .open_section(target.context, target.entry, player.clone())
                .await;
            let (driver, handle) = match opened {
                Ok(opened) => opened,
                Err(err) => {
                    warn!(error = %err, "failed to open section");
                    load_error.set(Some(err.to_string()));
                    return;
                }
            };

            spawn(bridge.run(handle.playback_sink()));
            spawn(forward_views(handle.views(), snapshot));
            spawn(forward_notices(handle.subscribe_notices(), toasts));
            spawn(forward_penalties(handle.clone()));
            lesson.set(Some(handle));

            let exit = driver.run().await;
            info!(?exit, "lesson stopped");
        }
    });

    use_drop(move || {
        if let Ok(guard) = lesson.try_peek() {
            if let Some(handle) = guard.as_ref() {
                handle.teardown();
            }
        }
    });

    let view = snapshot.read().clone();
    let header = map_header(&view);
    let player_class = if matches!(view.frame, FrameView::Video { .. }) {
        "player-frame"
    } else {
        "player-frame player-frame--hidden"
    };

    let body = match &view.frame {
        FrameView::Placeholder => match load_error() {
            Some(message) => rsx! {
                div { class: "lesson-status lesson-status--error",
                    p { "This section could not be opened." }
                    p { class: "lesson-status-detail", "{message}" }
                }
            },
            None => rsx! {
                p { class: "lesson-status", "Loading lesson..." }
            },
        },
        FrameView::Video { title, playing, .. } => {
            let rate_player = player.clone();
            let quality_player = player.clone();
            let captions_player = player.clone();
            rsx! {
                VideoControls {
                    title: title.clone(),
                    playing: *playing,
                    rate: rate(),
                    quality: quality(),
                    captions: captions(),
                    on_play_pause: move |()| with_lesson(lesson, LessonHandle::play_pause),
                    on_rate: move |value: f64| {
                        rate_player.set_playback_rate(value);
                        rate.set(value);
                    },
                    on_quality: move |value: VideoQuality| {
                        quality_player.set_quality(value);
                        quality.set(value);
                    },
                    on_captions: move |enabled: bool| {
                        captions_player.set_captions(enabled);
                        captions.set(enabled);
                    },
                }
            }
        }
        FrameView::Article { title, body } => rsx! {
            ArticlePanel {
                title: title.clone(),
                html: article_html(body),
                on_next: move |()| with_lesson(lesson, LessonHandle::next),
            }
        },
        FrameView::Assessment(assessment) => rsx! {
            AssessmentPanel {
                vm: map_assessment(assessment),
                on_toggle: move |option| with_lesson(lesson, |handle| handle.toggle_option(option)),
                on_submit: move |()| with_lesson(lesson, LessonHandle::submit),
                on_back: move |()| with_lesson(lesson, LessonHandle::back),
                on_navigate: move |step| with_lesson(lesson, |handle| handle.navigate(step)),
                on_retry: move |()| with_lesson(lesson, LessonHandle::retry_attempt_start),
            }
        },
        FrameView::Completed => rsx! {
            CompletedPanel {}
        },
    };

    rsx! {
        div {
            class: "lesson",
            tabindex: "0",
            onkeydown: move |evt: KeyboardEvent| {
                if is_locked_shortcut(&evt.data.key(), evt.data.modifiers()) {
                    evt.prevent_default();
                }
            },
            oncontextmenu: move |evt: MouseEvent| evt.prevent_default(),
            LessonHeader { vm: header }
            div { class: "{player_class}",
                div { id: PLAYER_ELEMENT_ID }
            }
            {body}
            ToastStack { toasts: toasts() }
        }
    }
}

fn with_lesson(lesson: Signal<Option<LessonHandle>>, send: impl FnOnce(&LessonHandle) -> bool) {
    let guard = lesson.peek();
    let Some(handle) = guard.as_ref() else {
        debug!("lesson not open yet");
        return;
    };
    if !send(handle) {
        debug!("lesson already stopped");
    }
}

async fn forward_views(mut views: watch::Receiver<LessonView>, mut snapshot: Signal<LessonView>) {
    loop {
        let view = views.borrow_and_update().clone();
        snapshot.set(view);
        if views.changed().await.is_err() {
            break;
        }
    }
}

async fn forward_notices(mut notices: broadcast::Receiver<Notice>, mut toasts: Signal<Vec<ToastVm>>) {
    let mut next_id = 0_u64;
    loop {
        match notices.recv().await {
            Ok(notice) => {
                next_id += 1;
                let Some(toast) = map_notice(next_id, &notice) else {
                    continue;
                };
                let id = toast.id;
                toasts.write().push(toast);
                spawn(async move {
                    tokio::time::sleep(TOAST_TTL).await;
                    toasts.write().retain(|toast| toast.id != id);
                });
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "lesson notices dropped");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
