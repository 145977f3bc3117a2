use dioxus::prelude::*;
use lesson_core::model::OptionId;
use services::lessons::QuestionStep;

use services::playback::VideoQuality;

use crate::vm::{
    AssessmentStatus, AssessmentVm, LessonHeaderVm, OutlineItemVm, OutlineState, PLAYBACK_RATES,
    ToastVm, format_rate, parse_quality, parse_rate,
};

#[component]
pub fn LessonHeader(vm: LessonHeaderVm) -> Element {
    let width = format!("width: {}%", vm.progress_percent);
    rsx! {
        header { class: "lesson-header",
            span { class: "lesson-step", "{vm.step_label}" }
            div { class: "lesson-progress",
                div { class: "lesson-progress-bar", style: "{width}" }
            }
            if let Some(streak) = vm.streak_label.as_ref() {
                span { class: "lesson-streak", "{streak}" }
            }
        }
    }
}

#[component]
pub fn VideoControls(
    title: Option<String>,
    playing: bool,
    rate: f64,
    quality: VideoQuality,
    captions: bool,
    on_play_pause: EventHandler<()>,
    on_rate: EventHandler<f64>,
    on_quality: EventHandler<VideoQuality>,
    on_captions: EventHandler<bool>,
) -> Element {
    let label = if playing { "Pause" } else { "Play" };
    let captions_label = if captions { "Captions: On" } else { "Captions: Off" };
    let rate_options = PLAYBACK_RATES.map(|option| (option, format_rate(option)));
    let quality_options = VideoQuality::ALL.map(|option| (option, option.label()));
    rsx! {
        div { class: "video-controls",
            if let Some(title) = title.as_ref() {
                h3 { class: "frame-title", "{title}" }
            }
            div { class: "video-buttons",
                button {
                    id: "lesson-play-pause",
                    class: "btn btn-primary",
                    r#type: "button",
                    onclick: move |_| on_play_pause.call(()),
                    "{label}"
                }
                label { class: "video-setting",
                    "Speed"
                    select {
                        class: "video-rate",
                        onchange: move |evt: FormEvent| {
                            if let Some(rate) = parse_rate(&evt.value()) {
                                on_rate.call(rate);
                            }
                        },
                        for (option_rate, text) in rate_options {
                            option {
                                key: "{option_rate}",
                                value: "{option_rate}",
                                selected: (option_rate - rate).abs() < f64::EPSILON,
                                "{text}"
                            }
                        }
                    }
                }
                label { class: "video-setting",
                    "Quality"
                    select {
                        class: "video-quality",
                        onchange: move |evt: FormEvent| {
                            if let Some(quality) = parse_quality(&evt.value()) {
                                on_quality.call(quality);
                            }
                        },
                        for (option_quality, text) in quality_options {
                            option {
                                key: "{option_quality:?}",
                                value: option_quality.as_str(),
                                selected: option_quality == quality,
                                "{text}"
                            }
                        }
                    }
                }
                button {
                    class: "btn btn-secondary video-captions",
                    r#type: "button",
                    onclick: move |_| on_captions.call(!captions),
                    "{captions_label}"
                }
            }
        }
    }
}

#[component]
pub fn ArticlePanel(title: Option<String>, html: String, on_next: EventHandler<()>) -> Element {
    rsx! {
        section { class: "article-panel",
            if let Some(title) = title.as_ref() {
                h3 { class: "frame-title", "{title}" }
            }
            div { class: "article-body", dangerous_inner_html: "{html}" }
            button {
                id: "lesson-next",
                class: "btn btn-primary article-next",
                r#type: "button",
                onclick: move |_| on_next.call(()),
                "Next Part"
            }
        }
    }
}

#[component]
pub fn AssessmentPanel(
    vm: AssessmentVm,
    on_toggle: EventHandler<OptionId>,
    on_submit: EventHandler<()>,
    on_back: EventHandler<()>,
    on_navigate: EventHandler<QuestionStep>,
    on_retry: EventHandler<()>,
) -> Element {
    let countdown_class = if vm.countdown_urgent {
        "countdown countdown--urgent"
    } else {
        "countdown"
    };
    let countdown_width = format!("width: {}%", vm.countdown_percent);
    let options = vm.options.iter().map(|option| {
        let id = option.id;
        let class = if option.selected {
            "answer-option answer-option--selected"
        } else {
            "answer-option"
        };
        rsx! {
            label { key: "{id}", class: "{class}",
                input {
                    r#type: vm.input_kind,
                    name: "answer",
                    checked: option.selected,
                    onclick: move |_| on_toggle.call(id),
                }
                span { "{option.text}" }
            }
        }
    });

    rsx! {
        section { class: "assessment-panel",
            header { class: "assessment-header",
                h3 { class: "frame-title", "{vm.title}" }
                div { class: "{countdown_class}",
                    span { class: "countdown-label", "{vm.countdown_label}" }
                    div { class: "countdown-track",
                        div { class: "countdown-bar", style: "{countdown_width}" }
                    }
                }
            }
            match vm.status {
                AssessmentStatus::LoadingQuestions => rsx! {
                    p { class: "assessment-status", "Loading questions..." }
                },
                AssessmentStatus::Unavailable => rsx! {
                    p { class: "assessment-status", "No assessment data available." }
                },
                _ => rsx! {
                    if let Some(counter) = vm.counter_label.as_ref() {
                        p { class: "question-counter", "{counter}" }
                    }
                    if let Some(prompt) = vm.prompt.as_ref() {
                        p { class: "question-text", "{prompt}" }
                    }
                    if let Some(hint) = vm.hint.as_ref() {
                        p { class: "question-hint", "Hint: {hint}" }
                    }
                    div { class: "answer-options", {options} }
                },
            }
            if vm.status == AssessmentStatus::AttemptFailed {
                div { class: "attempt-failed",
                    span { "The assessment could not be started." }
                    button {
                        class: "btn btn-secondary",
                        r#type: "button",
                        onclick: move |_| on_retry.call(()),
                        "Retry"
                    }
                }
            }
            footer { class: "assessment-actions",
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    onclick: move |_| on_back.call(()),
                    "Back to Video"
                }
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    disabled: !vm.can_go_previous,
                    onclick: move |_| on_navigate.call(QuestionStep::Previous),
                    "Previous"
                }
                button {
                    class: "btn btn-secondary",
                    r#type: "button",
                    disabled: !vm.can_go_next,
                    onclick: move |_| on_navigate.call(QuestionStep::Next),
                    "Next"
                }
                button {
                    id: "lesson-submit",
                    class: "btn btn-primary",
                    r#type: "button",
                    disabled: !vm.can_submit,
                    onclick: move |_| on_submit.call(()),
                    "{vm.submit_label}"
                }
            }
        }
    }
}

#[component]
pub fn CompletedPanel() -> Element {
    rsx! {
        section { class: "completed-panel",
            h3 { "Section complete!" }
            p { "Every assessment in this section has been answered." }
        }
    }
}

#[component]
pub fn ToastStack(toasts: Vec<ToastVm>) -> Element {
    rsx! {
        div { class: "toast-stack",
            for toast in toasts {
                div { key: "{toast.id}", class: "{toast.class}", "{toast.message}" }
            }
        }
    }
}

#[component]
pub fn OutlineRail(items: Vec<OutlineItemVm>) -> Element {
    rsx! {
        ol { class: "outline-rail",
            for (index, item) in items.into_iter().enumerate() {
                li {
                    key: "{index}",
                    class: match item.state {
                        OutlineState::Done => "outline-item outline-item--done",
                        OutlineState::Current => "outline-item outline-item--current",
                        OutlineState::Upcoming => "outline-item",
                    },
                    span { class: "outline-kind", "{item.kind_label}" }
                    span { class: "outline-label", "{item.label}" }
                }
            }
        }
    }
}
