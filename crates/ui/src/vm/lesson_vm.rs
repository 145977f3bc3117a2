use lesson_core::model::{ContentFrame, FrameKind, FrameSequence, OptionId, QuestionKind};
use services::lessons::{AssessmentView, LessonView, Notice, NoticeLevel};
use services::playback::VideoQuality;

/// Countdown values at or below this render as urgent.
const URGENT_SECS: u32 = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonHeaderVm {
    pub step_label: String,
    pub progress_percent: u8,
    pub streak_label: Option<String>,
}

#[must_use]
pub fn map_header(view: &LessonView) -> LessonHeaderVm {
    let step_label = match view.position {
        Some((index, len)) => format!("Step {} of {len}", index + 1),
        None => "Preparing lesson".to_string(),
    };
    LessonHeaderVm {
        step_label,
        progress_percent: view.progress_percent,
        streak_label: view.streak.map(|streak| format!("Streak: {streak} 🔥")),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssessmentStatus {
    LoadingQuestions,
    Unavailable,
    StartingAttempt,
    AttemptFailed,
    Ready,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionVm {
    pub id: OptionId,
    pub text: String,
    pub selected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssessmentVm {
    pub title: String,
    pub prompt: Option<String>,
    pub hint: Option<String>,
    /// `radio` or `checkbox`.
    pub input_kind: &'static str,
    pub options: Vec<OptionVm>,
    pub counter_label: Option<String>,
    pub countdown_label: String,
    pub countdown_percent: u8,
    pub countdown_urgent: bool,
    pub can_submit: bool,
    pub submit_label: &'static str,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub status: AssessmentStatus,
}

#[must_use]
pub fn map_assessment(view: &AssessmentView) -> AssessmentVm {
    let status = if view.questions_unavailable {
        AssessmentStatus::Unavailable
    } else if view.question.is_none() {
        AssessmentStatus::LoadingQuestions
    } else if view.attempt_start_pending {
        AssessmentStatus::StartingAttempt
    } else if !view.attempt_ready {
        AssessmentStatus::AttemptFailed
    } else {
        AssessmentStatus::Ready
    };

    let options = view.question.as_ref().map_or_else(Vec::new, |question| {
        question
            .options()
            .iter()
            .map(|option| OptionVm {
                id: option.id,
                text: option.text.clone(),
                selected: view.is_selected(option.id),
            })
            .collect()
    });
    let input_kind = match view.question.as_ref().map(|q| q.kind()) {
        Some(QuestionKind::MultiSelect) => "checkbox",
        _ => "radio",
    };
    let counter_label = (view.question_count > 1)
        .then(|| format!("Question {} of {}", view.question_index + 1, view.question_count));
    let countdown_percent = if view.countdown_budget == 0 {
        0
    } else {
        u8::try_from(u64::from(view.countdown) * 100 / u64::from(view.countdown_budget))
            .unwrap_or(100)
    };

    AssessmentVm {
        title: view.title.clone().unwrap_or_else(|| "Assessment".to_string()),
        prompt: view.question.as_ref().map(|q| q.text().to_string()),
        hint: view
            .question
            .as_ref()
            .and_then(|q| q.hint())
            .map(str::to_string),
        input_kind,
        options,
        counter_label,
        countdown_label: format_countdown(view.countdown),
        countdown_percent,
        countdown_urgent: view.countdown <= URGENT_SECS,
        can_submit: view.can_submit,
        submit_label: if view.submitting { "Submitting..." } else { "Submit" },
        // Navigation wraps around the question list.
        can_go_previous: !view.submitting && view.question_count > 1,
        can_go_next: !view.submitting && view.question_count > 1,
        status,
    }
}

#[must_use]
pub fn format_countdown(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

//
// ─── PLAYER SETTINGS ───────────────────────────────────────────────────────────
//

pub const PLAYBACK_RATES: [f64; 6] = [0.5, 0.75, 1.0, 1.25, 1.5, 2.0];

#[must_use]
pub fn format_rate(rate: f64) -> String {
    format!("{rate}x")
}

/// Only rates offered in [`PLAYBACK_RATES`] are accepted.
#[must_use]
pub fn parse_rate(raw: &str) -> Option<f64> {
    let rate = raw.trim().parse::<f64>().ok()?;
    PLAYBACK_RATES
        .into_iter()
        .find(|known| (known - rate).abs() < f64::EPSILON)
}

#[must_use]
pub fn parse_quality(raw: &str) -> Option<VideoQuality> {
    VideoQuality::ALL
        .into_iter()
        .find(|quality| quality.as_str() == raw.trim())
}

//
// ─── NOTICES ───────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToastVm {
    pub id: u64,
    pub message: String,
    pub class: &'static str,
}

/// `None` for notices that are not shown as toasts.
#[must_use]
pub fn map_notice(id: u64, notice: &Notice) -> Option<ToastVm> {
    if !notice.is_toast() {
        return None;
    }
    let class = match notice.level() {
        NoticeLevel::Info => "toast toast--info",
        NoticeLevel::Success => "toast toast--success",
        NoticeLevel::Warning => "toast toast--warning",
        NoticeLevel::Error => "toast toast--error",
    };
    Some(ToastVm {
        id,
        message: notice.message(),
        class,
    })
}

//
// ─── OUTLINE ───────────────────────────────────────────────────────────────────
//

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutlineState {
    Done,
    Current,
    Upcoming,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutlineItemVm {
    pub label: String,
    pub kind_label: &'static str,
    pub state: OutlineState,
}

/// Navigation rail entries. Frames before `current` count as done.
#[must_use]
pub fn map_outline(frames: &FrameSequence, current: Option<usize>) -> Vec<OutlineItemVm> {
    frames
        .frames()
        .iter()
        .enumerate()
        .map(|(index, frame)| {
            let state = match current {
                Some(current) if index < current => OutlineState::Done,
                Some(current) if index == current => OutlineState::Current,
                _ => OutlineState::Upcoming,
            };
            OutlineItemVm {
                label: frame_label(frame, index),
                kind_label: kind_label(frame.kind()),
                state,
            }
        })
        .collect()
}

fn frame_label(frame: &ContentFrame, index: usize) -> String {
    frame
        .title()
        .map_or_else(|| format!("{} {}", kind_label(frame.kind()), index + 1), str::to_string)
}

fn kind_label(kind: FrameKind) -> &'static str {
    match kind {
        FrameKind::Video => "Video",
        FrameKind::Article => "Article",
        FrameKind::Assessment => "Assessment",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::model::{
        AnswerOption, Article, FrameBody, FrameId, Question, QuestionId, VideoSegment,
    };
    use services::lessons::FrameView;

    fn assessment_view() -> AssessmentView {
        AssessmentView {
            title: None,
            question: Some(
                Question::new(
                    QuestionId::new(1),
                    "Pick two",
                    QuestionKind::MultiSelect,
                    vec![
                        AnswerOption::new(OptionId::new(1), "A"),
                        AnswerOption::new(OptionId::new(2), "B"),
                    ],
                    Some("Think twice".into()),
                )
                .unwrap(),
            ),
            questions_unavailable: false,
            question_index: 0,
            question_count: 2,
            selected: vec![OptionId::new(2)],
            countdown: 9,
            countdown_budget: 30,
            can_submit: true,
            submitting: false,
            attempt_ready: true,
            attempt_start_pending: false,
        }
    }

    #[test]
    fn assessment_maps_selection_and_countdown() {
        let vm = map_assessment(&assessment_view());
        assert_eq!(vm.status, AssessmentStatus::Ready);
        assert_eq!(vm.input_kind, "checkbox");
        assert_eq!(vm.countdown_label, "0:09");
        assert_eq!(vm.countdown_percent, 30);
        assert!(vm.countdown_urgent);
        assert_eq!(vm.counter_label.as_deref(), Some("Question 1 of 2"));
        assert!(!vm.options[0].selected);
        assert!(vm.options[1].selected);
        assert!(vm.can_go_next);
        assert!(vm.can_go_previous);
        assert_eq!(vm.hint.as_deref(), Some("Think twice"));
    }

    #[test]
    fn submitting_locks_navigation() {
        let view = AssessmentView {
            submitting: true,
            can_submit: false,
            ..assessment_view()
        };
        let vm = map_assessment(&view);
        assert_eq!(vm.submit_label, "Submitting...");
        assert!(!vm.can_go_next);
        assert!(!vm.can_go_previous);
    }

    #[test]
    fn single_question_has_nowhere_to_go() {
        let view = AssessmentView {
            question_count: 1,
            ..assessment_view()
        };
        let vm = map_assessment(&view);
        assert!(!vm.can_go_next);
        assert!(!vm.can_go_previous);
    }

    #[test]
    fn player_settings_parse_offered_values() {
        assert_eq!(format_rate(1.25), "1.25x");
        assert_eq!(format_rate(2.0), "2x");
        assert_eq!(parse_rate("1.5"), Some(1.5));
        assert_eq!(parse_rate("3"), None);
        assert_eq!(parse_rate("fast"), None);
        assert_eq!(parse_quality("hd1080"), Some(VideoQuality::Hd1080));
        assert_eq!(parse_quality("default"), Some(VideoQuality::Auto));
        assert_eq!(parse_quality("4k"), None);
    }

    #[test]
    fn failed_attempt_start_is_visible() {
        let view = AssessmentView {
            attempt_ready: false,
            can_submit: false,
            ..assessment_view()
        };
        assert_eq!(map_assessment(&view).status, AssessmentStatus::AttemptFailed);
    }

    #[test]
    fn header_labels() {
        let view = LessonView {
            frame: FrameView::Placeholder,
            position: Some((1, 4)),
            progress_percent: 25,
            streak: Some(3),
        };
        let header = map_header(&view);
        assert_eq!(header.step_label, "Step 2 of 4");
        assert_eq!(header.streak_label.as_deref(), Some("Streak: 3 🔥"));
        assert_eq!(map_header(&LessonView::placeholder()).step_label, "Preparing lesson");
    }

    #[test]
    fn streak_notice_is_not_a_toast() {
        assert!(map_notice(1, &Notice::StreakUpdated(2)).is_none());
        let toast = map_notice(2, &Notice::IncorrectAnswer).unwrap();
        assert_eq!(toast.class, "toast toast--warning");
        assert_eq!(toast.message, "Incorrect Answer! The segment will now run again.");
    }

    #[test]
    fn outline_marks_progress() {
        let segment = VideoSegment::parse("https://youtu.be/abc", 0.0, 5.0).unwrap();
        let frames = FrameSequence::new(vec![
            ContentFrame::new(FrameId::new(1), 1, None, FrameBody::Video(segment)).unwrap(),
            ContentFrame::new(FrameId::new(2), 2, None, FrameBody::Assessment).unwrap(),
            ContentFrame::new(
                FrameId::new(3),
                3,
                Some("Wrap-up".into()),
                FrameBody::Article(Article::new("Done")),
            )
            .unwrap(),
        ])
        .unwrap();
        let outline = map_outline(&frames, Some(1));
        assert_eq!(outline[0].label, "Video 1");
        assert_eq!(outline[0].state, OutlineState::Done);
        assert_eq!(outline[1].state, OutlineState::Current);
        assert_eq!(outline[2].label, "Wrap-up");
        assert_eq!(outline[2].kind_label, "Article");
        assert_eq!(outline[2].state, OutlineState::Upcoming);
    }
}
