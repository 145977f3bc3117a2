mod article_vm;
mod lesson_vm;

pub use article_vm::{article_html, markdown_to_html, sanitize_html};
pub use lesson_vm::{
    AssessmentStatus, AssessmentVm, LessonHeaderVm, OptionVm, OutlineItemVm, OutlineState,
    PLAYBACK_RATES, ToastVm, format_countdown, format_rate, map_assessment, map_header,
    map_notice, map_outline, parse_quality, parse_rate,
};
