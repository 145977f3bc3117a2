use lesson_core::model::FrameId;
use lesson_core::time::fixed_now;
use storage::repository::{ContentStore, ResumePosition, ResumeRepository};

use super::test_harness::{SECTION, ViewKind, sample_video_frame, setup_view_harness};

#[tokio::test(flavor = "current_thread")]
async fn lesson_view_renders_article_frame() {
    let mut harness = setup_view_harness(ViewKind::Lesson, None).await;
    harness.rebuild();
    let html = harness.render_until("Step 1 of 2").await;
    assert!(html.contains("Step 1 of 2"), "missing step label in {html}");
    assert!(html.contains("<h1>Ownership</h1>"), "missing article body in {html}");
    assert!(html.contains("Next Part"), "missing next button in {html}");
    assert!(html.contains("player-frame--hidden"), "player should hide in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn lesson_view_enters_assessment_at_explicit_sequence() {
    let mut harness = setup_view_harness(ViewKind::Lesson, Some(2)).await;
    harness.rebuild();
    let html = harness.render_until("Who owns a moved value?").await;
    assert!(html.contains("Step 2 of 2"), "missing step label in {html}");
    assert!(html.contains("Who owns a moved value?"), "missing question in {html}");
    assert!(html.contains("countdown-label"), "missing countdown in {html}");
    assert!(html.contains("Back to Video"), "missing back button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn lesson_view_offers_player_settings_on_video() {
    let mut harness = setup_view_harness(ViewKind::Lesson, None).await;
    harness
        .repo
        .replace_section(SECTION, &[sample_video_frame()])
        .await
        .expect("seed video");
    harness.rebuild();
    let html = harness.render_until("lesson-play-pause").await;
    assert!(html.contains("Intro"), "missing title in {html}");
    assert!(!html.contains("player-frame--hidden"), "player should show in {html}");
    assert!(html.contains("1.25x"), "missing speed options in {html}");
    assert!(html.contains("720p"), "missing quality options in {html}");
    assert!(html.contains("HD 1080p"), "missing quality options in {html}");
    assert!(html.contains("Captions: Off"), "missing captions toggle in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn unknown_section_shows_load_error() {
    let mut harness = setup_view_harness(ViewKind::Lesson, None).await;
    harness
        .repo
        .replace_section(SECTION, &[])
        .await
        .expect("clear section");
    harness.rebuild();
    let html = harness.render_until("could not be opened").await;
    assert!(html.contains("could not be opened"), "missing error in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn outline_marks_resume_frame() {
    let mut harness = setup_view_harness(ViewKind::Outline, None).await;
    harness
        .repo
        .save_position(&ResumePosition {
            section_id: SECTION,
            frame_id: FrameId::new(12),
            saved_at: fixed_now(),
        })
        .await
        .expect("save resume");
    harness.rebuild();
    let html = harness.render_until("Continue").await;
    assert!(html.contains("Section 1"), "missing title in {html}");
    assert!(html.contains("Grading: offline"), "missing remote label in {html}");
    assert!(html.contains("outline-item--done"), "missing done item in {html}");
    assert!(html.contains("outline-item--current"), "missing current item in {html}");
    assert!(html.contains("Reading"), "missing frame label in {html}");
}
