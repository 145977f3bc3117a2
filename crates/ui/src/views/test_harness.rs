use std::sync::Arc;
use std::time::Duration;

use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use dioxus_router::{Routable, Router};
use lesson_core::model::{
    AnswerOption, Article, ContentFrame, CourseId, FrameBody, FrameId, LessonContext, OptionId,
    Question, QuestionId, QuestionKind, SectionId, VideoSegment,
};
use lesson_core::time::fixed_now;
use services::remote::{HttpGradingService, HttpProgressService, RemoteClient};
use services::{Clock, LessonLoopService};
use storage::repository::{ContentStore, InMemoryRepository};

use crate::context::{LessonTarget, UiApp, build_app_context};
use crate::views::{OutlineView, PlayerView};

pub const SECTION: SectionId = SectionId::new(1);

struct TestApp {
    target: LessonTarget,
    lesson_loop: Arc<LessonLoopService>,
}

impl UiApp for TestApp {
    fn lesson_target(&self) -> LessonTarget {
        self.target.clone()
    }

    fn lesson_loop(&self) -> Arc<LessonLoopService> {
        Arc::clone(&self.lesson_loop)
    }

    fn remote_enabled(&self) -> bool {
        false
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    Lesson,
    Outline,
}

#[derive(Props, Clone)]
struct ViewHarnessProps {
    app: Arc<TestApp>,
    view: ViewKind,
}

impl PartialEq for ViewHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ViewRouterHarness(props: ViewHarnessProps) -> Element {
    let app: Arc<dyn UiApp> = props.app.clone();
    use_context_provider(|| build_app_context(&app));
    use_context_provider(|| props.view);
    rsx! { Router::<TestRoute> {} }
}

#[derive(Clone, Routable, PartialEq)]
#[rustfmt::skip]
enum TestRoute {
    #[route("/")]
    Root {},
}

#[component]
fn Root() -> Element {
    match use_context::<ViewKind>() {
        ViewKind::Lesson => rsx! { PlayerView {} },
        ViewKind::Outline => rsx! { OutlineView {} },
    }
}

pub struct ViewHarness {
    pub dom: VirtualDom,
    pub repo: Arc<InMemoryRepository>,
}

impl ViewHarness {
    pub fn rebuild(&mut self) {
        self.dom.rebuild_in_place();
        drive_dom(&mut self.dom);
    }

    pub async fn drive_async(&mut self) {
        let _ = tokio::time::timeout(Duration::from_millis(50), self.dom.wait_for_work()).await;
        self.dom.render_immediate(&mut NoOpMutations);
        self.dom.process_events();
    }

    /// Drive until `needle` shows up in the rendered html, or give up.
    pub async fn render_until(&mut self, needle: &str) -> String {
        for _ in 0..40 {
            let html = self.render();
            if html.contains(needle) {
                return html;
            }
            self.drive_async().await;
        }
        self.render()
    }

    pub fn render(&self) -> String {
        dioxus_ssr::render(&self.dom)
    }
}

pub fn drive_dom(dom: &mut VirtualDom) {
    dom.process_events();
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// Article, then a single-select assessment.
pub fn sample_frames() -> Vec<ContentFrame> {
    vec![
        ContentFrame::new(
            FrameId::new(11),
            1,
            Some("Reading".into()),
            FrameBody::Article(Article::new("# Ownership\n\nEvery value has one **owner**.")),
        )
        .expect("article frame"),
        ContentFrame::new(
            FrameId::new(12),
            2,
            Some("Check".into()),
            FrameBody::Assessment,
        )
        .expect("assessment frame"),
    ]
}

pub fn sample_video_frame() -> ContentFrame {
    let segment =
        VideoSegment::parse("https://www.youtube.com/watch?v=dQw4w9WgXcQ", 0.0, 30.0)
            .expect("video segment");
    ContentFrame::new(FrameId::new(10), 1, Some("Intro".into()), FrameBody::Video(segment))
        .expect("video frame")
}

pub fn sample_question() -> Question {
    Question::new(
        QuestionId::new(1),
        "Who owns a moved value?",
        QuestionKind::SingleSelect,
        vec![
            AnswerOption::new(OptionId::new(1), "The new binding"),
            AnswerOption::new(OptionId::new(2), "Nobody"),
        ],
        None,
    )
    .expect("question")
}

pub async fn setup_view_harness(view: ViewKind, entry: Option<u32>) -> ViewHarness {
    let repo = Arc::new(InMemoryRepository::new());
    repo.replace_section(SECTION, &sample_frames())
        .await
        .expect("seed section");
    repo.replace_questions(FrameId::new(12), &[sample_question()])
        .await
        .expect("seed questions");

    let remote = RemoteClient::new(None);
    let lesson_loop = Arc::new(LessonLoopService::new(
        Clock::fixed(fixed_now()),
        repo.clone(),
        repo.clone(),
        Arc::new(HttpGradingService::new(remote.clone())),
        Arc::new(HttpProgressService::new(remote)),
    ));
    let app = Arc::new(TestApp {
        target: LessonTarget {
            context: LessonContext::for_course(CourseId::new(7), SECTION),
            entry,
        },
        lesson_loop,
    });

    let dom = VirtualDom::new_with_props(ViewRouterHarness, ViewHarnessProps { app, view });
    ViewHarness { dom, repo }
}
