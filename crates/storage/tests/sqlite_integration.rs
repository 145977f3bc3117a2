use lesson_core::model::{
    AnswerOption, Article, ContentFrame, FrameBody, FrameId, FrameKind, OptionId, Question,
    QuestionId, QuestionKind, SectionId, VideoSegment,
};
use lesson_core::time::fixed_now;
use storage::repository::{
    ContentRepository, ContentStore, ResumePosition, ResumeRepository, StorageError,
};
use storage::sqlite::SqliteRepository;

async fn open(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn section_frames() -> Vec<ContentFrame> {
    let video = VideoSegment::parse("https://youtu.be/abc", 0.0, 10.0).unwrap();
    vec![
        ContentFrame::new(
            FrameId::new(3),
            3,
            None,
            FrameBody::Article(Article::new("Wrap-up")),
        )
        .unwrap(),
        ContentFrame::new(FrameId::new(1), 1, Some("Intro".into()), FrameBody::Video(video))
            .unwrap(),
        ContentFrame::new(FrameId::new(2), 2, None, FrameBody::Assessment).unwrap(),
    ]
}

#[tokio::test]
async fn sqlite_frames_come_back_in_order() {
    let repo = open("memdb_frames").await;
    repo.replace_section(SectionId::new(1), &section_frames())
        .await
        .unwrap();

    let frames = repo.frames_for_section(SectionId::new(1)).await.unwrap();
    let kinds: Vec<_> = frames.iter().map(ContentFrame::kind).collect();
    assert_eq!(
        kinds,
        vec![FrameKind::Video, FrameKind::Assessment, FrameKind::Article]
    );
    let video = frames[0].video().unwrap();
    assert_eq!(video.embed_id().as_deref(), Some("abc"));
    assert!((video.end_offset() - 10.0).abs() < f64::EPSILON);
    assert_eq!(frames[0].title(), Some("Intro"));
    assert_eq!(frames[2].article().unwrap().body(), "Wrap-up");

    assert!(
        repo.frames_for_section(SectionId::new(2))
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn sqlite_replace_section_rejects_foreign_frame_ids() {
    let repo = open("memdb_conflict").await;
    repo.replace_section(SectionId::new(1), &section_frames())
        .await
        .unwrap();
    let err = repo
        .replace_section(SectionId::new(2), &section_frames())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    // Rewriting the owning section is fine.
    repo.replace_section(SectionId::new(1), &section_frames()[..2])
        .await
        .unwrap();
    assert_eq!(
        repo.frames_for_section(SectionId::new(1))
            .await
            .unwrap()
            .len(),
        2
    );
}

#[tokio::test]
async fn sqlite_questions_keep_options_and_order() {
    let repo = open("memdb_questions").await;
    let first = Question::new(
        QuestionId::new(20),
        "Pick one",
        QuestionKind::SingleSelect,
        vec![
            AnswerOption::new(OptionId::new(2), "B"),
            AnswerOption::new(OptionId::new(1), "A"),
        ],
        Some("hint".into()),
    )
    .unwrap();
    let second = Question::new(
        QuestionId::new(10),
        "Pick many",
        QuestionKind::MultiSelect,
        vec![AnswerOption::new(OptionId::new(1), "X")],
        None,
    )
    .unwrap();
    repo.replace_questions(FrameId::new(2), &[first.clone(), second.clone()])
        .await
        .unwrap();

    let fetched = repo.questions_for_assessment(FrameId::new(2)).await.unwrap();
    assert_eq!(fetched, vec![first, second.clone()]);

    repo.replace_questions(FrameId::new(2), &[second.clone()])
        .await
        .unwrap();
    let fetched = repo.questions_for_assessment(FrameId::new(2)).await.unwrap();
    assert_eq!(fetched, vec![second]);
}

#[tokio::test]
async fn sqlite_resume_position_upserts_and_clears() {
    let repo = open("memdb_resume").await;
    let section = SectionId::new(5);
    let mut position = ResumePosition {
        section_id: section,
        frame_id: FrameId::new(1),
        saved_at: fixed_now(),
    };
    repo.save_position(&position).await.unwrap();
    position.frame_id = FrameId::new(2);
    repo.save_position(&position).await.unwrap();

    assert_eq!(repo.load_position(section).await.unwrap(), Some(position));

    repo.clear_position(section).await.unwrap();
    assert_eq!(repo.load_position(section).await.unwrap(), None);
}
