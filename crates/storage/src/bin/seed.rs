use std::fmt;

use lesson_core::model::{
    AnswerOption, Article, ContentFrame, FrameBody, FrameId, OptionId, Question, QuestionId,
    QuestionKind, SectionId, VideoSegment,
};
use storage::repository::{ContentStore, ResumeRepository};
use storage::sqlite::SqliteRepository;

const DEFAULT_VIDEO: &str = "https://www.youtube.com/watch?v=aqz-KE-bpKQ";

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    section_id: SectionId,
    video_url: String,
    segments: u32,
    segment_secs: f64,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSectionId { raw: String },
    InvalidSegments { raw: String },
    InvalidSegmentSecs { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSectionId { raw } => write!(f, "invalid --section-id value: {raw}"),
            ArgsError::InvalidSegments { raw } => {
                write!(f, "invalid --segments value (expected 1..=50): {raw}")
            }
            ArgsError::InvalidSegmentSecs { raw } => {
                write!(f, "invalid --segment-secs value (expected > 0): {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("LESSON_DB_URL").unwrap_or_else(|_| "sqlite:lessons.sqlite3?mode=rwc".into());
        let mut section_id = std::env::var("LESSON_SECTION_ID")
            .ok()
            .and_then(|value| value.parse::<SectionId>().ok())
            .unwrap_or(SectionId::new(1));
        let mut video_url = DEFAULT_VIDEO.to_owned();
        let mut segments = 3;
        let mut segment_secs = 10.0;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--section-id" => {
                    let value = require_value(&mut args, "--section-id")?;
                    section_id = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSectionId { raw: value.clone() })?;
                }
                "--video" => {
                    video_url = require_value(&mut args, "--video")?;
                }
                "--segments" => {
                    let value = require_value(&mut args, "--segments")?;
                    segments = value
                        .parse::<u32>()
                        .ok()
                        .filter(|n| (1..=50).contains(n))
                        .ok_or_else(|| ArgsError::InvalidSegments { raw: value.clone() })?;
                }
                "--segment-secs" => {
                    let value = require_value(&mut args, "--segment-secs")?;
                    segment_secs = value
                        .parse::<f64>()
                        .ok()
                        .filter(|s| s.is_finite() && *s > 0.0)
                        .ok_or_else(|| ArgsError::InvalidSegmentSecs { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            section_id,
            video_url,
            segments,
            segment_secs,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:lessons.sqlite3?mode=rwc)");
    eprintln!("  --section-id <id>         Section to (re)build (default: 1)");
    eprintln!("  --video <url>             Source video the segments are cut from");
    eprintln!("  --segments <n>            Number of video/assessment pairs (default: 3)");
    eprintln!("  --segment-secs <secs>     Length of each video segment (default: 10)");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  LESSON_DB_URL, LESSON_SECTION_ID");
}

fn frame_id(section_id: SectionId, order: u32) -> FrameId {
    FrameId::new(section_id.value() * 1000 + u64::from(order))
}

fn demo_questions(segment: u32) -> Result<Vec<Question>, Box<dyn std::error::Error>> {
    let base = u64::from(segment) * 10;
    let single = Question::new(
        QuestionId::new(base + 1),
        format!("What was the main idea of part {segment}?"),
        QuestionKind::SingleSelect,
        vec![
            AnswerOption::new(OptionId::new(1), "The opening scene"),
            AnswerOption::new(OptionId::new(2), "The character introduction"),
            AnswerOption::new(OptionId::new(3), "The closing credits"),
        ],
        Some("Think about what happened first.".into()),
    )?;
    let multi = Question::new(
        QuestionId::new(base + 2),
        format!("Which of these appeared in part {segment}?"),
        QuestionKind::MultiSelect,
        vec![
            AnswerOption::new(OptionId::new(1), "A forest"),
            AnswerOption::new(OptionId::new(2), "A rabbit"),
            AnswerOption::new(OptionId::new(3), "A spaceship"),
        ],
        None,
    )?;
    Ok(vec![single, multi])
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let repo = SqliteRepository::open(&args.db_url).await?;

    let mut frames = Vec::new();
    let mut assessments = Vec::new();
    for segment in 0..args.segments {
        let start = f64::from(segment) * args.segment_secs;
        let video_order = segment * 2 + 1;
        let video = VideoSegment::parse(&args.video_url, start, start + args.segment_secs)?;
        frames.push(ContentFrame::new(
            frame_id(args.section_id, video_order),
            video_order,
            Some(format!("Part {}", segment + 1)),
            FrameBody::Video(video),
        )?);

        let assessment_id = frame_id(args.section_id, video_order + 1);
        frames.push(ContentFrame::new(
            assessment_id,
            video_order + 1,
            Some(format!("Check {}", segment + 1)),
            FrameBody::Assessment,
        )?);
        assessments.push((assessment_id, segment + 1));
    }
    let summary_order = args.segments * 2 + 1;
    frames.push(ContentFrame::new(
        frame_id(args.section_id, summary_order),
        summary_order,
        Some("Summary".into()),
        FrameBody::Article(Article::new(
            "You have reached the end of this section. Review any part you found difficult.",
        )),
    )?);

    repo.replace_section(args.section_id, &frames).await?;
    for (assessment_id, segment) in &assessments {
        repo.replace_questions(*assessment_id, &demo_questions(*segment)?)
            .await?;
    }
    repo.clear_position(args.section_id).await?;

    println!(
        "Seeded section {} with {} frames ({} assessments) into {}",
        args.section_id,
        frames.len(),
        assessments.len(),
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
