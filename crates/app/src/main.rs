use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use lesson_core::model::{CourseId, LessonContext, SectionId};
use services::{AppServices, Clock, ContentMode, LessonLoopService, RemoteConfig};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use ui::{App, LessonTarget, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidId { flag: &'static str, raw: String },
    InvalidSequence { raw: String },
    InvalidContentMode { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidId { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidSequence { raw } => {
                write!(f, "invalid --sequence value (expected >= 1): {raw}")
            }
            ArgsError::InvalidContentMode { raw } => {
                write!(f, "invalid --content value (expected remote or sqlite): {raw}")
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

struct DesktopApp {
    target: LessonTarget,
    services: AppServices,
}

impl UiApp for DesktopApp {
    fn lesson_target(&self) -> LessonTarget {
        self.target.clone()
    }

    fn lesson_loop(&self) -> Arc<LessonLoopService> {
        self.services.lesson_loop()
    }

    fn remote_enabled(&self) -> bool {
        self.services.remote_enabled()
    }
}

#[derive(Debug)]
struct Args {
    db_url: String,
    course_id: CourseId,
    section_id: SectionId,
    sequence: Option<u32>,
    content: ContentMode,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!(
        "  cargo run -p app -- [--db <sqlite_url>] [--course-id <id>] [--section-id <id>] \
         [--sequence <n>] [--content remote|sqlite]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:lessons.sqlite3");
    eprintln!("  --course-id 1 --section-id 1 --content remote");
    eprintln!("  --sequence unset (resume where the student left off)");
    eprintln!();
    eprintln!("Environment (also read from .env):");
    eprintln!("  LESSON_DB_URL, LESSON_COURSE_ID, LESSON_SECTION_ID, LESSON_SEQUENCE, LESSON_CONTENT");
    eprintln!("  LESSON_API_URL, LESSON_ACTIVITY_URL, LESSON_ACCESS_TOKEN, LESSON_STUDENT_ID");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("LESSON_DB_URL")
            .ok()
            .map_or_else(|| normalize_sqlite_url("lessons.sqlite3".into()), normalize_sqlite_url);
        let mut course_id = env_id("LESSON_COURSE_ID").map_or_else(|| CourseId::new(1), CourseId::new);
        let mut section_id =
            env_id("LESSON_SECTION_ID").map_or_else(|| SectionId::new(1), SectionId::new);
        let mut sequence = std::env::var("LESSON_SEQUENCE")
            .ok()
            .and_then(|value| value.trim().parse::<u32>().ok())
            .filter(|value| *value > 0);
        let mut content = std::env::var("LESSON_CONTENT")
            .ok()
            .and_then(|value| ContentMode::parse(&value))
            .unwrap_or_default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--course-id" => {
                    let value = require_value(args, "--course-id")?;
                    course_id = CourseId::new(parse_id("--course-id", value)?);
                }
                "--section-id" => {
                    let value = require_value(args, "--section-id")?;
                    section_id = SectionId::new(parse_id("--section-id", value)?);
                }
                "--sequence" => {
                    let value = require_value(args, "--sequence")?;
                    let parsed = value
                        .trim()
                        .parse::<u32>()
                        .ok()
                        .filter(|parsed| *parsed > 0)
                        .ok_or(ArgsError::InvalidSequence { raw: value })?;
                    sequence = Some(parsed);
                }
                "--content" => {
                    let value = require_value(args, "--content")?;
                    content = ContentMode::parse(&value)
                        .ok_or(ArgsError::InvalidContentMode { raw: value })?;
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
            course_id,
            section_id,
            sequence,
            content,
        })
    }
}

fn env_id(key: &str) -> Option<u64> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
}

fn parse_id(flag: &'static str, raw: String) -> Result<u64, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidId { flag, raw })
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "app=info,services=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    info!(
        course = %parsed.course_id,
        section = %parsed.section_id,
        sequence = ?parsed.sequence,
        content = parsed.content.as_str(),
        "starting lesson player"
    );

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let remote = RemoteConfig::from_env();
    let student_id = remote.as_ref().and_then(|config| config.student_id.clone());
    let services =
        AppServices::new_sqlite(&parsed.db_url, Clock::default_clock(), remote, parsed.content)
            .await?;

    let mut context = LessonContext::for_course(parsed.course_id, parsed.section_id);
    if let Some(student_id) = student_id {
        context = context.with_student(student_id);
    }
    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        target: LessonTarget {
            context,
            entry: parsed.sequence,
        },
        services,
    });
    let context = build_app_context(&app);

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Lesson Player")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
