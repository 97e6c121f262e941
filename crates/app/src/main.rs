use std::fmt;
use std::sync::Arc;

use api::HttpCourseApi;
use course_core::classifier::MediaConfig;
use course_core::model::CourseId;
use services::{Clock, CourseViewService};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidCourseId { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidCourseId { raw } => write!(f, "invalid --course-id value: {raw}"),
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

struct Args {
    api_url: String,
    media_origin: String,
    course_id: CourseId,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--api <url>] [--media-origin <origin>] [--course-id <id>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api http://localhost:8000/api");
    eprintln!("  --media-origin http://localhost:8000");
    eprintln!("  --course-id 1");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  COURSE_API_URL, COURSE_MEDIA_ORIGIN, COURSE_ID, RUST_LOG");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut api_url = std::env::var("COURSE_API_URL")
            .unwrap_or_else(|_| "http://localhost:8000/api".into());
        let mut media_origin = std::env::var("COURSE_MEDIA_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:8000".into());
        let mut course_id = std::env::var("COURSE_ID")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .map_or_else(|| CourseId::new(1), CourseId::new);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api" => {
                    api_url = require_value(args, "--api")?;
                }
                "--media-origin" => {
                    media_origin = require_value(args, "--media-origin")?;
                }
                "--course-id" => {
                    let value = require_value(args, "--course-id")?;
                    course_id = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidCourseId { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            api_url,
            media_origin,
            course_id,
        })
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "app=info,services=info,api=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let media = MediaConfig::from_origin(&args.media_origin)?;
    let course_api = Arc::new(HttpCourseApi::new(args.api_url));
    let svc = CourseViewService::new(course_api, media, Clock::default());

    tracing::info!(course_id = %args.course_id, "loading course view");
    let view = svc.load(args.course_id).await?;

    let progress = view.progress();
    println!(
        "{}: {}/{} lessons complete ({}%)",
        view.course().title,
        progress.completed_lessons,
        progress.total_lessons,
        progress.percentage
    );
    for section in &progress.per_section {
        println!(
            "  {}: {}/{} ({}%)",
            section.title, section.completed_lessons, section.total_lessons, section.percentage
        );
    }
    println!(
        "watched so far: {:.0}s",
        view.summary().total_watched_seconds
    );

    match view.session() {
        Some(session) => {
            let active = session.lesson();
            println!(
                "active lesson: {} ({} / {}), resume at {:.0}s",
                active.lesson.title,
                active.section_title,
                active.subsection_title,
                active.resume_offset_seconds
            );
            println!("playback source: {:?}", session.descriptor().source());
        }
        None => println!("course has no lessons to play"),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run().await
}
