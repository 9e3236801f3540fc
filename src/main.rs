use expression_mimic::assets::AssetTable;
use expression_mimic::display::FrameDumpSink;
use expression_mimic::intake::DirectoryFrameSource;
use expression_mimic::pipeline::{GameContext, LabelUniverse};
use expression_mimic::replay::ReplayScript;
use expression_mimic::{AppError, CoordinatorBuilder, SessionReport, Settings};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{error, info, warn, Level};

fn init_logging(level: Level) {
    tracing_subscriber::fmt().with_max_level(level).init();
}

async fn play(settings: Settings) -> Result<SessionReport, AppError> {
    let universe = LabelUniverse::from_settings(&settings.labels)?;
    let assets = AssetTable::load(&settings.labels.assets_dir, &universe)?;

    let script = match &settings.replay.script {
        Some(path) => ReplayScript::from_file(path)?,
        None => {
            warn!("No replay script configured, no faces will be detected");
            ReplayScript::empty(universe.iter().map(|l| l.as_str().to_string()).collect())
        }
    };
    let (locator, classifier) = script.into_collaborators();

    let replay = settings.replay.clone();
    let source = DirectoryFrameSource::new(
        replay.frames_dir.as_deref(),
        Duration::from_millis(replay.frame_interval_ms),
        (replay.frame_width, replay.frame_height),
    )?;
    let sink = FrameDumpSink::new(replay.output_dir, replay.max_frames)?;

    let quit = sink.quit_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, quitting");
            quit.store(true, Ordering::SeqCst);
        }
    });

    let rounds = settings.game.rounds;
    let round_seconds = settings.game.round_seconds;
    let context = GameContext::new(
        settings,
        universe,
        assets,
        Box::new(locator),
        Box::new(classifier),
    )?;

    println!(
        "Starting expression mimic: {} rounds, {}s each",
        rounds, round_seconds
    );
    CoordinatorBuilder::new()
        .context(context)
        .video_source(Box::new(source))
        .display_sink(Box::new(sink))
        .build()?
        .run()
        .await
}

#[tokio::main]
async fn main() -> ExitCode {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let settings = match Settings::load(config_path.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    init_logging(settings.log_level.into());

    match play(settings).await {
        Ok(report) => {
            println!("{}", report);
            ExitCode::from(report.exit_code())
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
