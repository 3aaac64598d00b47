//! Command implementations

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::adapters::TomlConfigAdapter;
use crate::app::{AppContainer, DefaultAppContainer, EditorInteractor, PickerPresets};
use crate::cli::args::{ConfigArgs, EditArgs, FramesArgs, SlideshowArgs, TimelineArgs};
use crate::config::EditorConfig;
use crate::domain::errors::DomainError;
use crate::domain::model::{JobKind, SessionPhase};
use crate::engine::ExtractionOutcome;
use crate::ports::ConfigPort;
use crate::timeline::ScrubLoop;

/// Execute the frames command
pub async fn frames(config: EditorConfig, args: FramesArgs) -> Result<()> {
    info!(input = %args.input, "Starting frames operation");

    let presets = PickerPresets {
        video: Some(args.input.clone()),
        ..PickerPresets::default()
    };
    let container = DefaultAppContainer::new(config, presets).context("Failed to set up the editor")?;
    let editor = container.editor_interactor();

    let extraction = editor
        .pick_video()
        .await
        .context("Failed to load input video")?
        .ok_or(DomainError::UserCancelled)
        .context("No video selected")?;

    match extraction.wait().await.context("Frame extraction did not finish")? {
        ExtractionOutcome::Completed { frames } => info!(frames, "Frame extraction completed"),
        ExtractionOutcome::Superseded => return Err(anyhow::anyhow!("Frame extraction was superseded")),
        ExtractionOutcome::Failed(detail) => {
            return Err(anyhow::anyhow!("Frame extraction failed: {}", detail))
        }
    }

    let snapshot = editor.snapshot()?;
    if args.json {
        let json = serde_json::to_string_pretty(&snapshot).context("Failed to serialize session to JSON")?;
        println!("{}", json);
    } else {
        for uri in snapshot.frames.ready_uris() {
            println!("{}", uri);
        }
    }
    Ok(())
}

/// Execute the edit command
pub async fn edit(config: EditorConfig, args: EditArgs) -> Result<()> {
    info!(input = %args.input, steps = args.steps.len(), "Starting edit operation");

    let presets = PickerPresets {
        video: Some(args.input.clone()),
        ..PickerPresets::default()
    };
    let container = DefaultAppContainer::new(config, presets).context("Failed to set up the editor")?;
    let editor = container.editor_interactor();

    let extraction = editor
        .pick_video()
        .await
        .context("Failed to load input video")?
        .ok_or(DomainError::UserCancelled)
        .context("No video selected")?;
    if let ExtractionOutcome::Failed(detail) = extraction.wait().await? {
        warn!("Thumbnail strip unavailable: {}", detail);
    }

    if let Some(offset) = args.scrub {
        let seek = editor.scrub(offset)?;
        info!(offset, seek, cut_start = editor.snapshot()?.cut_start, "Scrubbed timeline");
    }

    let result = run_steps(&editor, &args).await;
    let shared = match result {
        Ok(()) => share_current(&editor).await,
        Err(e) => Err(e),
    };

    editor.discard(true).await.context("Failed to discard session")?;
    let destination = shared?;
    println!("{}", destination);
    Ok(())
}

async fn run_steps(editor: &EditorInteractor, args: &EditArgs) -> Result<()> {
    let progress = watch_progress(editor);
    let mut outcome = Ok(());
    for (index, step) in args.steps.iter().enumerate() {
        info!(step = index + 1, job = %step.kind(), "Applying edit step");
        if let Err(e) = editor.apply(step.clone()).await {
            outcome = Err(e).with_context(|| format!("Edit step {} ({}) failed", index + 1, step.kind()));
            break;
        }
    }
    progress.abort();
    outcome
}

/// Execute the slideshow command
pub async fn slideshow(mut config: EditorConfig, args: SlideshowArgs) -> Result<()> {
    info!(photos = args.photos.len(), audio = %args.audio, "Starting slideshow operation");

    if let Some(max_photos) = args.max_photos {
        config.picker.max_photos = max_photos;
    }
    let presets = PickerPresets {
        photos: args.photos.clone(),
        audio: Some(args.audio.clone()),
        ..PickerPresets::default()
    };
    let container = DefaultAppContainer::new(config, presets).context("Failed to set up the editor")?;
    let editor = container.editor_interactor();

    let kept = editor
        .pick_photos()
        .await
        .context("Failed to select photos")?
        .ok_or(DomainError::UserCancelled)
        .context("No photos selected")?;
    if kept < args.photos.len() {
        warn!(kept, picked = args.photos.len(), "Extra photos dropped");
    }

    let progress = watch_progress(&editor);
    let applied = editor.apply_picked(JobKind::CreateSlideshow).await;
    progress.abort();

    let shared = match applied {
        Ok(Some(_)) => share_current(&editor).await,
        Ok(None) => Err(DomainError::UserCancelled).context("No audio selected"),
        Err(e) => Err(e).context("Slideshow failed"),
    };

    editor.discard(true).await.context("Failed to discard session")?;
    let destination = shared?;
    println!("{}", destination);
    Ok(())
}

/// Execute the timeline command
pub fn timeline(config: &EditorConfig, args: TimelineArgs) -> Result<()> {
    let geometry = config.timeline;
    let mut scrub = ScrubLoop::new(geometry);
    let seek = scrub.on_scroll(args.offset);

    println!("left={:.3}", geometry.time_at_left_edge(args.offset));
    println!("pop={:.3}", geometry.time_at_pop_line(args.offset));
    println!("right={:.3}", geometry.time_at_right_edge(args.offset));
    println!("seek={:.3}", seek);

    if let Some(current_time) = args.current_time {
        match scrub.on_playback_progress(current_time) {
            Some(target) => println!("loop=wrap {:.3}", target),
            None => println!("loop=continue"),
        }
    }
    Ok(())
}

/// Execute the config command
pub async fn config(config: EditorConfig, args: ConfigArgs) -> Result<()> {
    match args.write {
        Some(path) => {
            let adapter = TomlConfigAdapter::with_config(config);
            adapter
                .save_config(&path.to_string_lossy())
                .await
                .with_context(|| format!("Failed to write configuration to {}", path.display()))?;
            info!(path = %path.display(), "Configuration written");
        }
        None => {
            let rendered = TomlConfigAdapter::serialize_config(&config).context("Failed to render configuration")?;
            print!("{}", rendered);
        }
    }
    Ok(())
}

async fn share_current(editor: &EditorInteractor) -> Result<String> {
    editor
        .share()
        .await
        .context("Nothing to share")?
        .ok_or_else(|| anyhow::anyhow!("Failed to share the edited video"))
}

/// Log job progress from session snapshots until aborted
fn watch_progress(editor: &EditorInteractor) -> JoinHandle<()> {
    let mut snapshots = editor.subscribe();
    tokio::spawn(async move {
        let mut last = -1.0_f64;
        while snapshots.changed().await.is_ok() {
            let (phase, progress) = {
                let snapshot = snapshots.borrow_and_update();
                (snapshot.phase, snapshot.progress)
            };
            if phase == SessionPhase::Editing && progress.floor() > last.floor() {
                info!(percent = progress.floor(), "Job progress");
                last = progress;
            }
        }
    })
}
