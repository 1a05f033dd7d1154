//! OSD Lyrics command line front end
//!
//! Plays an LRC file against a simulated player and prints each lyric line
//! as it comes up.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};

use osdlyrics::features::Settings;
use osdlyrics::features::lyrics::{DEFAULT_LAST_LINE_DURATION, DisplayFrame, LyricDocument};
use osdlyrics::playback::MonotonicTime;
use osdlyrics::player::{PlaybackStatus, Player, SimulatedPlayer, SmoothedPlayer, TrackInfo};
use osdlyrics::session::LyricSession;

const USAGE: &str = "usage: osdlyrics <file.lrc> [duration_ms]";

fn main() -> Result<()> {
    // Initialize tracing for logging
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("{}", USAGE);
        std::process::exit(2);
    };
    let duration = args
        .next()
        .map(|arg| arg.parse::<u64>())
        .transpose()
        .with_context(|| format!("Invalid duration\n{}", USAGE))?;

    let settings = load_settings();
    let lyrics = LyricDocument::load(Path::new(&path))?;
    let duration = duration.unwrap_or_else(|| lyrics_length(&lyrics));

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create runtime")?;
    rt.block_on(run(settings, lyrics, duration))
}

/// Load settings, writing the defaults out on first run so they can be edited
fn load_settings() -> Settings {
    let settings = Settings::load();
    if Settings::file_path().is_some_and(|path| !path.exists()) {
        match settings.save() {
            Ok(()) => tracing::info!("Wrote default settings to {:?}", Settings::file_path()),
            Err(e) => tracing::warn!("Could not write default settings: {}", e),
        }
    }
    settings
}

/// Track length guessed from the lyrics when none is given
fn lyrics_length(lyrics: &LyricDocument) -> u64 {
    let last = lyrics
        .effective_timestamp(lyrics.item_count() - 1)
        .unwrap_or(0)
        .max(0);
    u64::try_from(last.saturating_add(DEFAULT_LAST_LINE_DURATION)).unwrap_or(0)
}

async fn run(settings: Settings, lyrics: LyricDocument, duration: u64) -> Result<()> {
    let time = MonotonicTime::new();
    let track = TrackInfo {
        title: lyrics.attribute("ti").map(str::to_string),
        artist: lyrics.attribute("ar").map(str::to_string),
        album: lyrics.attribute("al").map(str::to_string),
        ..Default::default()
    };
    let refresh = settings.timing.refresh_interval_ms.max(1);
    let poll = settings.timing.poll_interval_ms.max(1);

    let mut simulated = SimulatedPlayer::new(track, duration, poll as i64, time);
    simulated.play();
    let accuracy = settings.timing.accuracy_ms;
    let mut player = SmoothedPlayer::new(simulated, accuracy, time);
    tracing::info!(
        "Playing {:?} on the {} player for {} ms",
        player.snapshot()?.track.and_then(|t| t.title),
        player.name(),
        duration
    );

    let mut session = LyricSession::new(settings, time);
    session.on_player_snapshot(&player.snapshot()?);
    session.set_lyrics(Some(lyrics));

    let mut refresh = tokio::time::interval(Duration::from_millis(refresh));
    let mut poll = tokio::time::interval(Duration::from_millis(poll));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut shown: Option<DisplayFrame> = None;
    loop {
        tokio::select! {
            _ = refresh.tick() => {
                let frame = session.tick();
                if line_changed(shown.as_ref(), frame.as_ref()) {
                    print_frame(frame.as_ref());
                }
                shown = frame;
            }
            _ = poll.tick() => {
                let snapshot = player.snapshot()?;
                session.on_player_snapshot(&snapshot);
                if snapshot.status == PlaybackStatus::Stopped {
                    tracing::info!("Track finished");
                    break;
                }
            }
            _ = &mut ctrl_c => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    Ok(())
}

fn line_changed(old: Option<&DisplayFrame>, new: Option<&DisplayFrame>) -> bool {
    let key = |frame: Option<&DisplayFrame>| {
        frame.map(|f| (f.current_line, f.lines[0].id, f.lines[1].id))
    };
    key(old) != key(new)
}

fn print_frame(frame: Option<&DisplayFrame>) {
    let Some(frame) = frame.filter(|f| !f.is_empty()) else {
        println!();
        return;
    };
    println!("> {}", frame.current().text);
    if frame.other().id.is_some() {
        println!("  {}", frame.other().text);
    }
}
