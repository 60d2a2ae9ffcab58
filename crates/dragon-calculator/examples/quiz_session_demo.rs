//! Quiz session demo on a manual clock
//!
//! Plays level 1 perfectly, then lets level 2 run out of time.
//!
//! Run with: RUST_LOG=debug cargo run --example quiz_session_demo

use dragon_calculator::prelude::*;
use dragon_calculator::quiz::STORAGE_KEY;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut session = QuizSession::new(
        QuizConfig::default(),
        MockScheduler::new(),
        MemoryStore::with_key(STORAGE_KEY),
        RecordingAudio::new(),
    );

    println!("🐉 Level 1");
    session.dispatch(QuizEvent::OpenLevelMap);
    session.dispatch(QuizEvent::SelectLevel(1));
    while session.screen() == Screen::Playing {
        let Some(question) = session.engine().round().map(|r| r.question) else {
            break;
        };
        println!("   {}  →  {}", question.prompt(), question.answer);
        session.dispatch(QuizEvent::SubmitAnswer(question.answer));
        session.run_for(800);
    }
    println!("   screen: {:?}", session.screen());
    if let Some(badge) = session.take_announced_badge() {
        println!("   🏅 badge #{badge} earned");
    }

    println!("\n🐉 Level 2 (no answers)");
    session.dispatch(QuizEvent::NextLevel);
    let limit = session.engine().round().map_or(0, |r| r.time_limit);
    session.run_for(u64::from(limit) * 1000);
    println!("   screen: {:?}", session.screen());

    let progress = session.progress();
    let map = LevelMapView::build(progress, &QuizConfig::default());
    let gallery = BadgeGalleryView::build(progress, &QuizConfig::default());
    println!("\n🗺️  Stars: {}   Score: {}", map.total_stars, progress.total_score);
    println!("   {}", gallery.message);

    println!("\n🔊 Cues played:");
    for cue in session.audio().played() {
        print!("{cue:?} ");
    }
    println!();
}
