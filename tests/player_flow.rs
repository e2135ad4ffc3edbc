use folio::audio::NullAudioEngine;
use folio::model::bundled_playlist;
use folio::player::{PlayerController, PlayerState, UNMUTE_VOLUME};
use std::path::Path;
use std::time::{Duration, Instant};

fn player() -> PlayerController {
    let mut player = PlayerController::new(
        Box::new(NullAudioEngine::new()),
        bundled_playlist(Path::new("no-such-dir")),
    )
    .with_rng_seed(11);
    player.mount();
    player
}

#[test]
fn cycles_through_playlist_in_order() {
    let mut player = player();
    player.play();
    let mut visited = vec![player.current_index()];
    for _ in 0..4 {
        player.next();
        visited.push(player.current_index());
    }
    assert_eq!(visited, vec![0, 1, 2, 3, 0]);
    assert_eq!(player.state(), PlayerState::Playing(0));
}

#[test]
fn previous_from_first_track_wraps_to_last() {
    let mut player = player();
    player.previous();
    assert_eq!(player.current_index(), 3);
}

#[test]
fn silent_engine_still_tracks_controls() {
    let mut player = player();
    player.set_volume(0.0);
    player.toggle_mute();
    assert_eq!(player.volume(), UNMUTE_VOLUME);

    player.toggle_repeat();
    assert!(player.repeat());
    assert_eq!(player.state(), PlayerState::Paused(0));
}

#[test]
fn panel_lifecycle_follows_idle_timer() {
    let mut player = player();
    let t0 = Instant::now();
    player.press_main_button(t0);
    assert!(player.is_playing());

    player.touch(t0 + Duration::from_millis(1_000));
    assert!(!player.poll_idle(t0 + Duration::from_millis(2_500)));
    assert!(player.poll_idle(t0 + Duration::from_millis(3_000)));
    assert!(player.is_playing());
}
