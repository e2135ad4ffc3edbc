#![no_main]

use folio::audio::NullAudioEngine;
use folio::model::bundled_playlist;
use folio::player::PlayerController;
use libfuzzer_sys::fuzz_target;
use std::path::Path;
use std::time::{Duration, Instant};

fuzz_target!(|data: &[u8]| {
    let mut player = PlayerController::new(
        Box::new(NullAudioEngine::new()),
        bundled_playlist(Path::new("fuzz-missing")),
    )
    .with_rng_seed(data.len() as u64);
    player.mount();
    let t0 = Instant::now();

    for (step, byte) in data.iter().enumerate() {
        let now = t0 + Duration::from_millis(step as u64 * 250);
        match byte % 12 {
            0 => player.toggle_play(),
            1 => player.next(),
            2 => player.previous(),
            3 => player.toggle_shuffle(),
            4 => player.toggle_repeat(),
            5 => player.select_track(usize::from(byte >> 4)),
            6 => player.seek_fraction(f64::from(*byte) / 200.0),
            7 => player.set_volume(f32::from(*byte) / 128.0 - 0.5),
            8 => player.toggle_mute(),
            9 => player.press_main_button(now),
            10 => {
                if byte & 1 == 0 {
                    player.next_page();
                } else {
                    player.prev_page();
                }
            }
            _ => {
                player.tick();
                player.poll_idle(now);
            }
        }

        assert!(player.current_index() < player.tracks().len());
        assert!(player.playlist_page() < player.page_count());
        assert!((0.0..=1.0).contains(&player.volume()));
    }
});
