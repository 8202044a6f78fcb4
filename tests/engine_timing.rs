// End to end: player -> sample bank -> command queue -> engine, on the frame clock.

use std::collections::BTreeMap;
use std::path::Path;

use steptty::audio::{Engine, FrameClock, StereoFrame};
use steptty::sound::SampleBank;
use steptty::{Pattern, Player, SchedulerConfig};

const RATE: u32 = 48_000;
const BLOCK: usize = 480;

fn write_impulse(path: &Path) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    writer.write_sample(i16::MAX).unwrap();
    writer.finalize().unwrap();
}

#[test]
fn notes_land_on_exact_frames_despite_coarse_ticks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shake.wav");
    write_impulse(&path);

    let clock = FrameClock::new(RATE);
    let (tx, rx) = crossbeam_channel::bounded(1024);
    let mut bank = SampleBank::new(tx, clock.clone());
    bank.load_all(&BTreeMap::from([("shake".to_string(), path)]))
        .unwrap();
    let mut engine = Engine::new(clock.clone());

    let pattern = Pattern::new("Groove 1", "shake", 4, 4, [0, 4, 8, 12]).unwrap();
    let mut player =
        Player::new(120, pattern, &bank, clock.clone(), SchedulerConfig::default()).unwrap();
    player.start();

    let mut output = Vec::new();
    let uneven_ticks = [1, 3, 2, 5, 1, 4];
    let mut next_tick = 0;
    for block in 0..160 {
        if block >= next_tick {
            player.tick();
            next_tick = block + uneven_ticks[block % uneven_ticks.len()];
        }
        while let Ok(cmd) = rx.try_recv() {
            engine.handle_cmd(cmd);
        }
        let mut out = vec![StereoFrame::zero(); BLOCK];
        engine.render_block(&mut out);
        output.extend(out);
    }

    let hits: Vec<usize> = output
        .iter()
        .enumerate()
        .filter(|(_, f)| f.left.abs() > 0.1)
        .map(|(i, _)| i)
        .collect();
    // one hit per beat at 120 bpm: every 24000 frames
    assert_eq!(hits, vec![0, 24_000, 48_000, 72_000]);
    assert_eq!(clock.frames(), (160 * BLOCK) as u64);
}

#[test]
fn stopped_player_leaves_engine_silent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shake.wav");
    write_impulse(&path);

    let clock = FrameClock::new(RATE);
    let (tx, rx) = crossbeam_channel::bounded(1024);
    let mut bank = SampleBank::new(tx, clock.clone());
    bank.load_all(&BTreeMap::from([("shake".to_string(), path)]))
        .unwrap();
    let mut engine = Engine::new(clock.clone());
    let mut render = |engine: &mut Engine| {
        while let Ok(cmd) = rx.try_recv() {
            engine.handle_cmd(cmd);
        }
        let mut out = vec![StereoFrame::zero(); BLOCK];
        engine.render_block(&mut out);
        out
    };

    let pattern = Pattern::new("Groove 1", "shake", 4, 4, [0, 1, 2, 3]).unwrap();
    let mut player =
        Player::new(300, pattern, &bank, clock.clone(), SchedulerConfig::default()).unwrap();
    player.start(); // commits steps inside the first 100 ms
    assert!(player.outstanding_playbacks() > 1);
    player.stop();

    let out: Vec<StereoFrame> = (0..20).flat_map(|_| render(&mut engine)).collect();
    assert!(out.iter().all(|f| f.left == 0.0));
    assert_eq!(engine.active_voices(), 0);
}

#[test]
fn pause_cancels_note_the_engine_has_not_drained_yet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shake.wav");
    write_impulse(&path);

    let clock = FrameClock::new(RATE);
    let (tx, rx) = crossbeam_channel::bounded(1024);
    let mut bank = SampleBank::new(tx, clock.clone());
    bank.load_all(&BTreeMap::from([("shake".to_string(), path)]))
        .unwrap();
    let mut engine = Engine::new(clock.clone());
    while let Ok(cmd) = rx.try_recv() {
        engine.handle_cmd(cmd);
    }

    let pattern = Pattern::new("Groove 1", "shake", 4, 4, [0, 4, 8, 12]).unwrap();
    let mut player =
        Player::new(120, pattern, &bank, clock.clone(), SchedulerConfig::default()).unwrap();
    player.start(); // step 0 at frame 0 sits in the channel

    // the callback rendered a block before the schedule reached it
    let mut out = vec![StereoFrame::zero(); BLOCK];
    engine.render_block(&mut out);
    player.tick();
    player.pause();

    let mut heard = Vec::new();
    for _ in 0..10 {
        while let Ok(cmd) = rx.try_recv() {
            engine.handle_cmd(cmd);
        }
        let mut out = vec![StereoFrame::zero(); BLOCK];
        engine.render_block(&mut out);
        heard.extend(out);
    }
    assert!(heard.iter().all(|f| f.left == 0.0));
    assert_eq!(engine.pending_len(), 0);
}
