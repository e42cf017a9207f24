// framereel - visual frame codec for arbitrary binary data.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// https://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or https://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Black-box encode/decode round trips driven through the public pipeline
//! API, using `FakeMuxer` so no real video encoder is required.

use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use framereel::config::DATA_BYTES;
use framereel::error::FrameReelError;
use framereel::events::Event;
use framereel::pipeline::{decode, encode, CancellationToken, PipelineConfig};
use framereel::video::test_support::FakeMuxer;

fn drain(rx: &crossbeam_channel::Receiver<Event>) {
    while rx.try_recv().is_ok() {}
}

fn round_trip(dir: &Path, input_name: &str, content: &[u8]) -> Vec<u8> {
    let input_path = dir.join(input_name);
    fs::write(&input_path, content).unwrap();

    let video_path = dir.join("out.video");
    let config = PipelineConfig::default();
    let muxer = FakeMuxer;
    let cancel = CancellationToken::new();
    let (tx, rx) = crossbeam_channel::unbounded();

    encode::encode(&input_path, &video_path, &config, &muxer, &tx, &cancel).unwrap();
    drain(&rx);

    let output_dir = dir.join("decoded");
    fs::create_dir_all(&output_dir).unwrap();
    let dest = decode::decode(
        &video_path,
        &output_dir,
        false,
        &config,
        &muxer,
        &tx,
        &cancel,
    )
    .unwrap();
    drain(&rx);

    fs::read(&dest).unwrap()
}

#[test]
fn round_trips_a_small_single_frame_file() {
    let tmp = tempfile::tempdir().unwrap();
    let original = b"a small file, well under one frame".to_vec();
    let recovered = round_trip(tmp.path(), "small.bin", &original);
    assert_eq!(recovered, original);
}

#[test]
fn round_trips_a_multi_frame_file() {
    let tmp = tempfile::tempdir().unwrap();
    let mut original = vec![0u8; DATA_BYTES + 100];
    for (i, byte) in original.iter_mut().enumerate() {
        *byte = (i % 256) as u8;
    }
    let recovered = round_trip(tmp.path(), "multi.bin", &original);
    assert_eq!(recovered, original);
}

#[test]
fn empty_input_produces_no_video_and_no_error() {
    let tmp = tempfile::tempdir().unwrap();
    let input_path = tmp.path().join("empty.bin");
    fs::write(&input_path, []).unwrap();

    let video_path = tmp.path().join("out.video");
    let config = PipelineConfig::default();
    let muxer = FakeMuxer;
    let cancel = CancellationToken::new();
    let (tx, rx) = crossbeam_channel::unbounded();

    encode::encode(&input_path, &video_path, &config, &muxer, &tx, &cancel).unwrap();
    drain(&rx);

    assert!(!video_path.exists());
}

#[test]
fn long_filename_is_truncated_but_still_recovered() {
    let tmp = tempfile::tempdir().unwrap();
    let long_stem = "y".repeat(400);
    let input_name = format!("{long_stem}.dat");
    let original = b"payload behind a very long filename".to_vec();

    let recovered = round_trip(tmp.path(), &input_name, &original);
    assert_eq!(recovered, original);

    let decoded_dir = tmp.path().join("decoded");
    let entries: Vec<_> = fs::read_dir(&decoded_dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(entries.len(), 1);
    let recovered_name = &entries[0];
    assert!(recovered_name.len() < input_name.len());
    assert!(recovered_name.ends_with(".dat"));
}

#[test]
fn pre_cancelled_token_short_circuits_encode() {
    let tmp = tempfile::tempdir().unwrap();
    let input_path = tmp.path().join("in.bin");
    fs::write(&input_path, b"some bytes").unwrap();
    let video_path = tmp.path().join("out.video");

    let config = PipelineConfig::default();
    let muxer = FakeMuxer;
    let cancel = CancellationToken::new();
    cancel.cancel();
    let (tx, _rx) = crossbeam_channel::unbounded();

    let err = encode::encode(&input_path, &video_path, &config, &muxer, &tx, &cancel)
        .unwrap_err();
    assert!(matches!(err, FrameReelError::Cancelled));
    assert!(!video_path.exists());
}

#[test]
fn round_trips_seeded_random_input_of_varying_sizes() {
    let mut rng = StdRng::seed_from_u64(0xF12E_3EE1);
    for size in [1usize, DATA_BYTES, DATA_BYTES + 1, 3 * DATA_BYTES + 12_345] {
        let tmp = tempfile::tempdir().unwrap();
        let mut content = vec![0u8; size];
        rng.fill(content.as_mut_slice());
        let recovered = round_trip(tmp.path(), "seeded.bin", &content);
        assert_eq!(recovered, content, "mismatch at size {size}");
    }
}

#[test]
fn single_pixel_flip_in_a_saved_frame_still_recovers_the_original_bytes() {
    let tmp = tempfile::tempdir().unwrap();
    let input_path = tmp.path().join("flip.bin");
    let original = vec![0xFFu8; DATA_BYTES];
    fs::write(&input_path, &original).unwrap();

    let video_path = tmp.path().join("out.video");
    let config = PipelineConfig::default();
    let muxer = FakeMuxer;
    let cancel = CancellationToken::new();
    let (tx, rx) = crossbeam_channel::unbounded();

    encode::encode(&input_path, &video_path, &config, &muxer, &tx, &cancel).unwrap();
    drain(&rx);

    // FakeMuxer's "video" is a directory holding copies of the frame PNGs;
    // corrupt a single pixel of the lone frame before decoding.
    let frame_path = video_path.join("out_00000001.png");
    let mut img = image::open(&frame_path).unwrap().to_rgba8();
    let pixel = img.get_pixel(0, 0).0;
    img.put_pixel(0, 0, image::Rgba([255 - pixel[0], 255 - pixel[1], 255 - pixel[2], 255]));
    img.save(&frame_path).unwrap();

    let output_dir = tmp.path().join("decoded");
    fs::create_dir_all(&output_dir).unwrap();
    let dest = decode::decode(&video_path, &output_dir, false, &config, &muxer, &tx, &cancel)
        .unwrap();
    drain(&rx);

    assert_eq!(fs::read(&dest).unwrap(), original);
}

#[test]
fn pre_cancelled_token_short_circuits_decode() {
    let tmp = tempfile::tempdir().unwrap();
    // Build a real (tiny) video first, using a fresh token, so decode has
    // something to look at before being handed a cancelled one.
    let input_path = tmp.path().join("in.bin");
    fs::write(&input_path, b"some bytes").unwrap();
    let video_path = tmp.path().join("out.video");
    let config = PipelineConfig::default();
    let muxer = FakeMuxer;
    let (tx, rx) = crossbeam_channel::unbounded();
    encode::encode(
        &input_path,
        &video_path,
        &config,
        &muxer,
        &tx,
        &CancellationToken::new(),
    )
    .unwrap();
    drain(&rx);

    let output_dir = tmp.path().join("decoded");
    fs::create_dir_all(&output_dir).unwrap();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = decode::decode(
        &video_path,
        &output_dir,
        false,
        &config,
        &muxer,
        &tx,
        &cancel,
    )
    .unwrap_err();
    assert!(matches!(err, FrameReelError::Cancelled));
}
