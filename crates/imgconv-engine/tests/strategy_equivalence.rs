//! Cross-strategy equivalence: serial, SFT, NoSFT, and master/worker must
//! produce pixel-identical output for the same input/operation/topology.

use imgconv_core::config::{Mode, Topology};
use imgconv_core::{generator, Operation, RunConfig};

fn config(mode: Mode, input: std::path::PathBuf, operation: Operation, processes: u32, chunk_size: u32) -> RunConfig {
    RunConfig {
        mode,
        input,
        output: std::path::PathBuf::new(),
        operation,
        chunk_size,
        topology: Topology { processes, cores_per_node: 4, nodes: 1 },
    }
}

fn write_fixture(dir: &std::path::Path, name: &str, width: u32, height: u32, seed: u64) -> std::path::PathBuf {
    let path = dir.join(name);
    let image = generator::random(width, height, seed);
    imgconv_bmp::save(&path, &image).unwrap();
    path
}

#[test]
fn sft_matches_serial_across_process_counts() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "a.bmp", 37, 23, 1);

    let serial = imgconv_engine::run(&config(Mode::Serial, path.clone(), Operation::Gaussblur5, 1, 0)).unwrap();
    for processes in [1, 2, 4, 5] {
        let out = imgconv_engine::run(&config(Mode::Sft, path.clone(), Operation::Gaussblur5, processes, 0)).unwrap();
        assert_eq!(out, serial, "SFT with {processes} processes diverged from serial");
    }
}

#[test]
fn nosft_matches_serial_across_process_counts() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "a.bmp", 29, 31, 2);

    let serial = imgconv_engine::run(&config(Mode::Serial, path.clone(), Operation::Ridge, 1, 0)).unwrap();
    for processes in [1, 3, 4] {
        let out = imgconv_engine::run(&config(Mode::NoSft, path.clone(), Operation::Ridge, processes, 0)).unwrap();
        assert_eq!(out, serial, "NoSFT with {processes} processes diverged from serial");
    }
}

#[test]
fn master_worker_matches_serial_for_varied_chunk_sizes() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "a.bmp", 19, 50, 3);

    let serial = imgconv_engine::run(&config(Mode::Serial, path.clone(), Operation::Sharpen, 1, 0)).unwrap();
    for chunk_size in [1, 5, 7, 73, 1000] {
        let out =
            imgconv_engine::run(&config(Mode::MasterWorker, path.clone(), Operation::Sharpen, 4, chunk_size)).unwrap();
        assert_eq!(out, serial, "master/worker with chunk_size={chunk_size} diverged from serial");
    }
}

#[test]
fn master_worker_empty_chunk_termination_with_more_workers_than_chunks() {
    // P=8 means 7 workers; H=10 with chunk_size=100 means only the first
    // worker ever gets a chunk, the rest are terminated immediately.
    let dir = tempfile::tempdir().unwrap();
    let path = write_fixture(dir.path(), "small.bmp", 4, 10, 4);

    let serial = imgconv_engine::run(&config(Mode::Serial, path.clone(), Operation::Boxblur, 1, 0)).unwrap();
    let out = imgconv_engine::run(&config(Mode::MasterWorker, path, Operation::Boxblur, 8, 100)).unwrap();
    assert_eq!(out.height(), 10);
    assert_eq!(out, serial);
}

#[test]
fn trivial_one_by_one_image_is_unchanged_by_boxblur() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tiny.bmp");
    let image = generator::constant(1, 1, imgconv_core::Pixel::new(42, 17, 200));
    imgconv_bmp::save(&path, &image).unwrap();

    let out = imgconv_engine::run(&config(Mode::Serial, path, Operation::Boxblur, 1, 0)).unwrap();
    assert_eq!(out, image);
}
