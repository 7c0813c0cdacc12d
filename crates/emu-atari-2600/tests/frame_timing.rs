//! Driver loop timing: frame boundaries, WSYNC halts and scanline delivery.

mod common;

use std::sync::Arc;

use atari_tia::registers as reg;
use atari_tia::{SCANLINE_WIDTH, VISIBLE_LINES, color_index};
use emu_atari_2600::palette;
use emu_atari_2600::{StopCondition, TextFrame};
use parking_lot::Mutex;

use common::{FRAME_CYCLES, LineCounter, OP_CYCLES, Op, SharedText, frame_program, machine};

#[test]
fn reset_fetches_vector_through_cartridge() {
    let vcs = machine(frame_program(&[]));
    assert_eq!(emu_core::Processor::pc(vcs.cpu()), 0xF000);
    assert_eq!(vcs.frame_count(), 0);
}

#[test]
fn frame_ends_on_vsync_rising_edge() {
    let mut vcs = machine(frame_program(&[]));

    // The first strobe is the very first instruction.
    assert_eq!(vcs.run_frame().expect("frame"), u64::from(OP_CYCLES));
    assert_eq!(vcs.frame_count(), 1);

    for frame in 2..=4 {
        assert_eq!(vcs.run_frame().expect("frame"), FRAME_CYCLES);
        assert_eq!(vcs.frame_count(), frame);
    }
}

#[test]
fn vsync_held_over_several_steps_counts_once() {
    let mut vcs = machine(frame_program(&[]));
    vcs.run_frame().expect("frame");
    // Three WSYNC lines with VSYNC still high.
    for _ in 0..300 {
        vcs.step().expect("step");
    }
    assert_eq!(vcs.frame_count(), 1);
}

#[test]
fn wsync_idles_the_processor_until_line_end() {
    let mut vcs = machine(frame_program(&[]));
    vcs.step().expect("vsync");
    assert_eq!(vcs.step().expect("wsync"), OP_CYCLES);
    assert_eq!(vcs.bus().tia().map(atari_tia::Tia::rdy), Some(false));

    assert_eq!(vcs.step().expect("idle"), 1);
    assert_eq!(vcs.cpu().steps, 2);

    assert!(vcs.run_until(StopCondition::RdyReleased, 1000).expect("run"));
    assert_eq!(vcs.cpu().steps, 2);
    let tia = vcs.bus().tia().expect("tia");
    assert_eq!(tia.dot(), 0);
    assert_eq!(tia.scanline(), 1);
    assert_eq!(vcs.cycles().get(), u64::from(OP_CYCLES) + 76);
}

#[test]
fn run_until_gives_up_at_limit() {
    // Never raises VSYNC.
    let mut vcs = machine(vec![Op::Write(reg::WSYNC, 0)]);
    assert!(!vcs.run_until(StopCondition::Vsync, 5000).expect("run"));
    assert!(vcs.cycles().get() >= 5000);
    assert_eq!(vcs.frame_count(), 0);
}

#[test]
fn unreported_cycles_are_elapsed_by_the_machine() {
    let mut vcs = machine(vec![Op::Read(0x1000)]);
    vcs.cpu_mut().quiet = true;
    vcs.step().expect("step");
    vcs.step().expect("step");
    assert_eq!(vcs.bus().pending(), 0);
    assert_eq!(vcs.bus().tia().map(atari_tia::Tia::dot), Some(18));
    assert_eq!(vcs.cycles().get(), 6);
}

#[test]
fn every_visible_line_reaches_the_sinks() {
    let mut vcs = machine(frame_program(&[Op::Write(reg::COLUBK, 0x1E)]));
    let lines = Arc::new(Mutex::new(Vec::new()));
    vcs.add_video_sink(Box::new(LineCounter(Arc::clone(&lines))));

    vcs.run_frame().expect("sync up");
    assert!(lines.lock().is_empty());

    vcs.run_frame().expect("frame");
    vcs.run_frame().expect("frame");
    let lines = lines.lock();
    assert_eq!(lines.len(), 2 * VISIBLE_LINES);
    let expected: Vec<u16> = (0..VISIBLE_LINES as u16).collect();
    assert_eq!(&lines[..VISIBLE_LINES], expected.as_slice());

    let background = palette::argb(color_index(0x1E));
    assert!(vcs.framebuffer().pixels().iter().all(|&p| p == background));
}

#[test]
fn text_sink_shows_playfield() {
    let program = frame_program(&[Op::Write(reg::PF0, 0xF0)]);
    let mut vcs = machine(program);
    let text = Arc::new(Mutex::new(TextFrame::new()));
    vcs.add_video_sink(Box::new(SharedText(Arc::clone(&text))));

    vcs.run_frame().expect("sync up");
    vcs.run_frame().expect("frame");

    let row: Vec<char> = text.lock().row(100).expect("row").chars().collect();
    assert_eq!(row.len(), SCANLINE_WIDTH);
    assert!(row[..16].iter().all(|&c| c == '#'));
    assert_eq!(row[16], ' ');
    assert!(row[80..96].iter().all(|&c| c == '#'));
    assert_eq!(row[96], ' ');
}
