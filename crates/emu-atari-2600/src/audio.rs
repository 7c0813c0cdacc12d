//! Host audio output.
//!
//! The synthesizer is pull-driven: the device callback locks the shared
//! synth and asks it for exactly as many samples as the device wants. The
//! emulation thread only touches the synth on audio register writes.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};

use crate::bus::SharedSynth;

/// A running mono output stream fed from the shared synth.
pub struct AudioOutput {
    _stream: Stream,
}

impl AudioOutput {
    /// Open the default output device at the synth's sample rate.
    ///
    /// Returns None if no audio device is available.
    #[must_use]
    pub fn new(synth: SharedSynth) -> Option<Self> {
        let host = cpal::default_host();
        let device = host.default_output_device()?;

        let sample_rate = synth.lock().sample_rate();
        let config = StreamConfig {
            channels: 1,
            sample_rate: SampleRate(sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    synth.lock().fill_f32(data);
                },
                |err| log::error!("Audio stream error: {err}"),
                None,
            )
            .ok()?;

        stream.play().ok()?;
        log::info!("Audio output at {sample_rate} Hz");

        Some(Self { _stream: stream })
    }
}
