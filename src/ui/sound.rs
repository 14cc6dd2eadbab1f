/// Sound engine: procedural square-wave beeps via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Game events map onto a handful of cues (`cue_for`):
///   Click    880 Hz blip   menu moves, switch toggles, tile flips, node hits
///   Success  440 Hz beep   pair matched
///   Failure  220 Hz buzz   pair mismatch, node miss
///   Trap     noise sweep   maze trap
///   Clear    fanfare       level completed, game won
///   Lose     falling tones level failed
///
/// Compile without the "sound" feature to disable audio entirely (the
/// stub SoundEngine does nothing).

use crate::sim::event::GameEvent;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Cue {
    Click,
    Success,
    Failure,
    Trap,
    Clear,
    Lose,
}

/// Which cue, if any, an event should make.
pub fn cue_for(event: &GameEvent) -> Option<Cue> {
    match event {
        GameEvent::MenuMoved
        | GameEvent::MenuSelected
        | GameEvent::InputToggled { .. }
        | GameEvent::TileFlipped { .. }
        | GameEvent::NodeHit { .. } => Some(Cue::Click),
        GameEvent::PairMatched { .. } => Some(Cue::Success),
        GameEvent::PairMismatched | GameEvent::NodeMissed { .. } => Some(Cue::Failure),
        GameEvent::TrapTriggered { .. } => Some(Cue::Trap),
        GameEvent::LevelCompleted { .. } | GameEvent::GameWon => Some(Cue::Clear),
        GameEvent::LevelFailed { .. } => Some(Cue::Lose),
        GameEvent::PlayerMoved { .. } | GameEvent::LevelStarted { .. } => None,
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use log::{info, warn};
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::Cue;

    const SAMPLE_RATE: u32 = 22050;

    /// Pre-generated WAV buffers for each cue.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_click: Arc<Vec<u8>>,
        sfx_success: Arc<Vec<u8>>,
        sfx_failure: Arc<Vec<u8>>,
        sfx_trap: Arc<Vec<u8>>,
        sfx_clear: Arc<Vec<u8>>,
        sfx_lose: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        /// `None` when no output device is available.
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("audio disabled: {e}");
                    return None;
                }
            };

            // ── Generate all sound buffers ──
            let engine = SoundEngine {
                _stream: stream,
                handle,
                sfx_click: Arc::new(make_wav(&gen_square(880.0, 0.05, 0.15))),
                sfx_success: Arc::new(make_wav(&gen_square(440.0, 0.15, 0.18))),
                sfx_failure: Arc::new(make_wav(&gen_square(220.0, 0.25, 0.2))),
                sfx_trap: Arc::new(make_wav(&gen_trap())),
                sfx_clear: Arc::new(make_wav(&gen_clear())),
                sfx_lose: Arc::new(make_wav(&gen_lose())),
            };
            info!("audio ready");
            Some(engine)
        }

        fn play_buf(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play(&self, cue: Cue) {
            let buf = match cue {
                Cue::Click => &self.sfx_click,
                Cue::Success => &self.sfx_success,
                Cue::Failure => &self.sfx_failure,
                Cue::Trap => &self.sfx_trap,
                Cue::Clear => &self.sfx_clear,
                Cue::Lose => &self.sfx_lose,
            };
            self.play_buf(buf);
        }

        /// Short typewriter tick for the intro banner.
        pub fn play_intro_blip(&self, line: usize, total_lines: usize) {
            // Pitch rises line by line
            let ratio = line as f32 / total_lines.max(1) as f32;
            let freq = 300.0 + ratio * 800.0;
            self.play_buf(&Arc::new(make_wav(&gen_square(freq, 0.03, 0.1))));
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators — all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    fn square(t: f32, freq: f32) -> f32 {
        if (t * freq).fract() < 0.5 { 1.0 } else { -1.0 }
    }

    /// Square wave with a linear fade out.
    fn gen_square(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                square(t, freq) * env * volume
            })
            .collect()
    }

    /// Trap: noise burst over a falling tone
    fn gen_trap() -> Vec<f32> {
        let duration = 0.2;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut rng: u32 = 12345;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = 500.0 - t * 350.0;
                let ti = i as f32 / SAMPLE_RATE as f32;
                // Simple LCG noise
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let env = (1.0 - t).powf(0.8);
                (square(ti, freq) * 0.4 + noise * 0.6) * env * 0.25
            })
            .collect()
    }

    fn gen_notes(notes: &[f32], note_dur: f32, volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32) * 0.3;
                samples.push(square(t, freq) * env * volume);
            }
        }
        samples
    }

    /// Level clear: ascending fanfare C5→E5→G5→C6
    fn gen_clear() -> Vec<f32> {
        let mut samples = gen_notes(&[523.0, 659.0, 784.0], 0.1, 0.15);
        samples.extend(gen_square(1047.0, 0.3, 0.15));
        samples
    }

    /// Time up: descending A4→F#4→Eb4→C4 with a fade
    fn gen_lose() -> Vec<f32> {
        let mut samples = gen_notes(&[440.0, 370.0, 311.0, 261.0], 0.12, 0.18);
        let fade_len = samples.len() / 4;
        let total = samples.len();
        for (i, s) in samples.iter_mut().enumerate().skip(total - fade_len) {
            *s *= (total - i) as f32 / fade_len as f32;
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder — wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _cue: Cue) {}
    pub fn play_intro_blip(&self, _line: usize, _total: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_cues() {
        assert_eq!(cue_for(&GameEvent::NodeMissed { node: 0 }), Some(Cue::Failure));
        assert_eq!(cue_for(&GameEvent::PairMatched { symbol: "0x01".into() }), Some(Cue::Success));
        assert_eq!(cue_for(&GameEvent::InputToggled { index: 0, output: true }), Some(Cue::Click));
        assert_eq!(cue_for(&GameEvent::TrapTriggered { row: 1, col: 1 }), Some(Cue::Trap));
        assert_eq!(cue_for(&GameEvent::PlayerMoved { row: 0, col: 1 }), None);
    }

    #[cfg(feature = "sound")]
    #[test]
    fn wav_header_is_well_formed() {
        let wav = inner::make_wav(&[0.0, 1.0, -1.0]);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + 6);
        assert_eq!(i16::from_le_bytes([wav[46], wav[47]]), 32767);
    }
}
