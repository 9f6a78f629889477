//! Frame-level audio feature extraction.
//!
//! Parses PCM16 mono WAV files directly and computes the loudness, spectral
//! flux and zero-crossing signals the highlight scorer consumes.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::error::{MediaError, MediaResult};
use crate::traits::AudioAnalyzer;

const FRAME_MS: u32 = 20;

/// Per-frame audio signals over the whole track, at `frames_per_sec`
/// resolution (50 for 20ms frames).
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFeatures {
    pub frames_per_sec: f64,
    pub rms: Vec<f32>,
    pub flux: Vec<f32>,
    pub zcr: Vec<f32>,
}

impl AudioFeatures {
    /// Mean of a signal over the `[start, end)` window in seconds.
    /// Windows outside the track, and empty windows, yield 0.
    fn window_mean(signal: &[f32], frames_per_sec: f64, start: f64, end: f64) -> f64 {
        let lo = ((start * frames_per_sec).floor().max(0.0)) as usize;
        let hi = (((end * frames_per_sec).ceil()) as usize).min(signal.len());
        if lo >= hi {
            return 0.0;
        }
        let sum: f64 = signal[lo..hi].iter().map(|v| *v as f64).sum();
        sum / (hi - lo) as f64
    }

    pub fn mean_rms(&self, start: f64, end: f64) -> f64 {
        Self::window_mean(&self.rms, self.frames_per_sec, start, end)
    }

    pub fn mean_flux(&self, start: f64, end: f64) -> f64 {
        Self::window_mean(&self.flux, self.frames_per_sec, start, end)
    }

    pub fn mean_zcr(&self, start: f64, end: f64) -> f64 {
        Self::window_mean(&self.zcr, self.frames_per_sec, start, end)
    }
}

/// Computes [`AudioFeatures`] from a PCM16 mono WAV file.
///
/// The parse is done on a blocking thread; WAV tracks for long videos run
/// to hundreds of megabytes.
#[derive(Debug, Default)]
pub struct WavFeatureAnalyzer;

impl WavFeatureAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AudioAnalyzer for WavFeatureAnalyzer {
    async fn analyze(&self, audio: &Path) -> MediaResult<AudioFeatures> {
        let path = audio.to_path_buf();
        let features = tokio::task::spawn_blocking(move || analyze_wav(&path))
            .await
            .map_err(|e| MediaError::invalid_audio(audio, format!("analysis task failed: {e}")))??;

        debug!(
            audio = %audio.display(),
            frames = features.rms.len(),
            "Computed audio features"
        );
        Ok(features)
    }
}

fn analyze_wav(path: &Path) -> MediaResult<AudioFeatures> {
    let wav = parse_pcm16_mono_wav(path)?;

    let frames_per_sec = 1_000.0 / FRAME_MS as f64;
    let frame_samples = (((wav.sample_rate_hz as u64) * (FRAME_MS as u64)) / 1_000).max(1) as usize;

    let mut rms = Vec::new();
    let mut zcr = Vec::new();
    let mut energy = Vec::new();

    for chunk in wav.samples.chunks(frame_samples) {
        if chunk.is_empty() {
            continue;
        }

        let sum_sq = chunk.iter().fold(0.0_f64, |acc, value| {
            let normalized = (*value as f64) / 32768.0;
            acc + normalized * normalized
        });
        let mean_sq = sum_sq / chunk.len() as f64;
        rms.push(mean_sq.sqrt() as f32);
        energy.push(mean_sq as f32);

        let crossings = chunk
            .windows(2)
            .filter(|pair| (pair[0] >= 0) != (pair[1] >= 0))
            .count();
        zcr.push(crossings as f32 / chunk.len() as f32);
    }

    // Flux as the positive frame-to-frame energy increase; onsets score,
    // decays do not. The first frame has no predecessor and gets 0.
    let mut flux = Vec::with_capacity(energy.len());
    let mut prev = 0.0_f32;
    for (i, &e) in energy.iter().enumerate() {
        if i == 0 {
            flux.push(0.0);
        } else {
            flux.push((e - prev).max(0.0));
        }
        prev = e;
    }

    Ok(AudioFeatures {
        frames_per_sec,
        rms,
        flux,
        zcr,
    })
}

#[derive(Debug)]
struct WavPcm16Mono {
    sample_rate_hz: u32,
    samples: Vec<i16>,
}

fn parse_pcm16_mono_wav(path: &Path) -> MediaResult<WavPcm16Mono> {
    let bytes = std::fs::read(path)?;
    if bytes.len() < 44 {
        return Err(MediaError::invalid_audio(
            path,
            format!("wav too small: {} bytes", bytes.len()),
        ));
    }
    if bytes.get(0..4) != Some(b"RIFF".as_slice()) || bytes.get(8..12) != Some(b"WAVE".as_slice()) {
        return Err(MediaError::invalid_audio(
            path,
            "unsupported container; expected RIFF/WAVE",
        ));
    }

    let mut cursor = 12usize;
    let mut sample_rate_hz: Option<u32> = None;
    let mut channels: Option<u16> = None;
    let mut bits_per_sample: Option<u16> = None;
    let mut audio_format: Option<u16> = None;
    let mut data: Option<Vec<u8>> = None;

    while cursor + 8 <= bytes.len() {
        let chunk_id = &bytes[cursor..cursor + 4];
        let chunk_size = u32::from_le_bytes([
            bytes[cursor + 4],
            bytes[cursor + 5],
            bytes[cursor + 6],
            bytes[cursor + 7],
        ]) as usize;
        let data_start = cursor + 8;
        let data_end = data_start.saturating_add(chunk_size).min(bytes.len());

        if chunk_id == b"fmt " {
            if data_end.saturating_sub(data_start) < 16 {
                return Err(MediaError::invalid_audio(path, "invalid fmt chunk"));
            }
            let fmt = &bytes[data_start..data_end];
            audio_format = Some(u16::from_le_bytes([fmt[0], fmt[1]]));
            channels = Some(u16::from_le_bytes([fmt[2], fmt[3]]));
            sample_rate_hz = Some(u32::from_le_bytes([fmt[4], fmt[5], fmt[6], fmt[7]]));
            bits_per_sample = Some(u16::from_le_bytes([fmt[14], fmt[15]]));
        } else if chunk_id == b"data" {
            data = Some(bytes[data_start..data_end].to_vec());
        }

        // Chunks are word-aligned.
        cursor = data_start
            .saturating_add(chunk_size)
            .saturating_add(chunk_size % 2);
    }

    let sample_rate_hz =
        sample_rate_hz.ok_or_else(|| MediaError::invalid_audio(path, "missing fmt sample_rate"))?;
    let channels =
        channels.ok_or_else(|| MediaError::invalid_audio(path, "missing fmt channels"))?;
    let bits_per_sample = bits_per_sample
        .ok_or_else(|| MediaError::invalid_audio(path, "missing fmt bits_per_sample"))?;
    let audio_format =
        audio_format.ok_or_else(|| MediaError::invalid_audio(path, "missing fmt audio_format"))?;
    let data = data.ok_or_else(|| MediaError::invalid_audio(path, "missing data chunk"))?;

    if audio_format != 1 {
        return Err(MediaError::invalid_audio(
            path,
            format!("unsupported audio_format={audio_format}; expected PCM (1)"),
        ));
    }
    if channels != 1 {
        return Err(MediaError::invalid_audio(
            path,
            format!("unsupported channels={channels}; expected mono (1)"),
        ));
    }
    if bits_per_sample != 16 {
        return Err(MediaError::invalid_audio(
            path,
            format!("unsupported bits_per_sample={bits_per_sample}; expected 16"),
        ));
    }
    if sample_rate_hz == 0 {
        return Err(MediaError::invalid_audio(path, "invalid sample_rate 0"));
    }

    let mut samples = Vec::with_capacity(data.len() / 2);
    for pair in data.chunks_exact(2) {
        samples.push(i16::from_le_bytes([pair[0], pair[1]]));
    }

    Ok(WavPcm16Mono {
        sample_rate_hz,
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_pcm16_mono_wav(path: &Path, sample_rate: u32, samples: &[i16]) {
        let data_len = (samples.len() * 2) as u32;
        let mut bytes = Vec::with_capacity(44 + data_len as usize);

        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36u32 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");

        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes()); // block align
        bytes.extend_from_slice(&16u16.to_le_bytes());

        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        for sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }

        std::fs::write(path, bytes).expect("write wav");
    }

    #[test]
    fn test_silence_has_zero_signals() {
        let dir = tempdir().unwrap();
        let wav = dir.path().join("silence.wav");
        write_pcm16_mono_wav(&wav, 16_000, &vec![0i16; 16_000]);

        let features = analyze_wav(&wav).unwrap();
        assert_eq!(features.rms.len(), 50); // 1s of 20ms frames
        assert!(features.rms.iter().all(|&v| v == 0.0));
        assert!(features.flux.iter().all(|&v| v == 0.0));
        assert_eq!(features.mean_rms(0.0, 1.0), 0.0);
    }

    #[test]
    fn test_louder_window_scores_higher() {
        let dir = tempdir().unwrap();
        let wav = dir.path().join("pulse.wav");

        // 1s silence, then 1s of a loud square wave.
        let mut samples = vec![0i16; 16_000];
        for i in 0..16_000usize {
            samples.push(if (i / 40) % 2 == 0 { 12_000 } else { -12_000 });
        }
        write_pcm16_mono_wav(&wav, 16_000, &samples);

        let features = analyze_wav(&wav).unwrap();
        assert!(features.mean_rms(1.0, 2.0) > features.mean_rms(0.0, 1.0));
        assert!(features.mean_zcr(1.0, 2.0) > 0.0);
        // The onset at t=1.0 produces positive flux somewhere in the window.
        assert!(features.mean_flux(0.9, 1.1) > 0.0);
    }

    #[test]
    fn test_window_outside_track_is_zero() {
        let features = AudioFeatures {
            frames_per_sec: 50.0,
            rms: vec![0.5; 50],
            flux: vec![0.1; 50],
            zcr: vec![0.2; 50],
        };
        assert_eq!(features.mean_rms(10.0, 20.0), 0.0);
        assert_eq!(features.mean_rms(2.0, 1.0), 0.0);
        assert!((features.mean_rms(0.0, 1.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_header_rejected() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("bogus.wav");
        std::fs::write(&file, b"not-a-wav").unwrap();

        assert!(matches!(
            analyze_wav(&file),
            Err(MediaError::InvalidAudio { .. })
        ));
    }

    #[test]
    fn test_stereo_rejected() {
        let dir = tempdir().unwrap();
        let wav = dir.path().join("stereo.wav");

        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&40u32.to_le_bytes());
        bytes.extend_from_slice(b"WAVE");
        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes()); // stereo
        bytes.extend_from_slice(&16_000u32.to_le_bytes());
        bytes.extend_from_slice(&64_000u32.to_le_bytes());
        bytes.extend_from_slice(&4u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&4u32.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 4]);
        std::fs::write(&wav, bytes).unwrap();

        assert!(matches!(
            analyze_wav(&wav),
            Err(MediaError::InvalidAudio { .. })
        ));
    }
}
