//! WAV audio file processing

use std::fs::File;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavWriter};
use ndarray::Array1;

use crate::error::{ChanStressError, Result};

/// Mono audio in [-1, 1] with its sample rate.
///
/// Multi-channel input is averaged into one channel at load time; the
/// engine never sees more than one channel.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub samples: Array1<f32>,
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Array1<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration(&self) -> f64 {
        self.len() as f64 / self.sample_rate as f64
    }

    /// Read a WAV file and downmix whatever channel layout it has.
    pub fn from_wav_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            ChanStressError::audio(format!("Cannot open audio file {}: {}", path.display(), e))
        })?;
        let mut reader = WavReader::new(file)?;

        let spec = reader.spec();
        if spec.sample_rate == 0 {
            return Err(ChanStressError::audio("Invalid sample rate"));
        }
        if spec.channels == 0 {
            return Err(ChanStressError::audio("Invalid channel count"));
        }

        let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 16) => reader
                .samples::<i16>()
                .map(|s| s.map(|v| v as f32 / 32767.0))
                .collect::<std::result::Result<_, _>>()?,
            (SampleFormat::Float, 32) => reader
                .samples::<f32>()
                .collect::<std::result::Result<_, _>>()?,
            (fmt, bits) => {
                return Err(ChanStressError::audio(format!(
                    "Unsupported WAV format: {bits}-bit {fmt:?}"
                )));
            }
        };

        let channels = spec.channels as usize;
        let frames = interleaved.len() / channels;
        if frames == 0 {
            return Err(ChanStressError::audio("Audio file holds no samples"));
        }

        let samples = if channels == 1 {
            Array1::from(interleaved)
        } else {
            Array1::from_iter(interleaved.chunks_exact(channels).map(|frame| {
                frame.iter().sum::<f32>() / channels as f32
            }))
        };

        Ok(Self::new(samples, spec.sample_rate))
    }

    /// Write as mono 16-bit PCM, clamping every sample.
    pub fn write_wav_16bit<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        let file = File::create(path).map_err(|e| {
            ChanStressError::audio(format!("Cannot create output file {}: {}", path.display(), e))
        })?;
        let mut writer = WavWriter::new(file, spec)?;
        for &sample in self.samples.iter() {
            let clamped = sample.clamp(-1.0, 1.0);
            writer.write_sample((clamped * 32767.0) as i16)?;
        }
        writer.finalize()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_mono_roundtrip() {
        let samples = Array1::from(vec![0.1f32, -0.5, 0.9, 0.0]);
        let audio = AudioBuffer::new(samples.clone(), 8000);

        let tmp = NamedTempFile::new().unwrap();
        audio.write_wav_16bit(tmp.path()).unwrap();

        let loaded = AudioBuffer::from_wav_file(tmp.path()).unwrap();
        assert_eq!(loaded.sample_rate, 8000);
        assert_eq!(loaded.len(), 4);
        for (a, b) in samples.iter().zip(loaded.samples.iter()) {
            assert!((a - b).abs() < 1e-4);
        }
    }

    #[test]
    fn test_stereo_is_downmixed() {
        let tmp = NamedTempFile::new().unwrap();
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 16000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(tmp.path(), spec).unwrap();
        // Left 0.5, right -0.5 averages to silence; then both 0.4.
        for _ in 0..10 {
            writer.write_sample((0.5f32 * 32767.0) as i16).unwrap();
            writer.write_sample((-0.5f32 * 32767.0) as i16).unwrap();
        }
        for _ in 0..10 {
            writer.write_sample((0.4f32 * 32767.0) as i16).unwrap();
            writer.write_sample((0.4f32 * 32767.0) as i16).unwrap();
        }
        writer.finalize().unwrap();

        let loaded = AudioBuffer::from_wav_file(tmp.path()).unwrap();
        assert_eq!(loaded.len(), 20);
        for i in 0..10 {
            assert!(loaded.samples[i].abs() < 1e-4);
        }
        for i in 10..20 {
            assert!((loaded.samples[i] - 0.4).abs() < 1e-3);
        }
    }

    #[test]
    fn test_missing_file_errors() {
        let result = AudioBuffer::from_wav_file("/nonexistent/nothing.wav");
        assert!(result.is_err());
    }

    #[test]
    fn test_write_clamps_out_of_range() {
        let audio = AudioBuffer::new(Array1::from(vec![2.0f32, -2.0]), 8000);
        let tmp = NamedTempFile::new().unwrap();
        audio.write_wav_16bit(tmp.path()).unwrap();

        let loaded = AudioBuffer::from_wav_file(tmp.path()).unwrap();
        assert!((loaded.samples[0] - 1.0).abs() < 1e-4);
        assert!((loaded.samples[1] + 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_duration() {
        let audio = AudioBuffer::new(Array1::zeros(4000), 8000);
        assert!((audio.duration() - 0.5).abs() < 1e-9);
    }
}
