//! WAV export and import for rendered messages.
//!
//! The generators are mono, so the surface here is deliberately small:
//! rendered waveforms go out as 32-bit float mono, and anything hound can
//! open comes back in as mono f32, mixing multi-channel files down by
//! averaging.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavWriter};

use crate::Result;

/// Write mono samples as a 32-bit float WAV.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Read a WAV file as mono f32 samples plus its sample rate.
///
/// Integer formats are scaled to `[-1, 1]`; multi-channel files are mixed
/// down by averaging the channels of each frame.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, u32)> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            // u32 so a 32-bit file's divisor stays positive.
            let max_val = (1u32 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    let mono = if channels > 1 {
        samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    } else {
        samples
    };

    Ok((mono, spec.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn float_mono_roundtrip_is_exact() {
        let samples: Vec<f32> = (0..1000).map(|i| (i as f32 / 50.0).sin() * 0.8).collect();
        let file = NamedTempFile::new().unwrap();
        write_wav(file.path(), &samples, 44_100).unwrap();

        let (loaded, sample_rate) = read_wav(file.path()).unwrap();
        assert_eq!(sample_rate, 44_100);
        assert_eq!(loaded, samples);
    }

    #[test]
    fn integer_samples_scale_to_unit_range() {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let file = NamedTempFile::new().unwrap();
        let mut writer = WavWriter::create(file.path(), spec).unwrap();
        for value in [0i16, 16_384, -16_384] {
            writer.write_sample(value).unwrap();
        }
        writer.finalize().unwrap();

        let (loaded, sample_rate) = read_wav(file.path()).unwrap();
        assert_eq!(sample_rate, 22_050);
        assert_eq!(loaded.len(), 3);
        assert!(loaded[0].abs() < 1e-6);
        assert!((loaded[1] - 0.5).abs() < 1e-3);
        assert!((loaded[2] + 0.5).abs() < 1e-3);
    }

    #[test]
    fn stereo_mixes_down_by_averaging() {
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 48_000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let file = NamedTempFile::new().unwrap();
        let mut writer = WavWriter::create(file.path(), spec).unwrap();
        for _ in 0..100 {
            writer.write_sample(0.2f32).unwrap();
            writer.write_sample(0.6f32).unwrap();
        }
        writer.finalize().unwrap();

        let (loaded, _) = read_wav(file.path()).unwrap();
        assert_eq!(loaded.len(), 100);
        for sample in loaded {
            assert!((sample - 0.4).abs() < 1e-6, "bad mixdown: {sample}");
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.wav");
        assert!(read_wav(&path).is_err());
    }
}
