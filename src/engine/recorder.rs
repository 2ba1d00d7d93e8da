//! WAV file recorder

use super::Engine;
use anyhow::{Context, Result};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

const CHUNK: usize = 4096;

/// Mono 32-bit float WAV writer
pub struct Recorder {
    writer: WavWriter<BufWriter<File>>,
    sample_rate: u32,
    samples_written: u64,
}

impl Recorder {
    /// Create a new recorder writing to the given path
    ///
    /// The header is only valid after [`Recorder::finalize`].
    pub fn new(path: &Path, sample_rate: u32) -> Result<Self> {
        let spec = WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let writer = WavWriter::create(path, spec)
            .with_context(|| format!("failed to create WAV file: {}", path.display()))?;

        Ok(Self {
            writer,
            sample_rate,
            samples_written: 0,
        })
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the number of samples written so far
    pub fn samples_written(&self) -> u64 {
        self.samples_written
    }

    /// Get the recorded duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.samples_written as f64 / self.sample_rate as f64
    }

    /// Write a buffer of mono samples
    pub fn write_buffer(&mut self, buffer: &[f32]) -> Result<()> {
        for &sample in buffer {
            self.writer.write_sample(sample).context("failed to write sample")?;
        }
        self.samples_written += buffer.len() as u64;
        Ok(())
    }

    /// Render `secs` seconds of engine output
    ///
    /// Samples are pulled in fixed-size chunks; negative durations write
    /// nothing.
    pub fn render(&mut self, engine: &mut Engine, secs: f64) -> Result<()> {
        let total = (secs.max(0.0) * self.sample_rate as f64).round() as u64;
        let mut buffer = vec![0.0f32; CHUNK];
        let mut remaining = total;
        while remaining > 0 {
            let n = remaining.min(CHUNK as u64) as usize;
            engine.fill_buffer(&mut buffer[..n]);
            self.write_buffer(&buffer[..n])?;
            remaining -= n as u64;
        }
        Ok(())
    }

    /// Write the header and close the file
    pub fn finalize(self) -> Result<()> {
        self.writer.finalize().context("failed to finalize WAV file")
    }
}
