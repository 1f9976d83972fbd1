use super::{clamp_inputs, clamp_outputs, Function, FunctionDescriptor, OutputBuffer};
use crate::error::{ColorCoreError, Result};

const MAX_SAMPLES: usize = 8_000_000;

/// PDF Type 0 (sampled) function: an N-dimensional grid of output samples,
/// evaluated with multilinear interpolation across the `2^N` corners
/// surrounding the input point.
#[derive(Debug)]
pub struct SampledFunction {
    domain: Vec<f32>,
    range: Vec<f32>,
    size: Vec<u32>,
    strides: Vec<usize>,
    output_components: usize,
    encode: Vec<f32>,
    decode: Vec<f32>,
    table: Vec<f32>,
    out: OutputBuffer,
}

impl SampledFunction {
    pub fn new(descriptor: &FunctionDescriptor) -> Result<Self> {
        if descriptor.size.is_empty() {
            return Err(ColorCoreError::InvalidFunction(
                "sampled function requires a non-empty size array".to_string(),
            ));
        }
        let range = descriptor.range.clone().ok_or_else(|| {
            ColorCoreError::InvalidFunction("sampled function requires a range array".to_string())
        })?;
        let output_components = range.len() / 2;
        if output_components == 0 {
            return Err(ColorCoreError::InvalidFunction(
                "sampled function range must declare at least one output".to_string(),
            ));
        }
        if !(1..=32).contains(&descriptor.bits_per_sample) {
            return Err(ColorCoreError::InvalidFunction(format!(
                "bits_per_sample {} out of range [1,32]",
                descriptor.bits_per_sample
            )));
        }

        let total_entries: u64 = descriptor.size.iter().map(|&s| s as u64).product();
        let total_samples = total_entries.saturating_mul(output_components as u64);
        if total_samples > MAX_SAMPLES as u64 {
            return Err(ColorCoreError::SampledGridTooLarge(total_samples as usize));
        }

        let mut strides = Vec::with_capacity(descriptor.size.len());
        let mut stride = 1usize;
        for &s in &descriptor.size {
            strides.push(stride);
            stride = stride.saturating_mul(s as usize);
        }

        let encode = descriptor.encode.clone().unwrap_or_else(|| {
            descriptor
                .size
                .iter()
                .flat_map(|&s| [0.0, (s.max(1) - 1) as f32])
                .collect()
        });
        let decode = descriptor.decode.clone().unwrap_or_else(|| range.clone());

        let table = unpack_samples(
            &descriptor.samples,
            descriptor.bits_per_sample,
            total_entries as usize * output_components,
            &decode,
            output_components,
        );

        Ok(SampledFunction {
            domain: descriptor.domain.clone(),
            range,
            size: descriptor.size.clone(),
            strides,
            output_components,
            encode,
            decode,
            table,
            out: OutputBuffer::default(),
        })
    }

    fn sample_at(&self, indices: &[usize]) -> &[f32] {
        let mut offset = 0usize;
        for (dim, &idx) in indices.iter().enumerate() {
            offset += idx * self.strides[dim];
        }
        let start = offset * self.output_components;
        &self.table[start..start + self.output_components]
    }
}

impl Function for SampledFunction {
    fn domain(&self) -> &[f32] {
        &self.domain
    }

    fn range(&self) -> Option<&[f32]> {
        Some(&self.range)
    }

    fn evaluate(&self, inputs: &[f32]) -> Vec<f32> {
        let inputs = clamp_inputs(&self.domain, inputs);
        let dims = self.size.len();

        // Encode each input dimension into fractional grid coordinates.
        let mut floor_idx = vec![0usize; dims];
        let mut frac = vec![0f32; dims];
        for d in 0..dims {
            let (dom_lo, dom_hi) = (self.domain[2 * d], self.domain[2 * d + 1]);
            let (enc_lo, enc_hi) = (self.encode[2 * d], self.encode[2 * d + 1]);
            let t = if dom_hi > dom_lo {
                (inputs[d] - dom_lo) / (dom_hi - dom_lo)
            } else {
                0.0
            };
            let encoded = (enc_lo + t * (enc_hi - enc_lo)).clamp(0.0, (self.size[d].max(1) - 1) as f32);
            floor_idx[d] = encoded.floor() as usize;
            frac[d] = encoded - floor_idx[d] as f32;
            if floor_idx[d] >= self.size[d] as usize - 1 {
                floor_idx[d] = (self.size[d] as usize).saturating_sub(2);
                frac[d] = if self.size[d] > 1 {
                    encoded - floor_idx[d] as f32
                } else {
                    0.0
                }
                .clamp(0.0, 1.0);
            }
        }

        let corner_count = 1usize << dims;
        let mut accum = vec![0f32; self.output_components];
        for corner in 0..corner_count {
            let mut weight = 1f32;
            let mut indices = floor_idx.clone();
            for d in 0..dims {
                let bit = (corner >> d) & 1;
                if bit == 1 {
                    indices[d] = (indices[d] + 1).min(self.size[d] as usize - 1);
                    weight *= frac[d];
                } else {
                    weight *= 1.0 - frac[d];
                }
            }
            if weight == 0.0 {
                continue;
            }
            let sample = self.sample_at(&indices);
            for (a, s) in accum.iter_mut().zip(sample) {
                *a += weight * s;
            }
        }

        self.out.with(|buf| {
            buf.clear();
            buf.extend_from_slice(&accum);
            clamp_outputs(Some(&self.range), buf);
            buf.clone()
        })
    }
}

/// Unpacks a big-endian, most-significant-bit-first sample stream into a
/// dense float table, mapping each raw sample from `[0, 2^bps - 1]` into
/// `decode[2c..2c+2]` for output component `c`.
fn unpack_samples(
    bytes: &[u8],
    bits_per_sample: u8,
    total_samples: usize,
    decode: &[f32],
    output_components: usize,
) -> Vec<f32> {
    let mut reader = BitReader::new(bytes);
    let max_value = if bits_per_sample >= 32 {
        u32::MAX as f64
    } else {
        ((1u64 << bits_per_sample) - 1) as f64
    };
    let mut table = Vec::with_capacity(total_samples);
    for i in 0..total_samples {
        let comp = i % output_components;
        let raw = reader.read_bits(bits_per_sample).unwrap_or(0) as f64;
        let normalized = (raw / max_value.max(1.0)) as f32;
        let (lo, hi) = (decode[2 * comp], decode[2 * comp + 1]);
        table.push(lo + normalized * (hi - lo));
    }
    table
}

struct BitReader<'a> {
    bytes: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        BitReader { bytes, bit_pos: 0 }
    }

    fn read_bits(&mut self, count: u8) -> Option<u64> {
        let mut value = 0u64;
        for _ in 0..count {
            let byte_idx = self.bit_pos / 8;
            let bit_idx = 7 - (self.bit_pos % 8);
            let byte = *self.bytes.get(byte_idx)?;
            let bit = (byte >> bit_idx) & 1;
            value = (value << 1) | bit as u64;
            self.bit_pos += 1;
        }
        Some(value)
    }
}
