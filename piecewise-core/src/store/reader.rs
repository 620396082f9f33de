//! Segment store reader

use super::{EncodedSeries, TieredSegments};
use crate::codec::{CodecConfig, TimestampEncoding, Variant};
use crate::encoding::ByteReader;
use crate::{PiecewiseError, Result, Segment, Timestamp};

fn overflow(what: &str) -> PiecewiseError {
    PiecewiseError::Decode(format!("{} overflows while decoding", what))
}

/// Parses the store layout back into an [`EncodedSeries`]
pub struct StoreReader<'a> {
    config: CodecConfig,
    reader: ByteReader<'a>,
    epsilon: f64,
    bias: i64,
}

impl<'a> StoreReader<'a> {
    /// Create a reader over an uncompressed store buffer
    pub fn new(config: CodecConfig, data: &'a [u8]) -> Self {
        Self {
            config,
            reader: ByteReader::new(data),
            epsilon: 1.0,
            bias: 0,
        }
    }

    /// Decode the whole buffer. Trailing bytes are rejected.
    pub fn read(mut self) -> Result<EncodedSeries> {
        let tiered = self.config.variant == Variant::MultiTier;

        let epsilon = self.reader.read_f32()?;
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(PiecewiseError::Decode(format!(
                "invalid epsilon {} in header",
                epsilon
            )));
        }
        self.epsilon = f64::from(epsilon);

        if tiered {
            self.bias = i64::from(self.reader.read_varint_signed()?);
        }

        let per_b = self.read_per_b()?;
        let (per_a, rest) = if tiered {
            (self.read_per_a()?, self.read_rest()?)
        } else {
            (Vec::new(), Vec::new())
        };

        let last_timestamp = i64::from(match self.config.timestamps {
            TimestampEncoding::Delta => self.reader.read_varint()?,
            TimestampEncoding::Raw => self.reader.read_u32()?,
        });

        if self.reader.has_more() {
            return Err(PiecewiseError::Decode(format!(
                "{} trailing bytes after last timestamp",
                self.reader.remaining()
            )));
        }

        Ok(EncodedSeries {
            epsilon: self.epsilon,
            global_min_b: self.bias,
            tiers: TieredSegments { per_b, per_a, rest },
            last_timestamp,
        })
    }

    /// Intercept value for a biased grid index
    fn intercept(&self, biased: i64) -> Result<f64> {
        let index = biased
            .checked_add(self.bias)
            .ok_or_else(|| overflow("intercept index"))?;
        Ok(index as f64 * self.epsilon)
    }

    fn next_biased(&mut self, previous: i64) -> Result<i64> {
        let delta = i64::from(self.reader.read_varint()?);
        previous
            .checked_add(delta)
            .ok_or_else(|| overflow("intercept delta"))
    }

    fn read_per_b(&mut self) -> Result<Vec<Segment>> {
        let mut segments = Vec::new();
        let intercepts = self.reader.read_count("intercept group", 2)?;
        if intercepts == 0 {
            return Ok(segments);
        }

        let timestamp_len = match self.config.timestamps {
            TimestampEncoding::Delta => 1,
            TimestampEncoding::Raw => 4,
        };

        let mut previous = i64::from(self.reader.read_varint_signed()?);
        for _ in 0..intercepts {
            let biased = self.next_biased(previous)?;
            previous = biased;
            let b = self.intercept(biased)?;

            let slopes = self.reader.read_count("slope group", 5)?;
            for _ in 0..slopes {
                let a = f64::from(self.reader.read_f32()?);
                let timestamps = self.reader.read_count("timestamp", timestamp_len)?;

                let mut timestamp: Timestamp = 0;
                for _ in 0..timestamps {
                    timestamp = match self.config.timestamps {
                        TimestampEncoding::Delta => timestamp
                            .checked_add(i64::from(self.reader.read_varint()?))
                            .ok_or_else(|| overflow("timestamp"))?,
                        TimestampEncoding::Raw => i64::from(self.reader.read_u32()?),
                    };
                    segments.push(Segment::fixed(timestamp, a, b));
                }
            }
        }

        Ok(segments)
    }

    fn read_per_a(&mut self) -> Result<Vec<Segment>> {
        let mut segments = Vec::new();
        let slopes = self.reader.read_count("slope group", 6)?;

        for _ in 0..slopes {
            let a = f64::from(self.reader.read_f32()?);
            let members = self.reader.read_count("slope group member", 5)?;

            let mut previous = i64::from(self.reader.read_varint_signed()?);
            for _ in 0..members {
                let biased = self.next_biased(previous)?;
                previous = biased;
                let timestamp = i64::from(self.reader.read_u32()?);
                segments.push(Segment::fixed(timestamp, a, self.intercept(biased)?));
            }
        }

        Ok(segments)
    }

    fn read_rest(&mut self) -> Result<Vec<Segment>> {
        let mut segments = Vec::new();
        let count = self.reader.read_count("unmerged segment", 9)?;
        if count == 0 {
            return Ok(segments);
        }

        let mut previous = i64::from(self.reader.read_varint_signed()?);
        for _ in 0..count {
            let biased = self.next_biased(previous)?;
            previous = biased;
            let a = f64::from(self.reader.read_f32()?);
            let timestamp = i64::from(self.reader.read_u32()?);
            segments.push(Segment::fixed(timestamp, a, self.intercept(biased)?));
        }

        Ok(segments)
    }
}
