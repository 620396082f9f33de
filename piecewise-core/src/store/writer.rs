//! Segment store writer

use super::EncodedSeries;
use crate::codec::{CodecConfig, TimestampEncoding, Variant};
use crate::encoding::ByteWriter;
use crate::segment::grid_step;
use crate::types::OrderedSlope;
use crate::{PiecewiseError, Result, Segment, Timestamp};
use bytes::Bytes;
use std::collections::BTreeMap;

fn count(len: usize, what: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        PiecewiseError::InvalidInput(format!("{} {} exceed the 32-bit count range", len, what))
    })
}

fn wire_timestamp(timestamp: Timestamp) -> Result<u32> {
    u32::try_from(timestamp).map_err(|_| {
        PiecewiseError::InvalidInput(format!(
            "timestamp {} is outside the 32-bit unsigned range",
            timestamp
        ))
    })
}

fn wire_key(key: i64) -> Result<i32> {
    i32::try_from(key).map_err(|_| {
        PiecewiseError::InvalidInput(format!("intercept index {} does not fit in 32 bits", key))
    })
}

fn wire_delta(delta: i64) -> Result<u32> {
    u32::try_from(delta).map_err(|_| {
        PiecewiseError::InvalidInput(format!("delta {} does not fit in 32 bits", delta))
    })
}

/// Serializes an [`EncodedSeries`] into the store layout
pub struct StoreWriter {
    config: CodecConfig,
    writer: ByteWriter,
    grid: f64,
    bias: i64,
}

impl StoreWriter {
    /// Create a new writer for the layout selected by `config`
    pub fn new(config: CodecConfig) -> Self {
        Self {
            config,
            writer: ByteWriter::with_capacity(1024),
            grid: 1.0,
            bias: 0,
        }
    }

    /// Write `series` and return the uncompressed buffer
    pub fn write(mut self, series: &EncodedSeries) -> Result<Bytes> {
        let tiered = self.config.variant == Variant::MultiTier;
        if !tiered && !(series.tiers.per_a.is_empty() && series.tiers.rest.is_empty()) {
            return Err(PiecewiseError::InvalidInput(
                "single-tier layout only stores perB segments".into(),
            ));
        }

        let step = grid_step(series.epsilon);
        self.grid = f64::from(step);
        self.bias = if tiered { series.global_min_b } else { 0 };

        self.writer.write_f32(step);
        if tiered {
            self.writer.write_varint_signed(wire_key(series.global_min_b)?);
        }

        self.write_per_b(&series.tiers.per_b)?;
        if tiered {
            self.write_per_a(&series.tiers.per_a)?;
            self.write_rest(&series.tiers.rest)?;
        }

        let last = wire_timestamp(series.last_timestamp)?;
        match self.config.timestamps {
            TimestampEncoding::Delta => self.writer.write_varint(last),
            TimestampEncoding::Raw => self.writer.write_u32(last),
        }

        Ok(self.writer.finish())
    }

    fn biased(&self, segment: &Segment) -> i64 {
        segment.grid_index(self.grid) - self.bias
    }

    /// Intercept -> slope -> timestamps
    fn write_per_b(&mut self, segments: &[Segment]) -> Result<()> {
        let mut groups: BTreeMap<i64, BTreeMap<OrderedSlope, Vec<Timestamp>>> = BTreeMap::new();
        for segment in segments {
            groups
                .entry(self.biased(segment))
                .or_default()
                .entry(OrderedSlope(segment.a()))
                .or_default()
                .push(segment.init_timestamp);
        }

        self.writer.write_varint(count(groups.len(), "intercept groups")?);
        let Some(&first) = groups.keys().next() else {
            return Ok(());
        };
        self.writer.write_varint_signed(wire_key(first)?);

        let mut previous = first;
        for (key, slopes) in groups.iter_mut() {
            self.writer.write_varint(wire_delta(key - previous)?);
            previous = *key;

            self.writer.write_varint(count(slopes.len(), "slope groups")?);
            for (slope, timestamps) in slopes.iter_mut() {
                self.writer.write_f32(slope.0 as f32);
                timestamps.sort_unstable();
                self.writer.write_varint(count(timestamps.len(), "timestamps")?);

                let mut previous_ts = 0;
                for &timestamp in timestamps.iter() {
                    let raw = wire_timestamp(timestamp)?;
                    match self.config.timestamps {
                        TimestampEncoding::Delta => {
                            self.writer.write_varint(wire_delta(timestamp - previous_ts)?)
                        }
                        TimestampEncoding::Raw => self.writer.write_u32(raw),
                    }
                    previous_ts = timestamp;
                }
            }
        }

        Ok(())
    }

    /// Slope -> (intercept, timestamp) pairs
    fn write_per_a(&mut self, segments: &[Segment]) -> Result<()> {
        let mut groups: BTreeMap<OrderedSlope, Vec<(i64, Timestamp)>> = BTreeMap::new();
        for segment in segments {
            groups
                .entry(OrderedSlope(segment.a()))
                .or_default()
                .push((self.biased(segment), segment.init_timestamp));
        }

        self.writer.write_varint(count(groups.len(), "slope groups")?);
        for (slope, members) in groups.iter_mut() {
            self.writer.write_f32(slope.0 as f32);
            self.writer.write_varint(count(members.len(), "group members")?);
            members.sort_unstable();

            let mut previous = members[0].0;
            self.writer.write_varint_signed(wire_key(previous)?);
            for &(key, timestamp) in members.iter() {
                self.writer.write_varint(wire_delta(key - previous)?);
                previous = key;
                self.writer.write_u32(wire_timestamp(timestamp)?);
            }
        }

        Ok(())
    }

    /// Individually stored segments, by ascending intercept
    fn write_rest(&mut self, segments: &[Segment]) -> Result<()> {
        self.writer.write_varint(count(segments.len(), "segments")?);
        if segments.is_empty() {
            return Ok(());
        }

        let mut rows: Vec<(i64, Timestamp, f64)> = segments
            .iter()
            .map(|s| (self.biased(s), s.init_timestamp, s.a()))
            .collect();
        rows.sort_unstable_by(|l, r| l.0.cmp(&r.0).then(l.1.cmp(&r.1)));

        let mut previous = rows[0].0;
        self.writer.write_varint_signed(wire_key(previous)?);
        for (key, timestamp, a) in rows {
            self.writer.write_varint(wire_delta(key - previous)?);
            previous = key;
            self.writer.write_f32(a as f32);
            self.writer.write_u32(wire_timestamp(timestamp)?);
        }

        Ok(())
    }
}
