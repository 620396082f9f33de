//! `timestamp,value` text files

use anyhow::{bail, Context};
use piecewise_core::Point;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

/// Header written by [`write_points`]
pub const HEADER: &str = "timestamp,value";

/// Read points from a CSV file
pub fn read_points(path: &Path) -> anyhow::Result<Vec<Point>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    parse_points(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Parse `timestamp,value` rows. A first line whose timestamp field is not
/// an integer is taken as a header; blank lines are skipped.
pub fn parse_points<R: BufRead>(reader: R) -> anyhow::Result<Vec<Point>> {
    let mut points = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((timestamp, value)) = line.split_once(',') else {
            bail!("line {}: expected `timestamp,value`, got {:?}", index + 1, line);
        };
        let timestamp = match timestamp.trim().parse::<i64>() {
            Ok(timestamp) => timestamp,
            Err(_) if index == 0 => continue,
            Err(e) => bail!("line {}: bad timestamp {:?}: {}", index + 1, timestamp, e),
        };
        let value = value
            .trim()
            .parse::<f64>()
            .with_context(|| format!("line {}: bad value {:?}", index + 1, value))?;

        points.push(Point::new(timestamp, value));
    }

    Ok(points)
}

/// Write points with a header line
pub fn write_points<W: Write>(mut writer: W, points: &[Point]) -> anyhow::Result<()> {
    writeln!(writer, "{}", HEADER)?;
    for point in points {
        writeln!(writer, "{}", point)?;
    }
    writer.flush()?;
    Ok(())
}
