use crate::error::Result;
use crate::shape::{ShapeKind, ShapeSpec};
use log::info;
use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub shape: ShapeSpec,
    pub area: f64,
    /// Straight-line travel time; turns are not included.
    pub drawing_time: Duration,
}

impl RunRecord {
    pub fn new(shape: ShapeSpec, drawing_time: Duration) -> Self {
        Self {
            area: shape.area(),
            shape,
            drawing_time,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }
}

impl fmt::Display for RunRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (Time: {:.2} seconds)",
            self.shape,
            self.drawing_time.as_secs_f64()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LargestShape {
    pub kind: ShapeKind,
    pub area: f64,
}

#[derive(Debug, Default, Clone)]
pub struct Statistics {
    records: Vec<RunRecord>,
    counts: [usize; 3],
    total_time: Duration,
    largest: Option<LargestShape>,
}

fn slot(kind: ShapeKind) -> usize {
    match kind {
        ShapeKind::Square => 0,
        ShapeKind::Triangle => 1,
        ShapeKind::Circle => 2,
    }
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, record: RunRecord) {
        self.counts[slot(record.kind())] += 1;
        self.total_time += record.drawing_time;

        // Ties keep the earlier shape.
        if self.largest.is_none_or(|largest| record.area > largest.area) {
            self.largest = Some(LargestShape {
                kind: record.kind(),
                area: record.area,
            });
        }

        self.records.push(record);
    }

    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn count_of(&self, kind: ShapeKind) -> usize {
        self.counts[slot(kind)]
    }

    pub fn total_time(&self) -> Duration {
        self.total_time
    }

    pub fn largest(&self) -> Option<LargestShape> {
        self.largest
    }

    /// Most drawn shape kind and its count. Ties go to Square, then Triangle.
    pub fn most_frequent(&self) -> Option<(ShapeKind, usize)> {
        if self.records.is_empty() {
            return None;
        }
        let [square, triangle, circle] = self.counts;
        let kind = if square >= triangle && square >= circle {
            ShapeKind::Square
        } else if triangle >= circle {
            ShapeKind::Triangle
        } else {
            ShapeKind::Circle
        };
        Some((kind, self.count_of(kind)))
    }

    /// Mean drawing time; `None` until something has been drawn.
    pub fn average_time(&self) -> Option<Duration> {
        match u32::try_from(self.records.len()) {
            Ok(0) | Err(_) => None,
            Ok(n) => Some(self.total_time / n),
        }
    }

    pub fn summarize(&self) -> SummaryReport {
        SummaryReport {
            records: self.records.clone(),
            largest: self.largest,
            most_frequent: self.most_frequent(),
            average_time: self.average_time(),
        }
    }

    /// Writes the summary to `path`, replacing any previous file.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.summarize().to_string())?;
        info!("Log file saved to: {}", path.display());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub records: Vec<RunRecord>,
    pub largest: Option<LargestShape>,
    pub most_frequent: Option<(ShapeKind, usize)>,
    pub average_time: Option<Duration>,
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Drawing Log Summary")?;
        writeln!(f, "===================")?;

        if self.records.is_empty() {
            return writeln!(f, "No shapes drawn yet.");
        }

        for record in &self.records {
            writeln!(f, "{record}")?;
        }
        writeln!(f)?;
        if let Some(largest) = self.largest {
            writeln!(
                f,
                "- Largest Shape: {} (Area: {:.2} cm^2)",
                largest.kind, largest.area
            )?;
        }
        if let Some((kind, count)) = self.most_frequent {
            writeln!(f, "- Most Frequently Drawn Shape: {kind} ({count} times)")?;
        }
        if let Some(average) = self.average_time {
            writeln!(
                f,
                "- Average Drawing Time: {:.2} seconds",
                average.as_secs_f64()
            )?;
        }
        Ok(())
    }
}
