use crate::error::{Error, Result};
use std::f64::consts::PI;
use std::fmt;

/// Smallest drawable side length or diameter, in centimetres.
pub const MIN_SIDE_LENGTH: u32 = 15;
pub const MAX_SIDE_LENGTH: u32 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Square,
    Triangle,
    Circle,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 3] = [ShapeKind::Square, ShapeKind::Triangle, ShapeKind::Circle];

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Square => "Square",
            ShapeKind::Triangle => "Triangle",
            ShapeKind::Circle => "Circle",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// All lengths are whole centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeSpec {
    Square { side: u32 },
    Triangle { a: u32, b: u32, c: u32 },
    Circle { diameter: u32 },
}

pub fn validate_side_length(length: i64) -> Result<u32> {
    if (i64::from(MIN_SIDE_LENGTH)..=i64::from(MAX_SIDE_LENGTH)).contains(&length) {
        Ok(length as u32)
    } else {
        Err(Error::OutOfRangeDimension {
            value: length,
            min: MIN_SIDE_LENGTH,
            max: MAX_SIDE_LENGTH,
        })
    }
}

impl ShapeSpec {
    pub fn square(side: i64) -> Result<Self> {
        Ok(Self::Square {
            side: validate_side_length(side)?,
        })
    }

    pub fn triangle(a: i64, b: i64, c: i64) -> Result<Self> {
        let spec = Self::Triangle {
            a: validate_side_length(a)?,
            b: validate_side_length(b)?,
            c: validate_side_length(c)?,
        };
        spec.validate()?;
        Ok(spec)
    }

    pub fn circle(diameter: i64) -> Result<Self> {
        Ok(Self::Circle {
            diameter: validate_side_length(diameter)?,
        })
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            ShapeSpec::Square { .. } => ShapeKind::Square,
            ShapeSpec::Triangle { .. } => ShapeKind::Triangle,
            ShapeSpec::Circle { .. } => ShapeKind::Circle,
        }
    }

    pub fn area(&self) -> f64 {
        match *self {
            ShapeSpec::Square { side } => f64::from(side) * f64::from(side),
            ShapeSpec::Triangle { a, b, c } => {
                let (a, b, c) = (f64::from(a), f64::from(b), f64::from(c));
                let s = (a + b + c) / 2.0;
                (s * (s - a) * (s - b) * (s - c)).sqrt()
            }
            ShapeSpec::Circle { diameter } => {
                let radius = f64::from(diameter) / 2.0;
                PI * radius * radius
            }
        }
    }

    /// Range check on every dimension; triangles must also satisfy the strict
    /// triangle inequality.
    pub fn validate(&self) -> Result<()> {
        match *self {
            ShapeSpec::Square { side } => validate_side_length(i64::from(side)).map(|_| ()),
            ShapeSpec::Circle { diameter } => {
                validate_side_length(i64::from(diameter)).map(|_| ())
            }
            ShapeSpec::Triangle { a, b, c } => {
                for side in [a, b, c] {
                    validate_side_length(i64::from(side))?;
                }
                if a + b > c && a + c > b && b + c > a {
                    if let Some([angle_a, angle_b, angle_c]) = self.interior_angles() {
                        log::debug!(
                            "Triangle {a}, {b}, {c} angles: A = {angle_a:.2}°, B = {angle_b:.2}°, C = {angle_c:.2}°"
                        );
                    }
                    Ok(())
                } else {
                    Err(Error::DegenerateTriangle { a, b, c })
                }
            }
        }
    }

    /// Interior angles in degrees, opposite sides `a`, `b` and `c` respectively.
    pub fn interior_angles(&self) -> Option<[f64; 3]> {
        match *self {
            ShapeSpec::Triangle { a, b, c } => {
                let (a, b, c) = (f64::from(a), f64::from(b), f64::from(c));
                Some([
                    law_of_cosines(a, b, c),
                    law_of_cosines(b, a, c),
                    law_of_cosines(c, a, b),
                ])
            }
            _ => None,
        }
    }
}

/// Angle opposite `opposite`, enclosed by `y` and `z`.
fn law_of_cosines(opposite: f64, y: f64, z: f64) -> f64 {
    let cos = (y * y + z * z - opposite * opposite) / (2.0 * y * z);
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

impl fmt::Display for ShapeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeSpec::Square { side } => write!(f, "Square: {side} cm"),
            ShapeSpec::Triangle { a, b, c } => write!(f, "Triangle: {a}, {b}, {c} cm"),
            ShapeSpec::Circle { diameter } => write!(f, "Circle: {diameter} cm diameter"),
        }
    }
}
