//! Abstract composition whose per-color painted area follows the color's
//! share of the quantized image.
//!
//! Each color gets shapes until its area budget is used up. Each new shape is
//! sized to the budget still remaining. Shapes may overlap one another; they
//! are only kept inside the canvas when [`ArtCanvas::clamp`] is set, in which
//! case a shape that cannot hold the whole remainder takes what fits and the
//! loop continues.

use std::f64::consts::PI;

use rand::Rng;
use serde::Serialize;

use crate::analysis::FrequencyTable;
use crate::color::ColorKey;

/// Budgets below this many square units are considered spent.
const MIN_AREA: f64 = 1e-6;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Rect {
        color: ColorKey,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Circle {
        color: ColorKey,
        cx: f64,
        cy: f64,
        radius: f64,
    },
}

impl Shape {
    pub fn area(&self) -> f64 {
        match *self {
            Shape::Rect { width, height, .. } => width * height,
            Shape::Circle { radius, .. } => PI * radius * radius,
        }
    }

    pub fn color(&self) -> ColorKey {
        match *self {
            Shape::Rect { color, .. } | Shape::Circle { color, .. } => color,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArtCanvas {
    pub width: f64,
    pub height: f64,
    pub clamp: bool,
}

impl ArtCanvas {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Generates shapes for every color in ascending-proportion order.
pub fn generate_art<R: Rng + ?Sized>(
    table: &FrequencyTable,
    canvas: &ArtCanvas,
    rng: &mut R,
) -> Vec<Shape> {
    let mut shapes = Vec::new();
    for (color, proportion) in table.ascending() {
        let mut remaining = proportion * canvas.area();
        while remaining > MIN_AREA {
            let shape = if rng.random_bool(0.5) {
                rect(color, remaining, canvas, rng)
            } else {
                circle(color, remaining, canvas, rng)
            };
            remaining -= shape.area();
            shapes.push(shape);
        }
    }
    shapes
}

fn rect<R: Rng + ?Sized>(color: ColorKey, budget: f64, canvas: &ArtCanvas, rng: &mut R) -> Shape {
    let side = budget.sqrt();
    let mut width = rng.random_range(side * 0.5..=side * 2.0);
    let mut height = budget / width;
    if canvas.clamp {
        width = width.min(canvas.width);
        height = (budget / width).min(canvas.height);
    }
    let (x, y) = if canvas.clamp {
        (
            rng.random_range(0.0..=canvas.width - width),
            rng.random_range(0.0..=canvas.height - height),
        )
    } else {
        (
            rng.random_range(0.0..=canvas.width),
            rng.random_range(0.0..=canvas.height),
        )
    };
    Shape::Rect {
        color,
        x,
        y,
        width,
        height,
    }
}

fn circle<R: Rng + ?Sized>(color: ColorKey, budget: f64, canvas: &ArtCanvas, rng: &mut R) -> Shape {
    let mut radius = (budget / PI).sqrt();
    let (cx, cy) = if canvas.clamp {
        radius = radius.min(canvas.width.min(canvas.height) / 2.0);
        (
            rng.random_range(radius..=canvas.width - radius),
            rng.random_range(radius..=canvas.height - radius),
        )
    } else {
        (
            rng.random_range(0.0..=canvas.width),
            rng.random_range(0.0..=canvas.height),
        )
    };
    Shape::Circle {
        color,
        cx,
        cy,
        radius,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::color::Pixel;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn table() -> FrequencyTable {
        FrequencyTable::from_proportions([
            (ColorKey::from(Pixel::opaque(255, 0, 0)), 0.6),
            (ColorKey::from(Pixel::opaque(0, 255, 0)), 0.3),
            (ColorKey::from(Pixel::opaque(0, 0, 255)), 0.1),
        ])
    }

    fn areas(shapes: &[Shape]) -> HashMap<ColorKey, f64> {
        let mut areas = HashMap::new();
        for shape in shapes {
            *areas.entry(shape.color()).or_insert(0.0) += shape.area();
        }
        areas
    }

    #[test]
    fn clamped_shapes_cover_each_share_inside_the_canvas() {
        let canvas = ArtCanvas {
            width: 400.0,
            height: 100.0,
            clamp: true,
        };
        let shapes = generate_art(&table(), &canvas, &mut StdRng::seed_from_u64(9));
        for (color, proportion) in table().iter() {
            let target = proportion * canvas.area();
            let covered = areas(&shapes)[&color];
            assert!((covered - target).abs() <= target * 1e-6, "{color}: {covered} vs {target}");
        }
        for shape in &shapes {
            match *shape {
                Shape::Rect {
                    x,
                    y,
                    width,
                    height,
                    ..
                } => {
                    assert!(x >= 0.0 && y >= 0.0);
                    assert!(x + width <= canvas.width + 1e-9);
                    assert!(y + height <= canvas.height + 1e-9);
                }
                Shape::Circle { cx, cy, radius, .. } => {
                    assert!(cx - radius >= -1e-9 && cx + radius <= canvas.width + 1e-9);
                    assert!(cy - radius >= -1e-9 && cy + radius <= canvas.height + 1e-9);
                }
            }
        }
    }

    #[test]
    fn unclamped_uses_one_exact_shape_per_color() {
        let canvas = ArtCanvas {
            width: 200.0,
            height: 200.0,
            clamp: false,
        };
        let shapes = generate_art(&table(), &canvas, &mut StdRng::seed_from_u64(2));
        assert_eq!(shapes.len(), 3);
        for (color, proportion) in table().iter() {
            let covered = areas(&shapes)[&color];
            assert!((covered - proportion * canvas.area()).abs() < 1e-6);
        }
    }

    #[test]
    fn empty_table_draws_nothing() {
        let canvas = ArtCanvas {
            width: 10.0,
            height: 10.0,
            clamp: true,
        };
        assert!(generate_art(&FrequencyTable::default(), &canvas, &mut StdRng::seed_from_u64(0)).is_empty());
    }
}
