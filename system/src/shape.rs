use crate::traits::Painter;
use crate::Color;
use euclid::default::{Point2D, Rect, Size2D};
use serde::{Deserialize, Serialize};

/// One entry of the shape log.
///
/// Geometry is taken as given: negative sizes or coordinates outside the
/// canvas are stored and replayed unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Line {
        from: Point2D<i32>,
        to: Point2D<i32>,
        color: Color,
    },
    Rectangle {
        origin: Point2D<i32>,
        size: Size2D<i32>,
        color: Color,
    },
    Circle {
        center: Point2D<i32>,
        radius: i32,
        color: Color,
    },
    Oval {
        origin: Point2D<i32>,
        size: Size2D<i32>,
        color: Color,
    },
    FreeDraw {
        from: Point2D<i32>,
        to: Point2D<i32>,
        color: Color,
    },
    Eraser {
        center: Point2D<i32>,
        size: i32,
    },
    Text {
        origin: Point2D<i32>,
        text: String,
        color: Color,
    },
}

impl Shape {
    pub fn line(x1: i32, y1: i32, x2: i32, y2: i32, color: Color) -> Self {
        Shape::Line {
            from: Point2D::new(x1, y1),
            to: Point2D::new(x2, y2),
            color,
        }
    }

    pub fn rectangle(x: i32, y: i32, width: i32, height: i32, color: Color) -> Self {
        Shape::Rectangle {
            origin: Point2D::new(x, y),
            size: Size2D::new(width, height),
            color,
        }
    }

    pub fn circle(x: i32, y: i32, radius: i32, color: Color) -> Self {
        Shape::Circle {
            center: Point2D::new(x, y),
            radius,
            color,
        }
    }

    pub fn oval(x: i32, y: i32, width: i32, height: i32, color: Color) -> Self {
        Shape::Oval {
            origin: Point2D::new(x, y),
            size: Size2D::new(width, height),
            color,
        }
    }

    pub fn free_draw(x1: i32, y1: i32, x2: i32, y2: i32, color: Color) -> Self {
        Shape::FreeDraw {
            from: Point2D::new(x1, y1),
            to: Point2D::new(x2, y2),
            color,
        }
    }

    pub fn eraser(x: i32, y: i32, size: i32) -> Self {
        Shape::Eraser {
            center: Point2D::new(x, y),
            size,
        }
    }

    pub fn text(x: i32, y: i32, text: impl Into<String>, color: Color) -> Self {
        Shape::Text {
            origin: Point2D::new(x, y),
            text: text.into(),
            color,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Shape::Line { color, .. }
            | Shape::Rectangle { color, .. }
            | Shape::Circle { color, .. }
            | Shape::Oval { color, .. }
            | Shape::FreeDraw { color, .. }
            | Shape::Text { color, .. } => *color,
            Shape::Eraser { .. } => Color::WHITE,
        }
    }

    pub fn render<P: Painter + ?Sized>(&self, painter: &mut P) {
        painter.set_color(self.color());
        match self {
            Shape::Line { from, to, .. } | Shape::FreeDraw { from, to, .. } => {
                painter.draw_line(*from, *to)
            }
            Shape::Rectangle { origin, size, .. } => painter.draw_rect(Rect::new(*origin, *size)),
            // Bounds wrap on overflow.
            Shape::Circle { center, radius, .. } => {
                let origin = Point2D::new(
                    center.x.wrapping_sub(*radius),
                    center.y.wrapping_sub(*radius),
                );
                let diameter = radius.wrapping_mul(2);
                painter.draw_oval(Rect::new(origin, Size2D::new(diameter, diameter)))
            }
            Shape::Oval { origin, size, .. } => painter.draw_oval(Rect::new(*origin, *size)),
            Shape::Eraser { center, size } => {
                let half = size / 2;
                let origin = Point2D::new(center.x.wrapping_sub(half), center.y.wrapping_sub(half));
                painter.fill_rect(Rect::new(origin, Size2D::new(*size, *size)))
            }
            Shape::Text { origin, text, .. } => painter.draw_string(text, *origin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_fixes_eraser_color_to_white() {
        assert_eq!(Shape::eraser(10, 10, 8).color(), Color::WHITE);
        assert_eq!(
            Shape::line(0, 0, 1, 1, Color::new(1, 2, 3)).color(),
            Color::new(1, 2, 3)
        );
    }

    #[test]
    fn it_keeps_geometry_unvalidated() {
        let shape = Shape::rectangle(-5, -5, -10, 0, Color::BLACK);
        match shape {
            Shape::Rectangle { origin, size, .. } => {
                assert_eq!(origin, Point2D::new(-5, -5));
                assert_eq!(size, Size2D::new(-10, 0));
            }
            _ => panic!("unexpected shape"),
        }
    }
}
