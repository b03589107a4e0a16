use crate::Color;
use euclid::default::{Point2D, Rect};

/// Drawing surface a renderer hands to `Shape::render`.
///
/// The shape log never touches pixels itself; whoever owns the on-screen
/// buffer implements this and replays the log over the base raster.
pub trait Painter {
    fn set_color(&mut self, color: Color);
    fn draw_line(&mut self, from: Point2D<i32>, to: Point2D<i32>);
    fn draw_rect(&mut self, rect: Rect<i32>);
    /// Outline of the ellipse inscribed in `bounds`.
    fn draw_oval(&mut self, bounds: Rect<i32>);
    fn fill_rect(&mut self, rect: Rect<i32>);
    /// `origin` is the baseline start of the text.
    fn draw_string(&mut self, text: &str, origin: Point2D<i32>);
}
