use crate::core::config::SvgCanvasOptions;
use crate::core::constants::{SVG_WHEEL_ZOOM_FACTOR, SVG_ZOOM_IN_FACTOR, SVG_ZOOM_OUT_FACTOR};
use crate::core::geo::Point;
use crate::input::events::EventHandled;

/// Active pointer tool; exactly one at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SvgTool {
    #[default]
    Select,
    Pan,
    ZoomIn,
    ZoomOut,
}

impl SvgTool {
    pub const ALL: [SvgTool; 4] = [SvgTool::Select, SvgTool::Pan, SvgTool::ZoomIn, SvgTool::ZoomOut];

    pub fn label(&self) -> &'static str {
        match self {
            SvgTool::Select => "Select",
            SvgTool::Pan => "Pan",
            SvgTool::ZoomIn => "Zoom in",
            SvgTool::ZoomOut => "Zoom out",
        }
    }
}

/// What the viewport is doing right now, for the status line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewerMode {
    #[default]
    Idle,
    Panning,
    Zooming,
}

/// Pan/zoom transform of the static campus canvas.
///
/// Content coordinates map to screen as `x' = a*x + e`, `y' = d*y + f`;
/// scaling is uniform so `a == d` and there is no skew.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgViewport {
    scale: f64,
    e: f64,
    f: f64,
    viewer_width: f64,
    viewer_height: f64,
    options: SvgCanvasOptions,
    tool: SvgTool,
    mode: ViewerMode,
}

impl SvgViewport {
    /// Initial scale, centered in the initial viewer size
    pub fn new(options: SvgCanvasOptions) -> Self {
        let mut viewport = Self {
            scale: options.initial_scale,
            e: 0.0,
            f: 0.0,
            viewer_width: options.initial_viewer_width,
            viewer_height: options.initial_viewer_height,
            options,
            tool: SvgTool::default(),
            mode: ViewerMode::default(),
        };
        viewport.center();
        viewport
    }

    pub fn options(&self) -> &SvgCanvasOptions {
        &self.options
    }

    /// `[a, b, c, d, e, f]`
    pub fn matrix(&self) -> [f64; 6] {
        [self.scale, 0.0, 0.0, self.scale, self.e, self.f]
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translation(&self) -> (f64, f64) {
        (self.e, self.f)
    }

    pub fn viewer_size(&self) -> (f64, f64) {
        (self.viewer_width, self.viewer_height)
    }

    pub fn content_size(&self) -> (f64, f64) {
        (self.options.content_width, self.options.content_height)
    }

    pub fn tool(&self) -> SvgTool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: SvgTool) {
        self.tool = tool;
    }

    pub fn mode(&self) -> ViewerMode {
        self.mode
    }

    /// Translation that centers the content at `scale`
    pub fn centered_translation(&self, scale: f64) -> (f64, f64) {
        (
            -(self.options.content_width * scale) / 2.0 + self.viewer_width / 2.0,
            -(self.options.content_height * scale) / 2.0 + self.viewer_height / 2.0,
        )
    }

    /// Re-centers at the current scale
    pub fn center(&mut self) {
        (self.e, self.f) = self.centered_translation(self.scale);
    }

    /// Applies a new container size, floored at the minimum viewer size,
    /// and re-centers at the current scale
    pub fn resize(&mut self, container_width: f64, container_height: f64) {
        self.viewer_width = container_width.max(self.options.min_viewer_width);
        self.viewer_height = container_height.max(self.options.min_viewer_height);
        self.center();
    }

    fn clamp_scale(&self, scale: f64) -> f64 {
        scale.min(self.options.max_scale).max(self.options.min_scale)
    }

    /// Scales by `factor` keeping the content under `focus` (screen) fixed
    pub fn zoom_at(&mut self, factor: f64, focus: Point) {
        let scale = self.clamp_scale(self.scale * factor);
        let ratio = scale / self.scale;
        self.e = focus.x - (focus.x - self.e) * ratio;
        self.f = focus.y - (focus.y - self.f) * ratio;
        self.scale = scale;
    }

    pub fn zoom_on_viewer_center(&mut self, factor: f64) {
        let center = Point::new(self.viewer_width / 2.0, self.viewer_height / 2.0);
        self.zoom_at(factor, center);
    }

    pub fn zoom_in(&mut self) {
        self.zoom_on_viewer_center(SVG_ZOOM_IN_FACTOR);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_on_viewer_center(SVG_ZOOM_OUT_FACTOR);
    }

    pub fn pan(&mut self, delta: Point) {
        self.e += delta.x;
        self.f += delta.y;
    }

    /// Largest uniform scale showing the whole canvas, centered
    pub fn fit_to_viewer(&mut self) {
        let fit = (self.viewer_width / self.options.content_width)
            .min(self.viewer_height / self.options.content_height);
        self.scale = self.clamp_scale(fit);
        self.center();
        self.mode = ViewerMode::Idle;
    }

    /// Back to the initial scale, centered in the current viewer
    pub fn reset(&mut self) {
        self.scale = self.options.initial_scale;
        self.center();
        self.mode = ViewerMode::Idle;
    }

    pub fn screen_to_content(&self, screen: Point) -> Point {
        Point::new((screen.x - self.e) / self.scale, (screen.y - self.f) / self.scale)
    }

    pub fn content_to_screen(&self, content: Point) -> Point {
        Point::new(content.x * self.scale + self.e, content.y * self.scale + self.f)
    }

    /// On-screen rectangle of the whole canvas
    pub fn content_screen_bounds(&self) -> (Point, Point) {
        let (width, height) = self.content_size();
        (
            Point::new(self.e, self.f),
            Point::new(self.e + width * self.scale, self.f + height * self.scale),
        )
    }

    /// Canvas position of a click, from the canvas's on-screen bounds
    pub fn place_click(&self, click: Point) -> Point {
        let (min, max) = self.content_screen_bounds();
        click_to_content(click, min, max, self.content_size())
    }

    /// Pointer drag; moves the canvas only with the pan tool
    pub fn drag(&mut self, delta: Point) -> EventHandled {
        if self.tool != SvgTool::Pan {
            return EventHandled::NotHandled;
        }
        self.mode = ViewerMode::Panning;
        self.pan(delta);
        EventHandled::Handled
    }

    /// Click with a zoom tool zooms at the click; other tools leave it to the caller
    pub fn click(&mut self, position: Point) -> EventHandled {
        match self.tool {
            SvgTool::ZoomIn => self.zoom_at(SVG_ZOOM_IN_FACTOR, position),
            SvgTool::ZoomOut => self.zoom_at(SVG_ZOOM_OUT_FACTOR, position),
            SvgTool::Select | SvgTool::Pan => return EventHandled::NotHandled,
        }
        EventHandled::Handled
    }

    /// Wheel zoom at the cursor; `steps > 0` zooms in
    pub fn scroll(&mut self, steps: f64, position: Point) {
        if steps == 0.0 {
            return;
        }
        self.mode = ViewerMode::Zooming;
        self.zoom_at(SVG_WHEEL_ZOOM_FACTOR.powf(steps), position);
    }

    /// Ends a pan or wheel gesture
    pub fn settle(&mut self) {
        self.mode = ViewerMode::Idle;
    }
}

impl Default for SvgViewport {
    fn default() -> Self {
        Self::new(SvgCanvasOptions::default())
    }
}

/// `content = (click - min) / (max - min) * content_size`, per axis
pub fn click_to_content(click: Point, min: Point, max: Point, content_size: (f64, f64)) -> Point {
    let width = max.x - min.x;
    let height = max.y - min.y;
    if width <= 0.0 || height <= 0.0 {
        return Point::new(0.0, 0.0);
    }
    Point::new(
        (click.x - min.x) / width * content_size.0,
        (click.y - min.y) / height * content_size.1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_initial_centering() {
        let viewport = SvgViewport::default();
        assert_eq!(viewport.matrix(), [0.5, 0.0, 0.0, 0.5, -359.75, -244.75]);
    }

    #[test]
    fn test_resize_floors_and_recenters() {
        let mut viewport = SvgViewport::default();
        viewport.resize(200.0, 100.0);
        assert_eq!(viewport.viewer_size(), (400.0, 300.0));

        viewport.resize(1200.0, 900.0);
        let (e, f) = viewport.translation();
        assert!(close(e, -(3039.0 * 0.5) / 2.0 + 600.0));
        assert!(close(f, -(2179.0 * 0.5) / 2.0 + 450.0));
    }

    #[test]
    fn test_zoom_keeps_focus_fixed() {
        let mut viewport = SvgViewport::default();
        let focus = Point::new(250.0, 410.0);
        let before = viewport.screen_to_content(focus);

        viewport.zoom_at(1.1, focus);
        let after = viewport.screen_to_content(focus);
        assert!(close(viewport.scale(), 0.55));
        assert!(close(before.x, after.x) && close(before.y, after.y));
    }

    #[test]
    fn test_viewer_center_zoom_buttons() {
        let mut viewport = SvgViewport::default();
        let center_content = viewport.screen_to_content(Point::new(400.0, 300.0));
        viewport.zoom_in();
        viewport.zoom_out();
        assert!(close(viewport.scale(), 0.5 * 1.1 * 0.9));
        let still = viewport.screen_to_content(Point::new(400.0, 300.0));
        assert!(close(center_content.x, still.x));
    }

    #[test]
    fn test_fit_and_reset() {
        let mut viewport = SvgViewport::default();
        viewport.fit_to_viewer();
        let fit = (800.0 / 3039.0_f64).min(600.0 / 2179.0);
        assert!(close(viewport.scale(), fit));
        let (min, max) = viewport.content_screen_bounds();
        assert!(close(min.x + max.x, 800.0));

        viewport.zoom_in();
        viewport.pan(Point::new(40.0, -10.0));
        viewport.reset();
        assert_eq!(viewport.matrix(), SvgViewport::default().matrix());
    }

    #[test]
    fn test_click_placement_matches_transform() {
        let mut viewport = SvgViewport::default();
        viewport.zoom_at(1.7, Point::new(100.0, 50.0));
        viewport.pan(Point::new(-33.0, 12.0));

        let click = Point::new(321.0, 123.0);
        let placed = viewport.place_click(click);
        let inverse = viewport.screen_to_content(click);
        assert!(close(placed.x, inverse.x) && close(placed.y, inverse.y));

        let origin = click_to_content(Point::new(10.0, 20.0), Point::new(10.0, 20.0), Point::new(110.0, 120.0), (3039.0, 2179.0));
        assert_eq!(origin, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_tools_and_modes() {
        let mut viewport = SvgViewport::default();
        assert_eq!(viewport.tool(), SvgTool::Select);
        assert_eq!(viewport.drag(Point::new(5.0, 5.0)), EventHandled::NotHandled);
        assert_eq!(viewport.click(Point::new(5.0, 5.0)), EventHandled::NotHandled);

        viewport.set_tool(SvgTool::Pan);
        assert!(viewport.drag(Point::new(5.0, 5.0)).is_handled());
        assert_eq!(viewport.mode(), ViewerMode::Panning);
        viewport.settle();
        assert_eq!(viewport.mode(), ViewerMode::Idle);

        viewport.set_tool(SvgTool::ZoomOut);
        assert!(viewport.click(Point::new(5.0, 5.0)).is_handled());
        assert!(close(viewport.scale(), 0.45));

        viewport.scroll(1.0, Point::new(400.0, 300.0));
        assert_eq!(viewport.mode(), ViewerMode::Zooming);
    }
}
