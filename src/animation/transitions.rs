use crate::animation::easing::{lerp, EasingFunction};
use crate::core::geo::{LatLng, Point};
use crate::core::viewport::Viewport;

/// State of a transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionState {
    Running,
    Completed,
    Cancelled,
}

/// An animated fly-to between two map views.
///
/// The center travels in projected (world pixel) space so the motion looks
/// straight on screen; zoom follows a shallow arc that backs out mid-flight
/// when the target is far away.
#[derive(Debug, Clone)]
pub struct Flight {
    start_center: LatLng,
    start_zoom: f64,
    target_center: LatLng,
    target_zoom: f64,
    /// How many zoom levels the flight backs out at its midpoint
    arc: f64,
    duration: f64,
    elapsed: f64,
    easing: EasingFunction,
    state: TransitionState,
}

impl Flight {
    pub fn new(from: &Viewport, target_center: LatLng, target_zoom: f64, duration: f64) -> Self {
        let target_zoom = target_zoom.clamp(from.min_zoom, from.max_zoom);

        let start_px = from.project(&from.center, None);
        let target_px = from.project(&target_center, None);
        let span = start_px.distance_to(&target_px);
        let screen = from.size.x.max(from.size.y).max(1.0);
        let arc = (span / screen).log2().clamp(0.0, 3.0);

        Self {
            start_center: from.center,
            start_zoom: from.zoom,
            target_center,
            target_zoom,
            arc,
            duration: duration.max(0.0),
            elapsed: 0.0,
            easing: EasingFunction::EaseInOutQuad,
            state: TransitionState::Running,
        }
    }

    pub fn with_easing(mut self, easing: EasingFunction) -> Self {
        self.easing = easing;
        self
    }

    /// Advance the flight and write the interpolated view into `viewport`.
    /// Returns true while the flight is still running.
    pub fn update(&mut self, viewport: &mut Viewport, delta_time: f64) -> bool {
        if self.state != TransitionState::Running {
            return false;
        }

        self.elapsed += delta_time.max(0.0);
        let progress = self.progress();
        let t = self.easing.apply(progress);

        if progress >= 1.0 {
            viewport.set_zoom(self.target_zoom);
            viewport.set_center(self.target_center);
            self.state = TransitionState::Completed;
            return false;
        }

        let zoom = lerp(self.start_zoom, self.target_zoom, t) - self.arc * 4.0 * t * (1.0 - t);

        // Interpolate the center at a shared zoom so both ends use one pixel space
        let start_px = viewport.project(&self.start_center, Some(0.0));
        let target_px = viewport.project(&self.target_center, Some(0.0));
        let center_px = Point::new(
            lerp(start_px.x, target_px.x, t),
            lerp(start_px.y, target_px.y, t),
        );
        let center = viewport.unproject(&center_px, Some(0.0));

        viewport.set_zoom(zoom);
        viewport.set_center(center);
        true
    }

    pub fn cancel(&mut self) {
        if self.state == TransitionState::Running {
            self.state = TransitionState::Cancelled;
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(
            self.state,
            TransitionState::Completed | TransitionState::Cancelled
        )
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    /// Current progress (0.0 to 1.0)
    pub fn progress(&self) -> f64 {
        if self.duration == 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn target(&self) -> (LatLng, f64) {
        (self.target_center, self.target_zoom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(LatLng::new(48.6208, 22.3006), 12.0, Point::new(800.0, 600.0))
    }

    #[test]
    fn test_flight_reaches_target() {
        let mut view = viewport();
        let target = LatLng::new(48.6300, 22.2900);
        let mut flight = Flight::new(&view, target, 17.0, 1.0);

        let mut frames = 0;
        while flight.update(&mut view, 1.0 / 60.0) {
            frames += 1;
            assert!(frames < 200);
        }

        assert_eq!(flight.state(), TransitionState::Completed);
        assert_eq!(view.zoom, 17.0);
        assert!((view.center.lat - target.lat).abs() < 1e-9);
        assert!((view.center.lng - target.lng).abs() < 1e-9);
    }

    #[test]
    fn test_zero_duration_jumps() {
        let mut view = viewport();
        let mut flight = Flight::new(&view, LatLng::new(48.0, 22.0), 10.0, 0.0);
        assert!(!flight.update(&mut view, 0.0));
        assert_eq!(view.zoom, 10.0);
        assert!(flight.is_finished());
    }

    #[test]
    fn test_cancelled_flight_stops_moving() {
        let mut view = viewport();
        let mut flight = Flight::new(&view, LatLng::new(48.0, 22.0), 14.0, 1.0);
        flight.update(&mut view, 0.25);
        flight.cancel();

        let frozen = view.clone();
        assert!(!flight.update(&mut view, 0.25));
        assert_eq!(view, frozen);
    }

    #[test]
    fn test_nearby_flight_has_no_arc() {
        let mut view = viewport();
        let mut flight = Flight::new(&view, view.center, 14.0, 1.0);
        flight.update(&mut view, 0.5);
        assert!(view.zoom >= 12.0 && view.zoom <= 14.0);
    }
}
