use crate::Message;
use echocore::config::{RadarConfig, Rgb};
use echocore::display::{FadingTrace, SceneSnapshot};
use iced::widget::canvas::{self, Frame, Geometry, Path, Stroke};
use iced::{mouse, Color, Point, Rectangle, Renderer, Size, Theme};

/// Canvas program that rebuilds the whole radar scene every frame:
/// background, crosshair, range rings, fading measurement traces, and
/// the sweep wedges for the most recent arrivals.
#[derive(Debug, Clone)]
pub struct RadarScene {
    snapshot: SceneSnapshot,
    config: RadarConfig,
}

impl RadarScene {
    pub fn new(snapshot: SceneSnapshot, config: RadarConfig) -> Self {
        Self { snapshot, config }
    }
}

impl canvas::Program<Message> for RadarScene {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(
            Point::ORIGIN,
            bounds.size(),
            color(self.config.background_color),
        );

        let center = Point::new(bounds.width / 2.0, bounds.height / 2.0);
        draw_crosshair(&mut frame, bounds.size(), &self.config);
        draw_range_rings(&mut frame, center, bounds.size(), &self.config);

        for trace in &self.snapshot.traces {
            draw_trace(&mut frame, center, trace, &self.config);
        }
        for angle in &self.snapshot.sweep_angles {
            draw_sweep_wedge(
                &mut frame,
                center,
                bounds.size(),
                *angle as f32,
                self.config.sensor_beam_width,
            );
        }

        vec![frame.into_geometry()]
    }
}

fn color(rgb: Rgb) -> Color {
    Color::from_rgb8(rgb.r, rgb.g, rgb.b)
}

fn color_with_alpha(rgb: Rgb, alpha: u8) -> Color {
    Color::from_rgba8(rgb.r, rgb.g, rgb.b, alpha as f32 / 255.0)
}

/// Endpoint of a radial segment. Screen y grows downward, so angles
/// increase clockwise; kept that way for parity with the source data.
fn polar_endpoint(center: Point, distance: f32, angle_deg: f32) -> Point {
    let rad = angle_deg.to_radians();
    Point::new(
        center.x + distance * rad.cos(),
        center.y + distance * rad.sin(),
    )
}

/// Horizontal, vertical, and both diagonal reference lines.
fn draw_crosshair(frame: &mut Frame, size: Size, config: &RadarConfig) {
    let path = Path::new(|builder| {
        builder.move_to(Point::new(0.0, size.height / 2.0));
        builder.line_to(Point::new(size.width, size.height / 2.0));
        builder.move_to(Point::new(size.width / 2.0, 0.0));
        builder.line_to(Point::new(size.width / 2.0, size.height));
        builder.move_to(Point::ORIGIN);
        builder.line_to(Point::new(size.width, size.height));
        builder.move_to(Point::new(size.width, 0.0));
        builder.line_to(Point::new(0.0, size.height));
    });
    frame.stroke(
        &path,
        Stroke::default()
            .with_width(config.line_width)
            .with_color(color(config.crosshair_color)),
    );
}

/// Concentric distance rings, evenly spaced from center to edge, with
/// optional radius labels on both sides (negated on the mirror side).
fn draw_range_rings(frame: &mut Frame, center: Point, size: Size, config: &RadarConfig) {
    if config.circle_count == 0 {
        return;
    }

    let stroke = Stroke::default()
        .with_width(config.line_width)
        .with_color(color(config.circle_color));
    let max_radius = size.width.min(size.height) / 2.0;

    for ring in 1..=config.circle_count {
        let radius = max_radius * ring as f32 / config.circle_count as f32;
        let path = Path::new(|builder| builder.circle(center, radius));
        frame.stroke(&path, stroke);

        if config.show_range_labels {
            let value = radius.round() as i32;
            for (label, x) in [
                (value.to_string(), center.x + radius),
                ((-value).to_string(), center.x - radius),
            ] {
                frame.fill_text(canvas::Text {
                    content: label,
                    position: Point::new(x, center.y),
                    color: color(config.label_color),
                    size: 12.0.into(),
                    ..canvas::Text::default()
                });
            }
        }
    }
}

/// A radial line from the center to the measured point, plus a filled
/// dot at the endpoint, both at the age-derived alpha.
fn draw_trace(frame: &mut Frame, center: Point, trace: &FadingTrace, config: &RadarConfig) {
    let faded = color_with_alpha(config.trace_color, trace.alpha);
    let end = polar_endpoint(center, trace.distance as f32, trace.angle as f32);

    let line = Path::line(center, end);
    frame.stroke(
        &line,
        Stroke::default()
            .with_width(config.line_width)
            .with_color(faded),
    );

    let dot = Path::circle(end, config.dot_width / 2.0);
    frame.fill(&dot, faded);
}

/// Filled triangle spanning `angle_deg` plus/minus half the beam width,
/// reaching past the canvas edge, shaded transparent at the center and
/// saturated toward the far edge to suggest the active scan direction.
fn draw_sweep_wedge(
    frame: &mut Frame,
    center: Point,
    size: Size,
    angle_deg: f32,
    beam_width_deg: f32,
) {
    let length = size.width.max(size.height);
    let half_beam = beam_width_deg / 2.0;
    let near = polar_endpoint(center, length, angle_deg - half_beam);
    let far = polar_endpoint(center, length, angle_deg + half_beam);

    let wedge = Path::new(|builder| {
        builder.move_to(center);
        builder.line_to(near);
        builder.line_to(far);
        builder.close();
    });

    // Shade along the sweep direction: transparent at the center,
    // saturated toward the far edge.
    let shading =
        canvas::gradient::Linear::new(center, polar_endpoint(center, length, angle_deg))
            .add_stop(0.0, Color::TRANSPARENT)
            .add_stop(0.8, Color::from_rgb8(0xc8, 0x28, 0x28))
            .add_stop(1.0, Color::from_rgb8(0x78, 0x10, 0x10));
    frame.fill(&wedge, canvas::Gradient::Linear(shading));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn angle_zero_points_along_positive_x() {
        let center = Point::new(400.0, 400.0);
        assert_close(
            polar_endpoint(center, 100.0, 0.0),
            Point::new(500.0, 400.0),
        );
    }

    #[test]
    fn angle_180_points_along_negative_x() {
        let center = Point::new(400.0, 400.0);
        assert_close(polar_endpoint(center, 50.0, 180.0), Point::new(350.0, 400.0));
    }

    #[test]
    fn angle_90_points_down_the_screen() {
        let center = Point::new(400.0, 400.0);
        assert_close(polar_endpoint(center, 80.0, 90.0), Point::new(400.0, 480.0));
    }
}
