//! The map panel: a braille canvas looking through the camera viewpoint.
//!
//! Draw order is hiking layer, animated route, then markers, so markers stay
//! readable on top of the lines.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine, Points},
        Block, BorderType, Borders, Clear, Widget,
    },
};

use crate::app::map_view::TerminalMap;
use crate::story::{
    animator::AnimatedLayer,
    route::{LineLayer, MapPoint},
    script::Poi,
};

use super::spinner::LoadingIndicator;
use super::theme::Theme;

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f64 = 2.0;

pub struct MapWidget<'a> {
    pub map: &'a TerminalMap,
    pub pois: &'a [Poi],
    pub hiking: &'a LineLayer,
    /// The animated route, once it has been derived.
    pub route: Option<&'a AnimatedLayer>,
    pub tick: u64,
}

/// Map-space bounds `([x0, x1], [y0, y1])` for a canvas of `area` cells.
pub fn canvas_bounds(center: MapPoint, extent: f64, area: Rect) -> ([f64; 2], [f64; 2]) {
    let half_h = extent.max(f64::EPSILON);
    let rows = f64::from(area.height.max(1));
    let cols = f64::from(area.width.max(1));
    let half_w = half_h * cols / (rows * CELL_ASPECT);
    (
        [center.x - half_w, center.x + half_w],
        [center.y - half_h, center.y + half_h],
    )
}

fn draw_path(ctx: &mut Context<'_>, points: &[MapPoint], color: ratatui::style::Color) {
    for pair in points.windows(2) {
        ctx.draw(&CanvasLine {
            x1: pair[0].x,
            y1: pair[0].y,
            x2: pair[1].x,
            y2: pair[1].y,
            color,
        });
    }
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let viewpoint = self.map.camera.current();
        let mut title = vec![Span::styled(" Map ", Theme::title_style())];
        if let Some(name) = self.map.bookmark_name() {
            title.push(Span::styled(format!("· {name} "), Theme::bookmark_label_style()));
        }
        let block = Block::default()
            .title(Line::from(title))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Theme::border_style());
        let inner = block.inner(area);
        let (x_bounds, y_bounds) = canvas_bounds(viewpoint.center, viewpoint.extent, inner);

        let map = self.map;
        let pois = self.pois;
        let hiking = self.hiking;
        let route = self.route;
        Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .x_bounds(x_bounds)
            .y_bounds(y_bounds)
            .paint(move |ctx| {
                if map.hiking_visible {
                    for feature in &hiking.features {
                        draw_path(ctx, feature.path.points(), Theme::hiking_color(feature.kind.as_deref()));
                    }
                }
                if let Some(layer) = route.filter(|_| map.route_visible) {
                    for id in layer.feature_ids() {
                        if let Some(path) = layer.visible_path(id) {
                            draw_path(ctx, &path, Theme::route_color());
                        }
                    }
                }
                ctx.layer();

                if let Some(layer) = route.filter(|_| map.route_visible) {
                    let heads: Vec<(f64, f64)> = layer
                        .feature_ids()
                        .filter_map(|id| layer.head(id))
                        .map(|p| (p.x, p.y))
                        .collect();
                    ctx.draw(&Points {
                        coords: &heads,
                        color: Theme::route_color(),
                    });
                }

                // Excluded markers first so included ones win shared cells.
                let (included, excluded): (Vec<&Poi>, Vec<&Poi>) =
                    pois.iter().partition(|p| map.filter.matches(&p.name));
                let dimmed: Vec<(f64, f64)> = excluded.iter().map(|p| (p.at.x, p.at.y)).collect();
                ctx.draw(&Points {
                    coords: &dimmed,
                    color: Theme::excluded_marker_color(map.excluded),
                });
                let lit: Vec<(f64, f64)> = included.iter().map(|p| (p.at.x, p.at.y)).collect();
                ctx.draw(&Points {
                    coords: &lit,
                    color: Theme::marker_color(),
                });
                for poi in included {
                    ctx.print(
                        poi.at.x,
                        poi.at.y,
                        Span::styled(format!(" {}", poi.name), Style::default().fg(Theme::marker_color())),
                    );
                }
            })
            .render(area, buf);

        LoadingIndicator {
            visible: route.is_none(),
            tick: self.tick,
        }
        .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_bounds_keep_cells_square() {
        let area = Rect::new(0, 0, 80, 20);
        let (x, y) = canvas_bounds(MapPoint::new(10.0, 5.0), 1.0, area);
        assert_eq!(y, [4.0, 6.0]);
        // 80 cols / (20 rows * 2) = 2x wider than tall.
        assert_eq!(x, [8.0, 12.0]);
    }

    #[test]
    fn test_canvas_bounds_survive_zero_extent() {
        let (x, y) = canvas_bounds(MapPoint::new(0.0, 0.0), 0.0, Rect::new(0, 0, 0, 0));
        assert!(x[0] < x[1]);
        assert!(y[0] < y[1]);
    }
}
