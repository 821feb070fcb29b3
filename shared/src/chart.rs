//! Stat chart as a flat list of 2-D canvas draw commands.
//!
//! The client replays the list on a `CanvasRenderingContext2d`; keeping the
//! geometry here lets it be unit-tested without a browser.

use std::f64::consts::{FRAC_PI_2, TAU};

use crate::colors::{hex_css, rgba_css};
use crate::rank::Classification;
use crate::stats::{STAT_MAX, StatField, StatInputSet, StatMode};

const BACKGROUND: &str = "#0a0a0f";
const GRID_COLOR: &str = "rgba(255,255,255,0.1)";
const LABEL_FONT: &str = "bold 12px monospace";
const AVERAGE_FONT: &str = "bold 22px monospace";
const RANK_FONT: &str = "bold 15px monospace";
const GRID_LEVELS: [f64; 4] = [0.25, 0.5, 0.75, 1.0];
const DOT_RADIUS: f64 = 3.0;

/// Wedge fills for the polar chart, cycled by field index.
pub const POLAR_PALETTE: [&str; 4] = [
    "rgba(255,102,0,0.7)",
    "rgba(0,240,255,0.7)",
    "rgba(255,255,255,0.7)",
    "rgba(255,102,0,0.4)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

impl TextAlign {
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: String,
    },
    BeginPath,
    MoveTo {
        x: f64,
        y: f64,
    },
    LineTo {
        x: f64,
        y: f64,
    },
    Arc {
        x: f64,
        y: f64,
        radius: f64,
        start: f64,
        end: f64,
    },
    ClosePath,
    Fill {
        color: String,
    },
    Stroke {
        color: String,
        width: f64,
    },
    FillText {
        text: String,
        x: f64,
        y: f64,
        color: String,
        font: &'static str,
        align: TextAlign,
    },
}

/// Logical canvas geometry in CSS pixels. The client scales by the device
/// pixel ratio before replaying.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub center_x: f64,
    pub center_y: f64,
    /// Radius of the outermost grid ring, `r_max`.
    pub radius: f64,
    /// Distance beyond `r_max` at which axis labels sit.
    pub label_offset: f64,
    /// Baseline of the average line; the rank label sits below it.
    pub footer_y: f64,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 440.0,
            center_x: 200.0,
            center_y: 190.0,
            radius: 140.0,
            label_offset: 18.0,
            footer_y: 392.0,
        }
    }
}

impl ChartLayout {
    /// Angle of axis `i` of `n`, starting straight up and going clockwise.
    pub fn axis_angle(i: usize, n: usize) -> f64 {
        i as f64 * TAU / n as f64 - FRAC_PI_2
    }

    pub fn point(&self, radius: f64, angle: f64) -> (f64, f64) {
        (
            self.center_x + radius * angle.cos(),
            self.center_y + radius * angle.sin(),
        )
    }

    /// Radius for a stat value, proportional to `r_max`.
    pub fn scaled(&self, value: f64) -> f64 {
        self.radius * (value.clamp(0.0, STAT_MAX) / STAT_MAX)
    }
}

/// Build the full chart for `input`: background, grid, shape, axis labels and
/// the average/rank footer in the mode accent.
pub fn chart_commands(
    input: &StatInputSet,
    classification: &Classification,
    layout: &ChartLayout,
) -> Vec<DrawCommand> {
    let mut out = vec![DrawCommand::FillRect {
        x: 0.0,
        y: 0.0,
        width: layout.width,
        height: layout.height,
        color: BACKGROUND.to_string(),
    }];

    let mode = input.mode();
    match mode {
        StatMode::Outfield => radar(&mut out, input.values(), layout),
        StatMode::Goalkeeper => polar(&mut out, input.values(), layout),
    }
    labels(&mut out, input.fields(), mode, layout);

    let accent = hex_css(mode.accent_rgb());
    out.push(DrawCommand::FillText {
        text: format!("AVG {}", classification.average_label()),
        x: layout.center_x,
        y: layout.footer_y,
        color: accent.clone(),
        font: AVERAGE_FONT,
        align: TextAlign::Center,
    });
    out.push(DrawCommand::FillText {
        text: classification.rank.clone(),
        x: layout.center_x,
        y: layout.footer_y + 26.0,
        color: accent,
        font: RANK_FONT,
        align: TextAlign::Center,
    });
    out
}

fn polygon(out: &mut Vec<DrawCommand>, points: &[(f64, f64)]) {
    out.push(DrawCommand::BeginPath);
    for (i, &(x, y)) in points.iter().enumerate() {
        out.push(if i == 0 {
            DrawCommand::MoveTo { x, y }
        } else {
            DrawCommand::LineTo { x, y }
        });
    }
    out.push(DrawCommand::ClosePath);
}

fn grid_stroke() -> DrawCommand {
    DrawCommand::Stroke {
        color: GRID_COLOR.to_string(),
        width: 1.0,
    }
}

fn radar(out: &mut Vec<DrawCommand>, values: &[f64], layout: &ChartLayout) {
    let n = values.len();

    for level in GRID_LEVELS {
        let ring: Vec<_> = (0..n)
            .map(|i| layout.point(layout.radius * level, ChartLayout::axis_angle(i, n)))
            .collect();
        polygon(out, &ring);
        out.push(grid_stroke());
    }

    out.push(DrawCommand::BeginPath);
    for i in 0..n {
        let (x, y) = layout.point(layout.radius, ChartLayout::axis_angle(i, n));
        out.push(DrawCommand::MoveTo {
            x: layout.center_x,
            y: layout.center_y,
        });
        out.push(DrawCommand::LineTo { x, y });
    }
    out.push(grid_stroke());

    let vertices: Vec<_> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| layout.point(layout.scaled(v), ChartLayout::axis_angle(i, n)))
        .collect();
    let accent = StatMode::Outfield.accent_rgb();
    polygon(out, &vertices);
    out.push(DrawCommand::Fill {
        color: rgba_css(accent, 0.2),
    });
    out.push(DrawCommand::Stroke {
        color: hex_css(accent),
        width: 2.0,
    });

    for (x, y) in vertices {
        out.push(DrawCommand::BeginPath);
        out.push(DrawCommand::Arc {
            x,
            y,
            radius: DOT_RADIUS,
            start: 0.0,
            end: TAU,
        });
        out.push(DrawCommand::Fill {
            color: "#ffffff".to_string(),
        });
    }
}

fn polar(out: &mut Vec<DrawCommand>, values: &[f64], layout: &ChartLayout) {
    let n = values.len();

    for level in GRID_LEVELS {
        out.push(DrawCommand::BeginPath);
        out.push(DrawCommand::Arc {
            x: layout.center_x,
            y: layout.center_y,
            radius: layout.radius * level,
            start: 0.0,
            end: TAU,
        });
        out.push(grid_stroke());
    }

    for (i, &value) in values.iter().enumerate() {
        let start = ChartLayout::axis_angle(i, n);
        let end = ChartLayout::axis_angle(i + 1, n);
        out.push(DrawCommand::BeginPath);
        out.push(DrawCommand::MoveTo {
            x: layout.center_x,
            y: layout.center_y,
        });
        out.push(DrawCommand::Arc {
            x: layout.center_x,
            y: layout.center_y,
            radius: layout.scaled(value),
            start,
            end,
        });
        out.push(DrawCommand::ClosePath);
        out.push(DrawCommand::Fill {
            color: POLAR_PALETTE[i % POLAR_PALETTE.len()].to_string(),
        });
        out.push(DrawCommand::Stroke {
            color: BACKGROUND.to_string(),
            width: 2.0,
        });
    }
}

fn labels(out: &mut Vec<DrawCommand>, fields: &[StatField], mode: StatMode, layout: &ChartLayout) {
    let n = fields.len();
    let color = match mode {
        StatMode::Outfield => hex_css(mode.accent_rgb()),
        StatMode::Goalkeeper => "#ffffff".to_string(),
    };
    for (i, field) in fields.iter().enumerate() {
        // Radar labels sit on the spoke; polar labels on the wedge bisector.
        let angle = match mode {
            StatMode::Outfield => ChartLayout::axis_angle(i, n),
            StatMode::Goalkeeper => ChartLayout::axis_angle(i, n) + TAU / (2.0 * n as f64),
        };
        let (x, y) = layout.point(layout.radius + layout.label_offset, angle);
        let cos = angle.cos();
        let align = if cos > 0.1 {
            TextAlign::Left
        } else if cos < -0.1 {
            TextAlign::Right
        } else {
            TextAlign::Center
        };
        out.push(DrawCommand::FillText {
            text: field.label.to_string(),
            x,
            y,
            color: color.clone(),
            font: LABEL_FONT,
            align,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartLayout, DrawCommand, POLAR_PALETTE, TextAlign, chart_commands};
    use crate::rank::classify;
    use crate::stats::StatInputSet;

    fn assert_close(actual: f64, expected: f64) {
        let diff = (actual - expected).abs();
        assert!(diff < 1e-9, "expected {expected}, got {actual} (diff: {diff})");
    }

    fn commands(input: StatInputSet) -> Vec<DrawCommand> {
        chart_commands(&input, &classify(&input), &ChartLayout::default())
    }

    fn texts(cmds: &[DrawCommand]) -> Vec<(&str, &str)> {
        cmds.iter()
            .filter_map(|c| match c {
                DrawCommand::FillText { text, color, .. } => Some((text.as_str(), color.as_str())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn first_axis_points_straight_up() {
        assert_close(ChartLayout::axis_angle(0, 5), -std::f64::consts::FRAC_PI_2);
        let layout = ChartLayout::default();
        let (x, y) = layout.point(layout.radius, ChartLayout::axis_angle(0, 5));
        assert_close(x, layout.center_x);
        assert_close(y, layout.center_y - layout.radius);
    }

    #[test]
    fn radar_vertices_scale_with_values() {
        let cmds = commands(StatInputSet::outfield([5.0, 10.0, 10.0, 10.0, 10.0]));
        let layout = ChartLayout::default();
        let dots: Vec<(f64, f64)> = cmds
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Arc { x, y, radius, .. } if *radius == 3.0 => Some((*x, *y)),
                _ => None,
            })
            .collect();
        assert_eq!(dots.len(), 5);
        assert_close(dots[0].0, layout.center_x);
        assert_close(dots[0].1, layout.center_y - layout.radius * 0.5);
    }

    #[test]
    fn radar_fill_and_stroke_use_cyan() {
        let cmds = commands(StatInputSet::outfield([8.0, 7.0, 6.0, 9.0, 5.0]));
        assert!(cmds.contains(&DrawCommand::Fill {
            color: "rgba(0,240,255,0.2)".into()
        }));
        assert!(cmds.contains(&DrawCommand::Stroke {
            color: "#00f0ff".into(),
            width: 2.0
        }));
    }

    #[test]
    fn radar_labels_and_footer() {
        let cmds = commands(StatInputSet::outfield([8.0, 7.0, 6.0, 9.0, 5.0]));
        let texts = texts(&cmds);
        let labels: Vec<_> = texts.iter().take(5).map(|(t, _)| *t).collect();
        assert_eq!(
            labels,
            vec!["SHOOTING", "DRIBBLING", "STEALING", "PASSING", "DEFENDING"]
        );
        assert!(texts.iter().take(5).all(|(_, color)| *color == "#00f0ff"));
        assert_eq!(texts[5], ("AVG 7.0", "#00f0ff"));
        assert_eq!(texts[6], ("ELITE ⚡ - ⭐⭐⭐", "#00f0ff"));
    }

    #[test]
    fn top_label_is_centered_above_the_ring() {
        let cmds = commands(StatInputSet::outfield([1.0; 5]));
        let layout = ChartLayout::default();
        let Some(DrawCommand::FillText { x, y, align, .. }) =
            cmds.iter().find(|c| matches!(c, DrawCommand::FillText { .. }))
        else {
            panic!("no label drawn");
        };
        assert_eq!(*align, TextAlign::Center);
        assert_close(*x, layout.center_x);
        assert_close(*y, layout.center_y - layout.radius - layout.label_offset);
    }

    #[test]
    fn polar_draws_one_wedge_per_field_with_palette() {
        let cmds = commands(StatInputSet::goalkeeper([9.0, 9.0, 9.0, 9.0]));
        let fills: Vec<_> = cmds
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Fill { color } => Some(color.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(fills, POLAR_PALETTE.to_vec());

        let layout = ChartLayout::default();
        let wedges: Vec<_> = cmds
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Arc { radius, start, end, .. } if *end != std::f64::consts::TAU => {
                    Some((*radius, *start, *end))
                }
                _ => None,
            })
            .collect();
        assert_eq!(wedges.len(), 4);
        assert_close(wedges[0].0, layout.radius * 0.9);
        assert_close(wedges[0].1, -std::f64::consts::FRAC_PI_2);
        assert_close(wedges[0].2, 0.0);
    }

    #[test]
    fn polar_footer_uses_orange_accent() {
        let cmds = commands(StatInputSet::goalkeeper([9.0, 9.0, 9.0, 9.0]));
        let texts = texts(&cmds);
        assert_eq!(texts[4], ("AVG 9.0", "#ff6600"));
        assert_eq!(texts[5], ("S TIER", "#ff6600"));
    }

    #[test]
    fn grid_has_four_rings() {
        let cmds = commands(StatInputSet::goalkeeper([0.0; 4]));
        let rings = cmds
            .iter()
            .filter(|c| matches!(c, DrawCommand::Arc { end, .. } if *end == std::f64::consts::TAU))
            .count();
        assert_eq!(rings, 4);
    }
}
