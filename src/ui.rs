use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Context, Line as CanvasLine, Points, Rectangle},
        Block, Borders, Clear, Gauge, Paragraph, Widget,
    },
};

use handgrid::geometry::QuantizedRect;
use handgrid::session::{FrameReport, SessionPhase};

use crate::App;

const HORIZONTAL_MARGIN: u16 = 2;

const CYAN: Color = Color::Rgb(0, 210, 255);
const NEON_GREEN: Color = Color::Rgb(50, 255, 50);
const NEON_RED: Color = Color::Rgb(255, 50, 50);

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let report = &self.report;
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints([
                Constraint::Length(2), // level + target
                Constraint::Length(1), // level progress
                Constraint::Min(5),    // playfield
                Constraint::Length(1), // hold progress
                Constraint::Length(3), // live stats
                Constraint::Length(1), // key help
            ])
            .split(area);

        let accent = if report.phase == SessionPhase::Success {
            NEON_GREEN
        } else {
            CYAN
        };

        Paragraph::new(vec![
            Line::from(Span::styled(
                format!("LEVEL {} / {}", report.level, report.total),
                bold_style,
            )),
            Line::from(Span::styled(
                format!(
                    "TARGET  AREA: {}  |  PERIMETER: {}",
                    report.target.area, report.target.perimeter
                ),
                bold_style.fg(accent),
            )),
        ])
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

        Gauge::default()
            .gauge_style(Style::default().fg(accent))
            .ratio(report.level_progress.clamp(0.0, 1.0))
            .label("")
            .render(chunks[1], buf);

        render_playfield(self, chunks[2], buf);

        if report.phase == SessionPhase::Holding {
            Gauge::default()
                .gauge_style(Style::default().fg(Color::White))
                .ratio(report.hold_progress.clamp(0.0, 1.0))
                .label(Span::styled("HOLD", bold_style))
                .render(chunks[3], buf);
        }

        render_stats(report, chunks[4], buf);

        Paragraph::new(Span::styled(
            "arrows: finger A   wasd: finger B   1/2: show/hide hand   (esc)ape",
            dim_style.add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);

        if report.phase == SessionPhase::Success {
            render_success_overlay(report, chunks[2], buf);
        }
    }
}

fn render_playfield(app: &App, area: Rect, buf: &mut Buffer) {
    let report = &app.report;
    let cfg = app.session.config();
    let (width, height) = (cfg.canvas_width, cfg.canvas_height);
    let unit = cfg.unit_px;
    let success = report.phase == SessionPhase::Success;
    let fail = report.fail_flash && !success;
    let notice = report.fail_notice && !success;

    Canvas::default()
        .block(Block::default().borders(Borders::ALL))
        .marker(Marker::Braille)
        .x_bounds([0.0, width])
        .y_bounds([0.0, height])
        .paint(|ctx| {
            let tips: Vec<(f64, f64)> = report
                .fingertips
                .iter()
                .map(|&(x, y)| (x, height - y))
                .collect();
            ctx.draw(&Points {
                coords: &tips,
                color: CYAN,
            });

            if let Some(rect) = report.shape {
                draw_shape(ctx, &rect, unit, height, success, fail, notice);
            }
        })
        .render(area, buf);
}

/// Grid lines, the raw fingertip box and the snapped outline.
#[allow(clippy::too_many_arguments)]
fn draw_shape(
    ctx: &mut Context,
    rect: &QuantizedRect,
    unit: f64,
    height: f64,
    frozen: bool,
    fail: bool,
    notice: bool,
) {
    let flip = |y: f64| height - y;
    let main_color = if fail { NEON_RED } else { NEON_GREEN };

    for i in 0..=rect.unit_w {
        let x = rect.left + i as f64 * unit;
        ctx.draw(&CanvasLine {
            x1: x,
            y1: flip(rect.top),
            x2: x,
            y2: flip(rect.snapped_bottom),
            color: Color::Gray,
        });
    }
    for i in 0..=rect.unit_h {
        let y = flip(rect.top + i as f64 * unit);
        ctx.draw(&CanvasLine {
            x1: rect.left,
            y1: y,
            x2: rect.snapped_right,
            y2: y,
            color: Color::Gray,
        });
    }
    ctx.layer();

    if !frozen {
        ctx.draw(&Rectangle {
            x: rect.left,
            y: flip(rect.bottom),
            width: rect.right - rect.left,
            height: rect.bottom - rect.top,
            color: Color::DarkGray,
        });
    }
    ctx.draw(&Rectangle {
        x: rect.left,
        y: flip(rect.snapped_bottom),
        width: rect.snapped_width(),
        height: rect.snapped_height(),
        color: main_color,
    });

    let (cx, cy) = rect.centre();
    if notice {
        ctx.print(
            cx,
            flip(cy),
            Span::styled("WRONG", Style::default().fg(NEON_RED).add_modifier(Modifier::BOLD)),
        );
    } else if frozen {
        ctx.print(
            cx,
            flip(cy),
            Span::styled(
                rect.dimension_label(),
                Style::default().fg(CYAN).add_modifier(Modifier::BOLD),
            ),
        );
    }
}

fn render_stats(report: &FrameReport, area: Rect, buf: &mut Buffer) {
    let stat_style = |matched: bool| {
        let base = Style::default().add_modifier(Modifier::BOLD);
        if matched {
            base.fg(NEON_GREEN)
        } else {
            base.fg(Color::White)
        }
    };

    let line = Line::from(vec![
        Span::raw("YOUR SHAPE:  "),
        Span::styled(
            format!("AREA: {}", report.area),
            stat_style(report.area_matches),
        ),
        Span::styled("  |  ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("PERIMETER: {}", report.perimeter),
            stat_style(report.perimeter_matches),
        ),
    ]);

    Paragraph::new(line)
        .block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::Rgb(255, 165, 0))),
        )
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn render_success_overlay(report: &FrameReport, area: Rect, buf: &mut Buffer) {
    let popup = centred(area, 36, 7);
    Clear.render(popup, buf);

    let message = report
        .celebration
        .as_ref()
        .map(|c| c.message)
        .unwrap_or("PERFECT!");
    let label = report
        .frozen
        .map(|r| r.dimension_label())
        .unwrap_or_default();
    let countdown = report.countdown.unwrap_or(0);

    Paragraph::new(vec![
        Line::from(Span::styled(
            message,
            Style::default()
                .fg(NEON_GREEN)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(label, Style::default().fg(CYAN))),
        Line::from(format!("next puzzle in {countdown}")),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(NEON_GREEN)),
    )
    .alignment(Alignment::Center)
    .render(popup, buf);
}

fn centred(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
