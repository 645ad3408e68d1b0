//! Translucent highlight rectangles for saved notes

use ratatui::{buffer::Buffer, style::Color};

use super::HighlightStyle;
use super::state::AnnotationState;
use crate::engine::RenderHighlightsProps;
use crate::theme::{Base16Palette, blend};

pub(super) fn render(
    state: &AnnotationState,
    props: &RenderHighlightsProps<'_>,
    buf: &mut Buffer,
    highlight: &HighlightStyle,
    palette: &Base16Palette,
) {
    for (_note, area) in state.highlights_for_page(props.page_index) {
        let style = (props.get_css_properties)(area, props.rotation);
        let Some(cells) = props.canvas.place(&style.rect) else {
            continue;
        };
        let cells = cells.intersection(buf.area);
        for y in cells.top()..cells.bottom() {
            for x in cells.left()..cells.right() {
                let cell = &mut buf[(x, y)];
                let under = match cell.bg {
                    Color::Rgb(..) => cell.bg,
                    _ => palette.base_00,
                };
                cell.set_bg(blend(under, highlight.color, highlight.opacity));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{
        HighlightArea, PageCanvas, PercentRect, Rotation, SelectionData, SelectionRegion,
        get_css_properties,
    };
    use crate::theme::OCEANIC_NEXT;
    use ratatui::layout::Rect;

    fn commit(state: &mut AnnotationState, page: usize, rect: PercentRect) {
        state.set_pending_text("note");
        state.commit_note(&SelectionData {
            highlight_areas: vec![HighlightArea::new(page, rect)],
            selected_text: "quote".to_string(),
            selection_region: SelectionRegion {
                page_index: page,
                rect,
            },
        });
    }

    fn props(page_index: usize, rotation: Rotation) -> RenderHighlightsProps<'static> {
        RenderHighlightsProps {
            page_index,
            rotation,
            canvas: PageCanvas {
                x: 0,
                top: 0,
                width: 20,
                height: 10,
                visible: Rect::new(0, 0, 20, 10),
            },
            get_css_properties: &get_css_properties,
        }
    }

    fn tinted_cells(buf: &Buffer) -> Vec<(u16, u16)> {
        let mut cells = Vec::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                if buf[(x, y)].bg != Color::Reset {
                    cells.push((x, y));
                }
            }
        }
        cells
    }

    #[test]
    fn test_only_current_page_is_tinted() {
        let mut state = AnnotationState::new();
        commit(&mut state, 0, PercentRect::new(0.0, 0.0, 10.0, 10.0));
        commit(&mut state, 1, PercentRect::new(50.0, 50.0, 10.0, 10.0));

        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 10));
        render(
            &state,
            &props(0, Rotation::None),
            &mut buf,
            &HighlightStyle::default(),
            &OCEANIC_NEXT,
        );
        assert_eq!(tinted_cells(&buf), vec![(0, 0), (1, 0)]);
    }

    #[test]
    fn test_tint_blends_over_background() {
        let mut state = AnnotationState::new();
        commit(&mut state, 0, PercentRect::new(0.0, 0.0, 5.0, 10.0));

        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 10));
        buf.set_style(
            buf.area,
            ratatui::style::Style::default().bg(Color::Rgb(0, 0, 0)),
        );
        let style = HighlightStyle {
            color: Color::Rgb(255, 255, 0),
            opacity: 0.4,
        };
        render(&state, &props(0, Rotation::None), &mut buf, &style, &OCEANIC_NEXT);
        assert_eq!(buf[(0, 0)].bg, Color::Rgb(102, 102, 0));
        assert_eq!(buf[(1, 0)].bg, Color::Rgb(0, 0, 0));
    }

    #[test]
    fn test_rotation_moves_highlight() {
        let mut state = AnnotationState::new();
        commit(&mut state, 0, PercentRect::new(0.0, 0.0, 10.0, 10.0));

        let mut buf = Buffer::empty(Rect::new(0, 0, 20, 10));
        render(
            &state,
            &props(0, Rotation::Cw180),
            &mut buf,
            &HighlightStyle::default(),
            &OCEANIC_NEXT,
        );
        assert_eq!(tinted_cells(&buf), vec![(18, 9), (19, 9)]);
    }
}
