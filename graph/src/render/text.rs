use super::measure::{display_width, pad_to_width, truncate_to_width};
use super::{NodeShape, NodeStyle};
use crate::core::GraphNode;
use crate::layout::{Layout, RowInfo};

/// Glyph set for the graph column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Unicode,
    Ascii,
}

struct Glyphs {
    vertical: char,
    horizontal: char,
    crossing: char,
    turn_right: char,
    turn_left: char,
    circle: char,
    circle_hollow: char,
    diamond: char,
    diamond_hollow: char,
    load_more: char,
}

const UNICODE: Glyphs = Glyphs {
    vertical: '│',
    horizontal: '─',
    crossing: '┼',
    turn_right: '╰',
    turn_left: '╯',
    circle: '●',
    circle_hollow: '○',
    diamond: '◆',
    diamond_hollow: '◇',
    load_more: '+',
};

const ASCII: Glyphs = Glyphs {
    vertical: '|',
    horizontal: '-',
    crossing: '+',
    turn_right: '`',
    turn_left: '\'',
    circle: '*',
    circle_hollow: 'o',
    diamond: '#',
    diamond_hollow: '%',
    load_more: '+',
};

impl Charset {
    fn glyphs(self) -> &'static Glyphs {
        match self {
            Charset::Unicode => &UNICODE,
            Charset::Ascii => &ASCII,
        }
    }
}

/// Plain-text rendering of a laid out graph, one line per row
#[derive(Debug, Clone)]
pub struct TextRenderer {
    charset: Charset,
    title_width: usize,
}

impl TextRenderer {
    pub fn new(charset: Charset) -> Self {
        Self {
            charset,
            title_width: 60,
        }
    }

    pub fn with_title_width(mut self, title_width: usize) -> Self {
        self.title_width = title_width;
        self
    }

    /// Graph column for one row, two cells per lane
    pub fn graph_cells(&self, row: &RowInfo, max_lanes: usize, style: &NodeStyle) -> String {
        let g = self.charset.glyphs();
        let lanes = max_lanes.max(row.node_lane + 1);
        let mut cells = vec![' '; lanes * 2];

        for &lane in &row.active_lanes {
            if lane != row.node_lane && !row.is_reserved(lane) && lane < lanes {
                cells[lane * 2] = g.vertical;
            }
        }

        if let Some(from) = row.connector_from_lane.filter(|&from| from != row.node_lane && from < lanes) {
            let (lo, hi, corner) = if from < row.node_lane {
                (from, row.node_lane, g.turn_right)
            } else {
                (row.node_lane, from, g.turn_left)
            };
            for cell in &mut cells[lo * 2 + 1..hi * 2] {
                *cell = if *cell == g.vertical { g.crossing } else { g.horizontal };
            }
            cells[from * 2] = corner;
        }

        cells[row.node_lane * 2] = match (style.shape, style.hollow) {
            (NodeShape::Circle, false) => g.circle,
            (NodeShape::Circle, true) => g.circle_hollow,
            (NodeShape::Diamond, false) => g.diamond,
            (NodeShape::Diamond, true) => g.diamond_hollow,
            (NodeShape::LoadMore, _) => g.load_more,
        };

        cells.into_iter().collect()
    }

    /// One full line: graph column, tag, title
    pub fn render_row(&self, row: &RowInfo, max_lanes: usize, node: &GraphNode, tag_width: usize) -> String {
        let style = NodeStyle::for_node(node);
        let cells = self.graph_cells(row, max_lanes, &style);
        let tag = pad_to_width(node.tag.as_deref().unwrap_or(""), tag_width);
        let line = format!("{} {} {}", cells, tag, truncate_to_width(&node.title, self.title_width));
        line.trim_end().to_string()
    }

    /// "+" line standing in for `hidden` older pull requests
    pub fn render_load_more(&self, max_lanes: usize, hidden: usize) -> String {
        let g = self.charset.glyphs();
        let mut cells = vec![' '; max_lanes.max(1) * 2];
        cells[0] = g.load_more;
        let cells: String = cells.into_iter().collect();
        format!("{} {} older pull requests", cells, hidden)
    }

    /// Render every row of `layout`. `nodes` must be in layout row order.
    pub fn render(&self, nodes: &[GraphNode], layout: &Layout) -> String {
        let tag_width = nodes
            .iter()
            .filter_map(|node| node.tag.as_deref())
            .map(display_width)
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for (row, node) in layout.rows.iter().zip(nodes) {
            out.push_str(&self.render_row(row, layout.max_lanes, node, tag_width));
            out.push('\n');
        }
        out
    }
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new(Charset::Unicode)
    }
}
