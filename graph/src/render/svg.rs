use super::{escape_xml, NodeShape, NodeStyle, LANE_COLORS};
use crate::layout::{LaneIdx, RowInfo};

/// Pixel geometry of a rendered row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    pub lane_width: i64,
    pub row_height: i64,
    pub node_radius: i64,
    pub diamond_size: i64,
    pub arc_radius: i64,
}

impl RenderConfig {
    pub const fn timeline() -> Self {
        Self {
            lane_width: 24,
            row_height: 40,
            node_radius: 6,
            diamond_size: 7,
            arc_radius: 10,
        }
    }

    /// Task graph connectors bend with the diamond's radius
    pub const fn task_graph() -> Self {
        Self {
            arc_radius: 7,
            ..Self::timeline()
        }
    }

    pub fn lane_center_x(&self, lane: LaneIdx) -> i64 {
        self.lane_width / 2 + lane as i64 * self.lane_width
    }

    pub fn row_center_y(&self) -> i64 {
        self.row_height / 2
    }

    pub fn svg_width(&self, max_lanes: usize) -> i64 {
        self.lane_width * max_lanes.max(1) as i64 + self.lane_width / 2
    }

    /// Distance from the node center to the shape's edge
    pub fn shape_extent(&self, shape: NodeShape) -> i64 {
        match shape {
            NodeShape::Circle => self.node_radius,
            NodeShape::Diamond => self.diamond_size,
            NodeShape::LoadMore => self.node_radius + 2,
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::timeline()
    }
}

/// Renders one timeline row at a time as a standalone SVG fragment
#[derive(Debug, Clone)]
pub struct SvgRenderer {
    config: RenderConfig,
    lane_colors: Vec<String>,
}

impl SvgRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            lane_colors: LANE_COLORS.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn with_lane_colors(mut self, colors: Vec<String>) -> Self {
        if !colors.is_empty() {
            self.lane_colors = colors;
        }
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    fn lane_color(&self, lane: LaneIdx) -> &str {
        &self.lane_colors[lane % self.lane_colors.len()]
    }

    /// Render a node row
    pub fn render_row(&self, row: &RowInfo, max_lanes: usize, style: &NodeStyle) -> String {
        let mut body = String::new();

        for &lane in &row.active_lanes {
            if lane == row.node_lane || row.is_reserved(lane) {
                continue;
            }
            let bottom = if !row.is_ending(lane) {
                self.config.row_height
            } else if row.connector_from_lane == Some(lane) {
                // The connector carries the line from here on
                self.config.row_center_y() - self.config.arc_radius
            } else {
                self.config.row_center_y()
            };
            self.vertical(&mut body, lane, 0, bottom);
        }

        if !row.is_single_node_lane() {
            let gap = self.config.shape_extent(style.shape) + 2;
            let cy = self.config.row_center_y();
            if !row.is_first_row_in_lane {
                self.vertical(&mut body, row.node_lane, 0, cy - gap);
            }
            if !row.is_last_row_in_lane {
                self.vertical(&mut body, row.node_lane, cy + gap, self.config.row_height);
            }
        }

        if let Some(from) = row.connector_from_lane.filter(|&from| from != row.node_lane) {
            self.connector(&mut body, from, row.node_lane, style.shape);
        }

        self.node(&mut body, row.node_lane, style, Some(&row.node_id));
        self.wrap(max_lanes, &body)
    }

    /// Render the "+" row shown above the oldest visible PR. Lanes active in
    /// `next_row` pass through it.
    pub fn render_load_more(&self, next_row: Option<&RowInfo>, max_lanes: usize) -> String {
        let mut body = String::new();
        let style = NodeStyle::load_more();

        if let Some(next) = next_row {
            for &lane in &next.active_lanes {
                let starts_below = lane == next.node_lane && next.is_first_row_in_lane;
                if lane == 0 || starts_below || next.is_reserved(lane) {
                    continue;
                }
                self.vertical(&mut body, lane, 0, self.config.row_height);
            }
        }

        let gap = self.config.shape_extent(style.shape) + 2;
        self.vertical(&mut body, 0, self.config.row_center_y() + gap, self.config.row_height);
        self.node(&mut body, 0, &style, None);
        self.wrap(max_lanes, &body)
    }

    fn wrap(&self, max_lanes: usize, body: &str) -> String {
        let width = self.config.svg_width(max_lanes);
        let height = self.config.row_height;
        format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">{body}</svg>",
            w = width,
            h = height,
            body = body
        )
    }

    fn vertical(&self, out: &mut String, lane: LaneIdx, y1: i64, y2: i64) {
        if y2 <= y1 {
            return;
        }
        let x = self.config.lane_center_x(lane);
        out.push_str(&format!(
            "<line class=\"lane-line\" x1=\"{x}\" y1=\"{y1}\" x2=\"{x}\" y2=\"{y2}\" stroke=\"{color}\" stroke-width=\"2\"/>",
            x = x,
            y1 = y1,
            y2 = y2,
            color = escape_xml(self.lane_color(lane))
        ));
    }

    /// Down from the top edge in `from`, a quarter turn, then across into
    /// the node's side in `to`
    fn connector(&self, out: &mut String, from: LaneIdx, to: LaneIdx, shape: NodeShape) {
        let sx = self.config.lane_center_x(from);
        let dx = self.config.lane_center_x(to);
        let cy = self.config.row_center_y();
        let r = self.config.arc_radius;
        let dir: i64 = if dx > sx { 1 } else { -1 };
        let sweep = if dir > 0 { 0 } else { 1 };
        let end_x = dx - dir * self.config.shape_extent(shape);

        out.push_str(&format!(
            "<path class=\"connector\" d=\"M {sx} 0 L {sx} {arc_y} A {r} {r} 0 0 {sweep} {arc_x} {cy} L {end_x} {cy}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"2\"/>",
            sx = sx,
            arc_y = cy - r,
            r = r,
            sweep = sweep,
            arc_x = sx + dir * r,
            cy = cy,
            end_x = end_x,
            color = escape_xml(self.lane_color(to))
        ));
    }

    fn node(&self, out: &mut String, lane: LaneIdx, style: &NodeStyle, node_id: Option<&str>) {
        let cx = self.config.lane_center_x(lane);
        let cy = self.config.row_center_y();
        let extent = self.config.shape_extent(style.shape);
        let color = escape_xml(&style.color);

        match node_id {
            Some(id) => out.push_str(&format!("<g class=\"node\" data-node-id=\"{}\">", escape_xml(id))),
            None => out.push_str("<g class=\"node load-more\">"),
        }
        if let Some(title) = &style.title {
            out.push_str(&format!("<title>{}</title>", escape_xml(title)));
        }

        if style.actionable {
            let (r0, r1) = (extent + 2, extent + 6);
            out.push_str(&format!(
                "<circle class=\"glow\" cx=\"{cx}\" cy=\"{cy}\" r=\"{r0}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"2\" opacity=\"0.6\">\
<animate attributeName=\"r\" values=\"{r0};{r1};{r0}\" dur=\"2s\" repeatCount=\"indefinite\"/>\
<animate attributeName=\"opacity\" values=\"0.6;0;0.6\" dur=\"2s\" repeatCount=\"indefinite\"/></circle>",
                cx = cx,
                cy = cy,
                r0 = r0,
                r1 = r1,
                color = color
            ));
        }

        let fill = if style.hollow { "#ffffff".to_string() } else { color.clone() };
        match style.shape {
            NodeShape::Circle => out.push_str(&format!(
                "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{r}\" fill=\"{fill}\" stroke=\"{color}\" stroke-width=\"2\"/>",
                cx = cx,
                cy = cy,
                r = extent,
                fill = fill,
                color = color
            )),
            NodeShape::Diamond => out.push_str(&format!(
                "<polygon points=\"{cx},{top} {right},{cy} {cx},{bottom} {left},{cy}\" fill=\"{fill}\" stroke=\"{color}\" stroke-width=\"2\"/>",
                cx = cx,
                cy = cy,
                top = cy - extent,
                bottom = cy + extent,
                left = cx - extent,
                right = cx + extent,
                fill = fill,
                color = color
            )),
            NodeShape::LoadMore => {
                let arm = extent / 2;
                out.push_str(&format!(
                    "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{r}\" fill=\"#ffffff\" stroke=\"{color}\" stroke-width=\"1.5\" stroke-dasharray=\"2 2\"/>\
<path d=\"M {l} {cy} L {rr} {cy} M {cx} {t} L {cx} {b}\" stroke=\"{color}\" stroke-width=\"1.5\"/>",
                    cx = cx,
                    cy = cy,
                    r = extent,
                    l = cx - arm,
                    rr = cx + arm,
                    t = cy - arm,
                    b = cy + arm,
                    color = color
                ));
            }
        }

        if style.error {
            let arm = extent / 2;
            out.push_str(&format!(
                "<path class=\"error\" d=\"M {l} {t} L {r} {b} M {r} {t} L {l} {b}\" stroke=\"{color}\" stroke-width=\"1.5\"/>",
                l = cx - arm,
                r = cx + arm,
                t = cy - arm,
                b = cy + arm,
                color = color
            ));
        }

        out.push_str("</g>");
    }
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self::new(RenderConfig::timeline())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GraphNode, NodeDetail, NodeKind};
    use crate::layout::{lane_set, BranchLaneCalculator, LaneCalculator, LaneSet};
    use chrono::{TimeZone, Utc};
    use timeline_core::{IssueStatus, IssueType};

    fn row(lane: LaneIdx, active: &[LaneIdx]) -> RowInfo {
        RowInfo {
            node_id: "pr-1".to_string(),
            node_lane: lane,
            connector_from_lane: None,
            active_lanes: lane_set(active.iter().copied()),
            lanes_ending_this_row: LaneSet::new(),
            reserved_lanes: LaneSet::new(),
            is_first_row_in_lane: false,
            is_last_row_in_lane: false,
        }
    }

    fn issue(id: &str, branch: &str, parents: &[&str]) -> GraphNode {
        GraphNode {
            id: id.to_string(),
            kind: NodeKind::Issue,
            branch_name: branch.to_string(),
            parent_ids: parents.iter().map(|p| p.to_string()).collect(),
            time_dimension: 2,
            sort_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            title: id.to_string(),
            url: None,
            color: "#0969da".to_string(),
            tag: None,
            lane: None,
            detail: NodeDetail::Issue {
                issue_id: id.to_string(),
                issue_type: IssueType::Task,
                status: IssueStatus::Open,
                priority: 2,
                is_actionable: false,
            },
        }
    }

    fn lines(svg: &str) -> usize {
        svg.matches("<line ").count()
    }

    #[test]
    fn test_geometry() {
        let config = RenderConfig::timeline();
        assert_eq!(config.lane_center_x(0), 12);
        assert_eq!(config.lane_center_x(2), 60);
        assert_eq!(config.row_center_y(), 20);
        assert_eq!(config.svg_width(3), 84);
        assert_eq!(config.svg_width(0), 36);
        assert_eq!(RenderConfig::task_graph().arc_radius, 7);
    }

    #[test]
    fn test_main_row_has_gapped_line_and_circle() {
        let renderer = SvgRenderer::default();
        let svg = renderer.render_row(&row(0, &[0]), 1, &NodeStyle::circle("#8250df"));

        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"36\" height=\"40\""));
        // Gap of radius + 2 on both sides of the node
        assert!(svg.contains("x1=\"12\" y1=\"0\" x2=\"12\" y2=\"12\""));
        assert!(svg.contains("x1=\"12\" y1=\"28\" x2=\"12\" y2=\"40\""));
        assert!(svg.contains("<circle cx=\"12\" cy=\"20\" r=\"6\" fill=\"#8250df\""));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_pass_through_and_reserved_lanes() {
        let renderer = SvgRenderer::default();
        let mut info = row(0, &[0, 1, 2]);
        info.reserved_lanes = lane_set([2]);
        let svg = renderer.render_row(&info, 3, &NodeStyle::circle("#000"));

        assert!(svg.contains("x1=\"36\" y1=\"0\" x2=\"36\" y2=\"40\""));
        assert!(!svg.contains("x1=\"60\""));
    }

    #[test]
    fn test_ending_lane_stops_at_center() {
        let renderer = SvgRenderer::default();
        let mut info = row(0, &[0, 1]);
        info.lanes_ending_this_row = lane_set([1]);
        let svg = renderer.render_row(&info, 2, &NodeStyle::circle("#000"));
        assert!(svg.contains("x1=\"36\" y1=\"0\" x2=\"36\" y2=\"20\""));
    }

    #[test]
    fn test_single_node_lane_draws_no_own_line() {
        let renderer = SvgRenderer::default();
        let mut info = row(1, &[0, 1]);
        info.is_first_row_in_lane = true;
        info.is_last_row_in_lane = true;
        info.connector_from_lane = Some(0);
        let svg = renderer.render_row(&info, 2, &NodeStyle::circle("#000"));

        // Only main's pass-through line
        assert_eq!(lines(&svg), 1);
        assert!(svg.contains("<path class=\"connector\" d=\"M 12 0 L 12 10 A 10 10 0 0 0 22 20 L 30 20\""));
    }

    #[test]
    fn test_first_row_omits_top_segment() {
        let renderer = SvgRenderer::default();
        let mut info = row(1, &[0, 1]);
        info.is_first_row_in_lane = true;
        let svg = renderer.render_row(&info, 2, &NodeStyle::circle("#000"));

        assert!(!svg.contains("x1=\"36\" y1=\"0\""));
        assert!(svg.contains("x1=\"36\" y1=\"28\" x2=\"36\" y2=\"40\""));
    }

    #[test]
    fn test_connector_from_the_right() {
        let renderer = SvgRenderer::new(RenderConfig::task_graph());
        let mut info = row(0, &[0, 1]);
        info.connector_from_lane = Some(1);
        info.lanes_ending_this_row = lane_set([1]);
        let svg = renderer.render_row(&info, 2, &NodeStyle::diamond("#000"));

        assert!(svg.contains("d=\"M 36 0 L 36 13 A 7 7 0 0 1 29 20 L 19 20\""));
        // Pass-through stop at the arc start
        assert!(svg.contains("x1=\"36\" y1=\"0\" x2=\"36\" y2=\"13\""));
        assert!(svg.contains("<polygon points=\"12,13 19,20 12,27 5,20\""));
    }

    #[test]
    fn test_no_connector_for_same_lane() {
        let renderer = SvgRenderer::default();
        let mut info = row(1, &[0, 1]);
        info.connector_from_lane = Some(1);
        let svg = renderer.render_row(&info, 2, &NodeStyle::circle("#000"));
        assert!(!svg.contains("connector"));
    }

    #[test]
    fn test_styles_are_escaped() {
        let renderer = SvgRenderer::default();
        let style = NodeStyle::circle("\"><script>&'").with_title("<b>Fix & ship</b>");
        let svg = renderer.render_row(&row(0, &[0]), 1, &style);

        assert!(svg.contains("&quot;&gt;&lt;script&gt;&amp;&#39;"));
        assert!(svg.contains("<title>&lt;b&gt;Fix &amp; ship&lt;/b&gt;</title>"));
        assert!(!svg.contains("<script>"));
        assert!(!svg.contains("<b>"));
    }

    #[test]
    fn test_failed_and_actionable_decorations() {
        let renderer = SvgRenderer::default();
        let mut style = NodeStyle::diamond("#0969da").failed();
        style.actionable = true;
        let svg = renderer.render_row(&row(0, &[0]), 1, &style);

        assert!(svg.contains("fill=\"#ffffff\""));
        assert!(svg.contains("class=\"error\""));
        assert!(svg.contains("class=\"glow\""));
        assert!(svg.contains("<animate attributeName=\"r\""));
    }

    #[test]
    fn test_load_more_row() {
        let renderer = SvgRenderer::default();
        let mut next = row(1, &[0, 1, 2]);
        next.is_first_row_in_lane = true;
        let svg = renderer.render_load_more(Some(&next), 3);

        assert!(svg.contains("load-more"));
        assert!(svg.contains("stroke-dasharray"));
        // Lane 2 passes through, lane 1 only starts below
        assert!(svg.contains("x1=\"60\" y1=\"0\" x2=\"60\" y2=\"40\""));
        assert!(!svg.contains("x1=\"36\""));
        assert!(svg.contains("width=\"84\" height=\"40\""));
    }

    #[test]
    fn test_last_fork_row_ends_in_connector() {
        // a2 is a's last node; d1 is the last fork off a1
        let nodes = vec![
            issue("a1", "a", &[]),
            issue("a2", "a", &["a1"]),
            issue("d1", "d", &["a1"]),
            issue("e1", "e", &[]),
            issue("d2", "d", &["d1"]),
        ];
        let layout = BranchLaneCalculator::new().calculate(&nodes);
        let renderer = SvgRenderer::default();
        let style = NodeStyle::diamond("#0969da");

        let fork_row = renderer.render_row(&layout.rows[2], layout.max_lanes, &style);
        assert!(fork_row.contains("d=\"M 36 0 L 36 10 A 10 10 0 0 0 46 20 L 53 20\""));
        assert!(fork_row.contains("x1=\"36\" y1=\"0\" x2=\"36\" y2=\"10\""));
        assert!(!fork_row.contains("x1=\"36\" y1=\"0\" x2=\"36\" y2=\"40\""));

        // Lane 1 is only reserved below the fork
        let next_row = renderer.render_row(&layout.rows[3], layout.max_lanes, &style);
        assert!(!next_row.contains("x1=\"36\""));
    }
}
