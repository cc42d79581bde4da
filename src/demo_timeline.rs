use chrono::{DateTime, Duration, TimeZone, Utc};
use graph::{BranchLaneCalculator, LaneCalculator, TextRenderer, TimelineBuilder};
use timeline_core::{Issue, IssueStatus, IssueType, PrStatus, PullRequest};

fn at(day: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).single().unwrap_or_default() + Duration::days(day)
}

fn pull_request(number: u64, title: &str, status: PrStatus, branch: &str, day: i64) -> PullRequest {
    let done = at(day + 2);
    PullRequest {
        number,
        title: title.to_string(),
        status,
        branch: branch.to_string(),
        url: None,
        created_at: at(day),
        updated_at: done,
        merged_at: (status == PrStatus::Merged).then_some(done),
        closed_at: (status == PrStatus::Closed).then_some(done),
    }
}

fn issue(id: &str, title: &str, issue_type: IssueType, status: IssueStatus, parents: &[&str], day: i64) -> Issue {
    Issue {
        id: id.to_string(),
        title: title.to_string(),
        issue_type,
        status,
        priority: 2,
        url: None,
        created_at: at(day),
        updated_at: at(day),
        parents: parents.iter().map(|p| p.to_string()).collect(),
    }
}

fn main() {
    println!("Timeline Graph Demo");
    println!("===================\n");

    let pull_requests = vec![
        pull_request(12, "Add snapshot loader", PrStatus::Merged, "feature/loader", 0),
        pull_request(13, "Experimental cache", PrStatus::Closed, "spike/cache", 1),
        pull_request(14, "Lane reuse for finished branches", PrStatus::Merged, "feature/lanes", 2),
        pull_request(15, "SVG connectors", PrStatus::ReadyForReview, "feature/svg", 6),
        pull_request(16, "Text renderer", PrStatus::ChecksFailing, "feature/text", 7),
    ];
    let issues = vec![
        issue("TL-1", "Ship timeline view", IssueType::Epic, IssueStatus::InProgress, &[], 3),
        issue("TL-2", "Load-more affordance", IssueType::Feature, IssueStatus::Open, &["TL-1"], 4),
        issue("TL-3", "Escape titles in tooltips", IssueType::Bug, IssueStatus::Blocked, &["TL-1"], 5),
        issue("TL-4", "Paging docs", IssueType::Chore, IssueStatus::Open, &["TL-2"], 6),
        issue("TL-5", "Bump dependencies", IssueType::Chore, IssueStatus::Open, &[], 8),
    ];

    let timeline = match TimelineBuilder::new().max_past_prs(Some(2)).build(&pull_requests, &issues) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error building timeline: {}", e);
            return;
        }
    };

    println!("Timeline statistics:");
    let stats = timeline.graph.stats();
    println!("  Nodes: {}", stats.total_nodes);
    println!("  Pull requests: {}", stats.pull_requests);
    println!("  Issues: {}", stats.issues);
    println!("  Branches: {}", stats.branches);
    println!(
        "  Past PRs shown: {} of {}",
        timeline.total_past_prs_shown, timeline.total_past_prs
    );
    println!();

    let layout = BranchLaneCalculator::new().calculate(&timeline.graph.nodes);
    let renderer = TextRenderer::default().with_title_width(40);

    println!("Timeline:");
    println!("─────────");
    if timeline.has_more_past_prs {
        let hidden = timeline.total_past_prs - timeline.total_past_prs_shown;
        println!("{}", renderer.render_load_more(layout.max_lanes, hidden));
    }
    print!("{}", renderer.render(&timeline.graph.nodes, &layout));
}
