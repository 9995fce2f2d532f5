//! Report builder: turns a `ReportRequest` plus parsed grants into a `ReportDocument`.
//!
//! Section order is fixed: title, generated date, organization profile (optional),
//! search parameters (optional), grant opportunities.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::report::document::{
    AttributeTable, Block, HeadingLevel, PageSetup, Paragraph, ReportDocument, Run,
    RunningFooter, RunningHeader, Spacing, StyleSheet,
};
use crate::report::models::{GrantRecord, ReportRequest};

pub const REPORT_TITLE: &str = "Grant Research Report";
pub const ORG_PROFILE_HEADING: &str = "Organization Profile";
pub const SEARCH_PARAMETERS_HEADING: &str = "Search Parameters";
pub const GRANTS_HEADING: &str = "Grant Opportunities";
/// Heading text for a grant whose title could not be derived.
pub const UNTITLED_GRANT: &str = "Grant Opportunity";

const LABEL_COLUMN_PCT: u32 = 30;
const LABEL_FILL: &str = "F2F2F2";
const BORDER_COLOR: &str = "BFBFBF";
const HEADER_COLOR: &str = "808080";

/// Builds the full report tree. Pure: no clock, no I/O, inputs untouched.
pub fn build_report(request: &ReportRequest, grants: &[GrantRecord]) -> ReportDocument {
    let mut blocks = vec![
        heading(HeadingLevel::One, REPORT_TITLE),
        Block::Paragraph(Paragraph {
            runs: vec![Run::plain(format!(
                "Generated: {}",
                format_generated_date(&request.timestamp)
            ))],
            spacing: Spacing {
                before: 0,
                after: 240,
            },
        }),
    ];

    if let Some(profile) = request.org_profile() {
        blocks.push(heading(HeadingLevel::Two, ORG_PROFILE_HEADING));
        blocks.push(Block::Paragraph(Paragraph {
            runs: vec![Run::plain(profile)],
            spacing: Spacing {
                before: 0,
                after: 200,
            },
        }));
    }

    if !request.context_parameters.is_empty() {
        blocks.push(heading(HeadingLevel::Two, SEARCH_PARAMETERS_HEADING));
        blocks.extend(request.context_parameters.iter().map(|param| {
            Block::BulletItem(vec![
                Run::bold(format!("{}: ", param.label)),
                Run::plain(param.description.as_str()),
            ])
        }));
    }

    blocks.push(heading(HeadingLevel::Two, GRANTS_HEADING));
    for (index, grant) in grants.iter().enumerate() {
        push_grant(&mut blocks, index + 1, grant);
    }

    ReportDocument {
        title: REPORT_TITLE.to_string(),
        page: PageSetup::letter(),
        styles: StyleSheet::report(),
        header: RunningHeader {
            text: REPORT_TITLE.to_string(),
            size_half_points: 18,
            color: HEADER_COLOR,
        },
        footer: RunningFooter {
            prefix: "Page ".to_string(),
            size_half_points: 18,
        },
        blocks,
    }
}

fn push_grant(blocks: &mut Vec<Block>, number: usize, grant: &GrantRecord) {
    let title = grant.title.as_deref().unwrap_or(UNTITLED_GRANT);
    blocks.push(heading(HeadingLevel::Three, &format!("{number}. {title}")));

    let attributes = grant.attributes();
    if !attributes.is_empty() {
        blocks.push(Block::Table(AttributeTable {
            rows: attributes
                .into_iter()
                .map(|(label, value)| (label.to_string(), value.to_string()))
                .collect(),
            label_width_pct: LABEL_COLUMN_PCT,
            label_fill: LABEL_FILL,
            border_color: BORDER_COLOR,
        }));
    }

    blocks.push(Block::Paragraph(Paragraph {
        runs: vec![Run::plain(grant.description.as_str())],
        spacing: Spacing {
            before: 120,
            after: 240,
        },
    }));
}

fn heading(level: HeadingLevel, text: &str) -> Block {
    Block::Heading {
        level,
        text: text.to_string(),
    }
}

/// Calendar date carried by an ISO-8601 timestamp, in the timestamp's own offset.
pub fn report_date(timestamp: &str) -> Option<NaiveDate> {
    let timestamp = timestamp.trim();
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(timestamp, "%Y-%m-%d"))
        .ok()
}

/// "Monday, March 2, 2026" (en-US long form). Unparsable input is shown as given.
pub fn format_generated_date(timestamp: &str) -> String {
    match report_date(timestamp) {
        Some(date) => date.format("%A, %B %-d, %Y").to_string(),
        None => timestamp.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::models::ContextParameter;
    use crate::report::parser::parse_grants;

    fn request(org: Option<&str>, params: Vec<ContextParameter>) -> ReportRequest {
        ReportRequest {
            text: String::new(),
            org_description: org.map(String::from),
            context_parameters: params,
            timestamp: "2026-03-02T15:04:05.000Z".to_string(),
        }
    }

    fn grant(title: Option<&str>, amount: Option<&str>) -> GrantRecord {
        let description = "Supports watershed monitoring by volunteer science groups.".to_string();
        GrantRecord {
            raw_section: description.clone(),
            title: title.map(String::from),
            organization: None,
            amount: amount.map(String::from),
            deadline: None,
            description,
        }
    }

    fn level2(doc: &ReportDocument) -> Vec<&str> {
        doc.headings(HeadingLevel::Two).collect()
    }

    #[test]
    fn test_formats_generated_date() {
        assert_eq!(
            format_generated_date("2026-03-02T15:04:05.000Z"),
            "Monday, March 2, 2026"
        );
        assert_eq!(format_generated_date("2025-12-25"), "Thursday, December 25, 2025");
        assert_eq!(
            format_generated_date("2026-01-10T08:00:00"),
            "Saturday, January 10, 2026"
        );
    }

    #[test]
    fn test_date_uses_timestamp_offset() {
        assert_eq!(
            report_date("2026-03-02T23:30:00-05:00"),
            NaiveDate::from_ymd_opt(2026, 3, 2)
        );
    }

    #[test]
    fn test_unparsable_timestamp_is_shown_verbatim() {
        assert_eq!(format_generated_date("last tuesday"), "last tuesday");
        assert!(report_date("last tuesday").is_none());
    }

    #[test]
    fn test_title_and_metadata_come_first() {
        let doc = build_report(&request(None, vec![]), &[]);
        assert_eq!(
            doc.blocks[0],
            Block::Heading {
                level: HeadingLevel::One,
                text: REPORT_TITLE.to_string()
            }
        );
        match &doc.blocks[1] {
            Block::Paragraph(p) => assert_eq!(p.runs[0].text, "Generated: Monday, March 2, 2026"),
            other => panic!("expected metadata paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_optional_sections_omitted_when_absent() {
        let doc = build_report(&request(None, vec![]), &[]);
        assert_eq!(level2(&doc), vec![GRANTS_HEADING]);
        assert!(!doc.blocks.iter().any(|b| matches!(b, Block::BulletItem(_))));

        let doc = build_report(&request(Some("  "), vec![]), &[]);
        assert_eq!(level2(&doc), vec![GRANTS_HEADING]);
    }

    #[test]
    fn test_optional_sections_emitted_in_order() {
        let params = vec![
            ContextParameter {
                id: "focus".to_string(),
                label: "Focus Area".to_string(),
                description: "Youth literacy".to_string(),
            },
            ContextParameter {
                id: "region".to_string(),
                label: "Region".to_string(),
                description: "Pacific Northwest".to_string(),
            },
        ];
        let doc = build_report(&request(Some("A rural library network."), params), &[]);
        assert_eq!(
            level2(&doc),
            vec![ORG_PROFILE_HEADING, SEARCH_PARAMETERS_HEADING, GRANTS_HEADING]
        );

        let items: Vec<&Vec<Run>> = doc
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::BulletItem(runs) => Some(runs),
                _ => None,
            })
            .collect();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0][0], Run::bold("Focus Area: "));
        assert_eq!(items[0][1], Run::plain("Youth literacy"));
        assert_eq!(items[1][0].text, "Region: ");
    }

    #[test]
    fn test_grant_without_fields_has_no_table() {
        let doc = build_report(&request(None, vec![]), &[grant(Some("Stream Watch"), None)]);
        assert!(!doc.blocks.iter().any(|b| matches!(b, Block::Table(_))));

        let tail = &doc.blocks[doc.blocks.len() - 2..];
        assert!(matches!(&tail[0], Block::Heading { level: HeadingLevel::Three, text } if text == "1. Stream Watch"));
        assert!(matches!(&tail[1], Block::Paragraph(p) if p.runs[0].text.starts_with("Supports watershed")));
    }

    #[test]
    fn test_grant_table_lists_present_fields_only() {
        let doc = build_report(&request(None, vec![]), &[grant(None, Some("$3,000"))]);
        let table = doc
            .blocks
            .iter()
            .find_map(|b| match b {
                Block::Table(t) => Some(t),
                _ => None,
            })
            .expect("table");
        assert_eq!(table.rows, vec![("Amount".to_string(), "$3,000".to_string())]);
        assert_eq!(table.label_width_pct, 30);
    }

    #[test]
    fn test_untitled_grant_gets_placeholder() {
        let doc = build_report(&request(None, vec![]), &[grant(None, None)]);
        let headings: Vec<&str> = doc.headings(HeadingLevel::Three).collect();
        assert_eq!(headings, vec!["1. Grant Opportunity"]);
    }

    #[test]
    fn test_parsed_grants_are_numbered_in_order() {
        let text = "1. River Cleanup Fund\nFunder: Blue Water Trust\nAmount: $15,000\nGrants for volunteer-led river restoration events.\n\n\
                    2. Maker Space Grant\nDeadline: April 4, 2027\nEquipment funding for community fabrication labs and classes.\n\n\
                    3. Senior Meals Program\nSupports home-delivered meals for seniors in rural counties statewide.";
        let grants = parse_grants(text);
        let doc = build_report(&request(None, vec![]), &grants);
        let headings: Vec<&str> = doc.headings(HeadingLevel::Three).collect();
        assert_eq!(
            headings,
            vec![
                "1. River Cleanup Fund",
                "2. Maker Space Grant",
                "3. Senior Meals Program"
            ]
        );
    }

    #[test]
    fn test_build_does_not_mutate_inputs() {
        let req = request(Some("Org"), vec![]);
        let grants = vec![grant(Some("A"), Some("$1"))];
        let before = (req.clone(), grants.clone());
        let first = build_report(&req, &grants);
        let second = build_report(&req, &grants);
        assert_eq!(first, second);
        assert_eq!(before.0.org_description, req.org_description);
        assert_eq!(before.1, grants);
    }
}
