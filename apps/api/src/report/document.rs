//! Format-neutral report tree.
//!
//! The builder describes *what* the report contains with these types; a
//! `DocumentBackend` decides how a concrete file format encodes them.
//! Lengths are in twips (1/20 pt, 1440 per inch) and font sizes in half-points,
//! which is what word-processing formats use natively.

pub const TWIPS_PER_INCH: u32 = 1440;

// ────────────────────────────────────────────────────────────────────────────
// Page geometry
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct PageSetup {
    pub width: u32,
    pub height: u32,
    pub margin_top: u32,
    pub margin_right: u32,
    pub margin_bottom: u32,
    pub margin_left: u32,
    /// Distance from the page edge to the running header/footer.
    pub header_distance: u32,
    pub footer_distance: u32,
}

impl PageSetup {
    /// US letter (8.5" × 11") with 1" margins on every side.
    pub fn letter() -> Self {
        Self {
            width: TWIPS_PER_INCH * 17 / 2,
            height: TWIPS_PER_INCH * 11,
            margin_top: TWIPS_PER_INCH,
            margin_right: TWIPS_PER_INCH,
            margin_bottom: TWIPS_PER_INCH,
            margin_left: TWIPS_PER_INCH,
            header_distance: TWIPS_PER_INCH / 2,
            footer_distance: TWIPS_PER_INCH / 2,
        }
    }

    /// Usable text width between the left and right margins.
    pub fn content_width(&self) -> u32 {
        self.width - self.margin_left - self.margin_right
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Styles
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeadingLevel {
    One,
    Two,
    Three,
}

impl HeadingLevel {
    pub const ALL: [HeadingLevel; 3] = [HeadingLevel::One, HeadingLevel::Two, HeadingLevel::Three];

    pub fn number(self) -> u8 {
        match self {
            HeadingLevel::One => 1,
            HeadingLevel::Two => 2,
            HeadingLevel::Three => 3,
        }
    }

    /// Outline level used for navigation panes and tables of contents.
    pub fn outline_level(self) -> u8 {
        self.number() - 1
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadingStyle {
    pub level: HeadingLevel,
    pub size_half_points: u32,
    pub bold: bool,
    /// Hex RGB, no leading `#`.
    pub color: Option<&'static str>,
    pub space_before: u32,
    pub space_after: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleSheet {
    pub font_family: &'static str,
    pub body_size_half_points: u32,
    pub headings: Vec<HeadingStyle>,
}

impl StyleSheet {
    /// House style for grant research reports.
    pub fn report() -> Self {
        Self {
            font_family: "Calibri",
            body_size_half_points: 22,
            headings: vec![
                HeadingStyle {
                    level: HeadingLevel::One,
                    size_half_points: 32,
                    bold: true,
                    color: Some("1F3864"),
                    space_before: 240,
                    space_after: 120,
                },
                HeadingStyle {
                    level: HeadingLevel::Two,
                    size_half_points: 26,
                    bold: true,
                    color: Some("2E74B5"),
                    space_before: 240,
                    space_after: 120,
                },
                HeadingStyle {
                    level: HeadingLevel::Three,
                    size_half_points: 24,
                    bold: true,
                    color: None,
                    space_before: 200,
                    space_after: 80,
                },
            ],
        }
    }

    pub fn heading(&self, level: HeadingLevel) -> Option<&HeadingStyle> {
        self.headings.iter().find(|h| h.level == level)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Running header / footer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct RunningHeader {
    pub text: String,
    pub size_half_points: u32,
    pub color: &'static str,
}

/// Centered footer: `prefix` followed by the live page number.
#[derive(Debug, Clone, PartialEq)]
pub struct RunningFooter {
    pub prefix: String,
    pub size_half_points: u32,
}

// ────────────────────────────────────────────────────────────────────────────
// Body content
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
}

impl Run {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Spacing {
    pub before: u32,
    pub after: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
    pub spacing: Spacing,
}

/// Two-column label/value table.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeTable {
    pub rows: Vec<(String, String)>,
    /// Share of the content width given to the label column, in percent.
    pub label_width_pct: u32,
    /// Hex RGB fill behind label cells.
    pub label_fill: &'static str,
    /// Hex RGB of the thin cell border.
    pub border_color: &'static str,
}

impl AttributeTable {
    pub fn column_widths(&self, content_width: u32) -> (u32, u32) {
        let label = content_width * self.label_width_pct / 100;
        (label, content_width - label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: HeadingLevel, text: String },
    Paragraph(Paragraph),
    /// Item of a semantic bulleted list.
    BulletItem(Vec<Run>),
    Table(AttributeTable),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub page: PageSetup,
    pub styles: StyleSheet,
    pub header: RunningHeader,
    pub footer: RunningFooter,
    pub blocks: Vec<Block>,
}

impl ReportDocument {
    pub fn headings(&self, level: HeadingLevel) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(move |block| match block {
            Block::Heading { level: l, text } if *l == level => Some(text.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letter_geometry() {
        let page = PageSetup::letter();
        assert_eq!(page.width, 12240);
        assert_eq!(page.height, 15840);
        assert_eq!(page.margin_left, 1440);
        assert_eq!(page.content_width(), 9360);
    }

    #[test]
    fn test_heading_outline_levels() {
        assert_eq!(HeadingLevel::One.outline_level(), 0);
        assert_eq!(HeadingLevel::Two.outline_level(), 1);
        assert_eq!(HeadingLevel::Three.outline_level(), 2);
    }

    #[test]
    fn test_report_styles_are_distinct() {
        let styles = StyleSheet::report();
        let h1 = styles.heading(HeadingLevel::One).unwrap();
        let h2 = styles.heading(HeadingLevel::Two).unwrap();
        let h3 = styles.heading(HeadingLevel::Three).unwrap();

        assert!(h1.size_half_points > h2.size_half_points);
        assert!(h2.size_half_points > h3.size_half_points);
        assert!(h1.bold && h2.bold && h3.bold);
        assert_ne!(h1.color, h2.color);
        assert!(h1.color.is_some() && h2.color.is_some());
    }

    #[test]
    fn test_attribute_table_column_split() {
        let table = AttributeTable {
            rows: vec![],
            label_width_pct: 30,
            label_fill: "F2F2F2",
            border_color: "BFBFBF",
        };
        assert_eq!(table.column_widths(9360), (2808, 6552));
    }
}
