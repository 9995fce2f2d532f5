//! Office Open XML (`.docx`) backend.
//!
//! Writes a minimal WordprocessingML package: styles, a bullet numbering
//! definition, one header and one footer part, and the document body.
//! Zip entries carry a fixed timestamp so identical trees give identical bytes.

use std::fmt::Write as _;
use std::io::{Cursor, Write};

use bytes::Bytes;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::report::document::{
    AttributeTable, Block, HeadingLevel, HeadingStyle, Paragraph, ReportDocument, Run, RunningFooter,
    RunningHeader, StyleSheet,
};
use crate::report::render::{DocumentBackend, RenderError};

pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;
const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Bullet list numbering instance referenced by every `BulletItem`.
const BULLET_NUM_ID: u32 = 1;
const BULLET_INDENT_LEFT: u32 = 720;
const BULLET_HANGING: u32 = 360;
const TABLE_BORDER_SIZE: u32 = 4;

#[derive(Debug, Clone, Copy, Default)]
pub struct DocxBackend;

impl DocumentBackend for DocxBackend {
    fn name(&self) -> &str {
        "docx"
    }

    fn content_type(&self) -> &str {
        DOCX_CONTENT_TYPE
    }

    fn extension(&self) -> &str {
        "docx"
    }

    fn serialize(&self, doc: &ReportDocument) -> Result<Bytes, RenderError> {
        let parts = [
            ("[Content_Types].xml", content_types_xml()),
            ("_rels/.rels", package_rels_xml()),
            ("docProps/core.xml", core_props_xml(&doc.title)),
            ("word/_rels/document.xml.rels", document_rels_xml()),
            ("word/styles.xml", styles_xml(&doc.styles)),
            ("word/numbering.xml", numbering_xml()),
            ("word/header1.xml", header_xml(&doc.header)),
            ("word/footer1.xml", footer_xml(&doc.footer)),
            ("word/document.xml", document_xml(doc)),
        ];
        write_package(&parts)
    }
}

fn write_package(parts: &[(&str, String)]) -> Result<Bytes, RenderError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in parts {
        zip.start_file(*name, options)?;
        zip.write_all(body.as_bytes())?;
    }
    let cursor = zip.finish()?;
    Ok(Bytes::from(cursor.into_inner()))
}

// ────────────────────────────────────────────────────────────────────────────
// Package plumbing
// ────────────────────────────────────────────────────────────────────────────

fn content_types_xml() -> String {
    let main = "application/vnd.openxmlformats-officedocument.wordprocessingml";
    format!(
        concat!(
            "{decl}",
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/word/document.xml" ContentType="{main}.document.main+xml"/>"#,
            r#"<Override PartName="/word/styles.xml" ContentType="{main}.styles+xml"/>"#,
            r#"<Override PartName="/word/numbering.xml" ContentType="{main}.numbering+xml"/>"#,
            r#"<Override PartName="/word/header1.xml" ContentType="{main}.header+xml"/>"#,
            r#"<Override PartName="/word/footer1.xml" ContentType="{main}.footer+xml"/>"#,
            r#"<Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>"#,
            "</Types>"
        ),
        decl = XML_DECL,
        main = main,
    )
}

fn package_rels_xml() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<Relationships xmlns="{rel_ns}">"#,
            r#"<Relationship Id="rId1" Type="{rel_type}/officeDocument" Target="word/document.xml"/>"#,
            r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>"#,
            "</Relationships>"
        ),
        decl = XML_DECL,
        rel_ns = REL_NS,
        rel_type = REL_TYPE,
    )
}

fn document_rels_xml() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<Relationships xmlns="{rel_ns}">"#,
            r#"<Relationship Id="rId1" Type="{rel_type}/styles" Target="styles.xml"/>"#,
            r#"<Relationship Id="rId2" Type="{rel_type}/numbering" Target="numbering.xml"/>"#,
            r#"<Relationship Id="rId3" Type="{rel_type}/header" Target="header1.xml"/>"#,
            r#"<Relationship Id="rId4" Type="{rel_type}/footer" Target="footer1.xml"/>"#,
            "</Relationships>"
        ),
        decl = XML_DECL,
        rel_ns = REL_NS,
        rel_type = REL_TYPE,
    )
}

fn core_props_xml(title: &str) -> String {
    format!(
        concat!(
            "{decl}",
            r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/">"#,
            "<dc:title>{title}</dc:title>",
            "</cp:coreProperties>"
        ),
        decl = XML_DECL,
        title = escape_xml(title),
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Styles and numbering
// ────────────────────────────────────────────────────────────────────────────

fn styles_xml(styles: &StyleSheet) -> String {
    let font = escape_xml(styles.font_family);
    let size = styles.body_size_half_points;

    let mut xml = format!(r#"{XML_DECL}<w:styles xmlns:w="{W_NS}">"#);
    let _ = write!(
        xml,
        concat!(
            "<w:docDefaults><w:rPrDefault><w:rPr>",
            r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:eastAsia="{font}" w:cs="{font}"/>"#,
            r#"<w:sz w:val="{size}"/><w:szCs w:val="{size}"/>"#,
            "</w:rPr></w:rPrDefault>",
            r#"<w:pPrDefault><w:pPr><w:spacing w:after="0" w:line="276" w:lineRule="auto"/></w:pPr></w:pPrDefault>"#,
            "</w:docDefaults>",
            r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
        ),
        font = font,
        size = size,
    );

    for heading in HeadingLevel::ALL.iter().filter_map(|level| styles.heading(*level)) {
        heading_style_xml(&mut xml, heading);
    }

    let _ = write!(
        xml,
        concat!(
            r#"<w:style w:type="paragraph" w:styleId="ListParagraph">"#,
            r#"<w:name w:val="List Paragraph"/><w:basedOn w:val="Normal"/>"#,
            r#"<w:pPr><w:ind w:left="{left}"/><w:contextualSpacing/></w:pPr>"#,
            "</w:style>"
        ),
        left = BULLET_INDENT_LEFT,
    );
    xml.push_str("</w:styles>");
    xml
}

fn heading_style_xml(xml: &mut String, style: &HeadingStyle) {
    let n = style.level.number();
    let _ = write!(
        xml,
        concat!(
            r#"<w:style w:type="paragraph" w:styleId="Heading{n}">"#,
            r#"<w:name w:val="heading {n}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
            r#"<w:pPr><w:keepNext/><w:spacing w:before="{before}" w:after="{after}"/><w:outlineLvl w:val="{outline}"/></w:pPr>"#,
            "<w:rPr>"
        ),
        n = n,
        before = style.space_before,
        after = style.space_after,
        outline = style.level.outline_level(),
    );
    if style.bold {
        xml.push_str("<w:b/><w:bCs/>");
    }
    if let Some(color) = style.color {
        let _ = write!(xml, r#"<w:color w:val="{color}"/>"#);
    }
    let _ = write!(
        xml,
        r#"<w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr></w:style>"#,
        size = style.size_half_points,
    );
}

fn numbering_xml() -> String {
    format!(
        concat!(
            "{decl}",
            r#"<w:numbering xmlns:w="{w_ns}">"#,
            r#"<w:abstractNum w:abstractNumId="0">"#,
            r#"<w:multiLevelType w:val="hybridMultilevel"/>"#,
            r#"<w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="bullet"/>"#,
            r#"<w:lvlText w:val="{glyph}"/><w:lvlJc w:val="left"/>"#,
            r#"<w:pPr><w:ind w:left="{left}" w:hanging="{hanging}"/></w:pPr>"#,
            r#"<w:rPr><w:rFonts w:ascii="Symbol" w:hAnsi="Symbol" w:hint="default"/></w:rPr>"#,
            "</w:lvl></w:abstractNum>",
            r#"<w:num w:numId="{num_id}"><w:abstractNumId w:val="0"/></w:num>"#,
            "</w:numbering>"
        ),
        decl = XML_DECL,
        w_ns = W_NS,
        glyph = '\u{F0B7}',
        left = BULLET_INDENT_LEFT,
        hanging = BULLET_HANGING,
        num_id = BULLET_NUM_ID,
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Header / footer
// ────────────────────────────────────────────────────────────────────────────

fn header_xml(header: &RunningHeader) -> String {
    format!(
        concat!(
            "{decl}",
            r#"<w:hdr xmlns:w="{w_ns}"><w:p><w:pPr><w:jc w:val="right"/></w:pPr>"#,
            r#"<w:r><w:rPr><w:color w:val="{color}"/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr>"#,
            r#"<w:t xml:space="preserve">{text}</w:t></w:r>"#,
            "</w:p></w:hdr>"
        ),
        decl = XML_DECL,
        w_ns = W_NS,
        color = header.color,
        size = header.size_half_points,
        text = escape_xml(&header.text),
    )
}

fn footer_xml(footer: &RunningFooter) -> String {
    let rpr = format!(
        r#"<w:rPr><w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr>"#,
        size = footer.size_half_points
    );
    format!(
        concat!(
            "{decl}",
            r#"<w:ftr xmlns:w="{w_ns}"><w:p><w:pPr><w:jc w:val="center"/></w:pPr>"#,
            r#"<w:r>{rpr}<w:t xml:space="preserve">{prefix}</w:t></w:r>"#,
            r#"<w:r>{rpr}<w:fldChar w:fldCharType="begin"/></w:r>"#,
            r#"<w:r>{rpr}<w:instrText xml:space="preserve"> PAGE </w:instrText></w:r>"#,
            r#"<w:r>{rpr}<w:fldChar w:fldCharType="separate"/></w:r>"#,
            r#"<w:r>{rpr}<w:t>1</w:t></w:r>"#,
            r#"<w:r>{rpr}<w:fldChar w:fldCharType="end"/></w:r>"#,
            "</w:p></w:ftr>"
        ),
        decl = XML_DECL,
        w_ns = W_NS,
        rpr = rpr,
        prefix = escape_xml(&footer.prefix),
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Body
// ────────────────────────────────────────────────────────────────────────────

fn document_xml(doc: &ReportDocument) -> String {
    let mut xml = format!(r#"{XML_DECL}<w:document xmlns:w="{W_NS}" xmlns:r="{R_NS}"><w:body>"#);
    let content_width = doc.page.content_width();

    for block in &doc.blocks {
        match block {
            Block::Heading { level, text } => {
                let _ = write!(
                    xml,
                    r#"<w:p><w:pPr><w:pStyle w:val="Heading{}"/></w:pPr>"#,
                    level.number()
                );
                runs_xml(&mut xml, &[Run::plain(text.as_str())]);
                xml.push_str("</w:p>");
            }
            Block::Paragraph(paragraph) => paragraph_xml(&mut xml, paragraph),
            Block::BulletItem(runs) => {
                let _ = write!(
                    xml,
                    concat!(
                        r#"<w:p><w:pPr><w:pStyle w:val="ListParagraph"/>"#,
                        r#"<w:numPr><w:ilvl w:val="0"/><w:numId w:val="{num_id}"/></w:numPr>"#,
                        r#"<w:ind w:left="{left}" w:hanging="{hanging}"/></w:pPr>"#
                    ),
                    num_id = BULLET_NUM_ID,
                    left = BULLET_INDENT_LEFT,
                    hanging = BULLET_HANGING,
                );
                runs_xml(&mut xml, runs);
                xml.push_str("</w:p>");
            }
            Block::Table(table) => table_xml(&mut xml, table, content_width),
        }
    }

    let page = &doc.page;
    let _ = write!(
        xml,
        concat!(
            "<w:sectPr>",
            r#"<w:headerReference w:type="default" r:id="rId3"/>"#,
            r#"<w:footerReference w:type="default" r:id="rId4"/>"#,
            r#"<w:pgSz w:w="{width}" w:h="{height}"/>"#,
            r#"<w:pgMar w:top="{top}" w:right="{right}" w:bottom="{bottom}" w:left="{left}" w:header="{header}" w:footer="{footer}" w:gutter="0"/>"#,
            "</w:sectPr></w:body></w:document>"
        ),
        width = page.width,
        height = page.height,
        top = page.margin_top,
        right = page.margin_right,
        bottom = page.margin_bottom,
        left = page.margin_left,
        header = page.header_distance,
        footer = page.footer_distance,
    );
    xml
}

fn paragraph_xml(xml: &mut String, paragraph: &Paragraph) {
    let _ = write!(
        xml,
        r#"<w:p><w:pPr><w:spacing w:before="{}" w:after="{}"/></w:pPr>"#,
        paragraph.spacing.before, paragraph.spacing.after
    );
    runs_xml(xml, &paragraph.runs);
    xml.push_str("</w:p>");
}

fn table_xml(xml: &mut String, table: &AttributeTable, content_width: u32) {
    let (label_width, value_width) = table.column_widths(content_width);
    let borders = cell_borders(table.border_color);

    let _ = write!(
        xml,
        concat!(
            r#"<w:tbl><w:tblPr><w:tblW w:w="{total}" w:type="dxa"/><w:tblLayout w:type="fixed"/></w:tblPr>"#,
            r#"<w:tblGrid><w:gridCol w:w="{label}"/><w:gridCol w:w="{value}"/></w:tblGrid>"#
        ),
        total = content_width,
        label = label_width,
        value = value_width,
    );

    for (label, value) in &table.rows {
        xml.push_str("<w:tr>");
        let _ = write!(
            xml,
            r#"<w:tc><w:tcPr><w:tcW w:w="{label_width}" w:type="dxa"/>{borders}<w:shd w:val="clear" w:color="auto" w:fill="{fill}"/></w:tcPr><w:p>"#,
            fill = table.label_fill,
        );
        runs_xml(xml, &[Run::bold(label.as_str())]);
        xml.push_str("</w:p></w:tc>");

        let _ = write!(
            xml,
            r#"<w:tc><w:tcPr><w:tcW w:w="{value_width}" w:type="dxa"/>{borders}</w:tcPr><w:p>"#
        );
        runs_xml(xml, &[Run::plain(value.as_str())]);
        xml.push_str("</w:p></w:tc></w:tr>");
    }
    xml.push_str("</w:tbl>");
}

fn cell_borders(color: &str) -> String {
    let mut xml = String::from("<w:tcBorders>");
    for side in ["top", "left", "bottom", "right"] {
        let _ = write!(
            xml,
            r#"<w:{side} w:val="single" w:sz="{TABLE_BORDER_SIZE}" w:space="0" w:color="{color}"/>"#
        );
    }
    xml.push_str("</w:tcBorders>");
    xml
}

/// Emits runs; embedded newlines become `<w:br/>` line breaks.
fn runs_xml(xml: &mut String, runs: &[Run]) {
    for run in runs {
        xml.push_str("<w:r>");
        if run.bold {
            xml.push_str("<w:rPr><w:b/><w:bCs/></w:rPr>");
        }
        let text = run.text.replace("\r\n", "\n");
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                xml.push_str("<w:br/>");
            }
            let _ = write!(xml, r#"<w:t xml:space="preserve">{}</w:t>"#, escape_xml(line));
        }
        xml.push_str("</w:r>");
    }
}

/// Escapes markup characters and drops control characters XML 1.0 cannot carry.
fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(c),
            c if (c as u32) < 0x20 => {}
            c => out.push(c),
        }
    }
    out
}
