//! # PDF Serializer
//!
//! Takes the laid-out pages from the layout engine and writes a PDF 1.7
//! file: one FlateDecode content stream per page and a Type1 font object
//! per standard font in use, so nothing needs embedding.
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- catalog, page tree, fonts, pages, content streams
//! ...
//! xref                <- byte offset of each object
//! trailer             <- root and info references
//! %%EOF
//! ```

use std::fmt::Write as FmtWrite;
use std::io::Write as IoWrite;

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::font::StandardFont;
use crate::layout::{DrawCommand, LayoutPage};
use crate::model::Metadata;
use crate::style::Color;

pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<Vec<u8>>,
    /// Fonts in resource order: `/F0` is the first entry.
    font_objects: Vec<(StandardFont, usize)>,
}

impl PdfBuilder {
    fn push(&mut self, data: Vec<u8>) -> usize {
        self.objects.push(data);
        self.objects.len() - 1
    }

    fn font_index(&self, name: &str) -> usize {
        let font = StandardFont::from_name(name).unwrap_or(StandardFont::Helvetica);
        self.font_objects
            .iter()
            .position(|(f, _)| *f == font)
            .unwrap_or(0)
    }
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write laid-out pages to a PDF byte vector.
    pub fn write(&self, pages: &[LayoutPage], metadata: &Metadata) -> Vec<u8> {
        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages.
        let mut builder = PdfBuilder {
            objects: vec![Vec::new(), Vec::new(), Vec::new()],
            font_objects: Vec::new(),
        };

        self.register_fonts(&mut builder, pages);
        let font_resources = self.build_font_resource_dict(&builder.font_objects);

        let mut page_obj_ids = Vec::with_capacity(pages.len());
        for page in pages {
            let content = self.build_content_stream(page, &builder);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            let content_obj_id = builder.push(content_data);

            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << /Font << {} >> >> >>",
                page.width, page.height, content_obj_id, font_resources
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        builder.objects[1] = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2] = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = builder.push(self.build_info_dict(metadata).into_bytes());
        tracing::debug!(
            target: "pdf",
            pages = pages.len(),
            objects = builder.objects.len() - 1,
            fonts = builder.font_objects.len(),
            "pdf_assembled"
        );
        self.serialize(&builder, info_obj_id)
    }

    fn build_info_dict(&self, metadata: &Metadata) -> String {
        let mut info = String::from("<< ");
        if let Some(ref title) = metadata.title {
            let _ = write!(info, "/Title ({}) ", Self::encode_text(title));
        }
        if let Some(ref author) = metadata.author {
            let _ = write!(info, "/Author ({}) ", Self::encode_text(author));
        }
        if let Some(ref subject) = metadata.subject {
            let _ = write!(info, "/Subject ({}) ", Self::encode_text(subject));
        }
        let creator = metadata.creator.as_deref().unwrap_or("codepress");
        let _ = write!(
            info,
            "/Creator ({}) /Producer (codepress {}) >>",
            Self::encode_text(creator),
            env!("CARGO_PKG_VERSION")
        );
        info
    }

    /// Build the PDF content stream for a single page.
    ///
    /// Layout coordinates are top-down; PDF's origin is the bottom-left
    /// corner, so every y is flipped against the page height.
    fn build_content_stream(&self, page: &LayoutPage, builder: &PdfBuilder) -> String {
        let mut stream = String::new();
        for command in &page.commands {
            match command {
                DrawCommand::Rect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => {
                    let pdf_y = page.height - y - height;
                    let _ = writeln!(
                        stream,
                        "q {} rg {:.2} {:.2} {:.2} {:.2} re f Q",
                        Self::color_operands(color),
                        x,
                        pdf_y,
                        width,
                        height
                    );
                }
                DrawCommand::Text {
                    x,
                    baseline,
                    text,
                    font,
                    size,
                    color,
                } => {
                    let pdf_y = page.height - baseline;
                    let _ = writeln!(
                        stream,
                        "BT /F{} {:.1} Tf {} rg {:.2} {:.2} Td ({}) Tj ET",
                        builder.font_index(font),
                        size,
                        Self::color_operands(color),
                        x,
                        pdf_y,
                        Self::encode_text(text)
                    );
                }
            }
        }
        stream
    }

    fn color_operands(color: &Color) -> String {
        format!("{:.3} {:.3} {:.3}", color.r, color.g, color.b)
    }

    /// Register the standard fonts used across all pages, in a stable
    /// order. At least Helvetica is always present.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        let mut fonts: Vec<StandardFont> = pages
            .iter()
            .flat_map(|p| &p.commands)
            .filter_map(|c| match c {
                DrawCommand::Text { font, .. } => {
                    Some(StandardFont::from_name(font).unwrap_or(StandardFont::Helvetica))
                }
                DrawCommand::Rect { .. } => None,
            })
            .collect();
        fonts.sort();
        fonts.dedup();
        if fonts.is_empty() {
            fonts.push(StandardFont::Helvetica);
        }

        for font in fonts {
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            let obj_id = builder.push(font_dict.into_bytes());
            builder.font_objects.push((font, obj_id));
        }
    }

    fn build_font_resource_dict(&self, font_objects: &[(StandardFont, usize)]) -> String {
        font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Encode text as the body of a PDF literal string in WinAnsi.
    /// Characters outside WinAnsi become `?`.
    fn encode_text(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            let b = Self::unicode_to_winansi(ch).unwrap_or(b'?');
            match b {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                0x20..=0x7E => out.push(b as char),
                _ => {
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte value.
    ///
    /// WinAnsiEncoding is Windows-1252: Latin-1 plus typographic
    /// punctuation in 0x80-0x9F.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match cp {
            0x20AC => Some(0x80),
            0x201A => Some(0x82),
            0x0192 => Some(0x83),
            0x201E => Some(0x84),
            0x2026 => Some(0x85),
            0x2020 => Some(0x86),
            0x2021 => Some(0x87),
            0x02C6 => Some(0x88),
            0x2030 => Some(0x89),
            0x0160 => Some(0x8A),
            0x2039 => Some(0x8B),
            0x0152 => Some(0x8C),
            0x017D => Some(0x8E),
            0x2018 => Some(0x91),
            0x2019 => Some(0x92),
            0x201C => Some(0x93),
            0x201D => Some(0x94),
            0x2022 => Some(0x95),
            0x2013 => Some(0x96),
            0x2014 => Some(0x97),
            0x02DC => Some(0x98),
            0x2122 => Some(0x99),
            0x0161 => Some(0x9A),
            0x203A => Some(0x9B),
            0x0153 => Some(0x9C),
            0x017E => Some(0x9E),
            0x0178 => Some(0x9F),
            _ => None,
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, data) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miniz_oxide::inflate::decompress_to_vec_zlib;

    fn page(commands: Vec<DrawCommand>) -> LayoutPage {
        LayoutPage {
            width: 612.0,
            height: 792.0,
            commands,
        }
    }

    fn text(s: &str, font: &str) -> DrawCommand {
        DrawCommand::Text {
            x: 30.0,
            baseline: 40.0,
            text: s.to_string(),
            font: font.to_string(),
            size: 10.0,
            color: Color::WHITE,
        }
    }

    /// Inflate every content stream in the file.
    fn content_streams(pdf: &[u8]) -> Vec<String> {
        let mut out = Vec::new();
        let mut rest = pdf;
        while let Some(start) = find(rest, b"stream\n") {
            let body = &rest[start + 7..];
            let end = find(body, b"\nendstream").unwrap();
            let inflated = decompress_to_vec_zlib(&body[..end]).unwrap();
            out.push(String::from_utf8_lossy(&inflated).into_owned());
            rest = &body[end + b"\nendstream".len()..];
        }
        out
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    #[test]
    fn test_encode_text() {
        assert_eq!(PdfWriter::encode_text("Hello (World)"), "Hello \\(World\\)");
        assert_eq!(PdfWriter::encode_text("back\\slash"), "back\\\\slash");
        assert_eq!(PdfWriter::encode_text("café"), "caf\\351");
        assert_eq!(PdfWriter::encode_text("\u{2588}\u{4e2d}"), "??");
    }

    #[test]
    fn test_empty_document_produces_valid_pdf() {
        let bytes = PdfWriter::new().write(&[page(vec![])], &Metadata::default());
        assert!(bytes.starts_with(b"%PDF-1.7"));
        assert!(find(&bytes, b"%%EOF").is_some());
        assert!(find(&bytes, b"xref").is_some());
        assert!(find(&bytes, b"trailer").is_some());
        assert!(find(&bytes, b"/BaseFont /Helvetica").is_some());
    }

    #[test]
    fn test_metadata_in_pdf() {
        let metadata = Metadata {
            title: Some("Project Listing".to_string()),
            author: Some("Build Bot".to_string()),
            subject: None,
            creator: None,
        };
        let bytes = PdfWriter::new().write(&[page(vec![])], &metadata);
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Title (Project Listing)"));
        assert!(text.contains("/Author (Build Bot)"));
        assert!(text.contains("/Creator (codepress)"));
    }

    #[test]
    fn test_fonts_registered_once_each() {
        let pages = vec![
            page(vec![text("a", "Courier"), text("b", "Helvetica-Bold")]),
            page(vec![text("c", "Courier")]),
        ];
        let bytes = PdfWriter::new().write(&pages, &Metadata::default());
        let text = String::from_utf8_lossy(&bytes);
        assert_eq!(text.matches("/BaseFont /Courier ").count(), 1);
        assert_eq!(text.matches("/BaseFont /Helvetica-Bold ").count(), 1);
        assert_eq!(text.matches("/Type /Page ").count(), 2);
        assert!(text.contains("/Count 2"));
    }

    #[test]
    fn test_content_stream_flips_y() {
        let pages = vec![page(vec![
            DrawCommand::Rect {
                x: 25.0,
                y: 95.0,
                width: 100.0,
                height: 44.0,
                color: Color::BLACK,
            },
            text("x = 1", "Courier"),
        ])];
        let bytes = PdfWriter::new().write(&pages, &Metadata::default());
        let streams = content_streams(&bytes);
        assert_eq!(streams.len(), 1);
        assert!(streams[0].contains("q 0.000 0.000 0.000 rg 25.00 653.00 100.00 44.00 re f Q"));
        assert!(streams[0].contains("BT /F0 10.0 Tf 1.000 1.000 1.000 rg 30.00 752.00 Td (x = 1) Tj ET"));
    }
}
