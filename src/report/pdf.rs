// ==========================================
// 化工设备报表系统 - PDF 渲染器
// ==========================================
// 职责: 排版结果 → PDF 1.4 字节流
// 对象编号:
// - 1 Catalog / 2 Pages / 3 Helvetica / 4 Helvetica-Bold / 5 Info
// - 第 i 页: Page 对象 6+2i，内容流 7+2i
// 编码: WinAnsiEncoding；Latin-1 以外字符输出为 '?'
// ==========================================

use crate::report::document::{Color, ReportDocument};
use crate::report::layout::{layout_document, DrawOp, Page, PageGeometry};
use crate::report::metrics::Font;
use crate::report::renderer::{RenderResult, Renderer};
use std::fmt::Write as _;
use std::io::{self, Write};
use tracing::debug;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";

const FIRST_PAGE_OBJECT: usize = 6;
const PRODUCER: &str = "equipment-report";

#[derive(Debug, Clone, Default)]
pub struct PdfRenderer {
    geometry: PageGeometry,
}

impl PdfRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_geometry(geometry: PageGeometry) -> Self {
        Self { geometry }
    }
}

impl Renderer for PdfRenderer {
    fn content_type(&self) -> &'static str {
        PDF_CONTENT_TYPE
    }

    fn file_extension(&self) -> &'static str {
        "pdf"
    }

    fn render(&self, document: &ReportDocument, out: &mut dyn Write) -> RenderResult<()> {
        let pages = layout_document(document, &self.geometry)?;
        debug!(pages = pages.len(), "PDF 排版完成");

        let mut w = CountingWriter::new(out);
        let mut offsets: Vec<u64> = Vec::new();

        w.write_all(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n")?;

        let kids: Vec<String> = (0..pages.len())
            .map(|i| format!("{} 0 R", page_object(i)))
            .collect();

        write_object(
            &mut w,
            &mut offsets,
            1,
            "<< /Type /Catalog /Pages 2 0 R >>",
        )?;
        write_object(
            &mut w,
            &mut offsets,
            2,
            &format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                pages.len()
            ),
        )?;
        for (id, font) in [(3, Font::Regular), (4, Font::Bold)] {
            write_object(
                &mut w,
                &mut offsets,
                id,
                &format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    font.base_font()
                ),
            )?;
        }
        write_object(
            &mut w,
            &mut offsets,
            5,
            &format!(
                "<< /Title ({}) /Producer ({}) /CreationDate (D:{}) >>",
                escape_text(&document.title),
                PRODUCER,
                document.created_at.format("%Y%m%d%H%M%S")
            ),
        )?;

        for (i, page) in pages.iter().enumerate() {
            write_object(
                &mut w,
                &mut offsets,
                page_object(i),
                &format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                     /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
                    num(self.geometry.width),
                    num(self.geometry.height),
                    page_object(i) + 1
                ),
            )?;

            let stream = content_stream(page);
            offsets.push(w.position());
            write!(
                w,
                "{} 0 obj\n<< /Length {} >>\nstream\n",
                page_object(i) + 1,
                stream.len()
            )?;
            w.write_all(stream.as_bytes())?;
            w.write_all(b"\nendstream\nendobj\n")?;
        }

        let xref_offset = w.position();
        write!(w, "xref\n0 {}\n", offsets.len() + 1)?;
        w.write_all(b"0000000000 65535 f \n")?;
        for offset in &offsets {
            write!(w, "{:010} 00000 n \n", offset)?;
        }
        write!(
            w,
            "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{}\n%%EOF\n",
            offsets.len() + 1,
            xref_offset
        )?;
        w.flush()?;
        Ok(())
    }
}

fn page_object(index: usize) -> usize {
    FIRST_PAGE_OBJECT + 2 * index
}

fn write_object(
    w: &mut CountingWriter<'_>,
    offsets: &mut Vec<u64>,
    id: usize,
    body: &str,
) -> io::Result<()> {
    debug_assert_eq!(offsets.len() + 1, id);
    offsets.push(w.position());
    write!(w, "{} 0 obj\n{}\nendobj\n", id, body)
}

/// 单页内容流
fn content_stream(page: &Page) -> String {
    let mut s = String::new();
    for op in &page.ops {
        // 写入 String 不会失败
        let _ = match op {
            DrawOp::FillRect { x, y, w, h, color } => writeln!(
                s,
                "{} rg {} {} {} {} re f",
                rgb(*color),
                num(*x),
                num(*y),
                num(*w),
                num(*h)
            ),
            DrawOp::StrokeRect {
                x,
                y,
                w,
                h,
                color,
                line_width,
            } => writeln!(
                s,
                "{} RG {} w {} {} {} {} re S",
                rgb(*color),
                num(*line_width),
                num(*x),
                num(*y),
                num(*w),
                num(*h)
            ),
            DrawOp::Text {
                x,
                y,
                size,
                font,
                color,
                text,
            } => writeln!(
                s,
                "BT /{} {} Tf {} rg {} {} Td ({}) Tj ET",
                font.resource_name(),
                num(*size),
                rgb(*color),
                num(*x),
                num(*y),
                escape_text(text)
            ),
        };
    }
    s
}

fn rgb(color: Color) -> String {
    format!(
        "{} {} {}",
        num(color.r as f32 / 255.0),
        num(color.g as f32 / 255.0),
        num(color.b as f32 / 255.0)
    )
}

/// 数值输出：最多两位小数，去掉多余的 0
fn num(v: f32) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s.is_empty() || s == "-" || s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// PDF 字符串转义
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '\u{A0}'..='\u{FF}' => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            _ => out.push('?'),
        }
    }
    out
}

/// 记录已写字节数，用于 xref 偏移
struct CountingWriter<'a> {
    inner: &'a mut dyn Write,
    written: u64,
}

impl<'a> CountingWriter<'a> {
    fn new(inner: &'a mut dyn Write) -> Self {
        Self { inner, written: 0 }
    }

    fn position(&self) -> u64 {
        self.written
    }
}

impl Write for CountingWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::document::Block;
    use chrono::NaiveDate;

    fn notice_doc() -> ReportDocument {
        ReportDocument {
            title: "Chemical Equipment Report".to_string(),
            created_at: NaiveDate::from_ymd_opt(2026, 10, 17)
                .unwrap()
                .and_hms_opt(8, 15, 0)
                .unwrap(),
            blocks: vec![
                Block::Title("Chemical Equipment Report".to_string()),
                Block::Notice("Upload not found or access denied.".to_string()),
            ],
        }
    }

    fn render(doc: &ReportDocument) -> Vec<u8> {
        let mut buf = Vec::new();
        PdfRenderer::new().render(doc, &mut buf).unwrap();
        buf
    }

    #[test]
    fn test_pdf_envelope() {
        let bytes = render(&notice_doc());
        let text = String::from_utf8_lossy(&bytes);

        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(text.trim_end().ends_with("%%EOF"));
        assert!(text.contains("/Count 1"));
        assert!(text.contains("(Upload not found or access denied.) Tj"));
        assert!(text.contains("(Page 1 of 1) Tj"));
        assert!(text.contains("/CreationDate (D:20261017081500)"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let bytes = render(&notice_doc());
        let text = String::from_utf8_lossy(&bytes).into_owned();

        let startxref = text.rfind("startxref\n").unwrap();
        let xref_offset: usize = text[startxref + 10..]
            .lines()
            .next()
            .unwrap()
            .parse()
            .unwrap();
        assert!(bytes[xref_offset..].starts_with(b"xref"));

        let xref = String::from_utf8_lossy(&bytes[xref_offset..]).into_owned();
        let entries: Vec<usize> = xref
            .lines()
            .skip(3)
            .take_while(|l| l.ends_with(" n "))
            .map(|l| l[..10].parse().unwrap())
            .collect();
        // 5 个固定对象 + 1 页（Page + 内容流）
        assert_eq!(entries.len(), 7);
        for (i, offset) in entries.iter().enumerate() {
            let expected = format!("{} 0 obj", i + 1);
            assert!(bytes[*offset..].starts_with(expected.as_bytes()));
        }
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a(b)c\\"), "a\\(b\\)c\\\\");
        assert_eq!(escape_text("café"), "caf\\351");
        assert_eq!(escape_text("泵"), "?");
    }

    #[test]
    fn test_num_format() {
        assert_eq!(num(72.0), "72");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(10.126), "10.13");
        assert_eq!(num(0.0), "0");
        assert_eq!(num(-0.001), "0");
    }

    #[test]
    fn test_content_type() {
        let r = PdfRenderer::new();
        assert_eq!(r.content_type(), "application/pdf");
        assert_eq!(r.file_extension(), "pdf");
    }
}
