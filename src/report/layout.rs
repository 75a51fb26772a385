// ==========================================
// 化工设备报表系统 - 分页排版
// ==========================================
// 职责: ReportDocument → 逐页绘制指令
// 约束:
// - US Letter (612 x 792 pt)，四边 72pt 边距
// - 表格跨页时在新页重复表头
// - 页脚 "Page i of n" 在全部分页完成后补写
// 坐标: PDF 坐标系，原点在页面左下角
// ==========================================

use crate::report::document::{Block, Color, MetaField, ReportDocument, TableModel};
use crate::report::metrics::{fit_text, text_width, Font};
use crate::report::renderer::{RenderError, RenderResult};

const TITLE_SIZE: f32 = 18.0;
const TITLE_LEADING: f32 = 22.0;
const TITLE_SPACE_AFTER: f32 = 20.0;
const TITLE_COLOR: Color = Color::hex(0x0F172A);

const HEADING_SIZE: f32 = 14.0;
const HEADING_LEADING: f32 = 18.0;
const HEADING_SPACE_BEFORE: f32 = 12.0;
const HEADING_SPACE_AFTER: f32 = 6.0;
/// 标题后至少保留的高度，避免标题孤立在页底
const HEADING_KEEP_WITH_NEXT: f32 = 60.0;

const BODY_SIZE: f32 = 10.0;
const BODY_LEADING: f32 = 12.0;

const CELL_PADDING: f32 = 3.0;

const FOOTER_SIZE: f32 = 8.0;

/// 页面几何
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            margin: 72.0,
        }
    }
}

impl PageGeometry {
    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn top(&self) -> f32 {
        self.height - self.margin
    }

    pub fn bottom(&self) -> f32 {
        self.margin
    }
}

/// 绘制指令
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    FillRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
    },
    StrokeRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Color,
        line_width: f32,
    },
    Text {
        x: f32,
        y: f32,
        size: f32,
        font: Font,
        color: Color,
        text: String,
    },
}

/// 单页
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
}

impl Page {
    /// 页内全部文本（按绘制顺序）
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

pub fn footer_text(page_number: usize, page_count: usize) -> String {
    format!("Page {} of {}", page_number, page_count)
}

/// 排版整份文档
pub fn layout_document(document: &ReportDocument, geometry: &PageGeometry) -> RenderResult<Vec<Page>> {
    let mut cursor = Cursor::new(*geometry);

    for block in &document.blocks {
        match block {
            Block::Title(text) => cursor.title(text),
            Block::Meta(fields) => cursor.meta(fields),
            Block::Heading(text) => cursor.heading(text),
            Block::Table(table) => cursor.table(table)?,
            Block::Notice(text) => cursor.paragraph(text, BODY_SIZE, BODY_LEADING, Color::BLACK),
            Block::Spacer(h) => cursor.skip(*h),
        }
    }

    let mut pages = cursor.finish();
    add_footers(&mut pages, geometry);
    Ok(pages)
}

fn add_footers(pages: &mut [Page], geometry: &PageGeometry) {
    let count = pages.len();
    for (i, page) in pages.iter_mut().enumerate() {
        let text = footer_text(i + 1, count);
        let w = text_width(&text, FOOTER_SIZE, Font::Regular);
        page.ops.push(DrawOp::Text {
            x: (geometry.width - w) / 2.0,
            y: geometry.margin / 2.0,
            size: FOOTER_SIZE,
            font: Font::Regular,
            color: Color::GRAY,
            text,
        });
    }
}

struct Cursor {
    geometry: PageGeometry,
    pages: Vec<Page>,
    current: Page,
    y: f32,
}

impl Cursor {
    fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            pages: Vec::new(),
            current: Page::default(),
            y: geometry.top(),
        }
    }

    fn new_page(&mut self) {
        let done = std::mem::take(&mut self.current);
        self.pages.push(done);
        self.y = self.geometry.top();
    }

    fn remaining(&self) -> f32 {
        self.y - self.geometry.bottom()
    }

    fn ensure(&mut self, height: f32) {
        if height > self.remaining() && self.y < self.geometry.top() {
            self.new_page();
        }
    }

    fn skip(&mut self, h: f32) {
        // 间距不跨页延续
        self.y = (self.y - h).max(self.geometry.bottom());
    }

    fn finish(mut self) -> Vec<Page> {
        self.pages.push(self.current);
        self.pages
    }

    fn text(&mut self, x: f32, baseline: f32, size: f32, font: Font, color: Color, text: String) {
        self.current.ops.push(DrawOp::Text {
            x,
            y: baseline,
            size,
            font,
            color,
            text,
        });
    }

    fn title(&mut self, text: &str) {
        self.ensure(TITLE_LEADING);
        let w = text_width(text, TITLE_SIZE, Font::Bold);
        let x = self.geometry.margin + (self.geometry.content_width() - w).max(0.0) / 2.0;
        let baseline = self.y - TITLE_SIZE;
        self.text(x, baseline, TITLE_SIZE, Font::Bold, TITLE_COLOR, text.to_string());
        self.y -= TITLE_LEADING;
        self.skip(TITLE_SPACE_AFTER);
    }

    /// 元数据行: 字段以 " | " 分隔，超出内容宽度时换行，单个字段过长时截断取值
    fn meta(&mut self, fields: &[MetaField]) {
        const SEP: &str = " | ";
        let left = self.geometry.margin;
        let right = self.geometry.margin + self.geometry.content_width();
        let sep_width = text_width(SEP, BODY_SIZE, Font::Regular);

        self.ensure(BODY_LEADING);
        let mut baseline = self.y - BODY_SIZE;
        let mut x = left;
        for field in fields {
            let label = format!("{} ", field.label);
            let label_width = text_width(&label, BODY_SIZE, Font::Bold);
            let field_width = label_width + text_width(&field.value, BODY_SIZE, Font::Regular);

            if x > left && x + sep_width + field_width > right {
                self.y -= BODY_LEADING;
                self.ensure(BODY_LEADING);
                baseline = self.y - BODY_SIZE;
                x = left;
            }
            if x > left {
                self.text(x, baseline, BODY_SIZE, Font::Regular, Color::GRAY, SEP.to_string());
                x += sep_width;
            }

            self.text(x, baseline, BODY_SIZE, Font::Bold, Color::GRAY, label);
            x += label_width;
            let value = fit_text(&field.value, (right - x).max(0.0), BODY_SIZE, Font::Regular);
            let value_width = text_width(&value, BODY_SIZE, Font::Regular);
            self.text(x, baseline, BODY_SIZE, Font::Regular, Color::GRAY, value);
            x += value_width;
        }
        self.y -= BODY_LEADING;
    }

    fn heading(&mut self, text: &str) {
        self.skip(HEADING_SPACE_BEFORE);
        self.ensure(HEADING_LEADING + HEADING_SPACE_AFTER + HEADING_KEEP_WITH_NEXT);
        let baseline = self.y - HEADING_SIZE;
        self.text(
            self.geometry.margin,
            baseline,
            HEADING_SIZE,
            Font::Bold,
            Color::BLACK,
            text.to_string(),
        );
        self.y -= HEADING_LEADING;
        self.skip(HEADING_SPACE_AFTER);
    }

    fn paragraph(&mut self, text: &str, size: f32, leading: f32, color: Color) {
        self.ensure(leading);
        let baseline = self.y - size;
        let fitted = fit_text(text, self.geometry.content_width(), size, Font::Regular);
        self.text(self.geometry.margin, baseline, size, Font::Regular, color, fitted);
        self.y -= leading;
    }

    fn table(&mut self, table: &TableModel) -> RenderResult<()> {
        let columns = table.column_widths.len();
        if let Some(bad) = table.rows.iter().position(|r| r.len() != columns) {
            return Err(RenderError::Layout(format!(
                "表格第 {} 行有 {} 列，列宽定义为 {} 列",
                bad,
                table.rows[bad].len(),
                columns
            )));
        }
        let Some(header) = table.header() else {
            return Ok(());
        };

        let style = &table.style;
        let row_height = style.font_size * 1.2 + 2.0 * CELL_PADDING;
        let header_height = row_height + style.header_bottom_padding;
        let usable = self.geometry.top() - self.geometry.bottom();
        if header_height + row_height > usable {
            return Err(RenderError::Layout("表格行高超过页面可用高度".to_string()));
        }

        let x0 = self.geometry.margin + (self.geometry.content_width() - table.width()) / 2.0;

        // 表头至少与首行数据同页
        let first_block = header_height + if table.body().is_empty() { 0.0 } else { row_height };
        self.ensure(first_block);
        self.table_row(table, header, x0, header_height, true);

        for row in table.body() {
            if row_height > self.remaining() {
                self.new_page();
                self.table_row(table, header, x0, header_height, true);
            }
            self.table_row(table, row, x0, row_height, false);
        }
        Ok(())
    }

    fn table_row(&mut self, table: &TableModel, cells: &[String], x0: f32, height: f32, is_header: bool) {
        let style = &table.style;
        let (background, color, font) = if is_header {
            (style.header_background, style.header_text, Font::Bold)
        } else {
            (style.body_background, style.body_text, Font::Regular)
        };
        let y = self.y - height;

        self.current.ops.push(DrawOp::FillRect {
            x: x0,
            y,
            w: table.width(),
            h: height,
            color: background,
        });

        let bottom_pad = if is_header { style.header_bottom_padding } else { 0.0 };
        let baseline = y + bottom_pad + CELL_PADDING + style.font_size * 0.25;
        let mut x = x0;
        for (cell, width) in cells.iter().zip(&table.column_widths) {
            self.current.ops.push(DrawOp::StrokeRect {
                x,
                y,
                w: *width,
                h: height,
                color: style.grid_color,
                line_width: style.grid_width,
            });
            let fitted = fit_text(cell, width - 2.0 * CELL_PADDING, style.font_size, font);
            let tw = text_width(&fitted, style.font_size, font);
            self.text(x + (width - tw) / 2.0, baseline, style.font_size, font, color, fitted);
            x += width;
        }

        self.y = y;
    }
}
