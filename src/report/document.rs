// ==========================================
// 化工设备报表系统 - 报表文档模型
// ==========================================
// 职责: 与渲染引擎无关的文档结构（标题/元数据/标题行/表格/提示）
// 说明: 表格内容在内存中完整构建，由 Renderer 负责分页与输出
// ==========================================

use chrono::NaiveDateTime;

/// RGB 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// 由 0xRRGGBB 构造
    pub const fn hex(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE_SMOKE: Color = Color::hex(0xF5F5F5);
    pub const GRAY: Color = Color::hex(0x808080);
}

/// 表格样式（表头行 + 数据行 + 网格线）
#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    pub header_background: Color,
    pub header_text: Color,
    pub body_background: Color,
    pub body_text: Color,
    pub grid_color: Color,
    pub grid_width: f32,
    pub font_size: f32,
    pub header_bottom_padding: f32,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            header_background: Color::GRAY,
            header_text: Color::WHITE_SMOKE,
            body_background: Color::WHITE_SMOKE,
            body_text: Color::BLACK,
            grid_color: Color::GRAY,
            grid_width: 0.5,
            font_size: 10.0,
            header_bottom_padding: 10.0,
        }
    }
}

/// 表格（第一行为表头）
#[derive(Debug, Clone, PartialEq)]
pub struct TableModel {
    pub column_widths: Vec<f32>,
    pub rows: Vec<Vec<String>>,
    pub style: TableStyle,
}

impl TableModel {
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(|r| r.as_slice())
    }

    /// 数据行（不含表头）
    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    pub fn width(&self) -> f32 {
        self.column_widths.iter().sum()
    }
}

/// 元数据字段（标签加粗）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaField {
    pub label: String,
    pub value: String,
}

impl MetaField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// 文档块
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Meta(Vec<MetaField>),
    Heading(String),
    Table(TableModel),
    Notice(String),
    Spacer(f32),
}

/// 报表文档
#[derive(Debug, Clone, PartialEq)]
pub struct ReportDocument {
    pub title: String,
    pub created_at: NaiveDateTime,
    pub blocks: Vec<Block>,
}

impl ReportDocument {
    pub fn tables(&self) -> impl Iterator<Item = &TableModel> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    pub fn notices(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Notice(n) => Some(n.as_str()),
            _ => None,
        })
    }
}
