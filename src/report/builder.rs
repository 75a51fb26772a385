// ==========================================
// 化工设备报表系统 - 报表内容构建
// ==========================================
// 职责: (统计, 记录样本, 请求者, 时间) → 报表文档
// 约束:
// - 纯函数，无状态，不访问数据库
// - 批次缺失/无权访问时文档照常生成，正文替换为提示
// - 明细表最多 DEFAULT_DETAIL_LIMIT 条
// ==========================================

use crate::domain::equipment::EquipmentRecord;
use crate::domain::summary::Summary;
use crate::report::document::{Block, Color, MetaField, ReportDocument, TableModel, TableStyle};
use crate::report::format::{format_average, format_measurement, format_render_time};
use chrono::NaiveDateTime;

/// 明细表默认条数上限
pub const DEFAULT_DETAIL_LIMIT: usize = 50;

pub const REPORT_TITLE: &str = "Chemical Equipment Report";
pub const SUMMARY_HEADING: &str = "Summary Statistics";
pub const NOT_FOUND_NOTICE: &str = "Upload not found or access denied.";

pub const SUMMARY_HEADER: [&str; 2] = ["Metric", "Value"];
pub const DETAIL_HEADER: [&str; 5] = ["Name", "Type", "Flowrate", "Pressure", "Temperature"];

const SUMMARY_COLUMN_WIDTHS: [f32; 2] = [250.0, 200.0];
const DETAIL_COLUMN_WIDTHS: [f32; 5] = [140.0, 120.0, 80.0, 80.0, 80.0];

/// 报表正文
#[derive(Debug, Clone)]
pub enum ReportContent<'a> {
    /// 批次存在且属于请求者
    Found {
        summary: &'a Summary,
        records: &'a [EquipmentRecord],
    },
    /// 批次不存在或不属于请求者（两者不加区分）
    NotFoundOrDenied,
}

/// 构建报表所需的全部输入
#[derive(Debug, Clone)]
pub struct ReportInput<'a> {
    pub batch_id: &'a str,
    pub requester_name: &'a str,
    pub rendered_at: NaiveDateTime,
    pub content: ReportContent<'a>,
}

#[derive(Debug, Clone)]
pub struct ReportBuilder {
    title: String,
    detail_limit: usize,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self {
            title: REPORT_TITLE.to_string(),
            detail_limit: DEFAULT_DETAIL_LIMIT,
        }
    }
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_detail_limit(mut self, limit: usize) -> Self {
        self.detail_limit = limit;
        self
    }

    pub fn detail_limit(&self) -> usize {
        self.detail_limit
    }

    pub fn build(&self, input: &ReportInput<'_>) -> ReportDocument {
        let mut blocks = vec![
            Block::Title(self.title.clone()),
            Block::Spacer(10.0),
            Block::Meta(vec![
                MetaField::new("Upload ID:", input.batch_id),
                MetaField::new("User:", input.requester_name),
                MetaField::new("Date:", format_render_time(&input.rendered_at)),
            ]),
            Block::Spacer(20.0),
        ];

        match &input.content {
            ReportContent::Found { summary, records } => {
                blocks.push(Block::Heading(SUMMARY_HEADING.to_string()));
                blocks.push(Block::Table(summary_table(summary)));
                blocks.push(Block::Spacer(25.0));
                blocks.push(Block::Heading(format!(
                    "Equipment Details (Top {})",
                    self.detail_limit
                )));
                blocks.push(Block::Table(detail_table(records, self.detail_limit)));
            }
            ReportContent::NotFoundOrDenied => {
                blocks.push(Block::Notice(NOT_FOUND_NOTICE.to_string()));
            }
        }

        ReportDocument {
            title: self.title.clone(),
            created_at: input.rendered_at,
            blocks,
        }
    }
}

fn header_row(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

/// 汇总表: Total Records + 三项均值
pub fn summary_table(summary: &Summary) -> TableModel {
    let averages = &summary.averages;
    TableModel {
        column_widths: SUMMARY_COLUMN_WIDTHS.to_vec(),
        rows: vec![
            header_row(&SUMMARY_HEADER),
            vec!["Total Records".to_string(), summary.total_count.to_string()],
            vec!["Average Flowrate".to_string(), format_average(averages.avg_flowrate)],
            vec!["Average Pressure".to_string(), format_average(averages.avg_pressure)],
            vec!["Average Temperature".to_string(), format_average(averages.avg_temperature)],
        ],
        style: TableStyle {
            header_background: Color::hex(0x0EA5E9),
            header_text: Color::WHITE_SMOKE,
            body_background: Color::hex(0xF0F9FF),
            body_text: Color::BLACK,
            grid_color: Color::hex(0xBAE6FD),
            grid_width: 1.0,
            font_size: 10.0,
            header_bottom_padding: 10.0,
        },
    }
}

/// 明细表: 最多 limit 条记录，按存储顺序
pub fn detail_table(records: &[EquipmentRecord], limit: usize) -> TableModel {
    let mut rows = vec![header_row(&DETAIL_HEADER)];
    rows.extend(records.iter().take(limit).map(|r| {
        vec![
            r.equipment_name.clone(),
            r.equipment_type.clone(),
            format_measurement(r.flowrate),
            format_measurement(r.pressure),
            format_measurement(r.temperature),
        ]
    }));

    TableModel {
        column_widths: DETAIL_COLUMN_WIDTHS.to_vec(),
        rows,
        style: TableStyle {
            header_background: Color::hex(0x334155),
            header_text: Color::WHITE_SMOKE,
            body_background: Color::WHITE_SMOKE,
            body_text: Color::BLACK,
            grid_color: Color::GRAY,
            grid_width: 0.5,
            font_size: 8.0,
            header_bottom_padding: 10.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SummaryEngine;
    use chrono::NaiveDate;

    fn rendered_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 17)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn records(n: usize) -> Vec<EquipmentRecord> {
        (0..n)
            .map(|i| EquipmentRecord {
                id: i as i64 + 1,
                batch_id: "b1".to_string(),
                equipment_name: format!("E-{}", i),
                equipment_type: "Pump".to_string(),
                flowrate: 10.0,
                pressure: 2.5,
                temperature: 70.0,
            })
            .collect()
    }

    fn meta_values(doc: &ReportDocument) -> Vec<String> {
        doc.blocks
            .iter()
            .find_map(|b| match b {
                Block::Meta(fields) => Some(fields.iter().map(|f| f.value.clone()).collect()),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_found_report_layout() {
        let recs = records(3);
        let summary = SummaryEngine::new().summarize("b1", &recs);
        let input = ReportInput {
            batch_id: "b1",
            requester_name: "alice",
            rendered_at: rendered_at(),
            content: ReportContent::Found {
                summary: &summary,
                records: &recs,
            },
        };

        let doc = ReportBuilder::new().build(&input);

        assert!(matches!(&doc.blocks[0], Block::Title(t) if t == REPORT_TITLE));
        assert_eq!(meta_values(&doc), vec!["b1", "alice", "2026-10-17 09:30"]);

        let tables: Vec<&TableModel> = doc.tables().collect();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].rows[1], vec!["Total Records", "3"]);
        assert_eq!(tables[0].rows[2], vec!["Average Flowrate", "10.00"]);
        assert_eq!(tables[1].rows[1], vec!["E-0", "Pump", "10.0", "2.5", "70.0"]);
        assert_eq!(doc.notices().count(), 0);
    }

    #[test]
    fn test_empty_batch_report() {
        let summary = SummaryEngine::new().summarize("b1", &[]);
        let input = ReportInput {
            batch_id: "b1",
            requester_name: "alice",
            rendered_at: rendered_at(),
            content: ReportContent::Found {
                summary: &summary,
                records: &[],
            },
        };

        let doc = ReportBuilder::new().build(&input);
        let tables: Vec<&TableModel> = doc.tables().collect();

        assert_eq!(
            tables[0].body().to_vec(),
            vec![
                vec!["Total Records".to_string(), "0".to_string()],
                vec!["Average Flowrate".to_string(), "0".to_string()],
                vec!["Average Pressure".to_string(), "0".to_string()],
                vec!["Average Temperature".to_string(), "0".to_string()],
            ]
        );
        assert_eq!(tables[1].rows.len(), 1);
        assert_eq!(tables[1].header().unwrap().len(), 5);
    }

    #[test]
    fn test_detail_table_capped() {
        let recs = records(80);
        let summary = SummaryEngine::new().summarize("b1", &recs);
        let input = ReportInput {
            batch_id: "b1",
            requester_name: "alice",
            rendered_at: rendered_at(),
            content: ReportContent::Found {
                summary: &summary,
                records: &recs,
            },
        };

        let doc = ReportBuilder::new().build(&input);
        let detail = doc.tables().nth(1).unwrap();

        assert_eq!(detail.body().len(), DEFAULT_DETAIL_LIMIT);
        assert_eq!(detail.body()[0][0], "E-0");
        assert_eq!(detail.body()[49][0], "E-49");
        // 汇总表仍统计全部记录
        assert_eq!(doc.tables().next().unwrap().rows[1][1], "80");
    }

    #[test]
    fn test_not_found_report_has_notice_only() {
        let input = ReportInput {
            batch_id: "missing",
            requester_name: "bob",
            rendered_at: rendered_at(),
            content: ReportContent::NotFoundOrDenied,
        };

        let doc = ReportBuilder::new().build(&input);

        assert_eq!(doc.tables().count(), 0);
        assert_eq!(doc.notices().collect::<Vec<_>>(), vec![NOT_FOUND_NOTICE]);
        assert_eq!(meta_values(&doc)[0], "missing");
    }

    #[test]
    fn test_custom_title_and_limit() {
        let recs = records(5);
        let summary = SummaryEngine::new().summarize("b1", &recs);
        let input = ReportInput {
            batch_id: "b1",
            requester_name: "alice",
            rendered_at: rendered_at(),
            content: ReportContent::Found {
                summary: &summary,
                records: &recs,
            },
        };

        let doc = ReportBuilder::new()
            .with_title("Plant A")
            .with_detail_limit(2)
            .build(&input);

        assert_eq!(doc.title, "Plant A");
        assert_eq!(doc.tables().nth(1).unwrap().body().len(), 2);
        assert!(doc
            .blocks
            .iter()
            .any(|b| matches!(b, Block::Heading(h) if h == "Equipment Details (Top 2)")));
    }
}
