// ==========================================
// 化工设备报表系统 - 文件解析器实现
// ==========================================
// 支持: 带表头的分隔文本（CSV）
// 规则: 表头去除首尾空白；完全空白的行跳过；忽略 UTF-8 BOM
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{FileParser, RawRow, RawTable};
use csv::ReaderBuilder;
use std::collections::HashMap;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ==========================================
// CSV Parser 实现
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct CsvParser {
    delimiter: u8,
}

impl Default for CsvParser {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用其他分隔符（如 ';' 或 '\t'）
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }
}

impl FileParser for CsvParser {
    fn parse(&self, content: &[u8]) -> ImportResult<RawTable> {
        let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
        if content.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ImportError::EmptyFile);
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .flexible(true) // 允许行长度不一致，缺失字段在映射阶段报错
            .from_reader(content);

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        // 读取所有行
        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let mut values = HashMap::new();

            for (col_idx, value) in record.iter().enumerate() {
                if let Some(header) = headers.get(col_idx) {
                    // 重复表头以第一列为准
                    values
                        .entry(header.clone())
                        .or_insert_with(|| value.trim().to_string());
                }
            }

            // 跳过完全空白的行
            if values.values().all(|v: &String| v.is_empty()) {
                continue;
            }

            rows.push(RawRow {
                row_number: row_idx + 1,
                values,
            });
        }

        Ok(RawTable { headers, rows })
    }
}
