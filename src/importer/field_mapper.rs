// ==========================================
// 化工设备报表系统 - 字段映射器实现
// ==========================================
// 职责: 源列 → 设备草稿 + 数值转换
// 必需列: Equipment Name, Type, Flowrate, Pressure, Temperature
// ==========================================

use crate::domain::equipment::{
    EquipmentDraft, COL_EQUIPMENT_NAME, COL_FLOWRATE, COL_PRESSURE, COL_TEMPERATURE, COL_TYPE,
    REQUIRED_COLUMNS,
};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::{FieldMapper, RawRow};

#[derive(Debug, Clone, Copy, Default)]
pub struct EquipmentFieldMapper;

impl FieldMapper for EquipmentFieldMapper {
    fn check_columns(&self, headers: &[String]) -> ImportResult<()> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|col| !headers.iter().any(|h| h.as_str() == **col))
            .map(|col| col.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ImportError::MissingColumns { columns: missing })
        }
    }

    fn map_row(&self, row: &RawRow) -> ImportResult<EquipmentDraft> {
        Ok(EquipmentDraft {
            equipment_name: self.get_text(row, COL_EQUIPMENT_NAME)?,
            equipment_type: self.get_text(row, COL_TYPE)?,
            flowrate: self.parse_f64(row, COL_FLOWRATE)?,
            pressure: self.parse_f64(row, COL_PRESSURE)?,
            temperature: self.parse_f64(row, COL_TEMPERATURE)?,
            row_number: row.row_number,
        })
    }
}

impl EquipmentFieldMapper {
    /// 提取必填文本字段（空值视为缺失）
    fn get_text(&self, row: &RawRow, key: &str) -> ImportResult<String> {
        match row.values.get(key).map(|v| v.trim()) {
            Some(v) if !v.is_empty() => Ok(v.to_string()),
            _ => Err(ImportError::MissingValue {
                row: row.row_number,
                field: key.to_string(),
            }),
        }
    }

    /// 解析测量值（必须是有限实数）
    fn parse_f64(&self, row: &RawRow, key: &str) -> ImportResult<f64> {
        let raw = self.get_text(row, key)?;
        let value = raw
            .parse::<f64>()
            .map_err(|_| ImportError::TypeConversionError {
                row: row.row_number,
                field: key.to_string(),
                value: raw.clone(),
            })?;

        if !value.is_finite() {
            return Err(ImportError::NonFiniteValue {
                row: row.row_number,
                field: key.to_string(),
                value: raw,
            });
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::importer_trait::RawTable;
    use std::collections::HashMap;

    fn headers() -> Vec<String> {
        REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    fn row(values: &[(&str, &str)]) -> RawRow {
        RawRow {
            row_number: 1,
            values: values
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        }
    }

    fn full_row(flowrate: &str) -> RawRow {
        row(&[
            ("Equipment Name", "P-100"),
            ("Type", "Pump"),
            ("Flowrate", flowrate),
            ("Pressure", "3.0"),
            ("Temperature", "70"),
        ])
    }

    #[test]
    fn test_field_mapper_basic() {
        let draft = EquipmentFieldMapper.map_row(&full_row("12.5")).unwrap();

        assert_eq!(draft.equipment_name, "P-100");
        assert_eq!(draft.equipment_type, "Pump");
        assert_eq!(draft.flowrate, 12.5);
        assert_eq!(draft.pressure, 3.0);
        assert_eq!(draft.temperature, 70.0);
        assert_eq!(draft.row_number, 1);
    }

    #[test]
    fn test_field_mapper_accepts_any_column_order() {
        let mut shuffled = headers();
        shuffled.reverse();
        shuffled.push("Location".to_string());
        assert!(EquipmentFieldMapper.check_columns(&shuffled).is_ok());
    }

    #[test]
    fn test_field_mapper_missing_column() {
        let partial: Vec<String> = headers().into_iter().filter(|h| h != "Pressure").collect();
        match EquipmentFieldMapper.check_columns(&partial) {
            Err(ImportError::MissingColumns { columns }) => {
                assert_eq!(columns, vec!["Pressure".to_string()]);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_field_mapper_header_case_sensitive() {
        let lower: Vec<String> = headers().iter().map(|h| h.to_lowercase()).collect();
        match EquipmentFieldMapper.check_columns(&lower) {
            Err(ImportError::MissingColumns { columns }) => assert_eq!(columns.len(), 5),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_field_mapper_invalid_number() {
        let err = EquipmentFieldMapper.map_row(&full_row("fast")).unwrap_err();
        match err {
            ImportError::TypeConversionError { row, field, value } => {
                assert_eq!(row, 1);
                assert_eq!(field, "Flowrate");
                assert_eq!(value, "fast");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_field_mapper_rejects_nan() {
        let err = EquipmentFieldMapper.map_row(&full_row("NaN")).unwrap_err();
        assert!(matches!(err, ImportError::NonFiniteValue { .. }));
    }

    #[test]
    fn test_field_mapper_empty_measurement() {
        let err = EquipmentFieldMapper.map_row(&full_row("")).unwrap_err();
        assert!(matches!(err, ImportError::MissingValue { .. }));
    }

    #[test]
    fn test_field_mapper_short_row() {
        let short = row(&[("Equipment Name", "P-100"), ("Type", "Pump")]);
        let err = EquipmentFieldMapper.map_row(&short).unwrap_err();
        assert!(matches!(err, ImportError::MissingValue { ref field, .. } if field == "Flowrate"));
    }

    #[test]
    fn test_map_table_fails_whole_table() {
        let mut second = full_row("oops");
        second.row_number = 2;
        let table = RawTable {
            headers: headers(),
            rows: vec![full_row("1.0"), second],
        };
        let err = EquipmentFieldMapper.map_table(&table).unwrap_err();
        assert!(matches!(err, ImportError::TypeConversionError { row: 2, .. }));
    }

    #[test]
    fn test_map_table_preserves_order() {
        let mut rows = Vec::new();
        for (idx, name) in ["B", "A", "C"].iter().enumerate() {
            let mut r = full_row("1.0");
            r.row_number = idx + 1;
            r.values.insert("Equipment Name".to_string(), name.to_string());
            rows.push(r);
        }
        let table = RawTable {
            headers: headers(),
            rows,
        };
        let drafts = EquipmentFieldMapper.map_table(&table).unwrap();
        let names: Vec<&str> = drafts.iter().map(|d| d.equipment_name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }
}
