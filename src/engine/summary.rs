// ==========================================
// 化工设备报表系统 - 批次汇总统计引擎
// ==========================================
// 职责: 计算三项测量值均值与设备类型分布
// 约束:
// - 零条记录的均值为 None，不报告 0.0
// - 本层不做舍入（显示舍入由报表层负责）
// - 每个类型在分布中恰好出现一次，按类型名排序
// ==========================================

use crate::domain::equipment::EquipmentRecord;
use crate::domain::summary::{Averages, Summary, TypeCount};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryEngine;

impl SummaryEngine {
    pub fn new() -> Self {
        Self
    }

    /// 对某批次的全部记录做汇总
    pub fn summarize(&self, batch_id: &str, records: &[EquipmentRecord]) -> Summary {
        Summary {
            upload_id: batch_id.to_string(),
            total_count: records.len(),
            averages: self.averages(records),
            type_distribution: self.type_distribution(records),
        }
    }

    pub fn averages(&self, records: &[EquipmentRecord]) -> Averages {
        Averages {
            avg_flowrate: mean(records.iter().map(|r| r.flowrate)),
            avg_pressure: mean(records.iter().map(|r| r.pressure)),
            avg_temperature: mean(records.iter().map(|r| r.temperature)),
        }
    }

    pub fn type_distribution(&self, records: &[EquipmentRecord]) -> Vec<TypeCount> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in records {
            *counts.entry(record.equipment_type.as_str()).or_insert(0) += 1;
        }
        counts
            .into_iter()
            .map(|(equipment_type, count)| TypeCount {
                equipment_type: equipment_type.to_string(),
                count,
            })
            .collect()
    }
}

/// 算术均值；空序列返回 None
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values.fold((0.0_f64, 0_usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, name: &str, kind: &str, f: f64, p: f64, t: f64) -> EquipmentRecord {
        EquipmentRecord {
            id,
            batch_id: "b1".to_string(),
            equipment_name: name.to_string(),
            equipment_type: kind.to_string(),
            flowrate: f,
            pressure: p,
            temperature: t,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_summarize_reference_rows() {
        let records = vec![
            record(1, "P-100", "Pump", 12.5, 3.0, 70.0),
            record(2, "P-101", "Pump", 10.0, 2.5, 68.0),
            record(3, "V-200", "Valve", 5.0, 1.0, 25.0),
        ];

        let summary = SummaryEngine::new().summarize("b1", &records);

        assert_eq!(summary.total_count, 3);
        assert!(approx(summary.averages.avg_flowrate.unwrap(), 27.5 / 3.0));
        assert!(approx(summary.averages.avg_pressure.unwrap(), 6.5 / 3.0));
        assert!(approx(summary.averages.avg_temperature.unwrap(), 163.0 / 3.0));
        assert_eq!(summary.count_for("Pump"), Some(2));
        assert_eq!(summary.count_for("Valve"), Some(1));
        assert_eq!(summary.type_distribution.len(), 2);
    }

    #[test]
    fn test_summarize_empty_batch_reports_none() {
        let summary = SummaryEngine::new().summarize("b1", &[]);

        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.averages, Averages::default());
        assert!(summary.type_distribution.is_empty());

        let json = serde_json::to_value(&summary).unwrap();
        assert!(json["averages"]["avg_flowrate"].is_null());
    }

    #[test]
    fn test_distribution_sums_to_total() {
        let kinds = ["Pump", "Valve", "Pump", "Reactor", "Valve", "Pump", "HeatExchanger"];
        let records: Vec<EquipmentRecord> = kinds
            .iter()
            .enumerate()
            .map(|(i, k)| record(i as i64, "E", k, 1.0, 1.0, 1.0))
            .collect();

        let summary = SummaryEngine::new().summarize("b1", &records);
        let total: usize = summary.type_distribution.iter().map(|t| t.count).sum();

        assert_eq!(total, records.len());
        assert_eq!(summary.count_for("Pump"), Some(3));
        assert_eq!(summary.count_for("Compressor"), None);

        let mut seen: Vec<&str> = summary
            .type_distribution
            .iter()
            .map(|t| t.equipment_type.as_str())
            .collect();
        seen.dedup();
        assert_eq!(seen.len(), summary.type_distribution.len());
    }

    #[test]
    fn test_duplicate_records_counted() {
        let records = vec![
            record(1, "P-100", "Pump", 2.0, 2.0, 2.0),
            record(2, "P-100", "Pump", 4.0, 4.0, 4.0),
        ];
        let summary = SummaryEngine::new().summarize("b1", &records);
        assert_eq!(summary.count_for("Pump"), Some(2));
        assert!(approx(summary.averages.avg_flowrate.unwrap(), 3.0));
    }

    #[test]
    fn test_type_is_case_sensitive() {
        let records = vec![
            record(1, "A", "pump", 1.0, 1.0, 1.0),
            record(2, "B", "Pump", 1.0, 1.0, 1.0),
        ];
        let summary = SummaryEngine::new().summarize("b1", &records);
        assert_eq!(summary.type_distribution.len(), 2);
    }
}
