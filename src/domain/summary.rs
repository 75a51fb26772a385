// ==========================================
// 化工设备报表系统 - 批次统计模型
// ==========================================
// 职责: 汇总统计的输出结构（均值 + 类型分布）
// 约束: 零条记录的均值为 None（序列化为 null），不是 0.0
// ==========================================

use serde::{Deserialize, Serialize};

/// 三项测量值的算术均值
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Averages {
    pub avg_flowrate: Option<f64>,
    pub avg_pressure: Option<f64>,
    pub avg_temperature: Option<f64>,
}

/// 某一设备类型的记录数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCount {
    pub equipment_type: String,
    pub count: usize,
}

/// 批次汇总统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub upload_id: String,
    pub total_count: usize,
    pub averages: Averages,
    pub type_distribution: Vec<TypeCount>,
}

impl Summary {
    /// 查询某一类型的记录数（类型不存在返回 None）
    pub fn count_for(&self, equipment_type: &str) -> Option<usize> {
        self.type_distribution
            .iter()
            .find(|t| t.equipment_type == equipment_type)
            .map(|t| t.count)
    }

    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}
