// ==========================================
// 化工设备报表系统 - 导入层
// ==========================================
// 职责: 上传文件 → 设备草稿 → 批次落库
// 支持: 带表头的分隔文本（CSV）
// ==========================================

pub mod equipment_importer;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod importer_trait;

// 重导出核心类型
pub use equipment_importer::EquipmentImporterImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::EquipmentFieldMapper;
pub use file_parser::CsvParser;

// 重导出 Trait 接口
pub use importer_trait::{EquipmentImporter, FieldMapper, FileParser, RawRow, RawTable};
