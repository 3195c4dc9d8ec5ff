// ==========================================
// 资源分配引擎 - 导入层
// ==========================================
// 职责: CSV 种子数据 -> 引擎注册
// 支持: CSV
// ==========================================

pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod seed_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use field_mapper::{FieldMapper, MaterialRow, VariantRow};
pub use file_parser::{CsvParser, RawRecord};
pub use seed_importer::{
    load_orders, ImportReport, OrderBatch, RowFailure, SeedImporter, MATERIALS_FILE,
    ORDERS_FILE, PRODUCTS_FILE, VARIANTS_FILE,
};
