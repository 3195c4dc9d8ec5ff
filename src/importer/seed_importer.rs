// ==========================================
// 资源分配引擎 - 种子数据导入器
// ==========================================
// 职责: materials.csv -> products.csv -> variants.csv 依次写入引擎
// 红线: 行级失败收集进报告, 不中断整批
// 红线: 文件级失败 (不可读/格式错) 直接返回错误
// ==========================================

use crate::api::Engine;
use crate::domain::order::OrderRequest;
use crate::domain::types::StatusCode;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::{CsvParser, RawRecord};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use uuid::Uuid;

pub const MATERIALS_FILE: &str = "materials.csv";
pub const PRODUCTS_FILE: &str = "products.csv";
pub const VARIANTS_FILE: &str = "variants.csv";
pub const ORDERS_FILE: &str = "orders.csv";

// ==========================================
// 导入报告
// ==========================================

/// 单行失败记录
#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    pub file: String,
    pub row: u64,
    pub status: Option<StatusCode>, // 引擎拒绝时的状态码, 解析失败为 None
    pub message: String,
}

impl RowFailure {
    fn from_error(file: &str, fallback_row: u64, err: &ImportError) -> Self {
        let status = match err {
            ImportError::Rejected { source, .. } => Some(source.status_code()),
            _ => None,
        };
        Self {
            file: file.to_string(),
            row: err.row().unwrap_or(fallback_row),
            status,
            message: err.to_string(),
        }
    }
}

/// 导入批次报告
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub batch_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub materials_imported: usize,
    pub products_imported: usize,
    pub variants_imported: usize,
    pub failures: Vec<RowFailure>,
}

impl ImportReport {
    pub fn new() -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            started_at: Utc::now(),
            materials_imported: 0,
            products_imported: 0,
            variants_imported: 0,
            failures: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total_imported(&self) -> usize {
        self.materials_imported + self.products_imported + self.variants_imported
    }
}

impl Default for ImportReport {
    fn default() -> Self {
        Self::new()
    }
}

/// 订单回放批次
#[derive(Debug, Clone, Default)]
pub struct OrderBatch {
    pub orders: Vec<(u64, OrderRequest)>, // (行号, 订单)
    pub failures: Vec<RowFailure>,
}

// ==========================================
// SeedImporter
// ==========================================
pub struct SeedImporter<'a> {
    engine: &'a Engine,
    parser: CsvParser,
    mapper: FieldMapper,
}

impl<'a> SeedImporter<'a> {
    pub fn new(engine: &'a Engine) -> Self {
        Self {
            engine,
            parser: CsvParser,
            mapper: FieldMapper,
        }
    }

    /// 从目录导入全部种子文件
    ///
    /// # 参数
    /// - `dir`: 含 materials.csv / products.csv / variants.csv 的目录, 缺失的文件跳过
    ///
    /// # 返回
    /// 导入报告 (含行级失败)
    pub fn import_dir(&self, dir: &Path) -> ImportResult<ImportReport> {
        let mut report = ImportReport::new();
        tracing::info!(batch_id = %report.batch_id, dir = %dir.display(), "开始导入种子数据");

        let materials = dir.join(MATERIALS_FILE);
        if materials.exists() {
            self.import_materials(&materials, &mut report)?;
        } else {
            tracing::info!(file = MATERIALS_FILE, "文件不存在, 跳过");
        }

        let products = dir.join(PRODUCTS_FILE);
        if products.exists() {
            self.import_products(&products, &mut report)?;
        } else {
            tracing::info!(file = PRODUCTS_FILE, "文件不存在, 跳过");
        }

        let variants = dir.join(VARIANTS_FILE);
        if variants.exists() {
            self.import_variants(&variants, &mut report)?;
        } else {
            tracing::info!(file = VARIANTS_FILE, "文件不存在, 跳过");
        }

        tracing::info!(
            batch_id = %report.batch_id,
            materials = report.materials_imported,
            products = report.products_imported,
            variants = report.variants_imported,
            failures = report.failures.len(),
            "种子数据导入完成"
        );
        Ok(report)
    }

    pub fn import_materials(&self, path: &Path, report: &mut ImportReport) -> ImportResult<()> {
        let records = self.parser.parse_file(path)?;
        let imported = self.apply_rows(MATERIALS_FILE, &records, report, |row| {
            let m = self.mapper.map_material(row)?;
            self.engine
                .register_material(m.material_id, m.supply)
                .map(|_| ())
                .map_err(|source| ImportError::Rejected { row: row.line, source })
        });
        report.materials_imported += imported;
        Ok(())
    }

    pub fn import_products(&self, path: &Path, report: &mut ImportReport) -> ImportResult<()> {
        let records = self.parser.parse_file(path)?;
        let imported = self.apply_rows(PRODUCTS_FILE, &records, report, |row| {
            let p = self.mapper.map_product(row)?;
            self.engine
                .register_product(p)
                .map(|_| ())
                .map_err(|source| ImportError::Rejected { row: row.line, source })
        });
        report.products_imported += imported;
        Ok(())
    }

    pub fn import_variants(&self, path: &Path, report: &mut ImportReport) -> ImportResult<()> {
        let records = self.parser.parse_file(path)?;
        let imported = self.apply_rows(VARIANTS_FILE, &records, report, |row| {
            let v = self.mapper.map_variant(row)?;
            self.engine
                .register_variant(v.product_id, v.variant_id, v.material_id, v.material_amount)
                .map_err(|source| ImportError::Rejected { row: row.line, source })
        });
        report.variants_imported += imported;
        Ok(())
    }

    /// 逐行应用, 返回成功行数
    fn apply_rows<F>(
        &self,
        file: &str,
        records: &[RawRecord],
        report: &mut ImportReport,
        mut apply: F,
    ) -> usize
    where
        F: FnMut(&RawRecord) -> ImportResult<()>,
    {
        let mut imported = 0;
        for row in records {
            match apply(row) {
                Ok(()) => imported += 1,
                Err(e) => {
                    tracing::warn!(file, row = row.line, error = %e, "种子行导入失败");
                    report.failures.push(RowFailure::from_error(file, row.line, &e));
                }
            }
        }
        imported
    }
}

/// 读取订单回放文件
///
/// 解析失败的行记入 `failures`, 其余按文件顺序返回
pub fn load_orders(path: &Path) -> ImportResult<OrderBatch> {
    let records = CsvParser.parse_file(path)?;
    let mut batch = OrderBatch::default();
    for row in &records {
        match FieldMapper.map_order(row) {
            Ok(order) => batch.orders.push((row.line, order)),
            Err(e) => {
                tracing::warn!(file = ORDERS_FILE, row = row.line, error = %e, "订单行解析失败");
                batch
                    .failures
                    .push(RowFailure::from_error(ORDERS_FILE, row.line, &e));
            }
        }
    }
    Ok(batch)
}
