// ==========================================
// 资源分配引擎 - CSV 文件解析器
// ==========================================
// 职责: 读取带表头的 CSV, 产出 表头 -> 值 的原始行
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 原始行 (未做类型转换)
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub line: u64, // 源文件行号, 表头为第 1 行
    pub fields: HashMap<String, String>,
}

impl RawRecord {
    /// 取非空字段值 (已去除首尾空白)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .get(key)
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

// ==========================================
// CSV Parser
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// 解析 CSV 文件
    ///
    /// # 返回
    /// - 跳过完全空白的行
    /// - 文件不存在 / 扩展名非 csv 时返回文件级错误
    pub fn parse_file(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        if let Some(ext) = file_path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(file_path)?;
        self.parse_reader(file)
    }

    /// 从任意 Reader 解析
    pub fn parse_reader<R: Read>(&self, source: R) -> ImportResult<Vec<RawRecord>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .trim(csv::Trim::All)
            .from_reader(source);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let fields: HashMap<String, String> = headers
                .iter()
                .zip(record.iter())
                .map(|(h, v)| (h.clone(), v.to_string()))
                .collect();

            // 跳过完全空白的行
            if fields.values().all(|v| v.is_empty()) {
                continue;
            }

            records.push(RawRecord { line, fields });
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_csv_parser_valid_file() {
        let mut temp_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(temp_file, "id,Supply").unwrap();
        writeln!(temp_file, "1, 100").unwrap();
        writeln!(temp_file, "2,50").unwrap();

        let records = CsvParser.parse_file(temp_file.path()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("id"), Some("1"));
        assert_eq!(records[0].get("supply"), Some("100"));
        assert_eq!(records[0].line, 2);
        assert_eq!(records[1].line, 3);
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_file(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_parser_rejects_other_extension() {
        let temp_file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        let result = CsvParser.parse_file(temp_file.path());
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "id,supply").unwrap();
        writeln!(temp_file, "1,100").unwrap();
        writeln!(temp_file, ",").unwrap(); // 空行
        writeln!(temp_file, "2,50").unwrap();

        let file = File::open(temp_file.path()).unwrap();
        let records = CsvParser.parse_reader(file).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].line, 4);
    }

    #[test]
    fn test_short_row_leaves_field_absent() {
        let data = "id,material_id,material_amount,priority\n7,1,2\n";
        let records = CsvParser.parse_reader(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("priority"), None);
        assert_eq!(records[0].get("material_amount"), Some("2"));
    }
}
