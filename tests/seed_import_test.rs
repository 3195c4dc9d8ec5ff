// ==========================================
// 种子数据导入测试
// ==========================================
// 职责: 验证 CSV 种子目录导入、行级失败收集、订单回放读取
// ==========================================


#[cfg(test)]
mod seed_import_test {
    use resource_engine::importer::{load_orders, ImportError, SeedImporter};
    use resource_engine::{
        Engine, MaterialId, ProductId, StatusCode, UserId, VariantId,
    };
    use tempfile::TempDir;

    use crate::test_helpers::{seed_dir, write_csv};

    #[test]
    fn test_import_full_directory() {
        let dir = seed_dir(
            &["id,supply", "1,100", "2,500"],
            &[
                "id,material_id,material_amount,priority,work_complexity",
                "10,1,20,5,1.5",
                "11,2,3,,",
            ],
            &["product_id,variant_id,material_id,material_amount", "10,1,2,25"],
        );

        let engine = Engine::init();
        let report = SeedImporter::new(&engine).import_dir(dir.path()).unwrap();

        assert!(report.is_clean(), "{:?}", report.failures);
        assert_eq!(report.materials_imported, 2);
        assert_eq!(report.products_imported, 2);
        assert_eq!(report.variants_imported, 1);
        assert_eq!(report.total_imported(), 5);

        let p10 = engine.product(ProductId(10)).unwrap();
        assert_eq!(p10.priority, 5);
        assert_eq!(p10.work_complexity, 1.5);
        assert_eq!(p10.variants.len(), 1);
        assert_eq!(engine.product(ProductId(11)).unwrap().priority, 0);
        assert_eq!(
            engine.resolve_variant(ProductId(10), VariantId(1)).unwrap(),
            (MaterialId(2), 25)
        );
    }

    #[test]
    fn test_row_failures_are_collected() {
        let dir = seed_dir(
            &["id,supply", "1,100", "1,50", "2,0", "3,abc", ",70"],
            &[
                "id,material_id,material_amount,priority,work_complexity",
                "10,1,20,0,0",
                "11,9999,1,0,0",
                "12,1,0,0,0",
            ],
            &[
                "product_id,variant_id,material_id,material_amount",
                "10,0,1,5",
                "99,1,1,5",
            ],
        );

        let engine = Engine::init();
        let report = SeedImporter::new(&engine).import_dir(dir.path()).unwrap();

        // 物料: 1 与自动分配的 0 成功
        assert_eq!(report.materials_imported, 2);
        assert_eq!(engine.get_material_supply(MaterialId(1)).unwrap(), 100);
        assert_eq!(engine.get_material_supply(MaterialId(0)).unwrap(), 70);
        assert_eq!(report.products_imported, 1);
        assert_eq!(report.variants_imported, 0);

        let statuses: Vec<(String, u64, Option<StatusCode>)> = report
            .failures
            .iter()
            .map(|f| (f.file.clone(), f.row, f.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("materials.csv".to_string(), 3, Some(StatusCode::DuplicateId)),
                ("materials.csv".to_string(), 4, Some(StatusCode::InvalidSupply)),
                ("materials.csv".to_string(), 5, None),
                ("products.csv".to_string(), 3, Some(StatusCode::NotFound)),
                ("products.csv".to_string(), 4, Some(StatusCode::InvalidAmount)),
                ("variants.csv".to_string(), 2, Some(StatusCode::DuplicateId)),
                ("variants.csv".to_string(), 3, Some(StatusCode::NotFound)),
            ]
        );
    }

    #[test]
    fn test_missing_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        write_csv(dir.path(), "materials.csv", &["id,supply", "4,9"]);

        let engine = Engine::init();
        let report = SeedImporter::new(&engine).import_dir(dir.path()).unwrap();
        assert_eq!(report.materials_imported, 1);
        assert_eq!(report.products_imported, 0);
        assert_eq!(engine.product_count().unwrap(), 0);
    }

    #[test]
    fn test_load_orders_and_replay() {
        let dir = seed_dir(
            &["id,supply", "1,100"],
            &["id,material_id,material_amount,priority,work_complexity", "1,1,50,0,1.0"],
            &["product_id,variant_id,material_id,material_amount"],
        );
        write_csv(
            dir.path(),
            "orders.csv",
            &[
                "product_id,amount,variant_id,user_id,allow_substitution",
                "1,1,0,7,true",
                "1,x,0,7,true",
                "1,1,,,",
                "1,1,0,7,false",
            ],
        );

        let engine = Engine::init();
        SeedImporter::new(&engine).import_dir(dir.path()).unwrap();
        let batch = load_orders(&dir.path().join("orders.csv")).unwrap();

        assert_eq!(batch.orders.len(), 3);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].row, 3);
        assert_eq!(batch.orders[0].1.user_id, UserId(7));

        let codes: Vec<StatusCode> = batch
            .orders
            .iter()
            .map(|(_, o)| {
                engine.order_product(o.product_id, o.amount, o.variant_id, o.user_id, o.allow_substitution)
            })
            .collect();
        assert_eq!(
            codes,
            vec![StatusCode::Ok, StatusCode::OkDepleted, StatusCode::InsufficientSupply]
        );
    }

    #[test]
    fn test_unreadable_file_is_fatal() {
        let engine = Engine::init();
        let err = load_orders(std::path::Path::new("/nonexistent/orders.csv")).unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));
        assert_eq!(engine.material_count().unwrap(), 0);
    }
}
