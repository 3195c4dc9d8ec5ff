// ==========================================
// 引擎场景测试
// ==========================================
// 职责: 通过状态码接口验证注册、下单、查询的端到端行为
// ==========================================


#[cfg(test)]
mod engine_scenario_test {
    use resource_engine::{
        init, Engine, EngineError, Fulfillment, MaterialId, NewProduct, OrderRequest, ProductId,
        StatusCode, UserId, VariantId,
    };

    use crate::test_helpers::{material, product, variant};

    const M1: MaterialId = MaterialId(1);
    const P1: ProductId = ProductId(1);
    const U1: UserId = UserId(1);

    // ==========================================
    // 基本场景
    // ==========================================

    #[test]
    fn test_basic_lifecycle() {
        let engine = init();

        // 供给为 0 拒绝
        assert_eq!(engine.add_material(Some(M1), 0), StatusCode::InvalidSupply);
        assert_eq!(engine.material_count().unwrap(), 0);

        assert_eq!(engine.add_material(Some(M1), 100), StatusCode::Ok);
        assert_eq!(engine.get_material_supply(M1).unwrap(), 100);

        assert_eq!(
            engine.add_product(Some(P1), M1, 50, 0, 1.0),
            StatusCode::Ok
        );

        // 50 * 2 = 100, 恰好耗尽
        let code = engine.order_product(P1, 2, VariantId::PRIMARY, U1, true);
        assert_eq!(code, StatusCode::OkDepleted);
        assert_eq!(code.as_u8(), 1);
        assert_eq!(engine.get_material_supply(M1).unwrap(), 0);

        // 重复产品 ID
        assert_eq!(
            engine.add_product(Some(P1), M1, 10, 0, 1.0),
            StatusCode::DuplicateId
        );

        // 物料不存在
        assert_eq!(
            engine.add_product(Some(ProductId(2)), MaterialId(9999), 10, 0, 1.0),
            StatusCode::NotFound
        );
        let err = engine
            .register_product(NewProduct::new(MaterialId(9999), 10).with_id(ProductId(2)))
            .unwrap_err();
        assert!(matches!(err, EngineError::MaterialNotFound { material_id: MaterialId(9999) }));
        assert_eq!(engine.product_count().unwrap(), 1);
    }

    #[test]
    fn test_partial_stock_then_overdraft() {
        let engine = Engine::init();
        material(&engine, 1, 100);
        product(&engine, 1, M1, 30, 0);

        assert_eq!(
            engine.order_product(P1, 2, VariantId::PRIMARY, U1, true),
            StatusCode::Ok
        );
        assert_eq!(engine.get_material_supply(M1).unwrap(), 40);

        // 需要 60, 只剩 40, 无替代
        assert_eq!(
            engine.order_product(P1, 2, VariantId::PRIMARY, U1, true),
            StatusCode::InsufficientSupply
        );
        assert_eq!(engine.get_material_supply(M1).unwrap(), 40);
    }

    #[test]
    fn test_duplicate_material_keeps_original() {
        let engine = Engine::init();
        material(&engine, 1, 100);
        assert_eq!(engine.add_material(Some(M1), 5), StatusCode::DuplicateId);
        assert_eq!(engine.get_material_supply(M1).unwrap(), 100);
        assert_eq!(engine.material_count().unwrap(), 1);
    }

    #[test]
    fn test_unknown_references() {
        let engine = Engine::init();
        material(&engine, 1, 100);
        product(&engine, 1, M1, 10, 0);

        assert!(matches!(
            engine.get_material_supply(MaterialId(42)).unwrap_err().status_code(),
            StatusCode::NotFound
        ));
        assert_eq!(
            engine.order_product(ProductId(77), 1, VariantId::PRIMARY, U1, true),
            StatusCode::NotFound
        );
        assert_eq!(
            engine.order_product(P1, 1, VariantId(3), U1, true),
            StatusCode::NotFound
        );
        assert_eq!(engine.get_material_supply(M1).unwrap(), 100);
    }

    #[test]
    fn test_zero_amount_rejected_before_lookup() {
        let engine = Engine::init();
        // 产品不存在时仍先报数量错误
        assert_eq!(
            engine.order_product(ProductId(5), 0, VariantId::PRIMARY, U1, true),
            StatusCode::InvalidAmount
        );
        assert_eq!(
            engine.add_product(None, M1, 0, 0, 0.0),
            StatusCode::InvalidAmount
        );
    }

    #[test]
    fn test_read_is_idempotent() {
        let engine = Engine::init();
        material(&engine, 1, 64);
        for _ in 0..10 {
            assert_eq!(engine.get_material_supply(M1).unwrap(), 64);
        }
        assert_eq!(engine.material_stock(M1).unwrap().consumed, 0);
    }

    // ==========================================
    // 替代
    // ==========================================

    #[test]
    fn test_substitution_fallback() {
        let engine = Engine::init();
        let m2 = material(&engine, 2, 500);
        material(&engine, 1, 10);
        product(&engine, 1, M1, 20, 0);
        variant(&engine, P1, 1, m2, 25);

        let receipt = engine.submit_order(&OrderRequest::new(P1, 4)).unwrap();
        assert!(receipt.substituted());
        assert_eq!(receipt.fulfilled_variant, VariantId(1));
        assert_eq!(receipt.material_id, m2);
        assert_eq!(receipt.consumed, 100);
        assert_eq!(receipt.fulfillment, Fulfillment::PartialStock);

        // 请求物料未被触碰
        assert_eq!(engine.get_material_supply(M1).unwrap(), 10);
        assert_eq!(engine.get_material_supply(m2).unwrap(), 400);
    }

    #[test]
    fn test_substitution_disallowed() {
        let engine = Engine::init();
        let m2 = material(&engine, 2, 500);
        material(&engine, 1, 10);
        product(&engine, 1, M1, 20, 0);
        variant(&engine, P1, 1, m2, 25);

        assert_eq!(
            engine.order_product(P1, 4, VariantId::PRIMARY, U1, false),
            StatusCode::InsufficientSupply
        );
        assert_eq!(engine.get_material_supply(m2).unwrap(), 500);
    }

    #[test]
    fn test_non_primary_request_can_fall_back_to_primary() {
        let engine = Engine::init();
        let m2 = material(&engine, 2, 5);
        material(&engine, 1, 100);
        product(&engine, 1, M1, 10, 0);
        variant(&engine, P1, 1, m2, 10);

        let receipt = engine
            .submit_order(&OrderRequest::new(P1, 3).with_variant(VariantId(1)))
            .unwrap();
        assert_eq!(receipt.fulfilled_variant, VariantId::PRIMARY);
        assert_eq!(receipt.remaining, 70);
    }

    // ==========================================
    // 统计
    // ==========================================

    #[test]
    fn test_scarcity_and_fulfilled_units() {
        let engine = Engine::init();
        material(&engine, 1, 100);
        product(&engine, 1, M1, 10, 0);

        assert_eq!(
            engine.order_product(P1, 5, VariantId::PRIMARY, U1, true),
            StatusCode::Ok
        );
        // 剩 50, 需要 300
        assert_eq!(
            engine.order_product(P1, 30, VariantId::PRIMARY, U1, true),
            StatusCode::InsufficientSupply
        );

        let stock = engine.material_stock(M1).unwrap();
        assert_eq!(stock.consumed, 50);
        assert_eq!(stock.unmet_demand, 300);
        assert_eq!(stock.rejected_orders, 1);
        assert_eq!(stock.fulfilled_orders, 1);
        assert_eq!(engine.material_scarcity(M1).unwrap(), 300 * 100 / 50 / 2);

        let view = engine.product(P1).unwrap();
        assert_eq!(view.fulfilled_units, 5);
    }

    #[test]
    fn test_fulfilled_units_saturate_at_max() {
        let engine = Engine::init();
        let m1 = material(&engine, 1, u64::MAX);
        let m2 = material(&engine, 2, 10);
        product(&engine, 1, m1, 1, 0);
        variant(&engine, P1, 1, m2, 1);

        assert_eq!(
            engine.order_product(P1, u64::MAX, VariantId::PRIMARY, U1, true),
            StatusCode::OkDepleted
        );
        assert_eq!(
            engine.order_product(P1, 1, VariantId(1), U1, true),
            StatusCode::Ok
        );
        assert_eq!(engine.product(P1).unwrap().fulfilled_units, u64::MAX);
    }

    #[test]
    fn test_overflowing_order_keeps_scarcity_meaningful() {
        let engine = Engine::init();
        material(&engine, 1, 1000);
        product(&engine, 1, M1, 2, 0);

        let err = engine
            .submit_order(&OrderRequest::new(P1, u64::MAX))
            .unwrap_err();
        assert!(matches!(err, EngineError::RequirementOverflow { available: 1000, .. }));
        assert_eq!(err.status_code(), StatusCode::InsufficientSupply);

        let stock = engine.material_stock(M1).unwrap();
        assert_eq!(stock.unmet_demand, 0);
        assert_eq!(stock.rejected_orders, 1);
        assert_eq!(engine.material_scarcity(M1).unwrap(), 0);
    }
}
