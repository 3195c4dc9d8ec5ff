// ==========================================
// 引擎事件测试
// ==========================================
// 职责: 验证注册/履约/耗尽/拒绝事件及发布失败隔离
// ==========================================


#[cfg(test)]
mod event_test {
    use resource_engine::config::EngineConfig;
    use resource_engine::{
        Engine, EngineEventType, MaterialId, StatusCode, UserId, VariantId,
    };
    use std::sync::Arc;

    use crate::test_helpers::{engine_with_recorder, material, product, variant, FailingPublisher};

    #[test]
    fn test_registration_and_order_events() {
        let (engine, recorder) = engine_with_recorder();
        let m1 = material(&engine, 1, 10);
        let m2 = material(&engine, 2, 10);
        let p = product(&engine, 1, m1, 5, 0);
        variant(&engine, p, 1, m2, 10);

        assert_eq!(
            engine.order_product(p, 2, VariantId::PRIMARY, UserId(3), true),
            StatusCode::OkDepleted
        );
        assert_eq!(
            engine.order_product(p, 1, VariantId::PRIMARY, UserId(4), true),
            StatusCode::OkDepleted
        );
        assert_eq!(
            engine.order_product(p, 1, VariantId::PRIMARY, UserId(5), true),
            StatusCode::InsufficientSupply
        );

        let types: Vec<EngineEventType> = recorder.events().iter().map(|e| e.event_type).collect();
        assert_eq!(
            types,
            vec![
                EngineEventType::MaterialRegistered,
                EngineEventType::MaterialRegistered,
                EngineEventType::ProductRegistered,
                EngineEventType::VariantRegistered,
                EngineEventType::OrderFulfilled,
                EngineEventType::MaterialDepleted,
                EngineEventType::OrderFulfilled,
                EngineEventType::MaterialDepleted,
                EngineEventType::OrderRejected,
            ]
        );

        let events = recorder.events();
        // 第二单经替代在 M2 上履约
        assert_eq!(events[6].material_id, Some(m2));
        assert_eq!(events[6].variant_id, Some(VariantId(1)));
        assert_eq!(events[6].user_id, Some(UserId(4)));

        let rejected = &events[8];
        assert_eq!(rejected.status, StatusCode::InsufficientSupply);
        assert_eq!(rejected.material_id, Some(m1));
        assert_eq!(rejected.quantity, Some(5));
    }

    #[test]
    fn test_failed_registration_publishes_nothing() {
        let (engine, recorder) = engine_with_recorder();
        assert_eq!(engine.add_material(Some(MaterialId(1)), 0), StatusCode::InvalidSupply);
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_publisher_failure_does_not_change_result() {
        let engine = Engine::with_publisher(EngineConfig::default(), Arc::new(FailingPublisher));
        let m = material(&engine, 1, 10);
        let p = product(&engine, 1, m, 10, 0);

        assert_eq!(
            engine.order_product(p, 1, VariantId::PRIMARY, UserId(1), true),
            StatusCode::OkDepleted
        );
        assert_eq!(engine.get_material_supply(m).unwrap(), 0);
    }
}
