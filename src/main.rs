// ==========================================
// 资源分配引擎 - 演示宿主
// ==========================================
// 用法:
//   resource-engine <seed_dir> [config.json]
//
// 流程: 初始化日志 -> 加载配置 -> 导入种子 -> 回放 orders.csv -> 打印终态供给
// ==========================================

use anyhow::{bail, Context, Result};
use resource_engine::config::EngineConfig;
use resource_engine::importer::{load_orders, SeedImporter, ORDERS_FILE};
use resource_engine::{logging, Engine};
use std::path::PathBuf;

fn main() -> Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let Some(seed_dir) = args.next().map(PathBuf::from) else {
        bail!("用法: resource-engine <seed_dir> [config.json]");
    };
    let config_path = args.next().map(PathBuf::from);

    tracing::info!("==================================================");
    tracing::info!("{} {}", resource_engine::APP_NAME, resource_engine::VERSION);
    tracing::info!("==================================================");

    let config = EngineConfig::load(config_path.as_deref())
        .with_context(|| format!("配置加载失败: {:?}", config_path))?;
    let engine = Engine::with_config(config);

    // 种子数据
    let report = SeedImporter::new(&engine)
        .import_dir(&seed_dir)
        .with_context(|| format!("种子导入失败: {}", seed_dir.display()))?;
    println!(
        "seed batch={} materials={} products={} variants={} failures={}",
        report.batch_id,
        report.materials_imported,
        report.products_imported,
        report.variants_imported,
        report.failures.len()
    );
    for failure in &report.failures {
        println!("  {}:{} {}", failure.file, failure.row, failure.message);
    }

    // 订单回放
    let orders_path = seed_dir.join(ORDERS_FILE);
    if orders_path.exists() {
        let batch = load_orders(&orders_path)
            .with_context(|| format!("订单读取失败: {}", orders_path.display()))?;
        for failure in &batch.failures {
            println!("  {}:{} {}", failure.file, failure.row, failure.message);
        }
        for (line, order) in &batch.orders {
            let code = engine.order_product(
                order.product_id,
                order.amount,
                order.variant_id,
                order.user_id,
                order.allow_substitution,
            );
            println!(
                "order line={} product={} amount={} -> {} ({})",
                line,
                order.product_id,
                order.amount,
                code.as_u8(),
                code
            );
        }
    } else {
        tracing::info!(file = ORDERS_FILE, "无订单文件, 跳过回放");
    }

    // 终态供给
    for id in engine.material_ids()? {
        let stock = engine.material_stock(id)?;
        println!(
            "material {} supply={} consumed={} unmet={} scarcity={}",
            id,
            stock.supply,
            stock.consumed,
            stock.unmet_demand,
            stock.scarcity()
        );
    }

    Ok(())
}
