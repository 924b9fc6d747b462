/// OBJ 网格检查工具
///
/// 不打开窗口，加载一个 OBJ 文件并打印三角化后的统计信息。
///
/// 运行方式：
/// ```
/// cargo run --bin mesh_info -- DEFAULT
/// cargo run --bin mesh_info -- data/cube.obj
/// ```

use anyhow::Context;
use std::path::Path;

use meshview::core::config::{resolve_model_path, Config};
use meshview::core::log;
use meshview::geometry::loaders::load_mesh;

/// 打印的角点数量上限
const PREVIEW_CORNERS: usize = 6;

fn main() -> anyhow::Result<()> {
    let config = Config::from_file_or_default("config.toml");
    log::init_logger(config.logging.level, false, None);

    let path = std::env::args()
        .nth(1)
        .map(|arg| resolve_model_path(&arg))
        .unwrap_or(config.model.path);

    let mesh = load_mesh(Path::new(&path)).with_context(|| format!("failed to load '{}'", path))?;

    println!("=== {} ===", path);
    println!("  名称: {}", mesh.name.as_deref().unwrap_or("未命名"));
    println!("  顶点数: {}", mesh.vertices().len());
    println!("  法线数: {}", mesh.normals().len());
    println!("  三角形数: {}", mesh.triangle_count());
    println!("  渲染缓冲: {} 个浮点数", mesh.render_scalars().len());

    let largest = mesh.largest_vertex();
    println!(
        "  最大顶点: [{:.4}, {:.4}, {:.4}] (范数 {:.4})",
        largest.x,
        largest.y,
        largest.z,
        largest.norm()
    );
    println!("  归一化缩放: {:.6}", mesh.normalization_scale());

    println!("\n角点（前 {} 个）:", mesh.corner_count().min(PREVIEW_CORNERS));
    for (i, corner) in mesh.render_buffer().iter().take(PREVIEW_CORNERS).enumerate() {
        println!(
            "  {}: 位置 [{:.3}, {:.3}, {:.3}]  法线 [{:.3}, {:.3}, {:.3}]",
            i,
            corner.position[0],
            corner.position[1],
            corner.position[2],
            corner.normal[0],
            corner.normal[1],
            corner.normal[2],
        );
    }

    println!("\n三角形（前 {} 个）:", mesh.triangle_count().min(PREVIEW_CORNERS / 3));
    for (i, pair) in mesh.triangle_pairs().iter().take(PREVIEW_CORNERS / 3).enumerate() {
        println!("  {}: 顶点 {:?}  法线 {:?}", i, pair.triangle, pair.normals);
    }

    Ok(())
}
