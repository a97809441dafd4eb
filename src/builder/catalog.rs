//! The fixed assessment task catalog and its generated variants.

use crate::builder::context::BuildContext;
use crate::model::{Block, Task, Variant};

/// The four catalog tasks, in assignment order.
pub const TASK_IDS: [&str; 4] = ["swr", "pa", "sre", "fakeTask"];

/// The task whose attempts are deliberately left unfinished in every
/// administration, so downstream code always has an in-progress fixture.
pub const UNFINISHED_TASK_ID: &str = "sre";

const TASK_CATALOG: [(&str, &str, &str); 4] = [
    ("swr", "Single Word Recognition", "SWR Description Text"),
    ("pa", "PA Name", "PA Description Text"),
    ("sre", "Sentence Reading Efficiency", "SRE Description Text"),
    ("fakeTask", "Fake Task", "Fake Task Description Text"),
];

/// Builds the task catalog with randomized variants and blocks.
///
/// Runs before any administration is assembled; the catalog is read-only
/// input from then on.
pub fn build_task_catalog(ctx: &mut BuildContext) {
    for (id, name, description) in TASK_CATALOG {
        let mut task = Task::new(id, name, description);
        let variant_count = ctx.provider.count_between(ctx.config.variants_per_task);
        for _ in 0..variant_count {
            let block_count = ctx.provider.count_between(ctx.config.blocks_per_variant);
            let blocks = (0..block_count).map(|index| Block::new(index as u32)).collect();
            let variant = Variant::generate(&mut ctx.provider, blocks);
            task.collections.variants.insert(variant.id.clone(), variant);
        }
        ctx.tasks.insert(id.to_string(), task);
    }
    tracing::info!(tasks = ctx.tasks.len(), "built assessment task catalog");
}
