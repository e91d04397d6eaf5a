// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
use blocknote_engine::{Block, BlockStore, Timestamp};

#[allow(dead_code)]
pub fn generate_block_content(n: usize) -> String {
    let base = "Paragraph with some content.\n\n- Bullet point\n  - Nested item\n- Another item\n\n```rust\n# not a heading\nfn example() {}\n```\n";
    match n % 3 {
        0 => format!("# Section {n}\n\n{base}"),
        1 => format!("## Subsection {n}\n\n{base}"),
        _ => base.to_string(),
    }
}

#[allow(dead_code)]
pub fn generate_store(blocks: usize) -> BlockStore {
    let start = Timestamp::parse("2024-01-01 00:00:00").unwrap();
    BlockStore::from_blocks(
        (0..blocks)
            .map(|n| {
                let created = start.plus_seconds(n as i64 * 60);
                let modified = start.plus_seconds(((n * 7919) % blocks) as i64 * 60);
                Block::with_timestamps(generate_block_content(n), created, modified)
            })
            .collect(),
    )
}
