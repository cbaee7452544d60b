use std::path::{Path, PathBuf};

use state2breakdown::{format, measure, BreakdownNode};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[derive(clap::Parser, Debug)]
#[command(
    version,
    about = "Break down which keys make a JSON document big when serialized. Investigate oversized state.",
    long_about = "Break down which keys make a JSON document big when serialized. Investigate oversized state. Website: https://github.com/Enselic/state2breakdown"
)]
#[command(flatten_help = true)]
pub struct Args {
    /// Path to the JSON file.
    #[arg()]
    path: PathBuf,

    /// Maximum depth of the breakdown.
    #[arg(long)]
    max_depth: Option<u64>,

    #[arg(long)]
    dump_json: bool,
}

fn main() -> Result<()> {
    let args = <Args as clap::Parser>::parse();

    let tree = process_file(&args.path, depth_limit(args.max_depth))?;

    if args.dump_json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    }

    print!("{}", format(&tree, 0));

    Ok(())
}

fn depth_limit(max_depth: Option<u64>) -> i32 {
    match max_depth {
        Some(depth) => depth.try_into().unwrap_or(i32::MAX),
        None => -1,
    }
}

fn process_file(path: &Path, depth_limit: i32) -> Result<BreakdownNode> {
    let file_data = std::fs::read(path)?;
    let value: serde_json::Value = serde_json::from_slice(&file_data)?;
    let mut state = match value {
        serde_json::Value::Object(map) => map,
        _ => return Err("top-level JSON value is not an object".into()),
    };

    Ok(measure(&mut state, depth_limit)?)
}
