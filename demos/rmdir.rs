mod cli;

use cli::{parse_invocation, usage_and_exit};
use cloudvfs::Result;

const USAGE: &str = "Usage: cargo run --example rmdir -- [--root ROOT] [--proxy PROXY] <PATH>";

#[tokio::main]
async fn main() -> Result<()> {
    let invocation = parse_invocation(USAGE, &[]);
    if invocation.positionals.len() != 1 {
        usage_and_exit(USAGE);
    }
    let target = invocation.positionals[0].clone();
    let drive = invocation.connect()?;

    println!("Removing folder: {}", target);
    match drive.delete_folder(&target).await {
        Ok(removal) if removal.removed_anything() => println!(
            "Removed {} objects and {} folder records.",
            removal.objects_deleted, removal.records_deleted
        ),
        Ok(_) => println!("Folder was already gone."),
        Err(e) => eprintln!("Failed to remove folder: {}", e),
    }

    Ok(())
}
