mod cli;

use cli::{parse_invocation, usage_and_exit};
use cloudvfs::{FileRemoval, Result};

const USAGE: &str = "Usage: cargo run --example rm -- [--root ROOT] [--proxy PROXY] <KEY>";

#[tokio::main]
async fn main() -> Result<()> {
    let invocation = parse_invocation(USAGE, &[]);
    if invocation.positionals.len() != 1 {
        usage_and_exit(USAGE);
    }
    let key = invocation.positionals[0].clone();
    let drive = invocation.connect()?;

    println!("Removing: {}", key);
    match drive.delete_file(&key).await {
        Ok(FileRemoval::Deleted) => println!("Removed successfully!"),
        Ok(FileRemoval::NotFound) => println!("Nothing stored under that key."),
        Err(e) => eprintln!("Failed to remove: {}", e),
    }

    Ok(())
}
