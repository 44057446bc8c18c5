mod cli;

use cli::{parse_invocation, usage_and_exit};
use cloudvfs::{Result, VfsError};

const USAGE: &str = "Usage: cargo run --example mkdir -- [--root ROOT] [--proxy PROXY] <PATH>";

#[tokio::main]
async fn main() -> Result<()> {
    let invocation = parse_invocation(USAGE, &[]);
    if invocation.positionals.len() != 1 {
        usage_and_exit(USAGE);
    }
    let target = invocation.positionals[0].clone();
    let drive = invocation.connect()?;

    println!("Creating folder: {}", target);
    match drive.create_folder(&target).await {
        Ok(record) => {
            println!("Folder created successfully!");
            println!("Name: {}", record.name);
            println!("Path: {}", record.path);
        }
        Err(VfsError::AlreadyExists(_)) => {
            println!("Folder already exists.");
        }
        Err(e) => {
            eprintln!("Failed to create folder: {}", e);
        }
    }

    Ok(())
}
