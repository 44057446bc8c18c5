//! Example: Upload a local file into a folder
//!
//! The stored key is `<folder>/<file name without extension>`; uploading the same
//! name again replaces the earlier file.

mod cli;

use std::path::Path;

use cli::{parse_invocation, usage_and_exit};
use cloudvfs::Result;

const USAGE: &str = "Usage: cargo run --example upload -- [--root ROOT] [--proxy PROXY] \
                     [--content-type MIME] <LOCAL_FILE> [FOLDER]";

#[tokio::main]
async fn main() -> Result<()> {
    let invocation = parse_invocation(USAGE, &["--content-type"]);
    let (local, folder) = match invocation.positionals.as_slice() {
        [local] => (local.clone(), String::new()),
        [local, folder] => (local.clone(), folder.clone()),
        _ => usage_and_exit(USAGE),
    };

    let data = match tokio::fs::read(&local).await {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read {}: {}", local, e);
            std::process::exit(1);
        }
    };
    let file_name = Path::new(&local)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| local.clone());

    let drive = invocation.connect()?;
    println!("Uploading {} ({} bytes) to /{}...", file_name, data.len(), folder);

    let record = drive
        .upload(&folder, &file_name, data, invocation.option("--content-type"))
        .await?;
    println!("Upload complete!");
    println!("Key: {}", record.key);
    println!("URL: {}", record.url);
    println!("Size: {} bytes", record.size_bytes);

    Ok(())
}
