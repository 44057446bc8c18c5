//! Example: List a folder
//!
//! Usage:
//!   cargo run --example ls -- [--root ROOT] [--proxy PROXY] [PATH]
//!
//! Credentials come from CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and
//! CLOUDINARY_API_SECRET.

mod cli;

use cli::{parse_invocation, usage_and_exit};
use cloudvfs::Result;

const USAGE: &str = "Usage: cargo run --example ls -- [--root ROOT] [--proxy PROXY] [PATH]";

#[tokio::main]
async fn main() -> Result<()> {
    let invocation = parse_invocation(USAGE, &[]);
    if invocation.positionals.len() > 1 {
        usage_and_exit(USAGE);
    }
    let path = invocation.positionals.first().cloned().unwrap_or_default();
    let drive = invocation.connect()?;

    let listing = drive.list(&path).await?;
    println!("\nListing: {}\n", listing.folder);

    if listing.items.is_empty() {
        println!("  (empty)");
    }
    for item in &listing.items {
        if item.is_folder {
            println!("  d {}/", item.basename);
        } else {
            let date = item
                .upload_date
                .map(|d| d.to_string())
                .unwrap_or_default();
            println!(
                "  - {} {} {}  {}",
                item.basename,
                format_size(item.size_bytes),
                date,
                item.name
            );
        }
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{}B", bytes)
    } else if bytes < 1_048_576 {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    } else if bytes < 1_073_741_824 {
        format!("{:.1}MB", bytes as f64 / 1_048_576.0)
    } else {
        format!("{:.2}GB", bytes as f64 / 1_073_741_824.0)
    }
}
