use anyhow::{Context, Result};
use std::io::Read;
use webchat_core::render::render;

pub fn run(text: Option<String>) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read text from stdin")?;
            buffer
        }
    };

    println!("{}", render(&text));
    Ok(())
}
