use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use dotmatrix_gb::{GameBoy, SCREEN_HEIGHT, SCREEN_WIDTH};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let rom_path: PathBuf = match args.next() {
        Some(path) => PathBuf::from(path),
        None => {
            eprintln!("Usage: dotmatrix <rom_path> [frames] [out_rgba_path]");
            std::process::exit(2);
        }
    };
    let frames: u32 = args
        .next()
        .map(|arg| arg.parse())
        .transpose()
        .context("invalid frame count")?
        .unwrap_or(600);
    let out_path = args.next().map(PathBuf::from);

    let rom = std::fs::read(&rom_path)
        .with_context(|| format!("failed to read ROM '{}'", rom_path.display()))?;
    let mut gb = GameBoy::from_rom(&rom)?;

    log::info!(
        "running '{}' for {} frames",
        rom_path.display(),
        frames
    );

    // Echo serial output (test ROM results) to stdout as it arrives.
    let mut echoed = 0;
    for _ in 0..frames {
        gb.step_frame()?;
        let output = gb.serial_output();
        if output.len() > echoed {
            print!("{}", String::from_utf8_lossy(&output[echoed..]));
            std::io::stdout().flush().ok();
            echoed = output.len();
        }
    }
    if echoed > 0 {
        println!();
    }

    if let Some(out_path) = out_path {
        let mut buffer = vec![0u8; SCREEN_WIDTH * SCREEN_HEIGHT * 4];
        gb.frame_rgba(&mut buffer);
        std::fs::write(&out_path, &buffer)
            .with_context(|| format!("failed to write '{}'", out_path.display()))?;
        println!(
            "Wrote {} bytes ({}x{} rgba) after {} frames to '{}'",
            buffer.len(),
            SCREEN_WIDTH,
            SCREEN_HEIGHT,
            frames,
            out_path.display()
        );
    }

    Ok(())
}
