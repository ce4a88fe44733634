//! List every console answering the discovery broadcast
//!
//! Usage: cargo run --example discover

use wing_io::Console;

fn main() -> wing_io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let consoles = Console::discover(false)?;
    if consoles.is_empty() {
        println!("No consoles found");
        return Ok(());
    }

    println!("Found {} console(s):", consoles.len());
    for (i, info) in consoles.iter().enumerate() {
        println!(
            "{}. {} at {} (model {}, serial {}, firmware {})",
            i + 1,
            info.name,
            info.ip,
            info.model,
            info.serial,
            info.firmware
        );
    }
    Ok(())
}
