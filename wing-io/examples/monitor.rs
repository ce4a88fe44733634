//! Live parameter monitor
//!
//! Connects to a console (first argument, or the first one discovered),
//! requests the full tree once, then prints every value change until the
//! console closes the session.
//!
//! Usage: cargo run --example monitor [ip]

use wing_io::{schema, Console, ConsoleEvent};

fn main() -> wing_io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut console = match std::env::args().nth(1) {
        Some(ip) => Console::connect(&ip)?,
        None => Console::connect_first()?,
    };

    console.request_node_data(0)?;

    while let Some(event) = console.next_event()? {
        match event {
            ConsoleEvent::NodeData { id, data } => {
                let name = schema::id_to_name(id).unwrap_or("<unknown>");
                println!("{:>10}  {}  = {}", id, name, data);
            }
            ConsoleEvent::NodeDefinition(def) => {
                println!("{}", def.describe());
            }
            ConsoleEvent::RequestEnd => {
                println!("-- request complete --");
            }
        }
    }
    Ok(())
}
