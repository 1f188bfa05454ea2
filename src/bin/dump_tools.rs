//! dump_tools: print the tool definitions served by `tools/list` as JSON.
//!
//! Usage:
//!   cargo run --bin dump_tools
//!
//! Useful for checking descriptions and input schemas without starting the
//! server or configuring a token.

fn main() {
    let config = home_dispatch::config::Config::load(None).unwrap_or_default();
    let tools = home_dispatch::tools::ToolRegistry::new(&config);
    match serde_json::to_string_pretty(&tools.tool_defs()) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed to serialize tool definitions: {e}"),
    }
}
