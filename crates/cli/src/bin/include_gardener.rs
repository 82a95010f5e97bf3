use anyhow::Result;

fn main() -> Result<()> {
    gardener_cli::main_entry()
}
