use colored::Colorize;
use tablator_core::TableStore;

pub fn run(store: &mut TableStore) -> Result<(), String> {
    let names = store.list_tables().map_err(|e| e.to_string())?;

    println!();
    println!("{}", "Available tables".bold());
    println!();
    for name in names {
        println!("    {name}");
    }
    println!();

    Ok(())
}
