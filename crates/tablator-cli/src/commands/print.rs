use tablator_core::Generator;

pub fn run(generator: &mut Generator, table: &str) -> Result<(), String> {
    let text = generator.render(table).map_err(|e| e.to_string())?;
    print!("{text}");
    Ok(())
}
