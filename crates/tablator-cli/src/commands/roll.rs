use tablator_core::Generator;

pub fn run(generator: &mut Generator, table: &str, count: usize) -> Result<(), String> {
    let results = generator
        .generate(table, count)
        .map_err(|e| e.to_string())?;

    for result in results {
        println!("{result}");
    }

    Ok(())
}
