use wellspring_core::session::ExerciseDefinition;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let presets = ExerciseDefinition::presets();
    println!("{}", serde_json::to_string_pretty(&presets)?);
    Ok(())
}
