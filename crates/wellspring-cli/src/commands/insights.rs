use chrono::Utc;
use wellspring_core::insights;

pub fn run(user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = super::open_store()?;
    let insight = insights::compute(&store, user, Utc::now());
    println!("{}", serde_json::to_string_pretty(&insight)?);
    Ok(())
}
