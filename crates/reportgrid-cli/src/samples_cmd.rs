use crate::cli::OutputFormat;

/// Companies whose annual reports have been processed, with the keyword
/// that locates their headcount table.
pub const SAMPLES: [(&str, &str); 8] = [
    ("華邦電", "從業員工"),
    ("台積電", "人力結構"),
    ("旺宏", "從業員工"),
    ("南亞科", "從業員工"),
    ("晶豪科", "從業員工"),
    ("新唐", "從業員工"),
    ("力積電", "從業員工"),
    ("鈺創", "員工人數"),
];

pub fn run(format: &OutputFormat) -> Result<(), i32> {
    match format {
        OutputFormat::Text => {
            println!("公司\t關鍵字");
            for (company, keyword) in SAMPLES {
                println!("{company}\t{keyword}");
            }
        }
        OutputFormat::Json => {
            let json: Vec<serde_json::Value> = SAMPLES
                .iter()
                .map(|(company, keyword)| serde_json::json!({ "company": company, "keyword": keyword }))
                .collect();
            let text = serde_json::to_string_pretty(&json).map_err(|e| {
                eprintln!("Error: JSON serialization failed: {e}");
                1
            })?;
            println!("{text}");
        }
    }
    Ok(())
}
