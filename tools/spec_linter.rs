/// Spec linter — validate a saved game description document.
///
/// Usage: spec_linter <file.json> [file2.json ...]
///
/// Prints every violation per file and exits non-zero if any file
/// fails. Lenient parsing means a file with unknown enum values still
/// loads; those surface as validation errors instead of parse errors.

use arcade_forge::core::validate::validate;
use arcade_forge::schema::description::Description;

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() || args[0] == "--help" || args[0] == "-h" {
        eprintln!("Usage: spec_linter <file.json> [file2.json ...]");
        std::process::exit(2);
    }

    let mut failures = 0usize;
    for path in &args {
        match lint_file(path) {
            Ok(errors) if errors.is_empty() => {
                println!("{}: ok", path);
            }
            Ok(errors) => {
                failures += 1;
                println!("{}: {} violation(s)", path, errors.len());
                for error in errors {
                    println!("  - {}", error);
                }
            }
            Err(err) => {
                failures += 1;
                println!("{}: unreadable ({})", path, err);
            }
        }
    }

    if failures > 0 {
        std::process::exit(1);
    }
}

fn lint_file(path: &str) -> Result<Vec<String>, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let desc = Description::from_json(&raw).map_err(|e| e.to_string())?;
    let report = validate(&desc);
    Ok(report.errors.iter().map(|e| e.to_string()).collect())
}
