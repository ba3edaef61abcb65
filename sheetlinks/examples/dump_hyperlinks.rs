use sheetlinks::normalize_target;
use sheetlinks::reader::read_workbook;
use std::env;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <file.xlsx>", args[0]);
        std::process::exit(1);
    }

    let path = &args[1];
    let workbook = read_workbook(path)?;

    println!("File: {}", workbook.path().display());
    println!("Sheets: {}", workbook.sheets.len());

    for sheet in &workbook.sheets {
        println!("\n=== Sheet: {} ({}) ===", sheet.name, sheet.part_name);

        for cell in sheet.all_cells() {
            let Some(link) = &cell.hyperlink else {
                continue;
            };
            match link.target() {
                Some(target) => {
                    let after = normalize_target(target, false).unwrap_or_else(|| target.to_string());
                    println!("  {} [{}] {} -> {}", cell.reference(), link.reference, target, after);
                }
                None => println!(
                    "  {} [{}] location {:?}",
                    cell.reference(),
                    link.reference,
                    link.location
                ),
            }
        }
        for link in &sheet.detached {
            println!("  (no cell) [{}] {:?}", link.reference, link.target());
        }
    }

    Ok(())
}
