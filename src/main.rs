fn main() {
    if let Err(err) = budget_sankey::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
