/// gitsync - interactive branch synchronization
///
/// Thin entry point; everything lives in the library so it can be tested.
fn main() {
    match gitsync::commands::sync::run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}
