//! fasdd-prep CLI binary.

fn main() {
    if let Err(e) = fasdd_prep::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
